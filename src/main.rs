//! Grid Tactics - command line driver
//!
//! Simulates seeded games between random controllers

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use grid_tactics::{
    config::RulesConfig,
    game::{
        GameLoop, GameResult, GameState, OutputFormat, OutputMode, PlayerController, RandomController,
        VerbosityLevel,
    },
    loader::{CardDatabase, GameInitializer, Seat},
};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Verbosity level for game output (names or numbers)
#[derive(Debug, Clone, Copy)]
struct VerbosityArg(VerbosityLevel);

impl std::str::FromStr for VerbosityArg {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "silent" | "0" => Ok(VerbosityArg(VerbosityLevel::Silent)),
            "minimal" | "1" => Ok(VerbosityArg(VerbosityLevel::Minimal)),
            "normal" | "2" => Ok(VerbosityArg(VerbosityLevel::Normal)),
            "verbose" | "3" => Ok(VerbosityArg(VerbosityLevel::Verbose)),
            _ => Err(format!(
                "invalid verbosity level '{s}' (expected: silent/0, minimal/1, normal/2, verbose/3)"
            )),
        }
    }
}

/// Log line format for simulate output
#[derive(Debug, Clone, Copy)]
struct LogFormatArg(OutputFormat);

impl std::str::FromStr for LogFormatArg {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(LogFormatArg(OutputFormat::Text)),
            "json" => Ok(LogFormatArg(OutputFormat::Json)),
            _ => Err(format!("invalid log format '{s}' (expected: text, json)")),
        }
    }
}

#[derive(Parser)]
#[command(name = "gridtac")]
#[command(about = "Grid Tactics - grid card game rules engine", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Table setup shared by every subcommand
#[derive(clap::Args)]
struct TableArgs {
    /// Content file with card, counter and deck definitions
    #[arg(long, default_value = "cards/starter.json")]
    content: PathBuf,

    /// Rules config file (JSON); defaults apply to missing fields
    #[arg(long)]
    config: Option<PathBuf>,

    /// Number of seats
    #[arg(long, default_value_t = 2, value_parser = clap::value_parser!(u8).range(2..=4))]
    players: u8,

    /// Deck every seat plays (defaults to the first deck in the content file)
    #[arg(long)]
    deck: Option<String>,

    /// Stop a game after this many controller decisions
    #[arg(long, default_value_t = 100_000)]
    max_steps: u32,
}

#[derive(Subcommand)]
enum Commands {
    /// Play one seeded game between random controllers
    Simulate {
        #[command(flatten)]
        table: TableArgs,

        /// Random seed for deterministic games
        #[arg(long, default_value_t = 0)]
        seed: u64,

        /// Verbosity level (silent/0, minimal/1, normal/2, verbose/3)
        #[arg(long, short = 'v', default_value = "normal")]
        verbosity: VerbosityArg,

        /// Log line format (text, or json with one object per line)
        #[arg(long, default_value = "text")]
        log_format: LogFormatArg,

        /// Write the final game state as JSON
        #[arg(long)]
        snapshot: Option<PathBuf>,
    },

    /// Run many silent games in a tight loop
    Profile {
        #[command(flatten)]
        table: TableArgs,

        /// Number of games to run
        #[arg(long, default_value_t = 100)]
        games: u64,

        /// Seed of the first game; each later game adds one
        #[arg(long, default_value_t = 0)]
        seed: u64,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Simulate {
            table,
            seed,
            verbosity,
            log_format,
            snapshot,
        } => run_simulate(&table, seed, verbosity.0, log_format.0, snapshot.as_deref()),
        Commands::Profile { table, games, seed } => run_profile(&table, games, seed),
    }
}

fn load_table(table: &TableArgs) -> anyhow::Result<(GameInitializer, Vec<Seat>)> {
    let content = CardDatabase::load_from_file(&table.content)
        .with_context(|| format!("loading content from {}", table.content.display()))?;
    let config = match &table.config {
        Some(path) => RulesConfig::load(path).with_context(|| format!("loading config from {}", path.display()))?,
        None => RulesConfig::default(),
    };

    let deck_name = match &table.deck {
        Some(name) => name.clone(),
        None => match content.deck_names().first() {
            Some(name) => name.to_string(),
            None => bail!("{} defines no decks", table.content.display()),
        },
    };
    let Some(deck) = content.get_deck(&deck_name).cloned() else {
        bail!("unknown deck '{deck_name}'; available: {:?}", content.deck_names());
    };

    let seats = (1..=table.players)
        .map(|i| Seat::new(format!("Player {i}"), deck.clone()))
        .collect();
    Ok((GameInitializer::new(Arc::new(content), config), seats))
}

fn controllers(game: &GameState, seed: u64) -> Vec<Box<dyn PlayerController>> {
    game.player_ids()
        .into_iter()
        .map(|id| Box::new(RandomController::with_seed(id, seed.wrapping_add(id.as_u32() as u64))) as Box<dyn PlayerController>)
        .collect()
}

fn play(game: &mut GameState, seed: u64, max_steps: u32, verbosity: VerbosityLevel) -> anyhow::Result<GameResult> {
    let mut controllers = controllers(game, seed);
    let result = GameLoop::new(game)
        .with_max_steps(max_steps)
        .with_verbosity(verbosity)
        .run_game(&mut controllers)?;
    Ok(result)
}

fn run_simulate(
    table: &TableArgs,
    seed: u64,
    verbosity: VerbosityLevel,
    log_format: OutputFormat,
    snapshot: Option<&Path>,
) -> anyhow::Result<()> {
    let (init, seats) = load_table(table)?;
    let mut game = init.init_game(&seats, seed)?;
    game.logger.set_output_mode(OutputMode::Stdout);
    game.logger.set_output_format(log_format);

    println!("=== Grid Tactics - {} players, seed {seed} ===\n", seats.len());
    let result = play(&mut game, seed, table.max_steps, verbosity)?;

    println!();
    match result.winner {
        Some(winner) => {
            let name = game.get_player(winner).map(|p| p.name.to_string())?;
            println!("Winner: {name} (player {winner})");
        }
        None => println!("No winner ({:?})", result.end_reason),
    }
    println!("Rounds: {}  Steps: {}", result.rounds_played, result.steps);
    for (round, winners) in &game.round_winners {
        let ids: Vec<String> = winners.iter().map(|id| id.to_string()).collect();
        println!("  round {round}: {}", ids.join(", "));
    }

    if let Some(path) = snapshot {
        let json = serde_json::to_string_pretty(&game)?;
        std::fs::write(path, json).with_context(|| format!("writing snapshot to {}", path.display()))?;
        println!("Snapshot written to {}", path.display());
    }
    Ok(())
}

fn run_profile(table: &TableArgs, games: u64, seed: u64) -> anyhow::Result<()> {
    println!("=== Grid Tactics - Profiling Mode ===\n");
    let (init, seats) = load_table(table)?;
    println!("Running {games} games from seed {seed}\n");

    let start = std::time::Instant::now();
    let mut finished = 0;
    let mut steps: u64 = 0;
    for i in 0..games {
        let game_seed = seed.wrapping_add(i);
        let mut game = init.init_game(&seats, game_seed)?;
        let result = play(&mut game, game_seed, table.max_steps, VerbosityLevel::Silent)?;
        if result.winner.is_some() {
            finished += 1;
        }
        steps += u64::from(result.steps);

        if (i + 1) % 100 == 0 {
            println!("Completed {} games", i + 1);
        }
    }
    let elapsed = start.elapsed();

    println!();
    println!("{games} games, {finished} with a winner, {steps} steps");
    println!(
        "{:.2}ms per game",
        elapsed.as_secs_f64() * 1000.0 / games.max(1) as f64
    );
    Ok(())
}
