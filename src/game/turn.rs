//! Turn and round state machine
//!
//! Setup -> Main -> Commit -> scoring step -> next player's Setup. Round end
//! is only evaluated when rotation returns to the starting player.

use crate::core::{Coord, PlayerId, StatusKind};
use crate::game::abilities::abandon_active;
use crate::game::scoring::{self, ScoringLine};
use crate::game::{readiness, status_engine, GameEvent, GameState, Phase, VerbosityLevel};
use smallvec::SmallVec;

/// Advance to the next phase, or into the scoring step after Commit
///
/// Returns false (and changes nothing) during the scoring step or once the
/// game has a winner.
pub fn next_phase(state: &mut GameState) -> bool {
    if state.is_scoring_step || state.is_game_over() {
        return false;
    }
    abandon_active(state);
    state.context.clear();
    apply_resurrection_stun(state);

    match state.current_phase.next() {
        Some(phase) => state.current_phase = phase,
        None => state.is_scoring_step = true,
    }

    status_engine::recalculate(state);
    readiness::refresh(state);
    log_if_verbose!(
        state.logger,
        Normal,
        "turn",
        "player {} {}",
        state.active_turn_player_id,
        if state.is_scoring_step {
            "enters scoring".to_string()
        } else {
            format!("enters {}", state.current_phase)
        }
    );
    true
}

/// Resurrected cards lose the tag at a phase boundary and are stunned
fn apply_resurrection_stun(state: &mut GameState) {
    let stun = state.config.resurrection_stun;
    for coord in state.board.occupied() {
        let Some(card) = state.board.get(coord) else {
            continue;
        };
        if !card.has_status(StatusKind::Resurrected) {
            continue;
        }
        let immune = state.is_stun_immune(card);
        if let Some(card) = state.board.get_mut(coord) {
            card.statuses.remove_all(StatusKind::Resurrected);
            if !immune {
                let owner = card.owner;
                for _ in 0..stun {
                    card.statuses.push(StatusKind::Stun, owner);
                }
            }
        }
    }
}

/// Position of the active player's LastPlayed card
pub fn last_played_coord(state: &GameState, player: PlayerId) -> Option<Coord> {
    state
        .board
        .cards()
        .find(|(_, c)| c.owner == player && c.has_status(StatusKind::LastPlayed))
        .map(|(coord, _)| coord)
}

/// Can `selection` be scored by the active player right now?
pub fn is_valid_selection(state: &GameState, selection: ScoringLine) -> bool {
    last_played_coord(state, state.active_turn_player_id)
        .is_some_and(|anchor| selection.contains(state, anchor))
}

/// Every distinct selection through the active player's LastPlayed card
pub fn scoring_options(state: &GameState) -> Vec<ScoringLine> {
    let Some(anchor) = last_played_coord(state, state.active_turn_player_id) else {
        return Vec::new();
    };
    let lo = state.board.offset();
    let hi = lo + state.board.active_size() - 1;
    let mut options = vec![
        ScoringLine::Line {
            from: Coord::new(anchor.row, lo),
            to: Coord::new(anchor.row, hi),
        },
        ScoringLine::Line {
            from: Coord::new(lo, anchor.col),
            to: Coord::new(hi, anchor.col),
        },
    ];
    let step = |dr: isize, dc: isize| {
        let row = anchor.row.checked_add_signed(dr)?;
        let col = anchor.col.checked_add_signed(dc)?;
        let to = Coord::new(row, col);
        state.board.in_active(to).then_some(to)
    };
    for (forward, backward) in [((1, 1), (-1, -1)), ((1, -1), (-1, 1))] {
        if let Some(to) = step(forward.0, forward.1).or_else(|| step(backward.0, backward.1)) {
            options.push(ScoringLine::Diagonal { from: anchor, to });
        }
    }
    options
}

/// Resolve the scoring step and hand the turn to the next player
///
/// `selection` is the line or diagonal to score (None skips scoring). It
/// must pass through the active player's LastPlayed card. Returns the
/// points scored, or None if the call was not legal now.
pub fn resolve_scoring(
    state: &mut GameState,
    actor: PlayerId,
    selection: Option<ScoringLine>,
) -> Option<i32> {
    if !state.is_scoring_step || state.is_game_over() {
        return None;
    }
    let active = state.active_turn_player_id;
    if !state.can_control(actor, active) {
        log_if_verbose!(
            state.logger,
            Verbose,
            "turn",
            "player {} cannot resolve scoring for {}",
            actor,
            active
        );
        return None;
    }

    let points = match selection {
        Some(line) => {
            if !is_valid_selection(state, line) {
                log_if_verbose!(
                    state.logger,
                    Verbose,
                    "turn",
                    "selection {:?} does not pass through the last played card",
                    line
                );
                return None;
            }
            scoring::score_selection(state, line, active, None)?
        }
        None => 0,
    };

    strip_stun(state, active);
    state.is_scoring_step = false;
    state.current_phase = Phase::Setup;
    abandon_active(state);
    state.context.clear();
    apply_resurrection_stun(state);

    let next = state.next_player_after(active);
    state.active_turn_player_id = next;

    if next == state.starting_player_id {
        if round_is_over(state) {
            end_round(state);
        } else {
            state.turn_number += 1;
        }
    }

    if !state.is_game_over() {
        begin_turn(state);
    }
    status_engine::recalculate(state);
    readiness::refresh(state);
    Some(points)
}

/// Remove Stun tokens from every card the finishing player owns
fn strip_stun(state: &mut GameState, player: PlayerId) {
    let removal = state.config.scoring_stun_removal;
    for coord in state.board.occupied() {
        if let Some(card) = state.board.get_mut(coord) {
            if card.owner == player {
                for _ in 0..removal {
                    card.statuses.remove_latest(StatusKind::Stun);
                }
            }
        }
    }
}

fn round_is_over(state: &GameState) -> bool {
    let threshold = state.config.round_threshold(state.current_round);
    let reached = state.players.iter().any(|p| p.score >= threshold);
    let out_of_turns = state.current_round == state.config.final_round
        && state.turn_number >= state.config.final_round_turn_limit;
    reached || out_of_turns
}

/// Record round winners, check for a game winner, else start the next round
fn end_round(state: &mut GameState) {
    let round = state.current_round;
    let best = state.players.iter().map(|p| p.score).max().unwrap_or(0);
    let winners: SmallVec<[PlayerId; 4]> = state
        .players
        .iter()
        .filter(|p| p.score == best)
        .map(|p| p.id)
        .collect();

    state.logger.log_args(
        VerbosityLevel::Minimal,
        Some("round"),
        format_args!("round {} won by {:?} with {} points", round, winners, best),
    );
    state.round_winners.insert(round, winners.clone());
    state.push_event(GameEvent::RoundEnded { round, winners });

    if let Some(winner) = decide_game_winner(state) {
        state.game_winner = Some(winner);
        state.push_event(GameEvent::GameWon { winner });
        state.logger.log_args(
            VerbosityLevel::Minimal,
            Some("game"),
            format_args!("player {} wins the game", winner),
        );
        return;
    }

    state.current_round += 1;
    state.turn_number = 1;
    for player in &mut state.players {
        player.score = 0;
    }
}

/// Round wins per player, in turn order
pub fn round_wins(state: &GameState) -> SmallVec<[(PlayerId, u32); 4]> {
    state
        .players
        .iter()
        .map(|p| {
            let wins = state
                .round_winners
                .values()
                .filter(|winners| winners.contains(&p.id))
                .count() as u32;
            (p.id, wins)
        })
        .collect()
}

fn decide_game_winner(state: &GameState) -> Option<PlayerId> {
    let wins = round_wins(state);
    let most = wins.iter().map(|(_, w)| *w).max()?;
    let mut leaders = wins.iter().filter(|(_, w)| *w == most).map(|(id, _)| *id);
    let first = leaders.next()?;
    let unique = leaders.next().is_none();

    if most >= state.config.rounds_to_win && unique {
        return Some(first);
    }
    // Ties after the final round go to the lowest id
    (state.current_round >= state.config.final_round).then_some(first)
}

/// Start the new active player's turn: clear turn flags and draw
fn begin_turn(state: &mut GameState) {
    for coord in state.board.occupied() {
        if let Some(card) = state.board.get_mut(coord) {
            card.clear_turn_flags();
        }
    }
    let active = state.active_turn_player_id;
    let draw = state.config.draw_per_turn;
    state.draw_cards(active, draw);
    log_if_verbose!(
        state.logger,
        Normal,
        "turn",
        "round {} turn {}: player {} to act",
        state.current_round,
        state.turn_number,
        active
    );
}
