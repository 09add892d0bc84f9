//! Rule constants and table setup
//!
//! Every field has a default, so a partial JSON document only overrides
//! what it names.

use crate::{EngineError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Smallest and largest playable window
pub const MIN_GRID_SIZE: usize = 4;
pub const MAX_GRID_SIZE: usize = 7;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RulesConfig {
    /// Full grid edge length
    pub board_size: usize,

    /// Active window size for 2, 3 and 4 players
    pub grid_sizes: [usize; 3],

    /// Explicit active window size (overrides `grid_sizes`)
    pub grid_size_override: Option<usize>,

    pub starting_hand_size: usize,

    /// Cards drawn by the new active player at the start of a turn
    pub draw_per_turn: usize,

    /// Round ends once a score reaches `base + round * step`
    pub round_threshold_base: i32,
    pub round_threshold_step: i32,

    /// Round after which the turn limit also ends the round
    pub final_round: u32,
    pub final_round_turn_limit: u32,

    pub rounds_to_win: u32,

    /// Stun tokens a Resurrected card gains at the next phase boundary
    pub resurrection_stun: usize,

    /// Stun tokens removed from each of the finishing player's cards
    pub scoring_stun_removal: usize,
}

impl Default for RulesConfig {
    fn default() -> Self {
        RulesConfig {
            board_size: MAX_GRID_SIZE,
            grid_sizes: [5, 6, 7],
            grid_size_override: None,
            starting_hand_size: 6,
            draw_per_turn: 1,
            round_threshold_base: 10,
            round_threshold_step: 10,
            final_round: 5,
            final_round_turn_limit: 10,
            rounds_to_win: 2,
            resurrection_stun: 2,
            scoring_stun_removal: 1,
        }
    }
}

impl RulesConfig {
    /// Parse a (possibly partial) JSON config
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: RulesConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a JSON config file
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    pub fn validate(&self) -> Result<()> {
        if !(MIN_GRID_SIZE..=MAX_GRID_SIZE).contains(&self.board_size) {
            return Err(EngineError::InvalidConfig(format!(
                "board_size {} outside {MIN_GRID_SIZE}..={MAX_GRID_SIZE}",
                self.board_size
            )));
        }
        if self.rounds_to_win == 0 {
            return Err(EngineError::InvalidConfig(
                "rounds_to_win must be at least 1".to_string(),
            ));
        }
        if self.final_round == 0 {
            return Err(EngineError::InvalidConfig(
                "final_round must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Active window size for a player count, clamped to 4..=7 and the board
    pub fn active_grid_size(&self, player_count: usize) -> usize {
        let size = self.grid_size_override.unwrap_or_else(|| {
            let idx = player_count.clamp(2, 4) - 2;
            self.grid_sizes[idx]
        });
        size.clamp(MIN_GRID_SIZE, MAX_GRID_SIZE).min(self.board_size)
    }

    /// Score needed to end `round`
    pub fn round_threshold(&self, round: u32) -> i32 {
        self.round_threshold_base + round as i32 * self.round_threshold_step
    }
}
