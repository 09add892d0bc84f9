//! Game loop
//!
//! Asks the seat that must act for a choice among its legal actions and
//! applies it, until a player wins the game or the step budget runs out.

use crate::core::PlayerId;
use crate::game::controller::{acting_player, apply_action, legal_actions, GameStateView, PlayerController};
use crate::game::{GameState, VerbosityLevel};
use crate::{EngineError, Result};
use serde::{Deserialize, Serialize};

/// Result of a game
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameResult {
    /// Winner of the game (None if it did not finish)
    pub winner: Option<PlayerId>,
    /// Rounds started, including the one in progress
    pub rounds_played: u32,
    /// Controller decisions applied
    pub steps: u32,
    pub end_reason: GameEndReason,
}

/// Reason the game ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameEndReason {
    /// A player collected enough round wins
    RoundWins(PlayerId),
    /// The step budget ran out
    StepLimit,
    /// The acting seat had nothing to do or declined to act
    Stalled,
}

/// Game loop manager
pub struct GameLoop<'a> {
    pub game: &'a mut GameState,
    /// Decisions allowed before giving up
    max_steps: u32,
    steps: u32,
}

impl<'a> GameLoop<'a> {
    pub fn new(game: &'a mut GameState) -> Self {
        GameLoop {
            game,
            max_steps: 100_000,
            steps: 0,
        }
    }

    pub fn with_max_steps(mut self, max_steps: u32) -> Self {
        self.max_steps = max_steps;
        self
    }

    /// Set verbosity on the game's logger
    pub fn with_verbosity(mut self, verbosity: VerbosityLevel) -> Self {
        self.game.logger.set_verbosity(verbosity);
        self
    }

    /// Run until the game ends, the budget runs out, or a seat stalls
    ///
    /// Every seat that may have to act needs a controller.
    pub fn run_game(&mut self, controllers: &mut [Box<dyn PlayerController>]) -> Result<GameResult> {
        for id in self.game.player_ids() {
            let dummy = self.game.player(id).is_some_and(|p| p.is_dummy);
            if !dummy && !controllers.iter().any(|c| c.player_id() == id) {
                return Err(EngineError::EntityNotFound(id.as_u32()));
            }
        }

        let result = loop {
            if let Some(winner) = self.game.game_winner {
                break self.result(Some(winner), GameEndReason::RoundWins(winner));
            }
            if self.steps >= self.max_steps {
                break self.result(None, GameEndReason::StepLimit);
            }
            if !self.step(controllers)? {
                break self.result(None, GameEndReason::Stalled);
            }
        };

        log_if_verbose!(
            self.game.logger,
            Minimal,
            "game",
            "game over after {} steps: {:?}",
            result.steps,
            result.end_reason
        );
        for controller in controllers.iter_mut() {
            let id = controller.player_id();
            let view = GameStateView::new(self.game, id);
            controller.on_game_end(&view, result.winner == Some(id));
        }
        Ok(result)
    }

    /// One decision by the acting seat; false if it could not act
    pub fn step(&mut self, controllers: &mut [Box<dyn PlayerController>]) -> Result<bool> {
        let actor = acting_player(self.game);
        let controller = controllers
            .iter_mut()
            .find(|c| c.player_id() == actor)
            .ok_or(EngineError::EntityNotFound(actor.as_u32()))?;

        let actions = legal_actions(self.game, actor);
        let view = GameStateView::new(self.game, actor);
        let Some(action) = controller.choose_action(&view, &actions) else {
            return Ok(false);
        };

        self.steps += 1;
        if !apply_action(self.game, actor, &action) {
            log_if_verbose!(
                self.game.logger,
                Verbose,
                "game",
                "player {} action {:?} was rejected",
                actor,
                action
            );
            return Ok(false);
        }
        Ok(true)
    }

    fn result(&self, winner: Option<PlayerId>, end_reason: GameEndReason) -> GameResult {
        GameResult {
            winner,
            rounds_played: self.game.current_round,
            steps: self.steps,
            end_reason,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RulesConfig;
    use crate::core::EntityId;
    use crate::game::random_controller::RandomController;
    use crate::loader::CardDatabase;
    use std::sync::Arc;

    fn controllers(seed: u64) -> Vec<Box<dyn PlayerController>> {
        vec![
            Box::new(RandomController::with_seed(EntityId::new(1), seed)),
            Box::new(RandomController::with_seed(EntityId::new(2), seed + 1)),
        ]
    }

    #[test]
    fn test_missing_controller_is_an_error() {
        let mut game = GameState::new(&["A", "B"], RulesConfig::default(), Arc::new(CardDatabase::new()));
        let mut only_one: Vec<Box<dyn PlayerController>> =
            vec![Box::new(RandomController::with_seed(EntityId::new(1), 1))];
        assert!(GameLoop::new(&mut game).run_game(&mut only_one).is_err());
    }

    #[test]
    fn test_step_limit() {
        let mut game = GameState::new(&["A", "B"], RulesConfig::default(), Arc::new(CardDatabase::new()));
        let result = GameLoop::new(&mut game)
            .with_max_steps(10)
            .run_game(&mut controllers(3))
            .unwrap();
        assert_eq!(result.end_reason, GameEndReason::StepLimit);
        assert_eq!(result.steps, 10);
        assert_eq!(result.winner, None);
    }
}
