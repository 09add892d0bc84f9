//! Random controller for testing and baseline play
//!
//! Picks an action kind uniformly, then one action of that kind. Picking the
//! kind first keeps a long list of card placements from drowning out phase
//! advancement, so random games actually finish.

use crate::core::PlayerId;
use crate::game::controller::{GameStateView, PlayerAction, PlayerController};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha12Rng;
use std::mem::{discriminant, Discriminant};

/// A controller that makes seeded random choices
pub struct RandomController {
    player_id: PlayerId,
    rng: ChaCha12Rng,
}

impl RandomController {
    /// Create a random controller with a seeded RNG (deterministic per seed)
    pub fn with_seed(player_id: PlayerId, seed: u64) -> Self {
        RandomController {
            player_id,
            rng: ChaCha12Rng::seed_from_u64(seed),
        }
    }
}

impl PlayerController for RandomController {
    fn player_id(&self) -> PlayerId {
        self.player_id
    }

    fn choose_action(
        &mut self,
        _view: &GameStateView,
        available_actions: &[PlayerAction],
    ) -> Option<PlayerAction> {
        if available_actions.is_empty() {
            return None;
        }
        let mut kinds: Vec<Discriminant<PlayerAction>> = Vec::new();
        for action in available_actions {
            let kind = discriminant(action);
            if !kinds.contains(&kind) {
                kinds.push(kind);
            }
        }
        let kind = kinds[self.rng.gen_range(0..kinds.len())];
        let of_kind: Vec<&PlayerAction> = available_actions
            .iter()
            .filter(|a| discriminant(*a) == kind)
            .collect();
        Some(of_kind[self.rng.gen_range(0..of_kind.len())].clone())
    }
}
