//! Player controller trait and action enumeration
//!
//! The engine's public operations are wrapped as [`PlayerAction`] values so a
//! driver can list what a seat may do right now and apply one choice. The
//! list is built from the same checks the operations perform, so every
//! listed action is accepted when applied to the same state.

use crate::core::{CardId, Coord, PlayerId, StatusKind};
use crate::game::abilities::{self, AbilityTrigger, InputOutcome};
use crate::game::scoring::ScoringLine;
use crate::game::targeting::{self, ModeInput};
use crate::game::zone_moves::{move_item, DragItem, DropTarget, ItemSource, MoveRequest};
use crate::game::{turn, GameState, Phase};
use serde::{Deserialize, Serialize};

/// Available actions a seat can take
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlayerAction {
    /// Put a hand card onto an empty active cell
    PlayCard { card_id: CardId, coord: Coord },

    /// Put a hand card into the announced slot
    Announce { card_id: CardId },

    /// Resolve the announced card's command ability
    ResolveAnnounced,

    ActivateAbility { coord: Coord, trigger: AbilityTrigger },

    /// Feed the active ability mode
    Input(ModeInput),

    CancelMode,

    /// Drag a counter from the panel onto a board card
    PlaceCounter { status: StatusKind, coord: Coord },

    NextPhase,

    /// Finish the scoring step (None skips scoring)
    Score { selection: Option<ScoringLine> },
}

/// Read-only view of game state for controllers
pub struct GameStateView<'a> {
    game: &'a GameState,
    player_id: PlayerId,
}

impl<'a> GameStateView<'a> {
    pub fn new(game: &'a GameState, player_id: PlayerId) -> Self {
        GameStateView { game, player_id }
    }

    pub fn player_id(&self) -> PlayerId {
        self.player_id
    }

    pub fn game(&self) -> &GameState {
        self.game
    }

    pub fn score(&self) -> i32 {
        self.game.player(self.player_id).map_or(0, |p| p.score)
    }

    pub fn hand_size(&self) -> usize {
        self.game.player(self.player_id).map_or(0, |p| p.hand.len())
    }

    /// Board positions of this seat's cards
    pub fn board_cards(&self) -> Vec<Coord> {
        self.game
            .board
            .cards()
            .filter(|(_, c)| c.owner == self.player_id)
            .map(|(coord, _)| coord)
            .collect()
    }

    pub fn is_active(&self) -> bool {
        self.game.active_turn_player_id == self.player_id
    }
}

/// Player controller trait
///
/// Implement this trait to create AI players or connect to a UI.
pub trait PlayerController {
    /// Seat this controller acts for
    fn player_id(&self) -> PlayerId;

    /// Choose one of the available actions, or None to do nothing
    fn choose_action(
        &mut self,
        view: &GameStateView,
        available_actions: &[PlayerAction],
    ) -> Option<PlayerAction>;

    /// Called when the game ends
    fn on_game_end(&mut self, _view: &GameStateView, _won: bool) {}
}

/// Who must act next: the mode's controller while a mode is open, otherwise
/// the seat controlling the active player
pub fn acting_player(state: &GameState) -> PlayerId {
    match &state.ability_mode {
        Some(mode) => mode.source.controller,
        None => {
            let active = state.active_turn_player_id;
            match (state.player(active), state.host_player_id) {
                (Some(p), Some(host)) if p.is_dummy => host,
                _ => active,
            }
        }
    }
}

/// Everything `player` may do right now
pub fn legal_actions(state: &GameState, player: PlayerId) -> Vec<PlayerAction> {
    if state.is_game_over() {
        return Vec::new();
    }

    if let Some(mode) = &state.ability_mode {
        if player != mode.source.controller && !state.can_control(player, mode.source.owner) {
            return Vec::new();
        }
        let mut actions: Vec<PlayerAction> = targeting::mode_inputs(state)
            .into_iter()
            .map(PlayerAction::Input)
            .collect();
        actions.push(PlayerAction::CancelMode);
        return actions;
    }

    let active = state.active_turn_player_id;
    if !state.can_control(player, active) {
        return Vec::new();
    }

    if state.is_scoring_step {
        let mut actions: Vec<PlayerAction> = turn::scoring_options(state)
            .into_iter()
            .map(|line| PlayerAction::Score {
                selection: Some(line),
            })
            .collect();
        actions.push(PlayerAction::Score { selection: None });
        return actions;
    }

    let mut actions = vec![PlayerAction::NextPhase];

    let counters = state.content.counter_statuses();
    for (coord, card) in state.board.cards() {
        for status in &counters {
            if targeting::accepts_status(state, card, *status) {
                actions.push(PlayerAction::PlaceCounter {
                    status: *status,
                    coord,
                });
            }
        }
        if card.owner != active {
            continue;
        }
        for trigger in [AbilityTrigger::Deploy, AbilityTrigger::Setup, AbilityTrigger::Commit] {
            if abilities::check_activation(state, coord, trigger).is_ok() {
                actions.push(PlayerAction::ActivateAbility { coord, trigger });
            }
        }
    }

    if state.current_phase == Phase::Main {
        if let Some(seat) = state.player(active) {
            let empty = state.board.empty_cells();
            for card in seat.hand.iter() {
                let is_command = state
                    .definition(card)
                    .is_some_and(|d| d.abilities.get(AbilityTrigger::Command).is_some());
                if is_command {
                    if seat.announced.is_none() {
                        actions.push(PlayerAction::Announce { card_id: card.id });
                    }
                } else {
                    actions.extend(empty.iter().map(|coord| PlayerAction::PlayCard {
                        card_id: card.id,
                        coord: *coord,
                    }));
                }
            }
            if abilities::check_announced(state, player).is_ok() {
                actions.push(PlayerAction::ResolveAnnounced);
            }
        }
    }
    actions
}

/// Apply `action` for `player`; returns whether the state accepted it
pub fn apply_action(state: &mut GameState, player: PlayerId, action: &PlayerAction) -> bool {
    match action {
        PlayerAction::PlayCard { card_id, coord } => {
            let owner = state.active_turn_player_id;
            move_item(
                state,
                MoveRequest::manual(
                    player,
                    DragItem::Card {
                        card_id: *card_id,
                        source: ItemSource::Hand { player: owner },
                    },
                    DropTarget::Board { coord: *coord },
                ),
            )
            .is_moved()
        }
        PlayerAction::Announce { card_id } => {
            let owner = state.active_turn_player_id;
            move_item(
                state,
                MoveRequest::manual(
                    player,
                    DragItem::Card {
                        card_id: *card_id,
                        source: ItemSource::Hand { player: owner },
                    },
                    DropTarget::Announced { player: owner },
                ),
            )
            .is_moved()
        }
        PlayerAction::ResolveAnnounced => abilities::resolve_announced(state, player).is_ok(),
        PlayerAction::ActivateAbility { coord, trigger } => {
            abilities::activate_ability(state, player, *coord, *trigger).is_ok()
        }
        PlayerAction::Input(input) => !matches!(
            abilities::apply_input(state, player, *input),
            InputOutcome::Rejected(_)
        ),
        PlayerAction::CancelMode => abilities::cancel_mode(state, player) == InputOutcome::Cancelled,
        PlayerAction::PlaceCounter { status, coord } => move_item(
            state,
            MoveRequest::manual(
                player,
                DragItem::Counter {
                    status: *status,
                    count: 1,
                },
                DropTarget::Board { coord: *coord },
            ),
        )
        .is_moved(),
        PlayerAction::NextPhase => {
            if !state.can_control(player, state.active_turn_player_id) {
                return false;
            }
            turn::next_phase(state)
        }
        PlayerAction::Score { selection } => turn::resolve_scoring(state, player, *selection).is_some(),
    }
}
