//! Ability resolution engine
//!
//! Runs an ability's action chain one step at a time. Instant steps apply
//! and fall through to their continuation. A step that needs player input
//! parks the continuation in the game's single [`ActiveMode`] and returns;
//! the input handlers below resume the chain once the mode finishes.
//!
//! A step with nothing to act on emits a `NoTarget` event and the chain
//! carries on with its continuation. Every top-level invocation ends with
//! the completion sentinel, which refreshes readiness markers and discards
//! an announced command card.

use crate::core::{CardId, Coord, PlayerId, StatusKind};
use crate::game::abilities::{
    effects, AbilityAction, AbilitySource, AbilityTrigger, ActionKind, ActiveMode, CompositeAction,
    ModeKind,
};
use crate::game::targeting::{self, ModeInput};
use crate::game::zone_moves::{move_item, spawn_card, swap_cells, DragItem, DropTarget, ItemSource, MoveRequest};
use crate::game::{readiness, scoring, status_engine, GameEvent, GameState};
use crate::zones::Zone;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Why an ability could not be activated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum ActivationRejection {
    #[error("the game is over")]
    GameOver,
    #[error("the scoring step is in progress")]
    ScoringStep,
    #[error("no card at that cell")]
    NoCard,
    #[error("the card has no ability for that trigger")]
    NoAbility,
    #[error("the ability cannot be used in this phase")]
    WrongPhase,
    #[error("the ability was already used this phase")]
    AlreadyUsed,
    #[error("the deploy window has passed")]
    DeployExpired,
    #[error("the card is stunned")]
    Stunned,
    #[error("the card's owner is not the active player")]
    NotActivePlayer,
    #[error("the actor does not control this card")]
    NotController,
    #[error("no announced card")]
    NothingAnnounced,
}

/// Why an ability-mode input was refused
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum InputRejection {
    #[error("no ability mode is active")]
    NoActiveMode,
    #[error("the actor does not control the running ability")]
    NotController,
    #[error("the active mode does not take that kind of input")]
    WrongInput,
    #[error("not a legal target")]
    IllegalTarget,
}

/// Result of feeding an input to the active mode
#[must_use]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputOutcome {
    Accepted,
    /// The mode was abandoned and its continuation dropped
    Cancelled,
    Rejected(InputRejection),
}

impl InputOutcome {
    pub fn is_accepted(&self) -> bool {
        matches!(self, InputOutcome::Accepted)
    }
}

/// Can the ability on the card at `coord` fire for `trigger` right now?
///
/// Returns the declared action. Controller checks are left to the caller,
/// so readiness markers use this directly.
pub fn check_activation(
    state: &GameState,
    coord: Coord,
    trigger: AbilityTrigger,
) -> Result<AbilityAction, ActivationRejection> {
    if state.is_game_over() {
        return Err(ActivationRejection::GameOver);
    }
    if state.is_scoring_step {
        return Err(ActivationRejection::ScoringStep);
    }
    let card = state.board.get(coord).ok_or(ActivationRejection::NoCard)?;
    let action = state
        .definition(card)
        .and_then(|d| d.abilities.get(trigger))
        .ok_or(ActivationRejection::NoAbility)?;

    match trigger {
        AbilityTrigger::Command => return Err(ActivationRejection::WrongPhase),
        AbilityTrigger::Deploy => {
            if !card.entered_this_turn || card.deploy_ability_consumed {
                return Err(ActivationRejection::DeployExpired);
            }
        }
        AbilityTrigger::Setup | AbilityTrigger::Commit => {
            if trigger.phase() != Some(state.current_phase) {
                return Err(ActivationRejection::WrongPhase);
            }
        }
    }
    if card.ability_used_in_phase == Some(state.current_phase) {
        return Err(ActivationRejection::AlreadyUsed);
    }
    if card.is_stunned() {
        return Err(ActivationRejection::Stunned);
    }
    if card.owner != state.active_turn_player_id {
        return Err(ActivationRejection::NotActivePlayer);
    }
    Ok(action.clone())
}

/// Activate the board card's ability for `trigger` on behalf of `actor`
///
/// Any active mode is replaced. Nothing changes on rejection.
pub fn activate_ability(
    state: &mut GameState,
    actor: PlayerId,
    coord: Coord,
    trigger: AbilityTrigger,
) -> Result<(), ActivationRejection> {
    let action = check_activation(state, coord, trigger)?;
    let (card_id, owner) = state
        .board
        .get(coord)
        .map(|c| (c.id, c.owner))
        .ok_or(ActivationRejection::NoCard)?;
    if !state.can_control(actor, owner) {
        return Err(ActivationRejection::NotController);
    }

    let phase = state.current_phase;
    if let Some(card) = state.board.get_mut(coord) {
        card.ability_used_in_phase = Some(phase);
        if trigger == AbilityTrigger::Deploy {
            card.deploy_ability_consumed = true;
        }
    }
    abandon_active(state);
    state.context.clear();

    log_if_verbose!(
        state.logger,
        Normal,
        "ability",
        "player {} activates {:?} ability of card {} at {}",
        actor,
        trigger,
        card_id,
        coord
    );

    let source = AbilitySource {
        card_id,
        coord: Some(coord),
        owner,
        controller: actor,
        trigger,
    };
    execute_action(state, action.with_completion(), source);
    Ok(())
}

/// Can `actor` resolve the active player's announced card now?
///
/// Returns the card and its command action.
pub fn check_announced(
    state: &GameState,
    actor: PlayerId,
) -> Result<(CardId, AbilityAction), ActivationRejection> {
    if state.is_game_over() {
        return Err(ActivationRejection::GameOver);
    }
    if state.is_scoring_step {
        return Err(ActivationRejection::ScoringStep);
    }
    if !state.current_phase.allows_deployment() {
        return Err(ActivationRejection::WrongPhase);
    }
    let owner = state.active_turn_player_id;
    if !state.can_control(actor, owner) {
        return Err(ActivationRejection::NotController);
    }
    let card = state
        .player(owner)
        .and_then(|p| p.announced.as_ref())
        .ok_or(ActivationRejection::NothingAnnounced)?;
    let action = state
        .definition(card)
        .and_then(|d| d.abilities.get(AbilityTrigger::Command))
        .cloned()
        .ok_or(ActivationRejection::NoAbility)?;
    Ok((card.id, action))
}

/// Resolve the active player's announced command card
pub fn resolve_announced(state: &mut GameState, actor: PlayerId) -> Result<(), ActivationRejection> {
    let (card_id, action) = check_announced(state, actor)?;
    let owner = state.active_turn_player_id;
    if state
        .ability_mode
        .as_ref()
        .is_some_and(|mode| mode.source.card_id == card_id)
    {
        return Err(ActivationRejection::AlreadyUsed);
    }

    abandon_active(state);
    state.context.clear();
    log_if_verbose!(
        state.logger,
        Normal,
        "ability",
        "player {} resolves announced card {}",
        actor,
        card_id
    );

    let source = AbilitySource {
        card_id,
        coord: None,
        owner,
        controller: actor,
        trigger: AbilityTrigger::Command,
    };
    execute_action(state, action.with_completion(), source);
    Ok(())
}

/// Run a chain until it completes or parks in a mode
pub fn execute_action(state: &mut GameState, action: AbilityAction, source: AbilitySource) {
    let mut next = Some(action);
    while let Some(step) = next.take() {
        if !targeting::has_legal_targets(&step, state, &source, &state.context) {
            report_no_target(state, &source);
            next = step.chained.map(|c| *c);
            continue;
        }

        let AbilityAction { kind, chained } = step;
        let chained = match &kind {
            ActionKind::AbilityComplete => {
                complete(state, &source);
                chained
            }
            ActionKind::GlobalAutoApply { effect } => {
                effects::apply_auto_effect(state, effect, &source);
                chained
            }
            ActionKind::Composite { composite } => {
                apply_composite_first(state, composite, &source);
                match begin_mode(state, &kind, &source, chained) {
                    Ok(()) => return,
                    Err(chained) => {
                        report_no_target(state, &source);
                        chained
                    }
                }
            }
            ActionKind::CreateStack { .. } | ActionKind::EnterMode { .. } | ActionKind::OpenModal { .. } => {
                match begin_mode(state, &kind, &source, chained) {
                    Ok(()) => return,
                    Err(chained) => {
                        report_no_target(state, &source);
                        chained
                    }
                }
            }
        };
        next = chained.map(|c| *c);
    }
}

/// Park the continuation in a new mode; hands it back if the mode has no targets
fn begin_mode(
    state: &mut GameState,
    kind: &ActionKind,
    source: &AbilitySource,
    chained: Option<Box<AbilityAction>>,
) -> Result<(), Option<Box<AbilityAction>>> {
    match targeting::mode_for(state, kind, source) {
        Some(mut mode) if targeting::mode_has_targets(state, &mode) => {
            log_if_verbose!(
                state.logger,
                Verbose,
                "ability",
                "card {} enters mode {:?}",
                source.card_id,
                mode.kind
            );
            mode.chained = chained;
            state.ability_mode = Some(mode);
            Ok(())
        }
        _ => Err(chained),
    }
}

fn apply_composite_first(state: &mut GameState, composite: &CompositeAction, source: &AbilitySource) {
    match composite {
        CompositeAction::ShieldSelfThenPush { .. } => {
            if let Some(coord) = targeting::source_coord(state, source) {
                effects::add_status(state, coord, StatusKind::Shield, 1, source.owner);
            }
        }
        CompositeAction::GainScoreThenSelectCell { amount, .. } => {
            if let Some(player) = state.player_mut(source.owner) {
                player.add_score(*amount);
            }
            state.push_event(GameEvent::Scored {
                player: source.owner,
                amount: *amount,
            });
        }
    }
    status_engine::recalculate(state);
}

fn report_no_target(state: &mut GameState, source: &AbilitySource) {
    let coord = targeting::source_coord(state, source);
    state.push_event(GameEvent::NoTarget {
        player: source.controller,
        coord,
    });
    log_if_verbose!(
        state.logger,
        Verbose,
        "ability",
        "card {} step has no target",
        source.card_id
    );
}

/// End-of-invocation bookkeeping
fn complete(state: &mut GameState, source: &AbilitySource) {
    state.push_event(GameEvent::AbilityComplete {
        player: source.controller,
        card_id: source.card_id,
    });
    if source.trigger == AbilityTrigger::Command {
        discard_announced(state, source);
    }
    state.context.clear();
    readiness::refresh(state);
    log_if_verbose!(
        state.logger,
        Verbose,
        "ability",
        "ability of card {} complete",
        source.card_id
    );
}

fn discard_announced(state: &mut GameState, source: &AbilitySource) {
    let request = MoveRequest::system(
        source.controller,
        DragItem::Card {
            card_id: source.card_id,
            source: ItemSource::Announced {
                player: source.owner,
            },
        },
        DropTarget::Discard {
            player: source.owner,
        },
    );
    if !move_item(state, request).is_moved() {
        log_if_verbose!(
            state.logger,
            Verbose,
            "ability",
            "announced card {} already left the slot",
            source.card_id
        );
    }
}

/// Close the active mode and run its continuation
fn finish_mode(state: &mut GameState) {
    if let Some(mode) = state.ability_mode.take() {
        resume(state, mode.source, mode.chained);
    }
}

fn resume(state: &mut GameState, source: AbilitySource, chained: Option<Box<AbilityAction>>) {
    state.ability_mode = None;
    if let Some(next) = chained {
        execute_action(state, *next, source);
    }
}

/// The active mode, if `actor` may drive it
fn authorize(state: &GameState, actor: PlayerId) -> Result<ActiveMode, InputRejection> {
    let mode = state
        .ability_mode
        .as_ref()
        .ok_or(InputRejection::NoActiveMode)?;
    if actor != mode.source.controller && !state.can_control(actor, mode.source.owner) {
        return Err(InputRejection::NotController);
    }
    Ok(mode.clone())
}

/// Abandon the active mode
///
/// The continuation is dropped; completion bookkeeping still runs.
pub fn cancel_mode(state: &mut GameState, actor: PlayerId) -> InputOutcome {
    if let Err(reason) = authorize(state, actor) {
        return InputOutcome::Rejected(reason);
    }
    abandon(state)
}

fn abandon(state: &mut GameState) -> InputOutcome {
    abandon_active(state);
    InputOutcome::Cancelled
}

/// Drop the active mode, if any, without running its continuation
///
/// The invocation still completes, so an announced command leaves its slot.
pub fn abandon_active(state: &mut GameState) {
    if let Some(mode) = state.ability_mode.take() {
        log_if_verbose!(
            state.logger,
            Verbose,
            "ability",
            "mode {:?} of card {} cancelled",
            mode.kind,
            mode.source.card_id
        );
        complete(state, &mode.source);
    }
}

fn takes_cells(kind: &ModeKind) -> bool {
    matches!(
        kind,
        ModeKind::CursorStack { .. }
            | ModeKind::SelectCell { .. }
            | ModeKind::Push { .. }
            | ModeKind::Swap { .. }
            | ModeKind::Transfer { .. }
            | ModeKind::Spawn { .. }
    )
}

/// Pick a board cell for the active mode
///
/// Picking the ability's own card when it is not a legal target cancels
/// the mode.
pub fn select_cell(state: &mut GameState, actor: PlayerId, coord: Coord) -> InputOutcome {
    let mode = match authorize(state, actor) {
        Ok(mode) => mode,
        Err(reason) => return InputOutcome::Rejected(reason),
    };
    if !takes_cells(&mode.kind) {
        return InputOutcome::Rejected(InputRejection::WrongInput);
    }
    if !targeting::cell_is_legal(state, &mode, coord) {
        if targeting::source_coord(state, &mode.source) == Some(coord) {
            return abandon(state);
        }
        return InputOutcome::Rejected(InputRejection::IllegalTarget);
    }

    let ActiveMode {
        kind,
        source,
        chained,
    } = mode;
    let owner = source.owner;
    let target_id = state.board.get(coord).map(|c| c.id);
    if let Some(id) = target_id {
        state.context.record_target(id, coord);
    }

    match kind {
        ModeKind::CursorStack {
            token,
            remaining,
            filter,
            distinct,
            mut placed,
        } => {
            effects::add_status(state, coord, token, 1, owner);
            status_engine::recalculate(state);
            placed.extend(target_id);
            let remaining = remaining.saturating_sub(1);
            let next = ActiveMode {
                kind: ModeKind::CursorStack {
                    token,
                    remaining,
                    filter,
                    distinct,
                    placed,
                },
                source,
                chained,
            };
            let more = remaining > 0 && targeting::mode_has_targets(state, &next);
            state.ability_mode = Some(next);
            if !more {
                finish_mode(state);
            }
            return InputOutcome::Accepted;
        }
        ModeKind::SelectCell { effect, .. } => {
            effects::apply_cell_effect(state, &effect, &source, coord);
        }
        ModeKind::Push { filter } => {
            if let (Some(dest), Some(card_id)) = (
                targeting::push_destination(state, &source, coord, &filter),
                target_id,
            ) {
                let request = MoveRequest::system(
                    source.controller,
                    DragItem::Card {
                        card_id,
                        source: ItemSource::Board { coord },
                    },
                    DropTarget::Board { coord: dest },
                );
                if !move_item(state, request).is_moved() {
                    log_if_verbose!(state.logger, Verbose, "ability", "push from {} failed", coord);
                }
            }
        }
        ModeKind::Swap { .. } => {
            if let Some(origin) = targeting::source_coord(state, &source) {
                // Target cell first, so the moved target card ends up as the context card
                swap_cells(state, coord, origin);
            }
        }
        ModeKind::Transfer {
            status,
            filter,
            from: None,
        } => {
            state.ability_mode = Some(ActiveMode {
                kind: ModeKind::Transfer {
                    status,
                    filter,
                    from: target_id,
                },
                source,
                chained,
            });
            return InputOutcome::Accepted;
        }
        ModeKind::Transfer {
            status,
            from: Some(from),
            ..
        } => {
            effects::transfer_status(state, from, coord, status);
        }
        ModeKind::Spawn { token, .. } => {
            if spawn_card(state, &token, owner, coord).is_none() {
                log_if_verbose!(state.logger, Verbose, "ability", "spawn of {} failed", token);
            }
        }
        ModeKind::SelectLine { .. }
        | ModeKind::SelectDiagonal { .. }
        | ModeKind::RevealHand { .. }
        | ModeKind::Search { .. } => return InputOutcome::Rejected(InputRejection::WrongInput),
    }

    resume(state, source, chained);
    InputOutcome::Accepted
}

/// Pick a row, column or diagonal for a scoring mode
pub fn select_line(state: &mut GameState, actor: PlayerId, from: Coord, to: Coord) -> InputOutcome {
    let mode = match authorize(state, actor) {
        Ok(mode) => mode,
        Err(reason) => return InputOutcome::Rejected(reason),
    };
    let owner = mode.source.owner;
    match mode.kind {
        ModeKind::SelectLine { .. } | ModeKind::SelectDiagonal { .. } => {}
        _ => return InputOutcome::Rejected(InputRejection::WrongInput),
    }
    if targeting::line_cells(state, &mode, from, to).is_none() {
        return InputOutcome::Rejected(InputRejection::IllegalTarget);
    }
    let scored = match mode.kind {
        ModeKind::SelectDiagonal { bonus } => scoring::score_diagonal(state, from, to, owner, bonus),
        _ => scoring::score_line(state, from, to, owner),
    };
    log_if_verbose!(
        state.logger,
        Verbose,
        "ability",
        "line {} -> {} scored {:?}",
        from,
        to,
        scored
    );
    finish_mode(state);
    InputOutcome::Accepted
}

/// Reveal one card from an opponent's hand
pub fn select_hand_card(
    state: &mut GameState,
    actor: PlayerId,
    player: PlayerId,
    card_id: CardId,
) -> InputOutcome {
    let mode = match authorize(state, actor) {
        Ok(mode) => mode,
        Err(reason) => return InputOutcome::Rejected(reason),
    };
    let ModeKind::RevealHand { remaining } = mode.kind else {
        return InputOutcome::Rejected(InputRejection::WrongInput);
    };
    if !targeting::hand_card_is_legal(state, &mode, player, card_id) {
        return InputOutcome::Rejected(InputRejection::IllegalTarget);
    }

    let owner = mode.source.owner;
    if let Some(card) = state.player_mut(player).and_then(|p| p.hand.get_mut(card_id)) {
        card.statuses.push(StatusKind::Revealed, owner);
        card.revealed_to.reveal_to(owner);
    }
    log_if_verbose!(
        state.logger,
        Normal,
        "ability",
        "player {} reveals card {} from player {}'s hand",
        owner,
        card_id,
        player
    );

    let next = ActiveMode {
        kind: ModeKind::RevealHand {
            remaining: remaining.saturating_sub(1),
        },
        ..mode
    };
    let more = remaining > 1 && targeting::mode_has_targets(state, &next);
    state.ability_mode = Some(next);
    if !more {
        finish_mode(state);
    }
    InputOutcome::Accepted
}

/// Take a card from the search modal, or nothing
pub fn choose_search_result(state: &mut GameState, actor: PlayerId, card_id: Option<CardId>) -> InputOutcome {
    let mode = match authorize(state, actor) {
        Ok(mode) => mode,
        Err(reason) => return InputOutcome::Rejected(reason),
    };
    let ModeKind::Search { zone, .. } = mode.kind else {
        return InputOutcome::Rejected(InputRejection::WrongInput);
    };
    if !targeting::search_is_legal(state, &mode, card_id) {
        return InputOutcome::Rejected(InputRejection::IllegalTarget);
    }

    let owner = mode.source.owner;
    if let Some(card_id) = card_id {
        let source = match zone {
            Zone::Discard => ItemSource::Discard { player: owner },
            _ => ItemSource::Deck { player: owner },
        };
        let request = MoveRequest::system(
            mode.source.controller,
            DragItem::Card { card_id, source },
            DropTarget::Hand { player: owner },
        );
        if !move_item(state, request).is_moved() {
            log_if_verbose!(state.logger, Verbose, "ability", "search take of {} failed", card_id);
        }
    }
    if zone == Zone::Deck {
        state.shuffle_deck(owner);
    }
    finish_mode(state);
    InputOutcome::Accepted
}

/// Dispatch a legal-input value to the matching handler
pub fn apply_input(state: &mut GameState, actor: PlayerId, input: ModeInput) -> InputOutcome {
    match input {
        ModeInput::Cell { coord } => select_cell(state, actor, coord),
        ModeInput::Line { from, to } => select_line(state, actor, from, to),
        ModeInput::HandCard { player, card_id } => select_hand_card(state, actor, player, card_id),
        ModeInput::SearchResult { card_id } => choose_search_result(state, actor, card_id),
    }
}
