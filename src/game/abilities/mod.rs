//! Ability declarations and their resolution

pub mod action;
pub mod context;
pub mod effects;
pub mod engine;

pub use action::{
    AbilityAction, AbilitySource, AbilityTrigger, ActionKind, ActiveMode, AutoEffect, CellEffect,
    CompositeAction, Count, DiagonalBonus, ModalSpec, ModeKind, ModeSpec, OwnerFilter, TargetFilter,
};
pub use context::{CommandContext, ContextCard};
pub use engine::{
    abandon_active, activate_ability, apply_input, cancel_mode, check_activation, check_announced, choose_search_result,
    execute_action, resolve_announced, select_cell, select_hand_card, select_line,
    ActivationRejection, InputOutcome, InputRejection,
};
