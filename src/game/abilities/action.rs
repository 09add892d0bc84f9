//! Ability actions and interactive modes
//!
//! Actions are what card content declares; modes are the interactive
//! sub-states an action can leave behind while the engine waits for
//! the player to pick targets. Both are closed sum types so every variant
//! carries exactly the payload it needs.

use crate::core::{CardId, CardType, Coord, DefinitionId, PlayerId, StatusKind};
use crate::game::Phase;
use crate::zones::Zone;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// A declared ability step plus its optional follow-up
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AbilityAction {
    pub kind: ActionKind,

    /// Runs after this step resolves, whether or not this step found targets
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chained: Option<Box<AbilityAction>>,
}

impl AbilityAction {
    pub fn new(kind: ActionKind) -> Self {
        AbilityAction {
            kind,
            chained: None,
        }
    }

    pub fn complete() -> Self {
        AbilityAction::new(ActionKind::AbilityComplete)
    }

    /// Append `next` at the end of this chain
    pub fn then(mut self, next: AbilityAction) -> Self {
        self.append(next);
        self
    }

    fn append(&mut self, next: AbilityAction) {
        match &mut self.chained {
            Some(tail) => tail.append(next),
            None => self.chained = Some(Box::new(next)),
        }
    }

    /// Chain terminated by the completion sentinel (added once)
    pub fn with_completion(self) -> Self {
        if self.ends_with_completion() {
            self
        } else {
            self.then(AbilityAction::complete())
        }
    }

    pub fn ends_with_completion(&self) -> bool {
        match &self.chained {
            Some(next) => next.ends_with_completion(),
            None => self.kind == ActionKind::AbilityComplete,
        }
    }

    /// Number of steps in the chain, sentinel included
    pub fn chain_len(&self) -> usize {
        1 + self.chained.as_ref().map_or(0, |c| c.chain_len())
    }
}

/// Action kinds, tagged with their wire names
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActionKind {
    /// Resolves instantly without player input
    GlobalAutoApply { effect: AutoEffect },

    /// Counted token placement session
    CreateStack {
        token: StatusKind,
        count: Count,
        #[serde(default)]
        filter: TargetFilter,
        /// Each pick must be a different card
        #[serde(default)]
        distinct: bool,
    },

    /// Interactive targeting sub-state
    EnterMode { mode: ModeSpec },

    /// Deferred to the search/retrieve UI
    OpenModal { modal: ModalSpec },

    /// Immediate first effect, then a mode
    Composite { composite: CompositeAction },

    /// End-of-invocation marker; no board effect
    AbilityComplete,
}

/// Dynamic amount, evaluated when the action starts executing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Count {
    Fixed { value: u32 },
    /// Tokens of `status` the actor has placed on board cards
    StatusOnBoard { status: StatusKind },
    /// Actor's cards currently holding Support
    SupportedAllies,
}

impl Count {
    pub fn fixed(value: u32) -> Self {
        Count::Fixed { value }
    }
}

/// Instant effects
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "effect")]
pub enum AutoEffect {
    GainScore { amount: Count },
    DrawCards { count: Count },
    AddStatusToSource { status: StatusKind, count: u32 },
    StatusToAdjacentOpponents { status: StatusKind, count: u32 },
    /// Targets the card a previous chain step moved or picked
    StatusToContextCard { status: StatusKind, count: u32 },
}

/// Whose cards a filter accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum OwnerFilter {
    #[default]
    Any,
    Own,
    Opponent,
}

/// Board target predicate shared by validation and execution
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TargetFilter {
    pub owner: OwnerFilter,
    pub adjacent_to_source: bool,
    pub in_line_with_source: bool,
    pub required_status: Option<StatusKind>,
    pub excluded_status: Option<StatusKind>,
    pub card_type: Option<CardType>,
    /// The ability's own card may be picked
    pub allow_source: bool,
}

impl TargetFilter {
    pub fn opponents() -> Self {
        TargetFilter {
            owner: OwnerFilter::Opponent,
            ..TargetFilter::default()
        }
    }

    pub fn own() -> Self {
        TargetFilter {
            owner: OwnerFilter::Own,
            ..TargetFilter::default()
        }
    }

    pub fn adjacent(mut self) -> Self {
        self.adjacent_to_source = true;
        self
    }

    pub fn in_line(mut self) -> Self {
        self.in_line_with_source = true;
        self
    }

    pub fn requiring(mut self, status: StatusKind) -> Self {
        self.required_status = Some(status);
        self
    }

    pub fn excluding(mut self, status: StatusKind) -> Self {
        self.excluded_status = Some(status);
        self
    }
}

/// Effect applied to a picked board card
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "effect")]
pub enum CellEffect {
    AddStatus { status: StatusKind, count: u32 },
    /// Removes the most recently added entry of that kind
    RemoveStatus { status: StatusKind },
    /// To the owner's discard; a Shield absorbs it instead
    Destroy,
    ReturnToHand,
    ModifyPower { delta: i32 },
}

/// Optional per-Support bonus when scoring a diagonal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum DiagonalBonus {
    Score { per_card: i32 },
    Draw { per_card: u32 },
}

/// Declared interactive modes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ModeSpec {
    SelectCell {
        effect: CellEffect,
        #[serde(default)]
        filter: TargetFilter,
    },
    SelectLine {
        #[serde(default)]
        through_source: bool,
    },
    SelectDiagonal {
        #[serde(default)]
        bonus: Option<DiagonalBonus>,
    },
    /// Move an adjacent card one cell directly away from the source
    Push {
        #[serde(default)]
        filter: TargetFilter,
    },
    /// Source trades places with an adjacent card
    Swap {
        #[serde(default)]
        filter: TargetFilter,
    },
    /// Move one `status` token from one card to another
    Transfer {
        status: StatusKind,
        #[serde(default)]
        filter: TargetFilter,
    },
    /// Reveal opponents' hand cards one pick at a time
    RevealHand { count: Count },
    /// Create a token card in an empty cell
    Spawn {
        token: DefinitionId,
        #[serde(default)]
        adjacent_to_source: bool,
    },
}

/// Search/retrieve modals; the chosen card goes to the actor's hand
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "modal", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ModalSpec {
    SearchDeck {
        #[serde(default)]
        card_type: Option<CardType>,
    },
    RetrieveFromDiscard {
        #[serde(default)]
        card_type: Option<CardType>,
    },
}

impl ModalSpec {
    pub fn zone(&self) -> Zone {
        match self {
            ModalSpec::SearchDeck { .. } => Zone::Deck,
            ModalSpec::RetrieveFromDiscard { .. } => Zone::Discard,
        }
    }

    pub fn card_type(&self) -> Option<CardType> {
        match self {
            ModalSpec::SearchDeck { card_type } | ModalSpec::RetrieveFromDiscard { card_type } => {
                *card_type
            }
        }
    }
}

/// Fixed two-part actions: the first part applies immediately
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "composite", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CompositeAction {
    ShieldSelfThenPush {
        #[serde(default)]
        filter: TargetFilter,
    },
    GainScoreThenSelectCell {
        amount: i32,
        effect: CellEffect,
        #[serde(default)]
        filter: TargetFilter,
    },
}

impl CompositeAction {
    /// The mode entered after the immediate part
    pub fn follow_up(&self) -> ModeSpec {
        match self {
            CompositeAction::ShieldSelfThenPush { filter } => ModeSpec::Push {
                filter: filter.clone(),
            },
            CompositeAction::GainScoreThenSelectCell { effect, filter, .. } => {
                ModeSpec::SelectCell {
                    effect: effect.clone(),
                    filter: filter.clone(),
                }
            }
        }
    }
}

/// When an ability may be activated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AbilityTrigger {
    /// Once after the card enters the board
    Deploy,
    Setup,
    Commit,
    /// Announced command card
    Command,
}

impl AbilityTrigger {
    /// Phase the trigger is restricted to
    pub fn phase(&self) -> Option<Phase> {
        match self {
            AbilityTrigger::Setup => Some(Phase::Setup),
            AbilityTrigger::Commit => Some(Phase::Commit),
            AbilityTrigger::Deploy | AbilityTrigger::Command => None,
        }
    }
}

/// The card and players an ability runs for
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AbilitySource {
    pub card_id: CardId,

    /// Board position at activation (None for announced cards)
    pub coord: Option<Coord>,

    /// Player the effects act for (the card owner, possibly a dummy)
    pub owner: PlayerId,

    /// Player whose inputs drive the ability
    pub controller: PlayerId,

    pub trigger: AbilityTrigger,
}

/// Runtime interactive state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ModeKind {
    CursorStack {
        token: StatusKind,
        remaining: u32,
        filter: TargetFilter,
        distinct: bool,
        placed: SmallVec<[CardId; 4]>,
    },
    SelectCell {
        effect: CellEffect,
        filter: TargetFilter,
    },
    SelectLine {
        through_source: bool,
    },
    SelectDiagonal {
        bonus: Option<DiagonalBonus>,
    },
    Push {
        filter: TargetFilter,
    },
    Swap {
        filter: TargetFilter,
    },
    Transfer {
        status: StatusKind,
        filter: TargetFilter,
        from: Option<CardId>,
    },
    RevealHand {
        remaining: u32,
    },
    Spawn {
        token: DefinitionId,
        adjacent_to_source: bool,
    },
    Search {
        zone: Zone,
        card_type: Option<CardType>,
    },
}

/// The single active ability mode
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveMode {
    pub kind: ModeKind,
    pub source: AbilitySource,
    /// Continuation run when the mode finishes (dropped on cancel)
    pub chained: Option<Box<AbilityAction>>,
}
