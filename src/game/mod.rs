//! Game state, rule engines and turn structure

/// Log through a [`GameLogger`] only when the `verbose-logging` feature is on
///
/// Without the feature the arguments are never formatted.
macro_rules! log_if_verbose {
    ($logger:expr, $level:ident, $cat:expr, $($arg:tt)*) => {
        #[cfg(feature = "verbose-logging")]
        {
            $logger.log_args($crate::game::VerbosityLevel::$level, Some($cat), format_args!($($arg)*));
        }
        #[cfg(not(feature = "verbose-logging"))]
        {
            let _ = &$logger;
        }
    };
}

pub mod abilities;
pub mod controller;
pub mod events;
pub mod game_loop;
pub mod logger;
pub mod phase;
pub mod random_controller;
pub mod readiness;
pub mod scoring;
pub mod state;
pub mod status_engine;
pub mod targeting;
pub mod turn;
pub mod zone_moves;

pub use controller::{GameStateView, PlayerAction, PlayerController};
pub use events::GameEvent;
pub use game_loop::{GameEndReason, GameLoop, GameResult};
pub use logger::{GameLogger, LogEntry, OutputFormat, OutputMode, VerbosityLevel};
pub use phase::Phase;
pub use random_controller::RandomController;
pub use scoring::ScoringLine;
pub use state::{CardLocation, GameState};
pub use targeting::ModeInput;
pub use zone_moves::{DragItem, DropTarget, ItemSource, MoveOutcome, MoveRejection, MoveRequest};
