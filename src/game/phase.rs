//! Turn phases

use serde::{Deserialize, Serialize};
use std::fmt;

/// Phases of a player's turn
///
/// After Commit the turn enters the scoring step (a separate flag on the
/// game state), then control passes to the next player's Setup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Phase {
    Setup = 0,
    Main = 1,
    Commit = 2,
}

impl Phase {
    pub fn index(&self) -> u8 {
        *self as u8
    }

    pub fn from_index(index: u8) -> Option<Phase> {
        match index {
            0 => Some(Phase::Setup),
            1 => Some(Phase::Main),
            2 => Some(Phase::Commit),
            _ => None,
        }
    }

    /// Get the next phase in turn order (None after Commit)
    pub fn next(&self) -> Option<Phase> {
        match self {
            Phase::Setup => Some(Phase::Main),
            Phase::Main => Some(Phase::Commit),
            Phase::Commit => None,
        }
    }

    /// Can cards be played from hand in this phase?
    pub fn allows_deployment(&self) -> bool {
        matches!(self, Phase::Main)
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phase_progression() {
        let mut phase = Phase::Setup;
        phase = phase.next().unwrap();
        assert_eq!(phase, Phase::Main);
        phase = phase.next().unwrap();
        assert_eq!(phase, Phase::Commit);
        assert_eq!(phase.next(), None);
    }

    #[test]
    fn test_phase_indices() {
        assert_eq!(Phase::Setup.index(), 0);
        assert_eq!(Phase::Commit.index(), 2);
        assert_eq!(Phase::from_index(1), Some(Phase::Main));
        assert_eq!(Phase::from_index(3), None);
    }

    #[test]
    fn test_deployment_phase() {
        assert!(Phase::Main.allows_deployment());
        assert!(!Phase::Setup.allows_deployment());
        assert!(!Phase::Commit.allows_deployment());
    }
}
