//! Card statuses and counters
//!
//! A card carries an ordered multiset of statuses. Order matters: removing
//! "one Stun" always removes the most recently added Stun entry.

use crate::core::PlayerId;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::fmt;

/// Kinds of status a card can carry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum StatusKind {
    /// Dynamic: adjacent allied, non-stunned card
    Support,
    /// Dynamic: pinned or cornered by opposing cards
    Threat,
    Stun,
    Shield,
    Exploit,
    Aim,
    Revealed,
    /// Most recent card its owner put into play that is still on the board
    LastPlayed,
    /// Returned to the board from discard; converts to Stun at the next phase boundary
    Resurrected,
    ReadyDeploy,
    ReadySetup,
    ReadyCommit,
}

impl StatusKind {
    /// Statuses derived from board adjacency by the status engine
    pub fn is_dynamic(&self) -> bool {
        matches!(self, StatusKind::Support | StatusKind::Threat)
    }

    /// Readiness bookkeeping statuses
    pub fn is_readiness(&self) -> bool {
        matches!(
            self,
            StatusKind::ReadyDeploy | StatusKind::ReadySetup | StatusKind::ReadyCommit
        )
    }
}

impl fmt::Display for StatusKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// A single status entry, attributed to the player who added it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Status {
    #[serde(rename = "type")]
    pub kind: StatusKind,
    pub added_by: PlayerId,
}

impl Status {
    pub fn new(kind: StatusKind, added_by: PlayerId) -> Self {
        Status { kind, added_by }
    }
}

/// Ordered status multiset
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StatusList(SmallVec<[Status; 4]>);

impl StatusList {
    pub fn new() -> Self {
        StatusList(SmallVec::new())
    }

    pub fn push(&mut self, kind: StatusKind, added_by: PlayerId) {
        self.0.push(Status::new(kind, added_by));
    }

    /// Add unless an entry with the same kind and attribution already exists
    ///
    /// Returns true if an entry was added.
    pub fn add_unique(&mut self, kind: StatusKind, added_by: PlayerId) -> bool {
        if self.has_from(kind, added_by) {
            return false;
        }
        self.push(kind, added_by);
        true
    }

    pub fn has(&self, kind: StatusKind) -> bool {
        self.0.iter().any(|s| s.kind == kind)
    }

    pub fn has_from(&self, kind: StatusKind, added_by: PlayerId) -> bool {
        self.0.iter().any(|s| s.kind == kind && s.added_by == added_by)
    }

    pub fn count(&self, kind: StatusKind) -> usize {
        self.0.iter().filter(|s| s.kind == kind).count()
    }

    pub fn count_from(&self, kind: StatusKind, added_by: PlayerId) -> usize {
        self.0
            .iter()
            .filter(|s| s.kind == kind && s.added_by == added_by)
            .count()
    }

    /// Remove the most recently added entry of `kind`, returning it
    pub fn remove_latest(&mut self, kind: StatusKind) -> Option<Status> {
        let pos = self.0.iter().rposition(|s| s.kind == kind)?;
        Some(self.0.remove(pos))
    }

    /// Remove every entry of `kind`, returning how many were removed
    pub fn remove_all(&mut self, kind: StatusKind) -> usize {
        let before = self.0.len();
        self.0.retain(|s| s.kind != kind);
        before - self.0.len()
    }

    pub fn retain(&mut self, mut f: impl FnMut(&Status) -> bool) {
        self.0.retain(|s| f(s));
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Status> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }
}

impl<'a> IntoIterator for &'a StatusList {
    type Item = &'a Status;
    type IntoIter = std::slice::Iter<'a, Status>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
