//! Board status engine
//!
//! Recomputes the dynamic statuses (Support, Threat) from board adjacency.
//! Every mutation path calls [`recalculate`] before returning. The pass
//! strips all dynamic entries and re-derives them, so running it twice
//! gives the same board as running it once.
//!
//! Threat attribution: one entry per opponent. Opponents that pin the card
//! come first, then opponents that corner it, each group in ascending player
//! id order; an opponent that does both is recorded once.

use crate::core::{Board, Card, Coord, Direction, Player, PlayerId, StatusKind};
use crate::game::GameState;
use smallvec::SmallVec;

/// Recalculate dynamic statuses for the whole board
pub fn recalculate(state: &mut GameState) {
    let GameState { board, players, .. } = state;
    recalculate_board(board, players);
}

/// Board-only form of [`recalculate`]
pub fn recalculate_board(board: &mut Board, players: &[Player]) {
    let updates: Vec<(Coord, SmallVec<[(StatusKind, PlayerId); 4]>)> = board
        .cards()
        .map(|(coord, card)| (coord, derive_statuses(board, players, coord, card)))
        .collect();

    for (coord, derived) in updates {
        if let Some(card) = board.get_mut(coord) {
            card.statuses.retain(|s| !s.kind.is_dynamic());
            for (kind, by) in derived {
                card.statuses.add_unique(kind, by);
            }
        }
    }
}

/// Two owners are opposed unless they are the same player or teammates
pub fn are_opposed(players: &[Player], a: PlayerId, b: PlayerId) -> bool {
    if a == b {
        return false;
    }
    let team = |id: PlayerId| players.iter().find(|p| p.id == id).and_then(|p| p.team_id);
    match (team(a), team(b)) {
        (Some(ta), Some(tb)) => ta != tb,
        _ => true,
    }
}

/// Neighbour card that can contribute to dynamic statuses
fn live_neighbor(board: &Board, coord: Coord, dir: Direction) -> Option<&Card> {
    board
        .neighbor(coord, dir)
        .and_then(|c| board.get(c))
        .filter(|card| !card.is_stunned())
}

fn derive_statuses(
    board: &Board,
    players: &[Player],
    coord: Coord,
    card: &Card,
) -> SmallVec<[(StatusKind, PlayerId); 4]> {
    let mut derived = SmallVec::new();
    if card.is_stunned() {
        return derived;
    }

    let sides: [Option<&Card>; 4] = Direction::ALL.map(|d| live_neighbor(board, coord, d));

    if sides.iter().flatten().any(|n| n.owner == card.owner) {
        derived.push((StatusKind::Support, card.owner));
    }

    for by in threat_sources(board, players, coord, card, &sides) {
        derived.push((StatusKind::Threat, by));
    }
    derived
}

/// Opponents threatening the card, pinners first then cornerers
fn threat_sources(
    board: &Board,
    players: &[Player],
    coord: Coord,
    card: &Card,
    sides: &[Option<&Card>; 4],
) -> SmallVec<[PlayerId; 4]> {
    // Direction::ALL is Up, Down, Left, Right
    let opposing: [Option<PlayerId>; 4] = sides.map(|side| {
        side.map(|n| n.owner)
            .filter(|owner| are_opposed(players, card.owner, *owner))
    });

    let mut pinners: SmallVec<[PlayerId; 4]> = SmallVec::new();
    for (a, b) in [(0, 1), (2, 3)] {
        if let (Some(x), Some(y)) = (opposing[a], opposing[b]) {
            pinners.push(x);
            pinners.push(y);
        }
    }
    for owner in opposing.iter().flatten() {
        if opposing.iter().flatten().filter(|o| *o == owner).count() >= 2 {
            pinners.push(*owner);
        }
    }
    pinners.sort_unstable();
    pinners.dedup();

    let mut sources = pinners.clone();
    if board.is_on_edge(coord) {
        let mut cornerers: SmallVec<[PlayerId; 4]> = opposing
            .iter()
            .flatten()
            .copied()
            .filter(|o| !pinners.contains(o))
            .collect();
        cornerers.sort_unstable();
        cornerers.dedup();
        sources.extend(cornerers);
    }
    sources
}
