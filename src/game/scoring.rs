//! Scoring engine
//!
//! Sums card power along a full row, column or diagonal of the active
//! window for one player and adds it to that player's score.

use crate::core::{Card, Coord, PlayerId, StatusKind};
use crate::game::abilities::DiagonalBonus;
use crate::game::status_engine::are_opposed;
use crate::game::{GameEvent, GameState};
use serde::{Deserialize, Serialize};

/// A scoring selection given by two cells
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScoringLine {
    /// Row or column containing both cells
    Line { from: Coord, to: Coord },
    /// Strict diagonal through both cells
    Diagonal { from: Coord, to: Coord },
}

impl ScoringLine {
    /// Active cells covered by the selection, or None if it is not a line
    pub fn cells(&self, state: &GameState) -> Option<Vec<Coord>> {
        match *self {
            ScoringLine::Line { from, to } => state.board.line_between(from, to),
            ScoringLine::Diagonal { from, to } => state.board.diagonal_between(from, to),
        }
    }

    pub fn contains(&self, state: &GameState, coord: Coord) -> bool {
        self.cells(state).is_some_and(|cells| cells.contains(&coord))
    }
}

/// Does `player` have an active Intercept passive on the board?
fn has_intercept(state: &GameState, player: PlayerId) -> bool {
    state.board.cards().any(|(_, card)| {
        card.owner == player
            && !card.is_stunned()
            && state
                .definition(card)
                .is_some_and(|d| d.has_intercept())
    })
}

/// Would `card` count toward `player`'s line score?
fn counts_for(state: &GameState, card: &Card, player: PlayerId, intercept: bool) -> bool {
    if card.is_stunned() {
        return false;
    }
    if card.owner == player {
        return true;
    }
    intercept
        && are_opposed(&state.players, player, card.owner)
        && card.statuses.has_from(StatusKind::Exploit, player)
}

/// Per-cell contributions for `player` over `cells`
pub fn contributions(state: &GameState, cells: &[Coord], player: PlayerId) -> Vec<(Coord, i32)> {
    let intercept = has_intercept(state, player);
    cells
        .iter()
        .filter_map(|coord| {
            let card = state.board.get(*coord)?;
            counts_for(state, card, player, intercept).then(|| (*coord, card.effective_power()))
        })
        .collect()
}

fn apply(state: &mut GameState, contributions: &[(Coord, i32)], player: PlayerId, extra: i32) -> i32 {
    let mut total = extra;
    for (coord, points) in contributions {
        total += points;
        state.push_event(GameEvent::FloatingText {
            coord: *coord,
            text: format!("+{points}"),
            player,
        });
    }
    if let Some(p) = state.player_mut(player) {
        p.add_score(total);
    }
    state.push_event(GameEvent::Scored {
        player,
        amount: total,
    });
    log_if_verbose!(
        state.logger,
        Normal,
        "scoring",
        "player {} scores {} from {} cards",
        player,
        total,
        contributions.len()
    );
    total
}

/// Score the full row or column through `a` and `b` for `player`
///
/// Returns the points added, or None if the cells share no row or column.
pub fn score_line(state: &mut GameState, a: Coord, b: Coord, player: PlayerId) -> Option<i32> {
    let cells = state.board.line_between(a, b)?;
    let scored = contributions(state, &cells, player);
    Some(apply(state, &scored, player, 0))
}

/// Score the strict diagonal through `a` and `b` for `player`
///
/// The optional bonus applies once per Support-tagged card of `player`
/// that contributed.
pub fn score_diagonal(
    state: &mut GameState,
    a: Coord,
    b: Coord,
    player: PlayerId,
    bonus: Option<DiagonalBonus>,
) -> Option<i32> {
    let cells = state.board.diagonal_between(a, b)?;
    let scored = contributions(state, &cells, player);
    let supported = scored
        .iter()
        .filter(|(coord, _)| {
            state
                .board
                .get(*coord)
                .is_some_and(|c| c.owner == player && c.has_status(StatusKind::Support))
        })
        .count();

    let mut extra = 0;
    match bonus {
        Some(DiagonalBonus::Score { per_card }) => extra = per_card * supported as i32,
        Some(DiagonalBonus::Draw { per_card }) => {
            state.draw_cards(player, (per_card as usize).saturating_mul(supported));
        }
        None => {}
    }
    Some(apply(state, &scored, player, extra))
}

/// Score a selection
pub fn score_selection(
    state: &mut GameState,
    line: ScoringLine,
    player: PlayerId,
    bonus: Option<DiagonalBonus>,
) -> Option<i32> {
    match line {
        ScoringLine::Line { from, to } => score_line(state, from, to, player),
        ScoringLine::Diagonal { from, to } => score_diagonal(state, from, to, player, bonus),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RulesConfig;
    use crate::core::EntityId;
    use crate::loader::{CardDatabase, CardDefinition, Passive};
    use std::sync::Arc;

    fn p(id: u32) -> PlayerId {
        EntityId::new(id)
    }

    fn game(db: CardDatabase) -> GameState {
        GameState::new(&["A", "B"], RulesConfig::default(), Arc::new(db))
    }

    fn put(state: &mut GameState, owner: u32, power: i32, coord: Coord) -> &mut Card {
        let id = state.next_card_id();
        let card = Card::new(id, "C", p(owner), power);
        assert!(state.board.place(coord, card).is_ok());
        state.board.get_mut(coord).unwrap()
    }

    #[test]
    fn test_row_scoring_ignores_stunned_and_opposing() {
        let mut state = game(CardDatabase::new());
        put(&mut state, 1, 3, Coord::new(2, 1));
        put(&mut state, 1, 5, Coord::new(2, 2)).power_modifier = -1;
        put(&mut state, 1, 9, Coord::new(2, 3))
            .statuses
            .push(StatusKind::Stun, p(2));
        put(&mut state, 2, 4, Coord::new(2, 4));

        let points = score_line(&mut state, Coord::new(2, 1), Coord::new(2, 5), p(1));
        assert_eq!(points, Some(7));
        assert_eq!(state.get_player(p(1)).unwrap().score, 7);

        let floating = state
            .take_events()
            .into_iter()
            .filter(|e| matches!(e, GameEvent::FloatingText { .. }))
            .count();
        assert_eq!(floating, 2);
    }

    #[test]
    fn test_not_a_line() {
        let mut state = game(CardDatabase::new());
        assert_eq!(
            score_line(&mut state, Coord::new(1, 1), Coord::new(2, 2), p(1)),
            None
        );
        assert!(state.events.is_empty());
    }

    #[test]
    fn test_negative_power_contributes_zero() {
        let mut state = game(CardDatabase::new());
        put(&mut state, 1, 1, Coord::new(1, 3)).power_modifier = -4;
        put(&mut state, 1, 2, Coord::new(4, 3));
        let points = score_line(&mut state, Coord::new(1, 3), Coord::new(4, 3), p(1));
        assert_eq!(points, Some(2));
    }

    #[test]
    fn test_intercept_counts_exploited_opponents() {
        let mut db = CardDatabase::new();
        db.add_card(CardDefinition::new("interceptor", "Interceptor", 1).with_passive(Passive::Intercept));
        let mut state = game(db);
        put(&mut state, 1, 2, Coord::new(3, 1));
        put(&mut state, 2, 4, Coord::new(3, 2))
            .statuses
            .push(StatusKind::Exploit, p(1));
        put(&mut state, 2, 6, Coord::new(3, 3));

        assert_eq!(
            score_line(&mut state, Coord::new(3, 1), Coord::new(3, 2), p(1)),
            Some(2)
        );

        put(&mut state, 1, 1, Coord::new(5, 5)).base_id = Some("interceptor".into());
        assert_eq!(
            score_line(&mut state, Coord::new(3, 1), Coord::new(3, 2), p(1)),
            Some(6)
        );
    }

    #[test]
    fn test_diagonal_with_support_bonus() {
        let mut state = game(CardDatabase::new());
        put(&mut state, 1, 2, Coord::new(1, 1))
            .statuses
            .push(StatusKind::Support, p(1));
        put(&mut state, 1, 3, Coord::new(3, 3));
        put(&mut state, 1, 5, Coord::new(3, 4));

        let points = score_diagonal(
            &mut state,
            Coord::new(1, 1),
            Coord::new(3, 3),
            p(1),
            Some(DiagonalBonus::Score { per_card: 2 }),
        );
        assert_eq!(points, Some(7));
    }

    #[test]
    fn test_diagonal_draw_bonus() {
        let mut state = game(CardDatabase::new());
        put(&mut state, 1, 1, Coord::new(2, 2))
            .statuses
            .push(StatusKind::Support, p(1));
        for _ in 0..3 {
            let id = state.next_card_id();
            state
                .get_player_mut(p(1))
                .unwrap()
                .deck
                .add(Card::new(id, "D", p(1), 1));
        }
        let points = score_diagonal(
            &mut state,
            Coord::new(2, 2),
            Coord::new(4, 4),
            p(1),
            Some(DiagonalBonus::Draw { per_card: 2 }),
        );
        assert_eq!(points, Some(1));
        assert_eq!(state.get_player(p(1)).unwrap().hand.len(), 2);
    }

    #[test]
    fn test_oversized_draw_bonus_stops_at_empty_deck() {
        let mut state = game(CardDatabase::new());
        for coord in [Coord::new(1, 1), Coord::new(2, 2)] {
            put(&mut state, 1, 1, coord)
                .statuses
                .push(StatusKind::Support, p(1));
        }
        for _ in 0..3 {
            let id = state.next_card_id();
            state
                .get_player_mut(p(1))
                .unwrap()
                .deck
                .add(Card::new(id, "D", p(1), 1));
        }
        let points = score_diagonal(
            &mut state,
            Coord::new(1, 1),
            Coord::new(3, 3),
            p(1),
            Some(DiagonalBonus::Draw { per_card: u32::MAX }),
        );
        assert_eq!(points, Some(2));
        let player = state.get_player(p(1)).unwrap();
        assert_eq!(player.hand.len(), 3);
        assert!(player.deck.is_empty());
    }
}
