//! Square board grid with a centered active window
//!
//! The full grid always has `size * size` cells, but only the centered
//! `active_size * active_size` window is in play. Every coordinate-bounded
//! query here clips to that window; cells outside it are inert.

use crate::core::{Card, CardId};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::fmt;

/// Absolute cell coordinate on the full grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Coord {
    pub row: usize,
    pub col: usize,
}

impl Coord {
    pub const fn new(row: usize, col: usize) -> Self {
        Coord { row, col }
    }

    /// Manhattan distance 1
    pub fn is_orthogonal_neighbor(&self, other: Coord) -> bool {
        self.row.abs_diff(other.row) + self.col.abs_diff(other.col) == 1
    }

    pub fn shares_line(&self, other: Coord) -> bool {
        self.row == other.row || self.col == other.col
    }

    fn offset(&self, dr: isize, dc: isize) -> Option<Coord> {
        Some(Coord {
            row: self.row.checked_add_signed(dr)?,
            col: self.col.checked_add_signed(dc)?,
        })
    }
}

impl fmt::Display for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{})", self.row, self.col)
    }
}

/// Orthogonal direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];

    pub fn delta(&self) -> (isize, isize) {
        match self {
            Direction::Up => (-1, 0),
            Direction::Down => (1, 0),
            Direction::Left => (0, -1),
            Direction::Right => (0, 1),
        }
    }

    pub fn opposite(&self) -> Direction {
        match self {
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
        }
    }

    /// Direction leading from `from` to an orthogonally adjacent `to`
    pub fn between(from: Coord, to: Coord) -> Option<Direction> {
        if !from.is_orthogonal_neighbor(to) {
            return None;
        }
        Some(if to.row < from.row {
            Direction::Up
        } else if to.row > from.row {
            Direction::Down
        } else if to.col < from.col {
            Direction::Left
        } else {
            Direction::Right
        })
    }
}

/// The game board
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Board {
    size: usize,
    active_size: usize,
    cells: Vec<Option<Card>>,
}

impl Board {
    /// Create an empty board; `active_size` is clamped to `size`
    pub fn new(size: usize, active_size: usize) -> Self {
        Board {
            size,
            active_size: active_size.min(size),
            cells: vec![None; size * size],
        }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn active_size(&self) -> usize {
        self.active_size
    }

    /// Index of the first active row/column
    pub fn offset(&self) -> usize {
        (self.size - self.active_size) / 2
    }

    pub fn in_active(&self, coord: Coord) -> bool {
        let lo = self.offset();
        let hi = lo + self.active_size;
        (lo..hi).contains(&coord.row) && (lo..hi).contains(&coord.col)
    }

    /// All active coordinates in row-major order
    pub fn active_coords(&self) -> impl Iterator<Item = Coord> {
        let lo = self.offset();
        let hi = lo + self.active_size;
        (lo..hi).flat_map(move |row| (lo..hi).map(move |col| Coord::new(row, col)))
    }

    fn index(&self, coord: Coord) -> Option<usize> {
        (coord.row < self.size && coord.col < self.size).then(|| coord.row * self.size + coord.col)
    }

    /// Card at an active cell
    pub fn get(&self, coord: Coord) -> Option<&Card> {
        if !self.in_active(coord) {
            return None;
        }
        self.index(coord).and_then(|i| self.cells[i].as_ref())
    }

    pub fn get_mut(&mut self, coord: Coord) -> Option<&mut Card> {
        if !self.in_active(coord) {
            return None;
        }
        let i = self.index(coord)?;
        self.cells[i].as_mut()
    }

    /// Active and unoccupied
    pub fn is_empty_cell(&self, coord: Coord) -> bool {
        self.in_active(coord) && self.get(coord).is_none()
    }

    /// Put a card into an empty active cell; hands the card back otherwise
    pub fn place(&mut self, coord: Coord, card: Card) -> std::result::Result<(), Card> {
        if !self.is_empty_cell(coord) {
            return Err(card);
        }
        match self.index(coord) {
            Some(i) => {
                self.cells[i] = Some(card);
                Ok(())
            }
            None => Err(card),
        }
    }

    /// Remove and return the card at an active cell
    pub fn take(&mut self, coord: Coord) -> Option<Card> {
        if !self.in_active(coord) {
            return None;
        }
        let i = self.index(coord)?;
        self.cells[i].take()
    }

    /// Swap the contents of two active cells
    pub fn swap(&mut self, a: Coord, b: Coord) -> bool {
        if !self.in_active(a) || !self.in_active(b) {
            return false;
        }
        match (self.index(a), self.index(b)) {
            (Some(i), Some(j)) => {
                self.cells.swap(i, j);
                true
            }
            _ => false,
        }
    }

    /// Active neighbour in a direction
    pub fn neighbor(&self, coord: Coord, dir: Direction) -> Option<Coord> {
        let (dr, dc) = dir.delta();
        coord.offset(dr, dc).filter(|c| self.in_active(*c))
    }

    /// Orthogonal active neighbours
    pub fn neighbors(&self, coord: Coord) -> SmallVec<[Coord; 4]> {
        Direction::ALL
            .iter()
            .filter_map(|d| self.neighbor(coord, *d))
            .collect()
    }

    /// Cell one step further from `from` through `via` (push destination)
    pub fn beyond(&self, from: Coord, via: Coord) -> Option<Coord> {
        let dir = Direction::between(from, via)?;
        self.neighbor(via, dir)
    }

    /// On the border of the active window
    pub fn is_on_edge(&self, coord: Coord) -> bool {
        if !self.in_active(coord) {
            return false;
        }
        let lo = self.offset();
        let hi = lo + self.active_size - 1;
        coord.row == lo || coord.row == hi || coord.col == lo || coord.col == hi
    }

    /// Active cells of the row or column containing both endpoints
    pub fn line_between(&self, a: Coord, b: Coord) -> Option<Vec<Coord>> {
        let lo = self.offset();
        let hi = lo + self.active_size;
        if a.row == b.row {
            Some((lo..hi).map(|col| Coord::new(a.row, col)).collect::<Vec<_>>())
        } else if a.col == b.col {
            Some((lo..hi).map(|row| Coord::new(row, a.col)).collect::<Vec<_>>())
        } else {
            None
        }
        .filter(|cells| cells.iter().all(|c| self.in_active(*c)))
    }

    /// Active cells of the strict diagonal through both endpoints
    ///
    /// Returns `None` unless `|Δrow| == |Δcol| > 0`.
    pub fn diagonal_between(&self, a: Coord, b: Coord) -> Option<Vec<Coord>> {
        let dr = b.row as isize - a.row as isize;
        let dc = b.col as isize - a.col as isize;
        if dr == 0 || dr.abs() != dc.abs() || !self.in_active(a) || !self.in_active(b) {
            return None;
        }
        let descending = dr.signum() == dc.signum();
        let cells = self
            .active_coords()
            .filter(|c| {
                if descending {
                    c.row as isize - c.col as isize == a.row as isize - a.col as isize
                } else {
                    c.row + c.col == a.row + a.col
                }
            })
            .collect();
        Some(cells)
    }

    /// Full-board id search, bounded to the active window
    pub fn find_card(&self, card_id: CardId) -> Option<Coord> {
        self.active_coords()
            .find(|c| self.get(*c).is_some_and(|card| card.id == card_id))
    }

    /// Occupied active cells in row-major order
    pub fn cards(&self) -> impl Iterator<Item = (Coord, &Card)> {
        self.active_coords()
            .filter_map(move |c| self.get(c).map(|card| (c, card)))
    }

    /// Coordinates of occupied active cells
    pub fn occupied(&self) -> Vec<Coord> {
        self.cards().map(|(c, _)| c).collect()
    }

    /// Empty active cells
    pub fn empty_cells(&self) -> Vec<Coord> {
        self.active_coords().filter(|c| self.get(*c).is_none()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::EntityId;

    fn card(id: u32) -> Card {
        Card::new(EntityId::new(id), "C", EntityId::new(1), 1)
    }

    #[test]
    fn test_active_window() {
        let board = Board::new(7, 5);
        assert_eq!(board.offset(), 1);
        assert!(!board.in_active(Coord::new(0, 3)));
        assert!(board.in_active(Coord::new(1, 1)));
        assert!(board.in_active(Coord::new(5, 5)));
        assert!(!board.in_active(Coord::new(6, 5)));
        assert_eq!(board.active_coords().count(), 25);
    }

    #[test]
    fn test_place_and_take() {
        let mut board = Board::new(7, 4);
        let inside = Coord::new(2, 2);
        let outside = Coord::new(0, 0);

        assert!(board.place(inside, card(1)).is_ok());
        assert!(board.place(inside, card(2)).is_err());
        assert!(board.place(outside, card(3)).is_err());
        assert_eq!(board.find_card(EntityId::new(1)), Some(inside));
        assert_eq!(board.take(inside).map(|c| c.id), Some(EntityId::new(1)));
        assert!(board.is_empty_cell(inside));
    }

    #[test]
    fn test_neighbors_clip_to_window() {
        let board = Board::new(7, 5);
        let corner = Coord::new(1, 1);
        let n = board.neighbors(corner);
        assert_eq!(n.len(), 2);
        assert!(board.is_on_edge(corner));
        assert!(!board.is_on_edge(Coord::new(3, 3)));
        assert_eq!(board.neighbor(corner, Direction::Up), None);
    }

    #[test]
    fn test_line_between() {
        let board = Board::new(7, 5);
        let row = board.line_between(Coord::new(2, 1), Coord::new(2, 4)).unwrap();
        assert_eq!(row.len(), 5);
        assert!(row.iter().all(|c| c.row == 2));
        let col = board.line_between(Coord::new(1, 3), Coord::new(5, 3)).unwrap();
        assert!(col.iter().all(|c| c.col == 3));
        assert!(board.line_between(Coord::new(1, 1), Coord::new(2, 2)).is_none());
    }

    #[test]
    fn test_diagonal_between() {
        let board = Board::new(7, 5);
        let diag = board.diagonal_between(Coord::new(1, 1), Coord::new(3, 3)).unwrap();
        assert_eq!(diag.len(), 5);
        let anti = board.diagonal_between(Coord::new(1, 5), Coord::new(2, 4)).unwrap();
        assert_eq!(anti.len(), 5);
        assert!(anti.contains(&Coord::new(5, 1)));
        assert!(board.diagonal_between(Coord::new(1, 1), Coord::new(1, 2)).is_none());
        assert!(board.diagonal_between(Coord::new(2, 2), Coord::new(2, 2)).is_none());
    }

    #[test]
    fn test_beyond() {
        let board = Board::new(7, 5);
        assert_eq!(
            board.beyond(Coord::new(3, 3), Coord::new(3, 4)),
            Some(Coord::new(3, 5))
        );
        assert_eq!(board.beyond(Coord::new(3, 4), Coord::new(3, 5)), None);
        assert_eq!(board.beyond(Coord::new(3, 3), Coord::new(4, 4)), None);
    }
}
