use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::GameError;

/// A square on the board, 1-based: row 1 is white's back rank, column 1 is
/// the a-file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Position {
    row: i8,
    col: i8,
}

impl Position {
    /// Builds a position, returning `None` when either coordinate is off the
    /// board.
    pub fn new(row: i8, col: i8) -> Option<Self> {
        if (1..=8).contains(&row) && (1..=8).contains(&col) {
            Some(Self { row, col })
        } else {
            None
        }
    }

    pub fn row(&self) -> i8 {
        self.row
    }

    pub fn col(&self) -> i8 {
        self.col
    }

    /// The square `(dr, dc)` away, if it is still on the board.
    pub fn offset(&self, dr: i8, dc: i8) -> Option<Self> {
        Self::new(self.row + dr, self.col + dc)
    }

    /// All 64 squares, rank by rank.
    pub fn all() -> impl Iterator<Item = Position> {
        (1..=8).flat_map(|row| (1..=8).map(move |col| Position { row, col }))
    }

    pub(crate) fn index(&self) -> (usize, usize) {
        ((self.row - 1) as usize, (self.col - 1) as usize)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let file = (b'a' + (self.col - 1) as u8) as char;
        write!(f, "{}{}", file, self.row)
    }
}

impl FromStr for Position {
    type Err = GameError;

    /// Parses algebraic notation such as `e2`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = s.as_bytes();
        if bytes.len() != 2 {
            return Err(GameError::MalformedAction(format!("bad square '{}'", s)));
        }
        let file = bytes[0].to_ascii_lowercase();
        let rank = bytes[1];
        if !(b'a'..=b'h').contains(&file) || !(b'1'..=b'8').contains(&rank) {
            return Err(GameError::MalformedAction(format!("square out of range '{}'", s)));
        }
        Ok(Position {
            row: (rank - b'0') as i8,
            col: (file - b'a' + 1) as i8,
        })
    }
}
