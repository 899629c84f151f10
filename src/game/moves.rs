use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::piece::PieceKind;
use super::position::Position;
use crate::error::GameError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Move {
    pub start: Position,
    pub end: Position,
    pub promotion: Option<PieceKind>,
}

impl Move {
    pub fn new(start: Position, end: Position, promotion: Option<PieceKind>) -> Self {
        Self { start, end, promotion }
    }

    pub fn row_delta(&self) -> i8 {
        self.end.row() - self.start.row()
    }

    pub fn col_delta(&self) -> i8 {
        self.end.col() - self.start.col()
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.start, self.end)?;
        if let Some(kind) = self.promotion {
            write!(f, "{}", kind.letter())?;
        }
        Ok(())
    }
}

impl FromStr for Move {
    type Err = GameError;

    /// Parses `<file><rank><file><rank>`, e.g. `e2e4`. Promotion suffixes are
    /// not accepted in this form.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.len() != 4 || !s.is_ascii() {
            return Err(GameError::MalformedAction(format!(
                "move must be four characters like e2e4, got '{}'",
                s
            )));
        }
        let start = s[0..2].parse::<Position>()?;
        let end = s[2..4].parse::<Position>()?;
        Ok(Move::new(start, end, None))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_four_character_text() {
        let m: Move = "e2e4".parse().unwrap();
        assert_eq!(m.start, "e2".parse().unwrap());
        assert_eq!(m.end, "e4".parse().unwrap());
        assert_eq!(m.promotion, None);
        assert_eq!(m.row_delta(), 2);
        assert_eq!(m.to_string(), "e2e4");
    }

    #[test]
    fn rejects_bad_text() {
        for text in ["e2e", "e2e4q", "z2e4", "e0e4", "", "é2e4"] {
            assert!(
                matches!(text.parse::<Move>(), Err(GameError::MalformedAction(_))),
                "{} should not parse",
                text
            );
        }
    }

    #[test]
    fn displays_promotion_letter() {
        let m = Move::new(
            "a7".parse().unwrap(),
            "a8".parse().unwrap(),
            Some(PieceKind::Knight),
        );
        assert_eq!(m.to_string(), "a7a8n");
    }
}
