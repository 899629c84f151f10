use serde::{Deserialize, Serialize};
use std::fmt;

use super::board::Board;
use super::piece::{Color, PieceKind};
use super::position::Position;
use super::rules::Game;

/// Summary of a game from the point of view of the side to move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameStatus {
    InProgress,
    Check(Color),
    Checkmate { winner: Color },
    Stalemate,
    InsufficientMaterial,
    Resigned,
}

impl GameStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, GameStatus::InProgress | GameStatus::Check(_))
    }
}

impl fmt::Display for GameStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GameStatus::InProgress => write!(f, "in progress"),
            GameStatus::Check(color) => write!(f, "{} is in check", color),
            GameStatus::Checkmate { winner } => {
                write!(f, "checkmate, {} wins", winner)
            }
            GameStatus::Stalemate => write!(f, "stalemate"),
            GameStatus::InsufficientMaterial => write!(f, "draw by insufficient material"),
            GameStatus::Resigned => write!(f, "resigned"),
        }
    }
}

/// Get the game status for the side to move.
pub fn get_game_status(game: &Game) -> GameStatus {
    let turn = game.turn();
    if game.is_over() {
        GameStatus::Resigned
    } else if game.is_in_checkmate(turn) {
        GameStatus::Checkmate {
            winner: turn.opponent(),
        }
    } else if game.is_in_stalemate(turn) {
        GameStatus::Stalemate
    } else if has_insufficient_material(game.board()) {
        GameStatus::InsufficientMaterial
    } else if game.is_in_check(turn) {
        GameStatus::Check(turn)
    } else {
        GameStatus::InProgress
    }
}

#[derive(Default)]
struct Material {
    heavy: usize,
    knights: usize,
    bishops: Vec<Position>,
}

impl Material {
    fn minor(&self) -> usize {
        self.knights + self.bishops.len()
    }
}

fn is_light(pos: &Position) -> bool {
    (pos.row() + pos.col()) % 2 == 1
}

/// Check if the board has insufficient material for checkmate: bare kings,
/// a single minor piece, or one bishop each on the same square color.
pub fn has_insufficient_material(board: &Board) -> bool {
    let mut white = Material::default();
    let mut black = Material::default();
    for (pos, piece) in board.pieces() {
        let side = match piece.color {
            Color::White => &mut white,
            Color::Black => &mut black,
        };
        match piece.kind {
            PieceKind::King => {}
            PieceKind::Knight => side.knights += 1,
            PieceKind::Bishop => side.bishops.push(pos),
            PieceKind::Pawn | PieceKind::Rook | PieceKind::Queen => side.heavy += 1,
        }
    }
    if white.heavy > 0 || black.heavy > 0 {
        return false;
    }
    match (white.minor(), black.minor()) {
        (0, 0) | (1, 0) | (0, 1) => true,
        (1, 1) if white.knights == 0 && black.knights == 0 => {
            is_light(&white.bishops[0]) == is_light(&black.bishops[0])
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::piece::Piece;

    fn board_with(pieces: &[(&str, Color, PieceKind)]) -> Board {
        let mut board = Board::new();
        for (sq, color, kind) in pieces {
            board.place(sq.parse().unwrap(), Piece::new(*color, *kind));
        }
        board
    }

    #[test]
    fn material_scenarios() {
        let kings = [
            ("e1", Color::White, PieceKind::King),
            ("e8", Color::Black, PieceKind::King),
        ];
        assert!(has_insufficient_material(&board_with(&kings)));

        let mut knight = kings.to_vec();
        knight.push(("b1", Color::White, PieceKind::Knight));
        assert!(has_insufficient_material(&board_with(&knight)));

        let mut same_bishops = kings.to_vec();
        same_bishops.push(("c1", Color::White, PieceKind::Bishop));
        same_bishops.push(("f8", Color::Black, PieceKind::Bishop));
        assert!(has_insufficient_material(&board_with(&same_bishops)));

        let mut opposite_bishops = kings.to_vec();
        opposite_bishops.push(("c1", Color::White, PieceKind::Bishop));
        opposite_bishops.push(("c8", Color::Black, PieceKind::Bishop));
        assert!(!has_insufficient_material(&board_with(&opposite_bishops)));

        let mut pawn = kings.to_vec();
        pawn.push(("a2", Color::White, PieceKind::Pawn));
        assert!(!has_insufficient_material(&board_with(&pawn)));

        assert!(!has_insufficient_material(&Board::standard()));
    }

    #[test]
    fn status_follows_the_game() {
        let mut game = Game::new();
        assert_eq!(get_game_status(&game), GameStatus::InProgress);
        for m in ["f2f3", "e7e5", "g2g4", "d8h4"] {
            game.make_move(m.parse().unwrap()).unwrap();
        }
        let status = get_game_status(&game);
        assert_eq!(status, GameStatus::Checkmate { winner: Color::Black });
        assert!(status.is_terminal());
        game.set_over(true);
        assert_eq!(get_game_status(&game), GameStatus::Resigned);
    }
}
