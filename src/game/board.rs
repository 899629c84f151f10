use serde::{Deserialize, Serialize};

use super::piece::{Color, Piece, PieceKind};
use super::position::Position;

/// Per-square move history, travelling with the piece that occupies it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct History {
    pub moved: bool,
    pub en_passantable: bool,
}

/// An 8x8 grid of optional pieces plus a side table of move history keyed by
/// square. All positions are in range by construction.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Board {
    squares: [[Option<Piece>; 8]; 8],
    history: [[History; 8]; 8],
}

const BACK_RANK: [PieceKind; 8] = [
    PieceKind::Rook,
    PieceKind::Knight,
    PieceKind::Bishop,
    PieceKind::Queen,
    PieceKind::King,
    PieceKind::Bishop,
    PieceKind::Knight,
    PieceKind::Rook,
];

impl Board {
    /// An empty board.
    pub fn new() -> Self {
        Self::default()
    }

    /// A board in the standard starting position.
    pub fn standard() -> Self {
        let mut board = Self::new();
        board.reset();
        board
    }

    pub fn reset(&mut self) {
        *self = Self::default();
        for color in [Color::White, Color::Black] {
            for (i, kind) in BACK_RANK.iter().enumerate() {
                let col = i as i8 + 1;
                if let Some(pos) = Position::new(color.back_row(), col) {
                    self.place(pos, Piece::new(color, *kind));
                }
                if let Some(pos) = Position::new(color.pawn_row(), col) {
                    self.place(pos, Piece::new(color, PieceKind::Pawn));
                }
            }
        }
    }

    pub fn get(&self, pos: Position) -> Option<Piece> {
        let (r, c) = pos.index();
        self.squares[r][c]
    }

    /// Puts a piece with a fresh history on `pos`, replacing whatever was there.
    pub fn place(&mut self, pos: Position, piece: Piece) {
        let (r, c) = pos.index();
        self.squares[r][c] = Some(piece);
        self.history[r][c] = History::default();
    }

    pub fn remove(&mut self, pos: Position) -> Option<Piece> {
        let (r, c) = pos.index();
        self.history[r][c] = History::default();
        self.squares[r][c].take()
    }

    /// Moves the piece on `from` to `to` together with its history and
    /// returns whatever was captured on `to`.
    pub fn relocate(&mut self, from: Position, to: Position) -> Option<Piece> {
        let (fr, fc) = from.index();
        let (tr, tc) = to.index();
        let piece = self.squares[fr][fc].take();
        let history = std::mem::take(&mut self.history[fr][fc]);
        let captured = std::mem::replace(&mut self.squares[tr][tc], piece);
        self.history[tr][tc] = history;
        captured
    }

    pub fn history(&self, pos: Position) -> History {
        let (r, c) = pos.index();
        self.history[r][c]
    }

    pub fn has_moved(&self, pos: Position) -> bool {
        self.history(pos).moved
    }

    pub fn mark_moved(&mut self, pos: Position) {
        let (r, c) = pos.index();
        self.history[r][c].moved = true;
    }

    pub fn is_en_passantable(&self, pos: Position) -> bool {
        self.history(pos).en_passantable
    }

    pub fn set_en_passantable(&mut self, pos: Position, flag: bool) {
        let (r, c) = pos.index();
        self.history[r][c].en_passantable = flag;
    }

    /// Clears the en passant flag on every square.
    pub fn clear_en_passant(&mut self) {
        self.history
            .iter_mut()
            .flatten()
            .for_each(|h| h.en_passantable = false);
    }

    /// Every occupied square with its piece.
    pub fn pieces(&self) -> impl Iterator<Item = (Position, Piece)> + '_ {
        Position::all().filter_map(move |pos| self.get(pos).map(|piece| (pos, piece)))
    }

    pub fn pieces_of(&self, color: Color) -> impl Iterator<Item = (Position, Piece)> + '_ {
        self.pieces().filter(move |(_, piece)| piece.color == color)
    }

    pub fn king(&self, color: Color) -> Option<Position> {
        self.pieces_of(color)
            .find(|(_, piece)| piece.kind == PieceKind::King)
            .map(|(pos, _)| pos)
    }

    /// Rows from row 8 down to row 1, each from the a-file to the h-file.
    pub fn ranks(&self) -> Vec<Vec<Option<Piece>>> {
        self.squares.iter().rev().map(|row| row.to_vec()).collect()
    }

    /// The piece-placement field of FEN.
    pub fn placement(&self) -> String {
        let mut fen = String::new();
        for (i, row) in self.squares.iter().rev().enumerate() {
            if i > 0 {
                fen.push('/');
            }
            let mut empty = 0;
            for square in row {
                match square {
                    Some(piece) => {
                        if empty > 0 {
                            fen.push_str(&empty.to_string());
                            empty = 0;
                        }
                        fen.push(piece.fen());
                    }
                    None => empty += 1,
                }
            }
            if empty > 0 {
                fen.push_str(&empty.to_string());
            }
        }
        fen
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pos(s: &str) -> Position {
        s.parse().unwrap()
    }

    #[test]
    fn standard_layout() {
        let board = Board::standard();
        assert_eq!(board.placement(), "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR");
        assert_eq!(board.get(pos("e1")), Some(Piece::new(Color::White, PieceKind::King)));
        assert_eq!(board.get(pos("d8")), Some(Piece::new(Color::Black, PieceKind::Queen)));
        assert_eq!(board.pieces().count(), 32);
        assert!(!board.has_moved(pos("a1")));
    }

    #[test]
    fn relocate_carries_history_and_captures() {
        let mut board = Board::new();
        board.place(pos("a1"), Piece::new(Color::White, PieceKind::Rook));
        board.place(pos("a8"), Piece::new(Color::Black, PieceKind::Rook));
        board.mark_moved(pos("a1"));
        let captured = board.relocate(pos("a1"), pos("a8"));
        assert_eq!(captured, Some(Piece::new(Color::Black, PieceKind::Rook)));
        assert!(board.has_moved(pos("a8")));
        assert!(!board.has_moved(pos("a1")));
        assert_eq!(board.get(pos("a1")), None);
    }

    #[test]
    fn same_kind_pieces_compare_equal_regardless_of_history() {
        let mut board = Board::new();
        board.place(pos("a1"), Piece::new(Color::White, PieceKind::Rook));
        board.place(pos("h1"), Piece::new(Color::White, PieceKind::Rook));
        board.mark_moved(pos("h1"));
        assert_eq!(board.get(pos("a1")), board.get(pos("h1")));
    }

    #[test]
    fn remove_clears_square_and_history() {
        let mut board = Board::standard();
        board.mark_moved(pos("e2"));
        assert!(board.remove(pos("e2")).is_some());
        assert_eq!(board.remove(pos("e2")), None);
        assert_eq!(board.history(pos("e2")), History::default());
        assert_eq!(board.king(Color::Black), Some(pos("e8")));
    }
}
