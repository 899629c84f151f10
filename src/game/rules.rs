//! The rules engine: turn tracking, special moves, self-check filtering and
//! terminal-state detection on top of the pseudo-legal generator.

use log::debug;
use serde::{Deserialize, Serialize};

use super::board::Board;
use super::movegen::{attacks, piece_moves};
use super::moves::Move;
use super::piece::{Color, Piece, PieceKind};
use super::position::Position;
use crate::error::{GameError, Result};

/// One game: a board, the side to move, and a resignation flag.
///
/// `over` is set by resignation only. The engine keeps answering
/// `valid_moves`/`make_move` on an over game; callers decide whether to
/// honor it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Game {
    board: Board,
    turn: Color,
    over: bool,
}

impl Default for Game {
    fn default() -> Self {
        Self::new()
    }
}

impl Game {
    /// A game in the starting position with white to move.
    pub fn new() -> Self {
        Self::from_board(Board::standard(), Color::White)
    }

    pub fn from_board(board: Board, turn: Color) -> Self {
        Self {
            board,
            turn,
            over: false,
        }
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn set_board(&mut self, board: Board) {
        self.board = board;
    }

    pub fn turn(&self) -> Color {
        self.turn
    }

    pub fn set_turn(&mut self, turn: Color) {
        self.turn = turn;
    }

    pub fn is_over(&self) -> bool {
        self.over
    }

    pub fn set_over(&mut self, over: bool) {
        self.over = over;
    }

    /// Legal moves of the piece on `pos`; `None` when the square is empty.
    pub fn valid_moves(&self, pos: Position) -> Option<Vec<Move>> {
        let piece = self.board.get(pos)?;
        let mut candidates = piece_moves(&self.board, pos);
        match piece.kind {
            PieceKind::Pawn => self.en_passant(pos, piece.color, &mut candidates),
            PieceKind::King => self.castling(pos, piece.color, &mut candidates),
            _ => {}
        }
        candidates.retain(|m| self.is_move_safe(m, piece.color));
        Some(candidates)
    }

    /// Every legal move for `color`.
    pub fn legal_moves(&self, color: Color) -> Vec<Move> {
        self.board
            .pieces_of(color)
            .filter_map(|(pos, _)| self.valid_moves(pos))
            .flatten()
            .collect()
    }

    pub fn is_in_check(&self, color: Color) -> bool {
        is_in_check(&self.board, color)
    }

    pub fn is_in_checkmate(&self, color: Color) -> bool {
        self.is_in_check(color) && !self.has_legal_move(color)
    }

    pub fn is_in_stalemate(&self, color: Color) -> bool {
        !self.is_in_check(color) && !self.has_legal_move(color)
    }

    /// Validates and applies `m` for the side to move. Nothing is mutated on
    /// failure.
    pub fn make_move(&mut self, m: Move) -> Result<()> {
        let piece = self
            .board
            .get(m.start)
            .ok_or_else(|| GameError::InvalidMove(format!("no piece at {}", m.start)))?;
        if piece.color != self.turn {
            return Err(GameError::InvalidMove(format!(
                "it is {}'s turn",
                self.turn
            )));
        }
        let legal = self.valid_moves(m.start).unwrap_or_default();
        if !legal.contains(&m) {
            return Err(GameError::InvalidMove(format!("{} is not legal", m)));
        }
        apply(&mut self.board, piece, m);
        self.turn = self.turn.opponent();
        debug!("applied {} for {}, {} to move", m, piece.color, self.turn);
        Ok(())
    }

    fn has_legal_move(&self, color: Color) -> bool {
        self.board
            .pieces_of(color)
            .any(|(pos, _)| self.valid_moves(pos).is_some_and(|moves| !moves.is_empty()))
    }

    /// Plays `m` on a copy of the board and reports whether `color`'s king
    /// survives it. The live board is never touched.
    fn is_move_safe(&self, m: &Move, color: Color) -> bool {
        let Some(piece) = self.board.get(m.start) else {
            return false;
        };
        let mut trial = self.board.clone();
        apply(&mut trial, piece, *m);
        !is_in_check(&trial, color)
    }

    fn en_passant(&self, pos: Position, color: Color, moves: &mut Vec<Move>) {
        for dc in [-1, 1] {
            let Some(beside) = pos.offset(0, dc) else {
                continue;
            };
            let target = self.board.get(beside);
            if target == Some(Piece::new(color.opponent(), PieceKind::Pawn))
                && self.board.is_en_passantable(beside)
            {
                if let Some(behind) = pos.offset(color.forward(), dc) {
                    moves.push(Move::new(pos, behind, None));
                }
            }
        }
    }

    fn castling(&self, king: Position, color: Color, moves: &mut Vec<Move>) {
        if self.board.has_moved(king) {
            return;
        }
        // (rook column, direction the king travels)
        for (rook_col, dir) in [(8, 1), (1, -1)] {
            let Some(rook) = Position::new(king.row(), rook_col) else {
                continue;
            };
            if self.board.get(rook) != Some(Piece::new(color, PieceKind::Rook))
                || self.board.has_moved(rook)
            {
                continue;
            }
            let (lo, hi) = if dir > 0 {
                (king.col() + 1, rook_col)
            } else {
                (rook_col + 1, king.col())
            };
            let clear = (lo..hi)
                .filter_map(|col| Position::new(king.row(), col))
                .all(|p| self.board.get(p).is_none());
            if !clear {
                continue;
            }
            let (Some(cross), Some(dest)) = (king.offset(0, dir), king.offset(0, 2 * dir)) else {
                continue;
            };
            let attacked = [king, cross, dest]
                .iter()
                .any(|sq| attacks(&self.board, *sq, color.opponent()));
            if !attacked {
                moves.push(Move::new(king, dest, None));
            }
        }
    }
}

fn is_in_check(board: &Board, color: Color) -> bool {
    board
        .king(color)
        .is_some_and(|king| attacks(board, king, color.opponent()))
}

/// Carries out a move that is already known to be legal (or is being
/// trialled): en passant capture, rook hop, promotion, then flag upkeep.
fn apply(board: &mut Board, piece: Piece, m: Move) {
    if piece.kind == PieceKind::Pawn && m.col_delta() != 0 && board.get(m.end).is_none() {
        if let Some(victim) = Position::new(m.start.row(), m.end.col()) {
            board.remove(victim);
        }
    }
    if piece.kind == PieceKind::King && m.col_delta().abs() == 2 {
        let (rook_col, beside) = if m.col_delta() > 0 { (8, -1) } else { (1, 1) };
        if let (Some(from), Some(to)) = (
            Position::new(m.start.row(), rook_col),
            m.end.offset(0, beside),
        ) {
            board.relocate(from, to);
            board.mark_moved(to);
        }
    }
    board.relocate(m.start, m.end);
    if let Some(kind) = m.promotion {
        board.place(m.end, Piece::new(piece.color, kind));
    }
    board.clear_en_passant();
    if piece.kind == PieceKind::Pawn && m.row_delta().abs() == 2 {
        board.set_en_passantable(m.end, true);
    }
    board.mark_moved(m.end);
}
