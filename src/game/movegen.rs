//! Pseudo-legal move generation: movement patterns and occupancy only.
//! Self-check, en passant and castling are the rules engine's business.

use super::board::Board;
use super::moves::Move;
use super::piece::{Color, Piece, PieceKind};
use super::position::Position;

const ORTHOGONAL: [(i8, i8); 4] = [(1, 0), (-1, 0), (0, 1), (0, -1)];
const DIAGONAL: [(i8, i8); 4] = [(1, 1), (1, -1), (-1, 1), (-1, -1)];
const KNIGHT: [(i8, i8); 8] = [
    (2, 1),
    (2, -1),
    (-2, 1),
    (-2, -1),
    (1, 2),
    (1, -2),
    (-1, 2),
    (-1, -2),
];

/// Destinations of the piece on `from`. Empty when the square is empty.
pub fn piece_moves(board: &Board, from: Position) -> Vec<Move> {
    let Some(piece) = board.get(from) else {
        return Vec::new();
    };
    let mut moves = Vec::new();
    match piece.kind {
        PieceKind::Pawn => pawn(board, from, piece.color, &mut moves),
        PieceKind::Rook => slide(board, from, piece.color, &ORTHOGONAL, &mut moves),
        PieceKind::Bishop => slide(board, from, piece.color, &DIAGONAL, &mut moves),
        PieceKind::Queen => {
            slide(board, from, piece.color, &ORTHOGONAL, &mut moves);
            slide(board, from, piece.color, &DIAGONAL, &mut moves);
        }
        PieceKind::Knight => step(board, from, piece.color, &KNIGHT, &mut moves),
        PieceKind::King => {
            step(board, from, piece.color, &ORTHOGONAL, &mut moves);
            step(board, from, piece.color, &DIAGONAL, &mut moves);
        }
    }
    moves
}

/// Whether any `by` piece's pseudo-legal moves land on `target`.
pub fn attacks(board: &Board, target: Position, by: Color) -> bool {
    board
        .pieces_of(by)
        .any(|(from, _)| piece_moves(board, from).iter().any(|m| m.end == target))
}

fn is_enemy(board: &Board, pos: Position, color: Color) -> bool {
    matches!(board.get(pos), Some(Piece { color: c, .. }) if c != color)
}

fn pawn(board: &Board, from: Position, color: Color, moves: &mut Vec<Move>) {
    let dir = color.forward();
    if let Some(one) = from.offset(dir, 0).filter(|p| board.get(*p).is_none()) {
        push_pawn(from, one, color, moves);
        if from.row() == color.pawn_row() {
            if let Some(two) = one.offset(dir, 0).filter(|p| board.get(*p).is_none()) {
                moves.push(Move::new(from, two, None));
            }
        }
    }
    for dc in [-1, 1] {
        if let Some(diag) = from.offset(dir, dc).filter(|p| is_enemy(board, *p, color)) {
            push_pawn(from, diag, color, moves);
        }
    }
}

fn push_pawn(from: Position, to: Position, color: Color, moves: &mut Vec<Move>) {
    if to.row() == color.last_row() {
        moves.extend(
            PieceKind::PROMOTIONS
                .iter()
                .map(|kind| Move::new(from, to, Some(*kind))),
        );
    } else {
        moves.push(Move::new(from, to, None));
    }
}

fn slide(board: &Board, from: Position, color: Color, dirs: &[(i8, i8)], moves: &mut Vec<Move>) {
    for &(dr, dc) in dirs {
        let mut cursor = from;
        while let Some(next) = cursor.offset(dr, dc) {
            match board.get(next) {
                None => moves.push(Move::new(from, next, None)),
                Some(other) => {
                    if other.color != color {
                        moves.push(Move::new(from, next, None));
                    }
                    break;
                }
            }
            cursor = next;
        }
    }
}

fn step(board: &Board, from: Position, color: Color, offsets: &[(i8, i8)], moves: &mut Vec<Move>) {
    moves.extend(
        offsets
            .iter()
            .filter_map(|&(dr, dc)| from.offset(dr, dc))
            .filter(|to| board.get(*to).map_or(true, |other| other.color != color))
            .map(|to| Move::new(from, to, None)),
    );
}
