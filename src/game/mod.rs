pub mod board;
pub mod movegen;
pub mod moves;
pub mod piece;
pub mod position;
pub mod rules;
pub mod utils;

// Re-export important types
pub use board::Board;
pub use moves::Move;
pub use piece::{Color, Piece, PieceKind};
pub use position::Position;
pub use rules::Game;
pub use utils::{get_game_status, GameStatus};
