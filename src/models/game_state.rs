use serde::{Deserialize, Serialize};

use crate::game::{get_game_status, Color, Game, GameStatus, Piece};

pub type GameId = u32;

/// Persisted record for a specific game
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameState {
    #[serde(rename = "gameID")]
    pub game_id: GameId,
    pub game_name: String,
    pub white_username: Option<String>,
    pub black_username: Option<String>,
    pub game: Game,
}

impl GameState {
    pub fn new(game_id: GameId, game_name: impl Into<String>) -> Self {
        Self {
            game_id,
            game_name: game_name.into(),
            white_username: None,
            black_username: None,
            game: Game::new(),
        }
    }

    /// Identity holding the seat for `color`.
    pub fn player(&self, color: Color) -> Option<&str> {
        match color {
            Color::White => self.white_username.as_deref(),
            Color::Black => self.black_username.as_deref(),
        }
    }

    pub fn seat_mut(&mut self, color: Color) -> &mut Option<String> {
        match color {
            Color::White => &mut self.white_username,
            Color::Black => &mut self.black_username,
        }
    }

    /// Color played by `identity`, if seated.
    pub fn color_of(&self, identity: &str) -> Option<Color> {
        [Color::White, Color::Black]
            .into_iter()
            .find(|color| self.player(*color) == Some(identity))
    }

    pub fn summary(&self) -> GameSummary {
        GameSummary {
            game_id: self.game_id,
            game_name: self.game_name.clone(),
            white_username: self.white_username.clone(),
            black_username: self.black_username.clone(),
        }
    }
}

/// Listing entry without the board
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameSummary {
    #[serde(rename = "gameID")]
    pub game_id: GameId,
    pub game_name: String,
    pub white_username: Option<String>,
    pub black_username: Option<String>,
}

/// Board and game state as sent to clients in LOAD_GAME
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameSnapshot {
    #[serde(rename = "gameID")]
    pub game_id: GameId,
    /// Row 8 first, a-file first.
    pub ranks: Vec<Vec<Option<Piece>>>,
    pub placement: String,
    pub turn: Color,
    pub over: bool,
    pub status: GameStatus,
}

impl From<&GameState> for GameSnapshot {
    fn from(record: &GameState) -> Self {
        let board = record.game.board();
        Self {
            game_id: record.game_id,
            ranks: board.ranks(),
            placement: board.placement(),
            turn: record.game.turn(),
            over: record.game.is_over(),
            status: get_game_status(&record.game),
        }
    }
}
