use actix::Message;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::game_state::{GameId, GameSnapshot};

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum ActionType {
    Join,
    Move,
    Resign,
    Leave,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    White,
    Black,
    #[default]
    Observer,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::White => write!(f, "WHITE"),
            Role::Black => write!(f, "BLACK"),
            Role::Observer => write!(f, "OBSERVER"),
        }
    }
}

/// Message sent from client to server
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ChessAction {
    #[serde(rename = "type")]
    pub action_type: ActionType,
    pub identity: String,
    pub game_id: GameId,
    #[serde(rename = "move", default, skip_serializing_if = "Option::is_none")]
    pub move_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_label: Option<String>,
    #[serde(default)]
    pub role: Role,
}

impl ChessAction {
    pub fn new(action_type: ActionType, identity: impl Into<String>, game_id: GameId) -> Self {
        Self {
            action_type,
            identity: identity.into(),
            game_id,
            move_text: None,
            display_label: None,
            role: Role::Observer,
        }
    }

    pub fn with_move(mut self, text: impl Into<String>) -> Self {
        self.move_text = Some(text.into());
        self
    }

    pub fn with_role(mut self, role: Role) -> Self {
        self.role = role;
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.display_label = Some(label.into());
        self
    }

    /// The user-facing game number, falling back to the id.
    pub fn label(&self) -> String {
        self.display_label
            .clone()
            .unwrap_or_else(|| self.game_id.to_string())
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NotificationType {
    PlayerJoined,
    MoveMade,
    Resign,
    PlayerLeft,
}

/// Message sent from server to client
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "serverMessageType", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ServerMessage {
    #[serde(rename_all = "camelCase")]
    LoadGame {
        game: GameSnapshot,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        message: Option<String>,
    },
    #[serde(rename_all = "camelCase")]
    Notification {
        notification_type: NotificationType,
        message: String,
    },
    #[serde(rename_all = "camelCase")]
    Error { error_message: String },
}

impl ServerMessage {
    pub fn notification(notification_type: NotificationType, message: impl Into<String>) -> Self {
        ServerMessage::Notification {
            notification_type,
            message: message.into(),
        }
    }

    pub fn error(message: impl fmt::Display) -> Self {
        ServerMessage::Error {
            error_message: format!("Error: {}", message),
        }
    }
}

/// Message type for WebSocket communication
#[derive(Message)]
#[rtype(result = "()")]
pub struct ChessWebSocketMessage(pub String);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_action_envelope() {
        let json = r#"{"type":"MOVE","identity":"alice","gameId":3,"move":"e2e4"}"#;
        let action: ChessAction = serde_json::from_str(json).unwrap();
        assert_eq!(action.action_type, ActionType::Move);
        assert_eq!(action.move_text.as_deref(), Some("e2e4"));
        assert_eq!(action.role, Role::Observer);
        assert_eq!(action.label(), "3");

        let json = r#"{"type":"JOIN","identity":"bob","gameId":3,"displayLabel":"1","role":"BLACK"}"#;
        let action: ChessAction = serde_json::from_str(json).unwrap();
        assert_eq!(action.role, Role::Black);
        assert_eq!(action.label(), "1");
    }

    #[test]
    fn rejects_unknown_action_type() {
        let json = r#"{"type":"DANCE","identity":"alice","gameId":3}"#;
        assert!(serde_json::from_str::<ChessAction>(json).is_err());
    }

    #[test]
    fn server_messages_are_tagged() {
        let msg = ServerMessage::notification(NotificationType::MoveMade, "alice moved: e2e4");
        let value = serde_json::to_value(&msg).unwrap();
        assert_eq!(value["serverMessageType"], "NOTIFICATION");
        assert_eq!(value["notificationType"], "MOVE_MADE");
        assert_eq!(value["message"], "alice moved: e2e4");

        let value = serde_json::to_value(ServerMessage::error("boom")).unwrap();
        assert_eq!(value["serverMessageType"], "ERROR");
        assert_eq!(value["errorMessage"], "Error: boom");
    }
}
