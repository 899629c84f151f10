//! The session coordinator: turns JOIN/MOVE/RESIGN/LEAVE actions into store
//! updates, rules-engine calls and registry fan-out.

use log::{info, warn};
use std::sync::Arc;

use super::registry::{Channel, ConnectionRegistry};
use crate::error::{GameError, Result};
use crate::game::{Color, GameStatus, Move, PieceKind};
use crate::models::{
    ActionType, ChessAction, GameId, GameSnapshot, GameState, NotificationType, Role,
    ServerMessage,
};
use crate::store::GameStore;

#[derive(Clone)]
pub struct SessionCoordinator {
    store: Arc<dyn GameStore>,
    registry: Arc<ConnectionRegistry>,
}

impl SessionCoordinator {
    pub fn new(store: Arc<dyn GameStore>, registry: Arc<ConnectionRegistry>) -> Self {
        Self { store, registry }
    }

    pub fn registry(&self) -> &Arc<ConnectionRegistry> {
        &self.registry
    }

    /// Processes one action from the connection behind `channel`. Failures are
    /// reported to that connection only.
    pub fn handle_message(&self, action: ChessAction, channel: &Channel) {
        info!(
            "{:?} from {} on game {}",
            action.action_type, action.identity, action.game_id
        );
        let result = match action.action_type {
            ActionType::Join => self.handle_join(&action, channel),
            ActionType::Move => self.handle_move(&action),
            ActionType::Resign => self.handle_resign(&action),
            ActionType::Leave => self.handle_leave(&action),
        };
        if let Err(e) = result {
            warn!(
                "{:?} from {} on game {} failed: {}",
                action.action_type, action.identity, action.game_id, e
            );
            reply(channel, &ServerMessage::error(&e));
        }
    }

    pub fn handle_join(&self, action: &ChessAction, channel: &Channel) -> Result<()> {
        let identity = action.identity.as_str();
        let record = match seat_color(action.role) {
            Some(color) => self.store.update_with(action.game_id, &mut |record| {
                claim_seat(record, identity, color)
            })?,
            None => self.store.get(action.game_id)?,
        };
        self.registry.add(identity, action.game_id, channel.clone());

        let label = action.label();
        let load = ServerMessage::LoadGame {
            game: GameSnapshot::from(&record),
            message: Some(format!("You joined game {} as {}", label, action.role)),
        };
        self.registry.send_to(action.game_id, identity, &load);

        let joined = ServerMessage::notification(
            NotificationType::PlayerJoined,
            format!("{} joined game {} as {}", identity, label, action.role),
        );
        self.registry.broadcast(action.game_id, &joined, Some(identity));
        Ok(())
    }

    pub fn handle_move(&self, action: &ChessAction) -> Result<()> {
        let text = action
            .move_text
            .as_deref()
            .ok_or_else(|| GameError::MalformedAction("MOVE requires a move".into()))?;
        let requested: Move = text.parse()?;
        let identity = action.identity.as_str();

        let record = self.store.update_with(action.game_id, &mut |record| {
            if record.game.is_over() {
                return Err(GameError::InvalidMove("the game is over".into()));
            }
            let turn = record.game.turn();
            if record.player(turn) != Some(identity) {
                return Err(GameError::InvalidMove("it is not your turn".into()));
            }
            let m = with_default_promotion(record, requested);
            record.game.make_move(m)
        })?;

        let snapshot = GameSnapshot::from(&record);
        let status = snapshot.status;
        let mut message = format!("{} moved: {}", identity, text);
        if status.is_terminal() || matches!(status, GameStatus::Check(_)) {
            message = format!("{} ({})", message, status);
        }
        let moved = ServerMessage::notification(NotificationType::MoveMade, message);
        self.registry.broadcast(action.game_id, &moved, None);

        let load = ServerMessage::LoadGame {
            game: snapshot,
            message: None,
        };
        self.registry.broadcast(action.game_id, &load, None);
        Ok(())
    }

    pub fn handle_resign(&self, action: &ChessAction) -> Result<()> {
        let identity = action.identity.as_str();
        self.store.update_with(action.game_id, &mut |record| {
            if record.color_of(identity).is_none() {
                return Err(GameError::InvalidMove(
                    "only a seated player can resign".into(),
                ));
            }
            record.game.set_over(true);
            Ok(())
        })?;
        let resigned = ServerMessage::notification(
            NotificationType::Resign,
            format!(
                "{} resigned from game {} as {}",
                identity,
                action.label(),
                action.role
            ),
        );
        self.registry.broadcast(action.game_id, &resigned, None);
        Ok(())
    }

    pub fn handle_leave(&self, action: &ChessAction) -> Result<()> {
        let identity = action.identity.as_str();
        let left = ServerMessage::notification(
            NotificationType::PlayerLeft,
            format!(
                "{} left game {} as {}",
                identity,
                action.label(),
                action.role
            ),
        );
        self.registry.broadcast(action.game_id, &left, None);
        self.registry.remove(identity, action.game_id);
        self.release_seats(identity, action.game_id);
        Ok(())
    }

    /// Frees every seat `identity` holds on `game_id`. Unseated identities
    /// and unknown games are left alone.
    fn release_seats(&self, identity: &str, game_id: GameId) {
        let seated = self
            .store
            .get(game_id)
            .is_ok_and(|record| record.color_of(identity).is_some());
        if !seated {
            return;
        }
        let released = self.store.update_with(game_id, &mut |record| {
            for color in [Color::White, Color::Black] {
                let seat = record.seat_mut(color);
                if seat.as_deref() == Some(identity) {
                    *seat = None;
                }
            }
            Ok(())
        });
        match released {
            Ok(_) => info!("{} gave up their seat in game {}", identity, game_id),
            Err(e) => warn!("could not free {}'s seat in game {}: {}", identity, game_id, e),
        }
    }
}

fn reply(channel: &Channel, message: &ServerMessage) {
    match serde_json::to_string(message) {
        Ok(text) => {
            if !channel.deliver(text) {
                warn!("reply dropped, connection closed");
            }
        }
        Err(e) => warn!("Error serializing message: {}", e),
    }
}

fn seat_color(role: Role) -> Option<Color> {
    match role {
        Role::White => Some(Color::White),
        Role::Black => Some(Color::Black),
        Role::Observer => None,
    }
}

fn claim_seat(record: &mut GameState, identity: &str, color: Color) -> Result<()> {
    let seat = record.seat_mut(color);
    match seat.as_deref() {
        None => {
            *seat = Some(identity.to_string());
            Ok(())
        }
        Some(holder) if holder == identity => Ok(()),
        Some(_) => Err(GameError::InvalidMove(format!(
            "{} seat already taken",
            color
        ))),
    }
}

/// Move text cannot name a promotion piece, so a bare pawn move onto the last
/// row promotes to a queen.
fn with_default_promotion(record: &GameState, m: Move) -> Move {
    let promotes = record
        .game
        .board()
        .get(m.start)
        .is_some_and(|piece| piece.kind == PieceKind::Pawn && m.end.row() == piece.color.last_row());
    if promotes && m.promotion.is_none() {
        Move::new(m.start, m.end, Some(PieceKind::Queen))
    } else {
        m
    }
}
