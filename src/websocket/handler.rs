use actix::*;
use actix_web::web;
use actix_web_actors::ws;
use log::{info, warn};
use std::collections::HashSet;
use std::sync::Arc;

use super::registry::Channel;
use crate::models::{ActionType, AppState, ChessAction, ChessWebSocketMessage, GameId, ServerMessage};

/// WebSocket handler for one client connection
pub struct ChessWebSocket {
    pub id: String,
    pub app_state: web::Data<AppState>,
    channel: Option<Channel>,
    watching: HashSet<(GameId, String)>,
}

impl ChessWebSocket {
    pub fn new(id: String, app_state: web::Data<AppState>) -> Self {
        Self {
            id,
            app_state,
            channel: None,
            watching: HashSet::new(),
        }
    }

    fn handle_text(&mut self, text: &str, ctx: &mut ws::WebsocketContext<Self>) {
        let action = match serde_json::from_str::<ChessAction>(text) {
            Ok(action) => action,
            Err(e) => {
                warn!("Error parsing client message on {}: {}", self.id, e);
                send_error(ctx, format!("Invalid message format: {}", e));
                return;
            }
        };
        let Some(channel) = self.channel.clone() else {
            return;
        };
        let key = (action.game_id, action.identity.clone());
        match action.action_type {
            ActionType::Join => {
                self.watching.insert(key);
            }
            ActionType::Leave => {
                self.watching.remove(&key);
            }
            ActionType::Move | ActionType::Resign => {}
        }
        self.app_state.coordinator.handle_message(action, &channel);
    }
}

fn send_error(ctx: &mut ws::WebsocketContext<ChessWebSocket>, message: String) {
    match serde_json::to_string(&ServerMessage::error(message)) {
        Ok(text) => ctx.text(text),
        Err(e) => warn!("Error serializing message: {}", e),
    }
}

impl Actor for ChessWebSocket {
    type Context = ws::WebsocketContext<Self>;

    fn started(&mut self, ctx: &mut Self::Context) {
        self.channel = Some(Arc::new(ctx.address()));
        info!("WebSocket connection started: {}", self.id);
    }

    fn stopping(&mut self, _: &mut Self::Context) -> Running {
        // Drop every registration made through this connection
        if let Some(channel) = self.channel.take() {
            let registry = self.app_state.coordinator.registry();
            for (game_id, identity) in self.watching.drain() {
                registry.remove_channel(&identity, game_id, &channel);
                info!("Removed {} from game {} on disconnect", identity, game_id);
            }
        }
        info!("WebSocket connection closed: {}", self.id);
        Running::Stop
    }
}

impl Handler<ChessWebSocketMessage> for ChessWebSocket {
    type Result = ();

    fn handle(&mut self, msg: ChessWebSocketMessage, ctx: &mut Self::Context) {
        ctx.text(msg.0);
    }
}

// WebSocket message handler
impl StreamHandler<Result<ws::Message, ws::ProtocolError>> for ChessWebSocket {
    fn handle(&mut self, msg: Result<ws::Message, ws::ProtocolError>, ctx: &mut Self::Context) {
        match msg {
            Ok(ws::Message::Ping(msg)) => {
                ctx.pong(&msg);
            }
            Ok(ws::Message::Pong(_)) => {}
            Ok(ws::Message::Text(text)) => {
                self.handle_text(&text, ctx);
            }
            Ok(ws::Message::Binary(_)) => {
                warn!("Binary messages are not supported");
                send_error(ctx, "Binary messages are not supported".to_string());
            }
            Ok(ws::Message::Close(reason)) => {
                info!("Connection closed: {:?}", reason);
                ctx.close(reason);
                ctx.stop();
            }
            _ => {
                ctx.stop();
            }
        }
    }
}
