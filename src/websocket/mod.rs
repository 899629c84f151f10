pub mod game_handlers;
pub mod handler;
pub mod registry;

use actix_web::{web, Error, HttpRequest, HttpResponse};
use actix_web_actors::ws;
use log::info;
use uuid::Uuid;

pub use game_handlers::SessionCoordinator;
pub use handler::ChessWebSocket;
pub use registry::{Channel, ConnectionRegistry, Outbox};

use crate::models::AppState;

/// WebSocket connection handler
pub async fn ws_index(
    req: HttpRequest,
    stream: web::Payload,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, Error> {
    let id = Uuid::new_v4().to_string();
    info!("New WebSocket connection: {}", id);
    ws::start(ChessWebSocket::new(id, app_state.clone()), &req, stream)
}
