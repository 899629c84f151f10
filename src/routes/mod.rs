use actix_files as fs;
use actix_web::http::StatusCode;
use actix_web::{web, HttpResponse, Responder, ResponseError};
use serde::{Deserialize, Serialize};

use crate::error::GameError;
use crate::models::{AppState, GameId, GameSnapshot, GameSummary};

impl ResponseError for GameError {
    fn status_code(&self) -> StatusCode {
        match self {
            GameError::NotFound(_) => StatusCode::NOT_FOUND,
            GameError::InvalidMove(_) | GameError::MalformedAction(_) => StatusCode::BAD_REQUEST,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code())
            .json(serde_json::json!({ "message": format!("Error: {}", self) }))
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateGameRequest {
    pub game_name: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CreateGameResponse {
    #[serde(rename = "gameID")]
    pub game_id: GameId,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ListGamesResponse {
    pub games: Vec<GameSummary>,
}

/// HTTP handler for the index page
pub async fn index() -> impl Responder {
    HttpResponse::Ok().body("Chess sync server")
}

pub async fn create_game(
    state: web::Data<AppState>,
    body: web::Json<CreateGameRequest>,
) -> Result<HttpResponse, GameError> {
    let name = body.game_name.trim();
    if name.is_empty() {
        return Err(GameError::MalformedAction("gameName is required".into()));
    }
    let game_id = state.store.create(name);
    Ok(HttpResponse::Ok().json(CreateGameResponse { game_id }))
}

pub async fn list_games(state: web::Data<AppState>) -> impl Responder {
    let games = state.store.list().iter().map(|r| r.summary()).collect();
    HttpResponse::Ok().json(ListGamesResponse { games })
}

pub async fn get_game(
    state: web::Data<AppState>,
    path: web::Path<GameId>,
) -> Result<HttpResponse, GameError> {
    let record = state.store.get(path.into_inner())?;
    Ok(HttpResponse::Ok().json(GameSnapshot::from(&record)))
}

/// Configure the HTTP routes
pub fn configure_routes(cfg: &mut web::ServiceConfig, static_dir: &str) {
    cfg.service(web::resource("/ws").route(web::get().to(crate::websocket::ws_index)))
        .service(
            web::resource("/games")
                .route(web::get().to(list_games))
                .route(web::post().to(create_game)),
        )
        .service(web::resource("/games/{id}").route(web::get().to(get_game)))
        .service(web::resource("/").route(web::get().to(index)))
        .service(fs::Files::new("/static", static_dir));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ServerConfig;
    use actix_web::{test, App};

    fn state() -> web::Data<AppState> {
        web::Data::new(AppState::in_memory(ServerConfig::default()))
    }

    #[actix_rt::test]
    async fn create_then_list_and_fetch() {
        let state = state();
        let app = test::init_service(
            App::new()
                .app_data(state.clone())
                .configure(|cfg| configure_routes(cfg, "./static")),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/games")
            .set_json(serde_json::json!({ "gameName": "friday" }))
            .to_request();
        let created: CreateGameResponse = test::call_and_read_body_json(&app, req).await;

        let req = test::TestRequest::get().uri("/games").to_request();
        let listed: ListGamesResponse = test::call_and_read_body_json(&app, req).await;
        assert_eq!(listed.games.len(), 1);
        assert_eq!(listed.games[0].game_id, created.game_id);
        assert_eq!(listed.games[0].game_name, "friday");

        let req = test::TestRequest::get()
            .uri(&format!("/games/{}", created.game_id))
            .to_request();
        let snapshot: GameSnapshot = test::call_and_read_body_json(&app, req).await;
        assert_eq!(snapshot.placement, "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR");
        assert!(!snapshot.over);
    }

    #[actix_rt::test]
    async fn unknown_game_and_blank_name() {
        let app = test::init_service(
            App::new()
                .app_data(state())
                .configure(|cfg| configure_routes(cfg, "./static")),
        )
        .await;

        let req = test::TestRequest::get().uri("/games/404").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);

        let req = test::TestRequest::post()
            .uri("/games")
            .set_json(serde_json::json!({ "gameName": "  " }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }
}
