use actix_web::middleware::Logger;
use actix_web::{web, App, HttpServer};
use log::info;

use chess_sync_server::config::ServerConfig;
use chess_sync_server::models::AppState;
use chess_sync_server::routes::configure_routes;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Initialize logger
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let config = ServerConfig::from_env();
    info!("Starting chess sync server at http://{}", config.bind_addr);

    // The registry and store live here and are handed to every worker
    let app_state = web::Data::new(AppState::in_memory(config.clone()));

    HttpServer::new(move || {
        let static_dir = app_state.config.static_dir.clone();
        App::new()
            .wrap(Logger::default())
            .app_data(app_state.clone())
            .configure(|cfg| configure_routes(cfg, &static_dir))
    })
    .workers(config.workers)
    .bind(&config.bind_addr)?
    .run()
    .await
}
