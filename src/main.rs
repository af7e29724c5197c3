use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};

use study_quiz_server::{
    app_state::AppState, config::Config, handlers, middleware::RequestIdMiddleware,
};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenvy::dotenv().ok();
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    let config = Config::from_env();
    if config.is_production() {
        config.validate_for_production();
    }

    let host = config.web_server_host.clone();
    let port = config.web_server_port;

    let state = AppState::new(config).await.map_err(|err| {
        log::error!("Failed to initialize application state: {}", err);
        std::io::Error::other(err)
    })?;
    let database = state.database.clone();

    log::info!("Starting HTTP server on {}:{}", host, port);

    let data = web::Data::new(state);
    let result = HttpServer::new(move || {
        App::new()
            .app_data(data.clone())
            .wrap(Cors::permissive())
            .wrap(Logger::default())
            .wrap(RequestIdMiddleware)
            .configure(handlers::configure)
    })
    .bind((host.as_str(), port))?
    .run()
    .await;

    if let Some(db) = database {
        db.shutdown().await;
    }

    result
}
