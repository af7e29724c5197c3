use actix_web::{get, web, HttpResponse};

use crate::app_state::AppState;

#[get("/health")]
pub async fn health_check() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "healthy",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

#[get("/health/ready")]
pub async fn health_check_ready(state: web::Data<AppState>) -> HttpResponse {
    let storage = state.readiness().await;
    let backend = if state.database.is_some() { "mongodb" } else { "memory" };

    let response = serde_json::json!({
        "status": if storage.is_ok() { "ready" } else { "not_ready" },
        "version": env!("CARGO_PKG_VERSION"),
        "dependencies": {
            backend: if storage.is_ok() { "ok" } else { "error" }
        }
    });

    if storage.is_ok() {
        HttpResponse::Ok().json(response)
    } else {
        log::warn!("Readiness check failed: {:?}", storage.err());
        HttpResponse::ServiceUnavailable().json(response)
    }
}
