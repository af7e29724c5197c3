use actix_web::{delete, get, post, web, HttpResponse};
use validator::Validate;

use crate::{
    app_state::AppState,
    auth::AuthenticatedUser,
    errors::AppError,
    models::dto::{
        request::{CreateContentRequest, FollowUpRequest},
        response::DeleteContentResponse,
    },
};

#[post("/api/contents")]
pub async fn create_content(
    state: web::Data<AppState>,
    request: web::Json<CreateContentRequest>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    request.validate()?;

    let response = state
        .content_service
        .create_content(&request.raw_text, auth.id())
        .await?;
    Ok(HttpResponse::Created().json(response))
}

#[get("/api/contents")]
pub async fn list_contents(
    state: web::Data<AppState>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let contents = state.content_service.list_contents(auth.id()).await?;
    Ok(HttpResponse::Ok().json(contents))
}

#[get("/api/contents/{id}")]
pub async fn get_content(
    state: web::Data<AppState>,
    id: web::Path<String>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let detail = state
        .content_service
        .get_content_detail(&id, auth.id())
        .await?;
    Ok(HttpResponse::Ok().json(detail))
}

#[delete("/api/contents/{id}")]
pub async fn delete_content(
    state: web::Data<AppState>,
    id: web::Path<String>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    state.content_service.delete_content(&id, auth.id()).await?;
    Ok(HttpResponse::Ok().json(DeleteContentResponse {
        message: format!("Content '{}' deleted", id),
    }))
}

#[post("/api/contents/{id}/follow-up")]
pub async fn generate_follow_up(
    state: web::Data<AppState>,
    id: web::Path<String>,
    request: web::Json<FollowUpRequest>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let response = state
        .follow_up_service
        .generate_follow_up(&id, auth.id(), request.progression)
        .await?;
    Ok(HttpResponse::Created().json(response))
}

#[get("/api/contents/{id}/quiz")]
pub async fn get_content_quiz(
    state: web::Data<AppState>,
    id: web::Path<String>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let quiz = state
        .quiz_service
        .get_quiz_by_content(&id, auth.id())
        .await?;
    Ok(HttpResponse::Ok().json(quiz))
}
