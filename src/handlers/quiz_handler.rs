use actix_web::{get, post, web, HttpResponse};
use validator::Validate;

use crate::{
    app_state::AppState,
    auth::AuthenticatedUser,
    errors::AppError,
    models::dto::{request::FinalizeQuizRequest, response::SummaryResponse},
};

#[get("/api/quizzes")]
pub async fn list_quizzes(
    state: web::Data<AppState>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let quizzes = state.quiz_service.list_quizzes(auth.id()).await?;
    Ok(HttpResponse::Ok().json(quizzes))
}

#[get("/api/quizzes/{id}")]
pub async fn get_quiz(
    state: web::Data<AppState>,
    id: web::Path<String>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let quiz = state
        .quiz_service
        .get_quiz_for_taking(&id, auth.id())
        .await?;
    Ok(HttpResponse::Ok().json(quiz))
}

#[post("/api/quizzes/{id}/finalize")]
pub async fn finalize_quiz(
    state: web::Data<AppState>,
    id: web::Path<String>,
    request: web::Json<FinalizeQuizRequest>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    request.validate()?;

    let result = state
        .quiz_attempt_service
        .finalize(&id, auth.id(), &request.answers)
        .await?;
    Ok(HttpResponse::Ok().json(result))
}

#[get("/api/quizzes/{id}/summary")]
pub async fn get_quiz_summary(
    state: web::Data<AppState>,
    id: web::Path<String>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let text = state.summary_service.get_summary(&id, auth.id()).await?;
    Ok(HttpResponse::Ok().json(SummaryResponse { text }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        auth::USER_ID_HEADER,
        test_utils::{generating_model, test_state},
    };
    use actix_web::{http::StatusCode, test, App};

    #[actix_web::test]
    async fn finalize_then_read_summary() {
        let state = test_state(generating_model());
        let created = state
            .content_service
            .create_content("Plants convert light into sugar.", "alice")
            .await
            .unwrap();
        let quiz = state
            .quiz_service
            .get_quiz_for_taking(&created.quiz.id, "alice")
            .await
            .unwrap();
        let answers: Vec<_> = quiz
            .questions
            .iter()
            .map(|q| {
                let option = q.options.iter().find(|o| o.is_correct).unwrap();
                serde_json::json!({ "question_id": q.id, "option_id": option.id })
            })
            .collect();

        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(state))
                .configure(crate::handlers::configure),
        )
        .await;

        let req = test::TestRequest::post()
            .uri(&format!("/api/quizzes/{}/finalize", created.quiz.id))
            .insert_header((USER_ID_HEADER, "alice"))
            .set_json(serde_json::json!({ "answers": answers }))
            .to_request();
        let result: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(result["correct_answers"], 7);
        assert_eq!(result["percentage"], 100);
        assert_eq!(result["attempt_number"], 1);

        let req = test::TestRequest::get()
            .uri(&format!("/api/quizzes/{}/summary", created.quiz.id))
            .insert_header((USER_ID_HEADER, "alice"))
            .to_request();
        let summary: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(summary["text"], result["summary_text"]);
    }

    #[actix_web::test]
    async fn finalize_with_too_few_answers_is_bad_request() {
        let state = test_state(generating_model());
        let created = state
            .content_service
            .create_content("Plants convert light into sugar.", "alice")
            .await
            .unwrap();
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(state))
                .configure(crate::handlers::configure),
        )
        .await;

        let req = test::TestRequest::post()
            .uri(&format!("/api/quizzes/{}/finalize", created.quiz.id))
            .insert_header((USER_ID_HEADER, "alice"))
            .set_json(serde_json::json!({ "answers": [] }))
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn list_quizzes_is_scoped_to_caller() {
        let state = test_state(generating_model());
        state
            .content_service
            .create_content("Plants convert light into sugar.", "alice")
            .await
            .unwrap();
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(state))
                .configure(crate::handlers::configure),
        )
        .await;

        for (user, expected) in [("alice", 1), ("bob", 0)] {
            let req = test::TestRequest::get()
                .uri("/api/quizzes")
                .insert_header((USER_ID_HEADER, user))
                .to_request();
            let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
            assert_eq!(body.as_array().unwrap().len(), expected);
        }
    }
}
