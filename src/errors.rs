use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Well-formed request that breaks a business rule.
    #[error("Policy violation: {0}")]
    PolicyError(String),

    #[error("Generation failure: {0}")]
    GenerationFailure(String),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Internal server error: {0}")]
    InternalError(String),
}

impl AppError {
    pub fn error_code(&self) -> &'static str {
        match self {
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::Forbidden(_) => "FORBIDDEN",
            AppError::Unauthorized(_) => "UNAUTHORIZED",
            AppError::ValidationError(_) => "VALIDATION_ERROR",
            AppError::PolicyError(_) => "POLICY_ERROR",
            AppError::GenerationFailure(_) => "GENERATION_FAILURE",
            AppError::DatabaseError(_) => "DATABASE_ERROR",
            AppError::InternalError(_) => "INTERNAL_ERROR",
        }
    }

    pub fn message(&self) -> &str {
        match self {
            AppError::NotFound(msg)
            | AppError::Forbidden(msg)
            | AppError::Unauthorized(msg)
            | AppError::ValidationError(msg)
            | AppError::PolicyError(msg)
            | AppError::GenerationFailure(msg)
            | AppError::DatabaseError(msg)
            | AppError::InternalError(msg) => msg,
        }
    }

    /// Prefixes the message with workflow context while keeping the error kind,
    /// so the status code of the original cause survives the wrapping.
    pub fn with_context(self, context: &str) -> Self {
        let wrap = |msg: String| format!("{}: {}", context, msg);
        match self {
            AppError::NotFound(msg) => AppError::NotFound(wrap(msg)),
            AppError::Forbidden(msg) => AppError::Forbidden(wrap(msg)),
            AppError::Unauthorized(msg) => AppError::Unauthorized(wrap(msg)),
            AppError::ValidationError(msg) => AppError::ValidationError(wrap(msg)),
            AppError::PolicyError(msg) => AppError::PolicyError(wrap(msg)),
            AppError::GenerationFailure(msg) => AppError::GenerationFailure(wrap(msg)),
            AppError::DatabaseError(msg) => AppError::DatabaseError(wrap(msg)),
            AppError::InternalError(msg) => AppError::InternalError(wrap(msg)),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: u16,
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::ValidationError(_) => StatusCode::BAD_REQUEST,
            AppError::PolicyError(_) => StatusCode::BAD_REQUEST,
            AppError::GenerationFailure(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::DatabaseError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(ErrorResponse {
            error: self.to_string(),
            code: self.status_code().as_u16(),
        })
    }
}

impl From<mongodb::error::Error> for AppError {
    fn from(err: mongodb::error::Error) -> Self {
        AppError::DatabaseError(err.to_string())
    }
}

impl From<mongodb::bson::ser::Error> for AppError {
    fn from(err: mongodb::bson::ser::Error) -> Self {
        AppError::InternalError(format!("BSON serialization error: {}", err))
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        AppError::ValidationError(err.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::GenerationFailure(format!("could not decode model output: {}", err))
    }
}

pub type AppResult<T> = Result<T, AppError>;
