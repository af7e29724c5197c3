use std::future::{ready, Ready};

use actix_web::{FromRequest, HttpRequest};

use crate::errors::AppError;

/// Header the upstream gateway sets after authenticating the caller.
pub const USER_ID_HEADER: &str = "x-user-id";

/// Extractor for the authenticated caller in handlers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser(pub String);

impl AuthenticatedUser {
    pub fn id(&self) -> &str {
        &self.0
    }
}

impl FromRequest for AuthenticatedUser {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut actix_web::dev::Payload) -> Self::Future {
        let user = req
            .headers()
            .get(USER_ID_HEADER)
            .and_then(|h| h.to_str().ok())
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .map(|id| AuthenticatedUser(id.to_string()))
            .ok_or_else(|| AppError::Unauthorized("Not authenticated".to_string()));

        ready(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test::TestRequest;

    #[actix_web::test]
    async fn extracts_user_id_header() {
        let req = TestRequest::default()
            .insert_header((USER_ID_HEADER, " user-42 "))
            .to_http_request();

        let user = AuthenticatedUser::extract(&req).await.unwrap();

        assert_eq!(user.id(), "user-42");
    }

    #[actix_web::test]
    async fn missing_header_is_unauthorized() {
        let req = TestRequest::default().to_http_request();

        let err = AuthenticatedUser::extract(&req).await.unwrap_err();

        assert!(matches!(err, AppError::Unauthorized(_)));
    }

    #[actix_web::test]
    async fn blank_header_is_unauthorized() {
        let req = TestRequest::default()
            .insert_header((USER_ID_HEADER, "   "))
            .to_http_request();

        assert!(AuthenticatedUser::extract(&req).await.is_err());
    }
}
