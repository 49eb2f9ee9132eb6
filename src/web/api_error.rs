// Maps core errors onto HTTP responses.
//
// Body is always JSON: { "error": <code>, "message": <text> }.

use crate::core::auth::AuthError;
use crate::core::gateway::GatewayError;
use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{Path, Query};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use axum_extra::extract::WithRejection;
use serde_json::json;

/// Path extractor whose rejection goes through `ApiError`.
pub type ApiPath<T> = WithRejection<Path<T>, ApiError>;

/// JSON body extractor whose rejection goes through `ApiError`.
pub type ApiJson<T> = WithRejection<Json<T>, ApiError>;

pub type ApiQuery<T> = WithRejection<Query<T>, ApiError>;

#[derive(Debug)]
pub enum ApiError {
    Gateway(GatewayError),
    Auth(AuthError),
}

impl From<GatewayError> for ApiError {
    fn from(err: GatewayError) -> Self {
        ApiError::Gateway(err)
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        ApiError::Auth(err)
    }
}

// Malformed ids and bodies are client input errors like any other.
impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::Gateway(GatewayError::Validation(rejection.body_text()))
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::Gateway(GatewayError::Validation(rejection.body_text()))
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::Gateway(GatewayError::Validation(rejection.body_text()))
    }
}

impl ApiError {
    fn parts(&self) -> (StatusCode, &'static str, String) {
        match self {
            ApiError::Auth(AuthError::Unauthenticated) => (
                StatusCode::UNAUTHORIZED,
                "unauthenticated",
                AuthError::Unauthenticated.to_string(),
            ),
            ApiError::Auth(AuthError::Expired) => (
                StatusCode::UNAUTHORIZED,
                "token_expired",
                AuthError::Expired.to_string(),
            ),
            ApiError::Gateway(err) => {
                let (status, code) = match err {
                    GatewayError::Validation(_) => (StatusCode::BAD_REQUEST, "validation_error"),
                    GatewayError::Policy(reason) => (StatusCode::FORBIDDEN, reason.code()),
                    GatewayError::NotFound(_) => (StatusCode::NOT_FOUND, "not_found"),
                    GatewayError::PermissionDenied(_) => {
                        (StatusCode::FORBIDDEN, "permission_denied")
                    }
                    GatewayError::AdultContentRestricted => {
                        (StatusCode::FORBIDDEN, "adult_content_restricted")
                    }
                    GatewayError::Conflict => (StatusCode::CONFLICT, "conflict"),
                    GatewayError::Storage(msg) => {
                        tracing::error!(error = %msg, "Storage failure while handling request");
                        return (
                            StatusCode::INTERNAL_SERVER_ERROR,
                            "internal_error",
                            "Internal server error".to_string(),
                        );
                    }
                };
                (status, code, err.to_string())
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message) = self.parts();
        (status, Json(json!({ "error": code, "message": message }))).into_response()
    }
}
