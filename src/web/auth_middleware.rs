use super::api_error::ApiError;
use crate::core::auth::{AuthError, AuthVerifier};
use crate::core::social::UserId;
use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};
use std::sync::Arc;

/// The caller behind a request. `None` is an anonymous reader.
#[derive(Debug, Clone, Copy)]
pub struct Viewer(pub Option<UserId>);

impl Viewer {
    /// Writes need an authenticated actor.
    pub fn require(self) -> Result<UserId, ApiError> {
        self.0.ok_or(ApiError::Auth(AuthError::Unauthenticated))
    }
}

/// Resolve the bearer token (if any) into a `Viewer` request extension.
///
/// No Authorization header means anonymous; a header that doesn't verify is
/// rejected outright rather than downgraded.
pub async fn authenticate(
    State(verifier): State<Arc<dyn AuthVerifier>>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let viewer = match req.headers().get(header::AUTHORIZATION) {
        None => Viewer(None),
        Some(value) => {
            let token = value
                .to_str()
                .ok()
                .and_then(|v| v.strip_prefix("Bearer "))
                .ok_or(AuthError::Unauthenticated)?;
            Viewer(Some(verifier.verify(token)?))
        }
    };

    req.extensions_mut().insert(viewer);
    Ok(next.run(req).await)
}
