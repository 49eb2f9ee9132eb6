// Web layer - HTTP routes and the realtime socket.

#[path = "api_error.rs"]
pub mod api_error;

#[path = "auth_middleware.rs"]
pub mod auth_middleware;

#[path = "dto.rs"]
pub mod dto;

#[path = "handlers.rs"]
pub mod handlers;

#[path = "realtime_socket.rs"]
pub mod realtime_socket;

use crate::core::auth::AuthVerifier;
use crate::core::gateway::ModerationGateway;
use crate::core::social::RecordStore;
use crate::infra::realtime::RealtimeHub;
use axum::{
    middleware,
    routing::{get, patch, post},
    Router,
};
use std::sync::Arc;

/// Shared handler state. Generic over the store so tests can swap in the
/// in-memory one.
pub struct AppState<S: RecordStore> {
    pub gateway: Arc<ModerationGateway<S>>,
    pub auth: Arc<dyn AuthVerifier>,
    pub hub: Arc<RealtimeHub>,
}

impl<S: RecordStore> Clone for AppState<S> {
    fn clone(&self) -> Self {
        Self {
            gateway: self.gateway.clone(),
            auth: self.auth.clone(),
            hub: self.hub.clone(),
        }
    }
}

pub fn router<S: RecordStore + 'static>(state: AppState<S>) -> Router {
    Router::new()
        .route("/users", post(handlers::register_user::<S>))
        .route("/users/{id}/follow", post(handlers::toggle_follow::<S>))
        .route(
            "/posts",
            post(handlers::create_post::<S>).get(handlers::list_feed::<S>),
        )
        .route(
            "/posts/{id}",
            get(handlers::get_post::<S>)
                .patch(handlers::edit_post::<S>)
                .delete(handlers::delete_post::<S>),
        )
        .route("/posts/{id}/like", post(handlers::toggle_post_like::<S>))
        .route("/posts/{id}/report", post(handlers::report_post::<S>))
        .route(
            "/posts/{id}/comments",
            get(handlers::list_comments::<S>).post(handlers::create_comment::<S>),
        )
        .route(
            "/comments/{id}",
            patch(handlers::edit_comment::<S>).delete(handlers::delete_comment::<S>),
        )
        .route(
            "/comments/{id}/like",
            post(handlers::toggle_comment_like::<S>),
        )
        .route("/messages", post(handlers::send_message::<S>))
        .route("/messages/{user_id}", get(handlers::list_conversation::<S>))
        .route("/notifications", get(handlers::list_notifications::<S>))
        .route(
            "/notifications/{id}/read",
            post(handlers::mark_notification_read::<S>),
        )
        .route("/ws", get(realtime_socket::socket_handler::<S>))
        .layer(middleware::from_fn_with_state(
            state.auth.clone(),
            auth_middleware::authenticate,
        ))
        .with_state(state)
}

// ============================================================================
// TESTS
// ============================================================================
