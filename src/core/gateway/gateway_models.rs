// Gateway models - error taxonomy and the realtime fan-out port.

use crate::core::social::{Message, Notification, StoreError, UserId};
use serde::Serialize;
use thiserror::Error;

/// Why a request was refused by a rule (as opposed to missing data).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PolicyReason {
    SelfMessage,
    AgeRestricted,
    SelfFollow,
}

impl PolicyReason {
    pub fn code(&self) -> &'static str {
        match self {
            PolicyReason::SelfMessage => "self_message",
            PolicyReason::AgeRestricted => "age_restricted",
            PolicyReason::SelfFollow => "self_follow",
        }
    }
}

impl std::fmt::Display for PolicyReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PolicyReason::SelfMessage => write!(f, "You can't message yourself"),
            PolicyReason::AgeRestricted => write!(
                f,
                "Adults and minors can only message each other if one follows the other"
            ),
            PolicyReason::SelfFollow => write!(f, "You can't follow yourself"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    User,
    Post,
    Comment,
    Notification,
    Record,
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EntityKind::User => write!(f, "User"),
            EntityKind::Post => write!(f, "Post"),
            EntityKind::Comment => write!(f, "Comment"),
            EntityKind::Notification => write!(f, "Notification"),
            EntityKind::Record => write!(f, "Record"),
        }
    }
}

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("{0}")]
    Policy(PolicyReason),

    #[error("{0} not found")]
    NotFound(EntityKind),

    #[error("You don't have permission to modify this {0}")]
    PermissionDenied(EntityKind),

    #[error("This content is only visible to adult users")]
    AdultContentRestricted,

    #[error("Conflicting write, please retry")]
    Conflict,

    #[error("Storage error: {0}")]
    Storage(String),
}

impl From<StoreError> for GatewayError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound => GatewayError::NotFound(EntityKind::Record),
            StoreError::Conflict => GatewayError::Conflict,
            StoreError::Storage(msg) => GatewayError::Storage(msg),
        }
    }
}

/// Payload mirrored to a user's live connections.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum RealtimeEvent {
    Notification(Notification),
    Message(Message),
}

/// Best-effort delivery to a user's live clients. The persisted record is
/// authoritative; a failed delivery is never an error for the caller.
pub trait RealtimeNotifier: Send + Sync {
    fn notify_user(&self, user_id: UserId, event: RealtimeEvent);
}
