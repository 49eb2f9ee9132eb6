// Request bodies. Responses serialize the core models directly.

use crate::core::social::UserId;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct RegisterUserRequest {
    pub name: String,
    pub age: u32,
}

/// Used for both create and edit.
#[derive(Debug, Deserialize)]
pub struct PostRequest {
    pub content: String,
    #[serde(default)]
    pub image_url: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CommentRequest {
    pub content: String,
}

#[derive(Debug, Deserialize)]
pub struct ReportRequest {
    pub reason: String,
}

#[derive(Debug, Deserialize)]
pub struct SendMessageRequest {
    pub receiver_id: UserId,
    pub content: String,
}

#[derive(Debug, Deserialize)]
pub struct SocketQuery {
    pub token: String,
}
