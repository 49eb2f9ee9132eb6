// Social domain models - the records the moderation core reads and writes.
//
// These are pure domain types with no storage dependencies.
// Identifiers are opaque numbers; 0 is never a valid id.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub type UserId = u64;
pub type PostId = u64;
pub type CommentId = u64;
pub type MessageId = u64;
pub type NotificationId = u64;
pub type ReportId = u64;

/// Users this age or older count as adults.
pub const ADULT_AGE: u32 = 19;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub age: u32,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn is_adult(&self) -> bool {
        self.age >= ADULT_AGE
    }

    pub fn is_minor(&self) -> bool {
        !self.is_adult()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub id: PostId,
    pub author_id: UserId,
    pub content: String,
    pub image_url: Option<String>,
    /// Set by the text filter on every write, never by the client.
    pub is_adult_content: bool,
    pub view_count: u64,
    pub created_at: DateTime<Utc>,
}

/// Values for a post write, after filtering.
#[derive(Debug, Clone)]
pub struct PostDraft {
    pub author_id: UserId,
    pub content: String,
    pub image_url: Option<String>,
    pub is_adult_content: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub id: CommentId,
    pub post_id: PostId,
    pub author_id: UserId,
    pub content: String,
    pub is_adult_content: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct CommentDraft {
    pub post_id: PostId,
    pub author_id: UserId,
    pub content: String,
    pub is_adult_content: bool,
}

/// A direct message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: MessageId,
    pub sender_id: UserId,
    pub receiver_id: UserId,
    pub content: String,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NotificationKind {
    Like,
    Comment,
    Follow,
    Message,
}

impl NotificationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationKind::Like => "LIKE",
            NotificationKind::Comment => "COMMENT",
            NotificationKind::Follow => "FOLLOW",
            NotificationKind::Message => "MESSAGE",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "LIKE" => Some(NotificationKind::Like),
            "COMMENT" => Some(NotificationKind::Comment),
            "FOLLOW" => Some(NotificationKind::Follow),
            "MESSAGE" => Some(NotificationKind::Message),
            _ => None,
        }
    }
}

impl std::fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub id: NotificationId,
    pub kind: NotificationKind,
    /// Recipient
    pub user_id: UserId,
    /// Actor
    pub creator_id: UserId,
    pub post_id: Option<PostId>,
    pub comment_id: Option<CommentId>,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationDraft {
    pub kind: NotificationKind,
    pub user_id: UserId,
    pub creator_id: UserId,
    pub post_id: Option<PostId>,
    pub comment_id: Option<CommentId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Report {
    pub id: ReportId,
    pub reporter_id: UserId,
    pub post_id: PostId,
    pub reason: String,
    pub created_at: DateTime<Utc>,
}

/// Which uniquely-keyed relation a toggle key belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationKind {
    PostLike,
    CommentLike,
    Follow,
}

/// The unique pair behind a Like or Follow record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ToggleKey {
    pub kind: RelationKind,
    pub actor_id: UserId,
    pub target_id: u64,
}

impl ToggleKey {
    pub fn post_like(user_id: UserId, post_id: PostId) -> Self {
        Self {
            kind: RelationKind::PostLike,
            actor_id: user_id,
            target_id: post_id,
        }
    }

    pub fn comment_like(user_id: UserId, comment_id: CommentId) -> Self {
        Self {
            kind: RelationKind::CommentLike,
            actor_id: user_id,
            target_id: comment_id,
        }
    }

    pub fn follow(follower_id: UserId, following_id: UserId) -> Self {
        Self {
            kind: RelationKind::Follow,
            actor_id: follower_id,
            target_id: following_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(age: u32) -> User {
        User {
            id: 1,
            name: "tester".to_string(),
            age,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_adult_threshold() {
        assert!(user(18).is_minor());
        assert!(user(19).is_adult());
        assert!(!user(19).is_minor());
        assert!(user(0).is_minor());
    }

    #[test]
    fn test_notification_kind_wire_names() {
        for kind in [
            NotificationKind::Like,
            NotificationKind::Comment,
            NotificationKind::Follow,
            NotificationKind::Message,
        ] {
            assert_eq!(NotificationKind::parse(kind.as_str()), Some(kind));
            let json = serde_json::to_string(&kind).unwrap();
            assert_eq!(json, format!("\"{}\"", kind));
        }
        assert_eq!(NotificationKind::parse("like"), None);
    }
}
