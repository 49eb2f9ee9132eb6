// Storage traits (ports) for the social records.
//
// The core defines WHAT it needs; the infra layer provides SQLite and
// in-memory implementations.

use super::social_models::{
    Comment, CommentDraft, CommentId, Message, Notification, NotificationDraft, NotificationId,
    Post, PostDraft, PostId, Report, ToggleKey, User, UserId,
};
use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Record not found")]
    NotFound,

    /// A unique-key insert lost to an existing record.
    #[error("Unique constraint violated")]
    Conflict,

    #[error("Storage error: {0}")]
    Storage(String),
}

/// Presence/absence store for uniquely-keyed relations (likes, follows).
///
/// A record existing IS the relation being active; there is no boolean column.
#[async_trait]
pub trait ToggleStore: Send + Sync {
    async fn relation_exists(&self, key: &ToggleKey) -> Result<bool, StoreError>;

    /// Atomic insert-or-fail. Returns `StoreError::Conflict` if the pair
    /// already exists; never creates a second record.
    async fn insert_relation(&self, key: &ToggleKey) -> Result<(), StoreError>;

    /// Returns whether a record was actually removed.
    async fn delete_relation(&self, key: &ToggleKey) -> Result<bool, StoreError>;
}

/// Generic record store for everything the moderation gateway persists.
#[async_trait]
pub trait RecordStore: ToggleStore {
    // Users
    async fn create_user(&self, name: &str, age: u32) -> Result<User, StoreError>;
    async fn get_user(&self, user_id: UserId) -> Result<Option<User>, StoreError>;

    // Posts
    async fn create_post(&self, draft: PostDraft) -> Result<Post, StoreError>;
    async fn get_post(&self, post_id: PostId) -> Result<Option<Post>, StoreError>;
    async fn update_post(&self, post_id: PostId, draft: PostDraft) -> Result<Post, StoreError>;
    async fn increment_post_views(&self, post_id: PostId) -> Result<(), StoreError>;

    /// Newest first. Adult content is left out unless `include_adult`.
    async fn list_posts(&self, include_adult: bool) -> Result<Vec<Post>, StoreError>;

    /// Deletes the post with its comments, likes (on the post and on its
    /// comments), notifications and reports as one logical operation.
    async fn delete_post_cascade(&self, post_id: PostId) -> Result<(), StoreError>;

    // Comments
    async fn create_comment(&self, draft: CommentDraft) -> Result<Comment, StoreError>;
    async fn get_comment(&self, comment_id: CommentId) -> Result<Option<Comment>, StoreError>;
    async fn update_comment(
        &self,
        comment_id: CommentId,
        content: &str,
        is_adult_content: bool,
    ) -> Result<Comment, StoreError>;

    /// Oldest first.
    async fn list_comments(
        &self,
        post_id: PostId,
        include_adult: bool,
    ) -> Result<Vec<Comment>, StoreError>;

    /// Deletes the comment with its likes and notifications.
    async fn delete_comment_cascade(&self, comment_id: CommentId) -> Result<(), StoreError>;

    // Social graph
    /// True if a follow edge exists in either direction.
    async fn follow_exists_between(&self, a: UserId, b: UserId) -> Result<bool, StoreError>;

    // Direct messages
    async fn create_message(
        &self,
        sender_id: UserId,
        receiver_id: UserId,
        content: &str,
    ) -> Result<Message, StoreError>;

    /// Both directions, oldest first.
    async fn list_messages_between(
        &self,
        a: UserId,
        b: UserId,
    ) -> Result<Vec<Message>, StoreError>;

    /// Marks messages from `sender_id` to `receiver_id` as read. Returns how many changed.
    async fn mark_messages_read(
        &self,
        receiver_id: UserId,
        sender_id: UserId,
    ) -> Result<u64, StoreError>;

    // Notifications
    async fn create_notification(
        &self,
        draft: NotificationDraft,
    ) -> Result<Notification, StoreError>;
    async fn get_notification(
        &self,
        notification_id: NotificationId,
    ) -> Result<Option<Notification>, StoreError>;

    /// Newest first.
    async fn list_notifications(&self, user_id: UserId) -> Result<Vec<Notification>, StoreError>;
    async fn mark_notification_read(
        &self,
        notification_id: NotificationId,
    ) -> Result<(), StoreError>;

    // Reports
    async fn create_report(
        &self,
        reporter_id: UserId,
        post_id: PostId,
        reason: &str,
    ) -> Result<Report, StoreError>;
}
