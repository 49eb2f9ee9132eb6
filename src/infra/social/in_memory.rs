// In-memory implementation of RecordStore.
//
// Used by tests and for running the service without a database file.
// Each table is a DashMap keyed by id; ids come from one shared counter so
// they stay monotonic (newer record => larger id).

use crate::core::social::{
    Comment, CommentDraft, CommentId, Message, Notification, NotificationDraft, NotificationId,
    Post, PostDraft, PostId, RecordStore, RelationKind, Report, ReportId, StoreError, ToggleKey,
    ToggleStore, User, UserId,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};

/// In-memory record store.
///
/// **DashMap:**
/// Concurrent requests can hit the same table; DashMap's `entry()` API gives
/// the atomic insert-or-fail the toggle relations rely on.
pub struct InMemoryRecordStore {
    next_id: AtomicU64,
    users: DashMap<UserId, User>,
    posts: DashMap<PostId, Post>,
    comments: DashMap<CommentId, Comment>,
    messages: DashMap<u64, Message>,
    notifications: DashMap<NotificationId, Notification>,
    reports: DashMap<ReportId, Report>,
    /// Presence of a key = relation active
    relations: DashMap<ToggleKey, DateTime<Utc>>,
}

impl InMemoryRecordStore {
    pub fn new() -> Self {
        Self {
            next_id: AtomicU64::new(1),
            users: DashMap::new(),
            posts: DashMap::new(),
            comments: DashMap::new(),
            messages: DashMap::new(),
            notifications: DashMap::new(),
            reports: DashMap::new(),
            relations: DashMap::new(),
        }
    }

    fn next_id(&self) -> u64 {
        self.next_id.fetch_add(1, Ordering::Relaxed)
    }
}

impl Default for InMemoryRecordStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ToggleStore for InMemoryRecordStore {
    async fn relation_exists(&self, key: &ToggleKey) -> Result<bool, StoreError> {
        Ok(self.relations.contains_key(key))
    }

    async fn insert_relation(&self, key: &ToggleKey) -> Result<(), StoreError> {
        match self.relations.entry(*key) {
            Entry::Occupied(_) => Err(StoreError::Conflict),
            Entry::Vacant(slot) => {
                slot.insert(Utc::now());
                Ok(())
            }
        }
    }

    async fn delete_relation(&self, key: &ToggleKey) -> Result<bool, StoreError> {
        Ok(self.relations.remove(key).is_some())
    }
}

#[async_trait]
impl RecordStore for InMemoryRecordStore {
    async fn create_user(&self, name: &str, age: u32) -> Result<User, StoreError> {
        let user = User {
            id: self.next_id(),
            name: name.to_string(),
            age,
            created_at: Utc::now(),
        };
        self.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn get_user(&self, user_id: UserId) -> Result<Option<User>, StoreError> {
        Ok(self.users.get(&user_id).map(|u| u.clone()))
    }

    async fn create_post(&self, draft: PostDraft) -> Result<Post, StoreError> {
        let post = Post {
            id: self.next_id(),
            author_id: draft.author_id,
            content: draft.content,
            image_url: draft.image_url,
            is_adult_content: draft.is_adult_content,
            view_count: 0,
            created_at: Utc::now(),
        };
        self.posts.insert(post.id, post.clone());
        Ok(post)
    }

    async fn get_post(&self, post_id: PostId) -> Result<Option<Post>, StoreError> {
        Ok(self.posts.get(&post_id).map(|p| p.clone()))
    }

    async fn update_post(&self, post_id: PostId, draft: PostDraft) -> Result<Post, StoreError> {
        let mut post = self.posts.get_mut(&post_id).ok_or(StoreError::NotFound)?;
        post.content = draft.content;
        post.image_url = draft.image_url;
        post.is_adult_content = draft.is_adult_content;
        Ok(post.clone())
    }

    async fn increment_post_views(&self, post_id: PostId) -> Result<(), StoreError> {
        let mut post = self.posts.get_mut(&post_id).ok_or(StoreError::NotFound)?;
        post.view_count = post.view_count.saturating_add(1);
        Ok(())
    }

    async fn list_posts(&self, include_adult: bool) -> Result<Vec<Post>, StoreError> {
        let mut posts: Vec<Post> = self
            .posts
            .iter()
            .filter(|p| include_adult || !p.is_adult_content)
            .map(|p| p.clone())
            .collect();
        posts.sort_by(|a, b| b.id.cmp(&a.id));
        Ok(posts)
    }

    async fn delete_post_cascade(&self, post_id: PostId) -> Result<(), StoreError> {
        if self.posts.remove(&post_id).is_none() {
            return Err(StoreError::NotFound);
        }

        let comment_ids: Vec<CommentId> = self
            .comments
            .iter()
            .filter(|c| c.post_id == post_id)
            .map(|c| c.id)
            .collect();

        self.relations.retain(|key, _| match key.kind {
            RelationKind::PostLike => key.target_id != post_id,
            RelationKind::CommentLike => !comment_ids.contains(&key.target_id),
            RelationKind::Follow => true,
        });
        self.notifications.retain(|_, n| {
            n.post_id != Some(post_id)
                && !n.comment_id.is_some_and(|id| comment_ids.contains(&id))
        });
        self.reports.retain(|_, r| r.post_id != post_id);
        self.comments.retain(|_, c| c.post_id != post_id);
        Ok(())
    }

    async fn create_comment(&self, draft: CommentDraft) -> Result<Comment, StoreError> {
        let comment = Comment {
            id: self.next_id(),
            post_id: draft.post_id,
            author_id: draft.author_id,
            content: draft.content,
            is_adult_content: draft.is_adult_content,
            created_at: Utc::now(),
        };
        self.comments.insert(comment.id, comment.clone());
        Ok(comment)
    }

    async fn get_comment(&self, comment_id: CommentId) -> Result<Option<Comment>, StoreError> {
        Ok(self.comments.get(&comment_id).map(|c| c.clone()))
    }

    async fn update_comment(
        &self,
        comment_id: CommentId,
        content: &str,
        is_adult_content: bool,
    ) -> Result<Comment, StoreError> {
        let mut comment = self
            .comments
            .get_mut(&comment_id)
            .ok_or(StoreError::NotFound)?;
        comment.content = content.to_string();
        comment.is_adult_content = is_adult_content;
        Ok(comment.clone())
    }

    async fn list_comments(
        &self,
        post_id: PostId,
        include_adult: bool,
    ) -> Result<Vec<Comment>, StoreError> {
        let mut comments: Vec<Comment> = self
            .comments
            .iter()
            .filter(|c| c.post_id == post_id && (include_adult || !c.is_adult_content))
            .map(|c| c.clone())
            .collect();
        comments.sort_by_key(|c| c.id);
        Ok(comments)
    }

    async fn delete_comment_cascade(&self, comment_id: CommentId) -> Result<(), StoreError> {
        if self.comments.remove(&comment_id).is_none() {
            return Err(StoreError::NotFound);
        }

        self.relations.retain(|key, _| {
            !(key.kind == RelationKind::CommentLike && key.target_id == comment_id)
        });
        self.notifications
            .retain(|_, n| n.comment_id != Some(comment_id));
        Ok(())
    }

    async fn follow_exists_between(&self, a: UserId, b: UserId) -> Result<bool, StoreError> {
        Ok(self.relations.contains_key(&ToggleKey::follow(a, b))
            || self.relations.contains_key(&ToggleKey::follow(b, a)))
    }

    async fn create_message(
        &self,
        sender_id: UserId,
        receiver_id: UserId,
        content: &str,
    ) -> Result<Message, StoreError> {
        let message = Message {
            id: self.next_id(),
            sender_id,
            receiver_id,
            content: content.to_string(),
            is_read: false,
            created_at: Utc::now(),
        };
        self.messages.insert(message.id, message.clone());
        Ok(message)
    }

    async fn list_messages_between(
        &self,
        a: UserId,
        b: UserId,
    ) -> Result<Vec<Message>, StoreError> {
        let mut messages: Vec<Message> = self
            .messages
            .iter()
            .filter(|m| {
                (m.sender_id == a && m.receiver_id == b) || (m.sender_id == b && m.receiver_id == a)
            })
            .map(|m| m.clone())
            .collect();
        messages.sort_by_key(|m| m.id);
        Ok(messages)
    }

    async fn mark_messages_read(
        &self,
        receiver_id: UserId,
        sender_id: UserId,
    ) -> Result<u64, StoreError> {
        let mut changed = 0;
        for mut message in self.messages.iter_mut() {
            if message.receiver_id == receiver_id
                && message.sender_id == sender_id
                && !message.is_read
            {
                message.is_read = true;
                changed += 1;
            }
        }
        Ok(changed)
    }

    async fn create_notification(
        &self,
        draft: NotificationDraft,
    ) -> Result<Notification, StoreError> {
        let notification = Notification {
            id: self.next_id(),
            kind: draft.kind,
            user_id: draft.user_id,
            creator_id: draft.creator_id,
            post_id: draft.post_id,
            comment_id: draft.comment_id,
            is_read: false,
            created_at: Utc::now(),
        };
        self.notifications
            .insert(notification.id, notification.clone());
        Ok(notification)
    }

    async fn get_notification(
        &self,
        notification_id: NotificationId,
    ) -> Result<Option<Notification>, StoreError> {
        Ok(self.notifications.get(&notification_id).map(|n| n.clone()))
    }

    async fn list_notifications(&self, user_id: UserId) -> Result<Vec<Notification>, StoreError> {
        let mut notifications: Vec<Notification> = self
            .notifications
            .iter()
            .filter(|n| n.user_id == user_id)
            .map(|n| n.clone())
            .collect();
        notifications.sort_by(|a, b| b.id.cmp(&a.id));
        Ok(notifications)
    }

    async fn mark_notification_read(
        &self,
        notification_id: NotificationId,
    ) -> Result<(), StoreError> {
        let mut notification = self
            .notifications
            .get_mut(&notification_id)
            .ok_or(StoreError::NotFound)?;
        notification.is_read = true;
        Ok(())
    }

    async fn create_report(
        &self,
        reporter_id: UserId,
        post_id: PostId,
        reason: &str,
    ) -> Result<Report, StoreError> {
        let report = Report {
            id: self.next_id(),
            reporter_id,
            post_id,
            reason: reason.to_string(),
            created_at: Utc::now(),
        };
        self.reports.insert(report.id, report.clone());
        Ok(report)
    }
}
