// Moderation gateway - the observable operations of the service.
//
// This service handles:
// - Post/comment writes through the text filter
// - Adult-content visibility for reads
// - Direct messages through the eligibility policy
// - Like/follow toggles and their notifications
//
// NO HTTP dependencies here - the web layer maps GatewayError to responses.

use super::gateway_models::{
    EntityKind, GatewayError, PolicyReason, RealtimeEvent, RealtimeNotifier,
};
use crate::core::messaging::MessagingEligibilityPolicy;
use crate::core::moderation::{FilterOutcome, TextFilterEngine};
use crate::core::social::{
    Comment, CommentDraft, CommentId, Message, Notification, NotificationDraft, NotificationId,
    NotificationKind, Post, PostDraft, PostId, RecordStore, Report, ToggleKey, ToggleState,
    ToggleStateService, User, UserId,
};
use std::sync::Arc;

const MAX_AGE: u32 = 150;

pub struct ModerationGateway<S: RecordStore> {
    store: S,
    filter: TextFilterEngine,
    toggles: ToggleStateService,
    notifier: Arc<dyn RealtimeNotifier>,
}

impl<S: RecordStore> ModerationGateway<S> {
    pub fn new(store: S, filter: TextFilterEngine, notifier: Arc<dyn RealtimeNotifier>) -> Self {
        Self {
            store,
            filter,
            toggles: ToggleStateService::new(),
            notifier,
        }
    }

    // ------------------------------------------------------------------------
    // Validation helpers
    // ------------------------------------------------------------------------

    fn validate_id(id: u64, what: &str) -> Result<(), GatewayError> {
        if id == 0 {
            Err(GatewayError::Validation(format!("Invalid {} id", what)))
        } else {
            Ok(())
        }
    }

    fn validate_content(content: &str) -> Result<&str, GatewayError> {
        let trimmed = content.trim();
        if trimmed.is_empty() {
            Err(GatewayError::Validation(
                "Content must not be empty".to_string(),
            ))
        } else {
            Ok(trimmed)
        }
    }

    fn validate_image(image_url: Option<String>) -> Result<Option<String>, GatewayError> {
        match image_url {
            Some(url) if url.trim().is_empty() => Err(GatewayError::Validation(
                "Image reference must not be blank".to_string(),
            )),
            Some(url) => Ok(Some(url.trim().to_string())),
            None => Ok(None),
        }
    }

    async fn require_user(&self, user_id: UserId) -> Result<User, GatewayError> {
        Self::validate_id(user_id, "user")?;
        self.store
            .get_user(user_id)
            .await?
            .ok_or(GatewayError::NotFound(EntityKind::User))
    }

    async fn require_post(&self, post_id: PostId) -> Result<Post, GatewayError> {
        Self::validate_id(post_id, "post")?;
        self.store
            .get_post(post_id)
            .await?
            .ok_or(GatewayError::NotFound(EntityKind::Post))
    }

    async fn require_comment(&self, comment_id: CommentId) -> Result<Comment, GatewayError> {
        Self::validate_id(comment_id, "comment")?;
        self.store
            .get_comment(comment_id)
            .await?
            .ok_or(GatewayError::NotFound(EntityKind::Comment))
    }

    /// Anonymous viewers, unknown ids and minors never see adult content.
    async fn viewer_sees_adult(&self, viewer: Option<UserId>) -> Result<bool, GatewayError> {
        let Some(viewer_id) = viewer else {
            return Ok(false);
        };
        Ok(self
            .store
            .get_user(viewer_id)
            .await?
            .map(|user| user.is_adult())
            .unwrap_or(false))
    }

    async fn ensure_visible(
        &self,
        viewer: Option<UserId>,
        is_adult_content: bool,
    ) -> Result<(), GatewayError> {
        if is_adult_content && !self.viewer_sees_adult(viewer).await? {
            return Err(GatewayError::AdultContentRestricted);
        }
        Ok(())
    }

    async fn filter_text(&self, content: &str, image_url: Option<&str>) -> FilterOutcome {
        let outcome = self.filter.classify(content, image_url).await;
        if outcome.flagged {
            tracing::info!("Content flagged by filter, storing redacted version");
        }
        outcome
    }

    /// Persist a notification and mirror it live. Self-notifications are skipped.
    ///
    /// Runs after the triggering write has committed, so a failure here is
    /// logged and swallowed: the caller's like/follow/message already stands.
    async fn notify(&self, draft: NotificationDraft) -> Option<Notification> {
        if draft.user_id == draft.creator_id {
            return None;
        }

        let kind = draft.kind;
        let user_id = draft.user_id;
        match self.store.create_notification(draft).await {
            Ok(notification) => {
                self.notifier.notify_user(
                    notification.user_id,
                    RealtimeEvent::Notification(notification.clone()),
                );
                Some(notification)
            }
            Err(e) => {
                tracing::warn!(error = %e, %kind, user_id, "Failed to store notification");
                None
            }
        }
    }

    // ------------------------------------------------------------------------
    // Users
    // ------------------------------------------------------------------------

    pub async fn register_user(&self, name: &str, age: u32) -> Result<User, GatewayError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(GatewayError::Validation("Name must not be empty".to_string()));
        }
        if age > MAX_AGE {
            return Err(GatewayError::Validation(format!(
                "Age must be between 0 and {}",
                MAX_AGE
            )));
        }

        let user = self.store.create_user(name, age).await?;
        tracing::info!(user_id = user.id, "Registered user");
        Ok(user)
    }

    // ------------------------------------------------------------------------
    // Posts
    // ------------------------------------------------------------------------

    pub async fn create_post(
        &self,
        actor: UserId,
        content: &str,
        image_url: Option<String>,
    ) -> Result<Post, GatewayError> {
        let content = Self::validate_content(content)?;
        let image_url = Self::validate_image(image_url)?;
        self.require_user(actor).await?;

        let outcome = self.filter_text(content, image_url.as_deref()).await;
        let post = self
            .store
            .create_post(PostDraft {
                author_id: actor,
                content: outcome.rewritten,
                image_url,
                is_adult_content: outcome.flagged,
            })
            .await?;

        tracing::info!(post_id = post.id, author_id = actor, "Post created");
        Ok(post)
    }

    /// Re-filters the new content. Without a new image the old one is kept.
    pub async fn edit_post(
        &self,
        actor: UserId,
        post_id: PostId,
        content: &str,
        image_url: Option<String>,
    ) -> Result<Post, GatewayError> {
        let content = Self::validate_content(content)?;
        let image_url = Self::validate_image(image_url)?;
        let post = self.require_post(post_id).await?;
        if post.author_id != actor {
            return Err(GatewayError::PermissionDenied(EntityKind::Post));
        }

        let image_url = image_url.or(post.image_url);
        let outcome = self.filter_text(content, image_url.as_deref()).await;
        let updated = self
            .store
            .update_post(
                post_id,
                PostDraft {
                    author_id: actor,
                    content: outcome.rewritten,
                    image_url,
                    is_adult_content: outcome.flagged,
                },
            )
            .await?;
        Ok(updated)
    }

    pub async fn delete_post(&self, actor: UserId, post_id: PostId) -> Result<(), GatewayError> {
        let post = self.require_post(post_id).await?;
        if post.author_id != actor {
            return Err(GatewayError::PermissionDenied(EntityKind::Post));
        }

        self.store.delete_post_cascade(post_id).await?;
        tracing::info!(post_id, "Post deleted");
        Ok(())
    }

    /// Detail view. Counts a view on success.
    pub async fn get_post(
        &self,
        viewer: Option<UserId>,
        post_id: PostId,
    ) -> Result<Post, GatewayError> {
        let mut post = self.require_post(post_id).await?;
        self.ensure_visible(viewer, post.is_adult_content).await?;

        self.store.increment_post_views(post_id).await?;
        post.view_count += 1;
        Ok(post)
    }

    pub async fn list_feed(&self, viewer: Option<UserId>) -> Result<Vec<Post>, GatewayError> {
        let include_adult = self.viewer_sees_adult(viewer).await?;
        Ok(self.store.list_posts(include_adult).await?)
    }

    pub async fn report_post(
        &self,
        actor: UserId,
        post_id: PostId,
        reason: &str,
    ) -> Result<Report, GatewayError> {
        let reason = reason.trim();
        if reason.is_empty() {
            return Err(GatewayError::Validation(
                "Report reason must not be empty".to_string(),
            ));
        }
        self.require_user(actor).await?;
        self.require_post(post_id).await?;

        Ok(self.store.create_report(actor, post_id, reason).await?)
    }

    // ------------------------------------------------------------------------
    // Comments
    // ------------------------------------------------------------------------

    pub async fn create_comment(
        &self,
        actor: UserId,
        post_id: PostId,
        content: &str,
    ) -> Result<Comment, GatewayError> {
        let content = Self::validate_content(content)?;
        self.require_user(actor).await?;
        let post = self.require_post(post_id).await?;
        self.ensure_visible(Some(actor), post.is_adult_content).await?;

        let outcome = self.filter_text(content, None).await;
        let comment = self
            .store
            .create_comment(CommentDraft {
                post_id,
                author_id: actor,
                content: outcome.rewritten,
                is_adult_content: outcome.flagged,
            })
            .await?;

        self.notify(NotificationDraft {
            kind: NotificationKind::Comment,
            user_id: post.author_id,
            creator_id: actor,
            post_id: Some(post_id),
            comment_id: Some(comment.id),
        })
        .await;

        Ok(comment)
    }

    pub async fn edit_comment(
        &self,
        actor: UserId,
        comment_id: CommentId,
        content: &str,
    ) -> Result<Comment, GatewayError> {
        let content = Self::validate_content(content)?;
        let comment = self.require_comment(comment_id).await?;
        if comment.author_id != actor {
            return Err(GatewayError::PermissionDenied(EntityKind::Comment));
        }

        let outcome = self.filter_text(content, None).await;
        Ok(self
            .store
            .update_comment(comment_id, &outcome.rewritten, outcome.flagged)
            .await?)
    }

    pub async fn delete_comment(
        &self,
        actor: UserId,
        comment_id: CommentId,
    ) -> Result<(), GatewayError> {
        let comment = self.require_comment(comment_id).await?;
        if comment.author_id != actor {
            return Err(GatewayError::PermissionDenied(EntityKind::Comment));
        }

        Ok(self.store.delete_comment_cascade(comment_id).await?)
    }

    pub async fn list_comments(
        &self,
        viewer: Option<UserId>,
        post_id: PostId,
    ) -> Result<Vec<Comment>, GatewayError> {
        let post = self.require_post(post_id).await?;
        let include_adult = self.viewer_sees_adult(viewer).await?;
        if post.is_adult_content && !include_adult {
            return Err(GatewayError::AdultContentRestricted);
        }

        Ok(self.store.list_comments(post_id, include_adult).await?)
    }

    // ------------------------------------------------------------------------
    // Direct messages
    // ------------------------------------------------------------------------

    /// Eligibility is re-checked on every send since follow state can change
    /// between messages.
    pub async fn send_message(
        &self,
        actor: UserId,
        receiver_id: UserId,
        content: &str,
    ) -> Result<Message, GatewayError> {
        let content = Self::validate_content(content)?;
        Self::validate_id(receiver_id, "user")?;
        if actor == receiver_id {
            return Err(GatewayError::Policy(PolicyReason::SelfMessage));
        }

        let sender = self.require_user(actor).await?;
        let receiver = self.require_user(receiver_id).await?;
        let are_friends = self.store.follow_exists_between(actor, receiver_id).await?;

        // Self-target is already ruled out, so a refusal here is the age gate
        if !MessagingEligibilityPolicy::can_message(&sender, &receiver, are_friends) {
            tracing::debug!(
                sender_id = actor,
                receiver_id,
                "Message rejected: adult/minor pair without follow edge"
            );
            return Err(GatewayError::Policy(PolicyReason::AgeRestricted));
        }

        let outcome = self.filter_text(content, None).await;
        let message = self
            .store
            .create_message(actor, receiver_id, &outcome.rewritten)
            .await?;

        self.notifier
            .notify_user(receiver_id, RealtimeEvent::Message(message.clone()));
        self.notify(NotificationDraft {
            kind: NotificationKind::Message,
            user_id: receiver_id,
            creator_id: actor,
            post_id: None,
            comment_id: None,
        })
        .await;

        Ok(message)
    }

    /// Messages between `actor` and `other`, oldest first. Marks the ones
    /// addressed to `actor` as read.
    pub async fn list_conversation(
        &self,
        actor: UserId,
        other: UserId,
    ) -> Result<Vec<Message>, GatewayError> {
        self.require_user(other).await?;
        self.store.mark_messages_read(actor, other).await?;
        Ok(self.store.list_messages_between(actor, other).await?)
    }

    // ------------------------------------------------------------------------
    // Likes and follows
    // ------------------------------------------------------------------------

    /// Liking your own post is allowed; it just doesn't notify anyone.
    pub async fn toggle_post_like(
        &self,
        actor: UserId,
        post_id: PostId,
    ) -> Result<ToggleState, GatewayError> {
        self.require_user(actor).await?;
        let post = self.require_post(post_id).await?;
        self.ensure_visible(Some(actor), post.is_adult_content).await?;

        let state = self
            .toggles
            .toggle(&self.store, &ToggleKey::post_like(actor, post_id))
            .await?;

        if state.active && state.changed {
            self.notify(NotificationDraft {
                kind: NotificationKind::Like,
                user_id: post.author_id,
                creator_id: actor,
                post_id: Some(post_id),
                comment_id: None,
            })
            .await;
        }

        Ok(state)
    }

    pub async fn toggle_comment_like(
        &self,
        actor: UserId,
        comment_id: CommentId,
    ) -> Result<ToggleState, GatewayError> {
        self.require_user(actor).await?;
        let comment = self.require_comment(comment_id).await?;
        let post = self.require_post(comment.post_id).await?;
        self.ensure_visible(Some(actor), post.is_adult_content || comment.is_adult_content)
            .await?;

        let state = self
            .toggles
            .toggle(&self.store, &ToggleKey::comment_like(actor, comment_id))
            .await?;

        if state.active && state.changed {
            self.notify(NotificationDraft {
                kind: NotificationKind::Like,
                user_id: comment.author_id,
                creator_id: actor,
                post_id: Some(comment.post_id),
                comment_id: Some(comment_id),
            })
            .await;
        }

        Ok(state)
    }

    pub async fn toggle_follow(
        &self,
        actor: UserId,
        target: UserId,
    ) -> Result<ToggleState, GatewayError> {
        Self::validate_id(target, "user")?;
        if actor == target {
            return Err(GatewayError::Policy(PolicyReason::SelfFollow));
        }
        self.require_user(actor).await?;
        self.require_user(target).await?;

        let state = self
            .toggles
            .toggle(&self.store, &ToggleKey::follow(actor, target))
            .await?;

        if state.active && state.changed {
            self.notify(NotificationDraft {
                kind: NotificationKind::Follow,
                user_id: target,
                creator_id: actor,
                post_id: None,
                comment_id: None,
            })
            .await;
        }

        Ok(state)
    }

    // ------------------------------------------------------------------------
    // Notifications
    // ------------------------------------------------------------------------

    pub async fn list_notifications(
        &self,
        actor: UserId,
    ) -> Result<Vec<Notification>, GatewayError> {
        Ok(self.store.list_notifications(actor).await?)
    }

    pub async fn mark_notification_read(
        &self,
        actor: UserId,
        notification_id: NotificationId,
    ) -> Result<(), GatewayError> {
        Self::validate_id(notification_id, "notification")?;
        let notification = self
            .store
            .get_notification(notification_id)
            .await?
            .ok_or(GatewayError::NotFound(EntityKind::Notification))?;
        if notification.user_id != actor {
            return Err(GatewayError::PermissionDenied(EntityKind::Notification));
        }

        Ok(self.store.mark_notification_read(notification_id).await?)
    }
}

// ============================================================================
// TESTS
// ============================================================================
