// SQLite-backed record store.
//
// Tables:
// - users, posts, comments, messages, notifications, reports: plain records
// - post_likes, comment_likes, follows: toggle relations keyed by a composite
//   PRIMARY KEY. Rows are created with ON CONFLICT DO NOTHING so a lost race
//   shows up as zero rows affected instead of a second row.

use crate::core::social::{
    Comment, CommentDraft, CommentId, Message, Notification, NotificationDraft, NotificationId,
    NotificationKind, Post, PostDraft, PostId, RecordStore, RelationKind, Report, StoreError,
    ToggleKey, ToggleStore, User, UserId,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqlitePoolOptions, SqliteRow};
use sqlx::{Pool, Row, Sqlite};
use std::path::Path;

pub struct SqliteRecordStore {
    pool: Pool<Sqlite>,
}

fn storage_err(e: sqlx::Error) -> StoreError {
    StoreError::Storage(e.to_string())
}

fn parse_time(value: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}

/// (table, actor column, target column) for each relation kind.
fn relation_table(kind: RelationKind) -> (&'static str, &'static str, &'static str) {
    match kind {
        RelationKind::PostLike => ("post_likes", "user_id", "post_id"),
        RelationKind::CommentLike => ("comment_likes", "user_id", "comment_id"),
        RelationKind::Follow => ("follows", "follower_id", "following_id"),
    }
}

fn user_from_row(row: &SqliteRow) -> User {
    User {
        id: row.get::<i64, _>("id") as u64,
        name: row.get("name"),
        age: row.get::<i64, _>("age") as u32,
        created_at: parse_time(&row.get::<String, _>("created_at")),
    }
}

fn post_from_row(row: &SqliteRow) -> Post {
    Post {
        id: row.get::<i64, _>("id") as u64,
        author_id: row.get::<i64, _>("author_id") as u64,
        content: row.get("content"),
        image_url: row.get("image_url"),
        is_adult_content: row.get("is_adult_content"),
        view_count: row.get::<i64, _>("view_count") as u64,
        created_at: parse_time(&row.get::<String, _>("created_at")),
    }
}

fn comment_from_row(row: &SqliteRow) -> Comment {
    Comment {
        id: row.get::<i64, _>("id") as u64,
        post_id: row.get::<i64, _>("post_id") as u64,
        author_id: row.get::<i64, _>("author_id") as u64,
        content: row.get("content"),
        is_adult_content: row.get("is_adult_content"),
        created_at: parse_time(&row.get::<String, _>("created_at")),
    }
}

fn message_from_row(row: &SqliteRow) -> Message {
    Message {
        id: row.get::<i64, _>("id") as u64,
        sender_id: row.get::<i64, _>("sender_id") as u64,
        receiver_id: row.get::<i64, _>("receiver_id") as u64,
        content: row.get("content"),
        is_read: row.get("is_read"),
        created_at: parse_time(&row.get::<String, _>("created_at")),
    }
}

fn notification_from_row(row: &SqliteRow) -> Result<Notification, StoreError> {
    let kind_str: String = row.get("kind");
    let kind = NotificationKind::parse(&kind_str)
        .ok_or_else(|| StoreError::Storage(format!("Unknown notification kind: {}", kind_str)))?;

    Ok(Notification {
        id: row.get::<i64, _>("id") as u64,
        kind,
        user_id: row.get::<i64, _>("user_id") as u64,
        creator_id: row.get::<i64, _>("creator_id") as u64,
        post_id: row.get::<Option<i64>, _>("post_id").map(|id| id as u64),
        comment_id: row.get::<Option<i64>, _>("comment_id").map(|id| id as u64),
        is_read: row.get("is_read"),
        created_at: parse_time(&row.get::<String, _>("created_at")),
    })
}

impl SqliteRecordStore {
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }

    /// Open (creating if needed) a database file and run migrations.
    pub async fn connect(database_url: &str) -> anyhow::Result<Self> {
        // Ensure the file exists if it's a file path
        let path_str = database_url.trim_start_matches("sqlite://");
        if !database_url.contains(":memory:") && !Path::new(path_str).exists() {
            if let Some(parent) = Path::new(path_str).parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::File::create(path_str)?;
        }

        let conn_str = if database_url.starts_with("sqlite:") {
            database_url.to_string()
        } else {
            format!("sqlite://{}", database_url)
        };

        let pool = SqlitePoolOptions::new().connect(&conn_str).await?;

        let store = Self::new(pool);
        store.migrate().await?;
        Ok(store)
    }

    /// Run database migrations to create required tables.
    pub async fn migrate(&self) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS users (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                age INTEGER NOT NULL,
                created_at TEXT NOT NULL
            );
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(storage_err)?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS posts (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                author_id INTEGER NOT NULL,
                content TEXT NOT NULL,
                image_url TEXT,
                is_adult_content BOOLEAN NOT NULL DEFAULT 0,
                view_count INTEGER NOT NULL DEFAULT 0,
                created_at TEXT NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_posts_adult ON posts(is_adult_content, id);
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(storage_err)?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS comments (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                post_id INTEGER NOT NULL,
                author_id INTEGER NOT NULL,
                content TEXT NOT NULL,
                is_adult_content BOOLEAN NOT NULL DEFAULT 0,
                created_at TEXT NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_comments_post ON comments(post_id, id);
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(storage_err)?;

        // Toggle relations - existence is the state
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS post_likes (
                user_id INTEGER NOT NULL,
                post_id INTEGER NOT NULL,
                created_at TEXT NOT NULL,
                PRIMARY KEY (user_id, post_id)
            );
            CREATE TABLE IF NOT EXISTS comment_likes (
                user_id INTEGER NOT NULL,
                comment_id INTEGER NOT NULL,
                created_at TEXT NOT NULL,
                PRIMARY KEY (user_id, comment_id)
            );
            CREATE TABLE IF NOT EXISTS follows (
                follower_id INTEGER NOT NULL,
                following_id INTEGER NOT NULL,
                created_at TEXT NOT NULL,
                PRIMARY KEY (follower_id, following_id)
            );
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(storage_err)?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS messages (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                sender_id INTEGER NOT NULL,
                receiver_id INTEGER NOT NULL,
                content TEXT NOT NULL,
                is_read BOOLEAN NOT NULL DEFAULT 0,
                created_at TEXT NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_messages_pair
                ON messages(sender_id, receiver_id, id);
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(storage_err)?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS notifications (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                kind TEXT NOT NULL,
                user_id INTEGER NOT NULL,
                creator_id INTEGER NOT NULL,
                post_id INTEGER,
                comment_id INTEGER,
                is_read BOOLEAN NOT NULL DEFAULT 0,
                created_at TEXT NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_notifications_user ON notifications(user_id, id);
            CREATE TABLE IF NOT EXISTS reports (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                reporter_id INTEGER NOT NULL,
                post_id INTEGER NOT NULL,
                reason TEXT NOT NULL,
                created_at TEXT NOT NULL
            );
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(storage_err)?;

        Ok(())
    }
}

#[async_trait]
impl ToggleStore for SqliteRecordStore {
    async fn relation_exists(&self, key: &ToggleKey) -> Result<bool, StoreError> {
        let (table, actor_col, target_col) = relation_table(key.kind);
        let row = sqlx::query(&format!(
            "SELECT 1 FROM {} WHERE {} = ? AND {} = ?",
            table, actor_col, target_col
        ))
        .bind(key.actor_id as i64)
        .bind(key.target_id as i64)
        .fetch_optional(&self.pool)
        .await
        .map_err(storage_err)?;

        Ok(row.is_some())
    }

    async fn insert_relation(&self, key: &ToggleKey) -> Result<(), StoreError> {
        let (table, actor_col, target_col) = relation_table(key.kind);
        let result = sqlx::query(&format!(
            r#"
            INSERT INTO {table} ({actor_col}, {target_col}, created_at)
            VALUES (?, ?, ?)
            ON CONFLICT({actor_col}, {target_col}) DO NOTHING
            "#
        ))
        .bind(key.actor_id as i64)
        .bind(key.target_id as i64)
        .bind(Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(storage_err)?;

        if result.rows_affected() == 0 {
            Err(StoreError::Conflict)
        } else {
            Ok(())
        }
    }

    async fn delete_relation(&self, key: &ToggleKey) -> Result<bool, StoreError> {
        let (table, actor_col, target_col) = relation_table(key.kind);
        let result = sqlx::query(&format!(
            "DELETE FROM {} WHERE {} = ? AND {} = ?",
            table, actor_col, target_col
        ))
        .bind(key.actor_id as i64)
        .bind(key.target_id as i64)
        .execute(&self.pool)
        .await
        .map_err(storage_err)?;

        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl RecordStore for SqliteRecordStore {
    async fn create_user(&self, name: &str, age: u32) -> Result<User, StoreError> {
        let created_at = Utc::now();
        let result = sqlx::query("INSERT INTO users (name, age, created_at) VALUES (?, ?, ?)")
            .bind(name)
            .bind(age as i64)
            .bind(created_at.to_rfc3339())
            .execute(&self.pool)
            .await
            .map_err(storage_err)?;

        Ok(User {
            id: result.last_insert_rowid() as u64,
            name: name.to_string(),
            age,
            created_at,
        })
    }

    async fn get_user(&self, user_id: UserId) -> Result<Option<User>, StoreError> {
        let row = sqlx::query("SELECT * FROM users WHERE id = ?")
            .bind(user_id as i64)
            .fetch_optional(&self.pool)
            .await
            .map_err(storage_err)?;

        Ok(row.as_ref().map(user_from_row))
    }

    async fn create_post(&self, draft: PostDraft) -> Result<Post, StoreError> {
        let created_at = Utc::now();
        let result = sqlx::query(
            r#"
            INSERT INTO posts (author_id, content, image_url, is_adult_content, created_at)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(draft.author_id as i64)
        .bind(&draft.content)
        .bind(&draft.image_url)
        .bind(draft.is_adult_content)
        .bind(created_at.to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(storage_err)?;

        Ok(Post {
            id: result.last_insert_rowid() as u64,
            author_id: draft.author_id,
            content: draft.content,
            image_url: draft.image_url,
            is_adult_content: draft.is_adult_content,
            view_count: 0,
            created_at,
        })
    }

    async fn get_post(&self, post_id: PostId) -> Result<Option<Post>, StoreError> {
        let row = sqlx::query("SELECT * FROM posts WHERE id = ?")
            .bind(post_id as i64)
            .fetch_optional(&self.pool)
            .await
            .map_err(storage_err)?;

        Ok(row.as_ref().map(post_from_row))
    }

    async fn update_post(&self, post_id: PostId, draft: PostDraft) -> Result<Post, StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE posts SET content = ?, image_url = ?, is_adult_content = ?
            WHERE id = ?
            "#,
        )
        .bind(&draft.content)
        .bind(&draft.image_url)
        .bind(draft.is_adult_content)
        .bind(post_id as i64)
        .execute(&self.pool)
        .await
        .map_err(storage_err)?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        self.get_post(post_id).await?.ok_or(StoreError::NotFound)
    }

    async fn increment_post_views(&self, post_id: PostId) -> Result<(), StoreError> {
        let result = sqlx::query("UPDATE posts SET view_count = view_count + 1 WHERE id = ?")
            .bind(post_id as i64)
            .execute(&self.pool)
            .await
            .map_err(storage_err)?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    async fn list_posts(&self, include_adult: bool) -> Result<Vec<Post>, StoreError> {
        let sql = if include_adult {
            "SELECT * FROM posts ORDER BY id DESC"
        } else {
            "SELECT * FROM posts WHERE is_adult_content = 0 ORDER BY id DESC"
        };
        let rows = sqlx::query(sql)
            .fetch_all(&self.pool)
            .await
            .map_err(storage_err)?;

        Ok(rows.iter().map(post_from_row).collect())
    }

    async fn delete_post_cascade(&self, post_id: PostId) -> Result<(), StoreError> {
        let id = post_id as i64;
        let mut tx = self.pool.begin().await.map_err(storage_err)?;

        sqlx::query(
            r#"
            DELETE FROM notifications
            WHERE post_id = ?
               OR comment_id IN (SELECT id FROM comments WHERE post_id = ?)
            "#,
        )
        .bind(id)
        .bind(id)
        .execute(&mut *tx)
        .await
        .map_err(storage_err)?;

        sqlx::query(
            "DELETE FROM comment_likes WHERE comment_id IN (SELECT id FROM comments WHERE post_id = ?)",
        )
        .bind(id)
        .execute(&mut *tx)
        .await
        .map_err(storage_err)?;

        for sql in [
            "DELETE FROM comments WHERE post_id = ?",
            "DELETE FROM post_likes WHERE post_id = ?",
            "DELETE FROM reports WHERE post_id = ?",
        ] {
            sqlx::query(sql)
                .bind(id)
                .execute(&mut *tx)
                .await
                .map_err(storage_err)?;
        }

        let result = sqlx::query("DELETE FROM posts WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(storage_err)?;

        // Dropping the transaction rolls everything back
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }

        tx.commit().await.map_err(storage_err)?;
        Ok(())
    }

    async fn create_comment(&self, draft: CommentDraft) -> Result<Comment, StoreError> {
        let created_at = Utc::now();
        let result = sqlx::query(
            r#"
            INSERT INTO comments (post_id, author_id, content, is_adult_content, created_at)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(draft.post_id as i64)
        .bind(draft.author_id as i64)
        .bind(&draft.content)
        .bind(draft.is_adult_content)
        .bind(created_at.to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(storage_err)?;

        Ok(Comment {
            id: result.last_insert_rowid() as u64,
            post_id: draft.post_id,
            author_id: draft.author_id,
            content: draft.content,
            is_adult_content: draft.is_adult_content,
            created_at,
        })
    }

    async fn get_comment(&self, comment_id: CommentId) -> Result<Option<Comment>, StoreError> {
        let row = sqlx::query("SELECT * FROM comments WHERE id = ?")
            .bind(comment_id as i64)
            .fetch_optional(&self.pool)
            .await
            .map_err(storage_err)?;

        Ok(row.as_ref().map(comment_from_row))
    }

    async fn update_comment(
        &self,
        comment_id: CommentId,
        content: &str,
        is_adult_content: bool,
    ) -> Result<Comment, StoreError> {
        let result =
            sqlx::query("UPDATE comments SET content = ?, is_adult_content = ? WHERE id = ?")
                .bind(content)
                .bind(is_adult_content)
                .bind(comment_id as i64)
                .execute(&self.pool)
                .await
                .map_err(storage_err)?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        self.get_comment(comment_id)
            .await?
            .ok_or(StoreError::NotFound)
    }

    async fn list_comments(
        &self,
        post_id: PostId,
        include_adult: bool,
    ) -> Result<Vec<Comment>, StoreError> {
        let sql = if include_adult {
            "SELECT * FROM comments WHERE post_id = ? ORDER BY id ASC"
        } else {
            "SELECT * FROM comments WHERE post_id = ? AND is_adult_content = 0 ORDER BY id ASC"
        };
        let rows = sqlx::query(sql)
            .bind(post_id as i64)
            .fetch_all(&self.pool)
            .await
            .map_err(storage_err)?;

        Ok(rows.iter().map(comment_from_row).collect())
    }

    async fn delete_comment_cascade(&self, comment_id: CommentId) -> Result<(), StoreError> {
        let id = comment_id as i64;
        let mut tx = self.pool.begin().await.map_err(storage_err)?;

        for sql in [
            "DELETE FROM notifications WHERE comment_id = ?",
            "DELETE FROM comment_likes WHERE comment_id = ?",
        ] {
            sqlx::query(sql)
                .bind(id)
                .execute(&mut *tx)
                .await
                .map_err(storage_err)?;
        }

        let result = sqlx::query("DELETE FROM comments WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(storage_err)?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }

        tx.commit().await.map_err(storage_err)?;
        Ok(())
    }

    async fn follow_exists_between(&self, a: UserId, b: UserId) -> Result<bool, StoreError> {
        let row = sqlx::query(
            r#"
            SELECT 1 FROM follows
            WHERE (follower_id = ? AND following_id = ?)
               OR (follower_id = ? AND following_id = ?)
            LIMIT 1
            "#,
        )
        .bind(a as i64)
        .bind(b as i64)
        .bind(b as i64)
        .bind(a as i64)
        .fetch_optional(&self.pool)
        .await
        .map_err(storage_err)?;

        Ok(row.is_some())
    }

    async fn create_message(
        &self,
        sender_id: UserId,
        receiver_id: UserId,
        content: &str,
    ) -> Result<Message, StoreError> {
        let created_at = Utc::now();
        let result = sqlx::query(
            r#"
            INSERT INTO messages (sender_id, receiver_id, content, is_read, created_at)
            VALUES (?, ?, ?, 0, ?)
            "#,
        )
        .bind(sender_id as i64)
        .bind(receiver_id as i64)
        .bind(content)
        .bind(created_at.to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(storage_err)?;

        Ok(Message {
            id: result.last_insert_rowid() as u64,
            sender_id,
            receiver_id,
            content: content.to_string(),
            is_read: false,
            created_at,
        })
    }

    async fn list_messages_between(
        &self,
        a: UserId,
        b: UserId,
    ) -> Result<Vec<Message>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT * FROM messages
            WHERE (sender_id = ? AND receiver_id = ?)
               OR (sender_id = ? AND receiver_id = ?)
            ORDER BY id ASC
            "#,
        )
        .bind(a as i64)
        .bind(b as i64)
        .bind(b as i64)
        .bind(a as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(storage_err)?;

        Ok(rows.iter().map(message_from_row).collect())
    }

    async fn mark_messages_read(
        &self,
        receiver_id: UserId,
        sender_id: UserId,
    ) -> Result<u64, StoreError> {
        let result = sqlx::query(
            "UPDATE messages SET is_read = 1 WHERE receiver_id = ? AND sender_id = ? AND is_read = 0",
        )
        .bind(receiver_id as i64)
        .bind(sender_id as i64)
        .execute(&self.pool)
        .await
        .map_err(storage_err)?;

        Ok(result.rows_affected())
    }

    async fn create_notification(
        &self,
        draft: NotificationDraft,
    ) -> Result<Notification, StoreError> {
        let created_at = Utc::now();
        let result = sqlx::query(
            r#"
            INSERT INTO notifications
                (kind, user_id, creator_id, post_id, comment_id, is_read, created_at)
            VALUES (?, ?, ?, ?, ?, 0, ?)
            "#,
        )
        .bind(draft.kind.as_str())
        .bind(draft.user_id as i64)
        .bind(draft.creator_id as i64)
        .bind(draft.post_id.map(|id| id as i64))
        .bind(draft.comment_id.map(|id| id as i64))
        .bind(created_at.to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(storage_err)?;

        Ok(Notification {
            id: result.last_insert_rowid() as u64,
            kind: draft.kind,
            user_id: draft.user_id,
            creator_id: draft.creator_id,
            post_id: draft.post_id,
            comment_id: draft.comment_id,
            is_read: false,
            created_at,
        })
    }

    async fn get_notification(
        &self,
        notification_id: NotificationId,
    ) -> Result<Option<Notification>, StoreError> {
        let row = sqlx::query("SELECT * FROM notifications WHERE id = ?")
            .bind(notification_id as i64)
            .fetch_optional(&self.pool)
            .await
            .map_err(storage_err)?;

        row.as_ref().map(notification_from_row).transpose()
    }

    async fn list_notifications(&self, user_id: UserId) -> Result<Vec<Notification>, StoreError> {
        let rows = sqlx::query("SELECT * FROM notifications WHERE user_id = ? ORDER BY id DESC")
            .bind(user_id as i64)
            .fetch_all(&self.pool)
            .await
            .map_err(storage_err)?;

        rows.iter().map(notification_from_row).collect()
    }

    async fn mark_notification_read(
        &self,
        notification_id: NotificationId,
    ) -> Result<(), StoreError> {
        let result = sqlx::query("UPDATE notifications SET is_read = 1 WHERE id = ?")
            .bind(notification_id as i64)
            .execute(&self.pool)
            .await
            .map_err(storage_err)?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    async fn create_report(
        &self,
        reporter_id: UserId,
        post_id: PostId,
        reason: &str,
    ) -> Result<Report, StoreError> {
        let created_at = Utc::now();
        let result = sqlx::query(
            "INSERT INTO reports (reporter_id, post_id, reason, created_at) VALUES (?, ?, ?, ?)",
        )
        .bind(reporter_id as i64)
        .bind(post_id as i64)
        .bind(reason)
        .bind(created_at.to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(storage_err)?;

        Ok(Report {
            id: result.last_insert_rowid() as u64,
            reporter_id,
            post_id,
            reason: reason.to_string(),
            created_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn memory_store() -> SqliteRecordStore {
        // One connection: every new connection to :memory: is a fresh database
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        let store = SqliteRecordStore::new(pool);
        store.migrate().await.unwrap();
        store
    }

    fn draft(author_id: u64, content: &str, adult: bool) -> PostDraft {
        PostDraft {
            author_id,
            content: content.to_string(),
            image_url: None,
            is_adult_content: adult,
        }
    }

    #[tokio::test]
    async fn test_relation_insert_is_unique() {
        let store = memory_store().await;
        let key = ToggleKey::post_like(1, 2);

        store.insert_relation(&key).await.unwrap();
        assert!(matches!(
            store.insert_relation(&key).await,
            Err(StoreError::Conflict)
        ));
        assert!(store.relation_exists(&key).await.unwrap());

        assert!(store.delete_relation(&key).await.unwrap());
        assert!(!store.delete_relation(&key).await.unwrap());
        assert!(!store.relation_exists(&key).await.unwrap());
    }

    #[tokio::test]
    async fn test_follow_edges_either_direction() {
        let store = memory_store().await;
        store
            .insert_relation(&ToggleKey::follow(3, 4))
            .await
            .unwrap();

        assert!(store.follow_exists_between(3, 4).await.unwrap());
        assert!(store.follow_exists_between(4, 3).await.unwrap());
        assert!(!store.follow_exists_between(3, 5).await.unwrap());
    }

    #[tokio::test]
    async fn test_post_roundtrip_and_feed_filter() {
        let store = memory_store().await;
        let user = store.create_user("kim", 30).await.unwrap();
        let clean = store.create_post(draft(user.id, "hello", false)).await.unwrap();
        let flagged = store.create_post(draft(user.id, "***", true)).await.unwrap();

        let fetched = store.get_post(flagged.id).await.unwrap().unwrap();
        assert_eq!(fetched, flagged);

        let feed = store.list_posts(false).await.unwrap();
        assert_eq!(feed.len(), 1);
        assert_eq!(feed[0].id, clean.id);

        let all = store.list_posts(true).await.unwrap();
        assert_eq!(all[0].id, flagged.id);

        store.increment_post_views(clean.id).await.unwrap();
        let viewed = store.get_post(clean.id).await.unwrap().unwrap();
        assert_eq!(viewed.view_count, 1);

        assert!(matches!(
            store.update_post(999, draft(user.id, "x", false)).await,
            Err(StoreError::NotFound)
        ));
    }

    #[tokio::test]
    async fn test_delete_post_cascade() {
        let store = memory_store().await;
        let post = store.create_post(draft(1, "post", false)).await.unwrap();
        let comment = store
            .create_comment(CommentDraft {
                post_id: post.id,
                author_id: 2,
                content: "comment".to_string(),
                is_adult_content: false,
            })
            .await
            .unwrap();
        store
            .insert_relation(&ToggleKey::post_like(2, post.id))
            .await
            .unwrap();
        store
            .insert_relation(&ToggleKey::comment_like(1, comment.id))
            .await
            .unwrap();
        store
            .create_notification(NotificationDraft {
                kind: NotificationKind::Like,
                user_id: 2,
                creator_id: 1,
                post_id: None,
                comment_id: Some(comment.id),
            })
            .await
            .unwrap();
        store.create_report(2, post.id, "spam").await.unwrap();

        store.delete_post_cascade(post.id).await.unwrap();

        assert!(store.get_post(post.id).await.unwrap().is_none());
        assert!(store.get_comment(comment.id).await.unwrap().is_none());
        assert!(!store
            .relation_exists(&ToggleKey::post_like(2, post.id))
            .await
            .unwrap());
        assert!(!store
            .relation_exists(&ToggleKey::comment_like(1, comment.id))
            .await
            .unwrap());
        assert!(store.list_notifications(2).await.unwrap().is_empty());

        assert!(matches!(
            store.delete_post_cascade(post.id).await,
            Err(StoreError::NotFound)
        ));
    }

    #[tokio::test]
    async fn test_messages_and_read_state() {
        let store = memory_store().await;
        store.create_message(1, 2, "first").await.unwrap();
        store.create_message(2, 1, "reply").await.unwrap();
        store.create_message(1, 3, "elsewhere").await.unwrap();

        let conversation = store.list_messages_between(2, 1).await.unwrap();
        assert_eq!(
            conversation
                .iter()
                .map(|m| m.content.as_str())
                .collect::<Vec<_>>(),
            vec!["first", "reply"]
        );

        assert_eq!(store.mark_messages_read(2, 1).await.unwrap(), 1);
        assert_eq!(store.mark_messages_read(2, 1).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_notification_roundtrip() {
        let store = memory_store().await;
        let created = store
            .create_notification(NotificationDraft {
                kind: NotificationKind::Follow,
                user_id: 8,
                creator_id: 9,
                post_id: None,
                comment_id: None,
            })
            .await
            .unwrap();

        store.mark_notification_read(created.id).await.unwrap();
        let fetched = store.get_notification(created.id).await.unwrap().unwrap();
        assert_eq!(fetched.kind, NotificationKind::Follow);
        assert!(fetched.is_read);
        assert_eq!(store.list_notifications(8).await.unwrap().len(), 1);
    }
}
