use crate::error::{AppError, Result};
use crate::models::{Comment, CreatePostRequest, Post, UpdatePostRequest, User};
use async_trait::async_trait;
use sqlx::sqlite::SqlitePool;
use std::sync::Arc;

/// Repository Trait
///
/// Defines the abstract contract for all persistence operations, allowing
/// the service layer to interact with the store without knowing the concrete
/// implementation (SQLite, Mock, etc.).
///
/// **Send + Sync + async_trait** are required to make the trait object
/// (`Arc<dyn Repository>`) safely shareable across Axum's asynchronous task
/// boundaries.
///
/// Rows are transient per-request projections: the store is the sole owner
/// of record lifetime, and nothing here caches across calls.
#[async_trait]
pub trait Repository: Send + Sync {
    // --- Posts ---
    /// All posts in insertion order, re-queried fresh each call.
    async fn list_posts(&self) -> Result<Vec<Post>>;
    async fn get_post(&self, id: i64) -> Result<Option<Post>>;
    /// Inserts a post. The UNIQUE title index makes the duplicate check
    /// atomic with the insert; a collision maps to `DuplicateTitle`.
    async fn create_post(
        &self,
        author_id: i64,
        date: &str,
        req: CreatePostRequest,
    ) -> Result<Post>;
    /// Overwrites title, subtitle, body, and image URL. Author and creation
    /// date are not touched by the update statement. `None` if absent.
    async fn update_post(&self, id: i64, req: UpdatePostRequest) -> Result<Option<Post>>;
    /// Deletes a post and its comments in one transaction. Returns whether
    /// a post row was actually removed.
    async fn delete_post(&self, id: i64) -> Result<bool>;

    // --- Comments ---
    /// Inserts a comment under an existing post; `NotFound` if the parent
    /// post is absent. Returns the stored comment enriched with the author
    /// name.
    async fn add_comment(&self, post_id: i64, author_id: i64, text: &str) -> Result<Comment>;
    /// Comments for a post in insertion order, enriched with author names.
    async fn get_comments(&self, post_id: i64) -> Result<Vec<Comment>>;

    // --- Users ---
    /// Inserts a user. The UNIQUE email index makes the duplicate check
    /// atomic with the insert; a collision maps to `DuplicateEmail`.
    async fn create_user(
        &self,
        email: &str,
        password_hash: &str,
        name: &str,
        is_admin: bool,
    ) -> Result<User>;
    async fn get_user(&self, id: i64) -> Result<Option<User>>;
    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>>;
}

/// RepositoryState
///
/// The concrete type used to share the persistence layer access across the
/// application state.
pub type RepositoryState = Arc<dyn Repository>;

/// SqliteRepository
///
/// The concrete implementation of the `Repository` trait, backed by SQLite.
pub struct SqliteRepository {
    pool: SqlitePool,
}

impl SqliteRepository {
    /// Creates a new repository instance using the initialized connection pool.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

/// Maps a UNIQUE constraint violation to the given conflict outcome and
/// passes everything else through as a database failure.
fn map_unique_violation(err: sqlx::Error, conflict: AppError) -> AppError {
    match &err {
        sqlx::Error::Database(db)
            if matches!(db.kind(), sqlx::error::ErrorKind::UniqueViolation) =>
        {
            conflict
        }
        _ => AppError::Database(err),
    }
}

#[async_trait]
impl Repository for SqliteRepository {
    async fn list_posts(&self) -> Result<Vec<Post>> {
        let posts = sqlx::query_as::<_, Post>(
            "SELECT id, author_id, title, subtitle, date, body, img_url
             FROM posts ORDER BY id ASC",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(posts)
    }

    async fn get_post(&self, id: i64) -> Result<Option<Post>> {
        let post = sqlx::query_as::<_, Post>(
            "SELECT id, author_id, title, subtitle, date, body, img_url
             FROM posts WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(post)
    }

    async fn create_post(
        &self,
        author_id: i64,
        date: &str,
        req: CreatePostRequest,
    ) -> Result<Post> {
        sqlx::query_as::<_, Post>(
            "INSERT INTO posts (author_id, title, subtitle, date, body, img_url)
             VALUES (?, ?, ?, ?, ?, ?)
             RETURNING id, author_id, title, subtitle, date, body, img_url",
        )
        .bind(author_id)
        .bind(&req.title)
        .bind(&req.subtitle)
        .bind(date)
        .bind(&req.body)
        .bind(&req.img_url)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_unique_violation(e, AppError::DuplicateTitle))
    }

    async fn update_post(&self, id: i64, req: UpdatePostRequest) -> Result<Option<Post>> {
        sqlx::query_as::<_, Post>(
            "UPDATE posts
             SET title = ?, subtitle = ?, body = ?, img_url = ?
             WHERE id = ?
             RETURNING id, author_id, title, subtitle, date, body, img_url",
        )
        .bind(&req.title)
        .bind(&req.subtitle)
        .bind(&req.body)
        .bind(&req.img_url)
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_unique_violation(e, AppError::DuplicateTitle))
    }

    /// delete_post
    ///
    /// Removes the post's comments and then the post itself inside a single
    /// transaction, so a concurrent reader can never observe orphaned
    /// comment rows. The schema's ON DELETE CASCADE backs this up, but the
    /// invariant does not depend on connection pragmas.
    async fn delete_post(&self, id: i64) -> Result<bool> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM comments WHERE post_id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        let result = sqlx::query("DELETE FROM posts WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(result.rows_affected() > 0)
    }

    /// add_comment
    ///
    /// Parent-existence check and insert run in the same transaction, so the
    /// comment cannot land under a post that a concurrent administrator is
    /// deleting. The returned row is joined with `users` for the author name.
    async fn add_comment(&self, post_id: i64, author_id: i64, text: &str) -> Result<Comment> {
        let mut tx = self.pool.begin().await?;

        let parent = sqlx::query_scalar::<_, i64>("SELECT id FROM posts WHERE id = ?")
            .bind(post_id)
            .fetch_optional(&mut *tx)
            .await?;
        if parent.is_none() {
            return Err(AppError::NotFound("post"));
        }

        let comment_id = sqlx::query_scalar::<_, i64>(
            "INSERT INTO comments (author_id, post_id, text) VALUES (?, ?, ?) RETURNING id",
        )
        .bind(author_id)
        .bind(post_id)
        .bind(text)
        .fetch_one(&mut *tx)
        .await?;

        let comment = sqlx::query_as::<_, Comment>(
            "SELECT c.id, c.author_id, c.post_id, c.text, u.name AS author_name
             FROM comments c JOIN users u ON c.author_id = u.id
             WHERE c.id = ?",
        )
        .bind(comment_id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(comment)
    }

    async fn get_comments(&self, post_id: i64) -> Result<Vec<Comment>> {
        let comments = sqlx::query_as::<_, Comment>(
            "SELECT c.id, c.author_id, c.post_id, c.text, u.name AS author_name
             FROM comments c JOIN users u ON c.author_id = u.id
             WHERE c.post_id = ?
             ORDER BY c.id ASC",
        )
        .bind(post_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(comments)
    }

    async fn create_user(
        &self,
        email: &str,
        password_hash: &str,
        name: &str,
        is_admin: bool,
    ) -> Result<User> {
        sqlx::query_as::<_, User>(
            "INSERT INTO users (email, password_hash, name, is_admin)
             VALUES (?, ?, ?, ?)
             RETURNING id, email, password_hash, name, is_admin",
        )
        .bind(email)
        .bind(password_hash)
        .bind(name)
        .bind(is_admin)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_unique_violation(e, AppError::DuplicateEmail))
    }

    async fn get_user(&self, id: i64) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, email, password_hash, name, is_admin FROM users WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, email, password_hash, name, is_admin FROM users WHERE email = ?",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }
}
