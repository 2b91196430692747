use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use ts_rs::TS;
use utoipa::ToSchema;

// --- Core Application Schemas (Mapped to Database) ---

/// User
///
/// The user's canonical identity record stored in the `users` table.
/// This is the internal row shape: the password hash lives here for
/// authentication but is never serialized outward; handlers return the
/// `UserProfile` projection instead.
#[derive(Debug, Clone, FromRow, Default)]
pub struct User {
    // Primary key, monotonically assigned by the store.
    pub id: i64,
    // The user's primary identifier. Unique, stored case-sensitively.
    pub email: String,
    // Argon2 PHC string. The plaintext password is never persisted.
    pub password_hash: String,
    // Display name shown next to posts and comments.
    pub name: String,
    // The role flag: only provisioned administrators may mutate posts.
    pub is_admin: bool,
}

/// Post
///
/// A blog post record from the `posts` table. This is the primary data
/// structure handed to the external view layer.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct Post {
    pub id: i64,
    // FK to users.id (owning author). Immutable after creation.
    pub author_id: i64,
    // Unique across all posts, enforced at write time.
    pub title: String,
    pub subtitle: String,
    // Human-readable creation date, e.g. "March 05,2024". Stamped once at
    // creation and untouched by edits.
    pub date: String,
    // Rich text from the external editor, stored opaquely.
    pub body: String,
    // Cover-image URL.
    pub img_url: String,
}

/// Comment
///
/// A comment record from the `comments` table, augmented with the author's
/// display name (a JOIN in the repository query).
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct Comment {
    pub id: i64,
    // FK to users.id (comment author).
    pub author_id: i64,
    // FK to posts.id (parent post).
    pub post_id: i64,
    pub text: String,
    // Loaded via JOIN; absent on bare-row reads.
    #[sqlx(default)]
    pub author_name: Option<String>,
}

/// PostPage
///
/// Everything the view layer needs to render a single post page: the post
/// itself plus its comments in insertion order.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct PostPage {
    pub post: Post,
    pub comments: Vec<Comment>,
}

/// UserProfile
///
/// Output projection of a `User` safe to hand to the view layer: everything
/// except the credential.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct UserProfile {
    pub id: i64,
    pub email: String,
    pub name: String,
    pub is_admin: bool,
}

impl From<User> for UserProfile {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            name: user.name,
            is_admin: user.is_admin,
        }
    }
}

// --- Request Payloads (Input Schemas) ---

/// RegisterRequest
///
/// Input payload for the registration endpoint (POST /register). Field
/// validation (format, required-ness) happens in the external forms layer;
/// the core only enforces email uniqueness.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub name: String,
}

/// LoginRequest
///
/// Input payload for the login endpoint (POST /login).
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// CreatePostRequest
///
/// Validated field values for a new post (POST /new-post). The author and
/// creation date are stamped server-side, never taken from the payload.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct CreatePostRequest {
    pub title: String,
    pub subtitle: String,
    pub body: String,
    pub img_url: String,
}

/// UpdatePostRequest
///
/// Full-overwrite payload for editing a post (POST /edit-post/{id}).
/// Title, subtitle, body, and image URL are replaced wholesale; author and
/// creation date are immutable under edit.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct UpdatePostRequest {
    pub title: String,
    pub subtitle: String,
    pub body: String,
    pub img_url: String,
}

/// CreateCommentRequest
///
/// Input payload for posting a new comment (POST /post/{id}).
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct CreateCommentRequest {
    pub text: String,
}
