use std::{convert::Infallible, sync::Arc};

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
};
use axum::{
    extract::{FromRef, FromRequestParts},
    http::{StatusCode, request::Parts},
};
use axum_extra::extract::cookie::CookieJar;
use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use dashmap::DashMap;
use rand::RngCore;

use crate::{
    config::AppConfig,
    error::{AppError, Result},
    models::{LoginRequest, RegisterRequest, User},
    repository::RepositoryState,
};

/// Name of the cookie carrying the session token. The service decides when
/// sessions start and stop; the HTTP layer owns setting/removing the cookie.
pub const SESSION_COOKIE: &str = "blog_session";

// --- Password Hashing ---

/// hash_password
///
/// Hashes a plaintext password with argon2 under the library's fixed default
/// parameters, generating a fresh salt per call. Salt length and algorithm
/// are a configuration of the system, never caller-supplied.
pub fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut argon2::password_hash::rand_core::OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AppError::PasswordHash(e.to_string()))
}

/// verify_password
///
/// Verifies a plaintext password against a stored argon2 PHC string.
/// An unparseable stored hash counts as a mismatch.
pub fn verify_password(password: &str, hash: &str) -> bool {
    let Ok(parsed_hash) = PasswordHash::new(hash) else {
        return false;
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok()
}

// --- Session Store ---

/// SessionStore
///
/// Process-wide session state: an in-memory map from opaque session token to
/// user id. Concurrent requests from different sessions never interfere; a
/// single session's entry is only mutated by that session's own requests.
#[derive(Clone, Default)]
pub struct SessionStore {
    sessions: Arc<DashMap<String, i64>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Establishes a logged-in session for the user and returns the token
    /// the transport layer should hand to the client.
    pub fn start(&self, user_id: i64) -> String {
        let token = generate_token();
        self.sessions.insert(token.clone(), user_id);
        token
    }

    /// Resolves a token back to its user id, if the session is live.
    pub fn resolve(&self, token: &str) -> Option<i64> {
        self.sessions.get(token).map(|entry| *entry)
    }

    /// Invalidates the session. Subsequent resolution of the same token
    /// yields nothing.
    pub fn end(&self, token: &str) {
        self.sessions.remove(token);
    }
}

/// 256 bits of OS randomness, URL-safe base64 encoded.
fn generate_token() -> String {
    let mut bytes = [0u8; 32];
    rand::rngs::OsRng.fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

// --- Actor Resolution ---

/// AuthUser
///
/// The resolved identity of an authenticated request: the subset of the
/// user record that authorization decisions need.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: i64,
    pub name: String,
    pub is_admin: bool,
}

/// Actor
///
/// The identity associated with a request: a logged-in user or nobody.
/// Every content operation takes the actor as an explicit argument rather
/// than reading ambient state.
#[derive(Debug, Clone)]
pub enum Actor {
    Anonymous,
    User(AuthUser),
}

impl Actor {
    pub fn user(&self) -> Option<&AuthUser> {
        match self {
            Actor::User(user) => Some(user),
            Actor::Anonymous => None,
        }
    }

    /// The authorization predicate: true iff the actor is authenticated AND
    /// carries the administrator role flag.
    pub fn is_administrator(&self) -> bool {
        matches!(self, Actor::User(user) if user.is_admin)
    }
}

/// Actor Extractor Implementation
///
/// Resolves the request's actor from the session cookie: token → session
/// store → user record. Failure at any step (no cookie, dead session, user
/// since deleted) yields `Actor::Anonymous`; the extractor itself never
/// rejects, leaving the refusal decision to the operation being invoked.
impl<S> FromRequestParts<S> for Actor
where
    S: Send + Sync,
    // Allows the extractor to pull the Repository State from the app state.
    RepositoryState: FromRef<S>,
    // Allows the extractor to pull the shared session store.
    SessionStore: FromRef<S>,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let repo = RepositoryState::from_ref(state);
        let sessions = SessionStore::from_ref(state);

        let jar = CookieJar::from_headers(&parts.headers);
        let Some(cookie) = jar.get(SESSION_COOKIE) else {
            return Ok(Actor::Anonymous);
        };

        let Some(user_id) = sessions.resolve(cookie.value()) else {
            return Ok(Actor::Anonymous);
        };

        // Database lookup as final verification: the session is only as
        // live as the user record behind it.
        match repo.get_user(user_id).await {
            Ok(Some(user)) => Ok(Actor::User(AuthUser {
                id: user.id,
                name: user.name,
                is_admin: user.is_admin,
            })),
            _ => Ok(Actor::Anonymous),
        }
    }
}

/// AuthUser Extractor Implementation
///
/// The strict variant: usable as a handler argument on routes that require
/// a logged-in user, and as the basis of the authenticated route group's
/// middleware. Rejects with 401 Unauthorized when the actor is anonymous.
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    RepositoryState: FromRef<S>,
    SessionStore: FromRef<S>,
{
    type Rejection = StatusCode;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match Actor::from_request_parts(parts, state).await {
            Ok(Actor::User(user)) => Ok(user),
            _ => Err(StatusCode::UNAUTHORIZED),
        }
    }
}

// --- Identity Service Operations ---

/// register
///
/// Creates a new account and establishes a logged-in session for it.
///
/// The password is hashed before any persistence access so plaintext never
/// reaches the store. Email uniqueness is enforced atomically with the
/// insert (UNIQUE index); a collision surfaces as `DuplicateEmail` with no
/// record created. The administrator role flag is set iff the email matches
/// the provisioned allow-list entry.
pub async fn register(
    repo: &RepositoryState,
    sessions: &SessionStore,
    config: &AppConfig,
    req: RegisterRequest,
) -> Result<(User, String)> {
    let password_hash = hash_password(&req.password)?;
    let is_admin = config.admin_email.as_deref() == Some(req.email.as_str());

    let user = repo
        .create_user(&req.email, &password_hash, &req.name, is_admin)
        .await?;

    tracing::info!(user_id = user.id, "registered new user");
    let token = sessions.start(user.id);
    Ok((user, token))
}

/// authenticate
///
/// Looks the user up by exact email match (`NotFound` if absent), verifies
/// the password against the stored hash (`BadCredential` on mismatch), and
/// establishes a session on success.
pub async fn authenticate(
    repo: &RepositoryState,
    sessions: &SessionStore,
    req: LoginRequest,
) -> Result<(User, String)> {
    let user = repo
        .get_user_by_email(&req.email)
        .await?
        .ok_or(AppError::NotFound("user"))?;

    if !verify_password(&req.password, &user.password_hash) {
        return Err(AppError::BadCredential);
    }

    let token = sessions.start(user.id);
    Ok((user, token))
}

/// end_session
///
/// Invalidates the session behind the token. Idempotent: ending an already
/// dead session is a no-op.
pub fn end_session(sessions: &SessionStore, token: &str) {
    sessions.end(token);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_then_verify_roundtrip() {
        let hash = hash_password("pw123").unwrap();
        assert_ne!(hash, "pw123");
        assert!(verify_password("pw123", &hash));
        assert!(!verify_password("pw124", &hash));
    }

    #[test]
    fn garbage_stored_hash_never_verifies() {
        assert!(!verify_password("pw123", "not-a-phc-string"));
    }

    #[test]
    fn session_lifecycle() {
        let sessions = SessionStore::new();
        let token = sessions.start(7);
        assert_eq!(sessions.resolve(&token), Some(7));

        sessions.end(&token);
        assert_eq!(sessions.resolve(&token), None);
        // Ending twice is harmless.
        sessions.end(&token);
    }

    #[test]
    fn tokens_are_unique_per_session() {
        let sessions = SessionStore::new();
        assert_ne!(sessions.start(1), sessions.start(1));
    }

    #[test]
    fn administrator_predicate() {
        let admin = Actor::User(AuthUser {
            id: 1,
            name: "Ada".to_string(),
            is_admin: true,
        });
        let reader = Actor::User(AuthUser {
            id: 2,
            name: "Bob".to_string(),
            is_admin: false,
        });
        assert!(admin.is_administrator());
        assert!(!reader.is_administrator());
        assert!(!Actor::Anonymous.is_administrator());
    }
}
