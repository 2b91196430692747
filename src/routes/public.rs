use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{get, post},
};

/// Public Router Module
///
/// Defines endpoints accessible to any client, anonymous or logged-in:
/// all read-only content plus the identity gateway (register/login).
///
/// Comment submission also lives here deliberately: the content service
/// itself signals the login requirement (401) so the view layer can
/// redirect to the login page, instead of the middleware swallowing the
/// request earlier.
pub fn public_routes() -> Router<AppState> {
    Router::new()
        // GET /health
        // A simple, unauthenticated endpoint used for monitoring and load
        // balancer checks.
        .route("/health", get(|| async { "ok" }))
        // GET /
        // The index: every post in insertion order.
        .route("/", get(handlers::list_posts))
        // GET /post/{id}: a post plus its comments.
        // POST /post/{id}: submit a comment (login enforced in the service).
        .route(
            "/post/{id}",
            get(handlers::show_post).post(handlers::add_comment),
        )
        // GET /about, GET /contact
        // Static page data for the external view layer.
        .route("/about", get(handlers::about))
        .route("/contact", get(handlers::contact))
        // POST /register
        // Account creation; sets the session cookie on success.
        .route("/register", post(handlers::register))
        // POST /login
        // Credential check; sets the session cookie on success.
        .route("/login", post(handlers::login))
}
