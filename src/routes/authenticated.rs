use crate::{AppState, handlers};
use axum::{Router, routing::get};

/// Authenticated Router Module
///
/// Routes that only make sense with a live session. The `AuthUser`
/// extractor middleware on the layer above guarantees every handler here
/// runs with a validated session; anonymous requests are rejected with
/// 401 before the handler executes.
pub fn authenticated_routes() -> Router<AppState> {
    Router::<AppState>::new()
        // GET /logout
        // Ends the current session and clears the session cookie.
        .route("/logout", get(handlers::logout))
}
