use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{get, post},
};

/// Admin Router Module
///
/// The content-mutating routes: create, edit, and delete posts. Paths are
/// flat (no /admin prefix) because the pages they back are linked straight
/// from the blog's own navigation.
///
/// Access Control:
/// Every operation behind these routes calls the authorization gate before
/// touching the repository. Anonymous and non-administrator users both
/// receive 403 with zero side effects; there is no separate 401 path for
/// these routes, so the responses reveal nothing about session state.
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        // POST /new-post
        // Creates a post; the creation date is stamped server-side.
        .route("/new-post", post(handlers::new_post))
        // POST /edit-post/{id}
        // Full overwrite of the editable fields. Author and creation date
        // are immutable under edit.
        .route("/edit-post/{id}", post(handlers::edit_post))
        // GET /delete-post/{id}
        // Deletes the post and cascades to its comments.
        .route("/delete-post/{id}", get(handlers::delete_post))
}
