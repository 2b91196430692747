use crate::{
    AppState, auth,
    auth::Actor,
    content,
    error::AppError,
    models::{
        Comment, CreateCommentRequest, CreatePostRequest, LoginRequest, Post, PostPage,
        RegisterRequest, UpdatePostRequest, UserProfile,
    },
};
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use axum_extra::extract::cookie::{Cookie, CookieJar};

/// Builds the HttpOnly session cookie carrying the given token. Scoped to
/// the whole site so every route resolves the same actor.
fn session_cookie(token: String) -> Cookie<'static> {
    Cookie::build((auth::SESSION_COOKIE, token))
        .path("/")
        .http_only(true)
        .build()
}

/// The removal counterpart: same name and path, empty value.
fn expired_session_cookie() -> Cookie<'static> {
    Cookie::build((auth::SESSION_COOKIE, "")).path("/").build()
}

// --- Public Content Handlers ---

/// list_posts
///
/// [Public Route] The index: every post, in storage (insertion) order.
/// The view layer renders this list; the core hands over plain records.
#[utoipa::path(
    get,
    path = "/",
    responses((status = 200, description = "All posts", body = [Post]))
)]
pub async fn list_posts(State(state): State<AppState>) -> Result<Json<Vec<Post>>, AppError> {
    let posts = content::list_posts(&state.repo).await?;
    Ok(Json(posts))
}

/// show_post
///
/// [Public Route] A single post plus its comments in insertion order,
/// exactly the data the post page needs.
#[utoipa::path(
    get,
    path = "/post/{id}",
    params(("id" = i64, Path, description = "Post ID")),
    responses(
        (status = 200, description = "Post with comments", body = PostPage),
        (status = 404, description = "No such post")
    )
)]
pub async fn show_post(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<PostPage>, AppError> {
    let post = content::get_post(&state.repo, id).await?;
    let comments = content::list_comments(&state.repo, id).await?;
    Ok(Json(PostPage { post, comments }))
}

/// add_comment
///
/// [Public Route, auth enforced in the service] Submits a comment on a
/// post. Anonymous submissions receive 401; the caller is expected to
/// redirect to login rather than silently drop the comment.
#[utoipa::path(
    post,
    path = "/post/{id}",
    params(("id" = i64, Path, description = "Post ID")),
    request_body = CreateCommentRequest,
    responses(
        (status = 201, description = "Comment added", body = Comment),
        (status = 401, description = "Login required"),
        (status = 404, description = "No such post")
    )
)]
pub async fn add_comment(
    actor: Actor,
    State(state): State<AppState>,
    Path(post_id): Path<i64>,
    Json(payload): Json<CreateCommentRequest>,
) -> Result<(StatusCode, Json<Comment>), AppError> {
    let comment = content::add_comment(&state.repo, &actor, post_id, &payload.text).await?;
    Ok((StatusCode::CREATED, Json(comment)))
}

/// about
///
/// [Public Route] Static page data for the external view layer.
#[utoipa::path(get, path = "/about", responses((status = 200, description = "About page")))]
pub async fn about() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "page": "about" }))
}

/// contact
///
/// [Public Route] Static page data for the external view layer.
#[utoipa::path(get, path = "/contact", responses((status = 200, description = "Contact page")))]
pub async fn contact() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "page": "contact" }))
}

// --- Identity Handlers ---

/// register
///
/// [Public Route] Creates an account and logs it in: the session cookie is
/// set on the same response. A colliding email yields 409 and no account.
#[utoipa::path(
    post,
    path = "/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Registered and logged in", body = UserProfile),
        (status = 409, description = "Email already registered")
    )
)]
pub async fn register(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(payload): Json<RegisterRequest>,
) -> Result<(StatusCode, CookieJar, Json<UserProfile>), AppError> {
    let (user, token) =
        auth::register(&state.repo, &state.sessions, &state.config, payload).await?;
    let jar = jar.add(session_cookie(token));
    Ok((StatusCode::CREATED, jar, Json(user.into())))
}

/// login
///
/// [Public Route] Authenticates by email + password. An unknown email and a
/// wrong password are distinct outcomes (404 vs 401), matching the message
/// split the view layer shows.
#[utoipa::path(
    post,
    path = "/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Logged in", body = UserProfile),
        (status = 401, description = "Password is incorrect"),
        (status = 404, description = "Email does not exist")
    )
)]
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(payload): Json<LoginRequest>,
) -> Result<(CookieJar, Json<UserProfile>), AppError> {
    let (user, token) = auth::authenticate(&state.repo, &state.sessions, payload).await?;
    let jar = jar.add(session_cookie(token));
    Ok((jar, Json(user.into())))
}

/// logout
///
/// [Authenticated Route] Ends the session and clears the cookie. Subsequent
/// requests with the old token resolve to Anonymous.
#[utoipa::path(
    get,
    path = "/logout",
    responses(
        (status = 200, description = "Logged out"),
        (status = 401, description = "No active session")
    )
)]
pub async fn logout(State(state): State<AppState>, jar: CookieJar) -> (CookieJar, StatusCode) {
    let token = jar
        .get(auth::SESSION_COOKIE)
        .map(|cookie| cookie.value().to_string());
    if let Some(token) = token {
        auth::end_session(&state.sessions, &token);
    }
    (jar.remove(expired_session_cookie()), StatusCode::OK)
}

// --- Administrator Handlers ---

/// new_post
///
/// [Admin Route] Creates a post authored by the acting administrator, with
/// the creation date stamped server-side. Everyone else, anonymous or
/// logged in, receives 403 before any persistence access.
#[utoipa::path(
    post,
    path = "/new-post",
    request_body = CreatePostRequest,
    responses(
        (status = 201, description = "Post created", body = Post),
        (status = 403, description = "Administrator only"),
        (status = 409, description = "Title already taken")
    )
)]
pub async fn new_post(
    actor: Actor,
    State(state): State<AppState>,
    Json(payload): Json<CreatePostRequest>,
) -> Result<(StatusCode, Json<Post>), AppError> {
    let post = content::create_post(&state.repo, &actor, payload).await?;
    Ok((StatusCode::CREATED, Json(post)))
}

/// edit_post
///
/// [Admin Route] Overwrites a post's editable fields. Author and creation
/// date survive the edit untouched.
#[utoipa::path(
    post,
    path = "/edit-post/{id}",
    params(("id" = i64, Path, description = "Post ID")),
    request_body = UpdatePostRequest,
    responses(
        (status = 200, description = "Post updated", body = Post),
        (status = 403, description = "Administrator only"),
        (status = 404, description = "No such post"),
        (status = 409, description = "Title already taken")
    )
)]
pub async fn edit_post(
    actor: Actor,
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<UpdatePostRequest>,
) -> Result<Json<Post>, AppError> {
    let post = content::update_post(&state.repo, &actor, id, payload).await?;
    Ok(Json(post))
}

/// delete_post
///
/// [Admin Route] Deletes a post and, with it, all of its comments.
#[utoipa::path(
    get,
    path = "/delete-post/{id}",
    params(("id" = i64, Path, description = "Post ID")),
    responses(
        (status = 204, description = "Post and its comments deleted"),
        (status = 403, description = "Administrator only"),
        (status = 404, description = "No such post")
    )
)]
pub async fn delete_post(
    actor: Actor,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    content::delete_post(&state.repo, &actor, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
