use crate::{
    auth::Actor,
    error::{AppError, Result},
    models::{Comment, CreatePostRequest, Post, UpdatePostRequest},
    repository::RepositoryState,
};

/// require_administrator
///
/// The authorization gate wrapping every content-mutating operation: the
/// actor must be authenticated and carry the administrator role flag.
/// Refusal happens before any persistence access: no partial mutation, and
/// no information about why beyond "forbidden".
pub fn require_administrator(actor: &Actor) -> Result<()> {
    if actor.is_administrator() {
        Ok(())
    } else {
        Err(AppError::Forbidden)
    }
}

/// The date format stamped onto new posts, e.g. "March 05,2024".
const POST_DATE_FORMAT: &str = "%B %d,%Y";

/// list_posts
///
/// All posts in storage order. Always a fresh query; there is no
/// in-process cache of content.
pub async fn list_posts(repo: &RepositoryState) -> Result<Vec<Post>> {
    repo.list_posts().await
}

pub async fn get_post(repo: &RepositoryState, id: i64) -> Result<Post> {
    repo.get_post(id).await?.ok_or(AppError::NotFound("post"))
}

/// create_post
///
/// Gated. Stamps the creation date at call time; the author is the acting
/// administrator. A title collision surfaces as `DuplicateTitle`, atomic
/// with the insert.
pub async fn create_post(
    repo: &RepositoryState,
    actor: &Actor,
    req: CreatePostRequest,
) -> Result<Post> {
    require_administrator(actor)?;
    // The gate guarantees an authenticated user here.
    let author_id = actor.user().ok_or(AppError::Forbidden)?.id;

    let date = chrono::Local::now().format(POST_DATE_FORMAT).to_string();
    let post = repo.create_post(author_id, &date, req).await?;

    tracing::info!(post_id = post.id, "created post");
    Ok(post)
}

/// update_post
///
/// Gated. Overwrites title, subtitle, body, and image URL; the author and
/// creation date are immutable under edit.
pub async fn update_post(
    repo: &RepositoryState,
    actor: &Actor,
    id: i64,
    req: UpdatePostRequest,
) -> Result<Post> {
    require_administrator(actor)?;
    repo.update_post(id, req)
        .await?
        .ok_or(AppError::NotFound("post"))
}

/// delete_post
///
/// Gated. Deleting a post removes its comments with it (transactional
/// cascade in the repository).
pub async fn delete_post(repo: &RepositoryState, actor: &Actor, id: i64) -> Result<()> {
    require_administrator(actor)?;
    if repo.delete_post(id).await? {
        tracing::info!(post_id = id, "deleted post");
        Ok(())
    } else {
        Err(AppError::NotFound("post"))
    }
}

/// add_comment
///
/// Any authenticated user may comment; anonymous actors get
/// `Unauthenticated` so the caller can redirect to login. The submitted
/// text is not retained across that redirect; the view layer owns any
/// draft-preserving behavior.
pub async fn add_comment(
    repo: &RepositoryState,
    actor: &Actor,
    post_id: i64,
    text: &str,
) -> Result<Comment> {
    let author = actor.user().ok_or(AppError::Unauthenticated)?;
    repo.add_comment(post_id, author.id, text).await
}

pub async fn list_comments(repo: &RepositoryState, post_id: i64) -> Result<Vec<Comment>> {
    repo.get_comments(post_id).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::AuthUser;

    fn user(is_admin: bool) -> Actor {
        Actor::User(AuthUser {
            id: 2,
            name: "Reader".to_string(),
            is_admin,
        })
    }

    // The gate needs no repository and no request machinery.
    #[test]
    fn gate_refuses_anonymous() {
        assert!(matches!(
            require_administrator(&Actor::Anonymous),
            Err(AppError::Forbidden)
        ));
    }

    #[test]
    fn gate_refuses_authenticated_non_admin() {
        assert!(matches!(
            require_administrator(&user(false)),
            Err(AppError::Forbidden)
        ));
    }

    #[test]
    fn gate_admits_administrator() {
        assert!(require_administrator(&user(true)).is_ok());
    }

    #[test]
    fn post_date_format_is_month_day_comma_year() {
        let date = chrono::NaiveDate::from_ymd_opt(2024, 3, 5)
            .unwrap()
            .format(POST_DATE_FORMAT)
            .to_string();
        assert_eq!(date, "March 05,2024");
    }
}
