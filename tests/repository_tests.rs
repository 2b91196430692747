use blog_engine::{
    error::AppError,
    models::{CreatePostRequest, UpdatePostRequest},
    repository::{Repository, SqliteRepository},
};
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};

async fn setup() -> (SqliteRepository, SqlitePool) {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("Failed to open in-memory SQLite");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("migration failed");

    (SqliteRepository::new(pool.clone()), pool)
}

fn post_fields(title: &str) -> CreatePostRequest {
    CreatePostRequest {
        title: title.to_string(),
        subtitle: "sub".to_string(),
        body: "<p>body</p>".to_string(),
        img_url: "https://example.com/x.jpg".to_string(),
    }
}

#[tokio::test]
async fn duplicate_email_maps_to_conflict() {
    let (repo, _pool) = setup().await;

    repo.create_user("a@example.com", "hash", "A", false)
        .await
        .unwrap();
    let err = repo
        .create_user("a@example.com", "hash2", "A2", false)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::DuplicateEmail));
}

#[tokio::test]
async fn duplicate_title_maps_to_conflict() {
    let (repo, _pool) = setup().await;
    let author = repo
        .create_user("a@example.com", "hash", "A", true)
        .await
        .unwrap();

    repo.create_post(author.id, "March 05,2024", post_fields("Title"))
        .await
        .unwrap();
    let err = repo
        .create_post(author.id, "March 06,2024", post_fields("Title"))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::DuplicateTitle));
}

#[tokio::test]
async fn update_preserves_author_and_date() {
    let (repo, _pool) = setup().await;
    let author = repo
        .create_user("a@example.com", "hash", "A", true)
        .await
        .unwrap();
    let post = repo
        .create_post(author.id, "March 05,2024", post_fields("Original"))
        .await
        .unwrap();

    let updated = repo
        .update_post(
            post.id,
            UpdatePostRequest {
                title: "Revised".to_string(),
                subtitle: "new sub".to_string(),
                body: "<p>new</p>".to_string(),
                img_url: "https://example.com/y.jpg".to_string(),
            },
        )
        .await
        .unwrap()
        .expect("post exists");

    assert_eq!(updated.title, "Revised");
    assert_eq!(updated.author_id, author.id);
    assert_eq!(updated.date, "March 05,2024");
}

#[tokio::test]
async fn update_of_missing_post_is_none() {
    let (repo, _pool) = setup().await;
    let result = repo.update_post(42, UpdatePostRequest::default()).await.unwrap();
    assert!(result.is_none());
}

#[tokio::test]
async fn delete_cascades_to_comments() {
    let (repo, pool) = setup().await;
    let author = repo
        .create_user("a@example.com", "hash", "A", true)
        .await
        .unwrap();
    let post = repo
        .create_post(author.id, "March 05,2024", post_fields("Thread"))
        .await
        .unwrap();
    repo.add_comment(post.id, author.id, "hello").await.unwrap();
    repo.add_comment(post.id, author.id, "again").await.unwrap();

    assert!(repo.delete_post(post.id).await.unwrap());

    let remaining = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM comments")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(remaining, 0);

    // Deleting again reports that nothing was removed.
    assert!(!repo.delete_post(post.id).await.unwrap());
}

#[tokio::test]
async fn comment_under_missing_post_is_not_found() {
    let (repo, _pool) = setup().await;
    let author = repo
        .create_user("a@example.com", "hash", "A", false)
        .await
        .unwrap();

    let err = repo.add_comment(7, author.id, "nice post").await.unwrap_err();
    assert!(matches!(err, AppError::NotFound("post")));
}

#[tokio::test]
async fn comments_come_back_in_insertion_order_with_author_names() {
    let (repo, _pool) = setup().await;
    let admin = repo
        .create_user("admin@example.com", "hash", "Admin", true)
        .await
        .unwrap();
    let alice = repo
        .create_user("alice@example.com", "hash", "Alice", false)
        .await
        .unwrap();
    let post = repo
        .create_post(admin.id, "March 05,2024", post_fields("Thread"))
        .await
        .unwrap();

    repo.add_comment(post.id, alice.id, "first").await.unwrap();
    repo.add_comment(post.id, admin.id, "second").await.unwrap();

    let comments = repo.get_comments(post.id).await.unwrap();
    assert_eq!(comments.len(), 2);
    assert_eq!(comments[0].text, "first");
    assert_eq!(comments[0].author_name.as_deref(), Some("Alice"));
    assert_eq!(comments[1].author_name.as_deref(), Some("Admin"));
}

#[tokio::test]
async fn posts_list_in_insertion_order() {
    let (repo, _pool) = setup().await;
    let author = repo
        .create_user("a@example.com", "hash", "A", true)
        .await
        .unwrap();

    for title in ["One", "Two", "Three"] {
        repo.create_post(author.id, "March 05,2024", post_fields(title))
            .await
            .unwrap();
    }

    let titles: Vec<String> = repo
        .list_posts()
        .await
        .unwrap()
        .into_iter()
        .map(|p| p.title)
        .collect();
    assert_eq!(titles, ["One", "Two", "Three"]);
}
