use blog_engine::{
    AppState, SessionStore, SqliteRepository,
    config::AppConfig,
    create_router,
    models::UserProfile,
    repository::RepositoryState,
};
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};
use std::sync::Arc;
use tokio::net::TcpListener;

pub struct TestApp {
    pub address: String,
    pub pool: SqlitePool,
}

async fn spawn_app() -> TestApp {
    // One pooled connection keeps the in-memory database alive and shared
    // by every request the app serves.
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("Failed to open in-memory SQLite");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("migration failed");

    let repo = Arc::new(SqliteRepository::new(pool.clone())) as RepositoryState;
    let state = AppState {
        repo,
        sessions: SessionStore::new(),
        config: AppConfig::default(),
    };
    let router = create_router(state);

    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind port");
    let port = listener.local_addr().unwrap().port();
    let address = format!("http://127.0.0.1:{}", port);

    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });

    TestApp { address, pool }
}

fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .cookie_store(true)
        .build()
        .unwrap()
}

async fn register(
    client: &reqwest::Client,
    app: &TestApp,
    email: &str,
    password: &str,
    name: &str,
) -> reqwest::Response {
    client
        .post(format!("{}/register", app.address))
        .json(&serde_json::json!({ "email": email, "password": password, "name": name }))
        .send()
        .await
        .expect("register request failed")
}

#[tokio::test]
async fn register_then_login_with_same_credential_succeeds() {
    let app = spawn_app().await;

    let response = register(&client(), &app, "alice@example.com", "pw123", "Alice").await;
    assert_eq!(response.status(), 201);
    let profile: UserProfile = response.json().await.unwrap();
    assert_eq!(profile.email, "alice@example.com");
    assert_eq!(profile.name, "Alice");
    assert!(!profile.is_admin);

    // A fresh client (no cookies) can log in with the same credential.
    let response = client()
        .post(format!("{}/login", app.address))
        .json(&serde_json::json!({ "email": "alice@example.com", "password": "pw123" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    let profile: UserProfile = response.json().await.unwrap();
    assert_eq!(profile.id, 1);
}

#[tokio::test]
async fn duplicate_registration_leaves_exactly_one_record() {
    let app = spawn_app().await;

    let first = register(&client(), &app, "alice@example.com", "pw123", "Alice").await;
    assert_eq!(first.status(), 201);

    let second = register(&client(), &app, "alice@example.com", "other", "Imposter").await;
    assert_eq!(second.status(), 409);

    let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users WHERE email = ?")
        .bind("alice@example.com")
        .fetch_one(&app.pool)
        .await
        .unwrap();
    assert_eq!(count, 1);
}

#[tokio::test]
async fn wrong_password_is_rejected() {
    let app = spawn_app().await;
    register(&client(), &app, "alice@example.com", "pw123", "Alice").await;

    let response = client()
        .post(format!("{}/login", app.address))
        .json(&serde_json::json!({ "email": "alice@example.com", "password": "pw124" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 401);
}

#[tokio::test]
async fn unknown_email_is_not_found() {
    let app = spawn_app().await;

    let response = client()
        .post(format!("{}/login", app.address))
        .json(&serde_json::json!({ "email": "nobody@example.com", "password": "pw123" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 404);
}

#[tokio::test]
async fn passwords_are_stored_only_as_hashes() {
    let app = spawn_app().await;
    register(&client(), &app, "alice@example.com", "pw123", "Alice").await;

    let stored = sqlx::query_scalar::<_, String>("SELECT password_hash FROM users WHERE id = 1")
        .fetch_one(&app.pool)
        .await
        .unwrap();
    assert_ne!(stored, "pw123");
    assert!(stored.starts_with("$argon2"));
}

#[tokio::test]
async fn logout_invalidates_the_session() {
    let app = spawn_app().await;
    let client = client();

    // Registration establishes a session (cookie held by the client).
    register(&client, &app, "alice@example.com", "pw123", "Alice").await;

    let response = client
        .get(format!("{}/logout", app.address))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);

    // The session is gone server-side: the authenticated group now rejects.
    let response = client
        .get(format!("{}/logout", app.address))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 401);
}

#[tokio::test]
async fn anonymous_cannot_reach_authenticated_routes() {
    let app = spawn_app().await;

    let response = client()
        .get(format!("{}/logout", app.address))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 401);
}
