use std::env;

/// AppConfig
///
/// Holds the application's entire configuration state. This struct is
/// designed to be immutable once loaded, ensuring consistency across all
/// threads and services. It is pulled into the application state via
/// FromRef.
#[derive(Clone)]
pub struct AppConfig {
    // Database connection string (SQLite).
    pub db_url: String,
    // Socket address the HTTP listener binds to.
    pub bind_addr: String,
    // Administrator allow-list entry: the account registered with this
    // email is provisioned with the administrator role. Content mutation
    // is keyed off the stored role flag, never off a magic identifier.
    pub admin_email: Option<String>,
    // Runtime environment marker. Controls the log output format.
    pub env: Env,
}

/// Env
///
/// Defines the runtime context, used to switch between development
/// conveniences (pretty logs, on-disk default database) and production
/// settings (JSON logs, mandatory explicit configuration).
#[derive(Clone, PartialEq, Debug)]
pub enum Env {
    Local,
    Production,
}

impl Default for AppConfig {
    /// default
    ///
    /// Provides a safe, non-panicking AppConfig instance primarily used for
    /// test setup. Tests construct state without touching the process
    /// environment.
    fn default() -> Self {
        Self {
            db_url: "sqlite::memory:".to_string(),
            bind_addr: "127.0.0.1:0".to_string(),
            admin_email: None,
            env: Env::Local,
        }
    }
}

impl AppConfig {
    /// load
    ///
    /// The canonical function for initializing the application configuration
    /// at startup. Reads all parameters from environment variables and
    /// implements the fail-fast principle.
    ///
    /// # Panics
    /// Panics if a critical environment variable required for the current
    /// runtime environment (especially Production) is not found. This
    /// prevents the application from starting with an incomplete
    /// configuration.
    pub fn load() -> Self {
        let env_str = env::var("APP_ENV").unwrap_or_else(|_| "local".to_string());
        let env = match env_str.as_str() {
            "production" => Env::Production,
            _ => Env::Local,
        };

        // ADMIN_EMAIL is optional in both environments: without it the
        // instance simply has no account able to mutate posts.
        let admin_email = env::var("ADMIN_EMAIL").ok();

        let bind_addr = env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string());

        let db_url = match env {
            // Local falls back to an on-disk database next to the binary,
            // created on first run.
            Env::Local => env::var("DATABASE_URL")
                .unwrap_or_else(|_| "sqlite:blog.db?mode=rwc".to_string()),
            // Production demands an explicit store location.
            Env::Production => {
                env::var("DATABASE_URL").expect("FATAL: DATABASE_URL required in production")
            }
        };

        Self {
            db_url,
            bind_addr,
            admin_email,
            env,
        }
    }
}
