use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

/// AppError
///
/// The application's single error taxonomy. Every identity, authorization,
/// and content operation returns `Result<T, AppError>`; the `IntoResponse`
/// implementation below is the one place where outcomes become HTTP status
/// codes and user-facing messages.
///
/// All variants except `Database` and `PasswordHash` are recoverable at the
/// route boundary: they map to a message the external view layer can show
/// (flash-style) and never crash the process.
#[derive(Error, Debug)]
pub enum AppError {
    /// The referenced post, comment, or user does not exist.
    #[error("{0} not found")]
    NotFound(&'static str),

    /// Registration attempted with an email that already has an account.
    #[error("an account with this email already exists, login instead")]
    DuplicateEmail,

    /// A post with this exact title already exists.
    #[error("a post with this title already exists")]
    DuplicateTitle,

    /// Login password did not match the stored hash.
    #[error("password is incorrect")]
    BadCredential,

    /// The action requires a logged-in user. The caller is expected to
    /// redirect to the login page rather than silently drop the input.
    #[error("you need to login first")]
    Unauthenticated,

    /// The action requires the administrator. Deliberately carries no
    /// detail beyond "forbidden".
    #[error("forbidden")]
    Forbidden,

    /// Persistence-layer failure. The only non-recoverable class: there is
    /// no retry policy for store unavailability.
    #[error("database error")]
    Database(#[from] sqlx::Error),

    /// Password hashing failure (argon2 misconfiguration; not reachable
    /// with the fixed defaults).
    #[error("credential processing failed")]
    PasswordHash(String),
}

/// A specialized Result type for all service and repository operations.
pub type Result<T, E = AppError> = std::result::Result<T, E>;

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::DuplicateEmail | AppError::DuplicateTitle => StatusCode::CONFLICT,
            AppError::BadCredential | AppError::Unauthenticated => StatusCode::UNAUTHORIZED,
            AppError::Forbidden => StatusCode::FORBIDDEN,
            AppError::Database(_) | AppError::PasswordHash(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        // Internal failures are logged with their cause but surface only a
        // generic message to the client.
        if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!(error = ?self, "internal error");
        }

        let body = Json(serde_json::json!({ "error": self.to_string() }));
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recoverable_variants_map_to_client_errors() {
        let cases = [
            (AppError::NotFound("post"), StatusCode::NOT_FOUND),
            (AppError::DuplicateEmail, StatusCode::CONFLICT),
            (AppError::DuplicateTitle, StatusCode::CONFLICT),
            (AppError::BadCredential, StatusCode::UNAUTHORIZED),
            (AppError::Unauthenticated, StatusCode::UNAUTHORIZED),
            (AppError::Forbidden, StatusCode::FORBIDDEN),
        ];
        for (err, expected) in cases {
            assert_eq!(err.into_response().status(), expected);
        }
    }

    #[test]
    fn forbidden_reveals_nothing_beyond_forbidden() {
        assert_eq!(AppError::Forbidden.to_string(), "forbidden");
    }
}
