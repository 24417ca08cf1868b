//! Error types for the code store and the HTTP layer
//!
//! Every failure the store can produce is an explicit variant of
//! [`StoreError`]. A missing short code is not one of them: lookups return
//! `Ok(None)` for that case, and only the HTTP layer turns it into a 404.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Errors returned by [`CodeStore`](crate::store::CodeStore) operations
#[derive(Debug, Error)]
pub enum StoreError {
    /// The long URL was missing or blank
    #[error("long URL must not be empty")]
    EmptyInput,

    /// A caller-supplied custom code is already taken
    #[error("short code `{0}` is already taken")]
    DuplicateCode(String),

    /// Random generation found no free code within the retry bound
    #[error("no free short code found after {attempts} attempts")]
    ExhaustedCodespace { attempts: usize },

    #[error("storage error: {0}")]
    Storage(#[from] redb::Error),

    #[error("corrupt mapping record: {0}")]
    Serialization(#[from] serde_json::Error),
}

// redb reports each stage with its own error type; all of them end up as
// `StoreError::Storage`.
macro_rules! storage_error_from {
    ($($ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for StoreError {
                fn from(err: $ty) -> Self {
                    StoreError::Storage(err.into())
                }
            }
        )*
    };
}

storage_error_from!(
    redb::DatabaseError,
    redb::TransactionError,
    redb::TableError,
    redb::StorageError,
    redb::CommitError,
);

/// Errors surfaced by the JSON API
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Store(#[from] StoreError),

    /// A custom code that could not be served as a path segment
    #[error("short code `{0}` cannot be used")]
    InvalidCode(String),

    /// A long URL that could never be sent back in a `Location` header
    #[error("URL cannot be used as a redirect target")]
    InvalidUrl(String),

    /// A stored long URL that cannot be redirected to
    #[error("stored target of `{0}` is not a valid Location header")]
    UnservableTarget(String),

    #[error("URL not found")]
    NotFound,

    /// A blocking store call panicked or was cancelled
    #[error("store task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl ApiError {
    /// HTTP status and a stable machine-readable code for this error
    pub fn status(&self) -> (StatusCode, &'static str) {
        match self {
            ApiError::Store(StoreError::EmptyInput) => (StatusCode::BAD_REQUEST, "empty_url"),
            ApiError::InvalidCode(_) => (StatusCode::BAD_REQUEST, "invalid_code"),
            ApiError::InvalidUrl(_) => (StatusCode::BAD_REQUEST, "invalid_url"),
            ApiError::Store(StoreError::DuplicateCode(_)) => (StatusCode::CONFLICT, "duplicate_code"),
            ApiError::Store(StoreError::ExhaustedCodespace { .. }) => {
                (StatusCode::SERVICE_UNAVAILABLE, "codespace_exhausted")
            }
            ApiError::NotFound => (StatusCode::NOT_FOUND, "not_found"),
            ApiError::UnservableTarget(_) => (StatusCode::INTERNAL_SERVER_ERROR, "unservable_target"),
            ApiError::Store(StoreError::Storage(_) | StoreError::Serialization(_))
            | ApiError::Task(_) => (StatusCode::INTERNAL_SERVER_ERROR, "internal"),
        }
    }

    /// Message safe to show to clients. Storage details stay in the logs.
    pub fn public_message(&self) -> String {
        match self {
            ApiError::Store(StoreError::Storage(_) | StoreError::Serialization(_))
            | ApiError::Task(_) => "Internal server error".to_string(),
            ApiError::UnservableTarget(_) => {
                "This short link points to a URL that cannot be redirected to.".to_string()
            }
            ApiError::Store(StoreError::DuplicateCode(code)) => {
                format!("Short code `{}` is already taken. Please choose another.", code)
            }
            other => other.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }

        (
            status,
            Json(json!({
                "error": self.public_message(),
                "code": code,
            })),
        )
            .into_response()
    }
}
