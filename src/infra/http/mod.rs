mod api;
mod middleware;
mod public;

pub use middleware::PageOutcome;
pub use public::{HttpState, build_router};

use crate::application::error::HttpError;
use crate::application::repos::RepoError;
use axum::http::StatusCode;

/// Map a repository error to a consistent HTTP error for the sibling endpoints.
pub fn repo_error_to_http(source: &'static str, err: RepoError) -> HttpError {
    match err {
        RepoError::InvalidInput { message } => HttpError::new(
            source,
            StatusCode::INTERNAL_SERVER_ERROR,
            "Stored data is invalid",
            message,
        ),
        RepoError::Timeout => HttpError::new(
            source,
            StatusCode::SERVICE_UNAVAILABLE,
            "Database timeout",
            "Database timeout",
        ),
        RepoError::Persistence(message) => HttpError::new(
            source,
            StatusCode::SERVICE_UNAVAILABLE,
            "Persistence error",
            message,
        ),
    }
}
