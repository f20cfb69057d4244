use std::error::Error as StdError;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::{
    application::{page::NotFound, repos::RepoError},
    infra::error::InfraError,
};

/// Diagnostic detail attached to a response and logged by the response
/// middleware. Never shown to the client.
#[derive(Debug, Clone)]
pub struct ErrorReport {
    pub source: &'static str,
    pub status: StatusCode,
    pub messages: Vec<String>,
}

impl ErrorReport {
    pub fn from_error(source: &'static str, status: StatusCode, error: &dyn StdError) -> Self {
        let mut messages = vec![error.to_string()];
        let mut current = error.source();
        while let Some(inner) = current {
            messages.push(inner.to_string());
            current = inner.source();
        }
        Self {
            source,
            status,
            messages,
        }
    }

    pub fn from_message(
        source: &'static str,
        status: StatusCode,
        message: impl Into<String>,
    ) -> Self {
        Self {
            source,
            status,
            messages: vec![message.into()],
        }
    }

    pub fn attach(self, response: &mut Response) {
        response.extensions_mut().insert(self);
    }
}

#[derive(Debug)]
pub struct HttpError {
    status: StatusCode,
    public_message: &'static str,
    report: ErrorReport,
}

impl HttpError {
    pub fn new(
        source: &'static str,
        status: StatusCode,
        public_message: &'static str,
        detail: impl Into<String>,
    ) -> Self {
        Self {
            status,
            public_message,
            report: ErrorReport::from_message(source, status, detail),
        }
    }

    pub fn from_error(
        source: &'static str,
        status: StatusCode,
        public_message: &'static str,
        error: &dyn StdError,
    ) -> Self {
        Self {
            status,
            public_message,
            report: ErrorReport::from_error(source, status, error),
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn public_message(&self) -> &'static str {
        self.public_message
    }

    pub fn into_report(self) -> ErrorReport {
        self.report
    }
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let mut response = (self.status, self.public_message).into_response();
        self.report.attach(&mut response);
        response
    }
}

impl HttpError {
    /// Map an unresolved page onto an HTTP status. Upstream breakage becomes
    /// 502 only when `surface_upstream_errors` is set; everything else is 404.
    pub fn from_not_found(error: &NotFound, surface_upstream_errors: bool) -> Self {
        const SOURCE: &str = "application::error::HttpError::from_not_found";
        if surface_upstream_errors && error.is_upstream_failure() {
            return HttpError::from_error(
                SOURCE,
                StatusCode::BAD_GATEWAY,
                "Upstream unavailable",
                error,
            );
        }
        HttpError::from_error(SOURCE, StatusCode::NOT_FOUND, "Not found", error)
    }
}

/// Failure surfaced at the binary boundary.
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Infra(#[from] InfraError),
    #[error(transparent)]
    Repo(#[from] RepoError),
    #[error("unexpected error: {0}")]
    Unexpected(String),
}

impl AppError {
    pub fn unexpected(message: impl Into<String>) -> Self {
        Self::Unexpected(message.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::source::SourceError;

    #[test]
    fn report_collects_error_chain() {
        let error = NotFound::Upstream(SourceError::Repo(RepoError::Timeout));
        let report = ErrorReport::from_error("test", StatusCode::NOT_FOUND, &error);
        assert_eq!(report.messages[0], "database timeout");
    }

    #[test]
    fn upstream_failure_is_404_unless_surfaced() {
        let error = NotFound::Upstream(SourceError::Status { status: 503 });

        assert_eq!(
            HttpError::from_not_found(&error, false).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            HttpError::from_not_found(&error, true).status(),
            StatusCode::BAD_GATEWAY
        );
    }

    #[test]
    fn missing_status_is_404_even_when_surfacing() {
        assert_eq!(
            HttpError::from_not_found(&NotFound::Missing, true).status(),
            StatusCode::NOT_FOUND
        );
    }

    #[test]
    fn error_response_carries_report_extension() {
        let response = HttpError::new(
            "test",
            StatusCode::NOT_FOUND,
            "Not found",
            "no status `9`",
        )
        .into_response();

        let report = response
            .extensions()
            .get::<ErrorReport>()
            .expect("report attached");
        assert_eq!(report.messages, vec!["no status `9`".to_string()]);
    }
}
