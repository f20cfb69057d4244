use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DomainError {
    #[error("invalid {kind} identifier: {reason}")]
    InvalidIdentifier {
        kind: &'static str,
        reason: &'static str,
    },
}

impl DomainError {
    pub fn invalid_identifier(kind: &'static str, reason: &'static str) -> Self {
        Self::InvalidIdentifier { kind, reason }
    }
}
