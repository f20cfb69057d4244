//! Validated identifiers for route and configuration input.
//!
//! Identifiers are opaque strings. Validation only guarantees they are safe to
//! hand to an upstream: non-empty, bounded, and free of path separators or
//! control characters.

use std::fmt;

use crate::domain::error::DomainError;

const MAX_IDENTIFIER_LEN: usize = 128;

fn validate(kind: &'static str, raw: &str) -> Result<String, DomainError> {
    if raw.is_empty() {
        return Err(DomainError::invalid_identifier(kind, "must not be empty"));
    }
    if raw.chars().count() > MAX_IDENTIFIER_LEN {
        return Err(DomainError::invalid_identifier(kind, "too long"));
    }
    if raw.chars().any(|c| c == '/' || c.is_control()) {
        return Err(DomainError::invalid_identifier(
            kind,
            "contains a forbidden character",
        ));
    }
    Ok(raw.to_string())
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StatusId(String);

impl StatusId {
    pub fn parse(raw: &str) -> Result<Self, DomainError> {
        validate("status", raw).map(Self)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StatusId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BannerGroupId(String);

impl BannerGroupId {
    pub fn parse(raw: &str) -> Result<Self, DomainError> {
        validate("banner group", raw).map(Self)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BannerGroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_opaque_strings() {
        assert_eq!(StatusId::parse("1").expect("valid").as_str(), "1");
        assert!(StatusId::parse("f3b5c1d2-aa").is_ok());
    }

    #[test]
    fn rejects_empty_identifier() {
        assert_eq!(
            StatusId::parse(""),
            Err(DomainError::invalid_identifier("status", "must not be empty"))
        );
    }

    #[test]
    fn rejects_separators_and_control_characters() {
        assert!(StatusId::parse("1/2").is_err());
        assert!(StatusId::parse("1\n").is_err());
    }

    #[test]
    fn rejects_oversized_identifier() {
        let raw = "x".repeat(MAX_IDENTIFIER_LEN + 1);
        assert!(BannerGroupId::parse(&raw).is_err());
    }

    #[test]
    fn length_limit_counts_characters() {
        let wide = "あ".repeat(MAX_IDENTIFIER_LEN);
        assert!(StatusId::parse(&wide).is_ok());
        assert!(StatusId::parse(&format!("{wide}あ")).is_err());
    }
}
