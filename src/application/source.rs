//! The single capability every backend provides: fetch the raw data behind a
//! status page.
//!
//! Implementations return untrusted JSON. Nothing a source hands back is used
//! before it passes [`crate::application::shape`].

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

use crate::application::repos::RepoError;
use crate::domain::identifier::{BannerGroupId, StatusId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    Memory,
    Rest,
    Graphql,
    Postgres,
}

impl SourceKind {
    pub fn as_str(self) -> &'static str {
        match self {
            SourceKind::Memory => "memory",
            SourceKind::Rest => "rest",
            SourceKind::Graphql => "graphql",
            SourceKind::Postgres => "postgres",
        }
    }
}

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("upstream transport failed: {0}")]
    Transport(String),
    #[error("upstream answered with status {status}")]
    Status { status: u16 },
    #[error("upstream rejected the query: {}", messages.join("; "))]
    Rejected { messages: Vec<String> },
    #[error("upstream body could not be decoded: {0}")]
    Decode(String),
    #[error(transparent)]
    Repo(#[from] RepoError),
}

/// Raw page data as received from upstream.
#[derive(Debug, Clone, PartialEq)]
pub struct UpstreamPage {
    /// `None` when the upstream reported the status as missing.
    pub status: Option<Value>,
    pub banners: Value,
}

#[async_trait]
pub trait StatusSource: Send + Sync {
    fn kind(&self) -> SourceKind;

    /// Exactly one upstream round trip for the status page.
    async fn fetch_page(
        &self,
        status_id: &StatusId,
        banner_group_id: &BannerGroupId,
    ) -> Result<UpstreamPage, SourceError>;

    /// Every status as a raw JSON array.
    async fn fetch_statuses(&self) -> Result<Value, SourceError>;
}
