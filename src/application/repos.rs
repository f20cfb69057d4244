//! Repository traits describing persistence adapters.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::entities::{AuthorRecord, BannerRecord, StatusRecord};
use crate::domain::identifier::{BannerGroupId, StatusId};

#[derive(Debug, Error)]
pub enum RepoError {
    #[error("persistence error: {0}")]
    Persistence(String),
    #[error("invalid input: {message}")]
    InvalidInput { message: String },
    #[error("database timeout")]
    Timeout,
}

impl RepoError {
    pub fn from_persistence(err: impl std::fmt::Display) -> Self {
        Self::Persistence(err.to_string())
    }
}

/// Read-only storage shared by the in-memory fixture and the database.
#[async_trait]
pub trait StatusStore: Send + Sync {
    /// All statuses, newest first.
    async fn list_statuses(&self) -> Result<Vec<StatusRecord>, RepoError>;

    async fn find_status(&self, id: &StatusId) -> Result<Option<StatusRecord>, RepoError>;

    async fn find_author(&self, id: &str) -> Result<Option<AuthorRecord>, RepoError>;

    /// Banners of one group in display order.
    async fn list_banners(
        &self,
        group_id: &BannerGroupId,
    ) -> Result<Vec<BannerRecord>, RepoError>;
}
