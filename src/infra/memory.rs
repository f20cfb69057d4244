//! In-memory store holding the bundled fixture.

use async_trait::async_trait;
use time::{OffsetDateTime, macros::datetime};

use crate::application::repos::{RepoError, StatusStore};
use crate::domain::{
    banners,
    entities::{AuthorRecord, BannerRecord, StatusRecord},
    identifier::{BannerGroupId, StatusId},
};

#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    statuses: Vec<StatusRecord>,
    authors: Vec<AuthorRecord>,
    banners: Vec<BannerRecord>,
}

impl MemoryStore {
    pub fn new(
        mut statuses: Vec<StatusRecord>,
        authors: Vec<AuthorRecord>,
        banners: Vec<BannerRecord>,
    ) -> Self {
        statuses.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Self {
            statuses,
            authors,
            banners,
        }
    }

    /// Two statuses by `jack` and two banners in group `1`.
    pub fn seeded() -> Self {
        Self::new(
            vec![
                status("2", "inviting coworkers", datetime!(2021-05-02 00:00 UTC)),
                status("1", "just setting up my app", datetime!(2021-05-01 00:00 UTC)),
            ],
            vec![AuthorRecord {
                id: "1".to_string(),
                name: "jack".to_string(),
            }],
            vec![banner("2", "1"), banner("1", "1")],
        )
    }
}

fn status(id: &str, body: &str, created_at: OffsetDateTime) -> StatusRecord {
    StatusRecord {
        id: id.to_string(),
        body: body.to_string(),
        author_id: Some("1".to_string()),
        created_at,
    }
}

fn banner(id: &str, group_id: &str) -> BannerRecord {
    BannerRecord {
        id: id.to_string(),
        group_id: group_id.to_string(),
        href: None,
    }
}

#[async_trait]
impl StatusStore for MemoryStore {
    async fn list_statuses(&self) -> Result<Vec<StatusRecord>, RepoError> {
        Ok(self.statuses.clone())
    }

    async fn find_status(&self, id: &StatusId) -> Result<Option<StatusRecord>, RepoError> {
        Ok(self
            .statuses
            .iter()
            .find(|status| status.id == id.as_str())
            .cloned())
    }

    async fn find_author(&self, id: &str) -> Result<Option<AuthorRecord>, RepoError> {
        Ok(self.authors.iter().find(|author| author.id == id).cloned())
    }

    async fn list_banners(
        &self,
        group_id: &BannerGroupId,
    ) -> Result<Vec<BannerRecord>, RepoError> {
        Ok(banners::filter_by_group(&self.banners, group_id.as_str()))
    }
}
