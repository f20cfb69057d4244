use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::application::{
    repos::StatusStore,
    resolvers::{self, AuthorStyle},
    source::{SourceError, SourceKind, StatusSource, UpstreamPage},
};
use crate::domain::identifier::{BannerGroupId, StatusId};

/// Reads straight from a [`StatusStore`], serialized to the same wire shape
/// the HTTP strategies receive so it goes through identical validation.
pub struct StoreSource {
    store: Arc<dyn StatusStore>,
    kind: SourceKind,
}

impl StoreSource {
    pub fn new(store: Arc<dyn StatusStore>, kind: SourceKind) -> Self {
        Self { store, kind }
    }
}

fn encode<T: serde::Serialize>(value: T) -> Result<Value, SourceError> {
    serde_json::to_value(value).map_err(|err| SourceError::Decode(err.to_string()))
}

#[async_trait]
impl StatusSource for StoreSource {
    fn kind(&self) -> SourceKind {
        self.kind
    }

    async fn fetch_page(
        &self,
        status_id: &StatusId,
        banner_group_id: &BannerGroupId,
    ) -> Result<UpstreamPage, SourceError> {
        let payload =
            resolvers::status_page(self.store.as_ref(), status_id, banner_group_id).await?;

        Ok(UpstreamPage {
            status: payload.status.map(encode).transpose()?,
            banners: encode(payload.banners)?,
        })
    }

    async fn fetch_statuses(&self) -> Result<Value, SourceError> {
        let statuses = resolvers::statuses(self.store.as_ref(), AuthorStyle::Entity).await?;
        encode(statuses)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::memory::MemoryStore;

    #[tokio::test]
    async fn memory_source_returns_wire_shaped_page() {
        let source = StoreSource::new(Arc::new(MemoryStore::seeded()), SourceKind::Memory);

        let page = source
            .fetch_page(
                &StatusId::parse("2").unwrap(),
                &BannerGroupId::parse("1").unwrap(),
            )
            .await
            .unwrap();

        let status = page.status.expect("status 2");
        assert_eq!(status["body"], "inviting coworkers");
        assert_eq!(status["createdAt"], "2021-05-02T00:00:00Z");
        assert_eq!(status["author"]["name"], "jack");
        assert_eq!(page.banners.as_array().map(Vec::len), Some(2));
    }

    #[tokio::test]
    async fn memory_source_reports_missing_status() {
        let source = StoreSource::new(Arc::new(MemoryStore::seeded()), SourceKind::Memory);

        let page = source
            .fetch_page(
                &StatusId::parse("nope").unwrap(),
                &BannerGroupId::parse("1").unwrap(),
            )
            .await
            .unwrap();

        assert!(page.status.is_none());
    }
}
