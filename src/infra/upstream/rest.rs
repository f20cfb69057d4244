use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use serde_json::Value;

use crate::application::source::{SourceError, SourceKind, StatusSource, UpstreamPage};
use crate::domain::identifier::{BannerGroupId, StatusId};

/// Talks to the sibling REST collaborator. That endpoint carries no banners,
/// so pages fetched here always have an empty banner column.
pub struct RestSource {
    client: Client,
    base: Url,
}

impl RestSource {
    pub fn new(client: Client, base: Url) -> Self {
        Self { client, base }
    }

    fn url(&self, segments: &[&str]) -> Result<Url, SourceError> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|()| SourceError::Transport(format!("`{}` cannot be a base URL", self.base)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// `Ok(None)` on 404.
    async fn get(&self, url: Url) -> Result<Option<Value>, SourceError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|err| SourceError::Transport(err.to_string()))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            return Err(SourceError::Status {
                status: status.as_u16(),
            });
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|err| SourceError::Transport(err.to_string()))?;
        serde_json::from_slice(&bytes)
            .map(Some)
            .map_err(|err| SourceError::Decode(err.to_string()))
    }
}

#[async_trait]
impl StatusSource for RestSource {
    fn kind(&self) -> SourceKind {
        SourceKind::Rest
    }

    async fn fetch_page(
        &self,
        status_id: &StatusId,
        _banner_group_id: &BannerGroupId,
    ) -> Result<UpstreamPage, SourceError> {
        let url = self.url(&["api", "statuses", status_id.as_str()])?;
        let status = self.get(url).await?;
        Ok(UpstreamPage {
            status,
            banners: Value::Array(Vec::new()),
        })
    }

    async fn fetch_statuses(&self) -> Result<Value, SourceError> {
        let url = self.url(&["api", "statuses"])?;
        self.get(url)
            .await?
            .ok_or(SourceError::Status { status: 404 })
    }
}
