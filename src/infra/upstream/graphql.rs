use async_trait::async_trait;
use birdhouse_api_types::{
    GraphqlRequest, GraphqlResponse, STATUS_PAGE_PROPS_DOCUMENT, STATUS_PAGE_PROPS_OPERATION,
    STATUSES_DOCUMENT, STATUSES_OPERATION, StatusPageVariables,
};
use reqwest::{Client, Url};
use serde_json::{Map, Value};

use crate::application::source::{SourceError, SourceKind, StatusSource, UpstreamPage};
use crate::domain::identifier::{BannerGroupId, StatusId};

/// Sends the persisted typed-query operations to a GraphQL-style endpoint.
pub struct GraphqlSource {
    client: Client,
    endpoint: Url,
}

impl GraphqlSource {
    pub fn new(client: Client, endpoint: Url) -> Self {
        Self { client, endpoint }
    }

    async fn execute(&self, request: &GraphqlRequest) -> Result<Map<String, Value>, SourceError> {
        let response = self
            .client
            .post(self.endpoint.clone())
            .json(request)
            .send()
            .await
            .map_err(|err| SourceError::Transport(err.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::Status {
                status: status.as_u16(),
            });
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|err| SourceError::Transport(err.to_string()))?;
        let body: GraphqlResponse<Value> =
            serde_json::from_slice(&bytes).map_err(|err| SourceError::Decode(err.to_string()))?;

        if !body.errors.is_empty() {
            return Err(SourceError::Rejected {
                messages: body.errors.into_iter().map(|err| err.message).collect(),
            });
        }

        match body.data {
            Some(Value::Object(data)) => Ok(data),
            Some(other) => Err(SourceError::Decode(format!(
                "`data` must be an object, got {other}"
            ))),
            None => Err(SourceError::Decode(
                "response carried neither data nor errors".to_string(),
            )),
        }
    }
}

#[async_trait]
impl StatusSource for GraphqlSource {
    fn kind(&self) -> SourceKind {
        SourceKind::Graphql
    }

    async fn fetch_page(
        &self,
        status_id: &StatusId,
        banner_group_id: &BannerGroupId,
    ) -> Result<UpstreamPage, SourceError> {
        let variables = StatusPageVariables {
            status_id: status_id.to_string(),
            banner_group_id: banner_group_id.to_string(),
        };
        let request = GraphqlRequest {
            query: STATUS_PAGE_PROPS_DOCUMENT.to_string(),
            operation_name: Some(STATUS_PAGE_PROPS_OPERATION.to_string()),
            variables: serde_json::to_value(variables)
                .map_err(|err| SourceError::Decode(err.to_string()))?,
        };

        let mut data = self.execute(&request).await?;
        let status = match data.remove("status") {
            Some(Value::Null) => None,
            Some(value) => Some(value),
            None => return Err(SourceError::Decode("`data.status` is absent".to_string())),
        };

        Ok(UpstreamPage {
            status,
            banners: data.remove("banners").unwrap_or(Value::Null),
        })
    }

    async fn fetch_statuses(&self) -> Result<Value, SourceError> {
        let request = GraphqlRequest {
            query: STATUSES_DOCUMENT.to_string(),
            operation_name: Some(STATUSES_OPERATION.to_string()),
            variables: Value::Object(Map::new()),
        };

        let mut data = self.execute(&request).await?;
        Ok(data.remove("statuses").unwrap_or(Value::Null))
    }
}
