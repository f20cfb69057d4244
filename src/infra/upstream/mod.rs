//! Concrete [`StatusSource`] strategies and the factory that picks one from
//! configuration.

mod graphql;
mod rest;
mod store;

pub use graphql::GraphqlSource;
pub use rest::RestSource;
pub use store::StoreSource;

use std::sync::Arc;

use reqwest::Client;

use crate::application::{
    repos::StatusStore,
    source::{SourceKind, StatusSource},
};
use crate::config::{UpstreamBackend, UpstreamSettings};
use crate::infra::error::InfraError;

pub fn user_agent() -> &'static str {
    concat!("birdhouse/", env!("CARGO_PKG_VERSION"))
}

pub fn http_client() -> Result<Client, InfraError> {
    Client::builder()
        .user_agent(user_agent())
        .build()
        .map_err(|err| InfraError::upstream(err.to_string()))
}

/// Build the page source selected by `upstream.backend`. `store` backs the
/// `memory` and `postgres` strategies and is ignored by the HTTP ones.
pub fn build_source(
    settings: &UpstreamSettings,
    store: Arc<dyn StatusStore>,
) -> Result<Arc<dyn StatusSource>, InfraError> {
    let source: Arc<dyn StatusSource> = match settings.backend {
        UpstreamBackend::Memory => Arc::new(StoreSource::new(store, SourceKind::Memory)),
        UpstreamBackend::Postgres => Arc::new(StoreSource::new(store, SourceKind::Postgres)),
        UpstreamBackend::Rest => {
            let base = settings.rest_base_url.clone().ok_or_else(|| {
                InfraError::configuration("upstream.rest_base_url is required for the rest backend")
            })?;
            Arc::new(RestSource::new(http_client()?, base))
        }
        UpstreamBackend::Graphql => {
            let endpoint = settings.graphql_endpoint.clone().ok_or_else(|| {
                InfraError::configuration(
                    "upstream.graphql_endpoint is required for the graphql backend",
                )
            })?;
            Arc::new(GraphqlSource::new(http_client()?, endpoint))
        }
    };
    Ok(source)
}
