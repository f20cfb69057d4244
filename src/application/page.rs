//! Status page resolution: identifier validation, one upstream fetch, shape
//! validation, author binding and the cache directive, in that order.
//!
//! Every failure converges on [`NotFound`]. The handler decides how a failure
//! is shown; nothing here panics or lets an upstream error escape.

use std::{sync::Arc, time::Instant};

use metrics::{counter, histogram};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

use crate::application::{
    cache_control::CacheDirective,
    shape::{self, ShapeError},
    source::{SourceError, SourceKind, StatusSource},
};
use crate::domain::{
    entities::{ResolvedPageData, ResolvedStatus},
    error::DomainError,
    identifier::{BannerGroupId, StatusId},
};

/// Display name used when a status's author cannot be resolved.
pub const DEFAULT_AUTHOR_FALLBACK: &str = "John Doe";

#[derive(Debug, Clone)]
pub struct PagePolicy {
    pub banner_group_id: BannerGroupId,
    pub author_fallback: String,
    pub cache: CacheDirective,
}

#[derive(Debug, Error)]
pub enum NotFound {
    #[error(transparent)]
    InvalidIdentifier(DomainError),
    #[error("status does not exist upstream")]
    Missing,
    #[error(transparent)]
    Upstream(SourceError),
    #[error(transparent)]
    Shape(ShapeError),
}

impl NotFound {
    pub fn outcome(&self) -> &'static str {
        match self {
            NotFound::InvalidIdentifier(_) => "invalid_identifier",
            NotFound::Missing => "missing",
            NotFound::Upstream(_) => "upstream_error",
            NotFound::Shape(_) => "invalid_shape",
        }
    }

    /// True when the upstream broke rather than answered.
    pub fn is_upstream_failure(&self) -> bool {
        matches!(self, NotFound::Upstream(_))
    }
}

#[derive(Debug, Clone)]
pub struct ResolvedPage {
    pub data: ResolvedPageData,
    pub cache_control: CacheDirective,
}

#[derive(Debug, Clone)]
pub struct ResolvedListing {
    pub statuses: Vec<ResolvedStatus>,
    pub cache_control: CacheDirective,
}

#[derive(Clone)]
pub struct StatusPageService {
    source: Arc<dyn StatusSource>,
    policy: PagePolicy,
}

impl StatusPageService {
    pub fn new(source: Arc<dyn StatusSource>, policy: PagePolicy) -> Self {
        Self { source, policy }
    }

    pub fn policy(&self) -> &PagePolicy {
        &self.policy
    }

    pub fn source_kind(&self) -> SourceKind {
        self.source.kind()
    }

    pub async fn resolve(&self, raw_id: &str) -> Result<ResolvedPage, NotFound> {
        let result = self.resolve_page(raw_id).await;
        self.record_outcome("status", raw_id, result.as_ref().err());
        result
    }

    pub async fn resolve_listing(&self) -> Result<ResolvedListing, NotFound> {
        let result = self.resolve_statuses().await;
        self.record_outcome("listing", "", result.as_ref().err());
        result
    }

    /// Account for a status route whose parameter could not be decoded. The
    /// source is never consulted.
    pub fn reject_undecodable(&self) -> NotFound {
        let failure = NotFound::InvalidIdentifier(DomainError::invalid_identifier(
            "status",
            "not valid percent-encoded UTF-8",
        ));
        self.record_outcome("status", "", Some(&failure));
        failure
    }

    async fn resolve_page(&self, raw_id: &str) -> Result<ResolvedPage, NotFound> {
        let status_id = StatusId::parse(raw_id).map_err(NotFound::InvalidIdentifier)?;

        let started = Instant::now();
        let fetched = self
            .source
            .fetch_page(&status_id, &self.policy.banner_group_id)
            .await;
        self.record_latency(started);
        let upstream = fetched.map_err(NotFound::Upstream)?;

        let raw_status = match upstream.status {
            None | Some(Value::Null) => return Err(NotFound::Missing),
            Some(value) => value,
        };
        let status = shape::validate_status(raw_status).map_err(NotFound::Shape)?;
        if status.id != status_id.as_str() {
            return Err(NotFound::Shape(ShapeError::Mismatch {
                requested: status_id.to_string(),
                returned: status.id,
            }));
        }
        let banners = shape::validate_banners(upstream.banners).map_err(NotFound::Shape)?;

        let author_name = bind_author(status.author_name.as_deref(), &self.policy.author_fallback);

        Ok(ResolvedPage {
            data: ResolvedPageData {
                status,
                author_name,
                banners,
            },
            cache_control: self.policy.cache,
        })
    }

    async fn resolve_statuses(&self) -> Result<ResolvedListing, NotFound> {
        let started = Instant::now();
        let fetched = self.source.fetch_statuses().await;
        self.record_latency(started);
        let raw = fetched.map_err(NotFound::Upstream)?;

        let mut statuses = shape::validate_statuses(raw).map_err(NotFound::Shape)?;
        statuses.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        let statuses = statuses
            .into_iter()
            .map(|status| {
                let author_name =
                    bind_author(status.author_name.as_deref(), &self.policy.author_fallback);
                ResolvedStatus {
                    status,
                    author_name,
                }
            })
            .collect();

        Ok(ResolvedListing {
            statuses,
            cache_control: self.policy.cache,
        })
    }

    fn record_latency(&self, started: Instant) {
        let elapsed_ms = started.elapsed().as_secs_f64() * 1000.0;
        histogram!("birdhouse_upstream_fetch_ms", "backend" => self.source.kind().as_str())
            .record(elapsed_ms);
    }

    fn record_outcome(&self, page: &'static str, raw_id: &str, failure: Option<&NotFound>) {
        let backend = self.source.kind().as_str();
        let outcome = failure.map_or("found", NotFound::outcome);
        counter!("birdhouse_page_resolution_total", "page" => page, "outcome" => outcome)
            .increment(1);

        match failure {
            Some(err @ (NotFound::Upstream(_) | NotFound::Shape(_))) => warn!(
                target: "birdhouse::page",
                page,
                backend,
                status_id = raw_id,
                outcome,
                error = %err,
                "upstream data unusable, answering not found"
            ),
            Some(err) => debug!(
                target: "birdhouse::page",
                page,
                backend,
                status_id = raw_id,
                outcome,
                error = %err,
                "status not found"
            ),
            None => debug!(target: "birdhouse::page", page, backend, status_id = raw_id, "resolved"),
        }
    }
}

/// The upstream's author name when it has one, otherwise the fallback.
pub fn bind_author(author_name: Option<&str>, fallback: &str) -> String {
    match author_name {
        Some(name) if !name.trim().is_empty() => name.to_string(),
        _ => fallback.to_string(),
    }
}
