//! Resolve stored records into the wire shape served by the sibling REST and
//! typed-query endpoints, and read by the store-backed page source.

use std::collections::HashMap;

use birdhouse_api_types::{
    AuthorField, AuthorPayload, BannerPayload, StatusPagePayload, StatusPayload,
};
use time::{OffsetDateTime, format_description::well_known::Rfc3339};

use crate::application::repos::{RepoError, StatusStore};
use crate::domain::entities::{AuthorRecord, BannerRecord, StatusRecord};
use crate::domain::identifier::{BannerGroupId, StatusId};

/// How a resolved author is embedded in a status payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthorStyle {
    /// Bare display name, as the REST endpoint serves it.
    Name,
    /// `{ id, name }`, as the typed query serves it.
    Entity,
}

pub async fn status_page(
    store: &dyn StatusStore,
    status_id: &StatusId,
    banner_group_id: &BannerGroupId,
) -> Result<StatusPagePayload, RepoError> {
    let status = status(store, status_id, AuthorStyle::Entity).await?;
    let banners = banners(store, banner_group_id).await?;

    Ok(StatusPagePayload { status, banners })
}

pub async fn banners(
    store: &dyn StatusStore,
    banner_group_id: &BannerGroupId,
) -> Result<Vec<BannerPayload>, RepoError> {
    Ok(store
        .list_banners(banner_group_id)
        .await?
        .into_iter()
        .map(banner_payload)
        .collect())
}

pub async fn status(
    store: &dyn StatusStore,
    status_id: &StatusId,
    style: AuthorStyle,
) -> Result<Option<StatusPayload>, RepoError> {
    let Some(record) = store.find_status(status_id).await? else {
        return Ok(None);
    };

    let author = match record.author_id.as_deref() {
        Some(author_id) => store.find_author(author_id).await?,
        None => None,
    };

    status_payload(record, author, style).map(Some)
}

pub async fn statuses(
    store: &dyn StatusStore,
    style: AuthorStyle,
) -> Result<Vec<StatusPayload>, RepoError> {
    let records = store.list_statuses().await?;
    let mut authors: HashMap<String, Option<AuthorRecord>> = HashMap::new();
    let mut payloads = Vec::with_capacity(records.len());

    for record in records {
        let author = match record.author_id.as_deref() {
            Some(author_id) => match authors.get(author_id) {
                Some(cached) => cached.clone(),
                None => {
                    let found = store.find_author(author_id).await?;
                    authors.insert(author_id.to_string(), found.clone());
                    found
                }
            },
            None => None,
        };
        payloads.push(status_payload(record, author, style)?);
    }

    Ok(payloads)
}

fn status_payload(
    record: StatusRecord,
    author: Option<AuthorRecord>,
    style: AuthorStyle,
) -> Result<StatusPayload, RepoError> {
    let created_at = format_timestamp(record.created_at)?;
    let author = author.map(|author| match style {
        AuthorStyle::Name => AuthorField::Name(author.name),
        AuthorStyle::Entity => AuthorField::Entity(AuthorPayload {
            id: author.id,
            name: author.name,
        }),
    });

    Ok(StatusPayload {
        id: record.id,
        body: record.body,
        created_at,
        author,
    })
}

fn banner_payload(record: BannerRecord) -> BannerPayload {
    BannerPayload {
        id: record.id,
        group_id: Some(record.group_id),
        href: record.href,
    }
}

fn format_timestamp(value: OffsetDateTime) -> Result<String, RepoError> {
    value.format(&Rfc3339).map_err(|err| RepoError::InvalidInput {
        message: format!("timestamp cannot be written as RFC 3339: {err}"),
    })
}
