//! Total shape validation of upstream payloads.
//!
//! A payload either converts into verified domain values or is rejected as a
//! whole. There is no partially accepted status and no list with holes.

use birdhouse_api_types::{AuthorField, BannerPayload, StatusPayload};
use serde_json::Value;
use thiserror::Error;
use time::{OffsetDateTime, format_description::well_known::Rfc3339};

use crate::domain::entities::{Banner, Status};

#[derive(Debug, Error)]
pub enum ShapeError {
    #[error("payload does not match the expected shape: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("`createdAt` of status `{id}` is not an RFC 3339 timestamp")]
    Timestamp { id: String },
    #[error("upstream answered with status `{returned}` for `{requested}`")]
    Mismatch { requested: String, returned: String },
}

pub fn validate_status(value: Value) -> Result<Status, ShapeError> {
    let payload: StatusPayload = serde_json::from_value(value)?;
    into_status(payload)
}

pub fn validate_statuses(value: Value) -> Result<Vec<Status>, ShapeError> {
    let payloads: Vec<StatusPayload> = serde_json::from_value(value)?;
    payloads.into_iter().map(into_status).collect()
}

pub fn validate_banners(value: Value) -> Result<Vec<Banner>, ShapeError> {
    let payloads: Vec<BannerPayload> = serde_json::from_value(value)?;
    Ok(payloads
        .into_iter()
        .map(|payload| Banner {
            id: payload.id,
            href: payload.href,
        })
        .collect())
}

fn into_status(payload: StatusPayload) -> Result<Status, ShapeError> {
    let StatusPayload {
        id,
        body,
        created_at,
        author,
    } = payload;

    let Ok(created_at) = OffsetDateTime::parse(&created_at, &Rfc3339) else {
        return Err(ShapeError::Timestamp { id });
    };

    let author_name = author.map(|author| match author {
        AuthorField::Name(name) => name,
        AuthorField::Entity(entity) => entity.name,
    });

    Ok(Status {
        id,
        body,
        created_at,
        author_name,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use time::macros::datetime;

    #[test]
    fn accepts_complete_status() {
        let status = validate_status(json!({
            "id": "1",
            "body": "just setting up my app",
            "createdAt": "2021-05-01T00:00:00Z",
            "author": { "id": "1", "name": "jack" },
        }))
        .expect("valid status");

        assert_eq!(status.id, "1");
        assert_eq!(status.body, "just setting up my app");
        assert_eq!(status.created_at, datetime!(2021-05-01 00:00 UTC));
        assert_eq!(status.author_name.as_deref(), Some("jack"));
    }

    #[test]
    fn rejects_status_missing_created_at() {
        let result = validate_status(json!({ "id": "1", "body": "hi", "author": "jack" }));
        assert!(matches!(result, Err(ShapeError::Malformed(_))));
    }

    #[test]
    fn rejects_status_with_mistyped_field() {
        let result = validate_status(json!({
            "id": 1,
            "body": "hi",
            "createdAt": "2021-05-01T00:00:00Z",
        }));
        assert!(matches!(result, Err(ShapeError::Malformed(_))));
    }

    #[test]
    fn rejects_unparseable_timestamp() {
        let result = validate_status(json!({
            "id": "1",
            "body": "hi",
            "createdAt": "yesterday",
        }));
        assert!(matches!(result, Err(ShapeError::Timestamp { id }) if id == "1"));
    }

    #[test]
    fn null_author_is_not_a_shape_error() {
        let status = validate_status(json!({
            "id": "1",
            "body": "hi",
            "createdAt": "2021-05-01T00:00:00Z",
            "author": null,
        }))
        .expect("author is optional");
        assert!(status.author_name.is_none());
    }

    #[test]
    fn one_bad_entry_rejects_the_whole_list() {
        let result = validate_statuses(json!([
            { "id": "1", "body": "a", "createdAt": "2021-05-01T00:00:00Z" },
            { "id": "2", "body": "b" },
        ]));
        assert!(result.is_err());
    }

    #[test]
    fn non_array_is_never_a_valid_list() {
        assert!(validate_statuses(json!({ "statuses": [] })).is_err());
        assert!(validate_banners(json!(null)).is_err());
    }

    #[test]
    fn banners_keep_order_and_optional_links() {
        let banners = validate_banners(json!([
            { "id": "2", "href": null },
            { "id": "1", "href": "https://example.com" },
        ]))
        .expect("valid banners");

        assert_eq!(banners.len(), 2);
        assert_eq!(banners[0].id, "2");
        assert_eq!(banners[1].href.as_deref(), Some("https://example.com"));
    }

    #[test]
    fn malformed_banner_rejects_all_banners() {
        let result = validate_banners(json!([{ "id": "1" }, { "href": "x" }]));
        assert!(result.is_err());
    }
}
