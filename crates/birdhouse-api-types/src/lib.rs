//! Wire types shared by the Birdhouse sibling endpoints and the clients that
//! consume them.
//!
//! Everything here is plain data. Deserializing into these types is the first
//! half of shape validation: a value that does not carry every required string
//! field fails to deserialize as a whole.

use serde::{Deserialize, Serialize};

/// Operation name of the single-status page query.
pub const STATUS_PAGE_PROPS_OPERATION: &str = "StatusPageProps";

/// Document sent for [`STATUS_PAGE_PROPS_OPERATION`].
pub const STATUS_PAGE_PROPS_DOCUMENT: &str = r#"query StatusPageProps($statusId: ID!, $bannerGroupId: ID!) {
  status(id: $statusId) {
    id
    body
    author {
      id
      name
    }
    createdAt
  }
  banners(groupId: $bannerGroupId) {
    id
    href
  }
}"#;

/// Operation name of the status list query.
pub const STATUSES_OPERATION: &str = "Statuses";

/// Document sent for [`STATUSES_OPERATION`].
pub const STATUSES_DOCUMENT: &str = r#"query Statuses {
  statuses {
    id
    body
    author {
      id
      name
    }
    createdAt
  }
}"#;

/// A status as it travels between services.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusPayload {
    pub id: String,
    pub body: String,
    /// RFC 3339 timestamp.
    pub created_at: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<AuthorField>,
}

/// The REST collaborator sends a bare display name; the typed query sends the
/// author entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AuthorField {
    Name(String),
    Entity(AuthorPayload),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorPayload {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BannerPayload {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_id: Option<String>,
    #[serde(default)]
    pub href: Option<String>,
}

/// Result data of [`STATUS_PAGE_PROPS_OPERATION`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusPagePayload {
    pub status: Option<StatusPayload>,
    pub banners: Vec<BannerPayload>,
}

/// Result data of [`STATUSES_OPERATION`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusesPayload {
    pub statuses: Vec<StatusPayload>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusPageVariables {
    pub status_id: String,
    pub banner_group_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphqlRequest {
    pub query: String,
    #[serde(default)]
    pub operation_name: Option<String>,
    #[serde(default)]
    pub variables: serde_json::Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphqlResponse<D> {
    #[serde(default = "Option::default")]
    pub data: Option<D>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<GraphqlError>,
}

impl<D> GraphqlResponse<D> {
    pub fn data(data: D) -> Self {
        Self {
            data: Some(data),
            errors: Vec::new(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            data: None,
            errors: vec![GraphqlError {
                message: message.into(),
            }],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphqlError {
    pub message: String,
}

/// Body of a failed REST call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageBody {
    pub message: String,
}
