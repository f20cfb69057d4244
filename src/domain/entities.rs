//! Domain entities mirrored from storage, and the verified values the page
//! layer assembles from untrusted upstream payloads.

use serde::Serialize;
use time::OffsetDateTime;

/// A status as kept by a store. The author reference is nullable because
/// authors can be deleted out from under their statuses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusRecord {
    pub id: String,
    pub body: String,
    pub author_id: Option<String>,
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuthorRecord {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BannerRecord {
    pub id: String,
    pub group_id: String,
    pub href: Option<String>,
}

/// A status that passed shape validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Status {
    pub id: String,
    pub body: String,
    pub created_at: OffsetDateTime,
    /// Display name, when the upstream resolved the author.
    pub author_name: Option<String>,
}

/// A banner that passed shape validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Banner {
    pub id: String,
    pub href: Option<String>,
}

/// Everything the status page renders. Built once per request and dropped
/// with the response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPageData {
    pub status: Status,
    pub author_name: String,
    pub banners: Vec<Banner>,
}

/// A status bound for a list view, author already resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedStatus {
    pub status: Status,
    pub author_name: String,
}
