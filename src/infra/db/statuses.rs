use async_trait::async_trait;
use time::OffsetDateTime;

use crate::{
    application::repos::{RepoError, StatusStore},
    domain::{
        entities::{AuthorRecord, BannerRecord, StatusRecord},
        identifier::{BannerGroupId, StatusId},
    },
};

use super::{PostgresStore, map_sqlx_error};

#[derive(sqlx::FromRow)]
struct StatusRow {
    id: String,
    body: String,
    author_id: Option<String>,
    created_at: OffsetDateTime,
}

impl From<StatusRow> for StatusRecord {
    fn from(row: StatusRow) -> Self {
        Self {
            id: row.id,
            body: row.body,
            author_id: row.author_id,
            created_at: row.created_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct AuthorRow {
    id: String,
    name: String,
}

#[derive(sqlx::FromRow)]
struct BannerRow {
    id: String,
    group_id: String,
    href: Option<String>,
}

#[async_trait]
impl StatusStore for PostgresStore {
    async fn list_statuses(&self) -> Result<Vec<StatusRecord>, RepoError> {
        let rows = sqlx::query_as::<_, StatusRow>(
            r#"
            SELECT id, body, author_id, created_at
            FROM statuses
            ORDER BY created_at DESC, id
            "#,
        )
        .fetch_all(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(rows.into_iter().map(StatusRecord::from).collect())
    }

    async fn find_status(&self, id: &StatusId) -> Result<Option<StatusRecord>, RepoError> {
        let row = sqlx::query_as::<_, StatusRow>(
            r#"
            SELECT id, body, author_id, created_at
            FROM statuses
            WHERE id = $1
            "#,
        )
        .bind(id.as_str())
        .fetch_optional(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(row.map(StatusRecord::from))
    }

    async fn find_author(&self, id: &str) -> Result<Option<AuthorRecord>, RepoError> {
        let row = sqlx::query_as::<_, AuthorRow>("SELECT id, name FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        Ok(row.map(|row| AuthorRecord {
            id: row.id,
            name: row.name,
        }))
    }

    async fn list_banners(
        &self,
        group_id: &BannerGroupId,
    ) -> Result<Vec<BannerRecord>, RepoError> {
        let rows = sqlx::query_as::<_, BannerRow>(
            r#"
            SELECT id, group_id, href
            FROM banners
            WHERE group_id = $1
            ORDER BY position, id
            "#,
        )
        .bind(group_id.as_str())
        .fetch_all(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(rows
            .into_iter()
            .map(|row| BannerRecord {
                id: row.id,
                group_id: row.group_id,
                href: row.href,
            })
            .collect())
    }
}
