use time::{OffsetDateTime, macros::datetime};
use tracing::info;

use crate::application::repos::RepoError;

use super::{PostgresStore, map_sqlx_error};

/// Outcome of [`seed_fixture`], counting rows actually inserted.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SeedReport {
    pub authors: u64,
    pub statuses: u64,
    pub banners: u64,
}

/// Insert `jack`, three of his statuses and the two banners of group `1`.
/// Rows that already exist are left alone, so seeding twice is harmless.
pub async fn seed_fixture(store: &PostgresStore) -> Result<SeedReport, RepoError> {
    let mut tx = store.pool().begin().await.map_err(map_sqlx_error)?;
    let mut report = SeedReport::default();

    report.authors += sqlx::query(
        "INSERT INTO users (id, name) VALUES ($1, $2) ON CONFLICT (id) DO NOTHING",
    )
    .bind("1")
    .bind("jack")
    .execute(&mut *tx)
    .await
    .map_err(map_sqlx_error)?
    .rows_affected();

    let statuses: [(&str, &str, OffsetDateTime); 3] = [
        ("1", "just setting up my app", datetime!(2006-03-22 11:00 UTC)),
        ("2", "inviting coworkers", datetime!(2014-03-22 12:00 UTC)),
        ("3", "MySQL server has gone away...?", OffsetDateTime::now_utc()),
    ];
    for (id, body, created_at) in statuses {
        report.statuses += sqlx::query(
            r#"
            INSERT INTO statuses (id, body, author_id, created_at)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (id) DO NOTHING
            "#,
        )
        .bind(id)
        .bind(body)
        .bind("1")
        .bind(created_at)
        .execute(&mut *tx)
        .await
        .map_err(map_sqlx_error)?
        .rows_affected();
    }

    for (position, id) in ["2", "1"].into_iter().enumerate() {
        report.banners += sqlx::query(
            r#"
            INSERT INTO banners (id, group_id, href, position)
            VALUES ($1, $2, NULL, $3)
            ON CONFLICT (id) DO NOTHING
            "#,
        )
        .bind(id)
        .bind("1")
        .bind(position as i32)
        .execute(&mut *tx)
        .await
        .map_err(map_sqlx_error)?
        .rows_affected();
    }

    tx.commit().await.map_err(map_sqlx_error)?;

    info!(
        target = "birdhouse::seed",
        authors = report.authors,
        statuses = report.statuses,
        banners = report.banners,
        "Seeded fixture"
    );
    Ok(report)
}
