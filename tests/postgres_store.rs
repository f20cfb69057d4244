//! Needs a reachable Postgres in `DATABASE_URL`; run with `--ignored`.

use birdhouse::application::repos::StatusStore;
use birdhouse::application::resolvers::{self, AuthorStyle};
use birdhouse::domain::identifier::{BannerGroupId, StatusId};
use birdhouse::infra::db::{PostgresStore, seed_fixture};
use sqlx::PgPool;

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn seeded_database_serves_statuses_and_banners(pool: PgPool) {
    let store = PostgresStore::new(pool);

    let first = seed_fixture(&store).await.expect("seed");
    assert_eq!((first.authors, first.statuses, first.banners), (1, 3, 2));
    let second = seed_fixture(&store).await.expect("reseed");
    assert_eq!((second.authors, second.statuses, second.banners), (0, 0, 0));

    let statuses = store.list_statuses().await.expect("list");
    assert_eq!(statuses.len(), 3);
    assert_eq!(statuses[0].id, "3", "newest first");

    let payload = resolvers::status_page(
        &store,
        &StatusId::parse("1").unwrap(),
        &BannerGroupId::parse("1").unwrap(),
    )
    .await
    .expect("page");
    let status = payload.status.expect("status 1");
    assert_eq!(status.created_at, "2006-03-22T11:00:00Z");
    let banner_ids: Vec<&str> = payload.banners.iter().map(|b| b.id.as_str()).collect();
    assert_eq!(banner_ids, ["2", "1"]);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn deleting_an_author_leaves_statuses_unattributed(pool: PgPool) {
    let store = PostgresStore::new(pool.clone());
    seed_fixture(&store).await.expect("seed");

    sqlx::query("DELETE FROM users WHERE id = '1'")
        .execute(&pool)
        .await
        .expect("delete author");

    let statuses = resolvers::statuses(&store, AuthorStyle::Name)
        .await
        .expect("list");
    assert!(statuses.iter().all(|status| status.author.is_none()));
}
