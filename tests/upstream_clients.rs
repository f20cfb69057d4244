use std::{net::SocketAddr, sync::Arc};

use axum::{
    Json, Router,
    http::StatusCode,
    routing::{get, post},
};
use birdhouse::application::cache_control::CacheDirective;
use birdhouse::application::page::{NotFound, PagePolicy, StatusPageService};
use birdhouse::application::repos::StatusStore;
use birdhouse::application::source::{SourceError, SourceKind, StatusSource};
use birdhouse::domain::identifier::{BannerGroupId, StatusId};
use birdhouse::infra::http::{HttpState, build_router};
use birdhouse::infra::memory::MemoryStore;
use birdhouse::infra::upstream::{GraphqlSource, RestSource, StoreSource};
use birdhouse::presentation::views::LayoutChrome;
use reqwest::{Client, Url};
use serde_json::json;
use tokio::net::TcpListener;

fn policy() -> PagePolicy {
    PagePolicy {
        banner_group_id: BannerGroupId::parse("1").unwrap(),
        author_fallback: "John Doe".to_string(),
        cache: CacheDirective::default(),
    }
}

async fn spawn(router: Router) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    addr
}

/// A full birdhouse instance serving the seeded memory store.
async fn spawn_birdhouse() -> SocketAddr {
    let store: Arc<dyn StatusStore> = Arc::new(MemoryStore::seeded());
    let source = Arc::new(StoreSource::new(store.clone(), SourceKind::Memory));
    spawn(build_router(HttpState {
        pages: Arc::new(StatusPageService::new(source, policy())),
        store,
        chrome: LayoutChrome::new("Birdhouse"),
        surface_upstream_errors: false,
    }))
    .await
}

fn ids() -> (StatusId, BannerGroupId) {
    (
        StatusId::parse("1").unwrap(),
        BannerGroupId::parse("1").unwrap(),
    )
}

#[tokio::test]
async fn rest_source_reads_sibling_endpoint() {
    let addr = spawn_birdhouse().await;
    let source = RestSource::new(Client::new(), Url::parse(&format!("http://{addr}")).unwrap());
    let (status_id, group_id) = ids();

    let page = source.fetch_page(&status_id, &group_id).await.unwrap();

    let status = page.status.expect("status 1");
    assert_eq!(status["author"], "jack");
    assert_eq!(page.banners, json!([]));
}

#[tokio::test]
async fn rest_source_maps_404_to_missing() {
    let addr = spawn_birdhouse().await;
    let source = RestSource::new(Client::new(), Url::parse(&format!("http://{addr}")).unwrap());

    let page = source
        .fetch_page(
            &StatusId::parse("999").unwrap(),
            &BannerGroupId::parse("1").unwrap(),
        )
        .await
        .unwrap();

    assert!(page.status.is_none());
}

#[tokio::test]
async fn rest_source_reports_server_errors() {
    let addr = spawn(Router::new().route(
        "/api/statuses/{id}",
        get(|| async { StatusCode::INTERNAL_SERVER_ERROR }),
    ))
    .await;
    let source = RestSource::new(Client::new(), Url::parse(&format!("http://{addr}")).unwrap());
    let (status_id, group_id) = ids();

    let err = source.fetch_page(&status_id, &group_id).await.unwrap_err();

    assert!(matches!(err, SourceError::Status { status: 500 }));
}

#[tokio::test]
async fn rest_source_reports_transport_failures() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    let source = RestSource::new(Client::new(), Url::parse(&format!("http://{addr}")).unwrap());
    let (status_id, group_id) = ids();

    let err = source.fetch_page(&status_id, &group_id).await.unwrap_err();

    assert!(matches!(err, SourceError::Transport(_)));
}

#[tokio::test]
async fn graphql_source_reads_sibling_endpoint() {
    let addr = spawn_birdhouse().await;
    let endpoint = Url::parse(&format!("http://{addr}/api/graphql")).unwrap();
    let source = GraphqlSource::new(Client::new(), endpoint);
    let (status_id, group_id) = ids();

    let page = source.fetch_page(&status_id, &group_id).await.unwrap();

    let status = page.status.expect("status 1");
    assert_eq!(status["author"]["name"], "jack");
    assert_eq!(page.banners.as_array().map(Vec::len), Some(2));

    let statuses = source.fetch_statuses().await.unwrap();
    assert_eq!(statuses.as_array().map(Vec::len), Some(2));
}

#[tokio::test]
async fn graphql_source_treats_errors_array_as_rejection() {
    let addr = spawn(Router::new().route(
        "/graphql",
        post(|| async { Json(json!({ "data": null, "errors": [{ "message": "boom" }] })) }),
    ))
    .await;
    let endpoint = Url::parse(&format!("http://{addr}/graphql")).unwrap();
    let source = GraphqlSource::new(Client::new(), endpoint);
    let (status_id, group_id) = ids();

    let err = source.fetch_page(&status_id, &group_id).await.unwrap_err();

    match err {
        SourceError::Rejected { messages } => assert_eq!(messages, vec!["boom".to_string()]),
        other => panic!("unexpected error {other:?}"),
    }
}

#[tokio::test]
async fn page_service_over_graphql_resolves_end_to_end() {
    let addr = spawn_birdhouse().await;
    let endpoint = Url::parse(&format!("http://{addr}/api/graphql")).unwrap();
    let service = StatusPageService::new(
        Arc::new(GraphqlSource::new(Client::new(), endpoint)),
        policy(),
    );

    let page = service.resolve("2").await.expect("found");
    assert_eq!(page.data.status.body, "inviting coworkers");
    assert_eq!(page.data.author_name, "jack");

    let missing = service.resolve("999").await;
    assert!(matches!(missing, Err(NotFound::Missing)));
}

#[tokio::test]
async fn page_service_over_rest_has_no_banners() {
    let addr = spawn_birdhouse().await;
    let service = StatusPageService::new(
        Arc::new(RestSource::new(
            Client::new(),
            Url::parse(&format!("http://{addr}")).unwrap(),
        )),
        policy(),
    );

    let page = service.resolve("1").await.expect("found");

    assert_eq!(page.data.author_name, "jack");
    assert!(page.data.banners.is_empty());
}
