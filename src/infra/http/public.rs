use std::sync::Arc;

use axum::{
    Router,
    extract::{Path, State, rejection::PathRejection},
    http::StatusCode,
    middleware,
    response::{IntoResponse, Response},
    routing::get,
};
use tracing::debug;

use crate::{
    application::{
        error::HttpError,
        page::{NotFound, StatusPageService},
        repos::StatusStore,
    },
    presentation::views::{
        IndexTemplate, IndexView, LayoutChrome, LayoutContext, StatusPageView, StatusTemplate,
        render_error_response, render_not_found_response, render_template_response,
    },
};

use super::{
    api,
    middleware::{PageOutcome, log_responses, set_request_context},
};

#[derive(Clone)]
pub struct HttpState {
    pub pages: Arc<StatusPageService>,
    /// Backs the sibling REST and typed-query endpoints.
    pub store: Arc<dyn StatusStore>,
    pub chrome: LayoutChrome,
    pub surface_upstream_errors: bool,
}

pub fn build_router(state: HttpState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/statuses/{id}", get(status_page))
        .route("/_health", get(health))
        .merge(api::build_api_router())
        .fallback(fallback)
        .with_state(state)
        .layer(middleware::from_fn(log_responses))
        .layer(middleware::from_fn(set_request_context))
}

async fn index(State(state): State<HttpState>) -> Response {
    let resolved = state.pages.resolve_listing().await;
    let outcome = outcome_label(resolved.as_ref().err());

    let mut response = match resolved {
        Ok(listing) => {
            let view = LayoutContext::new(
                state.chrome.clone(),
                "Statuses".to_string(),
                IndexView::from(&listing),
            );
            let mut response = render_template_response(IndexTemplate { view }, StatusCode::OK);
            if response.status() == StatusCode::OK {
                listing.cache_control.apply(response.headers_mut());
            }
            response
        }
        Err(err) => not_found_page(&state, &err),
    };
    page_outcome(&state, "listing", outcome).attach(&mut response);
    response
}

async fn status_page(
    State(state): State<HttpState>,
    id: Result<Path<String>, PathRejection>,
) -> Response {
    let resolved = match id {
        Ok(Path(id)) => state.pages.resolve(&id).await,
        Err(rejection) => {
            debug!(
                target: "birdhouse::http::public",
                rejection = %rejection.body_text(),
                "undecodable status id"
            );
            Err(state.pages.reject_undecodable())
        }
    };
    let outcome = outcome_label(resolved.as_ref().err());

    let mut response = match resolved {
        Ok(page) => {
            let content = StatusPageView::from(&page);
            let title = format!("{}: \"{}\"", content.status.author_name, content.status.body);
            let view = LayoutContext::new(state.chrome.clone(), title, content);
            let mut response = render_template_response(StatusTemplate { view }, StatusCode::OK);
            if response.status() == StatusCode::OK {
                page.cache_control.apply(response.headers_mut());
            }
            response
        }
        Err(err) => not_found_page(&state, &err),
    };
    page_outcome(&state, "status", outcome).attach(&mut response);
    response
}

fn outcome_label(failure: Option<&NotFound>) -> &'static str {
    failure.map_or("found", NotFound::outcome)
}

fn page_outcome(state: &HttpState, page: &'static str, outcome: &'static str) -> PageOutcome {
    PageOutcome {
        page,
        outcome,
        backend: state.pages.source_kind().as_str(),
    }
}

fn not_found_page(state: &HttpState, err: &NotFound) -> Response {
    render_error_response(
        state.chrome.clone(),
        HttpError::from_not_found(err, state.surface_upstream_errors),
    )
}

async fn health() -> Response {
    StatusCode::NO_CONTENT.into_response()
}

async fn fallback(State(state): State<HttpState>) -> Response {
    render_not_found_response(state.chrome.clone())
}
