//! Sibling endpoints: the REST collaborator and the typed-query collaborator.
//! Both read from the configured store, never from the page source.

use axum::{
    Json, Router,
    extract::{
        Path, State,
        rejection::{JsonRejection, PathRejection},
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use birdhouse_api_types::{
    GraphqlRequest, GraphqlResponse, MessageBody, STATUS_PAGE_PROPS_DOCUMENT,
    STATUS_PAGE_PROPS_OPERATION, STATUSES_DOCUMENT, STATUSES_OPERATION, StatusPagePayload,
    StatusPageVariables, StatusesPayload,
};
use tracing::{debug, error};

use crate::{
    application::{
        error::ErrorReport,
        repos::RepoError,
        resolvers::{self, AuthorStyle},
    },
    domain::identifier::{BannerGroupId, StatusId},
};

use super::{HttpState, repo_error_to_http};

pub(super) fn build_api_router() -> Router<HttpState> {
    Router::new()
        .route("/api/statuses", get(list_statuses))
        .route("/api/statuses/{id}", get(get_status))
        .route("/api/graphql", post(graphql))
}

async fn list_statuses(State(state): State<HttpState>) -> Response {
    match resolvers::statuses(state.store.as_ref(), AuthorStyle::Name).await {
        Ok(statuses) => Json(statuses).into_response(),
        Err(err) => repo_error_to_http("infra::http::api::list_statuses", err).into_response(),
    }
}

async fn get_status(
    State(state): State<HttpState>,
    id: Result<Path<String>, PathRejection>,
) -> Response {
    let id = match id {
        Ok(Path(id)) => id,
        Err(rejection) => return not_found_json(rejection.body_text()),
    };
    let Ok(status_id) = StatusId::parse(&id) else {
        return not_found_json(format!("`{id}` is not a valid status id"));
    };

    match resolvers::status(state.store.as_ref(), &status_id, AuthorStyle::Name).await {
        Ok(Some(status)) => Json(status).into_response(),
        Ok(None) => not_found_json(format!("status `{status_id}` does not exist")),
        Err(err) => repo_error_to_http("infra::http::api::get_status", err).into_response(),
    }
}

fn not_found_json(detail: String) -> Response {
    let mut response = (
        StatusCode::NOT_FOUND,
        Json(MessageBody {
            message: "not found".to_string(),
        }),
    )
        .into_response();
    ErrorReport::from_message("infra::http::api::not_found", StatusCode::NOT_FOUND, detail)
        .attach(&mut response);
    response
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Operation {
    StatusPageProps,
    Statuses,
}

impl Operation {
    /// Match by operation name, or by the exact document when no name is sent.
    fn identify(request: &GraphqlRequest) -> Option<Self> {
        match request.operation_name.as_deref() {
            Some(STATUS_PAGE_PROPS_OPERATION) => Some(Self::StatusPageProps),
            Some(STATUSES_OPERATION) => Some(Self::Statuses),
            Some(_) => None,
            None => match request.query.trim() {
                query if query == STATUS_PAGE_PROPS_DOCUMENT.trim() => Some(Self::StatusPageProps),
                query if query == STATUSES_DOCUMENT.trim() => Some(Self::Statuses),
                _ => None,
            },
        }
    }
}

/// Answers the persisted operations only. Failures, an unreadable request
/// body included, follow the GraphQL convention of a 200 response carrying an
/// `errors` array.
async fn graphql(
    State(state): State<HttpState>,
    request: Result<Json<GraphqlRequest>, JsonRejection>,
) -> Response {
    let request = match request {
        Ok(Json(request)) => request,
        Err(rejection) => {
            debug!(
                target = "birdhouse::http::graphql",
                rejection = %rejection.body_text(),
                "unreadable request"
            );
            return Json(GraphqlResponse::<()>::error(format!(
                "invalid request: {}",
                rejection.body_text()
            )))
            .into_response();
        }
    };
    let Some(operation) = Operation::identify(&request) else {
        debug!(
            target = "birdhouse::http::graphql",
            operation = request.operation_name.as_deref().unwrap_or(""),
            "unknown operation"
        );
        return Json(GraphqlResponse::<()>::error("unknown operation")).into_response();
    };

    match operation {
        Operation::StatusPageProps => status_page_props(&state, request).await,
        Operation::Statuses => statuses(&state).await,
    }
}

async fn status_page_props(state: &HttpState, request: GraphqlRequest) -> Response {
    let variables: StatusPageVariables = match serde_json::from_value(request.variables) {
        Ok(variables) => variables,
        Err(err) => {
            return Json(GraphqlResponse::<()>::error(format!(
                "invalid variables: {err}"
            )))
            .into_response();
        }
    };
    let Ok(banner_group_id) = BannerGroupId::parse(&variables.banner_group_id) else {
        return Json(GraphqlResponse::<()>::error("invalid bannerGroupId")).into_response();
    };

    // An unusable id cannot name a stored status; answer like a miss.
    let result = match StatusId::parse(&variables.status_id) {
        Ok(status_id) => {
            resolvers::status_page(state.store.as_ref(), &status_id, &banner_group_id).await
        }
        Err(_) => resolvers::banners(state.store.as_ref(), &banner_group_id)
            .await
            .map(|banners| StatusPagePayload {
                status: None,
                banners,
            }),
    };

    match result {
        Ok(payload) => Json(GraphqlResponse::data(payload)).into_response(),
        Err(err) => internal_error(STATUS_PAGE_PROPS_OPERATION, &err),
    }
}

async fn statuses(state: &HttpState) -> Response {
    match resolvers::statuses(state.store.as_ref(), AuthorStyle::Entity).await {
        Ok(statuses) => Json(GraphqlResponse::data(StatusesPayload { statuses })).into_response(),
        Err(err) => internal_error(STATUSES_OPERATION, &err),
    }
}

fn internal_error(operation: &'static str, err: &RepoError) -> Response {
    error!(
        target = "birdhouse::http::graphql",
        operation,
        error = %err,
        "operation failed"
    );
    Json(GraphqlResponse::<()>::error("internal error")).into_response()
}
