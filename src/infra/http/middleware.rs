use std::time::Instant;

use axum::{
    body::Body,
    http::{Request, header::CACHE_CONTROL},
    middleware::Next,
    response::Response,
};
use tracing::{debug, error, warn};
use uuid::Uuid;

use crate::application::error::ErrorReport;

#[derive(Clone)]
pub struct RequestContext {
    pub request_id: String,
}

/// How the resolution pipeline ended for a page response. Page handlers
/// attach it so the response log can say why a page was or was not cached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageOutcome {
    pub page: &'static str,
    pub outcome: &'static str,
    pub backend: &'static str,
}

impl PageOutcome {
    pub fn attach(self, response: &mut Response) {
        response.extensions_mut().insert(self);
    }
}

pub async fn set_request_context(mut request: Request<Body>, next: Next) -> Response {
    let ctx = RequestContext {
        request_id: Uuid::new_v4().to_string(),
    };
    request.extensions_mut().insert(ctx.clone());

    let mut response = next.run(request).await;
    response.extensions_mut().insert(ctx);
    response
}

/// Log page resolutions and every 4xx/5xx, the latter together with the
/// [`ErrorReport`] the handler attached.
pub async fn log_responses(request: Request<Body>, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let started = Instant::now();
    let request_id = request
        .extensions()
        .get::<RequestContext>()
        .map(|ctx| ctx.request_id.clone())
        .unwrap_or_default();

    let mut response = next.run(request).await;
    let status = response.status();
    let elapsed_ms = started.elapsed().as_millis();
    let cached = response.headers().contains_key(CACHE_CONTROL);
    let page = response.extensions().get::<PageOutcome>().copied();
    let (page_name, outcome, backend) =
        page.map_or(("", "", ""), |p| (p.page, p.outcome, p.backend));

    if !(status.is_client_error() || status.is_server_error()) {
        if page.is_some() {
            debug!(
                target: "birdhouse::http::response",
                status = status.as_u16(),
                %method,
                %path,
                elapsed_ms,
                page = page_name,
                outcome,
                backend,
                cached,
                request_id,
                "page served",
            );
        }
        return response;
    }

    let report = response.extensions_mut().remove::<ErrorReport>();
    let source = report.as_ref().map_or("unknown", |report| report.source);
    let chain = report.map(|report| report.messages).unwrap_or_default();
    let detail = chain
        .first()
        .map_or("no diagnostic available", String::as_str);

    if status.is_server_error() {
        error!(
            target: "birdhouse::http::response",
            status = status.as_u16(),
            %method,
            %path,
            elapsed_ms,
            page = page_name,
            outcome,
            backend,
            source,
            detail,
            chain = ?chain,
            request_id,
            "request failed",
        );
    } else {
        warn!(
            target: "birdhouse::http::response",
            status = status.as_u16(),
            %method,
            %path,
            elapsed_ms,
            page = page_name,
            outcome,
            backend,
            source,
            detail,
            chain = ?chain,
            request_id,
            "client request error",
        );
    }

    response
}
