use crate::application::{
    error::HttpError,
    page::{ResolvedListing, ResolvedPage},
};
use crate::domain::entities::{Banner, ResolvedStatus, Status};
use askama::{Error as AskamaError, Template};
use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use thiserror::Error;
use time::{UtcOffset, format_description::well_known::Rfc3339, macros::format_description};

#[derive(Debug, Error)]
#[error("{public_message}")]
pub struct TemplateRenderError {
    pub(crate) source: &'static str,
    pub(crate) public_message: &'static str,
    #[source]
    pub(crate) error: AskamaError,
}

impl TemplateRenderError {
    pub fn new(source: &'static str, public_message: &'static str, error: AskamaError) -> Self {
        Self {
            source,
            public_message,
            error,
        }
    }
}

impl From<TemplateRenderError> for HttpError {
    fn from(err: TemplateRenderError) -> Self {
        let TemplateRenderError {
            source,
            public_message,
            error,
        } = err;

        HttpError::from_error(
            source,
            StatusCode::INTERNAL_SERVER_ERROR,
            public_message,
            &error,
        )
    }
}

pub fn render_template<T: Template>(template: T) -> Result<Html<String>, HttpError> {
    template.render().map(Html).map_err(|err| {
        TemplateRenderError::new(
            "presentation::views::render_template",
            "Template rendering failed",
            err,
        )
        .into()
    })
}

pub fn render_template_response<T: Template>(template: T, status: StatusCode) -> Response {
    match render_template(template) {
        Ok(html) => (status, html).into_response(),
        Err(err) => err.into_response(),
    }
}

/// Render the error page for `error`, keeping its status and diagnostic report.
pub fn render_error_response(chrome: LayoutChrome, error: HttpError) -> Response {
    let status = error.status();
    let content = ErrorPageView::for_status(status, error.public_message());
    let view = LayoutContext::new(chrome, content.title.clone(), content);
    let mut response = render_template_response(ErrorTemplate { view }, status);
    if response.status() == status {
        error.into_report().attach(&mut response);
    }
    response
}

pub fn render_not_found_response(chrome: LayoutChrome) -> Response {
    render_error_response(
        chrome,
        HttpError::new(
            "presentation::views::render_not_found_response",
            StatusCode::NOT_FOUND,
            "Not found",
            "Resource not found",
        ),
    )
}

/// Site-wide values every page shares.
#[derive(Debug, Clone)]
pub struct LayoutChrome {
    pub site_title: String,
}

impl LayoutChrome {
    pub fn new(site_title: impl Into<String>) -> Self {
        Self {
            site_title: site_title.into(),
        }
    }
}

pub struct LayoutContext<T> {
    pub site_title: String,
    pub page_title: String,
    pub content: T,
}

impl<T> LayoutContext<T> {
    pub fn new(chrome: LayoutChrome, page_title: String, content: T) -> Self {
        Self {
            site_title: chrome.site_title,
            page_title,
            content,
        }
    }
}

pub struct StatusView {
    pub id: String,
    pub href: String,
    pub body: String,
    pub author_name: String,
    pub created_at: String,
    pub created_at_display: String,
}

impl StatusView {
    fn new(status: &Status, author_name: &str) -> Self {
        Self {
            id: status.id.clone(),
            href: format!("/statuses/{}", encode_path_segment(&status.id)),
            body: status.body.clone(),
            author_name: author_name.to_string(),
            created_at: status.created_at.format(&Rfc3339).unwrap_or_default(),
            created_at_display: display_timestamp(status),
        }
    }
}

impl From<&ResolvedStatus> for StatusView {
    fn from(resolved: &ResolvedStatus) -> Self {
        Self::new(&resolved.status, &resolved.author_name)
    }
}

pub struct BannerView {
    pub id: String,
    /// Empty when the banner has no link target.
    pub href: String,
}

impl BannerView {
    pub fn has_link(&self) -> bool {
        !self.href.is_empty()
    }
}

impl From<&Banner> for BannerView {
    fn from(banner: &Banner) -> Self {
        Self {
            id: banner.id.clone(),
            href: banner.href.clone().unwrap_or_default(),
        }
    }
}

pub struct IndexView {
    pub statuses: Vec<StatusView>,
}

impl From<&ResolvedListing> for IndexView {
    fn from(listing: &ResolvedListing) -> Self {
        Self {
            statuses: listing.statuses.iter().map(StatusView::from).collect(),
        }
    }
}

pub struct StatusPageView {
    pub status: StatusView,
    pub banners: Vec<BannerView>,
}

impl From<&ResolvedPage> for StatusPageView {
    fn from(page: &ResolvedPage) -> Self {
        Self {
            status: StatusView::new(&page.data.status, &page.data.author_name),
            banners: page.data.banners.iter().map(BannerView::from).collect(),
        }
    }
}

#[derive(Template)]
#[template(path = "index.html")]
pub struct IndexTemplate {
    pub view: LayoutContext<IndexView>,
}

#[derive(Template)]
#[template(path = "status.html")]
pub struct StatusTemplate {
    pub view: LayoutContext<StatusPageView>,
}

pub struct ErrorPageView {
    pub title: String,
    pub message: String,
}

impl ErrorPageView {
    pub fn for_status(status: StatusCode, public_message: &str) -> Self {
        if status == StatusCode::NOT_FOUND {
            return Self {
                title: "Status Not Found".to_string(),
                message: "The status you asked for does not exist or could not be loaded."
                    .to_string(),
            };
        }
        Self {
            title: public_message.to_string(),
            message: format!("The request failed with status {}.", status.as_u16()),
        }
    }
}

#[derive(Template)]
#[template(path = "error.html")]
pub struct ErrorTemplate {
    pub view: LayoutContext<ErrorPageView>,
}

fn display_timestamp(status: &Status) -> String {
    status
        .created_at
        .to_offset(UtcOffset::UTC)
        .format(format_description!("[year]-[month]-[day] [hour]:[minute] UTC"))
        .unwrap_or_default()
}

fn encode_path_segment(raw: &str) -> String {
    url::form_urlencoded::byte_serialize(raw.as_bytes())
        .collect::<String>()
        .replace('+', "%20")
}
