//! Configuration layer: typed settings with layered precedence (file → env → CLI).

mod cli;

pub use cli::{CliArgs, Command, DatabaseOverride, SeedArgs, ServeArgs, ServeOverrides};

use std::{net::SocketAddr, num::NonZeroU32, str::FromStr};

use clap::Parser;
use config::{Config, Environment, File};
use serde::Deserialize;
use thiserror::Error;
use tracing::level_filters::LevelFilter;
use url::Url;

use crate::application::cache_control::{CacheDirective, CacheDuration};
use crate::application::page::DEFAULT_AUTHOR_FALLBACK;
use crate::domain::identifier::BannerGroupId;

const DEFAULT_CONFIG_BASENAME: &str = "config/default";
const LOCAL_CONFIG_BASENAME: &str = "birdhouse";
const ENV_PREFIX: &str = "BIRDHOUSE";
const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 3000;
const DEFAULT_DB_MAX_CONNECTIONS: u32 = 8;
const DEFAULT_S_MAXAGE: CacheDuration = CacheDuration::Minutes(10);
const DEFAULT_STALE_WHILE_REVALIDATE: CacheDuration = CacheDuration::Days(30);
const DEFAULT_BANNER_GROUP_ID: &str = "1";
const DEFAULT_SITE_TITLE: &str = "Birdhouse";

/// Fully-resolved deployment settings after precedence resolution and validation.
#[derive(Debug, Clone)]
pub struct Settings {
    pub server: ServerSettings,
    pub logging: LoggingSettings,
    pub database: DatabaseSettings,
    pub upstream: UpstreamSettings,
    pub cache: CacheDirective,
    pub page: PageSettings,
}

#[derive(Debug, Clone)]
pub struct ServerSettings {
    pub addr: SocketAddr,
}

#[derive(Debug, Clone)]
pub struct LoggingSettings {
    pub level: LevelFilter,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Copy)]
pub enum LogFormat {
    Json,
    Compact,
}

#[derive(Debug, Clone)]
pub struct DatabaseSettings {
    pub url: Option<String>,
    pub max_connections: NonZeroU32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpstreamBackend {
    Memory,
    Rest,
    Graphql,
    Postgres,
}

impl FromStr for UpstreamBackend {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "memory" => Ok(Self::Memory),
            "rest" => Ok(Self::Rest),
            "graphql" => Ok(Self::Graphql),
            "postgres" => Ok(Self::Postgres),
            other => Err(format!(
                "unknown backend `{other}` (expected memory, rest, graphql or postgres)"
            )),
        }
    }
}

#[derive(Debug, Clone)]
pub struct UpstreamSettings {
    pub backend: UpstreamBackend,
    pub rest_base_url: Option<Url>,
    pub graphql_endpoint: Option<Url>,
}

#[derive(Debug, Clone)]
pub struct PageSettings {
    pub banner_group_id: BannerGroupId,
    pub author_fallback: String,
    pub surface_upstream_errors: bool,
    pub site_title: String,
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to build configuration: {0}")]
    Build(#[from] config::ConfigError),
    #[error("invalid configuration for `{key}`: {reason}")]
    Invalid { key: &'static str, reason: String },
}

impl LoadError {
    fn invalid(key: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            key,
            reason: reason.into(),
        }
    }
}

/// Load settings using the configured precedence (file → environment → CLI).
pub fn load(cli: &CliArgs) -> Result<Settings, LoadError> {
    let mut builder = Config::builder()
        .add_source(File::with_name(DEFAULT_CONFIG_BASENAME).required(false))
        .add_source(File::with_name(LOCAL_CONFIG_BASENAME).required(false));

    if let Some(path) = cli.config_file.as_ref() {
        builder = builder.add_source(File::from(path.as_path()).required(true));
    }

    builder = builder.add_source(Environment::with_prefix(ENV_PREFIX).separator("__"));

    let mut raw: RawSettings = builder.build()?.try_deserialize()?;

    match cli.command.as_ref() {
        Some(Command::Serve(args)) => raw.apply_serve_overrides(&args.overrides),
        Some(Command::Seed(args)) => raw.apply_database_override(&args.database),
        None => raw.apply_serve_overrides(&ServeOverrides::default()),
    }

    Settings::from_raw(raw)
}

/// Resolve configuration using the supplied CLI arguments, returning both for downstream use.
pub fn load_with_cli() -> Result<(CliArgs, Settings), LoadError> {
    let args = CliArgs::parse();
    let settings = load(&args)?;
    Ok((args, settings))
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawSettings {
    server: RawServerSettings,
    logging: RawLoggingSettings,
    database: RawDatabaseSettings,
    upstream: RawUpstreamSettings,
    cache: RawCacheSettings,
    page: RawPageSettings,
}

impl RawSettings {
    fn apply_serve_overrides(&mut self, overrides: &ServeOverrides) {
        if let Some(host) = overrides.server_host.as_ref() {
            self.server.host = Some(host.clone());
        }
        if let Some(port) = overrides.server_port {
            self.server.port = Some(port);
        }
        if let Some(level) = overrides.log_level.as_ref() {
            self.logging.level = Some(level.clone());
        }
        if let Some(json) = overrides.log_json {
            self.logging.json = Some(json);
        }
        if let Some(url) = overrides.database_url.as_ref() {
            self.database.url = Some(url.clone());
        }
        if let Some(max) = overrides.database_max_connections {
            self.database.max_connections = Some(max);
        }
        if let Some(backend) = overrides.upstream_backend.as_ref() {
            self.upstream.backend = Some(backend.clone());
        }
        if let Some(url) = overrides.upstream_rest_base_url.as_ref() {
            self.upstream.rest_base_url = Some(url.clone());
        }
        if let Some(url) = overrides.upstream_graphql_endpoint.as_ref() {
            self.upstream.graphql_endpoint = Some(url.clone());
        }
        if let Some(value) = overrides.cache_s_maxage.as_ref() {
            self.cache.s_maxage = Some(value.clone());
        }
        if let Some(value) = overrides.cache_stale_while_revalidate.as_ref() {
            self.cache.stale_while_revalidate = Some(value.clone());
        }
        if let Some(id) = overrides.page_banner_group_id.as_ref() {
            self.page.banner_group_id = Some(id.clone());
        }
        if let Some(name) = overrides.page_author_fallback.as_ref() {
            self.page.author_fallback = Some(name.clone());
        }
        if let Some(surface) = overrides.page_surface_upstream_errors {
            self.page.surface_upstream_errors = Some(surface);
        }
    }

    fn apply_database_override(&mut self, overrides: &DatabaseOverride) {
        if let Some(url) = overrides.database_url.as_ref() {
            self.database.url = Some(url.clone());
        }
    }
}

impl Settings {
    fn from_raw(raw: RawSettings) -> Result<Self, LoadError> {
        let RawSettings {
            server,
            logging,
            database,
            upstream,
            cache,
            page,
        } = raw;

        let server = build_server_settings(server)?;
        let logging = build_logging_settings(logging)?;
        let database = build_database_settings(database)?;
        let upstream = build_upstream_settings(upstream, &database)?;
        let cache = build_cache_settings(cache)?;
        let page = build_page_settings(page)?;

        Ok(Self {
            server,
            logging,
            database,
            upstream,
            cache,
            page,
        })
    }
}

fn build_server_settings(server: RawServerSettings) -> Result<ServerSettings, LoadError> {
    let host = server.host.unwrap_or_else(|| DEFAULT_HOST.to_string());
    let port = server.port.unwrap_or(DEFAULT_PORT);
    if port == 0 {
        return Err(LoadError::invalid(
            "server.port",
            "port must be greater than zero",
        ));
    }
    let addr = parse_socket_addr(&host, port)
        .map_err(|reason| LoadError::invalid("server.addr", reason))?;

    Ok(ServerSettings { addr })
}

fn build_logging_settings(logging: RawLoggingSettings) -> Result<LoggingSettings, LoadError> {
    let level = match logging.level {
        Some(level) => LevelFilter::from_str(level.as_str()).map_err(|err| {
            LoadError::invalid("logging.level", format!("failed to parse: {err}"))
        })?,
        None => LevelFilter::INFO,
    };

    let format = if logging.json.unwrap_or(false) {
        LogFormat::Json
    } else {
        LogFormat::Compact
    };

    Ok(LoggingSettings { level, format })
}

fn build_database_settings(database: RawDatabaseSettings) -> Result<DatabaseSettings, LoadError> {
    let url = non_blank(database.url);
    let max_connections = database
        .max_connections
        .unwrap_or(DEFAULT_DB_MAX_CONNECTIONS);
    let max_connections = NonZeroU32::new(max_connections).ok_or_else(|| {
        LoadError::invalid("database.max_connections", "must be greater than zero")
    })?;

    Ok(DatabaseSettings {
        url,
        max_connections,
    })
}

fn build_upstream_settings(
    upstream: RawUpstreamSettings,
    database: &DatabaseSettings,
) -> Result<UpstreamSettings, LoadError> {
    let backend = match non_blank(upstream.backend) {
        Some(value) => UpstreamBackend::from_str(&value)
            .map_err(|reason| LoadError::invalid("upstream.backend", reason))?,
        None => UpstreamBackend::Memory,
    };
    let rest_base_url = parse_http_url(upstream.rest_base_url, "upstream.rest_base_url")?;
    let graphql_endpoint = parse_http_url(upstream.graphql_endpoint, "upstream.graphql_endpoint")?;

    match backend {
        UpstreamBackend::Rest if rest_base_url.is_none() => {
            return Err(LoadError::invalid(
                "upstream.rest_base_url",
                "required when upstream.backend is `rest`",
            ));
        }
        UpstreamBackend::Graphql if graphql_endpoint.is_none() => {
            return Err(LoadError::invalid(
                "upstream.graphql_endpoint",
                "required when upstream.backend is `graphql`",
            ));
        }
        UpstreamBackend::Postgres if database.url.is_none() => {
            return Err(LoadError::invalid(
                "database.url",
                "required when upstream.backend is `postgres`",
            ));
        }
        _ => {}
    }

    Ok(UpstreamSettings {
        backend,
        rest_base_url,
        graphql_endpoint,
    })
}

fn build_cache_settings(cache: RawCacheSettings) -> Result<CacheDirective, LoadError> {
    let s_maxage = parse_window(cache.s_maxage, "cache.s_maxage", DEFAULT_S_MAXAGE)?;
    let stale_while_revalidate = parse_window(
        cache.stale_while_revalidate,
        "cache.stale_while_revalidate",
        DEFAULT_STALE_WHILE_REVALIDATE,
    )?;
    Ok(CacheDirective::new(s_maxage, stale_while_revalidate))
}

fn build_page_settings(page: RawPageSettings) -> Result<PageSettings, LoadError> {
    let banner_group_id = page
        .banner_group_id
        .unwrap_or_else(|| DEFAULT_BANNER_GROUP_ID.to_string());
    let banner_group_id = BannerGroupId::parse(banner_group_id.trim())
        .map_err(|err| LoadError::invalid("page.banner_group_id", err.to_string()))?;

    let author_fallback = match page.author_fallback {
        Some(name) if name.trim().is_empty() => {
            return Err(LoadError::invalid(
                "page.author_fallback",
                "must not be blank",
            ));
        }
        Some(name) => name,
        None => DEFAULT_AUTHOR_FALLBACK.to_string(),
    };

    let site_title = non_blank(page.site_title).unwrap_or_else(|| DEFAULT_SITE_TITLE.to_string());

    Ok(PageSettings {
        banner_group_id,
        author_fallback,
        surface_upstream_errors: page.surface_upstream_errors.unwrap_or(false),
        site_title,
    })
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawServerSettings {
    host: Option<String>,
    port: Option<u16>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawLoggingSettings {
    level: Option<String>,
    json: Option<bool>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawDatabaseSettings {
    url: Option<String>,
    max_connections: Option<u32>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawUpstreamSettings {
    backend: Option<String>,
    rest_base_url: Option<String>,
    graphql_endpoint: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawCacheSettings {
    s_maxage: Option<String>,
    stale_while_revalidate: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawPageSettings {
    banner_group_id: Option<String>,
    author_fallback: Option<String>,
    surface_upstream_errors: Option<bool>,
    site_title: Option<String>,
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.and_then(|value| {
        let trimmed = value.trim();
        (!trimmed.is_empty()).then(|| trimmed.to_string())
    })
}

fn parse_socket_addr(host: &str, port: u16) -> Result<SocketAddr, String> {
    let candidate = format!("{host}:{port}");
    candidate
        .parse()
        .map_err(|err| format!("invalid address `{candidate}`: {err}"))
}

fn parse_http_url(value: Option<String>, key: &'static str) -> Result<Option<Url>, LoadError> {
    let Some(value) = non_blank(value) else {
        return Ok(None);
    };
    let url = Url::parse(&value)
        .map_err(|err| LoadError::invalid(key, format!("invalid URL `{value}`: {err}")))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(LoadError::invalid(key, "scheme must be http or https"));
    }
    Ok(Some(url))
}

fn parse_window(
    value: Option<String>,
    key: &'static str,
    default: CacheDuration,
) -> Result<CacheDuration, LoadError> {
    let duration = match non_blank(value) {
        Some(value) => value
            .parse::<CacheDuration>()
            .map_err(|err| LoadError::invalid(key, err.to_string()))?,
        None => default,
    };
    if duration.as_secs() == 0 {
        return Err(LoadError::invalid(key, "must be greater than zero"));
    }
    Ok(duration)
}

#[cfg(test)]
mod tests;
