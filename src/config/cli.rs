use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, builder::BoolishValueParser};

/// Command-line arguments for the Birdhouse binary.
#[derive(Debug, Parser)]
#[command(name = "birdhouse", version, about = "Birdhouse status board")]
pub struct CliArgs {
    /// Optional path to a configuration file.
    #[arg(long = "config-file", env = "BIRDHOUSE_CONFIG_FILE", value_name = "PATH")]
    pub config_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Serve the status pages and the sibling REST and typed-query endpoints.
    Serve(Box<ServeArgs>),
    /// Apply migrations and insert the sample author, statuses and banners.
    Seed(SeedArgs),
}

#[derive(Debug, Args, Default, Clone)]
pub struct DatabaseOverride {
    /// Override the database connection URL.
    #[arg(long = "database-url", value_name = "URL")]
    pub database_url: Option<String>,
}

#[derive(Debug, Args, Default, Clone)]
pub struct SeedArgs {
    #[command(flatten)]
    pub database: DatabaseOverride,
}

#[derive(Debug, Args, Default, Clone)]
pub struct ServeArgs {
    #[command(flatten)]
    pub overrides: ServeOverrides,
}

#[derive(Debug, Args, Default, Clone)]
pub struct ServeOverrides {
    /// Override the listener host.
    #[arg(long = "server-host", value_name = "HOST")]
    pub server_host: Option<String>,

    /// Override the listener port.
    #[arg(long = "server-port", value_name = "PORT")]
    pub server_port: Option<u16>,

    /// Override the base log level (trace|debug|info|warn|error).
    #[arg(long = "log-level", value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// Toggle JSON logging.
    #[arg(
        long = "log-json",
        value_name = "BOOL",
        value_parser = BoolishValueParser::new()
    )]
    pub log_json: Option<bool>,

    /// Override the database connection URL.
    #[arg(long = "database-url", value_name = "URL")]
    pub database_url: Option<String>,

    /// Override the database pool size.
    #[arg(long = "database-max-connections", value_name = "COUNT")]
    pub database_max_connections: Option<u32>,

    /// Select the page backend (memory|rest|graphql|postgres).
    #[arg(long = "upstream-backend", value_name = "BACKEND")]
    pub upstream_backend: Option<String>,

    /// Base URL of the REST collaborator.
    #[arg(long = "upstream-rest-base-url", value_name = "URL")]
    pub upstream_rest_base_url: Option<String>,

    /// Endpoint of the typed-query collaborator.
    #[arg(long = "upstream-graphql-endpoint", value_name = "URL")]
    pub upstream_graphql_endpoint: Option<String>,

    /// Shared-cache freshness window, e.g. `10m`.
    #[arg(long = "cache-s-maxage", value_name = "DURATION")]
    pub cache_s_maxage: Option<String>,

    /// Stale-while-revalidate window, e.g. `30d`.
    #[arg(long = "cache-stale-while-revalidate", value_name = "DURATION")]
    pub cache_stale_while_revalidate: Option<String>,

    /// Banner group shown next to a status.
    #[arg(long = "page-banner-group-id", value_name = "ID")]
    pub page_banner_group_id: Option<String>,

    /// Display name used when a status has no resolvable author.
    #[arg(long = "page-author-fallback", value_name = "NAME")]
    pub page_author_fallback: Option<String>,

    /// Answer 502 instead of 404 when the upstream is broken.
    #[arg(
        long = "page-surface-upstream-errors",
        value_name = "BOOL",
        value_parser = BoolishValueParser::new()
    )]
    pub page_surface_upstream_errors: Option<bool>,
}
