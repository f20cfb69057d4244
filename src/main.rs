use std::{process, sync::Arc};

use birdhouse::{
    application::{
        error::AppError,
        page::{PagePolicy, StatusPageService},
        repos::StatusStore,
    },
    config::{self, UpstreamBackend},
    infra::{
        db::{PostgresStore, seed_fixture},
        error::InfraError,
        http::{self, HttpState},
        memory::MemoryStore,
        telemetry, upstream,
    },
    presentation::views::LayoutChrome,
};
use tracing::{Dispatch, Level, dispatcher, error, info};
use tracing_subscriber::fmt as tracing_fmt;

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        report_application_error(&error);
        process::exit(1);
    }
}

fn report_application_error(error: &AppError) {
    if dispatcher::has_been_set() {
        error!(error = %error, "application error");
        return;
    }

    let subscriber = tracing_fmt().with_max_level(Level::ERROR).finish();
    let dispatch = Dispatch::new(subscriber);
    dispatcher::with_default(&dispatch, || {
        error!(error = %error, "application error");
    });
}

async fn run() -> Result<(), AppError> {
    let (cli_args, settings) = config::load_with_cli()
        .map_err(|err| AppError::unexpected(format!("failed to load configuration: {err}")))?;

    let command = cli_args
        .command
        .unwrap_or(config::Command::Serve(Box::<config::ServeArgs>::default()));

    telemetry::init(&settings.logging).map_err(AppError::from)?;

    match command {
        config::Command::Serve(_) => run_serve(settings).await,
        config::Command::Seed(_) => run_seed(settings).await,
    }
}

async fn run_serve(settings: config::Settings) -> Result<(), AppError> {
    let database = match settings.database.url.as_deref() {
        Some(url) => Some(init_database(url, &settings).await?),
        None => None,
    };

    let memory: Arc<dyn StatusStore> = Arc::new(MemoryStore::seeded());
    let sibling_store: Arc<dyn StatusStore> = match database {
        Some(db) => db as Arc<dyn StatusStore>,
        None => memory.clone(),
    };
    let source_store = match settings.upstream.backend {
        UpstreamBackend::Postgres => sibling_store.clone(),
        _ => memory,
    };

    let source = upstream::build_source(&settings.upstream, source_store)?;
    let policy = PagePolicy {
        banner_group_id: settings.page.banner_group_id.clone(),
        author_fallback: settings.page.author_fallback.clone(),
        cache: settings.cache,
    };
    let pages = Arc::new(StatusPageService::new(source, policy));

    let state = HttpState {
        pages,
        store: sibling_store,
        chrome: LayoutChrome::new(settings.page.site_title.clone()),
        surface_upstream_errors: settings.page.surface_upstream_errors,
    };

    serve_http(&settings, state).await
}

async fn run_seed(settings: config::Settings) -> Result<(), AppError> {
    let url = settings
        .database
        .url
        .as_deref()
        .ok_or_else(|| InfraError::configuration("database url is not configured"))?;
    let store = init_database(url, &settings).await?;

    seed_fixture(&store).await?;
    Ok(())
}

async fn init_database(
    url: &str,
    settings: &config::Settings,
) -> Result<Arc<PostgresStore>, AppError> {
    let pool = PostgresStore::connect(url, settings.database.max_connections.get())
        .await
        .map_err(|err| AppError::from(InfraError::database(err.to_string())))?;

    PostgresStore::run_migrations(&pool)
        .await
        .map_err(|err| AppError::from(InfraError::database(err.to_string())))?;

    Ok(Arc::new(PostgresStore::new(pool)))
}

async fn serve_http(settings: &config::Settings, state: HttpState) -> Result<(), AppError> {
    let backend = state.pages.source_kind().as_str();
    let router = http::build_router(state);

    let listener = tokio::net::TcpListener::bind(settings.server.addr)
        .await
        .map_err(|err| AppError::from(InfraError::from(err)))?;

    info!(
        target = "birdhouse::serve",
        addr = %settings.server.addr,
        backend,
        "Listening"
    );

    axum::serve(listener, router.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|err| AppError::unexpected(format!("server error: {err}")))
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        error!(error = %err, "failed to listen for shutdown signal");
        return;
    }
    info!(target = "birdhouse::serve", "Shutting down");
}
