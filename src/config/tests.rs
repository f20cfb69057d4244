use std::io::Write as _;

use super::*;

#[test]
fn defaults_resolve_to_memory_backend_and_standard_directive() {
    let settings = Settings::from_raw(RawSettings::default()).expect("valid settings");

    assert_eq!(settings.server.addr.port(), DEFAULT_PORT);
    assert_eq!(settings.upstream.backend, UpstreamBackend::Memory);
    assert_eq!(
        settings.cache.header_value(),
        "public, s-maxage=600, stale-while-revalidate=2592000"
    );
    assert_eq!(settings.page.banner_group_id.as_str(), "1");
    assert_eq!(settings.page.author_fallback, "John Doe");
    assert!(!settings.page.surface_upstream_errors);
}

#[test]
fn cli_overrides_take_highest_precedence() {
    let mut raw = RawSettings::default();
    raw.server.port = Some(4000);
    raw.logging.level = Some("info".to_string());
    raw.cache.s_maxage = Some("5m".to_string());

    let overrides = ServeOverrides {
        server_port: Some(4321),
        log_level: Some("debug".to_string()),
        cache_s_maxage: Some("2h".to_string()),
        ..Default::default()
    };

    raw.apply_serve_overrides(&overrides);
    let settings = Settings::from_raw(raw).expect("valid settings");

    assert_eq!(settings.server.addr.port(), 4321);
    assert_eq!(settings.logging.level, LevelFilter::DEBUG);
    assert_eq!(settings.cache.s_maxage.as_secs(), 7200);
}

#[test]
fn cli_json_logging_enforces_format() {
    let mut raw = RawSettings::default();
    let overrides = ServeOverrides {
        log_json: Some(true),
        ..Default::default()
    };

    raw.apply_serve_overrides(&overrides);
    let settings = Settings::from_raw(raw).expect("valid settings");

    assert!(matches!(settings.logging.format, LogFormat::Json));
}

#[test]
fn zero_cache_window_is_rejected() {
    let mut raw = RawSettings::default();
    raw.cache.stale_while_revalidate = Some("0d".to_string());

    let err = Settings::from_raw(raw).expect_err("zero window");

    assert!(matches!(
        err,
        LoadError::Invalid {
            key: "cache.stale_while_revalidate",
            ..
        }
    ));
}

#[test]
fn malformed_cache_window_is_rejected() {
    let mut raw = RawSettings::default();
    raw.cache.s_maxage = Some("ten minutes".to_string());

    let err = Settings::from_raw(raw).expect_err("malformed window");

    assert!(matches!(
        err,
        LoadError::Invalid {
            key: "cache.s_maxage",
            ..
        }
    ));
}

#[test]
fn rest_backend_requires_base_url() {
    let mut raw = RawSettings::default();
    raw.upstream.backend = Some("rest".to_string());

    let err = Settings::from_raw(raw).expect_err("missing base url");
    assert!(matches!(
        err,
        LoadError::Invalid {
            key: "upstream.rest_base_url",
            ..
        }
    ));
}

#[test]
fn postgres_backend_requires_database_url() {
    let mut raw = RawSettings::default();
    raw.upstream.backend = Some("Postgres".to_string());

    let err = Settings::from_raw(raw).expect_err("missing database url");
    assert!(matches!(err, LoadError::Invalid { key: "database.url", .. }));
}

#[test]
fn graphql_endpoint_must_be_http() {
    let mut raw = RawSettings::default();
    raw.upstream.backend = Some("graphql".to_string());
    raw.upstream.graphql_endpoint = Some("ftp://example.test/graphql".to_string());

    assert!(Settings::from_raw(raw).is_err());
}

#[test]
fn unknown_backend_is_rejected() {
    let mut raw = RawSettings::default();
    raw.upstream.backend = Some("carrier-pigeon".to_string());

    assert!(Settings::from_raw(raw).is_err());
}

#[test]
fn blank_author_fallback_is_rejected() {
    let mut raw = RawSettings::default();
    raw.page.author_fallback = Some("   ".to_string());

    assert!(Settings::from_raw(raw).is_err());
}

#[test]
fn banner_group_must_be_a_valid_identifier() {
    let mut raw = RawSettings::default();
    raw.page.banner_group_id = Some("a/b".to_string());

    assert!(Settings::from_raw(raw).is_err());
}

#[test]
fn config_file_layer_is_read() {
    let mut file = temp_config_file("birdhouse-config-test.toml");
    writeln!(
        file.1,
        "[upstream]\nbackend = \"graphql\"\ngraphql_endpoint = \"http://127.0.0.1:9/api/graphql\"\n\n[page]\nauthor_fallback = \"Anonymous\""
    )
    .expect("write config");

    let args = CliArgs::parse_from([
        "birdhouse",
        "--config-file",
        file.0.to_str().expect("utf-8 path"),
        "serve",
        "--page-author-fallback",
        "Nobody",
    ]);
    let settings = load(&args).expect("valid settings");
    let _ = std::fs::remove_file(&file.0);

    assert_eq!(settings.upstream.backend, UpstreamBackend::Graphql);
    assert_eq!(
        settings.upstream.graphql_endpoint.as_ref().map(Url::as_str),
        Some("http://127.0.0.1:9/api/graphql")
    );
    assert_eq!(settings.page.author_fallback, "Nobody");
}

#[test]
fn default_to_serve_command() {
    let args = CliArgs::parse_from(["birdhouse"]);
    let command = args
        .command
        .unwrap_or(Command::Serve(Box::<ServeArgs>::default()));
    assert!(matches!(command, Command::Serve(_)));
}

#[test]
fn parse_serve_arguments() {
    let args = CliArgs::parse_from([
        "birdhouse",
        "serve",
        "--upstream-backend",
        "rest",
        "--upstream-rest-base-url",
        "http://127.0.0.1:3000",
        "--page-surface-upstream-errors",
        "yes",
    ]);

    match args.command.expect("serve command") {
        Command::Serve(serve) => {
            assert_eq!(serve.overrides.upstream_backend.as_deref(), Some("rest"));
            assert_eq!(
                serve.overrides.upstream_rest_base_url.as_deref(),
                Some("http://127.0.0.1:3000")
            );
            assert_eq!(serve.overrides.page_surface_upstream_errors, Some(true));
        }
        _ => panic!("wrong command parsed"),
    }
}

#[test]
fn parse_seed_arguments() {
    let args = CliArgs::parse_from([
        "birdhouse",
        "seed",
        "--database-url",
        "postgres://example",
    ]);

    match args.command.expect("seed command") {
        Command::Seed(seed) => {
            assert_eq!(
                seed.database.database_url.as_deref(),
                Some("postgres://example")
            );
        }
        _ => panic!("wrong command parsed"),
    }
}

fn temp_config_file(name: &str) -> (std::path::PathBuf, std::fs::File) {
    let path = std::env::temp_dir().join(format!("{}-{name}", std::process::id()));
    let file = std::fs::File::create(&path).expect("create temp config");
    (path, file)
}
