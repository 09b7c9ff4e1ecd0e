use time::macros::datetime;

use super::*;

#[test]
fn defaults_are_usable() {
    let settings = Settings::from_raw(RawSettings::default()).expect("valid settings");
    assert_eq!(settings.site.timezone, Tz::UTC);
    assert_eq!(settings.site.catalog_path, PathBuf::from("content.toml"));
    assert!(settings.cache.enabled);
    assert_eq!(settings.cache.backend, CacheBackend::Memory);
    assert_eq!(settings.cache.capacity, 256);
    assert_eq!(settings.logging.level, LevelFilter::INFO);
    assert_eq!(settings.chrome, WidgetChrome::default());
}

#[test]
fn cli_overrides_take_highest_precedence() {
    let mut raw = RawSettings::default();
    raw.site.timezone = Some("UTC".to_string());
    raw.logging.level = Some("info".to_string());
    raw.cache.backend = Some("memory".to_string());

    let overrides = SiteOverrides {
        timezone: Some("Europe/Paris".to_string()),
        log_level: Some("debug".to_string()),
        cache_backend: Some("file".to_string()),
        cache_dir: Some(PathBuf::from("/tmp/otd")),
        ..Default::default()
    };

    raw.apply_overrides(&overrides);
    let settings = Settings::from_raw(raw).expect("valid settings");

    assert_eq!(settings.site.timezone, Tz::Europe__Paris);
    assert_eq!(settings.logging.level, LevelFilter::DEBUG);
    assert_eq!(settings.cache.backend, CacheBackend::File);
    assert_eq!(settings.cache.directory, PathBuf::from("/tmp/otd"));
}

#[test]
fn cli_json_logging_enforces_format() {
    let mut raw = RawSettings::default();
    raw.apply_overrides(&SiteOverrides {
        log_json: Some(true),
        ..Default::default()
    });
    let settings = Settings::from_raw(raw).expect("valid settings");

    assert!(matches!(settings.logging.format, LogFormat::Json));
}

#[test]
fn unknown_timezone_is_rejected() {
    let mut raw = RawSettings::default();
    raw.site.timezone = Some("Mars/Olympus_Mons".to_string());

    let err = Settings::from_raw(raw).expect_err("invalid timezone");
    assert!(matches!(
        err,
        LoadError::Invalid {
            key: "site.timezone",
            ..
        }
    ));
}

#[test]
fn unknown_cache_backend_is_rejected() {
    let mut raw = RawSettings::default();
    raw.cache.backend = Some("redis".to_string());

    let err = Settings::from_raw(raw).expect_err("invalid backend");
    assert!(matches!(
        err,
        LoadError::Invalid {
            key: "cache.backend",
            ..
        }
    ));
}

#[test]
fn zero_cache_capacity_is_rejected() {
    let mut raw = RawSettings::default();
    raw.cache.capacity = Some(0);
    assert!(Settings::from_raw(raw).is_err());
}

#[test]
fn no_subcommand_parses() {
    let args = CliArgs::parse_from(["on-this-day"]);
    assert!(args.command.is_none());
    assert_eq!(RenderArgs::default().widget, DEFAULT_WIDGET_INSTANCE);
}

#[test]
fn parse_render_arguments() {
    let args = CliArgs::parse_from([
        "on-this-day",
        "render",
        "--widget",
        "sidebar",
        "--at",
        "2024-10-18T12:00:00Z",
        "--timezone",
        "Asia/Tokyo",
    ]);

    match args.command.expect("render command") {
        Command::Render(render) => {
            assert_eq!(render.widget, "sidebar");
            assert_eq!(render.at, Some(datetime!(2024-10-18 12:00 UTC)));
            assert_eq!(render.overrides.timezone.as_deref(), Some("Asia/Tokyo"));
        }
        _ => panic!("wrong command parsed"),
    }
}

#[test]
fn parse_configure_arguments() {
    let args = CliArgs::parse_from([
        "on-this-day",
        "configure",
        "--title",
        "Memories",
        "--max",
        "5",
        "--post-type",
        "post",
        "--post-type",
        "page",
        "--exact-match",
    ]);

    match args.command.expect("configure command") {
        Command::Configure(configure) => {
            assert_eq!(configure.widget, DEFAULT_WIDGET_INSTANCE);
            assert_eq!(configure.title.as_deref(), Some("Memories"));
            assert_eq!(configure.max.as_deref(), Some("5"));
            assert_eq!(configure.post_types, vec!["post", "page"]);
            assert!(configure.exact_match);
            assert!(!configure.show_thumbnails);
        }
        _ => panic!("wrong command parsed"),
    }
}

#[test]
fn malformed_instant_is_a_parse_error() {
    let result = CliArgs::try_parse_from(["on-this-day", "lookup", "--at", "yesterday"]);
    assert!(result.is_err());
}
