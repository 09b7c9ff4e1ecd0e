use std::{io::Write, process, sync::Arc};

use on_this_day::{
    application::{
        error::AppError,
        lookup::LookupService,
        settings::WidgetSettingsService,
        widget::{PostsOnThisDayWidget, Widget},
    },
    cache::{CacheBackend, CacheConfig, DisabledResultCache, MemoryResultCache, ResultCache},
    config::{self, Command, RenderArgs},
    domain::settings::WidgetSettingsInput,
    infra::{
        catalog::ContentCatalog, error::InfraError, settings_store::TomlSettingsStore, telemetry,
        transients::FileResultCache,
    },
    util::clock::{Clock, SystemClock},
};
use serde::Serialize;
use tracing::{Dispatch, Level, dispatcher, error, info};
use tracing_subscriber::fmt as tracing_fmt;

fn main() {
    if let Err(error) = run() {
        report_application_error(&error);
        process::exit(1);
    }
}

fn report_application_error(error: &AppError) {
    let report = error.report();
    if dispatcher::has_been_set() {
        error!(error = %error, chain = %report.chain(), "application error");
        return;
    }

    let subscriber = tracing_fmt()
        .with_max_level(Level::ERROR)
        .with_writer(std::io::stderr)
        .finish();
    let dispatch = Dispatch::new(subscriber);
    dispatcher::with_default(&dispatch, || {
        error!(error = %error, chain = %report.chain(), "application error");
    });
}

struct Application {
    widget: PostsOnThisDayWidget,
    lookup: LookupService,
    settings: WidgetSettingsService,
    clock: Arc<dyn Clock>,
}

fn run() -> Result<(), AppError> {
    let (cli_args, settings) = config::load_with_cli()
        .map_err(|err| AppError::unexpected(format!("failed to load configuration: {err}")))?;

    let command = cli_args
        .command
        .unwrap_or_else(|| Command::Render(RenderArgs::default()));

    telemetry::init(&settings.logging).map_err(AppError::from)?;

    let app = build_application(&settings)?;

    match command {
        Command::Render(args) => {
            let widget_settings = app.settings.load(&args.widget)?;
            let now = args.at.unwrap_or_else(|| app.clock.now());
            let html = app.widget.render(&widget_settings, now)?;
            print_output(&html)
        }
        Command::Lookup(args) => {
            let widget_settings = app.settings.load(&args.widget)?;
            let now = args.at.unwrap_or_else(|| app.clock.now());
            let result = app.lookup.get_posts(&widget_settings.lookup_config(), now);
            print_json(&result)
        }
        Command::Configure(args) => {
            let input = WidgetSettingsInput {
                title: args.title,
                max: args.max,
                back: args.back,
                show_thumbnails: Some(args.show_thumbnails),
                group_by_year: Some(args.group_by_year),
                post_types: args.post_types,
                exact_match: Some(args.exact_match),
            };
            let saved = app.settings.update(&app.widget, &args.widget, input)?;
            print_json(&saved)
        }
        Command::Form(args) => {
            let widget_settings = app.settings.load(&args.widget)?;
            let html = app.widget.form(&args.widget, &widget_settings)?;
            print_output(&html)
        }
    }
}

fn build_application(settings: &config::Settings) -> Result<Application, AppError> {
    let timezone = settings.site.timezone;
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);

    let catalog = Arc::new(ContentCatalog::load(&settings.site.catalog_path, timezone).map_err(
        |err| match err {
            InfraError::Io(io) => InfraError::catalog(format!(
                "cannot read {}: {io}",
                settings.site.catalog_path.display()
            )),
            other => other,
        },
    )?);
    info!(
        target = "on_this_day::startup",
        items = catalog.len(),
        timezone = %timezone,
        "Content catalog loaded"
    );

    let cache_config = CacheConfig::from(&settings.cache);
    let cache: Arc<dyn ResultCache> = match (cache_config.enabled, cache_config.backend) {
        (false, _) => Arc::new(DisabledResultCache),
        (true, CacheBackend::Memory) => {
            Arc::new(MemoryResultCache::new(&cache_config, clock.clone()))
        }
        (true, CacheBackend::File) => Arc::new(FileResultCache::new(
            cache_config.directory.clone(),
            clock.clone(),
        )),
    };

    let lookup = LookupService::new(cache, catalog.clone(), timezone, clock.clone());
    let widget = PostsOnThisDayWidget::new(lookup.clone(), catalog.clone(), catalog)
        .with_chrome(settings.chrome.clone());
    let settings_service =
        WidgetSettingsService::new(Arc::new(TomlSettingsStore::new(&settings.site.widgets_path)));

    Ok(Application {
        widget,
        lookup,
        settings: settings_service,
        clock,
    })
}

fn print_output(text: &str) -> Result<(), AppError> {
    let mut stdout = std::io::stdout().lock();
    writeln!(stdout, "{text}").map_err(|err| AppError::from(InfraError::from(err)))
}

fn print_json<T: Serialize>(value: &T) -> Result<(), AppError> {
    let text = serde_json::to_string_pretty(value)
        .map_err(|err| AppError::unexpected(format!("failed to encode output: {err}")))?;
    print_output(&text)
}
