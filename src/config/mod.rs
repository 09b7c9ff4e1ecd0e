//! Configuration layer: typed settings with layered precedence (file → env → CLI).

use std::{path::PathBuf, str::FromStr};

use chrono_tz::Tz;
use clap::{Args, Parser, Subcommand, builder::BoolishValueParser};
use config::{Config, Environment, File};
use serde::Deserialize;
use thiserror::Error;
use time::{OffsetDateTime, format_description::well_known::Rfc3339};
use tracing::level_filters::LevelFilter;

use crate::cache::CacheBackend;
use crate::presentation::views::WidgetChrome;

const DEFAULT_CONFIG_BASENAME: &str = "config/default";
const LOCAL_CONFIG_BASENAME: &str = "on-this-day";
const DEFAULT_TIMEZONE: Tz = Tz::UTC;
const DEFAULT_CATALOG_PATH: &str = "content.toml";
const DEFAULT_WIDGETS_PATH: &str = "widgets.toml";
const DEFAULT_CACHE_CAPACITY: u64 = 256;
const DEFAULT_CACHE_DIRECTORY: &str = "cache";
pub const DEFAULT_WIDGET_INSTANCE: &str = "default";

/// Command-line arguments for the on-this-day binary.
#[derive(Debug, Parser)]
#[command(
    name = "on-this-day",
    version,
    about = "Show posts published on this day in earlier years"
)]
pub struct CliArgs {
    /// Optional path to a configuration file.
    #[arg(long = "config-file", env = "ON_THIS_DAY_CONFIG_FILE", value_name = "PATH")]
    pub config_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Render a widget instance as HTML.
    Render(RenderArgs),
    /// Print the year-grouped lookup result as JSON.
    Lookup(LookupArgs),
    /// Sanitize and store settings for a widget instance.
    Configure(Box<ConfigureArgs>),
    /// Render the settings form of a widget instance.
    Form(FormArgs),
}

#[derive(Debug, Args, Default, Clone)]
pub struct SiteOverrides {
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

    /// Override the site timezone (IANA name, e.g. Europe/Paris).
    #[arg(long = "timezone", value_name = "TZ")]
    pub timezone: Option<String>,

    /// Override the content catalog file.
    #[arg(long = "catalog", value_name = "PATH")]
    pub catalog: Option<PathBuf>,

    /// Override the widget settings file.
    #[arg(long = "widgets", value_name = "PATH")]
    pub widgets: Option<PathBuf>,

    /// Toggle result caching.
    #[arg(
        long = "cache-enabled",
        value_name = "BOOL",
        value_parser = BoolishValueParser::new()
    )]
    pub cache_enabled: Option<bool>,

    /// Override the cache backend (memory|file).
    #[arg(long = "cache-backend", value_name = "BACKEND")]
    pub cache_backend: Option<String>,

    /// Override the directory used by the file cache backend.
    #[arg(long = "cache-dir", value_name = "PATH")]
    pub cache_dir: Option<PathBuf>,
}

#[derive(Debug, Args, Clone)]
pub struct RenderArgs {
    #[command(flatten)]
    pub overrides: SiteOverrides,

    /// Widget instance to render.
    #[arg(long, default_value = DEFAULT_WIDGET_INSTANCE)]
    pub widget: String,

    /// Render as of this instant (RFC 3339) instead of now.
    #[arg(long, value_name = "RFC3339", value_parser = parse_instant)]
    pub at: Option<OffsetDateTime>,
}

impl Default for RenderArgs {
    fn default() -> Self {
        Self {
            overrides: SiteOverrides::default(),
            widget: DEFAULT_WIDGET_INSTANCE.to_string(),
            at: None,
        }
    }
}

#[derive(Debug, Args, Clone)]
pub struct LookupArgs {
    #[command(flatten)]
    pub overrides: SiteOverrides,

    /// Widget instance whose settings drive the lookup.
    #[arg(long, default_value = DEFAULT_WIDGET_INSTANCE)]
    pub widget: String,

    /// Look up as of this instant (RFC 3339) instead of now.
    #[arg(long, value_name = "RFC3339", value_parser = parse_instant)]
    pub at: Option<OffsetDateTime>,
}

#[derive(Debug, Args, Clone)]
pub struct ConfigureArgs {
    #[command(flatten)]
    pub overrides: SiteOverrides,

    /// Widget instance to configure.
    #[arg(long, default_value = DEFAULT_WIDGET_INSTANCE)]
    pub widget: String,

    /// Widget title; markup is stripped.
    #[arg(long)]
    pub title: Option<String>,

    /// Maximum number of posts to show (1-20).
    #[arg(long, value_name = "COUNT")]
    pub max: Option<String>,

    /// Number of years to look back (1-20).
    #[arg(long, value_name = "YEARS")]
    pub back: Option<String>,

    #[arg(long, action = clap::ArgAction::SetTrue)]
    pub show_thumbnails: bool,

    #[arg(long, action = clap::ArgAction::SetTrue)]
    pub group_by_year: bool,

    /// Content type to include; repeat for several.
    #[arg(long = "post-type", value_name = "TYPE")]
    pub post_types: Vec<String>,

    /// Only match the anniversary day instead of the week before it.
    #[arg(long, action = clap::ArgAction::SetTrue)]
    pub exact_match: bool,
}

#[derive(Debug, Args, Clone)]
pub struct FormArgs {
    #[command(flatten)]
    pub overrides: SiteOverrides,

    /// Widget instance whose form to render.
    #[arg(long, default_value = DEFAULT_WIDGET_INSTANCE)]
    pub widget: String,
}

impl Command {
    pub fn overrides(&self) -> &SiteOverrides {
        match self {
            Command::Render(args) => &args.overrides,
            Command::Lookup(args) => &args.overrides,
            Command::Configure(args) => &args.overrides,
            Command::Form(args) => &args.overrides,
        }
    }
}

fn parse_instant(raw: &str) -> Result<OffsetDateTime, String> {
    OffsetDateTime::parse(raw, &Rfc3339).map_err(|err| format!("invalid RFC 3339 instant: {err}"))
}

/// Fully-resolved settings after precedence resolution and validation.
#[derive(Debug, Clone)]
pub struct Settings {
    pub logging: LoggingSettings,
    pub site: SiteSettings,
    pub cache: CacheSettings,
    pub chrome: WidgetChrome,
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
pub struct SiteSettings {
    pub timezone: Tz,
    pub catalog_path: PathBuf,
    pub widgets_path: PathBuf,
}

#[derive(Debug, Clone)]
pub struct CacheSettings {
    pub enabled: bool,
    pub backend: CacheBackend,
    pub capacity: usize,
    pub directory: PathBuf,
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

    builder = builder.add_source(Environment::with_prefix("ON_THIS_DAY").separator("__"));

    let mut raw: RawSettings = builder.build()?.try_deserialize()?;

    if let Some(command) = cli.command.as_ref() {
        raw.apply_overrides(command.overrides());
    }

    Settings::from_raw(raw)
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawSettings {
    logging: RawLoggingSettings,
    site: RawSiteSettings,
    cache: RawCacheSettings,
    chrome: WidgetChrome,
}

impl RawSettings {
    fn apply_overrides(&mut self, overrides: &SiteOverrides) {
        if let Some(level) = overrides.log_level.as_ref() {
            self.logging.level = Some(level.clone());
        }
        if let Some(json) = overrides.log_json {
            self.logging.json = Some(json);
        }
        if let Some(timezone) = overrides.timezone.as_ref() {
            self.site.timezone = Some(timezone.clone());
        }
        if let Some(path) = overrides.catalog.as_ref() {
            self.site.catalog = Some(path.clone());
        }
        if let Some(path) = overrides.widgets.as_ref() {
            self.site.widgets = Some(path.clone());
        }
        if let Some(enabled) = overrides.cache_enabled {
            self.cache.enabled = Some(enabled);
        }
        if let Some(backend) = overrides.cache_backend.as_ref() {
            self.cache.backend = Some(backend.clone());
        }
        if let Some(directory) = overrides.cache_dir.as_ref() {
            self.cache.directory = Some(directory.clone());
        }
    }
}

impl Settings {
    fn from_raw(raw: RawSettings) -> Result<Self, LoadError> {
        let RawSettings {
            logging,
            site,
            cache,
            chrome,
        } = raw;

        Ok(Self {
            logging: build_logging_settings(logging)?,
            site: build_site_settings(site)?,
            cache: build_cache_settings(cache)?,
            chrome,
        })
    }
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

fn build_site_settings(site: RawSiteSettings) -> Result<SiteSettings, LoadError> {
    let timezone = match site.timezone.as_deref().map(str::trim) {
        Some(name) if !name.is_empty() => Tz::from_str(name).map_err(|err| {
            LoadError::invalid("site.timezone", format!("unknown timezone `{name}`: {err}"))
        })?,
        _ => DEFAULT_TIMEZONE,
    };

    Ok(SiteSettings {
        timezone,
        catalog_path: site
            .catalog
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CATALOG_PATH)),
        widgets_path: site
            .widgets
            .unwrap_or_else(|| PathBuf::from(DEFAULT_WIDGETS_PATH)),
    })
}

fn build_cache_settings(cache: RawCacheSettings) -> Result<CacheSettings, LoadError> {
    let backend = match cache.backend.as_deref().map(str::trim) {
        None | Some("") => CacheBackend::default(),
        Some(value) if value.eq_ignore_ascii_case("memory") => CacheBackend::Memory,
        Some(value) if value.eq_ignore_ascii_case("file") => CacheBackend::File,
        Some(other) => {
            return Err(LoadError::invalid(
                "cache.backend",
                format!("expected `memory` or `file`, got `{other}`"),
            ));
        }
    };

    let capacity = cache.capacity.unwrap_or(DEFAULT_CACHE_CAPACITY);
    if capacity == 0 {
        return Err(LoadError::invalid(
            "cache.capacity",
            "must be greater than zero",
        ));
    }
    let capacity: usize = capacity
        .try_into()
        .map_err(|_| LoadError::invalid("cache.capacity", "value exceeds supported range"))?;

    Ok(CacheSettings {
        enabled: cache.enabled.unwrap_or(true),
        backend,
        capacity,
        directory: cache
            .directory
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CACHE_DIRECTORY)),
    })
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawLoggingSettings {
    level: Option<String>,
    json: Option<bool>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawSiteSettings {
    timezone: Option<String>,
    catalog: Option<PathBuf>,
    widgets: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawCacheSettings {
    enabled: Option<bool>,
    backend: Option<String>,
    capacity: Option<u64>,
    directory: Option<PathBuf>,
}

/// Resolve configuration using the supplied CLI arguments, returning both for downstream use.
pub fn load_with_cli() -> Result<(CliArgs, Settings), LoadError> {
    let args = CliArgs::parse();
    let settings = load(&args)?;
    Ok((args, settings))
}

#[cfg(test)]
mod tests;
