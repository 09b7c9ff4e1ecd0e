use std::{io, sync::Once};

use metrics::{Unit, describe_counter, describe_histogram};
use tracing_error::ErrorLayer;
use tracing_subscriber::{
    EnvFilter, fmt,
    layer::{Layer, SubscriberExt},
    util::SubscriberInitExt,
};

use crate::config::{LogFormat, LoggingSettings};

use super::error::InfraError;

static METRIC_DESCRIPTIONS: Once = Once::new();

/// Install a global tracing subscriber using the provided logging settings.
///
/// Events go to stderr; stdout carries the rendered output.
pub fn init(logging: &LoggingSettings) -> Result<(), InfraError> {
    describe_metrics();

    let env_filter = EnvFilter::builder()
        .with_default_directive(logging.level.into())
        .from_env_lossy();

    let fmt_layer = match logging.format {
        LogFormat::Json => fmt::layer()
            .json()
            .with_current_span(true)
            .with_span_list(true)
            .with_target(true)
            .with_writer(io::stderr)
            .boxed(),
        LogFormat::Compact => fmt::layer()
            .compact()
            .with_target(true)
            .with_writer(io::stderr)
            .boxed(),
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(ErrorLayer::default())
        .with(fmt_layer)
        .try_init()
        .map_err(|err| {
            InfraError::telemetry(format!("failed to install tracing subscriber: {err}"))
        })
}

fn describe_metrics() {
    METRIC_DESCRIPTIONS.call_once(|| {
        describe_counter!(
            "on_this_day_lookup_cache_hit_total",
            Unit::Count,
            "Total number of lookups served from the result cache."
        );
        describe_counter!(
            "on_this_day_lookup_cache_miss_total",
            Unit::Count,
            "Total number of lookups that had to query the content store."
        );
        describe_counter!(
            "on_this_day_lookup_query_failed_total",
            Unit::Count,
            "Total number of content queries that failed."
        );
        describe_counter!(
            "on_this_day_cache_evict_total",
            Unit::Count,
            "Total number of result cache evictions due to capacity."
        );
        describe_histogram!(
            "on_this_day_lookup_query_ms",
            Unit::Milliseconds,
            "Content query latency in milliseconds."
        );
    });
}
