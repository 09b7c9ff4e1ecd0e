use std::{sync::Arc, time::Instant};

use chrono_tz::Tz;
use metrics::{counter, histogram};
use time::OffsetDateTime;
use tracing::{debug, warn};

use crate::application::hooks::Hooks;
use crate::application::repos::{ContentQuery, ContentQueryArgs};
use crate::cache::{ResultCache, cache_key, seconds_left_in_day};
use crate::domain::content::ResultSet;
use crate::domain::settings::LookupConfig;
use crate::domain::windows::{DateQuery, build_windows};
use crate::util::clock::Clock;
use crate::util::timezone::localized_date;

const SOURCE: &str = "on_this_day::lookup";

const METRIC_CACHE_HIT: &str = "on_this_day_lookup_cache_hit_total";
const METRIC_CACHE_MISS: &str = "on_this_day_lookup_cache_miss_total";
const METRIC_QUERY_FAILED: &str = "on_this_day_lookup_query_failed_total";
const METRIC_QUERY_MS: &str = "on_this_day_lookup_query_ms";

/// Finds content published around today's calendar day in earlier years.
///
/// Results are cached per query configuration until the next local midnight
/// of `clock`, the same clock the cache expires entries by. The cache key
/// carries no date, so lookups for any other local day bypass the cache.
/// Every failure degrades to an empty result set.
#[derive(Clone)]
pub struct LookupService {
    cache: Arc<dyn ResultCache>,
    query: Arc<dyn ContentQuery>,
    hooks: Hooks,
    timezone: Tz,
    clock: Arc<dyn Clock>,
}

impl LookupService {
    pub fn new(
        cache: Arc<dyn ResultCache>,
        query: Arc<dyn ContentQuery>,
        timezone: Tz,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            cache,
            query,
            hooks: Hooks::default(),
            timezone,
            clock,
        }
    }

    pub fn with_hooks(mut self, hooks: Hooks) -> Self {
        self.hooks = hooks;
        self
    }

    pub fn get_posts(&self, config: &LookupConfig, now: OffsetDateTime) -> ResultSet {
        let key = cache_key(config);
        let today = localized_date(now, self.timezone);
        let clock_now = self.clock.now();
        let cacheable = today == localized_date(clock_now, self.timezone);

        if cacheable {
            // An empty entry counts as a miss.
            if let Some(cached) = self.cache.get(&key)
                && !cached.is_empty()
            {
                counter!(METRIC_CACHE_HIT).increment(1);
                debug!(target = SOURCE, key = %key, items = cached.len(), "Lookup served from cache");
                return cached;
            }
            counter!(METRIC_CACHE_MISS).increment(1);
        } else {
            debug!(target = SOURCE, key = %key, %today, "Lookup is for another day; bypassing cache");
        }

        let windows = match build_windows(today, config.years_back(), config.exact_match()) {
            Ok(windows) => windows,
            Err(err) => {
                warn!(target = SOURCE, key = %key, %today, error = %err, "Cannot build date windows");
                return ResultSet::new();
            }
        };

        let args = self.hooks.apply_query_args(ContentQueryArgs {
            content_types: config.content_types().iter().cloned().collect(),
            limit: config.max_results(),
            date_query: DateQuery::any_of(windows),
        });

        let started_at = Instant::now();
        let items = match self.query.query(&args) {
            Ok(items) => items,
            Err(err) => {
                counter!(METRIC_QUERY_FAILED).increment(1);
                warn!(target = SOURCE, key = %key, error = %err, "Content query failed");
                return ResultSet::new();
            }
        };
        histogram!(METRIC_QUERY_MS).record(started_at.elapsed().as_secs_f64() * 1000.0);

        let limit = usize::from(args.limit);
        let result = ResultSet::from_items(items.iter().take(limit));
        if result.is_empty() {
            debug!(target = SOURCE, key = %key, "Lookup found nothing");
            return result;
        }
        if !cacheable {
            return result;
        }

        let ttl = self
            .hooks
            .apply_cache_duration(seconds_left_in_day(clock_now, self.timezone));
        if ttl.is_zero() {
            debug!(target = SOURCE, key = %key, "Cache duration is zero; not storing");
        } else {
            self.cache.set(&key, result.clone(), ttl);
            debug!(
                target = SOURCE,
                key = %key,
                items = result.len(),
                ttl_secs = ttl.as_secs(),
                "Lookup stored in cache"
            );
        }

        result
    }
}
