use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
};

use chrono_tz::Tz;
use on_this_day::{
    application::{
        hooks::Hooks,
        lookup::LookupService,
        repos::{ContentQuery, ContentQueryArgs, ContentTypesRepo, RepoError},
    },
    cache::{CacheConfig, MemoryResultCache, ResultCache, cache_key},
    domain::{
        content::{ContentId, ContentItem, ResultSet},
        settings::{LookupConfig, WidgetSettings, WidgetSettingsInput},
    },
    infra::catalog::ContentCatalog,
    util::clock::ManualClock,
};
use time::{OffsetDateTime, macros::datetime};
use url::Url;

struct CountingEngine {
    items: Vec<ContentItem>,
    calls: AtomicUsize,
}

impl CountingEngine {
    fn new(items: Vec<ContentItem>) -> Self {
        Self {
            items,
            calls: AtomicUsize::new(0),
        }
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl ContentQuery for CountingEngine {
    fn query(&self, args: &ContentQueryArgs) -> Result<Vec<ContentItem>, RepoError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .items
            .iter()
            .filter(|item| args.content_types.contains(&item.content_type))
            .cloned()
            .collect())
    }
}

struct BrokenEngine;

impl ContentQuery for BrokenEngine {
    fn query(&self, _args: &ContentQueryArgs) -> Result<Vec<ContentItem>, RepoError> {
        Err(RepoError::Persistence("connection reset".to_string()))
    }
}

fn post(id: ContentId, published_at: OffsetDateTime) -> ContentItem {
    ContentItem {
        id,
        content_type: "post".to_string(),
        title: format!("Post {id}"),
        permalink: Url::parse(&format!("https://example.com/?p={id}")).expect("url"),
        published_at,
        publish_year: published_at.year(),
        thumbnail: None,
    }
}

fn cache_at(now: OffsetDateTime) -> (Arc<ManualClock>, Arc<MemoryResultCache>) {
    let clock = Arc::new(ManualClock::new(now));
    let cache = Arc::new(MemoryResultCache::new(&CacheConfig::default(), clock.clone()));
    (clock, cache)
}

#[test]
fn posts_from_two_years_are_grouped_and_cached() {
    let now = datetime!(2024-10-18 12:00 UTC);
    let engine = Arc::new(CountingEngine::new(vec![
        post(21, datetime!(2021-10-15 8:00 UTC)),
        post(19, datetime!(2019-10-14 8:00 UTC)),
        post(20, datetime!(2021-10-13 8:00 UTC)),
    ]));
    let (clock, cache) = cache_at(now);
    let service = LookupService::new(cache.clone(), engine.clone(), Tz::UTC, clock);
    let config = LookupConfig::default();

    let first = service.get_posts(&config, now);
    let years: Vec<i32> = first.groups().iter().map(|group| group.year).collect();
    assert_eq!(years, vec![2021, 2019]);
    assert_eq!(first.groups()[0].ids, vec![21, 20]);
    assert_eq!(first.groups()[1].ids, vec![19]);

    let second = service.get_posts(&config, now);
    assert_eq!(second, first);
    assert_eq!(engine.calls(), 1);
    assert_eq!(cache.get(&cache_key(&config)), Some(first));
}

#[test]
fn cached_results_expire_at_local_midnight() {
    let now = datetime!(2024-10-18 21:30 UTC);
    let engine = Arc::new(CountingEngine::new(vec![post(
        1,
        datetime!(2020-10-15 8:00 UTC),
    )]));
    let (clock, cache) = cache_at(now);
    let service =
        LookupService::new(cache, engine.clone(), Tz::Europe__Paris, clock.clone());
    let config = LookupConfig::default();

    service.get_posts(&config, now);
    clock.set(datetime!(2024-10-18 21:59 UTC));
    service.get_posts(&config, datetime!(2024-10-18 21:59 UTC));
    assert_eq!(engine.calls(), 1);

    // 22:00 UTC is midnight in Paris.
    clock.set(datetime!(2024-10-18 22:00 UTC));
    service.get_posts(&config, datetime!(2024-10-18 22:00 UTC));
    assert_eq!(engine.calls(), 2);
}

#[test]
fn display_flags_share_a_cache_entry() {
    let now = datetime!(2024-10-18 12:00 UTC);
    let engine = Arc::new(CountingEngine::new(vec![post(
        1,
        datetime!(2020-10-15 8:00 UTC),
    )]));
    let (clock, cache) = cache_at(now);
    let service = LookupService::new(cache, engine.clone(), Tz::UTC, clock);

    let grouped = LookupConfig::new(10, 10, ["post"], true, true, false);
    let flat = LookupConfig::new(10, 10, ["post"], false, false, false);
    service.get_posts(&grouped, now);
    service.get_posts(&flat, now);
    assert_eq!(engine.calls(), 1);

    let exact = LookupConfig::new(10, 10, ["post"], true, true, true);
    service.get_posts(&exact, now);
    assert_eq!(engine.calls(), 2);
}

#[test]
fn failing_engine_yields_an_empty_result() {
    let now = datetime!(2024-10-18 12:00 UTC);
    let (clock, cache) = cache_at(now);
    let service = LookupService::new(cache.clone(), Arc::new(BrokenEngine), Tz::UTC, clock);

    let result = service.get_posts(&LookupConfig::default(), now);
    assert_eq!(result, ResultSet::new());
    assert!(cache.is_empty());
}

#[test]
fn query_hooks_can_narrow_the_request() {
    let now = datetime!(2024-10-18 12:00 UTC);
    let engine = Arc::new(CountingEngine::new(vec![
        post(1, datetime!(2020-10-15 8:00 UTC)),
        post(2, datetime!(2019-10-15 8:00 UTC)),
    ]));
    let (clock, cache) = cache_at(now);
    let service = LookupService::new(cache, engine, Tz::UTC, clock).with_hooks(
        Hooks::new().on_query_args(|mut args| {
            args.limit = 1;
            args
        }),
    );

    let result = service.get_posts(&LookupConfig::default(), now);
    assert_eq!(result.ids().collect::<Vec<_>>(), vec![1]);
}

#[test]
fn exact_match_finds_posts_from_the_anniversary_itself() {
    let catalog = Arc::new(
        ContentCatalog::from_toml_str(
            r#"
base_url = "https://example.com/"

[[items]]
id = 1
title = "Same day, one year ago"
published_at = "2023-10-18T07:00:00Z"

[[items]]
id = 2
title = "Day before"
published_at = "2022-10-17T07:00:00Z"
"#,
            Tz::UTC,
        )
        .expect("catalog"),
    );
    let now = datetime!(2024-10-18 12:00 UTC);
    let (clock, cache) = cache_at(now);
    let service = LookupService::new(cache, catalog, Tz::UTC, clock);

    let exact = LookupConfig::new(10, 5, ["post"], true, true, true);
    assert_eq!(service.get_posts(&exact, now).ids().collect::<Vec<_>>(), vec![1]);

    let week = LookupConfig::new(10, 5, ["post"], true, true, false);
    assert_eq!(service.get_posts(&week, now).ids().collect::<Vec<_>>(), vec![2]);
}

#[test]
fn past_instant_lookups_do_not_leak_into_today() {
    let catalog = Arc::new(
        ContentCatalog::from_toml_str(
            r#"
base_url = "https://example.com/"

[[items]]
id = 1
title = "Early summer"
published_at = "2023-05-28T07:00:00Z"

[[items]]
id = 2
title = "Mid autumn"
published_at = "2023-10-15T07:00:00Z"
"#,
            Tz::UTC,
        )
        .expect("catalog"),
    );
    let now = datetime!(2024-10-18 12:00 UTC);
    let (clock, cache) = cache_at(now);
    let service = LookupService::new(cache, catalog, Tz::UTC, clock);
    let config = LookupConfig::default();

    let june = service.get_posts(&config, datetime!(2024-06-01 0:00:01 UTC));
    let today = service.get_posts(&config, now);
    assert_eq!(june.ids().collect::<Vec<_>>(), vec![1]);
    assert_eq!(today.ids().collect::<Vec<_>>(), vec![2]);
}

#[test]
fn mixed_case_content_types_still_match() {
    let catalog = Arc::new(
        ContentCatalog::from_toml_str(
            r#"
base_url = "https://example.com/"

[[content_types]]
name = "Recipe"
label = "Recipes"

[[items]]
id = 2
content_type = "Recipe"
title = "Soup"
published_at = "2023-10-15T07:00:00Z"
"#,
            Tz::UTC,
        )
        .expect("catalog"),
    );
    let public: Vec<String> = catalog
        .public_content_types()
        .expect("types")
        .into_iter()
        .map(|record| record.name)
        .collect();
    let settings = WidgetSettings::from_input(
        WidgetSettingsInput {
            post_types: vec!["Recipe".to_string()],
            ..Default::default()
        },
        &public,
    );
    assert_eq!(settings.post_types, vec!["recipe"]);

    let now = datetime!(2024-10-18 12:00 UTC);
    let (clock, cache) = cache_at(now);
    let service = LookupService::new(cache, catalog, Tz::UTC, clock);
    let result = service.get_posts(&settings.lookup_config(), now);
    assert_eq!(result.ids().collect::<Vec<_>>(), vec![2]);
}
