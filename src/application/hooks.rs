//! Extension points applied around lookups and rendering.
//!
//! Each hook is an ordered chain of transforms; an empty chain passes values
//! through unchanged.

use std::{fmt, sync::Arc, time::Duration};

use crate::application::repos::ContentQueryArgs;
use crate::domain::content::ContentItem;
use crate::domain::settings::LookupConfig;
use crate::presentation::views::HeadingLevel;

type QueryArgsHook = Arc<dyn Fn(ContentQueryArgs) -> ContentQueryArgs + Send + Sync>;
type PostMarkupHook = Arc<dyn Fn(String, &ContentItem, &LookupConfig) -> String + Send + Sync>;
type WidgetTitleHook = Arc<dyn Fn(String) -> String + Send + Sync>;
type YearHeadingHook = Arc<dyn Fn(HeadingLevel) -> HeadingLevel + Send + Sync>;
type CacheDurationHook = Arc<dyn Fn(Duration) -> Duration + Send + Sync>;

#[derive(Clone, Default)]
pub struct Hooks {
    query_args: Vec<QueryArgsHook>,
    post_markup: Vec<PostMarkupHook>,
    widget_title: Vec<WidgetTitleHook>,
    year_heading: Vec<YearHeadingHook>,
    cache_duration: Vec<CacheDurationHook>,
}

impl fmt::Debug for Hooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Hooks")
            .field("query_args", &self.query_args.len())
            .field("post_markup", &self.post_markup.len())
            .field("widget_title", &self.widget_title.len())
            .field("year_heading", &self.year_heading.len())
            .field("cache_duration", &self.cache_duration.len())
            .finish()
    }
}

impl Hooks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adjust the arguments sent to the content query engine.
    pub fn on_query_args<F>(mut self, hook: F) -> Self
    where
        F: Fn(ContentQueryArgs) -> ContentQueryArgs + Send + Sync + 'static,
    {
        self.query_args.push(Arc::new(hook));
        self
    }

    /// Adjust the markup of a single rendered item.
    pub fn on_post_markup<F>(mut self, hook: F) -> Self
    where
        F: Fn(String, &ContentItem, &LookupConfig) -> String + Send + Sync + 'static,
    {
        self.post_markup.push(Arc::new(hook));
        self
    }

    pub fn on_widget_title<F>(mut self, hook: F) -> Self
    where
        F: Fn(String) -> String + Send + Sync + 'static,
    {
        self.widget_title.push(Arc::new(hook));
        self
    }

    pub fn on_year_heading<F>(mut self, hook: F) -> Self
    where
        F: Fn(HeadingLevel) -> HeadingLevel + Send + Sync + 'static,
    {
        self.year_heading.push(Arc::new(hook));
        self
    }

    /// Adjust how long a lookup stays cached. A zero duration skips caching.
    pub fn on_cache_duration<F>(mut self, hook: F) -> Self
    where
        F: Fn(Duration) -> Duration + Send + Sync + 'static,
    {
        self.cache_duration.push(Arc::new(hook));
        self
    }

    pub fn apply_query_args(&self, args: ContentQueryArgs) -> ContentQueryArgs {
        self.query_args.iter().fold(args, |args, hook| hook(args))
    }

    pub fn apply_post_markup(
        &self,
        markup: String,
        item: &ContentItem,
        config: &LookupConfig,
    ) -> String {
        self.post_markup
            .iter()
            .fold(markup, |markup, hook| hook(markup, item, config))
    }

    pub fn apply_widget_title(&self, title: String) -> String {
        self.widget_title.iter().fold(title, |title, hook| hook(title))
    }

    pub fn apply_year_heading(&self, level: HeadingLevel) -> HeadingLevel {
        self.year_heading.iter().fold(level, |level, hook| hook(level))
    }

    pub fn apply_cache_duration(&self, duration: Duration) -> Duration {
        self.cache_duration
            .iter()
            .fold(duration, |duration, hook| hook(duration))
    }
}
