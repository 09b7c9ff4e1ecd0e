//! Widget instance settings and the lookup configuration derived from them.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

pub const MAX_LIMIT: u8 = 20;
pub const DEFAULT_MAX_RESULTS: u8 = 10;
pub const DEFAULT_YEARS_BACK: u8 = 10;
pub const DEFAULT_CONTENT_TYPE: &str = "post";

/// Settings persisted for one widget instance.
///
/// Missing fields fall back to the defaults so partially written records
/// still load.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WidgetSettings {
    pub title: String,
    pub max: i64,
    pub back: i64,
    pub show_thumbnails: bool,
    pub group_by_year: bool,
    pub post_types: Vec<String>,
    pub exact_match: bool,
}

impl Default for WidgetSettings {
    fn default() -> Self {
        Self {
            title: String::new(),
            max: i64::from(DEFAULT_MAX_RESULTS),
            back: i64::from(DEFAULT_YEARS_BACK),
            show_thumbnails: true,
            group_by_year: true,
            post_types: vec![DEFAULT_CONTENT_TYPE.to_string()],
            exact_match: false,
        }
    }
}

/// Raw values submitted through the settings form.
///
/// Checkboxes follow form semantics: an absent value means unchecked.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct WidgetSettingsInput {
    pub title: Option<String>,
    pub max: Option<String>,
    pub back: Option<String>,
    pub show_thumbnails: Option<bool>,
    pub group_by_year: Option<bool>,
    pub post_types: Vec<String>,
    pub exact_match: Option<bool>,
}

impl WidgetSettings {
    /// Sanitize submitted form values into storable settings.
    ///
    /// Numbers are clamped into `1..=20` (zero or garbage means the default),
    /// the title loses all markup, and content types outside `public_types`
    /// are dropped. Content types are compared and stored as sanitized keys.
    pub fn from_input(input: WidgetSettingsInput, public_types: &[String]) -> Self {
        let mut post_types: Vec<String> = Vec::new();
        for candidate in input.post_types {
            let candidate = sanitize_key(&candidate);
            if public_types.iter().any(|allowed| sanitize_key(allowed) == candidate)
                && !post_types.contains(&candidate)
            {
                post_types.push(candidate);
            }
        }
        if post_types.is_empty() {
            post_types.push(DEFAULT_CONTENT_TYPE.to_string());
        }

        Self {
            title: sanitize_title(input.title.as_deref().unwrap_or_default()),
            max: i64::from(clamp_limit(
                parse_number(input.max.as_deref()),
                DEFAULT_MAX_RESULTS,
            )),
            back: i64::from(clamp_limit(
                parse_number(input.back.as_deref()),
                DEFAULT_YEARS_BACK,
            )),
            show_thumbnails: input.show_thumbnails.unwrap_or(false),
            group_by_year: input.group_by_year.unwrap_or(false),
            post_types,
            exact_match: input.exact_match.unwrap_or(false),
        }
    }

    pub fn lookup_config(&self) -> LookupConfig {
        LookupConfig::new(
            self.max,
            self.back,
            self.post_types.iter().map(String::as_str),
            self.show_thumbnails,
            self.group_by_year,
            self.exact_match,
        )
    }
}

/// Validated, clamped query and display options for one lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupConfig {
    max_results: u8,
    years_back: u8,
    content_types: BTreeSet<String>,
    show_thumbnails: bool,
    group_by_year: bool,
    exact_match: bool,
}

impl LookupConfig {
    pub fn new<'a, I>(
        max_results: i64,
        years_back: i64,
        content_types: I,
        show_thumbnails: bool,
        group_by_year: bool,
        exact_match: bool,
    ) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut types: BTreeSet<String> = content_types
            .into_iter()
            .map(sanitize_key)
            .filter(|key| !key.is_empty())
            .collect();
        if types.is_empty() {
            types.insert(DEFAULT_CONTENT_TYPE.to_string());
        }

        Self {
            max_results: clamp_limit(max_results, DEFAULT_MAX_RESULTS),
            years_back: clamp_limit(years_back, DEFAULT_YEARS_BACK),
            content_types: types,
            show_thumbnails,
            group_by_year,
            exact_match,
        }
    }

    pub fn max_results(&self) -> u8 {
        self.max_results
    }

    pub fn years_back(&self) -> u8 {
        self.years_back
    }

    /// Content types in sorted order.
    pub fn content_types(&self) -> &BTreeSet<String> {
        &self.content_types
    }

    pub fn show_thumbnails(&self) -> bool {
        self.show_thumbnails
    }

    pub fn group_by_year(&self) -> bool {
        self.group_by_year
    }

    pub fn exact_match(&self) -> bool {
        self.exact_match
    }
}

impl Default for LookupConfig {
    fn default() -> Self {
        WidgetSettings::default().lookup_config()
    }
}

/// Zero means "unset" and yields `default`; anything else lands in `1..=20`.
pub fn clamp_limit(value: i64, default: u8) -> u8 {
    if value == 0 {
        return default;
    }
    // Lossless: the clamp keeps the value inside u8 range.
    value.clamp(1, i64::from(MAX_LIMIT)) as u8
}

fn parse_number(raw: Option<&str>) -> i64 {
    raw.and_then(|value| value.trim().parse::<i64>().ok())
        .unwrap_or(0)
}

/// Lowercase and keep only `[a-z0-9_-]`.
pub fn sanitize_key(raw: &str) -> String {
    raw.chars()
        .map(|ch| ch.to_ascii_lowercase())
        .filter(|ch| ch.is_ascii_lowercase() || ch.is_ascii_digit() || matches!(*ch, '_' | '-'))
        .collect()
}

/// Strip every tag from a title, keeping its text content as plain text.
///
/// Escaping happens when the title is rendered.
pub fn sanitize_title(raw: &str) -> String {
    let cleaned = ammonia::Builder::empty().clean(raw).to_string();
    // Undo the text escaping of the serializer (`&` must come last).
    cleaned
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&nbsp;", "\u{a0}")
        .replace("&amp;", "&")
        .trim()
        .to_string()
}
