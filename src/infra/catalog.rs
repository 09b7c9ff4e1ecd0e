//! TOML-backed content store.
//!
//! ```toml
//! base_url = "https://example.com/"
//!
//! [[content_types]]
//! name = "post"
//! label = "Posts"
//!
//! [[items]]
//! id = 1
//! content_type = "post"
//! title = "Hello again"
//! slug = "hello-again"
//! published_at = "2019-10-18T09:00:00Z"
//! thumbnail = { src = "https://example.com/hello.jpg", alt = "Hello" }
//! ```

use std::{collections::HashSet, fs, path::Path};

use chrono_tz::Tz;
use serde::Deserialize;
use time::OffsetDateTime;
use url::Url;

use crate::application::repos::{
    ContentQuery, ContentQueryArgs, ContentRepo, ContentTypesRepo, RepoError,
};
use crate::domain::content::{ContentId, ContentItem, ContentTypeRecord, Thumbnail};
use crate::domain::settings::sanitize_key;
use crate::util::timezone::{localized_date, localized_datetime};

use super::error::InfraError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemStatus {
    #[default]
    Publish,
    Draft,
    Private,
    Trash,
}

#[derive(Debug, Deserialize)]
struct RawCatalog {
    base_url: Url,
    #[serde(default = "default_content_types")]
    content_types: Vec<RawContentType>,
    #[serde(default)]
    items: Vec<RawItem>,
}

#[derive(Debug, Deserialize)]
struct RawContentType {
    name: String,
    label: String,
    #[serde(default = "public_by_default")]
    public: bool,
}

#[derive(Debug, Deserialize)]
struct RawItem {
    id: ContentId,
    #[serde(default = "default_item_type")]
    content_type: String,
    title: String,
    slug: Option<String>,
    permalink: Option<Url>,
    #[serde(default)]
    status: ItemStatus,
    #[serde(with = "time::serde::rfc3339")]
    published_at: OffsetDateTime,
    thumbnail: Option<Thumbnail>,
}

fn default_content_types() -> Vec<RawContentType> {
    vec![
        RawContentType {
            name: "post".to_string(),
            label: "Posts".to_string(),
            public: true,
        },
        RawContentType {
            name: "page".to_string(),
            label: "Pages".to_string(),
            public: true,
        },
    ]
}

fn public_by_default() -> bool {
    true
}

fn default_item_type() -> String {
    "post".to_string()
}

struct CatalogEntry {
    item: ContentItem,
    status: ItemStatus,
}

/// In-memory content catalog loaded from a TOML document.
///
/// Publish dates are compared against date windows on the site-local
/// calendar day.
pub struct ContentCatalog {
    entries: Vec<CatalogEntry>,
    content_types: Vec<(ContentTypeRecord, bool)>,
    timezone: Tz,
}

impl ContentCatalog {
    pub fn load(path: &Path, timezone: Tz) -> Result<Self, InfraError> {
        let text = fs::read_to_string(path)?;
        Self::from_toml_str(&text, timezone)
    }

    pub fn from_toml_str(text: &str, timezone: Tz) -> Result<Self, InfraError> {
        let raw: RawCatalog = toml::from_str(text)
            .map_err(|err| InfraError::catalog(format!("failed to parse catalog: {err}")))?;

        let mut seen = HashSet::new();
        let mut entries = Vec::with_capacity(raw.items.len());
        for item in raw.items {
            if !seen.insert(item.id) {
                return Err(InfraError::catalog(format!("duplicate item id {}", item.id)));
            }
            let permalink = permalink_for(&raw.base_url, &item)?;
            let content_type = type_key(&item.content_type)?;
            entries.push(CatalogEntry {
                item: ContentItem {
                    id: item.id,
                    content_type,
                    title: item.title,
                    permalink,
                    publish_year: localized_date(item.published_at, timezone).year(),
                    published_at: item.published_at,
                    thumbnail: item.thumbnail,
                },
                status: item.status,
            });
        }

        let mut content_types: Vec<(ContentTypeRecord, bool)> =
            Vec::with_capacity(raw.content_types.len());
        for raw in raw.content_types {
            let name = type_key(&raw.name)?;
            if content_types.iter().any(|(record, _)| record.name == name) {
                return Err(InfraError::catalog(format!("duplicate content type `{name}`")));
            }
            content_types.push((
                ContentTypeRecord {
                    name,
                    label: raw.label,
                },
                raw.public,
            ));
        }

        Ok(Self {
            entries,
            content_types,
            timezone,
        })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Content type names are normalized to `[a-z0-9_-]` keys.
fn type_key(raw: &str) -> Result<String, InfraError> {
    let key = sanitize_key(raw);
    if key.is_empty() {
        return Err(InfraError::catalog(format!("invalid content type name `{raw}`")));
    }
    Ok(key)
}

fn permalink_for(base: &Url, item: &RawItem) -> Result<Url, InfraError> {
    if let Some(permalink) = item.permalink.as_ref() {
        return Ok(permalink.clone());
    }
    match item.slug.as_deref().map(str::trim) {
        Some(slug) if !slug.is_empty() => base.join(&format!("{slug}/")).map_err(|err| {
            InfraError::catalog(format!("invalid permalink for item {}: {err}", item.id))
        }),
        _ => {
            let mut url = base.clone();
            url.query_pairs_mut().append_pair("p", &item.id.to_string());
            Ok(url)
        }
    }
}

impl ContentQuery for ContentCatalog {
    fn query(&self, args: &ContentQueryArgs) -> Result<Vec<ContentItem>, RepoError> {
        let mut matches: Vec<&ContentItem> = self
            .entries
            .iter()
            .filter(|entry| entry.status == ItemStatus::Publish)
            .map(|entry| &entry.item)
            .filter(|item| args.content_types.contains(&item.content_type))
            .filter(|item| {
                let local = localized_datetime(item.published_at, self.timezone);
                args.date_query.matches(local.date())
            })
            .collect();

        matches.sort_by(|a, b| b.published_at.cmp(&a.published_at));
        Ok(matches
            .into_iter()
            .take(usize::from(args.limit))
            .cloned()
            .collect())
    }
}

impl ContentRepo for ContentCatalog {
    fn find_by_id(&self, id: ContentId) -> Result<Option<ContentItem>, RepoError> {
        Ok(self
            .entries
            .iter()
            .find(|entry| entry.item.id == id && entry.status == ItemStatus::Publish)
            .map(|entry| entry.item.clone()))
    }
}

impl ContentTypesRepo for ContentCatalog {
    fn public_content_types(&self) -> Result<Vec<ContentTypeRecord>, RepoError> {
        Ok(self
            .content_types
            .iter()
            .filter(|(_, public)| *public)
            .map(|(record, _)| record.clone())
            .collect())
    }
}
