//! Content items and the year-grouped result sets built from them.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use url::Url;

pub type ContentId = u64;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Thumbnail {
    pub src: String,
    #[serde(default)]
    pub alt: String,
    #[serde(default)]
    pub width: Option<u32>,
    #[serde(default)]
    pub height: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentItem {
    pub id: ContentId,
    pub content_type: String,
    pub title: String,
    pub permalink: Url,
    pub published_at: OffsetDateTime,
    /// Calendar year of `published_at` in the site timezone.
    pub publish_year: i32,
    pub thumbnail: Option<Thumbnail>,
}

/// A kind of content the host publishes ("post", "page", ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentTypeRecord {
    pub name: String,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct YearGroup {
    pub year: i32,
    pub ids: Vec<ContentId>,
}

/// Ids grouped by publish year, in the order the query engine returned them.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResultSet {
    groups: Vec<YearGroup>,
}

impl ResultSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Group items by year; years appear in first-seen order.
    pub fn from_items<'a, I>(items: I) -> Self
    where
        I: IntoIterator<Item = &'a ContentItem>,
    {
        let mut set = Self::new();
        for item in items {
            set.push(item.publish_year, item.id);
        }
        set
    }

    pub fn push(&mut self, year: i32, id: ContentId) {
        match self.groups.iter_mut().find(|group| group.year == year) {
            Some(group) => group.ids.push(id),
            None => self.groups.push(YearGroup {
                year,
                ids: vec![id],
            }),
        }
    }

    pub fn groups(&self) -> &[YearGroup] {
        &self.groups
    }

    pub fn ids(&self) -> impl Iterator<Item = ContentId> + '_ {
        self.groups.iter().flat_map(|group| group.ids.iter().copied())
    }

    pub fn len(&self) -> usize {
        self.groups.iter().map(|group| group.ids.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.iter().all(|group| group.ids.is_empty())
    }
}
