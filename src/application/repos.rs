//! Traits describing the host collaborators: content store, query engine,
//! content-type registry and settings persistence.

use serde::Serialize;
use thiserror::Error;

use crate::domain::content::{ContentId, ContentItem, ContentTypeRecord};
use crate::domain::settings::WidgetSettings;
use crate::domain::windows::DateQuery;

#[derive(Debug, Error)]
pub enum RepoError {
    #[error("persistence error: {0}")]
    Persistence(String),
    #[error("invalid input: {message}")]
    InvalidInput { message: String },
    #[error("query timed out")]
    Timeout,
}

impl RepoError {
    pub fn from_persistence(err: impl std::fmt::Display) -> Self {
        Self::Persistence(err.to_string())
    }
}

/// Arguments handed to the content query engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContentQueryArgs {
    pub content_types: Vec<String>,
    /// Maximum number of items to return.
    pub limit: u8,
    pub date_query: DateQuery,
}

pub trait ContentQuery: Send + Sync {
    /// Items matching `args`, in engine order, at most `args.limit` of them.
    fn query(&self, args: &ContentQueryArgs) -> Result<Vec<ContentItem>, RepoError>;
}

pub trait ContentRepo: Send + Sync {
    fn find_by_id(&self, id: ContentId) -> Result<Option<ContentItem>, RepoError>;
}

pub trait ContentTypesRepo: Send + Sync {
    fn public_content_types(&self) -> Result<Vec<ContentTypeRecord>, RepoError>;
}

pub trait WidgetSettingsRepo: Send + Sync {
    fn load(&self, instance: &str) -> Result<Option<WidgetSettings>, RepoError>;

    fn save(&self, instance: &str, settings: &WidgetSettings) -> Result<(), RepoError>;
}
