use std::fmt;

use askama::{Error as AskamaError, Template};
use serde::Deserialize;
use thiserror::Error;

use crate::domain::content::{ContentItem, ContentTypeRecord};
use crate::domain::settings::{LookupConfig, MAX_LIMIT, WidgetSettings};

#[derive(Debug, Error)]
#[error("{public_message}")]
pub struct TemplateRenderError {
    pub(crate) public_message: &'static str,
    #[source]
    pub(crate) error: AskamaError,
}

impl TemplateRenderError {
    pub fn new(public_message: &'static str, error: AskamaError) -> Self {
        Self {
            public_message,
            error,
        }
    }
}

pub fn render_template<T: Template>(template: T) -> Result<String, TemplateRenderError> {
    template
        .render()
        .map_err(|err| TemplateRenderError::new("Template rendering failed", err))
}

/// Heading element used for per-year sections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HeadingLevel {
    H1,
    H2,
    H3,
    #[default]
    H4,
    H5,
    H6,
}

impl HeadingLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            HeadingLevel::H1 => "h1",
            HeadingLevel::H2 => "h2",
            HeadingLevel::H3 => "h3",
            HeadingLevel::H4 => "h4",
            HeadingLevel::H5 => "h5",
            HeadingLevel::H6 => "h6",
        }
    }
}

impl fmt::Display for HeadingLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Markup the host theme wraps around every widget.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct WidgetChrome {
    pub before_widget: String,
    pub after_widget: String,
    pub before_title: String,
    pub after_title: String,
}

impl Default for WidgetChrome {
    fn default() -> Self {
        Self {
            before_widget: r#"<section class="widget widget_posts_on_this_day">"#.to_string(),
            after_widget: "</section>".to_string(),
            before_title: r#"<h2 class="widget-title">"#.to_string(),
            after_title: "</h2>".to_string(),
        }
    }
}

impl WidgetChrome {
    /// No wrapping markup at all.
    pub fn bare() -> Self {
        Self {
            before_widget: String::new(),
            after_widget: String::new(),
            before_title: String::new(),
            after_title: String::new(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ThumbnailView {
    pub src: String,
    pub alt: String,
    pub width: Option<u32>,
    pub height: Option<u32>,
}

#[derive(Template)]
#[template(path = "widget/article.html")]
pub struct ArticleTemplate {
    pub permalink: String,
    pub title: String,
    pub thumbnail: Option<ThumbnailView>,
}

impl ArticleTemplate {
    pub fn from_item(item: &ContentItem, config: &LookupConfig) -> Self {
        let title = if config.group_by_year() {
            item.title.clone()
        } else {
            format!("{} ({})", item.title, item.publish_year)
        };

        let thumbnail = item
            .thumbnail
            .as_ref()
            .filter(|_| config.show_thumbnails())
            .map(|thumb| ThumbnailView {
                src: thumb.src.clone(),
                alt: thumb.alt.clone(),
                width: thumb.width,
                height: thumb.height,
            });

        Self {
            permalink: item.permalink.to_string(),
            title,
            thumbnail,
        }
    }
}

/// Markup for one result. The title gets a ` (YYYY)` suffix unless results
/// are grouped under year headings.
pub fn render_item(item: &ContentItem, config: &LookupConfig) -> Result<String, TemplateRenderError> {
    render_template(ArticleTemplate::from_item(item, config))
        .map(|markup| markup.trim_end().to_string())
}

pub struct YearSection {
    /// `None` when results are not grouped by year.
    pub year: Option<i32>,
    /// Pre-rendered article markup.
    pub articles: Vec<String>,
}

#[derive(Template)]
#[template(path = "widget/widget.html")]
pub struct WidgetTemplate {
    pub chrome: WidgetChrome,
    pub title: Option<String>,
    pub heading: HeadingLevel,
    pub sections: Vec<YearSection>,
}

pub struct FormField {
    pub id: String,
    pub name: String,
    pub value: String,
    pub checked: bool,
}

pub struct ContentTypeOption {
    pub id: String,
    pub name: String,
    pub label: String,
    pub checked: bool,
}

#[derive(Template)]
#[template(path = "widget/form.html")]
pub struct FormTemplate {
    pub limit: u8,
    pub title: FormField,
    pub max: FormField,
    pub back: FormField,
    pub show_thumbnails: FormField,
    pub group_by_year: FormField,
    pub exact_match: FormField,
    pub types_name: String,
    pub content_types: Vec<ContentTypeOption>,
}

impl FormTemplate {
    pub fn new(instance: &str, settings: &WidgetSettings, types: &[ContentTypeRecord]) -> Self {
        let prefix = format!("widget-posts_on_this_day-{instance}");
        let field = |key: &str, value: String, checked: bool| FormField {
            id: format!("{prefix}-{key}"),
            name: format!("widget-posts_on_this_day[{instance}][{key}]"),
            value,
            checked,
        };

        let content_types = types
            .iter()
            .map(|record| ContentTypeOption {
                id: format!("{prefix}-post_types-{}", record.name),
                name: record.name.clone(),
                label: record.label.clone(),
                checked: settings.post_types.iter().any(|kept| kept == &record.name),
            })
            .collect();

        Self {
            limit: MAX_LIMIT,
            title: field("title", settings.title.clone(), false),
            max: field("max", settings.max.to_string(), false),
            back: field("back", settings.back.to_string(), false),
            show_thumbnails: field("show_thumbnails", String::new(), settings.show_thumbnails),
            group_by_year: field("group_by_year", String::new(), settings.group_by_year),
            exact_match: field("exact_match", String::new(), settings.exact_match),
            types_name: format!("widget-posts_on_this_day[{instance}][post_types][]"),
            content_types,
        }
    }
}
