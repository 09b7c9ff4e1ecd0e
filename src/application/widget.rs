//! The "posts on this day" widget: settings update, rendering and form.

use std::sync::Arc;

use thiserror::Error;
use time::OffsetDateTime;
use tracing::{debug, warn};

use crate::application::hooks::Hooks;
use crate::application::lookup::LookupService;
use crate::application::repos::{ContentRepo, ContentTypesRepo, RepoError};
use crate::domain::settings::{WidgetSettings, WidgetSettingsInput};
use crate::presentation::views::{
    FormTemplate, HeadingLevel, TemplateRenderError, WidgetChrome, WidgetTemplate, YearSection,
    render_item, render_template,
};

const SOURCE: &str = "on_this_day::widget";

#[derive(Debug, Error)]
pub enum WidgetError {
    #[error(transparent)]
    Render(#[from] TemplateRenderError),
    #[error(transparent)]
    Repo(#[from] RepoError),
}

/// Capabilities a host expects from a widget.
pub trait Widget: Send + Sync {
    /// Sanitize submitted form values into storable settings.
    fn update(&self, input: WidgetSettingsInput) -> Result<WidgetSettings, WidgetError>;

    /// Render the widget for `now`; an empty string means "show nothing".
    fn render(&self, settings: &WidgetSettings, now: OffsetDateTime) -> Result<String, WidgetError>;

    /// Render the settings form for a widget instance.
    fn form(&self, instance: &str, settings: &WidgetSettings) -> Result<String, WidgetError>;
}

pub struct PostsOnThisDayWidget {
    lookup: LookupService,
    content: Arc<dyn ContentRepo>,
    types: Arc<dyn ContentTypesRepo>,
    chrome: WidgetChrome,
    hooks: Hooks,
}

impl PostsOnThisDayWidget {
    pub fn new(
        lookup: LookupService,
        content: Arc<dyn ContentRepo>,
        types: Arc<dyn ContentTypesRepo>,
    ) -> Self {
        Self {
            lookup,
            content,
            types,
            chrome: WidgetChrome::default(),
            hooks: Hooks::default(),
        }
    }

    pub fn with_chrome(mut self, chrome: WidgetChrome) -> Self {
        self.chrome = chrome;
        self
    }

    pub fn with_hooks(mut self, hooks: Hooks) -> Self {
        self.hooks = hooks;
        self
    }

    fn public_type_names(&self) -> Result<Vec<String>, RepoError> {
        Ok(self
            .types
            .public_content_types()?
            .into_iter()
            .map(|record| record.name)
            .collect())
    }
}

impl Widget for PostsOnThisDayWidget {
    fn update(&self, input: WidgetSettingsInput) -> Result<WidgetSettings, WidgetError> {
        let public = self.public_type_names()?;
        Ok(WidgetSettings::from_input(input, &public))
    }

    fn render(&self, settings: &WidgetSettings, now: OffsetDateTime) -> Result<String, WidgetError> {
        let config = settings.lookup_config();
        let results = self.lookup.get_posts(&config, now);
        if results.is_empty() {
            return Ok(String::new());
        }

        let mut sections = Vec::with_capacity(results.groups().len());
        for group in results.groups() {
            let mut articles = Vec::with_capacity(group.ids.len());
            for id in &group.ids {
                let item = match self.content.find_by_id(*id) {
                    Ok(Some(item)) => item,
                    Ok(None) => {
                        debug!(target = SOURCE, id, "Cached item no longer exists");
                        continue;
                    }
                    Err(err) => {
                        warn!(target = SOURCE, id, error = %err, "Cannot load cached item");
                        continue;
                    }
                };
                let markup = render_item(&item, &config)?;
                articles.push(self.hooks.apply_post_markup(markup, &item, &config));
            }
            if articles.is_empty() {
                continue;
            }
            sections.push(YearSection {
                year: config.group_by_year().then_some(group.year),
                articles,
            });
        }

        if sections.is_empty() {
            return Ok(String::new());
        }

        let title = self.hooks.apply_widget_title(settings.title.clone());
        let template = WidgetTemplate {
            chrome: self.chrome.clone(),
            title: (!title.is_empty()).then_some(title),
            heading: self.hooks.apply_year_heading(HeadingLevel::default()),
            sections,
        };
        Ok(render_template(template)?.trim_end().to_string())
    }

    fn form(&self, instance: &str, settings: &WidgetSettings) -> Result<String, WidgetError> {
        let types = self.types.public_content_types()?;
        Ok(render_template(FormTemplate::new(instance, settings, &types))?)
    }
}
