use std::sync::Arc;

use tracing::info;

use crate::application::repos::{RepoError, WidgetSettingsRepo};
use crate::application::widget::{Widget, WidgetError};
use crate::domain::settings::{WidgetSettings, WidgetSettingsInput};

/// Loads and stores per-instance widget settings.
#[derive(Clone)]
pub struct WidgetSettingsService {
    repo: Arc<dyn WidgetSettingsRepo>,
}

impl WidgetSettingsService {
    pub fn new(repo: Arc<dyn WidgetSettingsRepo>) -> Self {
        Self { repo }
    }

    /// Stored settings, or the defaults for an unknown instance.
    pub fn load(&self, instance: &str) -> Result<WidgetSettings, RepoError> {
        Ok(self.repo.load(instance)?.unwrap_or_default())
    }

    /// Sanitize `input` through the widget and persist the result.
    pub fn update(
        &self,
        widget: &dyn Widget,
        instance: &str,
        input: WidgetSettingsInput,
    ) -> Result<WidgetSettings, WidgetError> {
        let settings = widget.update(input)?;
        self.repo.save(instance, &settings)?;
        info!(
            target = "on_this_day::settings",
            instance,
            max = settings.max,
            back = settings.back,
            post_types = ?settings.post_types,
            "Widget settings saved"
        );
        Ok(settings)
    }
}
