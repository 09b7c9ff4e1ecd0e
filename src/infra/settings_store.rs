//! Widget settings persisted in a TOML file, one table per instance:
//!
//! ```toml
//! [widgets.sidebar]
//! title = "On this day"
//! max = 5
//! post_types = ["post"]
//! ```

use std::{
    collections::BTreeMap,
    fs, io,
    path::PathBuf,
    sync::Mutex,
};

use serde::{Deserialize, Serialize};

use crate::application::repos::{RepoError, WidgetSettingsRepo};
use crate::domain::settings::WidgetSettings;
use crate::util::lock::mutex_lock;

use super::atomic::write_atomic;

const SOURCE: &str = "on_this_day::settings_store";

#[derive(Debug, Default, Serialize, Deserialize)]
struct SettingsDocument {
    #[serde(default)]
    widgets: BTreeMap<String, WidgetSettings>,
}

pub struct TomlSettingsStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl TomlSettingsStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    fn read_document(&self) -> Result<SettingsDocument, RepoError> {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                return Ok(SettingsDocument::default());
            }
            Err(err) => return Err(RepoError::from_persistence(err)),
        };
        toml::from_str(&text).map_err(|err| RepoError::InvalidInput {
            message: format!("{}: {err}", self.path.display()),
        })
    }
}

impl WidgetSettingsRepo for TomlSettingsStore {
    fn load(&self, instance: &str) -> Result<Option<WidgetSettings>, RepoError> {
        Ok(self.read_document()?.widgets.remove(instance))
    }

    fn save(&self, instance: &str, settings: &WidgetSettings) -> Result<(), RepoError> {
        let _guard = mutex_lock(&self.write_lock, SOURCE, "save");

        let mut document = self.read_document()?;
        document
            .widgets
            .insert(instance.to_string(), settings.clone());
        let text = toml::to_string_pretty(&document).map_err(RepoError::from_persistence)?;
        write_atomic(&self.path, text.as_bytes()).map_err(RepoError::from_persistence)
    }
}
