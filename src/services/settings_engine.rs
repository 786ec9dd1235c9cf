// Session store settings engine.
// Keeps one SessionStoreSettings value in sync with a JSON file: load, persist,
// change a single top-level key, reset.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::services::privacy_filter::compile_header_pattern;
use crate::types::errors::SettingsError;
use crate::types::settings::SessionStoreSettings;

/// File name used when the caller passes a directory.
pub const SETTINGS_FILE_NAME: &str = "sessionstore.json";

pub trait SettingsEngineTrait {
    fn load(&mut self) -> Result<SessionStoreSettings, SettingsError>;
    fn save(&self) -> Result<(), SettingsError>;
    fn get_settings(&self) -> &SessionStoreSettings;
    /// Replaces one top-level setting and persists the result.
    fn set_value(&mut self, key: &str, value: serde_json::Value) -> Result<(), SettingsError>;
    fn reset(&mut self) -> Result<(), SettingsError>;
    fn get_config_path(&self) -> &Path;
}

/// Session store settings backed by a JSON file.
pub struct SettingsEngine {
    config_path: PathBuf,
    settings: SessionStoreSettings,
}

impl SettingsEngine {
    /// A path naming an existing directory gets [`SETTINGS_FILE_NAME`] appended.
    pub fn new(config_path: impl Into<PathBuf>) -> Self {
        let mut config_path = config_path.into();
        if config_path.is_dir() {
            config_path.push(SETTINGS_FILE_NAME);
        }
        Self {
            config_path,
            settings: SessionStoreSettings::default(),
        }
    }

    /// Rejects values the session store cannot run with.
    fn validate(settings: &SessionStoreSettings) -> Result<(), SettingsError> {
        if settings.postdata_limit < -1 {
            return Err(SettingsError::InvalidValue(format!(
                "postdata_limit must be -1 or greater, got {}",
                settings.postdata_limit
            )));
        }
        if settings.max_nesting_depth == 0 {
            return Err(SettingsError::InvalidValue(
                "max_nesting_depth must be at least 1".to_string(),
            ));
        }
        compile_header_pattern(&settings.postdata_header_pattern)
            .map(drop)
            .map_err(|e| SettingsError::InvalidValue(format!("postdata_header_pattern: {}", e)))
    }
}

impl SettingsEngineTrait for SettingsEngine {
    /// Reads the settings file. A missing file yields defaults; keys absent
    /// from the file take their default values.
    fn load(&mut self) -> Result<SessionStoreSettings, SettingsError> {
        self.settings = match fs::read_to_string(&self.config_path) {
            Ok(content) => serde_json::from_str(&content).map_err(|e| {
                SettingsError::SerializationError(format!(
                    "{} is not valid session store settings: {}",
                    self.config_path.display(),
                    e
                ))
            })?,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %self.config_path.display(), "no session store settings file, using defaults");
                SessionStoreSettings::default()
            }
            Err(e) => {
                return Err(SettingsError::IoError(format!(
                    "cannot read {}: {}",
                    self.config_path.display(),
                    e
                )))
            }
        };
        Ok(self.settings.clone())
    }

    fn save(&self) -> Result<(), SettingsError> {
        if let Some(dir) = self.config_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(dir)
                .map_err(|e| SettingsError::IoError(format!("cannot create {}: {}", dir.display(), e)))?;
        }
        let json = serde_json::to_string_pretty(&self.settings)
            .map_err(|e| SettingsError::SerializationError(e.to_string()))?;
        fs::write(&self.config_path, json).map_err(|e| {
            SettingsError::IoError(format!("cannot write {}: {}", self.config_path.display(), e))
        })
    }

    fn get_settings(&self) -> &SessionStoreSettings {
        &self.settings
    }

    fn set_value(&mut self, key: &str, value: serde_json::Value) -> Result<(), SettingsError> {
        if key.is_empty() {
            return Err(SettingsError::InvalidKey("empty key".to_string()));
        }

        let mut fields = match serde_json::to_value(&self.settings) {
            Ok(serde_json::Value::Object(fields)) => fields,
            Ok(_) => return Err(SettingsError::SerializationError("settings are not an object".to_string())),
            Err(e) => return Err(SettingsError::SerializationError(e.to_string())),
        };
        match fields.get_mut(key) {
            Some(slot) => *slot = value,
            None => return Err(SettingsError::InvalidKey(key.to_string())),
        }

        let updated: SessionStoreSettings = serde_json::from_value(serde_json::Value::Object(fields))
            .map_err(|e| SettingsError::InvalidValue(format!("{}: {}", key, e)))?;
        Self::validate(&updated)?;

        self.settings = updated;
        self.save()?;
        info!(key, "session store setting changed");
        Ok(())
    }

    fn reset(&mut self) -> Result<(), SettingsError> {
        self.settings = SessionStoreSettings::default();
        self.save()
    }

    fn get_config_path(&self) -> &Path {
        &self.config_path
    }
}
