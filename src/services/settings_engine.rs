// ReviewBadge Settings Engine
// Manages the four persisted values: loading, saving, and the user-invoked set commands.
// Settings are stored as a JSON file at the platform-specific config path.

use std::fs;
use std::path::Path;

use crate::platform;
use crate::types::errors::SettingsError;
use crate::types::settings::{DisplayMode, ReviewBadgeSettings, Scope};

/// Trait defining the settings engine interface.
pub trait SettingsEngineTrait {
    fn load(&mut self) -> Result<ReviewBadgeSettings, SettingsError>;
    fn save(&self) -> Result<(), SettingsError>;
    fn get_settings(&self) -> &ReviewBadgeSettings;
    fn set_value(&mut self, key: &str, value: serde_json::Value) -> Result<(), SettingsError>;
    fn get_config_path(&self) -> &str;

    /// Stores a trimmed token. Blank input is ignored and returns `Ok(false)`.
    fn set_token(&mut self, token: &str) -> Result<bool, SettingsError>;
    /// Stores a trimmed, lowercased username. Blank input is ignored and returns `Ok(false)`.
    fn set_username(&mut self, username: &str) -> Result<bool, SettingsError>;
    fn set_display_mode(&mut self, mode: DisplayMode) -> Result<(), SettingsError>;
    fn set_scope(&mut self, scope: Scope) -> Result<(), SettingsError>;
}

/// Settings engine implementation that persists settings as JSON on disk.
pub struct SettingsEngine {
    config_path: String,
    settings: ReviewBadgeSettings,
}

impl SettingsEngine {
    /// Creates a new SettingsEngine.
    ///
    /// If `path_override` is `Some`, uses that path for the config file.
    /// Otherwise, uses the platform config directory with `settings.json`.
    pub fn new(path_override: Option<String>) -> Self {
        let config_path = match path_override {
            Some(p) => p,
            None => platform::get_config_dir()
                .join("settings.json")
                .to_string_lossy()
                .to_string(),
        };

        Self {
            config_path,
            settings: ReviewBadgeSettings::default(),
        }
    }

    /// Creates an engine and loads from disk in one step.
    pub fn open(path_override: Option<String>) -> Result<Self, SettingsError> {
        let mut engine = Self::new(path_override);
        engine.load()?;
        Ok(engine)
    }
}

impl SettingsEngineTrait for SettingsEngine {
    /// Loads settings from the JSON config file.
    ///
    /// If the file does not exist, returns default settings (first run).
    /// If the file exists but is malformed, returns a serialization error.
    fn load(&mut self) -> Result<ReviewBadgeSettings, SettingsError> {
        let path = Path::new(&self.config_path);

        if !path.exists() {
            log::debug!("no settings at {}, using defaults", self.config_path);
            self.settings = ReviewBadgeSettings::default();
            return Ok(self.settings.clone());
        }

        let content = fs::read_to_string(path)
            .map_err(|e| SettingsError::IoError(format!("Failed to read config file: {}", e)))?;

        let settings: ReviewBadgeSettings = serde_json::from_str(&content).map_err(|e| {
            SettingsError::SerializationError(format!("Failed to parse config file: {}", e))
        })?;

        self.settings = settings;
        Ok(self.settings.clone())
    }

    /// Saves the current settings, creating parent directories as needed.
    fn save(&self) -> Result<(), SettingsError> {
        let path = Path::new(&self.config_path);

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                SettingsError::IoError(format!("Failed to create config directory: {}", e))
            })?;
        }

        let json = serde_json::to_string_pretty(&self.settings).map_err(|e| {
            SettingsError::SerializationError(format!("Failed to serialize settings: {}", e))
        })?;

        fs::write(path, json)
            .map_err(|e| SettingsError::IoError(format!("Failed to write config file: {}", e)))?;

        log::debug!("settings saved to {}", self.config_path);
        Ok(())
    }

    fn get_settings(&self) -> &ReviewBadgeSettings {
        &self.settings
    }

    /// Updates one setting by key (`token`, `username`, `display_mode`, `scope`).
    ///
    /// The new value is validated by deserializing the whole settings object,
    /// so `"display_mode": "sparkles"` is rejected. Saves to disk on success.
    fn set_value(&mut self, key: &str, value: serde_json::Value) -> Result<(), SettingsError> {
        if key.is_empty() {
            return Err(SettingsError::InvalidKey("Key cannot be empty".to_string()));
        }

        let mut json_value = serde_json::to_value(&self.settings).map_err(|e| {
            SettingsError::SerializationError(format!("Failed to serialize settings: {}", e))
        })?;

        match json_value.as_object_mut() {
            Some(map) if map.contains_key(key) => {
                map.insert(key.to_string(), value);
            }
            _ => {
                return Err(SettingsError::InvalidKey(format!(
                    "Key '{}' not found in settings",
                    key
                )));
            }
        }

        let new_settings: ReviewBadgeSettings = serde_json::from_value(json_value).map_err(|e| {
            SettingsError::InvalidValue(format!("Invalid value for key '{}': {}", key, e))
        })?;

        self.settings = new_settings;
        self.save()
    }

    fn get_config_path(&self) -> &str {
        &self.config_path
    }

    fn set_token(&mut self, token: &str) -> Result<bool, SettingsError> {
        let token = token.trim();
        if token.is_empty() {
            return Ok(false);
        }
        self.set_value("token", serde_json::json!(token))?;
        Ok(true)
    }

    fn set_username(&mut self, username: &str) -> Result<bool, SettingsError> {
        let username = username.trim().to_lowercase();
        if username.is_empty() {
            return Ok(false);
        }
        self.set_value("username", serde_json::json!(username))?;
        Ok(true)
    }

    fn set_display_mode(&mut self, mode: DisplayMode) -> Result<(), SettingsError> {
        self.set_value("display_mode", serde_json::json!(mode))
    }

    fn set_scope(&mut self, scope: Scope) -> Result<(), SettingsError> {
        self.set_value("scope", serde_json::json!(scope))
    }
}
