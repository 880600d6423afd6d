// Bookmark Audit Settings Engine
// Manages auditor settings: loading, saving, updating individual values, and resetting to defaults.
// Each setting is stored as a JSON value under its own key in the key-value store.

use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::warn;

use crate::database::KeyValueStore;
use crate::types::errors::{SettingsError, StoreError};
use crate::types::settings::{
    AuditSettings, Language, NormalizeMode, ThemeMode, MAX_SCAN_TIMEOUT_MS, MIN_SCAN_TIMEOUT_MS,
};

pub const KEY_SCAN_TIMEOUT_MS: &str = "scanTimeoutMs";
pub const KEY_THEME_MODE: &str = "themeMode";
pub const KEY_LANGUAGE: &str = "language";
pub const KEY_NORMALIZE_MODE: &str = "normalizeMode";

/// Every key the engine understands.
pub const SETTINGS_KEYS: [&str; 4] = [
    KEY_SCAN_TIMEOUT_MS,
    KEY_THEME_MODE,
    KEY_LANGUAGE,
    KEY_NORMALIZE_MODE,
];

/// Trait defining the settings engine interface.
pub trait SettingsEngineTrait {
    fn load(&mut self) -> Result<AuditSettings, SettingsError>;
    fn save(&self) -> Result<(), SettingsError>;
    fn get_settings(&self) -> &AuditSettings;
    fn get_value(&self, key: &str) -> Result<Value, SettingsError>;
    fn set_value(&mut self, key: &str, value: Value) -> Result<(), SettingsError>;
    fn reset(&mut self) -> Result<(), SettingsError>;
}

/// Settings engine persisting through a [`KeyValueStore`].
pub struct SettingsEngine<S: KeyValueStore> {
    store: S,
    settings: AuditSettings,
    defaults: AuditSettings,
}

impl<S: KeyValueStore> SettingsEngine<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            settings: AuditSettings::default(),
            defaults: AuditSettings::default(),
        }
    }

    /// Derives the default language from a UI locale tag such as `zh-CN`.
    pub fn with_ui_language(mut self, tag: &str) -> Self {
        self.defaults.language = Language::from_ui_language(tag);
        self.settings.language = self.defaults.language;
        self
    }

    fn read_key<T: DeserializeOwned>(&self, key: &str, fallback: T) -> Result<T, SettingsError> {
        match self.store.get_json::<T>(key) {
            Ok(Some(value)) => Ok(value),
            Ok(None) => Ok(fallback),
            Err(StoreError::SerializationError(msg)) => {
                warn!(key, error = %msg, "ignoring unreadable setting");
                Ok(fallback)
            }
            Err(e) => Err(e.into()),
        }
    }
}

/// Checks a probe timeout against the allowed range.
pub fn validate_timeout(ms: u64) -> Result<u64, SettingsError> {
    if (MIN_SCAN_TIMEOUT_MS..=MAX_SCAN_TIMEOUT_MS).contains(&ms) {
        Ok(ms)
    } else {
        Err(SettingsError::InvalidValue(format!(
            "{} must be between {} and {} ms, got {}",
            KEY_SCAN_TIMEOUT_MS, MIN_SCAN_TIMEOUT_MS, MAX_SCAN_TIMEOUT_MS, ms
        )))
    }
}

fn parse_value<T: DeserializeOwned>(key: &str, value: Value) -> Result<T, SettingsError> {
    serde_json::from_value(value)
        .map_err(|e| SettingsError::InvalidValue(format!("Invalid value for key '{}': {}", key, e)))
}

impl<S: KeyValueStore> SettingsEngineTrait for SettingsEngine<S> {
    /// Loads settings from the store.
    ///
    /// Missing keys take their defaults. Unreadable values are logged and
    /// replaced by defaults; a stored timeout outside the range is clamped.
    fn load(&mut self) -> Result<AuditSettings, SettingsError> {
        let defaults = self.defaults.clone();
        let timeout: u64 = self.read_key(KEY_SCAN_TIMEOUT_MS, defaults.scan_timeout_ms)?;
        let clamped = timeout.clamp(MIN_SCAN_TIMEOUT_MS, MAX_SCAN_TIMEOUT_MS);
        if clamped != timeout {
            warn!(stored = timeout, used = clamped, "stored scan timeout out of range");
        }

        self.settings = AuditSettings {
            scan_timeout_ms: clamped,
            theme_mode: self.read_key::<ThemeMode>(KEY_THEME_MODE, defaults.theme_mode)?,
            language: self.read_key::<Language>(KEY_LANGUAGE, defaults.language)?,
            normalize_mode: self
                .read_key::<NormalizeMode>(KEY_NORMALIZE_MODE, defaults.normalize_mode)?,
        };
        Ok(self.settings.clone())
    }

    /// Writes every setting to the store.
    fn save(&self) -> Result<(), SettingsError> {
        self.store
            .set_json(KEY_SCAN_TIMEOUT_MS, &self.settings.scan_timeout_ms)?;
        self.store.set_json(KEY_THEME_MODE, &self.settings.theme_mode)?;
        self.store.set_json(KEY_LANGUAGE, &self.settings.language)?;
        self.store
            .set_json(KEY_NORMALIZE_MODE, &self.settings.normalize_mode)?;
        Ok(())
    }

    fn get_settings(&self) -> &AuditSettings {
        &self.settings
    }

    fn get_value(&self, key: &str) -> Result<Value, SettingsError> {
        let value = match key {
            KEY_SCAN_TIMEOUT_MS => serde_json::to_value(self.settings.scan_timeout_ms),
            KEY_THEME_MODE => serde_json::to_value(self.settings.theme_mode),
            KEY_LANGUAGE => serde_json::to_value(self.settings.language),
            KEY_NORMALIZE_MODE => serde_json::to_value(self.settings.normalize_mode),
            _ => return Err(SettingsError::InvalidKey(key.to_string())),
        };
        value.map_err(|e| SettingsError::SerializationError(e.to_string()))
    }

    /// Updates one setting by key, validates it and persists that key.
    ///
    /// # Examples
    /// - `"scanTimeoutMs"` with `30000`
    /// - `"normalizeMode"` with `"strict"`
    /// - `"language"` with `"zh_CN"`
    fn set_value(&mut self, key: &str, value: Value) -> Result<(), SettingsError> {
        if key.is_empty() {
            return Err(SettingsError::InvalidKey("Key cannot be empty".to_string()));
        }

        match key {
            KEY_SCAN_TIMEOUT_MS => {
                let ms = validate_timeout(parse_value(key, value)?)?;
                self.settings.scan_timeout_ms = ms;
                self.store.set_json(key, &ms)?;
            }
            KEY_THEME_MODE => {
                let theme: ThemeMode = parse_value(key, value)?;
                self.settings.theme_mode = theme;
                self.store.set_json(key, &theme)?;
            }
            KEY_LANGUAGE => {
                let language: Language = parse_value(key, value)?;
                self.settings.language = language;
                self.store.set_json(key, &language)?;
            }
            KEY_NORMALIZE_MODE => {
                let mode: NormalizeMode = parse_value(key, value)?;
                self.settings.normalize_mode = mode;
                self.store.set_json(key, &mode)?;
            }
            _ => return Err(SettingsError::InvalidKey(key.to_string())),
        }
        Ok(())
    }

    /// Resets all settings to defaults and removes the stored keys.
    fn reset(&mut self) -> Result<(), SettingsError> {
        for key in SETTINGS_KEYS {
            self.store.remove(key)?;
        }
        self.settings = self.defaults.clone();
        Ok(())
    }
}
