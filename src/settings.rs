//! User settings persisted in a key/value store.
//!
//! Everything lives under a single `app_settings` JSON blob. Older installs
//! stored the API key, theme and dark-mode flag under their own keys; those
//! are folded into the blob the first time settings are loaded and then
//! removed.

use crate::constants::{DEFAULT_API_BASE_URL, DEFAULT_MODEL};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;

pub const APP_SETTINGS_KEY: &str = "app_settings";
pub const LEGACY_API_KEY: &str = "gemini_api_key";
pub const LEGACY_THEME_KEY: &str = "theme";
pub const LEGACY_DARK_MODE_KEY: &str = "dark_mode";

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid settings JSON: {0}")]
    Json(#[from] serde_json::Error),
}

pub type SettingsResult<T> = Result<T, SettingsError>;

/// String key/value persistence
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> SettingsResult<Option<String>>;
    fn set(&self, key: &str, value: &str) -> SettingsResult<()>;
    fn remove(&self, key: &str) -> SettingsResult<()>;
}

/// Volatile store, used in tests and when no config directory exists
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<BTreeMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> SettingsResult<Option<String>> {
        Ok(self.entries.read().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> SettingsResult<()> {
        self.entries.write().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> SettingsResult<()> {
        self.entries.write().remove(key);
        Ok(())
    }
}

/// `{config_dir}/datachat/settings.json`
pub fn default_settings_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("datachat").join("settings.json"))
}

/// A JSON object on disk, rewritten on every change
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    lock: RwLock<()>,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: RwLock::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> SettingsResult<BTreeMap<String, String>> {
        match std::fs::read_to_string(&self.path) {
            Ok(text) if text.trim().is_empty() => Ok(BTreeMap::new()),
            Ok(text) => Ok(serde_json::from_str(&text)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(e) => Err(e.into()),
        }
    }

    fn write_all(&self, entries: &BTreeMap<String, String>) -> SettingsResult<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, serde_json::to_string_pretty(entries)?)?;
        Ok(())
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> SettingsResult<Option<String>> {
        let _guard = self.lock.read();
        Ok(self.read_all()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> SettingsResult<()> {
        let _guard = self.lock.write();
        let mut entries = self.read_all()?;
        entries.insert(key.to_string(), value.to_string());
        self.write_all(&entries)
    }

    fn remove(&self, key: &str) -> SettingsResult<()> {
        let _guard = self.lock.write();
        let mut entries = self.read_all()?;
        if entries.remove(key).is_some() {
            self.write_all(&entries)?;
        }
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AppSettings {
    pub api_key: Option<String>,
    pub model: String,
    pub theme: String,
    pub dark_mode: bool,
    pub temperature: f32,
    pub max_output_tokens: u32,
    pub top_p: f32,
    pub top_k: u32,
    pub base_url: String,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            theme: "default".to_string(),
            dark_mode: false,
            temperature: 0.7,
            max_output_tokens: 2048,
            top_p: 0.95,
            top_k: 40,
            base_url: DEFAULT_API_BASE_URL.to_string(),
        }
    }
}

impl AppSettings {
    pub fn has_api_key(&self) -> bool {
        self.api_key.as_deref().is_some_and(|k| !k.trim().is_empty())
    }
}

/// Loads and saves [`AppSettings`] through an injected store.
#[derive(Clone)]
pub struct SettingsService {
    store: Arc<dyn KeyValueStore>,
}

impl SettingsService {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Service over the JSON file in the platform config directory, or an
    /// in-memory store when there is none.
    pub fn from_default_location() -> Self {
        match default_settings_path() {
            Some(path) => Self::new(Arc::new(FileStore::new(path))),
            None => {
                tracing::warn!("No config directory; settings will not persist");
                Self::new(Arc::new(MemoryStore::new()))
            }
        }
    }

    /// Current settings, migrating legacy keys first.
    ///
    /// A corrupt blob is logged and replaced by defaults.
    pub fn load(&self) -> SettingsResult<AppSettings> {
        let mut settings = match self.store.get(APP_SETTINGS_KEY)? {
            Some(json) => serde_json::from_str(&json).unwrap_or_else(|e| {
                tracing::warn!(error = %e, "Ignoring unreadable settings");
                AppSettings::default()
            }),
            None => AppSettings::default(),
        };

        if self.migrate_legacy(&mut settings)? {
            self.save(&settings)?;
            for key in [LEGACY_API_KEY, LEGACY_THEME_KEY, LEGACY_DARK_MODE_KEY] {
                self.store.remove(key)?;
            }
            tracing::info!("Migrated legacy settings keys");
        }
        Ok(settings)
    }

    /// Fold legacy keys into `settings`; the blob wins where both exist.
    fn migrate_legacy(&self, settings: &mut AppSettings) -> SettingsResult<bool> {
        let mut migrated = false;
        if let Some(key) = self.store.get(LEGACY_API_KEY)? {
            if !settings.has_api_key() && !key.trim().is_empty() {
                settings.api_key = Some(key);
            }
            migrated = true;
        }
        if let Some(theme) = self.store.get(LEGACY_THEME_KEY)? {
            if settings.theme == AppSettings::default().theme {
                settings.theme = theme;
            }
            migrated = true;
        }
        if let Some(flag) = self.store.get(LEGACY_DARK_MODE_KEY)? {
            settings.dark_mode = settings.dark_mode || flag.trim() == "true";
            migrated = true;
        }
        Ok(migrated)
    }

    pub fn save(&self, settings: &AppSettings) -> SettingsResult<()> {
        self.store
            .set(APP_SETTINGS_KEY, &serde_json::to_string(settings)?)
    }

    fn update(&self, change: impl FnOnce(&mut AppSettings)) -> SettingsResult<AppSettings> {
        let mut settings = self.load()?;
        change(&mut settings);
        self.save(&settings)?;
        Ok(settings)
    }

    pub fn api_key(&self) -> SettingsResult<Option<String>> {
        Ok(self.load()?.api_key.filter(|k| !k.trim().is_empty()))
    }

    pub fn set_api_key(&self, key: &str) -> SettingsResult<()> {
        let key = key.trim().to_string();
        self.update(|s| s.api_key = (!key.is_empty()).then_some(key))?;
        Ok(())
    }

    pub fn clear_api_key(&self) -> SettingsResult<()> {
        self.update(|s| s.api_key = None)?;
        Ok(())
    }

    pub fn set_theme(&self, theme: &str) -> SettingsResult<()> {
        self.update(|s| s.theme = theme.to_string())?;
        Ok(())
    }

    /// Flip dark mode, returning the new value.
    pub fn toggle_dark_mode(&self) -> SettingsResult<bool> {
        Ok(self.update(|s| s.dark_mode = !s.dark_mode)?.dark_mode)
    }
}
