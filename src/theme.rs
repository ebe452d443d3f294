//! User-adjustable look of the app: six named style values saved under their
//! own key, independent of the book collection.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::db::{KeyValueStore, SETTINGS_KEY};
use crate::error::{StorageError, ValidationError};

/// Style names, in the order the settings dialog lists them.
pub const STYLE_NAMES: [&str; 6] = [
    "color-accent",
    "color-text",
    "color-bg",
    "color-dark",
    "color-light",
    "color-scheme",
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct ThemeSettings {
    /// Highlights, headings and the selected row.
    pub color_accent: String,
    pub color_text: String,
    pub color_bg: String,
    /// Borders and inactive chrome.
    pub color_dark: String,
    /// Secondary text such as hints.
    pub color_light: String,
    /// `dark` or `light`.
    pub color_scheme: String,
}

impl Default for ThemeSettings {
    fn default() -> Self {
        Self {
            color_accent: "#4fa3e0".to_string(),
            color_text: "#e8e6e3".to_string(),
            color_bg: "#1d2023".to_string(),
            color_dark: "#3a3f44".to_string(),
            color_light: "#8c939a".to_string(),
            color_scheme: "dark".to_string(),
        }
    }
}

impl ThemeSettings {
    /// Read saved settings; anything missing or unreadable yields defaults.
    pub fn load(backend: &dyn KeyValueStore) -> Self {
        match backend.get(SETTINGS_KEY) {
            Ok(Some(text)) => serde_json::from_str(&text).unwrap_or_else(|err| {
                warn!(error = %err, "theme settings are unreadable, using defaults");
                Self::default()
            }),
            Ok(None) => Self::default(),
            Err(err) => {
                warn!(error = %err, "could not read theme settings, using defaults");
                Self::default()
            }
        }
    }

    pub fn save(&self, backend: &dyn KeyValueStore) -> Result<(), StorageError> {
        let json = serde_json::to_string(self)?;
        backend.set(SETTINGS_KEY, &json)
    }

    /// Forget the saved settings.
    pub fn purge(backend: &dyn KeyValueStore) -> Result<(), StorageError> {
        backend.remove(SETTINGS_KEY)
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        let value = match name {
            "color-accent" => &self.color_accent,
            "color-text" => &self.color_text,
            "color-bg" => &self.color_bg,
            "color-dark" => &self.color_dark,
            "color-light" => &self.color_light,
            "color-scheme" => &self.color_scheme,
            _ => return None,
        };
        Some(value.as_str())
    }

    pub fn set(&mut self, name: &str, value: &str) -> Result<(), ValidationError> {
        let slot = match name {
            "color-accent" => &mut self.color_accent,
            "color-text" => &mut self.color_text,
            "color-bg" => &mut self.color_bg,
            "color-dark" => &mut self.color_dark,
            "color-light" => &mut self.color_light,
            "color-scheme" => &mut self.color_scheme,
            _ => return Err(ValidationError::UnknownStyle(name.to_string())),
        };
        *slot = value.trim().to_string();
        Ok(())
    }

    pub fn is_light(&self) -> bool {
        self.color_scheme.trim().eq_ignore_ascii_case("light")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryStore;

    #[test]
    fn load_without_saved_settings_gives_defaults() {
        let backend = MemoryStore::new();
        assert_eq!(ThemeSettings::load(&backend), ThemeSettings::default());
    }

    #[test]
    fn save_then_load_keeps_edits() {
        let backend = MemoryStore::new();
        let mut theme = ThemeSettings::default();
        theme.set("color-accent", " #ff8800 ").unwrap();
        theme.set("color-scheme", "light").unwrap();
        theme.save(&backend).unwrap();

        let loaded = ThemeSettings::load(&backend);
        assert_eq!(loaded.get("color-accent"), Some("#ff8800"));
        assert!(loaded.is_light());
    }

    #[test]
    fn saved_json_uses_style_names() {
        let backend = MemoryStore::new();
        ThemeSettings::default().save(&backend).unwrap();
        let raw = backend.get(SETTINGS_KEY).unwrap().unwrap();
        for name in STYLE_NAMES {
            assert!(raw.contains(name), "missing {name} in {raw}");
        }
    }

    #[test]
    fn partial_settings_fill_in_defaults() {
        let backend = MemoryStore::with_entry(SETTINGS_KEY, r##"{"color-bg": "#000000"}"##);
        let loaded = ThemeSettings::load(&backend);
        assert_eq!(loaded.color_bg, "#000000");
        assert_eq!(loaded.color_text, ThemeSettings::default().color_text);
    }

    #[test]
    fn unreadable_settings_fall_back() {
        let backend = MemoryStore::with_entry(SETTINGS_KEY, "[1, 2");
        assert_eq!(ThemeSettings::load(&backend), ThemeSettings::default());
    }

    #[test]
    fn unknown_style_is_rejected() {
        let mut theme = ThemeSettings::default();
        assert_eq!(
            theme.set("color-border", "red"),
            Err(ValidationError::UnknownStyle("color-border".to_string()))
        );
        assert_eq!(theme.get("color-border"), None);
    }

    #[test]
    fn purge_removes_saved_settings() {
        let backend = MemoryStore::new();
        ThemeSettings::default().save(&backend).unwrap();
        ThemeSettings::purge(&backend).unwrap();
        assert!(!backend.contains(SETTINGS_KEY).unwrap());
    }
}
