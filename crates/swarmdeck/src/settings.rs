//! User preferences for tables and input.
//!
//! Settings are read from and written to TOML. Every field has a default, so
//! an empty or partial file is valid:
//!
//! ```toml
//! [input]
//! drag_threshold = 6.0
//!
//! [refresh]
//! interval_ms = 500
//!
//! [tables.downloads]
//! hidden_columns = ["host"]
//! sort_column = "progress"
//! descending = true
//! ```
//!
//! Window geometry is not part of the settings.

use std::collections::BTreeMap;
use std::io::Write;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use swarmdeck_core::logging::targets;

use crate::error::{Error, Result};
use crate::input::DEFAULT_DRAG_THRESHOLD;

/// `[input]`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InputSettings {
    /// Pointer travel in pixels before a press on the selection becomes a drag.
    pub drag_threshold: f32,
    /// Render a drag thumbnail when the platform supports it.
    pub drag_images: bool,
}

impl Default for InputSettings {
    fn default() -> Self {
        Self {
            drag_threshold: DEFAULT_DRAG_THRESHOLD,
            drag_images: true,
        }
    }
}

/// `[refresh]`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RefreshSettings {
    /// Time between refresh ticks.
    pub interval_ms: u64,
    /// Resort once per tick when a refresh changed the sort column.
    pub resort_on_tick: bool,
}

impl Default for RefreshSettings {
    fn default() -> Self {
        Self {
            interval_ms: 1000,
            resort_on_tick: true,
        }
    }
}

impl RefreshSettings {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms.max(1))
    }
}

/// `[tables.<name>]`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TableSettings {
    /// Ids of columns to hide.
    pub hidden_columns: Vec<String>,
    /// Id of the column to sort on.
    pub sort_column: Option<String>,
    pub descending: bool,
    /// Row height in pixels.
    pub row_height: Option<f32>,
}

/// All settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub input: InputSettings,
    pub refresh: RefreshSettings,
    pub tables: BTreeMap<String, TableSettings>,
}

impl Settings {
    /// Parses settings from TOML text.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Loads settings from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        let settings = Self::from_toml_str(&text)?;
        tracing::debug!(target: targets::SETTINGS, path = %path.display(), tables = settings.tables.len(), "settings loaded");
        Ok(settings)
    }

    /// Loads settings, falling back to defaults when the file is missing.
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self> {
        match Self::load(&path) {
            Err(Error::Io { source, .. }) if source.kind() == std::io::ErrorKind::NotFound => {
                Ok(Self::default())
            }
            other => other,
        }
    }

    /// Renders settings as TOML.
    pub fn to_toml_string(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Saves settings to a TOML file.
    ///
    /// Written to a sibling temporary file first, then renamed over `path`.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let text = self.to_toml_string()?;
        let tmp = path.with_extension("toml.tmp");
        let write = || -> std::io::Result<()> {
            let mut file = std::fs::File::create(&tmp)?;
            file.write_all(text.as_bytes())?;
            file.sync_all()?;
            std::fs::rename(&tmp, path)
        };
        write().map_err(|e| Error::io(path, e))?;
        tracing::debug!(target: targets::SETTINGS, path = %path.display(), "settings saved");
        Ok(())
    }

    /// Settings for the table named `name`, or defaults.
    pub fn table(&self, name: &str) -> TableSettings {
        self.tables.get(name).cloned().unwrap_or_default()
    }

    pub fn set_table(&mut self, name: impl Into<String>, table: TableSettings) {
        self.tables.insert(name.into(), table);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = Settings::from_toml_str("").expect("empty is valid");
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.input.drag_threshold, 4.0);
        assert!(settings.input.drag_images);
        assert_eq!(settings.refresh.interval(), Duration::from_secs(1));
        assert!(settings.refresh.resort_on_tick);
    }

    #[test]
    fn test_partial_sections() {
        let settings = Settings::from_toml_str(
            r#"
            [input]
            drag_threshold = 8.0

            [tables.downloads]
            hidden_columns = ["host", "speed"]
            sort_column = "progress"
            descending = true
            "#,
        )
        .expect("parses");
        assert_eq!(settings.input.drag_threshold, 8.0);
        assert!(settings.input.drag_images);
        let downloads = settings.table("downloads");
        assert_eq!(downloads.hidden_columns, vec!["host", "speed"]);
        assert_eq!(downloads.sort_column.as_deref(), Some("progress"));
        assert!(downloads.descending);
        assert_eq!(downloads.row_height, None);
        assert_eq!(settings.table("uploads"), TableSettings::default());
    }

    #[test]
    fn test_invalid_toml() {
        let err = Settings::from_toml_str("[input\n").unwrap_err();
        assert!(matches!(err, Error::Settings(_)));
        let err = Settings::from_toml_str("[input]\ndrag_threshold = \"far\"").unwrap_err();
        assert!(matches!(err, Error::Settings(_)));
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("swarmdeck.toml");

        let mut settings = Settings::default();
        settings.refresh.interval_ms = 250;
        settings.set_table(
            "library",
            TableSettings {
                hidden_columns: vec!["path".into()],
                row_height: Some(22.0),
                ..TableSettings::default()
            },
        );
        settings.save(&path).expect("save");

        let loaded = Settings::load(&path).expect("load");
        assert_eq!(loaded, settings);
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("absent.toml");
        assert!(matches!(Settings::load(&path), Err(Error::Io { .. })));
        assert_eq!(Settings::load_or_default(&path).expect("defaults"), Settings::default());
    }
}
