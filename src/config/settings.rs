//! Persisted client settings.
//!
//! A small JSON document holding the lock screen preference, the cached
//! user profile trio and the authenticated school.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::model::SchoolSession;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    /// Present the lock screen on next launch.
    pub show_lock_screen: bool,
    pub display_name: Option<String>,
    pub avatar_url: Option<String>,
    pub user_id: Option<String>,
    pub school: Option<SchoolSession>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            show_lock_screen: true,
            display_name: None,
            avatar_url: None,
            user_id: None,
            school: None,
        }
    }
}

impl Settings {
    /// The lock screen is due when it was re-armed or no school is bound yet.
    #[must_use]
    pub const fn lock_screen_required(&self) -> bool {
        self.show_lock_screen || self.school.is_none()
    }
}

/// Reads and writes [`Settings`] at a fixed path.
#[derive(Debug, Clone)]
pub struct SettingsStore {
    path: PathBuf,
}

impl SettingsStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load settings; a missing file yields defaults.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the file exists but cannot be read or parsed.
    pub fn load(&self) -> Result<Settings> {
        if !self.path.exists() {
            return Ok(Settings::default());
        }

        let content = fs::read_to_string(&self.path)
            .map_err(|e| Error::Config(format!("Failed to read settings file: {e}")))?;

        serde_json::from_str(&content)
            .map_err(|e| Error::Config(format!("Failed to parse settings file: {e}")))
    }

    /// Write settings through a temp file and rename.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the directory or file cannot be written.
    pub fn save(&self, settings: &Settings) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| Error::Config(format!("Failed to create settings directory: {e}")))?;
        }

        let content = serde_json::to_string_pretty(settings)
            .map_err(|e| Error::Config(format!("Failed to serialize settings: {e}")))?;

        let temp_path = self.path.with_extension("json.tmp");
        let write = || -> std::io::Result<()> {
            let file = File::create(&temp_path)?;
            let mut writer = BufWriter::new(file);
            writer.write_all(content.as_bytes())?;
            writer.flush()?;
            writer.get_ref().sync_all()?;
            fs::rename(&temp_path, &self.path)
        };

        write().map_err(|e| Error::Config(format!("Failed to write settings file: {e}")))
    }
}
