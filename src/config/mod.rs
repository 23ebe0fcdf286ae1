//! Configuration management.
//!
//! This module resolves where the client keeps its files and how it talks
//! to the API.
//!
//! # Layout
//!
//! Everything lives under `~/.summerschool/`:
//! - **Cache**: `~/.summerschool/data/cache.db` (SQLite record store)
//! - **Settings**: `~/.summerschool/settings.json` (lock screen flag, user
//!   profile and the authenticated school)

mod settings;

pub use settings::{Settings, SettingsStore};

use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::Offset;

use crate::date::DateCodec;

/// API root used when neither a flag nor `SUMMER_API_URL` names one.
pub const DEFAULT_API_URL: &str = "https://summerschool.rug.nl/api";

/// Login codes are exactly this many characters unless configured otherwise.
pub const DEFAULT_CODE_LENGTH: usize = 8;

/// Per-request timeout unless configured otherwise.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

/// Get the global client directory location.
#[must_use]
pub fn global_dir() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|b| b.home_dir().join(".summerschool"))
}

/// Resolve the cache database path.
///
/// Priority:
/// 1. If `explicit_path` is provided, use it directly
/// 2. `SUMMER_DB` environment variable
/// 3. Global location: `~/.summerschool/data/cache.db`
#[must_use]
pub fn resolve_db_path(explicit_path: Option<&Path>) -> Option<PathBuf> {
    resolve_path(explicit_path, "SUMMER_DB", &["data", "cache.db"])
}

/// Resolve the settings file path.
///
/// Priority:
/// 1. If `explicit_path` is provided, use it directly
/// 2. `SUMMER_SETTINGS` environment variable
/// 3. Global location: `~/.summerschool/settings.json`
#[must_use]
pub fn resolve_settings_path(explicit_path: Option<&Path>) -> Option<PathBuf> {
    resolve_path(explicit_path, "SUMMER_SETTINGS", &["settings.json"])
}

fn resolve_path(explicit_path: Option<&Path>, env_key: &str, default: &[&str]) -> Option<PathBuf> {
    if let Some(path) = explicit_path {
        return Some(path.to_path_buf());
    }

    if let Ok(path) = std::env::var(env_key) {
        if !path.trim().is_empty() {
            return Some(PathBuf::from(path));
        }
    }

    global_dir().map(|dir| default.iter().fold(dir, |acc, part| acc.join(part)))
}

/// Resolve the API root.
///
/// Priority: explicit value, `SUMMER_API_URL`, [`DEFAULT_API_URL`].
#[must_use]
pub fn resolve_api_url(explicit: Option<&str>) -> String {
    if let Some(url) = explicit.filter(|u| !u.trim().is_empty()) {
        return url.trim().to_string();
    }

    std::env::var("SUMMER_API_URL")
        .ok()
        .filter(|u| !u.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_API_URL.to_string())
}

/// Display zone for calendar formats.
///
/// `SUMMER_UTC_OFFSET` (minutes east of UTC) wins over the system zone.
#[must_use]
pub fn resolve_codec() -> DateCodec {
    std::env::var("SUMMER_UTC_OFFSET")
        .ok()
        .and_then(|m| m.trim().parse::<i32>().ok())
        .and_then(DateCodec::with_offset_minutes)
        .unwrap_or_else(|| DateCodec::with_zone(chrono::Local::now().offset().fix()))
}

/// How the client reaches the API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub base_url: String,
    pub code_length: usize,
    pub timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_URL.to_string(),
            code_length: DEFAULT_CODE_LENGTH,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl ClientConfig {
    /// Defaults with the API root resolved from `explicit_url` or the environment.
    #[must_use]
    pub fn resolve(explicit_url: Option<&str>) -> Self {
        Self {
            base_url: resolve_api_url(explicit_url),
            ..Self::default()
        }
    }
}
