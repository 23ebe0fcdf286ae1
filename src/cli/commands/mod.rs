//! Command implementations.
//!
//! Commands are the composition root: each one builds the transport,
//! store and services it needs from the global flags.

pub mod comments;
pub mod completions;
pub mod list;
pub mod lock;
pub mod login;
pub mod refresh;
pub mod status;
pub mod version;

use std::path::PathBuf;

use crate::config::{resolve_db_path, resolve_settings_path, ClientConfig, SettingsStore};
use crate::error::{Error, Result};
use crate::net::{ApiClient, HttpTransport};
use crate::storage::SqliteStorage;
use crate::sync::SyncContext;
use crate::validate::Collection;

/// Open (creating if needed) the cache database.
pub(crate) fn open_storage(db: Option<&PathBuf>) -> Result<SqliteStorage> {
    let path = resolve_db_path(db.map(PathBuf::as_path))
        .ok_or_else(|| Error::Config("Could not determine home directory".into()))?;
    SqliteStorage::open(&path)
}

pub(crate) fn settings_store(path: Option<&PathBuf>) -> Result<SettingsStore> {
    resolve_settings_path(path.map(PathBuf::as_path))
        .map(SettingsStore::new)
        .ok_or_else(|| Error::Config("Could not determine home directory".into()))
}

/// API client over HTTP, plus the resolved client configuration.
pub(crate) fn api_client(api_url: Option<&str>) -> Result<(ApiClient<HttpTransport>, ClientConfig)> {
    let config = ClientConfig::resolve(api_url);
    let transport = HttpTransport::new(config.timeout)?;
    let api = ApiClient::new(transport, &config.base_url)?;
    Ok((api, config))
}

pub(crate) fn runtime() -> Result<tokio::runtime::Runtime> {
    tokio::runtime::Runtime::new().map_err(Error::Io)
}

/// Filter context for the logged-in school.
///
/// Remote content stays behind the lock screen: while it is due, this
/// fails with [`Error::NotAuthenticated`] before any request is made.
pub(crate) fn require_session(settings: &SettingsStore) -> Result<SyncContext> {
    let settings = settings.load()?;
    if settings.lock_screen_required() {
        return Err(Error::NotAuthenticated);
    }
    Ok(SyncContext {
        school_id: settings.school.map(|school| school.school_id),
    })
}

pub(crate) fn parse_collection(name: &str) -> Result<Collection> {
    name.parse().map_err(Error::InvalidArgument)
}
