//! Comments command implementation.

use std::path::PathBuf;

use super::list::print_records;
use super::{api_client, open_storage, require_session, runtime, settings_store};
use crate::config::resolve_codec;
use crate::error::{Error, Result};
use crate::storage::LocalStore;
use crate::sync::SyncCoordinator;

/// Execute the comments command. Comments are always fetched live.
pub fn execute(
    thread_id: &str,
    db: Option<&PathBuf>,
    settings: Option<&PathBuf>,
    api_url: Option<&str>,
    json: bool,
) -> Result<()> {
    let thread_id = thread_id.trim();
    if thread_id.is_empty() {
        return Err(Error::InvalidArgument("thread id must not be empty".into()));
    }

    let context = require_session(&settings_store(settings)?)?;
    let codec = resolve_codec();
    let (api, _config) = api_client(api_url)?;
    let local = LocalStore::new(open_storage(db)?, codec);
    let coordinator = SyncCoordinator::new(api, local, codec, context);

    let comments = runtime()?.block_on(coordinator.fetch_comments(thread_id))?;
    print_records(&comments, "server", &codec, json)
}
