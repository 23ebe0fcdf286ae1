//! Lock command implementation.

use std::path::PathBuf;

use super::{api_client, settings_store};
use crate::config::resolve_codec;
use crate::error::Result;
use crate::session::SessionGate;

/// Re-arm the lock screen. The school stays configured.
pub fn execute(settings: Option<&PathBuf>, api_url: Option<&str>, json: bool) -> Result<()> {
    let (api, config) = api_client(api_url)?;
    let mut gate = SessionGate::new(api, settings_store(settings)?, resolve_codec(), config.code_length);
    gate.rearm_lock_screen()?;

    if json {
        println!(
            "{}",
            serde_json::json!({
                "state": gate.state(),
                "show_lock_screen": gate.should_show_lock_screen(),
            })
        );
    } else {
        println!("Lock screen armed.");
    }
    Ok(())
}
