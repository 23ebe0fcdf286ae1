//! Login command implementation.

use std::path::PathBuf;

use colored::Colorize;
use serde::Serialize;

use super::{api_client, runtime, settings_store};
use crate::config::resolve_codec;
use crate::date::DateFormat;
use crate::error::Result;
use crate::model::SchoolSession;
use crate::session::{GateState, SessionGate};

#[derive(Serialize)]
struct LoginOutput<'a> {
    state: GateState,
    school: &'a SchoolSession,
}

/// Execute the login command.
pub fn execute(
    code: &str,
    settings: Option<&PathBuf>,
    api_url: Option<&str>,
    json: bool,
) -> Result<()> {
    let codec = resolve_codec();
    let (api, config) = api_client(api_url)?;
    let mut gate = SessionGate::new(api, settings_store(settings)?, codec, config.code_length);

    let school = runtime()?.block_on(gate.submit_code(code))?;

    if json {
        let output = LoginOutput {
            state: gate.state(),
            school: &school,
        };
        println!("{}", serde_json::to_string(&output)?);
    } else {
        println!(
            "{} {} ({} to {})",
            "Logged in to".green(),
            school.name.bold(),
            codec.render(&school.start, DateFormat::Compact),
            codec.render(&school.end, DateFormat::Compact)
        );
    }
    Ok(())
}
