//! Version command implementation.

use crate::config::DEFAULT_API_URL;
use crate::error::Result;
use crate::model::EntityType;
use serde::Serialize;

#[derive(Serialize)]
struct VersionOutput<'a> {
    version: &'a str,
    build: &'a str,
    default_api: &'a str,
    cached_entities: Vec<&'a str>,
}

/// Execute the version command.
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
pub fn execute(json: bool) -> Result<()> {
    let version = env!("CARGO_PKG_VERSION");
    let build = if cfg!(debug_assertions) { "dev" } else { "release" };

    if json {
        let output = VersionOutput {
            version,
            build,
            default_api: DEFAULT_API_URL,
            cached_entities: EntityType::CACHED.iter().map(EntityType::as_str).collect(),
        };
        println!("{}", serde_json::to_string(&output)?);
    } else {
        println!("summer {version} ({build})");
    }
    Ok(())
}
