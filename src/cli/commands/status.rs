//! Status command implementation.

use std::path::PathBuf;

use colored::Colorize;
use serde::Serialize;

use super::{api_client, open_storage, settings_store};
use crate::config::resolve_codec;
use crate::date::{DateCodec, DateFormat};
use crate::error::Result;
use crate::model::{EntityType, SchoolSession};
use crate::session::{GateState, SessionGate};
use crate::storage::CacheInfo;

/// Output for status command.
#[derive(Serialize)]
struct StatusOutput<'a> {
    state: GateState,
    show_lock_screen: bool,
    school: Option<&'a SchoolSession>,
    display_name: Option<&'a str>,
    api_url: &'a str,
    caches: Vec<CacheEntry>,
}

#[derive(Serialize)]
struct CacheEntry {
    entity: EntityType,
    rows: usize,
    last_replace: Option<CacheInfo>,
}

/// Execute status command.
pub fn execute(
    db: Option<&PathBuf>,
    settings: Option<&PathBuf>,
    api_url: Option<&str>,
    json: bool,
) -> Result<()> {
    let codec = resolve_codec();
    let (api, config) = api_client(api_url)?;
    let gate = SessionGate::new(api, settings_store(settings)?, codec, config.code_length);
    let storage = open_storage(db)?;

    let caches = EntityType::CACHED
        .into_iter()
        .map(|entity| {
            Ok(CacheEntry {
                entity,
                rows: storage.count(entity)?,
                last_replace: storage.cache_info(entity)?,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    let output = StatusOutput {
        state: gate.state(),
        show_lock_screen: gate.should_show_lock_screen(),
        school: gate.session(),
        display_name: gate.settings().display_name.as_deref(),
        api_url: &config.base_url,
        caches,
    };

    if json {
        println!("{}", serde_json::to_string(&output)?);
    } else {
        print_human(&output, &codec);
    }
    Ok(())
}

fn print_human(output: &StatusOutput<'_>, codec: &DateCodec) {
    println!("{}", "Session".cyan().bold());
    println!("  State:       {}", output.state);
    println!("  Lock screen: {}", if output.show_lock_screen { "shown" } else { "suppressed" });
    match output.school {
        Some(school) => println!(
            "  School:      {} ({}) {} to {}",
            school.name.bold(),
            school.school_id.dimmed(),
            codec.render(&school.start, DateFormat::Compact),
            codec.render(&school.end, DateFormat::Compact)
        ),
        None => println!("  School:      {}", "none".dimmed()),
    }
    println!("  API:         {}", output.api_url);

    println!("{}", "Cache".cyan().bold());
    for cache in &output.caches {
        let stored = cache.last_replace.as_ref().and_then(|i| {
            chrono::DateTime::from_timestamp_millis(i.stored_at)
                .map(|at| codec.render(&at, DateFormat::Presentation))
        });
        match stored {
            Some(at) => println!("  {:<14} {:>4} rows  {}", cache.entity.as_str(), cache.rows, at.dimmed()),
            None => println!("  {:<14} {:>4} rows  {}", cache.entity.as_str(), cache.rows, "never refreshed".dimmed()),
        }
    }
}
