//! List command implementation.

use std::path::PathBuf;

use colored::Colorize;
use serde::Serialize;
use tracing::warn;

use super::{open_storage, parse_collection};
use crate::config::resolve_codec;
use crate::date::{DateCodec, DateFormat};
use crate::error::Result;
use crate::model::{Announcement, Event, ForumComment, ForumThread, GeneralInfoItem, Lecturer};
use crate::storage::LocalStore;
use crate::sync::Synced;
use crate::validate::Collection;

/// A record the CLI knows how to print.
pub(crate) trait Listing: Serialize {
    /// Plural noun for headings.
    const NOUN: &'static str;

    fn print(&self, codec: &DateCodec);
}

#[derive(Serialize)]
pub(crate) struct ListOutput<'a, R> {
    pub collection: &'a str,
    pub source: &'a str,
    pub count: usize,
    pub records: &'a [R],
}

/// Print `records` as JSON or as a human-readable list.
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
pub(crate) fn print_records<R: Listing>(
    records: &[R],
    source: &str,
    codec: &DateCodec,
    json: bool,
) -> Result<()> {
    if json {
        let output = ListOutput {
            collection: R::NOUN,
            source,
            count: records.len(),
            records,
        };
        println!("{}", serde_json::to_string(&output)?);
        return Ok(());
    }

    if records.is_empty() {
        println!("No {} ({source}).", R::NOUN);
        return Ok(());
    }

    println!("{} {}", R::NOUN.cyan().bold(), format!("({}, {source})", records.len()).dimmed());
    for record in records {
        record.print(codec);
    }
    Ok(())
}

/// Execute the list command.
///
/// Reads only the local cache; never contacts the server.
pub fn execute(collection: &str, db: Option<&PathBuf>, json: bool) -> Result<()> {
    let collection = parse_collection(collection)?;
    let codec = resolve_codec();
    let local = LocalStore::new(open_storage(db)?, codec);

    match collection {
        Collection::Announcements => list::<Announcement>(&local, &codec, json),
        Collection::Info => list::<GeneralInfoItem>(&local, &codec, json),
        Collection::Events => list::<Event>(&local, &codec, json),
        Collection::Lecturers => list::<Lecturer>(&local, &codec, json),
        Collection::Forum => list::<ForumThread>(&local, &codec, json),
    }
}

fn list<R: Synced + Listing>(
    local: &LocalStore<crate::storage::SqliteStorage>,
    codec: &DateCodec,
    json: bool,
) -> Result<()> {
    let records = local.load_all::<R>().unwrap_or_else(|| {
        warn!(entity = %R::ENTITY, "Cache unreadable, showing nothing");
        Vec::new()
    });
    print_records(&records, "cache", codec, json)
}

// ── Record printing ──────────────────────────────────────────

impl Listing for Announcement {
    const NOUN: &'static str = "announcements";

    fn print(&self, codec: &DateCodec) {
        println!(
            "  {} {}",
            self.title.bold(),
            format!("by {}, {}", self.author, codec.render(&self.date, DateFormat::Presentation)).dimmed()
        );
        println!("    {}", self.description);
    }
}

impl Listing for GeneralInfoItem {
    const NOUN: &'static str = "info";

    fn print(&self, codec: &DateCodec) {
        println!(
            "  {} {} {}",
            format!("[{}]", self.category.label()).yellow(),
            self.title.bold(),
            codec.render(&self.date, DateFormat::Compact).dimmed()
        );
        println!("    {}", self.description);
    }
}

impl Listing for Event {
    const NOUN: &'static str = "events";

    fn print(&self, codec: &DateCodec) {
        let when = format!(
            "{} {}-{}",
            codec.render(&self.start, DateFormat::Compact),
            codec.render(&self.start, DateFormat::HoursMinutes),
            codec.render(&self.end, DateFormat::HoursMinutes)
        );
        match &self.location {
            Some(location) => println!("  {} {} @ {}", when.dimmed(), self.title.bold(), location),
            None => println!("  {} {}", when.dimmed(), self.title.bold()),
        }
    }
}

impl Listing for Lecturer {
    const NOUN: &'static str = "lecturers";

    fn print(&self, _codec: &DateCodec) {
        let portrait = if self.image.is_some() { " [portrait]" } else { "" };
        println!("  {}{}", self.name.bold(), portrait.dimmed());
        if let Some(website) = &self.website {
            println!("    {}", website.underline());
        }
    }
}

impl Listing for ForumThread {
    const NOUN: &'static str = "forum threads";

    fn print(&self, codec: &DateCodec) {
        println!(
            "  {} {} {}",
            self.id.dimmed(),
            self.title.bold(),
            format!(
                "({} comments, {} on {})",
                self.comment_count,
                self.author,
                codec.render(&self.date, DateFormat::Compact)
            )
            .dimmed()
        );
    }
}

impl Listing for ForumComment {
    const NOUN: &'static str = "comments";

    fn print(&self, codec: &DateCodec) {
        println!(
            "  {} {}",
            self.author.bold(),
            codec.render(&self.date, DateFormat::Presentation).dimmed()
        );
        println!("    {}", self.body);
    }
}
