//! Refresh command implementation.

use std::path::PathBuf;

use colored::Colorize;
use tracing::debug;

use super::list::{print_records, Listing};
use super::{api_client, open_storage, parse_collection, require_session, runtime, settings_store};
use crate::config::resolve_codec;
use crate::date::DateCodec;
use crate::error::Result;
use crate::model::{Announcement, Event, ForumThread, GeneralInfoItem, ImageBearing, Lecturer};
use crate::net::HttpTransport;
use crate::storage::{LocalStore, SqliteStorage};
use crate::sync::{CollectionParams, CollectionSync, Source, SyncCoordinator, SyncState, Synced};
use crate::validate::Collection;

type Coordinator = SyncCoordinator<HttpTransport, SqliteStorage>;

/// Options for the refresh command.
pub struct RefreshArgs<'a> {
    pub collection: &'a str,
    pub week: i32,
    pub images: bool,
    pub db: Option<&'a PathBuf>,
    pub settings: Option<&'a PathBuf>,
    pub api_url: Option<&'a str>,
}

/// Execute the refresh command.
///
/// Shows cached records first, then fetches the collection. When the
/// fetch fails the cached records are still printed and the failure is
/// returned.
pub fn execute(args: &RefreshArgs<'_>, json: bool) -> Result<()> {
    let collection = parse_collection(args.collection)?;
    let context = require_session(&settings_store(args.settings)?)?;
    let codec = resolve_codec();
    let (api, _config) = api_client(args.api_url)?;
    let local = LocalStore::new(open_storage(args.db)?, codec);
    let mut coordinator = SyncCoordinator::new(api, local, codec, context);
    let rt = runtime()?;
    let params = CollectionParams { week: args.week };

    match collection {
        Collection::Announcements => {
            let sync = activate::<Announcement>(&rt, &mut coordinator, params);
            report(sync, &codec, json)
        }
        Collection::Info => {
            let sync = activate::<GeneralInfoItem>(&rt, &mut coordinator, params);
            report(sync, &codec, json)
        }
        Collection::Events => {
            let sync = activate::<Event>(&rt, &mut coordinator, params);
            report(sync, &codec, json)
        }
        Collection::Lecturers => {
            let mut sync = activate::<Lecturer>(&rt, &mut coordinator, params);
            if args.images {
                fetch_images(&rt, &coordinator, &mut sync, json);
            }
            report(sync, &codec, json)
        }
        Collection::Forum => {
            let mut sync = activate::<ForumThread>(&rt, &mut coordinator, params);
            if args.images {
                fetch_images(&rt, &coordinator, &mut sync, json);
            }
            report(sync, &codec, json)
        }
    }
}

fn activate<R: Synced>(
    rt: &tokio::runtime::Runtime,
    coordinator: &mut Coordinator,
    params: CollectionParams,
) -> CollectionSync<R> {
    let mut sync = CollectionSync::<R>::new().with_params(params);
    let effects = rt.block_on(coordinator.activate(&mut sync));
    debug!(entity = %R::ENTITY, ?effects, "Activation finished");
    sync
}

fn fetch_images<R: Synced + ImageBearing>(
    rt: &tokio::runtime::Runtime,
    coordinator: &Coordinator,
    sync: &mut CollectionSync<R>,
    json: bool,
) {
    if sync.is_degraded() {
        return;
    }
    let attached = rt.block_on(coordinator.refresh_images(sync));
    if !json {
        println!("{}", format!("Downloaded {attached} image(s)").dimmed());
    }
}

fn report<R: Synced + Listing>(mut sync: CollectionSync<R>, codec: &DateCodec, json: bool) -> Result<()> {
    let source = match sync.state() {
        SyncState::Loaded(Source::Remote) => "server",
        _ => "cache",
    };
    print_records(sync.records(), source, codec, json)?;

    match sync.take_error() {
        Some(e) => {
            if !json && sync.banner_visible() {
                eprintln!(
                    "{}",
                    "Connection problem: showing the last cached data.".yellow().bold()
                );
            }
            Err(e)
        }
        None => {
            if !json {
                println!("{}", format!("{} refreshed.", R::NOUN).green());
            }
            Ok(())
        }
    }
}
