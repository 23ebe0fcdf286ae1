//! Cache-first collection refresh.
//!
//! A [`CollectionSync`] is the in-memory collection a presenter owns. The
//! [`SyncCoordinator`] fills it from the local store, then from the remote
//! API, driving the collection's [`SyncMachine`] and carrying out the
//! `Persist` effect itself. Render and banner effects go back to the caller.
//!
//! Every refresh hands out a [`RefreshTicket`] stamped with a generation
//! number. Completing a ticket that is no longer the newest one is a no-op,
//! so a slow response can never overwrite a newer collection.

use tracing::{debug, info, warn};

use crate::date::DateCodec;
use crate::error::{Error, Result};
use crate::model::{ForumComment, ImageBearing};
use crate::net::{ApiClient, Endpoint, Transport};
use crate::pipeline::Pipeline;
use crate::schema::FieldKeys;
use crate::storage::{LocalStore, RecordStore};
use crate::sync::policy::{comment_before, CollectionParams, SyncContext, Synced};
use crate::sync::state::{Effect, SyncEvent, SyncMachine, SyncState};

/// In-memory collection of one entity type plus its sync bookkeeping.
#[derive(Debug)]
pub struct CollectionSync<R: Synced> {
    records: Vec<R>,
    machine: SyncMachine,
    generation: u64,
    params: CollectionParams,
    keys: FieldKeys<R::Field>,
    last_error: Option<Error>,
}

impl<R: Synced> Default for CollectionSync<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Synced> CollectionSync<R> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            records: Vec::new(),
            machine: SyncMachine::new(),
            generation: 0,
            params: CollectionParams::default(),
            keys: FieldKeys::wire(),
            last_error: None,
        }
    }

    #[must_use]
    pub fn with_params(mut self, params: CollectionParams) -> Self {
        self.params = params;
        self
    }

    /// Decode remote payloads through `keys` instead of the default wire keys.
    #[must_use]
    pub fn with_keys(mut self, keys: FieldKeys<R::Field>) -> Self {
        self.keys = keys;
        self
    }

    #[must_use]
    pub fn records(&self) -> &[R] {
        &self.records
    }

    #[must_use]
    pub const fn state(&self) -> SyncState {
        self.machine.state()
    }

    #[must_use]
    pub const fn is_degraded(&self) -> bool {
        self.machine.is_degraded()
    }

    #[must_use]
    pub const fn banner_visible(&self) -> bool {
        self.machine.banner_visible()
    }

    #[must_use]
    pub const fn params(&self) -> &CollectionParams {
        &self.params
    }

    /// Select another calendar week. Takes effect on the next refresh.
    pub fn set_week(&mut self, week: i32) {
        self.params.week = week;
    }

    /// Why the most recent refresh failed, if it did.
    #[must_use]
    pub const fn last_error(&self) -> Option<&Error> {
        self.last_error.as_ref()
    }

    /// Take the failure of the most recent refresh, leaving `None`.
    pub fn take_error(&mut self) -> Option<Error> {
        self.last_error.take()
    }

    /// The user dismissed the connection banner.
    pub fn acknowledge_banner(&mut self) -> Vec<Effect> {
        self.machine.apply(SyncEvent::BannerAcknowledged)
    }
}

/// One outstanding refresh of a [`CollectionSync`].
#[derive(Debug)]
pub struct RefreshTicket<R: Synced> {
    generation: u64,
    endpoint: Endpoint,
    keys: FieldKeys<R::Field>,
    user_initiated: bool,
}

impl<R: Synced> RefreshTicket<R> {
    #[must_use]
    pub const fn generation(&self) -> u64 {
        self.generation
    }

    #[must_use]
    pub const fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }
}

/// Result of completing a [`RefreshTicket`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// The ticket was current; the caller applies these effects.
    Applied(Vec<Effect>),
    /// A newer refresh started after this one; nothing changed.
    Stale,
}

impl RefreshOutcome {
    #[must_use]
    pub fn effects(&self) -> &[Effect] {
        match self {
            Self::Applied(effects) => effects,
            Self::Stale => &[],
        }
    }
}

/// Loads, refreshes and persists collections.
#[derive(Debug)]
pub struct SyncCoordinator<T, S> {
    api: ApiClient<T>,
    local: LocalStore<S>,
    codec: DateCodec,
    context: SyncContext,
}

impl<T: Transport, S: RecordStore> SyncCoordinator<T, S> {
    pub const fn new(api: ApiClient<T>, local: LocalStore<S>, codec: DateCodec, context: SyncContext) -> Self {
        Self {
            api,
            local,
            codec,
            context,
        }
    }

    pub const fn api(&self) -> &ApiClient<T> {
        &self.api
    }

    pub const fn local(&self) -> &LocalStore<S> {
        &self.local
    }

    pub const fn context(&self) -> &SyncContext {
        &self.context
    }

    pub fn set_context(&mut self, context: SyncContext) {
        self.context = context;
    }

    /// Show cached records if nothing is in memory yet, then refresh.
    pub async fn activate<R: Synced>(&mut self, collection: &mut CollectionSync<R>) -> Vec<Effect> {
        let mut effects = Vec::new();

        if collection.records.is_empty() {
            if let Some(cached) = self.local.load_all::<R>() {
                collection.records = cached
                    .into_iter()
                    .filter(|r| r.keep(&self.context))
                    .collect();
            }
            effects.extend(collection.machine.apply(SyncEvent::CacheLoaded {
                count: collection.records.len(),
            }));
        }

        effects.extend_from_slice(self.refresh(collection, false).await.effects());
        effects
    }

    /// Fetch, decode and commit a fresh copy of `collection`.
    pub async fn refresh<R: Synced>(
        &mut self,
        collection: &mut CollectionSync<R>,
        user_initiated: bool,
    ) -> RefreshOutcome {
        let ticket = self.begin_refresh(collection, user_initiated);
        let result = self.fetch(&ticket).await;
        self.complete(collection, &ticket, result)
    }

    /// Enter `Refreshing` and issue a ticket that supersedes all earlier ones.
    pub fn begin_refresh<R: Synced>(
        &self,
        collection: &mut CollectionSync<R>,
        user_initiated: bool,
    ) -> RefreshTicket<R> {
        collection.generation += 1;
        collection
            .machine
            .apply(SyncEvent::RefreshStarted { user_initiated });

        RefreshTicket {
            generation: collection.generation,
            endpoint: R::endpoint(&collection.params),
            keys: collection.keys.clone(),
            user_initiated,
        }
    }

    /// Download and decode the collection named by `ticket`.
    ///
    /// # Errors
    ///
    /// Returns the transport failure or the first malformed record.
    pub async fn fetch<R: Synced>(&self, ticket: &RefreshTicket<R>) -> Result<Vec<R>> {
        let body = self.api.fetch_ok(&ticket.endpoint).await?;

        let pipeline = Pipeline::for_record(&ticket.keys, self.codec, R::before)
            .with_filter(|r: &R| r.keep(&self.context));
        Ok(pipeline.process(&body)?)
    }

    /// Commit the outcome of `ticket` to `collection`.
    ///
    /// On success the records replace the in-memory collection and the local
    /// store. A store failure is logged and otherwise ignored. On failure the
    /// current records stay as they are.
    pub fn complete<R: Synced>(
        &mut self,
        collection: &mut CollectionSync<R>,
        ticket: &RefreshTicket<R>,
        result: Result<Vec<R>>,
    ) -> RefreshOutcome {
        if ticket.generation != collection.generation {
            debug!(
                entity = %R::ENTITY,
                ticket = ticket.generation,
                current = collection.generation,
                "Discarding stale refresh"
            );
            return RefreshOutcome::Stale;
        }

        let effects = match result {
            Ok(records) => {
                info!(entity = %R::ENTITY, count = records.len(), user = ticket.user_initiated, "Refreshed collection");
                collection.records = records;
                collection.last_error = None;
                collection.machine.apply(SyncEvent::RemoteSucceeded)
            }
            Err(e) => {
                warn!(entity = %R::ENTITY, error = %e, "Refresh failed, keeping current records");
                collection.last_error = Some(e);
                collection.machine.apply(SyncEvent::RemoteFailed)
            }
        };

        let mut remaining = Vec::with_capacity(effects.len());
        for effect in effects {
            if effect == Effect::Persist {
                if let Err(e) = self.local.replace_all(&collection.records) {
                    warn!(entity = %R::ENTITY, error = %e, "Failed to cache collection");
                }
            } else {
                remaining.push(effect);
            }
        }
        RefreshOutcome::Applied(remaining)
    }

    /// Download missing images for the committed collection, one at a time.
    ///
    /// Failed downloads leave the image absent. Returns how many images were
    /// attached.
    pub async fn refresh_images<R: Synced + ImageBearing>(
        &self,
        collection: &mut CollectionSync<R>,
    ) -> usize {
        let mut attached = 0;
        for record in &mut collection.records {
            if record.has_image() {
                continue;
            }
            let Some(path) = record.image_path().map(str::to_owned) else {
                continue;
            };
            match self.api.fetch_resource(&path).await {
                Ok(bytes) => {
                    record.set_image(bytes);
                    attached += 1;
                }
                Err(e) => debug!(entity = %R::ENTITY, %path, error = %e, "Image unavailable"),
            }
        }
        attached
    }

    /// Comments of one forum thread, oldest first. Never cached.
    ///
    /// # Errors
    ///
    /// Returns the transport failure or the first malformed comment.
    pub async fn fetch_comments(&self, thread_id: &str) -> Result<Vec<ForumComment>> {
        let endpoint = Endpoint::ForumComments {
            thread_id: thread_id.to_string(),
        };
        let body = self.api.fetch_ok(&endpoint).await?;

        let keys = FieldKeys::wire();
        let pipeline = Pipeline::for_record(&keys, self.codec, comment_before);
        Ok(pipeline.process(&body)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Announcement, EntityType, Event, Lecturer};
    use crate::net::mock::MockTransport;
    use crate::net::TransportError;
    use crate::storage::SqliteStorage;
    use crate::sync::state::Source;
    use chrono::{TimeZone, Utc};
    use serde_json::{json, Value};

    const BASE: &str = "https://api.test/v1";

    fn coordinator(transport: MockTransport) -> SyncCoordinator<MockTransport, SqliteStorage> {
        coordinator_with(transport, SyncContext::default())
    }

    fn coordinator_with(
        transport: MockTransport,
        context: SyncContext,
    ) -> SyncCoordinator<MockTransport, SqliteStorage> {
        let api = ApiClient::new(transport, BASE).unwrap();
        let local = LocalStore::new(SqliteStorage::open_memory().unwrap(), DateCodec::utc());
        SyncCoordinator::new(api, local, DateCodec::utc(), context)
    }

    fn announcement(id: &str, day: u32) -> Announcement {
        Announcement {
            id: id.into(),
            title: format!("Title {id}"),
            description: "text".into(),
            author: "office".into(),
            date: Utc.with_ymd_and_hms(2024, 7, day, 9, 0, 0).unwrap(),
        }
    }

    fn announcement_json(id: &str, day: u32) -> Value {
        json!({
            "id": id,
            "title": format!("Title {id}"),
            "description": "text",
            "author": "office",
            "date": format!("2024-07-{day:02}T09:00:00.000Z")
        })
    }

    fn ids<R: Synced>(records: &[R], id: impl Fn(&R) -> &str) -> Vec<String> {
        records.iter().map(|r| id(r).to_string()).collect()
    }

    #[tokio::test]
    async fn test_transport_failure_keeps_cached_records() {
        let transport = MockTransport::new().fail(
            "/v1/announcement/item",
            TransportError::Unreachable("offline".into()),
        );
        let mut sync = coordinator(transport);
        let cached = vec![announcement("b", 2), announcement("a", 1)];
        sync.local.replace_all(&cached).unwrap();

        let mut collection = CollectionSync::<Announcement>::new();
        let effects = sync.activate(&mut collection).await;

        assert_eq!(collection.records(), cached.as_slice());
        assert!(collection.is_degraded());
        assert!(collection.banner_visible());
        assert_eq!(effects, vec![Effect::Render, Effect::ShowBanner]);
        assert!(matches!(
            collection.take_error(),
            Some(Error::Transport(TransportError::Unreachable(_)))
        ));
        assert!(collection.last_error().is_none());
    }

    #[tokio::test]
    async fn test_success_replaces_cache_entirely() {
        let body = json!([announcement_json("new-1", 3), announcement_json("new-2", 4)]);
        let transport = MockTransport::new().reply("/v1/announcement/item", 200, body.to_string());
        let mut sync = coordinator(transport);
        sync.local
            .replace_all(&[announcement("old-1", 1), announcement("old-2", 2)])
            .unwrap();

        let mut collection = CollectionSync::<Announcement>::new();
        let effects = sync.activate(&mut collection).await;

        assert_eq!(effects, vec![Effect::Render, Effect::Render]);
        assert_eq!(collection.state(), SyncState::Loaded(Source::Remote));

        let stored = sync.local.load_all::<Announcement>().unwrap();
        assert_eq!(ids(&stored, |a| a.id.as_str()), vec!["new-2", "new-1"]);
        assert_eq!(stored, collection.records());
    }

    #[tokio::test]
    async fn test_malformed_payload_degrades_without_touching_records() {
        let mut broken = announcement_json("x", 5);
        broken.as_object_mut().unwrap().remove("author");
        let body = json!([announcement_json("ok", 4), broken]);
        let transport = MockTransport::new().reply("/v1/announcement/item", 200, body.to_string());
        let mut sync = coordinator(transport);
        sync.local.replace_all(&[announcement("cached", 1)]).unwrap();

        let mut collection = CollectionSync::<Announcement>::new();
        sync.activate(&mut collection).await;

        assert_eq!(ids(collection.records(), |a| a.id.as_str()), vec!["cached"]);
        assert!(collection.is_degraded());
        let stored = sync.local.load_all::<Announcement>().unwrap();
        assert_eq!(ids(&stored, |a| a.id.as_str()), vec!["cached"]);
    }

    struct ReadOnlyStore;

    impl RecordStore for ReadOnlyStore {
        fn fetch_all(&self, _entity: EntityType) -> Result<Vec<Value>> {
            Ok(Vec::new())
        }

        fn delete_all(&mut self, _entity: EntityType) -> Result<()> {
            Err(Error::Io(std::io::Error::other("read-only")))
        }

        fn insert(&mut self, _entity: EntityType, _row: &Value) -> Result<()> {
            Err(Error::Io(std::io::Error::other("read-only")))
        }
    }

    #[tokio::test]
    async fn test_failed_cache_write_is_not_surfaced() {
        let body = json!([announcement_json("a", 1), announcement_json("b", 2)]);
        let transport = MockTransport::new().reply("/v1/announcement/item", 200, body.to_string());
        let api = ApiClient::new(transport, BASE).unwrap();
        let local = LocalStore::new(ReadOnlyStore, DateCodec::utc());
        let mut sync = SyncCoordinator::new(api, local, DateCodec::utc(), SyncContext::default());

        let mut collection = CollectionSync::<Announcement>::new();
        let effects = sync.activate(&mut collection).await;

        assert_eq!(effects, vec![Effect::Render]);
        assert_eq!(collection.state(), SyncState::Loaded(Source::Remote));
        assert!(!collection.is_degraded());
        assert!(!collection.banner_visible());
        assert!(collection.last_error().is_none());
        assert_eq!(ids(collection.records(), |a| a.id.as_str()), vec!["b", "a"]);
    }

    #[tokio::test]
    async fn test_stale_ticket_is_discarded() {
        let mut sync = coordinator(MockTransport::new());
        let mut collection = CollectionSync::<Announcement>::new();

        let first = sync.begin_refresh(&mut collection, true);
        let second = sync.begin_refresh(&mut collection, true);

        let newer = sync.complete(&mut collection, &second, Ok(vec![announcement("newer", 2)]));
        assert!(matches!(newer, RefreshOutcome::Applied(_)));

        let older = sync.complete(&mut collection, &first, Ok(vec![announcement("older", 1)]));
        assert_eq!(older, RefreshOutcome::Stale);
        assert_eq!(ids(collection.records(), |a| a.id.as_str()), vec!["newer"]);
        assert_eq!(first.generation() + 1, second.generation());
    }

    #[tokio::test]
    async fn test_user_refresh_shows_banner_again_after_acknowledgement() {
        let transport = MockTransport::new().fail("/v1/announcement/item", TransportError::Timeout);
        let mut sync = coordinator(transport);
        let mut collection = CollectionSync::<Announcement>::new();

        sync.activate(&mut collection).await;
        assert_eq!(collection.acknowledge_banner(), vec![Effect::HideBanner]);

        let quiet = sync.refresh(&mut collection, false).await;
        assert!(quiet.effects().is_empty());

        let loud = sync.refresh(&mut collection, true).await;
        assert_eq!(loud.effects(), &[Effect::ShowBanner]);
    }

    #[tokio::test]
    async fn test_events_filtered_by_active_school_and_week() {
        let event = |id: &str, school: &str, hour: u32| {
            json!({
                "id": id,
                "schoolId": school,
                "title": id,
                "body": "",
                "startDate": format!("2024-07-01T{hour:02}:00:00.000Z"),
                "endDate": format!("2024-07-01T{hour:02}:45:00.000Z")
            })
        };
        let body = json!([event("a-late", "A", 15), event("b", "B", 9), event("a-early", "A", 8)]);
        let transport =
            MockTransport::new().reply("/v1/calendar/event?week=1", 200, body.to_string());
        let mut sync = coordinator_with(transport, SyncContext::for_school("A"));

        let mut collection = CollectionSync::<Event>::new();
        collection.set_week(1);
        sync.refresh(&mut collection, true).await;

        assert_eq!(ids(collection.records(), |e| e.id.as_str()), vec!["a-early", "a-late"]);
        assert_eq!(
            sync.api().transport().requests(),
            vec!["https://api.test/v1/calendar/event?week=1".to_string()]
        );
    }

    #[tokio::test]
    async fn test_image_pass_is_best_effort() {
        let body = json!([
            {"id": "1", "name": "Ada", "body": "", "imagePath": "/img/ada.png"},
            {"id": "2", "name": "Bob", "body": "", "imagePath": "/img/bob.png"},
            {"id": "3", "name": "Cy", "body": ""}
        ]);
        let transport = MockTransport::new()
            .reply("/v1/lecturer/item", 200, body.to_string())
            .reply("/v1/img/ada.png", 200, vec![0x89, 0x50])
            .reply("/v1/img/bob.png", 404, "missing");
        let mut sync = coordinator(transport);

        let mut collection = CollectionSync::<Lecturer>::new();
        sync.refresh(&mut collection, false).await;
        let attached = sync.refresh_images(&mut collection).await;

        assert_eq!(attached, 1);
        let records = collection.records();
        assert_eq!(ids(records, |l| l.id.as_str()), vec!["1", "2", "3"]);
        assert_eq!(records[0].image.as_deref(), Some(&[0x89, 0x50][..]));
        assert!(records[1].image.is_none());
        assert!(records[2].image.is_none());
        assert!(!collection.is_degraded());
    }

    #[tokio::test]
    async fn test_comments_oldest_first() {
        let comment = |id: &str, hour: u32| {
            json!({
                "id": id,
                "author": "Sam",
                "authorId": 7,
                "body": "+1",
                "date": format!("2024-07-02T{hour:02}:00:00.000Z")
            })
        };
        let body = json!([comment("late", 18), comment("early", 9)]);
        let transport =
            MockTransport::new().reply("/v1/forum/thread/t1/comment", 200, body.to_string());
        let sync = coordinator(transport);

        let comments = sync.fetch_comments("t1").await.unwrap();
        let ids: Vec<_> = comments.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["early", "late"]);
    }
}
