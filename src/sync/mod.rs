//! Collection synchronization.
//!
//! Each presented collection is shown from the local cache first and then
//! refreshed from the remote API:
//!
//! - **State**: a pure per-collection state machine emitting effects
//! - **Policy**: endpoint, ordering and filtering per entity type
//! - **Coordinator**: cache load, remote refresh, persistence, image pass
//!
//! # Example
//!
//! ```ignore
//! use summer::sync::{CollectionSync, SyncCoordinator};
//!
//! let mut lecturers = CollectionSync::<Lecturer>::new();
//! let effects = coordinator.activate(&mut lecturers).await;
//! coordinator.refresh_images(&mut lecturers).await;
//! ```

mod coordinator;
mod policy;
mod state;

pub use coordinator::{CollectionSync, RefreshOutcome, RefreshTicket, SyncCoordinator};
pub use policy::{comment_before, CollectionParams, SyncContext, Synced};
pub use state::{Effect, Source, SyncEvent, SyncMachine, SyncState};
