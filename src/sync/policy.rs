//! Per-entity collection policy: where a collection comes from, how it is
//! ordered and which records are kept.

use crate::model::{Announcement, Event, ForumComment, ForumThread, GeneralInfoItem, Lecturer};
use crate::net::Endpoint;
use crate::schema::Cached;

/// Session facts filters depend on.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncContext {
    /// Active school. `None` disables school filtering.
    pub school_id: Option<String>,
}

impl SyncContext {
    #[must_use]
    pub fn for_school(school_id: impl Into<String>) -> Self {
        Self {
            school_id: Some(school_id.into()),
        }
    }

    fn admits(&self, school_id: &str) -> bool {
        self.school_id.as_deref().is_none_or(|active| active == school_id)
    }
}

/// Query parameters of a collection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CollectionParams {
    /// Calendar week offset, 0 = current week.
    pub week: i32,
}

/// A cached collection fetched from one endpoint.
pub trait Synced: Cached {
    fn endpoint(params: &CollectionParams) -> Endpoint;

    /// Strict ordering: `a` sorts before `b`.
    fn before(a: &Self, b: &Self) -> bool;

    fn keep(&self, _context: &SyncContext) -> bool {
        true
    }
}

impl Synced for Announcement {
    fn endpoint(_params: &CollectionParams) -> Endpoint {
        Endpoint::Announcements
    }

    fn before(a: &Self, b: &Self) -> bool {
        a.date > b.date
    }
}

impl Synced for GeneralInfoItem {
    fn endpoint(_params: &CollectionParams) -> Endpoint {
        Endpoint::GeneralInfo
    }

    fn before(a: &Self, b: &Self) -> bool {
        match a.category.ordinal().cmp(&b.category.ordinal()) {
            std::cmp::Ordering::Equal => a.date > b.date,
            ord => ord.is_lt(),
        }
    }
}

impl Synced for Event {
    fn endpoint(params: &CollectionParams) -> Endpoint {
        Endpoint::Events { week: params.week }
    }

    fn before(a: &Self, b: &Self) -> bool {
        (a.start, a.end) < (b.start, b.end)
    }

    fn keep(&self, context: &SyncContext) -> bool {
        context.admits(&self.school_id)
    }
}

impl Synced for Lecturer {
    fn endpoint(_params: &CollectionParams) -> Endpoint {
        Endpoint::Lecturers
    }

    fn before(a: &Self, b: &Self) -> bool {
        a.name.to_lowercase() < b.name.to_lowercase()
    }
}

impl Synced for ForumThread {
    fn endpoint(_params: &CollectionParams) -> Endpoint {
        Endpoint::ForumThreads
    }

    fn before(a: &Self, b: &Self) -> bool {
        a.date > b.date
    }

    fn keep(&self, context: &SyncContext) -> bool {
        context.admits(&self.school_id)
    }
}

/// Comments read oldest first.
#[must_use]
pub fn comment_before(a: &ForumComment, b: &ForumComment) -> bool {
    a.date < b.date
}
