//! Entity records for the summer school client.
//!
//! - [`Announcement`]
//! - [`GeneralInfoItem`] and its [`Category`]
//! - [`Event`] (calendar)
//! - [`Lecturer`]
//! - [`ForumThread`] and [`ForumComment`]
//! - [`LoginCode`], [`SchoolInfo`] and the resolved [`SchoolSession`]
//!
//! Records are immutable values once decoded; collections are only ever
//! replaced wholesale.

pub mod announcement;
pub mod event;
pub mod forum;
pub mod general_info;
pub mod lecturer;
pub mod login;

pub use announcement::{Announcement, AnnouncementField};
pub use event::{Event, EventField};
pub use forum::{ForumComment, ForumCommentField, ForumThread, ForumThreadField};
pub use general_info::{Category, GeneralInfoField, GeneralInfoItem};
pub use lecturer::{Lecturer, LecturerField};
pub use login::{LoginCode, LoginCodeField, SchoolInfo, SchoolInfoField, SchoolSession};

use serde::{Deserialize, Serialize};

/// Entity type tags, used in diagnostics and as store partition keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityType {
    Announcement,
    GeneralInfo,
    Event,
    Lecturer,
    ForumThread,
    ForumComment,
    LoginCode,
    SchoolInfo,
}

impl EntityType {
    /// Entity types with a table in the local store.
    pub const CACHED: [Self; 5] = [
        Self::Announcement,
        Self::GeneralInfo,
        Self::Event,
        Self::Lecturer,
        Self::ForumThread,
    ];

    /// Stable snake_case name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Announcement => "announcement",
            Self::GeneralInfo => "general_info",
            Self::Event => "event",
            Self::Lecturer => "lecturer",
            Self::ForumThread => "forum_thread",
            Self::ForumComment => "forum_comment",
            Self::LoginCode => "login_code",
            Self::SchoolInfo => "school_info",
        }
    }
}

impl std::fmt::Display for EntityType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for EntityType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "announcement" => Ok(Self::Announcement),
            "general_info" => Ok(Self::GeneralInfo),
            "event" => Ok(Self::Event),
            "lecturer" => Ok(Self::Lecturer),
            "forum_thread" => Ok(Self::ForumThread),
            "forum_comment" => Ok(Self::ForumComment),
            "login_code" => Ok(Self::LoginCode),
            "school_info" => Ok(Self::SchoolInfo),
            _ => Err(format!("Unknown entity type: {s}")),
        }
    }
}

/// A record with a secondary image fetched after the collection commits.
pub trait ImageBearing {
    /// Image reference, absolute or relative to the API base.
    fn image_path(&self) -> Option<&str>;

    /// Attach downloaded image bytes.
    fn set_image(&mut self, bytes: Vec<u8>);

    /// Whether image bytes are attached.
    fn has_image(&self) -> bool;
}
