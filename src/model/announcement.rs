//! News items shown on the announcements screen.

use serde::Serialize;

use crate::date::{DateCodec, Instant};
use crate::model::EntityType;
use crate::schema::{record_fields, Cached, ParseError, RawBuilder, RawObject, Record};

record_fields! {
    /// Fields of an [`Announcement`]. Wire keys are fixed.
    pub enum AnnouncementField {
        Id => ("id", "id"),
        Title => ("title", "title"),
        Description => ("description", "description"),
        Author => ("author", "author"),
        Date => ("date", "date"),
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Announcement {
    pub id: String,
    pub title: String,
    pub description: String,
    pub author: String,
    pub date: Instant,
}

impl Record for Announcement {
    type Field = AnnouncementField;
    const ENTITY: EntityType = EntityType::Announcement;

    fn decode(raw: &RawObject<'_, Self::Field>, codec: &DateCodec) -> Result<Self, ParseError> {
        use AnnouncementField as F;
        Ok(Self {
            id: raw.id(F::Id)?,
            title: raw.text(F::Title)?,
            description: raw.text(F::Description)?,
            author: raw.text(F::Author)?,
            date: raw.date(F::Date, codec)?,
        })
    }
}

impl Cached for Announcement {
    fn encode(&self, out: &mut RawBuilder<'_, Self::Field>, codec: &DateCodec) {
        use AnnouncementField as F;
        out.text(F::Id, &self.id)
            .text(F::Title, &self.title)
            .text(F::Description, &self.description)
            .text(F::Author, &self.author)
            .date(F::Date, &self.date, codec);
    }
}
