//! Calendar events for one school.

use serde::Serialize;

use crate::date::{DateCodec, Instant};
use crate::model::EntityType;
use crate::schema::{
    record_fields, Cached, ParseError, RawBuilder, RawObject, Record, RemappableField,
};

record_fields! {
    /// Fields of an [`Event`].
    pub enum EventField {
        Id => ("id", "id"),
        SchoolId => ("schoolId", "school_id"),
        Title => ("title", "title"),
        Body => ("body", "body"),
        Location => ("location", "location"),
        StartDate => ("startDate", "start_date"),
        EndDate => ("endDate", "end_date"),
    }
}

impl RemappableField for EventField {}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Event {
    pub id: String,
    pub school_id: String,
    pub title: String,
    pub body: String,
    pub location: Option<String>,
    pub start: Instant,
    pub end: Instant,
}

impl Record for Event {
    type Field = EventField;
    const ENTITY: EntityType = EntityType::Event;

    fn decode(raw: &RawObject<'_, Self::Field>, codec: &DateCodec) -> Result<Self, ParseError> {
        use EventField as F;
        Ok(Self {
            id: raw.id(F::Id)?,
            school_id: raw.id(F::SchoolId)?,
            title: raw.text(F::Title)?,
            body: raw.text(F::Body)?,
            location: raw.optional_text(F::Location),
            start: raw.date(F::StartDate, codec)?,
            end: raw.date(F::EndDate, codec)?,
        })
    }
}

impl Cached for Event {
    fn encode(&self, out: &mut RawBuilder<'_, Self::Field>, codec: &DateCodec) {
        use EventField as F;
        out.text(F::Id, &self.id)
            .text(F::SchoolId, &self.school_id)
            .text(F::Title, &self.title)
            .text(F::Body, &self.body)
            .optional_text(F::Location, self.location.as_deref())
            .date(F::StartDate, &self.start, codec)
            .date(F::EndDate, &self.end, codec);
    }
}
