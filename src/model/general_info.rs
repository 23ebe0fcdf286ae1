//! Practical information items (food, location, internet, ...).

use serde::Serialize;

use crate::date::{DateCodec, Instant};
use crate::model::EntityType;
use crate::schema::{record_fields, Cached, ParseError, RawBuilder, RawObject, Record};

record_fields! {
    /// Fields of a [`GeneralInfoItem`]. Wire keys are fixed.
    pub enum GeneralInfoField {
        Id => ("id", "id"),
        Title => ("title", "title"),
        Description => ("description", "description"),
        Category => ("category", "category"),
        Date => ("date", "date"),
    }
}

/// Information category, carried on the wire as an ordinal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Food,
    Location,
    Internet,
    Accommodation,
    Information,
}

impl Category {
    #[must_use]
    pub const fn from_ordinal(ordinal: i64) -> Option<Self> {
        match ordinal {
            0 => Some(Self::Food),
            1 => Some(Self::Location),
            2 => Some(Self::Internet),
            3 => Some(Self::Accommodation),
            4 => Some(Self::Information),
            _ => None,
        }
    }

    #[must_use]
    pub const fn ordinal(self) -> i64 {
        match self {
            Self::Food => 0,
            Self::Location => 1,
            Self::Internet => 2,
            Self::Accommodation => 3,
            Self::Information => 4,
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Food => "Food",
            Self::Location => "Location",
            Self::Internet => "Internet",
            Self::Accommodation => "Accommodation",
            Self::Information => "Information",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GeneralInfoItem {
    pub id: String,
    pub title: String,
    pub description: String,
    pub category: Category,
    pub date: Instant,
}

impl Record for GeneralInfoItem {
    type Field = GeneralInfoField;
    const ENTITY: EntityType = EntityType::GeneralInfo;

    fn decode(raw: &RawObject<'_, Self::Field>, codec: &DateCodec) -> Result<Self, ParseError> {
        use GeneralInfoField as F;
        let ordinal = raw.integer(F::Category)?;
        let category = Category::from_ordinal(ordinal).ok_or(ParseError::UnknownCategory {
            entity: raw.entity(),
            ordinal,
        })?;

        Ok(Self {
            id: raw.id(F::Id)?,
            title: raw.text(F::Title)?,
            description: raw.text(F::Description)?,
            category,
            date: raw.date(F::Date, codec)?,
        })
    }
}

impl Cached for GeneralInfoItem {
    fn encode(&self, out: &mut RawBuilder<'_, Self::Field>, codec: &DateCodec) {
        use GeneralInfoField as F;
        out.text(F::Id, &self.id)
            .text(F::Title, &self.title)
            .text(F::Description, &self.description)
            .integer(F::Category, self.category.ordinal())
            .date(F::Date, &self.date, codec);
    }
}
