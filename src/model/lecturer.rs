//! Lecturer profiles.

use serde::Serialize;

use crate::date::DateCodec;
use crate::model::{EntityType, ImageBearing};
use crate::schema::{
    record_fields, Cached, ParseError, RawBuilder, RawObject, Record, RemappableField,
};

record_fields! {
    /// Fields of a [`Lecturer`].
    pub enum LecturerField {
        Id => ("id", "id"),
        Name => ("name", "name"),
        Body => ("body", "body"),
        Website => ("website", "website"),
        ImagePath => ("imagePath", "image_path"),
    }
}

impl RemappableField for LecturerField {}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Lecturer {
    pub id: String,
    pub name: String,
    pub body: String,
    pub website: Option<String>,
    pub image_path: Option<String>,
    /// Portrait bytes, fetched after the collection is committed.
    #[serde(skip)]
    pub image: Option<Vec<u8>>,
}

impl Record for Lecturer {
    type Field = LecturerField;
    const ENTITY: EntityType = EntityType::Lecturer;

    fn decode(raw: &RawObject<'_, Self::Field>, _codec: &DateCodec) -> Result<Self, ParseError> {
        use LecturerField as F;
        Ok(Self {
            id: raw.id(F::Id)?,
            name: raw.text(F::Name)?,
            body: raw.text(F::Body)?,
            website: raw.optional_text(F::Website),
            image_path: raw.optional_text(F::ImagePath),
            image: None,
        })
    }
}

impl Cached for Lecturer {
    fn encode(&self, out: &mut RawBuilder<'_, Self::Field>, _codec: &DateCodec) {
        use LecturerField as F;
        out.text(F::Id, &self.id)
            .text(F::Name, &self.name)
            .text(F::Body, &self.body)
            .optional_text(F::Website, self.website.as_deref())
            .optional_text(F::ImagePath, self.image_path.as_deref());
    }
}

impl ImageBearing for Lecturer {
    fn image_path(&self) -> Option<&str> {
        self.image_path.as_deref()
    }

    fn set_image(&mut self, bytes: Vec<u8>) {
        self.image = Some(bytes);
    }

    fn has_image(&self) -> bool {
        self.image.is_some()
    }
}
