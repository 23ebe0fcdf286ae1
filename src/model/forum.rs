//! Discussion forum threads and comments.

use serde::Serialize;

use crate::date::{DateCodec, Instant};
use crate::model::{EntityType, ImageBearing};
use crate::schema::{
    record_fields, Cached, ParseError, RawBuilder, RawObject, Record, RemappableField,
};

record_fields! {
    /// Fields of a [`ForumThread`].
    pub enum ForumThreadField {
        Id => ("id", "id"),
        SchoolId => ("schoolId", "school_id"),
        Title => ("title", "title"),
        Author => ("author", "author"),
        AuthorId => ("authorId", "author_id"),
        Date => ("date", "date"),
        Body => ("body", "body"),
        ImagePath => ("imagePath", "image_path"),
        CommentCount => ("commentCount", "comment_count"),
        Comments => ("comments", "comments"),
    }
}

impl RemappableField for ForumThreadField {}

record_fields! {
    /// Fields of a [`ForumComment`].
    pub enum ForumCommentField {
        Id => ("id", "id"),
        Author => ("author", "author"),
        AuthorId => ("authorId", "author_id"),
        Body => ("body", "body"),
        Date => ("date", "date"),
        ImagePath => ("imagePath", "image_path"),
    }
}

impl RemappableField for ForumCommentField {}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ForumThread {
    pub id: String,
    pub school_id: String,
    pub title: String,
    pub author: String,
    pub author_id: String,
    pub date: Instant,
    pub body: Option<String>,
    pub image_path: Option<String>,
    pub comment_count: u32,
    /// Author avatar bytes, fetched after the collection is committed.
    #[serde(skip)]
    pub image: Option<Vec<u8>>,
}

impl Record for ForumThread {
    type Field = ForumThreadField;
    const ENTITY: EntityType = EntityType::ForumThread;

    fn decode(raw: &RawObject<'_, Self::Field>, codec: &DateCodec) -> Result<Self, ParseError> {
        use ForumThreadField as F;

        // A stored count wins; otherwise count the embedded comments.
        let comment_count = match raw.optional_integer(F::CommentCount)? {
            Some(n) => u32::try_from(n).map_err(|_| raw.invalid(F::CommentCount, "non-negative integer"))?,
            None => raw
                .array_len(F::Comments)
                .and_then(|n| u32::try_from(n).ok())
                .ok_or_else(|| raw.absent(F::CommentCount))?,
        };

        Ok(Self {
            id: raw.id(F::Id)?,
            school_id: raw.id(F::SchoolId)?,
            title: raw.text(F::Title)?,
            author: raw.text(F::Author)?,
            author_id: raw.id(F::AuthorId)?,
            date: raw.date(F::Date, codec)?,
            body: raw.optional_text(F::Body),
            image_path: raw.optional_text(F::ImagePath),
            comment_count,
            image: None,
        })
    }
}

impl Cached for ForumThread {
    fn encode(&self, out: &mut RawBuilder<'_, Self::Field>, codec: &DateCodec) {
        use ForumThreadField as F;
        out.text(F::Id, &self.id)
            .text(F::SchoolId, &self.school_id)
            .text(F::Title, &self.title)
            .text(F::Author, &self.author)
            .text(F::AuthorId, &self.author_id)
            .date(F::Date, &self.date, codec)
            .optional_text(F::Body, self.body.as_deref())
            .optional_text(F::ImagePath, self.image_path.as_deref())
            .integer(F::CommentCount, i64::from(self.comment_count));
    }
}

impl ImageBearing for ForumThread {
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

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ForumComment {
    pub id: String,
    pub author: String,
    pub author_id: String,
    pub body: String,
    pub date: Instant,
    pub image_path: Option<String>,
}

impl Record for ForumComment {
    type Field = ForumCommentField;
    const ENTITY: EntityType = EntityType::ForumComment;

    fn decode(raw: &RawObject<'_, Self::Field>, codec: &DateCodec) -> Result<Self, ParseError> {
        use ForumCommentField as F;
        Ok(Self {
            id: raw.id(F::Id)?,
            author: raw.text(F::Author)?,
            author_id: raw.id(F::AuthorId)?,
            body: raw.text(F::Body)?,
            date: raw.date(F::Date, codec)?,
            image_path: raw.optional_text(F::ImagePath),
        })
    }
}
