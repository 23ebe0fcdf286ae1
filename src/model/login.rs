//! Login codes and the school they unlock.

use serde::{Deserialize, Serialize};

use crate::date::{DateCodec, Instant};
use crate::model::EntityType;
use crate::schema::{record_fields, ParseError, RawObject, Record};

record_fields! {
    /// Fields of a [`LoginCode`].
    pub enum LoginCodeField {
        Id => ("id", "id"),
        Code => ("code", "code"),
        Date => ("date", "date"),
        SchoolId => ("schoolId", "school_id"),
    }
}

record_fields! {
    /// Fields of a [`SchoolInfo`].
    pub enum SchoolInfoField {
        Name => ("name", "name"),
        StartDate => ("startDate", "start_date"),
        EndDate => ("endDate", "end_date"),
    }
}

/// One raw authentication record. Used transiently during login.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginCode {
    pub id: String,
    pub code: String,
    pub date: Instant,
    pub school_id: String,
}

impl Record for LoginCode {
    type Field = LoginCodeField;
    const ENTITY: EntityType = EntityType::LoginCode;

    fn decode(raw: &RawObject<'_, Self::Field>, codec: &DateCodec) -> Result<Self, ParseError> {
        use LoginCodeField as F;
        Ok(Self {
            id: raw.id(F::Id)?,
            code: raw.text(F::Code)?,
            date: raw.date(F::Date, codec)?,
            school_id: raw.id(F::SchoolId)?,
        })
    }
}

/// Descriptive information about one school.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchoolInfo {
    pub name: String,
    pub start: Instant,
    pub end: Instant,
}

impl Record for SchoolInfo {
    type Field = SchoolInfoField;
    const ENTITY: EntityType = EntityType::SchoolInfo;

    fn decode(raw: &RawObject<'_, Self::Field>, codec: &DateCodec) -> Result<Self, ParseError> {
        use SchoolInfoField as F;
        Ok(Self {
            name: raw.text(F::Name)?,
            start: raw.date(F::StartDate, codec)?,
            end: raw.date(F::EndDate, codec)?,
        })
    }
}

impl SchoolInfo {
    /// Bind this info to the school id it was looked up with.
    #[must_use]
    pub fn into_session(self, school_id: String) -> SchoolSession {
        SchoolSession {
            school_id,
            name: self.name,
            start: self.start,
            end: self.end,
        }
    }
}

/// The authenticated school, kept as session configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchoolSession {
    pub school_id: String,
    pub name: String,
    pub start: Instant,
    pub end: Instant,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{parse_record, FieldKeys};
    use serde_json::json;

    #[test]
    fn test_school_info_into_session() {
        let info: SchoolInfo = parse_record(
            &json!({
                "name": "RUG Summer School",
                "startDate": "2024-07-01T00:00:00.000Z",
                "endDate": "2024-07-14T00:00:00.000Z"
            }),
            &FieldKeys::wire(),
            &DateCodec::utc(),
        )
        .unwrap();

        let session = info.into_session("S1".into());
        assert_eq!(session.school_id, "S1");
        assert_eq!(session.name, "RUG Summer School");
        assert!(session.start < session.end);
    }

    #[test]
    fn test_school_info_needs_dates() {
        let err = parse_record::<SchoolInfo>(
            &json!({ "name": "RUG Summer School", "startDate": "2024-07-01T00:00:00.000Z" }),
            &FieldKeys::wire(),
            &DateCodec::utc(),
        )
        .unwrap_err();
        assert!(matches!(err, ParseError::MissingField { ref key, .. } if key == "endDate"));
    }

    #[test]
    fn test_login_code_record() {
        let code: LoginCode = parse_record(
            &json!({
                "id": 5,
                "code": "AB12CD34",
                "date": "2024-06-01T10:00:00.000Z",
                "schoolId": 9
            }),
            &FieldKeys::wire(),
            &DateCodec::utc(),
        )
        .unwrap();
        assert_eq!(code.school_id, "9");
    }
}
