//! Timestamp conversion between text and [`Instant`].
//!
//! Every conversion goes through a named [`DateFormat`] profile. The profile
//! table is the only place a pattern lives, so supporting another wire format
//! means adding a variant and a table row.
//!
//! Profiles come in two flavors:
//! - **Offset-bearing** (`Wire`): the text carries its own UTC offset.
//! - **Zone-naive** (`Presentation`, `Compact`, `HoursMinutes`): the text is a
//!   calendar reading in the codec's display zone.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, Offset, TimeZone, Utc};

/// Internal timestamp type used by every record.
pub type Instant = DateTime<Utc>;

/// Closed set of textual timestamp profiles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DateFormat {
    /// ISO-8601 with milliseconds and offset: `2024-07-01T09:30:00.000+00:00`.
    /// A trailing `Z` is accepted when parsing.
    Wire,
    /// Long display form: `Monday 1 July 2024, 09:30`.
    Presentation,
    /// Day-first short date: `01-07-2024`.
    Compact,
    /// Time of day: `09:30`.
    HoursMinutes,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Layout {
    Offset,
    LocalDateTime,
    LocalDate,
    LocalTime,
}

struct Profile {
    pattern: &'static str,
    layout: Layout,
}

impl DateFormat {
    /// All profiles, in declaration order.
    pub const ALL: [Self; 4] = [
        Self::Wire,
        Self::Presentation,
        Self::Compact,
        Self::HoursMinutes,
    ];

    const fn profile(self) -> Profile {
        match self {
            Self::Wire => Profile {
                pattern: "%Y-%m-%dT%H:%M:%S%.3f%:z",
                layout: Layout::Offset,
            },
            Self::Presentation => Profile {
                pattern: "%A %-d %B %Y, %H:%M",
                layout: Layout::LocalDateTime,
            },
            Self::Compact => Profile {
                pattern: "%d-%m-%Y",
                layout: Layout::LocalDate,
            },
            Self::HoursMinutes => Profile {
                pattern: "%H:%M",
                layout: Layout::LocalTime,
            },
        }
    }

    /// The chrono pattern behind this profile.
    #[must_use]
    pub const fn pattern(self) -> &'static str {
        self.profile().pattern
    }

    /// Whether the text carries its own offset.
    #[must_use]
    pub const fn is_zoned(self) -> bool {
        matches!(self.profile().layout, Layout::Offset)
    }
}

/// Two-way converter for [`DateFormat`] profiles.
///
/// Zone-naive profiles are read and written in `zone`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateCodec {
    zone: FixedOffset,
}

impl Default for DateCodec {
    fn default() -> Self {
        Self::utc()
    }
}

impl DateCodec {
    /// Codec whose display zone is UTC.
    #[must_use]
    pub fn utc() -> Self {
        Self {
            zone: Utc.fix(),
        }
    }

    /// Codec with an explicit display zone.
    #[must_use]
    pub const fn with_zone(zone: FixedOffset) -> Self {
        Self { zone }
    }

    /// Codec with a display zone given in whole minutes east of UTC.
    ///
    /// Returns `None` when the offset is out of range.
    #[must_use]
    pub fn with_offset_minutes(minutes: i32) -> Option<Self> {
        FixedOffset::east_opt(minutes.checked_mul(60)?).map(Self::with_zone)
    }

    /// Display zone for zone-naive profiles.
    #[must_use]
    pub const fn zone(&self) -> FixedOffset {
        self.zone
    }

    /// Parse `text` with the named profile.
    ///
    /// Returns `None` when the text does not match the profile. Time-only
    /// profiles are anchored on 2000-01-01 in the display zone.
    #[must_use]
    pub fn parse(&self, text: &str, format: DateFormat) -> Option<Instant> {
        let profile = format.profile();

        match profile.layout {
            Layout::Offset => {
                let normalized = normalize_zulu(text);
                DateTime::parse_from_str(&normalized, profile.pattern)
                    .ok()
                    .map(|dt| dt.with_timezone(&Utc))
            }
            Layout::LocalDateTime => NaiveDateTime::parse_from_str(text, profile.pattern)
                .ok()
                .and_then(|naive| self.localize(naive)),
            Layout::LocalDate => NaiveDate::parse_from_str(text, profile.pattern)
                .ok()
                .and_then(|day| day.and_hms_opt(0, 0, 0))
                .and_then(|naive| self.localize(naive)),
            Layout::LocalTime => NaiveTime::parse_from_str(text, profile.pattern)
                .ok()
                .and_then(|time| self.localize(time_anchor().and_time(time))),
        }
    }

    /// Render an instant with the named profile.
    #[must_use]
    pub fn render(&self, instant: &Instant, format: DateFormat) -> String {
        let profile = format.profile();
        match profile.layout {
            Layout::Offset => instant.format(profile.pattern).to_string(),
            _ => instant
                .with_timezone(&self.zone)
                .format(profile.pattern)
                .to_string(),
        }
    }

    /// Render an optional instant; `None` in gives `None` out.
    #[must_use]
    pub fn format(&self, instant: Option<&Instant>, format: DateFormat) -> Option<String> {
        instant.map(|i| self.render(i, format))
    }

    fn localize(&self, naive: NaiveDateTime) -> Option<Instant> {
        self.zone
            .from_local_datetime(&naive)
            .single()
            .map(|dt| dt.with_timezone(&Utc))
    }
}

fn time_anchor() -> NaiveDate {
    NaiveDate::from_ymd_opt(2000, 1, 1).unwrap_or(NaiveDate::MIN)
}

/// `...Z` → `...+00:00` so one pattern covers both spellings of UTC.
fn normalize_zulu(text: &str) -> std::borrow::Cow<'_, str> {
    match text.strip_suffix('Z').or_else(|| text.strip_suffix('z')) {
        Some(stem) => format!("{stem}+00:00").into(),
        None => text.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Duration, Timelike};

    fn at(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32, ms: u32) -> Instant {
        Utc.with_ymd_and_hms(y, mo, d, h, mi, s).unwrap() + Duration::milliseconds(i64::from(ms))
    }

    #[test]
    fn test_wire_parses_zulu_and_offsets() {
        let codec = DateCodec::utc();

        let zulu = codec.parse("2024-07-01T09:30:00.123Z", DateFormat::Wire).unwrap();
        assert_eq!(zulu, at(2024, 7, 1, 9, 30, 0, 123));

        let shifted = codec
            .parse("2024-07-01T11:30:00.123+02:00", DateFormat::Wire)
            .unwrap();
        assert_eq!(shifted, zulu);
    }

    #[test]
    fn test_wire_rejects_other_shapes() {
        let codec = DateCodec::utc();
        assert!(codec.parse("2024-07-01", DateFormat::Wire).is_none());
        assert!(codec.parse("not a date", DateFormat::Wire).is_none());
        assert!(codec.parse("", DateFormat::Wire).is_none());
        assert!(codec.parse("01-07-2024", DateFormat::Wire).is_none());
    }

    #[test]
    fn test_trailing_text_does_not_match() {
        let codec = DateCodec::utc();
        assert!(codec.parse("2024-07-01T10:00:00.000Z ", DateFormat::Wire).is_none());
        assert!(codec.parse("2024-07-01T10:00:00.000Z\n", DateFormat::Wire).is_none());
        assert!(codec.parse("14-07-2024 ", DateFormat::Compact).is_none());
        assert!(codec.parse("13:45 ", DateFormat::HoursMinutes).is_none());
    }

    #[test]
    fn test_wire_round_trip_keeps_milliseconds() {
        let codec = DateCodec::utc();
        let instant = at(2023, 12, 31, 23, 59, 59, 999);
        let text = codec.render(&instant, DateFormat::Wire);
        assert_eq!(text, "2023-12-31T23:59:59.999+00:00");
        assert_eq!(codec.parse(&text, DateFormat::Wire), Some(instant));
    }

    #[test]
    fn test_presentation_round_trip_in_display_zone() {
        let codec = DateCodec::with_offset_minutes(120).unwrap();
        let instant = at(2024, 7, 1, 7, 30, 0, 0);

        let text = codec.render(&instant, DateFormat::Presentation);
        assert_eq!(text, "Monday 1 July 2024, 09:30");
        assert_eq!(codec.parse(&text, DateFormat::Presentation), Some(instant));
    }

    #[test]
    fn test_compact_round_trip_at_day_precision() {
        let codec = DateCodec::utc();
        let midnight = at(2024, 7, 14, 0, 0, 0, 0);

        let text = codec.render(&midnight, DateFormat::Compact);
        assert_eq!(text, "14-07-2024");
        assert_eq!(codec.parse(&text, DateFormat::Compact), Some(midnight));
    }

    #[test]
    fn test_hours_minutes_keeps_time_of_day() {
        let codec = DateCodec::with_offset_minutes(-300).unwrap();
        let instant = at(2024, 7, 1, 18, 45, 0, 0);

        let text = codec.render(&instant, DateFormat::HoursMinutes);
        assert_eq!(text, "13:45");

        let parsed = codec.parse(&text, DateFormat::HoursMinutes).unwrap();
        let local = parsed.with_timezone(&codec.zone());
        assert_eq!((local.hour(), local.minute()), (13, 45));
        assert_eq!(local.year(), 2000);
    }

    #[test]
    fn test_format_absent_instant() {
        let codec = DateCodec::utc();
        assert_eq!(codec.format(None, DateFormat::Compact), None);
        let instant = at(2024, 1, 2, 0, 0, 0, 0);
        assert_eq!(
            codec.format(Some(&instant), DateFormat::Compact),
            Some("02-01-2024".to_string())
        );
    }

    #[test]
    fn test_only_wire_is_zoned() {
        let zoned: Vec<_> = DateFormat::ALL.iter().filter(|f| f.is_zoned()).collect();
        assert_eq!(zoned, vec![&DateFormat::Wire]);
    }

    #[test]
    fn test_offset_out_of_range() {
        assert!(DateCodec::with_offset_minutes(24 * 60).is_none());
    }
}
