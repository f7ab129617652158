use time::{
    format_description::well_known::Rfc3339, macros::format_description, Date, Duration,
    OffsetDateTime, Time, UtcOffset,
};

const TZ_OFFSET_MINUTES_MIN: i32 = -14 * 60;
const TZ_OFFSET_MINUTES_MAX: i32 = 14 * 60;

/// The fixed-offset zone schedules and report dates are expressed in.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Zone {
    pub offset: UtcOffset,
    /// IANA-style label stored alongside schedules, e.g. `Europe/Moscow`.
    pub label: String,
    /// Short suffix used in human-readable output, e.g. `МСК`.
    pub abbreviation: String,
}

impl Zone {
    pub fn from_minutes(minutes: i32, label: &str, abbreviation: &str) -> Self {
        let minutes = minutes.clamp(TZ_OFFSET_MINUTES_MIN, TZ_OFFSET_MINUTES_MAX);
        Self {
            offset: UtcOffset::from_whole_seconds(minutes.saturating_mul(60))
                .unwrap_or(UtcOffset::UTC),
            label: label.to_string(),
            abbreviation: abbreviation.to_string(),
        }
    }

    pub fn moscow() -> Self {
        Self::from_minutes(3 * 60, "Europe/Moscow", "МСК")
    }

    pub fn local(&self, t: OffsetDateTime) -> OffsetDateTime {
        t.to_offset(self.offset)
    }

    /// Last representable millisecond of `date` in this zone.
    pub fn end_of_day(&self, date: Date) -> OffsetDateTime {
        let end = Time::from_hms_milli(23, 59, 59, 999).unwrap_or(Time::MIDNIGHT);
        date.with_time(end).assume_offset(self.offset)
    }
}

/// Accepts an RFC 3339 timestamp or a bare `YYYY-MM-DD` date (read as UTC
/// midnight).
pub fn parse_instant(input: &str) -> Option<OffsetDateTime> {
    let input = input.trim();
    if let Ok(t) = OffsetDateTime::parse(input, &Rfc3339) {
        return Some(t);
    }
    parse_calendar_date(input).map(|d| d.midnight().assume_utc())
}

pub fn parse_calendar_date(input: &str) -> Option<Date> {
    Date::parse(input.trim(), format_description!("[year]-[month]-[day]")).ok()
}

pub fn truncate_to_minute(t: OffsetDateTime) -> OffsetDateTime {
    t - Duration::seconds(t.second() as i64) - Duration::nanoseconds(t.nanosecond() as i64)
}

pub fn fmt_rfc3339(t: OffsetDateTime) -> String {
    t.format(&Rfc3339).unwrap_or_default()
}

/// `DD.MM.YYYY HH:mm`
pub fn fmt_dotted_datetime(t: OffsetDateTime) -> String {
    t.format(format_description!(
        "[day].[month].[year] [hour]:[minute]"
    ))
    .unwrap_or_default()
}

/// `DD.MM.YYYY`
pub fn fmt_dotted_date(t: OffsetDateTime) -> String {
    t.format(format_description!("[day].[month].[year]"))
        .unwrap_or_default()
}

/// `DD/MM/YYYY HH:mm`
pub fn fmt_slashed_datetime(t: OffsetDateTime) -> String {
    t.format(format_description!(
        "[day]/[month]/[year] [hour]:[minute]"
    ))
    .unwrap_or_default()
}

/// `YYYYMMDD-HHmm`
pub fn fmt_compact_stamp(t: OffsetDateTime) -> String {
    t.format(format_description!("[year][month][day]-[hour][minute]"))
        .unwrap_or_default()
}
