//! Parser run schedule: normalization of user input, next-trigger projection
//! and the human-readable preview shown next to the schedule form.
//!
//! Nothing here is ever executed. The next run is a pure function of the
//! stored parameters and the current time.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use time::{Date, Duration, Month, OffsetDateTime, Time};

use crate::clock::{
    self, fmt_dotted_date, fmt_dotted_datetime, fmt_rfc3339, truncate_to_minute, Zone,
};
use crate::error::FeedbackError;

pub const ONCE_OFFSET_MINUTES: i64 = 5;

/// Upper bound for `interval` and `endAfterOccurrences`.
pub const MAX_COUNT: u32 = 1000;

const DEFAULT_TIME_OF_DAY: &str = "09:00";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Frequency {
    Once,
    Daily,
    Weekly,
    Monthly,
}

impl Frequency {
    fn label(self) -> &'static str {
        match self {
            Frequency::Once => "Один раз",
            Frequency::Daily => "Каждый день",
            Frequency::Weekly => "Каждую неделю",
            Frequency::Monthly => "Каждый месяц",
        }
    }

    fn unit_label(self) -> &'static str {
        match self {
            Frequency::Once => "раз",
            Frequency::Daily => "день",
            Frequency::Weekly => "неделю",
            Frequency::Monthly => "месяц",
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EndType {
    #[default]
    Never,
    AfterCount,
    OnDate,
}

/// Wall-clock trigger time, minute precision.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TimeOfDay(Time);

impl TimeOfDay {
    /// Accepts `H:MM` or `HH:MM` with hours 0-23 and minutes 0-59.
    pub fn parse(input: &str) -> Option<Self> {
        let (h, m) = input.trim().split_once(':')?;
        if h.is_empty() || h.len() > 2 || m.len() != 2 {
            return None;
        }
        if !h.bytes().chain(m.bytes()).all(|b| b.is_ascii_digit()) {
            return None;
        }
        let hour: u8 = h.parse().ok()?;
        let minute: u8 = m.parse().ok()?;
        Time::from_hms(hour, minute, 0).ok().map(TimeOfDay)
    }

    pub fn of(t: OffsetDateTime) -> Self {
        TimeOfDay(truncate_to_minute(t).time())
    }

    pub fn time(self) -> Time {
        self.0
    }
}

impl std::fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:02}:{:02}", self.0.hour(), self.0.minute())
    }
}

/// Coerces a user-supplied counter into `1..=MAX_COUNT`. Missing,
/// non-finite, zero and negative values become 1; fractions round half away
/// from zero.
pub fn clamp_count(value: Option<f64>) -> u32 {
    match value {
        Some(v) if v.is_finite() && v >= 1.0 => v.round().min(MAX_COUNT as f64) as u32,
        _ => 1,
    }
}

/// Reads a counter from any JSON value. Numbers and numeric strings are
/// kept, everything else is treated as missing.
fn loose_count<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<f64>, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    })
}

/// Stored, normalized schedule.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParserSchedule {
    pub start_at: String,
    pub timezone: String,
    pub frequency: Frequency,
    pub interval: u32,
    pub time_of_day: String,
    #[serde(default)]
    pub end_type: EndType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_after_occurrences: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
}

/// Schedule as submitted by a client. Counters are loose numbers and get
/// clamped; strings are validated.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleInput {
    pub frequency: Option<Frequency>,
    #[serde(default, deserialize_with = "loose_count")]
    pub interval: Option<f64>,
    #[serde(default)]
    pub time_of_day: Option<String>,
    #[serde(default)]
    pub end_type: Option<EndType>,
    #[serde(default, deserialize_with = "loose_count")]
    pub end_after_occurrences: Option<f64>,
    #[serde(default)]
    pub end_date: Option<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NextRun {
    At(OffsetDateTime),
    /// Recurring schedule whose next trigger falls after its end date.
    EndDatePassed,
    /// One-shot schedule whose only trigger is in the past.
    AlreadyFired,
    /// Next trigger would fall outside the representable date range.
    OutOfRange,
}

impl NextRun {
    pub fn label(&self, zone: &Zone) -> String {
        match self {
            NextRun::At(t) => format!(
                "{} ({})",
                fmt_dotted_datetime(zone.local(*t)),
                zone.abbreviation
            ),
            NextRun::EndDatePassed => "Не запланирован: дата окончания уже прошла".to_string(),
            NextRun::AlreadyFired => {
                "Не запланирован: однократный запуск уже выполнен".to_string()
            }
            NextRun::OutOfRange => {
                "Не запланирован: дата запуска вне допустимого диапазона".to_string()
            }
        }
    }
}

/// Next trigger after `now`.
///
/// Recurring schedules fire today at `time_of_day` (in `now`'s offset) unless
/// that moment already passed, in which case exactly one `interval` period is
/// added. A schedule overdue by more than one period therefore still yields a
/// past timestamp. `None` when the result is not a representable date.
pub fn compute_next_run(
    frequency: Frequency,
    interval: u32,
    time_of_day: TimeOfDay,
    now: OffsetDateTime,
) -> Option<OffsetDateTime> {
    if frequency == Frequency::Once {
        return now
            .checked_add(Duration::minutes(ONCE_OFFSET_MINUTES))
            .map(truncate_to_minute);
    }

    let interval = interval.max(1) as i64;
    let candidate = now.replace_time(time_of_day.time());
    if candidate >= now {
        return Some(candidate);
    }

    match frequency {
        Frequency::Weekly => candidate.checked_add(Duration::weeks(interval)),
        Frequency::Monthly => add_months(candidate, interval),
        _ => candidate.checked_add(Duration::days(interval)),
    }
}

/// Calendar month arithmetic; the day of month is clamped to the target
/// month's length (Jan 31 + 1 month = Feb 28/29).
fn add_months(t: OffsetDateTime, months: i64) -> Option<OffsetDateTime> {
    let date = t.date();
    let index = date.year() as i64 * 12 + (u8::from(date.month()) as i64 - 1) + months;
    let year = i32::try_from(index.div_euclid(12)).ok()?;
    let month = Month::try_from(index.rem_euclid(12) as u8 + 1).ok()?;
    let day = date.day().min(time::util::days_in_year_month(year, month));
    Date::from_calendar_date(year, month, day)
        .ok()
        .map(|d| t.replace_date(d))
}

impl ParserSchedule {
    pub fn default_at(now: OffsetDateTime, zone: &Zone) -> Self {
        let input = ScheduleInput {
            frequency: Some(Frequency::Daily),
            interval: Some(1.0),
            time_of_day: Some(DEFAULT_TIME_OF_DAY.to_string()),
            end_type: Some(EndType::Never),
            ..Default::default()
        };
        Self::from_input(&input, now, zone).unwrap_or_else(|_| Self::once_at(now, zone))
    }

    fn once_at(now: OffsetDateTime, zone: &Zone) -> Self {
        let local_now = zone.local(now);
        let first = compute_next_run(Frequency::Once, 1, TimeOfDay::of(now), local_now)
            .unwrap_or_else(|| truncate_to_minute(local_now));
        Self {
            start_at: fmt_rfc3339(first),
            timezone: zone.label.clone(),
            frequency: Frequency::Once,
            interval: 1,
            time_of_day: TimeOfDay::of(first).to_string(),
            end_type: EndType::Never,
            end_after_occurrences: None,
            end_date: None,
        }
    }

    /// Normalizes client input at save time `now`.
    pub fn from_input(
        input: &ScheduleInput,
        now: OffsetDateTime,
        zone: &Zone,
    ) -> Result<Self, FeedbackError> {
        let frequency = input.frequency.unwrap_or(Frequency::Daily);
        if frequency == Frequency::Once {
            return Ok(Self::once_at(now, zone));
        }

        let local_now = zone.local(now);
        let time_of_day = match input.time_of_day.as_deref() {
            None => TimeOfDay::of(local_now),
            Some(raw) => TimeOfDay::parse(raw).ok_or(FeedbackError::InvalidSchedule {
                field: "timeOfDay",
            })?,
        };
        let interval = clamp_count(input.interval);
        let end_type = input.end_type.unwrap_or_default();

        let first = compute_next_run(frequency, interval, time_of_day, local_now)
            .ok_or(FeedbackError::InvalidSchedule { field: "interval" })?;

        let mut schedule = Self {
            start_at: fmt_rfc3339(first),
            timezone: zone.label.clone(),
            frequency,
            interval,
            time_of_day: time_of_day.to_string(),
            end_type,
            end_after_occurrences: None,
            end_date: None,
        };

        match end_type {
            EndType::Never => {}
            EndType::AfterCount => {
                schedule.end_after_occurrences = Some(clamp_count(input.end_after_occurrences));
            }
            EndType::OnDate => {
                let raw = input
                    .end_date
                    .as_deref()
                    .filter(|s| !s.trim().is_empty())
                    .ok_or(FeedbackError::InvalidSchedule { field: "endDate" })?;
                let date = end_date_in_zone(raw, zone)
                    .ok_or(FeedbackError::InvalidSchedule { field: "endDate" })?;
                schedule.end_date = Some(fmt_rfc3339(zone.end_of_day(date)));
            }
        }

        Ok(schedule)
    }

    /// Re-applies the invariants to a schedule read back from storage. Returns
    /// `None` when the stored time of day is unusable.
    pub fn renormalized(mut self) -> Option<Self> {
        let time_of_day = TimeOfDay::parse(&self.time_of_day)?;
        self.time_of_day = time_of_day.to_string();
        self.interval = self.interval.clamp(1, MAX_COUNT);

        if self.frequency == Frequency::Once {
            self.interval = 1;
            self.end_type = EndType::Never;
        }
        match self.end_type {
            EndType::Never => {
                self.end_after_occurrences = None;
                self.end_date = None;
            }
            EndType::AfterCount => {
                self.end_after_occurrences =
                    Some(self.end_after_occurrences.unwrap_or(1).clamp(1, MAX_COUNT));
                self.end_date = None;
            }
            EndType::OnDate => {
                self.end_after_occurrences = None;
                if self.end_date.as_deref().and_then(clock::parse_instant).is_none() {
                    return None;
                }
            }
        }
        Some(self)
    }

    fn parsed_time_of_day(&self) -> TimeOfDay {
        TimeOfDay::parse(&self.time_of_day)
            .or_else(|| TimeOfDay::parse(DEFAULT_TIME_OF_DAY))
            .unwrap_or(TimeOfDay(Time::MIDNIGHT))
    }

    pub fn next_run(&self, now: OffsetDateTime, zone: &Zone) -> NextRun {
        if self.frequency == Frequency::Once {
            return match clock::parse_instant(&self.start_at) {
                Some(at) if at >= now => NextRun::At(at),
                _ => NextRun::AlreadyFired,
            };
        }

        let Some(next) = compute_next_run(
            self.frequency,
            self.interval,
            self.parsed_time_of_day(),
            zone.local(now),
        ) else {
            return NextRun::OutOfRange;
        };

        if self.end_type == EndType::OnDate {
            if let Some(end) = self.end_date.as_deref().and_then(clock::parse_instant) {
                let boundary = zone.end_of_day(zone.local(end).date());
                if next > boundary {
                    return NextRun::EndDatePassed;
                }
            }
        }

        NextRun::At(next)
    }

    pub fn preview(&self, zone: &Zone) -> String {
        if self.frequency == Frequency::Once {
            return format!(
                "Запуск будет выполнен один раз через {ONCE_OFFSET_MINUTES} минут после сохранения."
            );
        }

        let end_label = match self.end_type {
            EndType::Never => "Окончание: никогда.".to_string(),
            EndType::AfterCount => format!(
                "Окончание: после {} повторений.",
                self.end_after_occurrences.unwrap_or(1).max(1)
            ),
            EndType::OnDate => match self.end_date.as_deref().and_then(clock::parse_instant) {
                Some(end) => format!("Окончание: {}.", fmt_dotted_date(zone.local(end))),
                None => "Окончание: никогда.".to_string(),
            },
        };

        format!(
            "{}, каждый {} {}, время запуска {} ({}). {}",
            self.frequency.label(),
            self.interval.max(1),
            self.frequency.unit_label(),
            self.parsed_time_of_day(),
            zone.abbreviation,
            end_label
        )
    }
}

fn end_date_in_zone(raw: &str, zone: &Zone) -> Option<Date> {
    if let Some(date) = clock::parse_calendar_date(raw) {
        return Some(date);
    }
    clock::parse_instant(raw).map(|t| zone.local(t).date())
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    fn at(hh: u8, mm: u8) -> TimeOfDay {
        TimeOfDay(Time::from_hms(hh, mm, 0).unwrap())
    }

    #[test]
    fn time_of_day_parsing() {
        assert_eq!(TimeOfDay::parse("9:05"), Some(at(9, 5)));
        assert_eq!(TimeOfDay::parse(" 23:59 "), Some(at(23, 59)));
        assert_eq!(TimeOfDay::parse("24:00"), None);
        assert_eq!(TimeOfDay::parse("12:60"), None);
        assert_eq!(TimeOfDay::parse("12:5"), None);
        assert_eq!(TimeOfDay::parse("+1:30"), None);
        assert_eq!(TimeOfDay::parse("noon"), None);
        assert_eq!(at(7, 3).to_string(), "07:03");
    }

    #[test]
    fn counters_are_clamped_not_rejected() {
        assert_eq!(clamp_count(None), 1);
        assert_eq!(clamp_count(Some(f64::NAN)), 1);
        assert_eq!(clamp_count(Some(-4.0)), 1);
        assert_eq!(clamp_count(Some(0.0)), 1);
        assert_eq!(clamp_count(Some(0.6)), 1);
        assert_eq!(clamp_count(Some(2.5)), 3);
        assert_eq!(clamp_count(Some(7.0)), 7);
        assert_eq!(clamp_count(Some(1e12)), MAX_COUNT);
        assert_eq!(clamp_count(Some(f64::INFINITY)), 1);
    }

    #[test]
    fn counters_accept_numeric_strings() {
        let input: ScheduleInput = serde_json::from_str(
            r#"{"frequency":"daily","interval":" 3 ","endAfterOccurrences":"x"}"#,
        )
        .unwrap();
        assert_eq!(input.interval, Some(3.0));
        assert_eq!(input.end_after_occurrences, None);

        let input: ScheduleInput =
            serde_json::from_str(r#"{"interval":[1],"endAfterOccurrences":null}"#).unwrap();
        assert_eq!(input.interval, None);
        assert_eq!(clamp_count(input.end_after_occurrences), 1);

        let input: ScheduleInput = serde_json::from_str(r#"{"interval":2.6}"#).unwrap();
        assert_eq!(clamp_count(input.interval), 3);
    }

    #[test]
    fn huge_steps_do_not_overflow() {
        let now = datetime!(2026-04-10 15:00 +03:00);
        for freq in [Frequency::Daily, Frequency::Weekly, Frequency::Monthly] {
            assert_eq!(compute_next_run(freq, u32::MAX, at(9, 0), now), None, "{freq:?}");
        }
    }

    #[test]
    fn huge_interval_input_is_capped() {
        let zone = Zone::moscow();
        let now = datetime!(2026-04-10 12:00 UTC);
        for freq in [Frequency::Daily, Frequency::Weekly, Frequency::Monthly] {
            let input = ScheduleInput {
                frequency: Some(freq),
                interval: Some(1e12),
                time_of_day: Some("09:00".to_string()),
                ..Default::default()
            };
            let s = ParserSchedule::from_input(&input, now, &zone).unwrap();
            assert_eq!(s.interval, MAX_COUNT);
            let start = clock::parse_instant(&s.start_at).unwrap();
            assert!(start > now, "{freq:?} start {}", s.start_at);
            assert!(matches!(
                s.next_run(now + Duration::days(1), &zone),
                NextRun::At(_)
            ));
        }
    }

    #[test]
    fn stored_oversized_interval_is_capped_on_read() {
        let stored = ParserSchedule {
            start_at: "2026-04-10T09:00:00+03:00".to_string(),
            timezone: "Europe/Moscow".to_string(),
            frequency: Frequency::Weekly,
            interval: u32::MAX,
            time_of_day: "09:00".to_string(),
            end_type: EndType::Never,
            end_after_occurrences: None,
            end_date: None,
        };
        let zone = Zone::moscow();
        let now = datetime!(2026-04-10 12:00 UTC);
        let fixed = stored.clone().renormalized().unwrap();
        assert_eq!(fixed.interval, MAX_COUNT);
        assert!(matches!(fixed.next_run(now, &zone), NextRun::At(_)));
        assert_eq!(stored.next_run(now, &zone), NextRun::OutOfRange);
        assert_eq!(
            NextRun::OutOfRange.label(&zone),
            "Не запланирован: дата запуска вне допустимого диапазона"
        );
    }

    #[test]
    fn once_is_five_minutes_out_regardless_of_inputs() {
        let now = datetime!(2026-04-10 10:17:42 +03:00);
        for (interval, tod) in [(1, at(0, 0)), (9, at(23, 59)), (3, at(10, 30))] {
            let next = compute_next_run(Frequency::Once, interval, tod, now);
            assert_eq!(next, Some(datetime!(2026-04-10 10:22 +03:00)));
        }
    }

    #[test]
    fn later_today_fires_today() {
        let now = datetime!(2026-04-10 08:00 +03:00);
        for freq in [Frequency::Daily, Frequency::Weekly, Frequency::Monthly] {
            assert_eq!(
                compute_next_run(freq, 4, at(9, 30), now),
                Some(datetime!(2026-04-10 09:30 +03:00))
            );
        }
    }

    #[test]
    fn same_minute_is_not_overdue() {
        let now = datetime!(2026-04-10 09:30 +03:00);
        assert_eq!(compute_next_run(Frequency::Daily, 1, at(9, 30), now), Some(now));
    }

    #[test]
    fn passed_time_advances_exactly_one_period() {
        let now = datetime!(2026-04-10 12:00 +03:00);
        assert_eq!(
            compute_next_run(Frequency::Daily, 3, at(9, 0), now),
            Some(datetime!(2026-04-13 09:00 +03:00))
        );
        assert_eq!(
            compute_next_run(Frequency::Weekly, 2, at(9, 0), now),
            Some(datetime!(2026-04-24 09:00 +03:00))
        );
        assert_eq!(
            compute_next_run(Frequency::Monthly, 1, at(9, 0), now),
            Some(datetime!(2026-05-10 09:00 +03:00))
        );
    }

    #[test]
    fn month_step_clamps_day() {
        let now = datetime!(2026-01-31 12:00 +03:00);
        assert_eq!(
            compute_next_run(Frequency::Monthly, 1, at(9, 0), now),
            Some(datetime!(2026-02-28 09:00 +03:00))
        );
        let now = datetime!(2026-11-30 12:00 +03:00);
        assert_eq!(
            compute_next_run(Frequency::Monthly, 3, at(9, 0), now),
            Some(datetime!(2027-02-28 09:00 +03:00))
        );
    }

    #[test]
    fn from_input_normalizes_once() {
        let zone = Zone::moscow();
        let now = datetime!(2026-04-10 07:17:42 UTC);
        let input = ScheduleInput {
            frequency: Some(Frequency::Once),
            interval: Some(12.0),
            time_of_day: Some("bogus".to_string()),
            end_type: Some(EndType::AfterCount),
            end_after_occurrences: Some(5.0),
            end_date: None,
        };
        let s = ParserSchedule::from_input(&input, now, &zone).unwrap();
        assert_eq!(s.frequency, Frequency::Once);
        assert_eq!(s.interval, 1);
        assert_eq!(s.end_type, EndType::Never);
        assert_eq!(s.end_after_occurrences, None);
        assert_eq!(s.start_at, "2026-04-10T10:22:00+03:00");
        assert_eq!(s.time_of_day, "10:22");
        assert_eq!(s.timezone, "Europe/Moscow");
    }

    #[test]
    fn from_input_recurring_with_end_date() {
        let zone = Zone::moscow();
        let now = datetime!(2026-04-10 09:00 UTC);
        let input = ScheduleInput {
            frequency: Some(Frequency::Weekly),
            interval: Some(-2.0),
            time_of_day: Some("9:15".to_string()),
            end_type: Some(EndType::OnDate),
            end_after_occurrences: None,
            end_date: Some("2026-05-01".to_string()),
        };
        let s = ParserSchedule::from_input(&input, now, &zone).unwrap();
        assert_eq!(s.interval, 1);
        assert_eq!(s.time_of_day, "09:15");
        // 12:00 local already past 09:15, one week later.
        assert_eq!(s.start_at, "2026-04-17T09:15:00+03:00");
        assert_eq!(s.end_date.as_deref(), Some("2026-05-01T23:59:59.999+03:00"));
    }

    #[test]
    fn from_input_rejects_malformed_strings() {
        let zone = Zone::moscow();
        let now = datetime!(2026-04-10 09:00 UTC);
        let bad_time = ScheduleInput {
            frequency: Some(Frequency::Daily),
            time_of_day: Some("25:00".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            ParserSchedule::from_input(&bad_time, now, &zone),
            Err(FeedbackError::InvalidSchedule { field: "timeOfDay" })
        ));

        let missing_end = ScheduleInput {
            frequency: Some(Frequency::Daily),
            time_of_day: Some("10:00".to_string()),
            end_type: Some(EndType::OnDate),
            ..Default::default()
        };
        assert!(matches!(
            ParserSchedule::from_input(&missing_end, now, &zone),
            Err(FeedbackError::InvalidSchedule { field: "endDate" })
        ));
    }

    #[test]
    fn next_run_reports_end_date_passed() {
        let zone = Zone::moscow();
        let saved = datetime!(2026-04-01 06:00 UTC);
        let input = ScheduleInput {
            frequency: Some(Frequency::Daily),
            interval: Some(1.0),
            time_of_day: Some("09:00".to_string()),
            end_type: Some(EndType::OnDate),
            end_date: Some("2026-04-05".to_string()),
            ..Default::default()
        };
        let s = ParserSchedule::from_input(&input, saved, &zone).unwrap();

        let before_end = datetime!(2026-04-05 05:00 UTC);
        assert_eq!(
            s.next_run(before_end, &zone),
            NextRun::At(datetime!(2026-04-05 09:00 +03:00))
        );

        let after_fire = datetime!(2026-04-05 07:00 UTC);
        assert_eq!(s.next_run(after_fire, &zone), NextRun::EndDatePassed);
        assert_eq!(
            NextRun::EndDatePassed.label(&zone),
            "Не запланирован: дата окончания уже прошла"
        );
    }

    #[test]
    fn once_next_run_uses_stored_start() {
        let zone = Zone::moscow();
        let saved = datetime!(2026-04-10 07:00 UTC);
        let s = ParserSchedule::from_input(
            &ScheduleInput {
                frequency: Some(Frequency::Once),
                ..Default::default()
            },
            saved,
            &zone,
        )
        .unwrap();

        let pending = s.next_run(saved, &zone);
        assert_eq!(pending, NextRun::At(datetime!(2026-04-10 07:05 UTC)));
        assert_eq!(pending.label(&zone), "10.04.2026 10:05 (МСК)");
        assert_eq!(
            s.next_run(saved + Duration::hours(1), &zone),
            NextRun::AlreadyFired
        );
    }

    #[test]
    fn previews() {
        let zone = Zone::moscow();
        let now = datetime!(2026-04-10 06:00 UTC);
        let daily = ParserSchedule::from_input(
            &ScheduleInput {
                frequency: Some(Frequency::Daily),
                interval: Some(2.0),
                time_of_day: Some("09:00".to_string()),
                ..Default::default()
            },
            now,
            &zone,
        )
        .unwrap();
        assert_eq!(
            daily.preview(&zone),
            "Каждый день, каждый 2 день, время запуска 09:00 (МСК). Окончание: никогда."
        );

        let monthly = ParserSchedule::from_input(
            &ScheduleInput {
                frequency: Some(Frequency::Monthly),
                time_of_day: Some("18:45".to_string()),
                end_type: Some(EndType::AfterCount),
                end_after_occurrences: Some(4.2),
                ..Default::default()
            },
            now,
            &zone,
        )
        .unwrap();
        assert_eq!(
            monthly.preview(&zone),
            "Каждый месяц, каждый 1 месяц, время запуска 18:45 (МСК). Окончание: после 4 повторений."
        );

        let default = ParserSchedule::default_at(now, &zone);
        assert_eq!(default.frequency, Frequency::Daily);
        assert_eq!(default.time_of_day, "09:00");
    }

    #[test]
    fn renormalized_repairs_stored_values() {
        let stored = ParserSchedule {
            start_at: "2026-04-10T10:05:00+03:00".to_string(),
            timezone: "Europe/Moscow".to_string(),
            frequency: Frequency::Once,
            interval: 7,
            time_of_day: "9:05".to_string(),
            end_type: EndType::AfterCount,
            end_after_occurrences: Some(0),
            end_date: None,
        };
        let fixed = stored.renormalized().unwrap();
        assert_eq!(fixed.interval, 1);
        assert_eq!(fixed.end_type, EndType::Never);
        assert_eq!(fixed.end_after_occurrences, None);
        assert_eq!(fixed.time_of_day, "09:05");

        let broken = ParserSchedule {
            time_of_day: "later".to_string(),
            ..fixed
        };
        assert!(broken.renormalized().is_none());
    }
}
