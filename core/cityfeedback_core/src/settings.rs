use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use tracing::info;

use crate::clock::Zone;
use crate::error::FeedbackError;
use crate::schedule::{ParserSchedule, ScheduleInput};
use crate::store::{read_json, write_json, KeyValueStore, SETTINGS_KEY};

const DEFAULT_SOURCE: &str = "https://vk.com/city_official";
const DEFAULT_RECIPIENT: &str = "moderator@cityfeedback.local";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppSettings {
    pub data_sources: Vec<String>,
    pub report_emails: Vec<String>,
    pub parser_schedule: ParserSchedule,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsUpdate {
    #[serde(default, alias = "vkSources")]
    pub data_sources: Vec<String>,
    #[serde(default)]
    pub report_emails: Vec<String>,
    #[serde(default)]
    pub parser_schedule: ScheduleInput,
}

/// Lenient view of what may be sitting in storage.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredSettings {
    #[serde(default, alias = "vkSources")]
    data_sources: Vec<String>,
    #[serde(default)]
    report_emails: Vec<String>,
    #[serde(default)]
    parser_schedule: Option<ParserSchedule>,
}

pub fn default_settings(now: OffsetDateTime, zone: &Zone) -> AppSettings {
    AppSettings {
        data_sources: vec![DEFAULT_SOURCE.to_string()],
        report_emails: vec![DEFAULT_RECIPIENT.to_string()],
        parser_schedule: ParserSchedule::default_at(now, zone),
    }
}

/// Trims every entry and drops the empty ones, preserving order.
pub fn normalize_list(items: &[String]) -> Vec<String> {
    items
        .iter()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Current settings. Never fails: missing or unreadable data yields the
/// defaults, and a stored schedule that no longer validates is replaced by
/// the default schedule.
pub fn load(store: &dyn KeyValueStore, now: OffsetDateTime, zone: &Zone) -> AppSettings {
    let Some(stored) = read_json::<StoredSettings>(store, SETTINGS_KEY) else {
        return default_settings(now, zone);
    };

    AppSettings {
        data_sources: normalize_list(&stored.data_sources),
        report_emails: normalize_list(&stored.report_emails),
        parser_schedule: stored
            .parser_schedule
            .and_then(ParserSchedule::renormalized)
            .unwrap_or_else(|| ParserSchedule::default_at(now, zone)),
    }
}

/// Normalizes and persists `update`, returning what was stored.
pub fn save(
    store: &dyn KeyValueStore,
    update: &SettingsUpdate,
    now: OffsetDateTime,
    zone: &Zone,
) -> Result<AppSettings, FeedbackError> {
    let settings = AppSettings {
        data_sources: normalize_list(&update.data_sources),
        report_emails: normalize_list(&update.report_emails),
        parser_schedule: ParserSchedule::from_input(&update.parser_schedule, now, zone)?,
    };
    write_json(store, SETTINGS_KEY, &settings)?;
    info!(
        "settings saved: {} sources, {} recipients, {:?} schedule",
        settings.data_sources.len(),
        settings.report_emails.len(),
        settings.parser_schedule.frequency
    );
    Ok(settings)
}
