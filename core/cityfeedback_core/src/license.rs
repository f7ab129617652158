//! Simulated license activation. Status and usage are derived from the key's
//! own characters; there is no gateway behind this.

use serde::{Deserialize, Serialize};
use time::{Duration, OffsetDateTime};
use tokio::sync::broadcast;
use tracing::{debug, info};

use crate::clock::fmt_rfc3339;
use crate::error::FeedbackError;
use crate::report::char_code_sum;
use crate::store::{read_json, write_json, KeyValueStore, LICENSE_KEY};

pub const MONTHLY_LIMIT: u32 = 500;

const KEY_MIN_LEN: usize = 10;
const KEY_MAX_LEN: usize = 40;
const VALIDITY_DAYS: i64 = 60;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LicenseStatus {
    NotActivated,
    Active,
    Expired,
    Suspended,
    LimitExceeded,
    GatewayUnavailable,
}

/// Public license view. Only ever carries the masked key.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LicenseInfo {
    pub masked_key: Option<String>,
    pub status: LicenseStatus,
    pub expires_at: Option<String>,
    pub monthly_usage: u32,
    pub monthly_limit: u32,
    pub checked_at: String,
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredLicense {
    raw_key: Option<String>,
    #[serde(flatten)]
    info: LicenseInfo,
}

/// Receives every successful activation.
pub trait LicenseNotifier: Send + Sync {
    fn license_updated(&self, info: &LicenseInfo);
}

/// In-process fan-out of license updates; the API exposes it as an SSE feed.
pub struct BroadcastNotifier {
    tx: broadcast::Sender<LicenseInfo>,
}

impl BroadcastNotifier {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<LicenseInfo> {
        self.tx.subscribe()
    }
}

impl LicenseNotifier for BroadcastNotifier {
    fn license_updated(&self, info: &LicenseInfo) {
        // Err only means nobody is listening right now.
        if self.tx.send(info.clone()).is_err() {
            debug!("license update dropped: no subscribers");
        }
    }
}

/// Trimmed, upper-cased key if it matches `[A-Z0-9-]{10,40}`.
pub fn normalize_key(key: &str) -> Option<String> {
    let key = key.trim().to_uppercase();
    let len = key.chars().count();
    let charset_ok = key
        .chars()
        .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '-');
    (charset_ok && (KEY_MIN_LEN..=KEY_MAX_LEN).contains(&len)).then_some(key)
}

/// Sentinel words embedded in a key select the simulated outcome.
pub fn detect_status(key: &str) -> LicenseStatus {
    let key = key.to_uppercase();
    if key.contains("EXPIRED") {
        LicenseStatus::Expired
    } else if key.contains("SUSPEND") {
        LicenseStatus::Suspended
    } else if key.contains("LIMIT") {
        LicenseStatus::LimitExceeded
    } else if key.contains("OFFLINE") {
        LicenseStatus::GatewayUnavailable
    } else {
        LicenseStatus::Active
    }
}

/// Usage in `[120, 399]`, capped at `limit`.
pub fn usage_from_key(key: &str, limit: u32) -> u32 {
    let checksum = char_code_sum(key);
    (checksum.rem_euclid(280) as u32 + 120).min(limit)
}

pub fn mask_key(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    let n = chars.len();
    let head = |k: usize| chars[..k.min(n)].iter().collect::<String>();
    let tail = |k: usize| chars[n.saturating_sub(k)..].iter().collect::<String>();

    if n <= 8 {
        return format!("{}****{}", head(2), tail(2));
    }
    format!(
        "{}-{}-{}",
        head(4),
        "*".repeat(n.saturating_sub(8).max(4)),
        tail(4)
    )
}

fn not_activated(now: OffsetDateTime) -> LicenseInfo {
    LicenseInfo {
        masked_key: None,
        status: LicenseStatus::NotActivated,
        expires_at: None,
        monthly_usage: 0,
        monthly_limit: MONTHLY_LIMIT,
        checked_at: fmt_rfc3339(now),
    }
}

pub fn fetch(store: &dyn KeyValueStore, now: OffsetDateTime) -> LicenseInfo {
    read_json::<StoredLicense>(store, LICENSE_KEY)
        .map(|stored| stored.info)
        .unwrap_or_else(|| not_activated(now))
}

pub fn activate(
    store: &dyn KeyValueStore,
    notifier: &dyn LicenseNotifier,
    key: &str,
    now: OffsetDateTime,
) -> Result<LicenseInfo, FeedbackError> {
    let key = normalize_key(key).ok_or(FeedbackError::InvalidLicenseKey)?;

    let status = detect_status(&key);
    let monthly_usage = if status == LicenseStatus::LimitExceeded {
        MONTHLY_LIMIT
    } else {
        usage_from_key(&key, MONTHLY_LIMIT)
    };
    let expires_at = if status == LicenseStatus::Expired {
        now - Duration::days(1)
    } else {
        now + Duration::days(VALIDITY_DAYS)
    };

    let info = LicenseInfo {
        masked_key: Some(mask_key(&key)),
        status,
        expires_at: Some(fmt_rfc3339(expires_at)),
        monthly_usage,
        monthly_limit: MONTHLY_LIMIT,
        checked_at: fmt_rfc3339(now),
    };

    write_json(
        store,
        LICENSE_KEY,
        &StoredLicense {
            raw_key: Some(key),
            info: info.clone(),
        },
    )?;
    info!(
        "license activated: {} ({:?}, usage {}/{})",
        info.masked_key.as_deref().unwrap_or_default(),
        info.status,
        info.monthly_usage,
        info.monthly_limit
    );

    notifier.license_updated(&info);
    Ok(info)
}
