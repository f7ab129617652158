use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};
use serde_json::json;
use time::{Duration, OffsetDateTime};
use tracing::{info, warn};

use crate::clock::{fmt_rfc3339, parse_instant};
use crate::error::FeedbackError;
use crate::store::{write_json, KeyValueStore, SESSION_KEY};

pub const SESSION_TTL_HOURS: i64 = 8;

/// The single administrator account.
#[derive(Clone, Debug)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Default for Credentials {
    fn default() -> Self {
        Self {
            username: "admin".to_string(),
            password: "admin123".to_string(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSession {
    pub token: String,
    pub username: String,
    pub expires_at: String,
}

impl UserSession {
    fn is_live(&self, now: OffsetDateTime) -> bool {
        parse_instant(&self.expires_at).is_some_and(|exp| exp > now)
    }
}

/// Opaque bearer token shaped like a JWT; it is not signed or verified.
fn mock_token(username: &str, now: OffsetDateTime) -> String {
    let payload = json!({
        "sub": username,
        "role": "admin",
        "iat": now.unix_timestamp() * 1000 + now.millisecond() as i64,
    });
    format!("mock.{}.signature", STANDARD.encode(payload.to_string()))
}

pub fn login(
    store: &dyn KeyValueStore,
    credentials: &Credentials,
    username: &str,
    password: &str,
    now: OffsetDateTime,
) -> Result<UserSession, FeedbackError> {
    let username = username.trim();
    if username != credentials.username || password != credentials.password {
        warn!("login rejected for '{username}'");
        return Err(FeedbackError::InvalidCredentials);
    }

    let session = UserSession {
        token: mock_token(username, now),
        username: username.to_string(),
        expires_at: fmt_rfc3339(now + Duration::hours(SESSION_TTL_HOURS)),
    };
    write_json(store, SESSION_KEY, &session)?;
    info!("session opened for '{username}' until {}", session.expires_at);
    Ok(session)
}

/// Stored session if it is still valid. Expired or undecodable entries are
/// deleted on the way out.
pub fn current(store: &dyn KeyValueStore, now: OffsetDateTime) -> Option<UserSession> {
    let raw = match store.get(SESSION_KEY) {
        Ok(Some(raw)) => raw,
        Ok(None) => return None,
        Err(err) => {
            warn!("session read failed: {err}");
            return None;
        }
    };

    match serde_json::from_str::<UserSession>(&raw) {
        Ok(session) if session.is_live(now) => Some(session),
        Ok(_) => {
            info!("session expired");
            discard(store);
            None
        }
        Err(err) => {
            warn!("stored session is not valid json: {err}");
            discard(store);
            None
        }
    }
}

fn discard(store: &dyn KeyValueStore) {
    if let Err(err) = store.remove(SESSION_KEY) {
        warn!("session cleanup failed: {err}");
    }
}

pub fn logout(store: &dyn KeyValueStore) -> Result<(), FeedbackError> {
    store.remove(SESSION_KEY)?;
    info!("session closed");
    Ok(())
}

/// Resolves a bearer token to the live session it belongs to.
pub fn authorize(
    store: &dyn KeyValueStore,
    token: Option<&str>,
    now: OffsetDateTime,
) -> Result<UserSession, FeedbackError> {
    let token = token.ok_or(FeedbackError::Unauthorized)?;
    current(store, now)
        .filter(|s| s.token == token)
        .ok_or(FeedbackError::Unauthorized)
}
