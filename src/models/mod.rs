use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

pub mod email;

pub use email::Email;

/// Timestamp format shared by watch events and group-watch entries.
///
/// Second granularity: two events falling in the same second format to the
/// same string, which is what makes the watch-history dedup key work.
pub const TIMESTAMP_FORMAT: &str = "%d-%m-%Y %H:%M:%S";

pub fn format_timestamp(t: NaiveDateTime) -> String {
    t.format(TIMESTAMP_FORMAT).to_string()
}

/// Parses a stored timestamp string. Returns `None` for malformed input so
/// callers can skip the offending record instead of failing the whole read.
pub fn parse_timestamp(s: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(s, TIMESTAMP_FORMAT).ok()
}

/// A registered account. Immutable after creation: there are no update or
/// delete paths.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct Account {
    pub username: String,
    pub name: String,
    pub password_hash: String,
}

/// A pending email-verification challenge, keyed by `(email, username)`.
/// At most one live code per key; re-issuing overwrites the code in place.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct OtpChallenge {
    pub email: String,
    pub username: String,
    pub code: String,
}

/// One watched-media event. Equality over the full triple (including the
/// formatted timestamp) is the dedup key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WatchEvent {
    pub media_kind: String,
    pub media_id: String,
    pub created_at: String,
}

impl WatchEvent {
    pub fn new(media_kind: &str, media_id: &str, at: NaiveDateTime) -> Self {
        Self {
            media_kind: media_kind.to_string(),
            media_id: media_id.to_string(),
            created_at: format_timestamp(at),
        }
    }

    pub fn created_at_parsed(&self) -> Option<NaiveDateTime> {
        parse_timestamp(&self.created_at)
    }
}

/// The premium-membership ledger entry. Its existence is the definition of
/// "premium member"; it owns the watch-event set exclusively.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Membership {
    pub username: String,
    pub score: i64,
    pub watched_movies: Vec<WatchEvent>,
}

impl Membership {
    /// A freshly verified member: zero score, empty history.
    pub fn new(username: &str) -> Self {
        Self {
            username: username.to_string(),
            score: 0,
            watched_movies: Vec::new(),
        }
    }
}

/// A shared watch-together intent, keyed by `(username, media_kind, media_id)`.
/// Never deleted; staleness is computed from `added_at` at read time.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct GroupWatchEntry {
    pub username: String,
    pub media_kind: String,
    pub media_id: String,
    pub added_at: String,
}

impl GroupWatchEntry {
    pub fn added_at_parsed(&self) -> Option<NaiveDateTime> {
        parse_timestamp(&self.added_at)
    }
}
