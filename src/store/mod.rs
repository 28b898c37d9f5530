//! Persistence seam: one trait per entity kind, injected into the workflow
//! services as trait objects. Postgres implementations back the running
//! server; the in-memory implementations back the test suite.

use crate::{
    error::AppResult,
    models::{Account, GroupWatchEntry, Membership, OtpChallenge, WatchEvent},
};

pub mod memory;
pub mod postgres;

/// Outcome of appending a watch event to a ledger entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchAppend {
    /// Event stored.
    Appended,
    /// An identical event (same kind, id, and timestamp) already existed.
    Duplicate,
    /// No ledger entry exists for the user.
    NoEntry,
}

#[async_trait::async_trait]
pub trait AccountStore: Send + Sync {
    /// Inserts a new account. Returns `false` when the username is taken.
    async fn insert(&self, account: &Account) -> AppResult<bool>;

    async fn find(&self, username: &str) -> AppResult<Option<Account>>;
}

#[async_trait::async_trait]
pub trait ChallengeStore: Send + Sync {
    /// Stores a challenge, replacing any prior code for the same
    /// `(email, username)` key.
    async fn upsert(&self, challenge: &OtpChallenge) -> AppResult<()>;

    async fn get(&self, email: &str, username: &str) -> AppResult<Option<OtpChallenge>>;

    async fn delete(&self, email: &str, username: &str) -> AppResult<()>;
}

#[async_trait::async_trait]
pub trait LedgerStore: Send + Sync {
    /// Creates an empty ledger entry. Returns `false` when one already
    /// exists for the username.
    async fn create(&self, username: &str) -> AppResult<bool>;

    async fn get(&self, username: &str) -> AppResult<Option<Membership>>;

    /// Appends a watch event with set semantics over the full event triple.
    async fn add_watch_event(&self, username: &str, event: &WatchEvent) -> AppResult<WatchAppend>;

    /// Adds `delta` to the stored score. Returns the new score, or `None`
    /// when no ledger entry exists.
    async fn add_score(&self, username: &str, delta: i64) -> AppResult<Option<i64>>;
}

#[async_trait::async_trait]
pub trait GroupWatchStore: Send + Sync {
    async fn get(
        &self,
        username: &str,
        media_kind: &str,
        media_id: &str,
    ) -> AppResult<Option<GroupWatchEntry>>;

    /// Inserts the entry, or overwrites `added_at` when the key exists.
    /// The caller decides whether a refresh is allowed.
    async fn upsert(&self, entry: &GroupWatchEntry) -> AppResult<()>;

    async fn list_all(&self) -> AppResult<Vec<GroupWatchEntry>>;
}
