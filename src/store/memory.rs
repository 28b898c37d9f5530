//! In-memory stores for tests: the same trait surface as the Postgres
//! stores over `RwLock<HashMap>` state.

use std::collections::HashMap;

use tokio::sync::RwLock;

use crate::{
    error::AppResult,
    models::{Account, GroupWatchEntry, Membership, OtpChallenge, WatchEvent},
};

use super::{AccountStore, ChallengeStore, GroupWatchStore, LedgerStore, WatchAppend};

#[derive(Default)]
pub struct MemoryAccountStore {
    accounts: RwLock<HashMap<String, Account>>,
}

#[async_trait::async_trait]
impl AccountStore for MemoryAccountStore {
    async fn insert(&self, account: &Account) -> AppResult<bool> {
        let mut accounts = self.accounts.write().await;
        if accounts.contains_key(&account.username) {
            return Ok(false);
        }
        accounts.insert(account.username.clone(), account.clone());
        Ok(true)
    }

    async fn find(&self, username: &str) -> AppResult<Option<Account>> {
        Ok(self.accounts.read().await.get(username).cloned())
    }
}

#[derive(Default)]
pub struct MemoryChallengeStore {
    challenges: RwLock<HashMap<(String, String), OtpChallenge>>,
}

#[async_trait::async_trait]
impl ChallengeStore for MemoryChallengeStore {
    async fn upsert(&self, challenge: &OtpChallenge) -> AppResult<()> {
        let key = (challenge.email.clone(), challenge.username.clone());
        self.challenges.write().await.insert(key, challenge.clone());
        Ok(())
    }

    async fn get(&self, email: &str, username: &str) -> AppResult<Option<OtpChallenge>> {
        let key = (email.to_string(), username.to_string());
        Ok(self.challenges.read().await.get(&key).cloned())
    }

    async fn delete(&self, email: &str, username: &str) -> AppResult<()> {
        let key = (email.to_string(), username.to_string());
        self.challenges.write().await.remove(&key);
        Ok(())
    }
}

#[derive(Default)]
pub struct MemoryLedgerStore {
    entries: RwLock<HashMap<String, Membership>>,
}

#[async_trait::async_trait]
impl LedgerStore for MemoryLedgerStore {
    async fn create(&self, username: &str) -> AppResult<bool> {
        let mut entries = self.entries.write().await;
        if entries.contains_key(username) {
            return Ok(false);
        }
        entries.insert(username.to_string(), Membership::new(username));
        Ok(true)
    }

    async fn get(&self, username: &str) -> AppResult<Option<Membership>> {
        Ok(self.entries.read().await.get(username).cloned())
    }

    async fn add_watch_event(&self, username: &str, event: &WatchEvent) -> AppResult<WatchAppend> {
        let mut entries = self.entries.write().await;
        let Some(entry) = entries.get_mut(username) else {
            return Ok(WatchAppend::NoEntry);
        };
        if entry.watched_movies.contains(event) {
            return Ok(WatchAppend::Duplicate);
        }
        entry.watched_movies.push(event.clone());
        Ok(WatchAppend::Appended)
    }

    async fn add_score(&self, username: &str, delta: i64) -> AppResult<Option<i64>> {
        let mut entries = self.entries.write().await;
        let Some(entry) = entries.get_mut(username) else {
            return Ok(None);
        };
        entry.score += delta;
        Ok(Some(entry.score))
    }
}

#[derive(Default)]
pub struct MemoryGroupWatchStore {
    entries: RwLock<HashMap<(String, String, String), GroupWatchEntry>>,
}

#[async_trait::async_trait]
impl GroupWatchStore for MemoryGroupWatchStore {
    async fn get(
        &self,
        username: &str,
        media_kind: &str,
        media_id: &str,
    ) -> AppResult<Option<GroupWatchEntry>> {
        let key = (
            username.to_string(),
            media_kind.to_string(),
            media_id.to_string(),
        );
        Ok(self.entries.read().await.get(&key).cloned())
    }

    async fn upsert(&self, entry: &GroupWatchEntry) -> AppResult<()> {
        let key = (
            entry.username.clone(),
            entry.media_kind.clone(),
            entry.media_id.clone(),
        );
        self.entries.write().await.insert(key, entry.clone());
        Ok(())
    }

    async fn list_all(&self) -> AppResult<Vec<GroupWatchEntry>> {
        Ok(self.entries.read().await.values().cloned().collect())
    }
}
