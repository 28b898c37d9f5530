//! Deduplicated watch-history accumulation on the membership ledger.

use std::sync::Arc;

use chrono::{NaiveDateTime, Utc};

use crate::{
    error::{AppError, AppResult},
    models::WatchEvent,
    store::{LedgerStore, WatchAppend},
};

pub struct WatchHistoryService {
    ledger: Arc<dyn LedgerStore>,
}

impl WatchHistoryService {
    pub fn new(ledger: Arc<dyn LedgerStore>) -> Self {
        Self { ledger }
    }

    /// Records a watch event stamped with the current time.
    pub async fn record(&self, username: &str, media_kind: &str, media_id: &str) -> AppResult<()> {
        self.record_at(username, media_kind, media_id, Utc::now().naive_utc())
            .await
    }

    /// Records a watch event at an explicit time.
    ///
    /// The timestamp is part of the dedup key at second granularity: a
    /// repeat within the same second is absorbed, a repeat a second later
    /// stores a new event.
    pub async fn record_at(
        &self,
        username: &str,
        media_kind: &str,
        media_id: &str,
        at: NaiveDateTime,
    ) -> AppResult<()> {
        let event = WatchEvent::new(media_kind, media_id, at);

        match self.ledger.add_watch_event(username, &event).await? {
            WatchAppend::Appended => {
                tracing::info!(
                    username = %username,
                    media_kind = %media_kind,
                    media_id = %media_id,
                    "watch event recorded"
                );
                Ok(())
            }
            WatchAppend::Duplicate => {
                tracing::debug!(
                    username = %username,
                    media_kind = %media_kind,
                    media_id = %media_id,
                    "duplicate watch event ignored"
                );
                Ok(())
            }
            WatchAppend::NoEntry => Err(AppError::NotFound(format!(
                "no membership for user: {}",
                username
            ))),
        }
    }
}
