//! Rolling 7-day shared watch-together index.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{Duration, NaiveDateTime, Utc};
use serde::Serialize;

use crate::{
    error::{AppError, AppResult},
    models::{format_timestamp, GroupWatchEntry},
    store::GroupWatchStore,
};

/// Window inside which an entry counts as active.
const ACTIVE_WINDOW_DAYS: i64 = 7;

/// A media reference in the active list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaRef {
    pub media_kind: String,
    pub media_id: String,
}

pub struct GroupWatchService {
    entries: Arc<dyn GroupWatchStore>,
}

impl GroupWatchService {
    pub fn new(entries: Arc<dyn GroupWatchStore>) -> Self {
        Self { entries }
    }

    /// Adds `(username, media)` to the shared list.
    ///
    /// A key still inside the active window is a conflict; a key past the
    /// window has its `added_at` refreshed in place. Callers cannot
    /// distinguish refresh from first add: both mean "now in the list".
    pub async fn request_join(
        &self,
        username: &str,
        media_kind: &str,
        media_id: &str,
    ) -> AppResult<()> {
        let now = Utc::now().naive_utc();

        if let Some(existing) = self.entries.get(username, media_kind, media_id).await? {
            // Entries with an unparsable added_at are treated as expired and
            // refreshed, matching their invisibility in the active list.
            if let Some(added_at) = existing.added_at_parsed() {
                if is_active(added_at, now) {
                    return Err(AppError::Conflict("already added".to_string()));
                }
            }
        }

        let entry = GroupWatchEntry {
            username: username.to_string(),
            media_kind: media_kind.to_string(),
            media_id: media_id.to_string(),
            added_at: format_timestamp(now),
        };
        self.entries.upsert(&entry).await?;

        tracing::info!(
            username = %username,
            media_kind = %media_kind,
            media_id = %media_id,
            "group watch entry added"
        );
        Ok(())
    }

    /// The active entries grouped by username, computed over the full entry
    /// set at call time. Staleness is a read-time filter; nothing is deleted.
    pub async fn list_active(&self) -> AppResult<HashMap<String, Vec<MediaRef>>> {
        let now = Utc::now().naive_utc();
        let mut active: HashMap<String, Vec<MediaRef>> = HashMap::new();

        for entry in self.entries.list_all().await? {
            let Some(added_at) = entry.added_at_parsed() else {
                tracing::warn!(
                    username = %entry.username,
                    added_at = %entry.added_at,
                    "skipping group watch entry with unparsable timestamp"
                );
                continue;
            };
            if !is_active(added_at, now) {
                continue;
            }

            active.entry(entry.username).or_default().push(MediaRef {
                media_kind: entry.media_kind,
                media_id: entry.media_id,
            });
        }

        Ok(active)
    }
}

fn is_active(added_at: NaiveDateTime, now: NaiveDateTime) -> bool {
    now.signed_duration_since(added_at) < Duration::days(ACTIVE_WINDOW_DAYS)
}
