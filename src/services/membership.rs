//! Membership status queries and the loyalty score.

use std::sync::Arc;

use chrono::NaiveDateTime;

use crate::{
    error::{AppError, AppResult},
    models::WatchEvent,
    store::LedgerStore,
};

/// How many watch events the dashboard shows.
const DASHBOARD_LIMIT: usize = 5;

/// Membership state as seen by the dashboard. Absence of a ledger entry is
/// the normal "not yet premium" state, not an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MembershipStatus {
    Free,
    Premium {
        score: i64,
        watched_movies: Vec<WatchEvent>,
    },
}

pub struct MembershipService {
    ledger: Arc<dyn LedgerStore>,
}

impl MembershipService {
    pub fn new(ledger: Arc<dyn LedgerStore>) -> Self {
        Self { ledger }
    }

    pub async fn get_status(&self, username: &str) -> AppResult<MembershipStatus> {
        let Some(entry) = self.ledger.get(username).await? else {
            return Ok(MembershipStatus::Free);
        };

        Ok(MembershipStatus::Premium {
            score: entry.score,
            watched_movies: most_recent(&entry.watched_movies, DASHBOARD_LIMIT),
        })
    }

    /// Adds `delta` (which may be negative) to the user's score and returns
    /// the new total.
    pub async fn add_score(&self, username: &str, delta: i64) -> AppResult<i64> {
        let new_score = self
            .ledger
            .add_score(username, delta)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("no membership for user: {}", username)))?;

        tracing::info!(username = %username, delta = delta, score = new_score, "score updated");
        Ok(new_score)
    }
}

/// The `limit` most recent events by parsed timestamp, newest first.
///
/// Events whose timestamp fails to parse are skipped rather than failing the
/// query; ties keep insertion order (the sort is stable).
fn most_recent(events: &[WatchEvent], limit: usize) -> Vec<WatchEvent> {
    let mut dated: Vec<(NaiveDateTime, &WatchEvent)> = events
        .iter()
        .filter_map(|event| event.created_at_parsed().map(|t| (t, event)))
        .collect();

    dated.sort_by(|a, b| b.0.cmp(&a.0));

    dated
        .into_iter()
        .take(limit)
        .map(|(_, event)| event.clone())
        .collect()
}
