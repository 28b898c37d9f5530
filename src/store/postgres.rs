//! Postgres-backed stores. Queries use the runtime API so the crate builds
//! without a live database; the schema lives in `migrations/`.

use sqlx::{types::Json, PgPool};

use crate::{
    error::AppResult,
    models::{Account, GroupWatchEntry, Membership, OtpChallenge, WatchEvent},
};

use super::{AccountStore, ChallengeStore, GroupWatchStore, LedgerStore, WatchAppend};

pub struct PgAccountStore {
    pool: PgPool,
}

impl PgAccountStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl AccountStore for PgAccountStore {
    async fn insert(&self, account: &Account) -> AppResult<bool> {
        let result = sqlx::query(
            "INSERT INTO accounts (username, name, password_hash) VALUES ($1, $2, $3) \
             ON CONFLICT (username) DO NOTHING",
        )
        .bind(&account.username)
        .bind(&account.name)
        .bind(&account.password_hash)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    async fn find(&self, username: &str) -> AppResult<Option<Account>> {
        let account = sqlx::query_as::<_, Account>(
            "SELECT username, name, password_hash FROM accounts WHERE username = $1",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        Ok(account)
    }
}

pub struct PgChallengeStore {
    pool: PgPool,
}

impl PgChallengeStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl ChallengeStore for PgChallengeStore {
    async fn upsert(&self, challenge: &OtpChallenge) -> AppResult<()> {
        sqlx::query(
            "INSERT INTO otp_challenges (email, username, code) VALUES ($1, $2, $3) \
             ON CONFLICT (email, username) DO UPDATE SET code = EXCLUDED.code",
        )
        .bind(&challenge.email)
        .bind(&challenge.username)
        .bind(&challenge.code)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn get(&self, email: &str, username: &str) -> AppResult<Option<OtpChallenge>> {
        let challenge = sqlx::query_as::<_, OtpChallenge>(
            "SELECT email, username, code FROM otp_challenges \
             WHERE email = $1 AND username = $2",
        )
        .bind(email)
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        Ok(challenge)
    }

    async fn delete(&self, email: &str, username: &str) -> AppResult<()> {
        sqlx::query("DELETE FROM otp_challenges WHERE email = $1 AND username = $2")
            .bind(email)
            .bind(username)
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}

pub struct PgLedgerStore {
    pool: PgPool,
}

impl PgLedgerStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl LedgerStore for PgLedgerStore {
    async fn create(&self, username: &str) -> AppResult<bool> {
        let result = sqlx::query(
            "INSERT INTO memberships (username, score, watched_movies) \
             VALUES ($1, 0, '[]'::jsonb) ON CONFLICT (username) DO NOTHING",
        )
        .bind(username)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    async fn get(&self, username: &str) -> AppResult<Option<Membership>> {
        let row = sqlx::query_as::<_, (i64, Json<Vec<WatchEvent>>)>(
            "SELECT score, watched_movies FROM memberships WHERE username = $1",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|(score, events)| Membership {
            username: username.to_string(),
            score,
            watched_movies: events.0,
        }))
    }

    async fn add_watch_event(&self, username: &str, event: &WatchEvent) -> AppResult<WatchAppend> {
        // The event is bound as a single-element array so `||` appends the
        // element and `@>` tests containment of that element.
        let wrapped = Json(vec![event.clone()]);

        let result = sqlx::query(
            "UPDATE memberships SET watched_movies = watched_movies || $2 \
             WHERE username = $1 AND NOT (watched_movies @> $2)",
        )
        .bind(username)
        .bind(&wrapped)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 1 {
            return Ok(WatchAppend::Appended);
        }

        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM memberships WHERE username = $1)",
        )
        .bind(username)
        .fetch_one(&self.pool)
        .await?;

        Ok(if exists {
            WatchAppend::Duplicate
        } else {
            WatchAppend::NoEntry
        })
    }

    async fn add_score(&self, username: &str, delta: i64) -> AppResult<Option<i64>> {
        let new_score = sqlx::query_scalar::<_, i64>(
            "UPDATE memberships SET score = score + $2 WHERE username = $1 RETURNING score",
        )
        .bind(username)
        .bind(delta)
        .fetch_optional(&self.pool)
        .await?;

        Ok(new_score)
    }
}

pub struct PgGroupWatchStore {
    pool: PgPool,
}

impl PgGroupWatchStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl GroupWatchStore for PgGroupWatchStore {
    async fn get(
        &self,
        username: &str,
        media_kind: &str,
        media_id: &str,
    ) -> AppResult<Option<GroupWatchEntry>> {
        let entry = sqlx::query_as::<_, GroupWatchEntry>(
            "SELECT username, media_kind, media_id, added_at FROM group_watch \
             WHERE username = $1 AND media_kind = $2 AND media_id = $3",
        )
        .bind(username)
        .bind(media_kind)
        .bind(media_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(entry)
    }

    async fn upsert(&self, entry: &GroupWatchEntry) -> AppResult<()> {
        sqlx::query(
            "INSERT INTO group_watch (username, media_kind, media_id, added_at) \
             VALUES ($1, $2, $3, $4) \
             ON CONFLICT (username, media_kind, media_id) \
             DO UPDATE SET added_at = EXCLUDED.added_at",
        )
        .bind(&entry.username)
        .bind(&entry.media_kind)
        .bind(&entry.media_id)
        .bind(&entry.added_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn list_all(&self) -> AppResult<Vec<GroupWatchEntry>> {
        let entries = sqlx::query_as::<_, GroupWatchEntry>(
            "SELECT username, media_kind, media_id, added_at FROM group_watch",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(entries)
    }
}
