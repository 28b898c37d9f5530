//! OTP challenge issuance and verification gating the premium upgrade.

use std::sync::Arc;

use rand::Rng;

use crate::{
    error::{AppError, AppResult},
    models::{Email, OtpChallenge},
    services::mailer::MailSender,
    store::{AccountStore, ChallengeStore, LedgerStore},
};

/// Generates a uniform 6-digit code; leading zeros are kept.
fn generate_code() -> String {
    let mut rng = rand::thread_rng();
    format!("{:06}", rng.gen_range(0..1_000_000))
}

pub struct OtpManager {
    accounts: Arc<dyn AccountStore>,
    challenges: Arc<dyn ChallengeStore>,
    ledger: Arc<dyn LedgerStore>,
    mailer: Arc<dyn MailSender>,
}

impl OtpManager {
    pub fn new(
        accounts: Arc<dyn AccountStore>,
        challenges: Arc<dyn ChallengeStore>,
        ledger: Arc<dyn LedgerStore>,
        mailer: Arc<dyn MailSender>,
    ) -> Self {
        Self {
            accounts,
            challenges,
            ledger,
            mailer,
        }
    }

    /// Issues a fresh challenge for `(email, username)`, replacing any prior
    /// code, and dispatches it by mail.
    ///
    /// The challenge is persisted before dispatch: when delivery fails the
    /// code is already stored, so a retry re-issues (overwriting) rather
    /// than leaving the flow stuck.
    pub async fn issue(&self, username: &str, email: &str) -> AppResult<()> {
        let email = Email::parse(email).map_err(AppError::Validation)?;

        if self.accounts.find(username).await?.is_none() {
            return Err(AppError::Auth(format!("unknown user: {}", username)));
        }

        let challenge = OtpChallenge {
            email: email.as_str().to_string(),
            username: username.to_string(),
            code: generate_code(),
        };
        self.challenges.upsert(&challenge).await?;

        tracing::info!(username = %username, email = %email, "OTP challenge stored");

        if let Err(error) = self.mailer.send(email.as_str(), &challenge.code).await {
            tracing::warn!(
                username = %username,
                error = %error,
                "OTP challenge persisted but email dispatch failed"
            );
            return Err(error);
        }

        Ok(())
    }

    /// Consumes a challenge: on an exact code match, creates the membership
    /// ledger entry and deletes the challenge.
    pub async fn verify(&self, username: &str, email: &str, submitted_code: &str) -> AppResult<()> {
        let email = Email::parse(email).map_err(AppError::Validation)?;

        if self.ledger.get(username).await?.is_some() {
            return Err(AppError::Conflict(
                "user is already a premium member".to_string(),
            ));
        }

        let challenge = self
            .challenges
            .get(email.as_str(), username)
            .await?
            .ok_or_else(|| {
                AppError::NotFound("no otp challenge for this email and user".to_string())
            })?;

        // Exact string comparison, no normalization.
        if challenge.code != submitted_code {
            return Err(AppError::Auth("invalid otp code".to_string()));
        }

        if !self.ledger.create(username).await? {
            // Lost a race with a concurrent verify.
            return Err(AppError::Conflict(
                "user is already a premium member".to_string(),
            ));
        }
        self.challenges.delete(email.as_str(), username).await?;

        tracing::info!(username = %username, "premium membership activated");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        models::Account,
        services::mailer::MockMailSender,
        store::memory::{MemoryAccountStore, MemoryChallengeStore, MemoryLedgerStore},
    };

    struct Fixture {
        accounts: Arc<MemoryAccountStore>,
        challenges: Arc<MemoryChallengeStore>,
        ledger: Arc<MemoryLedgerStore>,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                accounts: Arc::new(MemoryAccountStore::default()),
                challenges: Arc::new(MemoryChallengeStore::default()),
                ledger: Arc::new(MemoryLedgerStore::default()),
            }
        }

        fn manager(&self, mailer: MockMailSender) -> OtpManager {
            OtpManager::new(
                self.accounts.clone(),
                self.challenges.clone(),
                self.ledger.clone(),
                Arc::new(mailer),
            )
        }

        async fn with_account(self, username: &str) -> Self {
            self.accounts
                .insert(&Account {
                    username: username.to_string(),
                    name: username.to_string(),
                    password_hash: "hash".to_string(),
                })
                .await
                .unwrap();
            self
        }
    }

    fn accepting_mailer() -> MockMailSender {
        let mut mailer = MockMailSender::new();
        mailer.expect_send().returning(|_, _| Ok(()));
        mailer
    }

    #[test]
    fn test_generate_code_is_six_digits() {
        for _ in 0..100 {
            let code = generate_code();
            assert_eq!(code.len(), 6);
            assert!(code.chars().all(|c| c.is_ascii_digit()));
        }
    }

    #[tokio::test]
    async fn test_issue_rejects_malformed_email() {
        let fixture = Fixture::new().with_account("alice").await;
        let manager = fixture.manager(accepting_mailer());

        let result = manager.issue("alice", "not-an-email").await;
        assert!(matches!(result, Err(AppError::Validation(_))));
        assert_eq!(
            fixture.challenges.get("not-an-email", "alice").await.unwrap(),
            None
        );
    }

    #[tokio::test]
    async fn test_issue_rejects_unknown_user() {
        let fixture = Fixture::new();
        let manager = fixture.manager(accepting_mailer());

        let result = manager.issue("nobody", "a@x.com").await;
        assert!(matches!(result, Err(AppError::Auth(_))));
    }

    #[tokio::test]
    async fn test_issue_twice_keeps_one_challenge_with_latest_code() {
        let fixture = Fixture::new().with_account("alice").await;
        let manager = fixture.manager(accepting_mailer());

        manager.issue("alice", "alice@x.com").await.unwrap();
        let first = fixture
            .challenges
            .get("alice@x.com", "alice")
            .await
            .unwrap()
            .unwrap();

        manager.issue("alice", "alice@x.com").await.unwrap();
        let second = fixture
            .challenges
            .get("alice@x.com", "alice")
            .await
            .unwrap()
            .unwrap();

        // Only the latest code verifies.
        if first.code != second.code {
            let stale = manager.verify("alice", "alice@x.com", &first.code).await;
            assert!(matches!(stale, Err(AppError::Auth(_))));
        }
        manager
            .verify("alice", "alice@x.com", &second.code)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_issue_persists_challenge_when_dispatch_fails() {
        let fixture = Fixture::new().with_account("alice").await;
        let mut mailer = MockMailSender::new();
        mailer
            .expect_send()
            .returning(|_, _| Err(AppError::Dependency("mail down".to_string())));
        let manager = fixture.manager(mailer);

        let result = manager.issue("alice", "alice@x.com").await;
        assert!(matches!(result, Err(AppError::Dependency(_))));

        // The challenge survived the dispatch failure.
        assert!(fixture
            .challenges
            .get("alice@x.com", "alice")
            .await
            .unwrap()
            .is_some());
    }

    #[tokio::test]
    async fn test_verify_without_challenge() {
        let fixture = Fixture::new().with_account("alice").await;
        let manager = fixture.manager(accepting_mailer());

        let result = manager.verify("alice", "alice@x.com", "123456").await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_verify_with_correct_code_creates_ledger_and_consumes_challenge() {
        let fixture = Fixture::new().with_account("alice").await;
        let manager = fixture.manager(accepting_mailer());

        manager.issue("alice", "alice@x.com").await.unwrap();
        let code = fixture
            .challenges
            .get("alice@x.com", "alice")
            .await
            .unwrap()
            .unwrap()
            .code;

        manager.verify("alice", "alice@x.com", &code).await.unwrap();

        let entry = fixture.ledger.get("alice").await.unwrap().unwrap();
        assert_eq!(entry.score, 0);
        assert!(entry.watched_movies.is_empty());
        assert_eq!(
            fixture.challenges.get("alice@x.com", "alice").await.unwrap(),
            None
        );
    }

    #[tokio::test]
    async fn test_verify_with_wrong_code_leaves_state_unchanged() {
        let fixture = Fixture::new().with_account("alice").await;
        let manager = fixture.manager(accepting_mailer());

        manager.issue("alice", "alice@x.com").await.unwrap();

        let result = manager.verify("alice", "alice@x.com", "000000x").await;
        assert!(matches!(result, Err(AppError::Auth(_))));

        // Challenge intact, no ledger entry.
        assert!(fixture
            .challenges
            .get("alice@x.com", "alice")
            .await
            .unwrap()
            .is_some());
        assert!(fixture.ledger.get("alice").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_verify_short_circuits_for_premium_member() {
        let fixture = Fixture::new().with_account("alice").await;
        let manager = fixture.manager(accepting_mailer());

        manager.issue("alice", "alice@x.com").await.unwrap();
        let code = fixture
            .challenges
            .get("alice@x.com", "alice")
            .await
            .unwrap()
            .unwrap()
            .code;
        manager.verify("alice", "alice@x.com", &code).await.unwrap();

        // Re-issue and re-verify after the upgrade.
        manager.issue("alice", "alice@x.com").await.unwrap();
        let code = fixture
            .challenges
            .get("alice@x.com", "alice")
            .await
            .unwrap()
            .unwrap()
            .code;
        let result = manager.verify("alice", "alice@x.com", &code).await;
        assert!(matches!(result, Err(AppError::Conflict(_))));
    }
}
