//! Account credentials and bearer tokens.

use std::sync::Arc;

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use chrono::Utc;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::{
    error::{AppError, AppResult},
    models::Account,
    store::{AccountStore, LedgerStore},
};

/// Bearer token claims.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Username the token was issued to.
    pub sub: String,
    pub iat: i64,
    pub exp: i64,
}

/// Signs and verifies bearer tokens.
pub struct TokenIssuer {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl_secs: i64,
}

impl TokenIssuer {
    pub fn new(secret: &str, ttl_secs: i64) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl_secs,
        }
    }

    pub fn issue(&self, username: &str) -> AppResult<String> {
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: username.to_string(),
            iat: now,
            exp: now + self.ttl_secs,
        };

        encode(&Header::default(), &claims, &self.encoding)
            .map_err(|e| AppError::Internal(format!("Token encoding error: {}", e)))
    }

    pub fn verify(&self, token: &str) -> AppResult<Claims> {
        decode::<Claims>(token, &self.decoding, &Validation::default())
            .map(|data| data.claims)
            .map_err(|_| AppError::Auth("invalid or expired token".to_string()))
    }
}

/// Result of a successful login.
#[derive(Debug, Clone)]
pub struct LoginOutcome {
    pub access_token: String,
    pub is_premium: bool,
}

/// Registration and login over the account store.
pub struct AuthService {
    accounts: Arc<dyn AccountStore>,
    ledger: Arc<dyn LedgerStore>,
    tokens: Arc<TokenIssuer>,
}

impl AuthService {
    pub fn new(
        accounts: Arc<dyn AccountStore>,
        ledger: Arc<dyn LedgerStore>,
        tokens: Arc<TokenIssuer>,
    ) -> Self {
        Self {
            accounts,
            ledger,
            tokens,
        }
    }

    pub async fn register(&self, name: &str, username: &str, password: &str) -> AppResult<()> {
        let account = Account {
            username: username.to_string(),
            name: name.to_string(),
            password_hash: hash_password(password)?,
        };

        if !self.accounts.insert(&account).await? {
            return Err(AppError::Validation("user already exists".to_string()));
        }

        tracing::info!(username = %username, "account registered");
        Ok(())
    }

    pub async fn login(&self, username: &str, password: &str) -> AppResult<LoginOutcome> {
        let account = self
            .accounts
            .find(username)
            .await?
            .ok_or_else(|| AppError::Auth("invalid credentials".to_string()))?;

        verify_password(password, &account.password_hash)?;

        let access_token = self.tokens.issue(username)?;
        let is_premium = self.ledger.get(username).await?.is_some();

        tracing::info!(username = %username, is_premium = is_premium, "login succeeded");

        Ok(LoginOutcome {
            access_token,
            is_premium,
        })
    }
}

fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AppError::Internal(format!("Password hash error: {}", e)))
}

fn verify_password(password: &str, stored_hash: &str) -> AppResult<()> {
    let parsed = PasswordHash::new(stored_hash)
        .map_err(|e| AppError::Internal(format!("Stored password hash is invalid: {}", e)))?;

    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .map_err(|_| AppError::Auth("invalid credentials".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::memory::{MemoryAccountStore, MemoryLedgerStore};

    fn test_service() -> AuthService {
        AuthService::new(
            Arc::new(MemoryAccountStore::default()),
            Arc::new(MemoryLedgerStore::default()),
            Arc::new(TokenIssuer::new("test-secret", 3600)),
        )
    }

    #[test]
    fn test_hash_and_verify_password() {
        let hash = hash_password("secret123").unwrap();
        assert_ne!(hash, "secret123");
        assert!(verify_password("secret123", &hash).is_ok());
        assert!(verify_password("wrong", &hash).is_err());
    }

    #[test]
    fn test_token_roundtrip() {
        let issuer = TokenIssuer::new("test-secret", 3600);
        let token = issuer.issue("alice").unwrap();
        let claims = issuer.verify(&token).unwrap();
        assert_eq!(claims.sub, "alice");
        assert_eq!(claims.exp - claims.iat, 3600);
    }

    #[test]
    fn test_token_rejects_wrong_secret() {
        let issuer = TokenIssuer::new("test-secret", 3600);
        let other = TokenIssuer::new("other-secret", 3600);
        let token = issuer.issue("alice").unwrap();
        assert!(matches!(other.verify(&token), Err(AppError::Auth(_))));
    }

    #[test]
    fn test_token_rejects_garbage() {
        let issuer = TokenIssuer::new("test-secret", 3600);
        assert!(issuer.verify("not-a-token").is_err());
    }

    #[tokio::test]
    async fn test_register_then_login() {
        let service = test_service();
        service
            .register("Alice", "alice", "secret123")
            .await
            .unwrap();

        let outcome = service.login("alice", "secret123").await.unwrap();
        assert!(!outcome.access_token.is_empty());
        assert!(!outcome.is_premium);
    }

    #[tokio::test]
    async fn test_login_rejects_wrong_password() {
        let service = test_service();
        service
            .register("Alice", "alice", "secret123")
            .await
            .unwrap();

        let result = service.login("alice", "secret124").await;
        assert!(matches!(result, Err(AppError::Auth(_))));
    }

    #[tokio::test]
    async fn test_login_rejects_unknown_user() {
        let service = test_service();
        let result = service.login("nobody", "secret123").await;
        assert!(matches!(result, Err(AppError::Auth(_))));
    }

    #[tokio::test]
    async fn test_register_rejects_duplicate_username() {
        let service = test_service();
        service
            .register("Alice", "alice", "secret123")
            .await
            .unwrap();

        let result = service.register("Alice Again", "alice", "other").await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }
}
