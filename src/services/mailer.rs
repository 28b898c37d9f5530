//! Outbound mail dispatch through the Resend HTTP API.

use std::time::Duration;

use reqwest::Client as HttpClient;
use serde_json::json;

use crate::error::{AppError, AppResult};

const MAIL_TIMEOUT: Duration = Duration::from_secs(10);

/// Mail dispatch capability: `send(address, code) -> success`.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait MailSender: Send + Sync {
    /// Delivers a one-time passcode to the given address.
    async fn send(&self, to: &str, code: &str) -> AppResult<()>;
}

/// Resend-backed mail sender.
pub struct ResendMailer {
    http_client: HttpClient,
    api_key: String,
    api_url: String,
    from_address: String,
}

impl ResendMailer {
    pub fn new(api_key: String, api_url: String, from_address: String) -> reqwest::Result<Self> {
        let http_client = HttpClient::builder().timeout(MAIL_TIMEOUT).build()?;
        Ok(Self {
            http_client,
            api_key,
            api_url,
            from_address,
        })
    }
}

#[async_trait::async_trait]
impl MailSender for ResendMailer {
    async fn send(&self, to: &str, code: &str) -> AppResult<()> {
        let payload = json!({
            "from": self.from_address,
            "to": [to],
            "subject": "Verify Your Email with OTP – Premium Membership",
            "html": format!(
                "<p>Hello,</p>\
                 <p>Thank you for signing up for our <strong>Premium Membership</strong>.</p>\
                 <p>To complete your email verification, please use the One-Time Password (OTP) below:</p>\
                 <p style=\"font-size: 18px; font-weight: bold;\">Your OTP: {}</p>\
                 <p>Please do not share this code with anyone for security reasons.</p>\
                 <p>If you did not request this verification, you can safely ignore this email.</p>",
                code
            ),
        });

        let response = self
            .http_client
            .post(&self.api_url)
            .bearer_auth(&self.api_key)
            .json(&payload)
            .send()
            .await
            .map_err(|error| {
                tracing::error!(error = %error, "Mail dispatch request failed");
                AppError::Dependency("failed to deliver otp email".to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!(
                status = %status,
                body = %body,
                "Mail API request failed"
            );
            return Err(AppError::Dependency(
                "failed to deliver otp email".to_string(),
            ));
        }

        tracing::info!(to = %to, "OTP email dispatched");
        Ok(())
    }
}
