//! Text generation through the Gemini REST API.

use std::time::Duration;

use reqwest::Client as HttpClient;
use serde::Deserialize;
use serde_json::json;

use crate::error::{AppError, AppResult};

const GENERATION_TIMEOUT: Duration = Duration::from_secs(30);
const GEMINI_MODEL: &str = "gemini-2.5-flash";
const GENERATION_TEMPERATURE: f32 = 0.3;

/// Text generation capability: `generate(prompt) -> text`.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, prompt: &str) -> AppResult<String>;
}

/// Gemini-backed text generator.
pub struct GeminiTextGenerator {
    http_client: HttpClient,
    api_key: String,
    api_url: String,
}

impl GeminiTextGenerator {
    pub fn new(api_key: String, api_url: String) -> reqwest::Result<Self> {
        let http_client = HttpClient::builder().timeout(GENERATION_TIMEOUT).build()?;
        Ok(Self {
            http_client,
            api_key,
            api_url,
        })
    }
}

/// Response shape of `models/{model}:generateContent`.
#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: CandidateContent,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ContentPart>,
}

#[derive(Debug, Deserialize)]
struct ContentPart {
    text: String,
}

#[async_trait::async_trait]
impl TextGenerator for GeminiTextGenerator {
    async fn generate(&self, prompt: &str) -> AppResult<String> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.api_url, GEMINI_MODEL
        );

        let body = json!({
            "contents": [{ "parts": [{ "text": prompt }] }],
            "generationConfig": { "temperature": GENERATION_TEMPERATURE },
        });

        let response = self
            .http_client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|error| {
                tracing::error!(error = %error, "Text generation request failed");
                AppError::Dependency("text generation unavailable".to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!(
                status = %status,
                body = %body,
                "Text generation API request failed"
            );
            return Err(AppError::Dependency(
                "text generation unavailable".to_string(),
            ));
        }

        let generated: GenerateResponse = response.json().await.map_err(|error| {
            tracing::error!(error = %error, "Failed to parse text generation response");
            AppError::Dependency("text generation unavailable".to_string())
        })?;

        generated
            .candidates
            .into_iter()
            .next()
            .and_then(|candidate| candidate.content.parts.into_iter().next())
            .map(|part| part.text)
            .ok_or_else(|| {
                tracing::error!("Text generation response contained no candidates");
                AppError::Dependency("text generation unavailable".to_string())
            })
    }
}
