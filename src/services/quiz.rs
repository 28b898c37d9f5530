//! Movie quiz generation against a fixed JSON contract.

use std::sync::Arc;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::{
    error::{AppError, AppResult},
    services::textgen::TextGenerator,
};

/// Retry prompt surfaced when generation or parsing fails.
const QUIZ_FAILED_MSG: &str = "error while preparing quiz, try again after sometime";

const QUIZ_PROMPT: &str = r#"You are a quiz generator.

Generate exactly 5 quiz questions related to Hollywood and Bollywood movies.

Rules:
- Each question must have exactly 4 options
- Provide the correct option clearly
- Response MUST be valid JSON only
- Do NOT add explanations or extra text

JSON format:
{
    "quiz": [
        {
        "question": "Question text",
        "options": {
            "A": "Option 1",
            "B": "Option 2",
            "C": "Option 3",
            "D": "Option 4"
        },
        "correct_answer": "A"
        }
    ]
}
"#;

/// The contract the generated response is parsed against.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizPayload {
    pub quiz: Vec<QuizQuestion>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizQuestion {
    pub question: String,
    pub options: QuizOptions,
    pub correct_answer: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizOptions {
    #[serde(rename = "A")]
    pub a: String,
    #[serde(rename = "B")]
    pub b: String,
    #[serde(rename = "C")]
    pub c: String,
    #[serde(rename = "D")]
    pub d: String,
}

pub struct QuizService {
    textgen: Arc<dyn TextGenerator>,
}

impl QuizService {
    pub fn new(textgen: Arc<dyn TextGenerator>) -> Self {
        Self { textgen }
    }

    pub async fn generate(&self, username: &str) -> AppResult<QuizPayload> {
        tracing::info!(username = %username, "generating quiz questions");

        let raw = self.textgen.generate(QUIZ_PROMPT).await?;
        parse_quiz_response(&raw)
    }
}

fn parse_quiz_response(raw: &str) -> AppResult<QuizPayload> {
    let block = extract_json_block(raw).ok_or_else(|| {
        tracing::error!("quiz response contained no fenced JSON block");
        AppError::Dependency(QUIZ_FAILED_MSG.to_string())
    })?;

    serde_json::from_str(&block).map_err(|error| {
        tracing::error!(error = %error, "quiz response did not match the expected contract");
        AppError::Dependency(QUIZ_FAILED_MSG.to_string())
    })
}

/// Pulls the payload out of a ```json fenced block; the language tag is
/// optional.
fn extract_json_block(raw: &str) -> Option<String> {
    let fence = Regex::new(r"```(?:json)?\s*([\s\S]*?)```").ok()?;
    fence
        .captures(raw)
        .and_then(|captures| captures.get(1))
        .map(|m| m.as_str().to_string())
}
