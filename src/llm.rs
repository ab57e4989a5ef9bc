//! Model-based fact-sheet extraction: the chat client, the prompt, and the
//! validation boundary for the model's reply.

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::models::PropertyAttributes;

/// Chat-completion seam so tests can substitute canned replies.
#[async_trait]
pub trait ChatModel: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<String>;
}

/// Minimal chat-completions client for the OpenAI REST API.
pub struct OpenAiChat {
    http: reqwest::Client,
    api_key: String,
    base_url: String,
    model: String,
}

impl OpenAiChat {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_key: api_key.into(),
            base_url: "https://api.openai.com/v1".to_string(),
            model: model.into(),
        }
    }

    /// Point the client at a different endpoint (proxies, test servers).
    #[allow(dead_code)]
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<Message<'a>>,
}

#[derive(Serialize)]
struct Message<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ReplyMessage,
}

#[derive(Deserialize)]
struct ReplyMessage {
    content: String,
}

#[async_trait]
impl ChatModel for OpenAiChat {
    async fn complete(&self, prompt: &str) -> Result<String> {
        let request = ChatRequest {
            model: &self.model,
            messages: vec![Message {
                role: "user",
                content: prompt,
            }],
        };

        let response = self
            .http
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .context("chat completion request failed")?
            .error_for_status()
            .context("chat completion returned an error status")?;

        let reply: ChatResponse = response
            .json()
            .await
            .context("chat completion reply body was not valid JSON")?;
        let content = reply
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .context("chat completion reply had no choices")?;

        debug!(chars = content.len(), "model reply received");
        Ok(content)
    }
}

const SCHEMA_SKELETON: &str = r#"{
    "price": "",
    "address": "",
    "bedrooms": "",
    "bathrooms": "",
    "receptions": "",
    "EPC Rating": "",
    "tenure": "",
    "time_remaining_on_lease": "",
    "service_charge": "",
    "council_tax_band": "",
    "ground_rent": ""
}"#;

/// Instruction handed to the model together with the fact-sheet markup.
pub fn attribute_prompt(fragment: &str) -> String {
    format!(
        "You are a data extractor model and you have been tasked with extracting \
         information about the apartment for me into json.\n\
         Here is the div for the property details:\n\n\
         {fragment}\n\n\
         this is the final json structure expected:\n{SCHEMA_SKELETON}"
    )
}

/// How a model reply can fail validation, kept apart so a schema violation is
/// observable as its own failure kind rather than a generic parse error.
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("model reply is not valid JSON: {0}")]
    MalformedReply(#[from] serde_json::Error),
    #[error("model reply is missing schema keys: {}", .missing.join(", "))]
    SchemaViolation { missing: Vec<String> },
}

/// Validate a model reply against the fixed attribute schema.
pub fn parse_attributes(reply: &str) -> Result<PropertyAttributes, ExtractError> {
    let value: serde_json::Value = serde_json::from_str(reply)?;

    let missing: Vec<String> = PropertyAttributes::KEYS
        .iter()
        .filter(|key| value.get(**key).is_none())
        .map(|key| key.to_string())
        .collect();
    if !missing.is_empty() {
        return Err(ExtractError::SchemaViolation { missing });
    }

    Ok(serde_json::from_value(value)?)
}
