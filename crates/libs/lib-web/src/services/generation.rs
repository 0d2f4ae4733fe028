//! # Generation API Collaborator
//!
//! Synchronous call to an external text/multimodal generation API. One
//! attempt per ask, no retry; a failure surfaces to the caller as a generic
//! upstream error.

use async_trait::async_trait;
use lib_core::{AppError, Result};
use reqwest::Client;
use serde_json::{json, Value};
use tracing::{debug, instrument};

/// Image content in the inline form the generation API expects.
#[derive(Debug, Clone, PartialEq)]
pub struct InlineImage {
    pub mime_type: String,
    pub data: String,
}

impl InlineImage {
    /// Decode a client-submitted `data:` URI into the inline form.
    pub fn from_data_uri(uri: &str) -> Result<Self> {
        let (mime_type, data) = lib_utils::b64::split_data_uri(uri)
            .map_err(|_| AppError::EmptyRequest("Image must be a base64 data URI".to_string()))?;
        Ok(Self { mime_type, data })
    }
}

/// Narrow interface to the generation API.
#[async_trait]
pub trait ReplyGenerator: Send + Sync {
    /// Generate a reply for a question and/or image.
    async fn generate(&self, question: Option<&str>, image: Option<&InlineImage>)
        -> Result<String>;
}

/// Gemini `generateContent` REST client.
pub struct GeminiClient {
    http: Client,
    endpoint: String,
    api_key: String,
}

impl GeminiClient {
    /// Build the client from `GEMINI_API_KEY` and optional `GEMINI_MODEL`.
    pub fn from_env() -> anyhow::Result<Self> {
        let api_key = lib_utils::envs::get_env("GEMINI_API_KEY")?;
        let model = lib_utils::envs::get_env_or("GEMINI_MODEL", "gemini-2.0-flash");

        let http = Client::builder()
            .timeout(std::time::Duration::from_secs(60))
            .build()?;

        Ok(Self {
            http,
            endpoint: format!(
                "https://generativelanguage.googleapis.com/v1beta/models/{model}:generateContent"
            ),
            api_key,
        })
    }
}

#[async_trait]
impl ReplyGenerator for GeminiClient {
    #[instrument(skip(self, question, image))]
    async fn generate(
        &self,
        question: Option<&str>,
        image: Option<&InlineImage>,
    ) -> Result<String> {
        let mut parts = Vec::new();
        if let Some(question) = question {
            parts.push(json!({ "text": question }));
        }
        if let Some(image) = image {
            parts.push(json!({
                "inline_data": {
                    "mime_type": image.mime_type,
                    "data": image.data,
                }
            }));
        }

        let response = self
            .http
            .post(&self.endpoint)
            .query(&[("key", self.api_key.as_str())])
            .json(&json!({ "contents": [{ "parts": parts }] }))
            .send()
            .await
            .map_err(|e| AppError::Upstream(format!("Generation request failed: {e}")))?;

        if !response.status().is_success() {
            return Err(AppError::Upstream(format!(
                "Generation API returned {}",
                response.status()
            )));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| AppError::Upstream(format!("Generation response unreadable: {e}")))?;

        let reply = body["candidates"][0]["content"]["parts"][0]["text"]
            .as_str()
            .unwrap_or("No response")
            .to_string();

        debug!(reply_len = reply.len(), "[GENERATION] reply received");
        Ok(reply)
    }
}
