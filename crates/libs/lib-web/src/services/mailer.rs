//! # Mail Collaborator
//!
//! Transactional email used to deliver login passcodes.

use async_trait::async_trait;
use lib_core::{AppError, Result};
use reqwest::Client;
use serde_json::json;
use tracing::{debug, instrument};

/// Narrow interface to the transactional email service.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, to: &str, subject: &str, text: &str) -> Result<()>;
}

/// Brevo transactional email client.
pub struct BrevoMailer {
    http: Client,
    api_key: String,
    from_email: String,
}

const BREVO_SEND_URL: &str = "https://api.brevo.com/v3/smtp/email";

impl BrevoMailer {
    /// Build the client from `BREVO_API_KEY` and optional `BREVO_FROM_EMAIL`.
    pub fn from_env() -> anyhow::Result<Self> {
        let api_key = lib_utils::envs::get_env("BREVO_API_KEY")?;
        let from_email = lib_utils::envs::get_env_or("BREVO_FROM_EMAIL", "no-reply@example.com");

        let http = Client::builder()
            .timeout(std::time::Duration::from_secs(15))
            .build()?;

        Ok(Self {
            http,
            api_key,
            from_email,
        })
    }
}

#[async_trait]
impl Mailer for BrevoMailer {
    #[instrument(skip(self, text))]
    async fn send(&self, to: &str, subject: &str, text: &str) -> Result<()> {
        let response = self
            .http
            .post(BREVO_SEND_URL)
            .header("api-key", &self.api_key)
            .json(&json!({
                "sender": { "email": self.from_email },
                "to": [{ "email": to }],
                "subject": subject,
                "textContent": text,
            }))
            .send()
            .await
            .map_err(|e| AppError::Upstream(format!("Mail request failed: {e}")))?;

        if !response.status().is_success() {
            return Err(AppError::Upstream(format!(
                "Mail service returned {}",
                response.status()
            )));
        }

        debug!(to, subject, "[MAIL] sent");
        Ok(())
    }
}
