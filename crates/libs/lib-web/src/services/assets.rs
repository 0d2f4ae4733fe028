//! # Asset Host Collaborator
//!
//! Images are never stored in the database; they are uploaded to an external
//! asset host and only the returned durable URL is persisted.

use async_trait::async_trait;
use lib_core::{AppError, Result};
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, instrument};

/// Narrow interface to the asset host.
#[async_trait]
pub trait AssetStore: Send + Sync {
    /// Upload a base64 `data:` URI image and return its durable URL.
    async fn upload(&self, image: &str) -> Result<String>;
}

/// Cloudinary-style unsigned upload client.
pub struct CloudinaryStore {
    http: Client,
    upload_url: String,
    upload_preset: String,
}

impl CloudinaryStore {
    /// Build the client from `CLOUDINARY_CLOUD_NAME` and
    /// `CLOUDINARY_UPLOAD_PRESET`.
    pub fn from_env() -> anyhow::Result<Self> {
        let cloud_name = lib_utils::envs::get_env("CLOUDINARY_CLOUD_NAME")?;
        let upload_preset = lib_utils::envs::get_env_or("CLOUDINARY_UPLOAD_PRESET", "unsigned");

        let http = Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()?;

        Ok(Self {
            http,
            upload_url: format!("https://api.cloudinary.com/v1_1/{cloud_name}/image/upload"),
            upload_preset,
        })
    }
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    secure_url: String,
}

#[async_trait]
impl AssetStore for CloudinaryStore {
    #[instrument(skip(self, image), fields(image_len = image.len()))]
    async fn upload(&self, image: &str) -> Result<String> {
        let response = self
            .http
            .post(&self.upload_url)
            .json(&json!({
                "file": image,
                "upload_preset": self.upload_preset,
            }))
            .send()
            .await
            .map_err(|e| AppError::Upstream(format!("Asset upload request failed: {e}")))?;

        if !response.status().is_success() {
            return Err(AppError::Upstream(format!(
                "Asset host returned {}",
                response.status()
            )));
        }

        let body: UploadResponse = response
            .json()
            .await
            .map_err(|e| AppError::Upstream(format!("Asset host response unreadable: {e}")))?;

        debug!(url = %body.secure_url, "[ASSETS] upload complete");
        Ok(body.secure_url)
    }
}
