use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use sha2::{Digest, Sha256};

use super::{ImageHost, ImageUpload, MediaError};
use crate::config::MediaConfig;

const API_BASE: &str = "https://api.cloudinary.com/v1_1";

/// Signed uploads to Cloudinary's image upload endpoint.
pub struct CloudinaryHost {
    client: reqwest::Client,
    upload_url: String,
    api_key: String,
    api_secret: String,
    folder: Option<String>,
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    secure_url: Option<String>,
    error: Option<UploadErrorBody>,
}

#[derive(Debug, Deserialize)]
struct UploadErrorBody {
    message: String,
}

impl CloudinaryHost {
    pub fn from_config(config: &MediaConfig) -> Result<Self, MediaError> {
        let cloud_name = config.cloud_name.as_deref().ok_or(MediaError::ConfigMissing("CLOUDINARY_CLOUD_NAME"))?;
        let api_key = config.api_key.clone().ok_or(MediaError::ConfigMissing("CLOUDINARY_API_KEY"))?;
        let api_secret = config.api_secret.clone().ok_or(MediaError::ConfigMissing("CLOUDINARY_API_SECRET"))?;

        Ok(Self {
            client: reqwest::Client::new(),
            upload_url: format!("{}/{}/image/upload", API_BASE, cloud_name),
            api_key,
            api_secret,
            folder: config.folder.clone(),
        })
    }

    /// Parameters covered by the request signature, sorted by name.
    fn signed_params(&self, public_id: &str, timestamp: i64) -> Vec<(&'static str, String)> {
        let mut params = vec![("public_id", public_id.to_string()), ("timestamp", timestamp.to_string())];
        if let Some(folder) = &self.folder {
            params.push(("folder", folder.clone()));
        }
        params.sort_by(|a, b| a.0.cmp(b.0));
        params
    }
}

/// Hex SHA-256 over `k1=v1&k2=v2...` followed by the API secret.
pub fn sign(params: &[(&str, String)], api_secret: &str) -> String {
    let to_sign = params
        .iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect::<Vec<_>>()
        .join("&");

    let mut hasher = Sha256::new();
    hasher.update(to_sign.as_bytes());
    hasher.update(api_secret.as_bytes());
    hex::encode(hasher.finalize())
}

#[async_trait]
impl ImageHost for CloudinaryHost {
    async fn upload(&self, image: ImageUpload) -> Result<String, MediaError> {
        let timestamp = chrono::Utc::now().timestamp();
        let params = self.signed_params(&image.public_id, timestamp);
        let signature = sign(&params, &self.api_secret);

        let mut file = Part::bytes(image.bytes).file_name(image.filename.clone());
        if let Some(content_type) = &image.content_type {
            file = file.mime_str(content_type)?;
        }

        let mut form = Form::new()
            .part("file", file)
            .text("api_key", self.api_key.clone())
            .text("signature", signature)
            .text("signature_algorithm", "sha256");
        for (key, value) in params {
            form = form.text(key, value);
        }

        tracing::debug!("Uploading image {} to media host", image.public_id);
        let response = self.client.post(&self.upload_url).multipart(form).send().await?;
        let status = response.status();
        let body: UploadResponse = response
            .json()
            .await
            .map_err(|e| MediaError::InvalidResponse(e.to_string()))?;

        if !status.is_success() {
            let message = body.error.map(|e| e.message).unwrap_or_else(|| status.to_string());
            return Err(MediaError::Rejected { status: status.as_u16(), message });
        }

        body.secure_url
            .ok_or_else(|| MediaError::InvalidResponse("missing secure_url".to_string()))
    }
}
