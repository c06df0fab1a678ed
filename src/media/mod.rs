pub mod cloudinary;
pub mod local;

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use crate::config::{MediaConfig, MediaProvider};

pub use cloudinary::CloudinaryHost;
pub use local::LocalImageHost;

#[derive(Debug, Error)]
pub enum MediaError {
    #[error("Missing media configuration: {0}")]
    ConfigMissing(&'static str),

    #[error("Upload rejected by media host ({status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("Unexpected media host response: {0}")]
    InvalidResponse(String),

    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

/// One image received from a client, ready to hand to the media host.
#[derive(Debug, Clone)]
pub struct ImageUpload {
    /// Host-side identifier, `{owner_id}/{file stem}`.
    pub public_id: String,
    pub filename: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl ImageUpload {
    pub fn new(owner_id: &str, filename: &str, content_type: Option<String>, bytes: Vec<u8>) -> Self {
        Self {
            public_id: public_id(owner_id, filename),
            filename: filename.to_string(),
            content_type,
            bytes,
        }
    }
}

/// External image storage. Returns the reference string persisted on the
/// record.
#[async_trait]
pub trait ImageHost: Send + Sync {
    async fn upload(&self, image: ImageUpload) -> Result<String, MediaError>;
}

/// Build the host from configuration.
pub fn image_host(config: &MediaConfig) -> Result<Arc<dyn ImageHost>, MediaError> {
    match config.provider {
        MediaProvider::Local => Ok(Arc::new(LocalImageHost::new(&config.local_base_url))),
        MediaProvider::Cloudinary => Ok(Arc::new(CloudinaryHost::from_config(config)?)),
    }
}

/// `{owner_id}/{stem}` with the stem reduced to `[A-Za-z0-9_-]`.
pub fn public_id(owner_id: &str, filename: &str) -> String {
    let base = filename.rsplit(|c: char| c == '/' || c == '\\').next().unwrap_or(filename);
    let stem = match base.rsplit_once('.') {
        Some((stem, _)) if !stem.is_empty() => stem,
        _ => base,
    };
    let mut sanitized: String = stem
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect();
    if sanitized.trim_matches('_').is_empty() {
        sanitized = "image".to_string();
    }
    format!("{}/{}", owner_id, sanitized)
}
