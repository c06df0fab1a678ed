use async_trait::async_trait;

use super::{ImageHost, ImageUpload, MediaError};

/// Keeps nothing; hands back `{base_url}/{public_id}` so development and
/// tests run without a media account.
pub struct LocalImageHost {
    base_url: String,
}

impl LocalImageHost {
    pub fn new(base_url: &str) -> Self {
        Self { base_url: base_url.trim_end_matches('/').to_string() }
    }
}

#[async_trait]
impl ImageHost for LocalImageHost {
    async fn upload(&self, image: ImageUpload) -> Result<String, MediaError> {
        tracing::debug!("Accepted {} bytes for {}", image.bytes.len(), image.public_id);
        Ok(format!("{}/{}", self.base_url, image.public_id))
    }
}
