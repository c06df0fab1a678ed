use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, SubsecRound, Utc};
use futures::future::try_join_all;
use serde::Serialize;
use serde_json::error::Category;
use validator::{Validate, ValidationErrors};

use crate::config::{AppConfig, FilterConfig};
use crate::database::models::{NewProperty, ObjectId, Property, PropertyCreate, PropertyUpdate};
use crate::database::{DatabaseError, PropertyStore};
use crate::filter::{Filter, FilterError, PropertyQuery};
use crate::media::{ImageHost, ImageUpload, MediaError};

#[derive(Debug, thiserror::Error)]
pub enum PropertyError {
    #[error("{message}")]
    Validation { message: String, field_errors: HashMap<String, String> },

    #[error("{0}")]
    InvalidArgument(String),

    #[error("{0}")]
    MalformedBody(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("Image upload failed: {0}")]
    Media(#[from] MediaError),

    #[error("Store error: {0}")]
    Store(#[from] DatabaseError),
}

impl PropertyError {
    pub fn validation(message: impl Into<String>) -> Self {
        PropertyError::Validation { message: message.into(), field_errors: HashMap::new() }
    }

    fn field(field: &str, message: impl Into<String>) -> Self {
        let message = message.into();
        let mut field_errors = HashMap::new();
        field_errors.insert(field.to_string(), message.clone());
        PropertyError::Validation { message, field_errors }
    }
}

impl From<ValidationErrors> for PropertyError {
    fn from(errors: ValidationErrors) -> Self {
        let field_errors = errors
            .field_errors()
            .into_iter()
            .map(|(field, errs)| {
                let detail = errs
                    .first()
                    .map(|e| match &e.message {
                        Some(message) => message.to_string(),
                        None => format!("invalid value ({})", e.code),
                    })
                    .unwrap_or_else(|| "invalid value".to_string());
                (field.to_string(), detail)
            })
            .collect();
        PropertyError::Validation { message: "Validation failed".to_string(), field_errors }
    }
}

impl From<FilterError> for PropertyError {
    fn from(err: FilterError) -> Self {
        PropertyError::InvalidArgument(err.to_string())
    }
}

/// An image file as received from the client.
#[derive(Debug, Clone)]
pub struct ImageFile {
    pub filename: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

/// Acknowledgement returned by create.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CreateAck {
    pub status: &'static str,
    pub message: &'static str,
}

/// Property lifecycle: create, read, search, update and delete, with
/// ownership enforced on every mutation.
pub struct PropertyService {
    store: Arc<dyn PropertyStore>,
    images: Arc<dyn ImageHost>,
    filter: FilterConfig,
    max_images: usize,
}

/// Current time at the store's timestamp precision.
fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

fn parse_id(raw: &str) -> Result<ObjectId, PropertyError> {
    ObjectId::parse(raw).map_err(|_| PropertyError::InvalidArgument(format!("Invalid property id '{}'", raw)))
}

impl PropertyService {
    pub fn new(store: Arc<dyn PropertyStore>, images: Arc<dyn ImageHost>, config: &AppConfig) -> Self {
        Self {
            store,
            images,
            filter: config.filter.clone(),
            max_images: config.media.max_images,
        }
    }

    pub async fn health_check(&self) -> Result<(), DatabaseError> {
        self.store.health_check().await
    }

    pub async fn create(
        &self,
        owner_id: &str,
        details: PropertyCreate,
        files: Vec<ImageFile>,
    ) -> Result<CreateAck, PropertyError> {
        details.validate()?;
        self.check_images(&files)?;

        let uploads = files
            .into_iter()
            .map(|file| ImageUpload::new(owner_id, &file.filename, file.content_type, file.bytes))
            .map(|upload| self.images.upload(upload));
        let images = try_join_all(uploads).await?;

        let property = self
            .store
            .insert(NewProperty { owner_id: owner_id.to_string(), details, images, created_at: now() })
            .await?;

        tracing::info!("Property {} created by {}", property.id, owner_id);
        Ok(CreateAck { status: "success", message: "Property created successfully" })
    }

    fn check_images(&self, files: &[ImageFile]) -> Result<(), PropertyError> {
        if files.is_empty() {
            return Err(PropertyError::field("images", "At least one image is required"));
        }
        if files.len() > self.max_images {
            return Err(PropertyError::field(
                "images",
                format!("At most {} images are allowed", self.max_images),
            ));
        }
        for file in files {
            let is_image = file
                .content_type
                .as_deref()
                .map(|ct| ct.to_ascii_lowercase().starts_with("image/"))
                .unwrap_or(false);
            if !is_image {
                return Err(PropertyError::field(
                    "images",
                    format!("'{}' is not an image file", file.filename),
                ));
            }
            if file.bytes.is_empty() {
                return Err(PropertyError::field("images", format!("'{}' is empty", file.filename)));
            }
        }
        Ok(())
    }

    pub async fn get(&self, id: &str) -> Result<Property, PropertyError> {
        let id = parse_id(id)?;
        self.store
            .find_by_id(&id)
            .await?
            .ok_or_else(|| PropertyError::NotFound("Property not found".to_string()))
    }

    /// Every record the caller owns, newest first. An empty result is
    /// reported as `NotFound`.
    pub async fn list_for_owner(&self, owner_id: &str) -> Result<Vec<Property>, PropertyError> {
        let properties = self.store.find_by_owner(owner_id).await?;
        if properties.is_empty() {
            return Err(PropertyError::NotFound("No properties found for this user".to_string()));
        }
        Ok(properties)
    }

    pub async fn search(&self, query: &PropertyQuery) -> Result<Vec<Property>, PropertyError> {
        let search = Filter::new(&self.filter).build(query);
        if self.filter.debug_logging {
            tracing::debug!("Property search: {:?}", search);
        }
        Ok(self.store.search(&search).await?)
    }

    /// Ownership is checked before the raw body is parsed, so a non-owner
    /// is refused the same way whatever they send.
    pub async fn update(&self, id: &str, owner_id: &str, body: &[u8]) -> Result<Property, PropertyError> {
        let id = parse_id(id)?;
        self.authorize(&id, owner_id, "update").await?;

        let update: PropertyUpdate = serde_json::from_slice(body).map_err(|e| match e.classify() {
            Category::Syntax | Category::Eof | Category::Io => {
                PropertyError::MalformedBody(format!("Request body is not valid JSON: {}", e))
            }
            Category::Data => PropertyError::validation(format!("Invalid update payload: {}", e)),
        })?;
        update.validate()?;

        let updated = self
            .store
            .update_owned(&id, owner_id, &update, now())
            .await?
            .ok_or_else(|| PropertyError::validation("Property update failed"))?;

        tracing::info!("Property {} updated by {}", id, owner_id);
        Ok(updated)
    }

    pub async fn delete(&self, id: &str, owner_id: &str) -> Result<(), PropertyError> {
        let id = parse_id(id)?;
        self.authorize(&id, owner_id, "delete").await?;

        if !self.store.delete_owned(&id, owner_id).await? {
            return Err(PropertyError::validation("Property deletion failed"));
        }

        tracing::info!("Property {} deleted by {}", id, owner_id);
        Ok(())
    }

    async fn authorize(&self, id: &ObjectId, owner_id: &str, action: &str) -> Result<Property, PropertyError> {
        let property = self
            .store
            .find_by_id(id)
            .await?
            .ok_or_else(|| PropertyError::NotFound("Property not found".to_string()))?;

        if !property.is_owned_by(owner_id) {
            tracing::warn!("User {} attempted to {} property {} owned by another user", owner_id, action, id);
            return Err(PropertyError::Forbidden(format!(
                "You do not have permission to {} this property",
                action
            )));
        }
        Ok(property)
    }
}
