use std::collections::HashMap;

use axum::{
    body::Bytes,
    extract::{Multipart, Path, State},
};
use serde_json::error::Category;

use crate::app::AppState;
use crate::database::models::{Property, PropertyCreate};
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::services::{CreateAck, ImageFile};

const PROPERTY_DATA_FIELD: &str = "property_data";

/// POST /properties - Create a listing from a multipart form holding the
/// JSON `property_data` field and one or more `images` files
pub async fn create_property(
    State(state): State<AppState>,
    user: AuthUser,
    multipart: Multipart,
) -> ApiResult<CreateAck> {
    let (details, images) = read_create_form(multipart).await?;
    let ack = state.properties.create(&user.id, details, images).await?;
    Ok(ApiResponse::created(ack))
}

async fn read_create_form(mut multipart: Multipart) -> Result<(PropertyCreate, Vec<ImageFile>), ApiError> {
    let mut property_data: Option<String> = None;
    let mut images = Vec::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::bad_request(format!("Invalid multipart body: {}", e)))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            PROPERTY_DATA_FIELD => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| ApiError::bad_request(format!("Invalid property_data field: {}", e)))?;
                property_data = Some(text);
            }
            "images" | "images[]" => {
                let filename = field.file_name().unwrap_or("image").to_string();
                let content_type = field.content_type().map(str::to_string);
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::bad_request(format!("Invalid image upload: {}", e)))?;
                images.push(ImageFile { filename, content_type, bytes: bytes.to_vec() });
            }
            other => tracing::debug!("Ignoring unexpected multipart field '{}'", other),
        }
    }

    let raw = property_data.ok_or_else(|| {
        let mut field_errors = HashMap::new();
        field_errors.insert(PROPERTY_DATA_FIELD.to_string(), "This field is required".to_string());
        ApiError::validation_error("Missing property data", Some(field_errors))
    })?;

    let details = serde_json::from_str::<PropertyCreate>(&raw).map_err(|e| match e.classify() {
        Category::Syntax | Category::Eof => ApiError::invalid_json(format!("property_data is not valid JSON: {}", e)),
        _ => ApiError::validation_error(format!("Invalid property data: {}", e), None),
    })?;

    Ok((details, images))
}

/// GET /users/me/properties - Listings owned by the caller, newest first
pub async fn my_properties(State(state): State<AppState>, user: AuthUser) -> ApiResult<Vec<Property>> {
    let properties = state.properties.list_for_owner(&user.id).await?;
    Ok(ApiResponse::success(properties))
}

/// PUT /properties/:id - Apply the fields present in the JSON body. The body
/// is read raw and only parsed once the caller is known to own the listing.
pub async fn update_property(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
    body: Bytes,
) -> ApiResult<Property> {
    let property = state.properties.update(&id, &user.id, &body).await?;
    Ok(ApiResponse::success(property))
}

/// DELETE /properties/:id
pub async fn delete_property(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
) -> ApiResult<()> {
    state.properties.delete(&id, &user.id).await?;
    Ok(ApiResponse::no_content())
}
