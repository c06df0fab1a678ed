use axum::extract::{Path, RawQuery, State};

use crate::app::AppState;
use crate::database::models::Property;
use crate::filter::PropertyQuery;
use crate::middleware::{ApiResponse, ApiResult};

/// GET /properties - Search listings with optional filters, sort and paging
pub async fn search_properties(
    State(state): State<AppState>,
    RawQuery(raw): RawQuery,
) -> ApiResult<Vec<Property>> {
    let query = PropertyQuery::from_query_str(raw.as_deref())?;
    let properties = state.properties.search(&query).await?;
    Ok(ApiResponse::success(properties))
}

/// GET /properties/:id - Get a single listing
pub async fn get_property(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Property> {
    let property = state.properties.get(&id).await?;
    Ok(ApiResponse::success(property))
}
