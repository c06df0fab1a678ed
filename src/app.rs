use std::sync::Arc;

use axum::{
    extract::{DefaultBodyLimit, State},
    http::HeaderValue,
    response::{IntoResponse, Json},
    routing::get,
    Router,
};
use serde_json::{json, Value};
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};

use crate::config::{AppConfig, StoreBackend};
use crate::database::{DatabaseManager, MemoryPropertyStore, PgPropertyRepository, PropertyStore};
use crate::error::ApiError;
use crate::handlers::{protected, public};
use crate::media::{self, ImageHost};
use crate::services::PropertyService;

/// Shared, immutable per-process state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub properties: Arc<PropertyService>,
}

impl AppState {
    pub fn new(config: AppConfig, store: Arc<dyn PropertyStore>, images: Arc<dyn ImageHost>) -> Self {
        let properties = PropertyService::new(store, images, &config);
        Self { config: Arc::new(config), properties: Arc::new(properties) }
    }

    /// Wire the configured store and media host.
    pub async fn from_config(config: AppConfig) -> anyhow::Result<Self> {
        let store: Arc<dyn PropertyStore> = match config.database.backend {
            StoreBackend::Postgres => {
                let manager = DatabaseManager::connect(&config.database).await?;
                Arc::new(PgPropertyRepository::new(manager.pool().clone()))
            }
            StoreBackend::Memory => {
                tracing::warn!("Using the in-memory property store; data is lost on restart");
                Arc::new(MemoryPropertyStore::new())
            }
        };
        let images = media::image_host(&config.media)?;
        Ok(Self::new(config, store, images))
    }
}

/// `/api/v1/` and `api/v1` both become `/api/v1`; `/` becomes empty.
fn normalize_prefix(prefix: &str) -> String {
    let trimmed = prefix.trim().trim_matches('/');
    if trimmed.is_empty() {
        String::new()
    } else {
        format!("/{}", trimmed)
    }
}

pub fn app(state: AppState) -> Router {
    let prefix = normalize_prefix(&state.config.api.prefix);
    let body_limit = state.config.api.max_request_size_bytes;
    let cors = cors_layer(&state.config.security.cors_origins);

    let router = Router::new()
        // Public
        .route("/", get(root))
        .route("/health", get(health));

    let router = if prefix.is_empty() {
        router.merge(property_routes())
    } else {
        router.nest(&prefix, property_routes())
    };

    router
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn property_routes() -> Router<AppState> {
    let collection = || get(public::search_properties).post(protected::create_property);
    let mine = || get(protected::my_properties);

    Router::new()
        .route("/properties", collection())
        .route("/properties/", collection())
        .route(
            "/properties/:id",
            get(public::get_property)
                .put(protected::update_property)
                .delete(protected::delete_property),
        )
        .route("/users/me/properties", mine())
        .route("/users/me/properties/", mine())
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    if origins.iter().any(|o| o == "*") {
        return CorsLayer::permissive();
    }
    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin '{}'", origin);
                None
            }
        })
        .collect();
    CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed))
        .allow_methods(Any)
        .allow_headers(Any)
}

async fn root(State(state): State<AppState>) -> Json<Value> {
    let version = env!("CARGO_PKG_VERSION");
    let prefix = normalize_prefix(&state.config.api.prefix);

    Json(json!({
        "name": "Houzdey API",
        "version": version,
        "description": "Property listing backend with search, filtering and owner-managed listings",
        "endpoints": {
            "search": format!("GET {}/properties (public)", prefix),
            "show": format!("GET {}/properties/:id (public)", prefix),
            "create": format!("POST {}/properties (bearer, multipart)", prefix),
            "update": format!("PUT {}/properties/:id (bearer)", prefix),
            "delete": format!("DELETE {}/properties/:id (bearer)", prefix),
            "mine": format!("GET {}/users/me/properties (bearer)", prefix),
            "health": "GET /health (public)",
        }
    }))
}

async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let now = chrono::Utc::now();

    match state.properties.health_check().await {
        Ok(()) => Json(json!({
            "status": "ok",
            "timestamp": now,
            "database": "ok"
        }))
        .into_response(),
        Err(e) => {
            tracing::error!("Health check failed: {}", e);
            ApiError::service_unavailable("Database unavailable").into_response()
        }
    }
}
