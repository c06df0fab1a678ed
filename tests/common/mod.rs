#![allow(dead_code)]

use std::sync::Arc;

use anyhow::Result;
use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use houzdey_api::app::{app, AppState};
use houzdey_api::auth::{generate_jwt, Claims};
use houzdey_api::config::{AppConfig, StoreBackend};
use houzdey_api::database::{MemoryPropertyStore, PropertyStore};
use houzdey_api::media::LocalImageHost;

pub const SECRET: &str = "integration-test-secret";
pub const BOUNDARY: &str = "houzdey-test-boundary";

/// In-process server over the in-memory store and local image host.
pub struct TestApp {
    pub router: Router,
    pub state: AppState,
}

pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
}

pub fn config() -> AppConfig {
    let mut config = AppConfig::default();
    config.security.jwt_secret = SECRET.to_string();
    config.database.backend = StoreBackend::Memory;
    config.filter.max_limit = 50;
    config.filter.debug_logging = false;
    config.media.max_images = 4;
    config
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_config(config())
    }

    pub fn with_config(config: AppConfig) -> Self {
        Self::with_store(config, Arc::new(MemoryPropertyStore::new()))
    }

    pub fn with_store(config: AppConfig, store: Arc<dyn PropertyStore>) -> Self {
        let images = Arc::new(LocalImageHost::new(&config.media.local_base_url));
        let state = AppState::new(config, store, images);
        Self { router: app(state.clone()), state }
    }

    pub async fn send(&self, request: Request<Body>) -> Result<TestResponse> {
        let response = self.router.clone().oneshot(request).await?;
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await?;
        let body = if bytes.is_empty() { Value::Null } else { serde_json::from_slice(&bytes)? };
        Ok(TestResponse { status, body })
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> Result<TestResponse> {
        self.send(request(Method::GET, uri, token).body(Body::empty())?).await
    }

    pub async fn put_json(&self, uri: &str, token: Option<&str>, body: &Value) -> Result<TestResponse> {
        self.put_raw(uri, token, Some("application/json"), serde_json::to_vec(body)?).await
    }

    pub async fn put_raw(
        &self,
        uri: &str,
        token: Option<&str>,
        content_type: Option<&str>,
        body: impl Into<Body>,
    ) -> Result<TestResponse> {
        let mut builder = request(Method::PUT, uri, token);
        if let Some(content_type) = content_type {
            builder = builder.header(header::CONTENT_TYPE, content_type);
        }
        self.send(builder.body(body.into())?).await
    }

    pub async fn delete(&self, uri: &str, token: Option<&str>) -> Result<TestResponse> {
        self.send(request(Method::DELETE, uri, token).body(Body::empty())?).await
    }

    pub async fn create(&self, token: Option<&str>, payload: &Value, images: &[Image<'_>]) -> Result<TestResponse> {
        let request = request(Method::POST, "/api/v1/properties/", token)
            .header(header::CONTENT_TYPE, format!("multipart/form-data; boundary={}", BOUNDARY))
            .body(Body::from(multipart_body(Some(&payload.to_string()), images)))?;
        self.send(request).await
    }

    /// Create a listing as `user` and return its id.
    pub async fn create_listing(&self, user: &str, payload: &Value) -> Result<String> {
        let token = token(user);
        let created = self.create(Some(&token), payload, &[jpeg("front.jpg")]).await?;
        anyhow::ensure!(created.status == StatusCode::CREATED, "create failed: {}", created.body);

        let mine = self.get("/api/v1/users/me/properties", Some(&token)).await?;
        let id = mine.body[0]["id"].as_str().unwrap_or_default().to_string();
        anyhow::ensure!(!id.is_empty(), "created listing not found: {}", mine.body);
        Ok(id)
    }
}

fn request(method: Method, uri: &str, token: Option<&str>) -> axum::http::request::Builder {
    let builder = Request::builder().method(method).uri(uri);
    match token {
        Some(token) => builder.header(header::AUTHORIZATION, format!("Bearer {}", token)),
        None => builder,
    }
}

pub fn token(user: &str) -> String {
    let claims = Claims::new(user, Some(format!("{}@example.com", user)), 1);
    generate_jwt(&claims, SECRET).expect("token")
}

pub struct Image<'a> {
    pub filename: &'a str,
    pub content_type: &'a str,
    pub bytes: &'a [u8],
}

pub fn jpeg(filename: &str) -> Image<'_> {
    Image { filename, content_type: "image/jpeg", bytes: &[0xff, 0xd8, 0xff, 0xe0] }
}

pub fn multipart_body(property_data: Option<&str>, images: &[Image<'_>]) -> Vec<u8> {
    let mut body = Vec::new();
    if let Some(data) = property_data {
        body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
        body.extend_from_slice(b"Content-Disposition: form-data; name=\"property_data\"\r\n\r\n");
        body.extend_from_slice(data.as_bytes());
        body.extend_from_slice(b"\r\n");
    }
    for image in images {
        body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
        body.extend_from_slice(
            format!(
                "Content-Disposition: form-data; name=\"images\"; filename=\"{}\"\r\nContent-Type: {}\r\n\r\n",
                image.filename, image.content_type
            )
            .as_bytes(),
        );
        body.extend_from_slice(image.bytes);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());
    body
}

pub fn listing(location_area: &str, price: f64, bedrooms: i64, facilities: &[&str]) -> Value {
    json!({
        "availability_status": "Available",
        "location_state": "Lagos",
        "location_area": location_area,
        "property_address": "12 Admiralty Way",
        "estate_name": "Palm Springs",
        "property_type": "Apartment",
        "condition": "Newly built",
        "furnishing": "Furnished",
        "bedrooms": bedrooms,
        "bathrooms": 2,
        "toilets": 3,
        "price": price,
        "caution_fee": 100000,
        "facilities": facilities,
        "description": "Bright apartment close to the expressway",
        "listing_by": "agent"
    })
}
