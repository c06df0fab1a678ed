use serde::{Deserialize, Serialize};
use serde_yaml::Value;
use std::env;
use std::path::Path;

/// Application configuration. Built once at startup and handed to the
/// components that need it; there is no process-wide instance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub server: ServerConfig,
    pub api: ApiConfig,
    pub database: DatabaseConfig,
    pub filter: FilterConfig,
    pub security: SecurityConfig,
    pub media: MediaConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Path prefix every API route is mounted under, e.g. `/api/v1`.
    pub prefix: String,
    pub max_request_size_bytes: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    Postgres,
    Memory,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub backend: StoreBackend,
    pub url: Option<String>,
    pub max_connections: u32,
    pub connection_timeout: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilterConfig {
    pub max_limit: u32,
    pub debug_logging: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    pub jwt_secret: String,
    pub jwt_expiry_hours: u64,
    /// `*` allows any origin.
    pub cors_origins: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaProvider {
    Local,
    Cloudinary,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaConfig {
    pub provider: MediaProvider,
    pub cloud_name: Option<String>,
    pub api_key: Option<String>,
    pub api_secret: Option<String>,
    pub folder: Option<String>,
    pub max_images: usize,
    /// Base for references handed out by the local provider.
    pub local_base_url: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::development()
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::preset(Self::environment_from_env()).with_env_overrides()
    }

    /// Load a YAML file, then apply environment overrides.
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("failed to read config file {}: {}", path.display(), e))?;
        let config = Self::from_yaml(&raw)
            .map_err(|e| anyhow::anyhow!("invalid config file {}: {}", path.display(), e))?;
        Ok(config.with_env_overrides())
    }

    /// Overlay YAML onto a preset. The preset is the file's `environment`
    /// key if present, otherwise `APP_ENV`; keys the file leaves out keep
    /// the preset's values, section by section.
    pub fn from_yaml(raw: &str) -> Result<Self, serde_yaml::Error> {
        let overlay: Value = serde_yaml::from_str(raw)?;
        let environment = match overlay.get("environment") {
            Some(value) => Environment::deserialize(value.clone())?,
            None => Self::environment_from_env(),
        };

        let mut merged = serde_yaml::to_value(Self::preset(environment))?;
        if !overlay.is_null() {
            merge_yaml(&mut merged, overlay);
        }
        serde_yaml::from_value(merged)
    }

    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => Ok(Self::from_env()),
        }
    }

    fn environment_from_env() -> Environment {
        match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            Ok("staging") | Ok("stage") => Environment::Staging,
            _ => Environment::Development,
        }
    }

    pub fn preset(environment: Environment) -> Self {
        match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        }
    }

    pub fn with_env_overrides(mut self) -> Self {
        // Server overrides
        if let Ok(v) = env::var("HOST") {
            self.server.host = v;
        }
        if let Some(port) = env::var("HOUZDEY_API_PORT")
            .ok()
            .or_else(|| env::var("PORT").ok())
            .and_then(|s| s.parse().ok())
        {
            self.server.port = port;
        }

        // API overrides
        if let Ok(v) = env::var("API_PREFIX") {
            self.api.prefix = v;
        }
        if let Ok(v) = env::var("API_MAX_REQUEST_SIZE_BYTES") {
            self.api.max_request_size_bytes = v.parse().unwrap_or(self.api.max_request_size_bytes);
        }

        // Database overrides
        if let Ok(v) = env::var("DATABASE_BACKEND") {
            match v.to_ascii_lowercase().as_str() {
                "memory" => self.database.backend = StoreBackend::Memory,
                "postgres" => self.database.backend = StoreBackend::Postgres,
                other => tracing::warn!("Ignoring unknown DATABASE_BACKEND '{}'", other),
            }
        }
        if let Ok(v) = env::var("DATABASE_URL") {
            self.database.url = Some(v);
        }
        if let Ok(v) = env::var("DATABASE_MAX_CONNECTIONS") {
            self.database.max_connections = v.parse().unwrap_or(self.database.max_connections);
        }
        if let Ok(v) = env::var("DATABASE_CONNECTION_TIMEOUT") {
            self.database.connection_timeout = v.parse().unwrap_or(self.database.connection_timeout);
        }

        // Filter overrides
        if let Ok(v) = env::var("FILTER_MAX_LIMIT") {
            self.filter.max_limit = v.parse().unwrap_or(self.filter.max_limit);
        }
        if let Ok(v) = env::var("FILTER_DEBUG_LOGGING") {
            self.filter.debug_logging = v.parse().unwrap_or(self.filter.debug_logging);
        }

        // Security overrides
        if let Ok(v) = env::var("JWT_SECRET") {
            self.security.jwt_secret = v;
        }
        if let Ok(v) = env::var("SECURITY_JWT_EXPIRY_HOURS") {
            self.security.jwt_expiry_hours = v.parse().unwrap_or(self.security.jwt_expiry_hours);
        }
        if let Ok(v) = env::var("SECURITY_CORS_ORIGINS") {
            self.security.cors_origins = v
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
        }

        // Media overrides
        if let Ok(v) = env::var("MEDIA_PROVIDER") {
            match v.to_ascii_lowercase().as_str() {
                "cloudinary" => self.media.provider = MediaProvider::Cloudinary,
                "local" => self.media.provider = MediaProvider::Local,
                other => tracing::warn!("Ignoring unknown MEDIA_PROVIDER '{}'", other),
            }
        }
        if let Ok(v) = env::var("CLOUDINARY_CLOUD_NAME") {
            self.media.cloud_name = Some(v);
        }
        if let Ok(v) = env::var("CLOUDINARY_API_KEY") {
            self.media.api_key = Some(v);
        }
        if let Ok(v) = env::var("CLOUDINARY_API_SECRET") {
            self.media.api_secret = Some(v);
        }
        if let Ok(v) = env::var("MEDIA_FOLDER") {
            self.media.folder = Some(v);
        }
        if let Ok(v) = env::var("MEDIA_MAX_IMAGES") {
            self.media.max_images = v.parse().unwrap_or(self.media.max_images);
        }

        self
    }

    /// Startup checks for settings that have no safe default.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.security.jwt_secret.is_empty() {
            anyhow::bail!("JWT_SECRET is not configured");
        }
        if self.database.backend == StoreBackend::Postgres && self.database.url.is_none() {
            anyhow::bail!("DATABASE_URL is required for the postgres backend");
        }
        if self.media.provider == MediaProvider::Cloudinary
            && (self.media.cloud_name.is_none() || self.media.api_key.is_none() || self.media.api_secret.is_none())
        {
            anyhow::bail!("CLOUDINARY_CLOUD_NAME, CLOUDINARY_API_KEY and CLOUDINARY_API_SECRET are required");
        }
        if self.media.max_images == 0 {
            anyhow::bail!("media.max_images must be at least 1");
        }
        Ok(())
    }

    pub fn is_production(&self) -> bool {
        self.environment == Environment::Production
    }

    fn development() -> Self {
        Self {
            environment: Environment::Development,
            server: ServerConfig { host: "0.0.0.0".to_string(), port: 8000 },
            api: ApiConfig {
                prefix: "/api/v1".to_string(),
                max_request_size_bytes: 20 * 1024 * 1024, // 20MB
            },
            database: DatabaseConfig {
                backend: StoreBackend::Postgres,
                url: None,
                max_connections: 10,
                connection_timeout: 30,
            },
            filter: FilterConfig { max_limit: 1000, debug_logging: true },
            security: SecurityConfig {
                jwt_secret: String::new(),
                jwt_expiry_hours: 24 * 8, // 8 days
                cors_origins: vec!["*".to_string()],
            },
            media: MediaConfig {
                provider: MediaProvider::Local,
                cloud_name: None,
                api_key: None,
                api_secret: None,
                folder: None,
                max_images: 10,
                local_base_url: "local://images".to_string(),
            },
        }
    }

    fn staging() -> Self {
        let mut config = Self::development();
        config.environment = Environment::Staging;
        config.api.max_request_size_bytes = 15 * 1024 * 1024;
        config.database.max_connections = 20;
        config.database.connection_timeout = 10;
        config.filter = FilterConfig { max_limit: 500, debug_logging: false };
        config.security.jwt_expiry_hours = 24;
        config.media.provider = MediaProvider::Cloudinary;
        config
    }

    fn production() -> Self {
        let mut config = Self::development();
        config.environment = Environment::Production;
        config.api.max_request_size_bytes = 10 * 1024 * 1024;
        config.database.max_connections = 50;
        config.database.connection_timeout = 5;
        config.filter = FilterConfig { max_limit: 100, debug_logging: false };
        config.security.jwt_expiry_hours = 24;
        config.security.cors_origins = vec!["https://houzdey.com".to_string()];
        config.media.provider = MediaProvider::Cloudinary;
        config
    }
}

fn merge_yaml(base: &mut Value, overlay: Value) {
    match overlay {
        Value::Mapping(overlay) => {
            if let Value::Mapping(map) = base {
                for (key, value) in overlay {
                    match map.get_mut(&key) {
                        Some(existing) => merge_yaml(existing, value),
                        None => {
                            map.insert(key, value);
                        }
                    }
                }
            } else {
                *base = Value::Mapping(overlay);
            }
        }
        other => *base = other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_development_config() {
        let config = AppConfig::development();
        assert_eq!(config.filter.max_limit, 1000);
        assert_eq!(config.api.prefix, "/api/v1");
        assert_eq!(config.media.provider, MediaProvider::Local);
        assert_eq!(config.security.cors_origins, vec!["*"]);
    }

    #[test]
    fn test_default_production_config() {
        let config = AppConfig::production();
        assert!(config.is_production());
        assert_eq!(config.filter.max_limit, 100);
        assert_eq!(config.media.provider, MediaProvider::Cloudinary);
        assert!(!config.security.cors_origins.contains(&"*".to_string()));
    }

    #[test]
    fn yaml_overrides_only_named_sections() {
        let raw = r#"
environment: staging
filter:
  max_limit: 25
  debug_logging: true
database:
  backend: memory
  url: null
  max_connections: 2
  connection_timeout: 1
"#;
        let config = AppConfig::from_yaml(raw).unwrap();
        assert_eq!(config.environment, Environment::Staging);
        assert_eq!(config.filter.max_limit, 25);
        assert_eq!(config.database.backend, StoreBackend::Memory);
        assert_eq!(config.api.prefix, "/api/v1");
    }

    #[test]
    fn yaml_environment_selects_the_base_preset() {
        let config = AppConfig::from_yaml("environment: production\n").unwrap();
        assert!(config.is_production());
        assert_eq!(config.filter.max_limit, 100);
        assert!(!config.filter.debug_logging);
        assert_eq!(config.media.provider, MediaProvider::Cloudinary);
        assert_eq!(config.security.cors_origins, vec!["https://houzdey.com"]);
    }

    #[test]
    fn partial_yaml_section_keeps_remaining_keys() {
        let raw = "environment: development\nserver:\n  port: 9000\nsecurity:\n  jwt_secret: s3cret\n";
        let config = AppConfig::from_yaml(raw).unwrap();
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.security.jwt_secret, "s3cret");
        assert_eq!(config.security.jwt_expiry_hours, 24 * 8);
    }

    #[test]
    fn explicit_null_clears_optional_keys() {
        let raw = "environment: staging\nmedia:\n  folder: listings\ndatabase:\n  url: null\n";
        let config = AppConfig::from_yaml(raw).unwrap();
        assert_eq!(config.media.folder.as_deref(), Some("listings"));
        assert_eq!(config.database.url, None);
        assert_eq!(config.media.max_images, 10);
    }

    #[test]
    fn validation_requires_secret_and_store_url() {
        let mut config = AppConfig::development();
        assert!(config.validate().is_err());

        config.security.jwt_secret = "secret".into();
        assert!(config.validate().is_err());

        config.database.backend = StoreBackend::Memory;
        assert!(config.validate().is_ok());

        config.media.provider = MediaProvider::Cloudinary;
        assert!(config.validate().is_err());
    }
}
