use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::env;
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub store: StoreConfig,
    pub api: ApiConfig,
    pub security: SecurityConfig,
    pub uploads: UploadConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    pub url: String,
    pub username: Option<String>,
    #[serde(skip_serializing)]
    pub password: Option<String>,
    pub request_timeout_secs: u64,
    pub indices: IndexNames,
}

/// Index names for the three logical collections
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexNames {
    pub users: String,
    pub needs: String,
    pub customers: String,
}

impl Default for IndexNames {
    fn default() -> Self {
        Self {
            users: "rastarockets_users".to_string(),
            needs: "rastarockets_needs".to_string(),
            customers: "rastarockets_customers".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub port: u16,
    pub enable_cors: bool,
    pub cors_origins: Vec<String>,
    pub enable_request_logging: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    #[serde(skip_serializing)]
    pub secret_key: String,
    pub token_expiration_secs: u64,
    pub password_memory_kib: u32,
    pub password_iterations: u32,
    pub password_parallelism: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadConfig {
    pub folder: PathBuf,
    pub allowed_extensions: BTreeSet<String>,
    pub max_upload_bytes: usize,
}

impl UploadConfig {
    /// True when `filename` carries an extension from the allow-list (case-insensitive)
    pub fn is_allowed(&self, filename: &str) -> bool {
        match filename.rsplit_once('.') {
            Some((_, ext)) => self.allowed_extensions.contains(&ext.to_ascii_lowercase()),
            None => false,
        }
    }
}

fn default_extensions() -> BTreeSet<String> {
    ["png", "jpg", "jpeg"].iter().map(|s| s.to_string()).collect()
}

fn parse_extensions(raw: &str) -> BTreeSet<String> {
    raw.split(',')
        .map(|s| s.trim().trim_start_matches('.').to_ascii_lowercase())
        .filter(|s| !s.is_empty())
        .collect()
}

impl AppConfig {
    pub fn from_env() -> Self {
        let environment = match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            Ok("staging") | Ok("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        // Set defaults based on environment, then override with specific env vars
        match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        }
        .with_env_overrides()
    }

    fn with_env_overrides(mut self) -> Self {
        // Store overrides
        if let Ok(v) = env::var("ELASTIC_URL") {
            self.store.url = v;
        }
        if let Ok(v) = env::var("ELASTIC_USERNAME") {
            self.store.username = Some(v).filter(|s| !s.is_empty());
        }
        if let Ok(v) = env::var("ELASTIC_PASSWORD") {
            self.store.password = Some(v).filter(|s| !s.is_empty());
        }
        if let Ok(v) = env::var("ELASTIC_TIMEOUT_SECS") {
            self.store.request_timeout_secs = v.parse().unwrap_or(self.store.request_timeout_secs);
        }
        if let Ok(v) = env::var("INDEX_USERS") {
            self.store.indices.users = v;
        }
        if let Ok(v) = env::var("INDEX_NEEDS") {
            self.store.indices.needs = v;
        }
        if let Ok(v) = env::var("INDEX_CUSTOMERS") {
            self.store.indices.customers = v;
        }

        // API overrides
        if let Some(v) = env::var("API_PORT").ok().or_else(|| env::var("PORT").ok()) {
            self.api.port = v.parse().unwrap_or(self.api.port);
        }
        if let Ok(v) = env::var("API_ENABLE_CORS") {
            self.api.enable_cors = v.parse().unwrap_or(self.api.enable_cors);
        }
        if let Ok(v) = env::var("API_CORS_ORIGINS") {
            self.api.cors_origins = v.split(',').map(|s| s.trim().to_string()).filter(|s| !s.is_empty()).collect();
        }
        if let Ok(v) = env::var("API_ENABLE_REQUEST_LOGGING") {
            self.api.enable_request_logging = v.parse().unwrap_or(self.api.enable_request_logging);
        }

        // Security overrides
        if let Ok(v) = env::var("SECRET_KEY") {
            self.security.secret_key = v;
        }
        if let Ok(v) = env::var("TOKEN_EXPIRATION_SECS") {
            self.security.token_expiration_secs = v.parse().unwrap_or(self.security.token_expiration_secs);
        }
        if let Ok(v) = env::var("PASSWORD_MEMORY_KIB") {
            self.security.password_memory_kib = v.parse().unwrap_or(self.security.password_memory_kib);
        }
        if let Ok(v) = env::var("PASSWORD_ITERATIONS") {
            self.security.password_iterations = v.parse().unwrap_or(self.security.password_iterations);
        }
        if let Ok(v) = env::var("PASSWORD_PARALLELISM") {
            self.security.password_parallelism = v.parse().unwrap_or(self.security.password_parallelism);
        }

        // Upload overrides
        if let Ok(v) = env::var("UPLOAD_FOLDER") {
            self.uploads.folder = PathBuf::from(v);
        }
        if let Ok(v) = env::var("ALLOWED_EXTENSIONS") {
            self.uploads.allowed_extensions = parse_extensions(&v);
        }
        if let Ok(v) = env::var("MAX_UPLOAD_BYTES") {
            self.uploads.max_upload_bytes = v.parse().unwrap_or(self.uploads.max_upload_bytes);
        }

        self
    }

    pub fn development() -> Self {
        Self {
            environment: Environment::Development,
            store: StoreConfig {
                url: "http://localhost:9200".to_string(),
                username: None,
                password: None,
                request_timeout_secs: 30,
                indices: IndexNames::default(),
            },
            api: ApiConfig {
                port: 5000,
                enable_cors: true,
                cors_origins: vec![],
                enable_request_logging: true,
            },
            security: SecurityConfig {
                secret_key: "development-secret-key".to_string(),
                token_expiration_secs: 600,
                password_memory_kib: 19 * 1024,
                password_iterations: 2,
                password_parallelism: 1,
            },
            uploads: UploadConfig {
                folder: PathBuf::from("upload"),
                allowed_extensions: default_extensions(),
                max_upload_bytes: 10 * 1024 * 1024, // 10MB
            },
        }
    }

    pub fn staging() -> Self {
        Self {
            environment: Environment::Staging,
            api: ApiConfig {
                port: 5000,
                enable_cors: true,
                cors_origins: vec!["https://staging.example.com".to_string()],
                enable_request_logging: true,
            },
            security: SecurityConfig {
                // Must come from SECRET_KEY outside development
                secret_key: String::new(),
                token_expiration_secs: 600,
                password_memory_kib: 19 * 1024,
                password_iterations: 2,
                password_parallelism: 1,
            },
            ..Self::development()
        }
    }

    pub fn production() -> Self {
        Self {
            environment: Environment::Production,
            api: ApiConfig {
                port: 5000,
                enable_cors: true,
                cors_origins: vec!["https://app.example.com".to_string()],
                enable_request_logging: false,
            },
            security: SecurityConfig {
                secret_key: String::new(),
                token_expiration_secs: 600,
                password_memory_kib: 64 * 1024,
                password_iterations: 3,
                password_parallelism: 1,
            },
            uploads: UploadConfig {
                folder: PathBuf::from("/var/lib/rastarockets/upload"),
                allowed_extensions: default_extensions(),
                max_upload_bytes: 5 * 1024 * 1024, // 5MB
            },
            ..Self::development()
        }
    }
}

// Process-wide config used by the binaries; library code receives an injected copy
pub static CONFIG: Lazy<AppConfig> = Lazy::new(AppConfig::from_env);

pub fn config() -> &'static AppConfig {
    &CONFIG
}
