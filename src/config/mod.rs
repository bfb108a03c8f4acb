use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub api: ApiConfig,
    pub security: SecurityConfig,
    pub storage: StorageConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub enable_request_logging: bool,
    pub max_upload_bytes: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    pub jwt_secret: String,
    pub jwt_expiry_hours: u64,
    pub enable_cors: bool,
    pub cors_origins: Vec<String>,
}

/// Cloudinary-style object storage credentials. Empty values are fine for
/// development; the server then runs on the in-memory storage backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    pub cloud_name: String,
    pub api_key: String,
    pub api_secret: String,
    pub upload_folder: String,
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
        if let Ok(v) = env::var("JWT_SECRET") {
            self.security.jwt_secret = v;
        }
        if let Ok(v) = env::var("SECURITY_JWT_EXPIRY_HOURS") {
            self.security.jwt_expiry_hours = v.parse().unwrap_or(self.security.jwt_expiry_hours);
        }
        if let Ok(v) = env::var("SECURITY_ENABLE_CORS") {
            self.security.enable_cors = v.parse().unwrap_or(self.security.enable_cors);
        }
        if let Ok(v) = env::var("SECURITY_CORS_ORIGINS") {
            self.security.cors_origins = v.split(',').map(|s| s.trim().to_string()).collect();
        }
        if let Ok(v) = env::var("API_ENABLE_REQUEST_LOGGING") {
            self.api.enable_request_logging = v.parse().unwrap_or(self.api.enable_request_logging);
        }
        if let Ok(v) = env::var("API_MAX_UPLOAD_BYTES") {
            self.api.max_upload_bytes = v.parse().unwrap_or(self.api.max_upload_bytes);
        }
        if let Ok(v) = env::var("CLOUDINARY_CLOUD_NAME") {
            self.storage.cloud_name = v;
        }
        if let Ok(v) = env::var("CLOUDINARY_API_KEY") {
            self.storage.api_key = v;
        }
        if let Ok(v) = env::var("CLOUDINARY_API_SECRET") {
            self.storage.api_secret = v;
        }
        if let Ok(v) = env::var("CLOUDINARY_UPLOAD_FOLDER") {
            self.storage.upload_folder = v;
        }

        self
    }

    fn development() -> Self {
        Self {
            environment: Environment::Development,
            api: ApiConfig {
                enable_request_logging: true,
                max_upload_bytes: 10 * 1024 * 1024, // 10MB
            },
            security: SecurityConfig {
                jwt_secret: "dev-secret-do-not-use".to_string(),
                jwt_expiry_hours: 24 * 7, // 1 week
                enable_cors: true,
                cors_origins: vec![
                    "http://localhost:3000".to_string(),
                    "http://localhost:5173".to_string(),
                ],
            },
            storage: StorageConfig {
                cloud_name: String::new(),
                api_key: String::new(),
                api_secret: String::new(),
                upload_folder: "loandocs-dev".to_string(),
            },
        }
    }

    fn staging() -> Self {
        Self {
            environment: Environment::Staging,
            api: ApiConfig {
                enable_request_logging: true,
                max_upload_bytes: 10 * 1024 * 1024,
            },
            security: SecurityConfig {
                jwt_secret: String::new(),
                jwt_expiry_hours: 24,
                enable_cors: true,
                cors_origins: vec!["https://staging.example.com".to_string()],
            },
            storage: StorageConfig {
                cloud_name: String::new(),
                api_key: String::new(),
                api_secret: String::new(),
                upload_folder: "loandocs-staging".to_string(),
            },
        }
    }

    fn production() -> Self {
        Self {
            environment: Environment::Production,
            api: ApiConfig {
                enable_request_logging: false,
                max_upload_bytes: 10 * 1024 * 1024,
            },
            security: SecurityConfig {
                jwt_secret: String::new(),
                jwt_expiry_hours: 4,
                enable_cors: true,
                cors_origins: vec!["https://app.example.com".to_string()],
            },
            storage: StorageConfig {
                cloud_name: String::new(),
                api_key: String::new(),
                api_secret: String::new(),
                upload_folder: "loandocs".to_string(),
            },
        }
    }
}

// Global singleton config - initialized once at startup
pub static CONFIG: Lazy<AppConfig> = Lazy::new(AppConfig::from_env);

// Convenience function for accessing config
pub fn config() -> &'static AppConfig {
    &CONFIG
}
