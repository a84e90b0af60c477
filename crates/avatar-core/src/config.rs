//! Configuration module
//!
//! Process-wide settings read once at startup: HTTP server options and the storage
//! settings the backend selector works from. Nothing here changes after startup.

use std::env;
use std::fmt;

use crate::constants::MAX_AVATAR_SIZE_BYTES;
use crate::storage_types::StorageBackend;

const SERVER_PORT: u16 = 4000;
const MAX_REQUEST_BODY_MB: usize = 100;
const LOCAL_STORAGE_PATH: &str = "assets/userAvatars";

/// HTTP server settings
#[derive(Clone, Debug)]
pub struct BaseConfig {
    pub server_port: u16,
    pub cors_origins: Vec<String>,
    pub environment: String,
    /// Ceiling for a whole request body. The per-file ceiling is fixed separately.
    pub max_request_body_bytes: usize,
    pub log_format: String,
}

/// Storage settings
///
/// The Azure backend is selected iff both the connection string and the container
/// name are present and non-blank; otherwise files go to `local_storage_path`.
#[derive(Clone, Default)]
pub struct StorageConfig {
    pub azure_connection_string: Option<String>,
    pub azure_container_name: Option<String>,
    pub local_storage_path: String,
}

impl StorageConfig {
    /// Which backend this configuration selects.
    pub fn backend(&self) -> StorageBackend {
        if self.azure_credentials().is_some() {
            StorageBackend::Azure
        } else {
            StorageBackend::Local
        }
    }

    /// Connection string and container name, only when both are non-blank.
    pub fn azure_credentials(&self) -> Option<(&str, &str)> {
        let connection_string = non_blank(self.azure_connection_string.as_deref())?;
        let container = non_blank(self.azure_container_name.as_deref())?;
        Some((connection_string, container))
    }

    /// True when exactly one of the two Azure settings is present.
    pub fn is_partially_configured_for_azure(&self) -> bool {
        let has_connection = non_blank(self.azure_connection_string.as_deref()).is_some();
        let has_container = non_blank(self.azure_container_name.as_deref()).is_some();
        has_connection != has_container
    }
}

// The connection string embeds the account key; keep it out of logs.
impl fmt::Debug for StorageConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StorageConfig")
            .field(
                "azure_connection_string",
                &self.azure_connection_string.as_ref().map(|_| "<redacted>"),
            )
            .field("azure_container_name", &self.azure_container_name)
            .field("local_storage_path", &self.local_storage_path)
            .finish()
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Application configuration.
#[derive(Clone, Debug)]
pub struct Config {
    pub base: BaseConfig,
    pub storage: StorageConfig,
}

impl Config {
    /// Load configuration from the process environment, reading `.env` first if present.
    pub fn from_env() -> Result<Self, anyhow::Error> {
        // A missing .env file is the normal case in deployed environments.
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, anyhow::Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let server_port = match lookup("SERVER_PORT") {
            Some(port) => port
                .parse()
                .map_err(|_| anyhow::anyhow!("SERVER_PORT could not be parsed into a u16"))?,
            None => SERVER_PORT,
        };

        let max_request_body_mb: usize = match lookup("MAX_REQUEST_BODY_MB") {
            Some(mb) => mb.parse().map_err(|_| {
                anyhow::anyhow!("MAX_REQUEST_BODY_MB could not be parsed into an integer")
            })?,
            None => MAX_REQUEST_BODY_MB,
        };
        let max_request_body_bytes = max_request_body_mb
            .checked_mul(1024 * 1024)
            .ok_or_else(|| {
                anyhow::anyhow!("MAX_REQUEST_BODY_MB could not be parsed into a byte count")
            })?;

        let base = BaseConfig {
            server_port,
            cors_origins: lookup("CORS_ORIGINS")
                .unwrap_or_else(|| "*".to_string())
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),
            environment: lookup("ENVIRONMENT")
                .or_else(|| lookup("APP_ENV"))
                .unwrap_or_else(|| "development".to_string()),
            max_request_body_bytes,
            log_format: lookup("LOG_FORMAT")
                .unwrap_or_else(|| "pretty".to_string())
                .to_lowercase(),
        };

        let storage = StorageConfig {
            azure_connection_string: lookup("AZURE_STORAGE_CONNECTION_STRING"),
            azure_container_name: lookup("AZURE_STORAGE_CONTAINER"),
            local_storage_path: lookup("LOCAL_STORAGE_PATH")
                .unwrap_or_else(|| LOCAL_STORAGE_PATH.to_string()),
        };

        let config = Config { base, storage };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.base.max_request_body_bytes == 0 {
            return Err(anyhow::anyhow!("MAX_REQUEST_BODY_MB cannot be 0"));
        }

        if self.base.max_request_body_bytes < MAX_AVATAR_SIZE_BYTES {
            return Err(anyhow::anyhow!(
                "MAX_REQUEST_BODY_MB must be at least {} MB so a single avatar fits",
                MAX_AVATAR_SIZE_BYTES / 1024 / 1024
            ));
        }

        if self.storage.backend() == StorageBackend::Local
            && self.storage.local_storage_path.trim().is_empty()
        {
            return Err(anyhow::anyhow!(
                "LOCAL_STORAGE_PATH must not be empty when using local storage backend"
            ));
        }

        Ok(())
    }

    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        let environment = self.base.environment.to_lowercase();
        environment == "production" || environment == "prod"
    }

    pub fn server_port(&self) -> u16 {
        self.base.server_port
    }

    pub fn cors_origins(&self) -> &[String] {
        &self.base.cors_origins
    }

    pub fn environment(&self) -> &str {
        &self.base.environment
    }

    pub fn max_request_body_bytes(&self) -> usize {
        self.base.max_request_body_bytes
    }

    pub fn log_format(&self) -> &str {
        &self.base.log_format
    }

    pub fn storage(&self) -> &StorageConfig {
        &self.storage
    }

    pub fn storage_backend(&self) -> StorageBackend {
        self.storage.backend()
    }
}
