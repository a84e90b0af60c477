//! Azure storage connection string parsing.

use std::collections::HashMap;
use std::fmt;

use crate::traits::{StorageError, StorageResult};

const DEFAULT_ENDPOINT_SUFFIX: &str = "core.windows.net";
const DEFAULT_PROTOCOL: &str = "https";

/// The parts of an Azure storage connection string the blob backend needs.
#[derive(Clone, PartialEq, Eq)]
pub struct ConnectionInfo {
    pub account_name: String,
    pub account_key: String,
    /// Blob service endpoint without a trailing slash.
    pub blob_endpoint: String,
    /// Set when the connection string names `BlobEndpoint` explicitly (emulator, custom domain).
    pub custom_endpoint: bool,
}

impl ConnectionInfo {
    /// Parse a `Key=Value;Key=Value` connection string.
    pub fn parse(connection_string: &str) -> StorageResult<Self> {
        let pairs: HashMap<&str, &str> = connection_string
            .split(';')
            .map(str::trim)
            .filter(|segment| !segment.is_empty())
            .filter_map(|segment| segment.split_once('='))
            .map(|(key, value)| (key.trim(), value.trim()))
            .collect();

        let required = |key: &str| -> StorageResult<String> {
            pairs
                .get(key)
                .filter(|v| !v.is_empty())
                .map(|v| v.to_string())
                .ok_or_else(|| {
                    StorageError::ConfigError(format!(
                        "Azure connection string is missing {}",
                        key
                    ))
                })
        };

        let account_name = required("AccountName")?;
        let account_key = required("AccountKey")?;

        let (blob_endpoint, custom_endpoint) = match pairs.get("BlobEndpoint") {
            Some(endpoint) if !endpoint.is_empty() => {
                (endpoint.trim_end_matches('/').to_string(), true)
            }
            _ => {
                let protocol = pairs
                    .get("DefaultEndpointsProtocol")
                    .copied()
                    .unwrap_or(DEFAULT_PROTOCOL);
                let suffix = pairs
                    .get("EndpointSuffix")
                    .copied()
                    .unwrap_or(DEFAULT_ENDPOINT_SUFFIX);
                (
                    format!("{}://{}.blob.{}", protocol, account_name, suffix),
                    false,
                )
            }
        };

        Ok(ConnectionInfo {
            account_name,
            account_key,
            blob_endpoint,
            custom_endpoint,
        })
    }

    pub fn allows_http(&self) -> bool {
        self.blob_endpoint.starts_with("http://")
    }
}

impl fmt::Debug for ConnectionInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionInfo")
            .field("account_name", &self.account_name)
            .field("account_key", &"<redacted>")
            .field("blob_endpoint", &self.blob_endpoint)
            .field("custom_endpoint", &self.custom_endpoint)
            .finish()
    }
}
