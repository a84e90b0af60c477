//! Container provisioning for the Azure blob backend.
//!
//! `object_store` covers blob reads and writes but has no notion of creating a
//! container, so "create if not exists" talks to the Blob REST API directly with
//! SharedKey authentication.

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use hmac::{Hmac, Mac};
use reqwest::{StatusCode, Url};
use sha2::Sha256;

use super::connection::ConnectionInfo;
use crate::traits::{StorageError, StorageResult};

type HmacSha256 = Hmac<Sha256>;

const API_VERSION: &str = "2021-08-06";
/// Anonymous read access for blobs, so returned URLs are directly fetchable.
const PUBLIC_ACCESS: &str = "blob";

/// Makes sure a container exists before blobs are written into it.
///
/// Implementations must be idempotent: calling this for a container that already
/// exists succeeds.
#[async_trait]
pub trait ContainerProvisioner: Send + Sync {
    async fn ensure_container(&self, container: &str) -> StorageResult<()>;
}

/// Creates containers through the Blob REST API using the account key.
#[derive(Clone)]
pub struct SharedKeyProvisioner {
    client: reqwest::Client,
    account_name: String,
    account_key: Vec<u8>,
    blob_endpoint: String,
}

impl SharedKeyProvisioner {
    pub fn new(info: &ConnectionInfo) -> StorageResult<Self> {
        let account_key = STANDARD.decode(&info.account_key).map_err(|e| {
            StorageError::ConfigError(format!("AccountKey is not valid base64: {}", e))
        })?;

        Ok(SharedKeyProvisioner {
            client: reqwest::Client::new(),
            account_name: info.account_name.clone(),
            account_key,
            blob_endpoint: info.blob_endpoint.clone(),
        })
    }

    fn authorization(&self, string_to_sign: &str) -> StorageResult<String> {
        let signature = sign(&self.account_key, string_to_sign)?;
        Ok(format!("SharedKey {}:{}", self.account_name, signature))
    }
}

#[async_trait]
impl ContainerProvisioner for SharedKeyProvisioner {
    async fn ensure_container(&self, container: &str) -> StorageResult<()> {
        let start = std::time::Instant::now();
        let mut url = Url::parse(&format!("{}/{}", self.blob_endpoint, container))
            .map_err(|e| StorageError::ConfigError(format!("Invalid blob endpoint: {}", e)))?;
        url.query_pairs_mut().append_pair("restype", "container");

        let date = chrono::Utc::now()
            .format("%a, %d %b %Y %H:%M:%S GMT")
            .to_string();
        let to_sign = create_container_string_to_sign(&date, &self.account_name, url.path());

        let response = self
            .client
            .put(url)
            .header("x-ms-blob-public-access", PUBLIC_ACCESS)
            .header("x-ms-date", &date)
            .header("x-ms-version", API_VERSION)
            .header("Content-Length", "0")
            .header("Authorization", self.authorization(&to_sign)?)
            .send()
            .await
            .map_err(|e| {
                tracing::error!(
                    error = %e,
                    container = %container,
                    "Azure container request failed"
                );
                StorageError::BackendError(format!("Container request failed: {}", e))
            })?;

        match response.status() {
            StatusCode::CREATED => {
                tracing::info!(
                    container = %container,
                    duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                    "Azure container created"
                );
                Ok(())
            }
            // ContainerAlreadyExists
            StatusCode::CONFLICT => {
                tracing::debug!(container = %container, "Azure container already exists");
                Ok(())
            }
            status => {
                let body = response.text().await.unwrap_or_default();
                tracing::error!(
                    status = %status,
                    container = %container,
                    body = %body,
                    "Azure container creation failed"
                );
                Err(StorageError::BackendError(format!(
                    "Container creation for {} returned {}",
                    container, status
                )))
            }
        }
    }
}

/// SharedKey string-to-sign for `PUT {container}?restype=container` with an empty body.
///
/// The eleven standard header slots (Content-Encoding through Range) are all empty;
/// the canonicalized `x-ms-*` headers follow in lexicographic order.
pub(crate) fn create_container_string_to_sign(
    date: &str,
    account_name: &str,
    url_path: &str,
) -> String {
    let mut s = String::from("PUT\n");
    s.push_str(&"\n".repeat(11));
    s.push_str(&format!("x-ms-blob-public-access:{}\n", PUBLIC_ACCESS));
    s.push_str(&format!("x-ms-date:{}\n", date));
    s.push_str(&format!("x-ms-version:{}\n", API_VERSION));
    s.push_str(&format!("/{}{}\nrestype:container", account_name, url_path));
    s
}

pub(crate) fn sign(key: &[u8], string_to_sign: &str) -> StorageResult<String> {
    let mut mac = HmacSha256::new_from_slice(key)
        .map_err(|e| StorageError::ConfigError(format!("Invalid account key: {}", e)))?;
    mac.update(string_to_sign.as_bytes());
    Ok(STANDARD.encode(mac.finalize().into_bytes()))
}
