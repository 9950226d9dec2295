//! Blocking HTTP store for S3-compatible endpoints
//!
//! Objects live at `{endpoint}/{bucket}/{key}` (path-style addressing).
//! Requests are unsigned: the endpoint is expected to accept them, e.g. a
//! local MinIO with an anonymous write policy or a signing proxy in front of
//! the bucket.

use crate::{validate_key, ObjectStore, PutOptions, StoreError, StoreResult};
use reqwest::blocking::Client;
use reqwest::header::{CACHE_CONTROL, CONTENT_TYPE};
use reqwest::StatusCode;
use std::time::Duration;
use tracing::{debug, info, warn};
use url::Url;

/// Header carrying the canned ACL.
pub const ACL_HEADER: &str = "x-amz-acl";

/// Connection settings for [`HttpStore`].
#[derive(Debug, Clone)]
pub struct HttpStoreConfig {
    pub endpoint: Url,
    pub bucket: String,
    pub timeout: Duration,
}

impl HttpStoreConfig {
    pub fn new(endpoint: Url, bucket: impl Into<String>) -> Self {
        Self {
            endpoint,
            bucket: bucket.into(),
            timeout: Duration::from_secs(30),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

pub struct HttpStore {
    client: Client,
    config: HttpStoreConfig,
}

impl HttpStore {
    pub fn new(config: HttpStoreConfig) -> StoreResult<Self> {
        if config.endpoint.cannot_be_a_base() {
            return Err(StoreError::InvalidEndpoint(config.endpoint.to_string()));
        }
        if config.bucket.is_empty() || config.bucket.contains('/') {
            return Err(StoreError::InvalidKey(config.bucket));
        }

        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!("pyidx/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(StoreError::Client)?;

        Ok(Self { client, config })
    }

    /// Full URL for `key`, with each segment percent-encoded.
    pub fn object_url(&self, key: &str) -> StoreResult<Url> {
        validate_key(key)?;

        let mut url = self.config.endpoint.clone();
        url.path_segments_mut()
            .map_err(|_| StoreError::InvalidEndpoint(self.config.endpoint.to_string()))?
            .pop_if_empty()
            .push(&self.config.bucket)
            .extend(key.split('/'));
        Ok(url)
    }
}

impl ObjectStore for HttpStore {
    fn name(&self) -> &'static str {
        "http"
    }

    fn fetch(&self, key: &str) -> StoreResult<Vec<u8>> {
        let url = self.object_url(key)?;
        debug!(url = %url, "Fetching object");

        let response = self
            .client
            .get(url)
            .send()
            .map_err(|source| StoreError::Http {
                key: key.to_string(),
                source,
            })?;

        match response.status() {
            status if status.is_success() => {
                let body = response.bytes().map_err(|source| StoreError::Http {
                    key: key.to_string(),
                    source,
                })?;
                debug!(key = %key, size = body.len(), "Fetched object");
                Ok(body.to_vec())
            }
            StatusCode::NOT_FOUND => Err(StoreError::NotFound(key.to_string())),
            status => {
                warn!(key = %key, status = %status, "Fetch failed");
                Err(StoreError::Status {
                    key: key.to_string(),
                    status: status.as_u16(),
                })
            }
        }
    }

    fn store(&self, key: &str, body: &[u8], options: &PutOptions) -> StoreResult<()> {
        let url = self.object_url(key)?;
        debug!(url = %url, size = body.len(), "Storing object");

        let mut request = self
            .client
            .put(url)
            .header(CONTENT_TYPE, &options.content_type)
            .header(ACL_HEADER, &options.acl)
            .body(body.to_vec());
        if let Some(cache_control) = &options.cache_control {
            request = request.header(CACHE_CONTROL, cache_control);
        }

        let response = request.send().map_err(|source| StoreError::Http {
            key: key.to_string(),
            source,
        })?;

        let status = response.status();
        if !status.is_success() {
            warn!(key = %key, status = %status, "Store failed");
            return Err(StoreError::Status {
                key: key.to_string(),
                status: status.as_u16(),
            });
        }

        info!(key = %key, size = body.len(), "Object stored");
        Ok(())
    }
}
