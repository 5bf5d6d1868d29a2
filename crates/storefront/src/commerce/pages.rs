//! HTTP client for the rendered-page cache purge API.
//!
//! The rendered-page cache is external and time-based; this client only
//! instructs it to evict, either one path at a time or the whole tree.

use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use secrecy::ExposeSecret;
use serde::Serialize;
use url::Url;

use crate::config::PageCacheConfig;

use super::{CommerceError, PageCache};

#[derive(Debug, Serialize)]
struct PurgeRequest<'a> {
    path: &'a str,
}

/// Purge client for the rendered-page cache.
#[derive(Clone)]
pub struct HttpPageCache {
    client: reqwest::Client,
    purge_url: Url,
    purge_all_url: Url,
}

impl HttpPageCache {
    /// Create a purge client.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client fails to build or the purge URLs
    /// cannot be assembled.
    pub fn new(config: &PageCacheConfig) -> Result<Self, CommerceError> {
        let mut headers = HeaderMap::new();
        if let Some(token) = &config.access_token {
            let auth_value = format!("Bearer {}", token.expose_secret());
            headers.insert(
                AUTHORIZATION,
                HeaderValue::from_str(&auth_value)
                    .map_err(|e| CommerceError::Parse(format!("Invalid access token: {e}")))?,
            );
        }

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(config.timeout)
            .build()?;

        let purge_url = config
            .base_url
            .join("purge")
            .map_err(|e| CommerceError::Parse(e.to_string()))?;
        let purge_all_url = config
            .base_url
            .join("purge-all")
            .map_err(|e| CommerceError::Parse(e.to_string()))?;

        Ok(Self {
            client,
            purge_url,
            purge_all_url,
        })
    }
}

#[async_trait]
impl PageCache for HttpPageCache {
    async fn purge(&self, path: &str) -> Result<(), CommerceError> {
        let response = self
            .client
            .post(self.purge_url.clone())
            .json(&PurgeRequest { path })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(CommerceError::Api {
                status: status.as_u16(),
                message,
            });
        }

        Ok(())
    }

    async fn purge_all(&self) -> Result<(), CommerceError> {
        let response = self.client.post(self.purge_all_url.clone()).send().await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(CommerceError::Api {
                status: status.as_u16(),
                message,
            });
        }

        Ok(())
    }
}
