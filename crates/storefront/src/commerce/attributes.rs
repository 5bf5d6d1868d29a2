//! HTTP batch attribute client for the shop backend.
//!
//! Each attribute class has its own endpoint; all three accept a handle list
//! and return a `{"values": {handle: value}}` map. Handles absent from the
//! response are "backend has no value", never an error.

use std::collections::HashMap;

use async_trait::async_trait;
use reqwest::StatusCode;
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use secrecy::ExposeSecret;
use serde::de::DeserializeOwned;
use spindle_core::Handle;
use url::Url;

use crate::config::BackendConfig;

use super::types::{AttributeBatchRequest, AttributeBatchResponse, AttributeClass, AttributeValue};
use super::{AttributeSource, CommerceError};

/// Batch attribute lookup client.
#[derive(Clone)]
pub struct HttpAttributeSource {
    client: reqwest::Client,
    base_url: Url,
}

impl HttpAttributeSource {
    /// Create an attribute client for the shop backend.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client fails to build.
    pub fn new(config: &BackendConfig) -> Result<Self, CommerceError> {
        let mut headers = HeaderMap::new();
        let auth_value = format!("Bearer {}", config.access_token.expose_secret());
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&auth_value)
                .map_err(|e| CommerceError::Parse(format!("Invalid access token: {e}")))?,
        );

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(config.timeout)
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.clone(),
        })
    }

    /// Issue one batch request and decode the per-handle value map.
    async fn batch<V: DeserializeOwned>(
        &self,
        class: AttributeClass,
        handles: &[Handle],
    ) -> Result<HashMap<Handle, V>, CommerceError> {
        let url = self
            .base_url
            .join(class.endpoint())
            .map_err(|e| CommerceError::Parse(e.to_string()))?;

        let response = self
            .client
            .post(url)
            .json(&AttributeBatchRequest { handles })
            .send()
            .await?;

        let status = response.status();

        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get("Retry-After")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok())
                .unwrap_or(1);
            return Err(CommerceError::RateLimited(retry_after));
        }

        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(CommerceError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body: AttributeBatchResponse<V> = response
            .json()
            .await
            .map_err(|e| CommerceError::Parse(e.to_string()))?;

        Ok(body.values)
    }
}

#[async_trait]
impl AttributeSource for HttpAttributeSource {
    async fn fetch(
        &self,
        class: AttributeClass,
        handles: &[Handle],
    ) -> Result<HashMap<Handle, AttributeValue>, CommerceError> {
        let values = match class {
            AttributeClass::Stock => self
                .batch::<bool>(class, handles)
                .await?
                .into_iter()
                .map(|(handle, v)| (handle, AttributeValue::Stock(v)))
                .collect(),
            AttributeClass::Formats => self
                .batch::<Vec<String>>(class, handles)
                .await?
                .into_iter()
                .map(|(handle, v)| (handle, AttributeValue::Formats(v)))
                .collect(),
            AttributeClass::ArtistName => self
                .batch::<String>(class, handles)
                .await?
                .into_iter()
                .map(|(handle, v)| (handle, AttributeValue::ArtistName(v)))
                .collect(),
        };

        Ok(values)
    }
}
