//! HTTP want-list store client.
//!
//! The want-list lives in the account subsystem of the shop backend; this
//! client only lists and deletes entries.

use async_trait::async_trait;
use reqwest::StatusCode;
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use secrecy::ExposeSecret;
use serde::Deserialize;
use spindle_core::AccountId;
use url::Url;

use crate::config::BackendConfig;

use super::types::WantlistEntry;
use super::{CommerceError, WantlistStore};

#[derive(Debug, Deserialize)]
struct WantlistResponse {
    entries: Vec<WantlistEntry>,
}

/// Want-list store client for the shop backend.
#[derive(Clone)]
pub struct HttpWantlistStore {
    client: reqwest::Client,
    base_url: Url,
}

impl HttpWantlistStore {
    /// Create a want-list client for the shop backend.
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

    fn entry_url(&self, account: &AccountId, entry_id: &str) -> Result<Url, CommerceError> {
        self.base_url
            .join(&format!("accounts/{account}/wantlist/{entry_id}"))
            .map_err(|e| CommerceError::Parse(e.to_string()))
    }
}

#[async_trait]
impl WantlistStore for HttpWantlistStore {
    async fn list(&self, account: &AccountId) -> Result<Vec<WantlistEntry>, CommerceError> {
        let url = self
            .base_url
            .join(&format!("accounts/{account}/wantlist"))
            .map_err(|e| CommerceError::Parse(e.to_string()))?;

        let response = self.client.get(url).send().await?;
        let status = response.status();

        // An account with no want-list at all reads as empty, not missing.
        if status == StatusCode::NOT_FOUND {
            return Ok(Vec::new());
        }

        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(CommerceError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body: WantlistResponse = response
            .json()
            .await
            .map_err(|e| CommerceError::Parse(e.to_string()))?;

        Ok(body.entries)
    }

    async fn remove(
        &self,
        account: &AccountId,
        entry: &WantlistEntry,
    ) -> Result<(), CommerceError> {
        let url = self.entry_url(account, &entry.id)?;

        let response = self.client.delete(url).send().await?;
        let status = response.status();

        // Already deleted elsewhere; removal is idempotent.
        if status == StatusCode::NOT_FOUND {
            return Ok(());
        }

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
