//! HTTP catalog search client.
//!
//! Both catalog backends (the shop and the curated archive) speak the same
//! search contract, so one client type serves either; it is instantiated once
//! per backend with that backend's base URL and token.

use async_trait::async_trait;
use reqwest::StatusCode;
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use secrecy::ExposeSecret;
use url::Url;

use crate::config::BackendConfig;

use super::types::{CatalogQuery, ProductPage};
use super::{CatalogSource, CommerceError};

/// Catalog search client for a single backend.
#[derive(Clone)]
pub struct HttpCatalogSource {
    client: reqwest::Client,
    search_url: Url,
}

impl HttpCatalogSource {
    /// Create a catalog client for one backend.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client fails to build or the backend URL
    /// cannot be extended with the search path.
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

        let search_url = config
            .base_url
            .join("catalog/search")
            .map_err(|e| CommerceError::Parse(e.to_string()))?;

        Ok(Self { client, search_url })
    }
}

#[async_trait]
impl CatalogSource for HttpCatalogSource {
    async fn product_page(&self, query: &CatalogQuery) -> Result<ProductPage, CommerceError> {
        let response = self
            .client
            .post(self.search_url.clone())
            .json(query)
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

        // The backend answers 404 when the filter names an entity it has
        // never heard of (unknown artist, format, or tag).
        if status == StatusCode::NOT_FOUND {
            return Err(CommerceError::NotFound(query.filter.clone()));
        }

        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(CommerceError::Api {
                status: status.as_u16(),
                message,
            });
        }

        response
            .json::<ProductPage>()
            .await
            .map_err(|e| CommerceError::Parse(e.to_string()))
    }
}
