//! HTTP client for the catalog persistence API.
//!
//! Products are read with `GET products/{id}`, created with `POST products`
//! and replaced with `PUT products/{id}`. Every call answers with the stored
//! [`Product`]. Failed calls are never retried here; the editing session is
//! left untouched by a failed submission, so the caller can simply resubmit.

use std::fmt;
use std::time::Duration;

use reqwest::{Client, RequestBuilder, StatusCode, Url};
use serde::de::DeserializeOwned;
use storefront_core::{AppConfig, Product, ProductCreate, ProductUpdate};

use crate::error::ClientError;

const PRODUCTS_PATH: &str = "products";

/// Client for the catalog persistence API.
///
/// Use [`CatalogClient::new`] with loaded configuration, or
/// [`CatalogClient::with_base_url`] to point at a mock server in tests.
pub struct CatalogClient {
    client: Client,
    base_url: Url,
    token: Option<String>,
}

impl fmt::Debug for CatalogClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CatalogClient")
            .field("base_url", &self.base_url.as_str())
            .field("token", &self.token.as_ref().map(|_| "[redacted]"))
            .finish_non_exhaustive()
    }
}

impl CatalogClient {
    /// Builds a client from application configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed, or [`ClientError::InvalidBaseUrl`] if the
    /// configured base URL does not parse.
    pub fn new(config: &AppConfig) -> Result<Self, ClientError> {
        Self::with_base_url(
            &config.api_base_url,
            config.http_timeout_secs,
            &config.user_agent,
            config.api_token.as_deref(),
        )
    }

    /// Builds a client against an explicit base URL.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed, or [`ClientError::InvalidBaseUrl`] if
    /// `base_url` is not an absolute http(s) URL.
    pub fn with_base_url(
        base_url: &str,
        timeout_secs: u64,
        user_agent: &str,
        token: Option<&str>,
    ) -> Result<Self, ClientError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;

        // Exactly one trailing slash, so joined paths extend the base path
        // instead of replacing its last segment.
        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let parsed = Url::parse(&normalised).map_err(|e| ClientError::InvalidBaseUrl {
            url: base_url.to_string(),
            reason: e.to_string(),
        })?;
        if parsed.cannot_be_a_base() {
            return Err(ClientError::InvalidBaseUrl {
                url: base_url.to_string(),
                reason: "URL cannot be used as a base".to_string(),
            });
        }

        Ok(Self {
            client,
            base_url: parsed,
            token: token.map(str::to_owned).filter(|t| !t.is_empty()),
        })
    }

    /// Fetches one stored product.
    ///
    /// # Errors
    ///
    /// - [`ClientError::NotFound`] if the product does not exist.
    /// - [`ClientError::UnexpectedStatus`] on any other non-2xx status.
    /// - [`ClientError::Http`] on network failure.
    /// - [`ClientError::Deserialize`] if the body is not a product.
    pub async fn get_product(&self, product_id: &str) -> Result<Product, ClientError> {
        let url = self.product_url(Some(product_id));
        let request = self.client.get(url.clone());
        self.send(request, &url, &format!("get_product(id={product_id})"))
            .await
    }

    /// Creates a product and returns it as stored, ids assigned.
    ///
    /// # Errors
    ///
    /// - [`ClientError::UnexpectedStatus`] on a non-2xx status.
    /// - [`ClientError::Http`] on network failure.
    /// - [`ClientError::Deserialize`] if the body is not a product.
    pub async fn create_product(&self, payload: &ProductCreate) -> Result<Product, ClientError> {
        let url = self.product_url(None);
        let request = self.client.post(url.clone()).json(payload);
        let product: Product = self.send(request, &url, "create_product").await?;
        tracing::info!(
            product_id = %product.id,
            variants = product.variants.len(),
            "created product"
        );
        Ok(product)
    }

    /// Replaces a stored product.
    ///
    /// # Errors
    ///
    /// - [`ClientError::NotFound`] if the product does not exist.
    /// - [`ClientError::UnexpectedStatus`] on any other non-2xx status.
    /// - [`ClientError::Http`] on network failure.
    /// - [`ClientError::Deserialize`] if the body is not a product.
    pub async fn update_product(
        &self,
        product_id: &str,
        payload: &ProductUpdate,
    ) -> Result<Product, ClientError> {
        let url = self.product_url(Some(product_id));
        let request = self.client.put(url.clone()).json(payload);
        let product: Product = self
            .send(request, &url, &format!("update_product(id={product_id})"))
            .await?;
        tracing::info!(
            product_id = %product.id,
            variants = product.variants.len(),
            "updated product"
        );
        Ok(product)
    }

    /// `{base}/products` or `{base}/products/{id}`, with the id
    /// percent-encoded as a single path segment.
    fn product_url(&self, product_id: Option<&str>) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push(PRODUCTS_PATH);
            if let Some(id) = product_id {
                segments.push(id);
            }
        }
        url
    }

    /// Sends a request, maps non-2xx statuses, and parses the JSON body.
    async fn send<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        url: &Url,
        context: &str,
    ) -> Result<T, ClientError> {
        let request = match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        };

        let response = request.send().await?;
        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(ClientError::NotFound {
                url: url.to_string(),
            });
        }
        if !status.is_success() {
            tracing::warn!(%url, status = status.as_u16(), "catalog API returned an error status");
            return Err(ClientError::UnexpectedStatus {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| ClientError::Deserialize {
            context: context.to_string(),
            source: e,
        })
    }
}
