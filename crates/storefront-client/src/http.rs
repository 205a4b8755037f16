//! HTTP implementation of [`CartBackend`] over reqwest.
//!
//! Every request carries an `X-Request-Id` so a failed sync can be matched to
//! a server log line. The client keeps cookies, so a session cookie set by the
//! storefront login flow is sent back on later calls.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use storefront_core::types::CartItem;
use tracing::{debug, warn};
use url::Url;
use uuid::Uuid;

use crate::api::{
    CartBackend, CartDataResponse, CreateOrderRequest, CreateOrderResponse, ErrorBody,
    UpdateQuantityRequest, CART_DATA_PATH, CREATE_ORDER_PATH, UPDATE_QUANTITY_PATH,
};
use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};

const REQUEST_ID_HEADER: &str = "x-request-id";

/// Storefront API client.
#[derive(Clone)]
pub struct HttpBackend {
    inner: Arc<HttpBackendInner>,
}

struct HttpBackendInner {
    client: reqwest::Client,
    base_url: Url,
}

impl HttpBackend {
    /// Builds a client from validated configuration.
    ///
    /// # Errors
    ///
    /// Returns error if the config is invalid, the token is not a legal
    /// header value, or the HTTP client fails to build.
    pub fn new(config: &ClientConfig) -> ClientResult<Self> {
        config.validate()?;

        let mut headers = HeaderMap::new();
        if let Some(token) = &config.api.auth_token {
            let value = HeaderValue::from_str(&format!("Bearer {token}"))
                .map_err(|e| ClientError::InvalidConfig(format!("Invalid auth token: {e}")))?;
            headers.insert(AUTHORIZATION, value);
        }

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .cookie_store(true)
            .timeout(config.timeout())
            .build()?;

        Ok(Self {
            inner: Arc::new(HttpBackendInner {
                client,
                base_url: Url::parse(&config.api.base_url)?,
            }),
        })
    }

    fn url(&self, path: &str) -> ClientResult<Url> {
        // Keep any path prefix on the base URL ("https://host/api" + "/users/...")
        let base = self.inner.base_url.as_str().trim_end_matches('/');
        Ok(Url::parse(&format!("{base}{path}"))?)
    }

    async fn get<T: serde::de::DeserializeOwned>(&self, path: &str) -> ClientResult<T> {
        let request_id = Uuid::new_v4();
        debug!(%request_id, path, "GET");

        let response = self
            .inner
            .client
            .get(self.url(path)?)
            .header(REQUEST_ID_HEADER, request_id.to_string())
            .send()
            .await?;
        self.handle_response(response).await
    }

    async fn post<T: serde::de::DeserializeOwned, B: serde::Serialize + Sync>(
        &self,
        path: &str,
        body: &B,
    ) -> ClientResult<T> {
        let request_id = Uuid::new_v4();
        debug!(%request_id, path, "POST");

        let response = self
            .inner
            .client
            .post(self.url(path)?)
            .header(REQUEST_ID_HEADER, request_id.to_string())
            .json(body)
            .send()
            .await?;
        self.handle_response(response).await
    }

    /// Like [`post`](Self::post) but ignores the success body.
    async fn post_ack<B: serde::Serialize + Sync>(&self, path: &str, body: &B) -> ClientResult<()> {
        let request_id = Uuid::new_v4();
        debug!(%request_id, path, "POST");

        let response = self
            .inner
            .client
            .post(self.url(path)?)
            .header(REQUEST_ID_HEADER, request_id.to_string())
            .json(body)
            .send()
            .await?;

        if response.status().is_success() {
            return Ok(());
        }
        Err(Self::parse_error(response).await)
    }

    async fn handle_response<T: serde::de::DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> ClientResult<T> {
        let status = response.status();

        if status.is_success() {
            let bytes = response.bytes().await?;
            return serde_json::from_slice(&bytes).map_err(ClientError::from);
        }

        Err(Self::parse_error(response).await)
    }

    /// Turns a non-2xx response into [`ClientError::Api`], preferring the
    /// server's `{ "message": ... }` over the raw body.
    async fn parse_error(response: reqwest::Response) -> ClientError {
        let status = response.status().as_u16();
        let text = response.text().await.unwrap_or_default();

        let message = serde_json::from_str::<ErrorBody>(&text)
            .ok()
            .and_then(|b| b.message)
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| {
                if text.is_empty() {
                    format!("Request failed with status {status}")
                } else {
                    text
                }
            });

        warn!(status, %message, "API request failed");
        ClientError::Api { status, message }
    }
}

#[async_trait]
impl CartBackend for HttpBackend {
    async fn fetch_cart(&self) -> ClientResult<Vec<CartItem>> {
        let body: CartDataResponse = self.get(CART_DATA_PATH).await?;
        Ok(body.into_items())
    }

    async fn update_quantity(&self, cart_item_id: &str, quantity: i64) -> ClientResult<()> {
        let body = UpdateQuantityRequest {
            cart_item_id: cart_item_id.to_string(),
            quantity,
        };
        self.post_ack(UPDATE_QUANTITY_PATH, &body).await
    }

    async fn create_order(&self, request: &CreateOrderRequest) -> ClientResult<String> {
        let body: CreateOrderResponse = self.post(CREATE_ORDER_PATH, request).await?;
        Ok(body.order_number)
    }
}

impl std::fmt::Debug for HttpBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpBackend")
            .field("base_url", &self.inner.base_url.as_str())
            .finish_non_exhaustive()
    }
}
