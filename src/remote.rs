//! HTTP client for the server-persisted order store.
//!
//! Talks to the four-route `/api/orders` API served by `bojo-server` (or
//! any backend honoring the same contract). Failures map to friendly
//! messages; callers that need to distinguish "unreachable" from "empty"
//! use [`RemoteStore::fetch`], while the [`OrderStore`] `list` degrades to
//! an empty collection like every other backend.

use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;
use tracing::warn;

use crate::error::{Error, Result};
use crate::order::Order;
use crate::store::OrderStore;

/// Default timeout for API requests.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Success acknowledgement returned by every mutating route.
#[derive(Debug, Deserialize)]
pub struct ApiAck {
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
}

/// Normalise the order API base URL:
/// - strip trailing slashes
/// - strip a trailing `/api` segment (routes add it back)
/// - ensure a scheme is present (https, or http for localhost)
pub fn normalize_base_url(url: &str) -> String {
    let mut url = url.trim().to_string();

    if !url.starts_with("http://") && !url.starts_with("https://") {
        if url.starts_with("localhost") || url.starts_with("127.0.0.1") {
            url = format!("http://{url}");
        } else {
            url = format!("https://{url}");
        }
    }

    while url.ends_with('/') {
        url.pop();
    }

    if url.ends_with("/api") {
        url.truncate(url.len() - 4);
    }

    while url.ends_with('/') {
        url.pop();
    }

    url
}

/// Convert a `reqwest::Error` into a user-friendly message.
fn friendly_error(url: &str, err: &reqwest::Error) -> String {
    if err.is_connect() {
        return format!("Cannot reach order server at {url}");
    }
    if err.is_timeout() {
        return format!("Connection to {url} timed out");
    }
    if err.is_builder() {
        return format!("Invalid order server URL: {url}");
    }
    format!("Network error communicating with {url}: {err}")
}

/// Convert an HTTP status code into a user-friendly message.
fn status_error(status: StatusCode) -> String {
    match status.as_u16() {
        404 => "Order API endpoint not found".to_string(),
        s if s >= 500 => format!("Order server error (HTTP {s})"),
        s => format!("Unexpected response from order server (HTTP {s})"),
    }
}

/// Pull the server's own error message out of a failure body when present.
fn body_detail(status: StatusCode, body_text: &str) -> String {
    if let Ok(json) = serde_json::from_str::<Value>(body_text) {
        if let Some(msg) = json
            .get("error")
            .or_else(|| json.get("message"))
            .and_then(Value::as_str)
        {
            return format!("{msg} (HTTP {})", status.as_u16());
        }
    }
    format!("{} (HTTP {})", status_error(status), status.as_u16())
}

/// Order store reached over the documented HTTP API.
#[derive(Clone)]
pub struct RemoteStore {
    base_url: String,
    client: Client,
}

impl RemoteStore {
    /// Build a client for the API at `base_url` (scheme optional).
    pub fn new(base_url: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .build()
            .map_err(|e| Error::Network(format!("Failed to create HTTP client: {e}")))?;
        Ok(RemoteStore {
            base_url: normalize_base_url(base_url),
            client,
        })
    }

    fn orders_url(&self) -> String {
        format!("{}/api/orders", self.base_url)
    }

    /// GET the full collection, distinguishing failure from empty.
    pub async fn fetch(&self) -> Result<Vec<Order>> {
        let resp = self
            .client
            .get(self.orders_url())
            .send()
            .await
            .map_err(|e| Error::Network(friendly_error(&self.base_url, &e)))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::Network(body_detail(status, &body)));
        }

        resp.json::<Vec<Order>>()
            .await
            .map_err(|e| Error::Network(format!("Invalid JSON from order server: {e}")))
    }

    /// Check a mutating response: HTTP success plus `success: true` ack.
    async fn check_ack(&self, resp: reqwest::Response) -> Result<()> {
        let status = resp.status();
        let body = resp.text().await.unwrap_or_default();
        if !status.is_success() {
            return Err(Error::Network(body_detail(status, &body)));
        }
        let ack: ApiAck = serde_json::from_str(&body)
            .map_err(|e| Error::Network(format!("Invalid JSON from order server: {e}")))?;
        if !ack.success {
            return Err(Error::Network(
                ack.message
                    .unwrap_or_else(|| "order server reported failure".to_string()),
            ));
        }
        Ok(())
    }
}

impl OrderStore for RemoteStore {
    async fn list(&self) -> Vec<Order> {
        match self.fetch().await {
            Ok(orders) => orders,
            Err(e) => {
                warn!("remote order list failed, treating as empty: {e}");
                Vec::new()
            }
        }
    }

    async fn replace_all(&self, orders: &[Order]) -> Result<()> {
        let resp = self
            .client
            .put(self.orders_url())
            .json(&orders)
            .send()
            .await
            .map_err(|e| Error::Network(friendly_error(&self.base_url, &e)))?;
        self.check_ack(resp).await
    }

    // POST a single order; the server does the read-modify-write.
    async fn append(&self, order: &Order) -> Result<()> {
        let resp = self
            .client
            .post(self.orders_url())
            .json(order)
            .send()
            .await
            .map_err(|e| Error::Network(friendly_error(&self.base_url, &e)))?;
        self.check_ack(resp).await
    }

    async fn clear_all(&self) -> Result<()> {
        let resp = self
            .client
            .delete(self.orders_url())
            .send()
            .await
            .map_err(|e| Error::Network(friendly_error(&self.base_url, &e)))?;
        self.check_ack(resp).await
    }
}
