//! Order API client.

use std::time::Duration;

use async_trait::async_trait;
use mockall::automock;
use reqwest::{Client, RequestBuilder, Response};
use thiserror::Error;
use tracing::debug;

use crate::{
    geolocation::Coordinates,
    identity::UserId,
    orders::models::{OrderRecord, OrderRequest},
};

/// Errors that can occur when talking to the order service.
#[derive(Debug, Error)]
pub enum OrdersApiError {
    /// An HTTP transport or serialization error occurred.
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// The order service returned a non-2xx response.
    #[error("order service responded with status {status}: {body}")]
    UnexpectedResponse {
        /// HTTP status code
        status: u16,

        /// Response body, possibly empty
        body: String,
    },
}

impl OrdersApiError {
    /// Best message to show the shopper.
    ///
    /// Uses the service's own error text when it sent one.
    pub fn user_message(&self) -> String {
        match self {
            OrdersApiError::UnexpectedResponse { body, .. } if !body.trim().is_empty() => {
                body.trim().to_string()
            }
            OrdersApiError::UnexpectedResponse { status, .. } => {
                format!("The order service responded with status {status}")
            }
            OrdersApiError::Http(_) => "Could not reach the order service".to_string(),
        }
    }
}

/// Order placement and history endpoints.
#[automock]
#[async_trait]
pub trait OrdersApi: Send + Sync {
    /// Place an order, returning the service's acknowledgement text.
    async fn place_order(
        &self,
        order: &OrderRequest,
        position: Coordinates,
    ) -> Result<String, OrdersApiError>;

    /// Fetch every order placed by a user.
    async fn fetch_orders(&self, user_id: &UserId) -> Result<Vec<OrderRecord>, OrdersApiError>;
}

/// Configuration for the HTTP order client.
#[derive(Debug, Clone)]
pub struct OrdersApiConfig {
    /// Base address, e.g. `"http://localhost:8080"`.
    pub base_url: String,

    /// Bearer token sent with every request.
    pub token: Option<String>,

    /// Per-request timeout.
    pub timeout: Duration,
}

/// HTTP client for the order service.
#[derive(Debug, Clone)]
pub struct HttpOrdersApi {
    config: OrdersApiConfig,
    http: Client,
}

impl HttpOrdersApi {
    /// Create a new client from the given configuration.
    #[must_use]
    pub fn new(config: OrdersApiConfig) -> Self {
        Self {
            config,
            http: Client::new(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.config.base_url.trim_end_matches('/'))
    }

    fn authorised(&self, request: RequestBuilder) -> RequestBuilder {
        let request = request.timeout(self.config.timeout);

        match &self.config.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }
}

#[async_trait]
impl OrdersApi for HttpOrdersApi {
    async fn place_order(
        &self,
        order: &OrderRequest,
        position: Coordinates,
    ) -> Result<String, OrdersApiError> {
        let request = self
            .http
            .post(self.url("/user/place-order"))
            .query(&[
                ("latitude", position.latitude),
                ("longitude", position.longitude),
            ])
            .json(order);

        let response = ensure_success(self.authorised(request).send().await?).await?;

        let acknowledgement = response.text().await?;

        debug!(user_id = %order.user_id, %acknowledgement, "order placed");

        Ok(acknowledgement)
    }

    async fn fetch_orders(&self, user_id: &UserId) -> Result<Vec<OrderRecord>, OrdersApiError> {
        let request = self
            .http
            .get(self.url("/user/your-order"))
            .query(&[("id", user_id.as_str())]);

        let response = ensure_success(self.authorised(request).send().await?).await?;

        Ok(response.json().await?)
    }
}

async fn ensure_success(response: Response) -> Result<Response, OrdersApiError> {
    if response.status().is_success() {
        return Ok(response);
    }

    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_else(|err| {
        debug!(status, error = %err, "failed to read error response body");
        String::new()
    });

    Err(OrdersApiError::UnexpectedResponse { status, body })
}
