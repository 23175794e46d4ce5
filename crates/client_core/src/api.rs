use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use shared::{
    domain::{OrderDraft, Product},
    error::StorefrontError,
    protocol::{classify_error_body, error_message_from_body, ErrorBody, OrderResponse},
};
use tracing::{debug, warn};

use crate::{config::Endpoints, session::SessionProvider};

pub const CATALOG_FETCH_FAILED: &str = "Failed to fetch products";

#[async_trait]
pub trait StorefrontApi: Send + Sync {
    async fn list_products(&self) -> Result<Vec<Product>, StorefrontError>;
    async fn submit_order(&self, draft: &OrderDraft) -> Result<OrderResponse, StorefrontError>;
}

pub struct HttpStorefrontClient {
    http: Client,
    endpoints: Endpoints,
    session: Arc<dyn SessionProvider>,
}

impl HttpStorefrontClient {
    pub fn new(endpoints: Endpoints, session: Arc<dyn SessionProvider>) -> Self {
        Self {
            http: Client::new(),
            endpoints,
            session,
        }
    }

    pub fn with_timeout(
        endpoints: Endpoints,
        session: Arc<dyn SessionProvider>,
        timeout: Option<Duration>,
    ) -> Result<Self, reqwest::Error> {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            http: builder.build()?,
            endpoints,
            session,
        })
    }

    async fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match self.session.bearer_token().await {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }
}

fn transport(err: reqwest::Error) -> StorefrontError {
    StorefrontError::Transport(err.to_string())
}

async fn rejection(response: Response, fallback: &str) -> StorefrontError {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    let message = error_message_from_body(&body).unwrap_or_else(|| fallback.to_string());
    warn!(status = status.as_u16(), %message, "storefront request rejected");
    StorefrontError::ServerRejection {
        status: status.as_u16(),
        message,
    }
}

fn status_fallback(status: StatusCode) -> String {
    match status.canonical_reason() {
        Some(reason) => format!("{} {reason}", status.as_u16()),
        None => format!("HTTP {}", status.as_u16()),
    }
}

#[async_trait]
impl StorefrontApi for HttpStorefrontClient {
    async fn list_products(&self) -> Result<Vec<Product>, StorefrontError> {
        let request = self.authorize(self.http.get(self.endpoints.catalog.clone())).await;
        let response = request.send().await.map_err(transport)?;
        if !response.status().is_success() {
            return Err(rejection(response, CATALOG_FETCH_FAILED).await);
        }
        let products: Vec<Product> = response.json().await.map_err(transport)?;
        debug!(items = products.len(), "catalog response decoded");
        Ok(products)
    }

    async fn submit_order(&self, draft: &OrderDraft) -> Result<OrderResponse, StorefrontError> {
        let request = self
            .authorize(self.http.post(self.endpoints.order.clone()).json(draft))
            .await;
        let response = request.send().await.map_err(transport)?;
        let status = response.status();
        if status.is_success() {
            let body: OrderResponse = response.json().await.map_err(transport)?;
            debug!(status = status.as_u16(), "order accepted");
            return Ok(body);
        }

        let body = response.text().await.map_err(transport)?;
        let message = match classify_error_body(&body) {
            ErrorBody::Message(message) => message,
            ErrorBody::Unlabelled => status_fallback(status),
            // A failure reply that is not JSON counts as no usable response.
            ErrorBody::NotJson => {
                return Err(StorefrontError::Transport(format!(
                    "order endpoint answered {} with a non-JSON body",
                    status.as_u16()
                )))
            }
        };
        warn!(status = status.as_u16(), %message, "order rejected");
        Err(StorefrontError::ServerRejection {
            status: status.as_u16(),
            message,
        })
    }
}
