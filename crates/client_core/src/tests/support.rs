use std::{
    collections::{HashMap, VecDeque},
    sync::Arc,
};

use anyhow::Result;
use async_trait::async_trait;
use axum::{
    extract::State,
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use shared::{
    domain::{ItemId, OrderDraft, Product},
    error::StorefrontError,
    protocol::OrderResponse,
};
use tokio::{
    net::TcpListener,
    sync::{Mutex, Notify},
};

use crate::api::StorefrontApi;

pub fn product(id: &str, name: &str, stock: u64, price: Option<f64>) -> Product {
    Product {
        item_id: ItemId::from(id),
        name: name.to_string(),
        stock,
        price,
    }
}

pub fn valid_draft() -> OrderDraft {
    OrderDraft {
        item_id: "A1".into(),
        quantity: 2,
        customer_email: "buyer@example.com".into(),
    }
}

/// In-memory [`StorefrontApi`] that replays queued results and records calls.
#[derive(Default)]
pub struct ScriptedApi {
    catalog: Mutex<VecDeque<Result<Vec<Product>, StorefrontError>>>,
    orders: Mutex<VecDeque<Result<OrderResponse, StorefrontError>>>,
    catalog_calls: Mutex<u32>,
    submitted: Mutex<Vec<OrderDraft>>,
}

impl ScriptedApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn push_catalog(&self, result: Result<Vec<Product>, StorefrontError>) {
        self.catalog.lock().await.push_back(result);
    }

    pub async fn push_order(&self, result: Result<OrderResponse, StorefrontError>) {
        self.orders.lock().await.push_back(result);
    }

    pub async fn catalog_calls(&self) -> u32 {
        *self.catalog_calls.lock().await
    }

    pub async fn submitted(&self) -> Vec<OrderDraft> {
        self.submitted.lock().await.clone()
    }
}

#[async_trait]
impl StorefrontApi for ScriptedApi {
    async fn list_products(&self) -> Result<Vec<Product>, StorefrontError> {
        *self.catalog_calls.lock().await += 1;
        self.catalog
            .lock()
            .await
            .pop_front()
            .unwrap_or_else(|| Ok(Vec::new()))
    }

    async fn submit_order(&self, draft: &OrderDraft) -> Result<OrderResponse, StorefrontError> {
        self.submitted.lock().await.push(draft.clone());
        self.orders.lock().await.pop_front().unwrap_or_else(|| {
            Err(StorefrontError::Transport(
                "no scripted order response".into(),
            ))
        })
    }
}

/// [`StorefrontApi`] whose calls block until the test releases them.
pub struct GatedApi {
    products: Vec<Product>,
    started: Notify,
    gate: Notify,
}

impl GatedApi {
    pub fn new(products: Vec<Product>) -> Self {
        Self {
            products,
            started: Notify::new(),
            gate: Notify::new(),
        }
    }

    /// Resolves once a call has reached the endpoint.
    pub async fn wait_started(&self) {
        self.started.notified().await;
    }

    pub fn release(&self) {
        self.gate.notify_one();
    }

    async fn hold(&self) {
        self.started.notify_one();
        self.gate.notified().await;
    }
}

#[async_trait]
impl StorefrontApi for GatedApi {
    async fn list_products(&self) -> Result<Vec<Product>, StorefrontError> {
        self.hold().await;
        Ok(self.products.clone())
    }

    async fn submit_order(&self, _draft: &OrderDraft) -> Result<OrderResponse, StorefrontError> {
        self.hold().await;
        Ok(order_ok("Order processed successfully"))
    }
}

pub fn order_ok(message: &str) -> OrderResponse {
    OrderResponse {
        message: message.to_string(),
        ..OrderResponse::default()
    }
}

#[derive(Default)]
pub struct InventoryState {
    pub items: HashMap<String, Product>,
    pub order: Vec<String>,
    pub catalog_failure: Option<(StatusCode, Value)>,
    pub authorization: Vec<Option<String>>,
    pub order_bodies: Vec<Value>,
}

/// Shared handle on the mock inventory service.
#[derive(Clone, Default)]
pub struct InventoryServer {
    pub state: Arc<Mutex<InventoryState>>,
}

impl InventoryServer {
    pub async fn stock_of(&self, id: &str) -> Option<u64> {
        self.state.lock().await.items.get(id).map(|p| p.stock)
    }

    pub async fn fail_catalog(&self, status: StatusCode, body: Value) {
        self.state.lock().await.catalog_failure = Some((status, body));
    }
}

fn record_auth(state: &mut InventoryState, headers: &HeaderMap) {
    state.authorization.push(
        headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string),
    );
}

async fn list_inventory(State(server): State<InventoryServer>, headers: HeaderMap) -> Response {
    let mut state = server.state.lock().await;
    record_auth(&mut state, &headers);
    if let Some((status, body)) = state.catalog_failure.clone() {
        return (status, Json(body)).into_response();
    }
    let items: Vec<&Product> = state
        .order
        .iter()
        .filter_map(|id| state.items.get(id))
        .collect();
    Json(json!(items)).into_response()
}

/// Mirrors the inventory handler: validate, look up, decrement stock.
async fn process_order(
    State(server): State<InventoryServer>,
    headers: HeaderMap,
    body: String,
) -> Response {
    let mut state = server.state.lock().await;
    record_auth(&mut state, &headers);

    if body.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"message": "Missing request body", "status": "error"})),
        )
            .into_response();
    }
    let Ok(order) = serde_json::from_str::<Value>(&body) else {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({"message": "Error processing order: bad json", "status": "error"})),
        )
            .into_response();
    };
    state.order_bodies.push(order.clone());

    let item_id = order
        .get("item_id")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();
    let quantity = order.get("quantity").and_then(Value::as_u64).unwrap_or(1);
    if item_id.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"message": "Missing required field: item_id", "status": "error"})),
        )
            .into_response();
    }

    let Some(item) = state.items.get_mut(&item_id) else {
        return (
            StatusCode::NOT_FOUND,
            Json(json!({"message": "Item not found", "status": "error", "itemAvailable": false})),
        )
            .into_response();
    };

    if item.stock >= quantity {
        item.stock -= quantity;
        Json(json!({
            "message": "Order processed successfully",
            "status": "success",
            "item_id": item_id,
            "itemAvailable": true,
            "availableStock": item.stock,
        }))
        .into_response()
    } else {
        Json(json!({
            "message": format!("Insufficient stock. Only {} items available, Try again.", item.stock),
            "status": "error",
            "itemAvailable": false,
            "availableStock": item.stock,
        }))
        .into_response()
    }
}

async fn not_json() -> Response {
    (StatusCode::BAD_GATEWAY, "<html>bad gateway</html>").into_response()
}

/// The handler answers any method other than GET/POST with a bare JSON string.
async fn wrong_method() -> Response {
    (StatusCode::METHOD_NOT_ALLOWED, Json(json!("Method Not Allowed"))).into_response()
}

async fn unlabelled_conflict() -> Response {
    (StatusCode::CONFLICT, Json(json!({"status": "error"}))).into_response()
}

pub async fn spawn_inventory_server(items: Vec<Product>) -> Result<(String, InventoryServer)> {
    let server = InventoryServer::default();
    {
        let mut state = server.state.lock().await;
        for item in items {
            state.order.push(item.item_id.0.clone());
            state.items.insert(item.item_id.0.clone(), item);
        }
    }

    let app = Router::new()
        .route("/inventory", get(list_inventory).post(process_order))
        .route("/broken", get(not_json).post(not_json))
        .route("/method-not-allowed", post(wrong_method))
        .route("/conflict", post(unlabelled_conflict))
        .with_state(server.clone());

    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    Ok((format!("http://{addr}"), server))
}
