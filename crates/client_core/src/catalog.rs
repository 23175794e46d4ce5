//! Product catalog view: one read per activation, rendered as
//! loading / error / empty / list.

use shared::{domain::Product, error::StorefrontError};
use tracing::{debug, error, info};

use crate::{
    api::StorefrontApi,
    outcome::{RequestGeneration, RequestOutcome},
    shell::Route,
};

pub const LOADING_TEXT: &str = "Loading products...";
pub const EMPTY_TEXT: &str = "No products available";
pub const HEADING_TEXT: &str = "Available Products";
pub const ORDER_LINK_TEXT: &str = "Click Here to Order";

/// One rendered product block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductEntry {
    pub name: String,
    pub id_line: String,
    pub stock_line: String,
    pub price_line: String,
}

impl From<&Product> for ProductEntry {
    fn from(product: &Product) -> Self {
        Self {
            name: product.name.clone(),
            id_line: format!("ID: {}", product.item_id),
            stock_line: format!("Stock: {}", product.stock),
            price_line: format!("Price: {}", product.price_label()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogRender {
    Loading,
    Error(String),
    Empty,
    Items(Vec<ProductEntry>),
}

impl CatalogRender {
    pub fn lines(&self) -> Vec<String> {
        let mut lines = match self {
            CatalogRender::Loading => vec![LOADING_TEXT.to_string()],
            CatalogRender::Error(message) => vec![format!("Error: {message}")],
            CatalogRender::Empty => vec![HEADING_TEXT.to_string(), EMPTY_TEXT.to_string()],
            CatalogRender::Items(entries) => {
                let mut lines = vec![HEADING_TEXT.to_string()];
                for entry in entries {
                    lines.push(String::new());
                    lines.push(entry.name.clone());
                    lines.push(format!("  {}", entry.id_line));
                    lines.push(format!("  {}", entry.stock_line));
                    lines.push(format!("  {}", entry.price_line));
                }
                lines
            }
        };
        lines.push(String::new());
        lines.push(format!("[{ORDER_LINK_TEXT}] -> {}", Route::Order.path()));
        lines
    }

    pub fn item_count(&self) -> usize {
        match self {
            CatalogRender::Items(entries) => entries.len(),
            _ => 0,
        }
    }
}

#[derive(Debug)]
pub struct CatalogView {
    outcome: RequestOutcome<Vec<Product>>,
    generation: RequestGeneration,
}

impl Default for CatalogView {
    fn default() -> Self {
        Self::new()
    }
}

impl CatalogView {
    pub fn new() -> Self {
        Self {
            outcome: RequestOutcome::Pending,
            generation: RequestGeneration::default(),
        }
    }

    pub fn outcome(&self) -> &RequestOutcome<Vec<Product>> {
        &self.outcome
    }

    /// Marks the view loading and returns the generation the fetch must
    /// report back with.
    pub fn begin_activation(&mut self) -> u64 {
        self.outcome = RequestOutcome::Pending;
        self.generation.begin()
    }

    /// Applies a fetch result. Returns false when a newer activation has
    /// started since `generation` was issued.
    pub fn complete(
        &mut self,
        generation: u64,
        result: Result<Vec<Product>, StorefrontError>,
    ) -> bool {
        if !self.generation.is_current(generation) {
            debug!(
                generation,
                latest = self.generation.latest(),
                "dropping superseded catalog response"
            );
            return false;
        }

        self.outcome = match result {
            Ok(products) => {
                info!(items = products.len(), "catalog loaded");
                RequestOutcome::Success(products)
            }
            Err(err) => {
                error!(error = %err, "error fetching products");
                RequestOutcome::Failure(failure_message(err))
            }
        };
        true
    }

    /// Issues exactly one catalog read and applies its result.
    pub async fn activate(&mut self, api: &dyn StorefrontApi) {
        let generation = self.begin_activation();
        let result = api.list_products().await;
        self.complete(generation, result);
    }

    pub fn render(&self) -> CatalogRender {
        match &self.outcome {
            RequestOutcome::Pending => CatalogRender::Loading,
            RequestOutcome::Failure(message) => CatalogRender::Error(message.clone()),
            RequestOutcome::Success(products) if products.is_empty() => CatalogRender::Empty,
            RequestOutcome::Success(products) => {
                CatalogRender::Items(products.iter().map(ProductEntry::from).collect())
            }
        }
    }
}

fn failure_message(err: StorefrontError) -> String {
    match err {
        StorefrontError::ServerRejection { message, .. } => message,
        StorefrontError::Transport(message) => message,
        StorefrontError::Validation(_) => err.to_string(),
    }
}

#[cfg(test)]
#[path = "tests/catalog_tests.rs"]
mod tests;
