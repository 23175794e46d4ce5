//! Client-side core of the storefront: endpoint client, catalog and order
//! view models, and the routing shell that hosts them.

pub mod api;
pub mod catalog;
pub mod config;
pub mod order_form;
pub mod outcome;
pub mod session;
pub mod shell;

pub use api::{HttpStorefrontClient, StorefrontApi};
pub use catalog::{CatalogRender, CatalogView, ProductEntry};
pub use config::{load_settings, ConfigError, Endpoints, Settings};
pub use order_form::{Notice, OrderPhase, OrderRender, OrderView, SubmitError};
pub use outcome::{RequestGeneration, RequestOutcome};
pub use session::{AuthenticatedUser, SessionProvider, StaticSession};
pub use shell::{Route, Shell, ShellError};

#[cfg(test)]
#[path = "tests/api_tests.rs"]
mod api_tests;

#[cfg(test)]
#[path = "tests/support.rs"]
pub(crate) mod test_support;
