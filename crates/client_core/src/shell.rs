//! Two-route shell around the catalog and order views.
//!
//! The shell only routes. Identity comes from the injected
//! [`SessionProvider`], data from the injected [`StorefrontApi`].
//!
//! Mounting a view and loading its data are separate steps. `navigate`,
//! `refresh_catalog` and `begin_order_submit` leave a [`PendingRequest`]
//! behind; the caller renders the loading state, runs the request and hands
//! the [`Completion`] back through [`Shell::apply`].

use std::{fmt, sync::Arc};

use anyhow::Result;
use shared::{
    domain::Product,
    error::{FieldProblem, StorefrontError},
    protocol::OrderResponse,
};
use thiserror::Error;
use tracing::{debug, info};

use crate::{
    api::StorefrontApi,
    catalog::CatalogView,
    order_form::{OrderPhase, OrderView, PendingSubmission, SubmitError},
    session::{AuthenticatedUser, SessionProvider},
};

pub const SIGN_IN_REQUIRED_TEXT: &str = "Sign in required.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Catalog,
    Order,
}

impl Route {
    pub fn from_path(path: &str) -> Option<Self> {
        match path.trim() {
            "/" => Some(Route::Catalog),
            "/order" => Some(Route::Order),
            _ => None,
        }
    }

    pub fn path(self) -> &'static str {
        match self {
            Route::Catalog => "/",
            Route::Order => "/order",
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

#[derive(Debug, Error)]
pub enum ShellError {
    #[error("no route for path {0:?}")]
    NotFound(String),
    #[error("sign in required")]
    SignedOut,
    #[error("the {0} view is not active")]
    WrongView(Route),
    #[error(transparent)]
    Submit(#[from] SubmitError),
    #[error(transparent)]
    Field(#[from] FieldProblem),
}

#[derive(Debug)]
pub enum ActiveView {
    Catalog(CatalogView),
    Order(OrderView),
}

impl ActiveView {
    pub fn route(&self) -> Route {
        match self {
            ActiveView::Catalog(_) => Route::Catalog,
            ActiveView::Order(_) => Route::Order,
        }
    }
}

enum PendingKind {
    Catalog { generation: u64 },
    Order(PendingSubmission),
}

/// A request the active view has started but not yet sent.
///
/// Owns everything it needs, so it can run while the shell is rendered.
pub struct PendingRequest {
    api: Arc<dyn StorefrontApi>,
    mount: u64,
    kind: PendingKind,
}

impl PendingRequest {
    pub fn route(&self) -> Route {
        match self.kind {
            PendingKind::Catalog { .. } => Route::Catalog,
            PendingKind::Order(_) => Route::Order,
        }
    }

    pub async fn run(self) -> Completion {
        let result = match self.kind {
            PendingKind::Catalog { generation } => CompletionResult::Catalog {
                generation,
                result: self.api.list_products().await,
            },
            PendingKind::Order(submission) => CompletionResult::Order {
                generation: submission.generation,
                result: self.api.submit_order(&submission.draft).await,
            },
        };
        Completion {
            mount: self.mount,
            result,
        }
    }
}

#[derive(Debug)]
enum CompletionResult {
    Catalog {
        generation: u64,
        result: Result<Vec<Product>, StorefrontError>,
    },
    Order {
        generation: u64,
        result: Result<OrderResponse, StorefrontError>,
    },
}

/// Outcome of a [`PendingRequest`], tagged with the view it was issued for.
#[derive(Debug)]
pub struct Completion {
    mount: u64,
    result: CompletionResult,
}

pub struct Shell {
    api: Arc<dyn StorefrontApi>,
    session: Arc<dyn SessionProvider>,
    active: Option<ActiveView>,
    // Bumped on every mount and teardown; completions for older mounts are dropped.
    mount: u64,
    pending: Option<PendingRequest>,
}

impl Shell {
    pub fn new(api: Arc<dyn StorefrontApi>, session: Arc<dyn SessionProvider>) -> Self {
        Self {
            api,
            session,
            active: None,
            mount: 0,
            pending: None,
        }
    }

    pub async fn current_user(&self) -> Option<AuthenticatedUser> {
        self.session.current_user().await
    }

    pub fn active(&self) -> Option<&ActiveView> {
        self.active.as_ref()
    }

    pub fn active_route(&self) -> Option<Route> {
        self.active.as_ref().map(ActiveView::route)
    }

    async fn ensure_signed_in(&self) -> Result<(), ShellError> {
        if self.session.current_user().await.is_none() {
            return Err(ShellError::SignedOut);
        }
        Ok(())
    }

    fn stage(&mut self, kind: PendingKind) {
        self.pending = Some(PendingRequest {
            api: Arc::clone(&self.api),
            mount: self.mount,
            kind,
        });
    }

    fn replace_active(&mut self, view: Option<ActiveView>) {
        self.mount += 1;
        self.pending = None;
        self.active = view;
    }

    /// Mounts a fresh view for `path`. The catalog starts out loading with
    /// its read staged. Unknown paths leave the current view in place.
    pub async fn navigate(&mut self, path: &str) -> Result<Route, ShellError> {
        self.ensure_signed_in().await?;
        let route = Route::from_path(path).ok_or_else(|| ShellError::NotFound(path.to_string()))?;
        info!(%route, "navigating");

        match route {
            Route::Catalog => {
                let mut view = CatalogView::new();
                let generation = view.begin_activation();
                self.replace_active(Some(ActiveView::Catalog(view)));
                self.stage(PendingKind::Catalog { generation });
            }
            Route::Order => self.replace_active(Some(ActiveView::Order(OrderView::new()))),
        }
        Ok(route)
    }

    /// Re-activates the catalog in place.
    pub async fn refresh_catalog(&mut self) -> Result<(), ShellError> {
        self.ensure_signed_in().await?;
        let generation = match self.active.as_mut() {
            Some(ActiveView::Catalog(view)) => view.begin_activation(),
            _ => return Err(ShellError::WrongView(Route::Catalog)),
        };
        self.stage(PendingKind::Catalog { generation });
        Ok(())
    }

    pub async fn edit_order(&mut self, name: &str, value: &str) -> Result<(), ShellError> {
        self.ensure_signed_in().await?;
        let view = self.order_view_mut()?;
        view.edit_input(name, value)?;
        Ok(())
    }

    /// Puts the order view into `Pending` and stages its write.
    pub async fn begin_order_submit(&mut self) -> Result<(), ShellError> {
        self.ensure_signed_in().await?;
        let submission = self.order_view_mut()?.begin_submit()?;
        self.stage(PendingKind::Order(submission));
        Ok(())
    }

    /// Takes the staged request, if any. Until its completion is applied the
    /// active view keeps rendering its loading state.
    pub fn take_pending(&mut self) -> Option<PendingRequest> {
        self.pending.take()
    }

    /// Routes a completion to the view it was issued for. Returns false when
    /// that view has since been replaced or the result is superseded.
    pub fn apply(&mut self, completion: Completion) -> bool {
        if completion.mount != self.mount {
            debug!(
                mount = completion.mount,
                current = self.mount,
                "dropping completion for a replaced view"
            );
            return false;
        }
        match (self.active.as_mut(), completion.result) {
            (Some(ActiveView::Catalog(view)), CompletionResult::Catalog { generation, result }) => {
                view.complete(generation, result)
            }
            (Some(ActiveView::Order(view)), CompletionResult::Order { generation, result }) => {
                view.complete_submit(generation, result)
            }
            _ => false,
        }
    }

    /// Runs the staged request to completion and applies it.
    pub async fn settle(&mut self) -> bool {
        match self.take_pending() {
            Some(pending) => {
                let completion = pending.run().await;
                self.apply(completion)
            }
            None => false,
        }
    }

    pub async fn submit_order(&mut self) -> Result<OrderPhase, ShellError> {
        self.begin_order_submit().await?;
        self.settle().await;
        Ok(self.order_view_mut()?.phase())
    }

    fn order_view_mut(&mut self) -> Result<&mut OrderView, ShellError> {
        match self.active.as_mut() {
            Some(ActiveView::Order(view)) => Ok(view),
            _ => Err(ShellError::WrongView(Route::Order)),
        }
    }

    /// Hands sign-out to the session provider and tears down the active view.
    pub async fn sign_out(&mut self) -> Result<()> {
        self.session.sign_out().await?;
        self.replace_active(None);
        Ok(())
    }

    pub async fn render(&self) -> Vec<String> {
        let Some(user) = self.session.current_user().await else {
            return vec![SIGN_IN_REQUIRED_TEXT.to_string()];
        };

        let mut lines = vec![format!("Signed in as {}  [Sign Out]", user.username)];
        lines.push(String::new());
        match &self.active {
            Some(ActiveView::Catalog(view)) => lines.extend(view.render().lines()),
            Some(ActiveView::Order(view)) => lines.extend(view.render().lines()),
            None => lines.push(format!("Nothing open. Try `go {}`.", Route::Catalog)),
        }
        lines
    }
}

#[cfg(test)]
#[path = "tests/shell_tests.rs"]
mod tests;
