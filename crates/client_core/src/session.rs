//! Identity collaborator seam. The storefront never authenticates anyone
//! itself; it asks a [`SessionProvider`] who is signed in and which bearer
//! token (if any) to attach to requests.

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use tracing::info;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub username: String,
    pub signed_in_at: DateTime<Utc>,
}

#[async_trait]
pub trait SessionProvider: Send + Sync {
    async fn current_user(&self) -> Option<AuthenticatedUser>;
    async fn bearer_token(&self) -> Option<String>;
    async fn sign_out(&self) -> Result<()>;
}

struct StaticSessionState {
    user: Option<AuthenticatedUser>,
    token: Option<String>,
}

/// Session handed in from configuration: a fixed user and optional token,
/// cleared on sign-out.
pub struct StaticSession {
    state: RwLock<StaticSessionState>,
}

impl StaticSession {
    pub fn new(username: impl Into<String>, token: Option<String>) -> Self {
        Self {
            state: RwLock::new(StaticSessionState {
                user: Some(AuthenticatedUser {
                    username: username.into(),
                    signed_in_at: Utc::now(),
                }),
                token,
            }),
        }
    }

    pub fn signed_out() -> Self {
        Self {
            state: RwLock::new(StaticSessionState {
                user: None,
                token: None,
            }),
        }
    }
}

#[async_trait]
impl SessionProvider for StaticSession {
    async fn current_user(&self) -> Option<AuthenticatedUser> {
        self.state.read().await.user.clone()
    }

    async fn bearer_token(&self) -> Option<String> {
        let state = self.state.read().await;
        state.user.as_ref()?;
        state.token.clone()
    }

    async fn sign_out(&self) -> Result<()> {
        let mut state = self.state.write().await;
        if let Some(user) = state.user.take() {
            info!(username = %user.username, "signed out");
        }
        state.token = None;
        Ok(())
    }
}
