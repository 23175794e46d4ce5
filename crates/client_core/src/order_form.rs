//! Order submission view.
//!
//! The view owns the draft. A submission goes through a validation gate, then
//! `Pending`, then `Success` or `Failure`. While a submission is pending the
//! view refuses another one, so at most one write is ever in flight.

use shared::{
    domain::{FieldEdit, OrderDraft},
    error::{describe_problems, FieldProblem, StorefrontError},
    protocol::OrderResponse,
};
use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::{
    api::StorefrontApi,
    outcome::{RequestGeneration, RequestOutcome},
    shell::Route,
};

pub const PROCESSING_TEXT: &str = "Processing order...";
pub const FALLBACK_ERROR_TEXT: &str = "Oops! Something went wrong, please try again.";
pub const HEADING_TEXT: &str = "Place Your Order";
pub const BACK_LINK_TEXT: &str = "Go Back to Products";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubmitError {
    #[error("an order is already being submitted")]
    AlreadyPending,
    #[error("order not sent: {}", describe_problems(.0))]
    Invalid(Vec<FieldProblem>),
}

/// Message shown under the form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub text: String,
    pub is_error: bool,
}

/// Snapshot of the draft taken when a submission starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingSubmission {
    pub generation: u64,
    pub draft: OrderDraft,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderPhase {
    Idle,
    Pending,
    Confirmed,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderRender {
    pub draft: OrderDraft,
    pub notice: Option<Notice>,
    pub submit_enabled: bool,
}

impl OrderRender {
    pub fn lines(&self) -> Vec<String> {
        let mut lines = vec![
            format!("[{BACK_LINK_TEXT}] -> {}", Route::Catalog.path()),
            String::new(),
            HEADING_TEXT.to_string(),
            format!("  Item ID:        {}", self.draft.item_id),
            format!("  Quantity:       {}", self.draft.quantity),
            format!("  Customer Email: {}", self.draft.customer_email),
        ];
        lines.push(if self.submit_enabled {
            "[Submit Order]".to_string()
        } else {
            "[Submit Order] (disabled while processing)".to_string()
        });
        if let Some(notice) = &self.notice {
            let marker = if notice.is_error { "error" } else { "success" };
            lines.push(format!("({marker}) {}", notice.text));
        }
        lines
    }
}

#[derive(Debug, Default)]
pub struct OrderView {
    draft: OrderDraft,
    outcome: Option<RequestOutcome<OrderResponse>>,
    notice: Option<Notice>,
    generation: RequestGeneration,
}

impl OrderView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn draft(&self) -> &OrderDraft {
        &self.draft
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    pub fn outcome(&self) -> Option<&RequestOutcome<OrderResponse>> {
        self.outcome.as_ref()
    }

    pub fn phase(&self) -> OrderPhase {
        match &self.outcome {
            None => OrderPhase::Idle,
            Some(RequestOutcome::Pending) => OrderPhase::Pending,
            Some(RequestOutcome::Success(_)) => OrderPhase::Confirmed,
            Some(RequestOutcome::Failure(_)) => OrderPhase::Failed,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.outcome.as_ref().is_some_and(RequestOutcome::is_pending)
    }

    pub fn edit(&mut self, edit: FieldEdit) {
        debug!(field = %edit.field(), "order draft edited");
        self.draft.apply(edit);
    }

    /// Applies raw form input. A value that does not fit the field leaves
    /// the draft unchanged.
    pub fn edit_input(&mut self, name: &str, value: &str) -> Result<(), FieldProblem> {
        let edit = FieldEdit::from_input(name, value)?;
        self.edit(edit);
        Ok(())
    }

    /// Runs the validation gate and moves to `Pending`.
    ///
    /// On success the caller owns the single write for the returned
    /// generation and must report back through [`OrderView::complete_submit`].
    pub fn begin_submit(&mut self) -> Result<PendingSubmission, SubmitError> {
        if self.is_pending() {
            warn!("submit refused: order already pending");
            return Err(SubmitError::AlreadyPending);
        }

        if let Err(problems) = self.draft.validate() {
            let err = StorefrontError::Validation(problems.clone());
            info!(error = %err, "order blocked by validation");
            let text = format!("Error: {}", describe_problems(&problems));
            self.outcome = Some(RequestOutcome::Failure(text.clone()));
            self.notice = Some(Notice {
                text,
                is_error: true,
            });
            return Err(SubmitError::Invalid(problems));
        }

        self.outcome = Some(RequestOutcome::Pending);
        self.notice = Some(Notice {
            text: PROCESSING_TEXT.to_string(),
            is_error: false,
        });
        Ok(PendingSubmission {
            generation: self.generation.begin(),
            draft: self.draft.clone(),
        })
    }

    /// Applies the write result. Returns false for a superseded generation.
    pub fn complete_submit(
        &mut self,
        generation: u64,
        result: Result<OrderResponse, StorefrontError>,
    ) -> bool {
        if !self.generation.is_current(generation) || !self.is_pending() {
            debug!(
                generation,
                latest = self.generation.latest(),
                "dropping stale order response"
            );
            return false;
        }

        match result {
            Ok(response) => {
                info!(message = %response.message, "order confirmed");
                self.notice = Some(Notice {
                    text: format!("Order confirmed: {}", response.message),
                    is_error: false,
                });
                self.outcome = Some(RequestOutcome::Success(response));
                self.draft = OrderDraft::default();
            }
            Err(StorefrontError::ServerRejection { status, message }) => {
                warn!(status, %message, "order rejected by server");
                let text = format!("Error: {message}");
                self.notice = Some(Notice {
                    text: text.clone(),
                    is_error: true,
                });
                self.outcome = Some(RequestOutcome::Failure(text));
            }
            Err(err) => {
                error!(error = %err, "order submission failed");
                self.notice = Some(Notice {
                    text: FALLBACK_ERROR_TEXT.to_string(),
                    is_error: true,
                });
                self.outcome = Some(RequestOutcome::Failure(FALLBACK_ERROR_TEXT.to_string()));
            }
        }
        true
    }

    /// One full submission cycle against `api`.
    pub async fn submit(&mut self, api: &dyn StorefrontApi) -> Result<OrderPhase, SubmitError> {
        let pending = self.begin_submit()?;
        let result = api.submit_order(&pending.draft).await;
        self.complete_submit(pending.generation, result);
        Ok(self.phase())
    }

    pub fn render(&self) -> OrderRender {
        OrderRender {
            draft: self.draft.clone(),
            notice: self.notice.clone(),
            submit_enabled: !self.is_pending(),
        }
    }
}

#[cfg(test)]
#[path = "tests/order_form_tests.rs"]
mod tests;
