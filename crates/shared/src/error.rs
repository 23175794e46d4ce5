use thiserror::Error;

/// Why a draft (or a single field edit) was refused locally.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FieldProblem {
    #[error("item_id is required")]
    MissingItemId,
    #[error("quantity must be at least 1 (got {0})")]
    QuantityBelowMinimum(i64),
    #[error("quantity must be a whole number (got {0:?})")]
    QuantityNotInteger(String),
    #[error("customer_email is not a valid email address ({0:?})")]
    MalformedEmail(String),
    #[error("unknown order field {0:?}")]
    UnknownField(String),
}

/// Failures of a storefront request, as seen from the client.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StorefrontError {
    /// No usable response: connection failure, timeout, or an undecodable body.
    #[error("transport failure: {0}")]
    Transport(String),
    #[error("server rejected request ({status}): {message}")]
    ServerRejection { status: u16, message: String },
    #[error("invalid order: {}", describe_problems(.0))]
    Validation(Vec<FieldProblem>),
}

pub fn describe_problems(problems: &[FieldProblem]) -> String {
    problems
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_lists_every_problem() {
        let err = StorefrontError::Validation(vec![
            FieldProblem::MissingItemId,
            FieldProblem::QuantityBelowMinimum(0),
        ]);
        assert_eq!(
            err.to_string(),
            "invalid order: item_id is required; quantity must be at least 1 (got 0)"
        );
    }

    #[test]
    fn rejection_carries_status_and_message() {
        let err = StorefrontError::ServerRejection {
            status: 400,
            message: "Out of stock".into(),
        };
        assert_eq!(err.to_string(), "server rejected request (400): Out of stock");
    }
}
