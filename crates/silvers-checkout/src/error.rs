use silvers_pipeline::PipelineError;
use thiserror::Error;

use crate::validate::ValidationErrors;

#[derive(Debug, Error)]
pub enum CheckoutError {
    /// Customer details failed a field rule. Nothing was sent.
    #[error("validation failed: {0}")]
    Validation(ValidationErrors),

    #[error("cannot place an order for an empty cart")]
    EmptyCart,

    #[error(transparent)]
    Pipeline(#[from] PipelineError),

    /// The header insert succeeded but the endpoint returned no row id.
    #[error("order {reference} was inserted but no order id was returned")]
    MissingOrderId { reference: String },

    /// An order with this reference code already exists. Nothing was written.
    #[error("order {reference} has already been submitted")]
    AlreadySubmitted { reference: String },

    /// The header was written but an item insert failed.
    ///
    /// `compensated` is `true` when the header and every written item were
    /// deleted again, leaving no trace of the attempt.
    #[error(
        "order {reference} failed after {items_written}/{items_expected} items \
         (header id {order_id}, compensated: {compensated}): {source}"
    )]
    PartialWrite {
        reference: String,
        order_id: i64,
        items_written: usize,
        items_expected: usize,
        compensated: bool,
        #[source]
        source: PipelineError,
    },

    /// The atomic batch ran but one of its steps failed; the transaction was
    /// rolled back.
    #[error("order {reference} rolled back at step {step}: {message}")]
    RolledBack {
        reference: String,
        step: usize,
        message: String,
    },

    /// The batch committed but fewer item rows were written than the cart
    /// had lines. The committed rows are deleted again when possible.
    #[error(
        "order {reference} committed {items_written}/{items_expected} items \
         (compensated: {compensated})"
    )]
    IncompleteCommit {
        reference: String,
        items_written: u64,
        items_expected: usize,
        compensated: bool,
    },

    #[error("favorites file {path}: {reason}")]
    Favorites { path: String, reason: String },
}

impl CheckoutError {
    /// `true` when retrying the same checkout intent may succeed.
    ///
    /// Validation failures and duplicate submissions need user action first.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Pipeline(_) | Self::RolledBack { .. } | Self::MissingOrderId { .. } => true,
            Self::PartialWrite { compensated, .. } | Self::IncompleteCommit { compensated, .. } => {
                *compensated
            }
            Self::Validation(_)
            | Self::EmptyCart
            | Self::AlreadySubmitted { .. }
            | Self::Favorites { .. } => false,
        }
    }
}
