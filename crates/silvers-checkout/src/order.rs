//! The Order Assembler: validate, total, write and verify one order.
//!
//! ## Write modes
//!
//! | mode         | round trips      | failure after the header                         |
//! |--------------|------------------|--------------------------------------------------|
//! | `Batched`    | 1 (+1 preflight) | whole batch rolls back, nothing persists         |
//! | `Sequential` | 1 + items        | header and written items are deleted best-effort |
//!
//! Both modes insert the header conditionally on its reference code, so
//! resubmitting the same [`CheckoutIntent`] can never create a second order.
//! The cart is cleared only after every write has succeeded.

mod statements;

use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;
use silvers_core::{AppConfig, OrderWriteMode, ValidationProfile};
use silvers_pipeline::{BatchCondition, BatchStep, PipelineClient, PipelineError, Statement};

pub use statements::{DraftLine, OrderDraft};

use crate::cart::Cart;
use crate::error::CheckoutError;
use crate::reference::generate_reference;
use crate::totals::{OrderTotals, Pricing};
use crate::validate::CustomerDetails;

/// One shopper's decision to check out.
///
/// The reference code is fixed when the intent is created. Keep the intent
/// across retries of the same submission so the endpoint can recognise them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckoutIntent {
    reference: String,
    created_at: DateTime<Utc>,
}

impl CheckoutIntent {
    #[must_use]
    pub fn new() -> Self {
        Self::with_reference(generate_reference())
    }

    #[must_use]
    pub fn with_reference(reference: impl Into<String>) -> Self {
        Self {
            reference: reference.into(),
            created_at: Utc::now(),
        }
    }

    #[must_use]
    pub fn reference(&self) -> &str {
        &self.reference
    }

    #[must_use]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

impl Default for CheckoutIntent {
    fn default() -> Self {
        Self::new()
    }
}

/// Where a submission is. Logged on every transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderStage {
    Validating,
    SubmittingHeader,
    SubmittingItem { index: usize, total: usize },
    SubmittingBatch { items: usize },
    Compensating,
    Verifying,
    Completed,
    Failed,
}

impl fmt::Display for OrderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Validating => f.write_str("validating"),
            Self::SubmittingHeader => f.write_str("submitting header"),
            Self::SubmittingItem { index, total } => {
                write!(f, "submitting item {}/{total}", index + 1)
            }
            Self::SubmittingBatch { items } => write!(f, "submitting batch ({items} items)"),
            Self::Compensating => f.write_str("compensating"),
            Self::Verifying => f.write_str("verifying"),
            Self::Completed => f.write_str("completed"),
            Self::Failed => f.write_str("failed"),
        }
    }
}

/// Result of the read-back after a successful write.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Verification {
    Confirmed { order_id: i64, items: usize },
    ItemMismatch { order_id: i64, expected: usize, found: usize },
    HeaderMissing,
    /// The read-back itself failed; says nothing about the order.
    Unavailable { reason: String },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlacedOrder {
    pub reference: String,
    pub order_id: Option<i64>,
    pub totals: OrderTotals,
    pub items: usize,
    pub verification: Option<Verification>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutSettings {
    pub write_mode: OrderWriteMode,
    pub verify: bool,
    pub validation: ValidationProfile,
    pub currency: String,
    pub pricing: Pricing,
}

impl Default for CheckoutSettings {
    fn default() -> Self {
        Self {
            write_mode: OrderWriteMode::default(),
            verify: true,
            validation: ValidationProfile::default(),
            currency: "USD".to_string(),
            pricing: Pricing::default(),
        }
    }
}

impl CheckoutSettings {
    #[must_use]
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            write_mode: config.order_write_mode,
            verify: config.verify_orders,
            validation: config.validation,
            currency: config.currency.clone(),
            pricing: Pricing::from_config(config),
        }
    }
}

/// Places orders through a borrowed [`PipelineClient`].
#[derive(Debug, Clone)]
pub struct OrderAssembler<'a> {
    client: &'a PipelineClient,
    settings: CheckoutSettings,
}

impl<'a> OrderAssembler<'a> {
    #[must_use]
    pub fn new(client: &'a PipelineClient, settings: CheckoutSettings) -> Self {
        Self { client, settings }
    }

    #[must_use]
    pub fn settings(&self) -> &CheckoutSettings {
        &self.settings
    }

    /// Totals the cart would be charged right now.
    #[must_use]
    pub fn quote(&self, cart: &Cart) -> OrderTotals {
        self.settings.pricing.totals(cart)
    }

    /// Validates, writes and verifies one order, clearing `cart` on success.
    ///
    /// Validation and the empty-cart check run before any network call. On
    /// any error the cart is left exactly as it was.
    ///
    /// # Errors
    ///
    /// - [`CheckoutError::Validation`] / [`CheckoutError::EmptyCart`] before
    ///   anything is sent.
    /// - [`CheckoutError::AlreadySubmitted`] if an order with the intent's
    ///   reference already exists.
    /// - [`CheckoutError::RolledBack`] if a batched write failed and was
    ///   rolled back.
    /// - [`CheckoutError::PartialWrite`] if a sequential write failed after
    ///   the header was written.
    /// - [`CheckoutError::IncompleteCommit`] if a batch committed fewer item
    ///   rows than the cart had lines.
    /// - [`CheckoutError::Pipeline`] for transport failures.
    pub async fn place_order(
        &self,
        cart: &mut Cart,
        customer: &CustomerDetails,
        intent: &CheckoutIntent,
    ) -> Result<PlacedOrder, CheckoutError> {
        let reference = intent.reference();
        log_stage(reference, OrderStage::Validating);

        customer
            .validate(self.settings.validation)
            .map_err(CheckoutError::Validation)?;
        if cart.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }

        let draft = OrderDraft::new(
            reference,
            customer,
            cart,
            &self.settings.pricing,
            &self.settings.currency,
        );

        let written = match self.settings.write_mode {
            OrderWriteMode::Batched => self.write_batched(&draft).await,
            OrderWriteMode::Sequential => self.write_sequential(&draft).await,
        };
        let order_id = match written {
            Ok(id) => id,
            Err(e) => {
                log_stage(reference, OrderStage::Failed);
                tracing::warn!(reference, error = %e, "order placement failed");
                return Err(e);
            }
        };

        cart.clear();

        let verification = if self.settings.verify {
            log_stage(reference, OrderStage::Verifying);
            Some(self.verify(reference, draft.lines.len()).await)
        } else {
            None
        };

        log_stage(reference, OrderStage::Completed);
        Ok(PlacedOrder {
            reference: reference.to_string(),
            order_id,
            totals: draft.totals,
            items: draft.lines.len(),
            verification,
        })
    }

    /// One header call, then one call per item, in cart order.
    async fn write_sequential(&self, draft: &OrderDraft) -> Result<Option<i64>, CheckoutError> {
        let reference = draft.reference.as_str();
        log_stage(reference, OrderStage::SubmittingHeader);

        let header = self.client.execute(draft.header_insert()).await?;
        if header.affected_row_count == 0 {
            return Err(CheckoutError::AlreadySubmitted {
                reference: reference.to_string(),
            });
        }
        let Some(order_id) = header.last_insert_rowid() else {
            log_stage(reference, OrderStage::Compensating);
            self.run_compensation(reference, &[statements::delete_header_by_reference(reference)])
                .await;
            return Err(CheckoutError::MissingOrderId {
                reference: reference.to_string(),
            });
        };

        let total = draft.lines.len();
        for (index, line) in draft.lines.iter().enumerate() {
            log_stage(reference, OrderStage::SubmittingItem { index, total });
            if let Err(source) = self
                .client
                .execute(OrderDraft::item_insert(order_id, line))
                .await
            {
                log_stage(reference, OrderStage::Compensating);
                let compensated = self
                    .run_compensation(
                        reference,
                        &[
                            statements::delete_items(order_id),
                            statements::delete_header(order_id),
                        ],
                    )
                    .await;
                return Err(CheckoutError::PartialWrite {
                    reference: reference.to_string(),
                    order_id,
                    items_written: index,
                    items_expected: total,
                    compensated,
                    source,
                });
            }
        }

        Ok(Some(order_id))
    }

    /// One conditional batch: `BEGIN`, header, items, `COMMIT`, and a
    /// `ROLLBACK` that runs only if the commit did not.
    async fn write_batched(&self, draft: &OrderDraft) -> Result<Option<i64>, CheckoutError> {
        let reference = draft.reference.as_str();

        let existing = self.client.query(statements::find_header(reference)).await?;
        if !existing.is_empty() {
            return Err(CheckoutError::AlreadySubmitted {
                reference: reference.to_string(),
            });
        }

        let steps = transaction_steps(draft);
        let header_step = 1;
        let commit_step = steps.len() - 2;
        log_stage(
            reference,
            OrderStage::SubmittingBatch {
                items: draft.lines.len(),
            },
        );

        let result = self.client.batch(steps).await?;

        if let Some((step, err)) = result.first_error() {
            return Err(CheckoutError::RolledBack {
                reference: reference.to_string(),
                step,
                message: err.to_string(),
            });
        }
        if result.step(commit_step).is_none() {
            return Err(CheckoutError::RolledBack {
                reference: reference.to_string(),
                step: commit_step,
                message: "commit did not run".to_string(),
            });
        }

        let header = result.step(header_step);
        if header.is_none_or(|h| h.affected_row_count == 0) {
            return Err(CheckoutError::AlreadySubmitted {
                reference: reference.to_string(),
            });
        }

        let items_written = (header_step + 1..commit_step)
            .filter_map(|i| result.step(i))
            .map(|r| r.affected_row_count)
            .sum::<u64>();
        let order_id = header.and_then(silvers_pipeline::ExecuteResult::last_insert_rowid);
        if usize::try_from(items_written).ok() != Some(draft.lines.len()) {
            tracing::warn!(
                reference,
                items_written,
                items_expected = draft.lines.len(),
                "batch committed with unexpected item count"
            );
            log_stage(reference, OrderStage::Compensating);
            let cleanup = match order_id {
                Some(id) => [statements::delete_items(id), statements::delete_header(id)],
                None => [
                    statements::delete_items_by_reference(reference),
                    statements::delete_header_by_reference(reference),
                ],
            };
            let compensated = self.run_compensation(reference, &cleanup).await;
            return Err(CheckoutError::IncompleteCommit {
                reference: reference.to_string(),
                items_written,
                items_expected: draft.lines.len(),
                compensated,
            });
        }

        Ok(order_id)
    }

    /// Runs cleanup statements in order, stopping at the first failure.
    /// Returns `true` only if all of them succeeded.
    async fn run_compensation(&self, reference: &str, stmts: &[Statement]) -> bool {
        for stmt in stmts {
            if let Err(e) = self.client.execute(stmt.clone()).await {
                tracing::warn!(reference, error = %e, "compensating delete failed");
                return false;
            }
        }
        tracing::info!(reference, "partial order removed");
        true
    }

    /// Best-effort read-back; never fails the placement.
    async fn verify(&self, reference: &str, expected: usize) -> Verification {
        match self.read_back(reference).await {
            Ok(None) => {
                tracing::warn!(reference, "order header not found after write");
                Verification::HeaderMissing
            }
            Ok(Some((order_id, found))) if found == expected => {
                tracing::debug!(reference, order_id, items = found, "order verified");
                Verification::Confirmed {
                    order_id,
                    items: found,
                }
            }
            Ok(Some((order_id, found))) => {
                tracing::warn!(reference, order_id, expected, found, "order item count mismatch");
                Verification::ItemMismatch {
                    order_id,
                    expected,
                    found,
                }
            }
            Err(e) => {
                tracing::warn!(reference, error = %e, "order verification failed");
                Verification::Unavailable {
                    reason: e.to_string(),
                }
            }
        }
    }

    async fn read_back(&self, reference: &str) -> Result<Option<(i64, usize)>, PipelineError> {
        let headers = self.client.query(statements::find_header(reference)).await?;
        let Some(order_id) = headers.first().map(|r| r.int("id")) else {
            return Ok(None);
        };
        let counts = self.client.query(statements::count_items(order_id)).await?;
        let found = counts
            .first()
            .map_or(0, |r| usize::try_from(r.int("items")).unwrap_or(0));
        Ok(Some((order_id, found)))
    }
}

fn transaction_steps(draft: &OrderDraft) -> Vec<BatchStep> {
    let mut steps = vec![
        BatchStep::new(Statement::new("BEGIN")),
        BatchStep::new(draft.header_insert()).when(BatchCondition::Ok { step: 0 }),
    ];
    for line in &draft.lines {
        let prev = steps.len() - 1;
        steps.push(
            BatchStep::new(draft.item_insert_by_reference(line))
                .when(BatchCondition::Ok { step: prev }),
        );
    }
    let commit = steps.len();
    steps.push(BatchStep::new(Statement::new("COMMIT")).when(BatchCondition::Ok { step: commit - 1 }));
    steps.push(
        BatchStep::new(Statement::new("ROLLBACK"))
            .when(BatchCondition::not(BatchCondition::Ok { step: commit })),
    );
    steps
}

fn log_stage(reference: &str, stage: OrderStage) {
    tracing::info!(reference, stage = %stage, "order stage");
}
