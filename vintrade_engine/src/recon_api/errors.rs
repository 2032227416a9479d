use thiserror::Error;

use crate::{
    pricing::PricingOverflow,
    traits::{DemandOrderError, QuoteSourceError},
};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReconciliationError {
    #[error("Demand order {0} does not exist")]
    NotFound(i64),
    #[error("Demand order cannot be reconciled: {0}")]
    InvalidState(String),
    #[error(
        "Reconciliation would compare {lines} lines against {items} request items, which exceeds the scan budget of \
         {limit} comparisons"
    )]
    ScanBudgetExceeded { lines: usize, items: usize, limit: u64 },
    #[error("Temporary backend failure. The reconciliation can be retried. {0}")]
    Transient(String),
    #[error("Reconciliation failed: {0}")]
    Fatal(String),
}

impl ReconciliationError {
    /// Whether the caller may simply invoke the reconciliation again. Every run fully overwrites its results, so a
    /// retry after a transient failure is always safe.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ReconciliationError::Transient(_))
    }
}

impl From<QuoteSourceError> for ReconciliationError {
    fn from(e: QuoteSourceError) -> Self {
        if e.is_transient() {
            ReconciliationError::Transient(e.to_string())
        } else {
            ReconciliationError::Fatal(e.to_string())
        }
    }
}

impl From<DemandOrderError> for ReconciliationError {
    fn from(e: DemandOrderError) -> Self {
        if e.is_transient() {
            ReconciliationError::Transient(e.to_string())
        } else {
            ReconciliationError::Fatal(e.to_string())
        }
    }
}

impl From<PricingOverflow> for ReconciliationError {
    fn from(e: PricingOverflow) -> Self {
        ReconciliationError::Fatal(e.to_string())
    }
}
