use thiserror::Error;

use crate::{
    db_types::{DemandLine, DemandOrder},
    traits::{is_transient_sqlx_error, LineMatchUpdate, OrderTotals},
};

#[derive(Debug, Clone, Error)]
pub enum DemandOrderError {
    #[error("Could not reach the order database: {0}")]
    ConnectionError(String),
    #[error("Order database error: {0}")]
    DatabaseError(String),
    #[error("Demand line {line_id} does not exist on order {order_id}")]
    LineNotFound { order_id: i64, line_id: i64 },
    #[error("Demand order {order_id} was modified concurrently (expected version {expected_version})")]
    VersionConflict { order_id: i64, expected_version: i64 },
}

impl DemandOrderError {
    /// Whether simply re-running the operation might succeed.
    pub fn is_transient(&self) -> bool {
        matches!(self, DemandOrderError::ConnectionError(_) | DemandOrderError::VersionConflict { .. })
    }
}

impl From<sqlx::Error> for DemandOrderError {
    fn from(e: sqlx::Error) -> Self {
        if is_transient_sqlx_error(&e) {
            DemandOrderError::ConnectionError(e.to_string())
        } else {
            DemandOrderError::DatabaseError(e.to_string())
        }
    }
}

/// The `DemandOrderManagement` trait defines how the engine reads customer purchase orders and writes reconciliation
/// results back to them.
///
/// Demand lines are created when an order is ingested. Reconciliation only ever overwrites the match and profit fields
/// of existing lines. It never inserts or deletes lines.
#[allow(async_fn_in_trait)]
pub trait DemandOrderManagement {
    /// Fetches the order with the given id, or `None` if it does not exist.
    async fn fetch_order(&self, order_id: i64) -> Result<Option<DemandOrder>, DemandOrderError>;

    /// Fetches all lines of the given order, ordered by line id.
    async fn fetch_lines(&self, order_id: i64) -> Result<Vec<DemandLine>, DemandOrderError>;

    /// Overwrites every reconciliation-owned field of a line. Fields are replaced, never merged: a `None` in the update
    /// clears the stored value.
    async fn update_line(&self, order_id: i64, update: &LineMatchUpdate) -> Result<(), DemandOrderError>;

    /// Writes the order totals and status, provided the order's version is still `expected_version`. The version is
    /// incremented by the write.
    ///
    /// Returns [`DemandOrderError::VersionConflict`] if another writer got there first.
    async fn update_order(
        &self,
        order_id: i64,
        expected_version: i64,
        totals: &OrderTotals,
    ) -> Result<(), DemandOrderError>;

    /// Persists the results of a reconciliation run: every line update, followed by the order totals.
    ///
    /// The default implementation issues the individual updates one after the other. Backends that support
    /// transactions should override this so that a run is committed all-or-nothing.
    async fn save_reconciliation(
        &self,
        order_id: i64,
        expected_version: i64,
        lines: &[LineMatchUpdate],
        totals: &OrderTotals,
    ) -> Result<(), DemandOrderError> {
        for line in lines {
            self.update_line(order_id, line).await?;
        }
        self.update_order(order_id, expected_version, totals).await
    }
}
