//! The public face of the engine: [`ReconciliationApi::reconcile_order`] and everything it returns.
mod errors;
mod options;
mod order_locks;
mod reconciliation_api;
mod report;

pub use errors::ReconciliationError;
pub use options::{
    ReconciliationOptions,
    DEFAULT_FUZZY_THRESHOLD,
    DEFAULT_MAX_SCAN_COST,
    DEFAULT_NAME_VINTAGE_THRESHOLD,
};
pub use order_locks::{OrderGuard, OrderLocks};
pub use reconciliation_api::ReconciliationApi;
pub use report::{LineReport, ReconciliationReport, ReportSummary};
