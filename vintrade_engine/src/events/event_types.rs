use serde::{Deserialize, Serialize};

use crate::recon_api::ReportSummary;

/// Published once the results of a reconciliation run have been committed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderReconciledEvent {
    pub order_id: i64,
    pub summary: ReportSummary,
}

impl OrderReconciledEvent {
    pub fn new(order_id: i64, summary: ReportSummary) -> Self {
        Self { order_id, summary }
    }
}
