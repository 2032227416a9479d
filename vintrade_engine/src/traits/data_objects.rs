use serde::{Deserialize, Serialize};
use vintrade_common::{Percent, Usd};

use crate::db_types::{DemandLine, DemandOrderStatus, LineStatus, MatchSource};

/// The reconciliation-owned fields of a demand line. Written as a full overwrite.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineMatchUpdate {
    pub line_id: i64,
    pub matched_quote_id: Option<i64>,
    pub match_source: Option<MatchSource>,
    pub buy_price_per_case_usd: Option<Usd>,
    pub profit_usd: Option<Usd>,
    pub profit_margin_percent: Option<Percent>,
    pub is_losing_item: bool,
    pub status: LineStatus,
}

impl From<&DemandLine> for LineMatchUpdate {
    fn from(line: &DemandLine) -> Self {
        Self {
            line_id: line.id,
            matched_quote_id: line.matched_quote_id,
            match_source: line.match_source,
            buy_price_per_case_usd: line.buy_price_per_case_usd,
            profit_usd: line.profit_usd,
            profit_margin_percent: line.profit_margin_percent,
            is_losing_item: line.is_losing_item,
            status: line.status,
        }
    }
}

/// Order-level totals, recomputed from the complete set of lines on every run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderTotals {
    pub total_sell_usd: Usd,
    pub total_buy_usd: Usd,
    pub total_profit_usd: Usd,
    pub profit_margin_percent: Percent,
    pub losing_item_count: i64,
    pub status: DemandOrderStatus,
}
