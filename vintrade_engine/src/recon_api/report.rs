use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use vintrade_common::{Percent, Usd};

use crate::{
    db_types::{DemandLine, LineStatus, MatchSource},
    traits::OrderTotals,
};

/// The outcome of one reconciliation run, as returned to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReconciliationReport {
    pub order_id: i64,
    pub per_line: Vec<LineReport>,
    pub summary: ReportSummary,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineReport {
    pub line_id: i64,
    pub product_name: String,
    pub matched_quote_id: Option<i64>,
    pub match_source: Option<MatchSource>,
    pub buy_price_per_case_usd: Option<Usd>,
    pub sell_price_per_case_usd: Option<Usd>,
    pub profit_usd: Option<Usd>,
    pub profit_margin_percent: Option<Percent>,
    pub is_losing_item: bool,
    pub supplier_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportSummary {
    pub total_items: usize,
    pub matched_items: usize,
    pub unmatched_items: usize,
    pub losing_items: usize,
    pub total_sell_usd: Usd,
    pub total_buy_usd: Usd,
    pub total_profit_usd: Usd,
    pub profit_margin_percent: Percent,
}

impl ReconciliationReport {
    /// Assembles the report from the reconciled lines and the order totals computed from them.
    ///
    /// `supplier_by_quote` maps a quote id to the name of the supplier that issued it. Lines whose quote has no entry
    /// are reported without a supplier name.
    pub fn new(
        order_id: i64,
        lines: &[DemandLine],
        totals: &OrderTotals,
        supplier_by_quote: &HashMap<i64, String>,
    ) -> Self {
        let per_line = lines
            .iter()
            .map(|line| LineReport {
                line_id: line.id,
                product_name: line.product_name.clone(),
                matched_quote_id: line.matched_quote_id,
                match_source: line.match_source,
                buy_price_per_case_usd: line.buy_price_per_case_usd,
                sell_price_per_case_usd: line.sell_price_per_case_usd,
                profit_usd: line.profit_usd,
                profit_margin_percent: line.profit_margin_percent,
                is_losing_item: line.is_losing_item,
                supplier_name: line.matched_quote_id.and_then(|id| supplier_by_quote.get(&id).cloned()),
            })
            .collect::<Vec<_>>();
        let matched_items = lines.iter().filter(|l| l.status == LineStatus::Matched).count();
        let summary = ReportSummary {
            total_items: lines.len(),
            matched_items,
            unmatched_items: lines.len() - matched_items,
            losing_items: totals.losing_item_count as usize,
            total_sell_usd: totals.total_sell_usd,
            total_buy_usd: totals.total_buy_usd,
            total_profit_usd: totals.total_profit_usd,
            profit_margin_percent: totals.profit_margin_percent,
        };
        Self { order_id, per_line, summary }
    }
}

#[cfg(test)]
mod test {
    use serde_json::json;

    use super::*;
    use crate::pricing::calculate_order_totals;

    fn lines() -> Vec<DemandLine> {
        let matched = DemandLine {
            id: 1,
            order_id: 5,
            product_name: "Opus One".to_string(),
            vintage: Some("2018".into()),
            identifier: None,
            quantity: 2,
            sell_price_per_case_usd: Some(Usd::from(100)),
            matched_quote_id: Some(31),
            match_source: Some(MatchSource::NameVintage),
            buy_price_per_case_usd: Some(Usd::from(120)),
            profit_usd: Some(Usd::from(-20)),
            profit_margin_percent: Some(Percent::from(-20)),
            is_losing_item: true,
            status: LineStatus::Matched,
        };
        let unmatched = DemandLine {
            id: 2,
            product_name: "Unobtainium".to_string(),
            vintage: None,
            quantity: 1,
            sell_price_per_case_usd: Some(Usd::from(50)),
            matched_quote_id: None,
            match_source: None,
            buy_price_per_case_usd: None,
            profit_usd: None,
            profit_margin_percent: None,
            is_losing_item: false,
            status: LineStatus::Unmatched,
            ..matched.clone()
        };
        vec![matched, unmatched]
    }

    #[test]
    fn summary_counts_lines() {
        let lines = lines();
        let totals = calculate_order_totals(&lines).unwrap();
        let suppliers = HashMap::from([(31, "Bordeaux Direct".to_string())]);
        let report = ReconciliationReport::new(5, &lines, &totals, &suppliers);
        assert_eq!(report.summary.total_items, 2);
        assert_eq!(report.summary.matched_items, 1);
        assert_eq!(report.summary.unmatched_items, 1);
        assert_eq!(report.summary.losing_items, 1);
        assert_eq!(report.summary.total_sell_usd, Usd::from(250));
        assert_eq!(report.per_line[0].supplier_name.as_deref(), Some("Bordeaux Direct"));
        assert_eq!(report.per_line[1].supplier_name, None);
    }

    #[test]
    fn serializes_with_camel_case_names() {
        let lines = lines();
        let totals = calculate_order_totals(&lines).unwrap();
        let report = ReconciliationReport::new(5, &lines[1..], &totals, &HashMap::new());
        let value = serde_json::to_value(&report).unwrap();
        assert_eq!(value["orderId"], json!(5));
        let line = &value["perLine"][0];
        assert_eq!(line["lineId"], json!(2));
        assert_eq!(line["matchedQuoteId"], json!(null));
        assert_eq!(line["matchSource"], json!(null));
        assert_eq!(line["isLosingItem"], json!(false));
        assert_eq!(line["supplierName"], json!(null));
        assert_eq!(value["summary"]["unmatchedItems"], json!(1));
        assert!(value["summary"].get("profitMarginPercent").is_some());
    }
}
