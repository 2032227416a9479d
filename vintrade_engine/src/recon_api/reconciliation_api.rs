use std::{collections::HashMap, fmt::Debug};

use log::*;

use crate::{
    db_types::{DemandLine, LineStatus},
    events::{EventProducers, OrderReconciledEvent},
    matching::{LineMatch, LineMatcher, QuoteIndex},
    pricing::{calculate_line_profit, calculate_order_totals, PricingOverflow},
    recon_api::{OrderLocks, ReconciliationError, ReconciliationOptions, ReconciliationReport},
    traits::{DemandOrderManagement, LineMatchUpdate, QuoteSource},
};

/// `ReconciliationApi` binds the demand lines of a customer purchase order to the cheapest viable supplier quotes and
/// records the resulting profitability.
pub struct ReconciliationApi<B> {
    db: B,
    producers: EventProducers,
    options: ReconciliationOptions,
    locks: OrderLocks,
}

impl<B> Debug for ReconciliationApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ReconciliationApi ({:?})", self.options)
    }
}

impl<B> ReconciliationApi<B> {
    pub fn new(db: B, producers: EventProducers) -> Self {
        Self { db, producers, options: ReconciliationOptions::default(), locks: OrderLocks::new() }
    }

    pub fn with_options(mut self, options: ReconciliationOptions) -> Self {
        self.options = options;
        self
    }

    pub fn options(&self) -> &ReconciliationOptions {
        &self.options
    }

    pub fn db(&self) -> &B {
        &self.db
    }
}

impl<B> ReconciliationApi<B>
where B: DemandOrderManagement + QuoteSource
{
    /// Reconciles a customer purchase order against the supplier quotes of its RFQ batch.
    ///
    /// Every line is matched and priced from scratch, then the order totals are recomputed from the complete set of
    /// lines, and everything is saved together. Running this again with unchanged inputs gives identical results.
    ///
    /// Precondition failures ([`ReconciliationError::NotFound`], [`ReconciliationError::InvalidState`] and
    /// [`ReconciliationError::ScanBudgetExceeded`]) are returned before anything is written. Errors for which
    /// [`ReconciliationError::is_retryable`] is true may be retried by the caller; the engine never retries on its own.
    ///
    /// Concurrent calls for the same order are serialized. Once the results are committed, an
    /// [`OrderReconciledEvent`] is published. Notification failures are logged and otherwise ignored.
    pub async fn reconcile_order(&self, order_id: i64) -> Result<ReconciliationReport, ReconciliationError> {
        let _guard = self.locks.lock(order_id).await;
        trace!("🍷️ Reconciling order #{order_id}");
        let order = self.db.fetch_order(order_id).await?.ok_or(ReconciliationError::NotFound(order_id))?;
        let batch_id = order.request_batch_id.ok_or_else(|| {
            ReconciliationError::InvalidState(format!("Order #{order_id} is not linked to a request batch"))
        })?;
        let lines = self.db.fetch_lines(order_id).await?;
        if lines.is_empty() {
            return Err(ReconciliationError::InvalidState(format!("Order #{order_id} has no lines")));
        }
        let items = self.db.fetch_request_items(batch_id).await?;
        if !self.options.within_scan_budget(lines.len(), items.len()) {
            warn!(
                "🍷️ Order #{order_id} has {} lines against {} request items in batch #{batch_id}. This is over the \
                 scan budget of {}.",
                lines.len(),
                items.len(),
                self.options.max_scan_cost
            );
            return Err(ReconciliationError::ScanBudgetExceeded {
                lines: lines.len(),
                items: items.len(),
                limit: self.options.max_scan_cost,
            });
        }
        let item_ids = items.iter().map(|i| i.id).collect::<Vec<i64>>();
        let quotes = self.db.fetch_quotes(&item_ids).await?;
        let index = QuoteIndex::build(items, quotes);
        debug!(
            "🍷️ Order #{order_id}: matching {} lines against {} request items and {} priced quotes",
            lines.len(),
            index.items().len(),
            index.quote_count()
        );

        let matcher = LineMatcher::new(&index, self.options.thresholds());
        let mut supplier_by_quote = HashMap::<i64, i64>::new();
        let reconciled = lines
            .into_iter()
            .map(|line| {
                let line_match = matcher.match_line(&line);
                if let Some(m) = &line_match {
                    supplier_by_quote.insert(m.quote.id, m.quote.supplier_id);
                }
                apply_match(line, line_match.as_ref())
            })
            .collect::<Result<Vec<DemandLine>, PricingOverflow>>()?;
        // All lines must be final before totals are computed.
        let totals = calculate_order_totals(&reconciled)?;
        let supplier_names = self.supplier_names_by_quote(&supplier_by_quote).await?;

        let updates = reconciled.iter().map(LineMatchUpdate::from).collect::<Vec<_>>();
        self.db.save_reconciliation(order_id, order.version, &updates, &totals).await?;
        let report = ReconciliationReport::new(order_id, &reconciled, &totals, &supplier_names);
        let event = OrderReconciledEvent::new(order_id, report.summary.clone());
        let notified = self.producers.publish_order_reconciled(event);
        debug!("🍷️ Order #{order_id}: results saved. {notified} subscriber(s) notified");
        info!(
            "🍷️ Order #{order_id} reconciled. {}/{} lines matched, {} losing. Profit {} ({})",
            report.summary.matched_items,
            report.summary.total_items,
            report.summary.losing_items,
            report.summary.total_profit_usd,
            report.summary.profit_margin_percent
        );
        Ok(report)
    }

    async fn supplier_names_by_quote(
        &self,
        supplier_by_quote: &HashMap<i64, i64>,
    ) -> Result<HashMap<i64, String>, ReconciliationError> {
        if supplier_by_quote.is_empty() {
            return Ok(HashMap::new());
        }
        let mut supplier_ids = supplier_by_quote.values().copied().collect::<Vec<i64>>();
        supplier_ids.sort_unstable();
        supplier_ids.dedup();
        let names = self.db.fetch_supplier_names(&supplier_ids).await?;
        let result = supplier_by_quote
            .iter()
            .filter_map(|(quote_id, supplier_id)| names.get(supplier_id).map(|name| (*quote_id, name.clone())))
            .collect();
        Ok(result)
    }
}

/// Overwrites every reconciliation-owned field of `line` with the outcome of this run. Nothing from a previous run
/// survives.
fn apply_match(mut line: DemandLine, line_match: Option<&LineMatch>) -> Result<DemandLine, PricingOverflow> {
    line.matched_quote_id = line_match.map(|m| m.quote.id);
    line.match_source = line_match.map(|m| m.source);
    line.buy_price_per_case_usd = line_match.map(|m| m.quote.cost_price_per_case_usd);
    line.status = if line_match.is_some() { LineStatus::Matched } else { LineStatus::Unmatched };
    let profit = calculate_line_profit(line.sell_price_per_case_usd, line.buy_price_per_case_usd)?;
    line.profit_usd = profit.profit_usd;
    line.profit_margin_percent = profit.profit_margin_percent;
    line.is_losing_item = profit.is_losing_item;
    Ok(line)
}
