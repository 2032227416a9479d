use std::str::FromStr;

use cucumber::{gherkin::Step, given, then, when};
use vintrade_common::{Percent, Usd};
use vintrade_engine::{
    db_types::{DemandOrderStatus, MatchSource, NewDemandLine, NewDemandOrder, NewQuote, NewRequestItem},
    traits::DemandOrderManagement,
    LineReport,
    ReconciliationError,
};

use crate::cucumber::{ReconciliationSystem, ReconciliationWorld};

#[given("a fresh install")]
async fn fresh_install(world: &mut ReconciliationWorld) {
    world.system = Some(ReconciliationSystem::new().await);
}

//  | name            | vintage | identifier    |
#[given("an RFQ batch with the following request items")]
async fn rfq_batch(world: &mut ReconciliationWorld, step: &Step) {
    let batch_id = world.db().insert_request_batch("cucumber batch").await.expect("Error creating batch");
    world.batch_id = Some(batch_id);
    for row in table_rows(step) {
        let mut item = NewRequestItem::new(batch_id, row[0].as_str());
        if let Some(vintage) = non_empty(&row[1]) {
            item = item.with_vintage(vintage);
        }
        if let Some(identifier) = non_empty(&row[2]) {
            item = item.with_identifier(identifier);
        }
        let item = world.db().insert_request_item(item).await.expect("Error creating request item");
        world.items.insert(item.product_name.clone(), item.id);
    }
}

//  | supplier | item | price |
#[given("the following supplier quotes")]
async fn supplier_quotes(world: &mut ReconciliationWorld, step: &Step) {
    for row in table_rows(step) {
        let supplier_id = match world.suppliers.get(&row[0]) {
            Some(id) => *id,
            None => {
                let supplier = world.db().insert_supplier(&row[0]).await.expect("Error creating supplier");
                world.suppliers.insert(supplier.name.clone(), supplier.id);
                supplier.id
            },
        };
        let item_id = *world.items.get(&row[1]).unwrap_or_else(|| panic!("Unknown request item {}", row[1]));
        let quote = match non_empty(&row[2]) {
            Some(price) => NewQuote::new(item_id, supplier_id, usd(price)),
            None => NewQuote::unpriced(item_id, supplier_id),
        };
        world.db().insert_quote(quote).await.expect("Error creating quote");
    }
}

//  | name | vintage | identifier | quantity | sell |
#[given("a customer order for the batch with the following lines")]
async fn order_for_batch(world: &mut ReconciliationWorld, step: &Step) {
    let batch_id = world.batch_id.expect("No RFQ batch");
    create_order(world, NewDemandOrder::for_batch(batch_id), step).await;
}

#[given("a customer order without a batch, with the following lines")]
async fn order_without_batch(world: &mut ReconciliationWorld, step: &Step) {
    create_order(world, NewDemandOrder::unlinked(), step).await;
}

#[given("an empty customer order for the batch")]
async fn empty_order(world: &mut ReconciliationWorld) {
    let batch_id = world.batch_id.expect("No RFQ batch");
    let order = world.db().insert_demand_order(NewDemandOrder::for_batch(batch_id)).await.expect("Error creating order");
    world.order_id = Some(order.id);
}

async fn create_order(world: &mut ReconciliationWorld, order: NewDemandOrder, step: &Step) {
    let order = world.db().insert_demand_order(order).await.expect("Error creating order");
    world.order_id = Some(order.id);
    for row in table_rows(step) {
        let quantity = row[3].parse::<i64>().expect("Invalid quantity");
        let mut line = NewDemandLine::new(order.id, row[0].as_str(), quantity);
        if let Some(vintage) = non_empty(&row[1]) {
            line = line.with_vintage(vintage);
        }
        if let Some(identifier) = non_empty(&row[2]) {
            line = line.with_identifier(identifier);
        }
        if let Some(sell) = non_empty(&row[4]) {
            line = line.with_sell_price(usd(sell));
        }
        world.db().insert_demand_line(line).await.expect("Error creating demand line");
    }
}

#[when(regex = r"^I reconcile the order(?: again)?$")]
async fn reconcile(world: &mut ReconciliationWorld) {
    match world.api().reconcile_order(world.order_id()).await {
        Ok(report) => world.reports.push(report),
        Err(e) => world.error = Some(e),
    }
}

#[then(expr = "line {string} is matched by {word} at {word} USD")]
async fn line_matched(world: &mut ReconciliationWorld, name: String, source: String, price: String) {
    let line = line_report(world, &name);
    let source = MatchSource::from_str(&source).expect("Invalid match source");
    assert_eq!(line.match_source, Some(source), "Unexpected match source for {name}");
    assert_eq!(line.buy_price_per_case_usd, Some(usd(&price)), "Unexpected buy price for {name}");
    assert!(line.matched_quote_id.is_some());
}

#[then(expr = "line {string} is unmatched")]
async fn line_unmatched(world: &mut ReconciliationWorld, name: String) {
    let line = line_report(world, &name);
    assert_eq!(line.match_source, None);
    assert_eq!(line.matched_quote_id, None);
    assert_eq!(line.buy_price_per_case_usd, None);
    assert_eq!(line.profit_usd, None);
}

#[then(expr = "line {string} is supplied by {string}")]
async fn line_supplier(world: &mut ReconciliationWorld, name: String, supplier: String) {
    let line = line_report(world, &name);
    assert_eq!(line.supplier_name.as_deref(), Some(supplier.as_str()));
}

#[then(expr = "line {string} makes a profit of {word} USD, a margin of {word} percent")]
async fn line_profit(world: &mut ReconciliationWorld, name: String, profit: String, margin: String) {
    let line = line_report(world, &name);
    assert_eq!(line.profit_usd, Some(usd(&profit)));
    assert_eq!(line.profit_margin_percent, Some(percent(&margin)));
}

#[then(expr = "line {string} is a losing item")]
async fn line_losing(world: &mut ReconciliationWorld, name: String) {
    assert!(line_report(world, &name).is_losing_item, "{name} should be a losing item");
}

#[then(expr = "line {string} is not a losing item")]
async fn line_not_losing(world: &mut ReconciliationWorld, name: String) {
    assert!(!line_report(world, &name).is_losing_item, "{name} should not be a losing item");
}

//  | sell | buy | profit | margin | losing |
#[then("the order totals are")]
async fn order_totals(world: &mut ReconciliationWorld, step: &Step) {
    let row = &table_rows(step)[0];
    let summary = &world.last_report().summary;
    assert_eq!(summary.total_sell_usd, usd(&row[0]));
    assert_eq!(summary.total_buy_usd, usd(&row[1]));
    assert_eq!(summary.total_profit_usd, usd(&row[2]));
    assert_eq!(summary.profit_margin_percent, percent(&row[3]));
    assert_eq!(summary.losing_items, row[4].parse::<usize>().expect("Invalid count"));
    let order = world.db().fetch_order(world.order_id()).await.expect("Error fetching order").expect("Order missing");
    assert_eq!(order.total_sell_usd, summary.total_sell_usd);
    assert_eq!(order.total_buy_usd, summary.total_buy_usd);
    assert_eq!(order.total_profit_usd, summary.total_profit_usd);
    assert_eq!(order.profit_margin_percent, summary.profit_margin_percent);
    assert_eq!(order.losing_item_count as usize, summary.losing_items);
}

#[then(expr = "{int} of {int} lines are matched")]
async fn matched_count(world: &mut ReconciliationWorld, matched: usize, total: usize) {
    let summary = &world.last_report().summary;
    assert_eq!(summary.matched_items, matched);
    assert_eq!(summary.total_items, total);
    assert_eq!(summary.unmatched_items, total - matched);
}

#[then(expr = "the order status is {word}")]
async fn order_status(world: &mut ReconciliationWorld, status: String) {
    let expected = DemandOrderStatus::from_str(&status).expect("Invalid order status");
    let order = world.db().fetch_order(world.order_id()).await.expect("Error fetching order").expect("Order missing");
    assert_eq!(order.status, expected);
}

#[then(expr = "the order version is {int}")]
async fn order_version(world: &mut ReconciliationWorld, version: i64) {
    let order = world.db().fetch_order(world.order_id()).await.expect("Error fetching order").expect("Order missing");
    assert_eq!(order.version, version);
}

#[then("both reconciliation reports are identical")]
async fn reports_identical(world: &mut ReconciliationWorld) {
    assert_eq!(world.reports.len(), 2, "Expected two reconciliation runs");
    assert_eq!(world.reports[0], world.reports[1]);
}

#[then(expr = "the reconciliation fails with {word}")]
async fn reconciliation_fails(world: &mut ReconciliationWorld, kind: String) {
    let err = world.error.as_ref().expect("Reconciliation should have failed");
    match kind.as_str() {
        "NotFound" => assert!(matches!(err, ReconciliationError::NotFound(_)), "Got {err}"),
        "InvalidState" => assert!(matches!(err, ReconciliationError::InvalidState(_)), "Got {err}"),
        _ => panic!("Unknown failure kind: {kind}"),
    }
    assert!(!err.is_retryable());
}

#[when(expr = "I reconcile order {int}")]
async fn reconcile_order_by_id(world: &mut ReconciliationWorld, order_id: i64) {
    world.order_id = Some(order_id);
    reconcile(world).await;
}

fn line_report<'a>(world: &'a ReconciliationWorld, name: &str) -> &'a LineReport {
    world
        .last_report()
        .per_line
        .iter()
        .find(|l| l.product_name == name)
        .unwrap_or_else(|| panic!("No line named {name} in the report"))
}

/// Data rows of the step's table, without the header row.
fn table_rows(step: &Step) -> Vec<Vec<String>> {
    let table = step.table.as_ref().expect("Step requires a table");
    table.rows.iter().skip(1).map(|r| r.iter().map(|c| c.trim().to_string()).collect()).collect()
}

fn non_empty(s: &str) -> Option<&str> {
    Some(s.trim()).filter(|s| !s.is_empty())
}

fn usd(s: &str) -> Usd {
    Usd::from_str(s).expect("Invalid USD amount")
}

fn percent(s: &str) -> Percent {
    Percent::from_str(s).expect("Invalid percentage")
}
