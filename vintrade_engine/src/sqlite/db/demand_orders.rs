use log::{debug, trace};
use sqlx::SqliteConnection;

use super::returned_row;
use crate::{
    db_types::{DemandLine, DemandOrder, NewDemandLine, NewDemandOrder},
    traits::{DemandOrderError, LineMatchUpdate, OrderTotals},
};

const ORDER_COLUMNS: &str = "id, request_batch_id, total_sell_usd, total_buy_usd, total_profit_usd, \
                             profit_margin_percent, losing_item_count, status, version, created_at, updated_at";

const LINE_COLUMNS: &str = "id, order_id, product_name, vintage, identifier, quantity, sell_price_per_case_usd, \
                            matched_quote_id, match_source, buy_price_per_case_usd, profit_usd, profit_margin_percent, \
                            is_losing_item, status";

pub async fn insert_demand_order(order: NewDemandOrder, conn: &mut SqliteConnection) -> Result<DemandOrder, sqlx::Error> {
    let sql = format!("INSERT INTO demand_orders (request_batch_id) VALUES (?) RETURNING {ORDER_COLUMNS};");
    let rows: Vec<DemandOrder> = sqlx::query_as(&sql).bind(order.request_batch_id).fetch_all(conn).await?;
    let order = returned_row(rows)?;
    debug!("🗃️ Demand order #{} created", order.id);
    Ok(order)
}

pub async fn insert_demand_line(line: NewDemandLine, conn: &mut SqliteConnection) -> Result<DemandLine, sqlx::Error> {
    let sql = format!(
        "INSERT INTO demand_lines (order_id, product_name, vintage, identifier, quantity, sell_price_per_case_usd) \
         VALUES (?, ?, ?, ?, ?, ?) RETURNING {LINE_COLUMNS};"
    );
    let rows: Vec<DemandLine> = sqlx::query_as(&sql)
        .bind(line.order_id)
        .bind(line.product_name)
        .bind(line.vintage)
        .bind(line.identifier)
        .bind(line.quantity)
        .bind(line.sell_price_per_case_usd)
        .fetch_all(conn)
        .await?;
    returned_row(rows)
}

pub async fn fetch_order(order_id: i64, conn: &mut SqliteConnection) -> Result<Option<DemandOrder>, DemandOrderError> {
    let sql = format!("SELECT {ORDER_COLUMNS} FROM demand_orders WHERE id = ?;");
    let order = sqlx::query_as(&sql).bind(order_id).fetch_optional(conn).await?;
    Ok(order)
}

pub async fn fetch_lines(order_id: i64, conn: &mut SqliteConnection) -> Result<Vec<DemandLine>, DemandOrderError> {
    let sql = format!("SELECT {LINE_COLUMNS} FROM demand_lines WHERE order_id = ? ORDER BY id;");
    let lines = sqlx::query_as(&sql).bind(order_id).fetch_all(conn).await?;
    Ok(lines)
}

/// Replaces every reconciliation-owned column of a line.
pub async fn update_line(
    order_id: i64,
    update: &LineMatchUpdate,
    conn: &mut SqliteConnection,
) -> Result<(), DemandOrderError> {
    let result = sqlx::query(
        r#"UPDATE demand_lines SET
            matched_quote_id = ?,
            match_source = ?,
            buy_price_per_case_usd = ?,
            profit_usd = ?,
            profit_margin_percent = ?,
            is_losing_item = ?,
            status = ?
        WHERE id = ? AND order_id = ?;"#,
    )
    .bind(update.matched_quote_id)
    .bind(update.match_source)
    .bind(update.buy_price_per_case_usd)
    .bind(update.profit_usd)
    .bind(update.profit_margin_percent)
    .bind(update.is_losing_item)
    .bind(update.status)
    .bind(update.line_id)
    .bind(order_id)
    .execute(conn)
    .await?;
    if result.rows_affected() == 0 {
        return Err(DemandOrderError::LineNotFound { order_id, line_id: update.line_id });
    }
    trace!("🗃️ Line #{} of order #{order_id} updated", update.line_id);
    Ok(())
}

/// Writes the order totals if, and only if, the stored version is still `expected_version`. Bumps the version.
pub async fn update_order(
    order_id: i64,
    expected_version: i64,
    totals: &OrderTotals,
    conn: &mut SqliteConnection,
) -> Result<(), DemandOrderError> {
    let result = sqlx::query(
        r#"UPDATE demand_orders SET
            total_sell_usd = ?,
            total_buy_usd = ?,
            total_profit_usd = ?,
            profit_margin_percent = ?,
            losing_item_count = ?,
            status = ?,
            version = version + 1,
            updated_at = CURRENT_TIMESTAMP
        WHERE id = ? AND version = ?;"#,
    )
    .bind(totals.total_sell_usd)
    .bind(totals.total_buy_usd)
    .bind(totals.total_profit_usd)
    .bind(totals.profit_margin_percent)
    .bind(totals.losing_item_count)
    .bind(totals.status)
    .bind(order_id)
    .bind(expected_version)
    .execute(conn)
    .await?;
    if result.rows_affected() == 0 {
        return Err(DemandOrderError::VersionConflict { order_id, expected_version });
    }
    trace!("🗃️ Order #{order_id} totals updated (version {expected_version} -> {})", expected_version + 1);
    Ok(())
}
