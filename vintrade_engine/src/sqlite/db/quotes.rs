use std::collections::HashMap;

use log::trace;
use sqlx::{FromRow, QueryBuilder, Sqlite, SqliteConnection};

use super::{returned_row, MAX_IN_LIST};
use crate::db_types::{NewQuote, NewRequestItem, Quote, RequestItem, Supplier};

pub async fn insert_request_batch(name: &str, conn: &mut SqliteConnection) -> Result<i64, sqlx::Error> {
    let ids: Vec<i64> = sqlx::query_scalar("INSERT INTO request_batches (name) VALUES (?) RETURNING id;")
        .bind(name)
        .fetch_all(conn)
        .await?;
    returned_row(ids)
}

pub async fn insert_supplier(name: &str, conn: &mut SqliteConnection) -> Result<Supplier, sqlx::Error> {
    let rows: Vec<Supplier> = sqlx::query_as("INSERT INTO suppliers (name) VALUES (?) RETURNING id, name;")
        .bind(name)
        .fetch_all(conn)
        .await?;
    returned_row(rows)
}

pub async fn insert_request_item(item: NewRequestItem, conn: &mut SqliteConnection) -> Result<RequestItem, sqlx::Error> {
    let rows: Vec<RequestItem> = sqlx::query_as(
        r#"INSERT INTO request_items (batch_id, product_name, producer, vintage, identifier)
        VALUES (?, ?, ?, ?, ?)
        RETURNING id, batch_id, product_name, producer, vintage, identifier;"#,
    )
    .bind(item.batch_id)
    .bind(item.product_name)
    .bind(item.producer)
    .bind(item.vintage)
    .bind(item.identifier)
    .fetch_all(conn)
    .await?;
    returned_row(rows)
}

/// Stores a quote and returns its id. Unpriced quotes are stored too, but are never returned by [`fetch_quotes`].
pub async fn insert_quote(quote: NewQuote, conn: &mut SqliteConnection) -> Result<i64, sqlx::Error> {
    let ids: Vec<i64> = sqlx::query_scalar(
        r#"INSERT INTO quotes (item_id, supplier_id, cost_price_per_case_usd, quoted_vintage)
        VALUES (?, ?, ?, ?)
        RETURNING id;"#,
    )
    .bind(quote.item_id)
    .bind(quote.supplier_id)
    .bind(quote.cost_price_per_case_usd)
    .bind(quote.quoted_vintage)
    .fetch_all(conn)
    .await?;
    returned_row(ids)
}

pub async fn fetch_request_items(batch_id: i64, conn: &mut SqliteConnection) -> Result<Vec<RequestItem>, sqlx::Error> {
    sqlx::query_as(
        r#"SELECT id, batch_id, product_name, producer, vintage, identifier
        FROM request_items
        WHERE batch_id = ?
        ORDER BY id;"#,
    )
    .bind(batch_id)
    .fetch_all(conn)
    .await
}

/// Fetches the priced quotes against any of the given request items, ordered by id.
pub async fn fetch_quotes(item_ids: &[i64], conn: &mut SqliteConnection) -> Result<Vec<Quote>, sqlx::Error> {
    let mut result = Vec::new();
    for chunk in item_ids.chunks(MAX_IN_LIST) {
        let mut builder = QueryBuilder::<Sqlite>::new(
            "SELECT id, item_id, supplier_id, cost_price_per_case_usd, quoted_vintage FROM quotes WHERE \
             cost_price_per_case_usd IS NOT NULL AND item_id IN (",
        );
        push_id_list(&mut builder, chunk);
        let quotes: Vec<Quote> = builder.build_query_as().fetch_all(&mut *conn).await?;
        result.extend(quotes);
    }
    result.sort_by_key(|q| q.id);
    trace!("🗃️ Fetched {} priced quotes for {} request items", result.len(), item_ids.len());
    Ok(result)
}

pub async fn fetch_supplier_names(
    supplier_ids: &[i64],
    conn: &mut SqliteConnection,
) -> Result<HashMap<i64, String>, sqlx::Error> {
    let mut result = HashMap::with_capacity(supplier_ids.len());
    for chunk in supplier_ids.chunks(MAX_IN_LIST) {
        let mut builder = QueryBuilder::<Sqlite>::new("SELECT id, name FROM suppliers WHERE id IN (");
        push_id_list(&mut builder, chunk);
        let rows = builder.build().fetch_all(&mut *conn).await?;
        for row in rows {
            let supplier = Supplier::from_row(&row)?;
            result.insert(supplier.id, supplier.name);
        }
    }
    Ok(result)
}

fn push_id_list(builder: &mut QueryBuilder<'_, Sqlite>, ids: &[i64]) {
    let mut list = builder.separated(", ");
    for id in ids {
        list.push_bind(*id);
    }
    list.push_unseparated(")");
}
