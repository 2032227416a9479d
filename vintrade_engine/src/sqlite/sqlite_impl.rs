//! `SqliteDatabase` is a concrete backend for the reconciliation engine.
//!
//! It implements both [`QuoteSource`] and [`DemandOrderManagement`], and additionally offers the ingest methods used
//! to load RFQ results and customer orders.
use std::{collections::HashMap, fmt::Debug};

use log::*;
use sqlx::{migrate::MigrateDatabase, Sqlite, SqlitePool};

use super::db::{db_url, demand_orders, new_pool, quotes};
use crate::{
    db_types::{
        DemandLine,
        DemandOrder,
        NewDemandLine,
        NewDemandOrder,
        NewQuote,
        NewRequestItem,
        Quote,
        RequestItem,
        Supplier,
    },
    traits::{DemandOrderError, DemandOrderManagement, LineMatchUpdate, OrderTotals, QuoteSource, QuoteSourceError},
};

#[derive(Clone)]
pub struct SqliteDatabase {
    url: String,
    pool: SqlitePool,
}

impl Debug for SqliteDatabase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "SqliteDatabase ({:?})", self.pool)
    }
}

impl QuoteSource for SqliteDatabase {
    async fn fetch_request_items(&self, batch_id: i64) -> Result<Vec<RequestItem>, QuoteSourceError> {
        let mut conn = self.pool.acquire().await?;
        let items = quotes::fetch_request_items(batch_id, &mut conn).await?;
        Ok(items)
    }

    async fn fetch_quotes(&self, item_ids: &[i64]) -> Result<Vec<Quote>, QuoteSourceError> {
        if item_ids.is_empty() {
            return Ok(Vec::new());
        }
        let mut conn = self.pool.acquire().await?;
        let quotes = quotes::fetch_quotes(item_ids, &mut conn).await?;
        Ok(quotes)
    }

    async fn fetch_supplier_names(&self, supplier_ids: &[i64]) -> Result<HashMap<i64, String>, QuoteSourceError> {
        if supplier_ids.is_empty() {
            return Ok(HashMap::new());
        }
        let mut conn = self.pool.acquire().await?;
        let names = quotes::fetch_supplier_names(supplier_ids, &mut conn).await?;
        Ok(names)
    }
}

impl DemandOrderManagement for SqliteDatabase {
    async fn fetch_order(&self, order_id: i64) -> Result<Option<DemandOrder>, DemandOrderError> {
        let mut conn = self.pool.acquire().await?;
        demand_orders::fetch_order(order_id, &mut conn).await
    }

    async fn fetch_lines(&self, order_id: i64) -> Result<Vec<DemandLine>, DemandOrderError> {
        let mut conn = self.pool.acquire().await?;
        demand_orders::fetch_lines(order_id, &mut conn).await
    }

    async fn update_line(&self, order_id: i64, update: &LineMatchUpdate) -> Result<(), DemandOrderError> {
        let mut conn = self.pool.acquire().await?;
        demand_orders::update_line(order_id, update, &mut conn).await
    }

    async fn update_order(
        &self,
        order_id: i64,
        expected_version: i64,
        totals: &OrderTotals,
    ) -> Result<(), DemandOrderError> {
        let mut conn = self.pool.acquire().await?;
        demand_orders::update_order(order_id, expected_version, totals, &mut conn).await
    }

    /// Writes all line updates and the order totals in a single transaction. If any write fails, including the
    /// version check on the order, nothing is committed.
    async fn save_reconciliation(
        &self,
        order_id: i64,
        expected_version: i64,
        lines: &[LineMatchUpdate],
        totals: &OrderTotals,
    ) -> Result<(), DemandOrderError> {
        let mut tx = self.pool.begin().await?;
        for line in lines {
            demand_orders::update_line(order_id, line, &mut tx).await?;
        }
        demand_orders::update_order(order_id, expected_version, totals, &mut tx).await?;
        tx.commit().await?;
        debug!("🗃️ Reconciliation of order #{order_id} committed ({} lines)", lines.len());
        Ok(())
    }
}

impl SqliteDatabase {
    /// Creates a new database API object, using `VT_DATABASE_URL` for the connection.
    pub async fn new(max_connections: u32) -> Result<Self, sqlx::Error> {
        let url = db_url();
        SqliteDatabase::new_with_url(url.as_str(), max_connections).await
    }

    pub async fn new_with_url(url: &str, max_connections: u32) -> Result<Self, sqlx::Error> {
        trace!("🗃️ Creating new database connection pool with url {url}");
        let pool = new_pool(url, max_connections).await?;
        let url = url.to_string();
        Ok(Self { url, pool })
    }

    /// Creates the SQLite database file at `url` unless it already exists.
    pub async fn create_database_if_missing(url: &str) -> Result<(), sqlx::Error> {
        if !Sqlite::database_exists(url).await? {
            info!("🗃️ Creating database {url}");
            Sqlite::create_database(url).await?;
        }
        Ok(())
    }

    /// Brings the schema up to date using the migrations embedded in this crate.
    pub async fn run_migrations(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("./src/sqlite/migrations").run(&self.pool).await?;
        info!("🗃️ Migrations complete for {}", self.url);
        Ok(())
    }

    pub fn url(&self) -> &str {
        self.url.as_str()
    }

    /// Returns a reference to the database connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }

    pub async fn insert_request_batch(&self, name: &str) -> Result<i64, sqlx::Error> {
        let mut conn = self.pool.acquire().await?;
        quotes::insert_request_batch(name, &mut conn).await
    }

    pub async fn insert_supplier(&self, name: &str) -> Result<Supplier, sqlx::Error> {
        let mut conn = self.pool.acquire().await?;
        quotes::insert_supplier(name, &mut conn).await
    }

    pub async fn insert_request_item(&self, item: NewRequestItem) -> Result<RequestItem, sqlx::Error> {
        let mut conn = self.pool.acquire().await?;
        quotes::insert_request_item(item, &mut conn).await
    }

    pub async fn insert_quote(&self, quote: NewQuote) -> Result<i64, sqlx::Error> {
        let mut conn = self.pool.acquire().await?;
        quotes::insert_quote(quote, &mut conn).await
    }

    pub async fn insert_demand_order(&self, order: NewDemandOrder) -> Result<DemandOrder, sqlx::Error> {
        let mut conn = self.pool.acquire().await?;
        demand_orders::insert_demand_order(order, &mut conn).await
    }

    pub async fn insert_demand_line(&self, line: NewDemandLine) -> Result<DemandLine, sqlx::Error> {
        let mut conn = self.pool.acquire().await?;
        demand_orders::insert_demand_line(line, &mut conn).await
    }
}
