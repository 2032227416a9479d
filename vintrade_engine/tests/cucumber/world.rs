use std::collections::HashMap;

use cucumber::World;
use log::*;
use vintrade_engine::{
    events::EventProducers,
    ReconciliationApi,
    ReconciliationError,
    ReconciliationReport,
    SqliteDatabase,
};

use crate::support::prepare_env::prepare_test_env;

#[derive(Default, Debug, World)]
pub struct ReconciliationWorld {
    pub system: Option<ReconciliationSystem>,
    pub batch_id: Option<i64>,
    /// Request item ids by product name
    pub items: HashMap<String, i64>,
    pub suppliers: HashMap<String, i64>,
    pub order_id: Option<i64>,
    pub reports: Vec<ReconciliationReport>,
    pub error: Option<ReconciliationError>,
}

#[derive(Debug)]
pub struct ReconciliationSystem {
    pub db_path: String,
    pub api: ReconciliationApi<SqliteDatabase>,
}

impl ReconciliationSystem {
    pub async fn new() -> Self {
        let db = prepare_test_env().await;
        let db_path = db.url().to_string();
        debug!("🚀️ Created database: {db_path}");
        let api = ReconciliationApi::new(db, EventProducers::default());
        Self { db_path, api }
    }
}

impl ReconciliationWorld {
    pub fn api(&self) -> &ReconciliationApi<SqliteDatabase> {
        &self.system.as_ref().expect("System not initialised").api
    }

    pub fn db(&self) -> &SqliteDatabase {
        self.api().db()
    }

    pub fn last_report(&self) -> &ReconciliationReport {
        self.reports.last().expect("No reconciliation has been run")
    }

    pub fn order_id(&self) -> i64 {
        self.order_id.expect("No customer order has been created")
    }
}
