//! Vintrade Reconciliation Engine
//!
//! Matches the lines of a customer purchase order to supplier quotes gathered by an upstream request-for-quote (RFQ)
//! process, and computes what the order will earn.
//!
//! The library is organised leaves-first:
//! 1. [`mod@matching`] normalises and scores product names, indexes a batch's quotes, and runs the matching strategy
//!    chain for a single line. It is pure and does no I/O.
//! 2. [`mod@pricing`] computes per-line profit and order totals.
//! 3. The reconciliation API ([`ReconciliationApi`]) orchestrates a run: it loads the order, matches and prices every
//!    line, saves the results and notifies subscribers.
//! 4. Storage is abstracted behind the traits in [`mod@traits`]. [`SqliteDatabase`] implements them on SQLite.
//!
//! Subscribers hook into completed runs through [`events::EventHooks`].
pub mod db_types;
pub mod events;
pub mod matching;
pub mod pricing;
mod recon_api;
pub mod traits;

#[cfg(feature = "sqlite")]
mod sqlite;

#[cfg(feature = "sqlite")]
pub use sqlite::{db as sqlite_db, SqliteDatabase};
pub use recon_api::{
    LineReport,
    OrderGuard,
    OrderLocks,
    ReconciliationApi,
    ReconciliationError,
    ReconciliationOptions,
    ReconciliationReport,
    ReportSummary,
    DEFAULT_FUZZY_THRESHOLD,
    DEFAULT_MAX_SCAN_COST,
    DEFAULT_NAME_VINTAGE_THRESHOLD,
};
