//! # Backend contracts for the reconciliation engine.
//!
//! The engine never talks to a database directly. It consumes two narrow interfaces, which a storage backend (see
//! [`crate::SqliteDatabase`]) implements:
//!
//! * [`QuoteSource`] exposes the output of the upstream request-for-quote process: request items for a batch, the
//!   priced supplier quotes against them, and supplier names for reporting.
//! * [`DemandOrderManagement`] reads customer purchase orders and their lines, and writes reconciliation results back.
//!
//! Each trait has its own error type. Errors know whether they are transient, so that the API can tell the caller
//! whether a retry makes sense.
mod data_objects;
mod demand_order_management;
mod quote_source;

pub use data_objects::{LineMatchUpdate, OrderTotals};
pub use demand_order_management::{DemandOrderError, DemandOrderManagement};
pub use quote_source::{QuoteSource, QuoteSourceError};

/// Connection-level failures that are worth retrying. Anything the database itself rejects is not.
pub(crate) fn is_transient_sqlx_error(e: &sqlx::Error) -> bool {
    match e {
        sqlx::Error::Io(_) |
        sqlx::Error::Tls(_) |
        sqlx::Error::PoolTimedOut |
        sqlx::Error::PoolClosed |
        sqlx::Error::WorkerCrashed => true,
        sqlx::Error::Database(db) => {
            let message = db.message().to_ascii_lowercase();
            message.contains("database is locked") || message.contains("database is busy")
        },
        _ => false,
    }
}
