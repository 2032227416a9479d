use std::collections::HashMap;

use thiserror::Error;

use crate::{
    db_types::{Quote, RequestItem},
    traits::is_transient_sqlx_error,
};

#[derive(Debug, Clone, Error)]
pub enum QuoteSourceError {
    #[error("Could not reach the quote database: {0}")]
    ConnectionError(String),
    #[error("Quote database error: {0}")]
    DatabaseError(String),
}

impl QuoteSourceError {
    pub fn is_transient(&self) -> bool {
        matches!(self, QuoteSourceError::ConnectionError(_))
    }
}

impl From<sqlx::Error> for QuoteSourceError {
    fn from(e: sqlx::Error) -> Self {
        if is_transient_sqlx_error(&e) {
            QuoteSourceError::ConnectionError(e.to_string())
        } else {
            QuoteSourceError::DatabaseError(e.to_string())
        }
    }
}

/// The `QuoteSource` trait exposes the results of the upstream request-for-quote process. The engine treats all of
/// this data as read-only.
#[allow(async_fn_in_trait)]
pub trait QuoteSource {
    /// Fetches every request item in the given RFQ batch, ordered by id.
    async fn fetch_request_items(&self, batch_id: i64) -> Result<Vec<RequestItem>, QuoteSourceError>;

    /// Fetches the quotes for the given request items, ordered by id.
    ///
    /// Only quotes that carry a cost price are returned. Unpriced quotes are never eligible for matching, and callers
    /// rely on not having to filter them out.
    async fn fetch_quotes(&self, item_ids: &[i64]) -> Result<Vec<Quote>, QuoteSourceError>;

    /// Looks up display names for the given suppliers. Unknown ids are simply absent from the result.
    async fn fetch_supplier_names(&self, supplier_ids: &[i64]) -> Result<HashMap<i64, String>, QuoteSourceError>;
}
