use std::collections::{HashMap, HashSet};

use crate::db_types::{Quote, RequestItem};

/// The number of significant characters of a canonical wine code that identify the wine itself, independent of the
/// vintage and case-size suffixes.
pub const IDENTIFIER_PREFIX_LEN: usize = 7;

/// Returns the coarse product key of a canonical wine code: its first [`IDENTIFIER_PREFIX_LEN`] alphanumeric
/// characters, upper-cased. Separators such as spaces and dashes are not significant.
///
/// Codes with fewer significant characters than that do not identify a wine, and yield `None`.
pub fn identifier_prefix(identifier: &str) -> Option<String> {
    let prefix = identifier
        .chars()
        .filter(char::is_ascii_alphanumeric)
        .take(IDENTIFIER_PREFIX_LEN)
        .map(|c| c.to_ascii_uppercase())
        .collect::<String>();
    (prefix.len() == IDENTIFIER_PREFIX_LEN).then_some(prefix)
}

/// Lookup structures over the request items and eligible quotes of a single RFQ batch.
///
/// The index is built once per reconciliation run and is immutable afterwards, so line matching can borrow it freely.
#[derive(Debug, Clone, Default)]
pub struct QuoteIndex {
    items: Vec<RequestItem>,
    quotes_by_identifier_prefix: HashMap<String, Vec<Quote>>,
    quotes_by_request_item: HashMap<i64, Vec<Quote>>,
}

impl QuoteIndex {
    /// Builds the index. `quotes` must already be restricted to priced quotes against `items`; quotes against any other
    /// item are ignored.
    pub fn build(items: Vec<RequestItem>, quotes: Vec<Quote>) -> Self {
        let mut quotes_by_request_item: HashMap<i64, Vec<Quote>> = HashMap::with_capacity(items.len());
        for quote in quotes {
            quotes_by_request_item.entry(quote.item_id).or_default().push(quote);
        }
        let item_ids = items.iter().map(|item| item.id).collect::<HashSet<i64>>();
        quotes_by_request_item.retain(|item_id, _| item_ids.contains(item_id));
        let mut quotes_by_identifier_prefix: HashMap<String, Vec<Quote>> = HashMap::new();
        for item in &items {
            let Some(prefix) = item.identifier.as_deref().and_then(identifier_prefix) else {
                continue;
            };
            if let Some(quotes) = quotes_by_request_item.get(&item.id) {
                quotes_by_identifier_prefix.entry(prefix).or_default().extend(quotes.iter().cloned());
            }
        }
        Self { items, quotes_by_identifier_prefix, quotes_by_request_item }
    }

    /// All request items in the batch, in the order the quote source returned them.
    pub fn items(&self) -> &[RequestItem] {
        &self.items
    }

    /// Quotes whose request item shares the given coarse identifier prefix.
    pub fn quotes_for_prefix(&self, prefix: &str) -> &[Quote] {
        self.quotes_by_identifier_prefix.get(prefix).map(Vec::as_slice).unwrap_or_default()
    }

    /// Quotes against the given request item.
    pub fn quotes_for_item(&self, item_id: i64) -> &[Quote] {
        self.quotes_by_request_item.get(&item_id).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn quote_count(&self) -> usize {
        self.quotes_by_request_item.values().map(Vec::len).sum()
    }
}
