use std::{fmt::Display, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use thiserror::Error;
use vintrade_common::{Percent, Usd};

#[derive(Debug, Clone, Error)]
#[error("Invalid value for {0}: {1}")]
pub struct ConversionError(&'static str, String);

//--------------------------------------     MatchSource      ---------------------------------------------------------
/// The strategy that bound a demand line to a supplier quote. An unmatched line carries `None` in place of a
/// `MatchSource`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Type, Serialize, Deserialize)]
#[sqlx(rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MatchSource {
    /// The line's canonical wine code shares its coarse prefix with a request item.
    Identifier,
    /// The product names are similar and the vintages are compatible.
    NameVintage,
    /// Best-effort name similarity, ignoring vintage.
    Fuzzy,
}

impl Display for MatchSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MatchSource::Identifier => write!(f, "IDENTIFIER"),
            MatchSource::NameVintage => write!(f, "NAME_VINTAGE"),
            MatchSource::Fuzzy => write!(f, "FUZZY"),
        }
    }
}

impl FromStr for MatchSource {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "IDENTIFIER" => Ok(Self::Identifier),
            "NAME_VINTAGE" => Ok(Self::NameVintage),
            "FUZZY" => Ok(Self::Fuzzy),
            _ => Err(ConversionError("match source", s.to_string())),
        }
    }
}

//--------------------------------------      LineStatus      ---------------------------------------------------------
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Type, Serialize, Deserialize)]
#[sqlx(rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LineStatus {
    /// No supplier quote has been bound to the line.
    #[default]
    Unmatched,
    /// A supplier quote was selected for the line.
    Matched,
}

impl Display for LineStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LineStatus::Unmatched => write!(f, "UNMATCHED"),
            LineStatus::Matched => write!(f, "MATCHED"),
        }
    }
}

//--------------------------------------  DemandOrderStatus   ---------------------------------------------------------
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Type, Serialize, Deserialize)]
#[sqlx(rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DemandOrderStatus {
    /// The order has been ingested but never reconciled.
    #[default]
    Pending,
    /// At least one reconciliation run has completed. This says nothing about whether every line found a quote.
    Matched,
}

impl Display for DemandOrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DemandOrderStatus::Pending => write!(f, "PENDING"),
            DemandOrderStatus::Matched => write!(f, "MATCHED"),
        }
    }
}

impl FromStr for DemandOrderStatus {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "PENDING" => Ok(Self::Pending),
            "MATCHED" => Ok(Self::Matched),
            _ => Err(ConversionError("order status", s.to_string())),
        }
    }
}

//--------------------------------------     RequestItem      ---------------------------------------------------------
/// A wanted product within an RFQ batch. Suppliers quote against request items.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct RequestItem {
    pub id: i64,
    pub batch_id: i64,
    pub product_name: String,
    pub producer: Option<String>,
    pub vintage: Option<String>,
    /// The canonical wine code, if known.
    pub identifier: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewRequestItem {
    pub batch_id: i64,
    pub product_name: String,
    pub producer: Option<String>,
    pub vintage: Option<String>,
    pub identifier: Option<String>,
}

impl NewRequestItem {
    pub fn new<S: Into<String>>(batch_id: i64, product_name: S) -> Self {
        Self { batch_id, product_name: product_name.into(), producer: None, vintage: None, identifier: None }
    }

    pub fn with_producer<S: Into<String>>(mut self, producer: S) -> Self {
        self.producer = Some(producer.into());
        self
    }

    pub fn with_vintage<S: Into<String>>(mut self, vintage: S) -> Self {
        self.vintage = Some(vintage.into());
        self
    }

    pub fn with_identifier<S: Into<String>>(mut self, identifier: S) -> Self {
        self.identifier = Some(identifier.into());
        self
    }
}

//--------------------------------------        Quote         ---------------------------------------------------------
/// A supplier's cost price for a request item. Only quotes with a cost price are ever loaded as `Quote`s; unpriced
/// quotes are filtered out by the quote source.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct Quote {
    pub id: i64,
    pub item_id: i64,
    pub supplier_id: i64,
    pub cost_price_per_case_usd: Usd,
    pub quoted_vintage: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewQuote {
    pub item_id: i64,
    pub supplier_id: i64,
    /// Suppliers may decline to price an item. Such quotes are stored but never eligible for matching.
    pub cost_price_per_case_usd: Option<Usd>,
    pub quoted_vintage: Option<String>,
}

impl NewQuote {
    pub fn new(item_id: i64, supplier_id: i64, cost_price_per_case_usd: Usd) -> Self {
        Self { item_id, supplier_id, cost_price_per_case_usd: Some(cost_price_per_case_usd), quoted_vintage: None }
    }

    pub fn unpriced(item_id: i64, supplier_id: i64) -> Self {
        Self { item_id, supplier_id, cost_price_per_case_usd: None, quoted_vintage: None }
    }

    pub fn with_quoted_vintage<S: Into<String>>(mut self, vintage: S) -> Self {
        self.quoted_vintage = Some(vintage.into());
        self
    }
}

//--------------------------------------       Supplier       ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct Supplier {
    pub id: i64,
    pub name: String,
}

//--------------------------------------      DemandLine      ---------------------------------------------------------
/// A line item on a customer purchase order.
///
/// The descriptive fields (`product_name` through `sell_price_per_case_usd`) are set at ingest. The remaining fields
/// are owned by reconciliation and are overwritten in full on every run.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct DemandLine {
    pub id: i64,
    pub order_id: i64,
    pub product_name: String,
    pub vintage: Option<String>,
    pub identifier: Option<String>,
    pub quantity: i64,
    pub sell_price_per_case_usd: Option<Usd>,
    pub matched_quote_id: Option<i64>,
    pub match_source: Option<MatchSource>,
    pub buy_price_per_case_usd: Option<Usd>,
    pub profit_usd: Option<Usd>,
    pub profit_margin_percent: Option<Percent>,
    pub is_losing_item: bool,
    pub status: LineStatus,
}

#[derive(Debug, Clone)]
pub struct NewDemandLine {
    pub order_id: i64,
    pub product_name: String,
    pub vintage: Option<String>,
    pub identifier: Option<String>,
    pub quantity: i64,
    pub sell_price_per_case_usd: Option<Usd>,
}

impl NewDemandLine {
    pub fn new<S: Into<String>>(order_id: i64, product_name: S, quantity: i64) -> Self {
        Self {
            order_id,
            product_name: product_name.into(),
            vintage: None,
            identifier: None,
            quantity,
            sell_price_per_case_usd: None,
        }
    }

    pub fn with_vintage<S: Into<String>>(mut self, vintage: S) -> Self {
        self.vintage = Some(vintage.into());
        self
    }

    pub fn with_identifier<S: Into<String>>(mut self, identifier: S) -> Self {
        self.identifier = Some(identifier.into());
        self
    }

    pub fn with_sell_price(mut self, price: Usd) -> Self {
        self.sell_price_per_case_usd = Some(price);
        self
    }
}

//--------------------------------------     DemandOrder      ---------------------------------------------------------
/// A customer purchase order, with the totals computed by the most recent reconciliation run.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct DemandOrder {
    pub id: i64,
    /// The RFQ batch whose quotes this order is sourced from. Orders without a batch cannot be reconciled.
    pub request_batch_id: Option<i64>,
    pub total_sell_usd: Usd,
    pub total_buy_usd: Usd,
    pub total_profit_usd: Usd,
    pub profit_margin_percent: Percent,
    pub losing_item_count: i64,
    pub status: DemandOrderStatus,
    /// Incremented on every reconciliation write. Used as an optimistic concurrency check.
    pub version: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default)]
pub struct NewDemandOrder {
    pub request_batch_id: Option<i64>,
}

impl NewDemandOrder {
    pub fn for_batch(batch_id: i64) -> Self {
        Self { request_batch_id: Some(batch_id) }
    }

    pub fn unlinked() -> Self {
        Self { request_batch_id: None }
    }
}
