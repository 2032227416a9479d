//! Line- and order-level profitability.
//!
//! All money is rounded with [`vintrade_common::round2`] and nothing else.
mod aggregate;
mod profit;

pub use aggregate::calculate_order_totals;
pub use profit::{calculate_line_profit, LineProfit};
use thiserror::Error;

/// A price, quantity or margin fell outside the range of exact decimal arithmetic.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Arithmetic overflow while computing the {0}")]
pub struct PricingOverflow(pub &'static str);
