use vintrade_common::{Percent, Usd};

use super::PricingOverflow;

/// Profitability of a single demand line, per case.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LineProfit {
    pub profit_usd: Option<Usd>,
    pub profit_margin_percent: Option<Percent>,
    pub is_losing_item: bool,
}

/// Computes per-case profit and margin for a line.
///
/// Profit is only defined when both prices are known; otherwise every field is empty and the line is not a losing item.
/// The margin is taken against the sell price, and is zero when the sell price is not positive.
pub fn calculate_line_profit(
    sell_price: Option<Usd>,
    buy_price: Option<Usd>,
) -> Result<LineProfit, PricingOverflow> {
    let (Some(sell), Some(buy)) = (sell_price, buy_price) else {
        return Ok(LineProfit::default());
    };
    let profit = sell.checked_sub(buy).ok_or(PricingOverflow("line profit"))?.round2();
    let margin = profit.checked_percent_of(sell).ok_or(PricingOverflow("line margin"))?;
    Ok(LineProfit {
        profit_usd: Some(profit),
        profit_margin_percent: Some(margin),
        is_losing_item: profit.is_negative(),
    })
}
