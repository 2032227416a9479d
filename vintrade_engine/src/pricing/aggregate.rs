use vintrade_common::Usd;

use super::PricingOverflow;
use crate::{
    db_types::{DemandLine, DemandOrderStatus},
    traits::OrderTotals,
};

/// Recomputes order totals from the full, current set of lines, matched and unmatched alike.
///
/// Lines without a sell or buy price contribute zero to the respective total. An unmatched line therefore adds revenue
/// but no cost, which flatters the order margin until it is matched.
///
/// The order status is `Matched` once a run completes, whether or not every line found a quote.
pub fn calculate_order_totals(lines: &[DemandLine]) -> Result<OrderTotals, PricingOverflow> {
    let total_sell_usd =
        extended_total(lines, |l| l.sell_price_per_case_usd).ok_or(PricingOverflow("order revenue"))?;
    let total_buy_usd = extended_total(lines, |l| l.buy_price_per_case_usd).ok_or(PricingOverflow("order cost"))?;
    let total_profit_usd =
        total_sell_usd.checked_sub(total_buy_usd).ok_or(PricingOverflow("order profit"))?.round2();
    let profit_margin_percent =
        total_profit_usd.checked_percent_of(total_sell_usd).ok_or(PricingOverflow("order margin"))?;
    let losing_item_count = lines.iter().filter(|l| l.is_losing_item).count() as i64;
    Ok(OrderTotals {
        total_sell_usd,
        total_buy_usd,
        total_profit_usd,
        profit_margin_percent,
        losing_item_count,
        status: DemandOrderStatus::Matched,
    })
}

/// Sum of `price × quantity` over all lines, with missing prices counting as zero.
fn extended_total<F>(lines: &[DemandLine], price: F) -> Option<Usd>
where F: Fn(&DemandLine) -> Option<Usd> {
    lines.iter().try_fold(Usd::zero(), |total, line| {
        let extended = price(line).unwrap_or_default().checked_mul_quantity(line.quantity)?;
        total.checked_add(extended)
    })
}

#[cfg(test)]
mod test {
    use std::str::FromStr;

    use vintrade_common::Percent;

    use super::*;
    use crate::db_types::LineStatus;

    fn usd(s: &str) -> Usd {
        Usd::from_str(s).unwrap()
    }

    fn calculate_order_totals(lines: &[DemandLine]) -> OrderTotals {
        super::calculate_order_totals(lines).expect("totals are representable")
    }

    fn line(id: i64, quantity: i64, sell: Option<&str>, buy: Option<&str>, losing: bool) -> DemandLine {
        DemandLine {
            id,
            order_id: 1,
            product_name: format!("Wine {id}"),
            vintage: None,
            identifier: None,
            quantity,
            sell_price_per_case_usd: sell.map(usd),
            matched_quote_id: buy.map(|_| id * 10),
            match_source: None,
            buy_price_per_case_usd: buy.map(usd),
            profit_usd: None,
            profit_margin_percent: None,
            is_losing_item: losing,
            status: if buy.is_some() { LineStatus::Matched } else { LineStatus::Unmatched },
        }
    }

    #[test]
    fn unmatched_lines_count_towards_revenue_only() {
        let lines = vec![
            line(1, 1, Some("100"), Some("60"), false),
            line(2, 1, Some("50"), None, false),
            line(3, 1, Some("50"), None, false),
        ];
        let totals = calculate_order_totals(&lines);
        assert_eq!(totals.total_sell_usd, usd("200"));
        assert_eq!(totals.total_buy_usd, usd("60"));
        assert_eq!(totals.total_profit_usd, usd("140"));
        assert_eq!(totals.profit_margin_percent, Percent::from(70));
        assert_eq!(totals.losing_item_count, 0);
        assert_eq!(totals.status, DemandOrderStatus::Matched);
    }

    #[test]
    fn quantities_multiply_prices() {
        let lines =
            vec![line(1, 6, Some("100"), Some("120"), true), line(2, 12, Some("25.25"), Some("20.10"), false)];
        let totals = calculate_order_totals(&lines);
        assert_eq!(totals.total_sell_usd, usd("903"));
        assert_eq!(totals.total_buy_usd, usd("961.20"));
        assert_eq!(totals.total_profit_usd, usd("-58.20"));
        assert_eq!(totals.profit_margin_percent, Percent::from_str("-6.45").unwrap());
        assert_eq!(totals.losing_item_count, 1);
        assert_eq!(totals.total_profit_usd, (totals.total_sell_usd - totals.total_buy_usd).round2());
    }

    #[test]
    fn no_revenue_means_zero_margin() {
        let lines = vec![line(1, 3, None, Some("10"), false)];
        let totals = calculate_order_totals(&lines);
        assert_eq!(totals.total_sell_usd, Usd::zero());
        assert_eq!(totals.total_buy_usd, usd("30"));
        assert_eq!(totals.total_profit_usd, usd("-30"));
        assert_eq!(totals.profit_margin_percent, Percent::zero());
    }

    #[test]
    fn empty_order_has_zero_totals() {
        let totals = calculate_order_totals(&[]);
        assert_eq!(totals.total_sell_usd, Usd::zero());
        assert_eq!(totals.losing_item_count, 0);
        assert_eq!(totals.status, DemandOrderStatus::Matched);
    }

    #[test]
    fn overflowing_totals_are_an_error() {
        let lines = vec![line(1, 9_000_000_000_000_000_000, Some("100000000000"), None, false)];
        assert_eq!(super::calculate_order_totals(&lines).unwrap_err(), PricingOverflow("order revenue"));
        let lines = vec![line(1, 9_000_000_000_000_000_000, Some("1"), Some("100000000000"), false)];
        assert_eq!(super::calculate_order_totals(&lines).unwrap_err(), PricingOverflow("order cost"));
    }
}
