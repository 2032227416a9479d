use std::fmt::Display;

use prettytable::{
    format::{FormatBuilder, LinePosition, LineSeparator, TableFormat},
    row,
    Table,
};
use vintrade_engine::{ReconciliationReport, ReportSummary};

pub fn markdown_format() -> TableFormat {
    FormatBuilder::new()
        .column_separator('|')
        .borders('|')
        .separators(&[LinePosition::Title], LineSeparator::new('-', '|', '|', '|'))
        .padding(1, 1)
        .build()
}

fn or_dash<T: Display>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_else(|| "-".into())
}

pub fn format_report(report: &ReconciliationReport) -> String {
    let mut table = Table::new();
    table.set_format(markdown_format());
    table.set_titles(row!["Line", "Product", "Match", "Quote", "Supplier", "Sell", "Buy", "Profit", "Margin", "Loss"]);
    for line in &report.per_line {
        table.add_row(row![
            line.line_id,
            line.product_name,
            or_dash(line.match_source),
            or_dash(line.matched_quote_id),
            or_dash(line.supplier_name.as_deref()),
            r->or_dash(line.sell_price_per_case_usd),
            r->or_dash(line.buy_price_per_case_usd),
            r->or_dash(line.profit_usd),
            r->or_dash(line.profit_margin_percent),
            if line.is_losing_item { "⚠️" } else { "" }
        ]);
    }
    format!("Order #{}\n\n{table}\n{}", report.order_id, format_summary(&report.summary))
}

pub fn format_summary(summary: &ReportSummary) -> String {
    let mut table = Table::new();
    table.set_format(markdown_format());
    table.set_titles(row!["Lines", "Matched", "Unmatched", "Losing", "Sell", "Buy", "Profit", "Margin"]);
    table.add_row(row![
        summary.total_items,
        summary.matched_items,
        summary.unmatched_items,
        summary.losing_items,
        r->summary.total_sell_usd,
        r->summary.total_buy_usd,
        r->summary.total_profit_usd,
        r->summary.profit_margin_percent
    ]);
    table.to_string()
}
