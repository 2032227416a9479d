//! The match strategy chain.
//!
//! Every demand line is offered to three strategies in priority order, and the first one to produce a quote wins:
//!
//! | Strategy                       | Candidates                                       | Optimises         |
//! |--------------------------------|--------------------------------------------------|-------------------|
//! | [`MatchSource::Identifier`]    | items sharing the line's coarse identifier       | price             |
//! | [`MatchSource::NameVintage`]   | items with similar names and compatible vintages | price, over all   |
//! | [`MatchSource::Fuzzy`]         | items with the most similar name                 | similarity, then price |
//!
//! Note the asymmetry between the last two. The name+vintage strategy pools the quotes of *every* qualifying item and
//! takes the cheapest. The fuzzy strategy first commits to the single most similar item (the first one found, on ties)
//! and only then looks at price, within that item. If the winning item has no quotes, the line stays unmatched even if
//! a less similar item has some.
use log::trace;

use crate::{
    db_types::{DemandLine, MatchSource, Quote, RequestItem},
    matching::{identifier_prefix, similarity, QuoteIndex},
};

/// The order in which strategies are tried.
pub const STRATEGY_CHAIN: [MatchSource; 3] = [MatchSource::Identifier, MatchSource::NameVintage, MatchSource::Fuzzy];

/// Similarity cut-offs for the name-based strategies. Scores must be strictly greater than the threshold.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MatchThresholds {
    pub name_vintage: f64,
    pub fuzzy: f64,
}

impl Default for MatchThresholds {
    fn default() -> Self {
        Self { name_vintage: 0.7, fuzzy: 0.5 }
    }
}

/// The quote selected for a demand line, and how it was found.
#[derive(Debug, Clone, PartialEq)]
pub struct LineMatch {
    pub quote: Quote,
    pub source: MatchSource,
}

/// The core strategy chain. Cheap to construct; borrows the index for the duration of a run.
#[derive(Debug, Clone, Copy)]
pub struct LineMatcher<'a> {
    index: &'a QuoteIndex,
    thresholds: MatchThresholds,
}

impl<'a> LineMatcher<'a> {
    pub fn new(index: &'a QuoteIndex, thresholds: MatchThresholds) -> Self {
        Self { index, thresholds }
    }

    /// Runs the strategy chain for `line`. Returns `None` if no strategy found a quote.
    pub fn match_line(&self, line: &DemandLine) -> Option<LineMatch> {
        STRATEGY_CHAIN.iter().find_map(|&source| {
            let quote = match source {
                MatchSource::Identifier => self.by_identifier(line),
                MatchSource::NameVintage => self.by_name_and_vintage(line),
                MatchSource::Fuzzy => self.by_fuzzy_name(line),
            }?;
            trace!("🍷️ Line #{} matched quote #{} by {source}", line.id, quote.id);
            Some(LineMatch { quote: quote.clone(), source })
        })
    }

    fn by_identifier(&self, line: &DemandLine) -> Option<&'a Quote> {
        let prefix = line.identifier.as_deref().and_then(identifier_prefix)?;
        cheapest(self.index.quotes_for_prefix(&prefix).iter())
    }

    fn by_name_and_vintage(&self, line: &DemandLine) -> Option<&'a Quote> {
        let index = self.index;
        let candidates = index
            .items()
            .iter()
            .filter(|item| vintages_compatible(line.vintage.as_deref(), item.vintage.as_deref()))
            .filter(|item| similarity(&line.product_name, &item.product_name) > self.thresholds.name_vintage)
            .collect::<Vec<&RequestItem>>();
        trace!("🍷️ Line #{} has {} name+vintage candidates", line.id, candidates.len());
        cheapest(candidates.into_iter().flat_map(|item| index.quotes_for_item(item.id)))
    }

    fn by_fuzzy_name(&self, line: &DemandLine) -> Option<&'a Quote> {
        let index = self.index;
        let best = index.items().iter().fold(None::<(&RequestItem, f64)>, |best, item| {
            let score = similarity(&line.product_name, &item.product_name);
            match best {
                _ if score <= self.thresholds.fuzzy => best,
                Some((_, best_score)) if score <= best_score => best,
                _ => Some((item, score)),
            }
        });
        let (item, score) = best?;
        trace!("🍷️ Line #{} fuzzy-matched request item #{} with score {score:.3}", line.id, item.id);
        cheapest(index.quotes_for_item(item.id).iter())
    }
}

/// Vintages are compatible if either side is unspecified, or both are the same.
pub fn vintages_compatible(a: Option<&str>, b: Option<&str>) -> bool {
    match (a.map(str::trim), b.map(str::trim)) {
        (None, _) | (_, None) => true,
        (Some(""), _) | (_, Some("")) => true,
        (Some(a), Some(b)) => a == b,
    }
}

/// The cheapest quote, with ties broken by the lowest quote id so that results do not depend on load order.
pub fn cheapest<'q, I>(quotes: I) -> Option<&'q Quote>
where I: Iterator<Item = &'q Quote> {
    quotes.min_by(|a, b| a.cost_price_per_case_usd.cmp(&b.cost_price_per_case_usd).then(a.id.cmp(&b.id)))
}
