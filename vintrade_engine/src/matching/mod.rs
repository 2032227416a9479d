//! Matching demand lines to supplier quotes.
//!
//! * [`similarity`] normalises product names and scores them against each other.
//! * [`QuoteIndex`] organises a batch's priced quotes by coarse identifier prefix and by request item.
//! * [`LineMatcher`] runs the strategy chain for one line against the index.
//!
//! Everything in this module is pure: no I/O, no shared state.
mod index;
mod similarity;
mod strategies;

pub use index::{identifier_prefix, QuoteIndex, IDENTIFIER_PREFIX_LEN};
pub use similarity::{normalize, similarity, CONTAINMENT_SCORE, EXACT_SCORE};
pub use strategies::{cheapest, vintages_compatible, LineMatch, LineMatcher, MatchThresholds, STRATEGY_CHAIN};
