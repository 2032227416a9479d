use std::{env, str::FromStr};

use log::*;

use crate::matching::MatchThresholds;

pub const DEFAULT_MAX_SCAN_COST: u64 = 5_000_000;
pub const DEFAULT_NAME_VINTAGE_THRESHOLD: f64 = 0.7;
pub const DEFAULT_FUZZY_THRESHOLD: f64 = 0.5;

/// Tuning knobs for a reconciliation run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReconciliationOptions {
    /// The largest `lines × request items` product a single run may scan. Larger runs are rejected up front.
    pub max_scan_cost: u64,
    /// Name similarity a request item must exceed to be a name+vintage candidate.
    pub name_vintage_threshold: f64,
    /// Name similarity a request item must exceed to win the fuzzy fallback.
    pub fuzzy_threshold: f64,
}

impl Default for ReconciliationOptions {
    fn default() -> Self {
        Self {
            max_scan_cost: DEFAULT_MAX_SCAN_COST,
            name_vintage_threshold: DEFAULT_NAME_VINTAGE_THRESHOLD,
            fuzzy_threshold: DEFAULT_FUZZY_THRESHOLD,
        }
    }
}

impl ReconciliationOptions {
    pub fn from_env_or_default() -> Self {
        let max_scan_cost = parse_env("VT_MAX_SCAN_COST", DEFAULT_MAX_SCAN_COST, |_| true);
        let name_vintage_threshold =
            parse_env("VT_NAME_VINTAGE_THRESHOLD", DEFAULT_NAME_VINTAGE_THRESHOLD, is_valid_threshold);
        let fuzzy_threshold = parse_env("VT_FUZZY_THRESHOLD", DEFAULT_FUZZY_THRESHOLD, is_valid_threshold);
        Self { max_scan_cost, name_vintage_threshold, fuzzy_threshold }
    }

    pub fn thresholds(&self) -> MatchThresholds {
        MatchThresholds { name_vintage: self.name_vintage_threshold, fuzzy: self.fuzzy_threshold }
    }

    /// Checks that a run over `lines` demand lines and `items` request items stays within the scan budget.
    pub fn within_scan_budget(&self, lines: usize, items: usize) -> bool {
        (lines as u64).saturating_mul(items as u64) <= self.max_scan_cost
    }
}

fn is_valid_threshold(v: &f64) -> bool {
    (0.0..=1.0).contains(v)
}

fn parse_env<T>(var: &str, default: T, valid: impl Fn(&T) -> bool) -> T
where
    T: FromStr + Copy + std::fmt::Display,
    T::Err: std::fmt::Display,
{
    match env::var(var) {
        Ok(s) => parse_value(var, &s, default, valid),
        Err(_) => {
            info!("🪛️ {var} is not set. Using the default, {default}.");
            default
        },
    }
}

fn parse_value<T>(var: &str, s: &str, default: T, valid: impl Fn(&T) -> bool) -> T
where
    T: FromStr + Copy + std::fmt::Display,
    T::Err: std::fmt::Display,
{
    match s.trim().parse::<T>() {
        Ok(v) if valid(&v) => v,
        Ok(v) => {
            warn!("🪛️ {v} is out of range for {var}. Using the default, {default}, instead.");
            default
        },
        Err(e) => {
            warn!("🪛️ {s} is not a valid value for {var}. {e} Using the default, {default}, instead.");
            default
        },
    }
}
