//! Product-name normalisation and similarity scoring.
//!
//! Wine names arrive from customers and suppliers in many spellings: with or without accents on "Château", with a
//! "Domaine" prefix or without, with stray punctuation. [`normalize`] reduces a name to a canonical key, and
//! [`similarity`] scores two names in `[0, 1]`.
use std::{collections::HashSet, sync::LazyLock};

use regex::Regex;

/// Producer honorifics that carry no identifying information. Only whole words are stripped, so "Châteauneuf" keeps
/// its name.
static RE_HONORIFICS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(?:château|chateau|domaine)\b|\bdom\.").expect("Invalid regex"));

pub const EXACT_SCORE: f64 = 1.0;
pub const CONTAINMENT_SCORE: f64 = 0.9;

/// Lower-cases `name`, strips producer honorifics and drops everything outside `[a-z0-9]`.
///
/// ```
/// use vintrade_engine::matching::normalize;
/// assert_eq!(normalize("Château Margaux"), "margaux");
/// assert_eq!(normalize("Dom. Leflaive, Puligny-Montrachet"), "leflaivepulignymontrachet");
/// ```
pub fn normalize(name: &str) -> String {
    let lower = name.to_lowercase();
    let stripped = RE_HONORIFICS.replace_all(&lower, " ");
    stripped.chars().filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit()).collect::<String>().trim().to_string()
}

/// Scores how alike two product names are.
///
/// 1. Identical normalised names score [`EXACT_SCORE`].
/// 2. If one normalised name contains the other, the score is [`CONTAINMENT_SCORE`].
/// 3. Otherwise the score is the Jaccard index of the two character sets.
///
/// A name that normalises to nothing is similar to nothing, so it scores zero against everything, itself included.
/// The score is symmetric in its arguments.
pub fn similarity(a: &str, b: &str) -> f64 {
    let a = normalize(a);
    let b = normalize(b);
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    if a == b {
        return EXACT_SCORE;
    }
    if a.contains(b.as_str()) || b.contains(a.as_str()) {
        return CONTAINMENT_SCORE;
    }
    jaccard(&a, &b)
}

fn jaccard(a: &str, b: &str) -> f64 {
    let a = a.chars().collect::<HashSet<char>>();
    let b = b.chars().collect::<HashSet<char>>();
    let union = a.union(&b).count();
    if union == 0 {
        return 0.0;
    }
    let intersection = a.intersection(&b).count();
    intersection as f64 / union as f64
}
