//! Value types shared by the vintrade engine and its tooling.
//!
//! Monetary values are exact decimals ([`Usd`]), and percentages have their own type ([`Percent`]) so that the two are
//! never confused. Both round with [`round2`], and both are stored in SQLite as exact decimal text.
#[macro_use]
mod sqlite_text;

mod percent;
mod usd;

pub mod helpers;
pub mod op;

pub use percent::Percent;
pub use usd::{round2, Usd, UsdConversionError};
