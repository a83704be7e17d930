//! Beta stability module.
//!
//! Estimates CAPM beta and alpha per asset and regime by simple linear
//! regression against a market column, and reports the beta shift between
//! the Low-Vol and High-Vol regimes.

pub mod analyzer;
pub mod regression;

pub use analyzer::{BetaAnalyzer, BetaChangeRecord, BetaRecord};
pub use regression::{linregress, LinearFit};
