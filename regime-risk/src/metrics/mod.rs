//! Performance metrics module.
//!
//! Provides per-regime risk and return calculations:
//! - Total and annualized return, annualized volatility
//! - Sharpe ratio, Sortino ratio
//! - Maximum drawdown
//! - 95% VaR and CVaR
//! - Skewness, excess kurtosis

pub mod calculator;
pub mod stats;

pub use calculator::{MetricsCalculator, MetricsRecord};
