//! Performance metrics calculator.
//!
//! Calculates risk and return statistics per asset and regime from daily log
//! returns.

use std::fmt;

use rayon::prelude::*;
use serde::Serialize;
use tracing::{debug, info};

use crate::data::{ReturnPanel, ReturnSeries};
use crate::regime::labels::segments;
use crate::regime::{RegimeLabel, RegimeLabels, Segment};
use crate::render::{round_to, serialize_percent};
use crate::TRADING_DAYS_PER_YEAR;

use super::stats;

/// Risk and return metrics for one asset in one regime.
///
/// Percentage fields hold fractions (`0.05` is 5%) and serialize as
/// percentage strings with two decimals. Ratio fields are rounded to 3 dp.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(bound(serialize = "R: fmt::Display"))]
pub struct MetricsRecord<R> {
    pub asset: String,
    pub regime: Segment<R>,
    pub days: usize,

    // Return metrics
    #[serde(serialize_with = "serialize_percent")]
    pub total_return: f64,
    #[serde(serialize_with = "serialize_percent")]
    pub ann_return: f64,
    #[serde(serialize_with = "serialize_percent")]
    pub ann_vol: f64,

    // Risk-adjusted returns
    pub sharpe: f64,
    pub sortino: f64,

    // Tail risk
    #[serde(serialize_with = "serialize_percent")]
    pub max_drawdown: f64,
    #[serde(serialize_with = "serialize_percent")]
    pub var_95: f64,
    #[serde(serialize_with = "serialize_percent")]
    pub cvar_95: f64,

    // Distribution shape
    pub skewness: f64,
    pub kurtosis: f64,
}

/// Metrics calculator.
pub struct MetricsCalculator;

impl MetricsCalculator {
    /// Calculate metrics for every column and regime.
    ///
    /// Regimes are reported in order of first appearance, followed by the
    /// full sample. `risk_free_rate` is annualized.
    pub fn calculate<R: RegimeLabel>(
        panel: &ReturnPanel,
        regimes: &RegimeLabels<R>,
        risk_free_rate: f64,
    ) -> Vec<MetricsRecord<R>> {
        let aligned = regimes.align(panel.index());
        let segments = segments(Some(regimes), false);
        let assets: Vec<ReturnSeries<'_>> = panel.series().collect();

        let records: Vec<MetricsRecord<R>> = assets
            .par_iter()
            .flat_map_iter(|asset| {
                segments
                    .iter()
                    .filter_map(|segment| {
                        let returns: Vec<f64> = asset
                            .values()
                            .iter()
                            .zip(&aligned)
                            .filter(|(_, label)| segment.includes(**label))
                            .filter_map(|(r, _)| *r)
                            .collect();
                        Self::calculate_single(&returns, asset.name(), *segment, risk_free_rate)
                    })
                    .collect::<Vec<_>>()
            })
            .collect();

        info!(
            assets = assets.len(),
            segments = segments.len(),
            records = records.len(),
            "calculated regime metrics"
        );

        records
    }

    /// Calculate metrics for one return subseries.
    ///
    /// Returns `None` for an empty subseries, where annualization is
    /// undefined.
    pub fn calculate_single<R: RegimeLabel>(
        returns: &[f64],
        asset: &str,
        regime: Segment<R>,
        risk_free_rate: f64,
    ) -> Option<MetricsRecord<R>> {
        let days = returns.len();
        if days == 0 {
            debug!(asset, regime = %regime, "skipping metrics: no observations");
            return None;
        }

        let total_return = finite_or_zero(returns.iter().sum::<f64>().exp() - 1.0);
        let ann_return = Self::annualize(total_return, days);
        if !ann_return.is_finite() {
            debug!(asset, regime = %regime, days, "annualized return overflowed");
        }
        let ann_return = finite_or_zero(ann_return);
        let ann_vol = Self::annualized_std(returns);

        let excess = ann_return - risk_free_rate;
        let sharpe = if ann_vol > 0.0 { excess / ann_vol } else { 0.0 };

        let negative: Vec<f64> = returns.iter().copied().filter(|r| *r < 0.0).collect();
        let downside_dev = Self::annualized_std(&negative);
        let sortino = if downside_dev > 0.0 {
            excess / downside_dev
        } else {
            0.0
        };

        let var_95 = stats::percentile(returns, 5.0)?;
        let tail: Vec<f64> = returns.iter().copied().filter(|r| *r <= var_95).collect();
        // The tail mean cannot exceed its own cutoff; min() absorbs rounding.
        let cvar_95 = stats::mean(&tail).min(var_95);

        Some(MetricsRecord {
            asset: asset.to_string(),
            regime,
            days,
            total_return,
            ann_return,
            ann_vol,
            sharpe: round_to(finite_or_zero(sharpe), 3),
            sortino: round_to(finite_or_zero(sortino), 3),
            max_drawdown: stats::max_drawdown(returns),
            var_95,
            cvar_95,
            skewness: round_to(stats::skewness(returns), 3),
            kurtosis: round_to(stats::excess_kurtosis(returns), 3),
        })
    }

    /// Geometric annualization on a 252-day year.
    fn annualize(total_return: f64, days: usize) -> f64 {
        (1.0 + total_return).powf(TRADING_DAYS_PER_YEAR / days as f64) - 1.0
    }

    /// Sample std scaled by sqrt(252); 0 when undefined.
    fn annualized_std(returns: &[f64]) -> f64 {
        stats::sample_std(returns)
            .map(|s| s * TRADING_DAYS_PER_YEAR.sqrt())
            .unwrap_or(0.0)
    }
}

/// Overflowed or undefined values fall back to the 0 sentinel.
fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}
