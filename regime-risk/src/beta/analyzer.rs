//! CAPM beta estimation by regime.
//!
//! Regresses each asset's returns on the market column over the full sample
//! and over every regime in a label series, then reports how beta shifts
//! from the Low-Vol to the High-Vol regime.

use std::fmt;

use rayon::prelude::*;
use serde::Serialize;
use tracing::{debug, info};

use crate::data::{PanelError, ReturnPanel, ReturnSeries};
use crate::regime::labels::segments;
use crate::regime::{RegimeLabel, RegimeLabels, Segment, VolRegime};
use crate::render::{round_to, serialize_scientific};
use crate::TRADING_DAYS_PER_YEAR;

use super::regression::{linregress, LinearFit};

/// Beta statistics for one asset in one regime.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(bound(serialize = "R: fmt::Display"))]
pub struct BetaRecord<R> {
    pub asset: String,
    pub regime: Segment<R>,
    /// Regression slope against the market, 3 dp.
    pub beta: f64,
    /// Intercept annualized to basis points, 2 dp.
    pub alpha_bps: f64,
    pub r_squared: f64,
    #[serde(serialize_with = "serialize_scientific")]
    pub p_value: f64,
    pub std_error: f64,
    pub observations: usize,
}

impl<R> BetaRecord<R> {
    fn from_fit(asset: &str, regime: Segment<R>, fit: &LinearFit) -> Self {
        Self {
            asset: asset.to_string(),
            regime,
            beta: round_to(fit.slope, 3),
            alpha_bps: round_to(fit.intercept * TRADING_DAYS_PER_YEAR * 10_000.0, 2),
            r_squared: round_to(fit.r_squared(), 3),
            p_value: fit.p_value,
            std_error: round_to(fit.std_error, 3),
            observations: fit.observations,
        }
    }
}

/// Beta shift from the Low-Vol to the High-Vol regime.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BetaChangeRecord {
    pub asset: String,
    pub low_vol_beta: f64,
    pub high_vol_beta: f64,
    pub beta_change: f64,
    /// Change relative to the Low-Vol beta, in percent. `None` when the
    /// Low-Vol beta is zero.
    pub beta_change_pct: Option<f64>,
}

/// Beta analyzer.
pub struct BetaAnalyzer;

impl BetaAnalyzer {
    /// Regress every non-market column on `market_column`.
    ///
    /// Segments are the full sample followed by each distinct regime in
    /// order of first appearance. Rows where either return is missing are
    /// dropped; segments left with fewer than two pairs produce no record.
    pub fn calculate<R: RegimeLabel>(
        panel: &ReturnPanel,
        market_column: &str,
        regimes: Option<&RegimeLabels<R>>,
    ) -> Result<Vec<BetaRecord<R>>, PanelError> {
        let market = panel.require(market_column)?;
        let aligned = match regimes {
            Some(labels) => labels.align(panel.index()),
            None => vec![None; panel.len()],
        };
        let segments = segments(regimes, true);

        let assets: Vec<ReturnSeries<'_>> = panel
            .series()
            .filter(|s| s.name() != market_column)
            .collect();

        let records: Vec<BetaRecord<R>> = assets
            .par_iter()
            .flat_map_iter(|asset| {
                segments
                    .iter()
                    .filter_map(|segment| Self::regress(market, *asset, *segment, &aligned))
                    .collect::<Vec<_>>()
            })
            .collect();

        info!(
            market = market_column,
            assets = assets.len(),
            segments = segments.len(),
            records = records.len(),
            "calculated regime betas"
        );

        Ok(records)
    }

    fn regress<R: RegimeLabel>(
        market: ReturnSeries<'_>,
        asset: ReturnSeries<'_>,
        segment: Segment<R>,
        aligned: &[Option<R>],
    ) -> Option<BetaRecord<R>> {
        let (x, y): (Vec<f64>, Vec<f64>) = market
            .values()
            .iter()
            .zip(asset.values())
            .zip(aligned)
            .filter(|(_, label)| segment.includes(**label))
            .filter_map(|((m, a), _)| Some(((*m)?, (*a)?)))
            .unzip();

        if x.len() < 2 {
            debug!(
                asset = asset.name(),
                regime = %segment,
                observations = x.len(),
                "skipping beta: fewer than 2 paired observations"
            );
            return None;
        }

        match linregress(&x, &y) {
            Some(fit) => Some(BetaRecord::from_fit(asset.name(), segment, &fit)),
            None => {
                debug!(
                    asset = asset.name(),
                    regime = %segment,
                    "skipping beta: market returns have no variance"
                );
                None
            }
        }
    }

    /// Beta change between the Low-Vol and High-Vol regimes per asset.
    ///
    /// Assets missing either regime are skipped.
    pub fn get_beta_changes(beta_table: &[BetaRecord<VolRegime>]) -> Vec<BetaChangeRecord> {
        let mut assets: Vec<&str> = Vec::new();
        for record in beta_table {
            if !assets.contains(&record.asset.as_str()) {
                assets.push(&record.asset);
            }
        }

        let beta_for = |asset: &str, regime: VolRegime| {
            beta_table
                .iter()
                .find(|r| r.asset == asset && r.regime == Segment::Regime(regime))
                .map(|r| r.beta)
        };

        assets
            .into_iter()
            .filter_map(|asset| {
                let low_vol_beta = beta_for(asset, VolRegime::LowVol)?;
                let high_vol_beta = beta_for(asset, VolRegime::HighVol)?;
                let change = high_vol_beta - low_vol_beta;

                let beta_change_pct = if low_vol_beta == 0.0 {
                    None
                } else {
                    Some(round_to(change / low_vol_beta * 100.0, 1))
                };

                Some(BetaChangeRecord {
                    asset: asset.to_string(),
                    low_vol_beta,
                    high_vol_beta,
                    beta_change: round_to(change, 3),
                    beta_change_pct,
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    const MARKET: [f64; 10] = [
        0.01, -0.02, 0.015, 0.005, -0.01, 0.02, -0.005, 0.012, -0.018, 0.007,
    ];

    fn dates(n: usize) -> Vec<NaiveDate> {
        let start = NaiveDate::from_ymd_opt(2023, 6, 1).unwrap();
        (0..n)
            .map(|i| start + chrono::Duration::days(i as i64))
            .collect()
    }

    fn split_labels() -> RegimeLabels<VolRegime> {
        dates(10)
            .into_iter()
            .enumerate()
            .map(|(i, d)| {
                let regime = if i < 5 { VolRegime::LowVol } else { VolRegime::HighVol };
                (d, regime)
            })
            .collect()
    }

    fn record(asset: &str, regime: VolRegime, beta: f64) -> BetaRecord<VolRegime> {
        BetaRecord {
            asset: asset.to_string(),
            regime: Segment::Regime(regime),
            beta,
            alpha_bps: 0.0,
            r_squared: 1.0,
            p_value: 0.0,
            std_error: 0.0,
            observations: 10,
        }
    }

    #[test]
    fn test_recovers_scaled_market() {
        let panel = ReturnPanel::new(dates(10))
            .with_column("SPY", MARKET.to_vec())
            .unwrap()
            .with_column("B", MARKET.iter().map(|m| 2.0 * m).collect())
            .unwrap();

        let records = BetaAnalyzer::calculate::<VolRegime>(&panel, "SPY", None).unwrap();
        assert_eq!(records.len(), 1);

        let b = &records[0];
        assert_eq!(b.asset, "B");
        assert_eq!(b.regime, Segment::FullSample);
        assert_eq!(b.beta, 2.0);
        assert_eq!(b.r_squared, 1.0);
        assert!(b.p_value < 1e-10);
        assert!(b.alpha_bps.abs() < 0.01);
        assert_eq!(b.observations, 10);
    }

    #[test]
    fn test_alpha_is_annualized_in_basis_points() {
        // One basis point of daily alpha is 252 bps a year.
        let panel = ReturnPanel::new(dates(10))
            .with_column("SPY", MARKET.to_vec())
            .unwrap()
            .with_column("ALPHA", MARKET.iter().map(|m| 0.0001 + 1.5 * m).collect())
            .unwrap();

        let records = BetaAnalyzer::calculate::<VolRegime>(&panel, "SPY", None).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].beta, 1.5);
        assert_eq!(records[0].alpha_bps, 252.0);
        assert_eq!(records[0].r_squared, 1.0);
    }

    #[test]
    fn test_betas_by_regime() {
        let asset: Vec<f64> = MARKET
            .iter()
            .enumerate()
            .map(|(i, m)| if i < 5 { 1.0 * m } else { 3.0 * m })
            .collect();
        let panel = ReturnPanel::new(dates(10))
            .with_column("SPY", MARKET.to_vec())
            .unwrap()
            .with_column("QQQ", asset)
            .unwrap();
        let labels = split_labels();

        let records = BetaAnalyzer::calculate(&panel, "SPY", Some(&labels)).unwrap();
        let regimes: Vec<_> = records.iter().map(|r| r.regime).collect();
        assert_eq!(
            regimes,
            vec![
                Segment::FullSample,
                Segment::Regime(VolRegime::LowVol),
                Segment::Regime(VolRegime::HighVol)
            ]
        );
        assert_eq!(records[1].beta, 1.0);
        assert_eq!(records[1].observations, 5);
        assert_eq!(records[2].beta, 3.0);

        let changes = BetaAnalyzer::get_beta_changes(&records);
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].beta_change, 2.0);
        assert_eq!(changes[0].beta_change_pct, Some(200.0));
    }

    #[test]
    fn test_missing_values_are_dropped() {
        let mut asset: Vec<Option<f64>> = MARKET.iter().map(|m| Some(0.5 * m)).collect();
        asset[3] = None;
        let mut market: Vec<Option<f64>> = MARKET.iter().copied().map(Some).collect();
        market[7] = None;

        let panel = ReturnPanel::new(dates(10))
            .with_optional_column("SPY", market)
            .unwrap()
            .with_optional_column("TLT", asset)
            .unwrap();

        let records = BetaAnalyzer::calculate::<VolRegime>(&panel, "SPY", None).unwrap();
        assert_eq!(records[0].observations, 8);
        assert_eq!(records[0].beta, 0.5);
    }

    #[test]
    fn test_sparse_regime_is_skipped() {
        let mut asset: Vec<Option<f64>> = MARKET.iter().map(|m| Some(1.2 * m)).collect();
        // Leave a single High-Vol observation.
        for v in asset.iter_mut().skip(6) {
            *v = None;
        }
        let panel = ReturnPanel::new(dates(10))
            .with_column("SPY", MARKET.to_vec())
            .unwrap()
            .with_optional_column("IWM", asset)
            .unwrap();
        let labels = split_labels();

        let records = BetaAnalyzer::calculate(&panel, "SPY", Some(&labels)).unwrap();
        assert_eq!(records.len(), 2);
        assert!(records
            .iter()
            .all(|r| r.regime != Segment::Regime(VolRegime::HighVol)));

        // No High-Vol beta, so no change record either.
        assert!(BetaAnalyzer::get_beta_changes(&records).is_empty());
    }

    #[test]
    fn test_flat_market_is_skipped() {
        let panel = ReturnPanel::new(dates(4))
            .with_column("SPY", vec![0.01; 4])
            .unwrap()
            .with_column("GLD", vec![0.01, 0.02, -0.01, 0.0])
            .unwrap();
        let records = BetaAnalyzer::calculate::<VolRegime>(&panel, "SPY", None).unwrap();
        assert!(records.is_empty());
    }

    #[test]
    fn test_unknown_market_column() {
        let panel = ReturnPanel::from_series("QQQ", dates(3), vec![0.01, 0.02, 0.03]).unwrap();
        let err = BetaAnalyzer::calculate::<VolRegime>(&panel, "SPY", None).unwrap_err();
        assert_eq!(err, PanelError::MissingColumn("SPY".to_string()));
    }

    #[test]
    fn test_beta_changes_guards_zero_low_beta() {
        let table = vec![
            record("A", VolRegime::LowVol, 0.0),
            record("A", VolRegime::HighVol, 0.4),
            record("B", VolRegime::LowVol, 0.8),
            record("B", VolRegime::HighVol, 1.2),
            record("C", VolRegime::HighVol, 1.1),
        ];

        let changes = BetaAnalyzer::get_beta_changes(&table);
        assert_eq!(changes.len(), 2);

        assert_eq!(changes[0].asset, "A");
        assert_eq!(changes[0].beta_change, 0.4);
        assert_eq!(changes[0].beta_change_pct, None);

        assert_eq!(changes[1].asset, "B");
        assert_eq!(changes[1].beta_change, 0.4);
        assert_eq!(changes[1].beta_change_pct, Some(50.0));
    }

    #[test]
    fn test_serialized_record() {
        let mut r = record("A", VolRegime::HighVol, 1.25);
        r.p_value = 0.000_034_2;
        let json = serde_json::to_value(&r).unwrap();
        assert_eq!(json["regime"], "High-Vol");
        assert_eq!(json["p_value"], "3.42e-05");
        assert_eq!(json["beta"], 1.25);
    }
}
