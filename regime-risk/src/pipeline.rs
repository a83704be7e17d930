//! End-to-end regime analysis.
//!
//! Fits the volatility detector on the market column, labels the panel, and
//! runs the beta and metrics calculations against those labels. The two
//! tables are returned side by side; joining them is left to the caller.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use crate::beta::{BetaAnalyzer, BetaChangeRecord, BetaRecord};
use crate::data::{PanelError, ReturnPanel};
use crate::metrics::{MetricsCalculator, MetricsRecord};
use crate::regime::{
    ConfigurationError, DetectorConfig, DetectorError, RegimeDetector, RegimeLabels, RegimeShare,
    VolRegime,
};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnalysisError {
    #[error("Detector error: {0}")]
    Detector(#[from] DetectorError),

    #[error("Panel error: {0}")]
    Panel(#[from] PanelError),
}

/// Analysis configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub detector: DetectorConfig,
    /// Column used both for regime detection and as the beta regressor.
    pub market_column: String,
    /// Annualized risk-free rate for Sharpe and Sortino.
    pub risk_free_rate: f64,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            detector: DetectorConfig::default(),
            market_column: "SPY".to_string(),
            risk_free_rate: 0.0,
        }
    }
}

/// Everything produced by one analysis run.
#[derive(Debug, Clone, Serialize)]
pub struct RegimeReport {
    /// Fitted rolling-volatility threshold.
    pub threshold: f64,
    pub labels: RegimeLabels<VolRegime>,
    pub regime_stats: Vec<RegimeShare<VolRegime>>,
    pub betas: Vec<BetaRecord<VolRegime>>,
    pub beta_changes: Vec<BetaChangeRecord>,
    pub metrics: Vec<MetricsRecord<VolRegime>>,
}

/// Runs detector, beta analyzer and metrics calculator over a panel.
#[derive(Debug, Clone)]
pub struct RegimeAnalysis {
    config: AnalysisConfig,
    detector: RegimeDetector,
}

impl RegimeAnalysis {
    pub fn new(config: AnalysisConfig) -> Result<Self, ConfigurationError> {
        let detector = RegimeDetector::new(config.detector.clone())?;
        Ok(Self { config, detector })
    }

    pub fn run(&self, panel: &ReturnPanel) -> Result<RegimeReport, AnalysisError> {
        let market = panel.require(&self.config.market_column)?;

        let fitted = self.detector.fit(market)?;
        let labels = fitted.transform(market);
        let regime_stats = labels.stats();

        info!(
            market = %self.config.market_column,
            window = fitted.window(),
            method = %fitted.threshold_method(),
            threshold = fitted.threshold(),
            labelled_days = labels.len(),
            "labelled volatility regimes"
        );

        let betas = BetaAnalyzer::calculate(panel, &self.config.market_column, Some(&labels))?;
        let beta_changes = BetaAnalyzer::get_beta_changes(&betas);
        let metrics = MetricsCalculator::calculate(panel, &labels, self.config.risk_free_rate);

        Ok(RegimeReport {
            threshold: fitted.threshold(),
            labels,
            regime_stats,
            betas,
            beta_changes,
            metrics,
        })
    }
}
