//! Volatility-regime conditioned risk analytics for daily log-return panels.
//!
//! - [`regime`]: rolling-volatility regime detection
//! - [`beta`]: CAPM beta and alpha per asset and regime
//! - [`metrics`]: risk/return metrics per asset and regime
//! - [`pipeline`]: runs all three over one panel

pub mod beta;
pub mod data;
pub mod metrics;
pub mod pipeline;
pub mod regime;
pub mod render;

/// Trading-day convention used for every annualization.
pub const TRADING_DAYS_PER_YEAR: f64 = 252.0;

// Re-export commonly used types
pub use data::{PanelError, ReturnPanel, ReturnSeries};
pub use regime::{
    ConfigurationError, DetectorConfig, DetectorError, FittedDetector, RegimeDetector,
    RegimeLabel, RegimeLabels, Segment, ThresholdMethod, VolRegime,
};
pub use beta::{BetaAnalyzer, BetaChangeRecord, BetaRecord};
pub use metrics::{MetricsCalculator, MetricsRecord};
pub use pipeline::{AnalysisConfig, AnalysisError, RegimeAnalysis, RegimeReport};
