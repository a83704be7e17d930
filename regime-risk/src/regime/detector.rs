//! Rolling-volatility regime detector.
//!
//! Splits a return series into Low-Vol and High-Vol days by comparing the
//! trailing rolling standard deviation against a threshold fitted on the
//! same statistic. Fitting returns a [`FittedDetector`] value; the detector
//! itself is only configuration and never changes after construction.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::data::ReturnSeries;

use super::labels::{RegimeLabels, VolRegime};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigurationError {
    #[error("threshold must be 'median' or 'mean', got '{0}'")]
    InvalidThresholdMethod(String),

    #[error("rolling window must be at least 2 observations, got {0}")]
    InvalidWindow(usize),
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum DetectorError {
    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    #[error("No complete {window}-day window in {observations} observations")]
    InsufficientHistory { window: usize, observations: usize },
}

/// How the volatility threshold is derived from the fitted rolling values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum ThresholdMethod {
    #[default]
    Median,
    Mean,
}

impl ThresholdMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Median => "median",
            Self::Mean => "mean",
        }
    }

    /// Reduce the defined rolling values to a single threshold.
    fn apply(&self, values: &[f64]) -> f64 {
        match self {
            Self::Median => median(values),
            Self::Mean => values.iter().sum::<f64>() / values.len() as f64,
        }
    }
}

impl FromStr for ThresholdMethod {
    type Err = ConfigurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "median" => Ok(Self::Median),
            "mean" => Ok(Self::Mean),
            other => Err(ConfigurationError::InvalidThresholdMethod(other.to_string())),
        }
    }
}

impl TryFrom<String> for ThresholdMethod {
    type Error = ConfigurationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl fmt::Display for ThresholdMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Detector configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorConfig {
    /// Rolling window length in trading days.
    pub window: usize,
    /// Median or mean of the rolling volatility.
    pub threshold_method: ThresholdMethod,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            window: 30, // ~6 weeks
            threshold_method: ThresholdMethod::Median,
        }
    }
}

impl DetectorConfig {
    /// Build a config from a window and a threshold method name.
    pub fn new(window: usize, threshold_method: &str) -> Result<Self, ConfigurationError> {
        let config = Self {
            window,
            threshold_method: threshold_method.parse()?,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if self.window < 2 {
            return Err(ConfigurationError::InvalidWindow(self.window));
        }
        Ok(())
    }
}

/// Volatility regime detector.
#[derive(Debug, Clone, Default)]
pub struct RegimeDetector {
    config: DetectorConfig,
}

impl RegimeDetector {
    /// Create a detector, rejecting invalid configuration.
    pub fn new(config: DetectorConfig) -> Result<Self, ConfigurationError> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Compute rolling volatility and the threshold for `series`.
    pub fn fit(&self, series: ReturnSeries<'_>) -> Result<FittedDetector, DetectorError> {
        let window = self.config.window;
        let rolling = rolling_std(series.values(), window);
        let defined: Vec<f64> = rolling.iter().flatten().copied().collect();

        if defined.is_empty() {
            return Err(DetectorError::InsufficientHistory {
                window,
                observations: series.len(),
            });
        }

        let threshold = self.config.threshold_method.apply(&defined);
        debug!(
            series = series.name(),
            window,
            method = %self.config.threshold_method,
            threshold,
            defined = defined.len(),
            "fitted volatility threshold"
        );

        Ok(FittedDetector {
            window,
            threshold_method: self.config.threshold_method,
            volatility: series.index().iter().copied().zip(rolling).collect(),
            threshold,
        })
    }

    /// Label `series`, fitting on it first.
    pub fn transform(
        &self,
        series: ReturnSeries<'_>,
    ) -> Result<RegimeLabels<VolRegime>, DetectorError> {
        self.fit_transform(series)
    }

    /// Fit on `series` and label the same series.
    pub fn fit_transform(
        &self,
        series: ReturnSeries<'_>,
    ) -> Result<RegimeLabels<VolRegime>, DetectorError> {
        Ok(self.fit(series)?.transform(series))
    }
}

/// Result of fitting a [`RegimeDetector`].
#[derive(Debug, Clone, PartialEq)]
pub struct FittedDetector {
    window: usize,
    threshold_method: ThresholdMethod,
    volatility: Vec<(NaiveDate, Option<f64>)>,
    threshold: f64,
}

impl FittedDetector {
    /// Rolling window used for the fitted and any transformed series.
    pub fn window(&self) -> usize {
        self.window
    }

    pub fn threshold_method(&self) -> ThresholdMethod {
        self.threshold_method
    }

    /// Fitted threshold on the rolling standard deviation.
    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Rolling volatility of the fitted series; `None` during warm-up.
    pub fn volatility(&self) -> &[(NaiveDate, Option<f64>)] {
        &self.volatility
    }

    /// Low-Vol at or below the threshold, High-Vol above it.
    pub fn classify(&self, volatility: f64) -> VolRegime {
        if volatility <= self.threshold {
            VolRegime::LowVol
        } else {
            VolRegime::HighVol
        }
    }

    /// Label every date of `series` whose rolling volatility is defined.
    ///
    /// `series` need not be the fitted one: its volatility is computed with
    /// the fitted window and compared against the fitted threshold.
    pub fn transform(&self, series: ReturnSeries<'_>) -> RegimeLabels<VolRegime> {
        rolling_std(series.values(), self.window)
            .into_iter()
            .zip(series.index().iter().copied())
            .filter_map(|(vol, date)| vol.map(|v| (date, self.classify(v))))
            .collect()
    }
}

/// Trailing sample standard deviation (ddof = 1) over `window` values.
///
/// A position is `None` until `window` observations are available, and
/// whenever its window contains a missing value.
pub fn rolling_std(values: &[Option<f64>], window: usize) -> Vec<Option<f64>> {
    if window < 2 {
        return vec![None; values.len()];
    }

    (0..values.len())
        .map(|i| {
            if i + 1 < window {
                return None;
            }
            let slice = &values[i + 1 - window..=i];
            let window_values: Option<Vec<f64>> = slice.iter().copied().collect();
            window_values.map(|w| {
                let n = w.len() as f64;
                let mean = w.iter().sum::<f64>() / n;
                let var = w.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / (n - 1.0);
                var.sqrt()
            })
        })
        .collect()
}

fn median(values: &[f64]) -> f64 {
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}
