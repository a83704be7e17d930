//! Volatility regime detection module.
//!
//! Labels each trading day by comparing its trailing rolling volatility with
//! a threshold fitted on the same series:
//! - Low-Vol: rolling std at or below the threshold
//! - High-Vol: rolling std above the threshold

pub mod detector;
pub mod labels;

pub use detector::{
    ConfigurationError, DetectorConfig, DetectorError, FittedDetector, RegimeDetector,
    ThresholdMethod,
};
pub use labels::{RegimeLabel, RegimeLabels, RegimeShare, Segment, VolRegime};
