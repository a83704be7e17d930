//! Regime label series.
//!
//! Labels map a subset of a return index to a categorical regime. The
//! volatility detector emits [`VolRegime`], but the analyzers accept any
//! [`RegimeLabel`] type so upstream classifiers can supply their own sets.

use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;

use chrono::NaiveDate;
use serde::{Serialize, Serializer};

/// Anything usable as a categorical regime label.
pub trait RegimeLabel: Copy + Eq + Hash + fmt::Display + Send + Sync {}

impl<T> RegimeLabel for T where T: Copy + Eq + Hash + fmt::Display + Send + Sync {}

/// Volatility regime produced by the rolling-volatility detector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum VolRegime {
    /// Rolling volatility at or below the fitted threshold.
    #[serde(rename = "Low-Vol")]
    LowVol,
    /// Rolling volatility above the fitted threshold.
    #[serde(rename = "High-Vol")]
    HighVol,
}

impl VolRegime {
    /// 0 for Low-Vol, 1 for High-Vol.
    pub fn as_numeric(&self) -> u8 {
        match self {
            Self::LowVol => 0,
            Self::HighVol => 1,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::LowVol => "Low-Vol",
            Self::HighVol => "High-Vol",
        }
    }
}

impl fmt::Display for VolRegime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Slice of the sample a record was computed over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Segment<R> {
    /// Every row of the panel, regardless of label.
    FullSample,
    Regime(R),
}

impl<R: RegimeLabel> Segment<R> {
    /// Whether a row carrying `label` belongs to this segment.
    pub fn includes(&self, label: Option<R>) -> bool {
        match self {
            Self::FullSample => true,
            Self::Regime(r) => label == Some(*r),
        }
    }
}

impl<R: fmt::Display> fmt::Display for Segment<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FullSample => f.write_str("Full Sample"),
            Self::Regime(r) => fmt::Display::fmt(r, f),
        }
    }
}

impl<R: fmt::Display> Serialize for Segment<R> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Share of the labelled sample spent in one regime.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegimeShare<R> {
    pub regime: R,
    pub days: usize,
    pub pct_of_total: f64,
}

/// Ordered `(date, regime)` pairs.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegimeLabels<R> {
    entries: Vec<(NaiveDate, R)>,
}

impl<R: RegimeLabel> RegimeLabels<R> {
    pub fn new(entries: Vec<(NaiveDate, R)>) -> Self {
        Self { entries }
    }

    pub fn entries(&self) -> &[(NaiveDate, R)] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn dates(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.entries.iter().map(|(d, _)| *d)
    }

    pub fn regimes(&self) -> impl Iterator<Item = R> + '_ {
        self.entries.iter().map(|(_, r)| *r)
    }

    /// Distinct regimes in order of first appearance.
    pub fn unique(&self) -> Vec<R> {
        let mut seen = Vec::new();
        for r in self.regimes() {
            if !seen.contains(&r) {
                seen.push(r);
            }
        }
        seen
    }

    /// Label for each date of `index`; dates without a label map to `None`.
    pub fn align(&self, index: &[NaiveDate]) -> Vec<Option<R>> {
        let lookup: HashMap<NaiveDate, R> = self.entries.iter().copied().collect();
        index.iter().map(|d| lookup.get(d).copied()).collect()
    }

    /// Day counts per regime, in order of first appearance.
    pub fn stats(&self) -> Vec<RegimeShare<R>> {
        let total = self.entries.len();
        self.unique()
            .into_iter()
            .map(|regime| {
                let days = self.regimes().filter(|r| *r == regime).count();
                RegimeShare {
                    regime,
                    days,
                    pct_of_total: days as f64 / total as f64 * 100.0,
                }
            })
            .collect()
    }
}

impl RegimeLabels<VolRegime> {
    /// Map Low-Vol to 0 and High-Vol to 1, keeping the index.
    pub fn to_numeric(&self) -> Vec<(NaiveDate, u8)> {
        self.entries
            .iter()
            .map(|(d, r)| (*d, r.as_numeric()))
            .collect()
    }
}

impl<R: RegimeLabel> FromIterator<(NaiveDate, R)> for RegimeLabels<R> {
    fn from_iter<I: IntoIterator<Item = (NaiveDate, R)>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

/// Segments to report on: the full sample plus each distinct label.
pub(crate) fn segments<R: RegimeLabel>(
    labels: Option<&RegimeLabels<R>>,
    full_sample_first: bool,
) -> Vec<Segment<R>> {
    let regimes = labels
        .map(|l| l.unique())
        .unwrap_or_default()
        .into_iter()
        .map(Segment::Regime);

    if full_sample_first {
        std::iter::once(Segment::FullSample).chain(regimes).collect()
    } else {
        regimes.chain(std::iter::once(Segment::FullSample)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, d).unwrap()
    }

    fn sample() -> RegimeLabels<VolRegime> {
        RegimeLabels::new(vec![
            (day(2), VolRegime::HighVol),
            (day(3), VolRegime::LowVol),
            (day(4), VolRegime::HighVol),
            (day(5), VolRegime::HighVol),
        ])
    }

    #[test]
    fn test_display_names() {
        assert_eq!(VolRegime::LowVol.to_string(), "Low-Vol");
        assert_eq!(Segment::Regime(VolRegime::HighVol).to_string(), "High-Vol");
        assert_eq!(Segment::<VolRegime>::FullSample.to_string(), "Full Sample");
    }

    #[test]
    fn test_unique_keeps_first_appearance_order() {
        assert_eq!(sample().unique(), vec![VolRegime::HighVol, VolRegime::LowVol]);
    }

    #[test]
    fn test_to_numeric_is_binary() {
        let numeric = sample().to_numeric();
        assert_eq!(
            numeric.iter().map(|(_, n)| *n).collect::<Vec<_>>(),
            vec![1, 0, 1, 1]
        );
        assert!(numeric.iter().all(|(_, n)| *n <= 1));
    }

    #[test]
    fn test_align_leaves_unlabelled_dates_empty() {
        let aligned = sample().align(&[day(1), day(2), day(3)]);
        assert_eq!(aligned, vec![None, Some(VolRegime::HighVol), Some(VolRegime::LowVol)]);
    }

    #[test]
    fn test_stats() {
        let stats = sample().stats();
        assert_eq!(stats.len(), 2);
        assert_eq!(stats[0].regime, VolRegime::HighVol);
        assert_eq!(stats[0].days, 3);
        assert!((stats[0].pct_of_total - 75.0).abs() < 1e-9);
        assert_eq!(stats[1].days, 1);
    }

    #[test]
    fn test_segments_order() {
        let labels = sample();
        assert_eq!(
            segments(Some(&labels), true),
            vec![
                Segment::FullSample,
                Segment::Regime(VolRegime::HighVol),
                Segment::Regime(VolRegime::LowVol)
            ]
        );
        assert_eq!(segments(Some(&labels), false).last(), Some(&Segment::FullSample));
        assert_eq!(segments::<VolRegime>(None, true), vec![Segment::FullSample]);
    }

    #[test]
    fn test_custom_labels_supported() {
        let labels: RegimeLabels<&str> = vec![(day(2), "Crisis"), (day(3), "Calm")]
            .into_iter()
            .collect();
        assert_eq!(
            labels.align(&[day(1), day(3)]),
            vec![None, Some("Calm")]
        );
        assert!(Segment::Regime("Crisis").includes(Some("Crisis")));
        assert!(!Segment::Regime("Crisis").includes(None));
        assert!(Segment::FullSample.includes(None::<&str>));
    }
}
