//! Descriptive statistics over plain return slices.

pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Sample standard deviation (ddof = 1); `None` with fewer than two values.
pub fn sample_std(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    // Exact zero for constant input; the mean of repeated decimals can drift.
    if values.iter().all(|v| *v == values[0]) {
        return Some(0.0);
    }
    let m = mean(values);
    let variance =
        values.iter().map(|x| (x - m).powi(2)).sum::<f64>() / (values.len() - 1) as f64;
    Some(variance.sqrt())
}

/// Percentile with linear interpolation between closest ranks.
pub fn percentile(values: &[f64], pct: f64) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));

    let idx = (pct / 100.0).clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lo = idx.floor() as usize;
    let hi = idx.ceil() as usize;
    let frac = idx - lo as f64;

    // Interpolate upward from the lower rank so the result never drops below it.
    Some(sorted[lo] + (sorted[hi] - sorted[lo]) * frac)
}

/// Central moments m2, m3, m4 (population). `None` for empty or constant input.
fn central_moments(values: &[f64]) -> Option<(f64, f64, f64)> {
    let first = *values.first()?;
    if values.iter().all(|v| *v == first) {
        return None;
    }
    let n = values.len() as f64;
    let m = mean(values);
    let (mut m2, mut m3, mut m4) = (0.0, 0.0, 0.0);
    for v in values {
        let d = v - m;
        let d2 = d * d;
        m2 += d2;
        m3 += d2 * d;
        m4 += d2 * d2;
    }
    Some((m2 / n, m3 / n, m4 / n))
}

/// Biased sample skewness (Fisher-Pearson). 0 for constant input.
pub fn skewness(values: &[f64]) -> f64 {
    match central_moments(values) {
        Some((m2, m3, _)) => m3 / m2.powf(1.5),
        None => 0.0,
    }
}

/// Biased excess kurtosis (normal = 0). 0 for constant input.
pub fn excess_kurtosis(values: &[f64]) -> f64 {
    match central_moments(values) {
        Some((m2, _, m4)) => m4 / (m2 * m2) - 3.0,
        None => 0.0,
    }
}

/// Deepest peak-to-trough decline of the compounded path `prod(1 + r)`.
///
/// Always in `[-1, 0]`. A path whose running peak is not positive has lost
/// everything and reports -1.
pub fn max_drawdown(returns: &[f64]) -> f64 {
    let mut equity = 1.0;
    let mut peak = f64::NEG_INFINITY;
    let mut worst: f64 = 0.0;

    for r in returns {
        equity *= 1.0 + r;
        peak = peak.max(equity);
        let drawdown = if peak > 0.0 {
            (equity - peak) / peak
        } else {
            -1.0
        };
        worst = worst.min(drawdown);
    }

    worst.clamp(-1.0, 0.0)
}
