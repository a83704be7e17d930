//! Ordinary least squares for a single regressor.

use statrs::distribution::{ContinuousCDF, StudentsT};

/// Guards the t-statistic against division by zero for perfect fits.
const TINY: f64 = 1.0e-20;

/// Result of regressing `y` on `x`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearFit {
    pub slope: f64,
    pub intercept: f64,
    /// Pearson correlation between `x` and `y`.
    pub r_value: f64,
    /// Two-sided p-value for a zero slope, t-distribution with n - 2 dof.
    pub p_value: f64,
    /// Standard error of the slope.
    pub std_error: f64,
    pub observations: usize,
}

impl LinearFit {
    pub fn r_squared(&self) -> f64 {
        self.r_value * self.r_value
    }
}

/// Fit `y = intercept + slope * x`.
///
/// Returns `None` with fewer than two points, mismatched lengths, or when
/// every `x` is identical (the slope is undefined).
pub fn linregress(x: &[f64], y: &[f64]) -> Option<LinearFit> {
    let n = x.len();
    if n < 2 || n != y.len() {
        return None;
    }

    if x.iter().all(|v| *v == x[0]) {
        return None;
    }

    let nf = n as f64;
    let x_mean = x.iter().sum::<f64>() / nf;
    let y_mean = y.iter().sum::<f64>() / nf;

    let mut ssxm = 0.0;
    let mut ssym = 0.0;
    let mut ssxym = 0.0;
    for (xi, yi) in x.iter().zip(y) {
        let dx = xi - x_mean;
        let dy = yi - y_mean;
        ssxm += dx * dx;
        ssym += dy * dy;
        ssxym += dx * dy;
    }
    ssxm /= nf;
    ssym /= nf;
    ssxym /= nf;

    let slope = ssxym / ssxm;
    let intercept = y_mean - slope * x_mean;
    let r_value = if y.iter().all(|v| *v == y[0]) {
        0.0
    } else {
        (ssxym / (ssxm * ssym).sqrt()).clamp(-1.0, 1.0)
    };

    let (p_value, std_error) = if n == 2 {
        // Two points always lie on a line.
        let p = if y[0] == y[1] { 1.0 } else { 0.0 };
        (p, 0.0)
    } else {
        let df = nf - 2.0;
        let t = r_value * (df / ((1.0 - r_value) * (1.0 + r_value) + TINY)).sqrt();
        let dist = StudentsT::new(0.0, 1.0, df).ok()?;
        let p = 2.0 * dist.sf(t.abs());
        let se = ((1.0 - r_value * r_value) * ssym / ssxm / df).sqrt();
        (p, se)
    };

    Some(LinearFit {
        slope,
        intercept,
        r_value,
        p_value,
        std_error,
        observations: n,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_textbook_fit() {
        let x = [1.0, 2.0, 3.0, 4.0, 5.0];
        let y = [2.0, 4.0, 5.0, 4.0, 5.0];
        let fit = linregress(&x, &y).unwrap();

        assert!((fit.slope - 0.6).abs() < 1e-12);
        assert!((fit.intercept - 2.2).abs() < 1e-12);
        assert!((fit.r_squared() - 0.6).abs() < 1e-12);
        assert!((fit.std_error - 0.08f64.sqrt()).abs() < 1e-12);
        // t = 2.1213 with 3 dof
        assert!(fit.p_value > 0.11 && fit.p_value < 0.14);
        assert_eq!(fit.observations, 5);
    }

    #[test]
    fn test_perfect_fit() {
        let x = [0.01, -0.02, 0.015, 0.005, -0.01];
        let y: Vec<f64> = x.iter().map(|v| -1.5 * v).collect();
        let fit = linregress(&x, &y).unwrap();

        assert!((fit.slope + 1.5).abs() < 1e-12);
        assert!((fit.r_value + 1.0).abs() < 1e-12);
        assert!(fit.p_value < 1e-10);
        assert!(fit.std_error < 1e-6);
    }

    #[test]
    fn test_two_points() {
        let fit = linregress(&[0.0, 1.0], &[1.0, 3.0]).unwrap();
        assert_eq!(fit.slope, 2.0);
        assert_eq!(fit.intercept, 1.0);
        assert_eq!(fit.p_value, 0.0);
        assert_eq!(fit.std_error, 0.0);

        let flat = linregress(&[0.0, 1.0], &[2.0, 2.0]).unwrap();
        assert_eq!(flat.slope, 0.0);
        assert_eq!(flat.r_value, 0.0);
        assert_eq!(flat.p_value, 1.0);
    }

    #[test]
    fn test_degenerate_inputs() {
        assert!(linregress(&[0.01], &[0.02]).is_none());
        assert!(linregress(&[0.01, 0.01, 0.01], &[0.02, 0.03, 0.01]).is_none());
        assert!(linregress(&[0.01, 0.02], &[0.02]).is_none());
    }

    #[test]
    fn test_uncorrelated_has_high_p_value() {
        let x = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0];
        let y = [1.0, -1.0, 0.0, 0.0, -1.0, 1.0];
        let fit = linregress(&x, &y).unwrap();
        assert!(fit.slope.abs() < 1e-12);
        assert!(fit.p_value > 0.99);
    }
}
