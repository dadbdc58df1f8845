//! Numerical helpers behind density colouring and scatter trendlines
//!
//! Everything here works on plain `f64` slices. Callers drop rows with missing
//! values beforehand, so the inputs are assumed to be finite.

use crate::{Result, VueError};

/// Gaussian kernel normalization constant for two dimensions: 1/(2*pi)
const GAUSSIAN_NORM_2D: f64 = 0.15915494309189535;

/// Number of robustifying passes LOWESS runs after the initial fit
const LOWESS_ITERATIONS: usize = 3;

// =============================================================================
// Density
// =============================================================================

/// Gaussian kernel density of a 2-D point cloud, evaluated at every point.
///
/// Uses Scott's rule (`n^(-1/6)` in two dimensions) to scale the full sample
/// covariance into the kernel bandwidth. Degenerate clouds (fewer than two
/// points, or points on a line) have no density and are rejected.
pub fn point_density(x: &[f64], y: &[f64]) -> Result<Vec<f64>> {
    if x.len() != y.len() {
        return Err(VueError::DataError(format!(
            "Density needs paired coordinates, got {} x values and {} y values",
            x.len(),
            y.len()
        )));
    }
    let n = x.len();
    if n < 2 {
        return Err(VueError::DataError(
            "Density colouring needs at least two points".to_string(),
        ));
    }

    let nf = n as f64;
    let mean_x = x.iter().sum::<f64>() / nf;
    let mean_y = y.iter().sum::<f64>() / nf;
    let (mut sxx, mut syy, mut sxy) = (0.0, 0.0, 0.0);
    for (xi, yi) in x.iter().zip(y) {
        let dx = xi - mean_x;
        let dy = yi - mean_y;
        sxx += dx * dx;
        syy += dy * dy;
        sxy += dx * dy;
    }
    let factor = nf.powf(-1.0 / 6.0);
    let scale = factor * factor / (nf - 1.0);
    let (cxx, cyy, cxy) = (sxx * scale, syy * scale, sxy * scale);

    let det = cxx * cyy - cxy * cxy;
    if det <= 0.0 || !det.is_finite() {
        return Err(VueError::DataError(
            "Density colouring needs points that are not all on a line".to_string(),
        ));
    }
    let (ixx, iyy, ixy) = (cyy / det, cxx / det, -cxy / det);
    let norm = GAUSSIAN_NORM_2D / det.sqrt() / nf;

    let density = x
        .iter()
        .zip(y)
        .map(|(px, py)| {
            x.iter()
                .zip(y)
                .map(|(qx, qy)| {
                    let dx = px - qx;
                    let dy = py - qy;
                    let q = ixx * dx * dx + 2.0 * ixy * dx * dy + iyy * dy * dy;
                    (-0.5 * q).exp()
                })
                .sum::<f64>()
                * norm
        })
        .collect();
    Ok(density)
}

// =============================================================================
// Trendlines
// =============================================================================

/// Ordinary least squares fit evaluated at `x`.
///
/// Without a constant the line is forced through the origin.
pub fn ols(x: &[f64], y: &[f64], add_constant: bool) -> Result<Vec<f64>> {
    let n = x.len() as f64;
    if x.is_empty() {
        return Ok(Vec::new());
    }

    let (slope, intercept) = if add_constant {
        let mean_x = x.iter().sum::<f64>() / n;
        let mean_y = y.iter().sum::<f64>() / n;
        let sxx: f64 = x.iter().map(|xi| (xi - mean_x).powi(2)).sum();
        let sxy: f64 = x.iter().zip(y).map(|(xi, yi)| (xi - mean_x) * (yi - mean_y)).sum();
        if sxx == 0.0 {
            return Err(VueError::DataError(
                "OLS trendline needs at least two distinct x values".to_string(),
            ));
        }
        let slope = sxy / sxx;
        (slope, mean_y - slope * mean_x)
    } else {
        let sxx: f64 = x.iter().map(|xi| xi * xi).sum();
        let sxy: f64 = x.iter().zip(y).map(|(xi, yi)| xi * yi).sum();
        if sxx == 0.0 {
            return Err(VueError::DataError(
                "OLS trendline without a constant needs a non-zero x value".to_string(),
            ));
        }
        (sxy / sxx, 0.0)
    };

    Ok(x.iter().map(|xi| intercept + slope * xi).collect())
}

/// Locally weighted linear regression (tricube kernel, bisquare robustness).
///
/// `x` must be sorted ascending. `frac` is the share of points in each local
/// neighbourhood.
pub fn lowess(x: &[f64], y: &[f64], frac: f64) -> Vec<f64> {
    let n = x.len();
    if n < 2 {
        return y.to_vec();
    }
    let k = ((frac * n as f64).ceil() as usize).clamp(2, n);

    let mut robustness = vec![1.0; n];
    let mut fitted = vec![0.0; n];

    for iteration in 0..=LOWESS_ITERATIONS {
        for i in 0..n {
            fitted[i] = local_fit(x, y, &robustness, i, k);
        }
        if iteration == LOWESS_ITERATIONS {
            break;
        }

        let residuals: Vec<f64> = y.iter().zip(&fitted).map(|(yi, fi)| yi - fi).collect();
        let mut abs: Vec<f64> = residuals.iter().map(|r| r.abs()).collect();
        abs.sort_by(f64::total_cmp);
        let median = if n % 2 == 0 {
            (abs[n / 2 - 1] + abs[n / 2]) / 2.0
        } else {
            abs[n / 2]
        };
        if median == 0.0 {
            break;
        }
        for (weight, residual) in robustness.iter_mut().zip(&residuals) {
            let u = residual / (6.0 * median);
            *weight = if u.abs() < 1.0 { (1.0 - u * u).powi(2) } else { 0.0 };
        }
    }
    fitted
}

/// Weighted linear fit around `x[i]` over its `k` nearest neighbours
fn local_fit(x: &[f64], y: &[f64], robustness: &[f64], i: usize, k: usize) -> f64 {
    let n = x.len();
    let (mut lo, mut hi) = (i, i);
    while hi - lo + 1 < k {
        if lo == 0 {
            hi += 1;
        } else if hi == n - 1 {
            lo -= 1;
        } else if x[i] - x[lo - 1] <= x[hi + 1] - x[i] {
            lo -= 1;
        } else {
            hi += 1;
        }
    }
    let radius = (x[i] - x[lo]).max(x[hi] - x[i]);

    let (mut sw, mut swx, mut swy, mut swxx, mut swxy) = (0.0, 0.0, 0.0, 0.0, 0.0);
    for j in lo..=hi {
        let w = if radius > 0.0 {
            let u = (x[j] - x[i]).abs() / radius;
            if u < 1.0 {
                (1.0 - u.powi(3)).powi(3)
            } else {
                0.0
            }
        } else {
            1.0
        } * robustness[j];
        sw += w;
        swx += w * x[j];
        swy += w * y[j];
        swxx += w * x[j] * x[j];
        swxy += w * x[j] * y[j];
    }
    if sw == 0.0 {
        return y[i];
    }

    let mean_x = swx / sw;
    let mean_y = swy / sw;
    let var = swxx / sw - mean_x * mean_x;
    if var.abs() < 1e-12 {
        return mean_y;
    }
    let slope = (swxy / sw - mean_x * mean_y) / var;
    mean_y + slope * (x[i] - mean_x)
}

/// Moving mean over `window` points; positions before the first full window are empty
pub fn rolling_mean(y: &[f64], window: usize, min_periods: Option<usize>) -> Vec<Option<f64>> {
    let min_periods = min_periods.unwrap_or(window).max(1);
    (0..y.len())
        .map(|i| {
            let start = (i + 1).saturating_sub(window);
            let slice = &y[start..=i];
            (slice.len() >= min_periods).then(|| slice.iter().sum::<f64>() / slice.len() as f64)
        })
        .collect()
}

/// Cumulative mean
pub fn expanding_mean(y: &[f64]) -> Vec<f64> {
    let mut sum = 0.0;
    y.iter()
        .enumerate()
        .map(|(i, v)| {
            sum += v;
            sum / (i + 1) as f64
        })
        .collect()
}

/// Decay parameter of an exponentially weighted mean
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Decay {
    Alpha(f64),
    Span(f64),
    Halflife(f64),
    CenterOfMass(f64),
}

impl Decay {
    /// Smoothing factor in (0, 1]
    pub fn alpha(&self) -> f64 {
        match *self {
            Decay::Alpha(alpha) => alpha,
            Decay::Span(span) => 2.0 / (span + 1.0),
            Decay::Halflife(halflife) => 1.0 - (-std::f64::consts::LN_2 / halflife).exp(),
            Decay::CenterOfMass(com) => 1.0 / (1.0 + com),
        }
    }
}

/// Exponentially weighted mean with bias-adjusted weights
pub fn ewm_mean(y: &[f64], decay: Decay) -> Vec<f64> {
    let keep = 1.0 - decay.alpha();
    let (mut num, mut den) = (0.0, 0.0);
    y.iter()
        .map(|v| {
            num = num * keep + v;
            den = den * keep + 1.0;
            num / den
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(a: f64, b: f64) {
        assert!((a - b).abs() < 1e-9, "{} != {}", a, b);
    }

    #[test]
    fn test_ols_exact_line() {
        let fitted = ols(&[1.0, 2.0, 3.0], &[3.0, 5.0, 7.0], true).unwrap();
        for (f, e) in fitted.iter().zip([3.0, 5.0, 7.0]) {
            assert_close(*f, e);
        }
    }

    #[test]
    fn test_ols_through_origin() {
        let fitted = ols(&[1.0, 2.0], &[2.0, 4.0], false).unwrap();
        assert_close(fitted[0], 2.0);
        assert_close(fitted[1], 4.0);
        assert!(ols(&[2.0, 2.0], &[1.0, 3.0], true).is_err());
    }

    #[test]
    fn test_lowess_recovers_a_line() {
        let x: Vec<f64> = (0..20).map(f64::from).collect();
        let y: Vec<f64> = x.iter().map(|v| 2.0 * v + 1.0).collect();
        let fitted = lowess(&x, &y, 0.5);
        for (f, e) in fitted.iter().zip(&y) {
            assert!((f - e).abs() < 1e-6);
        }
    }

    #[test]
    fn test_lowess_downweights_outlier() {
        let x: Vec<f64> = (0..15).map(f64::from).collect();
        let mut y: Vec<f64> = x.clone();
        y[7] = 100.0;
        let fitted = lowess(&x, &y, 0.6);
        assert!((fitted[7] - 7.0).abs() < 2.0);
    }

    #[test]
    fn test_rolling_mean() {
        let out = rolling_mean(&[1.0, 2.0, 3.0, 4.0], 2, None);
        assert_eq!(out, vec![None, Some(1.5), Some(2.5), Some(3.5)]);
        let out = rolling_mean(&[1.0, 2.0, 3.0], 3, Some(1));
        assert_eq!(out, vec![Some(1.0), Some(1.5), Some(2.0)]);
    }

    #[test]
    fn test_expanding_mean() {
        assert_eq!(expanding_mean(&[2.0, 4.0, 6.0]), vec![2.0, 3.0, 4.0]);
    }

    #[test]
    fn test_ewm_mean() {
        // alpha = 0.5: weights 1, 0.5 -> (4 + 0.5*2) / 1.5
        let out = ewm_mean(&[2.0, 4.0], Decay::Alpha(0.5));
        assert_close(out[0], 2.0);
        assert_close(out[1], 5.0 / 1.5);
        assert_close(Decay::Span(3.0).alpha(), 0.5);
        assert_close(Decay::CenterOfMass(1.0).alpha(), 0.5);
        assert_close(Decay::Halflife(1.0).alpha(), 0.5);
    }

    #[test]
    fn test_density_peaks_in_the_cluster() {
        let x = [0.0, 0.1, -0.1, 0.05, 5.0];
        let y = [0.0, 0.1, 0.05, -0.1, 4.0];
        let density = point_density(&x, &y).unwrap();
        assert_eq!(density.len(), 5);
        assert!(density[0] > density[4]);
        assert!(density.iter().all(|d| *d > 0.0));
    }

    #[test]
    fn test_density_rejects_degenerate_input() {
        assert!(point_density(&[1.0], &[1.0]).is_err());
        assert!(point_density(&[1.0, 2.0, 3.0], &[2.0, 4.0, 6.0]).is_err());
    }
}
