//! Least-squares trend fitting over `(year, value)` points.
//!
//! Two strategies sit behind [`TrendFitter`]: a closed-form OLS line that needs
//! nothing but sums, and a general polynomial fit that solves the Vandermonde
//! system by Householder QR. At degree 1 they agree to floating-point precision.

use serde::Deserialize;

/// A fitted polynomial in the centred, scaled variable `u = (x - x_mean) / x_scale`.
#[derive(Debug, Clone, PartialEq)]
pub struct Trend {
    x_mean: f64,
    x_scale: f64,
    /// `coeffs[k]` multiplies `u^k`.
    coeffs: Vec<f64>,
}

impl Trend {
    pub fn degree(&self) -> usize {
        self.coeffs.len().saturating_sub(1)
    }

    /// Value of the trend at `x` (Horner's rule).
    pub fn eval(&self, x: f64) -> f64 {
        let u = (x - self.x_mean) / self.x_scale;
        self.coeffs.iter().rev().fold(0.0, |acc, c| acc * u + c)
    }

    /// Slope and intercept in uncentred `x` for a degree-1 trend.
    #[cfg(test)]
    fn line(&self) -> Option<(f64, f64)> {
        match self.coeffs.as_slice() {
            [a, b] => {
                let slope = b / self.x_scale;
                Some((slope, a - slope * self.x_mean))
            }
            _ => None,
        }
    }
}

/// Something that can fit a trend to a set of points.
pub trait TrendFitter {
    /// Fewest points the fit accepts.
    fn min_points(&self) -> usize;

    /// Fit `points`, or `None` if there are too few or the system is degenerate.
    fn fit(&self, points: &[(f64, f64)]) -> Option<Trend>;
}

/// Ordinary least-squares line from centred sums.
#[derive(Debug, Clone, Copy, Default)]
pub struct ClosedFormLine;

impl TrendFitter for ClosedFormLine {
    fn min_points(&self) -> usize {
        2
    }

    fn fit(&self, points: &[(f64, f64)]) -> Option<Trend> {
        if points.len() < self.min_points() {
            return None;
        }
        let n = points.len() as f64;
        let x_mean = points.iter().map(|(x, _)| x).sum::<f64>() / n;
        let y_mean = points.iter().map(|(_, y)| y).sum::<f64>() / n;

        let (sxy, sxx) = points.iter().fold((0.0, 0.0), |(sxy, sxx), (x, y)| {
            let dx = x - x_mean;
            (sxy + dx * (y - y_mean), sxx + dx * dx)
        });
        if sxx.abs() < 1e-12 {
            return None;
        }

        Some(Trend {
            x_mean,
            x_scale: 1.0,
            coeffs: vec![y_mean, sxy / sxx],
        })
    }
}

/// Least-squares polynomial of a fixed degree (at least 1).
#[derive(Debug, Clone, Copy)]
pub struct PolynomialLeastSquares {
    degree: usize,
}

impl PolynomialLeastSquares {
    pub fn new(degree: usize) -> Self {
        Self {
            degree: degree.max(1),
        }
    }
}

impl TrendFitter for PolynomialLeastSquares {
    fn min_points(&self) -> usize {
        self.degree + 1
    }

    fn fit(&self, points: &[(f64, f64)]) -> Option<Trend> {
        if points.len() < self.min_points() {
            return None;
        }
        let n = points.len() as f64;
        let x_mean = points.iter().map(|(x, _)| x).sum::<f64>() / n;
        let spread = points
            .iter()
            .fold(0.0_f64, |m, (x, _)| m.max((x - x_mean).abs()));
        let x_scale = if spread > 0.0 { spread } else { 1.0 };
        let k = self.degree + 1;

        // Vandermonde rows over u in [-1, 1]
        let mut v: Vec<Vec<f64>> = points
            .iter()
            .map(|(x, _)| {
                let u = (x - x_mean) / x_scale;
                let mut p = 1.0;
                (0..k)
                    .map(|_| {
                        let out = p;
                        p *= u;
                        out
                    })
                    .collect()
            })
            .collect();
        let mut y: Vec<f64> = points.iter().map(|(_, y)| *y).collect();

        let coeffs = householder_lstsq(&mut v, &mut y)?;
        Some(Trend {
            x_mean,
            x_scale,
            coeffs,
        })
    }
}

/// Least-squares solution of `a c = b` for a tall `a` (rows >= columns) by
/// Householder QR. Overwrites `a` with R and `b` with Qᵀb. `None` when `a` is
/// numerically rank deficient.
fn householder_lstsq(a: &mut [Vec<f64>], b: &mut [f64]) -> Option<Vec<f64>> {
    let m = b.len();
    let k = a.first().map_or(0, Vec::len);
    if m < k || k == 0 {
        return None;
    }

    for j in 0..k {
        let norm = (j..m).map(|i| a[i][j] * a[i][j]).sum::<f64>().sqrt();
        if norm == 0.0 {
            return None;
        }
        let alpha = if a[j][j] > 0.0 { -norm } else { norm };
        let mut h: Vec<f64> = (j..m).map(|i| a[i][j]).collect();
        h[0] -= alpha;
        let hh: f64 = h.iter().map(|x| x * x).sum();

        for c in j..k {
            let f = 2.0 * (j..m).map(|i| h[i - j] * a[i][c]).sum::<f64>() / hh;
            for i in j..m {
                a[i][c] -= f * h[i - j];
            }
        }
        let f = 2.0 * (j..m).map(|i| h[i - j] * b[i]).sum::<f64>() / hh;
        for i in j..m {
            b[i] -= f * h[i - j];
        }
    }

    let largest = (0..k).fold(0.0_f64, |acc, i| acc.max(a[i][i].abs()));
    if (0..k).any(|i| a[i][i].abs() <= 1e-12 * largest) {
        return None;
    }

    let mut x = vec![0.0; k];
    for row in (0..k).rev() {
        let tail: f64 = (row + 1..k).map(|j| a[row][j] * x[j]).sum();
        x[row] = (b[row] - tail) / a[row][row];
    }
    x.iter().all(|v| v.is_finite()).then_some(x)
}

/// How the linear forecast fits its line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LineFit {
    /// [`ClosedFormLine`].
    #[default]
    ClosedForm,
    /// [`PolynomialLeastSquares`] at degree 1.
    LeastSquares,
}

impl LineFit {
    pub fn fitter(self) -> Box<dyn TrendFitter> {
        match self {
            LineFit::ClosedForm => Box::new(ClosedFormLine),
            LineFit::LeastSquares => Box::new(PolynomialLeastSquares::new(1)),
        }
    }
}
