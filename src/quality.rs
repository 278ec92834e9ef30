//! Accuracy reports for `Histogram::quantile(q)`.
//!
//! A report compares the estimate against the exact sample quantile
//! `sorted[⌊n·q⌋]` on a grid of probes and keeps the worst relative error
//! plus the mean absolute error.

use crate::{HistResult, Histogram};
use tracing::info;

pub use histogram_testdata::{gen_dataset, sorted, DistKind};

/// Probes pinned at ±2% relative error for capacity 100 over 20k normal samples.
pub const CORE_GRID: [f64; 10] = [0.001, 0.01, 0.1, 0.25, 0.35, 0.65, 0.75, 0.9, 0.99, 0.999];

/// Extreme tails, pinned at ±10% for the same setup.
pub const TAIL_GRID: [f64; 2] = [0.0001, 0.9999];

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QualityReport {
    pub n: usize,
    pub capacity: usize,
    /// Worst `|est − exact| / |exact|` over the grid.
    pub max_rel_err: f64,
    /// Mean `|est − exact|` over the grid.
    pub mean_abs_err: f64,
}

impl QualityReport {
    pub fn to_line(&self) -> String {
        format!(
            "QualityReport(n={}, capacity={}, max_rel_err={:.6e}, MAE={:.6e})",
            self.n, self.capacity, self.max_rel_err, self.mean_abs_err
        )
    }

    pub fn log(&self) {
        info!(
            n = self.n,
            capacity = self.capacity,
            max_rel_err = self.max_rel_err,
            mean_abs_err = self.mean_abs_err,
            "quantile quality"
        );
    }
}

/// Exact sample quantile by truncated rank: `sorted[⌊n·q⌋]`, clamped to the last element.
pub fn exact_quantile(sorted: &[f64], q: f64) -> f64 {
    if sorted.is_empty() || !(0.0..=1.0).contains(&q) {
        return f64::NAN;
    }
    let idx = ((sorted.len() as f64 * q) as usize).min(sorted.len() - 1);
    sorted[idx]
}

/// Relative error with a tiny floor so an exact zero does not divide by zero.
#[inline]
pub fn relative_error(expected: f64, got: f64) -> f64 {
    (expected - got).abs() / expected.abs().max(1e-300)
}

/// Score an already-built histogram against the data it was fed.
pub fn assess_histogram(h: &Histogram, data: &[f64], grid: &[f64]) -> QualityReport {
    let ordered = sorted(data);
    let mut max_rel_err = 0.0f64;
    let mut sum_abs = 0.0f64;

    for &q in grid {
        let est = h.quantile(q);
        let exact = exact_quantile(&ordered, q);
        max_rel_err = max_rel_err.max(relative_error(exact, est));
        sum_abs += (exact - est).abs();
    }

    QualityReport {
        n: data.len(),
        capacity: h.capacity(),
        max_rel_err,
        mean_abs_err: if grid.is_empty() {
            0.0
        } else {
            sum_abs / grid.len() as f64
        },
    }
}

/// Stream `data` through a fresh histogram of `capacity` bins and score it on `grid`.
pub fn assess_quantiles(data: &[f64], capacity: usize, grid: &[f64]) -> HistResult<QualityReport> {
    let h = Histogram::from_values(capacity, data)?;
    Ok(assess_histogram(&h, data, grid))
}

/// Same as [`assess_quantiles`] over a generated dataset.
pub fn assess_dataset(
    kind: DistKind,
    n: usize,
    capacity: usize,
    seed: u64,
    grid: &[f64],
) -> HistResult<QualityReport> {
    let data = gen_dataset(kind, n, seed);
    assess_quantiles(&data, capacity, grid)
}
