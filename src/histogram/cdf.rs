//! CDF (cumulative distribution function) evaluation for `Histogram`.
//!
//! The Ben-Haim/Tom-Tov *sum procedure*, the inverse of
//! [`Histogram::quantile`]: it walks the same `min`-framed, `max`-framed
//! spans and integrates the same trapezoid, so
//! `quantile(cdf(x)) ≈ x` inside the support.
//!
//! # Semantics
//! - **Outside support**: strictly below `min` → `0`; at or above `max` → `1`.
//! - **Inside a span** `(l, r)` with `l.value ≤ x < r.value`: the weight up to
//!   `l`'s centre plus `w_l·z + (w_r − w_l)·z²/2`, where `z` is `x`'s relative
//!   position in the span, divided by the total weight.
//!
//! # Edge cases
//! - **Empty histogram** → **`NaN`**.
//! - **NaN probe** → **`NaN`**.

use crate::histogram::Histogram;
use rayon::prelude::*;

/// Crossover for parallel evaluation with Rayon.
const PAR_MIN: usize = 32_768;

impl Histogram {
    /// Estimate the fraction of total weight at or below `x`, in **[0, 1]**.
    pub fn cdf(&self, x: f64) -> f64 {
        if x.is_nan() || self.is_empty() {
            return f64::NAN;
        }
        if x < self.min() {
            return 0.0;
        }
        if x >= self.max() {
            return 1.0;
        }

        let total = self.weight();
        let mut cum_w_at_left_center = 0.0;
        for (left, right) in self.spans() {
            let (v_l, v_r) = (left.value(), right.value());
            let (w_l, w_r) = (left.weight(), right.weight());
            if x < v_r {
                let gap = v_r - v_l;
                let z = if !gap.is_finite() {
                    // Span wider than f64::MAX; halving keeps both sides finite.
                    ((0.5 * x - 0.5 * v_l) / (0.5 * v_r - 0.5 * v_l)).clamp(0.0, 1.0)
                } else if gap > 0.0 {
                    ((x - v_l) / gap).clamp(0.0, 1.0)
                } else {
                    0.0
                };
                let inside = w_l * z + (w_r - w_l) * z * z / 2.0;
                return ((cum_w_at_left_center + inside) / total).clamp(0.0, 1.0);
            }
            cum_w_at_left_center += (w_l + w_r) / 2.0;
        }
        1.0
    }

    /// Evaluate `cdf` for every probe in `xs`, preserving order.
    pub fn cdf_many(&self, xs: &[f64]) -> Vec<f64> {
        if xs.len() >= PAR_MIN {
            xs.par_iter()
                .with_min_len(4096)
                .map(|&x| self.cdf(x))
                .collect()
        } else {
            xs.iter().map(|&x| self.cdf(x)).collect()
        }
    }
}
