//! Quantile evaluation for `Histogram`.
//!
//! This module implements `Histogram::quantile(q)` with the Ben-Haim/Tom-Tov
//! *uniform procedure*:
//!
//! - **Framing**: the bin sequence is bracketed by zero-weight bins at `min`
//!   and `max`, so the tails interpolate toward the true extremes instead of
//!   stopping at the outermost (lossy) bin values.
//! - **Index mapping**: map `q ∈ [0,1]` to a target cumulative weight `t = q·W`,
//!   where `W = ∑w` (total weight).
//! - **Centre-to-centre spans**: bin `i` is centred at `∑w[<i] + w[i]/2`; the
//!   span between adjacent centres holds `(w_l + w_r)/2`.
//! - **Trapezoid interpolation**: inside a span the density is assumed to vary
//!   linearly from `w_l` to `w_r`, so the position `z ∈ [0,1]` solves
//!   `w_l·z + (w_r − w_l)·z²/2 = d`, where `d` is the weight still needed past
//!   the left centre.
//!
//! # Guarantees
//! - The result is **monotone** in `q`.
//! - `quantile(0.0) == min()` and `quantile(1.0) == max()` exactly.
//!
//! # Edge cases
//! - **Empty histogram** → **`NaN`**.
//! - **`q` outside `[0, 1]` or NaN** → **`NaN`** (no clamping).

use crate::histogram::bins::Bin;
use crate::histogram::Histogram;
use rayon::prelude::*;

/// Batches at least this large are evaluated with Rayon.
const PAR_MIN: usize = 32_768;

impl Histogram {
    /// Estimate the value below which a fraction `q` of the total weight falls.
    pub fn quantile(&self, q: f64) -> f64 {
        // Rejects NaN too
        if !(0.0..=1.0).contains(&q) || self.is_empty() {
            return f64::NAN;
        }
        if q == 0.0 {
            return self.min();
        }
        if q == 1.0 {
            return self.max();
        }

        let target = q * self.weight();
        let mut cum_w_at_left_center = 0.0;
        for (left, right) in self.spans() {
            let span_w = (left.weight() + right.weight()) / 2.0;
            if cum_w_at_left_center + span_w >= target {
                return interpolate_in_span(left, right, target - cum_w_at_left_center);
            }
            cum_w_at_left_center += span_w;
        }

        // Rounding left the target just past the last span.
        self.max()
    }

    /// `quantile(0.5)`.
    #[inline]
    pub fn median(&self) -> f64 {
        self.quantile(0.5)
    }

    /// Evaluate `quantile` for every probe in `qs`, preserving order.
    pub fn quantiles(&self, qs: &[f64]) -> Vec<f64> {
        if qs.len() >= PAR_MIN {
            qs.par_iter()
                .with_min_len(4096)
                .map(|&q| self.quantile(q))
                .collect()
        } else {
            qs.iter().map(|&q| self.quantile(q)).collect()
        }
    }
}

/// Solve the trapezoid for the value that accumulates `d` weight past `left`'s centre.
///
/// Uses the rationalized root `z = 2d / (w_l + √(w_l² + 2·Δw·d))`, which stays stable
/// when `Δw = w_r − w_l` is zero or tiny.
#[inline]
fn interpolate_in_span(left: Bin, right: Bin, d: f64) -> f64 {
    let (w_l, w_r) = (left.weight(), right.weight());
    let (v_l, v_r) = (left.value(), right.value());

    let disc = (w_l * w_l + 2.0 * (w_r - w_l) * d).max(0.0);
    let denom = w_l + disc.sqrt();
    let z = if denom > 0.0 {
        (2.0 * d / denom).clamp(0.0, 1.0)
    } else {
        0.0
    };
    let width = v_r - v_l;
    let v = if width.is_finite() {
        v_l + width * z
    } else {
        // Span wider than f64::MAX; mix the endpoints instead.
        v_l * (1.0 - z) + v_r * z
    };
    // Rounding must not step outside the span (and past `max`).
    v.max(v_l).min(v_r)
}
