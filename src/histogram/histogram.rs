// src/histogram/histogram.rs
use crate::{HistError, HistResult};
use ordered_float::OrderedFloat;
use serde::Deserialize;
use std::iter::once;
use tracing::{debug, trace};

use crate::histogram::bins::{Bin, BinStore};

/// Capacity used when a builder or config does not name one.
pub const DEFAULT_CAPACITY: usize = 16;

/// Bounded-memory streaming histogram.
///
/// - At most `capacity` bins are retained after every call; the bin store is the only
///   lossy part.
/// - `count`, `weight`, `sum`, `min` and `max` are tracked independently of the bins,
///   so they stay exact no matter how aggressively bins were merged.
/// - Readers never mutate; an empty histogram reports `NaN` for every statistic.
#[derive(Debug, PartialEq)]
pub struct Histogram {
    store: BinStore,
    count: u64,   // number of ingestion calls
    weight: f64,  // ∑w over raw observations
    sum: f64,     // ∑(x·w) over raw observations
    min: OrderedFloat<f64>,
    max: OrderedFloat<f64>,
}

/* =============================================================================
 * Options / Builder
 * ============================================================================= */

/// Construction configuration, deserializable from a caller's config file.
///
/// ```
/// use gr_histogram::{Histogram, HistogramConfig};
///
/// let cfg = HistogramConfig { capacity: 64 };
/// let h = Histogram::from_config(&cfg).unwrap();
/// assert_eq!(h.capacity(), 64);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HistogramConfig {
    /// Maximum number of bins retained.
    #[serde(default = "default_capacity")]
    pub capacity: usize,
}

fn default_capacity() -> usize {
    DEFAULT_CAPACITY
}

impl Default for HistogramConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
        }
    }
}

impl HistogramConfig {
    /// Reject configurations that cannot back a bin store.
    pub fn validate(&self) -> HistResult<()> {
        if self.capacity == 0 {
            debug!(capacity = self.capacity, "rejecting histogram config");
            return Err(HistError::InvalidCapacity {
                capacity: self.capacity,
            });
        }
        Ok(())
    }
}

/// Builder for [`Histogram`].
#[derive(Debug, Clone, Default)]
pub struct HistogramBuilder {
    config: HistogramConfig,
}

impl HistogramBuilder {
    /// Create a new builder with defaults.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the maximum number of retained bins.
    #[inline]
    pub fn capacity(mut self, n: usize) -> Self {
        self.config.capacity = n;
        self
    }

    /// Build an empty histogram; fails fast on capacity 0.
    pub fn build(self) -> HistResult<Histogram> {
        self.config.validate()?;
        Ok(Histogram::empty(self.config.capacity))
    }
}

/* =============================================================================
 * Histogram
 * ============================================================================= */

#[inline]
fn ensure_finite(x: f64, context: &'static str) -> HistResult<()> {
    if !x.is_finite() {
        debug!(context, "rejecting non-finite input");
        return Err(HistError::NonFiniteInput { context });
    }
    Ok(())
}

#[inline]
fn ensure_observation(value: f64, weight: f64) -> HistResult<()> {
    ensure_finite(value, "sample value")?;
    ensure_finite(weight, "sample weight")?;
    if weight <= 0.0 {
        debug!(weight, "rejecting non-positive weight");
        return Err(HistError::NonPositiveWeight { weight });
    }
    Ok(())
}

impl Histogram {
    fn empty(capacity: usize) -> Self {
        Histogram {
            store: BinStore::with_limit(capacity),
            count: 0,
            weight: 0.0,
            sum: 0.0,
            min: OrderedFloat::from(f64::NAN),
            max: OrderedFloat::from(f64::NAN),
        }
    }

    /// Create an empty histogram retaining at most `capacity` bins.
    pub fn new(capacity: usize) -> HistResult<Histogram> {
        Self::builder().capacity(capacity).build()
    }

    /// Create an empty histogram from a deserialized [`HistogramConfig`].
    pub fn from_config(config: &HistogramConfig) -> HistResult<Histogram> {
        config.validate()?;
        Ok(Self::empty(config.capacity))
    }

    /// Entry point for fluent construction.
    #[inline]
    pub fn builder() -> HistogramBuilder {
        HistogramBuilder::default()
    }

    /// Build and fill with unit-weight `values` (convenience over [`Histogram::add_many`]).
    pub fn from_values(capacity: usize, values: &[f64]) -> HistResult<Histogram> {
        let mut h = Self::new(capacity)?;
        h.add_many(values)?;
        Ok(h)
    }

    /* ===========================
     * Mutation
     * =========================== */

    /// Add one observation with unit weight.
    #[inline]
    pub fn add(&mut self, value: f64) -> HistResult<()> {
        self.add_weight(value, 1.0)
    }

    /// Add one observation carrying `weight` (> 0) units of mass.
    ///
    /// Counts as a single ingestion call regardless of `weight`. A rejected
    /// observation leaves the histogram untouched.
    pub fn add_weight(&mut self, value: f64, weight: f64) -> HistResult<()> {
        ensure_observation(value, weight)?;
        self.store.insert(value, weight);
        self.record(value, weight);
        Ok(())
    }

    /// Add a batch of unit-weight observations.
    ///
    /// The whole batch is validated first, so a rejected batch adds nothing.
    pub fn add_many(&mut self, values: &[f64]) -> HistResult<()> {
        for &v in values {
            ensure_finite(v, "sample value")?;
        }
        for &v in values {
            self.store.insert(v, 1.0);
            self.record(v, 1.0);
        }
        Ok(())
    }

    #[inline]
    fn record(&mut self, value: f64, weight: f64) {
        let v = OrderedFloat::from(value);
        if self.count == 0 {
            self.min = v;
            self.max = v;
        } else {
            self.min = std::cmp::min(self.min, v);
            self.max = std::cmp::max(self.max, v);
        }
        self.count += 1;
        self.weight += weight;
        self.sum += value * weight;
    }

    /// Absorb every bin of `other` and combine the aggregate statistics.
    ///
    /// Bins are replayed through the same insert-then-bound path as `add_weight`,
    /// so the receiver keeps its own capacity. `other` is not modified. The
    /// resulting aggregates do not depend on merge order; the bins may.
    pub fn merge_with(&mut self, other: &Histogram) {
        if other.is_empty() {
            return;
        }
        for b in other.bins() {
            self.store.insert(b.value(), b.weight());
        }
        if self.is_empty() {
            self.min = other.min;
            self.max = other.max;
        } else {
            self.min = std::cmp::min(self.min, other.min);
            self.max = std::cmp::max(self.max, other.max);
        }
        self.count += other.count;
        self.weight += other.weight;
        self.sum += other.sum;
        trace!(
            replayed = other.num_bins(),
            bins = self.num_bins(),
            "merged histogram"
        );
    }

    /// Deep copy; reuses `dst`'s storage when given instead of allocating.
    pub fn copy(&self, dst: Option<Histogram>) -> Histogram {
        match dst {
            Some(mut d) => {
                self.copy_into(&mut d);
                d
            }
            None => self.clone(),
        }
    }

    /// Overwrite `dst` with this histogram's state, reusing its bin storage.
    pub fn copy_into(&self, dst: &mut Histogram) {
        dst.store.copy_from(&self.store);
        dst.count = self.count;
        dst.weight = self.weight;
        dst.sum = self.sum;
        dst.min = self.min;
        dst.max = self.max;
    }

    /// Drop all observations; capacity and storage are retained.
    pub fn reset(&mut self) {
        self.store.clear();
        self.count = 0;
        self.weight = 0.0;
        self.sum = 0.0;
        self.min = OrderedFloat::from(f64::NAN);
        self.max = OrderedFloat::from(f64::NAN);
    }

    /* ===========================
     * Readers
     * =========================== */

    /// The configured maximum number of bins.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.store.limit()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Number of ingestion calls (`add`/`add_weight`), merged counts included.
    #[inline]
    pub fn count(&self) -> u64 {
        self.count
    }

    /// Total weight (∑w). Equals `count()` when every observation had unit weight.
    #[inline]
    pub fn weight(&self) -> f64 {
        self.weight
    }

    /// Sum of observed values, each scaled by its weight (∑x·w).
    #[inline]
    pub fn sum(&self) -> f64 {
        if self.is_empty() {
            f64::NAN
        } else {
            self.sum
        }
    }

    /// Weighted mean, `sum() / weight()`.
    ///
    /// This is not `sum() / count()` once any observation carries a weight
    /// other than 1: `count()` counts calls while `weight()` counts mass.
    #[inline]
    pub fn mean(&self) -> f64 {
        if self.is_empty() {
            f64::NAN
        } else {
            self.sum / self.weight
        }
    }

    #[inline]
    pub fn min(&self) -> f64 {
        self.min.into_inner()
    }
    #[inline]
    pub fn max(&self) -> f64 {
        self.max.into_inner()
    }

    /// Number of live bins.
    #[inline]
    pub fn num_bins(&self) -> usize {
        self.store.len()
    }

    /// `(value, weight)` of bin `idx`.
    ///
    /// # Panics
    /// If `idx >= num_bins()`.
    #[inline]
    pub fn bin(&self, idx: usize) -> (f64, f64) {
        let b = &self.bins()[idx];
        (b.value(), b.weight())
    }

    /// Non-panicking form of [`Histogram::bin`].
    #[inline]
    pub fn get_bin(&self, idx: usize) -> Option<Bin> {
        self.bins().get(idx).copied()
    }

    /// Borrow the live bins, ascending by value.
    #[inline]
    pub fn bins(&self) -> &[Bin] {
        self.store.as_slice()
    }

    /// Adjacent pairs of the bin sequence framed by zero-weight `min`/`max` bins.
    ///
    /// The centre of bin `i` sits at cumulative weight `∑w[<i] + w[i]/2`, so the
    /// weight spanned by a pair `(l, r)` is `(l.w + r.w) / 2` and the spans add up
    /// to the total weight. Empty histograms yield a single degenerate NaN pair;
    /// callers check `is_empty()` first.
    pub(crate) fn spans(&self) -> impl Iterator<Item = (Bin, Bin)> + Clone + '_ {
        let framed = once(Bin::frame(self.min()))
            .chain(self.bins().iter().copied())
            .chain(once(Bin::frame(self.max())));
        framed.clone().zip(framed.skip(1))
    }
}

impl Clone for Histogram {
    fn clone(&self) -> Self {
        Histogram {
            store: self.store.clone(),
            count: self.count,
            weight: self.weight,
            sum: self.sum,
            min: self.min,
            max: self.max,
        }
    }

    fn clone_from(&mut self, source: &Self) {
        source.copy_into(self);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::histogram::test_helpers::*;

    fn seed_hist(values: &[f64]) -> Histogram {
        Histogram::from_values(4, values).expect("finite values")
    }

    fn subject() -> Histogram {
        seed_hist(&[39.0, 15.0, 43.0, 7.0, 43.0, 36.0, 47.0, 6.0, 40.0, 49.0, 41.0])
    }

    #[test]
    fn rejects_zero_capacity() {
        assert_eq!(
            Histogram::new(0),
            Err(HistError::InvalidCapacity { capacity: 0 })
        );
        assert!(Histogram::builder().capacity(0).build().is_err());
        assert!(Histogram::from_config(&HistogramConfig { capacity: 0 }).is_err());
    }

    #[test]
    fn builder_defaults_to_sixteen_bins() {
        let h = Histogram::builder().build().expect("default capacity");
        assert_eq!(h.capacity(), DEFAULT_CAPACITY);
        assert!(h.is_empty());
        assert_eq!(h.num_bins(), 0);
    }

    #[test]
    fn empty_histogram_reports_nan() {
        let h = seed_hist(&[]);
        assert!(h.sum().is_nan());
        assert!(h.mean().is_nan());
        assert!(h.min().is_nan());
        assert!(h.max().is_nan());
        assert_eq!(h.count(), 0);
        assert_exact("weight", 0.0, h.weight());
    }

    #[test]
    fn aggregates_are_exact() {
        let h = subject();
        assert_eq!(h.count(), 11);
        assert_exact("weight", 11.0, h.weight());
        assert_exact("sum", 366.0, h.sum());
        assert_rel_close("mean", 33.2727, h.mean(), 1e-4);
        assert_exact("min", 6.0, h.min());
        assert_exact("max", 49.0, h.max());
    }

    #[test]
    fn mean_divides_by_weight_not_count() {
        let mut h = Histogram::new(4).expect("capacity");
        h.add_weight(10.0, 3.0).expect("valid");
        h.add(20.0).expect("finite");
        assert_eq!(h.count(), 2);
        assert_exact("sum", 50.0, h.sum());
        assert_exact("mean", 12.5, h.mean());
        assert!(h.mean() != h.sum() / h.count() as f64);
    }

    #[test]
    fn bins_after_bounding() {
        let h = subject();
        assert_eq!(h.num_bins(), 4);
        assert_eq!(h.bin(0), (6.5, 2.0));
        assert_eq!(h.bin(1), (15.0, 1.0));
        assert_eq!(h.bin(2), (39.0, 4.0));
        assert_eq!(h.bin(3), (45.5, 4.0));
        assert!(h.get_bin(4).is_none());
    }

    #[test]
    #[should_panic]
    fn bin_out_of_range_panics() {
        let h = subject();
        let _ = h.bin(h.num_bins());
    }

    #[test]
    fn add_weight_on_existing_value_accumulates() {
        let mut h = subject();
        h.add_weight(6.5, 2.0).expect("valid");
        h.add_weight(15.0, 3.0).expect("valid");

        let got: Vec<(f64, f64)> = h.bins().iter().map(|b| (b.value(), b.weight())).collect();
        assert_eq!(got, vec![(6.5, 4.0), (15.0, 4.0), (39.0, 4.0), (45.5, 4.0)]);
        assert_eq!(h.count(), 13);
        assert_exact("weight", 16.0, h.weight());
    }

    #[test]
    fn rejected_observations_leave_state_untouched() {
        let mut h = subject();
        let before = h.clone();

        assert!(matches!(
            h.add(f64::NAN),
            Err(HistError::NonFiniteInput { context: "sample value" })
        ));
        assert!(matches!(
            h.add_weight(1.0, f64::INFINITY),
            Err(HistError::NonFiniteInput { context: "sample weight" })
        ));
        assert_eq!(
            h.add_weight(1.0, 0.0),
            Err(HistError::NonPositiveWeight { weight: 0.0 })
        );
        assert!(h.add_weight(1.0, -1.0).is_err());
        assert!(h.add_many(&[1.0, 2.0, f64::NEG_INFINITY]).is_err());

        assert_eq!(h, before);
    }

    #[test]
    fn merge_combines_aggregates_and_keeps_capacity() {
        let mut h2 = seed_hist(&[11.0, 2.0, 3.0, 14.0, 7.0, 4.0]);
        assert_exact("sum", 41.0, h2.sum());
        assert_eq!(h2.num_bins(), 4);

        let other = subject();
        let other_before = other.clone();
        h2.merge_with(&other);

        assert_exact("sum", 407.0, h2.sum());
        assert_eq!(h2.num_bins(), 4);
        assert_eq!(h2.count(), 17);
        assert_exact("weight", 17.0, h2.weight());
        assert_exact("min", 2.0, h2.min());
        assert_exact("max", 49.0, h2.max());
        assert_eq!(other, other_before);
    }

    #[test]
    fn merge_into_empty_adopts_extremes() {
        let mut h = Histogram::new(8).expect("capacity");
        h.merge_with(&subject());
        assert_eq!(h.count(), 11);
        assert_exact("min", 6.0, h.min());
        assert_exact("max", 49.0, h.max());
        assert_eq!(h.capacity(), 8);

        let mut h = subject();
        let before = h.clone();
        h.merge_with(&seed_hist(&[]));
        assert_eq!(h, before);
    }

    #[test]
    fn copy_is_deep() {
        let s = subject();
        let mut c = s.copy(None);
        assert_eq!(c, s);

        c.add(1_000.0).expect("valid");
        assert_eq!(s.count(), 11);
        assert_exact("max", 49.0, s.max());
    }

    #[test]
    fn copy_reuses_destination() {
        let s = subject();
        let t2 = seed_hist(&[1.0, 2.0, 3.0, 4.0]);
        let c2 = s.copy(Some(t2));
        assert_eq!(c2, s);

        let mut dst = Histogram::new(100).expect("capacity");
        s.copy_into(&mut dst);
        assert_eq!(dst, s);
        assert_eq!(dst.capacity(), 4);

        let mut cloned = Histogram::new(2).expect("capacity");
        cloned.clone_from(&s);
        assert_eq!(cloned, s);
    }

    #[test]
    fn reset_keeps_capacity() {
        let mut h = subject();
        h.reset();
        assert!(h.is_empty());
        assert_eq!(h.num_bins(), 0);
        assert_eq!(h.capacity(), 4);
        assert_eq!(h, seed_hist(&[]));
    }

    #[test]
    fn empty_histograms_compare_equal() {
        assert_eq!(seed_hist(&[]), seed_hist(&[]));
    }

    #[test]
    fn config_deserializes_with_default() {
        let cfg: HistogramConfig = serde_json::from_str(r#"{"capacity": 32}"#).expect("json");
        assert_eq!(cfg.capacity, 32);

        let cfg: HistogramConfig = serde_json::from_str("{}").expect("json");
        assert_eq!(cfg, HistogramConfig::default());

        assert!(serde_json::from_str::<HistogramConfig>(r#"{"bins": 3}"#).is_err());
    }

    #[test]
    fn spans_cover_total_weight() {
        let h = subject();
        let total: f64 = h.spans().map(|(l, r)| (l.weight() + r.weight()) / 2.0).sum();
        assert_exact("spanned weight", h.weight(), total);
        assert_eq!(h.spans().count(), h.num_bins() + 1);
    }
}
