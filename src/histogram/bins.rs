use ordered_float::OrderedFloat;
use tracing::trace;

/// A bin summarizes every observation collapsed into it.
///
/// `value` is the weighted mean of the contributing observations and `weight`
/// their total mass. Weights are always strictly positive for stored bins; the
/// zero-weight form only appears as the `min`/`max` frame used by the
/// quantile and CDF kernels.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Bin {
    value: OrderedFloat<f64>,
    weight: f64,
}

impl Bin {
    #[inline]
    pub(crate) fn new(value: f64, weight: f64) -> Self {
        debug_assert!(!value.is_nan());
        debug_assert!(weight >= 0.0);
        Bin {
            value: OrderedFloat::from(value),
            weight,
        }
    }

    /// Zero-weight frame bin placed at `min`/`max` around the store.
    #[inline]
    pub(crate) fn frame(value: f64) -> Self {
        Bin::new(value, 0.0)
    }

    #[inline]
    pub fn value(&self) -> f64 {
        self.value.into_inner()
    }
    #[inline]
    pub fn weight(&self) -> f64 {
        self.weight
    }

    /// Collapse `right` into `self`: weights add, values average by weight.
    ///
    /// Mixing by weight fractions keeps the mean finite for any finite pair,
    /// including values near `±f64::MAX`. The result is clamped into
    /// `[self, right]` so rounding can never step past a neighbour.
    #[inline]
    fn absorb(&mut self, right: Bin) {
        let (lo, hi) = (self.value(), right.value());
        let w = self.weight + right.weight;
        let v = lo * (self.weight / w) + hi * (right.weight / w);
        self.value = OrderedFloat::from(v.clamp(lo, hi));
        self.weight = w;
    }
}

/// Strictly increasing by value.
#[inline]
pub fn is_sorted_strict_by_value(bins: &[Bin]) -> bool {
    bins.windows(2).all(|w| w[0].value() < w[1].value())
}

/// Ordered, capacity-bounded bin sequence.
///
/// Storage is reserved once for `limit + 1` bins: an insertion may overflow
/// by exactly one before [`BinStore::bound`] collapses the closest pair, so
/// steady-state insertion never reallocates.
#[derive(Debug)]
pub(crate) struct BinStore {
    bins: Vec<Bin>,
    limit: usize,
}

impl BinStore {
    pub(crate) fn with_limit(limit: usize) -> Self {
        debug_assert!(limit > 0);
        BinStore {
            bins: Vec::with_capacity(limit + 1),
            limit,
        }
    }

    #[inline]
    pub(crate) fn limit(&self) -> usize {
        self.limit
    }
    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.bins.len()
    }
    #[inline]
    pub(crate) fn as_slice(&self) -> &[Bin] {
        &self.bins
    }

    #[inline]
    pub(crate) fn clear(&mut self) {
        self.bins.clear();
    }

    /// Insert `(value, weight)` at its sorted position and restore the limit.
    ///
    /// An exact value match accumulates into the existing bin (the weighted
    /// mean of identical values is unchanged), otherwise a new bin is placed.
    pub(crate) fn insert(&mut self, value: f64, weight: f64) {
        debug_assert!(value.is_finite() && weight > 0.0);
        let key = OrderedFloat::from(value);
        match self.bins.binary_search_by(|b| b.value.cmp(&key)) {
            Ok(idx) => self.bins[idx].weight += weight,
            Err(idx) => {
                self.bins.insert(idx, Bin::new(value, weight));
                if self.bins.len() > self.limit {
                    self.bound();
                }
            }
        }
        debug_assert!(self.bins.len() <= self.limit);
        debug_assert!(
            is_sorted_strict_by_value(&self.bins),
            "bins out of order after insert"
        );
    }

    /// Collapse the adjacent pair with the smallest value gap (leftmost on ties).
    fn bound(&mut self) {
        let Some((idx, gap)) = self.closest_pair() else {
            return;
        };
        let right = self.bins.remove(idx + 1);
        self.bins[idx].absorb(right);
        trace!(idx, gap, "collapsed closest bin pair");
    }

    /// Index of the left bin of the closest adjacent pair, with its gap.
    fn closest_pair(&self) -> Option<(usize, f64)> {
        let mut best: Option<(usize, f64)> = None;
        for (i, w) in self.bins.windows(2).enumerate() {
            let gap = w[1].value() - w[0].value();
            match best {
                Some((_, g)) if gap >= g => {}
                _ => best = Some((i, gap)),
            }
        }
        best
    }

    /// Overwrite `self` with `src`, keeping the `limit + 1` reservation.
    pub(crate) fn copy_from(&mut self, src: &BinStore) {
        self.limit = src.limit;
        self.bins.clear();
        self.bins.reserve(src.limit + 1);
        self.bins.extend_from_slice(&src.bins);
    }
}

impl Clone for BinStore {
    fn clone(&self) -> Self {
        let mut out = BinStore::with_limit(self.limit);
        out.bins.extend_from_slice(&self.bins);
        out
    }

    fn clone_from(&mut self, source: &Self) {
        self.copy_from(source);
    }
}

impl PartialEq for BinStore {
    fn eq(&self, other: &Self) -> bool {
        self.limit == other.limit && self.bins == other.bins
    }
}
