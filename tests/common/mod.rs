use dhat::HeapStats;
use gr_histogram::Histogram;
use histogram_testdata::{gen_dataset, DistKind};

/// Latency-shaped points in microseconds, fixed seed.
pub fn make_points(size: usize) -> Vec<f64> {
    gen_dataset(DistKind::Latency, size, 0xC0FFEE)
}

/// A histogram already at capacity, so every further insert goes through bounding.
pub fn saturated(capacity: usize, points: &[f64]) -> Histogram {
    let h = Histogram::from_values(capacity, points).expect("finite points");
    assert_eq!(h.num_bins(), capacity, "warm-up must saturate the store");
    h
}

/// The `dhat` counters the heap tests compare, with subtraction.
pub struct MathableHeapStats {
    pub total_blocks: u64,
    pub total_bytes: u64,
    pub curr_blocks: usize,
}

impl From<HeapStats> for MathableHeapStats {
    fn from(stats: HeapStats) -> Self {
        Self {
            total_blocks: stats.total_blocks,
            total_bytes: stats.total_bytes,
            curr_blocks: stats.curr_blocks,
        }
    }
}

impl std::ops::Sub for MathableHeapStats {
    type Output = MathableHeapStats;

    fn sub(self, rhs: MathableHeapStats) -> Self::Output {
        MathableHeapStats {
            total_blocks: self.total_blocks - rhs.total_blocks,
            total_bytes: self.total_bytes - rhs.total_bytes,
            curr_blocks: self.curr_blocks.saturating_sub(rhs.curr_blocks),
        }
    }
}
