//! Bounded-memory streaming histogram.
//!
//! A [`Histogram`] ingests an unbounded stream of `(value, weight)` observations
//! into at most `capacity` bins and answers approximate quantiles, CDF, mean,
//! sum, min, max and count at any time without storing the raw stream.
//!
//! ```
//! use gr_histogram::Histogram;
//!
//! let mut h = Histogram::new(16).unwrap();
//! for i in 1..100 {
//!     h.add(i as f64).unwrap();
//! }
//!
//! assert_eq!(h.min(), 1.0);
//! assert_eq!(h.max(), 99.0);
//! assert_eq!(h.sum(), 4950.0);
//! assert_eq!(h.mean(), 50.0);
//! assert!((h.quantile(0.5) - 49.8).abs() < 0.05);
//! assert!((h.quantile(0.95) - 94.6).abs() < 0.05);
//! assert!(h.num_bins() <= 16);
//! ```
//!
//! A histogram is plain owned data with no internal locking: mutation takes
//! `&mut self`. Shard one histogram per worker and fold them with
//! [`Histogram::merge_with`].

pub mod error;
pub mod histogram;
pub mod quality;

pub use error::{HistError, HistResult};
pub use histogram::{Bin, Histogram, HistogramBuilder, HistogramConfig};
pub use quality::QualityReport;
