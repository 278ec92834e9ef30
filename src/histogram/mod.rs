pub mod bins;
pub mod cdf;
pub mod quantile;
#[cfg(test)]
pub(crate) mod test_helpers;

// Internal building blocks
#[allow(clippy::module_inception)]
mod histogram;

// Public surface
pub use bins::Bin;
pub use histogram::{Histogram, HistogramBuilder, HistogramConfig, DEFAULT_CAPACITY};
