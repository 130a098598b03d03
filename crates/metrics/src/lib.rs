//! Pure, read-only statistics over windows of observations. Nothing in this
//! crate performs I/O or mutates its inputs, so aggregation queries can run
//! concurrently with an in-progress benchmark run without coordination.

pub mod aggregator;
pub mod breakdown;
pub mod bucketizer;
pub mod summary;
pub mod variance;

// Re-export the core entry points to provide a clean public API.
pub use aggregator::summarize;
pub use breakdown::{error_breakdown, ErrorBreakdown};
pub use bucketizer::{bucketize, BucketResult};
pub use summary::ProviderSummary;
pub use variance::{max_deviation, variance_series, VariancePoint};

/// Default bucket width for time-series queries, in minutes.
pub const DEFAULT_BUCKET_WIDTH_MINUTES: u32 = 5;
