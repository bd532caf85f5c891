//! Telemetry: structured logging, bucketed histograms, and metrics.
//! All output is local (stdout logs, in-process histograms); no network
//! exporters are wired up here.

pub mod buckets;
pub mod logging;
pub mod metrics;

pub use buckets::{BucketedHistogram, BucketedHistogramSnapshot};
pub use logging::{init_logging, LogConfig, LogError, LogFormat};
pub use metrics::init_metrics;
