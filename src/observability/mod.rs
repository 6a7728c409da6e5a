//! Observability for signature enforcement
//!
//! Logging goes through the `tracing` facade; the embedding process picks
//! the subscriber. This module holds the counters.
//!
//! # Principles
//!
//! 1. Observability is read-only
//! 2. No side effects on enforcement results
//! 3. No background threads
//!
//! # Usage
//!
//! ```ignore
//! use modelsig::observability::EnforcementMetrics;
//!
//! let metrics = EnforcementMetrics::new();
//! metrics.record_accepted();
//! assert_eq!(metrics.snapshot().accepted, 1);
//! ```

mod metrics;

pub use metrics::{EnforcementMetrics, MetricsSnapshot};
