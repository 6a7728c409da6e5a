//! Enforcement counters
//!
//! - Counters only, monotonic, reset on process start
//! - Thread-safe, lock-free
//! - Observational: never influence enforcement results

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

use crate::schema::EnforcementErrorKind;

/// Counters for signature enforcement calls
///
/// All counters use Relaxed ordering; exact cross-counter consistency is
/// not required for metrics.
#[derive(Debug, Default)]
pub struct EnforcementMetrics {
    /// Enforcement calls started
    calls: AtomicU64,
    /// Calls that produced validated data
    accepted: AtomicU64,
    /// Calls rejected by enforcement
    rejected: AtomicU64,
    type_mismatches: AtomicU64,
    /// Schemas parsed at request time and rejected. Signature files that fail
    /// to parse surface as `SignatureError::Malformed` at load and are not
    /// counted here, so `SignatureValidator` never moves this counter.
    invalid_schemas: AtomicU64,
    missing_properties: AtomicU64,
    unexpected_properties: AtomicU64,
    coercion_failures: AtomicU64,
    unsupported_data: AtomicU64,
}

impl EnforcementMetrics {
    /// Create a registry with all counters at zero
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an accepted call
    pub fn record_accepted(&self) {
        self.calls.fetch_add(1, Ordering::Relaxed);
        self.accepted.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a rejected call and its failure kind
    pub fn record_rejected(&self, kind: EnforcementErrorKind) {
        self.calls.fetch_add(1, Ordering::Relaxed);
        self.rejected.fetch_add(1, Ordering::Relaxed);

        let counter = match kind {
            EnforcementErrorKind::TypeMismatch => &self.type_mismatches,
            EnforcementErrorKind::InvalidSchemaArgument => &self.invalid_schemas,
            EnforcementErrorKind::MissingRequiredProperties => &self.missing_properties,
            EnforcementErrorKind::UnexpectedProperties => &self.unexpected_properties,
            EnforcementErrorKind::TypeCoercionFailure => &self.coercion_failures,
            EnforcementErrorKind::UnsupportedData => &self.unsupported_data,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    /// Get the number of rejected calls for one failure kind
    pub fn rejections(&self, kind: EnforcementErrorKind) -> u64 {
        let snapshot = self.snapshot();
        match kind {
            EnforcementErrorKind::TypeMismatch => snapshot.type_mismatches,
            EnforcementErrorKind::InvalidSchemaArgument => snapshot.invalid_schemas,
            EnforcementErrorKind::MissingRequiredProperties => snapshot.missing_properties,
            EnforcementErrorKind::UnexpectedProperties => snapshot.unexpected_properties,
            EnforcementErrorKind::TypeCoercionFailure => snapshot.coercion_failures,
            EnforcementErrorKind::UnsupportedData => snapshot.unsupported_data,
        }
    }

    /// Get all counters as a snapshot
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            calls: self.calls.load(Ordering::Relaxed),
            accepted: self.accepted.load(Ordering::Relaxed),
            rejected: self.rejected.load(Ordering::Relaxed),
            type_mismatches: self.type_mismatches.load(Ordering::Relaxed),
            invalid_schemas: self.invalid_schemas.load(Ordering::Relaxed),
            missing_properties: self.missing_properties.load(Ordering::Relaxed),
            unexpected_properties: self.unexpected_properties.load(Ordering::Relaxed),
            coercion_failures: self.coercion_failures.load(Ordering::Relaxed),
            unsupported_data: self.unsupported_data.load(Ordering::Relaxed),
        }
    }

    /// Get the snapshot as a JSON object
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self.snapshot()).unwrap_or_default()
    }
}

/// A point-in-time copy of all counters
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    pub calls: u64,
    pub accepted: u64,
    pub rejected: u64,
    pub type_mismatches: u64,
    pub invalid_schemas: u64,
    pub missing_properties: u64,
    pub unexpected_properties: u64,
    pub coercion_failures: u64,
    pub unsupported_data: u64,
}
