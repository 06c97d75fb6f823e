//! Lock-free audit counters and summary reporting
//!
//! Uses atomics so a single `AuditMetrics` can be shared between the reader
//! loop and the auditor without locking.
//!
//! NOTE: All atomics use Relaxed ordering intentionally. These are statistical
//! counters only and must not drive audit logic.

use crate::services::route_auditor::{InvalidRouteError, RouteVerdict};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;
use tracing::info;

/// Shared audit counters
pub struct AuditMetrics {
    started_at: Instant,
    routes_audited: AtomicU64,
    revisited: AtomicU64,
    no_cycle: AtomicU64,
    out_of_order: AtomicU64,
    non_advancing_repeat: AtomicU64,
    rejected: AtomicU64,
    malformed: AtomicU64,
    visits_scanned: AtomicU64,
    total_revisit_secs: AtomicU64,
}

impl AuditMetrics {
    pub fn new() -> Self {
        Self {
            started_at: Instant::now(),
            routes_audited: AtomicU64::new(0),
            revisited: AtomicU64::new(0),
            no_cycle: AtomicU64::new(0),
            out_of_order: AtomicU64::new(0),
            non_advancing_repeat: AtomicU64::new(0),
            rejected: AtomicU64::new(0),
            malformed: AtomicU64::new(0),
            visits_scanned: AtomicU64::new(0),
            total_revisit_secs: AtomicU64::new(0),
        }
    }

    /// Record the result of one completed audit call
    #[inline]
    pub fn record_audit(&self, visits: u64, result: &Result<RouteVerdict, InvalidRouteError>) {
        self.routes_audited.fetch_add(1, Ordering::Relaxed);
        self.visits_scanned.fetch_add(visits, Ordering::Relaxed);

        match result {
            Ok(RouteVerdict::Revisited { total_revisit_secs }) => {
                self.revisited.fetch_add(1, Ordering::Relaxed);
                // closure always returns Some, so this cannot fail
                let _ = self.total_revisit_secs.fetch_update(
                    Ordering::Relaxed,
                    Ordering::Relaxed,
                    |cur| Some(cur.saturating_add(*total_revisit_secs)),
                );
            }
            Ok(RouteVerdict::NoCycle) => {
                self.no_cycle.fetch_add(1, Ordering::Relaxed);
            }
            Err(InvalidRouteError::OutOfOrder { .. }) => {
                self.out_of_order.fetch_add(1, Ordering::Relaxed);
            }
            Err(InvalidRouteError::NonAdvancingRepeat { .. }) => {
                self.non_advancing_repeat.fetch_add(1, Ordering::Relaxed);
            }
        }
    }

    /// Route refused before auditing (over the size budget)
    #[inline]
    pub fn record_rejected(&self) {
        self.rejected.fetch_add(1, Ordering::Relaxed);
    }

    /// Input line that could not be parsed into a route
    #[inline]
    pub fn record_malformed(&self) {
        self.malformed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn routes_audited(&self) -> u64 {
        self.routes_audited.load(Ordering::Relaxed)
    }

    /// Read a consistent-enough view of all counters
    pub fn snapshot(&self) -> MetricsSummary {
        MetricsSummary {
            uptime_ms: self.started_at.elapsed().as_millis() as u64,
            routes_audited: self.routes_audited.load(Ordering::Relaxed),
            revisited: self.revisited.load(Ordering::Relaxed),
            no_cycle: self.no_cycle.load(Ordering::Relaxed),
            out_of_order: self.out_of_order.load(Ordering::Relaxed),
            non_advancing_repeat: self.non_advancing_repeat.load(Ordering::Relaxed),
            rejected: self.rejected.load(Ordering::Relaxed),
            malformed: self.malformed.load(Ordering::Relaxed),
            visits_scanned: self.visits_scanned.load(Ordering::Relaxed),
            total_revisit_secs: self.total_revisit_secs.load(Ordering::Relaxed),
        }
    }
}

impl Default for AuditMetrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Point-in-time copy of the audit counters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MetricsSummary {
    pub uptime_ms: u64,
    pub routes_audited: u64,
    pub revisited: u64,
    pub no_cycle: u64,
    pub out_of_order: u64,
    pub non_advancing_repeat: u64,
    pub rejected: u64,
    pub malformed: u64,
    pub visits_scanned: u64,
    pub total_revisit_secs: u64,
}

impl MetricsSummary {
    /// Routes that failed validation, both causes combined
    pub fn invalid(&self) -> u64 {
        self.out_of_order + self.non_advancing_repeat
    }

    pub fn log(&self) {
        info!(
            uptime_ms = %self.uptime_ms,
            routes_audited = %self.routes_audited,
            revisited = %self.revisited,
            no_cycle = %self.no_cycle,
            out_of_order = %self.out_of_order,
            non_advancing_repeat = %self.non_advancing_repeat,
            rejected = %self.rejected,
            malformed = %self.malformed,
            visits_scanned = %self.visits_scanned,
            total_revisit_secs = %self.total_revisit_secs,
            "audit_metrics"
        );
    }
}
