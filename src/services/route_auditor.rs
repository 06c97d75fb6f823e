//! Route auditing: chronology validation and revisit detection
//!
//! A route is scanned once, front to back, in trip order. Two things are
//! checked along the way:
//! - Chronology: timestamps never go backwards across the whole route
//! - Revisits: returning to a known location adds the time elapsed since its
//!   previous visit to the route's total revisit time
//!
//! A repeated location whose timestamp does not advance is not a zero-length
//! revisit; it is rejected as invalid data.

use crate::domain::types::{LocationId, Timestamp, VisitRecord};
use crate::infra::metrics::AuditMetrics;
use rustc_hash::FxHashMap;
use serde::Serialize;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Outcome of a successful audit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RouteVerdict {
    /// At least one location was revisited; always strictly positive
    Revisited { total_revisit_secs: u64 },
    NoCycle,
}

impl RouteVerdict {
    /// Total revisit time, `None` when no cycle was found
    #[inline]
    pub fn total_revisit_time(&self) -> Option<u64> {
        match self {
            RouteVerdict::Revisited { total_revisit_secs } => Some(*total_revisit_secs),
            RouteVerdict::NoCycle => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RouteVerdict::Revisited { .. } => "revisited",
            RouteVerdict::NoCycle => "no_cycle",
        }
    }
}

/// Route failed validation. Either cause aborts the audit with no partial result.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidRouteError {
    #[error(
        "timestamps not in chronological order: visit {position} at location {location_id} \
         has timestamp {timestamp} before previous {previous}"
    )]
    OutOfOrder {
        position: usize,
        location_id: LocationId,
        timestamp: Timestamp,
        previous: Timestamp,
    },

    #[error(
        "same location id encountered with a non-advancing timestamp: visit {position} at \
         location {location_id} has timestamp {timestamp}, last seen at {previous}"
    )]
    NonAdvancingRepeat {
        position: usize,
        location_id: LocationId,
        timestamp: Timestamp,
        previous: Timestamp,
    },
}

impl InvalidRouteError {
    /// Stable machine-readable cause name
    pub fn kind(&self) -> &'static str {
        match self {
            InvalidRouteError::OutOfOrder { .. } => "out_of_order",
            InvalidRouteError::NonAdvancingRepeat { .. } => "non_advancing_repeat",
        }
    }

    /// Zero-based position of the offending visit
    pub fn position(&self) -> usize {
        match self {
            InvalidRouteError::OutOfOrder { position, .. }
            | InvalidRouteError::NonAdvancingRepeat { position, .. } => *position,
        }
    }
}

/// Audit a route in the order given.
///
/// Returns the total revisit time, `NoCycle` if it sums to zero, or the first
/// validation failure. Consumes the iterator only as far as needed, so an
/// unbounded walk over a looping chain still terminates.
pub fn audit<I>(visits: I) -> Result<RouteVerdict, InvalidRouteError>
where
    I: IntoIterator<Item = VisitRecord>,
{
    audit_counting(visits).0
}

/// Same as `audit`, also returning how many visits were scanned
fn audit_counting<I>(visits: I) -> (Result<RouteVerdict, InvalidRouteError>, u64)
where
    I: IntoIterator<Item = VisitRecord>,
{
    // Most recent timestamp per location, local to this call
    let mut history: FxHashMap<LocationId, Timestamp> = FxHashMap::default();
    let mut last_timestamp = Timestamp::MIN;
    let mut total_revisit_secs: u64 = 0;
    let mut scanned: u64 = 0;

    for (position, visit) in visits.into_iter().enumerate() {
        scanned += 1;
        let VisitRecord { location_id, timestamp } = visit;

        if timestamp < last_timestamp {
            let err = InvalidRouteError::OutOfOrder {
                position,
                location_id,
                timestamp,
                previous: last_timestamp,
            };
            return (Err(err), scanned);
        }
        last_timestamp = timestamp;

        match history.get_mut(&location_id) {
            Some(previous) if timestamp > *previous => {
                let elapsed = timestamp.elapsed_since(*previous);
                total_revisit_secs = total_revisit_secs.saturating_add(elapsed);

                debug!(
                    location_id = %location_id,
                    previous = %previous,
                    timestamp = %timestamp,
                    elapsed_secs = %elapsed,
                    "revisit_detected"
                );

                *previous = timestamp;
            }
            Some(previous) => {
                let err = InvalidRouteError::NonAdvancingRepeat {
                    position,
                    location_id,
                    timestamp,
                    previous: *previous,
                };
                return (Err(err), scanned);
            }
            None => {
                history.insert(location_id, timestamp);
            }
        }
    }

    // A zero total is indistinguishable from no revisit at all
    let verdict = if total_revisit_secs > 0 {
        RouteVerdict::Revisited { total_revisit_secs }
    } else {
        RouteVerdict::NoCycle
    };

    (Ok(verdict), scanned)
}

/// Audits routes and records outcomes into shared metrics
pub struct RouteAuditor {
    metrics: Option<Arc<AuditMetrics>>,
}

impl RouteAuditor {
    pub fn new() -> Self {
        Self { metrics: None }
    }

    pub fn with_metrics(metrics: Arc<AuditMetrics>) -> Self {
        Self { metrics: Some(metrics) }
    }

    /// Audit one route identified by `route_id` (used for logging only)
    pub fn audit<I>(&self, route_id: &str, visits: I) -> Result<RouteVerdict, InvalidRouteError>
    where
        I: IntoIterator<Item = VisitRecord>,
    {
        let (result, scanned) = audit_counting(visits);

        if let Some(metrics) = &self.metrics {
            metrics.record_audit(scanned, &result);
        }

        match &result {
            Ok(verdict) => info!(
                route_id = %route_id,
                verdict = %verdict.as_str(),
                total_revisit_secs = ?verdict.total_revisit_time(),
                visits = %scanned,
                "route_audited"
            ),
            Err(e) => warn!(
                route_id = %route_id,
                kind = %e.kind(),
                position = %e.position(),
                error = %e,
                "route_invalid"
            ),
        }

        result
    }
}

impl Default for RouteAuditor {
    fn default() -> Self {
        Self::new()
    }
}
