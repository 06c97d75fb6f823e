//! Services - route auditing logic
//!
//! This module contains the core business logic services:
//! - `route_auditor` - Chronology validation and revisit timing
//! - `scenarios` - Named acceptance scenarios run by `self-check`
//! - `audit_run` - Batch loop from route input to report output

pub mod audit_run;
pub mod route_auditor;
pub mod scenarios;

// Re-export commonly used types
pub use audit_run::run_batch;
pub use route_auditor::{audit, InvalidRouteError, RouteAuditor, RouteVerdict};
