//! IO modules - route input and report output
//!
//! - `route_reader` - JSONL route ingestion (file or stdin)
//! - `report` - JSONL audit reports and self-check lines

pub mod report;
pub mod route_reader;

// Re-export commonly used types
pub use report::{
    color_enabled, print_scenario_outcome, AuditReport, ReportStatus, ReportWriter,
};
pub use route_reader::{RouteInput, RouteLine, RouteReader};
