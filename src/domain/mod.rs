//! Domain models - core route types
//!
//! This module contains the canonical data types used throughout the system:
//! - `VisitRecord` - one pickup snapshot (location + timestamp)
//! - `LocationId` / `Timestamp` - typed identifiers
//! - `RouteChain` - linked pickup chain as reported by driver monitoring

pub mod route;
pub mod types;

// Re-export commonly used types at module level
pub use route::{NodeId, RouteChain, RouteError};
pub use types::{LocationId, Timestamp, VisitRecord};
