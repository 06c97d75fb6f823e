//! Shared types for route auditing

use serde::{Deserialize, Deserializer, Serialize};

/// Newtype wrapper for pickup location IDs to provide type safety
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
#[repr(transparent)]
pub struct LocationId(pub i64);

impl std::fmt::Display for LocationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Visit timestamp (Unix epoch seconds, treated as an opaque ordered integer)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
#[repr(transparent)]
pub struct Timestamp(pub i64);

impl Timestamp {
    /// Lowest representable timestamp, the starting point of the chronology check
    pub const MIN: Timestamp = Timestamp(i64::MIN);

    /// Seconds elapsed from `earlier` to `self`, zero if `earlier` is not before `self`
    #[inline]
    pub fn elapsed_since(self, earlier: Timestamp) -> u64 {
        if self.0 > earlier.0 {
            self.0.abs_diff(earlier.0)
        } else {
            0
        }
    }
}

impl std::fmt::Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One pickup snapshot: a location visited at a point in time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct VisitRecord {
    pub location_id: LocationId,
    pub timestamp: Timestamp,
}

impl VisitRecord {
    #[inline]
    pub fn new(location_id: i64, timestamp: i64) -> Self {
        Self { location_id: LocationId(location_id), timestamp: Timestamp(timestamp) }
    }
}

impl From<(i64, i64)> for VisitRecord {
    fn from((location_id, timestamp): (i64, i64)) -> Self {
        Self::new(location_id, timestamp)
    }
}

/// Accepts either `{"location_id": 1, "timestamp": 2}` or the compact `[1, 2]`
impl<'de> Deserialize<'de> for VisitRecord {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawVisit {
            Object { location_id: LocationId, timestamp: Timestamp },
            Pair(LocationId, Timestamp),
        }

        Ok(match RawVisit::deserialize(deserializer)? {
            RawVisit::Object { location_id, timestamp } => Self { location_id, timestamp },
            RawVisit::Pair(location_id, timestamp) => Self { location_id, timestamp },
        })
    }
}
