//! Range filters for coil listing.
//!
//! # Invariants
//! - `RangeFilter::Any` imposes no constraint; `Between` is inclusive on
//!   both ends, so `Between { low: x, high: x }` is an exact match.
//! - A `Between` with `low > high` matches nothing.

use crate::model::coil::CoilId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Optional closed range over one field.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RangeFilter<T> {
    Any,
    Between { low: T, high: T },
}

impl<T> Default for RangeFilter<T> {
    fn default() -> Self {
        Self::Any
    }
}

impl<T> RangeFilter<T> {
    pub fn between(low: T, high: T) -> Self {
        Self::Between { low, high }
    }

    /// Builds a range only when both bounds are supplied.
    pub fn from_bounds(low: Option<T>, high: Option<T>) -> Self {
        match (low, high) {
            (Some(low), Some(high)) => Self::Between { low, high },
            _ => Self::Any,
        }
    }

    pub fn bounds(&self) -> Option<(&T, &T)> {
        match self {
            Self::Any => None,
            Self::Between { low, high } => Some((low, high)),
        }
    }
}

/// Conjunction of per-field ranges used by `CoilService::list`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoilFilter {
    pub id: RangeFilter<CoilId>,
    pub weight: RangeFilter<f64>,
    pub length: RangeFilter<f64>,
    pub added_at: RangeFilter<DateTime<Utc>>,
    /// Never matches coils that are still in inventory.
    pub removed_at: RangeFilter<DateTime<Utc>>,
}
