//! Statistics window and report types.
//!
//! # Invariants
//! - A `DateWindow` always satisfies `start <= end`.
//! - Storage times are seconds and are present only when at least one
//!   in-period coil has been removed.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Inclusive time window for statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DateWindow {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

/// Window whose end precedes its start.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidRange {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl Display for InvalidRange {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "end date {} is earlier than start date {}",
            self.end.to_rfc3339(),
            self.start.to_rfc3339()
        )
    }
}

impl Error for InvalidRange {}

impl DateWindow {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self, InvalidRange> {
        if end < start {
            return Err(InvalidRange { start, end });
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    pub fn end(&self) -> DateTime<Utc> {
        self.end
    }
}

/// Aggregate metrics over one `DateWindow`.
///
/// `added_count` and `removed_count` look at every stored coil; the other
/// fields only at coils in period (arrived by `end`, not removed before
/// `start`).
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StatsReport {
    pub added_count: u64,
    pub removed_count: u64,
    pub avg_length: f64,
    pub avg_weight: f64,
    pub min_length: f64,
    pub max_length: f64,
    pub min_weight: f64,
    pub max_weight: f64,
    pub total_weight: f64,
    /// Seconds.
    pub min_storage_time: Option<f64>,
    /// Seconds.
    pub max_storage_time: Option<f64>,
}
