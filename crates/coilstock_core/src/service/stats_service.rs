//! Windowed inventory statistics.
//!
//! # Responsibility
//! - Aggregate length/weight/storage-time metrics over coils in period.
//! - Count arrivals and removals inside the window.
//!
//! # Invariants
//! - In period means `added_at <= end` and `removed_at` null or `>= start`.
//! - `added_count`/`removed_count` are taken over the whole table filtered
//!   by timestamp only, not over the in-period set. This mismatch is
//!   existing behavior and is kept.
//! - No in-period coils yields `StatsReport::default()`.

use crate::model::coil::Coil;
use crate::model::stats::{DateWindow, InvalidRange, StatsReport};
use crate::repo::coil_repo::{CoilRepository, RepoError, RepoResult};
use chrono::{DateTime, Utc};
use log::debug;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Error for statistics requests built from raw dates.
#[derive(Debug)]
pub enum StatisticsError {
    InvalidRange(InvalidRange),
    Repo(RepoError),
}

impl Display for StatisticsError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidRange(err) => write!(f, "{err}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for StatisticsError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidRange(err) => Some(err),
            Self::Repo(err) => Some(err),
        }
    }
}

impl From<InvalidRange> for StatisticsError {
    fn from(value: InvalidRange) -> Self {
        Self::InvalidRange(value)
    }
}

impl From<RepoError> for StatisticsError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

/// Statistics service built on the coil repository query primitives.
pub struct StatisticsService<R: CoilRepository> {
    repo: R,
}

impl<R: CoilRepository> StatisticsService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    pub fn statistics(&self, window: &DateWindow) -> RepoResult<StatsReport> {
        let in_period = self.repo.list_in_period(window)?;
        if in_period.is_empty() {
            return Ok(StatsReport::default());
        }

        let added_count = self.repo.count_added_between(window)?;
        let removed_count = self.repo.count_removed_between(window)?;
        debug!(
            "event=coil_stats module=service status=ok in_period={} added={} removed={}",
            in_period.len(),
            added_count,
            removed_count
        );

        Ok(summarize(&in_period, added_count, removed_count))
    }

    /// Validates `start <= end` and computes statistics for that window.
    pub fn statistics_between(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<StatsReport, StatisticsError> {
        let window = DateWindow::new(start, end)?;
        Ok(self.statistics(&window)?)
    }
}

/// Folds in-period coils into a report. Empty input gives the zero report.
pub fn summarize(in_period: &[Coil], added_count: u64, removed_count: u64) -> StatsReport {
    let Some(first) = in_period.first() else {
        return StatsReport::default();
    };

    let mut report = StatsReport {
        added_count,
        removed_count,
        min_length: first.length,
        max_length: first.length,
        min_weight: first.weight,
        max_weight: first.weight,
        ..StatsReport::default()
    };
    let mut total_length = 0.0;

    for coil in in_period {
        total_length += coil.length;
        report.total_weight += coil.weight;
        report.min_length = report.min_length.min(coil.length);
        report.max_length = report.max_length.max(coil.length);
        report.min_weight = report.min_weight.min(coil.weight);
        report.max_weight = report.max_weight.max(coil.weight);

        if let Some(storage_time) = coil.storage_time() {
            let seconds = storage_time.num_milliseconds() as f64 / 1000.0;
            report.min_storage_time =
                Some(report.min_storage_time.map_or(seconds, |min| min.min(seconds)));
            report.max_storage_time =
                Some(report.max_storage_time.map_or(seconds, |max| max.max(seconds)));
        }
    }

    let count = in_period.len() as f64;
    report.avg_length = total_length / count;
    report.avg_weight = report.total_weight / count;
    report
}
