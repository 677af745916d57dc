//! Core domain logic for coil inventory tracking.
//! This crate is the single source of truth for coil invariants.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;
pub mod store;

pub use config::{ConfigError, CoreConfig, DatabaseConfig, LoggingConfig};
pub use logging::{default_log_level, init_logging, init_logging_from_config, logging_status};
pub use model::coil::{Coil, CoilId, CoilPatch, CoilValidationError, NewCoil};
pub use model::range::{CoilFilter, RangeFilter};
pub use model::stats::{DateWindow, InvalidRange, StatsReport};
pub use repo::coil_repo::{CoilRepository, RepoError, RepoResult, SqliteCoilRepository};
pub use service::coil_service::{CoilService, CoilServiceError, CoilServiceResult};
pub use service::stats_service::{StatisticsError, StatisticsService};
pub use store::CoilStore;

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
