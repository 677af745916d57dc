//! Configured entry point for the coil store.
//!
//! # Responsibility
//! - Open the database described by an explicit `DatabaseConfig`.
//! - Hand out services bound to the owned connection.
//!
//! # Invariants
//! - One connection per store; services borrow it for their lifetime.

use crate::config::DatabaseConfig;
use crate::db::{open_db_with_config, DbResult};
use crate::repo::coil_repo::{RepoResult, SqliteCoilRepository};
use crate::service::coil_service::CoilService;
use crate::service::stats_service::StatisticsService;
use rusqlite::Connection;

pub struct CoilStore {
    conn: Connection,
}

impl CoilStore {
    /// Opens and migrates the configured database.
    pub fn open(config: &DatabaseConfig) -> DbResult<Self> {
        Ok(Self {
            conn: open_db_with_config(config)?,
        })
    }

    pub fn coils(&self) -> RepoResult<CoilService<SqliteCoilRepository<'_>>> {
        Ok(CoilService::new(SqliteCoilRepository::try_new(&self.conn)?))
    }

    pub fn statistics(&self) -> RepoResult<StatisticsService<SqliteCoilRepository<'_>>> {
        Ok(StatisticsService::new(SqliteCoilRepository::try_new(
            &self.conn,
        )?))
    }
}
