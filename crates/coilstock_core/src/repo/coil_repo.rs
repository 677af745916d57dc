//! Coil repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Insert, look up, patch, remove, and range-query rows of the `coils` table.
//! - Provide the window queries consumed by the statistics service.
//!
//! # Invariants
//! - Timestamps are stored as Unix epoch milliseconds (UTC).
//! - Every multi-row query returns rows ordered by `id ASC`.
//! - Read paths reject unreadable persisted timestamps instead of masking them.
//! - Each write is a single statement; updates never rewrite `removed_at`
//!   and removal only succeeds on a row whose `removed_at` is still null.

use crate::db::migrations::latest_version;
use crate::db::DbError;
use crate::model::coil::{Coil, CoilId, CoilPatch, NewCoil};
use crate::model::range::{CoilFilter, RangeFilter};
use crate::model::stats::DateWindow;
use chrono::{DateTime, Utc};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};

const COIL_SELECT_SQL: &str = "SELECT
    id,
    length,
    weight,
    added_at,
    removed_at,
    updated_at
FROM coils";

pub type RepoResult<T> = Result<T, RepoError>;

/// Errors from coil persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    /// Underlying SQLite/bootstrap error.
    Db(DbError),
    /// No row with this id.
    NotFound(CoilId),
    /// Connection schema is older than this binary expects.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    /// Persisted data cannot be converted to a valid record.
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "coil not found: {id}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "coil repository requires schema version {expected_version}, got {actual_version}"
            ),
            Self::InvalidData(message) => write!(f, "invalid persisted coil data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Storage primitives for coil records.
pub trait CoilRepository {
    /// Inserts a new row and returns it with its storage-assigned id.
    fn insert_coil(&self, coil: &NewCoil, added_at: DateTime<Utc>) -> RepoResult<Coil>;
    fn get_coil(&self, id: CoilId) -> RepoResult<Option<Coil>>;
    /// Writes the present patch fields and `updated_at` in one statement.
    ///
    /// Never touches `removed_at`. A missing row yields `NotFound`.
    fn apply_patch(&self, id: CoilId, patch: &CoilPatch, at: DateTime<Utc>) -> RepoResult<()>;
    /// Sets `removed_at` only while it is still null.
    ///
    /// Returns `false` when no active row with this id exists.
    fn mark_removed(&self, id: CoilId, at: DateTime<Utc>) -> RepoResult<bool>;
    fn list_coils(&self, filter: &CoilFilter) -> RepoResult<Vec<Coil>>;
    /// Coils with `added_at <= end` and `removed_at` null or `>= start`.
    fn list_in_period(&self, window: &DateWindow) -> RepoResult<Vec<Coil>>;
    fn count_added_between(&self, window: &DateWindow) -> RepoResult<u64>;
    fn count_removed_between(&self, window: &DateWindow) -> RepoResult<u64>;
}

/// SQLite-backed coil repository borrowing one migrated connection.
pub struct SqliteCoilRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteCoilRepository<'conn> {
    /// Wraps a connection after checking it has been migrated.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        let actual_version: u32 =
            conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
        let expected_version = latest_version();
        if actual_version < expected_version {
            return Err(RepoError::UninitializedConnection {
                expected_version,
                actual_version,
            });
        }
        Ok(Self { conn })
    }

    fn query_coils(&self, sql: &str, bind_values: Vec<Value>) -> RepoResult<Vec<Coil>> {
        let mut stmt = self.conn.prepare(sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut coils = Vec::new();

        while let Some(row) = rows.next()? {
            coils.push(parse_coil_row(row)?);
        }

        Ok(coils)
    }

    fn count_between(&self, column: &str, window: &DateWindow) -> RepoResult<u64> {
        let count: i64 = self.conn.query_row(
            &format!("SELECT COUNT(*) FROM coils WHERE {column} BETWEEN ?1 AND ?2;"),
            params![
                to_epoch_ms(window.start()),
                to_epoch_ms(window.end())
            ],
            |row| row.get(0),
        )?;
        u64::try_from(count)
            .map_err(|_| RepoError::InvalidData(format!("negative row count `{count}`")))
    }
}

impl CoilRepository for SqliteCoilRepository<'_> {
    fn insert_coil(&self, coil: &NewCoil, added_at: DateTime<Utc>) -> RepoResult<Coil> {
        self.conn.execute(
            "INSERT INTO coils (length, weight, added_at) VALUES (?1, ?2, ?3);",
            params![coil.length, coil.weight, to_epoch_ms(added_at)],
        )?;

        Ok(Coil {
            id: self.conn.last_insert_rowid(),
            length: coil.length,
            weight: coil.weight,
            added_at,
            removed_at: None,
            updated_at: None,
        })
    }

    fn get_coil(&self, id: CoilId) -> RepoResult<Option<Coil>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{COIL_SELECT_SQL} WHERE id = ?1;"))?;
        let row = stmt
            .query_row([id], |row| Ok(parse_coil_row(row)))
            .optional()?;
        row.transpose()
    }

    fn apply_patch(&self, id: CoilId, patch: &CoilPatch, at: DateTime<Utc>) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE coils
             SET
                length = COALESCE(?1, length),
                weight = COALESCE(?2, weight),
                updated_at = ?3
             WHERE id = ?4;",
            params![patch.length, patch.weight, to_epoch_ms(at), id],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }

        Ok(())
    }

    fn mark_removed(&self, id: CoilId, at: DateTime<Utc>) -> RepoResult<bool> {
        // Clamped so removed_at never precedes added_at under clock skew.
        let changed = self.conn.execute(
            "UPDATE coils
             SET removed_at = MAX(?1, added_at)
             WHERE id = ?2 AND removed_at IS NULL;",
            params![to_epoch_ms(at), id],
        )?;

        Ok(changed == 1)
    }

    fn list_coils(&self, filter: &CoilFilter) -> RepoResult<Vec<Coil>> {
        let mut sql = format!("{COIL_SELECT_SQL} WHERE 1 = 1");
        let mut bind_values: Vec<Value> = Vec::new();

        push_range(&mut sql, &mut bind_values, "id", &filter.id, |id| {
            Value::Integer(*id)
        });
        push_range(&mut sql, &mut bind_values, "weight", &filter.weight, |w| {
            Value::Real(*w)
        });
        push_range(&mut sql, &mut bind_values, "length", &filter.length, |l| {
            Value::Real(*l)
        });
        push_range(
            &mut sql,
            &mut bind_values,
            "added_at",
            &filter.added_at,
            |at| Value::Integer(to_epoch_ms(*at)),
        );
        push_range(
            &mut sql,
            &mut bind_values,
            "removed_at",
            &filter.removed_at,
            |at| Value::Integer(to_epoch_ms(*at)),
        );

        sql.push_str(" ORDER BY id ASC;");
        self.query_coils(&sql, bind_values)
    }

    fn list_in_period(&self, window: &DateWindow) -> RepoResult<Vec<Coil>> {
        let sql = format!(
            "{COIL_SELECT_SQL}
             WHERE added_at <= ?
               AND (removed_at >= ? OR removed_at IS NULL)
             ORDER BY id ASC;"
        );
        self.query_coils(
            &sql,
            vec![
                Value::Integer(to_epoch_ms(window.end())),
                Value::Integer(to_epoch_ms(window.start())),
            ],
        )
    }

    fn count_added_between(&self, window: &DateWindow) -> RepoResult<u64> {
        self.count_between("added_at", window)
    }

    fn count_removed_between(&self, window: &DateWindow) -> RepoResult<u64> {
        // NULL never satisfies BETWEEN, so active coils are not counted.
        self.count_between("removed_at", window)
    }
}

fn push_range<T>(
    sql: &mut String,
    bind_values: &mut Vec<Value>,
    column: &str,
    range: &RangeFilter<T>,
    to_value: impl Fn(&T) -> Value,
) {
    if let Some((low, high)) = range.bounds() {
        sql.push_str(&format!(" AND {column} BETWEEN ? AND ?"));
        bind_values.push(to_value(low));
        bind_values.push(to_value(high));
    }
}

fn parse_coil_row(row: &Row<'_>) -> RepoResult<Coil> {
    let id: CoilId = row.get("id")?;

    Ok(Coil {
        id,
        length: row.get("length")?,
        weight: row.get("weight")?,
        added_at: from_epoch_ms(row.get("added_at")?, "added_at", id)?,
        removed_at: row
            .get::<_, Option<i64>>("removed_at")?
            .map(|ms| from_epoch_ms(ms, "removed_at", id))
            .transpose()?,
        updated_at: row
            .get::<_, Option<i64>>("updated_at")?
            .map(|ms| from_epoch_ms(ms, "updated_at", id))
            .transpose()?,
    })
}

fn to_epoch_ms(value: DateTime<Utc>) -> i64 {
    value.timestamp_millis()
}

fn from_epoch_ms(ms: i64, column: &str, id: CoilId) -> RepoResult<DateTime<Utc>> {
    DateTime::from_timestamp_millis(ms).ok_or_else(|| {
        RepoError::InvalidData(format!(
            "timestamp `{ms}` out of range in coils.{column} for id {id}"
        ))
    })
}
