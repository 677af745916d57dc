//! Coil use-case service.
//!
//! # Responsibility
//! - Provide create/get/update/remove/list entry points for transports.
//! - Validate dimensions before anything reaches the repository.
//! - Run updates and removals as single guarded writes, then read back.
//!
//! # Invariants
//! - `update` stamps `updated_at` on every successful call, including calls
//!   that change no field. Existing clients may rely on this.
//! - `remove` is not idempotent: a second call reports `AlreadyRemoved`.

use crate::model::coil::{now_utc, Coil, CoilId, CoilPatch, CoilValidationError, NewCoil};
use crate::model::range::CoilFilter;
use crate::repo::coil_repo::{CoilRepository, RepoError};
use chrono::{DateTime, Utc};
use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Service error for coil use-cases.
#[derive(Debug)]
pub enum CoilServiceError {
    /// Non-positive or non-finite length/weight.
    Validation(CoilValidationError),
    /// No coil with this id.
    NotFound(CoilId),
    /// The coil already carries a removal timestamp.
    AlreadyRemoved {
        id: CoilId,
        removed_at: DateTime<Utc>,
    },
    /// Persistence-layer failure, passed through unmodified.
    Repo(RepoError),
}

impl Display for CoilServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "coil not found: {id}"),
            Self::AlreadyRemoved { id, removed_at } => write!(
                f,
                "coil {id} was already removed at {}",
                removed_at.to_rfc3339()
            ),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for CoilServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for CoilServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound(id) => Self::NotFound(id),
            other => Self::Repo(other),
        }
    }
}

impl From<CoilValidationError> for CoilServiceError {
    fn from(value: CoilValidationError) -> Self {
        Self::Validation(value)
    }
}

pub type CoilServiceResult<T> = Result<T, CoilServiceError>;

/// Coil service facade over repository implementations.
pub struct CoilService<R: CoilRepository> {
    repo: R,
}

impl<R: CoilRepository> CoilService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Registers a coil arriving now.
    pub fn create(&self, input: &NewCoil) -> CoilServiceResult<Coil> {
        input.validate()?;
        let coil = self.repo.insert_coil(input, now_utc())?;
        info!(
            "event=coil_create module=service status=ok coil_id={}",
            coil.id
        );
        Ok(coil)
    }

    pub fn get_by_id(&self, id: CoilId) -> CoilServiceResult<Coil> {
        self.fetch(id)
    }

    /// Applies the present fields of `patch` and stamps `updated_at`.
    ///
    /// Returns the stored record after the write, so a removal made by
    /// another writer in the meantime is reflected.
    pub fn update(&self, id: CoilId, patch: &CoilPatch) -> CoilServiceResult<Coil> {
        patch.validate()?;
        self.repo.apply_patch(id, patch, now_utc())?;
        let updated = self.fetch(id)?;
        info!(
            "event=coil_update module=service status=ok coil_id={} empty_patch={}",
            id,
            patch.is_empty()
        );
        Ok(updated)
    }

    /// Marks the coil as removed from inventory now.
    pub fn remove(&self, id: CoilId) -> CoilServiceResult<Coil> {
        if self.repo.mark_removed(id, now_utc())? {
            let removed = self.fetch(id)?;
            info!(
                "event=coil_remove module=service status=ok coil_id={}",
                id
            );
            return Ok(removed);
        }

        match self.fetch(id)?.removed_at {
            Some(removed_at) => {
                warn!(
                    "event=coil_remove module=service status=rejected coil_id={} error_code=already_removed",
                    id
                );
                Err(CoilServiceError::AlreadyRemoved { id, removed_at })
            }
            None => Err(CoilServiceError::Repo(RepoError::InvalidData(format!(
                "coil {id} is active but could not be marked removed"
            )))),
        }
    }

    /// Lists coils matching every present range, ordered by id.
    pub fn list(&self, filter: &CoilFilter) -> CoilServiceResult<Vec<Coil>> {
        Ok(self.repo.list_coils(filter)?)
    }

    fn fetch(&self, id: CoilId) -> CoilServiceResult<Coil> {
        self.repo
            .get_coil(id)?
            .ok_or(CoilServiceError::NotFound(id))
    }
}
