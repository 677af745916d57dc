//! Coil domain model.
//!
//! # Responsibility
//! - Define the canonical coil record and its create/patch inputs.
//! - Validate user-supplied dimensions at the input boundary.
//!
//! # Invariants
//! - `length` and `weight` are positive and finite for accepted input.
//! - `removed_at`, when set, is never earlier than `added_at`.
//! - Timestamps carry millisecond precision, matching persisted values.

use chrono::{DateTime, SubsecRound, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Storage-assigned coil identifier. Never reused.
pub type CoilId = i64;

/// One physical coil tracked by the warehouse.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Coil {
    pub id: CoilId,
    /// Meters.
    pub length: f64,
    /// Kilograms.
    pub weight: f64,
    pub added_at: DateTime<Utc>,
    /// `None` while the coil is still in inventory.
    pub removed_at: Option<DateTime<Utc>>,
    /// Set by every successful update call.
    pub updated_at: Option<DateTime<Utc>>,
}

/// Input for registering a new coil.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NewCoil {
    pub length: f64,
    pub weight: f64,
}

/// Partial update input. Absent fields keep their stored value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CoilPatch {
    pub length: Option<f64>,
    pub weight: Option<f64>,
}

/// Rejected coil dimensions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CoilValidationError {
    NonPositiveLength(f64),
    NonPositiveWeight(f64),
}

impl Display for CoilValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NonPositiveLength(value) => {
                write!(f, "length must be a positive number, got {value}")
            }
            Self::NonPositiveWeight(value) => {
                write!(f, "weight must be a positive number, got {value}")
            }
        }
    }
}

impl Error for CoilValidationError {}

impl NewCoil {
    pub fn new(length: f64, weight: f64) -> Self {
        Self { length, weight }
    }

    pub fn validate(&self) -> Result<(), CoilValidationError> {
        check_length(self.length)?;
        check_weight(self.weight)
    }
}

impl CoilPatch {
    pub fn length(length: f64) -> Self {
        Self {
            length: Some(length),
            weight: None,
        }
    }

    pub fn weight(weight: f64) -> Self {
        Self {
            length: None,
            weight: Some(weight),
        }
    }

    /// Validates only the fields that are present.
    pub fn validate(&self) -> Result<(), CoilValidationError> {
        if let Some(length) = self.length {
            check_length(length)?;
        }
        if let Some(weight) = self.weight {
            check_weight(weight)?;
        }
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        self.length.is_none() && self.weight.is_none()
    }
}

impl Coil {
    /// Time between arrival and removal, for removed coils only.
    pub fn storage_time(&self) -> Option<TimeDelta> {
        self.removed_at.map(|removed_at| removed_at - self.added_at)
    }
}

/// Current UTC time at storage precision.
pub fn now_utc() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(3)
}

fn check_length(value: f64) -> Result<(), CoilValidationError> {
    if is_positive_finite(value) {
        Ok(())
    } else {
        Err(CoilValidationError::NonPositiveLength(value))
    }
}

fn check_weight(value: f64) -> Result<(), CoilValidationError> {
    if is_positive_finite(value) {
        Ok(())
    } else {
        Err(CoilValidationError::NonPositiveWeight(value))
    }
}

fn is_positive_finite(value: f64) -> bool {
    value.is_finite() && value > 0.0
}
