//! Domain model for coil inventory.
//!
//! # Responsibility
//! - Define the coil record, its input shapes, and query value types.
//! - Validate caller input before it reaches storage.
//!
//! # Invariants
//! - Every coil is identified by a storage-assigned `CoilId`.
//! - Removal is a timestamp, never a physical delete.

pub mod coil;
pub mod range;
pub mod stats;
