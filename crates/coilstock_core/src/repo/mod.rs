//! Repository layer contracts and persistence implementations.
//!
//! # Responsibility
//! - Define the data access primitives the coil services build on.
//! - Keep SQL details out of service/business orchestration.
//!
//! # Invariants
//! - Repositories persist values as given; input validation happens in the
//!   service layer before any write.
//! - Lookups by id report absence as `Ok(None)`, writes to a missing id as
//!   `RepoError::NotFound`.

pub mod coil_repo;
