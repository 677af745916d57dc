//! Core use-case services.
//!
//! # Responsibility
//! - Validate caller input and orchestrate repository primitives.
//! - Map storage outcomes to the typed errors callers dispatch on.

pub mod coil_service;
pub mod stats_service;
