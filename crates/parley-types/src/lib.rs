//! Shared domain types for Parley.
//!
//! This crate contains the types passed between the Parley layers:
//! application configuration, generation parameters, transcript turns, and
//! their associated error types.
//!
//! Zero infrastructure dependencies -- only serde and thiserror.

pub mod config;
pub mod error;
pub mod generation;
pub mod transcript;
