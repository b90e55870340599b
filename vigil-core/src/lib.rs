// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! # Vigil Core
//!
//! Core types and models for the Vigil service-health monitor.
//!
//! This crate provides the foundational abstractions used across all other
//! Vigil crates:
//!
//! - Domain models (check specifications, results, probe outcomes)
//! - Error types
//! - Duration (de)serialization helpers shared by configuration and output
//!
//! ## Key Types
//!
//! ### Check Types
//! - [`CheckKind`] - Which probe strategy a check uses
//! - [`CheckSpec`] - Identity and parameters of one monitored target
//!
//! ### Result Types
//! - [`CheckStatus`] - Up / Down / Unknown
//! - [`ProbeOutcome`] - Status plus diagnostic message from one probe attempt
//! - [`CheckResult`] - Latest observed outcome for a check, timestamped

pub mod error;
pub mod models;

// Re-export error types
pub use error::CoreError;

// Re-export all model types
pub use models::{
    // Check types
    CheckKind,
    CheckSpec,
    DEFAULT_EXPECTED_STATUS,
    DEFAULT_INTERVAL,
    DEFAULT_TIMEOUT,
    // Result types
    CheckResult,
    CheckStatus,
    ProbeOutcome,
    // Serde helpers
    duration,
};
