//! Domain models for Vigil.
//!
//! ## Submodules
//!
//! - [`check`] - Check specification types (`CheckKind`, `CheckSpec`)
//! - [`result`] - Result types (`CheckStatus`, `ProbeOutcome`, `CheckResult`)
//! - [`duration`] - Serde helpers for human-readable durations

mod check;
pub mod duration;
mod result;

pub use check::{CheckKind, CheckSpec, DEFAULT_EXPECTED_STATUS, DEFAULT_INTERVAL, DEFAULT_TIMEOUT};
pub use result::{CheckResult, CheckStatus, ProbeOutcome};
