// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! # Vigil Store
//!
//! Shared state and configuration for the Vigil health monitor.
//!
//! This crate provides:
//!
//! - **ResultStore**: latest [`CheckResult`](vigil_core::CheckResult) per
//!   check name, safe for many writers and readers, with a watch channel
//!   that ticks on every update
//! - **QueryFacade**: the read-only surface served to external consumers
//! - **Config**: YAML configuration loading, defaulting and validation
//!
//! ## Usage
//!
//! ```ignore
//! use vigil_store::{Config, QueryFacade, ResultStore};
//!
//! let config = Config::load("config.yaml")?;
//! let store = ResultStore::new();
//! let facade = QueryFacade::new(store.clone());
//!
//! // Wait for the first result
//! let mut rx = store.subscribe();
//! rx.changed().await?;
//! println!("{:?}", facade.list_results().await);
//! ```

pub mod config;
pub mod error;
pub mod query;
pub mod store;

pub use config::{Config, DEFAULT_API_PORT, DEFAULT_CONFIG_PATH, DEFAULT_LOG_LEVEL, DEFAULT_SHUTDOWN_GRACE};
pub use error::StoreError;
pub use query::{QueryFacade, ServiceHealth};
pub use store::ResultStore;
