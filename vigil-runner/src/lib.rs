// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! # Vigil Runner
//!
//! The check scheduler.
//!
//! [`Runner::start`] spawns one task per [`CheckSpec`](vigil_core::CheckSpec).
//! Each task probes immediately, records the result, then waits for either
//! its next tick or the shared cancellation token. Loops share nothing but
//! the [`ResultStore`](vigil_store::ResultStore).
//!
//! [`Runner::shutdown`] cancels every loop at once and waits, up to a grace
//! period, for all of them to exit.
//!
//! ```ignore
//! let runner = Runner::start(config.checks, Arc::new(Prober::new()?), store.clone())?;
//! // ... serve queries ...
//! let report = runner.shutdown(Duration::from_secs(10)).await;
//! assert_eq!(report.aborted, 0);
//! ```

pub mod attempt;
pub mod error;
pub mod runner;
pub mod state;

pub use attempt::execute_attempt;
pub use error::RunnerError;
pub use runner::{Runner, ShutdownReport};
pub use state::LoopState;
