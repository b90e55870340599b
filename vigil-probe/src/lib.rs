// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! # Vigil Probe
//!
//! Probe strategies for the Vigil health monitor.
//!
//! A probe takes one [`CheckSpec`](vigil_core::CheckSpec), performs a single
//! connectivity/health attempt bounded by the spec's timeout, and returns a
//! [`ProbeOutcome`](vigil_core::ProbeOutcome). Probes never return errors to
//! the caller: every failure becomes a `Down` outcome with the error text as
//! its message.
//!
//! ## Strategies
//!
//! - [`http::HttpProbe`] - GET a URL and compare the status code
//! - [`tcp::TcpProbe`] - Open (and immediately close) a TCP connection
//! - [`control_plane::ControlPlaneProbe`] - Query a cluster's `/healthz`
//!
//! ## Dispatch
//!
//! [`Prober`] owns one instance of each strategy and picks one by matching
//! on [`CheckKind`](vigil_core::CheckKind). Unsupported kinds produce an
//! `Unknown` outcome.
//!
//! ## Example
//!
//! ```ignore
//! use vigil_core::{CheckKind, CheckSpec};
//! use vigil_probe::Prober;
//!
//! let prober = Prober::new()?;
//! let spec = CheckSpec::new("db", CheckKind::Tcp, "localhost:5432");
//! let outcome = prober.probe(&spec).await;
//! println!("{}: {}", outcome.status, outcome.message);
//! ```

pub mod client;
pub mod control_plane;
pub mod error;
pub mod http;
pub mod prober;
pub mod tcp;

// Errors
pub use error::ProbeError;

// Strategies
pub use control_plane::{
    ClusterAuth, ClusterConfig, ConfigSource, ControlPlaneClient, ControlPlaneProbe, KubeClient,
};
pub use http::HttpProbe;
pub use tcp::TcpProbe;

// Dispatch
pub use client::HttpClient;
pub use prober::Prober;
