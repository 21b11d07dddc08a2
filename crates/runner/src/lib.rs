//! Benchmark orchestration core for vectormark.
//!
//! The runner sweeps each enabled backend across the cross-product of
//! its supported index types and metrics, repeats every cell for the
//! configured number of rounds, averages the rounds and persists one
//! JSON report per run.
//!
//! Lifecycle per backend: connect → sweep grid → finalize record →
//! disconnect. Fully sequential; the single active connection is owned
//! exclusively by the sweep that uses it.

#![warn(missing_docs)]

pub mod config;
pub mod runner;
pub mod sweep;

pub use config::{RunConfig, DEFAULT_COLLECTION};
pub use runner::{Connector, ProductConnector, Runner};
pub use sweep::sweep_backend;
