//! Core types for the vectormark benchmarking harness.
//!
//! This crate holds everything the benchmark core needs that is not
//! backend- or orchestration-specific:
//!
//! - [`Dataset`]: in-memory numeric vector matrices loaded from CSV
//! - [`BackendKind`]: the closed set of supported products with their
//!   verbatim metric/index-type grids
//! - [`accuracy`]: the retrieval-quality scoring kernel and method
//!   keys
//! - [`result`]: per-cell accumulators and the report record types
//! - [`report`]: atomic report persistence
//! - [`Error`]/[`Result`]: the unified error taxonomy

#![warn(missing_docs)]

pub mod accuracy;
pub mod backend_kind;
pub mod dataset;
pub mod error;
pub mod report;
pub mod result;

pub use accuracy::{accuracy_score, method_key};
pub use backend_kind::BackendKind;
pub use dataset::{validate_compatible, DataInfo, Dataset};
pub use error::{Error, Result};
pub use result::{
    BackendResult, BenchmarkReport, MethodAccumulator, MethodResult, RoundSample, SizeMeasure,
};
