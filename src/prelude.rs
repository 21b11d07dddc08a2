//! Convenience re-exports for typical harness usage.
//!
//! ```ignore
//! use vectormark::prelude::*;
//! ```

pub use vectormark_adapters::{
    MemoryBackend, MilvusParams, PgParams, QdrantParams, SearchHit, VectorBackend,
};
pub use vectormark_core::{
    BackendKind, BackendResult, BenchmarkReport, Dataset, Error, MethodResult, Result, SizeMeasure,
};
pub use vectormark_runner::{RunConfig, Runner};
