//! # vectormark
//!
//! Benchmarking harness for vector database backends.
//!
//! vectormark drives PGVector, Milvus and QDrant through a common
//! workload — create a collection, bulk-insert a training dataset,
//! search a held-out test set — and records timing, storage footprint
//! and retrieval quality into one JSON report per run.
//!
//! ## Quick Start
//!
//! ```ignore
//! use vectormark::prelude::*;
//!
//! let mut config = RunConfig::new("train.csv", "test.csv", "result.json");
//! config.rounds = 3;
//! config.qdrant = Some(QdrantParams { url: "http://localhost:6333".into() });
//!
//! let report = Runner::new(config).run()?;
//! println!("{} backend(s) benchmarked", report.len());
//! ```
//!
//! ## Structure
//!
//! - [`vectormark_core`]: datasets, accuracy scoring, result records,
//!   report persistence and the error taxonomy
//! - [`vectormark_adapters`]: the [`VectorBackend`] capability
//!   contract and one adapter per product
//! - [`vectormark_runner`]: the grid-sweep orchestration core

#![warn(missing_docs)]

pub mod prelude;

// Re-export main entry points
pub use vectormark_runner::{Connector, RunConfig, Runner};

// Re-export the capability contract and adapters
pub use vectormark_adapters::{
    MemoryBackend, MilvusBackend, MilvusParams, PgParams, PgVectorBackend, QdrantBackend,
    QdrantParams, SearchHit, VectorBackend,
};

// Re-export core types
pub use vectormark_core::{
    accuracy_score, method_key, validate_compatible, BackendKind, BackendResult, BenchmarkReport,
    DataInfo, Dataset, Error, MethodResult, Result, SizeMeasure,
};
