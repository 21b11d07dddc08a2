//! Run configuration.
//!
//! Immutable input to a benchmark run: dataset paths, the working
//! collection name, the round count, the report destination and
//! whatever backend connection parameters the caller provides. A
//! backend takes part in the sweep iff its parameters are present and
//! non-empty.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use vectormark_adapters::{MilvusParams, PgParams, QdrantParams};
use vectormark_core::BackendKind;

/// Default name of the scratch collection every backend is swept with.
pub const DEFAULT_COLLECTION: &str = "vector_benchmark_test";

/// Immutable configuration of one benchmark run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunConfig {
    /// Training dataset CSV
    pub train_path: PathBuf,
    /// Held-out test dataset CSV
    pub test_path: PathBuf,
    /// Rounds per (index type, metric) grid cell
    pub rounds: usize,
    /// Name of the scratch collection
    pub collection_name: String,
    /// Report destination
    pub destination: PathBuf,
    /// PGVector connection parameters, if that backend should run
    pub pgvector: Option<PgParams>,
    /// Milvus connection parameters, if that backend should run
    pub milvus: Option<MilvusParams>,
    /// QDrant connection parameters, if that backend should run
    pub qdrant: Option<QdrantParams>,
}

impl RunConfig {
    /// A configuration with no backends enabled and the default
    /// collection name, one round, and the given paths.
    pub fn new(
        train_path: impl Into<PathBuf>,
        test_path: impl Into<PathBuf>,
        destination: impl Into<PathBuf>,
    ) -> Self {
        RunConfig {
            train_path: train_path.into(),
            test_path: test_path.into(),
            rounds: 1,
            collection_name: DEFAULT_COLLECTION.to_string(),
            destination: destination.into(),
            pgvector: None,
            milvus: None,
            qdrant: None,
        }
    }

    /// Backends taking part in this run, in the fixed iteration order
    /// QDrant, Milvus, PGVector.
    pub fn enabled_backends(&self) -> Vec<BackendKind> {
        let mut enabled = Vec::new();
        if self.qdrant.as_ref().is_some_and(QdrantParams::is_configured) {
            enabled.push(BackendKind::Qdrant);
        }
        if self.milvus.as_ref().is_some_and(MilvusParams::is_configured) {
            enabled.push(BackendKind::Milvus);
        }
        if self.pgvector.as_ref().is_some_and(PgParams::is_configured) {
            enabled.push(BackendKind::PgVector);
        }
        enabled
    }
}
