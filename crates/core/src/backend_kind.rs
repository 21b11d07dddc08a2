//! The closed set of supported backend products.
//!
//! Metric and index-type labels are backend-specific spellings and are
//! passed through to the adapters verbatim; they are never normalized
//! across backends ("cosine" vs "COSINE" vs "Cosine" is intentional).

use serde::{Deserialize, Serialize};

/// Identity of a vector database product.
///
/// Dispatch over backends is by this explicit tag; the set is fixed
/// and small, so there is no plugin loading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BackendKind {
    /// PostgreSQL with the pgvector extension
    PgVector,
    /// Milvus
    Milvus,
    /// QDrant
    Qdrant,
}

impl BackendKind {
    /// Display name used in results and logs.
    pub fn display_name(&self) -> &'static str {
        match self {
            BackendKind::PgVector => "PGvector",
            BackendKind::Milvus => "Milvus",
            BackendKind::Qdrant => "QDrant",
        }
    }

    /// Metric labels this product understands, in its own spelling.
    pub fn supported_metrics(&self) -> &'static [&'static str] {
        match self {
            BackendKind::PgVector => &["cosine", "l2"],
            BackendKind::Milvus => &["COSINE", "L2"],
            BackendKind::Qdrant => &["Cosine", "L2"],
        }
    }

    /// Index-type labels this product understands, in its own spelling.
    pub fn supported_index_types(&self) -> &'static [&'static str] {
        match self {
            BackendKind::PgVector => &["hnsw", "ivfflat"],
            BackendKind::Milvus => &["HNSW", "FLAT"],
            BackendKind::Qdrant => &["HNSW"],
        }
    }
}

impl std::fmt::Display for BackendKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.display_name())
    }
}
