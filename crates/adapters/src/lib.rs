//! Backend adapters for vectormark.
//!
//! One adapter per supported database product, all implementing the
//! [`VectorBackend`] capability contract the runner drives:
//!
//! - [`PgVectorBackend`]: PostgreSQL + pgvector over a synchronous
//!   client
//! - [`MilvusBackend`]: Milvus v2 RESTful API
//! - [`QdrantBackend`]: QDrant REST API
//! - [`MemoryBackend`]: in-process brute-force reference
//!
//! Adapters are thin I/O wrappers; all benchmark semantics (timing,
//! accuracy, aggregation) live in the runner.

#![warn(missing_docs)]

pub mod backend;
pub mod memory;
pub mod milvus;
pub mod pgvector;
pub mod qdrant;

pub use backend::{SearchHit, VectorBackend};
pub use memory::MemoryBackend;
pub use milvus::{MilvusBackend, MilvusParams};
pub use pgvector::{PgParams, PgVectorBackend};
pub use qdrant::{QdrantBackend, QdrantParams};
