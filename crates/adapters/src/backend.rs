//! The backend capability contract.
//!
//! Every database product the harness can benchmark implements
//! [`VectorBackend`]. The runner drives the trait only; nothing in the
//! sweep loop knows which product is behind it. Connection happens in
//! each adapter's `connect` constructor, so a constructed adapter is
//! always live until `disconnect`.

use vectormark_core::{Dataset, Result, SizeMeasure};

/// The single nearest neighbor returned by a search.
///
/// `vector` is the originally-inserted payload for `id`, fetched back
/// from the backend so the accuracy score compares what the database
/// actually stored against the query.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchHit {
    /// Backend-assigned identifier of the stored vector
    pub id: u64,
    /// The stored vector payload
    pub vector: Vec<f32>,
}

/// Uniform capability set every backend adapter provides.
///
/// Contracts the runner relies on:
/// - `create_collection` is idempotent by convention: the caller
///   always drops any pre-existing collection of the same name first.
/// - `bulk_insert` assigns or preserves an identifier per vector
///   sufficient to fetch back the exact stored payload from a search
///   hit.
/// - `drop_collection` succeeds whether or not the collection exists.
/// - `disconnect` is called exactly once per backend per run, after
///   the full grid sweep.
pub trait VectorBackend {
    /// Display name for results and logs.
    fn name(&self) -> &str;

    /// Metric labels this backend understands, in its own spelling.
    /// Passed through verbatim to the other trait methods.
    fn supported_metrics(&self) -> &[&str];

    /// Index-type labels this backend understands, in its own
    /// spelling.
    fn supported_index_types(&self) -> &[&str];

    /// Create a collection for vectors of the given dimension.
    ///
    /// # Errors
    /// `Error::Schema` on metric/index combinations the backend does
    /// not support.
    fn create_collection(
        &mut self,
        name: &str,
        dimension: usize,
        metric: &str,
        index_type: &str,
    ) -> Result<()>;

    /// Insert every vector of `dataset`, returning the inserted count.
    ///
    /// # Errors
    /// `Error::Insert` on any row rejection; the round that triggered
    /// it is treated as failed.
    fn bulk_insert(&mut self, name: &str, dataset: &Dataset) -> Result<usize>;

    /// Whether this backend requires an explicit [`build_index`] call
    /// after insert for the given index type.
    ///
    /// This is a per-adapter policy, never inferred from label strings
    /// by the caller: PGVector defers only its batch index (ivfflat),
    /// Milvus always builds explicitly, QDrant indexes eagerly.
    ///
    /// [`build_index`]: VectorBackend::build_index
    fn needs_explicit_build(&self, index_type: &str) -> bool;

    /// Explicit index construction. A no-op is a valid implementation
    /// for backends that index at insert or creation time.
    fn build_index(&mut self, name: &str, metric: &str, index_type: &str) -> Result<()>;

    /// Backend-reported storage footprint of the collection. The
    /// representation is backend-defined (numeric or descriptive).
    fn size_of(&mut self, name: &str) -> Result<SizeMeasure>;

    /// Single-query nearest-neighbor search (k = 1).
    ///
    /// # Errors
    /// `Error::Search` if the collection is empty or the backend
    /// reports no results.
    fn search(&mut self, name: &str, query: &[f32], metric: &str) -> Result<SearchHit>;

    /// Drop the collection. Idempotent.
    fn drop_collection(&mut self, name: &str) -> Result<()>;

    /// Release the connection.
    fn disconnect(&mut self) -> Result<()>;
}
