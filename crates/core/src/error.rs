//! Unified error types for vectormark.
//!
//! One canonical error enum covers the whole taxonomy: dataset loading,
//! pre-sweep validation, per-backend connection failures and per-round
//! sweep failures. Nothing is retried and nothing is recovered
//! automatically; errors propagate to the runner, which decides whether
//! a failure is fatal for one backend or for the whole run.

use thiserror::Error;

/// All vectormark errors.
#[derive(Debug, Error)]
pub enum Error {
    /// Dataset file missing, malformed, ragged or non-numeric.
    #[error("failed to load dataset {path}: {message}")]
    DataLoad {
        /// Path of the offending file
        path: String,
        /// What went wrong, with row/column coordinates where known
        message: String,
    },

    /// Training and test datasets disagree on vector dimension.
    /// Fatal before any backend connection is opened.
    #[error("dimension mismatch: training is {train}-dim, test is {test}-dim")]
    DimensionMismatch {
        /// Training dataset dimension
        train: usize,
        /// Test dataset dimension
        test: usize,
    },

    /// Could not connect to a backend. Fatal for that backend only;
    /// the run continues with the remaining backends.
    #[error("connection to {backend} failed: {message}")]
    Connection {
        /// Backend display name
        backend: String,
        /// Driver-reported reason
        message: String,
    },

    /// Backend rejected a collection definition (unsupported
    /// metric/index combination, bad dimension, ...).
    #[error("schema error: {0}")]
    Schema(String),

    /// Backend rejected one or more rows during bulk insert.
    #[error("insert error: {0}")]
    Insert(String),

    /// Search returned no results or the collection is empty.
    #[error("search error: {0}")]
    Search(String),

    /// The test dataset has zero vectors; the similarity phase would
    /// be undefined. Checked once, before any sweep begins.
    #[error("test dataset is empty; similarity phase would be undefined")]
    EmptyTestSet,

    /// A per-round failure with its full sweep coordinate. Aborts the
    /// affected backend's sweep.
    #[error("{backend} sweep failed at {index_type}+{metric}, round {round}: {source}")]
    Sweep {
        /// Backend display name
        backend: String,
        /// Index-type label (backend spelling)
        index_type: String,
        /// Metric label (backend spelling)
        metric: String,
        /// 1-based round number
        round: usize,
        /// The underlying failure
        #[source]
        source: Box<Error>,
    },

    /// Invariant violation (bug or invalid configuration such as a
    /// zero round count).
    #[error("internal error: {0}")]
    Internal(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Report serialization error
    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Result type for vectormark operations.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Wrap a per-round failure with its sweep coordinate.
    pub fn at_sweep(
        self,
        backend: &str,
        index_type: &str,
        metric: &str,
        round: usize,
    ) -> Self {
        Error::Sweep {
            backend: backend.to_string(),
            index_type: index_type.to_string(),
            metric: metric.to_string(),
            round,
            source: Box::new(self),
        }
    }

    /// Check if this failure is scoped to a single backend (the run
    /// continues with the remaining backends).
    pub fn is_backend_scoped(&self) -> bool {
        matches!(
            self,
            Error::Connection { .. }
                | Error::Sweep { .. }
                | Error::Schema(_)
                | Error::Insert(_)
                | Error::Search(_)
        )
    }

    /// Check if this is a connection failure.
    pub fn is_connection(&self) -> bool {
        matches!(self, Error::Connection { .. })
    }

    /// Check if this is an invariant violation.
    pub fn is_internal(&self) -> bool {
        matches!(self, Error::Internal(_))
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}
