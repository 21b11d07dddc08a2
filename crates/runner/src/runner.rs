//! Benchmark run orchestration.
//!
//! Drives the whole run: load and validate datasets, then for each
//! enabled backend connect → grid sweep → finalize → disconnect, and
//! finally persist the report. Fully sequential: one backend is
//! connected, swept and disconnected before the next begins, and the
//! active connection is owned exclusively by the sweep.

use std::time::Instant;

use tracing::{error, info, warn};

use vectormark_adapters::{
    MemoryBackend, MilvusBackend, PgVectorBackend, QdrantBackend, VectorBackend,
};
use vectormark_core::{
    report, validate_compatible, BackendKind, BenchmarkReport, Dataset, Error, Result,
};

use crate::config::RunConfig;
use crate::sweep::sweep_backend;

/// Produces a connected adapter for a backend kind.
///
/// The runner only ever holds one live connection at a time; the
/// connector is invoked per backend, in iteration order. Tests inject
/// stub connectors here.
pub trait Connector {
    /// Connect to the given backend.
    ///
    /// # Errors
    /// `Error::Connection` when the backend is unreachable; the runner
    /// skips that backend and continues.
    fn connect(&mut self, kind: BackendKind) -> Result<Box<dyn VectorBackend>>;
}

impl<F> Connector for F
where
    F: FnMut(BackendKind) -> Result<Box<dyn VectorBackend>>,
{
    fn connect(&mut self, kind: BackendKind) -> Result<Box<dyn VectorBackend>> {
        self(kind)
    }
}

/// Connector backed by the real product adapters, using the
/// connection parameters from the run configuration.
pub struct ProductConnector<'a> {
    config: &'a RunConfig,
}

impl Connector for ProductConnector<'_> {
    fn connect(&mut self, kind: BackendKind) -> Result<Box<dyn VectorBackend>> {
        let missing = |what: &str| Error::Connection {
            backend: kind.display_name().to_string(),
            message: format!("{what} parameters missing"),
        };
        match kind {
            BackendKind::PgVector => {
                let params = self.config.pgvector.as_ref().ok_or_else(|| missing("PGvector"))?;
                Ok(Box::new(PgVectorBackend::connect(params)?))
            }
            BackendKind::Milvus => {
                let params = self.config.milvus.as_ref().ok_or_else(|| missing("Milvus"))?;
                Ok(Box::new(MilvusBackend::connect(params)?))
            }
            BackendKind::Qdrant => {
                let params = self.config.qdrant.as_ref().ok_or_else(|| missing("QDrant"))?;
                Ok(Box::new(QdrantBackend::connect(params)?))
            }
        }
    }
}

/// The benchmark runner.
pub struct Runner {
    config: RunConfig,
}

impl Runner {
    /// Create a runner for one configured run.
    pub fn new(config: RunConfig) -> Self {
        Runner { config }
    }

    /// The configuration this runner was built with.
    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    /// Execute the run against the real product adapters.
    pub fn run(&self) -> Result<BenchmarkReport> {
        self.run_with(&mut ProductConnector {
            config: &self.config,
        })
    }

    /// Execute the run with a caller-supplied connector.
    ///
    /// Protocol:
    /// 1. Load both datasets and validate them — a dimension mismatch
    ///    or empty test set aborts before any connection is opened.
    /// 2. Per enabled backend: connect (a connection failure skips
    ///    that backend), sweep the grid, append the finalized record.
    ///    A per-round failure aborts only that backend's sweep.
    /// 3. Persist the report atomically, once, at the very end.
    pub fn run_with(&self, connector: &mut dyn Connector) -> Result<BenchmarkReport> {
        if self.config.rounds == 0 {
            return Err(Error::Internal("round count must be positive".to_string()));
        }

        let train = Dataset::load(&self.config.train_path)?;
        let test = Dataset::load(&self.config.test_path)?;
        validate_compatible(&train, &test)?;

        info!(
            train_vectors = train.rows(),
            test_vectors = test.rows(),
            dimension = train.dimension(),
            rounds = self.config.rounds,
            "starting benchmark"
        );

        let run_start = Instant::now();
        let mut benchmarks = BenchmarkReport::new();

        for kind in self.config.enabled_backends() {
            info!(backend = %kind, "connecting");
            let mut backend = match connector.connect(kind) {
                Ok(backend) => backend,
                Err(e) if e.is_connection() => {
                    warn!(backend = %kind, error = %e, "connection failed, skipping backend");
                    continue;
                }
                Err(e) => return Err(e),
            };

            match sweep_backend(
                backend.as_mut(),
                &self.config.collection_name,
                &train,
                &test,
                self.config.rounds,
            ) {
                Ok(result) => benchmarks.append(result),
                Err(e) if e.is_backend_scoped() => {
                    error!(backend = %kind, error = %e, "sweep aborted");
                    continue;
                }
                Err(e) => return Err(e),
            }
        }

        info!(
            elapsed_secs = run_start.elapsed().as_secs_f64(),
            backends = benchmarks.len(),
            "benchmark finished"
        );

        report::persist(&benchmarks, &self.config.destination)?;
        Ok(benchmarks)
    }

    /// Execute the run against the in-process brute-force backend
    /// instead of any product, useful as an accuracy baseline.
    pub fn run_baseline(&self) -> Result<BenchmarkReport> {
        if self.config.rounds == 0 {
            return Err(Error::Internal("round count must be positive".to_string()));
        }

        let train = Dataset::load(&self.config.train_path)?;
        let test = Dataset::load(&self.config.test_path)?;
        validate_compatible(&train, &test)?;

        let mut backend = MemoryBackend::new();
        let mut benchmarks = BenchmarkReport::new();
        benchmarks.append(sweep_backend(
            &mut backend,
            &self.config.collection_name,
            &train,
            &test,
            self.config.rounds,
        )?);

        report::persist(&benchmarks, &self.config.destination)?;
        Ok(benchmarks)
    }
}
