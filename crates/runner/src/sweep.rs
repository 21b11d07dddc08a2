//! The per-backend grid sweep and per-round timing protocol.
//!
//! This is the measurement core. For one backend, the sweep iterates
//! the cross-product of its supported index types and metrics, repeats
//! each cell for the configured number of rounds and averages the
//! rounds into one [`MethodResult`] per cell.
//!
//! Timing protocol per round (the parts that make results comparable
//! across backends, reproduced exactly):
//!
//! - the preceding `drop_collection` is not timed;
//! - `create_collection` is timed alone, in seconds;
//! - the insert window opens before `bulk_insert` and closes after
//!   the optional explicit `build_index`, so deferred indexing cost is
//!   charged to insert throughput; the recorded value is vectors per
//!   second, not wall-clock, so datasets of different sizes stay
//!   comparable;
//! - the similarity window covers the whole query loop; queries per
//!   second;
//! - accuracy is the mean per-query score of the retrieved vector
//!   against the query vector under the active metric.

use std::time::Instant;

use tracing::{debug, info};

use vectormark_adapters::VectorBackend;
use vectormark_core::{
    accuracy_score, method_key, BackendResult, Dataset, Error, MethodAccumulator, Result,
    RoundSample,
};

/// Sweep one connected backend across its full grid.
///
/// Consumes the backend's connection: on success the collection has
/// been dropped and the backend disconnected, per the lifecycle
/// contract (connect at sweep start, disconnect at sweep end).
///
/// # Errors
/// Per-round failures come back as `Error::Sweep` carrying the
/// (backend, index type, metric, round) coordinate; the sweep is
/// aborted at that point and the backend is disconnected best-effort.
pub fn sweep_backend(
    backend: &mut dyn VectorBackend,
    collection: &str,
    train: &Dataset,
    test: &Dataset,
    rounds: usize,
) -> Result<BackendResult> {
    if rounds == 0 {
        return Err(Error::Internal("round count must be positive".to_string()));
    }

    let name = backend.name().to_string();
    let mut result = BackendResult::new(&name, train.info(), test.info(), rounds);
    let index_types: Vec<String> = backend
        .supported_index_types()
        .iter()
        .map(|s| s.to_string())
        .collect();
    let metrics: Vec<String> = backend
        .supported_metrics()
        .iter()
        .map(|s| s.to_string())
        .collect();

    let sweep_outcome: Result<()> = (|| {
        for index_type in &index_types {
            for metric in &metrics {
                info!(backend = %name, index_type, metric, "sweeping grid cell");
                let mut accumulator = MethodAccumulator::new();
                for round in 1..=rounds {
                    let round_start = Instant::now();
                    let sample = run_round(backend, collection, train, test, metric, index_type)
                        .map_err(|e| e.at_sweep(&name, index_type, metric, round))?;
                    accumulator.record(sample);
                    info!(
                        backend = %name,
                        round,
                        elapsed_secs = round_start.elapsed().as_secs_f64(),
                        "round finished"
                    );
                }
                result.insert_method(method_key(index_type, metric), accumulator.finalize(rounds)?);
            }
        }
        Ok(())
    })();

    // The scratch collection and the connection are released whether
    // or not the sweep completed.
    let dropped = backend.drop_collection(collection);
    let disconnected = backend.disconnect();
    sweep_outcome?;
    dropped?;
    disconnected?;

    Ok(result)
}

/// One round of create → insert → (build) → measure → search.
fn run_round(
    backend: &mut dyn VectorBackend,
    collection: &str,
    train: &Dataset,
    test: &Dataset,
    metric: &str,
    index_type: &str,
) -> Result<RoundSample> {
    backend.drop_collection(collection)?;

    let create_start = Instant::now();
    backend.create_collection(collection, train.dimension(), metric, index_type)?;
    let create_time = create_start.elapsed().as_secs_f64();

    let insert_start = Instant::now();
    let inserted = backend.bulk_insert(collection, train)?;
    if backend.needs_explicit_build(index_type) {
        debug!(collection, index_type, "building index");
        backend.build_index(collection, metric, index_type)?;
    }
    let insert_throughput = inserted as f64 / insert_start.elapsed().as_secs_f64();

    let size = backend.size_of(collection)?;

    let search_start = Instant::now();
    let mut distance_total = 0.0;
    for query in test.vectors() {
        let hit = backend.search(collection, query, metric)?;
        distance_total += accuracy_score(&hit.vector, query, metric);
    }
    let similarity_throughput = test.rows() as f64 / search_start.elapsed().as_secs_f64();

    Ok(RoundSample {
        create_time,
        insert_throughput,
        similarity_throughput,
        size,
        mean_distance: distance_total / test.rows() as f64,
    })
}
