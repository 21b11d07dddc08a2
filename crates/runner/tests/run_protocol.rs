//! End-to-end tests of the run protocol against stub backends.

use std::cell::Cell;
use std::io::Write;
use std::path::PathBuf;
use std::rc::Rc;

use tempfile::TempDir;

use vectormark_adapters::{MemoryBackend, SearchHit, VectorBackend};
use vectormark_core::{BackendKind, Dataset, Error, Result, SizeMeasure};
use vectormark_runner::{RunConfig, Runner};

fn write_csv(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    let mut file = std::fs::File::create(&path).unwrap();
    file.write_all(content.as_bytes()).unwrap();
    path
}

fn config_in(dir: &TempDir, train: &str, test: &str) -> RunConfig {
    let train_path = write_csv(dir, "train.csv", train);
    let test_path = write_csv(dir, "test.csv", test);
    RunConfig::new(train_path, test_path, dir.path().join("result.json"))
}

const TRAIN: &str = "x,y\n1.0,0.0\n0.0,1.0\n1.0,1.0\n";
const TEST: &str = "x,y\n1.0,0.0\n0.5,0.5\n";

/// Always answers a search with the query vector itself.
struct EchoBackend {
    rows: usize,
}

impl VectorBackend for EchoBackend {
    fn name(&self) -> &str {
        "Echo"
    }
    fn supported_metrics(&self) -> &[&str] {
        &["cosine", "l2"]
    }
    fn supported_index_types(&self) -> &[&str] {
        &["flat"]
    }
    fn create_collection(&mut self, _: &str, _: usize, _: &str, _: &str) -> Result<()> {
        Ok(())
    }
    fn bulk_insert(&mut self, _: &str, dataset: &Dataset) -> Result<usize> {
        self.rows = dataset.rows();
        Ok(dataset.rows())
    }
    fn needs_explicit_build(&self, _: &str) -> bool {
        false
    }
    fn build_index(&mut self, _: &str, _: &str, _: &str) -> Result<()> {
        Ok(())
    }
    fn size_of(&mut self, _: &str) -> Result<SizeMeasure> {
        Ok(SizeMeasure::from(self.rows as u64))
    }
    fn search(&mut self, _: &str, query: &[f32], _: &str) -> Result<SearchHit> {
        Ok(SearchHit {
            id: 0,
            vector: query.to_vec(),
        })
    }
    fn drop_collection(&mut self, _: &str) -> Result<()> {
        Ok(())
    }
    fn disconnect(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Healthy until search, then always fails.
struct BrokenSearchBackend;

impl VectorBackend for BrokenSearchBackend {
    fn name(&self) -> &str {
        "Broken"
    }
    fn supported_metrics(&self) -> &[&str] {
        &["l2"]
    }
    fn supported_index_types(&self) -> &[&str] {
        &["flat"]
    }
    fn create_collection(&mut self, _: &str, _: usize, _: &str, _: &str) -> Result<()> {
        Ok(())
    }
    fn bulk_insert(&mut self, _: &str, dataset: &Dataset) -> Result<usize> {
        Ok(dataset.rows())
    }
    fn needs_explicit_build(&self, _: &str) -> bool {
        false
    }
    fn build_index(&mut self, _: &str, _: &str, _: &str) -> Result<()> {
        Ok(())
    }
    fn size_of(&mut self, _: &str) -> Result<SizeMeasure> {
        Ok(SizeMeasure::from(0u64))
    }
    fn search(&mut self, _: &str, _: &[f32], _: &str) -> Result<SearchHit> {
        Err(Error::Search("simulated outage".to_string()))
    }
    fn drop_collection(&mut self, _: &str) -> Result<()> {
        Ok(())
    }
    fn disconnect(&mut self) -> Result<()> {
        Ok(())
    }
}

fn enable_all(config: &mut RunConfig) {
    config.qdrant = Some(vectormark_adapters::QdrantParams {
        url: "http://localhost:6333".into(),
    });
    config.milvus = Some(vectormark_adapters::MilvusParams {
        url: "http://localhost:19530".into(),
    });
    config.pgvector = Some(vectormark_adapters::PgParams {
        dbname: "postgres".into(),
        user: "postgres".into(),
        password: String::new(),
        host: "localhost".into(),
        port: 5432,
    });
}

#[test]
fn echo_backend_scores_perfectly_under_both_metrics() {
    let dir = TempDir::new().unwrap();
    let mut config = config_in(&dir, TRAIN, TEST);
    config.rounds = 2;
    enable_all(&mut config);

    let runner = Runner::new(config);
    let report = runner
        .run_with(&mut |_kind: BackendKind| {
            Ok(Box::new(EchoBackend { rows: 0 }) as Box<dyn VectorBackend>)
        })
        .unwrap();

    // One entry per enabled backend, all driven by the echo stub.
    assert_eq!(report.len(), 3);
    for entry in report.iter() {
        assert_eq!(entry.rounds, 2);
        let cosine = &entry.methods["FLAT+COSINE"];
        assert!((cosine.total_distance - 1.0).abs() < 1e-9);
        let l2 = &entry.methods["FLAT+L2"];
        assert_eq!(l2.total_distance, 0.0);
    }
}

#[test]
fn dimension_mismatch_aborts_before_any_connection() {
    let dir = TempDir::new().unwrap();
    let mut config = config_in(&dir, "a,b,c\n1,2,3\n", "a,b\n1,2\n");
    enable_all(&mut config);

    let connections = Rc::new(Cell::new(0usize));
    let counter = Rc::clone(&connections);

    let runner = Runner::new(config);
    let err = runner
        .run_with(&mut move |_kind: BackendKind| {
            counter.set(counter.get() + 1);
            Ok(Box::new(MemoryBackend::new()) as Box<dyn VectorBackend>)
        })
        .unwrap_err();

    assert!(matches!(
        err,
        Error::DimensionMismatch { train: 3, test: 2 }
    ));
    assert_eq!(connections.get(), 0);
}

#[test]
fn empty_test_set_fails_fast() {
    let dir = TempDir::new().unwrap();
    let mut config = config_in(&dir, TRAIN, "x,y\n");
    enable_all(&mut config);

    let runner = Runner::new(config);
    let err = runner
        .run_with(&mut |_kind: BackendKind| {
            Ok(Box::new(MemoryBackend::new()) as Box<dyn VectorBackend>)
        })
        .unwrap_err();
    assert!(matches!(err, Error::EmptyTestSet));
}

#[test]
fn zero_rounds_is_an_invariant_error() {
    let dir = TempDir::new().unwrap();
    let mut config = config_in(&dir, TRAIN, TEST);
    config.rounds = 0;
    enable_all(&mut config);

    let runner = Runner::new(config);
    let err = runner
        .run_with(&mut |_kind: BackendKind| {
            Ok(Box::new(MemoryBackend::new()) as Box<dyn VectorBackend>)
        })
        .unwrap_err();
    assert!(err.is_internal());
}

#[test]
fn unreachable_backend_is_skipped_and_the_rest_complete() {
    let dir = TempDir::new().unwrap();
    let mut config = config_in(&dir, TRAIN, TEST);
    enable_all(&mut config);

    let runner = Runner::new(config);
    let report = runner
        .run_with(&mut |kind: BackendKind| {
            if kind == BackendKind::Milvus {
                Err(Error::Connection {
                    backend: kind.display_name().to_string(),
                    message: "connection refused".to_string(),
                })
            } else {
                Ok(Box::new(MemoryBackend::new()) as Box<dyn VectorBackend>)
            }
        })
        .unwrap();

    // QDrant and PGvector slots completed (both via the memory stub),
    // Milvus was skipped.
    assert_eq!(report.len(), 2);
}

#[test]
fn mid_sweep_failure_aborts_only_that_backend() {
    let dir = TempDir::new().unwrap();
    let mut config = config_in(&dir, TRAIN, TEST);
    enable_all(&mut config);

    let runner = Runner::new(config);
    let report = runner
        .run_with(&mut |kind: BackendKind| {
            if kind == BackendKind::Qdrant {
                Ok(Box::new(BrokenSearchBackend) as Box<dyn VectorBackend>)
            } else {
                Ok(Box::new(EchoBackend { rows: 0 }) as Box<dyn VectorBackend>)
            }
        })
        .unwrap();

    // The broken backend produced no entry; the other two finished.
    assert_eq!(report.len(), 2);
    for entry in report.iter() {
        assert_eq!(entry.name, "Echo");
    }
}

#[test]
fn report_file_matches_wire_format() {
    let dir = TempDir::new().unwrap();
    let mut config = config_in(&dir, TRAIN, TEST);
    config.rounds = 1;
    enable_all(&mut config);
    let destination = config.destination.clone();

    let runner = Runner::new(config);
    runner
        .run_with(&mut |_kind: BackendKind| {
            Ok(Box::new(MemoryBackend::new()) as Box<dyn VectorBackend>)
        })
        .unwrap();

    let raw = std::fs::read_to_string(destination).unwrap();
    let json: serde_json::Value = serde_json::from_str(&raw).unwrap();
    let entries = json.as_array().unwrap();
    assert_eq!(entries.len(), 3);

    let entry = &entries[0];
    assert_eq!(entry["Name"], "Memory");
    assert_eq!(entry["Train-Data-info"]["#vector"], 3);
    assert_eq!(entry["Train-Data-info"]["dimension"], 2);
    assert_eq!(entry["Test-Data-info"]["#vector"], 2);
    assert_eq!(entry["Test round"], 1);
    let method = &entry["Methods"]["FLAT+L2"];
    for field in [
        "create_time",
        "insert_time",
        "similarity_time",
        "size",
        "total_distance",
    ] {
        assert!(method.get(field).is_some(), "missing field {field}");
    }
}

#[test]
fn baseline_run_uses_memory_backend() {
    let dir = TempDir::new().unwrap();
    let mut config = config_in(&dir, TRAIN, TEST);
    config.rounds = 2;
    let destination = config.destination.clone();

    let report = Runner::new(config).run_baseline().unwrap();
    assert_eq!(report.len(), 1);
    assert_eq!(report.iter().next().unwrap().name, "Memory");
    assert!(destination.exists());
}
