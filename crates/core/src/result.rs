//! Benchmark result records.
//!
//! One `MethodResult` per (index type, metric) grid cell, averaged
//! over rounds; one `BackendResult` per backend; one `BenchmarkReport`
//! per run. The JSON spellings (`Name`, `Train-Data-info`, `#vector`,
//! `Test round`, `Methods`, ...) are the report file format and must
//! not change, or stored reports stop being comparable.
//!
//! Accumulation is explicit: the runner builds one [`RoundSample`] per
//! round and records it into a [`MethodAccumulator`]; fields are never
//! created as a side effect of first access.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::dataset::DataInfo;
use crate::error::{Error, Result};

/// Backend-reported storage footprint.
///
/// Backends do not agree on a representation: QDrant and Milvus report
/// a row count, PGVector reports a human-readable relation size. The
/// runner treats the value as opaque beyond accumulation: numeric
/// sizes are averaged over rounds, descriptive sizes keep the latest
/// observation and are never divided.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SizeMeasure {
    /// Numeric size (row count, bytes, ...)
    Count(f64),
    /// Descriptive size (e.g. `pg_size_pretty` output)
    Text(String),
}

impl SizeMeasure {
    /// Numeric value, if this measure is numeric.
    pub fn as_count(&self) -> Option<f64> {
        match self {
            SizeMeasure::Count(v) => Some(*v),
            SizeMeasure::Text(_) => None,
        }
    }
}

impl From<u64> for SizeMeasure {
    fn from(v: u64) -> Self {
        SizeMeasure::Count(v as f64)
    }
}

impl From<String> for SizeMeasure {
    fn from(v: String) -> Self {
        SizeMeasure::Text(v)
    }
}

/// Measurements taken during one round of one grid cell.
#[derive(Debug, Clone, PartialEq)]
pub struct RoundSample {
    /// Seconds spent creating the collection
    pub create_time: f64,
    /// Bulk-insert throughput, vectors per second (includes the
    /// explicit index build where the backend defers indexing)
    pub insert_throughput: f64,
    /// Search throughput, queries per second
    pub similarity_throughput: f64,
    /// Backend-reported storage footprint
    pub size: SizeMeasure,
    /// Mean per-query accuracy score under the active metric
    pub mean_distance: f64,
}

/// Running totals for one grid cell across rounds.
///
/// Every field of the finalized [`MethodResult`] is the arithmetic
/// mean of exactly `rounds` recorded samples (the averaging law).
#[derive(Debug, Clone, Default)]
pub struct MethodAccumulator {
    create_time: f64,
    insert_throughput: f64,
    similarity_throughput: f64,
    numeric_size: f64,
    text_size: Option<String>,
    total_distance: f64,
    recorded: usize,
}

impl MethodAccumulator {
    /// Create an empty accumulator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of rounds recorded so far.
    pub fn recorded(&self) -> usize {
        self.recorded
    }

    /// Fold one round's measurements into the totals.
    pub fn record(&mut self, sample: RoundSample) {
        self.create_time += sample.create_time;
        self.insert_throughput += sample.insert_throughput;
        self.similarity_throughput += sample.similarity_throughput;
        match sample.size {
            SizeMeasure::Count(v) => self.numeric_size += v,
            SizeMeasure::Text(s) => self.text_size = Some(s),
        }
        self.total_distance += sample.mean_distance;
        self.recorded += 1;
    }

    /// Average the accumulated totals over `rounds`.
    ///
    /// # Errors
    /// `Error::Internal` if `rounds` is zero or does not match the
    /// number of recorded samples.
    pub fn finalize(self, rounds: usize) -> Result<MethodResult> {
        if rounds == 0 {
            return Err(Error::Internal(
                "round count must be positive".to_string(),
            ));
        }
        if self.recorded != rounds {
            return Err(Error::Internal(format!(
                "recorded {} rounds, expected {}",
                self.recorded, rounds
            )));
        }
        let n = rounds as f64;
        let size = match self.text_size {
            // Descriptive sizes are not arithmetically averaged.
            Some(text) => SizeMeasure::Text(text),
            None => SizeMeasure::Count(self.numeric_size / n),
        };
        Ok(MethodResult {
            create_time: self.create_time / n,
            insert_time: self.insert_throughput / n,
            similarity_time: self.similarity_throughput / n,
            size,
            total_distance: self.total_distance / n,
        })
    }
}

/// Averaged measurements for one (index type, metric) grid cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MethodResult {
    /// Mean seconds to create the collection
    pub create_time: f64,
    /// Mean bulk-insert throughput, vectors per second
    pub insert_time: f64,
    /// Mean search throughput, queries per second
    pub similarity_time: f64,
    /// Storage footprint (averaged when numeric)
    pub size: SizeMeasure,
    /// Mean per-query accuracy score; interpretation depends on the
    /// metric family (cosine: higher is better; L2: lower is better)
    pub total_distance: f64,
}

/// One backend's full grid-sweep record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackendResult {
    /// Backend display name
    #[serde(rename = "Name")]
    pub name: String,
    /// Training dataset shape
    #[serde(rename = "Train-Data-info")]
    pub train_info: DataInfo,
    /// Test dataset shape
    #[serde(rename = "Test-Data-info")]
    pub test_info: DataInfo,
    /// Configured rounds per grid cell
    #[serde(rename = "Test round")]
    pub rounds: usize,
    /// Finalized results keyed by `method_key(index_type, metric)`
    #[serde(rename = "Methods")]
    pub methods: BTreeMap<String, MethodResult>,
}

impl BackendResult {
    /// Start an empty record for one backend's sweep.
    pub fn new(name: impl Into<String>, train: DataInfo, test: DataInfo, rounds: usize) -> Self {
        BackendResult {
            name: name.into(),
            train_info: train,
            test_info: test,
            rounds,
            methods: BTreeMap::new(),
        }
    }

    /// Store the finalized result for one grid cell.
    pub fn insert_method(&mut self, key: String, result: MethodResult) {
        self.methods.insert(key, result);
    }
}

/// The full run report: one entry per swept backend, in
/// backend-iteration order. Re-running a backend appends a second
/// entry; there is no deduplication.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BenchmarkReport {
    entries: Vec<BackendResult>,
}

impl BenchmarkReport {
    /// Create an empty report.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a finalized backend record, preserving iteration order.
    pub fn append(&mut self, result: BackendResult) {
        self.entries.push(result);
    }

    /// Number of backend entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the report has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over the backend entries in order.
    pub fn iter(&self) -> impl Iterator<Item = &BackendResult> {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(create: f64, size: SizeMeasure) -> RoundSample {
        RoundSample {
            create_time: create,
            insert_throughput: 100.0,
            similarity_throughput: 50.0,
            size,
            mean_distance: 0.5,
        }
    }

    #[test]
    fn averaging_law_holds() {
        let mut acc = MethodAccumulator::new();
        for create in [1.0, 2.0, 3.0] {
            acc.record(sample(create, SizeMeasure::Count(30.0)));
        }
        let result = acc.finalize(3).unwrap();
        assert!((result.create_time - 2.0).abs() < 1e-12);
        assert!((result.insert_time - 100.0).abs() < 1e-12);
        assert!((result.similarity_time - 50.0).abs() < 1e-12);
        assert_eq!(result.size, SizeMeasure::Count(30.0));
        assert!((result.total_distance - 0.5).abs() < 1e-12);
    }

    #[test]
    fn finalize_zero_rounds_is_invariant_error() {
        let acc = MethodAccumulator::new();
        let err = acc.finalize(0).unwrap_err();
        assert!(err.is_internal());
    }

    #[test]
    fn finalize_round_count_mismatch_is_invariant_error() {
        let mut acc = MethodAccumulator::new();
        acc.record(sample(1.0, SizeMeasure::Count(1.0)));
        let err = acc.finalize(2).unwrap_err();
        assert!(err.is_internal());
    }

    #[test]
    fn descriptive_size_is_not_divided() {
        let mut acc = MethodAccumulator::new();
        acc.record(sample(1.0, SizeMeasure::Text("48 kB".into())));
        acc.record(sample(1.0, SizeMeasure::Text("64 kB".into())));
        let result = acc.finalize(2).unwrap();
        assert_eq!(result.size, SizeMeasure::Text("64 kB".into()));
    }

    #[test]
    fn report_preserves_order_and_duplicates() {
        let info = DataInfo {
            vectors: 10,
            dimension: 4,
        };
        let mut report = BenchmarkReport::new();
        report.append(BackendResult::new("QDrant", info, info, 1));
        report.append(BackendResult::new("Milvus", info, info, 1));
        report.append(BackendResult::new("QDrant", info, info, 1));
        let names: Vec<_> = report.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, ["QDrant", "Milvus", "QDrant"]);
    }

    #[test]
    fn report_json_spellings_are_exact() {
        let info = DataInfo {
            vectors: 100,
            dimension: 8,
        };
        let mut result = BackendResult::new("PGvector", info, info, 2);
        result.insert_method(
            "HNSW+COSINE".to_string(),
            MethodResult {
                create_time: 0.5,
                insert_time: 1000.0,
                similarity_time: 200.0,
                size: SizeMeasure::Text("48 kB".into()),
                total_distance: 0.98,
            },
        );
        let mut report = BenchmarkReport::new();
        report.append(result);

        let json = serde_json::to_value(&report).unwrap();
        let entry = &json[0];
        assert_eq!(entry["Name"], "PGvector");
        assert_eq!(entry["Train-Data-info"]["#vector"], 100);
        assert_eq!(entry["Train-Data-info"]["dimension"], 8);
        assert_eq!(entry["Test round"], 2);
        let method = &entry["Methods"]["HNSW+COSINE"];
        assert_eq!(method["create_time"], 0.5);
        assert_eq!(method["insert_time"], 1000.0);
        assert_eq!(method["similarity_time"], 200.0);
        assert_eq!(method["size"], "48 kB");
        assert_eq!(method["total_distance"], 0.98);
    }

    #[test]
    fn size_measure_roundtrips_number_or_string() {
        let numeric: SizeMeasure = serde_json::from_str("1000.0").unwrap();
        assert_eq!(numeric, SizeMeasure::Count(1000.0));
        let text: SizeMeasure = serde_json::from_str("\"16 MB\"").unwrap();
        assert_eq!(text, SizeMeasure::Text("16 MB".into()));
    }
}
