//! In-process brute-force backend.
//!
//! A linear-scan reference implementation of the capability contract.
//! It has no connection, indexes nothing and scans every vector per
//! query, which makes it deterministic and ideal as the baseline the
//! real backends' accuracy numbers are read against, and as the
//! backend the runner's tests drive.

use std::collections::BTreeMap;

use vectormark_core::accuracy::{cosine_similarity, is_cosine, l2_distance};
use vectormark_core::{Dataset, Error, Result, SizeMeasure};

use crate::backend::{SearchHit, VectorBackend};

const METRICS: &[&str] = &["cosine", "l2"];
const INDEX_TYPES: &[&str] = &["flat"];

struct Collection {
    dimension: usize,
    vectors: Vec<Vec<f32>>,
}

/// Brute-force in-memory adapter.
#[derive(Default)]
pub struct MemoryBackend {
    collections: BTreeMap<String, Collection>,
}

impl MemoryBackend {
    /// Create an empty in-memory backend.
    pub fn new() -> Self {
        Self::default()
    }

    fn collection_mut(&mut self, name: &str) -> Option<&mut Collection> {
        self.collections.get_mut(name)
    }
}

impl VectorBackend for MemoryBackend {
    fn name(&self) -> &str {
        "Memory"
    }

    fn supported_metrics(&self) -> &[&str] {
        METRICS
    }

    fn supported_index_types(&self) -> &[&str] {
        INDEX_TYPES
    }

    fn create_collection(
        &mut self,
        name: &str,
        dimension: usize,
        metric: &str,
        index_type: &str,
    ) -> Result<()> {
        if !METRICS.iter().any(|m| m.eq_ignore_ascii_case(metric)) {
            return Err(Error::Schema(format!("unsupported metric {metric:?}")));
        }
        if !INDEX_TYPES.iter().any(|i| i.eq_ignore_ascii_case(index_type)) {
            return Err(Error::Schema(format!(
                "unsupported index type {index_type:?}"
            )));
        }
        if dimension == 0 {
            return Err(Error::Schema("dimension must be positive".to_string()));
        }
        self.collections.insert(
            name.to_string(),
            Collection {
                dimension,
                vectors: Vec::new(),
            },
        );
        Ok(())
    }

    fn bulk_insert(&mut self, name: &str, dataset: &Dataset) -> Result<usize> {
        let collection = self
            .collection_mut(name)
            .ok_or_else(|| Error::Insert(format!("collection {name:?} does not exist")))?;
        if dataset.dimension() != collection.dimension {
            return Err(Error::Insert(format!(
                "vector dimension {} does not match collection dimension {}",
                dataset.dimension(),
                collection.dimension
            )));
        }
        collection.vectors.extend(dataset.vectors().map(<[f32]>::to_vec));
        Ok(dataset.rows())
    }

    fn needs_explicit_build(&self, _index_type: &str) -> bool {
        false
    }

    fn build_index(&mut self, _name: &str, _metric: &str, _index_type: &str) -> Result<()> {
        Ok(())
    }

    fn size_of(&mut self, name: &str) -> Result<SizeMeasure> {
        let collection = self
            .collection_mut(name)
            .ok_or_else(|| Error::Internal(format!("collection {name:?} does not exist")))?;
        Ok(SizeMeasure::from(collection.vectors.len() as u64))
    }

    fn search(&mut self, name: &str, query: &[f32], metric: &str) -> Result<SearchHit> {
        let collection = self
            .collection_mut(name)
            .ok_or_else(|| Error::Search(format!("collection {name:?} does not exist")))?;
        if collection.vectors.is_empty() {
            return Err(Error::Search(format!("collection {name:?} is empty")));
        }

        // Ties break toward the lowest id for determinism.
        let cosine = is_cosine(metric);
        let score_of = |stored: &[f32]| {
            if cosine {
                cosine_similarity(stored, query)
            } else {
                l2_distance(stored, query)
            }
        };

        let mut best_id = 0usize;
        let mut best_score = score_of(&collection.vectors[0]);
        for (id, stored) in collection.vectors.iter().enumerate().skip(1) {
            let score = score_of(stored);
            let better = if cosine {
                score > best_score
            } else {
                score < best_score
            };
            if better {
                best_id = id;
                best_score = score;
            }
        }

        Ok(SearchHit {
            id: best_id as u64,
            vector: collection.vectors[best_id].clone(),
        })
    }

    fn drop_collection(&mut self, name: &str) -> Result<()> {
        self.collections.remove(name);
        Ok(())
    }

    fn disconnect(&mut self) -> Result<()> {
        self.collections.clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dataset(rows: Vec<Vec<f32>>) -> Dataset {
        Dataset::from_rows(rows).unwrap()
    }

    fn populated() -> MemoryBackend {
        let mut backend = MemoryBackend::new();
        backend.create_collection("test", 2, "l2", "flat").unwrap();
        backend
            .bulk_insert(
                "test",
                &dataset(vec![vec![0.0, 0.0], vec![1.0, 1.0], vec![5.0, 5.0]]),
            )
            .unwrap();
        backend
    }

    #[test]
    fn l2_search_finds_nearest() {
        let mut backend = populated();
        let hit = backend.search("test", &[0.9, 1.2], "l2").unwrap();
        assert_eq!(hit.id, 1);
        assert_eq!(hit.vector, vec![1.0, 1.0]);
    }

    #[test]
    fn cosine_search_ignores_magnitude() {
        let mut backend = MemoryBackend::new();
        backend
            .create_collection("test", 2, "cosine", "flat")
            .unwrap();
        backend
            .bulk_insert("test", &dataset(vec![vec![10.0, 0.0], vec![0.0, 0.1]]))
            .unwrap();
        // Query points along the y axis; the tiny y-aligned vector wins.
        let hit = backend.search("test", &[0.0, 100.0], "cosine").unwrap();
        assert_eq!(hit.id, 1);
    }

    #[test]
    fn search_on_empty_collection_fails() {
        let mut backend = MemoryBackend::new();
        backend.create_collection("test", 2, "l2", "flat").unwrap();
        let err = backend.search("test", &[0.0, 0.0], "l2").unwrap_err();
        assert!(matches!(err, Error::Search(_)));
    }

    #[test]
    fn insert_rejects_wrong_dimension() {
        let mut backend = MemoryBackend::new();
        backend.create_collection("test", 2, "l2", "flat").unwrap();
        let err = backend
            .bulk_insert("test", &dataset(vec![vec![1.0, 2.0, 3.0]]))
            .unwrap_err();
        assert!(matches!(err, Error::Insert(_)));
    }

    #[test]
    fn create_rejects_unknown_metric() {
        let mut backend = MemoryBackend::new();
        let err = backend
            .create_collection("test", 2, "hamming", "flat")
            .unwrap_err();
        assert!(matches!(err, Error::Schema(_)));
    }

    #[test]
    fn drop_is_idempotent() {
        let mut backend = populated();
        backend.drop_collection("test").unwrap();
        backend.drop_collection("test").unwrap();
        backend.drop_collection("never-existed").unwrap();
    }

    #[test]
    fn size_reports_row_count() {
        let mut backend = populated();
        assert_eq!(backend.size_of("test").unwrap(), SizeMeasure::from(3u64));
    }

    #[test]
    fn recreate_after_drop_starts_empty() {
        let mut backend = populated();
        backend.drop_collection("test").unwrap();
        backend.create_collection("test", 2, "l2", "flat").unwrap();
        assert_eq!(backend.size_of("test").unwrap(), SizeMeasure::from(0u64));
    }
}
