//! Retrieval-quality scoring.
//!
//! The accuracy score compares the vector a backend actually returned
//! against the query vector, under the metric the sweep cell is
//! configured with. The two metric families are deliberately NOT on
//! one scale:
//!
//! - cosine: `dot(a,b) / (||a|| * ||b||)`, range [-1, 1], higher is
//!   better;
//! - everything else (Euclidean/L2 family): `||a - b||`, >= 0, lower
//!   is better.
//!
//! Report consumers must know which family produced a score to
//! interpret it. Metric labels arrive in backend-specific spelling
//! ("cosine", "COSINE", "Cosine", ...) and are matched
//! case-insensitively here.

/// Method key for one (index type, metric) grid cell.
///
/// Deterministic and case-normalized: both labels are upper-cased and
/// joined with `+`, e.g. `method_key("hnsw", "cosine") ==
/// "HNSW+COSINE"`.
pub fn method_key(index_type: &str, metric: &str) -> String {
    format!("{}+{}", index_type.to_uppercase(), metric.to_uppercase())
}

/// Check whether a metric label (in any backend's spelling) denotes
/// cosine similarity.
pub fn is_cosine(metric: &str) -> bool {
    metric.eq_ignore_ascii_case("cosine")
}

/// Score a retrieved vector against its query under the active metric.
///
/// Accumulation happens in f64 so that summing over large test sets
/// does not lose precision.
pub fn accuracy_score(retrieved: &[f32], query: &[f32], metric: &str) -> f64 {
    debug_assert_eq!(retrieved.len(), query.len());
    if is_cosine(metric) {
        cosine_similarity(retrieved, query)
    } else {
        l2_distance(retrieved, query)
    }
}

/// Cosine similarity between two vectors.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f64 {
    let mut dot = 0.0f64;
    let mut norm_a = 0.0f64;
    let mut norm_b = 0.0f64;
    for (&x, &y) in a.iter().zip(b.iter()) {
        dot += f64::from(x) * f64::from(y);
        norm_a += f64::from(x) * f64::from(x);
        norm_b += f64::from(y) * f64::from(y);
    }
    dot / (norm_a.sqrt() * norm_b.sqrt())
}

/// Euclidean (L2) distance between two vectors.
pub fn l2_distance(a: &[f32], b: &[f32]) -> f64 {
    a.iter()
        .zip(b.iter())
        .map(|(&x, &y)| {
            let d = f64::from(x) - f64::from(y);
            d * d
        })
        .sum::<f64>()
        .sqrt()
}
