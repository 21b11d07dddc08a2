//! QDrant adapter.
//!
//! Thin wrapper over the QDrant REST API (collections + points
//! endpoints). QDrant builds its HNSW graph as points arrive, so
//! `build_index` is a no-op and `needs_explicit_build` is always
//! false. The storage footprint is the server-reported `points_count`,
//! a numeric measure.
//!
//! Point ids are the 0-based dataset row indices, so a search hit maps
//! straight back to the inserted payload.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use vectormark_core::{BackendKind, Dataset, Error, Result, SizeMeasure};

use crate::backend::{SearchHit, VectorBackend};

const INSERT_BATCH: usize = 512;

/// Connection parameters for QDrant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QdrantParams {
    /// Base URL of the REST endpoint, e.g. `http://localhost:6333`
    pub url: String,
}

impl QdrantParams {
    /// Included in the sweep iff a URL is provided.
    pub fn is_configured(&self) -> bool {
        !self.url.is_empty()
    }
}

/// QDrant backend adapter.
pub struct QdrantBackend {
    http: reqwest::blocking::Client,
    base_url: String,
}

/// Map a grid metric label to the API's distance name.
fn distance_name(metric: &str) -> Result<&'static str> {
    if metric.eq_ignore_ascii_case("cosine") {
        Ok("Cosine")
    } else if metric.eq_ignore_ascii_case("l2") || metric.eq_ignore_ascii_case("euclid") {
        Ok("Euclid")
    } else {
        Err(Error::Schema(format!(
            "QDrant does not support metric {metric:?}"
        )))
    }
}

impl QdrantBackend {
    /// Connect to a QDrant instance and verify it responds.
    ///
    /// # Errors
    /// `Error::Connection` if the instance is unreachable.
    pub fn connect(params: &QdrantParams) -> Result<Self> {
        let http = reqwest::blocking::Client::new();
        let base_url = params.url.trim_end_matches('/').to_string();

        let backend = QdrantBackend { http, base_url };
        backend
            .http
            .get(format!("{}/collections", backend.base_url))
            .send()
            .and_then(reqwest::blocking::Response::error_for_status)
            .map_err(|e| Error::Connection {
                backend: BackendKind::Qdrant.display_name().to_string(),
                message: e.to_string(),
            })?;
        Ok(backend)
    }

    fn request(
        &self,
        method: reqwest::Method,
        path: &str,
        body: Option<Value>,
    ) -> std::result::Result<Value, String> {
        let url = format!("{}{}", self.base_url, path);
        let mut request = self.http.request(method, url);
        if let Some(body) = body {
            request = request.json(&body);
        }
        let response = request.send().map_err(|e| e.to_string())?;
        let status = response.status();
        let value: Value = response.json().map_err(|e| e.to_string())?;
        if !status.is_success() {
            return Err(value["status"]["error"]
                .as_str()
                .map_or_else(|| format!("HTTP {status}"), str::to_string));
        }
        Ok(value)
    }
}

impl VectorBackend for QdrantBackend {
    fn name(&self) -> &str {
        BackendKind::Qdrant.display_name()
    }

    fn supported_metrics(&self) -> &[&str] {
        BackendKind::Qdrant.supported_metrics()
    }

    fn supported_index_types(&self) -> &[&str] {
        BackendKind::Qdrant.supported_index_types()
    }

    fn create_collection(
        &mut self,
        name: &str,
        dimension: usize,
        metric: &str,
        index_type: &str,
    ) -> Result<()> {
        if !index_type.eq_ignore_ascii_case("hnsw") {
            return Err(Error::Schema(format!(
                "QDrant does not support index type {index_type:?}"
            )));
        }
        let body = json!({
            "vectors": { "size": dimension, "distance": distance_name(metric)? }
        });
        self.request(reqwest::Method::PUT, &format!("/collections/{name}"), Some(body))
            .map_err(Error::Schema)?;
        Ok(())
    }

    fn bulk_insert(&mut self, name: &str, dataset: &Dataset) -> Result<usize> {
        let path = format!("/collections/{name}/points?wait=true");
        let rows: Vec<&[f32]> = dataset.vectors().collect();
        for (batch_idx, batch) in rows.chunks(INSERT_BATCH).enumerate() {
            let points: Vec<Value> = batch
                .iter()
                .enumerate()
                .map(|(offset, vector)| {
                    json!({ "id": batch_idx * INSERT_BATCH + offset, "vector": vector })
                })
                .collect();
            self.request(
                reqwest::Method::PUT,
                &path,
                Some(json!({ "points": points })),
            )
            .map_err(Error::Insert)?;
        }
        Ok(dataset.rows())
    }

    fn needs_explicit_build(&self, _index_type: &str) -> bool {
        false
    }

    fn build_index(&mut self, _name: &str, _metric: &str, _index_type: &str) -> Result<()> {
        // HNSW is maintained eagerly as points arrive.
        Ok(())
    }

    fn size_of(&mut self, name: &str) -> Result<SizeMeasure> {
        let value = self
            .request(reqwest::Method::GET, &format!("/collections/{name}"), None)
            .map_err(Error::Search)?;
        let count = value["result"]["points_count"]
            .as_u64()
            .ok_or_else(|| Error::Search(format!("no points_count for {name}")))?;
        Ok(SizeMeasure::from(count))
    }

    fn search(&mut self, name: &str, query: &[f32], _metric: &str) -> Result<SearchHit> {
        let body = json!({ "vector": query, "limit": 1, "with_vector": true });
        let value = self
            .request(
                reqwest::Method::POST,
                &format!("/collections/{name}/points/search"),
                Some(body),
            )
            .map_err(Error::Search)?;
        let hit = value["result"]
            .as_array()
            .and_then(|hits| hits.first())
            .ok_or_else(|| Error::Search(format!("no results from {name}")))?;

        let id = hit["id"]
            .as_u64()
            .ok_or_else(|| Error::Search("missing point id".to_string()))?;
        let vector = hit["vector"]
            .as_array()
            .ok_or_else(|| Error::Search("missing point vector".to_string()))?
            .iter()
            .map(|v| v.as_f64().map(|f| f as f32))
            .collect::<Option<Vec<f32>>>()
            .ok_or_else(|| Error::Search("non-numeric point vector".to_string()))?;
        Ok(SearchHit { id, vector })
    }

    fn drop_collection(&mut self, name: &str) -> Result<()> {
        // DELETE on a missing collection reports ok=false, which is
        // fine for idempotence.
        self.request(reqwest::Method::DELETE, &format!("/collections/{name}"), None)
            .map(|_| ())
            .or(Ok(()))
    }

    fn disconnect(&mut self) -> Result<()> {
        // Plain HTTP: nothing to tear down server-side.
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distance_names_map_to_api_spelling() {
        assert_eq!(distance_name("Cosine").unwrap(), "Cosine");
        assert_eq!(distance_name("L2").unwrap(), "Euclid");
        assert!(distance_name("hamming").is_err());
    }

    #[test]
    fn configured_requires_url() {
        assert!(!QdrantParams { url: String::new() }.is_configured());
        assert!(QdrantParams {
            url: "http://localhost:6333".into()
        }
        .is_configured());
    }
}
