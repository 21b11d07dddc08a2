//! Milvus adapter.
//!
//! Thin wrapper over the Milvus v2 RESTful API (`/v2/vectordb/...`).
//! Milvus builds its index as an explicit post-insert step for every
//! index type, so `needs_explicit_build` is always true and
//! `build_index` creates the index and loads the collection for
//! search. The storage footprint is the collection row count.
//!
//! Entities are inserted with explicit integer ids equal to the
//! 0-based dataset row index, so search hits map straight back to the
//! inserted payload.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use vectormark_core::{BackendKind, Dataset, Error, Result, SizeMeasure};

use crate::backend::{SearchHit, VectorBackend};

const INSERT_BATCH: usize = 512;

/// Connection parameters for Milvus.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MilvusParams {
    /// Base URL of the RESTful endpoint, e.g. `http://localhost:19530`
    pub url: String,
}

impl MilvusParams {
    /// Included in the sweep iff a URL is provided.
    pub fn is_configured(&self) -> bool {
        !self.url.is_empty()
    }
}

/// Milvus backend adapter.
pub struct MilvusBackend {
    http: reqwest::blocking::Client,
    base_url: String,
}

impl MilvusBackend {
    /// Connect to a Milvus instance and verify it responds.
    ///
    /// # Errors
    /// `Error::Connection` if the instance is unreachable.
    pub fn connect(params: &MilvusParams) -> Result<Self> {
        let backend = MilvusBackend {
            http: reqwest::blocking::Client::new(),
            base_url: params.url.trim_end_matches('/').to_string(),
        };
        backend
            .post("/v2/vectordb/collections/list", json!({}))
            .map_err(|message| Error::Connection {
                backend: BackendKind::Milvus.display_name().to_string(),
                message,
            })?;
        Ok(backend)
    }

    /// All v2 endpoints are POST with a JSON body and reply with
    /// `{"code": 0, "data": ...}` on success.
    fn post(&self, path: &str, body: Value) -> std::result::Result<Value, String> {
        let url = format!("{}{}", self.base_url, path);
        let response = self
            .http
            .post(url)
            .json(&body)
            .send()
            .map_err(|e| e.to_string())?;
        let status = response.status();
        let value: Value = response.json().map_err(|e| e.to_string())?;
        if !status.is_success() {
            return Err(format!("HTTP {status}"));
        }
        match value["code"].as_i64() {
            Some(0) => Ok(value),
            _ => Err(value["message"]
                .as_str()
                .map_or_else(|| value.to_string(), str::to_string)),
        }
    }
}

impl VectorBackend for MilvusBackend {
    fn name(&self) -> &str {
        BackendKind::Milvus.display_name()
    }

    fn supported_metrics(&self) -> &[&str] {
        BackendKind::Milvus.supported_metrics()
    }

    fn supported_index_types(&self) -> &[&str] {
        BackendKind::Milvus.supported_index_types()
    }

    fn create_collection(
        &mut self,
        name: &str,
        dimension: usize,
        metric: &str,
        _index_type: &str,
    ) -> Result<()> {
        let body = json!({
            "collectionName": name,
            "dimension": dimension,
            "metricType": metric,
            "idType": "Int64",
            "autoID": false,
            "primaryFieldName": "id",
            "vectorFieldName": "vector",
        });
        self.post("/v2/vectordb/collections/create", body)
            .map_err(Error::Schema)?;
        Ok(())
    }

    fn bulk_insert(&mut self, name: &str, dataset: &Dataset) -> Result<usize> {
        let rows: Vec<&[f32]> = dataset.vectors().collect();
        for (batch_idx, batch) in rows.chunks(INSERT_BATCH).enumerate() {
            let data: Vec<Value> = batch
                .iter()
                .enumerate()
                .map(|(offset, vector)| {
                    json!({ "id": batch_idx * INSERT_BATCH + offset, "vector": vector })
                })
                .collect();
            let body = json!({ "collectionName": name, "data": data });
            self.post("/v2/vectordb/entities/insert", body)
                .map_err(Error::Insert)?;
        }
        Ok(dataset.rows())
    }

    fn needs_explicit_build(&self, _index_type: &str) -> bool {
        // Milvus indexes in a deferred batch step regardless of the
        // index type.
        true
    }

    fn build_index(&mut self, name: &str, metric: &str, index_type: &str) -> Result<()> {
        let body = json!({
            "collectionName": name,
            "indexParams": [{
                "fieldName": "vector",
                "indexName": "vector_index",
                "metricType": metric,
                "indexType": index_type,
            }]
        });
        self.post("/v2/vectordb/indexes/create", body)
            .map_err(Error::Schema)?;
        // The collection must be loaded before it can serve searches.
        self.post(
            "/v2/vectordb/collections/load",
            json!({ "collectionName": name }),
        )
        .map_err(Error::Schema)?;
        Ok(())
    }

    fn size_of(&mut self, name: &str) -> Result<SizeMeasure> {
        let value = self
            .post(
                "/v2/vectordb/collections/get_stats",
                json!({ "collectionName": name }),
            )
            .map_err(Error::Search)?;
        let count = value["data"]["rowCount"]
            .as_u64()
            .or_else(|| value["data"]["rowCount"].as_str().and_then(|s| s.parse().ok()))
            .ok_or_else(|| Error::Search(format!("no rowCount for {name}")))?;
        Ok(SizeMeasure::from(count))
    }

    fn search(&mut self, name: &str, query: &[f32], _metric: &str) -> Result<SearchHit> {
        let body = json!({
            "collectionName": name,
            "data": [query],
            "annsField": "vector",
            "limit": 1,
            "outputFields": ["vector"],
        });
        let value = self
            .post("/v2/vectordb/entities/search", body)
            .map_err(Error::Search)?;
        let hit = value["data"]
            .as_array()
            .and_then(|hits| hits.first())
            .ok_or_else(|| Error::Search(format!("no results from {name}")))?;

        let id = hit["id"]
            .as_u64()
            .ok_or_else(|| Error::Search("missing entity id".to_string()))?;
        let vector = hit["vector"]
            .as_array()
            .ok_or_else(|| Error::Search("missing entity vector".to_string()))?
            .iter()
            .map(|v| v.as_f64().map(|f| f as f32))
            .collect::<Option<Vec<f32>>>()
            .ok_or_else(|| Error::Search("non-numeric entity vector".to_string()))?;
        Ok(SearchHit { id, vector })
    }

    fn drop_collection(&mut self, name: &str) -> Result<()> {
        // Dropping a missing collection succeeds server-side.
        self.post(
            "/v2/vectordb/collections/drop",
            json!({ "collectionName": name }),
        )
        .map(|_| ())
        .or(Ok(()))
    }

    fn disconnect(&mut self) -> Result<()> {
        // Plain HTTP: nothing to tear down server-side.
        Ok(())
    }
}
