//! PGVector adapter.
//!
//! PostgreSQL with the pgvector extension, driven over a synchronous
//! client. A collection is a table `(id bigserial PRIMARY KEY,
//! embedding vector(d))`; ids are therefore 1-based insertion order.
//! The hnsw index is created together with the table; ivfflat is the
//! batch index and is built explicitly after the data is in
//! (`needs_explicit_build`).
//!
//! The storage footprint is `pg_size_pretty(pg_total_relation_size)`,
//! a descriptive string, so this backend's `size` is never averaged
//! arithmetically.

use postgres::{Client, NoTls};
use serde::{Deserialize, Serialize};

use vectormark_core::accuracy::is_cosine;
use vectormark_core::{BackendKind, Dataset, Error, Result, SizeMeasure};

use crate::backend::{SearchHit, VectorBackend};

/// Connection parameters for PGVector.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PgParams {
    /// Database name
    pub dbname: String,
    /// Role to connect as
    pub user: String,
    /// Password (may be empty for trust/peer auth)
    #[serde(default)]
    pub password: String,
    /// Host (default: localhost)
    #[serde(default = "default_host")]
    pub host: String,
    /// Port (default: 5432)
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "localhost".to_string()
}

fn default_port() -> u16 {
    5432
}

impl PgParams {
    /// A backend is included in the sweep iff its parameters are
    /// provided; for PGVector that means a dbname or user is set.
    pub fn is_configured(&self) -> bool {
        !self.dbname.is_empty() || !self.user.is_empty()
    }
}

/// PGVector backend adapter.
pub struct PgVectorBackend {
    client: Option<Client>,
}

impl PgVectorBackend {
    /// Connect and ensure the pgvector extension is available.
    ///
    /// # Errors
    /// `Error::Connection` if the server is unreachable or the
    /// extension cannot be created.
    pub fn connect(params: &PgParams) -> Result<Self> {
        let connection_error = |e: postgres::Error| Error::Connection {
            backend: BackendKind::PgVector.display_name().to_string(),
            message: e.to_string(),
        };

        let mut client = postgres::Config::new()
            .host(&params.host)
            .port(params.port)
            .dbname(&params.dbname)
            .user(&params.user)
            .password(&params.password)
            .connect(NoTls)
            .map_err(connection_error)?;

        client
            .batch_execute("CREATE EXTENSION IF NOT EXISTS vector")
            .map_err(connection_error)?;

        Ok(PgVectorBackend {
            client: Some(client),
        })
    }

    fn client(&mut self) -> Result<&mut Client> {
        self.client
            .as_mut()
            .ok_or_else(|| Error::Internal("PGvector adapter already disconnected".to_string()))
    }

    /// Row count of a collection (`SELECT COUNT(*)`).
    pub fn row_count(&mut self, name: &str) -> Result<u64> {
        let query = format!("SELECT COUNT(*) FROM {name}");
        let row = self
            .client()?
            .query_one(&query, &[])
            .map_err(|e| Error::Search(e.to_string()))?;
        let count: i64 = row.get(0);
        Ok(count as u64)
    }
}

fn operator_class(metric: &str) -> &'static str {
    if is_cosine(metric) {
        "vector_cosine_ops"
    } else {
        "vector_l2_ops"
    }
}

fn order_operator(metric: &str) -> &'static str {
    if is_cosine(metric) {
        "<=>"
    } else {
        "<->"
    }
}

/// pgvector's text form: `[0.1,0.2,...]`.
fn vector_literal(vector: &[f32]) -> String {
    let cells: Vec<String> = vector.iter().map(f32::to_string).collect();
    format!("[{}]", cells.join(","))
}

fn parse_vector_literal(text: &str) -> Result<Vec<f32>> {
    text.trim()
        .trim_start_matches('[')
        .trim_end_matches(']')
        .split(',')
        .map(|cell| {
            cell.trim()
                .parse::<f32>()
                .map_err(|_| Error::Search(format!("malformed vector cell {cell:?}")))
        })
        .collect()
}

impl VectorBackend for PgVectorBackend {
    fn name(&self) -> &str {
        BackendKind::PgVector.display_name()
    }

    fn supported_metrics(&self) -> &[&str] {
        BackendKind::PgVector.supported_metrics()
    }

    fn supported_index_types(&self) -> &[&str] {
        BackendKind::PgVector.supported_index_types()
    }

    fn create_collection(
        &mut self,
        name: &str,
        dimension: usize,
        metric: &str,
        index_type: &str,
    ) -> Result<()> {
        if !self
            .supported_index_types()
            .contains(&index_type)
        {
            return Err(Error::Schema(format!(
                "PGvector does not support index type {index_type:?}"
            )));
        }
        let table = format!(
            "CREATE TABLE IF NOT EXISTS {name} (id bigserial PRIMARY KEY, embedding vector({dimension}))"
        );
        self.client()?
            .batch_execute(&table)
            .map_err(|e| Error::Schema(e.to_string()))?;

        // hnsw builds incrementally, so it goes in with the table;
        // ivfflat needs the data first and is deferred to build_index.
        if index_type.eq_ignore_ascii_case("hnsw") {
            self.build_index(name, metric, index_type)?;
        }
        Ok(())
    }

    fn bulk_insert(&mut self, name: &str, dataset: &Dataset) -> Result<usize> {
        let statement = format!("INSERT INTO {name} (embedding) VALUES ($1::vector)");
        let client = self.client()?;
        for vector in dataset.vectors() {
            let literal = vector_literal(vector);
            client
                .execute(&statement, &[&literal])
                .map_err(|e| Error::Insert(e.to_string()))?;
        }
        Ok(dataset.rows())
    }

    fn needs_explicit_build(&self, index_type: &str) -> bool {
        index_type.eq_ignore_ascii_case("ivfflat")
    }

    fn build_index(&mut self, name: &str, metric: &str, index_type: &str) -> Result<()> {
        let ops = operator_class(metric);
        let statement = format!("CREATE INDEX ON {name} USING {index_type} (embedding {ops})");
        self.client()?
            .batch_execute(&statement)
            .map_err(|e| Error::Schema(e.to_string()))
    }

    fn size_of(&mut self, name: &str) -> Result<SizeMeasure> {
        let query = format!("SELECT pg_size_pretty(pg_total_relation_size('{name}'))");
        let row = self
            .client()?
            .query_one(&query, &[])
            .map_err(|e| Error::Search(e.to_string()))?;
        let pretty: String = row.get(0);
        Ok(SizeMeasure::Text(pretty))
    }

    fn search(&mut self, name: &str, query: &[f32], metric: &str) -> Result<SearchHit> {
        let operator = order_operator(metric);
        let statement = format!(
            "SELECT id, embedding::text FROM {name} ORDER BY embedding {operator} $1::vector LIMIT 1"
        );
        let literal = vector_literal(query);
        let rows = self
            .client()?
            .query(&statement, &[&literal])
            .map_err(|e| Error::Search(e.to_string()))?;
        let row = rows
            .first()
            .ok_or_else(|| Error::Search(format!("no results from {name}")))?;
        let id: i64 = row.get(0);
        let text: String = row.get(1);
        Ok(SearchHit {
            id: id as u64,
            vector: parse_vector_literal(&text)?,
        })
    }

    fn drop_collection(&mut self, name: &str) -> Result<()> {
        let statement = format!("DROP TABLE IF EXISTS {name}");
        self.client()?
            .batch_execute(&statement)
            .map_err(|e| Error::Schema(e.to_string()))
    }

    fn disconnect(&mut self) -> Result<()> {
        if let Some(client) = self.client.take() {
            client
                .close()
                .map_err(|e| Error::Connection {
                    backend: BackendKind::PgVector.display_name().to_string(),
                    message: e.to_string(),
                })?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vector_literal_roundtrip() {
        let v = vec![0.5f32, -1.25, 3.0];
        let literal = vector_literal(&v);
        assert_eq!(literal, "[0.5,-1.25,3]");
        assert_eq!(parse_vector_literal(&literal).unwrap(), v);
    }

    #[test]
    fn parse_rejects_garbage() {
        assert!(parse_vector_literal("[1.0,x]").is_err());
    }

    #[test]
    fn metric_mapping() {
        assert_eq!(operator_class("cosine"), "vector_cosine_ops");
        assert_eq!(operator_class("l2"), "vector_l2_ops");
        assert_eq!(order_operator("cosine"), "<=>");
        assert_eq!(order_operator("l2"), "<->");
    }

    #[test]
    fn build_policy_defers_only_ivfflat() {
        let backend = PgVectorBackend { client: None };
        assert!(backend.needs_explicit_build("ivfflat"));
        assert!(!backend.needs_explicit_build("hnsw"));
    }

    #[test]
    fn configured_when_dbname_or_user_present() {
        let mut params = PgParams {
            dbname: String::new(),
            user: String::new(),
            password: String::new(),
            host: default_host(),
            port: default_port(),
        };
        assert!(!params.is_configured());
        params.user = "postgres".to_string();
        assert!(params.is_configured());
    }
}
