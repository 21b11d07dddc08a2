//! Dataset loading and validation.
//!
//! A dataset is an ordered sequence of fixed-length numeric vectors,
//! read once per benchmark run from a CSV file (header row + numeric
//! columns, one vector per row) and immutable thereafter.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// An in-memory dataset: a 2-D numeric matrix, one vector per row.
///
/// All rows share the same dimension; this is enforced at load time.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    vectors: Vec<Vec<f32>>,
    dimension: usize,
}

/// Shape metadata reported in the benchmark result record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataInfo {
    /// Number of vectors
    #[serde(rename = "#vector")]
    pub vectors: usize,
    /// Vector dimension
    pub dimension: usize,
}

impl Dataset {
    /// Load a dataset from a CSV file.
    ///
    /// The file must have a header row; every subsequent row is one
    /// vector and every cell must parse as a float. Rows of differing
    /// width and non-numeric cells are rejected with the offending
    /// row/column coordinate in the error message.
    ///
    /// # Errors
    /// `Error::DataLoad` if the file is missing, malformed, ragged or
    /// contains non-numeric cells.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let data_load = |message: String| Error::DataLoad {
            path: path.display().to_string(),
            message,
        };

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .from_path(path)
            .map_err(|e| data_load(e.to_string()))?;

        let mut vectors: Vec<Vec<f32>> = Vec::new();
        let mut dimension: Option<usize> = None;

        for (row_idx, record) in reader.records().enumerate() {
            let record = record.map_err(|e| data_load(e.to_string()))?;
            let mut vector = Vec::with_capacity(record.len());
            for (col_idx, cell) in record.iter().enumerate() {
                let value: f32 = cell.trim().parse().map_err(|_| {
                    data_load(format!(
                        "non-numeric cell {:?} at row {}, column {}",
                        cell,
                        row_idx + 1,
                        col_idx + 1
                    ))
                })?;
                vector.push(value);
            }

            match dimension {
                None => dimension = Some(vector.len()),
                Some(d) if d != vector.len() => {
                    return Err(data_load(format!(
                        "row {} has {} columns, expected {}",
                        row_idx + 1,
                        vector.len(),
                        d
                    )));
                }
                Some(_) => {}
            }
            vectors.push(vector);
        }

        let dimension = dimension.unwrap_or(0);
        tracing::debug!(
            path = %path.display(),
            vectors = vectors.len(),
            dimension,
            "dataset loaded"
        );

        Ok(Dataset { vectors, dimension })
    }

    /// Build a dataset from rows already in memory.
    ///
    /// # Errors
    /// `Error::Internal` if rows differ in length.
    pub fn from_rows(rows: Vec<Vec<f32>>) -> Result<Self> {
        let dimension = rows.first().map_or(0, |r| r.len());
        if rows.iter().any(|r| r.len() != dimension) {
            return Err(Error::Internal(
                "dataset rows differ in dimension".to_string(),
            ));
        }
        Ok(Dataset {
            vectors: rows,
            dimension,
        })
    }

    /// Number of vectors.
    pub fn rows(&self) -> usize {
        self.vectors.len()
    }

    /// Vector dimension (0 for an empty dataset).
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Check if the dataset has no vectors.
    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }

    /// Iterate over the vectors in row order.
    pub fn vectors(&self) -> impl Iterator<Item = &[f32]> {
        self.vectors.iter().map(|v| v.as_slice())
    }

    /// Get a single vector by row index.
    pub fn row(&self, index: usize) -> Option<&[f32]> {
        self.vectors.get(index).map(|v| v.as_slice())
    }

    /// Shape metadata for the result record.
    pub fn info(&self) -> DataInfo {
        DataInfo {
            vectors: self.rows(),
            dimension: self.dimension(),
        }
    }
}

/// Validate that training and test datasets can be benchmarked
/// together.
///
/// Must run once, before any backend connection is opened, so a
/// configuration error aborts before any expensive setup.
///
/// # Errors
/// - `Error::DimensionMismatch` if the dimensions differ
/// - `Error::EmptyTestSet` if the test dataset has no vectors
pub fn validate_compatible(train: &Dataset, test: &Dataset) -> Result<()> {
    // An empty test set has no meaningful dimension, so it is checked
    // before the dimensions are compared.
    if test.is_empty() {
        return Err(Error::EmptyTestSet);
    }
    if train.dimension() != test.dimension() {
        return Err(Error::DimensionMismatch {
            train: train.dimension(),
            test: test.dimension(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_csv(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn load_simple_csv() {
        let file = write_csv("x,y,z\n1.0,2.0,3.0\n4.5,-5.0,6.25\n");
        let ds = Dataset::load(file.path()).unwrap();
        assert_eq!(ds.rows(), 2);
        assert_eq!(ds.dimension(), 3);
        assert_eq!(ds.row(1).unwrap(), &[4.5, -5.0, 6.25]);
    }

    #[test]
    fn load_missing_file() {
        let err = Dataset::load("/no/such/file.csv").unwrap_err();
        assert!(matches!(err, Error::DataLoad { .. }));
    }

    #[test]
    fn load_rejects_non_numeric_cell() {
        let file = write_csv("a,b\n1.0,2.0\n3.0,oops\n");
        let err = Dataset::load(file.path()).unwrap_err();
        match err {
            Error::DataLoad { message, .. } => {
                assert!(message.contains("row 2"));
                assert!(message.contains("column 2"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn load_rejects_ragged_rows() {
        // The csv reader itself flags records of unequal length.
        let file = write_csv("a,b,c\n1,2,3\n1,2\n");
        let err = Dataset::load(file.path()).unwrap_err();
        assert!(matches!(err, Error::DataLoad { .. }));
    }

    #[test]
    fn dimension_mismatch_detected() {
        let train = Dataset::from_rows(vec![vec![0.0; 128]]).unwrap();
        let test = Dataset::from_rows(vec![vec![0.0; 64]]).unwrap();
        let err = validate_compatible(&train, &test).unwrap_err();
        assert!(matches!(
            err,
            Error::DimensionMismatch {
                train: 128,
                test: 64
            }
        ));
    }

    #[test]
    fn empty_test_set_rejected() {
        let train = Dataset::from_rows(vec![vec![1.0, 2.0]]).unwrap();
        let test = Dataset::from_rows(vec![]).unwrap();
        let err = validate_compatible(&train, &test).unwrap_err();
        assert!(matches!(err, Error::EmptyTestSet));
    }

    #[test]
    fn info_reports_shape() {
        let ds = Dataset::from_rows(vec![vec![0.0; 4]; 7]).unwrap();
        let info = ds.info();
        assert_eq!(info.vectors, 7);
        assert_eq!(info.dimension, 4);
    }
}
