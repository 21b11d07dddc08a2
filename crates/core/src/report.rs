//! Report persistence.
//!
//! The report is written exactly once, at the very end of a run, as a
//! single atomic operation: serialize to a temporary file in the
//! destination directory, then rename over the destination. A failure
//! mid-write never leaves a partially-written file readable as valid
//! output, and prior content survives until the rename.

use std::io::Write;
use std::path::Path;

use crate::error::{Error, Result};
use crate::result::BenchmarkReport;

/// Persist the full report to `destination`, overwriting any prior
/// content.
///
/// # Errors
/// `Error::Io` on filesystem failures, `Error::Serialization` if the
/// report cannot be encoded.
pub fn persist(report: &BenchmarkReport, destination: impl AsRef<Path>) -> Result<()> {
    let destination = destination.as_ref();
    let dir = match destination.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };

    let json = serde_json::to_vec_pretty(report)?;

    // Temp file lives in the destination directory so the rename
    // stays on one filesystem.
    let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
    tmp.write_all(&json)?;
    tmp.flush()?;
    tmp.persist(destination)
        .map_err(|e| Error::Io(e.error))?;

    tracing::info!(
        destination = %destination.display(),
        backends = report.len(),
        "report persisted"
    );
    Ok(())
}

/// Read a previously persisted report.
///
/// # Errors
/// `Error::Io` if the file cannot be read, `Error::Serialization` if
/// it does not decode as a report.
pub fn load(path: impl AsRef<Path>) -> Result<BenchmarkReport> {
    let bytes = std::fs::read(path.as_ref())?;
    Ok(serde_json::from_slice(&bytes)?)
}
