//! Merging per-case result files into master datasets.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use blade_core::errors::{BladeError, ErrorInfo};
use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::textio::{join_lines, persist_replace};

/// Why a case contributed no row to the master file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CaseRead {
    /// The case's result file does not exist.
    NotFound,
    /// The file exists but could not be read or lacks the case's row.
    Malformed,
}

/// A case left out of the master file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DroppedCase {
    /// Zero-based case index.
    pub index: usize,
    /// Drop reason.
    pub reason: CaseRead,
}

/// Outcome of merging one result kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregateReport {
    /// Result kind, e.g. `DEM`.
    pub kind: String,
    /// Master file written.
    pub master_path: PathBuf,
    /// Header line copied into the master file.
    pub header: String,
    /// Case indices whose rows were written, in order.
    pub kept: Vec<usize>,
    /// Cases without a row.
    pub dropped: Vec<DroppedCase>,
}

impl AggregateReport {
    /// Number of data rows in the master file.
    pub fn rows_written(&self) -> usize {
        self.kept.len()
    }

    /// Number of cases without a row.
    pub fn drop_count(&self) -> usize {
        self.dropped.len()
    }
}

/// Per-case result file of a kind.
pub fn case_file_path(dir: &Path, kind: &str, index: usize) -> PathBuf {
    dir.join(format!("sm_{kind}_{index}.txt"))
}

/// Master file of a kind.
pub fn master_file_path(dir: &Path, kind: &str) -> PathBuf {
    dir.join(format!("sm_master_{kind}.txt"))
}

fn aggregate_error(code: &str, message: impl Into<String>, kind: &str, dir: &Path) -> BladeError {
    BladeError::Aggregate(
        ErrorInfo::new(code, message)
            .with_context("kind", kind)
            .with_context("dir", dir.display().to_string()),
    )
}

fn existing_master_header(path: &Path) -> Option<String> {
    fs::read_to_string(path)
        .ok()
        .and_then(|text| text.lines().next().map(str::to_string))
}

/// Merges `sm_{kind}_{i}.txt` for `i` in `0..case_count` into `sm_master_{kind}.txt`.
///
/// Only line `i + 1` of case `i`'s file is taken. Files that yielded a row are
/// deleted once the master file is in place; malformed files are left for
/// inspection. The header comes from the first readable case file, or from an
/// existing master file when no case file remains.
pub fn aggregate(dir: &Path, kind: &str, case_count: usize) -> Result<AggregateReport, BladeError> {
    let mut header = None;
    let mut rows = Vec::new();
    let mut kept = Vec::new();
    let mut consumed = Vec::new();
    let mut dropped = Vec::new();

    for index in 0..case_count {
        let path = case_file_path(dir, kind, index);
        let text = match fs::read_to_string(&path) {
            Ok(text) => text,
            Err(err) => {
                let reason = if err.kind() == io::ErrorKind::NotFound {
                    CaseRead::NotFound
                } else {
                    CaseRead::Malformed
                };
                warn!("dropping {kind} case {index}: {err}");
                dropped.push(DroppedCase { index, reason });
                continue;
            }
        };
        let mut lines = text.lines();
        let first = lines.next();
        if header.is_none() {
            header = first.map(str::to_string);
        }
        match lines.nth(index) {
            Some(row) => {
                rows.push(row.to_string());
                kept.push(index);
                consumed.push(path);
            }
            None => {
                warn!(
                    "dropping {kind} case {index}: {} has no row {}",
                    path.display(),
                    index + 1
                );
                dropped.push(DroppedCase {
                    index,
                    reason: CaseRead::Malformed,
                });
            }
        }
    }

    let master_path = master_file_path(dir, kind);
    let header = header
        .or_else(|| existing_master_header(&master_path))
        .ok_or_else(|| {
            aggregate_error("no_header", "no case file or master file provides a header", kind, dir)
        })?;

    persist_replace(
        &master_path,
        &join_lines(std::iter::once(header.as_str()).chain(rows.iter().map(String::as_str))),
    )?;
    for path in &consumed {
        if let Err(err) = fs::remove_file(path) {
            warn!("could not remove merged case file {}: {err}", path.display());
        }
    }

    info!(
        "aggregated {kind}: {} of {case_count} cases written, {} dropped",
        kept.len(),
        dropped.len()
    );
    Ok(AggregateReport {
        kind: kind.to_string(),
        master_path,
        header,
        kept,
        dropped,
    })
}

/// Runs [`aggregate`] for each kind in order.
pub fn aggregate_kinds<S: AsRef<str>>(
    dir: &Path,
    kinds: &[S],
    case_count: usize,
) -> Result<Vec<AggregateReport>, BladeError> {
    kinds
        .iter()
        .map(|kind| aggregate(dir, kind.as_ref(), case_count))
        .collect()
}
