//! Plain-text file helpers shared by the planners and aggregators.

use std::fs;
use std::io::{self, Write};
use std::path::Path;

use blade_core::errors::{BladeError, ErrorInfo};
use tempfile::NamedTempFile;

/// Builds a workspace error carrying the offending path.
pub(crate) fn io_error(code: &str, path: &Path, err: impl ToString) -> BladeError {
    BladeError::Workspace(
        ErrorInfo::new(code, err.to_string()).with_context("path", path.display().to_string()),
    )
}

/// Outcome of an exclusive create.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Persisted {
    /// This process wrote the file.
    Created,
    /// Another writer got there first; its contents were left untouched.
    Existing,
}

fn staged(path: &Path, contents: &str) -> Result<NamedTempFile, BladeError> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir).map_err(|err| io_error("stage_dir", dir, err))?;
    let mut tmp = NamedTempFile::new_in(dir).map_err(|err| io_error("stage_create", dir, err))?;
    tmp.write_all(contents.as_bytes())
        .and_then(|_| tmp.as_file().sync_all())
        .map_err(|err| io_error("stage_write", path, err))?;
    Ok(tmp)
}

/// Writes `contents` to `path` only if no file exists there yet.
///
/// The file is staged next to its destination and linked into place with a
/// no-clobber rename, so readers never observe a partially written file and
/// exactly one concurrent creator wins.
pub(crate) fn persist_new(path: &Path, contents: &str) -> Result<Persisted, BladeError> {
    let tmp = staged(path, contents)?;
    match tmp.persist_noclobber(path) {
        Ok(_) => Ok(Persisted::Created),
        Err(err) if err.error.kind() == io::ErrorKind::AlreadyExists => Ok(Persisted::Existing),
        Err(err) => Err(io_error("persist_new", path, err.error)),
    }
}

/// Replaces `path` with `contents` in a single rename.
pub(crate) fn persist_replace(path: &Path, contents: &str) -> Result<(), BladeError> {
    let tmp = staged(path, contents)?;
    tmp.persist(path)
        .map(|_| ())
        .map_err(|err| io_error("persist_replace", path, err.error))
}

/// Joins lines with a trailing newline after each entry.
pub(crate) fn join_lines<I, S>(lines: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut out = String::new();
    for line in lines {
        out.push_str(line.as_ref());
        out.push('\n');
    }
    out
}

/// Parses one float per non-empty line.
pub(crate) fn parse_column(text: &str) -> Result<Vec<f64>, String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .enumerate()
        .map(|(idx, line)| {
            line.parse::<f64>()
                .map_err(|err| format!("line {}: {err}", idx + 1))
        })
        .collect()
}

/// Reads a one-value-per-line numeric file.
pub(crate) fn read_column(path: &Path) -> Result<Vec<f64>, BladeError> {
    let text = fs::read_to_string(path).map_err(|err| io_error("column_read", path, err))?;
    parse_column(&text).map_err(|err| {
        BladeError::Serde(
            ErrorInfo::new("column_parse", err).with_context("path", path.display().to_string()),
        )
    })
}
