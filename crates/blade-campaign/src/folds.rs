//! Cross-validation folds over surrogate training points.

use std::path::Path;

use blade_core::errors::{BladeError, ErrorInfo};
use blade_core::{substream_rng, FOLD_SHUFFLE_STREAM};
use log::info;
use rand::seq::SliceRandom;

pub use blade_core::validate_folds;

use crate::textio::{join_lines, persist_new, read_column, Persisted};

fn shuffle_error(code: &str, message: impl Into<String>, path: &Path) -> BladeError {
    BladeError::Plan(ErrorInfo::new(code, message).with_context("path", path.display().to_string()))
}

fn read_shuffled(path: &Path, num_pts: usize) -> Result<Vec<usize>, BladeError> {
    let values = read_column(path)?;
    if values.len() != num_pts {
        return Err(shuffle_error(
            "shuffled_len",
            format!("shuffled list has {} entries, expected {num_pts}", values.len()),
            path,
        ));
    }
    let mut seen = vec![false; num_pts];
    let mut indices = Vec::with_capacity(num_pts);
    for value in values {
        if !(value >= 0.0 && value.fract() == 0.0 && value < num_pts as f64) {
            return Err(shuffle_error(
                "shuffled_index",
                format!("{value} is not a training point index"),
                path,
            ));
        }
        let index = value as usize;
        if std::mem::replace(&mut seen[index], true) {
            return Err(shuffle_error(
                "shuffled_duplicate",
                format!("index {index} appears twice"),
                path,
            ));
        }
        indices.push(index);
    }
    Ok(indices)
}

/// Loads or creates the shuffled index list at `path` and splits it into
/// `num_folds` contiguous groups of equal size.
///
/// Indices are zero-based and stored one per line as floats.
pub fn kfold_partition(
    num_pts: usize,
    num_folds: usize,
    path: &Path,
    seed: u64,
) -> Result<Vec<Vec<usize>>, BladeError> {
    let fold_size = validate_folds(num_pts, num_folds)?;
    let shuffled = if path.exists() {
        read_shuffled(path, num_pts)?
    } else {
        let mut indices: Vec<usize> = (0..num_pts).collect();
        indices.shuffle(&mut substream_rng(seed, FOLD_SHUFFLE_STREAM));
        let text = join_lines(indices.iter().map(|idx| format!("{:.1}", *idx as f64)));
        match persist_new(path, &text)? {
            Persisted::Created => {
                info!("created shuffled list {} for {num_folds} folds", path.display());
                indices
            }
            Persisted::Existing => {
                info!("shuffled list {} was created concurrently; reading it", path.display());
                read_shuffled(path, num_pts)?
            }
        }
    };
    Ok(shuffled
        .chunks(fold_size)
        .map(<[usize]>::to_vec)
        .collect())
}
