//! Training matrix handed to the surrogate fitting library.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use blade_core::errors::{BladeError, ErrorInfo};
use blade_core::{to_canonical_json_bytes, CampaignConfig, SurrogateModel};
use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::aggregate::{aggregate_kinds, AggregateReport};
use crate::textio::io_error;

fn master_error(code: &str, message: impl Into<String>, report: &AggregateReport) -> BladeError {
    BladeError::Aggregate(
        ErrorInfo::new(code, message)
            .with_context("kind", report.kind.as_str())
            .with_context("path", report.master_path.display().to_string()),
    )
}

fn read_master_rows(report: &AggregateReport) -> Result<BTreeMap<usize, Vec<f64>>, BladeError> {
    let text = fs::read_to_string(&report.master_path)
        .map_err(|err| io_error("master_read", &report.master_path, err))?;
    let rows: Vec<&str> = text.lines().skip(1).collect();
    if rows.len() != report.kept.len() {
        return Err(master_error(
            "master_rows",
            format!(
                "master file has {} rows but the report kept {} cases",
                rows.len(),
                report.kept.len()
            ),
            report,
        ));
    }
    report
        .kept
        .iter()
        .zip(rows)
        .map(|(index, row)| {
            row.split_whitespace()
                .map(str::parse::<f64>)
                .collect::<Result<Vec<_>, _>>()
                .map(|values| (*index, values))
                .map_err(|err| {
                    master_error("master_parse", format!("case {index}: {err}"), report)
                })
        })
        .collect()
}

/// Design inputs and responses aligned by case index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingMatrix {
    /// Approximation the matrix is meant for.
    pub model: SurrogateModel,
    /// Initial length-scale hyperparameters for the fit.
    pub theta0: Vec<f64>,
    /// Header of the design-variable master file.
    pub x_header: String,
    /// Header of the response master file.
    pub y_header: String,
    /// Case index of every row.
    pub cases: Vec<usize>,
    /// Design-variable rows.
    pub x: Vec<Vec<f64>>,
    /// Response rows.
    pub y: Vec<Vec<f64>>,
}

impl TrainingMatrix {
    /// Aligns two merged datasets, keeping cases present in both.
    pub fn from_reports(
        inputs: &AggregateReport,
        responses: &AggregateReport,
        model: SurrogateModel,
        theta0: &[f64],
    ) -> Result<Self, BladeError> {
        let x_rows = read_master_rows(inputs)?;
        let mut y_rows = read_master_rows(responses)?;
        let mut matrix = Self {
            model,
            theta0: theta0.to_vec(),
            x_header: inputs.header.clone(),
            y_header: responses.header.clone(),
            cases: Vec::new(),
            x: Vec::new(),
            y: Vec::new(),
        };
        for (index, x_row) in x_rows {
            if let Some(y_row) = y_rows.remove(&index) {
                matrix.cases.push(index);
                matrix.x.push(x_row);
                matrix.y.push(y_row);
            } else {
                warn!("case {index} has no {} row; left out of training", responses.kind);
            }
        }
        for index in y_rows.keys() {
            warn!("case {index} has no {} row; left out of training", inputs.kind);
        }
        debug!(
            "training matrix {} x {} with {} rows",
            inputs.kind,
            responses.kind,
            matrix.cases.len()
        );
        Ok(matrix)
    }

    /// Number of aligned rows.
    pub fn len(&self) -> usize {
        self.cases.len()
    }

    /// True when no case is present in both datasets.
    pub fn is_empty(&self) -> bool {
        self.cases.is_empty()
    }

    /// Writes the matrix as canonical JSON.
    pub fn write(&self, path: &Path) -> Result<(), BladeError> {
        let bytes = to_canonical_json_bytes(self)?;
        fs::write(path, bytes).map_err(|err| io_error("training_write", path, err))
    }
}

/// Merges every configured result kind in `dir` and pairs the first kind
/// (the design variables) with each of the others.
///
/// Returns one matrix per response kind, in configured order.
pub fn build_training_matrices(
    dir: &Path,
    config: &CampaignConfig,
    case_count: usize,
) -> Result<Vec<TrainingMatrix>, BladeError> {
    let kinds = &config.surrogate.kinds;
    if kinds.len() < 2 {
        return Err(BladeError::Config(
            ErrorInfo::new(
                "surrogate-kinds",
                "need a design-variable kind and at least one response kind",
            )
            .with_context("kinds", kinds.join(",")),
        ));
    }
    let model = config.surrogate_model()?;
    let reports = aggregate_kinds(dir, kinds.as_slice(), case_count)?;
    let (inputs, responses) = reports.split_at(1);
    responses
        .iter()
        .map(|response| {
            TrainingMatrix::from_reports(&inputs[0], response, model, &config.surrogate.theta0)
        })
        .collect()
}
