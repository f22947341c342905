//! Space-filling sampling plans and design-variable scaling.

use std::fs;
use std::path::{Path, PathBuf};

use blade_core::errors::{BladeError, ErrorInfo};
use blade_core::{substream_rng, TurbineTemplate, TurbulenceClass, VariableSelection, SAMPLING_PLAN_STREAM};
use log::info;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

use crate::textio::{io_error, join_lines, persist_new, Persisted};

fn plan_error(code: &str, message: impl Into<String>, path: &Path) -> BladeError {
    BladeError::Plan(ErrorInfo::new(code, message).with_context("path", path.display().to_string()))
}

/// Training-point matrix over the unit hypercube, one row per sample.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SamplingPlan {
    /// Number of columns.
    pub num_vars: usize,
    /// Number of rows.
    pub num_samples: usize,
    /// Row-major sample values in `[0, 1)`.
    pub points: Vec<Vec<f64>>,
}

impl SamplingPlan {
    /// Center-of-cell Latin hypercube: every column holds each stratum midpoint exactly once.
    pub fn latin_hypercube(num_vars: usize, num_samples: usize, seed: u64) -> Self {
        let mut rng = substream_rng(seed, SAMPLING_PLAN_STREAM);
        let base_slots: Vec<f64> = (0..num_samples)
            .map(|i| (i as f64 + 0.5) / num_samples as f64)
            .collect();
        let mut points = vec![vec![0.0; num_vars]; num_samples];
        for var in 0..num_vars {
            let mut slots = base_slots.clone();
            slots.shuffle(&mut rng);
            for (row, value) in points.iter_mut().zip(slots) {
                row[var] = value;
            }
        }
        Self {
            num_vars,
            num_samples,
            points,
        }
    }

    /// Parses whitespace-delimited rows and checks the matrix shape.
    pub fn parse(text: &str, num_vars: usize, num_samples: usize) -> Result<Self, String> {
        let mut points = Vec::with_capacity(num_samples);
        for (line_no, line) in text.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            let row = line
                .split_whitespace()
                .map(str::parse::<f64>)
                .collect::<Result<Vec<_>, _>>()
                .map_err(|err| format!("line {}: {err}", line_no + 1))?;
            if row.len() != num_vars {
                return Err(format!(
                    "line {} has {} columns, expected {num_vars}",
                    line_no + 1,
                    row.len()
                ));
            }
            points.push(row);
        }
        if points.len() != num_samples {
            return Err(format!(
                "plan has {} rows, expected {num_samples}",
                points.len()
            ));
        }
        Ok(Self {
            num_vars,
            num_samples,
            points,
        })
    }

    /// Text form: one row per line, values separated by single spaces.
    pub fn to_text(&self) -> String {
        join_lines(self.points.iter().map(|row| {
            row.iter()
                .map(|value| value.to_string())
                .collect::<Vec<_>>()
                .join(" ")
        }))
    }

    /// Copies out one column.
    pub fn column(&self, var: usize) -> Option<Vec<f64>> {
        (var < self.num_vars).then(|| self.points.iter().map(|row| row[var]).collect())
    }
}

fn read_plan(path: &Path, num_vars: usize, num_samples: usize) -> Result<SamplingPlan, BladeError> {
    let text = fs::read_to_string(path).map_err(|err| io_error("plan_read", path, err))?;
    SamplingPlan::parse(&text, num_vars, num_samples).map_err(|err| {
        BladeError::Plan(
            ErrorInfo::new("plan_shape", err)
                .with_context("path", path.display().to_string())
                .with_context("num_vars", num_vars.to_string())
                .with_context("num_samples", num_samples.to_string())
                .with_hint("delete the plan file to regenerate it for the new shape"),
        )
    })
}

/// Loads the plan at `path`, creating it first if absent.
///
/// Creation is exclusive: when several processes race, exactly one plan is
/// written and every caller returns its contents.
pub fn get_or_create_plan(
    num_vars: usize,
    num_samples: usize,
    path: &Path,
    seed: u64,
) -> Result<SamplingPlan, BladeError> {
    if path.exists() {
        info!("reusing sampling plan {}", path.display());
        return read_plan(path, num_vars, num_samples);
    }
    let plan = SamplingPlan::latin_hypercube(num_vars, num_samples, seed);
    match persist_new(path, &plan.to_text())? {
        Persisted::Created => {
            info!(
                "created sampling plan {} ({num_samples} samples x {num_vars} variables)",
                path.display()
            );
            Ok(plan)
        }
        Persisted::Existing => {
            info!("sampling plan {} was created concurrently; reading it", path.display());
            read_plan(path, num_vars, num_samples)
        }
    }
}

/// Returns one plan entry, failing loudly when either index is out of range.
pub fn select_sample(
    plan: &SamplingPlan,
    sample_index: usize,
    var_index: usize,
) -> Result<f64, BladeError> {
    plan.points
        .get(sample_index)
        .and_then(|row| row.get(var_index))
        .copied()
        .ok_or_else(|| {
            BladeError::Bounds(
                ErrorInfo::new("sample-index", "sample or variable index outside the plan")
                    .with_context("sample_index", sample_index.to_string())
                    .with_context("var_index", var_index.to_string())
                    .with_context("num_samples", plan.num_samples.to_string())
                    .with_context("num_vars", plan.num_vars.to_string()),
            )
        })
}

/// Closed interval a design variable is sampled from.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Domain {
    /// Lower bound.
    pub low: f64,
    /// Upper bound.
    pub high: f64,
}

impl Domain {
    /// Builds a domain from its bounds.
    pub const fn new(low: f64, high: f64) -> Self {
        Self { low, high }
    }

    /// Width of the domain.
    pub fn width(&self) -> f64 {
        self.high - self.low
    }

    /// Window of half-width `frac * width` around `current`, clamped to this domain.
    pub fn narrow(&self, current: f64, frac: f64) -> Domain {
        let half = frac * self.width();
        Domain {
            low: (current - half).max(self.low),
            high: (current + half).min(self.high),
        }
    }

    /// Maps a unit-interval value linearly onto the domain.
    pub fn scale(&self, raw: f64) -> f64 {
        raw * self.width() + self.low
    }
}

/// Scales a raw plan column, optionally narrowing around `(current, frac)` first.
pub fn scale_variable(raw: &[f64], domain: Domain, restrict: Option<(f64, f64)>) -> Vec<f64> {
    let effective = match restrict {
        Some((current, frac)) => domain.narrow(current, frac),
        None => domain,
    };
    raw.iter().map(|value| effective.scale(*value)).collect()
}

/// Design variable with its full domain and current control-point values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DesignVariable {
    /// Variable name, also used in domain file names.
    pub name: String,
    /// Control points that are sampled, in column order.
    pub sub_indices: Vec<usize>,
    /// Full domain shared by all control points.
    pub domain: Domain,
    /// Current value of every control point.
    pub initial: Vec<f64>,
}

/// Ordered set of sampled design variables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DesignSpace {
    /// Variables in column order.
    pub variables: Vec<DesignVariable>,
}

const CHORD_DOMAIN: Domain = Domain::new(1.3, 5.3);
const TWIST_DOMAIN: Domain = Domain::new(-10.0, 30.0);

/// Chord, twist and turbulence-intensity variables of a turbine template.
///
/// Chord bounds are quoted for the reference blade and rescaled by blade length.
pub fn default_design_space(template: &TurbineTemplate, turbulence: TurbulenceClass) -> DesignSpace {
    let ratio = template.length_ratio();
    let ti = turbulence.intensity();
    DesignSpace {
        variables: vec![
            DesignVariable {
                name: "chord_sub".to_string(),
                sub_indices: (0..template.chord_init.len()).collect(),
                domain: Domain::new(CHORD_DOMAIN.low * ratio, CHORD_DOMAIN.high * ratio),
                initial: template.chord_init.to_vec(),
            },
            DesignVariable {
                name: "theta_sub".to_string(),
                sub_indices: (0..template.twist_init.len()).collect(),
                domain: TWIST_DOMAIN,
                initial: template.twist_init.to_vec(),
            },
            DesignVariable {
                name: "turbulence_intensity".to_string(),
                sub_indices: vec![0],
                domain: Domain::new(ti, ti),
                initial: vec![ti],
            },
        ],
    }
}

/// Column of the design space: which variable and control point it samples.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnDomain {
    /// Variable name.
    pub name: String,
    /// Control-point index within the variable.
    pub sub_index: usize,
    /// Effective sampling domain.
    pub domain: Domain,
}

impl DesignSpace {
    /// Keeps the selected variables and control points, in selection order.
    pub fn select(&self, selections: &[VariableSelection]) -> Result<DesignSpace, BladeError> {
        let mut variables = Vec::with_capacity(selections.len());
        for selection in selections {
            let var = self
                .variables
                .iter()
                .find(|var| var.name == selection.name)
                .ok_or_else(|| {
                    BladeError::Config(
                        ErrorInfo::new("unknown-variable", "sampled variable is not a design variable")
                            .with_context("variable", selection.name.as_str()),
                    )
                })?;
            if let Some(bad) = selection.sub_indices.iter().find(|idx| **idx >= var.initial.len()) {
                return Err(BladeError::Bounds(
                    ErrorInfo::new("variable-index", "control point index out of range")
                        .with_context("variable", var.name.as_str())
                        .with_context("index", bad.to_string()),
                ));
            }
            variables.push(DesignVariable {
                sub_indices: selection.sub_indices.clone(),
                ..var.clone()
            });
        }
        Ok(DesignSpace { variables })
    }

    /// Number of plan columns.
    pub fn num_columns(&self) -> usize {
        self.variables.iter().map(|var| var.sub_indices.len()).sum()
    }

    /// Effective domain of every column; `restrict` narrows around the current design.
    pub fn effective_domains(&self, restrict: Option<f64>) -> Vec<ColumnDomain> {
        let mut columns = Vec::with_capacity(self.num_columns());
        for var in &self.variables {
            for &sub_index in &var.sub_indices {
                let domain = match restrict {
                    Some(frac) => var.domain.narrow(var.initial[sub_index], frac),
                    None => var.domain,
                };
                columns.push(ColumnDomain {
                    name: var.name.clone(),
                    sub_index,
                    domain,
                });
            }
        }
        columns
    }

    /// Writes `domain_{name}.txt` per variable: the name, then lower and upper bound per control point.
    pub fn write_domain_files(
        &self,
        dir: &Path,
        restrict: Option<f64>,
    ) -> Result<Vec<PathBuf>, BladeError> {
        fs::create_dir_all(dir).map_err(|err| io_error("domain_dir", dir, err))?;
        let columns = self.effective_domains(restrict);
        let mut written = Vec::with_capacity(self.variables.len());
        for var in &self.variables {
            let mut lines = vec![var.name.clone()];
            for column in columns.iter().filter(|column| column.name == var.name) {
                lines.push(column.domain.low.to_string());
                lines.push(column.domain.high.to_string());
            }
            let path = domain_file_path(dir, &var.name);
            fs::write(&path, join_lines(&lines)).map_err(|err| io_error("domain_write", &path, err))?;
            written.push(path);
        }
        Ok(written)
    }

    /// Scaled design for one training point: current values with the sampled
    /// control points replaced by the plan row.
    pub fn training_point(
        &self,
        plan: &SamplingPlan,
        sample_index: usize,
        restrict: Option<f64>,
    ) -> Result<Vec<DesignVariable>, BladeError> {
        if plan.num_vars != self.num_columns() {
            return Err(BladeError::Plan(
                ErrorInfo::new("plan_columns", "plan width does not match the design space")
                    .with_context("num_vars", plan.num_vars.to_string())
                    .with_context("columns", self.num_columns().to_string()),
            ));
        }
        let columns = self.effective_domains(restrict);
        let mut design = self.variables.clone();
        let mut col = 0;
        for var in &mut design {
            for &sub_index in &var.sub_indices {
                let raw = select_sample(plan, sample_index, col)?;
                var.initial[sub_index] = columns[col].domain.scale(raw);
                col += 1;
            }
        }
        Ok(design)
    }
}

/// Path of the domain file for a variable.
pub fn domain_file_path(dir: &Path, name: &str) -> PathBuf {
    dir.join(format!("domain_{name}.txt"))
}

/// Reads a domain file back into its variable name and per-control-point domains.
pub fn read_domain_file(path: &Path) -> Result<(String, Vec<Domain>), BladeError> {
    let text = fs::read_to_string(path).map_err(|err| io_error("domain_read", path, err))?;
    let mut lines = text.lines().map(str::trim).filter(|line| !line.is_empty());
    let name = lines
        .next()
        .ok_or_else(|| plan_error("domain_empty", "domain file is empty", path))?
        .to_string();
    let bounds = lines
        .map(str::parse::<f64>)
        .collect::<Result<Vec<_>, _>>()
        .map_err(|err| plan_error("domain_parse", err.to_string(), path))?;
    if bounds.len() % 2 != 0 {
        return Err(plan_error("domain_pairs", "domain bounds must come in pairs", path));
    }
    let domains = bounds
        .chunks(2)
        .map(|pair| Domain::new(pair[0], pair[1]))
        .collect();
    Ok((name, domains))
}
