//! Worst-case damage envelopes across cases.

use std::path::{Path, PathBuf};

use blade_core::errors::{BladeError, ErrorInfo};
use blade_core::{Baseline, GaugeGroup};
use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::cases::case_id;
use crate::catalog::Scenario;
use crate::textio::{join_lines, persist_replace, read_column};
use crate::workspace::{IsolationMode, WorkspaceLayout};

/// Envelope written for the flapwise axis.
pub const X_ENVELOPE_FILE: &str = "xDEM_max.txt";
/// Envelope written for the edgewise axis.
pub const Y_ENVELOPE_FILE: &str = "yDEM_max.txt";
/// Scenarios attributing at least one station.
pub const ACTIVE_LIST_FILE: &str = "active_wnd.txt";

/// Response axis of a damage-equivalent moment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Axis {
    /// Flapwise.
    X,
    /// Edgewise.
    Y,
}

impl Axis {
    /// File name prefix used by the solver post-processing.
    pub fn prefix(&self) -> &'static str {
        match self {
            Axis::X => "x",
            Axis::Y => "y",
        }
    }
}

/// Per-station maximum and the case that produced it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    /// Maximum per station.
    pub values: Vec<f64>,
    /// Index of the first case reaching each maximum, if any did.
    pub attribution: Vec<Option<usize>>,
}

/// Scans cases in order and keeps, per station, the strictly greatest value.
///
/// With [`Baseline::Zero`] a station whose values never exceed zero stays at
/// zero with no attribution.
pub fn reduce(vectors: &[Vec<f64>], baseline: Baseline) -> Result<Envelope, BladeError> {
    let stations = vectors.first().map_or(0, Vec::len);
    let start = match baseline {
        Baseline::Unset => f64::NEG_INFINITY,
        Baseline::Zero => 0.0,
    };
    let mut envelope = Envelope {
        values: vec![start; stations],
        attribution: vec![None; stations],
    };
    for (case, vector) in vectors.iter().enumerate() {
        if vector.len() != stations {
            return Err(BladeError::Bounds(
                ErrorInfo::new("station-count", "case reports a different number of stations")
                    .with_context("case", case.to_string())
                    .with_context("stations", vector.len().to_string())
                    .with_context("expected", stations.to_string()),
            ));
        }
        for (station, value) in vector.iter().enumerate() {
            if *value > envelope.values[station] {
                envelope.values[station] = *value;
                envelope.attribution[station] = Some(case);
            }
        }
    }
    Ok(envelope)
}

/// Station vectors gathered for one axis, one per readable case.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StationVectors {
    /// Input name of the scenario behind each vector.
    pub names: Vec<String>,
    /// Station values, root first.
    pub vectors: Vec<Vec<f64>>,
    /// 1-based scenario positions that could not be read.
    pub missing: Vec<usize>,
}

fn read_station_vector(
    layout: &WorkspaceLayout,
    mode: IsolationMode,
    position: usize,
    groups: &[GaugeGroup],
    axis: Axis,
) -> Result<Vec<f64>, BladeError> {
    let mut files = Vec::with_capacity(groups.len() + 1);
    if let Some(first) = groups.first() {
        let dir = layout.gauge_dir(mode, first.tag).join(case_id(position, first.tag));
        files.push(dir.join(format!("{}Root.txt", axis.prefix())));
    }
    for group in groups {
        let station = group.first_station().ok_or_else(|| {
            BladeError::Config(
                ErrorInfo::new("gauge-stations", "gauge group has no stations")
                    .with_context("tag", group.tag.to_string()),
            )
        })?;
        let dir = layout.gauge_dir(mode, group.tag).join(case_id(position, group.tag));
        files.push(dir.join(format!("{}DEM_{station}.txt", axis.prefix())));
    }
    let mut values = Vec::new();
    for file in files {
        values.extend(read_column(&file)?);
    }
    Ok(values)
}

/// Reads the root and gauge-group DEM files of every scenario for one axis
/// from the run directories of `mode`.
///
/// Scenarios whose files are missing or unreadable are skipped and listed in
/// [`StationVectors::missing`].
pub fn collect_station_vectors(
    layout: &WorkspaceLayout,
    mode: IsolationMode,
    scenarios: &[Scenario],
    groups: &[GaugeGroup],
    axis: Axis,
) -> StationVectors {
    let mut collected = StationVectors::default();
    for (offset, scenario) in scenarios.iter().enumerate() {
        let position = offset + 1;
        match read_station_vector(layout, mode, position, groups, axis) {
            Ok(vector) => {
                collected.names.push(scenario.input_name.clone());
                collected.vectors.push(vector);
            }
            Err(err) => {
                warn!("skipping scenario {position} ({}): {err}", scenario.input_name);
                collected.missing.push(position);
            }
        }
    }
    collected
}

/// Envelopes of both axes with the scenario names they are attributed to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReducedEnvelopes {
    /// Flapwise envelope.
    pub x: Envelope,
    /// Edgewise envelope.
    pub y: Envelope,
    /// Scenario name per flapwise case index.
    pub x_names: Vec<String>,
    /// Scenario name per edgewise case index.
    pub y_names: Vec<String>,
}

/// Paths written by [`ReducedEnvelopes::write`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvelopeFiles {
    /// Flapwise envelope file.
    pub x: PathBuf,
    /// Edgewise envelope file.
    pub y: PathBuf,
    /// Active scenario list.
    pub active: PathBuf,
}

impl ReducedEnvelopes {
    /// Reduces both axes.
    pub fn from_vectors(
        x: &StationVectors,
        y: &StationVectors,
        baseline: Baseline,
    ) -> Result<Self, BladeError> {
        Ok(Self {
            x: reduce(&x.vectors, baseline)?,
            y: reduce(&y.vectors, baseline)?,
            x_names: x.names.clone(),
            y_names: y.names.clone(),
        })
    }

    /// Distinct attributing scenarios, flapwise first, in first-seen order.
    pub fn active_inputs(&self) -> Vec<String> {
        let mut active: Vec<String> = Vec::new();
        let sources = self
            .x
            .attribution
            .iter()
            .map(|case| (case, &self.x_names))
            .chain(self.y.attribution.iter().map(|case| (case, &self.y_names)));
        for (case, names) in sources {
            if let Some(name) = case.and_then(|idx| names.get(idx)) {
                if !active.contains(name) {
                    active.push(name.clone());
                }
            }
        }
        active
    }

    /// Writes both envelopes scaled by `scale` and the active scenario list.
    pub fn write(&self, dir: &Path, scale: f64) -> Result<EnvelopeFiles, BladeError> {
        let files = EnvelopeFiles {
            x: dir.join(X_ENVELOPE_FILE),
            y: dir.join(Y_ENVELOPE_FILE),
            active: dir.join(ACTIVE_LIST_FILE),
        };
        persist_replace(
            &files.x,
            &join_lines(self.x.values.iter().map(|value| (value * scale).to_string())),
        )?;
        persist_replace(
            &files.y,
            &join_lines(self.y.values.iter().map(|value| (value * scale).to_string())),
        )?;
        let active = self.active_inputs();
        persist_replace(&files.active, &join_lines(&active))?;
        debug!(
            "envelope over {} stations attributed to {} scenarios",
            self.x.values.len(),
            active.len()
        );
        Ok(files)
    }
}

/// Loads an envelope written by [`ReducedEnvelopes::write`].
pub fn read_envelope(path: &Path) -> Result<Vec<f64>, BladeError> {
    read_column(path)
}
