use blade_core::errors::{BladeError, ErrorInfo};
use blade_core::{Category, GaugeGroup};
use log::debug;
use serde::{Deserialize, Serialize};

use crate::catalog::Scenario;

/// Prefix shared by every case identifier.
pub const CASE_PREFIX: &str = "WNDfile";

/// One scenario evaluated for one gauge group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Case {
    /// 1-based position in the ordered case list.
    pub index: usize,
    /// Scenario driving the run.
    pub scenario: Scenario,
    /// 1-based position of the scenario in catalog order.
    pub scenario_position: usize,
    /// Gauge group tag.
    pub gauge: u32,
    /// Run identifier, also the run directory name.
    pub id: String,
}

impl Case {
    /// Category of the case's wind input.
    pub fn category(&self) -> Category {
        self.scenario.category
    }

    /// Rotor parked flag.
    pub fn parked(&self) -> bool {
        self.scenario.parked
    }
}

/// Formats a case identifier from a scenario position and gauge tag.
pub fn case_id(position: usize, gauge_tag: u32) -> String {
    format!("{CASE_PREFIX}{position}_sgp{gauge_tag}")
}

/// Builds the ordered case list: gauge groups outer, scenarios inner.
///
/// When `selected` is set every identifier carries that position instead of
/// the scenario's own, matching runs that evaluate a single chosen case.
pub fn build_case_list(
    scenarios: &[Scenario],
    gauge_groups: &[GaugeGroup],
    selected: Option<usize>,
) -> Vec<Case> {
    let mut cases = Vec::with_capacity(scenarios.len() * gauge_groups.len());
    for group in gauge_groups {
        for (offset, scenario) in scenarios.iter().enumerate() {
            let position = offset + 1;
            cases.push(Case {
                index: cases.len() + 1,
                scenario: scenario.clone(),
                scenario_position: position,
                gauge: group.tag,
                id: case_id(selected.unwrap_or(position), group.tag),
            });
        }
    }
    debug!(
        "expanded {} scenarios over {} gauge groups into {} cases",
        scenarios.len(),
        gauge_groups.len(),
        cases.len()
    );
    cases
}

/// Reorders a scenario-major column into gauge-group-major order.
///
/// Entry `j * scenario_count + i` of the result is entry
/// `i * gauge_count + j` of `items`.
pub fn transpose_to_gauge_major<T: Clone>(
    items: &[T],
    scenario_count: usize,
    gauge_count: usize,
) -> Result<Vec<T>, BladeError> {
    if items.len() != scenario_count * gauge_count {
        return Err(BladeError::Bounds(
            ErrorInfo::new("transpose-shape", "column length does not match scenarios x gauges")
                .with_context("len", items.len().to_string())
                .with_context("scenarios", scenario_count.to_string())
                .with_context("gauges", gauge_count.to_string()),
        ));
    }
    let mut out = Vec::with_capacity(items.len());
    for j in 0..gauge_count {
        for i in 0..scenario_count {
            out.push(items[i * gauge_count + j].clone());
        }
    }
    Ok(out)
}
