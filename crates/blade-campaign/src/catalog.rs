//! Expansion of symbolic load-case classes into named wind scenarios.

use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use blade_core::errors::{BladeError, ErrorInfo};
use blade_core::{CatalogConfig, Category, LoadCaseClass};
use log::{debug, warn};
use serde::{Deserialize, Serialize};

const NOMINAL_INPUT: &str = "nom.wnd";

const GUST_INPUTS: [&str; 6] = [
    "ECD+R+2.0.wnd",
    "ECD+R-2.0.wnd",
    "ECD-R+2.0.wnd",
    "ECD-R-2.0.wnd",
    "ECD+R.wnd",
    "ECD-R.wnd",
];

const SHEAR_INPUTS: [&str; 4] = [
    "EWSH+12.0.wnd",
    "EWSH-12.0.wnd",
    "EWSV+12.0.wnd",
    "EWSV-12.0.wnd",
];

/// One named wind condition driving a single solver invocation per gauge group.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Scenario {
    /// Class the scenario was expanded from.
    pub class: LoadCaseClass,
    /// Wind input file name, relative to the category's source directory.
    pub input_name: String,
    /// Source category of the wind input.
    pub category: Category,
    /// Rotor is parked (idling) for this scenario.
    pub parked: bool,
}

impl Scenario {
    fn new(class: LoadCaseClass, input_name: impl Into<String>, category: Category) -> Self {
        Self {
            class,
            input_name: input_name.into(),
            category,
            parked: false,
        }
    }

    fn parked(mut self) -> Self {
        self.parked = true;
        self
    }
}

/// Name of the turbulent wind file generated for one seed and mean wind speed.
///
/// `seed_index` is 1-based and the wind speed is truncated towards zero.
pub fn turbulent_input_name(tag: &str, seed_index: usize, mean_wind_speed: f64) -> String {
    format!("dlc_{tag}_seed{seed_index}_mws{}.hh", mean_wind_speed.trunc() as i64)
}

/// Accumulated catalog output.
///
/// `categories` and `parked` hold one entry per scenario and gauge group, in
/// scenario-major order, which is the layout downstream tooling consumes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CatalogExpansion {
    /// Scenarios in catalog order.
    pub scenarios: Vec<Scenario>,
    /// Category column replicated per gauge group.
    pub categories: Vec<Category>,
    /// Parked column replicated per gauge group.
    pub parked: Vec<bool>,
}

impl CatalogExpansion {
    /// Expands every configured class and applies the active list when one is set.
    pub fn from_config(catalog: &CatalogConfig, gauge_count: usize) -> Result<Self, BladeError> {
        catalog.classes()?;
        let mut expansion = Self::default();
        for id in &catalog.load_cases {
            expand_class(
                id,
                &catalog.seeds,
                &catalog.mean_wind_speeds,
                gauge_count,
                &mut expansion,
            );
        }
        if let Some(path) = &catalog.active_list {
            let active = load_active_list(path)?;
            expansion.retain_inputs(&active);
        }
        debug!(
            "catalog expanded {} classes into {} scenarios",
            catalog.load_cases.len(),
            expansion.scenarios.len()
        );
        Ok(expansion)
    }

    /// Number of expanded scenarios.
    pub fn len(&self) -> usize {
        self.scenarios.len()
    }

    /// True when nothing has been expanded.
    pub fn is_empty(&self) -> bool {
        self.scenarios.is_empty()
    }

    fn push(&mut self, scenario: Scenario, gauge_count: usize) {
        for _ in 0..gauge_count {
            self.categories.push(scenario.category);
            self.parked.push(scenario.parked);
        }
        self.scenarios.push(scenario);
    }

    /// Keeps only scenarios whose input name appears in `names`.
    pub fn retain_inputs<S: AsRef<str>>(&mut self, names: &[S]) {
        let keep: BTreeSet<&str> = names.iter().map(AsRef::as_ref).collect();
        let before = self.scenarios.len();
        if self.categories.is_empty() || before == 0 {
            self.scenarios
                .retain(|scenario| keep.contains(scenario.input_name.as_str()));
        } else {
            let width = self.categories.len() / before;
            let mut scenarios = Vec::new();
            let mut categories = Vec::new();
            let mut parked = Vec::new();
            let rows = self
                .scenarios
                .drain(..)
                .zip(self.categories.chunks(width).zip(self.parked.chunks(width)));
            for (scenario, (cats, parks)) in rows {
                if keep.contains(scenario.input_name.as_str()) {
                    categories.extend_from_slice(cats);
                    parked.extend_from_slice(parks);
                    scenarios.push(scenario);
                }
            }
            self.scenarios = scenarios;
            self.categories = categories;
            self.parked = parked;
        }
        debug!(
            "active list kept {} of {} scenarios",
            self.scenarios.len(),
            before
        );
    }
}

/// Appends the scenarios of one class to `out`.
///
/// Returns `false` and leaves `out` untouched when `class_id` is not a
/// recognized class; callers validate the class list beforehand.
pub fn expand_class(
    class_id: &str,
    seeds: &[u32],
    mean_wind_speeds: &[f64],
    gauge_count: usize,
    out: &mut CatalogExpansion,
) -> bool {
    let Some(class) = LoadCaseClass::from_id(class_id) else {
        warn!("ignoring unrecognized load case class {class_id}");
        return false;
    };
    match class {
        LoadCaseClass::Nominal => {
            out.push(
                Scenario::new(class, NOMINAL_INPUT, Category::NonTurbulent),
                gauge_count,
            );
        }
        LoadCaseClass::NormalTurbulence | LoadCaseClass::ExtremeTurbulence => {
            let tag = class.turbulence_tag().unwrap_or_default();
            for seed_index in 1..=seeds.len() {
                for mws in mean_wind_speeds {
                    let name = turbulent_input_name(tag, seed_index, *mws);
                    out.push(Scenario::new(class, name, Category::Turbulent), gauge_count);
                }
            }
        }
        LoadCaseClass::CoherentGust => {
            for name in GUST_INPUTS {
                out.push(Scenario::new(class, name, Category::NonTurbulent), gauge_count);
            }
        }
        LoadCaseClass::WindShear => {
            for name in SHEAR_INPUTS {
                out.push(Scenario::new(class, name, Category::NonTurbulent), gauge_count);
            }
        }
        LoadCaseClass::ParkedFiftyYear => {
            out.push(
                Scenario::new(class, "EWM50.wnd", Category::NonTurbulent).parked(),
                gauge_count,
            );
        }
        LoadCaseClass::ParkedOneYear => {
            out.push(
                Scenario::new(class, "EWM01.wnd", Category::NonTurbulent).parked(),
                gauge_count,
            );
        }
    }
    true
}

/// Reads an active-scenario list, one input name per line.
pub fn load_active_list(path: &Path) -> Result<Vec<String>, BladeError> {
    let text = fs::read_to_string(path).map_err(|err| {
        BladeError::Config(
            ErrorInfo::new("active-list-read", err.to_string())
                .with_context("path", path.display().to_string()),
        )
    })?;
    Ok(text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect())
}
