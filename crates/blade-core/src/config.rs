use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::errors::{BladeError, ErrorInfo};
use crate::hash::stable_hash_string;
use crate::load_case::LoadCaseClass;
use crate::modes::{ExtremeFit, RunMode, SurrogateModel};
use crate::serde::{from_yaml_slice, to_yaml_string};
use crate::turbine::{template, TurbineTemplate, TurbulenceClass};

fn config_error(code: &str, message: impl Into<String>) -> BladeError {
    BladeError::Config(ErrorInfo::new(code, message))
}

/// Immutable campaign configuration assembled once at startup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CampaignConfig {
    /// Campaign name; also names the optimization directory.
    pub description: String,
    /// Top-level run mode name, see [`RunMode`].
    #[serde(default = "default_mode")]
    pub mode: String,
    /// Turbine template identifier.
    #[serde(default = "default_turbine")]
    pub turbine: String,
    /// Scenario catalog inputs.
    #[serde(default)]
    pub catalog: CatalogConfig,
    /// Gauge-position groups.
    #[serde(default)]
    pub gauges: GaugeConfig,
    /// Storage layout.
    #[serde(default)]
    pub workspace: WorkspaceConfig,
    /// Surrogate design of experiments.
    #[serde(default)]
    pub sampling: SamplingConfig,
    /// Cross-validation folds.
    #[serde(default)]
    pub folds: FoldConfig,
    /// Envelope reduction.
    #[serde(default)]
    pub envelope: EnvelopeConfig,
    /// Surrogate hand-off.
    #[serde(default)]
    pub surrogate: SurrogateConfig,
}

fn default_mode() -> String {
    RunMode::CalcFixedEnvelope.name().to_string()
}

fn default_turbine() -> String {
    "NREL5MW".to_string()
}

/// Scenario classes and the turbulent wind grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogConfig {
    /// Symbolic load-case identifiers, expanded in order.
    #[serde(default = "default_load_cases")]
    pub load_cases: Vec<String>,
    /// Wind generator seeds; only their count and order name the files.
    #[serde(default = "default_seeds")]
    pub seeds: Vec<u32>,
    /// Mean wind speeds (m/s) for turbulent classes.
    #[serde(default = "default_mean_wind_speeds")]
    pub mean_wind_speeds: Vec<f64>,
    /// Optional active-case list restricting the expansion.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active_list: Option<PathBuf>,
}

fn default_load_cases() -> Vec<String> {
    vec![LoadCaseClass::Nominal.id().to_string()]
}

fn default_seeds() -> Vec<u32> {
    (1..=6).collect()
}

fn default_mean_wind_speeds() -> Vec<f64> {
    (0..10).map(|i| 5.0 + 2.0 * i as f64).collect()
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            load_cases: default_load_cases(),
            seeds: default_seeds(),
            mean_wind_speeds: default_mean_wind_speeds(),
            active_list: None,
        }
    }
}

impl CatalogConfig {
    /// Parses the configured identifiers, rejecting unknown classes.
    pub fn classes(&self) -> Result<Vec<LoadCaseClass>, BladeError> {
        self.load_cases
            .iter()
            .map(|id| {
                LoadCaseClass::from_id(id).ok_or_else(|| {
                    BladeError::Config(
                        ErrorInfo::new("unknown-load-case", "unrecognized load case class")
                            .with_context("class", id.as_str()),
                    )
                })
            })
            .collect()
    }
}

/// Named subset of blade strain-gauge stations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GaugeGroup {
    /// Group tag used in directory and case names.
    pub tag: u32,
    /// Station numbers instrumented by the group.
    pub stations: Vec<u32>,
}

impl GaugeGroup {
    /// Returns one of the stock gauge layouts (tags 1 to 4).
    pub fn preset(tag: u32) -> Option<Self> {
        let stations = match tag {
            1 => (1..=7).collect(),
            2 => (8..=14).collect(),
            3 => vec![15, 16, 17],
            4 => vec![1, 3, 5, 7, 9, 12, 17],
            _ => return None,
        };
        Some(Self { tag, stations })
    }

    /// First station of the group; it names the group's result files.
    pub fn first_station(&self) -> Option<u32> {
        self.stations.first().copied()
    }
}

/// Gauge-position groups in the order cases are laid out.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GaugeConfig {
    /// Groups in iteration order.
    #[serde(default = "default_gauge_groups")]
    pub groups: Vec<GaugeGroup>,
}

fn default_gauge_groups() -> Vec<GaugeGroup> {
    (1..=3).filter_map(GaugeGroup::preset).collect()
}

impl Default for GaugeConfig {
    fn default() -> Self {
        Self {
            groups: default_gauge_groups(),
        }
    }
}

/// How per-case solver runs are dispatched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum CalculationType {
    /// One process evaluates every case in turn.
    #[default]
    Sequential,
    /// Independent processes evaluate cases concurrently.
    Parallel,
}

/// Storage layout for wind inputs and run outputs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkspaceConfig {
    /// Root under which `WND_Files` and `Opt_Files` live.
    #[serde(default = "default_root")]
    pub root: PathBuf,
    /// Turbulence class label (A, B or C).
    #[serde(default = "default_turbulence_class")]
    pub turbulence_class: String,
    /// Turbine class label.
    #[serde(default = "default_turbine_class")]
    pub turbine_class: String,
    /// Airfoil group name embedded in surrogate output directories.
    #[serde(default = "default_airfoil_group")]
    pub airfoil_group: String,
    /// Sequential or parallel dispatch.
    #[serde(default)]
    pub calculation: CalculationType,
    /// Remove a training point's run directory once it has been evaluated.
    #[serde(default)]
    pub remove_training_dir: bool,
    /// Remove solver scratch files from case directories.
    #[serde(default = "default_true")]
    pub prune_scratch: bool,
}

fn default_root() -> PathBuf {
    PathBuf::from(".")
}

fn default_turbulence_class() -> String {
    "B".to_string()
}

fn default_turbine_class() -> String {
    "I".to_string()
}

fn default_airfoil_group() -> String {
    "af1".to_string()
}

fn default_true() -> bool {
    true
}

impl Default for WorkspaceConfig {
    fn default() -> Self {
        Self {
            root: default_root(),
            turbulence_class: default_turbulence_class(),
            turbine_class: default_turbine_class(),
            airfoil_group: default_airfoil_group(),
            calculation: CalculationType::default(),
            remove_training_dir: false,
            prune_scratch: true,
        }
    }
}

/// Design variable selected for the surrogate design of experiments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariableSelection {
    /// Design variable name.
    pub name: String,
    /// Control-point indices of the variable that are sampled.
    pub sub_indices: Vec<usize>,
}

/// Surrogate design-of-experiments settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SamplingConfig {
    /// Number of training points.
    #[serde(default = "default_num_samples")]
    pub num_samples: usize,
    /// Master seed for plan generation.
    #[serde(default = "default_sampling_seed")]
    pub seed: u64,
    /// Narrow each variable's domain around the current design.
    #[serde(default = "default_true")]
    pub restrict_to_design: bool,
    /// Half-width of the narrowed domain as a fraction of the full domain.
    #[serde(default = "default_range_fraction")]
    pub range_fraction: f64,
    /// Plan file name inside the optimization directory.
    #[serde(default = "default_plan_file")]
    pub plan_file: String,
    /// Sampled variables in column order.
    #[serde(default = "default_variables")]
    pub variables: Vec<VariableSelection>,
}

fn default_num_samples() -> usize {
    1000
}

fn default_sampling_seed() -> u64 {
    2017
}

fn default_range_fraction() -> f64 {
    0.05
}

fn default_plan_file() -> String {
    "pointfile.txt".to_string()
}

fn default_variables() -> Vec<VariableSelection> {
    vec![
        VariableSelection {
            name: "chord_sub".to_string(),
            sub_indices: vec![0, 1, 2, 3],
        },
        VariableSelection {
            name: "theta_sub".to_string(),
            sub_indices: vec![0, 1, 2, 3],
        },
        VariableSelection {
            name: "turbulence_intensity".to_string(),
            sub_indices: vec![0],
        },
    ]
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self {
            num_samples: default_num_samples(),
            seed: default_sampling_seed(),
            restrict_to_design: true,
            range_fraction: default_range_fraction(),
            plan_file: default_plan_file(),
            variables: default_variables(),
        }
    }
}

impl SamplingConfig {
    /// Fraction used for narrowing, or `None` when sampling the full domain.
    pub fn restriction(&self) -> Option<f64> {
        self.restrict_to_design.then_some(self.range_fraction)
    }

    /// Total number of plan columns.
    pub fn num_vars(&self) -> usize {
        self.variables.iter().map(|var| var.sub_indices.len()).sum()
    }
}

/// Cross-validation fold settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FoldConfig {
    /// Build folds for cross validation.
    #[serde(default)]
    pub enabled: bool,
    /// Number of folds.
    #[serde(default = "default_num_folds")]
    pub num_folds: usize,
    /// Shuffled-index file name inside the optimization directory.
    #[serde(default = "default_shuffled_file")]
    pub shuffled_file: String,
}

fn default_num_folds() -> usize {
    5
}

fn default_shuffled_file() -> String {
    "shuffled_list.txt".to_string()
}

impl Default for FoldConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            num_folds: default_num_folds(),
            shuffled_file: default_shuffled_file(),
        }
    }
}

/// Initial value of the running maximum during envelope reduction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Baseline {
    /// No value until the first case is seen; negative responses are kept.
    #[default]
    Unset,
    /// Start from zero, matching envelopes produced by older campaigns.
    Zero,
}

/// Envelope reduction settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnvelopeConfig {
    /// Accumulator initialization.
    #[serde(default)]
    pub baseline: Baseline,
    /// Factor applied when writing envelopes (kN·m to N·m).
    #[serde(default = "default_unit_scale")]
    pub unit_scale: f64,
    /// Distribution fit used for extreme-moment extrapolation.
    #[serde(default = "default_extreme_fit")]
    pub extreme_fit: String,
}

fn default_unit_scale() -> f64 {
    1.0e3
}

fn default_extreme_fit() -> String {
    "gaussian".to_string()
}

impl Default for EnvelopeConfig {
    fn default() -> Self {
        Self {
            baseline: Baseline::default(),
            unit_scale: default_unit_scale(),
            extreme_fit: default_extreme_fit(),
        }
    }
}

/// Surrogate training hand-off settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SurrogateConfig {
    /// Approximation model name understood by the fitting library.
    #[serde(default = "default_model")]
    pub model: String,
    /// Initial kriging length-scale hyperparameters.
    #[serde(default = "default_theta0")]
    pub theta0: Vec<f64>,
    /// Result kinds aggregated into master datasets.
    #[serde(default = "default_kinds")]
    pub kinds: Vec<String>,
}

fn default_model() -> String {
    "RBF".to_string()
}

fn default_theta0() -> Vec<f64> {
    vec![1.0e-2]
}

fn default_kinds() -> Vec<String> {
    ["var", "DEM", "load", "def"]
        .iter()
        .map(|kind| kind.to_string())
        .collect()
}

impl Default for SurrogateConfig {
    fn default() -> Self {
        Self {
            model: default_model(),
            theta0: default_theta0(),
            kinds: default_kinds(),
        }
    }
}

/// Checks a fold count against the number of training points and returns the fold size.
pub fn validate_folds(num_pts: usize, num_folds: usize) -> Result<usize, BladeError> {
    if num_folds == 0 {
        return Err(config_error("fold-count", "number of folds must be positive"));
    }
    if num_pts % num_folds != 0 {
        return Err(BladeError::Config(
            ErrorInfo::new("fold-divisor", "number of folds must divide the number of points")
                .with_context("num_pts", num_pts.to_string())
                .with_context("num_folds", num_folds.to_string()),
        ));
    }
    if num_folds >= num_pts {
        return Err(BladeError::Config(
            ErrorInfo::new("fold-size", "number of folds must be less than the number of points")
                .with_context("num_pts", num_pts.to_string())
                .with_context("num_folds", num_folds.to_string()),
        ));
    }
    Ok(num_pts / num_folds)
}

impl CampaignConfig {
    /// Parses the configured run mode.
    pub fn run_mode(&self) -> Result<RunMode, BladeError> {
        self.mode.parse()
    }

    /// Resolves the turbine template.
    pub fn template(&self) -> Result<&'static TurbineTemplate, BladeError> {
        template(&self.turbine)
    }

    /// Parses the turbulence class.
    pub fn turbulence_class(&self) -> Result<TurbulenceClass, BladeError> {
        TurbulenceClass::parse(&self.workspace.turbulence_class)
    }

    /// Parses the extreme-moment distribution fit.
    pub fn extreme_fit(&self) -> Result<ExtremeFit, BladeError> {
        self.envelope.extreme_fit.parse()
    }

    /// Parses the surrogate model kind.
    pub fn surrogate_model(&self) -> Result<SurrogateModel, BladeError> {
        self.surrogate.model.parse()
    }

    /// Runs every configuration check; any failure is fatal for the run.
    pub fn validate(&self) -> Result<(), BladeError> {
        if self.description.trim().is_empty() {
            return Err(config_error("description", "description must not be empty"));
        }
        self.run_mode()?;
        let tpl = self.template()?;
        self.turbulence_class()?;
        self.extreme_fit()?;
        self.surrogate_model()?;

        let classes = self.catalog.classes()?;
        if classes.iter().any(LoadCaseClass::is_turbulent) {
            if self.catalog.seeds.is_empty() || self.catalog.mean_wind_speeds.is_empty() {
                return Err(config_error(
                    "turbulent-grid",
                    "turbulent load cases need at least one seed and one mean wind speed",
                ));
            }
            if self.catalog.mean_wind_speeds.iter().any(|mws| !(*mws > 0.0)) {
                return Err(config_error(
                    "mean-wind-speed",
                    "mean wind speeds must be positive",
                ));
            }
        }

        if self.gauges.groups.is_empty() {
            return Err(config_error("gauge-groups", "at least one gauge group is required"));
        }
        let mut tags = BTreeSet::new();
        for group in &self.gauges.groups {
            if group.stations.is_empty() {
                return Err(BladeError::Config(
                    ErrorInfo::new("gauge-stations", "gauge group has no stations")
                        .with_context("tag", group.tag.to_string()),
                ));
            }
            if !tags.insert(group.tag) {
                return Err(BladeError::Config(
                    ErrorInfo::new("gauge-tag", "duplicate gauge group tag")
                        .with_context("tag", group.tag.to_string()),
                ));
            }
        }

        let sampling = &self.sampling;
        if sampling.num_samples == 0 {
            return Err(config_error("num-samples", "num_samples must be positive"));
        }
        if !(sampling.range_fraction > 0.0 && sampling.range_fraction <= 1.0) {
            return Err(config_error("range-fraction", "range_fraction must be in (0, 1]"));
        }
        for var in &sampling.variables {
            let len = match var.name.as_str() {
                "chord_sub" => tpl.chord_init.len(),
                "theta_sub" => tpl.twist_init.len(),
                "turbulence_intensity" => 1,
                other => {
                    return Err(BladeError::Config(
                        ErrorInfo::new("unknown-variable", "sampled variable is not a design variable")
                            .with_context("variable", other),
                    ))
                }
            };
            if var.sub_indices.is_empty() || var.sub_indices.iter().any(|idx| *idx >= len) {
                return Err(BladeError::Config(
                    ErrorInfo::new("variable-index", "variable sub-index out of range")
                        .with_context("variable", var.name.as_str())
                        .with_context("len", len.to_string()),
                ));
            }
        }

        if self.folds.enabled {
            validate_folds(sampling.num_samples, self.folds.num_folds)?;
        }
        if !(self.envelope.unit_scale > 0.0) {
            return Err(config_error("unit-scale", "unit_scale must be positive"));
        }
        Ok(())
    }

    /// Stable hash of the configuration contents.
    pub fn config_hash(&self) -> Result<String, BladeError> {
        stable_hash_string(self)
    }

    /// Produces a YAML representation of the configuration.
    pub fn to_yaml_string(&self) -> Result<String, BladeError> {
        to_yaml_string(self)
    }
}

/// Loads and validates a campaign configuration from YAML.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<CampaignConfig, BladeError> {
    let path = path.as_ref();
    let bytes = fs::read(path).map_err(|err| {
        BladeError::Config(
            ErrorInfo::new("config-read", "failed to read campaign configuration")
                .with_context("path", path.display().to_string())
                .with_hint(err.to_string()),
        )
    })?;
    let config: CampaignConfig = from_yaml_slice(&bytes)?;
    config.validate()?;
    Ok(config)
}
