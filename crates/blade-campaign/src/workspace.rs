//! Storage layout for wind inputs and run outputs, with per-run isolation.

use std::collections::BTreeSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use blade_core::errors::{BladeError, ErrorInfo};
use blade_core::{CalculationType, CampaignConfig, Category, GaugeGroup, RunFlags, WorkspaceConfig};
use globset::{Glob, GlobSet, GlobSetBuilder};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use walkdir::WalkDir;

use crate::cases::Case;
use crate::catalog::{CatalogExpansion, Scenario};
use crate::textio::io_error;

const WIND_ROOT: &str = "WND_Files";
const OPT_ROOT: &str = "Opt_Files";
const TURB_SUBDIR: &str = "turb_wnd_dir";
const NONTURB_SUBDIR: &str = "nonturb_wnd_dir";
const SCRATCH_DIRS: [&str; 1] = ["AeroData"];

/// How a run's wind-input directories are namespaced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IsolationMode {
    /// Master directories; concurrent writers must be serialized by the caller.
    Shared,
    /// Private copy for one surrogate training point.
    PerTrainingPoint(usize),
    /// Private copy for one externally selected case (1-based).
    PerCaseSelected(usize),
}

impl IsolationMode {
    /// Picks the isolation for a run from its flags, dispatch type and job index.
    ///
    /// Surrogate training needs a training-point index. A parallel campaign
    /// needs a 1-based case index, since concurrent runs must not share the
    /// master directories.
    pub fn for_run(
        flags: &RunFlags,
        calculation: CalculationType,
        job_index: Option<usize>,
    ) -> Result<Self, BladeError> {
        match (flags.train_surrogate, job_index, calculation) {
            (true, Some(n), _) => Ok(IsolationMode::PerTrainingPoint(n)),
            (true, None, _) => Err(BladeError::Bounds(
                ErrorInfo::new("job-index", "surrogate training run has no training point index")
                    .with_hint("pass the training point index of this job"),
            )),
            (false, Some(0), _) => Err(BladeError::Bounds(
                ErrorInfo::new("job-index", "selected case index is 1-based")
                    .with_context("index", "0"),
            )),
            (false, Some(k), _) => Ok(IsolationMode::PerCaseSelected(k)),
            (false, None, CalculationType::Parallel) => Err(BladeError::Config(
                ErrorInfo::new("job-index", "parallel campaign run has no case index")
                    .with_hint("pass the case index of this job or use sequential calculation"),
            )),
            (false, None, CalculationType::Sequential) => Ok(IsolationMode::Shared),
        }
    }

    /// Same as [`IsolationMode::for_run`], reading flags and dispatch type from a configuration.
    pub fn from_config(config: &CampaignConfig, job_index: Option<usize>) -> Result<Self, BladeError> {
        let flags = config.run_mode()?.flags();
        Self::for_run(&flags, config.workspace.calculation, job_index)
    }
}

/// What to delete once a run has finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CleanupPolicy {
    /// Delete the training point's run directory.
    pub remove_training_dir: bool,
    /// Delete solver scratch files from each case run directory.
    pub prune_scratch: bool,
}

impl From<&WorkspaceConfig> for CleanupPolicy {
    fn from(config: &WorkspaceConfig) -> Self {
        Self {
            remove_training_dir: config.remove_training_dir,
            prune_scratch: config.prune_scratch,
        }
    }
}

/// What [`WorkspaceLayout::finish_run`] deleted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CleanupReport {
    /// Scratch entries removed across case run directories.
    pub pruned: usize,
    /// Whether a training point directory was removed.
    pub removed_training_dir: bool,
}

/// Wind-input directories a run reads from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedPaths {
    /// Directory holding turbulent inputs.
    pub turbulent_dir: PathBuf,
    /// Directory holding non-turbulent inputs.
    pub nonturbulent_dir: PathBuf,
    /// Private subtree owned by the run, absent in shared mode.
    pub isolated_root: Option<PathBuf>,
}

impl ResolvedPaths {
    /// Directory for inputs of the given category.
    pub fn dir_for(&self, category: Category) -> &Path {
        match category {
            Category::Turbulent => &self.turbulent_dir,
            Category::NonTurbulent => &self.nonturbulent_dir,
        }
    }
}

/// A single case picked out of the catalog, with its columns replicated per gauge group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
    /// 1-based index of the selected scenario.
    pub index: usize,
    /// The selected scenario.
    pub scenario: Scenario,
    /// Category column, one entry per gauge group.
    pub categories: Vec<Category>,
    /// Parked column, one entry per gauge group.
    pub parked: Vec<bool>,
}

/// Narrows the catalog to the scenario at `index` (1-based).
///
/// Returns `None` when the index is zero or past the end.
pub fn select_case(
    expansion: &CatalogExpansion,
    index: usize,
    gauge_count: usize,
) -> Option<Selection> {
    let scenario = index
        .checked_sub(1)
        .and_then(|offset| expansion.scenarios.get(offset))?
        .clone();
    debug!(
        "selected case {index} ({}) of {}",
        scenario.input_name,
        expansion.scenarios.len()
    );
    Some(Selection {
        index,
        categories: vec![scenario.category; gauge_count],
        parked: vec![scenario.parked; gauge_count],
        scenario,
    })
}

/// Resolved directory layout of a campaign.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkspaceLayout {
    /// Storage root.
    pub root: PathBuf,
    /// Master turbulent input directory.
    pub turbulent_master: PathBuf,
    /// Master non-turbulent input directory.
    pub nonturbulent_master: PathBuf,
    /// Optimization output directory.
    pub opt_dir: PathBuf,
    turbulence_class: String,
    turbine_class: String,
    airfoil_group: String,
}

impl WorkspaceLayout {
    /// Builds the layout for a validated configuration.
    pub fn from_config(config: &CampaignConfig) -> Result<Self, BladeError> {
        let turbulence = config.turbulence_class()?;
        let ws = &config.workspace;
        Ok(Self::new(
            &ws.root,
            &config.description,
            turbulence.label(),
            &ws.turbine_class,
            &ws.airfoil_group,
        ))
    }

    /// Builds a layout from its naming parts.
    pub fn new(
        root: &Path,
        description: &str,
        turbulence_class: &str,
        turbine_class: &str,
        airfoil_group: &str,
    ) -> Self {
        let wind = root.join(WIND_ROOT);
        Self {
            root: root.to_path_buf(),
            turbulent_master: wind.join(format!("{TURB_SUBDIR}_{turbulence_class}_{turbine_class}")),
            nonturbulent_master: wind.join(NONTURB_SUBDIR),
            opt_dir: root.join(OPT_ROOT).join(description),
            turbulence_class: turbulence_class.to_string(),
            turbine_class: turbine_class.to_string(),
            airfoil_group: airfoil_group.to_string(),
        }
    }

    fn isolated_root(&self, mode: IsolationMode) -> Option<PathBuf> {
        let wind = self.root.join(WIND_ROOT);
        match mode {
            IsolationMode::Shared => None,
            IsolationMode::PerTrainingPoint(n) => Some(wind.join(format!("training_point_{n}"))),
            IsolationMode::PerCaseSelected(k) => Some(wind.join(format!("selected_case_{k}"))),
        }
    }

    /// Resolves the input directories for a mode without touching the filesystem.
    pub fn resolve_paths(&self, mode: IsolationMode) -> ResolvedPaths {
        match self.isolated_root(mode) {
            None => ResolvedPaths {
                turbulent_dir: self.turbulent_master.clone(),
                nonturbulent_dir: self.nonturbulent_master.clone(),
                isolated_root: None,
            },
            Some(root) => ResolvedPaths {
                turbulent_dir: root.join(TURB_SUBDIR),
                nonturbulent_dir: root.join(NONTURB_SUBDIR),
                isolated_root: Some(root),
            },
        }
    }

    /// Creates the resolved directories if they are missing.
    pub fn materialize(&self, mode: IsolationMode) -> Result<ResolvedPaths, BladeError> {
        let paths = self.resolve_paths(mode);
        for dir in [&paths.turbulent_dir, &paths.nonturbulent_dir] {
            if !dir.is_dir() {
                fs::create_dir_all(dir).map_err(|err| io_error("workspace_create", dir, err))?;
                info!("created wind input directory {}", dir.display());
            }
        }
        Ok(paths)
    }

    /// Copies every distinct input used by `cases` from the master directories.
    ///
    /// Returns the number of files copied; shared mode copies nothing.
    pub fn copy_scenario_inputs(
        &self,
        mode: IsolationMode,
        cases: &[Case],
    ) -> Result<usize, BladeError> {
        if mode == IsolationMode::Shared {
            return Ok(0);
        }
        let paths = self.materialize(mode)?;
        let wanted: BTreeSet<(Category, &str)> = cases
            .iter()
            .map(|case| (case.category(), case.scenario.input_name.as_str()))
            .collect();
        for (category, name) in &wanted {
            let source = self.master_dir(*category).join(name);
            let target = paths.dir_for(*category).join(name);
            fs::copy(&source, &target).map_err(|err| {
                BladeError::Workspace(
                    ErrorInfo::new("input_copy", err.to_string())
                        .with_context("source", source.display().to_string())
                        .with_context("target", target.display().to_string()),
                )
            })?;
        }
        debug!("copied {} wind inputs for {:?}", wanted.len(), mode);
        Ok(wanted.len())
    }

    /// Deletes the private subtree of an isolated mode.
    pub fn remove(&self, mode: IsolationMode) -> Result<(), BladeError> {
        let root = self.isolated_root(mode).ok_or_else(|| {
            BladeError::Workspace(
                ErrorInfo::new("remove_shared", "refusing to remove master wind directories")
                    .with_hint("only isolated workspaces can be removed"),
            )
        })?;
        if remove_tree(&root)? {
            info!("removed isolated workspace {}", root.display());
        }
        Ok(())
    }

    /// Master directory for a category.
    pub fn master_dir(&self, category: Category) -> &Path {
        match category {
            Category::Turbulent => &self.turbulent_master,
            Category::NonTurbulent => &self.nonturbulent_master,
        }
    }

    /// Directory under which a run writes its per-gauge case directories.
    ///
    /// Training points get their own `sm_{n}` subtree; other modes write under
    /// the optimization directory, where case ids already differ.
    pub fn run_root(&self, mode: IsolationMode) -> PathBuf {
        match mode {
            IsolationMode::PerTrainingPoint(n) => self.training_point_dir(n),
            IsolationMode::Shared | IsolationMode::PerCaseSelected(_) => self.opt_dir.clone(),
        }
    }

    /// Output directory of one gauge group for a run.
    pub fn gauge_dir(&self, mode: IsolationMode, tag: u32) -> PathBuf {
        self.run_root(mode).join(format!("sgp{tag}"))
    }

    /// Run directory of one case.
    pub fn case_run_dir(&self, mode: IsolationMode, case: &Case) -> PathBuf {
        self.gauge_dir(mode, case.gauge).join(&case.id)
    }

    /// Run directory of one surrogate training point.
    pub fn training_point_dir(&self, n: usize) -> PathBuf {
        self.opt_dir.join(format!("sm_{n}"))
    }

    /// Directory collecting per-training-point result files.
    pub fn surrogate_var_dir(&self) -> PathBuf {
        self.opt_dir.join(format!(
            "sm_var_dir_{}_{}_{}",
            self.turbulence_class, self.turbine_class, self.airfoil_group
        ))
    }

    /// Removes a training point's run directory; returns whether it existed.
    pub fn remove_training_point_dir(&self, n: usize) -> Result<bool, BladeError> {
        let dir = self.training_point_dir(n);
        let removed = remove_tree(&dir)?;
        if removed {
            info!("removed training point directory {}", dir.display());
        }
        Ok(removed)
    }

    /// Removes a run's per-gauge output directories; returns how many existed.
    pub fn remove_gauge_dirs(
        &self,
        mode: IsolationMode,
        groups: &[GaugeGroup],
    ) -> Result<usize, BladeError> {
        let mut removed = 0;
        for group in groups {
            if remove_tree(&self.gauge_dir(mode, group.tag))? {
                removed += 1;
            }
        }
        if removed > 0 {
            info!("removed {removed} gauge output directories");
        }
        Ok(removed)
    }

    /// Applies the cleanup policy to a finished run.
    ///
    /// Scratch files are pruned from every existing case run directory. The
    /// training point directory is removed afterwards when the policy asks for
    /// it; other modes have none.
    pub fn finish_run(
        &self,
        mode: IsolationMode,
        cases: &[Case],
        template_id: &str,
        policy: CleanupPolicy,
    ) -> Result<CleanupReport, BladeError> {
        let mut report = CleanupReport::default();
        if policy.prune_scratch {
            for case in cases {
                let dir = self.case_run_dir(mode, case);
                if dir.is_dir() {
                    report.pruned += prune_scratch(&dir, template_id)?;
                }
            }
        }
        if let (true, IsolationMode::PerTrainingPoint(n)) = (policy.remove_training_dir, mode) {
            report.removed_training_dir = self.remove_training_point_dir(n)?;
        }
        Ok(report)
    }
}

fn remove_tree(path: &Path) -> Result<bool, BladeError> {
    match fs::remove_dir_all(path) {
        Ok(()) => Ok(true),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(err) => Err(io_error("workspace_remove", path, err)),
    }
}

fn scratch_globset(template_id: &str) -> Result<GlobSet, BladeError> {
    let patterns = [
        "fst_runfile*".to_string(),
        format!("{template_id}_*.dat"),
        format!("{template_id}_*.ipt"),
        format!("{template_id}.fst"),
        "Pitch.ipt".to_string(),
    ];
    let mut builder = GlobSetBuilder::new();
    for pattern in &patterns {
        let glob = Glob::new(pattern).map_err(|err| {
            BladeError::Config(
                ErrorInfo::new("scratch_glob", err.to_string()).with_context("pattern", pattern.as_str()),
            )
        })?;
        builder.add(glob);
    }
    builder
        .build()
        .map_err(|err| BladeError::Config(ErrorInfo::new("scratch_glob", err.to_string())))
}

/// Deletes solver scratch files from a case run directory, keeping results.
///
/// Returns the number of entries removed.
pub fn prune_scratch(case_dir: &Path, template_id: &str) -> Result<usize, BladeError> {
    let globset = scratch_globset(template_id)?;
    let mut removed = 0;
    for dir in SCRATCH_DIRS {
        if remove_tree(&case_dir.join(dir))? {
            removed += 1;
        }
    }
    let entries = WalkDir::new(case_dir)
        .min_depth(1)
        .max_depth(1)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_file());
    for entry in entries {
        if globset.is_match(entry.file_name()) {
            fs::remove_file(entry.path())
                .map_err(|err| io_error("scratch_remove", entry.path(), err))?;
            removed += 1;
        }
    }
    debug!("pruned {removed} scratch entries from {}", case_dir.display());
    Ok(removed)
}
