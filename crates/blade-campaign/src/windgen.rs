//! Preparation of turbulent wind-generator inputs and collection of its outputs.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use blade_core::errors::{BladeError, ErrorInfo};
use blade_core::LoadCaseClass;
use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::catalog::turbulent_input_name;
use crate::textio::io_error;

const SEED_LINE: usize = 3;
const TURBINE_CLASS_LINE: usize = 30;
const TURBULENCE_CHAR_LINE: usize = 31;
const MODEL_LINE: usize = 32;
const REFERENCE_HEIGHT_LINE: usize = 35;
const MEAN_WIND_SPEED_LINE: usize = 36;

/// Generator parameters shared by every input of a campaign.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratorSettings {
    /// IEC turbulence characteristic (A, B or C).
    #[serde(default = "default_turbulence_characteristic")]
    pub turbulence_characteristic: String,
    /// IEC turbine class with edition, e.g. `1-ED3`.
    #[serde(default = "default_turbine_class")]
    pub turbine_class: String,
    /// Hub reference height in metres.
    #[serde(default = "default_reference_height")]
    pub reference_height: f64,
}

fn default_turbulence_characteristic() -> String {
    "B".to_string()
}

fn default_turbine_class() -> String {
    "1-ED3".to_string()
}

fn default_reference_height() -> f64 {
    90.0
}

impl Default for GeneratorSettings {
    fn default() -> Self {
        Self {
            turbulence_characteristic: default_turbulence_characteristic(),
            turbine_class: default_turbine_class(),
            reference_height: default_reference_height(),
        }
    }
}

/// One generator run: a turbulence model at one seed and mean wind speed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TurbulentInputSpec {
    /// Turbulence model tag (`NTM`, `1ETM`).
    pub tag: String,
    /// 1-based seed position.
    pub seed_index: usize,
    /// Generator random seed.
    pub seed: u32,
    /// Mean wind speed (m/s).
    pub mean_wind_speed: f64,
}

impl TurbulentInputSpec {
    fn stem(&self) -> String {
        format!(
            "dlc_{}_seed{}_mws{}",
            self.tag,
            self.seed_index,
            self.mean_wind_speed.trunc() as i64
        )
    }

    /// Generator input file name.
    pub fn input_name(&self) -> String {
        format!("{}.inp", self.stem())
    }

    /// Hub-height wind file produced by the generator; matches the catalog name.
    pub fn output_name(&self) -> String {
        turbulent_input_name(&self.tag, self.seed_index, self.mean_wind_speed)
    }

    /// Summary file produced alongside the wind file.
    pub fn summary_name(&self) -> String {
        format!("{}.sum", self.stem())
    }
}

/// Enumerates generator runs: seeds outer, wind speeds, then turbulent classes.
pub fn input_specs(
    classes: &[LoadCaseClass],
    seeds: &[u32],
    mean_wind_speeds: &[f64],
) -> Vec<TurbulentInputSpec> {
    let tags: Vec<&str> = classes.iter().filter_map(LoadCaseClass::turbulence_tag).collect();
    let mut specs = Vec::with_capacity(seeds.len() * mean_wind_speeds.len() * tags.len());
    for (offset, seed) in seeds.iter().enumerate() {
        for mws in mean_wind_speeds {
            for tag in &tags {
                specs.push(TurbulentInputSpec {
                    tag: tag.to_string(),
                    seed_index: offset + 1,
                    seed: *seed,
                    mean_wind_speed: *mws,
                });
            }
        }
    }
    specs
}

/// Fills a generator template for one run.
///
/// Lines are zero-based: seed on 3, turbine class on 30, turbulence
/// characteristic on 31, quoted model on 32, reference height on 35 and mean
/// wind speed on 36.
pub fn render_input(
    template: &str,
    spec: &TurbulentInputSpec,
    settings: &GeneratorSettings,
) -> Result<String, BladeError> {
    let mut lines: Vec<String> = template.lines().map(str::to_string).collect();
    if lines.len() <= MEAN_WIND_SPEED_LINE {
        return Err(BladeError::Config(
            ErrorInfo::new("generator-template", "wind generator template is too short")
                .with_context("lines", lines.len().to_string())
                .with_context("required", (MEAN_WIND_SPEED_LINE + 1).to_string()),
        ));
    }
    lines[SEED_LINE] = spec.seed.to_string();
    lines[TURBINE_CLASS_LINE] = settings.turbine_class.clone();
    lines[TURBULENCE_CHAR_LINE] = settings.turbulence_characteristic.clone();
    lines[MODEL_LINE] = format!("\"{}\"", spec.tag);
    lines[REFERENCE_HEIGHT_LINE] = format!("{:?}", settings.reference_height);
    lines[MEAN_WIND_SPEED_LINE] = format!("{:?}", spec.mean_wind_speed);
    let mut out = lines.join("\n");
    out.push('\n');
    Ok(out)
}

/// Renders every spec from the template at `template_path` into `inp_dir`.
pub fn write_inputs(
    template_path: &Path,
    inp_dir: &Path,
    specs: &[TurbulentInputSpec],
    settings: &GeneratorSettings,
) -> Result<Vec<PathBuf>, BladeError> {
    let template = fs::read_to_string(template_path)
        .map_err(|err| io_error("generator_template_read", template_path, err))?;
    fs::create_dir_all(inp_dir).map_err(|err| io_error("generator_input_dir", inp_dir, err))?;
    let mut written = Vec::with_capacity(specs.len());
    for spec in specs {
        let path = inp_dir.join(spec.input_name());
        fs::write(&path, render_input(&template, spec, settings)?)
            .map_err(|err| io_error("generator_input_write", &path, err))?;
        written.push(path);
    }
    info!("wrote {} wind generator inputs to {}", written.len(), inp_dir.display());
    Ok(written)
}

/// Moves generated wind files into `wnd_dir` and deletes the summaries.
pub fn collect_outputs(
    inp_dir: &Path,
    wnd_dir: &Path,
    specs: &[TurbulentInputSpec],
) -> Result<usize, BladeError> {
    fs::create_dir_all(wnd_dir).map_err(|err| io_error("generator_output_dir", wnd_dir, err))?;
    for spec in specs {
        let source = inp_dir.join(spec.output_name());
        let target = wnd_dir.join(spec.output_name());
        fs::rename(&source, &target).map_err(|err| io_error("generator_output_move", &source, err))?;
        let summary = inp_dir.join(spec.summary_name());
        match fs::remove_file(&summary) {
            Ok(()) => {}
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                debug!("no generator summary at {}", summary.display());
            }
            Err(err) => return Err(io_error("generator_summary_remove", &summary, err)),
        }
    }
    info!("collected {} wind files into {}", specs.len(), wnd_dir.display());
    Ok(specs.len())
}
