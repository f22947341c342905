use std::fs;
use std::path::{Path, PathBuf};

use blade_core::errors::BladeError;
use blade_core::{stable_hash_string, to_canonical_json_bytes, CampaignConfig, Category};
use serde::{Deserialize, Serialize};

use crate::cases::Case;
use crate::textio::io_error;

/// File name of the manifest inside the optimization directory.
pub const MANIFEST_FILE: &str = "campaign_manifest.json";

/// One case as recorded in the manifest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestCase {
    /// Case identifier.
    pub id: String,
    /// Wind input file name.
    pub input: String,
    /// Input category.
    pub category: Category,
    /// Rotor parked flag.
    pub parked: bool,
}

/// Reproducible record of what a campaign expanded to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CampaignManifest {
    /// Hash over the config hash and the case list.
    pub id: String,
    /// Campaign description.
    pub description: String,
    /// Run mode name.
    pub mode: String,
    /// Hash of the full configuration.
    pub config_hash: String,
    /// Cases in execution order.
    pub cases: Vec<ManifestCase>,
}

impl CampaignManifest {
    /// Builds the manifest for an expanded case list.
    pub fn build(config: &CampaignConfig, cases: &[Case]) -> Result<Self, BladeError> {
        let config_hash = config.config_hash()?;
        let cases: Vec<ManifestCase> = cases
            .iter()
            .map(|case| ManifestCase {
                id: case.id.clone(),
                input: case.scenario.input_name.clone(),
                category: case.category(),
                parked: case.parked(),
            })
            .collect();
        let id = stable_hash_string(&(&config_hash, &cases))?;
        Ok(Self {
            id,
            description: config.description.clone(),
            mode: config.mode.clone(),
            config_hash,
            cases,
        })
    }

    /// Writes the manifest as canonical JSON into `dir`.
    pub fn write(&self, dir: &Path) -> Result<PathBuf, BladeError> {
        fs::create_dir_all(dir).map_err(|err| io_error("manifest_dir", dir, err))?;
        let path = dir.join(MANIFEST_FILE);
        let bytes = to_canonical_json_bytes(self)?;
        fs::write(&path, bytes).map_err(|err| io_error("manifest_write", &path, err))?;
        Ok(path)
    }
}
