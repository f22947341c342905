#![deny(missing_docs)]
#![doc = "Core error, configuration and seeding types shared by blade load campaign crates."]

/// Campaign configuration records and validation.
pub mod config;
pub mod errors;
/// Canonical hashing helpers.
pub mod hash;
pub mod load_case;
pub mod modes;
pub mod rng;
/// Canonical JSON and YAML helpers.
pub mod serde;
pub mod turbine;

pub use config::{
    load_config, validate_folds, Baseline, CalculationType, CampaignConfig, CatalogConfig,
    EnvelopeConfig, FoldConfig, GaugeConfig, GaugeGroup, SamplingConfig, SurrogateConfig,
    VariableSelection, WorkspaceConfig,
};
pub use errors::{BladeError, ErrorInfo};
pub use hash::stable_hash_string;
pub use load_case::{Category, LoadCaseClass};
pub use modes::{ExtremeFit, RunFlags, RunMode, SurrogateModel};
pub use rng::{derive_substream_seed, substream_rng, FOLD_SHUFFLE_STREAM, SAMPLING_PLAN_STREAM};
pub use turbine::{template, TurbineTemplate, TurbulenceClass, REFERENCE_BLADE_LENGTH, TEMPLATES};

pub use crate::serde::{from_yaml_slice, to_canonical_json_bytes, to_yaml_string};
