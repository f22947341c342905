//! Scenario expansion, run isolation and result reduction for blade load campaigns.

mod aggregate;
mod cases;
mod catalog;
mod envelope;
mod folds;
mod manifest;
mod sampling;
mod textio;
mod training;
mod windgen;
mod workspace;

pub use aggregate::{
    aggregate, aggregate_kinds, case_file_path, master_file_path, AggregateReport, CaseRead,
    DroppedCase,
};
pub use cases::{build_case_list, case_id, transpose_to_gauge_major, Case, CASE_PREFIX};
pub use catalog::{
    expand_class, load_active_list, turbulent_input_name, CatalogExpansion, Scenario,
};
pub use envelope::{
    collect_station_vectors, read_envelope, reduce, Axis, Envelope, EnvelopeFiles,
    ReducedEnvelopes, StationVectors, ACTIVE_LIST_FILE, X_ENVELOPE_FILE, Y_ENVELOPE_FILE,
};
pub use folds::{kfold_partition, validate_folds};
pub use manifest::{CampaignManifest, ManifestCase, MANIFEST_FILE};
pub use sampling::{
    default_design_space, domain_file_path, get_or_create_plan, read_domain_file, scale_variable,
    select_sample, ColumnDomain, DesignSpace, DesignVariable, Domain, SamplingPlan,
};
pub use training::{build_training_matrices, TrainingMatrix};
pub use windgen::{
    collect_outputs, input_specs, render_input, write_inputs, GeneratorSettings,
    TurbulentInputSpec,
};
pub use workspace::{
    prune_scratch, select_case, CleanupPolicy, CleanupReport, IsolationMode, ResolvedPaths,
    Selection, WorkspaceLayout,
};
