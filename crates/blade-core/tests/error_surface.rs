use blade_core::errors::{BladeError, ErrorInfo};

fn sample_info(code: &str, message: &str) -> ErrorInfo {
    ErrorInfo::new(code, message)
        .with_context("index", "7")
        .with_context("reason", "example")
}

#[test]
fn config_error_surface() {
    let err = BladeError::Config(sample_info("C001", "unknown run mode"));
    assert_eq!(err.info().code, "C001");
    assert!(err.info().context.contains_key("index"));
    assert!(err.is_fatal_config());
}

#[test]
fn bounds_error_surface() {
    let err = BladeError::Bounds(sample_info("B001", "sample index out of range"));
    assert_eq!(err.info().code, "B001");
    assert!(!err.is_fatal_config());
}

#[test]
fn plan_error_surface() {
    let err = BladeError::Plan(sample_info("P001", "shape mismatch"));
    assert_eq!(err.info().code, "P001");
}

#[test]
fn workspace_error_surface() {
    let err = BladeError::Workspace(sample_info("W001", "copy failed"));
    assert_eq!(err.info().code, "W001");
}

#[test]
fn aggregate_error_surface() {
    let err = BladeError::Aggregate(sample_info("A001", "missing header"));
    assert_eq!(err.info().code, "A001");
}

#[test]
fn display_includes_context_and_hint() {
    let err = BladeError::Serde(sample_info("S001", "schema mismatch").with_hint("check yaml"));
    let rendered = err.to_string();
    assert!(rendered.starts_with("serde error: schema mismatch (code: S001)"));
    assert!(rendered.contains("index=7, reason=example"));
    assert!(rendered.ends_with("hint: check yaml"));
}

#[test]
fn errors_round_trip_json() {
    let err = BladeError::Bounds(sample_info("B002", "case index out of range"));
    let json = serde_json::to_string(&err).expect("serialize");
    assert!(json.contains("\"family\":\"Bounds\""));
    let decoded: BladeError = serde_json::from_str(&json).expect("deserialize");
    assert_eq!(decoded, err);
}
