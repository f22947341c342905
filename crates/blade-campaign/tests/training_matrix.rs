use std::fs;
use std::path::Path;

use blade_campaign::{aggregate, build_training_matrices, case_file_path, TrainingMatrix};
use blade_core::{from_yaml_slice, BladeError, CampaignConfig, SurrogateModel};

fn write_case_file(dir: &Path, kind: &str, header: &str, index: usize, row: &str) {
    let mut text = format!("{header}\n");
    for position in 0..=index {
        if position == index {
            text.push_str(row);
        } else {
            text.push_str("0 0");
        }
        text.push('\n');
    }
    fs::write(case_file_path(dir, kind, index), text).expect("write case file");
}

#[test]
fn rows_align_on_cases_present_in_both_datasets() {
    let dir = tempfile::tempdir().expect("tmp dir");
    for (index, row) in [(0, "1.0 2.0"), (1, "1.5 2.5"), (3, "3.0 4.0")] {
        write_case_file(dir.path(), "var", "chord_sub theta_sub", index, row);
    }
    for (index, row) in [(0, "10 20"), (2, "12 22"), (3, "13 23")] {
        write_case_file(dir.path(), "DEM", "DEMx DEMy", index, row);
    }
    let inputs = aggregate(dir.path(), "var", 4).expect("var");
    let responses = aggregate(dir.path(), "DEM", 4).expect("DEM");

    let matrix = TrainingMatrix::from_reports(&inputs, &responses, SurrogateModel::Rbf, &[0.01])
        .expect("matrix");
    assert_eq!(matrix.len(), 2);
    assert_eq!(matrix.cases, vec![0, 3]);
    assert_eq!(matrix.x, vec![vec![1.0, 2.0], vec![3.0, 4.0]]);
    assert_eq!(matrix.y, vec![vec![10.0, 20.0], vec![13.0, 23.0]]);
    assert_eq!(matrix.x_header, "chord_sub theta_sub");

    let out = dir.path().join("training.json");
    matrix.write(&out).expect("write");
    let value: serde_json::Value =
        serde_json::from_slice(&fs::read(&out).expect("read")).expect("json");
    assert_eq!(value["model"], "RBF");
    assert_eq!(value["cases"], serde_json::json!([0, 3]));
    assert_eq!(value["theta0"], serde_json::json!([0.01]));
}

#[test]
fn unparsable_master_row_is_an_aggregate_error() {
    let dir = tempfile::tempdir().expect("tmp dir");
    write_case_file(dir.path(), "var", "a b", 0, "1.0 nope");
    write_case_file(dir.path(), "load", "c d", 0, "1.0 2.0");
    let inputs = aggregate(dir.path(), "var", 1).expect("var");
    let responses = aggregate(dir.path(), "load", 1).expect("load");

    let err = TrainingMatrix::from_reports(&inputs, &responses, SurrogateModel::Kriging, &[])
        .expect_err("bad row");
    assert!(matches!(err, BladeError::Aggregate(_)));
}

#[test]
fn configured_kinds_pair_design_variables_with_each_response() {
    let dir = tempfile::tempdir().expect("tmp dir");
    for index in 0..2 {
        write_case_file(dir.path(), "var", "chord_sub", index, &format!("{index}.5"));
        write_case_file(dir.path(), "DEM", "DEMx", index, "10");
        write_case_file(dir.path(), "load", "Fx", index, "20");
    }
    let config: CampaignConfig = from_yaml_slice(
        b"description: unit\nsurrogate:\n  model: KRG\n  theta0: [0.5, 0.25]\n  kinds: [var, DEM, load]\n",
    )
    .expect("config");

    let matrices = build_training_matrices(dir.path(), &config, 2).expect("matrices");
    assert_eq!(matrices.len(), 2);
    assert_eq!(matrices[0].y_header, "DEMx");
    assert_eq!(matrices[1].y_header, "Fx");
    for matrix in &matrices {
        assert_eq!(matrix.model, SurrogateModel::Kriging);
        assert_eq!(matrix.theta0, vec![0.5, 0.25]);
        assert_eq!(matrix.x, vec![vec![0.5], vec![1.5]]);
    }
}

#[test]
fn a_single_configured_kind_is_a_config_error() {
    let dir = tempfile::tempdir().expect("tmp dir");
    let config: CampaignConfig =
        from_yaml_slice(b"description: unit\nsurrogate:\n  kinds: [var]\n").expect("config");
    let err = build_training_matrices(dir.path(), &config, 1).expect_err("no response kind");
    assert!(matches!(err, BladeError::Config(_)));
}
