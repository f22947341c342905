use std::fs;
use std::path::Path;

use blade_campaign::{
    aggregate, aggregate_kinds, case_file_path, master_file_path, CaseRead, DroppedCase,
};
use blade_core::BladeError;

const HEADER: &str = "chord_sub_0 chord_sub_1 turbulence_intensity";

/// Writes case `index`'s file the way concurrent solver jobs do: a header plus
/// one row per case position, only the case's own row carrying its data.
fn write_case_file(dir: &Path, kind: &str, index: usize, case_count: usize) {
    let mut text = format!("{HEADER}\n");
    for row in 0..case_count {
        if row == index {
            text.push_str(&format!("{index}.5 {index}.25 0.14\n"));
        } else {
            text.push_str("0 0 0\n");
        }
    }
    fs::write(case_file_path(dir, kind, index), text).expect("write case file");
}

fn master_lines(dir: &Path, kind: &str) -> Vec<String> {
    fs::read_to_string(master_file_path(dir, kind))
        .expect("master file")
        .lines()
        .map(str::to_string)
        .collect()
}

#[test]
fn missing_case_is_dropped_and_counted() {
    let dir = tempfile::tempdir().expect("tmp dir");
    for index in [0, 1, 3] {
        write_case_file(dir.path(), "DEM", index, 4);
    }

    let report = aggregate(dir.path(), "DEM", 4).expect("aggregate");
    assert_eq!(report.rows_written(), 3);
    assert_eq!(report.drop_count(), 1);
    assert_eq!(report.kept, vec![0, 1, 3]);
    assert_eq!(
        report.dropped,
        vec![DroppedCase {
            index: 2,
            reason: CaseRead::NotFound
        }]
    );
    assert_eq!(
        master_lines(dir.path(), "DEM"),
        vec![HEADER, "0.5 0.25 0.14", "1.5 1.25 0.14", "3.5 3.25 0.14"]
    );
    for index in [0, 1, 3] {
        assert!(!case_file_path(dir.path(), "DEM", index).exists());
    }
}

#[test]
fn header_falls_back_to_first_readable_case() {
    let dir = tempfile::tempdir().expect("tmp dir");
    write_case_file(dir.path(), "load", 1, 2);
    let report = aggregate(dir.path(), "load", 2).expect("aggregate");
    assert_eq!(report.header, HEADER);
    assert_eq!(report.kept, vec![1]);
    assert_eq!(report.dropped[0].reason, CaseRead::NotFound);
}

#[test]
fn first_readable_header_wins_over_later_files() {
    let dir = tempfile::tempdir().expect("tmp dir");
    write_case_file(dir.path(), "var", 0, 2);
    fs::write(case_file_path(dir.path(), "var", 1), "renamed columns\n0 0 0\n1.5 1.25 0.14\n")
        .expect("second file");
    let report = aggregate(dir.path(), "var", 2).expect("aggregate");
    assert_eq!(report.header, HEADER);
    assert_eq!(report.kept, vec![0, 1]);
    assert_eq!(
        master_lines(dir.path(), "var"),
        vec![HEADER, "0.5 0.25 0.14", "1.5 1.25 0.14"]
    );
}

#[test]
fn short_case_file_is_malformed_and_kept_on_disk() {
    let dir = tempfile::tempdir().expect("tmp dir");
    write_case_file(dir.path(), "def", 0, 3);
    fs::write(case_file_path(dir.path(), "def", 2), format!("{HEADER}\n0 0 0\n"))
        .expect("short file");

    let report = aggregate(dir.path(), "def", 3).expect("aggregate");
    assert_eq!(report.kept, vec![0]);
    assert_eq!(
        report.dropped,
        vec![
            DroppedCase {
                index: 1,
                reason: CaseRead::NotFound
            },
            DroppedCase {
                index: 2,
                reason: CaseRead::Malformed
            },
        ]
    );
    assert!(case_file_path(dir.path(), "def", 2).exists());
}

#[test]
fn rerun_after_merge_leaves_a_header_only_master() {
    let dir = tempfile::tempdir().expect("tmp dir");
    write_case_file(dir.path(), "var", 0, 2);
    write_case_file(dir.path(), "var", 1, 2);
    let first = aggregate(dir.path(), "var", 2).expect("first");
    assert_eq!(first.rows_written(), 2);

    let second = aggregate(dir.path(), "var", 2).expect("second");
    assert_eq!(second.rows_written(), 0);
    assert_eq!(second.drop_count(), 2);
    assert_eq!(master_lines(dir.path(), "var"), vec![HEADER]);
}

#[test]
fn no_header_source_is_an_error() {
    let dir = tempfile::tempdir().expect("tmp dir");
    let err = aggregate(dir.path(), "DEM", 3).expect_err("nothing to merge");
    assert!(matches!(err, BladeError::Aggregate(_)));
}

#[test]
fn every_kind_is_merged_independently() {
    let dir = tempfile::tempdir().expect("tmp dir");
    for kind in ["var", "DEM"] {
        for index in 0..3 {
            write_case_file(dir.path(), kind, index, 3);
        }
    }
    fs::remove_file(case_file_path(dir.path(), "DEM", 0)).expect("remove");

    let reports = aggregate_kinds(dir.path(), &["var", "DEM"], 3).expect("aggregate");
    assert_eq!(reports.len(), 2);
    assert_eq!(reports[0].kind, "var");
    assert_eq!(reports[0].rows_written(), 3);
    assert_eq!(reports[1].kept, vec![1, 2]);
    assert_eq!(reports[1].header, HEADER);
}
