use std::fs;

use blade_campaign::{kfold_partition, validate_folds};
use blade_core::BladeError;

#[test]
fn fold_count_must_divide_and_stay_below_points() {
    assert!(validate_folds(100, 7).expect_err("remainder").is_fatal_config());
    assert!(validate_folds(100, 100).expect_err("equal").is_fatal_config());
    assert!(validate_folds(100, 0).expect_err("zero").is_fatal_config());
    assert_eq!(validate_folds(100, 5).expect("valid"), 20);

    let dir = tempfile::tempdir().expect("tmp dir");
    let path = dir.path().join("shuffled_list.txt");
    let err = kfold_partition(100, 7, &path, 1).expect_err("invalid folds");
    assert!(matches!(err, BladeError::Config(_)));
    assert!(!path.exists());
}

#[test]
fn partition_covers_every_point_once_and_is_reused() {
    let dir = tempfile::tempdir().expect("tmp dir");
    let path = dir.path().join("shuffled_list.txt");

    let folds = kfold_partition(10, 5, &path, 2017).expect("partition");
    assert_eq!(folds.len(), 5);
    assert!(folds.iter().all(|fold| fold.len() == 2));
    let mut all: Vec<usize> = folds.iter().flatten().copied().collect();
    all.sort_unstable();
    assert_eq!(all, (0..10).collect::<Vec<_>>());

    let text = fs::read_to_string(&path).expect("shuffled list");
    assert_eq!(text.lines().count(), 10);
    assert!(text.lines().all(|line| line.ends_with(".0")));

    let again = kfold_partition(10, 5, &path, 4242).expect("reuse");
    assert_eq!(again, folds);
}

#[test]
fn existing_shuffled_list_is_split_in_file_order() {
    let dir = tempfile::tempdir().expect("tmp dir");
    let path = dir.path().join("shuffled_list.txt");
    fs::write(&path, "3.0\n0.0\n5.0\n1.0\n4.0\n2.0\n").expect("write list");

    let folds = kfold_partition(6, 3, &path, 0).expect("partition");
    assert_eq!(folds, vec![vec![3, 0], vec![5, 1], vec![4, 2]]);
}

#[test]
fn corrupted_shuffled_list_is_rejected() {
    let dir = tempfile::tempdir().expect("tmp dir");
    let path = dir.path().join("shuffled_list.txt");

    fs::write(&path, "0.0\n0.0\n1.0\n2.0\n").expect("duplicate");
    assert!(matches!(kfold_partition(4, 2, &path, 0), Err(BladeError::Plan(_))));

    fs::write(&path, "0.0\n1.5\n2.0\n3.0\n").expect("fraction");
    assert!(matches!(kfold_partition(4, 2, &path, 0), Err(BladeError::Plan(_))));

    fs::write(&path, "0.0\n1.0\n2.0\n").expect("short");
    assert!(matches!(kfold_partition(4, 2, &path, 0), Err(BladeError::Plan(_))));
}
