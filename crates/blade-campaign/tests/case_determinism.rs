use std::path::PathBuf;

use blade_campaign::{
    build_case_list, transpose_to_gauge_major, CampaignManifest, CatalogExpansion, MANIFEST_FILE,
};
use blade_core::{load_config, to_canonical_json_bytes, BladeError, Category, GaugeGroup};

fn fixture_path(relative: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..")
        .join(relative)
}

fn smoke_expansion() -> (CatalogExpansion, Vec<GaugeGroup>) {
    let config = load_config(fixture_path("campaigns/smoke.yaml")).expect("config loads");
    let groups = config.gauges.groups.clone();
    let expansion = CatalogExpansion::from_config(&config.catalog, groups.len()).expect("expand");
    (expansion, groups)
}

#[test]
fn case_list_is_byte_identical_across_runs() {
    let (first, groups) = smoke_expansion();
    let (second, _) = smoke_expansion();
    let a = build_case_list(&first.scenarios, &groups, None);
    let b = build_case_list(&second.scenarios, &groups, None);
    assert_eq!(
        to_canonical_json_bytes(&a).expect("json"),
        to_canonical_json_bytes(&b).expect("json")
    );
    assert_eq!(first.categories, second.categories);
    assert_eq!(first.parked, second.parked);
}

#[test]
fn cases_are_gauge_group_major() {
    let (expansion, groups) = smoke_expansion();
    let names: Vec<&str> = expansion
        .scenarios
        .iter()
        .map(|s| s.input_name.as_str())
        .collect();
    assert_eq!(
        names,
        vec![
            "nom.wnd",
            "dlc_NTM_seed1_mws5.hh",
            "dlc_NTM_seed1_mws11.hh",
            "dlc_NTM_seed2_mws5.hh",
            "dlc_NTM_seed2_mws11.hh",
            "EWM50.wnd",
        ]
    );

    let cases = build_case_list(&expansion.scenarios, &groups, None);
    assert_eq!(cases.len(), 18);
    assert_eq!(cases[0].id, "WNDfile1_sgp1");
    assert_eq!(cases[5].id, "WNDfile6_sgp1");
    assert_eq!(cases[6].id, "WNDfile1_sgp2");
    assert_eq!(cases[17].id, "WNDfile6_sgp3");
    for (offset, case) in cases.iter().enumerate() {
        assert_eq!(case.index, offset + 1);
        assert_eq!(case.scenario_position, offset % 6 + 1);
        assert_eq!(case.gauge, groups[offset / 6].tag);
    }
    assert!(cases[5].parked());
    assert!(!cases[4].parked());
}

#[test]
fn transposed_columns_stay_aligned_with_cases() {
    let (expansion, groups) = smoke_expansion();
    let cases = build_case_list(&expansion.scenarios, &groups, None);
    let categories =
        transpose_to_gauge_major(&expansion.categories, expansion.len(), groups.len())
            .expect("categories");
    let parked = transpose_to_gauge_major(&expansion.parked, expansion.len(), groups.len())
        .expect("parked");
    let from_cases: Vec<Category> = cases.iter().map(|case| case.category()).collect();
    let parked_from_cases: Vec<bool> = cases.iter().map(|case| case.parked()).collect();
    assert_eq!(categories, from_cases);
    assert_eq!(parked, parked_from_cases);
}

#[test]
fn transpose_uses_scenario_major_source_index() {
    let items = vec!["s0g0", "s0g1", "s1g0", "s1g1", "s2g0", "s2g1"];
    let out = transpose_to_gauge_major(&items, 3, 2).expect("shape");
    assert_eq!(out, vec!["s0g0", "s1g0", "s2g0", "s0g1", "s1g1", "s2g1"]);

    let err = transpose_to_gauge_major(&items, 4, 2).expect_err("shape mismatch");
    assert!(matches!(err, BladeError::Bounds(_)));
}

#[test]
fn selected_position_overrides_identifiers() {
    let (expansion, groups) = smoke_expansion();
    let cases = build_case_list(&expansion.scenarios[3..4], &groups, Some(4));
    let ids: Vec<&str> = cases.iter().map(|case| case.id.as_str()).collect();
    assert_eq!(ids, vec!["WNDfile4_sgp1", "WNDfile4_sgp2", "WNDfile4_sgp3"]);
}

#[test]
fn empty_gauge_groups_yield_no_cases() {
    let (expansion, _) = smoke_expansion();
    assert!(build_case_list(&expansion.scenarios, &[], None).is_empty());
}

#[test]
fn manifest_is_reproducible() {
    let config = load_config(fixture_path("campaigns/smoke.yaml")).expect("config loads");
    let (expansion, groups) = smoke_expansion();
    let cases = build_case_list(&expansion.scenarios, &groups, None);
    let first = CampaignManifest::build(&config, &cases).expect("manifest");
    let second = CampaignManifest::build(&config, &cases).expect("manifest");
    assert_eq!(first, second);
    assert_eq!(first.cases.len(), 18);
    assert_eq!(first.config_hash, config.config_hash().expect("hash"));

    let dir = tempfile::tempdir().expect("tmp dir");
    let path = first.write(dir.path()).expect("write");
    assert_eq!(path, dir.path().join(MANIFEST_FILE));
    let bytes = std::fs::read(&path).expect("read manifest");
    assert_eq!(bytes, to_canonical_json_bytes(&second).expect("json"));
}
