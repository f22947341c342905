use blade_campaign::{expand_class, load_active_list, CatalogExpansion};
use blade_core::{CatalogConfig, Category, LoadCaseClass};

fn default_seeds() -> Vec<u32> {
    (1..=6).collect()
}

fn default_speeds() -> Vec<f64> {
    (0..10).map(|i| 5.0 + 2.0 * i as f64).collect()
}

#[test]
fn normal_turbulence_grid_names_every_seed_and_speed() {
    let mut out = CatalogExpansion::default();
    assert!(expand_class("DLC_1_2", &default_seeds(), &default_speeds(), 3, &mut out));
    assert_eq!(out.len(), 60);
    assert_eq!(out.scenarios[0].input_name, "dlc_NTM_seed1_mws5.hh");
    assert_eq!(out.scenarios[9].input_name, "dlc_NTM_seed1_mws23.hh");
    assert_eq!(out.scenarios[10].input_name, "dlc_NTM_seed2_mws5.hh");
    assert_eq!(out.scenarios[59].input_name, "dlc_NTM_seed6_mws23.hh");
    assert_eq!(out.categories.len(), 180);
    assert!(out.categories.iter().all(|cat| *cat == Category::Turbulent));
    assert!(out.parked.iter().all(|parked| !parked));
}

#[test]
fn wind_speeds_are_truncated_in_names() {
    let mut out = CatalogExpansion::default();
    expand_class("DLC_1_3", &[9], &[11.4, 7.99], 1, &mut out);
    let names: Vec<&str> = out.scenarios.iter().map(|s| s.input_name.as_str()).collect();
    assert_eq!(names, vec!["dlc_1ETM_seed1_mws11.hh", "dlc_1ETM_seed1_mws7.hh"]);
}

#[test]
fn classes_append_in_call_order() {
    let mut out = CatalogExpansion::default();
    for id in ["DLC_0_0", "DLC_1_4", "DLC_1_5", "DLC_6_1", "DLC_6_3"] {
        assert!(expand_class(id, &[], &[], 2, &mut out));
    }
    let names: Vec<&str> = out.scenarios.iter().map(|s| s.input_name.as_str()).collect();
    assert_eq!(
        names,
        vec![
            "nom.wnd",
            "ECD+R+2.0.wnd",
            "ECD+R-2.0.wnd",
            "ECD-R+2.0.wnd",
            "ECD-R-2.0.wnd",
            "ECD+R.wnd",
            "ECD-R.wnd",
            "EWSH+12.0.wnd",
            "EWSH-12.0.wnd",
            "EWSV+12.0.wnd",
            "EWSV-12.0.wnd",
            "EWM50.wnd",
            "EWM01.wnd",
        ]
    );
    assert_eq!(out.categories.len(), 26);
    assert!(out.categories.iter().all(|cat| *cat == Category::NonTurbulent));
    let parked_tail: Vec<bool> = out.parked[22..].to_vec();
    assert_eq!(parked_tail, vec![true, true, true, true]);
    assert!(out.parked[..22].iter().all(|parked| !parked));
    assert_eq!(out.scenarios[12].class, LoadCaseClass::ParkedOneYear);
}

#[test]
fn unknown_class_is_a_no_op() {
    let mut out = CatalogExpansion::default();
    expand_class("DLC_0_0", &[], &[], 3, &mut out);
    let before = out.clone();
    assert!(!expand_class("DLC_9_9", &default_seeds(), &default_speeds(), 3, &mut out));
    assert_eq!(out, before);
}

#[test]
fn active_list_restricts_scenarios_and_columns() {
    let dir = tempfile::tempdir().expect("tmp dir");
    let list = dir.path().join("active_wnd.txt");
    std::fs::write(&list, "dlc_NTM_seed1_mws7.hh\n\nEWM50.wnd\n").expect("write list");

    let catalog = CatalogConfig {
        load_cases: vec!["DLC_1_2".into(), "DLC_6_1".into()],
        seeds: vec![1],
        mean_wind_speeds: vec![5.0, 7.0],
        active_list: Some(list.clone()),
    };
    let out = CatalogExpansion::from_config(&catalog, 3).expect("expand");
    let names: Vec<&str> = out.scenarios.iter().map(|s| s.input_name.as_str()).collect();
    assert_eq!(names, vec!["dlc_NTM_seed1_mws7.hh", "EWM50.wnd"]);
    assert_eq!(
        out.categories,
        vec![
            Category::Turbulent,
            Category::Turbulent,
            Category::Turbulent,
            Category::NonTurbulent,
            Category::NonTurbulent,
            Category::NonTurbulent,
        ]
    );
    assert_eq!(out.parked, vec![false, false, false, true, true, true]);
    assert_eq!(
        load_active_list(&list).expect("list"),
        vec!["dlc_NTM_seed1_mws7.hh".to_string(), "EWM50.wnd".to_string()]
    );
}

#[test]
fn unknown_configured_class_is_a_configuration_error() {
    let catalog = CatalogConfig {
        load_cases: vec!["DLC_0_0".into(), "DLC_2_1".into()],
        ..CatalogConfig::default()
    };
    let err = CatalogExpansion::from_config(&catalog, 3).expect_err("unknown class");
    assert!(err.is_fatal_config());
}
