use blade_campaign::{build_case_list, reduce, CatalogExpansion};
use blade_core::{Baseline, CatalogConfig, GaugeGroup};
use criterion::{black_box, criterion_group, criterion_main, Criterion};

fn full_catalog() -> CatalogConfig {
    CatalogConfig {
        load_cases: ["DLC_0_0", "DLC_1_2", "DLC_1_3", "DLC_1_4", "DLC_1_5", "DLC_6_1", "DLC_6_3"]
            .iter()
            .map(|id| id.to_string())
            .collect(),
        ..CatalogConfig::default()
    }
}

fn bench_case_expansion(c: &mut Criterion) {
    let catalog = full_catalog();
    let groups: Vec<GaugeGroup> = (1..=4).filter_map(GaugeGroup::preset).collect();
    c.bench_function("case_expansion", |b| {
        b.iter(|| {
            let expansion =
                CatalogExpansion::from_config(black_box(&catalog), groups.len()).expect("expand");
            build_case_list(&expansion.scenarios, &groups, None)
        });
    });
}

fn bench_envelope_reduce(c: &mut Criterion) {
    let vectors: Vec<Vec<f64>> = (0..1_000)
        .map(|case| {
            (0..18)
                .map(|station| ((case * 31 + station * 17) % 97) as f64)
                .collect()
        })
        .collect();
    c.bench_function("envelope_reduce", |b| {
        b.iter(|| reduce(black_box(&vectors), Baseline::Unset).expect("reduce"));
    });
}

criterion_group!(benches, bench_case_expansion, bench_envelope_reduce);
criterion_main!(benches);
