use blade_core::rng::{derive_substream_seed, substream_rng, FOLD_SHUFFLE_STREAM, SAMPLING_PLAN_STREAM};
use rand::RngCore;

#[test]
fn substream_rng_emits_reproducible_sequence() {
    let mut rng_a = substream_rng(1234, SAMPLING_PLAN_STREAM);
    let mut rng_b = substream_rng(1234, SAMPLING_PLAN_STREAM);

    let seq_a: Vec<u64> = (0..100).map(|_| rng_a.next_u64()).collect();
    let seq_b: Vec<u64> = (0..100).map(|_| rng_b.next_u64()).collect();

    assert_eq!(seq_a, seq_b);
}

#[test]
fn substreams_are_distinct() {
    assert_eq!(
        derive_substream_seed(7, SAMPLING_PLAN_STREAM),
        derive_substream_seed(7, SAMPLING_PLAN_STREAM)
    );
    assert_ne!(
        derive_substream_seed(7, SAMPLING_PLAN_STREAM),
        derive_substream_seed(7, FOLD_SHUFFLE_STREAM)
    );
    assert_ne!(
        derive_substream_seed(7, SAMPLING_PLAN_STREAM),
        derive_substream_seed(8, SAMPLING_PLAN_STREAM)
    );
}
