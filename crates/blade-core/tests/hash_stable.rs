use blade_core::{stable_hash_string, to_canonical_json_bytes};
use serde_json::json;

#[test]
fn hash_is_sha256_of_canonical_json() {
    let value = json!({"b": [1, {"d": "x", "c": true}], "a": 2});
    assert_eq!(
        to_canonical_json_bytes(&value).expect("canonical"),
        br#"{"a":2,"b":[1,{"c":true,"d":"x"}]}"#.to_vec()
    );
    assert_eq!(
        stable_hash_string(&value).expect("hash"),
        "93cd50ed67f957f7157f4a4be463935df6a95ece0045763fd12c50aa7c4e1751"
    );
}
