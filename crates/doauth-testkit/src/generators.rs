//! Proptest generators for property-based testing.

use proptest::prelude::*;
use serde_json::{Map, Number, Value};

use doauth_core::crypto::{Primitives, SigningKeypair};
use doauth_core::value::{Claim, MAX_SAFE_INTEGER};
use doauth_keys::SlipConfig;

/// Generate a 32-byte seed.
pub fn seed() -> impl Strategy<Value = [u8; 32]> {
    any::<[u8; 32]>()
}

/// Generate a keypair from a random seed.
pub fn keypair(p: Primitives) -> impl Strategy<Value = SigningKeypair> {
    seed().prop_map(move |seed| p.seed_keypair(&seed))
}

/// Generate arbitrary bytes up to `max_len`.
pub fn bytes(max_len: usize) -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(any::<u8>(), 0..=max_len)
}

/// Generate a claim key, occasionally outside ASCII.
pub fn key() -> impl Strategy<Value = String> {
    prop_oneof![
        4 => "[a-zA-Z@_][a-zA-Z0-9_]{0,11}",
        1 => "[é日\u{1F600}a-z]{1,4}",
    ]
    .prop_map(String::from)
}

/// Generate an integer every implementation represents exactly.
pub fn safe_integer() -> impl Strategy<Value = i64> {
    -MAX_SAFE_INTEGER..=MAX_SAFE_INTEGER
}

/// Generate a scalar claim value.
pub fn scalar() -> impl Strategy<Value = Value> {
    prop_oneof![
        ".{0,16}".prop_map(Value::String),
        safe_integer().prop_map(Value::from),
        (-1.0e6f64..1.0e6f64)
            .prop_filter_map("finite", Number::from_f64)
            .prop_map(Value::Number),
    ]
}

/// Generate a nested claim value (no nulls, no booleans).
pub fn value() -> impl Strategy<Value = Value> {
    scalar().prop_recursive(3, 24, 4, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..4).prop_map(Value::Array),
            prop::collection::btree_map(key(), inner, 0..4)
                .prop_map(|m| Value::Object(m.into_iter().collect::<Map<_, _>>())),
        ]
    })
}

/// Generate an unsigned claim map.
pub fn claim() -> impl Strategy<Value = Claim> {
    prop::collection::btree_map(key(), value(), 0..6).prop_map(|m| {
        let mut claim: Claim = m.into_iter().collect();
        claim.remove(doauth_core::proof::DEFAULT_PROOF_FIELD);
        claim
    })
}

/// Generate a cheap but valid slip configuration.
pub fn slip_config() -> impl Strategy<Value = SlipConfig> {
    (1u32..=2, 8u32..=64, 16usize..=32).prop_map(|(ops, kib, salt_size)| SlipConfig {
        ops,
        mem: kib * 1024,
        salt_size,
    })
}
