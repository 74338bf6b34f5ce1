//! Golden test vectors for cross-implementation verification.
//!
//! Every conforming implementation must reproduce these exactly: the hash
//! and derivation constructions match libsodium, Ed25519 signatures are
//! deterministic, and the canonical text is byte-for-byte fixed.

use doauth_core::canonical::canonical_string;
use doauth_core::codec::{encode, ByteLike};
use doauth_core::credential::{mk_credential, CredentialMeta};
use doauth_core::crypto::{Primitives, GENERIC_HASH_BYTES};
use doauth_core::proof::{sign, signing_input, ProofOptions};
use doauth_core::value::Claim;
use doauth_keys::{derive_master_secret, derive_signing_keypair, init_slip, Slip, SlipConfig};

/// Generic hash of a UTF-8 string.
#[derive(Debug, Clone)]
pub struct HashVector {
    pub name: &'static str,
    pub input: &'static str,
    /// URL-safe encoded 32-byte digest.
    pub expected: &'static str,
}

/// Subkey derivation from a fixed key.
#[derive(Debug, Clone)]
pub struct KdfVector {
    pub name: &'static str,
    pub key: [u8; 32],
    pub index: u64,
    /// Hex subkey.
    pub expected: &'static str,
}

/// Password to master secret to identities.
#[derive(Debug, Clone)]
pub struct DerivationVector {
    pub name: &'static str,
    pub password: &'static str,
    pub salt_source: &'static str,
    pub ops: u32,
    pub mem: u32,
    pub expected_salt: &'static str,
    /// Hex master secret.
    pub expected_master: &'static str,
    /// `(index, encoded public key)` pairs.
    pub identities: &'static [(u64, &'static str)],
}

/// A deterministic Ed25519 signature over a text message.
#[derive(Debug, Clone)]
pub struct SignatureVector {
    pub name: &'static str,
    pub seed: [u8; 32],
    pub message: &'static str,
    pub expected_public: &'static str,
    pub expected_signature: &'static str,
}

/// A claim and its canonical text.
#[derive(Debug, Clone)]
pub struct CanonicalVector {
    pub name: &'static str,
    pub claim_json: &'static str,
    pub expected: &'static str,
}

/// A full credential with a pinned issuance date.
#[derive(Debug, Clone)]
pub struct CredentialVector {
    pub name: &'static str,
    pub seed: [u8; 32],
    pub subject_json: &'static str,
    pub issuance_date: &'static str,
    pub expected_signing_input: &'static str,
    pub expected_signature: &'static str,
}

/// Public key of the externally produced credential fixture.
pub const REFERENCE_PUBLIC_KEY: &str = "dW8Z2z2icecILIyAdrjaOqkurfC99ocFR87r9QX_mJQ=";

/// Signature of the externally produced credential fixture.
pub const REFERENCE_SIGNATURE: &str =
    "5rQ5V1M3QzCCFOH_w1xu0ondNWLyn8sd4-p3-AiS3GXKLjO4J4BUWLM1xH-CfFcd-LPj-ys908SjHMa-WOq-AA==";

/// Issuance date of the externally produced credential fixture.
pub const REFERENCE_ISSUANCE_DATE: &str = "2021-08-17T22:49:56Z";

pub fn hash_vectors() -> Vec<HashVector> {
    vec![HashVector {
        name: "Glory to Ukraine",
        input: "Glory to Ukraine",
        expected: "UjuhVEXQembMCmLfemONVeBKhDCEeXbTtgiht472zGA=",
    }]
}

pub fn kdf_vectors() -> Vec<KdfVector> {
    vec![
        KdfVector {
            name: "primary identity",
            key: [0x11; 32],
            index: 1,
            expected: "c933891eb1a97abd91c0f58b43e54ab7ea055b7317b1a9fd6359a7f64d8e4420",
        },
        KdfVector {
            name: "login attestation",
            key: [0x11; 32],
            index: 5,
            expected: "984f63a70516b77cedd24f4e81f54db60f4defb8539e3b56670353fdfea7ba6c",
        },
    ]
}

pub fn derivation_vectors() -> Vec<DerivationVector> {
    vec![DerivationVector {
        name: "email-salted fast slip",
        password: "correct horse",
        salt_source: "alice@example.com",
        ops: 1,
        mem: 64 * 1024,
        expected_salt: "qZHiNlGQe6mhN0Jj4vRyHQ==",
        expected_master: "91fbfd951df04cc4013e413ace8d62cd5816b6f618cdf0a600b1dac6a1fd6ee5",
        identities: &[
            (1, "KKOEgp8mjvtPx5T4UAWicyd-dqJsWvNhBbvYfJ0TYao="),
            (5, "jljyypfg9Y94g4bb2OM8dXCwyOgCOFdit1zy8epew9M="),
        ],
    }]
}

pub fn signature_vectors() -> Vec<SignatureVector> {
    vec![SignatureVector {
        name: "canonical hello world",
        seed: [0x42; 32],
        message: r#"[["hello","world"]]"#,
        expected_public: "IVL40Zt5HSRFMkLhXy6rbLfP-ntqXtMAl5YOBpiB2xI=",
        expected_signature: "WvMFwsFw-c6RBdqnH--1ZjLbnxYzyoZ2YJFwAZldjZKg9KHniSaiLTnwky9pcbJpgrwHUIrlnEq___1-5ohOAg==",
    }]
}

pub fn canonical_vectors() -> Vec<CanonicalVector> {
    vec![
        CanonicalVector {
            name: "flat mapping",
            claim_json: r#"{"b":"2","a":"1"}"#,
            expected: r#"[["a","1"],["b","2"]]"#,
        },
        CanonicalVector {
            name: "nested sequence of mappings",
            claim_json: r#"{"z":[{"y":1,"x":2.5}],"a":{}}"#,
            expected: r#"[["a",[]],["z",[[["x",2.5],["y",1]]]]]"#,
        },
        CanonicalVector {
            name: "case and non-ascii keys",
            claim_json: r#"{"é":"1","z":"2","Z":"3"}"#,
            expected: r#"[["Z","3"],["z","2"],["é","1"]]"#,
        },
        CanonicalVector {
            name: "numbers",
            claim_json: r#"{"n":1.0,"m":-0.5,"big":9007199254740991}"#,
            expected: r#"[["big",9007199254740991],["m",-0.5],["n",1]]"#,
        },
        CanonicalVector {
            name: "large integral doubles",
            claim_json: r#"{"n":1e21,"m":1.5e20}"#,
            expected: r#"[["m",150000000000000000000],["n",1e+21]]"#,
        },
        CanonicalVector {
            name: "escapes",
            claim_json: r#"{"s":"line\nbreak \"q\""}"#,
            expected: r#"[["s","line\nbreak \"q\""]]"#,
        },
    ]
}

pub fn credential_vectors() -> Vec<CredentialVector> {
    vec![CredentialVector {
        name: "hello world credential",
        seed: [0x42; 32],
        subject_json: r#"{"hello":"world"}"#,
        issuance_date: REFERENCE_ISSUANCE_DATE,
        expected_signing_input: r#"[["@context",[]],["credentialSubject",[["hello","world"]]],["issuanceDate","2021-08-17T22:49:56Z"],["issuer","IVL40Zt5HSRFMkLhXy6rbLfP-ntqXtMAl5YOBpiB2xI="],["type",[]]]"#,
        expected_signature: "9oul4UXnfA4djEMhSgMbivnkAz3y-eGxOQLbJ_GCDrcLrtvHKExp94NrWB3fcNHB84OYV6SU7Nsc2YccPVfpDA==",
    }]
}

fn parse_claim(json: &str) -> Option<Claim> {
    serde_json::from_str(json).ok()
}

fn check(name: &str, actual: Option<String>, expected: &str) -> (String, bool, String) {
    let actual = actual.unwrap_or_else(|| "<error>".to_string());
    (name.to_string(), actual == expected, actual)
}

/// Evaluate every vector, returning `(name, matches, actual)`.
///
/// Call this to verify your implementation matches the reference.
pub fn verify_all_vectors(p: &Primitives) -> Vec<(String, bool, String)> {
    let mut results = Vec::new();

    for v in hash_vectors() {
        let actual = p
            .generic_hash(v.input.as_bytes(), GENERIC_HASH_BYTES)
            .ok()
            .map(|d| encode(&d));
        results.push(check(v.name, actual, v.expected));
    }

    for v in kdf_vectors() {
        let actual = p
            .kdf_derive(&v.key, v.index, doauth_keys::KDF_CONTEXT)
            .ok()
            .map(hex::encode);
        results.push(check(v.name, actual, v.expected));
    }

    for v in derivation_vectors() {
        let config = SlipConfig {
            ops: v.ops,
            mem: v.mem,
            salt_size: 16,
        };
        let derived = init_slip(p, v.password, &config, Some(v.salt_source)).ok();
        let salt = derived.as_ref().and_then(|(_, slip)| slip.salt.text().ok());
        results.push(check(v.name, salt, v.expected_salt));

        let master = derived.as_ref().map(|(secret, _)| hex::encode(secret.as_bytes()));
        results.push(check(v.name, master, v.expected_master));

        for (index, expected) in v.identities {
            let public = derived
                .as_ref()
                .and_then(|(secret, _)| derive_signing_keypair(p, secret, *index).ok())
                .and_then(|kp| kp.public_encoded().ok());
            results.push(check(v.name, public, expected));
        }
    }

    for v in signature_vectors() {
        let keypair = p.seed_keypair(&v.seed);
        results.push(check(v.name, keypair.public_encoded().ok(), v.expected_public));
        let signature = sign(p, v.message, &keypair)
            .ok()
            .and_then(|d| d.signature.text().ok());
        results.push(check(v.name, signature, v.expected_signature));
    }

    for v in canonical_vectors() {
        let actual = parse_claim(v.claim_json).and_then(|c| canonical_string(&c).ok());
        results.push(check(v.name, actual, v.expected));
    }

    for v in credential_vectors() {
        let keypair = p.seed_keypair(&v.seed);
        let options = ProofOptions::default();
        let credential = parse_claim(v.subject_json).and_then(|subject| {
            let meta = CredentialMeta::default().with_issuance_date(v.issuance_date);
            mk_credential(p, &keypair, subject, &meta, &options).ok()
        });

        let input = credential
            .as_ref()
            .and_then(|c| signing_input(c, &options).ok());
        results.push(check(v.name, input, v.expected_signing_input));

        let signature = credential
            .as_ref()
            .and_then(|c| c.get("proof"))
            .and_then(|proof| proof.get("signature"))
            .and_then(|s| s.as_str())
            .map(str::to_string);
        results.push(check(v.name, signature, v.expected_signature));
    }

    results
}

/// Re-derive a master secret from a stored slip record.
///
/// Helper for vectors shipped as persisted records.
pub fn master_from_record(p: &Primitives, password: &str, record: &str) -> Option<String> {
    let slip = Slip::from_json(record).ok()?;
    let secret = derive_master_secret(p, password, &slip).ok()?;
    Some(hex::encode(secret.as_bytes()))
}

/// Decode the reference fixture's key and signature.
pub fn reference_fixture() -> Option<(ByteLike, ByteLike)> {
    let public = ByteLike::from_encoded(REFERENCE_PUBLIC_KEY).ok()?;
    let signature = ByteLike::from_encoded(REFERENCE_SIGNATURE).ok()?;
    Some((public, signature))
}
