//! Test fixtures and helpers.
//!
//! Common setup code for integration tests.

use serde_json::Value;

use doauth_core::credential::{mk_credential, CredentialMeta};
use doauth_core::crypto::{Primitives, SigningKeypair};
use doauth_core::proof::{sign_map, ProofOptions};
use doauth_core::value::Claim;
use doauth_keys::SlipConfig;
use doauth_store::MemoryStore;

/// Issuance date pinned by fixtures so signatures are reproducible.
pub const FIXED_ISSUANCE_DATE: &str = "2021-08-17T22:49:56Z";

/// Slip parameters cheap enough for tests: one pass over 64 KiB.
pub fn fast_slip_config() -> SlipConfig {
    SlipConfig {
        ops: 1,
        mem: 64 * 1024,
        salt_size: 16,
    }
}

/// Turn a JSON object literal into a claim.
///
/// # Panics
///
/// If `value` is not an object.
pub fn claim(value: Value) -> Claim {
    match value {
        Value::Object(map) => map,
        other => panic!("claim fixture must be a JSON object, got {other}"),
    }
}

/// A test fixture with a keypair and memory store.
pub struct TestFixture {
    pub primitives: Primitives,
    pub keypair: SigningKeypair,
    pub store: MemoryStore,
}

impl TestFixture {
    /// Create a new test fixture with a random keypair.
    pub fn new() -> Self {
        let primitives = primitives();
        Self {
            keypair: primitives.generate_keypair(),
            primitives,
            store: MemoryStore::new(),
        }
    }

    /// Create with a deterministic keypair from seed.
    pub fn with_seed(seed: [u8; 32]) -> Self {
        let primitives = primitives();
        Self {
            keypair: primitives.seed_keypair(&seed),
            primitives,
            store: MemoryStore::new(),
        }
    }

    /// The keypair's encoded public key.
    pub fn public_encoded(&self) -> String {
        self.keypair
            .public_encoded()
            .unwrap_or_else(|e| panic!("fixture keypair has a bad public key: {e}"))
    }

    /// Sign an arbitrary claim with default options.
    pub fn sign(&self, claim: &Claim) -> Claim {
        sign_map(&self.primitives, &self.keypair, claim, &ProofOptions::default())
            .unwrap_or_else(|e| panic!("fixture failed to sign: {e}"))
    }

    /// Issue a credential with the pinned issuance date.
    pub fn credential(&self, subject: Claim) -> Claim {
        let meta = CredentialMeta::default().with_issuance_date(FIXED_ISSUANCE_DATE);
        mk_credential(
            &self.primitives,
            &self.keypair,
            subject,
            &meta,
            &ProofOptions::default(),
        )
        .unwrap_or_else(|e| panic!("fixture failed to issue: {e}"))
    }
}

impl Default for TestFixture {
    fn default() -> Self {
        Self::new()
    }
}

/// Create multiple test fixtures for multi-party tests.
pub fn multi_party_fixtures(count: usize) -> Vec<TestFixture> {
    (0..count)
        .map(|i| {
            let mut seed = [0u8; 32];
            seed[0] = i as u8;
            TestFixture::with_seed(seed)
        })
        .collect()
}

fn primitives() -> Primitives {
    Primitives::init().unwrap_or_else(|e| panic!("crypto primitives failed self test: {e}"))
}
