//! End-to-end flows: unlock, issue, present, verify, over both stores.

use doauth::core::proof::{proofs, Proof};
use doauth::keys::{SlipConfig, DEFAULT_SLIP_KEY};
use doauth::store::{KvStore, MemoryStore, SqliteStore};
use doauth::{
    init_tracing, Claim, CredentialMeta, Doauth, DoauthConfig, PresentationMeta, ProofOptions,
    ResolveMeta, StoragePolicy,
};
use doauth_testkit::{claim, fast_slip_config};
use proptest::prelude::*;
use serde_json::json;

fn config() -> DoauthConfig {
    DoauthConfig::default().with_slip(fast_slip_config())
}

fn subject() -> Claim {
    claim(json!({"email": "alice@example.com", "nickname": "alice"}))
}

#[tokio::test]
async fn test_register_issue_present_verify() {
    init_tracing();
    let doauth = Doauth::new(MemoryStore::new(), config()).unwrap();

    let issuer = doauth.register("alice@example.com", "pw").await.unwrap();
    let credential = doauth
        .issue(&issuer, subject(), &CredentialMeta::default())
        .unwrap();
    assert!(doauth.verify(&credential).unwrap());

    let holder = doauth.login("alice@example.com", "pw").await.unwrap();
    let presentation = doauth
        .present(
            &holder,
            credential.clone(),
            &PresentationMeta::default().with_holder(holder.public_encoded().unwrap()),
        )
        .unwrap();
    assert!(doauth.verify(&presentation).unwrap());
    assert_eq!(presentation["verifiableCredential"], json!(credential));
}

#[tokio::test]
async fn test_registration_reproducible_on_another_device() {
    let laptop = Doauth::new(MemoryStore::new(), config()).unwrap();
    let phone = Doauth::new(MemoryStore::new(), config()).unwrap();

    let a = laptop.register("alice@example.com", "pw").await.unwrap();
    let b = phone.register("Alice@Example.com", "pw").await.unwrap();
    assert_eq!(a, b);

    // A credential issued on one device verifies on the other
    let cred = laptop
        .issue(&a, subject(), &CredentialMeta::default())
        .unwrap();
    assert!(phone.verify_from(&cred, &b.keypair().public).unwrap());
}

#[tokio::test]
async fn test_sqlite_slip_survives_restart() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("doauth.db");

    let first = {
        let doauth = Doauth::new(SqliteStore::open(&path).unwrap(), config()).unwrap();
        doauth.unlock("pw", &ResolveMeta::default()).await.unwrap()
    };

    let doauth = Doauth::new(SqliteStore::open(&path).unwrap(), config()).unwrap();
    assert!(doauth.store().contains(DEFAULT_SLIP_KEY).await.unwrap());
    let second = doauth.unlock("pw", &ResolveMeta::default()).await.unwrap();
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_memorised_key_survives_restart() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("doauth.db");

    let issuer = Doauth::new(MemoryStore::new(), config()).unwrap();
    let alice = issuer.register("alice@example.com", "pw").await.unwrap();
    let cred = issuer
        .issue(&alice, subject(), &CredentialMeta::default())
        .unwrap();

    let did = {
        let verifier = Doauth::new(SqliteStore::open(&path).unwrap(), config()).unwrap();
        verifier
            .memorise_public_key64(&alice.public_encoded().unwrap())
            .await
            .unwrap()
    };

    let verifier = Doauth::new(SqliteStore::open(&path).unwrap(), config()).unwrap();
    let public = verifier.recall_public_key(&did).await.unwrap().unwrap();
    assert!(verifier.verify_from(&cred, &public).unwrap());
    assert!(verifier.verify_from_did(&cred, &did).unwrap());
}

#[tokio::test]
async fn test_wrong_password_yields_other_identity() {
    let doauth = Doauth::new(MemoryStore::new(), config()).unwrap();
    let right = doauth.unlock("pw", &ResolveMeta::default()).await.unwrap();
    let wrong = doauth.unlock("pW", &ResolveMeta::default()).await.unwrap();
    assert_ne!(right, wrong);

    let cred = doauth
        .issue(&right, subject(), &CredentialMeta::default())
        .unwrap();
    assert!(!doauth.verify_from(&cred, &wrong.keypair().public).unwrap());
}

#[tokio::test]
async fn test_rewrite_policy_without_override_is_stable() {
    let doauth = Doauth::new(
        MemoryStore::new(),
        config().with_policy(StoragePolicy::PreferRewrite),
    )
    .unwrap();

    let first = doauth.unlock("pw", &ResolveMeta::default()).await.unwrap();
    let before = doauth.store().get(DEFAULT_SLIP_KEY).await.unwrap();
    let second = doauth.unlock("pw", &ResolveMeta::default()).await.unwrap();
    let after = doauth.store().get(DEFAULT_SLIP_KEY).await.unwrap();

    assert_eq!(first, second);
    assert_eq!(before, after);
}

#[tokio::test]
async fn test_rewrite_policy_with_override_replaces_stored_slip() {
    let doauth = Doauth::new(
        MemoryStore::new(),
        config().with_policy(StoragePolicy::PreferRewrite),
    )
    .unwrap();

    doauth.unlock("pw", &ResolveMeta::default()).await.unwrap();
    let before = doauth.store().get(DEFAULT_SLIP_KEY).await.unwrap();
    let bound = doauth
        .unlock("pw", &ResolveMeta::with_salt_override("alice@example.com"))
        .await
        .unwrap();
    let after = doauth.store().get(DEFAULT_SLIP_KEY).await.unwrap();
    assert_ne!(before, after);

    // The email-bound slip is now the one read back
    let again = doauth.unlock("pw", &ResolveMeta::default()).await.unwrap();
    assert_eq!(bound, again);
}

#[tokio::test]
async fn test_custom_proof_options_flow_through() {
    let proof = ProofOptions::default()
        .with_proof_field("signatures")
        .with_ignore(["id", "nonce"]);
    let doauth = Doauth::new(MemoryStore::new(), config().with_proof(proof.clone())).unwrap();
    let identity = doauth.unlock("pw", &ResolveMeta::default()).await.unwrap();

    let mut cred = doauth
        .issue(&identity, subject(), &CredentialMeta::default())
        .unwrap();
    cred.insert("nonce".into(), json!("anything"));
    assert!(doauth.verify(&cred).unwrap());

    let attached: Vec<Proof> = proofs(&cred, &proof).unwrap();
    assert_eq!(attached.len(), 1);
    assert_eq!(
        attached[0].verification_method,
        identity.public_encoded().unwrap()
    );
}

#[tokio::test]
async fn test_malformed_input_distinguished_from_failure() {
    let doauth = Doauth::new(MemoryStore::new(), config()).unwrap();
    let identity = doauth.unlock("pw", &ResolveMeta::default()).await.unwrap();
    let mut cred = doauth
        .issue(&identity, subject(), &CredentialMeta::default())
        .unwrap();

    // Not validly signed: plain false
    cred.insert("extra".into(), json!("field"));
    assert!(!doauth.verify(&cred).unwrap());

    // Unsignable body: an error
    cred.insert("flag".into(), json!(true));
    let err = doauth.verify(&cred).unwrap_err();
    assert!(err.is_malformed_input());
}

#[tokio::test]
async fn test_corrupt_slip_surfaces() {
    let store = MemoryStore::new();
    store.put(DEFAULT_SLIP_KEY, "{\"ops\":1}").await.unwrap();
    let doauth = Doauth::new(store, config()).unwrap();

    let err = doauth
        .unlock("pw", &ResolveMeta::default())
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        doauth::DoauthError::Keys(doauth::keys::KeyError::CorruptSlip(_))
    ));
}

#[test]
fn test_slip_config_from_json() {
    let config: SlipConfig =
        serde_json::from_str(r#"{"ops": 3, "mem": 268435456, "saltSize": 16}"#).unwrap();
    assert_eq!(config, SlipConfig::moderate());
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn prop_tampering_any_field_breaks_verification(
        c in doauth_testkit::generators::claim(),
        replacement in "[a-z]{1,8}",
    ) {
        let fixture = doauth_testkit::TestFixture::with_seed([7u8; 32]);
        let signed = fixture.sign(&c);
        let options = ProofOptions::default();
        prop_assert!(doauth::core::verify_map(&fixture.primitives, &signed, &options).unwrap());

        for key in c.keys().filter(|k| k.as_str() != "id") {
            let mut tampered = signed.clone();
            let original = tampered[key.as_str()].clone();
            let new_value = json!(replacement.clone());
            prop_assume!(original != new_value);
            tampered.insert(key.clone(), new_value);
            prop_assert!(!doauth::core::verify_map(&fixture.primitives, &tampered, &options).unwrap());
        }
    }
}
