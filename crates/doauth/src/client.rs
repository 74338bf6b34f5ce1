//! The doauth client: unlock an identity, then issue, present and verify.

use std::sync::Arc;

use doauth_core::{
    did, mk_credential, present_credential, sign_map, verify_map, verify_map_with_key, ByteLike,
    Claim, CredentialMeta, PresentationMeta, Primitives, ProofOptions, SigningKeypair,
};
use doauth_keys::{
    derive_signing_keypair, MasterSecret, ResolveMeta, SlipConfig, SlipResolver, StoragePolicy,
    DEFAULT_SLIP_KEY, LOGIN_ATTESTATION, PRIMARY_IDENTITY,
};
use doauth_store::KvStore;

use crate::error::{DoauthError, Result};

/// Store key prefix for memorised public keys, followed by the DID.
pub const PUBLIC_KEY_RECORD_PREFIX: &str = "doauth_pk:";

/// Configuration for a [`Doauth`] client.
#[derive(Debug, Clone)]
pub struct DoauthConfig {
    /// Password hashing parameters for new slips.
    pub slip: SlipConfig,
    /// Policy used by [`Doauth::unlock`].
    pub policy: StoragePolicy,
    /// Purpose index [`Doauth::unlock`] derives.
    pub identity_index: u64,
    /// Store key of the slip record.
    pub slip_key: String,
    /// Proof field and ignore list for everything signed or verified.
    pub proof: ProofOptions,
}

impl Default for DoauthConfig {
    fn default() -> Self {
        Self {
            slip: SlipConfig::default(),
            policy: StoragePolicy::default(),
            identity_index: PRIMARY_IDENTITY,
            slip_key: DEFAULT_SLIP_KEY.to_string(),
            proof: ProofOptions::default(),
        }
    }
}

impl DoauthConfig {
    pub fn with_slip(mut self, slip: SlipConfig) -> Self {
        self.slip = slip;
        self
    }

    pub fn with_policy(mut self, policy: StoragePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_identity_index(mut self, index: u64) -> Self {
        self.identity_index = index;
        self
    }

    pub fn with_slip_key(mut self, key: impl Into<String>) -> Self {
        self.slip_key = key.into();
        self
    }

    pub fn with_proof(mut self, proof: ProofOptions) -> Self {
        self.proof = proof;
        self
    }
}

/// A keypair derived for one purpose index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    index: u64,
    keypair: SigningKeypair,
}

impl Identity {
    pub fn index(&self) -> u64 {
        self.index
    }

    pub fn keypair(&self) -> &SigningKeypair {
        &self.keypair
    }

    /// The encoded public key, as it appears in `issuer` fields.
    pub fn public_encoded(&self) -> Result<String> {
        Ok(self.keypair.public_encoded()?)
    }

    /// The `did:doauth:` identifier of this identity.
    pub fn did(&self) -> Result<String> {
        Ok(did::from_pk(&self.keypair.public)?)
    }
}

/// An unlocked master secret. Derives identities on demand.
///
/// The secret is wiped when the session is dropped.
#[derive(Debug)]
pub struct Session {
    primitives: Primitives,
    secret: MasterSecret,
}

impl Session {
    /// Derive the identity for `index`.
    pub fn identity(&self, index: u64) -> Result<Identity> {
        let keypair = derive_signing_keypair(&self.primitives, &self.secret, index)?;
        Ok(Identity { index, keypair })
    }

    pub fn primary(&self) -> Result<Identity> {
        self.identity(PRIMARY_IDENTITY)
    }
}

/// The main client.
///
/// Holds the primitive handle, the slip store and the configuration.
/// Signing and verification are synchronous; only unlocking touches the
/// store and the password hash.
pub struct Doauth<S: KvStore> {
    primitives: Primitives,
    store: Arc<S>,
    config: DoauthConfig,
}

impl<S: KvStore> Doauth<S> {
    /// Create a client, running the primitive readiness check.
    pub fn new(store: S, config: DoauthConfig) -> Result<Self> {
        let primitives = Primitives::init()?;
        Ok(Self::with_primitives(primitives, store, config))
    }

    /// Create a client from an already initialized primitive handle.
    pub fn with_primitives(primitives: Primitives, store: S, config: DoauthConfig) -> Self {
        Self {
            primitives,
            store: Arc::new(store),
            config,
        }
    }

    pub fn primitives(&self) -> &Primitives {
        &self.primitives
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn config(&self) -> &DoauthConfig {
        &self.config
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Unlocking
    // ─────────────────────────────────────────────────────────────────────────

    /// Resolve the master secret for `password` under `policy`.
    pub async fn open_session(
        &self,
        password: &str,
        meta: &ResolveMeta,
        policy: StoragePolicy,
    ) -> Result<Session> {
        let secret = SlipResolver::new(self.primitives, self.store.as_ref(), self.config.slip)
            .with_slip_key(self.config.slip_key.clone())
            .resolve(password, meta, policy)
            .await?;
        Ok(Session {
            primitives: self.primitives,
            secret,
        })
    }

    /// Unlock the configured identity with the configured policy.
    pub async fn unlock(&self, password: &str, meta: &ResolveMeta) -> Result<Identity> {
        let session = self.open_session(password, meta, self.config.policy).await?;
        session.identity(self.config.identity_index)
    }

    /// Registration: the primary identity, salted by the email address so it
    /// can be reproduced on any device.
    pub async fn register(&self, email: &str, password: &str) -> Result<Identity> {
        let identity = self
            .unlock_by_email(email, password, PRIMARY_IDENTITY)
            .await?;
        tracing::info!(index = identity.index(), "registered identity");
        Ok(identity)
    }

    /// Login: the attestation identity for the same email and password.
    pub async fn login(&self, email: &str, password: &str) -> Result<Identity> {
        self.unlock_by_email(email, password, LOGIN_ATTESTATION)
            .await
    }

    async fn unlock_by_email(&self, email: &str, password: &str, index: u64) -> Result<Identity> {
        let email = normalize_email(email)?;
        let session = self
            .open_session(
                password,
                &ResolveMeta::with_salt_override(email),
                StoragePolicy::PreferRewrite,
            )
            .await?;
        session.identity(index)
    }

    /// Delete the stored slip. Returns `true` if one existed.
    pub async fn forget(&self) -> Result<bool> {
        Ok(self.store.remove(&self.config.slip_key).await?)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Claims
    // ─────────────────────────────────────────────────────────────────────────

    /// Issue a signed credential about `subject`.
    pub fn issue(&self, identity: &Identity, subject: Claim, meta: &CredentialMeta) -> Result<Claim> {
        Ok(mk_credential(
            &self.primitives,
            &identity.keypair,
            subject,
            meta,
            &self.config.proof,
        )?)
    }

    /// Wrap a credential in a signed presentation.
    pub fn present(
        &self,
        identity: &Identity,
        credential: Claim,
        meta: &PresentationMeta,
    ) -> Result<Claim> {
        Ok(present_credential(
            &self.primitives,
            &identity.keypair,
            credential,
            meta,
            &self.config.proof,
        )?)
    }

    /// Add this identity's proof to any claim, keeping existing proofs.
    pub fn countersign(&self, identity: &Identity, claim: &Claim) -> Result<Claim> {
        Ok(sign_map(
            &self.primitives,
            &identity.keypair,
            claim,
            &self.config.proof,
        )?)
    }

    /// Verify every proof on a claim.
    ///
    /// `Ok(false)` means the document is not validly signed; `Err` means it
    /// could not be examined at all.
    pub fn verify(&self, claim: &Claim) -> Result<bool> {
        Ok(verify_map(&self.primitives, claim, &self.config.proof)?)
    }

    /// Verify a claim and require every proof to come from `public`.
    pub fn verify_from(&self, claim: &Claim, public: &ByteLike) -> Result<bool> {
        Ok(verify_map_with_key(
            &self.primitives,
            claim,
            public,
            &self.config.proof,
        )?)
    }

    /// Verify a claim and require every proof to come from the key behind `did`.
    pub fn verify_from_did(&self, claim: &Claim, did: &str) -> Result<bool> {
        let public = did::to_pk(did)?;
        self.verify_from(claim, &public)
    }

    /// Parse JSON text into a claim and verify it.
    pub fn verify_json(&self, text: &str) -> Result<bool> {
        let claim: Claim = serde_json::from_str(text)
            .map_err(|e| DoauthError::InvalidInput(format!("not a JSON object: {e}")))?;
        self.verify(&claim)
    }
}

impl<S: KvStore> Doauth<S> {
    // ─────────────────────────────────────────────────────────────────────────
    // Known public keys
    // ─────────────────────────────────────────────────────────────────────────

    /// Remember a public key in the store. Returns its DID.
    pub async fn memorise_public_key(&self, public: &ByteLike) -> Result<String> {
        let did = did::from_pk(public)?;
        let encoded = public.text()?;
        self.store.put(&public_key_record(&did), &encoded).await?;
        tracing::debug!(%did, "public key memorised");
        Ok(did)
    }

    /// Remember an encoded public key. Returns its DID.
    pub async fn memorise_public_key64(&self, pk64: &str) -> Result<String> {
        self.memorise_public_key(&ByteLike::from_encoded(pk64)?)
            .await
    }

    /// Look up a memorised public key by DID.
    ///
    /// `None` when the key was never memorised here. A stored record that
    /// names a different key is an error.
    pub async fn recall_public_key(&self, did: &str) -> Result<Option<ByteLike>> {
        let expected = did::to_pk(did)?;
        let Some(encoded) = self.store.get(&public_key_record(did)).await? else {
            return Ok(None);
        };
        let public = ByteLike::from_encoded(encoded)?;
        if public.raw()? != expected.raw()? {
            return Err(DoauthError::InvalidInput(format!(
                "memorised key for {did} does not match the identifier"
            )));
        }
        Ok(Some(public))
    }

    /// Forget a memorised public key. Returns `true` if one was stored.
    pub async fn forget_public_key(&self, did: &str) -> Result<bool> {
        Ok(self.store.remove(&public_key_record(did)).await?)
    }
}

fn public_key_record(did: &str) -> String {
    format!("{PUBLIC_KEY_RECORD_PREFIX}{did}")
}

/// Trim and lowercase an email used as a salt source.
pub fn normalize_email(email: &str) -> Result<String> {
    let email = email.trim().to_lowercase();
    if email.is_empty() {
        return Err(DoauthError::InvalidInput("email is empty".into()));
    }
    Ok(email)
}
