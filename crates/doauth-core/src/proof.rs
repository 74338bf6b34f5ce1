//! Proofs: detached signatures attached to claim maps.
//!
//! A claim is signed over its canonical text with the proof field and the
//! ignored fields removed. Verification rebuilds exactly the same text and
//! checks every proof found under the proof field; the document verifies only
//! if all of them do.

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::canonical::canonical_string;
use crate::codec::ByteLike;
use crate::crypto::{Primitives, SigningKeypair, GENERIC_HASH_BYTES};
use crate::error::{CodecError, CoreError, Result};
use crate::value::Claim;

/// Default field holding the proof (or proofs) of a claim.
pub const DEFAULT_PROOF_FIELD: &str = "proof";

/// Fields left out of the signing input by default.
pub const DEFAULT_IGNORE: &[&str] = &["id"];

/// Turns a public key into `verificationMethod` text.
pub type KeyToMethod = fn(&ByteLike) -> std::result::Result<String, CodecError>;

/// Recovers a public key from `verificationMethod` text.
pub type MethodToKey = fn(&str) -> std::result::Result<ByteLike, CodecError>;

/// The default `verificationMethod`: the key's encoded bytes.
pub fn encoded_key_method(public: &ByteLike) -> std::result::Result<String, CodecError> {
    public.text()
}

/// Inverse of [`encoded_key_method`].
pub fn encoded_key_extractor(method: &str) -> std::result::Result<ByteLike, CodecError> {
    ByteLike::from_encoded(method)
}

/// Options shared by signing and verification.
#[derive(Debug, Clone)]
pub struct ProofOptions {
    /// Field holding the proof(s).
    pub proof_field: String,
    /// Fields removed before canonicalization.
    pub ignore: Vec<String>,
    /// How the signer's key is written into the proof.
    pub key_to_method: KeyToMethod,
    /// How the verifier reads the key back.
    pub method_to_key: MethodToKey,
}

impl Default for ProofOptions {
    fn default() -> Self {
        Self {
            proof_field: DEFAULT_PROOF_FIELD.to_string(),
            ignore: DEFAULT_IGNORE.iter().map(|s| s.to_string()).collect(),
            key_to_method: encoded_key_method,
            method_to_key: encoded_key_extractor,
        }
    }
}

impl ProofOptions {
    pub fn with_proof_field(mut self, field: impl Into<String>) -> Self {
        self.proof_field = field.into();
        self
    }

    pub fn with_ignore<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.ignore = fields.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_key_field(mut self, key_to_method: KeyToMethod, method_to_key: MethodToKey) -> Self {
        self.key_to_method = key_to_method;
        self.method_to_key = method_to_key;
        self
    }
}

/// A public key and a signature made with its secret half.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetachedSignature {
    pub public: ByteLike,
    pub signature: ByteLike,
}

/// A detached signature with signer and time attached.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Proof {
    pub verification_method: String,
    pub signature: ByteLike,
    pub timestamp: String,
}

impl Proof {
    /// Wrap a signature, stamping the current UTC time.
    pub fn from_signature(issuer: &str, signature: ByteLike) -> Self {
        Self {
            verification_method: issuer.to_string(),
            signature,
            timestamp: iso_utc_now(),
        }
    }
}

/// Current UTC time as `YYYY-MM-DDTHH:MM:SSZ`.
pub fn iso_utc_now() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Sign a message with a keypair.
pub fn sign(p: &Primitives, message: &str, keypair: &SigningKeypair) -> Result<DetachedSignature> {
    let signature = p.sign_detached(message.as_bytes(), keypair)?;
    Ok(DetachedSignature {
        public: keypair.public.normalize()?,
        signature: ByteLike::from_raw(signature.to_vec()),
    })
}

/// Check a detached signature.
///
/// Undecodable text is an error; a signature that does not match is `false`.
pub fn verify(p: &Primitives, message: &str, detached: &DetachedSignature) -> Result<bool> {
    let public = detached.public.raw()?;
    let signature = detached.signature.raw()?;
    Ok(p.verify_detached(message.as_bytes(), &signature, &public))
}

/// The claim without its proof field.
pub fn proofless(claim: &Claim, options: &ProofOptions) -> Claim {
    let mut copy = claim.clone();
    copy.remove(&options.proof_field);
    copy
}

/// The exact text that is signed for `claim`.
pub fn signing_input(claim: &Claim, options: &ProofOptions) -> Result<String> {
    let mut working = proofless(claim, options);
    for field in &options.ignore {
        working.remove(field);
    }
    Ok(canonical_string(&working)?)
}

/// Raw entries under the proof field, single or sequence.
pub fn proof_entries<'a>(claim: &'a Claim, options: &ProofOptions) -> Vec<&'a Value> {
    match claim.get(&options.proof_field) {
        None => Vec::new(),
        Some(Value::Array(items)) => items.iter().collect(),
        Some(other) => vec![other],
    }
}

/// Parse every proof on a claim, failing on the first malformed one.
pub fn proofs(claim: &Claim, options: &ProofOptions) -> Result<Vec<Proof>> {
    proof_entries(claim, options)
        .into_iter()
        .map(|entry| {
            serde_json::from_value(entry.clone())
                .map_err(|e| CoreError::MalformedClaim(format!("invalid proof: {e}")))
        })
        .collect()
}

/// Add a proof to a claim.
///
/// An absent field receives the proof; a single proof becomes a sequence.
pub fn attach_proof(claim: &mut Claim, proof: &Proof, options: &ProofOptions) -> Result<()> {
    let value = serde_json::to_value(proof).map_err(|e| CoreError::EncodingError(e.to_string()))?;
    match claim.remove(&options.proof_field) {
        None => {
            claim.insert(options.proof_field.clone(), value);
        }
        Some(Value::Array(mut items)) => {
            items.push(value);
            claim.insert(options.proof_field.clone(), Value::Array(items));
        }
        Some(existing @ Value::Object(_)) => {
            claim.insert(options.proof_field.clone(), Value::Array(vec![existing, value]));
        }
        Some(other) => {
            claim.insert(options.proof_field.clone(), other);
            return Err(CoreError::MalformedClaim(format!(
                "field {:?} does not hold proofs",
                options.proof_field
            )));
        }
    }
    Ok(())
}

/// Sign a claim and return it with the new proof attached.
///
/// Ignored fields stay in the returned claim; they are only left out of the
/// signed text.
pub fn sign_map(
    p: &Primitives,
    keypair: &SigningKeypair,
    claim: &Claim,
    options: &ProofOptions,
) -> Result<Claim> {
    let message = signing_input(claim, options)?;
    let detached = sign(p, &message, keypair)?;
    let method = (options.key_to_method)(&keypair.public)?;
    let proof = Proof::from_signature(&method, detached.signature);

    let mut signed = claim.clone();
    attach_proof(&mut signed, &proof, options)?;
    Ok(signed)
}

/// Verify every proof on a claim.
///
/// Returns `Ok(false)` for a missing, empty or malformed proof entry and for
/// any signature that does not match. Returns `Err` only when the claim body
/// itself cannot be canonicalized.
pub fn verify_map(p: &Primitives, claim: &Claim, options: &ProofOptions) -> Result<bool> {
    let message = signing_input(claim, options)?;
    let entries = proof_entries(claim, options);
    if entries.is_empty() {
        tracing::debug!(field = %options.proof_field, "claim carries no proofs");
        return Ok(false);
    }
    for (index, entry) in entries.into_iter().enumerate() {
        if !verify_entry(p, &message, entry, options) {
            tracing::debug!(index, "proof failed verification");
            return Ok(false);
        }
    }
    Ok(true)
}

/// Verify a claim and require every proof to name `expected`.
pub fn verify_map_with_key(
    p: &Primitives,
    claim: &Claim,
    expected: &ByteLike,
    options: &ProofOptions,
) -> Result<bool> {
    let expected = expected.raw()?;
    for entry in proof_entries(claim, options) {
        let named = serde_json::from_value::<Proof>(entry.clone())
            .ok()
            .and_then(|proof| (options.method_to_key)(&proof.verification_method).ok())
            .and_then(|key| key.raw().ok());
        if named.as_deref() != Some(expected.as_slice()) {
            tracing::debug!("proof names an unexpected key");
            return Ok(false);
        }
    }
    verify_map(p, claim, options)
}

fn verify_entry(p: &Primitives, message: &str, entry: &Value, options: &ProofOptions) -> bool {
    let Ok(proof) = serde_json::from_value::<Proof>(entry.clone()) else {
        return false;
    };
    let Ok(public) = (options.method_to_key)(&proof.verification_method).and_then(|k| k.raw()) else {
        return false;
    };
    let Ok(signature) = proof.signature.raw() else {
        return false;
    };
    p.verify_detached(message.as_bytes(), &signature, &public)
}

/// The 32-byte generic hash of a message, encoded.
pub fn bland_hash(p: &Primitives, message: &str) -> Result<String> {
    let digest = p.generic_hash(message.as_bytes(), GENERIC_HASH_BYTES)?;
    Ok(crate::codec::encode(&digest))
}
