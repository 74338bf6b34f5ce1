//! # doauth core
//!
//! Pure primitives for doauth: the byte/text codec, claim canonicalization,
//! detached-signature proofs and the credential builders.
//!
//! This crate does no I/O. Key derivation from passwords lives in
//! `doauth-keys`; persistence lives in `doauth-store`.
//!
//! ## Key Types
//!
//! - [`ByteLike`] - Bytes known raw, as URL-safe text, or both
//! - [`Cannable`] - The closed set of values a claim may carry
//! - [`Primitives`] - Readiness handle for hashing and signatures
//! - [`SigningKeypair`] - Ed25519 keypair as `ByteLike` halves
//! - [`Proof`] - Signature, signer and timestamp attached to a claim
//! - [`did`] - `did:doauth:` identifiers for public keys
//!
//! ## Canonicalization
//!
//! Claims are signed over a compact JSON rendering of their canonical form,
//! where every mapping becomes a key-sorted list of pairs. See [`canonical`].

pub mod canonical;
pub mod codec;
pub mod credential;
pub mod crypto;
pub mod did;
pub mod error;
pub mod proof;
pub mod value;

pub use canonical::{canonical_string, canonicalise, CanonicalForm};
pub use codec::{decode, encode, ByteLike, Encoded, Shape};
pub use credential::{mk_credential, present_credential, CredentialMeta, PresentationMeta};
pub use crypto::{Primitives, SigningKeypair};
pub use did::DID_PREFIX;
pub use error::{CanonicalizationError, CodecError, CoreError, Result};
pub use proof::{
    attach_proof, bland_hash, iso_utc_now, proofless, proofs, sign, sign_map, signing_input,
    verify, verify_map, verify_map_with_key, DetachedSignature, Proof, ProofOptions,
};
pub use value::{Cannable, Claim};
