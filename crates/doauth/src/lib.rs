//! # doauth
//!
//! Password-derived identities that issue, present and verify signed
//! credentials.
//!
//! ## Overview
//!
//! - **Slip**: salt and cost parameters kept in a [`store::KvStore`], never a secret
//! - **Identity**: an Ed25519 keypair derived from password, slip and purpose index
//! - **Credential**: a claim map carrying one or more detached-signature proofs
//! - **Verification**: rebuilds the canonical signing input and checks every proof
//! - **DID**: `did:doauth:<key>` names a key; known keys can be memorised in the store
//!
//! ## Usage
//!
//! ```rust,no_run
//! use doauth::{Doauth, DoauthConfig};
//! use doauth::core::{Claim, CredentialMeta};
//! use doauth::keys::ResolveMeta;
//! use doauth::store::SqliteStore;
//!
//! async fn example() -> doauth::Result<()> {
//!     let store = SqliteStore::open("doauth.db")?;
//!     let doauth = Doauth::new(store, DoauthConfig::default())?;
//!
//!     let identity = doauth.unlock("correct horse", &ResolveMeta::default()).await?;
//!
//!     let mut subject = Claim::new();
//!     subject.insert("hello".into(), "world".into());
//!     let credential = doauth.issue(&identity, subject, &CredentialMeta::default())?;
//!
//!     assert!(doauth.verify(&credential)?);
//!     Ok(())
//! }
//! ```
//!
//! ## Re-exports
//!
//! - `doauth::core` - Codec, canonicalization, proofs and credentials
//! - `doauth::keys` - Slips, master secrets and keypair derivation
//! - `doauth::store` - Slip persistence

pub mod client;
pub mod error;
pub mod telemetry;

// Re-export component crates
pub use doauth_core as core;
pub use doauth_keys as keys;
pub use doauth_store as store;

pub use client::{
    normalize_email, Doauth, DoauthConfig, Identity, Session, PUBLIC_KEY_RECORD_PREFIX,
};
pub use error::{DoauthError, Result};
pub use telemetry::init_tracing;

// Re-export commonly used types
pub use doauth_core::{
    ByteLike, Claim, CredentialMeta, PresentationMeta, Primitives, Proof, ProofOptions,
    SigningKeypair,
};
pub use doauth_keys::{ResolveMeta, SlipConfig, StoragePolicy, LOGIN_ATTESTATION, PRIMARY_IDENTITY};
