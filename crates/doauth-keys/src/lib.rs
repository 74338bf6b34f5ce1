//! # doauth keys
//!
//! Password-based key material. A password and a persisted slip reproduce
//! the same master secret on every unlock; purpose indices turn that secret
//! into unrelated Ed25519 keypairs.
//!
//! ```text
//! password ─┐
//!           ├─ Argon2id ─> MasterSecret ─ KDF(index, "doauthkp") ─> SigningKeypair
//! slip ─────┘
//! ```
//!
//! ## Key Types
//!
//! - [`SlipConfig`] / [`Slip`] - Cost parameters and salt
//! - [`MasterSecret`] - Zeroized root secret, never persisted
//! - [`SlipResolver`] - Applies a [`StoragePolicy`] against a `KvStore`

pub mod derive;
pub mod error;
pub mod master;
pub mod resolve;
pub mod slip;

pub use derive::{derive_signing_keypair, KDF_CONTEXT, LOGIN_ATTESTATION, PRIMARY_IDENTITY};
pub use error::{KeyError, Result};
pub use master::{derive_master_secret, init_slip, MasterSecret};
pub use resolve::{resolve_master_secret, ResolveMeta, SlipResolver, StoragePolicy};
pub use slip::{Slip, SlipConfig, DEFAULT_SLIP_KEY};
