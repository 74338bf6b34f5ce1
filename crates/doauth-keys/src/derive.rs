//! Purpose-indexed signing keypairs.
//!
//! The index is the only thing separating keys derived from one master
//! secret. Indices in use:
//!
//! | index | purpose                                   |
//! |-------|-------------------------------------------|
//! | 1     | [`PRIMARY_IDENTITY`], registration identity |
//! | 5     | [`LOGIN_ATTESTATION`], login credentials    |

use doauth_core::crypto::{Primitives, SigningKeypair, KDF_CONTEXT_BYTES};
use zeroize::Zeroizing;

use crate::error::Result;
use crate::master::MasterSecret;

/// Context tag mixed into every signing key derivation.
pub const KDF_CONTEXT: &[u8; KDF_CONTEXT_BYTES] = b"doauthkp";

/// The account's long-lived identity key.
pub const PRIMARY_IDENTITY: u64 = 1;

/// Key that signs login attestations.
pub const LOGIN_ATTESTATION: u64 = 5;

/// Derive the keypair for `index`.
pub fn derive_signing_keypair(
    p: &Primitives,
    secret: &MasterSecret,
    index: u64,
) -> Result<SigningKeypair> {
    let seed = Zeroizing::new(p.kdf_derive(secret.as_bytes(), index, KDF_CONTEXT)?);
    Ok(p.seed_keypair(&seed))
}

#[cfg(test)]
mod tests {
    use super::*;
    use doauth_core::proof::{sign, verify};
    use proptest::prelude::*;

    fn secret(byte: u8) -> MasterSecret {
        MasterSecret::from_bytes([byte; 32])
    }

    #[test]
    fn test_same_index_same_keypair() {
        let p = Primitives::init().unwrap();
        let a = derive_signing_keypair(&p, &secret(1), PRIMARY_IDENTITY).unwrap();
        let b = derive_signing_keypair(&p, &secret(1), PRIMARY_IDENTITY).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_indices_separate_keys() {
        let p = Primitives::init().unwrap();
        let identity = derive_signing_keypair(&p, &secret(1), PRIMARY_IDENTITY).unwrap();
        let login = derive_signing_keypair(&p, &secret(1), LOGIN_ATTESTATION).unwrap();
        assert_ne!(identity.public, login.public);

        let other = derive_signing_keypair(&p, &secret(2), PRIMARY_IDENTITY).unwrap();
        assert_ne!(identity.public, other.public);
    }

    #[test]
    fn test_derived_keypair_signs() {
        let p = Primitives::init().unwrap();
        let kp = derive_signing_keypair(&p, &secret(3), PRIMARY_IDENTITY).unwrap();
        let detached = sign(&p, "message", &kp).unwrap();
        assert!(verify(&p, "message", &detached).unwrap());
    }

    proptest! {
        #[test]
        fn prop_distinct_indices_distinct_keys(a in 0u64..1000, b in 0u64..1000) {
            prop_assume!(a != b);
            let p = Primitives::init().unwrap();
            let s = secret(9);
            let ka = derive_signing_keypair(&p, &s, a).unwrap();
            let kb = derive_signing_keypair(&p, &s, b).unwrap();
            prop_assert_ne!(&ka.public, &kb.public);
        }
    }
}
