//! Decentralized identifiers for doauth public keys.
//!
//! A doauth DID is the encoded public key behind a fixed method prefix,
//! `did:doauth:<url-safe key>`, so the key can always be read back from the
//! identifier itself. Only the padded encoding is accepted, which keeps one
//! identifier per key.
//!
//! [`from_pk`] and [`to_pk`] have the shapes of [`crate::proof::KeyToMethod`]
//! and [`crate::proof::MethodToKey`], so proofs can name their signer by DID:
//!
//! ```rust
//! use doauth_core::{did, ProofOptions};
//!
//! let options = ProofOptions::default().with_key_field(did::from_pk, did::to_pk);
//! ```

use crate::codec::{encode, ByteLike};
use crate::crypto::PUBLIC_KEY_BYTES;
use crate::error::CodecError;

/// Method prefix of every doauth DID.
pub const DID_PREFIX: &str = "did:doauth:";

/// The DID of a public key.
pub fn from_pk(public: &ByteLike) -> Result<String, CodecError> {
    let key: [u8; PUBLIC_KEY_BYTES] = public.to_array()?;
    Ok(format!("{DID_PREFIX}{}", encode(&key)))
}

/// The DID of an encoded public key.
pub fn from_pk64(pk64: &str) -> Result<String, CodecError> {
    from_pk(&ByteLike::from_encoded(pk64)?)
}

/// Read the public key back out of a DID.
pub fn to_pk(did: &str) -> Result<ByteLike, CodecError> {
    let encoded = did
        .strip_prefix(DID_PREFIX)
        .ok_or_else(|| CodecError::InvalidDid(did.to_string()))?;
    let public = ByteLike::from_encoded(encoded)?;
    if from_pk(&public)? != did {
        return Err(CodecError::InvalidDid(did.to_string()));
    }
    Ok(public)
}

/// Whether `text` names a doauth key.
pub fn is_did(text: &str) -> bool {
    to_pk(text).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::Primitives;
    use crate::proof::{proofs, sign_map, verify_map, ProofOptions};
    use serde_json::json;

    #[test]
    fn test_from_pk_known_key() {
        let p = Primitives::init().unwrap();
        let kp = p.seed_keypair(&[0x42; 32]);
        assert_eq!(
            from_pk(&kp.public).unwrap(),
            "did:doauth:IVL40Zt5HSRFMkLhXy6rbLfP-ntqXtMAl5YOBpiB2xI="
        );
    }

    #[test]
    fn test_from_pk64_normalizes_padding() {
        let padded = from_pk64("IVL40Zt5HSRFMkLhXy6rbLfP-ntqXtMAl5YOBpiB2xI=").unwrap();
        let bare = from_pk64("IVL40Zt5HSRFMkLhXy6rbLfP-ntqXtMAl5YOBpiB2xI").unwrap();
        assert_eq!(padded, bare);
    }

    #[test]
    fn test_to_pk_inverts_from_pk() {
        let p = Primitives::init().unwrap();
        let kp = p.seed_keypair(&[1u8; 32]);
        let did = from_pk(&kp.public).unwrap();
        assert_eq!(to_pk(&did).unwrap().raw().unwrap(), kp.public.raw().unwrap());
        assert!(is_did(&did));
    }

    #[test]
    fn test_malformed_dids_rejected() {
        assert!(matches!(
            to_pk("did:web:example.com"),
            Err(CodecError::InvalidDid(_))
        ));
        assert!(matches!(
            to_pk("did:doauth:IVL40Zt5HSRFMkLhXy6rbLfP-ntqXtMAl5YOBpiB2xI"),
            Err(CodecError::InvalidDid(_))
        ));
        assert!(matches!(
            to_pk("did:doauth:AAAA"),
            Err(CodecError::Length { expected: 32, actual: 3 })
        ));
        assert!(to_pk("did:doauth:%%%").is_err());
        assert!(!is_did("IVL40Zt5HSRFMkLhXy6rbLfP-ntqXtMAl5YOBpiB2xI="));
    }

    #[test]
    fn test_proofs_name_signer_by_did() {
        let p = Primitives::init().unwrap();
        let kp = p.seed_keypair(&[4u8; 32]);
        let options = ProofOptions::default().with_key_field(from_pk, to_pk);

        let mut claim = serde_json::Map::new();
        claim.insert("hello".into(), json!("world"));
        let signed = sign_map(&p, &kp, &claim, &options).unwrap();

        let attached = proofs(&signed, &options).unwrap();
        assert_eq!(attached[0].verification_method, from_pk(&kp.public).unwrap());
        assert!(verify_map(&p, &signed, &options).unwrap());
        // A verifier expecting bare keys cannot read a DID
        assert!(!verify_map(&p, &signed, &ProofOptions::default()).unwrap());
    }
}
