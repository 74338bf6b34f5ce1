//! Cryptographic primitives for doauth.
//!
//! [`Primitives`] is the single entry point to hashing, password hashing,
//! key derivation and Ed25519. Obtaining one runs a known-answer self test;
//! every operation that touches a primitive takes the handle, so nothing
//! can run before readiness has been established.
//!
//! The constructions match libsodium's so keys and hashes are reproducible
//! by other implementations:
//! - generic hash: unkeyed BLAKE2b, variable output
//! - password hash: Argon2id v1.3, one lane, memory given in bytes
//! - key derivation: `crypto_kdf_derive_from_key` (BLAKE2b keyed, salt =
//!   subkey id, personal = context)
//! - signing: Ed25519 from a 32-byte seed, 64-byte `seed || public` secret

use argon2::{Algorithm, Argon2, Params, Version};
use blake2::digest::consts::U32;
use blake2::digest::{Mac, Update, VariableOutput};
use blake2::{Blake2bMac, Blake2bVar};
use ed25519_dalek::{Signature, Signer, SigningKey, Verifier, VerifyingKey};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use std::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

use crate::codec::ByteLike;
use crate::error::{CoreError, Result};

/// Output size of the default generic hash.
pub const GENERIC_HASH_BYTES: usize = 32;
/// Smallest generic hash output.
pub const GENERIC_HASH_BYTES_MIN: usize = 16;
/// Largest generic hash output.
pub const GENERIC_HASH_BYTES_MAX: usize = 64;
/// Ed25519 public key size.
pub const PUBLIC_KEY_BYTES: usize = 32;
/// Ed25519 secret key size (`seed || public`).
pub const SECRET_KEY_BYTES: usize = 64;
/// Ed25519 seed size.
pub const SEED_BYTES: usize = 32;
/// Ed25519 signature size.
pub const SIGNATURE_BYTES: usize = 64;
/// Key derivation context size.
pub const KDF_CONTEXT_BYTES: usize = 8;
/// Key derivation master key size.
pub const KDF_KEY_BYTES: usize = 32;

/// Known answer for the readiness self test.
const SELF_TEST_INPUT: &[u8] = b"Glory to Ukraine";
const SELF_TEST_DIGEST: &str = "UjuhVEXQembMCmLfemONVeBKhDCEeXbTtgiht472zGA=";

/// Handle proving the primitive library passed its readiness check.
///
/// Cheap to copy; obtain once with [`Primitives::init`] and pass around.
#[derive(Clone, Copy)]
pub struct Primitives {
    _ready: (),
}

impl Primitives {
    /// Run the one-time readiness step.
    pub fn init() -> Result<Self> {
        let primitives = Self { _ready: () };
        primitives.self_test()?;
        tracing::debug!("crypto primitives ready");
        Ok(primitives)
    }

    fn self_test(&self) -> Result<()> {
        let digest = self
            .generic_hash(SELF_TEST_INPUT, GENERIC_HASH_BYTES)
            .map_err(|e| CoreError::PrimitiveUnavailable(e.to_string()))?;
        if crate::codec::encode(&digest) != SELF_TEST_DIGEST {
            return Err(CoreError::PrimitiveUnavailable(
                "generic hash known-answer test failed".into(),
            ));
        }

        let keypair = self.seed_keypair(&[0x42; SEED_BYTES]);
        let signature = self
            .sign_detached(SELF_TEST_INPUT, &keypair)
            .map_err(|e| CoreError::PrimitiveUnavailable(e.to_string()))?;
        let public = keypair
            .public_bytes()
            .map_err(|e| CoreError::PrimitiveUnavailable(e.to_string()))?;
        if !self.verify_detached(SELF_TEST_INPUT, &signature, &public) {
            return Err(CoreError::PrimitiveUnavailable(
                "signature round trip failed".into(),
            ));
        }
        Ok(())
    }

    /// Unkeyed BLAKE2b with `out_len` bytes of output.
    pub fn generic_hash(&self, data: &[u8], out_len: usize) -> Result<Vec<u8>> {
        if !(GENERIC_HASH_BYTES_MIN..=GENERIC_HASH_BYTES_MAX).contains(&out_len) {
            return Err(CoreError::Hash(format!(
                "output length {out_len} outside {GENERIC_HASH_BYTES_MIN}..={GENERIC_HASH_BYTES_MAX}"
            )));
        }
        let mut hasher = Blake2bVar::new(out_len).map_err(|e| CoreError::Hash(e.to_string()))?;
        hasher.update(data);
        let mut out = vec![0u8; out_len];
        hasher
            .finalize_variable(&mut out)
            .map_err(|e| CoreError::Hash(e.to_string()))?;
        Ok(out)
    }

    /// Argon2id password hash.
    ///
    /// `mem` is in bytes; Argon2 works in KiB blocks.
    pub fn pwhash(
        &self,
        out_len: usize,
        password: &[u8],
        salt: &[u8],
        ops: u32,
        mem: u32,
    ) -> Result<Vec<u8>> {
        let params = Params::new(mem / 1024, ops, 1, Some(out_len))
            .map_err(|e| CoreError::PasswordHash(e.to_string()))?;
        let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);
        let mut out = vec![0u8; out_len];
        argon2
            .hash_password_into(password, salt, &mut out)
            .map_err(|e| CoreError::PasswordHash(e.to_string()))?;
        Ok(out)
    }

    /// Derive a 32-byte subkey from a master key, a subkey id and a context.
    pub fn kdf_derive(
        &self,
        key: &[u8; KDF_KEY_BYTES],
        subkey_id: u64,
        context: &[u8; KDF_CONTEXT_BYTES],
    ) -> Result<[u8; 32]> {
        // The message is empty; key, salt and personal carry all the input.
        let mac =
            Blake2bMac::<U32>::new_with_salt_and_personal(key, &subkey_id.to_le_bytes(), context)
                .map_err(|e| CoreError::Hash(e.to_string()))?;
        let mut out = [0u8; 32];
        out.copy_from_slice(&mac.finalize().into_bytes());
        Ok(out)
    }

    /// Fill a buffer with cryptographically secure random bytes.
    pub fn random_bytes(&self, len: usize) -> Vec<u8> {
        let mut bytes = vec![0u8; len];
        rand::thread_rng().fill_bytes(&mut bytes);
        bytes
    }

    /// Deterministic Ed25519 keypair from a seed.
    pub fn seed_keypair(&self, seed: &[u8; SEED_BYTES]) -> SigningKeypair {
        SigningKeypair::from_signing_key(&SigningKey::from_bytes(seed))
    }

    /// Fresh random Ed25519 keypair.
    pub fn generate_keypair(&self) -> SigningKeypair {
        let signing_key = SigningKey::generate(&mut rand::thread_rng());
        SigningKeypair::from_signing_key(&signing_key)
    }

    /// Detached Ed25519 signature.
    pub fn sign_detached(&self, message: &[u8], keypair: &SigningKeypair) -> Result<[u8; SIGNATURE_BYTES]> {
        let signing_key = keypair.signing_key()?;
        Ok(signing_key.sign(message).to_bytes())
    }

    /// Check a detached Ed25519 signature.
    ///
    /// Wrong sizes and invalid keys are a failed verification, not an error.
    pub fn verify_detached(&self, message: &[u8], signature: &[u8], public: &[u8]) -> bool {
        let Ok(public) = <[u8; PUBLIC_KEY_BYTES]>::try_from(public) else {
            return false;
        };
        let Ok(signature) = <[u8; SIGNATURE_BYTES]>::try_from(signature) else {
            return false;
        };
        let Ok(verifying_key) = VerifyingKey::from_bytes(&public) else {
            return false;
        };
        verifying_key
            .verify(message, &Signature::from_bytes(&signature))
            .is_ok()
    }
}

impl fmt::Debug for Primitives {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Primitives(ready)")
    }
}

/// An Ed25519 keypair as a pair of [`ByteLike`] halves.
///
/// The secret half is the 64-byte `seed || public` form; a bare 32-byte
/// seed is also accepted. It is wiped when the keypair is dropped.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SigningKeypair {
    pub public: ByteLike,
    pub secret: ByteLike,
}

impl SigningKeypair {
    fn from_signing_key(signing_key: &SigningKey) -> Self {
        Self {
            public: ByteLike::from_raw(signing_key.verifying_key().to_bytes().to_vec()),
            secret: ByteLike::from_raw(Zeroizing::new(signing_key.to_keypair_bytes()).to_vec()),
        }
    }

    /// The public key bytes.
    pub fn public_bytes(&self) -> Result<[u8; PUBLIC_KEY_BYTES]> {
        Ok(self.public.to_array()?)
    }

    /// The public key as URL-safe text.
    pub fn public_encoded(&self) -> Result<String> {
        Ok(self.public.text()?)
    }

    fn signing_key(&self) -> Result<SigningKey> {
        let secret = Zeroizing::new(self.secret.raw()?);
        let signing_key = match secret.len() {
            SECRET_KEY_BYTES => {
                let bytes: Zeroizing<[u8; SECRET_KEY_BYTES]> = Zeroizing::new(
                    secret
                        .as_slice()
                        .try_into()
                        .map_err(|_| CoreError::InvalidSecretKey)?,
                );
                SigningKey::from_keypair_bytes(&bytes).map_err(|_| CoreError::InvalidSecretKey)?
            }
            SEED_BYTES => {
                let bytes: Zeroizing<[u8; SEED_BYTES]> = Zeroizing::new(
                    secret
                        .as_slice()
                        .try_into()
                        .map_err(|_| CoreError::InvalidSecretKey)?,
                );
                SigningKey::from_bytes(&bytes)
            }
            _ => return Err(CoreError::InvalidSecretKey),
        };
        if signing_key.verifying_key().to_bytes() != self.public_bytes()? {
            return Err(CoreError::InvalidPublicKey);
        }
        Ok(signing_key)
    }
}

impl Zeroize for SigningKeypair {
    fn zeroize(&mut self) {
        self.secret.zeroize();
    }
}

impl Drop for SigningKeypair {
    fn drop(&mut self) {
        self.zeroize();
    }
}

impl ZeroizeOnDrop for SigningKeypair {}

impl fmt::Debug for SigningKeypair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SigningKeypair({:?})", self.public)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn primitives() -> Primitives {
        Primitives::init().expect("primitives should initialize")
    }

    #[test]
    fn test_generic_hash_known_answer() {
        let digest = primitives()
            .generic_hash(b"Glory to Ukraine", GENERIC_HASH_BYTES)
            .unwrap();
        assert_eq!(
            crate::codec::encode(&digest),
            "UjuhVEXQembMCmLfemONVeBKhDCEeXbTtgiht472zGA="
        );
    }

    #[test]
    fn test_generic_hash_length_bounds() {
        let p = primitives();
        assert_eq!(p.generic_hash(b"x", 16).unwrap().len(), 16);
        assert_eq!(p.generic_hash(b"x", 64).unwrap().len(), 64);
        assert!(p.generic_hash(b"x", 15).is_err());
        assert!(p.generic_hash(b"x", 65).is_err());
    }

    #[test]
    fn test_keypair_sign_verify() {
        let p = primitives();
        let keypair = p.seed_keypair(&[7u8; 32]);
        let message = b"hello world";
        let signature = p.sign_detached(message, &keypair).unwrap();
        let public = keypair.public_bytes().unwrap();

        assert!(p.verify_detached(message, &signature, &public));
        // Tampered message should fail
        assert!(!p.verify_detached(b"hello worlD", &signature, &public));
        // Truncated signature should fail
        assert!(!p.verify_detached(message, &signature[..63], &public));
    }

    #[test]
    fn test_keypair_deterministic_from_seed() {
        let p = primitives();
        let kp1 = p.seed_keypair(&[0x42; 32]);
        let kp2 = p.seed_keypair(&[0x42; 32]);
        assert_eq!(kp1, kp2);
        assert_eq!(kp1.secret.raw().unwrap().len(), SECRET_KEY_BYTES);
    }

    #[test]
    fn test_mismatched_keypair_rejected() {
        let p = primitives();
        let a = p.seed_keypair(&[1u8; 32]);
        let b = p.seed_keypair(&[2u8; 32]);
        let mixed = SigningKeypair {
            public: a.public.clone(),
            secret: b.secret.clone(),
        };
        assert!(p.sign_detached(b"m", &mixed).is_err());
    }

    #[test]
    fn test_zeroized_keypair_cannot_sign() {
        let p = primitives();
        let mut kp = p.seed_keypair(&[3u8; 32]);
        let public = kp.public.clone();
        kp.zeroize();
        assert_eq!(kp.secret.raw().unwrap(), Vec::<u8>::new());
        assert_eq!(kp.public, public);
        assert!(matches!(
            p.sign_detached(b"m", &kp),
            Err(CoreError::InvalidSecretKey)
        ));
    }

    #[test]
    fn test_seed_secret_accepted() {
        let p = primitives();
        let full = p.seed_keypair(&[9u8; 32]);
        let seed_only = SigningKeypair {
            public: full.public.clone(),
            secret: ByteLike::Raw(vec![9u8; 32]),
        };
        assert_eq!(
            p.sign_detached(b"m", &full).unwrap(),
            p.sign_detached(b"m", &seed_only).unwrap()
        );
    }

    #[test]
    fn test_kdf_deterministic_and_separated() {
        let p = primitives();
        let key = [0x11u8; 32];
        let a = p.kdf_derive(&key, 1, b"doauthkp").unwrap();
        let b = p.kdf_derive(&key, 1, b"doauthkp").unwrap();
        let c = p.kdf_derive(&key, 2, b"doauthkp").unwrap();
        let d = p.kdf_derive(&key, 1, b"otherctx").unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_ne!(a, d);
    }

    #[test]
    fn test_pwhash_deterministic() {
        let p = primitives();
        let salt = [3u8; 16];
        let a = p.pwhash(32, b"password", &salt, 1, 64 * 1024).unwrap();
        let b = p.pwhash(32, b"password", &salt, 1, 64 * 1024).unwrap();
        let c = p.pwhash(32, b"password", &[4u8; 16], 1, 64 * 1024).unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_pwhash_rejects_tiny_salt() {
        let p = primitives();
        assert!(p.pwhash(32, b"password", &[0u8; 4], 1, 64 * 1024).is_err());
    }
}
