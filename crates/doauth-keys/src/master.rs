//! Master secrets: the memory-hard hash of a password under a slip.

use std::fmt;

use doauth_core::codec::ByteLike;
use doauth_core::crypto::Primitives;
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

use crate::error::{KeyError, Result};
use crate::slip::{Slip, SlipConfig};

/// Master secret size in bytes.
pub const MASTER_SECRET_BYTES: usize = 32;

/// Root of every key derived for one password and slip.
///
/// Never persisted. Wiped from memory on drop.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct MasterSecret {
    bytes: [u8; MASTER_SECRET_BYTES],
}

impl MasterSecret {
    pub fn from_bytes(bytes: [u8; MASTER_SECRET_BYTES]) -> Self {
        Self { bytes }
    }

    pub fn as_bytes(&self) -> &[u8; MASTER_SECRET_BYTES] {
        &self.bytes
    }
}

impl fmt::Debug for MasterSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("MasterSecret(<redacted>)")
    }
}

/// Hash `password` under `slip`.
///
/// Deterministic and deliberately expensive; run it off any latency-critical
/// thread.
pub fn derive_master_secret(p: &Primitives, password: &str, slip: &Slip) -> Result<MasterSecret> {
    slip.config.validate()?;
    let salt = slip.salt_bytes()?;
    let hashed = Zeroizing::new(p.pwhash(
        MASTER_SECRET_BYTES,
        password.as_bytes(),
        &salt,
        slip.config.ops,
        slip.config.mem,
    )?);
    let bytes: [u8; MASTER_SECRET_BYTES] = hashed
        .as_slice()
        .try_into()
        .map_err(|_| KeyError::Core(doauth_core::CoreError::PasswordHash("short output".into())))?;
    Ok(MasterSecret::from_bytes(bytes))
}

/// Salt for a new slip: the hash of `source` if given, random bytes otherwise.
pub fn slip_salt(p: &Primitives, config: &SlipConfig, source: Option<&str>) -> Result<Vec<u8>> {
    config.validate()?;
    match source {
        Some(source) => Ok(p.generic_hash(source.as_bytes(), config.salt_size)?),
        None => Ok(p.random_bytes(config.salt_size)),
    }
}

/// Create a slip and the master secret it yields for `password`.
pub fn init_slip(
    p: &Primitives,
    password: &str,
    config: &SlipConfig,
    salt_source: Option<&str>,
) -> Result<(MasterSecret, Slip)> {
    let salt = slip_salt(p, config, salt_source)?;
    let slip = Slip {
        config: *config,
        salt: ByteLike::from_raw(salt),
    };
    let secret = derive_master_secret(p, password, &slip)?;
    tracing::debug!(
        deterministic = salt_source.is_some(),
        ops = config.ops,
        mem = config.mem,
        "initialized slip"
    );
    Ok((secret, slip))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fast() -> SlipConfig {
        SlipConfig::new(1, 64 * 1024, 16).unwrap()
    }

    fn primitives() -> Primitives {
        Primitives::init().unwrap()
    }

    #[test]
    fn test_derivation_deterministic() {
        let p = primitives();
        let (secret, slip) = init_slip(&p, "hunter2", &fast(), None).unwrap();
        let again = derive_master_secret(&p, "hunter2", &slip).unwrap();
        assert_eq!(secret, again);
    }

    #[test]
    fn test_password_and_salt_matter() {
        let p = primitives();
        let (secret, slip) = init_slip(&p, "hunter2", &fast(), None).unwrap();
        assert_ne!(derive_master_secret(&p, "hunter3", &slip).unwrap(), secret);

        let (other, other_slip) = init_slip(&p, "hunter2", &fast(), None).unwrap();
        assert_ne!(other_slip.salt, slip.salt);
        assert_ne!(other, secret);
    }

    #[test]
    fn test_salt_source_reproducible() {
        let p = primitives();
        let (a, slip_a) = init_slip(&p, "pw", &fast(), Some("alice@example.com")).unwrap();
        let (b, slip_b) = init_slip(&p, "pw", &fast(), Some("alice@example.com")).unwrap();
        let (c, _) = init_slip(&p, "pw", &fast(), Some("bob@example.com")).unwrap();
        assert_eq!(slip_a, slip_b);
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_salt_size_respected() {
        let p = primitives();
        let config = SlipConfig::new(1, 64 * 1024, 32).unwrap();
        assert_eq!(slip_salt(&p, &config, Some("x")).unwrap().len(), 32);
        assert_eq!(slip_salt(&p, &config, None).unwrap().len(), 32);
    }

    #[test]
    fn test_debug_redacts() {
        let secret = MasterSecret::from_bytes([0xab; MASTER_SECRET_BYTES]);
        assert_eq!(format!("{secret:?}"), "MasterSecret(<redacted>)");
    }
}
