//! Slips: the persisted salt and cost parameters for password hashing.
//!
//! A slip is not secret, but it decides which master secret a password
//! produces, so a record that fails to parse is an error rather than a
//! reason to start over.

use doauth_core::codec::{ByteLike, Encoded};
use doauth_core::crypto::{GENERIC_HASH_BYTES_MAX, GENERIC_HASH_BYTES_MIN};
use doauth_core::CoreError;
use serde::{Deserialize, Serialize};

use crate::error::{KeyError, Result};

/// Default key the slip record is stored under.
pub const DEFAULT_SLIP_KEY: &str = "doauth_slip";

/// Smallest memory cost Argon2 accepts with one lane, in bytes.
pub const MIN_MEM_BYTES: u32 = 8 * 1024;

/// Password hashing cost parameters and salt size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlipConfig {
    /// Number of passes.
    pub ops: u32,
    /// Memory in bytes.
    pub mem: u32,
    /// Salt length in bytes.
    pub salt_size: usize,
}

impl Default for SlipConfig {
    /// The interactive profile: 2 passes over 64 MiB, 16-byte salt.
    fn default() -> Self {
        Self {
            ops: 2,
            mem: 64 * 1024 * 1024,
            salt_size: 16,
        }
    }
}

impl SlipConfig {
    pub fn new(ops: u32, mem: u32, salt_size: usize) -> Result<Self> {
        let config = Self {
            ops,
            mem,
            salt_size,
        };
        config.validate()?;
        Ok(config)
    }

    /// The moderate profile: 3 passes over 256 MiB.
    pub fn moderate() -> Self {
        Self {
            ops: 3,
            mem: 256 * 1024 * 1024,
            salt_size: 16,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.ops < 1 {
            return Err(KeyError::InvalidConfig("ops must be at least 1".into()));
        }
        if self.mem < MIN_MEM_BYTES {
            return Err(KeyError::InvalidConfig(format!(
                "mem must be at least {MIN_MEM_BYTES} bytes, got {}",
                self.mem
            )));
        }
        if !(GENERIC_HASH_BYTES_MIN..=GENERIC_HASH_BYTES_MAX).contains(&self.salt_size) {
            return Err(KeyError::InvalidConfig(format!(
                "salt size must be {GENERIC_HASH_BYTES_MIN}..={GENERIC_HASH_BYTES_MAX} bytes, got {}",
                self.salt_size
            )));
        }
        Ok(())
    }
}

/// Cost parameters plus the salt they were used with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Slip {
    pub config: SlipConfig,
    pub salt: ByteLike,
}

/// On-disk shape: `{ ops, mem, saltSize, salt: { encoded } }`.
#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SlipRecord {
    ops: u32,
    mem: u32,
    salt_size: usize,
    salt: Encoded,
}

impl Slip {
    /// The raw salt bytes.
    pub fn salt_bytes(&self) -> Result<Vec<u8>> {
        Ok(self.salt.raw().map_err(CoreError::from)?)
    }

    /// Serialize to the persisted JSON record.
    pub fn to_json(&self) -> Result<String> {
        let record = SlipRecord {
            ops: self.config.ops,
            mem: self.config.mem,
            salt_size: self.config.salt_size,
            salt: Encoded::try_from(&self.salt).map_err(CoreError::from)?,
        };
        serde_json::to_string(&record)
            .map_err(|e| CoreError::EncodingError(e.to_string()).into())
    }

    /// Parse a persisted JSON record.
    ///
    /// Any defect (bad JSON, undecodable salt, salt length disagreeing with
    /// `saltSize`, out-of-range parameters) is [`KeyError::CorruptSlip`].
    pub fn from_json(json: &str) -> Result<Self> {
        let record: SlipRecord =
            serde_json::from_str(json).map_err(|e| KeyError::CorruptSlip(e.to_string()))?;
        let config = SlipConfig {
            ops: record.ops,
            mem: record.mem,
            salt_size: record.salt_size,
        };
        config
            .validate()
            .map_err(|e| KeyError::CorruptSlip(e.to_string()))?;
        let salt = record
            .salt
            .to_byte_like()
            .map_err(|e| KeyError::CorruptSlip(e.to_string()))?;
        let actual = salt
            .raw()
            .map_err(|e| KeyError::CorruptSlip(e.to_string()))?
            .len();
        if actual != config.salt_size {
            return Err(KeyError::CorruptSlip(format!(
                "salt is {actual} bytes, record says {}",
                config.salt_size
            )));
        }
        Ok(Self { config, salt })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slip() -> Slip {
        Slip {
            config: SlipConfig::default(),
            salt: ByteLike::from_raw(vec![7u8; 16]),
        }
    }

    #[test]
    fn test_default_config_is_valid() {
        assert!(SlipConfig::default().validate().is_ok());
        assert!(SlipConfig::moderate().validate().is_ok());
    }

    #[test]
    fn test_config_validation() {
        assert!(matches!(
            SlipConfig::new(0, 64 * 1024, 16),
            Err(KeyError::InvalidConfig(_))
        ));
        assert!(matches!(
            SlipConfig::new(1, 1024, 16),
            Err(KeyError::InvalidConfig(_))
        ));
        assert!(matches!(
            SlipConfig::new(1, 64 * 1024, 8),
            Err(KeyError::InvalidConfig(_))
        ));
        assert!(matches!(
            SlipConfig::new(1, 64 * 1024, 65),
            Err(KeyError::InvalidConfig(_))
        ));
        assert!(SlipConfig::new(1, 64 * 1024, 32).is_ok());
    }

    #[test]
    fn test_record_shape() {
        let json: serde_json::Value = serde_json::from_str(&slip().to_json().unwrap()).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "ops": 2,
                "mem": 67108864,
                "saltSize": 16,
                "salt": {"encoded": "BwcHBwcHBwcHBwcHBwcHBw=="}
            })
        );
    }

    #[test]
    fn test_record_parses_back() {
        let original = slip();
        let parsed = Slip::from_json(&original.to_json().unwrap()).unwrap();
        assert_eq!(parsed.config, original.config);
        assert_eq!(parsed.salt_bytes().unwrap(), vec![7u8; 16]);
    }

    #[test]
    fn test_corrupt_records_rejected() {
        for bad in [
            "not json",
            r#"{"ops":2,"mem":67108864,"saltSize":16}"#,
            r#"{"ops":2,"mem":67108864,"saltSize":16,"salt":{"encoded":"%%%"}}"#,
            r#"{"ops":2,"mem":67108864,"saltSize":16,"salt":{"encoded":"BwcH"}}"#,
            r#"{"ops":0,"mem":67108864,"saltSize":16,"salt":{"encoded":"BwcHBwcHBwcHBwcHBwcHBw=="}}"#,
        ] {
            assert!(
                matches!(Slip::from_json(bad), Err(KeyError::CorruptSlip(_))),
                "accepted {bad}"
            );
        }
    }
}
