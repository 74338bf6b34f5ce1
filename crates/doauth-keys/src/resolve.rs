//! Resolving a master secret against the persisted slip.
//!
//! Two policies:
//!
//! - [`StoragePolicy::PreferRewrite`] derives from the salt override when one
//!   is given (reproducible on any device) and overwrites whatever slip was
//!   stored. Without an override there is nothing to recompute from, so it
//!   behaves like [`StoragePolicy::PreferPrevious`].
//! - [`StoragePolicy::PreferPrevious`] reuses the stored slip when there is
//!   one and only creates (and stores) a new slip when there is not.
//!
//! Password hashing runs on the blocking pool.

use std::fmt;

use doauth_core::crypto::Primitives;
use doauth_store::KvStore;
use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

use crate::error::{KeyError, Result};
use crate::master::{derive_master_secret, init_slip, MasterSecret};
use crate::slip::{Slip, SlipConfig, DEFAULT_SLIP_KEY};

/// How a stored slip is treated during resolution.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StoragePolicy {
    /// Recompute from the override and overwrite the stored slip.
    PreferRewrite,
    /// Reuse the stored slip if there is one.
    #[default]
    PreferPrevious,
}

impl fmt::Display for StoragePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PreferRewrite => f.write_str("prefer rewrite"),
            Self::PreferPrevious => f.write_str("prefer previous"),
        }
    }
}

/// Per-call inputs beyond the password.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolveMeta {
    /// Deterministic salt source, typically a normalized email address.
    pub salt_override: Option<String>,
}

impl ResolveMeta {
    pub fn with_salt_override(source: impl Into<String>) -> Self {
        Self {
            salt_override: Some(source.into()),
        }
    }
}

/// Resolves master secrets against one slip record in a store.
pub struct SlipResolver<'a, S: KvStore + ?Sized> {
    primitives: Primitives,
    store: &'a S,
    slip_key: String,
    config: SlipConfig,
}

impl<'a, S: KvStore + ?Sized> SlipResolver<'a, S> {
    pub fn new(primitives: Primitives, store: &'a S, config: SlipConfig) -> Self {
        Self {
            primitives,
            store,
            slip_key: DEFAULT_SLIP_KEY.to_string(),
            config,
        }
    }

    pub fn with_slip_key(mut self, key: impl Into<String>) -> Self {
        self.slip_key = key.into();
        self
    }

    /// Read the stored slip, if any.
    pub async fn load_slip(&self) -> Result<Option<Slip>> {
        match self.store.get(&self.slip_key).await? {
            Some(json) => Slip::from_json(&json).map(Some),
            None => Ok(None),
        }
    }

    /// Persist `slip`, replacing any previous record.
    pub async fn store_slip(&self, slip: &Slip) -> Result<()> {
        self.store.put(&self.slip_key, &slip.to_json()?).await?;
        Ok(())
    }

    /// Produce the master secret for `password` under `policy`.
    pub async fn resolve(
        &self,
        password: &str,
        meta: &ResolveMeta,
        policy: StoragePolicy,
    ) -> Result<MasterSecret> {
        self.config.validate()?;
        match (policy, meta.salt_override.as_deref()) {
            (StoragePolicy::PreferRewrite, Some(source)) => {
                let (secret, slip) = self.init(password, Some(source)).await?;
                self.store_slip(&slip).await?;
                tracing::info!(key = %self.slip_key, "slip rewritten from salt override");
                Ok(secret)
            }
            (StoragePolicy::PreferRewrite, None) => {
                tracing::debug!(key = %self.slip_key, "no salt override, keeping stored slip");
                self.resolve_previous(password, None).await
            }
            (StoragePolicy::PreferPrevious, source) => {
                self.resolve_previous(password, source).await
            }
        }
    }

    async fn resolve_previous(
        &self,
        password: &str,
        salt_source: Option<&str>,
    ) -> Result<MasterSecret> {
        if let Some(slip) = self.load_slip().await? {
            tracing::debug!(key = %self.slip_key, "reusing stored slip");
            return self.derive(password, slip).await;
        }

        let (secret, slip) = self.init(password, salt_source).await?;
        if self.store.put_if_absent(&self.slip_key, &slip.to_json()?).await? {
            tracing::info!(key = %self.slip_key, "new slip stored");
            return Ok(secret);
        }

        // Another writer stored a slip first; theirs wins.
        tracing::warn!(key = %self.slip_key, "slip written concurrently, adopting it");
        let stored = self.load_slip().await?.ok_or_else(|| {
            KeyError::CorruptSlip("slip vanished after a conflicting write".into())
        })?;
        self.derive(password, stored).await
    }

    async fn derive(&self, password: &str, slip: Slip) -> Result<MasterSecret> {
        let p = self.primitives;
        let password = Zeroizing::new(password.to_string());
        tokio::task::spawn_blocking(move || derive_master_secret(&p, &password, &slip))
            .await
            .map_err(|e| KeyError::Task(e.to_string()))?
    }

    async fn init(&self, password: &str, salt_source: Option<&str>) -> Result<(MasterSecret, Slip)> {
        let p = self.primitives;
        let config = self.config;
        let password = Zeroizing::new(password.to_string());
        let salt_source = salt_source.map(str::to_string);
        tokio::task::spawn_blocking(move || {
            init_slip(&p, &password, &config, salt_source.as_deref())
        })
        .await
        .map_err(|e| KeyError::Task(e.to_string()))?
    }
}

/// Resolve with the default slip key.
pub async fn resolve_master_secret<S: KvStore + ?Sized>(
    p: &Primitives,
    store: &S,
    config: &SlipConfig,
    password: &str,
    meta: &ResolveMeta,
    policy: StoragePolicy,
) -> Result<MasterSecret> {
    SlipResolver::new(*p, store, *config)
        .resolve(password, meta, policy)
        .await
}
