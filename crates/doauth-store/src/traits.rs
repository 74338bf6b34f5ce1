//! KvStore trait: the persistence port for key-derivation parameters.
//!
//! The key material manager never touches storage directly; it is handed a
//! `KvStore` and reads or writes whole string records under fixed keys.

use async_trait::async_trait;

use crate::error::Result;

/// Async string key-value store.
///
/// # Design Notes
///
/// - **Whole-record values**: values are opaque text (JSON in practice).
/// - **Serialized writes**: implementations serialize writes to a key, so
///   `put_if_absent` is atomic with respect to other writers.
#[async_trait]
pub trait KvStore: Send + Sync {
    /// Read the value stored under `key`.
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Store `value` under `key`, replacing any previous value.
    async fn put(&self, key: &str, value: &str) -> Result<()>;

    /// Store `value` only if `key` is vacant.
    ///
    /// Returns `true` if the value was written.
    async fn put_if_absent(&self, key: &str, value: &str) -> Result<bool>;

    /// Delete `key`. Returns `true` if something was removed.
    async fn remove(&self, key: &str) -> Result<bool>;

    /// Check whether `key` holds a value.
    async fn contains(&self, key: &str) -> Result<bool> {
        Ok(self.get(key).await?.is_some())
    }
}
