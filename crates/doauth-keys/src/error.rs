//! Error types for key material handling.

use doauth_core::CoreError;
use doauth_store::StoreError;
use thiserror::Error;

/// Errors raised while deriving or resolving key material.
#[derive(Debug, Error)]
pub enum KeyError {
    #[error("core error: {0}")]
    Core(#[from] CoreError),

    #[error("store error: {0}")]
    Store(#[from] StoreError),

    #[error("invalid slip config: {0}")]
    InvalidConfig(String),

    /// A persisted slip record exists but cannot be read back.
    #[error("corrupt slip record: {0}")]
    CorruptSlip(String),

    #[error("derivation task failed: {0}")]
    Task(String),
}

/// Result type for key operations.
pub type Result<T> = std::result::Result<T, KeyError>;
