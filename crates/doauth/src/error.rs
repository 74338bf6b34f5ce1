//! Error types for the facade.

use doauth_core::{CanonicalizationError, CodecError, CoreError};
use doauth_keys::KeyError;
use doauth_store::StoreError;
use thiserror::Error;

/// Errors that can occur during doauth operations.
///
/// A document that fails verification is not an error; see
/// [`crate::Doauth::verify`].
#[derive(Debug, Error)]
pub enum DoauthError {
    /// Malformed or unsignable input, or a primitive failure.
    #[error("core error: {0}")]
    Core(#[from] CoreError),

    /// Key derivation or slip resolution failed.
    #[error("key error: {0}")]
    Keys(#[from] KeyError),

    /// Storage error.
    #[error("storage error: {0}")]
    Store(#[from] StoreError),

    /// Invalid argument.
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

impl From<CodecError> for DoauthError {
    fn from(e: CodecError) -> Self {
        Self::Core(e.into())
    }
}

impl From<CanonicalizationError> for DoauthError {
    fn from(e: CanonicalizationError) -> Self {
        Self::Core(e.into())
    }
}

impl DoauthError {
    /// True when the input itself was bad, as opposed to storage or
    /// primitive trouble.
    pub fn is_malformed_input(&self) -> bool {
        matches!(
            self,
            Self::Core(CoreError::Codec(_))
                | Self::Core(CoreError::Canonicalization(_))
                | Self::Core(CoreError::MalformedClaim(_))
                | Self::InvalidInput(_)
        )
    }
}

/// Result type for doauth operations.
pub type Result<T> = std::result::Result<T, DoauthError>;
