//! Error types for doauth core.

use thiserror::Error;

/// Errors raised while converting between raw bytes and encoded text.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CodecError {
    #[error("invalid encoded bytes: {0}")]
    Decode(String),

    #[error("expected {expected} bytes, got {actual}")]
    Length { expected: usize, actual: usize },

    #[error("inconsistent byte pair: encoded text does not decode to raw bytes")]
    Inconsistent,

    #[error("not a doauth DID: {0}")]
    InvalidDid(String),
}

/// Errors raised when a value has no canonical form.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum CanonicalizationError {
    #[error("null value at {path}")]
    Null { path: String },

    #[error("unsupported {kind} value at {path}")]
    Unsupported { path: String, kind: &'static str },

    #[error("non-finite number at {path}")]
    NonFiniteNumber { path: String },

    #[error("integer outside the interoperable range at {path}")]
    IntegerOutOfRange { path: String },

    #[error("duplicate key {key:?} at {path}")]
    DuplicateKey { path: String, key: String },

    #[error("claim must be a mapping, got {0}")]
    NotAMapping(&'static str),
}

/// Core errors that can occur during signing, hashing and derivation.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("codec error: {0}")]
    Codec(#[from] CodecError),

    #[error("canonicalization error: {0}")]
    Canonicalization(#[from] CanonicalizationError),

    #[error("crypto primitives unavailable: {0}")]
    PrimitiveUnavailable(String),

    #[error("invalid public key")]
    InvalidPublicKey,

    #[error("invalid secret key")]
    InvalidSecretKey,

    #[error("password hashing failed: {0}")]
    PasswordHash(String),

    #[error("hash error: {0}")]
    Hash(String),

    #[error("malformed claim: {0}")]
    MalformedClaim(String),

    #[error("encoding error: {0}")]
    EncodingError(String),
}

/// Result type for core operations.
pub type Result<T> = std::result::Result<T, CoreError>;
