//! Byte/text codec.
//!
//! Bytes travel through credentials as URL-safe base64 text. [`ByteLike`]
//! carries a value that is known as raw bytes, as encoded text, or as both,
//! and converts between the shapes without ever re-encoding with a different
//! alphabet.
//!
//! Encoding always emits `=` padding (the libsodium URL-safe variant used by
//! the reference fixtures). Decoding accepts padded and unpadded text.

use base64::alphabet;
use base64::engine::general_purpose::{GeneralPurpose, GeneralPurposeConfig, URL_SAFE};
use base64::engine::DecodePaddingMode;
use base64::Engine;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use zeroize::Zeroize;

use crate::error::CodecError;

/// Decoder that tolerates missing padding but rejects foreign alphabets.
const URL_SAFE_LENIENT: GeneralPurpose = GeneralPurpose::new(
    &alphabet::URL_SAFE,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Encode raw bytes as URL-safe text.
pub fn encode(raw: &[u8]) -> String {
    URL_SAFE.encode(raw)
}

/// Decode URL-safe text into raw bytes.
pub fn decode(text: &str) -> Result<Vec<u8>, CodecError> {
    URL_SAFE_LENIENT
        .decode(text)
        .map_err(|e| CodecError::Decode(e.to_string()))
}

/// Decode URL-safe text into a fixed-size array.
pub fn decode_array<const N: usize>(text: &str) -> Result<[u8; N], CodecError> {
    let bytes = decode(text)?;
    let actual = bytes.len();
    bytes
        .try_into()
        .map_err(|_| CodecError::Length { expected: N, actual })
}

/// The shape a [`ByteLike`] can be coerced into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    Raw,
    Encoded,
    Both,
}

/// A byte string known as raw bytes, as encoded text, or as both.
///
/// When both halves are present they are authoritative together:
/// `decode(encoded) == raw`.
#[derive(Clone, PartialEq, Eq)]
pub enum ByteLike {
    Raw(Vec<u8>),
    Encoded(String),
    Both { raw: Vec<u8>, encoded: String },
}

impl ByteLike {
    /// Build the paired form from raw bytes.
    pub fn from_raw(raw: impl Into<Vec<u8>>) -> Self {
        let raw = raw.into();
        let encoded = encode(&raw);
        Self::Both { raw, encoded }
    }

    /// Build the paired form from encoded text, failing on malformed input.
    pub fn from_encoded(encoded: impl Into<String>) -> Result<Self, CodecError> {
        let encoded = encoded.into();
        let raw = decode(&encoded)?;
        Ok(Self::Both { raw, encoded })
    }

    /// Build a pair from both halves, checking that they agree.
    pub fn pair(raw: impl Into<Vec<u8>>, encoded: impl Into<String>) -> Result<Self, CodecError> {
        let raw = raw.into();
        let encoded = encoded.into();
        if decode(&encoded)? != raw {
            return Err(CodecError::Inconsistent);
        }
        Ok(Self::Both { raw, encoded })
    }

    /// Fill in whichever representation is missing.
    ///
    /// Idempotent: a `Both` value is returned as is.
    pub fn normalize(&self) -> Result<ByteLike, CodecError> {
        match self {
            Self::Raw(raw) => Ok(Self::from_raw(raw.clone())),
            Self::Encoded(encoded) => Self::from_encoded(encoded.clone()),
            Self::Both { .. } => Ok(self.clone()),
        }
    }

    /// Convert into the requested shape.
    pub fn coerce_to(&self, shape: Shape) -> Result<ByteLike, CodecError> {
        match shape {
            Shape::Raw => Ok(Self::Raw(self.raw()?)),
            Shape::Encoded => Ok(Self::Encoded(self.text()?)),
            Shape::Both => self.normalize(),
        }
    }

    /// The raw bytes, decoding if only the text is known.
    pub fn raw(&self) -> Result<Vec<u8>, CodecError> {
        match self {
            Self::Raw(raw) | Self::Both { raw, .. } => Ok(raw.clone()),
            Self::Encoded(encoded) => decode(encoded),
        }
    }

    /// The encoded text, encoding if only the bytes are known.
    pub fn text(&self) -> Result<String, CodecError> {
        match self {
            // Text-only values are validated so malformed input surfaces here.
            Self::Encoded(encoded) => {
                decode(encoded)?;
                Ok(encoded.clone())
            }
            Self::Both { encoded, .. } => Ok(encoded.clone()),
            Self::Raw(raw) => Ok(encode(raw)),
        }
    }

    /// The raw bytes as a fixed-size array.
    pub fn to_array<const N: usize>(&self) -> Result<[u8; N], CodecError> {
        let bytes = self.raw()?;
        let actual = bytes.len();
        bytes
            .try_into()
            .map_err(|_| CodecError::Length { expected: N, actual })
    }

    /// Which shape this value currently holds.
    pub fn shape(&self) -> Shape {
        match self {
            Self::Raw(_) => Shape::Raw,
            Self::Encoded(_) => Shape::Encoded,
            Self::Both { .. } => Shape::Both,
        }
    }
}

impl fmt::Debug for ByteLike {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Raw(raw) => write!(f, "Raw({})", hex::encode(raw)),
            Self::Encoded(encoded) => write!(f, "Encoded({encoded})"),
            Self::Both { encoded, .. } => write!(f, "Both({encoded})"),
        }
    }
}

impl Zeroize for ByteLike {
    fn zeroize(&mut self) {
        match self {
            Self::Raw(raw) => raw.zeroize(),
            Self::Encoded(encoded) => encoded.zeroize(),
            Self::Both { raw, encoded } => {
                raw.zeroize();
                encoded.zeroize();
            }
        }
    }
}

impl From<Vec<u8>> for ByteLike {
    fn from(raw: Vec<u8>) -> Self {
        Self::Raw(raw)
    }
}

impl From<&[u8]> for ByteLike {
    fn from(raw: &[u8]) -> Self {
        Self::Raw(raw.to_vec())
    }
}

impl Serialize for ByteLike {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let text = self.text().map_err(serde::ser::Error::custom)?;
        serializer.serialize_str(&text)
    }
}

impl<'de> Deserialize<'de> for ByteLike {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        ByteLike::from_encoded(text).map_err(serde::de::Error::custom)
    }
}

/// A record carrying only the encoded half, `{ "encoded": "..." }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Encoded {
    pub encoded: String,
}

impl Encoded {
    /// Decode into a paired [`ByteLike`].
    pub fn to_byte_like(&self) -> Result<ByteLike, CodecError> {
        ByteLike::from_encoded(self.encoded.clone())
    }
}

impl TryFrom<&ByteLike> for Encoded {
    type Error = CodecError;

    fn try_from(value: &ByteLike) -> Result<Self, Self::Error> {
        Ok(Self {
            encoded: value.text()?,
        })
    }
}
