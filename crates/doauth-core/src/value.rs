//! Claim values.
//!
//! [`Cannable`] is the closed set of values a claim may carry. JSON input is
//! checked at the boundary: anything outside the set is rejected with the
//! path where it was found, so canonicalization never meets a value it has
//! no mapping for.

use serde_json::{Map, Number, Value};

use crate::error::CanonicalizationError;

/// A signed document: string keys to JSON values.
pub type Claim = Map<String, Value>;

/// Largest integer every conforming implementation represents exactly.
pub const MAX_SAFE_INTEGER: i64 = 9_007_199_254_740_991;

/// A value that has a canonical form.
#[derive(Debug, Clone, PartialEq)]
pub enum Cannable {
    Text(String),
    Integer(i64),
    Number(f64),
    Sequence(Vec<Cannable>),
    /// Entries in whatever order they were inserted.
    Mapping(Vec<(String, Cannable)>),
}

impl Cannable {
    /// Convert a JSON value, rejecting `null`, booleans and unsafe numbers.
    pub fn from_json(value: &Value) -> Result<Self, CanonicalizationError> {
        from_json_at(value, &Path::root())
    }

    /// Convert a claim map into a [`Cannable::Mapping`].
    pub fn from_claim(claim: &Claim) -> Result<Self, CanonicalizationError> {
        mapping_from_json(claim, &Path::root())
    }

    /// Convert back into a JSON value.
    ///
    /// Fails on a hand-built non-finite `Number`, which JSON cannot carry.
    pub fn to_json(&self) -> Result<Value, CanonicalizationError> {
        to_json_at(self, &Path::root())
    }
}

fn to_json_at(value: &Cannable, path: &Path) -> Result<Value, CanonicalizationError> {
    match value {
        Cannable::Text(s) => Ok(Value::String(s.clone())),
        Cannable::Integer(i) => Ok(Value::Number((*i).into())),
        Cannable::Number(f) => Number::from_f64(*f).map(Value::Number).ok_or_else(|| {
            CanonicalizationError::NonFiniteNumber {
                path: path.render(),
            }
        }),
        Cannable::Sequence(items) => items
            .iter()
            .enumerate()
            .map(|(i, item)| to_json_at(item, &path.index(i)))
            .collect::<Result<Vec<_>, _>>()
            .map(Value::Array),
        Cannable::Mapping(entries) => entries
            .iter()
            .map(|(k, v)| Ok((k.clone(), to_json_at(v, &path.field(k))?)))
            .collect::<Result<Map<_, _>, _>>()
            .map(Value::Object),
    }
}

impl TryFrom<&Value> for Cannable {
    type Error = CanonicalizationError;

    fn try_from(value: &Value) -> Result<Self, Self::Error> {
        Self::from_json(value)
    }
}

impl From<&str> for Cannable {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for Cannable {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<i64> for Cannable {
    fn from(i: i64) -> Self {
        Self::Integer(i)
    }
}

/// Location of a value inside a claim, for error reporting.
#[derive(Debug, Clone)]
pub(crate) struct Path {
    segments: Vec<String>,
}

impl Path {
    pub(crate) fn root() -> Self {
        Self {
            segments: Vec::new(),
        }
    }

    pub(crate) fn field(&self, key: &str) -> Self {
        let mut segments = self.segments.clone();
        segments.push(format!(".{key}"));
        Self { segments }
    }

    pub(crate) fn index(&self, i: usize) -> Self {
        let mut segments = self.segments.clone();
        segments.push(format!("[{i}]"));
        Self { segments }
    }

    pub(crate) fn render(&self) -> String {
        format!("root{}", self.segments.concat())
    }
}

/// Check that an integer survives a round trip through an IEEE double.
pub(crate) fn check_integer(i: i64, path: &Path) -> Result<i64, CanonicalizationError> {
    if (-MAX_SAFE_INTEGER..=MAX_SAFE_INTEGER).contains(&i) {
        Ok(i)
    } else {
        Err(CanonicalizationError::IntegerOutOfRange {
            path: path.render(),
        })
    }
}

/// Classify a float: integral values in the safe range collapse to integers.
///
/// Larger integral doubles are exact as they stand and stay numbers, written
/// out the ECMAScript way (`1e+21`).
pub(crate) fn classify_float(f: f64, path: &Path) -> Result<Cannable, CanonicalizationError> {
    if !f.is_finite() {
        return Err(CanonicalizationError::NonFiniteNumber {
            path: path.render(),
        });
    }
    if f.fract() == 0.0 && f.abs() <= MAX_SAFE_INTEGER as f64 {
        return Ok(Cannable::Integer(f as i64));
    }
    Ok(Cannable::Number(f))
}

fn from_json_at(value: &Value, path: &Path) -> Result<Cannable, CanonicalizationError> {
    match value {
        Value::Null => Err(CanonicalizationError::Null {
            path: path.render(),
        }),
        Value::Bool(_) => Err(CanonicalizationError::Unsupported {
            path: path.render(),
            kind: "boolean",
        }),
        Value::String(s) => Ok(Cannable::Text(s.clone())),
        Value::Number(n) => number_from_json(n, path),
        Value::Array(items) => items
            .iter()
            .enumerate()
            .map(|(i, item)| from_json_at(item, &path.index(i)))
            .collect::<Result<Vec<_>, _>>()
            .map(Cannable::Sequence),
        Value::Object(map) => mapping_from_json(map, path),
    }
}

fn number_from_json(n: &Number, path: &Path) -> Result<Cannable, CanonicalizationError> {
    if let Some(i) = n.as_i64() {
        return check_integer(i, path).map(Cannable::Integer);
    }
    if n.as_u64().is_some() {
        return Err(CanonicalizationError::IntegerOutOfRange {
            path: path.render(),
        });
    }
    match n.as_f64() {
        Some(f) => classify_float(f, path),
        None => Err(CanonicalizationError::NonFiniteNumber {
            path: path.render(),
        }),
    }
}

fn mapping_from_json(
    map: &Map<String, Value>,
    path: &Path,
) -> Result<Cannable, CanonicalizationError> {
    map.iter()
        .map(|(k, v)| Ok((k.clone(), from_json_at(v, &path.field(k))?)))
        .collect::<Result<Vec<_>, _>>()
        .map(Cannable::Mapping)
}
