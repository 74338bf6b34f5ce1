//! Canonicalization of claims into the exact text that gets signed.
//!
//! Rules:
//! - Scalars pass through unchanged
//! - Sequences keep their order, element by element
//! - Mappings become a sequence of `[key, value]` pairs sorted by key
//! - Keys compare by UTF-16 code units (locale independent)
//!
//! The canonical form is serialized as compact JSON. Numbers are written the
//! way ECMAScript's `Number.prototype.toString` writes them so that every
//! conforming implementation produces identical bytes.

use std::cmp::Ordering;
use std::collections::HashSet;
use std::fmt::Write;

use crate::error::CanonicalizationError;
use crate::value::{check_integer, classify_float, Cannable, Claim, Path};

/// The normalized, order-independent form of a [`Cannable`].
#[derive(Debug, Clone, PartialEq)]
pub enum CanonicalForm {
    Text(String),
    Integer(i64),
    Number(f64),
    Sequence(Vec<CanonicalForm>),
    /// Key/value pairs in canonical key order.
    Pairs(Vec<(String, CanonicalForm)>),
}

impl CanonicalForm {
    /// Serialize to the canonical text.
    pub fn to_canonical_string(&self) -> String {
        let mut out = String::new();
        write_form(&mut out, self);
        out
    }
}

/// Canonical key order.
pub fn key_order(a: &str, b: &str) -> Ordering {
    a.encode_utf16().cmp(b.encode_utf16())
}

/// Canonicalize a value.
///
/// Pure and deterministic: mappings that differ only in insertion order
/// produce identical output.
pub fn canonicalise(value: &Cannable) -> Result<CanonicalForm, CanonicalizationError> {
    canonicalise_at(value, &Path::root())
}

/// Canonicalize a claim and serialize it to the signing input text.
pub fn canonical_string(claim: &Claim) -> Result<String, CanonicalizationError> {
    let value = Cannable::from_claim(claim)?;
    Ok(canonicalise(&value)?.to_canonical_string())
}

fn canonicalise_at(value: &Cannable, path: &Path) -> Result<CanonicalForm, CanonicalizationError> {
    match value {
        Cannable::Text(s) => Ok(CanonicalForm::Text(s.clone())),
        Cannable::Integer(i) => check_integer(*i, path).map(CanonicalForm::Integer),
        Cannable::Number(f) => match classify_float(*f, path)? {
            Cannable::Integer(i) => Ok(CanonicalForm::Integer(i)),
            _ => Ok(CanonicalForm::Number(*f)),
        },
        Cannable::Sequence(items) => items
            .iter()
            .enumerate()
            .map(|(i, item)| canonicalise_at(item, &path.index(i)))
            .collect::<Result<Vec<_>, _>>()
            .map(CanonicalForm::Sequence),
        Cannable::Mapping(entries) => {
            let mut seen = HashSet::with_capacity(entries.len());
            let mut pairs = Vec::with_capacity(entries.len());
            for (key, item) in entries {
                if !seen.insert(key.as_str()) {
                    return Err(CanonicalizationError::DuplicateKey {
                        path: path.render(),
                        key: key.clone(),
                    });
                }
                pairs.push((key.clone(), canonicalise_at(item, &path.field(key))?));
            }
            pairs.sort_by(|a, b| key_order(&a.0, &b.0));
            Ok(CanonicalForm::Pairs(pairs))
        }
    }
}

/// Recursively write a canonical form as compact JSON.
fn write_form(out: &mut String, form: &CanonicalForm) {
    match form {
        CanonicalForm::Text(s) => write_string(out, s),
        CanonicalForm::Integer(i) => {
            let _ = write!(out, "{i}");
        }
        CanonicalForm::Number(f) => out.push_str(&format_number(*f)),
        CanonicalForm::Sequence(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_form(out, item);
            }
            out.push(']');
        }
        CanonicalForm::Pairs(pairs) => {
            out.push('[');
            for (i, (key, value)) in pairs.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                out.push('[');
                write_string(out, key);
                out.push(',');
                write_form(out, value);
                out.push(']');
            }
            out.push(']');
        }
    }
}

/// Write a JSON string literal.
///
/// Escapes `"` and `\`, the short escapes `\b \f \n \r \t`, and remaining
/// control characters as lowercase `\u00xx`. Everything else is literal.
fn write_string(out: &mut String, s: &str) {
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\u{08}' => out.push_str("\\b"),
            '\u{0c}' => out.push_str("\\f"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if (c as u32) < 0x20 => {
                let _ = write!(out, "\\u{:04x}", c as u32);
            }
            c => out.push(c),
        }
    }
    out.push('"');
}

/// Format a finite double the ECMAScript way.
///
/// Rust's `{:e}` yields the shortest round-trip digits; only the layout
/// differs between the two.
fn format_number(f: f64) -> String {
    let sci = format!("{:e}", f);
    let (mantissa, exp) = sci.split_once('e').unwrap_or((sci.as_str(), "0"));
    let exp: i32 = exp.parse().unwrap_or(0);
    let (sign, mantissa) = match mantissa.strip_prefix('-') {
        Some(m) => ("-", m),
        None => ("", mantissa),
    };
    let digits: String = mantissa.chars().filter(|c| *c != '.').collect();
    let k = digits.len() as i32;
    // Decimal point position relative to the digit string.
    let n = exp + 1;

    let body = if k <= n && n <= 21 {
        format!("{}{}", digits, "0".repeat((n - k) as usize))
    } else if 0 < n && n <= 21 {
        let (int, frac) = digits.split_at(n as usize);
        format!("{int}.{frac}")
    } else if -6 < n && n <= 0 {
        format!("0.{}{}", "0".repeat((-n) as usize), digits)
    } else {
        let e = n - 1;
        let e_sign = if e < 0 { '-' } else { '+' };
        let (first, rest) = digits.split_at(1);
        if rest.is_empty() {
            format!("{first}e{e_sign}{}", e.abs())
        } else {
            format!("{first}.{rest}e{e_sign}{}", e.abs())
        }
    };
    format!("{sign}{body}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    fn claim(value: serde_json::Value) -> Claim {
        match value {
            serde_json::Value::Object(map) => map,
            _ => panic!("expected object"),
        }
    }

    #[test]
    fn test_mapping_becomes_sorted_pairs() {
        let text = canonical_string(&claim(json!({"b": "2", "a": "1"}))).unwrap();
        assert_eq!(text, r#"[["a","1"],["b","2"]]"#);
    }

    #[test]
    fn test_nested_structure() {
        let text = canonical_string(&claim(json!({
            "type": [],
            "credentialSubject": {"hello": "world", "age": 30},
            "@context": ["x", {"z": 1, "y": [2, 3]}]
        })))
        .unwrap();
        assert_eq!(
            text,
            r#"[["@context",["x",[["y",[2,3]],["z",1]]]],["credentialSubject",[["age",30],["hello","world"]]],["type",[]]]"#
        );
    }

    #[test]
    fn test_insertion_order_irrelevant() {
        let a = Cannable::Mapping(vec![
            ("x".into(), Cannable::Integer(1)),
            ("y".into(), Cannable::Text("two".into())),
        ]);
        let b = Cannable::Mapping(vec![
            ("y".into(), Cannable::Text("two".into())),
            ("x".into(), Cannable::Integer(1)),
        ]);
        assert_eq!(canonicalise(&a).unwrap(), canonicalise(&b).unwrap());
    }

    #[test]
    fn test_sequences_keep_order() {
        let a = canonicalise(&Cannable::from_json(&json!(["b", "a"])).unwrap()).unwrap();
        assert_eq!(a.to_canonical_string(), r#"["b","a"]"#);
    }

    #[test]
    fn test_duplicate_keys_rejected() {
        let value = Cannable::Mapping(vec![
            ("k".into(), Cannable::Integer(1)),
            ("k".into(), Cannable::Integer(2)),
        ]);
        assert!(matches!(
            canonicalise(&value),
            Err(CanonicalizationError::DuplicateKey { .. })
        ));
    }

    #[test]
    fn test_non_finite_rejected() {
        assert!(matches!(
            canonicalise(&Cannable::Number(f64::NAN)),
            Err(CanonicalizationError::NonFiniteNumber { .. })
        ));
    }

    #[test]
    fn test_key_order_is_utf16() {
        // U+FF61 sorts after U+1F600 by UTF-8 bytes, before it by UTF-16 units.
        assert_eq!(key_order("\u{1F600}", "\u{FF61}"), Ordering::Less);
        assert_eq!(key_order("B", "a"), Ordering::Less);
        assert_eq!(key_order("a", "ab"), Ordering::Less);
    }

    #[test]
    fn test_string_escaping() {
        let text = canonical_string(&claim(json!({"q": "a\"b\\c\n\u{1}é/"}))).unwrap();
        assert_eq!(text, "[[\"q\",\"a\\\"b\\\\c\\n\\u0001é/\"]]");
    }

    #[test]
    fn test_number_formatting_matches_ecmascript() {
        assert_eq!(format_number(1.5), "1.5");
        assert_eq!(format_number(-0.25), "-0.25");
        assert_eq!(format_number(0.000001), "0.000001");
        assert_eq!(format_number(1.5e-7), "1.5e-7");
        assert_eq!(format_number(123456.789), "123456.789");
        assert_eq!(format_number(0.1), "0.1");
        assert_eq!(format_number(1e21), "1e+21");
        assert_eq!(format_number(1.5e20), "150000000000000000000");
        assert_eq!(format_number(-2.5e25), "-2.5e+25");
    }

    #[test]
    fn test_large_integral_doubles_canonicalize() {
        let c: Claim = serde_json::from_str(r#"{"n":1e21,"m":1.5e20}"#).unwrap();
        assert_eq!(
            canonical_string(&c).unwrap(),
            r#"[["m",150000000000000000000],["n",1e+21]]"#
        );
    }

    proptest! {
        #[test]
        fn prop_canonical_string_deterministic(
            entries in prop::collection::btree_map("[a-zA-Z@]{1,8}", -1000i64..1000, 0..8)
        ) {
            let forward: Vec<_> = entries.iter().map(|(k, v)| (k.clone(), Cannable::Integer(*v))).collect();
            let mut backward = forward.clone();
            backward.reverse();

            let a = canonicalise(&Cannable::Mapping(forward)).unwrap().to_canonical_string();
            let b = canonicalise(&Cannable::Mapping(backward)).unwrap().to_canonical_string();
            prop_assert_eq!(a, b);
        }
    }
}
