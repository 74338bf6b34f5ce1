//! # doauth testkit
//!
//! Testing utilities for doauth.
//!
//! ## Overview
//!
//! - **Golden vectors**: Known inputs with expected outputs for cross-implementation checks
//! - **Generators**: Proptest strategies for claims, keypairs and slip configs
//! - **Fixtures**: Seeded keypairs, pinned dates and fast slip parameters
//!
//! ## Golden Vectors
//!
//! ```rust
//! use doauth_core::Primitives;
//! use doauth_testkit::vectors::verify_all_vectors;
//!
//! let p = Primitives::init().unwrap();
//! for (name, matches, actual) in verify_all_vectors(&p) {
//!     assert!(matches, "{name}: {actual}");
//! }
//! ```
//!
//! ## Property Testing
//!
//! ```rust,ignore
//! use proptest::prelude::*;
//! use doauth_testkit::generators::claim;
//!
//! proptest! {
//!     #[test]
//!     fn canonical_text_is_deterministic(c in claim()) {
//!         let a = doauth_core::canonical_string(&c).unwrap();
//!         let b = doauth_core::canonical_string(&c.clone()).unwrap();
//!         prop_assert_eq!(a, b);
//!     }
//! }
//! ```
//!
//! ## Test Fixtures
//!
//! ```rust
//! use doauth_testkit::fixtures::{claim, TestFixture};
//! use serde_json::json;
//!
//! let fixture = TestFixture::with_seed([0x42; 32]);
//! let credential = fixture.credential(claim(json!({"hello": "world"})));
//! assert!(credential.contains_key("proof"));
//! ```

pub mod fixtures;
pub mod generators;
pub mod vectors;

pub use fixtures::{claim, fast_slip_config, multi_party_fixtures, TestFixture};
pub use vectors::{verify_all_vectors, REFERENCE_ISSUANCE_DATE, REFERENCE_PUBLIC_KEY, REFERENCE_SIGNATURE};
