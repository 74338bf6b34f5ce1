//! Credential and presentation builders.
//!
//! Both assemble a claim with conventional fields and hand it to
//! [`sign_map`]. Nothing here is enforced on verification; the proof engine
//! treats the result as any other claim.

use serde_json::{json, Value};

use crate::crypto::{Primitives, SigningKeypair};
use crate::error::Result;
use crate::proof::{iso_utc_now, sign_map, ProofOptions};
use crate::value::Claim;

/// Optional dates for a new credential.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CredentialMeta {
    /// Replaces the generated issuance date.
    pub issuance_date: Option<String>,
    pub effective_date: Option<String>,
    pub valid_from: Option<String>,
    pub valid_until: Option<String>,
}

impl CredentialMeta {
    pub fn with_issuance_date(mut self, date: impl Into<String>) -> Self {
        self.issuance_date = Some(date.into());
        self
    }

    pub fn with_effective_date(mut self, date: impl Into<String>) -> Self {
        self.effective_date = Some(date.into());
        self
    }

    pub fn with_valid_from(mut self, date: impl Into<String>) -> Self {
        self.valid_from = Some(date.into());
        self
    }

    pub fn with_valid_until(mut self, date: impl Into<String>) -> Self {
        self.valid_until = Some(date.into());
        self
    }
}

/// Optional fields for a presentation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PresentationMeta {
    pub id: Option<String>,
    pub holder: Option<String>,
    pub credential_subject: Option<String>,
    pub issuance_date: Option<String>,
}

impl PresentationMeta {
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_holder(mut self, holder: impl Into<String>) -> Self {
        self.holder = Some(holder.into());
        self
    }

    pub fn with_credential_subject(mut self, subject: impl Into<String>) -> Self {
        self.credential_subject = Some(subject.into());
        self
    }

    pub fn with_issuance_date(mut self, date: impl Into<String>) -> Self {
        self.issuance_date = Some(date.into());
        self
    }
}

/// Build and sign a credential about `subject`.
///
/// The issuer is the keypair's encoded public key and the issuance date is
/// the current time unless `meta` supplies one.
pub fn mk_credential(
    p: &Primitives,
    keypair: &SigningKeypair,
    subject: Claim,
    meta: &CredentialMeta,
    options: &ProofOptions,
) -> Result<Claim> {
    let mut claim = Claim::new();
    claim.insert("@context".into(), json!([]));
    claim.insert("type".into(), json!([]));
    claim.insert("issuer".into(), Value::String(keypair.public_encoded()?));
    claim.insert(
        "issuanceDate".into(),
        Value::String(meta.issuance_date.clone().unwrap_or_else(iso_utc_now)),
    );
    claim.insert("credentialSubject".into(), Value::Object(subject));

    insert_absent(&mut claim, "effectiveDate", &meta.effective_date);
    insert_absent(&mut claim, "validFrom", &meta.valid_from);
    insert_absent(&mut claim, "validUntil", &meta.valid_until);

    sign_map(p, keypair, &claim, options)
}

/// Wrap a credential in a signed presentation.
pub fn present_credential(
    p: &Primitives,
    keypair: &SigningKeypair,
    credential: Claim,
    meta: &PresentationMeta,
    options: &ProofOptions,
) -> Result<Claim> {
    let mut claim = Claim::new();
    claim.insert("verifiableCredential".into(), Value::Object(credential));
    claim.insert("issuer".into(), Value::String(keypair.public_encoded()?));

    insert_absent(&mut claim, "id", &meta.id);
    insert_absent(&mut claim, "holder", &meta.holder);
    insert_absent(&mut claim, "credentialSubject", &meta.credential_subject);
    if let Some(date) = &meta.issuance_date {
        claim.insert("issuanceDate".into(), Value::String(date.clone()));
    }

    sign_map(p, keypair, &claim, options)
}

fn insert_absent(claim: &mut Claim, field: &str, value: &Option<String>) {
    if let Some(value) = value {
        claim
            .entry(field)
            .or_insert_with(|| Value::String(value.clone()));
    }
}
