//! Canonical field validators
//!
//! One validator set shared by every call site (checkout form, save planner,
//! admin views), so the format rules cannot drift between tiers. Messages
//! are the user-facing Italian strings.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeMap;
use thiserror::Error;

use crate::domain::fields::{self, CustomerType, InvoiceFields};
use crate::domain::policy::required_fields;

/// Outcome of validating a single field value.
///
/// `Required` (empty input on a mandatory field) is distinct from `Format`
/// so callers can tell "missing" from "malformed".
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Campo obbligatorio")]
    Required,
    #[error("{0}")]
    Format(&'static str),
}

/// Field key to error message, empty map meaning "all valid".
pub type FieldErrors = BTreeMap<String, String>;

static PARTITA_IVA_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d{11}$").unwrap());
static CODICE_FISCALE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(?i)[A-Z0-9]{16}$").unwrap());
static PEC_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap());
static CODICE_SDI_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(?i)[A-Z0-9]{7}$").unwrap());
static CAP_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d{5}$").unwrap());
static PROVINCIA_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(?i)[A-Z]{2}$").unwrap());

/// VAT number: exactly 11 digits.
pub fn validate_partita_iva(value: &str) -> Option<ValidationError> {
    if value.is_empty() {
        return Some(ValidationError::Required);
    }
    if !PARTITA_IVA_RE.is_match(value) {
        return Some(ValidationError::Format("Deve contenere 11 cifre"));
    }
    None
}

/// Fiscal code: 16 alphanumerics (personal) or 11 digits (company VAT used
/// as fiscal code).
pub fn validate_codice_fiscale(value: &str) -> Option<ValidationError> {
    if value.is_empty() {
        return Some(ValidationError::Required);
    }
    if !CODICE_FISCALE_RE.is_match(value) && !PARTITA_IVA_RE.is_match(value) {
        return Some(ValidationError::Format(
            "Formato non valido (16 caratteri o 11 cifre)",
        ));
    }
    None
}

/// Certified email. Optional; a loose `local@domain.tld` shape, not RFC 5322.
pub fn validate_pec(value: &str) -> Option<ValidationError> {
    if value.is_empty() {
        return None;
    }
    if !PEC_RE.is_match(value) {
        return Some(ValidationError::Format("Email non valida"));
    }
    None
}

/// SDI recipient code. Optional; 7 alphanumerics when present.
pub fn validate_codice_sdi(value: &str) -> Option<ValidationError> {
    if value.is_empty() {
        return None;
    }
    if !CODICE_SDI_RE.is_match(value) {
        return Some(ValidationError::Format(
            "Deve contenere 7 caratteri alfanumerici",
        ));
    }
    None
}

pub fn validate_ragione_sociale(value: &str) -> Option<ValidationError> {
    if value.is_empty() {
        return Some(ValidationError::Required);
    }
    if value.chars().count() < 2 {
        return Some(ValidationError::Format("Minimo 2 caratteri"));
    }
    None
}

pub fn validate_sede_legale_via(value: &str) -> Option<ValidationError> {
    if value.is_empty() {
        return Some(ValidationError::Required);
    }
    if value.chars().count() < 5 {
        return Some(ValidationError::Format("Minimo 5 caratteri"));
    }
    None
}

pub fn validate_sede_legale_cap(value: &str) -> Option<ValidationError> {
    if value.is_empty() {
        return Some(ValidationError::Required);
    }
    if !CAP_RE.is_match(value) {
        return Some(ValidationError::Format("Deve contenere 5 cifre"));
    }
    None
}

pub fn validate_sede_legale_citta(value: &str) -> Option<ValidationError> {
    if value.is_empty() {
        return Some(ValidationError::Required);
    }
    if value.chars().count() < 2 {
        return Some(ValidationError::Format("Minimo 2 caratteri"));
    }
    None
}

pub fn validate_sede_legale_provincia(value: &str) -> Option<ValidationError> {
    if value.is_empty() {
        return Some(ValidationError::Required);
    }
    if !PROVINCIA_RE.is_match(value) {
        return Some(ValidationError::Format("Deve contenere 2 lettere"));
    }
    None
}

/// Dispatches to the validator for a canonical field key. Unknown keys are
/// accepted untouched; legacy metafields may carry extra entries.
pub fn validate_field(key: &str, value: &str) -> Option<ValidationError> {
    match key {
        fields::PARTITA_IVA => validate_partita_iva(value),
        fields::CODICE_FISCALE => validate_codice_fiscale(value),
        fields::PEC => validate_pec(value),
        fields::CODICE_SDI => validate_codice_sdi(value),
        fields::RAGIONE_SOCIALE => validate_ragione_sociale(value),
        fields::SEDE_LEGALE_VIA => validate_sede_legale_via(value),
        fields::SEDE_LEGALE_CAP => validate_sede_legale_cap(value),
        fields::SEDE_LEGALE_CITTA => validate_sede_legale_citta(value),
        fields::SEDE_LEGALE_PROVINCIA => validate_sede_legale_provincia(value),
        _ => None,
    }
}

/// Validates a full value map for the given customer type.
///
/// Required fields run their validator on the value (empty -> `Required`);
/// the optional `pec` and `codice_sdi` are checked only when present and
/// non-empty. Returns the field -> message error map.
pub fn validate_fields(values: &InvoiceFields, customer_type: CustomerType) -> FieldErrors {
    let mut errors = FieldErrors::new();

    for &key in required_fields(customer_type) {
        let value = values.get(key).unwrap_or("");
        if let Some(err) = validate_field(key, value) {
            errors.insert(key.to_string(), err.to_string());
        }
    }

    for key in [fields::PEC, fields::CODICE_SDI] {
        let value = values.get(key).unwrap_or("");
        if !value.is_empty() {
            if let Some(err) = validate_field(key, value) {
                errors.insert(key.to_string(), err.to_string());
            }
        }
    }

    errors
}
