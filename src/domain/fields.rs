//! Invoice field keys and value maps

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Fiscal profile of the buyer. Drives which fields are mandatory.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CustomerType {
    Individual,
    #[default]
    Company,
}

impl CustomerType {
    pub fn as_str(&self) -> &'static str {
        match self {
            CustomerType::Individual => "individual",
            CustomerType::Company => "company",
        }
    }

    /// Unknown strings fall back to `Company`, matching the stored-data
    /// convention where an unset type means a business customer.
    pub fn from_string(s: &str) -> Self {
        match s {
            "individual" => CustomerType::Individual,
            _ => CustomerType::Company,
        }
    }
}

impl fmt::Display for CustomerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// Canonical field keys, shared by cart attributes, metafields and snapshots.
pub const CODICE_FISCALE: &str = "codice_fiscale";
pub const PEC: &str = "pec";
pub const CODICE_SDI: &str = "codice_sdi";
pub const RAGIONE_SOCIALE: &str = "ragione_sociale";
pub const PARTITA_IVA: &str = "partita_iva";
pub const SEDE_LEGALE_VIA: &str = "sede_legale_via";
pub const SEDE_LEGALE_CAP: &str = "sede_legale_cap";
pub const SEDE_LEGALE_CITTA: &str = "sede_legale_citta";
pub const SEDE_LEGALE_PROVINCIA: &str = "sede_legale_provincia";

/// Every known invoice field, in canonical order.
pub const FIELD_KEYS: [&str; 9] = [
    CODICE_FISCALE,
    PEC,
    CODICE_SDI,
    RAGIONE_SOCIALE,
    PARTITA_IVA,
    SEDE_LEGALE_VIA,
    SEDE_LEGALE_CAP,
    SEDE_LEGALE_CITTA,
    SEDE_LEGALE_PROVINCIA,
];

/// The four flat keys that make up the registered office.
pub const SEDE_LEGALE_KEYS: [&str; 4] = [
    SEDE_LEGALE_VIA,
    SEDE_LEGALE_CAP,
    SEDE_LEGALE_CITTA,
    SEDE_LEGALE_PROVINCIA,
];

/// Flat map of invoice field values keyed by canonical field key.
///
/// An entry holding an empty string is *present but blank*; a missing entry
/// is *absent*. The distinction matters to the provenance resolver, where an
/// explicit empty write from a higher-priority source shadows lower-priority
/// data.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InvoiceFields(BTreeMap<String, String>);

impl InvoiceFields {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.insert(key.into(), value.into());
    }

    /// True when the key is present, even with an empty value.
    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// True when the value is absent or an empty string.
    pub fn is_blank(&self, key: &str) -> bool {
        self.0.get(key).map_or(true, String::is_empty)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl FromIterator<(String, String)> for InvoiceFields {
    fn from_iter<T: IntoIterator<Item = (String, String)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Registered office of a company customer.
///
/// All members optional: cart attributes and metafields may carry a partial
/// address, and mandatory-ness is policy, not shape.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SedeLegale {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub via: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cap: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub citta: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provincia: Option<String>,
}

impl SedeLegale {
    pub fn is_empty(&self) -> bool {
        self.via.is_none() && self.cap.is_none() && self.citta.is_none() && self.provincia.is_none()
    }

    /// Looks up one sub-field by its flat key suffix (`via`, `cap`, ...).
    pub fn get(&self, sub_key: &str) -> Option<&str> {
        match sub_key {
            "via" => self.via.as_deref(),
            "cap" => self.cap.as_deref(),
            "citta" => self.citta.as_deref(),
            "provincia" => self.provincia.as_deref(),
            _ => None,
        }
    }

    pub fn set(&mut self, sub_key: &str, value: impl Into<String>) {
        let value = value.into();
        match sub_key {
            "via" => self.via = Some(value),
            "cap" => self.cap = Some(value),
            "citta" => self.citta = Some(value),
            "provincia" => self.provincia = Some(value),
            _ => {}
        }
    }
}
