//! Order invoice-data snapshot
//!
//! At order creation the resolved fields are frozen into a structured
//! document attached to the order. It is the legal record of what was true
//! at purchase time: later edits to the customer profile must never show
//! through it.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::fields::{self, CustomerType, SedeLegale};
use crate::domain::provenance::{FieldSource, ResolvedInvoice};

/// Immutable invoice data frozen at order creation.
///
/// Company-only members are never emitted for individuals; optional members
/// are omitted from JSON rather than serialized as null. Unknown keys in
/// stored JSON are ignored on parse instead of being trusted.
///
/// `customer_type` is optional so that a stored blob *without* the key stays
/// distinguishable from an explicit `"company"`: readers fall through to
/// lower-precedence sources on absence instead of treating the default as
/// declared. Documents produced here always carry it.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceDataSnapshot {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer_type: Option<CustomerType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub codice_fiscale: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pec: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub codice_sdi: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ragione_sociale: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub partita_iva: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sede_legale: Option<SedeLegale>,
}

/// Stored `invoice_data` that cannot be decoded.
#[derive(Debug, Error)]
#[error("invoice_data non valido: {0}")]
pub struct SnapshotParseError(#[from] serde_json::Error);

impl InvoiceDataSnapshot {
    /// Parses a stored `invoice_data` JSON document.
    pub fn from_json(raw: &str) -> Result<Self, SnapshotParseError> {
        Ok(serde_json::from_str(raw)?)
    }

    /// Serializes for the order's `invoice_data` metafield.
    pub fn to_json(&self) -> String {
        // A struct of strings and options cannot fail to serialize.
        serde_json::to_string(self).unwrap_or_else(|_| "{}".to_string())
    }

    /// Effective type, defaulting to company when the stored document does
    /// not declare one.
    pub fn customer_type(&self) -> CustomerType {
        self.customer_type.unwrap_or_default()
    }

    /// Exposes the snapshot as an `OrderSnapshot`-priority field source,
    /// with the registered office as a structured unit.
    pub fn field_source(&self) -> FieldSource {
        let mut values = fields::InvoiceFields::new();
        let scalars = [
            (fields::CODICE_FISCALE, &self.codice_fiscale),
            (fields::PEC, &self.pec),
            (fields::CODICE_SDI, &self.codice_sdi),
            (fields::RAGIONE_SOCIALE, &self.ragione_sociale),
            (fields::PARTITA_IVA, &self.partita_iva),
        ];
        for (key, value) in scalars {
            if let Some(value) = value {
                values.set(key, value.clone());
            }
        }
        FieldSource {
            values,
            sede_legale: self.sede_legale.clone(),
            customer_type: self.customer_type,
        }
    }
}

/// Freezes a resolved invoice into its order snapshot.
///
/// The returned document owns deep copies of every value; mutating the
/// sources afterwards cannot be observed through it.
pub fn take_snapshot(resolved: &ResolvedInvoice) -> InvoiceDataSnapshot {
    snapshot_from_values(&resolved.values, resolved.customer_type)
}

/// Builds the structured document from a flat value map.
///
/// `pec` and `codice_sdi` are captured only when non-empty, and company
/// identity plus registered office only for company customers.
pub fn snapshot_from_values(
    values: &fields::InvoiceFields,
    customer_type: CustomerType,
) -> InvoiceDataSnapshot {
    let non_empty = |key: &str| values.get(key).filter(|v| !v.is_empty()).map(str::to_string);

    let mut snapshot = InvoiceDataSnapshot {
        customer_type: Some(customer_type),
        codice_fiscale: values.get(fields::CODICE_FISCALE).map(str::to_string),
        pec: non_empty(fields::PEC),
        codice_sdi: non_empty(fields::CODICE_SDI),
        ..InvoiceDataSnapshot::default()
    };

    if customer_type == CustomerType::Company {
        snapshot.ragione_sociale = values.get(fields::RAGIONE_SOCIALE).map(str::to_string);
        snapshot.partita_iva = values.get(fields::PARTITA_IVA).map(str::to_string);
        let sede = SedeLegale {
            via: values.get(fields::SEDE_LEGALE_VIA).map(str::to_string),
            cap: values.get(fields::SEDE_LEGALE_CAP).map(str::to_string),
            citta: values.get(fields::SEDE_LEGALE_CITTA).map(str::to_string),
            provincia: values.get(fields::SEDE_LEGALE_PROVINCIA).map(str::to_string),
        };
        if !sede.is_empty() {
            snapshot.sede_legale = Some(sede);
        }
    }

    snapshot
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::fields::{InvoiceFields, CODICE_FISCALE, PEC, SEDE_LEGALE_VIA};
    use crate::domain::provenance::resolve;

    #[test]
    fn test_snapshot_is_independent_of_sources() {
        let mut profile_values = InvoiceFields::new();
        profile_values.set(CODICE_FISCALE, "RSSMRA80A01H501U");
        let mut profile = FieldSource::from_values(profile_values);
        profile.customer_type = Some(CustomerType::Individual);

        let resolved = resolve(None, None, Some(&profile));
        let snapshot = take_snapshot(&resolved);

        // Mutate the source after the fact.
        profile.values.set(CODICE_FISCALE, "CHANGED");

        assert_eq!(snapshot.codice_fiscale.as_deref(), Some("RSSMRA80A01H501U"));
    }

    #[test]
    fn test_individual_omits_company_members() {
        let mut values = InvoiceFields::new();
        values.set(CODICE_FISCALE, "RSSMRA80A01H501U");
        values.set("ragione_sociale", "Leftover Srl");
        values.set(SEDE_LEGALE_VIA, "Via Vecchia 1");
        let resolved = ResolvedInvoice {
            customer_type: CustomerType::Individual,
            values,
            provenance: Default::default(),
        };
        let snapshot = take_snapshot(&resolved);
        assert!(snapshot.ragione_sociale.is_none());
        assert!(snapshot.sede_legale.is_none());
        let json = snapshot.to_json();
        assert!(!json.contains("ragione_sociale"));
        assert!(!json.contains("sede_legale"));
    }

    #[test]
    fn test_empty_optional_fields_not_captured() {
        let mut values = InvoiceFields::new();
        values.set(CODICE_FISCALE, "12345678901");
        values.set(PEC, "");
        let resolved = ResolvedInvoice {
            customer_type: CustomerType::Individual,
            values,
            provenance: Default::default(),
        };
        let snapshot = take_snapshot(&resolved);
        assert!(snapshot.pec.is_none());
    }

    #[test]
    fn test_json_round_trip_ignores_unknown_keys() {
        let raw = r#"{
            "customer_type": "company",
            "codice_fiscale": "12345678901",
            "partita_iva": "12345678901",
            "sede_legale": {"via": "Via Roma 1", "cap": "00100", "citta": "Roma", "provincia": "RM"},
            "requested": "true",
            "emitted": "false"
        }"#;
        let snapshot = InvoiceDataSnapshot::from_json(raw).unwrap();
        assert_eq!(snapshot.customer_type, Some(CustomerType::Company));
        assert_eq!(snapshot.partita_iva.as_deref(), Some("12345678901"));
        let sede = snapshot.sede_legale.as_ref().unwrap();
        assert_eq!(sede.provincia.as_deref(), Some("RM"));
        // Legacy flag keys are dropped, not echoed back out.
        assert!(!snapshot.to_json().contains("requested"));
    }

    #[test]
    fn test_malformed_json_is_an_error() {
        assert!(InvoiceDataSnapshot::from_json("not json").is_err());
    }

    #[test]
    fn test_missing_customer_type_stays_undeclared() {
        let snapshot = InvoiceDataSnapshot::from_json("{}").unwrap();
        assert_eq!(snapshot.customer_type, None);
        assert_eq!(snapshot.customer_type(), CustomerType::Company);
        // An undeclared type contributes nothing to resolution.
        assert_eq!(snapshot.field_source().customer_type, None);
        // Freshly produced documents always declare the type.
        let produced = snapshot_from_values(&InvoiceFields::new(), CustomerType::Individual);
        assert!(produced.to_json().contains("customer_type"));
    }

    #[test]
    fn test_field_source_carries_structured_sede() {
        let snapshot = InvoiceDataSnapshot {
            customer_type: Some(CustomerType::Company),
            codice_fiscale: Some("12345678901".into()),
            sede_legale: Some(SedeLegale {
                via: Some("Via Roma 1".into()),
                ..SedeLegale::default()
            }),
            ..InvoiceDataSnapshot::default()
        };
        let source = snapshot.field_source();
        assert_eq!(source.customer_type, Some(CustomerType::Company));
        assert_eq!(source.values.get(CODICE_FISCALE), Some("12345678901"));
        assert!(source.sede_legale.is_some());
    }
}
