//! Cart-local invoice state
//!
//! During checkout the invoice data travels as `_invoice.*` cart attributes
//! (delivered later in the order webhook's `note_attributes`). This module
//! parses them into a `CartLocal` field source and builds the attribute
//! write set the checkout UI applies.

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::domain::fields::{self, CustomerType, InvoiceFields, SedeLegale};
use crate::domain::provenance::FieldSource;

/// Prefix of every invoice-related cart attribute.
pub const ATTR_PREFIX: &str = "_invoice.";

const ATTR_REQUESTED: &str = "_invoice.requested";
const ATTR_EMITTED: &str = "_invoice.emitted";
const ATTR_UPDATED_AT: &str = "_invoice.updated_at";
const ATTR_CUSTOMER_TYPE: &str = "_invoice.customer_type";
const SEDE_LEGALE_NESTED_PREFIX: &str = "sede_legale.";

/// Attribute names to remove when the cart is cleared or the customer is
/// detached. The request flag must die with its owning cart, whatever the
/// long-lived profile store says.
pub const CLEARED_ATTRIBUTE_NAMES: [&str; 13] = [
    ATTR_UPDATED_AT,
    ATTR_REQUESTED,
    ATTR_EMITTED,
    ATTR_CUSTOMER_TYPE,
    "_invoice.codice_fiscale",
    "_invoice.pec",
    "_invoice.codice_sdi",
    "_invoice.ragione_sociale",
    "_invoice.partita_iva",
    "_invoice.sede_legale.via",
    "_invoice.sede_legale.cap",
    "_invoice.sede_legale.citta",
    "_invoice.sede_legale.provincia",
];

/// One cart attribute, matching the webhook's `note_attributes` entries.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartAttribute {
    pub name: String,
    pub value: String,
}

impl CartAttribute {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self { name: name.into(), value: value.into() }
    }
}

/// Invoice state reconstructed from a cart's attributes.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CartInvoiceState {
    /// `None` when the `_invoice.requested` attribute is absent. Presence
    /// and value are distinct states: an absent key means a clean cart, and
    /// only then does the flag default to false instead of reading the
    /// attribute value.
    pub requested: Option<bool>,
    pub source: FieldSource,
}

impl CartInvoiceState {
    /// Collects `_invoice.*` attributes into cart-local invoice state.
    ///
    /// `updated_at` and the `requested`/`emitted` flags are bookkeeping, not
    /// field data, and stay out of the field source. Nested
    /// `sede_legale.*` entries become the structured registered-office unit.
    pub fn from_attributes<'a, I>(attributes: I) -> Self
    where
        I: IntoIterator<Item = &'a CartAttribute>,
    {
        let mut state = CartInvoiceState::default();
        let mut sede = SedeLegale::default();

        for attr in attributes {
            let Some(key) = attr.name.strip_prefix(ATTR_PREFIX) else {
                continue;
            };
            match attr.name.as_str() {
                ATTR_REQUESTED => {
                    state.requested = Some(attr.value == "true");
                    continue;
                }
                ATTR_EMITTED | ATTR_UPDATED_AT => continue,
                ATTR_CUSTOMER_TYPE => {
                    state.source.customer_type = Some(CustomerType::from_string(&attr.value));
                    continue;
                }
                _ => {}
            }
            if let Some(sub_key) = key.strip_prefix(SEDE_LEGALE_NESTED_PREFIX) {
                sede.set(sub_key, attr.value.clone());
            } else {
                state.source.values.set(key, attr.value.clone());
            }
        }

        if !sede.is_empty() {
            state.source.sede_legale = Some(sede);
        }
        state
    }

    /// True only for an explicit `_invoice.requested=true` on this cart; the
    /// customer profile's stored flag is deliberately ignored.
    pub fn invoice_requested(&self) -> bool {
        self.requested == Some(true)
    }
}

/// Builds the attribute write set for the current checkout session.
///
/// Mirrors what gets parsed back out: flags, customer type, and every
/// non-empty field, with company-only fields gated on the customer type and
/// the registered office written as nested `sede_legale.*` entries.
pub fn cart_attribute_writes(
    values: &InvoiceFields,
    customer_type: CustomerType,
    requested: bool,
) -> Vec<CartAttribute> {
    let mut attrs = vec![
        CartAttribute::new(ATTR_UPDATED_AT, Utc::now().timestamp_millis().to_string()),
        CartAttribute::new(ATTR_REQUESTED, if requested { "true" } else { "false" }),
        CartAttribute::new(ATTR_EMITTED, "false"),
        CartAttribute::new(ATTR_CUSTOMER_TYPE, customer_type.as_str()),
    ];

    let mut push_field = |key: &str, nested: Option<&str>| {
        if let Some(value) = values.get(key).filter(|v| !v.is_empty()) {
            let name = match nested {
                Some(sub_key) => format!("{ATTR_PREFIX}{SEDE_LEGALE_NESTED_PREFIX}{sub_key}"),
                None => format!("{ATTR_PREFIX}{key}"),
            };
            attrs.push(CartAttribute::new(name, value));
        }
    };

    push_field(fields::CODICE_FISCALE, None);
    push_field(fields::PEC, None);
    push_field(fields::CODICE_SDI, None);

    if customer_type == CustomerType::Company {
        push_field(fields::RAGIONE_SOCIALE, None);
        push_field(fields::PARTITA_IVA, None);
        push_field(fields::SEDE_LEGALE_VIA, Some("via"));
        push_field(fields::SEDE_LEGALE_CAP, Some("cap"));
        push_field(fields::SEDE_LEGALE_CITTA, Some("citta"));
        push_field(fields::SEDE_LEGALE_PROVINCIA, Some("provincia"));
    }

    attrs
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::fields::{CODICE_FISCALE, PARTITA_IVA, RAGIONE_SOCIALE, SEDE_LEGALE_VIA};

    fn attrs(pairs: &[(&str, &str)]) -> Vec<CartAttribute> {
        pairs.iter().map(|(n, v)| CartAttribute::new(*n, *v)).collect()
    }

    #[test]
    fn test_parse_nested_sede_legale() {
        let attrs = attrs(&[
            ("_invoice.requested", "true"),
            ("_invoice.customer_type", "company"),
            ("_invoice.ragione_sociale", "ACME Srl"),
            ("_invoice.sede_legale.via", "Via Roma 1"),
            ("_invoice.sede_legale.cap", "00100"),
            ("_invoice.updated_at", "1700000000000"),
            ("checkout_note", "leave at the door"),
        ]);
        let state = CartInvoiceState::from_attributes(&attrs);
        assert!(state.invoice_requested());
        assert_eq!(state.source.customer_type, Some(CustomerType::Company));
        assert_eq!(state.source.values.get(RAGIONE_SOCIALE), Some("ACME Srl"));
        let sede = state.source.sede_legale.as_ref().unwrap();
        assert_eq!(sede.via.as_deref(), Some("Via Roma 1"));
        assert_eq!(sede.cap.as_deref(), Some("00100"));
        // Bookkeeping attributes never land in the field map.
        assert!(!state.source.values.contains("updated_at"));
        assert!(!state.source.values.contains("requested"));
    }

    #[test]
    fn test_requested_presence_vs_value() {
        let absent = CartInvoiceState::from_attributes(&attrs(&[(
            "_invoice.codice_fiscale",
            "RSSMRA80A01H501U",
        )]));
        assert_eq!(absent.requested, None);
        assert!(!absent.invoice_requested());

        let explicit_false =
            CartInvoiceState::from_attributes(&attrs(&[("_invoice.requested", "false")]));
        assert_eq!(explicit_false.requested, Some(false));
        assert!(!explicit_false.invoice_requested());

        let explicit_true =
            CartInvoiceState::from_attributes(&attrs(&[("_invoice.requested", "true")]));
        assert!(explicit_true.invoice_requested());
    }

    #[test]
    fn test_writes_gate_company_fields() {
        let mut values = InvoiceFields::new();
        values.set(CODICE_FISCALE, "RSSMRA80A01H501U");
        values.set(RAGIONE_SOCIALE, "ACME Srl");
        values.set(PARTITA_IVA, "12345678901");
        values.set(SEDE_LEGALE_VIA, "Via Roma 1");

        let writes = cart_attribute_writes(&values, CustomerType::Individual, true);
        let names: Vec<&str> = writes.iter().map(|a| a.name.as_str()).collect();
        assert!(names.contains(&"_invoice.codice_fiscale"));
        assert!(!names.contains(&"_invoice.ragione_sociale"));
        assert!(!names.contains(&"_invoice.sede_legale.via"));

        let writes = cart_attribute_writes(&values, CustomerType::Company, true);
        let names: Vec<&str> = writes.iter().map(|a| a.name.as_str()).collect();
        assert!(names.contains(&"_invoice.ragione_sociale"));
        assert!(names.contains(&"_invoice.sede_legale.via"));
    }

    #[test]
    fn test_writes_round_trip_through_parse() {
        let mut values = InvoiceFields::new();
        values.set(CODICE_FISCALE, "12345678901");
        values.set(RAGIONE_SOCIALE, "ACME Srl");
        values.set(SEDE_LEGALE_VIA, "Via Roma 1");
        let writes = cart_attribute_writes(&values, CustomerType::Company, true);

        let state = CartInvoiceState::from_attributes(&writes);
        assert!(state.invoice_requested());
        assert_eq!(state.source.values.get(CODICE_FISCALE), Some("12345678901"));
        assert_eq!(
            state.source.sede_legale.as_ref().unwrap().via.as_deref(),
            Some("Via Roma 1")
        );
    }

    #[test]
    fn test_cleared_names_cover_every_written_attribute() {
        let mut values = InvoiceFields::new();
        for key in fields::FIELD_KEYS {
            values.set(key, "x");
        }
        // "x" is too short for via but presence is what matters here.
        let writes = cart_attribute_writes(&values, CustomerType::Company, true);
        for write in writes {
            assert!(
                CLEARED_ATTRIBUTE_NAMES.contains(&write.name.as_str()),
                "{} not covered by clear list",
                write.name
            );
        }
    }
}
