//! Invoice eligibility evaluation

use serde::{Deserialize, Serialize};

use crate::domain::fields::{CustomerType, InvoiceFields};
use crate::domain::policy::required_fields;
use crate::domain::provenance::ResolvedInvoice;

/// Whether an invoice can be emitted from the given field values.
///
/// Serializes to the `{isInvoicePossible, missingFields, values}` document
/// consumed by the storefront and admin surfaces.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EligibilityResult {
    pub is_invoice_possible: bool,
    pub missing_fields: Vec<String>,
    pub values: InvoiceFields,
}

/// Computes eligibility for the given values and customer type.
///
/// Presence-only: a required field counts as missing when absent or empty,
/// in the policy's declared order. Format validators are deliberately not
/// re-run here; data saved as valid in the past stays emittable even if the
/// format rules have since tightened. Recomputed on every call, never
/// cached.
pub fn evaluate(values: &InvoiceFields, customer_type: CustomerType) -> EligibilityResult {
    let missing_fields: Vec<String> = required_fields(customer_type)
        .iter()
        .filter(|key| values.is_blank(key))
        .map(|key| key.to_string())
        .collect();

    EligibilityResult {
        is_invoice_possible: missing_fields.is_empty(),
        missing_fields,
        values: values.clone(),
    }
}

/// Convenience for evaluating a freshly resolved invoice.
pub fn evaluate_resolved(resolved: &ResolvedInvoice) -> EligibilityResult {
    evaluate(&resolved.values, resolved.customer_type)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::fields::{CODICE_FISCALE, PARTITA_IVA, RAGIONE_SOCIALE};
    use crate::domain::policy::COMPANY_REQUIRED;

    #[test]
    fn test_individual_with_fiscal_code_is_possible() {
        let mut values = InvoiceFields::new();
        values.set(CODICE_FISCALE, "RSSMRA80A01H501U");
        let result = evaluate(&values, CustomerType::Individual);
        assert!(result.is_invoice_possible);
        assert!(result.missing_fields.is_empty());
    }

    #[test]
    fn test_empty_company_reports_full_list_in_order() {
        let result = evaluate(&InvoiceFields::new(), CustomerType::Company);
        assert!(!result.is_invoice_possible);
        assert_eq!(result.missing_fields, COMPANY_REQUIRED.to_vec());
    }

    #[test]
    fn test_empty_string_counts_as_missing() {
        let mut values = InvoiceFields::new();
        values.set(CODICE_FISCALE, "");
        let result = evaluate(&values, CustomerType::Individual);
        assert_eq!(result.missing_fields, vec![CODICE_FISCALE.to_string()]);
    }

    #[test]
    fn test_does_not_re_run_format_validators() {
        // "short" would fail the fiscal code validator, but eligibility is
        // presence-only by policy.
        let mut values = InvoiceFields::new();
        values.set(CODICE_FISCALE, "short");
        let result = evaluate(&values, CustomerType::Individual);
        assert!(result.is_invoice_possible);
    }

    #[test]
    fn test_serializes_to_boundary_shape() {
        let mut values = InvoiceFields::new();
        values.set(RAGIONE_SOCIALE, "ACME Srl");
        values.set(PARTITA_IVA, "12345678901");
        let result = evaluate(&values, CustomerType::Company);
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["isInvoicePossible"], false);
        assert!(json["missingFields"].is_array());
        assert_eq!(json["values"]["partita_iva"], "12345678901");
    }
}
