//! Required-field policy

use crate::domain::fields::{
    CustomerType, CODICE_FISCALE, PARTITA_IVA, RAGIONE_SOCIALE, SEDE_LEGALE_CAP,
    SEDE_LEGALE_CITTA, SEDE_LEGALE_PROVINCIA, SEDE_LEGALE_VIA,
};

/// Persona fisica: the fiscal code alone identifies the recipient.
pub const INDIVIDUAL_REQUIRED: [&str; 1] = [CODICE_FISCALE];

/// Società: company identity plus the full registered office. The order is
/// the one surfaced verbatim in missing-field messages.
pub const COMPANY_REQUIRED: [&str; 7] = [
    RAGIONE_SOCIALE,
    PARTITA_IVA,
    CODICE_FISCALE,
    SEDE_LEGALE_VIA,
    SEDE_LEGALE_CAP,
    SEDE_LEGALE_CITTA,
    SEDE_LEGALE_PROVINCIA,
];

/// Mandatory field keys for a customer type, in declared order.
pub fn required_fields(customer_type: CustomerType) -> &'static [&'static str] {
    match customer_type {
        CustomerType::Individual => &INDIVIDUAL_REQUIRED,
        CustomerType::Company => &COMPANY_REQUIRED,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required_fields_stable_order() {
        assert_eq!(required_fields(CustomerType::Individual), &[CODICE_FISCALE]);
        let first = required_fields(CustomerType::Company);
        let second = required_fields(CustomerType::Company);
        assert_eq!(first, second);
        assert_eq!(first.len(), 7);
        assert_eq!(first[0], RAGIONE_SOCIALE);
        assert_eq!(first[6], SEDE_LEGALE_PROVINCIA);
    }
}
