//! Field provenance resolution
//!
//! Invoice data can live in three places at once: the checkout session's
//! cart attributes, the frozen order snapshot, and the customer's long-lived
//! profile metafields. When they disagree, one total priority order decides:
//! `CartLocal > OrderSnapshot > CustomerProfile`. A resolved value always
//! comes from exactly one source; values are never blended sub-field by
//! sub-field behind the resolver's back.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::domain::fields::{
    CustomerType, InvoiceFields, SedeLegale, FIELD_KEYS, SEDE_LEGALE_KEYS,
};

/// Where a field value was read from, in descending priority.
///
/// The profile ranks last: it is the longest-lived store and therefore the
/// most likely to be stale relative to the current checkout.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProvenanceSource {
    CartLocal,
    OrderSnapshot,
    CustomerProfile,
}

/// One source's contribution to resolution.
///
/// `values` holds flat per-key entries; `sede_legale` carries the registered
/// office as a structured unit when the source stores it that way (cart
/// attributes, order snapshot JSON) rather than as four flat keys.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FieldSource {
    pub values: InvoiceFields,
    pub sede_legale: Option<SedeLegale>,
    pub customer_type: Option<CustomerType>,
}

impl FieldSource {
    pub fn from_values(values: InvoiceFields) -> Self {
        Self { values, ..Self::default() }
    }
}

/// Canonical merged view of all sources.
///
/// `provenance` records, per resolved key, the single source the value was
/// taken from.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedInvoice {
    pub customer_type: CustomerType,
    pub values: InvoiceFields,
    pub provenance: BTreeMap<String, ProvenanceSource>,
}

impl ResolvedInvoice {
    /// The source a resolved field value came from, if the key resolved.
    pub fn source_of(&self, key: &str) -> Option<ProvenanceSource> {
        self.provenance.get(key).copied()
    }
}

/// Merges the candidate sources into one canonical field map.
///
/// Per key, the highest-priority source that *defines* the key wins; an
/// explicit empty string counts as defined and shadows lower-priority data
/// (last explicit write wins). Keys no source defines stay absent. The
/// registered office is taken as a whole unit from the highest-priority
/// source holding a structured `sede_legale`; only when no source is
/// structured are its four flat keys resolved independently. Absent sources
/// are treated as empty. Pure and total.
pub fn resolve(
    cart_local: Option<&FieldSource>,
    order_snapshot: Option<&FieldSource>,
    customer_profile: Option<&FieldSource>,
) -> ResolvedInvoice {
    let sources: Vec<(ProvenanceSource, &FieldSource)> = [
        (ProvenanceSource::CartLocal, cart_local),
        (ProvenanceSource::OrderSnapshot, order_snapshot),
        (ProvenanceSource::CustomerProfile, customer_profile),
    ]
    .into_iter()
    .filter_map(|(origin, source)| source.map(|s| (origin, s)))
    .collect();

    let customer_type = sources
        .iter()
        .find_map(|(_, s)| s.customer_type)
        .unwrap_or_default();

    let mut values = InvoiceFields::new();
    let mut provenance = BTreeMap::new();
    for key in FIELD_KEYS {
        if SEDE_LEGALE_KEYS.contains(&key) {
            continue;
        }
        if let Some((origin, value)) = sources
            .iter()
            .find_map(|(origin, s)| s.values.get(key).map(|v| (*origin, v)))
        {
            values.set(key, value);
            provenance.insert(key.to_string(), origin);
        }
    }

    match sources
        .iter()
        .find_map(|(origin, s)| s.sede_legale.as_ref().map(|sede| (*origin, sede)))
    {
        Some((origin, sede)) => {
            // Whole-unit resolution: every present sub-field comes from this
            // one source, lower-priority flat keys are ignored entirely.
            for key in SEDE_LEGALE_KEYS {
                let sub_key = key.trim_start_matches("sede_legale_");
                if let Some(value) = sede.get(sub_key) {
                    values.set(key, value);
                    provenance.insert(key.to_string(), origin);
                }
            }
        }
        None => {
            for key in SEDE_LEGALE_KEYS {
                if let Some((origin, value)) = sources
                    .iter()
                    .find_map(|(origin, s)| s.values.get(key).map(|v| (*origin, v)))
                {
                    values.set(key, value);
                    provenance.insert(key.to_string(), origin);
                }
            }
        }
    }

    ResolvedInvoice { customer_type, values, provenance }
}
