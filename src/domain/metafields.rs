//! Metafield store boundary
//!
//! The backing store is an external key/value metafield service addressed by
//! owner id / namespace / key, with last-write-wins semantics and no
//! cross-key transactions. This module folds reads from the `invoice`
//! namespace into a customer profile source and produces write intents; the
//! I/O layer applying them lives outside this crate.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::domain::eligibility::{evaluate, EligibilityResult};
use crate::domain::fields::{CustomerType, InvoiceFields};
use crate::domain::provenance::FieldSource;
use crate::domain::snapshot::{snapshot_from_values, InvoiceDataSnapshot};
use crate::domain::validators::{validate_fields, FieldErrors};

/// Namespace every invoice metafield lives under.
pub const INVOICE_NAMESPACE: &str = "invoice";

/// Customer metafield holding the structured snapshot of the profile.
pub const KEY_INVOICE_DATA: &str = "invoice_data";
/// Customer metafield holding the long-lived "wants an invoice" flag.
pub const KEY_REQUEST_INVOICE: &str = "request_invoice";
/// Customer metafield holding the declared customer type.
pub const KEY_CUSTOMER_TYPE: &str = "customer_type";
/// Order metafield: an invoice was requested for this order.
pub const KEY_ORDER_REQUESTED: &str = "requested";
/// Order metafield: the invoice has been emitted.
pub const KEY_ORDER_EMITTED: &str = "emitted";

/// Storage type of a metafield value, with the store's wire names.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum MetafieldType {
    #[serde(rename = "boolean")]
    Boolean,
    #[serde(rename = "json")]
    Json,
    #[serde(rename = "single_line_text_field")]
    SingleLineText,
}

/// One write intent against the metafield store.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct MetafieldWrite {
    pub owner_id: String,
    pub namespace: &'static str,
    pub key: String,
    #[serde(rename = "type")]
    pub value_type: MetafieldType,
    pub value: String,
}

impl MetafieldWrite {
    fn new(
        owner_id: &str,
        key: impl Into<String>,
        value_type: MetafieldType,
        value: impl Into<String>,
    ) -> Self {
        Self {
            owner_id: owner_id.to_string(),
            namespace: INVOICE_NAMESPACE,
            key: key.into(),
            value_type,
            value: value.into(),
        }
    }
}

/// A customer's long-lived invoice profile, folded from the `invoice`
/// namespace metafields.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CustomerProfile {
    /// Flat per-key field values (bookkeeping keys excluded).
    pub fields: InvoiceFields,
    /// The structured `invoice_data` document, when present and decodable.
    pub invoice_data: Option<InvoiceDataSnapshot>,
    /// Declared type, `None` when neither `invoice_data` nor the
    /// `customer_type` metafield define one.
    pub customer_type: Option<CustomerType>,
    /// The stored request flag, parsed from its "true"/"false" string.
    pub request_invoice: bool,
}

impl CustomerProfile {
    /// Folds `(key, value)` metafield entries into a profile.
    ///
    /// A malformed `invoice_data` blob is logged and ignored rather than
    /// failing the whole read; the flat fields still resolve.
    pub fn from_entries<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut profile = CustomerProfile::default();
        let mut raw_customer_type: Option<String> = None;

        for (key, value) in entries {
            match key.as_str() {
                KEY_INVOICE_DATA => match InvoiceDataSnapshot::from_json(&value) {
                    Ok(snapshot) => profile.invoice_data = Some(snapshot),
                    Err(err) => {
                        warn!(%err, "ignoring malformed invoice_data metafield");
                    }
                },
                KEY_REQUEST_INVOICE => profile.request_invoice = value == "true",
                KEY_CUSTOMER_TYPE => raw_customer_type = Some(value),
                _ => profile.fields.set(key, value),
            }
        }

        // Fallthrough chain: a blob that does not declare a type must not
        // mask the customer_type metafield.
        profile.customer_type = profile
            .invoice_data
            .as_ref()
            .and_then(|data| data.customer_type)
            .or_else(|| raw_customer_type.as_deref().map(CustomerType::from_string));
        profile
    }

    /// Effective type, defaulting to company when undeclared.
    pub fn customer_type(&self) -> CustomerType {
        self.customer_type.unwrap_or_default()
    }

    /// The profile as the lowest-priority resolution source. Flat per-key
    /// storage only: the registered office resolves sub-field by sub-field
    /// here, structured units come from carts and order snapshots.
    pub fn field_source(&self) -> FieldSource {
        FieldSource {
            values: self.fields.clone(),
            sede_legale: None,
            customer_type: self.customer_type,
        }
    }

    /// Profile-only eligibility plus the stored request flag, the document
    /// served to storefront surfaces.
    pub fn summary(&self) -> CustomerInvoiceSummary {
        let eligibility = evaluate(&self.fields, self.customer_type());
        CustomerInvoiceSummary {
            is_invoice_possible: eligibility.is_invoice_possible,
            missing_fields: eligibility.missing_fields,
            values: eligibility.values,
            emit_invoice: self.request_invoice,
        }
    }
}

/// `{isInvoicePossible, missingFields, values, emitInvoice}` response body.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerInvoiceSummary {
    pub is_invoice_possible: bool,
    pub missing_fields: Vec<String>,
    pub values: InvoiceFields,
    pub emit_invoice: bool,
}

/// Validated write plan for saving a customer's invoice profile.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CustomerSavePlan {
    pub writes: Vec<MetafieldWrite>,
    pub eligibility: EligibilityResult,
}

/// Plans the metafield writes for a profile save.
///
/// Runs the canonical validators first; on failure no writes are produced,
/// only the field -> message map. On success the plan holds one text write
/// per submitted field, the `customer_type` write, and the structured
/// `invoice_data` JSON rebuilt from the same values, plus the recomputed
/// eligibility for the caller's response.
pub fn plan_customer_save(
    owner_id: &str,
    values: &InvoiceFields,
    customer_type: CustomerType,
) -> Result<CustomerSavePlan, FieldErrors> {
    let errors = validate_fields(values, customer_type);
    if !errors.is_empty() {
        return Err(errors);
    }

    // customer_type is excluded too: the explicit typed write below is the
    // only one, so a stray entry cannot race it under last-write-wins.
    let mut writes: Vec<MetafieldWrite> = values
        .iter()
        .filter(|(key, _)| {
            *key != KEY_INVOICE_DATA && *key != KEY_REQUEST_INVOICE && *key != KEY_CUSTOMER_TYPE
        })
        .map(|(key, value)| MetafieldWrite::new(owner_id, key, MetafieldType::SingleLineText, value))
        .collect();
    writes.push(MetafieldWrite::new(
        owner_id,
        KEY_CUSTOMER_TYPE,
        MetafieldType::SingleLineText,
        customer_type.as_str(),
    ));

    let snapshot = snapshot_from_values(values, customer_type);
    writes.push(MetafieldWrite::new(
        owner_id,
        KEY_INVOICE_DATA,
        MetafieldType::Json,
        snapshot.to_json(),
    ));

    Ok(CustomerSavePlan {
        writes,
        eligibility: evaluate(values, customer_type),
    })
}

/// Write intent for toggling the customer's request flag.
pub fn request_invoice_write(owner_id: &str, value: bool) -> MetafieldWrite {
    MetafieldWrite::new(
        owner_id,
        KEY_REQUEST_INVOICE,
        MetafieldType::Boolean,
        if value { "true" } else { "false" },
    )
}

/// Write intents freezing a snapshot onto a newly created order.
pub fn order_snapshot_writes(order_id: &str, snapshot: &InvoiceDataSnapshot) -> Vec<MetafieldWrite> {
    vec![
        MetafieldWrite::new(order_id, KEY_ORDER_REQUESTED, MetafieldType::Boolean, "true"),
        MetafieldWrite::new(order_id, KEY_ORDER_EMITTED, MetafieldType::Boolean, "false"),
        MetafieldWrite::new(order_id, KEY_INVOICE_DATA, MetafieldType::Json, snapshot.to_json()),
    ]
}
