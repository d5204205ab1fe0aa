//! Domain modules
pub mod cart_attributes;
pub mod eligibility;
pub mod fields;
pub mod metafields;
pub mod orders;
pub mod policy;
pub mod provenance;
pub mod snapshot;
pub mod validators;

pub use cart_attributes::{CartAttribute, CartInvoiceState, CLEARED_ATTRIBUTE_NAMES};
pub use eligibility::{evaluate, evaluate_resolved, EligibilityResult};
pub use fields::{CustomerType, InvoiceFields, SedeLegale};
pub use metafields::{
    plan_customer_save, request_invoice_write, CustomerInvoiceSummary, CustomerProfile,
    CustomerSavePlan, MetafieldType, MetafieldWrite,
};
pub use orders::{plan_order_created, OrderCreatedOutcome, OrderCreatedPlan};
pub use policy::required_fields;
pub use provenance::{resolve, FieldSource, ProvenanceSource, ResolvedInvoice};
pub use snapshot::{snapshot_from_values, take_snapshot, InvoiceDataSnapshot, SnapshotParseError};
pub use validators::{validate_field, validate_fields, FieldErrors, ValidationError};
