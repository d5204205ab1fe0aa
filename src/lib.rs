//! Invoice Tail
//!
//! Italian tax-invoice data core for e-commerce platforms: capture VAT
//! number, fiscal code, registered office, SDI code and PEC from checkout
//! and storefront surfaces, decide whether an invoice can be emitted, and
//! freeze the data onto orders.
//!
//! ## Features
//! - Canonical field validators (one set, shared by every tier)
//! - Required-field policy per customer type (individual vs company)
//! - Provenance resolution across cart, order snapshot and customer profile
//! - Presence-only eligibility evaluation
//! - Immutable order snapshots and metafield write planning
//!
//! Everything here is pure, synchronous computation over in-memory values.
//! Reads and writes against the external metafield store, webhook delivery
//! and document rendering belong to the embedding application.

pub mod domain;

pub use domain::{
    evaluate, plan_customer_save, plan_order_created, required_fields, resolve, take_snapshot,
    CartAttribute, CartInvoiceState, CustomerInvoiceSummary, CustomerProfile, CustomerSavePlan,
    CustomerType, EligibilityResult, FieldErrors, FieldSource, InvoiceDataSnapshot, InvoiceFields,
    MetafieldType, MetafieldWrite, OrderCreatedOutcome, OrderCreatedPlan, ProvenanceSource,
    ResolvedInvoice, SedeLegale, ValidationError,
};
