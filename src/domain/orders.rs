//! Order-created planning
//!
//! The order-created webhook is the one moment invoice data gets frozen.
//! This module is the pure planner for that event: the caller feeds it the
//! order's cart attributes and the customer profile, applies the returned
//! writes against the store, and owns serialization per customer (resolve,
//! snapshot, then flag reset, in that order).

use tracing::debug;

use crate::domain::cart_attributes::{CartAttribute, CartInvoiceState};
use crate::domain::metafields::{
    order_snapshot_writes, request_invoice_write, CustomerProfile, MetafieldWrite,
};
use crate::domain::provenance::resolve;
use crate::domain::snapshot::{take_snapshot, InvoiceDataSnapshot};

/// Write plan produced for an order that requested an invoice.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OrderCreatedPlan {
    /// The frozen legal record attached to the order.
    pub snapshot: InvoiceDataSnapshot,
    /// Resets the customer's `request_invoice` flag so it cannot leak into
    /// the next, unrelated order. Must be applied before this event is
    /// considered handled.
    pub reset_request_flag: MetafieldWrite,
    /// The order's `requested`/`emitted` flags and `invoice_data` document.
    pub order_writes: Vec<MetafieldWrite>,
}

/// Outcome of planning an order-created event.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum OrderCreatedOutcome {
    /// The cart carried no explicit invoice request; nothing to write. The
    /// customer's stored flag is deliberately not consulted.
    NotRequested,
    Planned(OrderCreatedPlan),
}

/// Plans the order-created event.
///
/// Resolution runs with `CartLocal` and `CustomerProfile` only: no order
/// snapshot exists yet, the profile fills whatever the cart left out.
pub fn plan_order_created(
    customer_id: &str,
    order_id: &str,
    note_attributes: &[CartAttribute],
    profile: Option<&CustomerProfile>,
) -> OrderCreatedOutcome {
    let cart = CartInvoiceState::from_attributes(note_attributes);
    if !cart.invoice_requested() {
        debug!(order_id, "no invoice requested on cart, skipping");
        return OrderCreatedOutcome::NotRequested;
    }

    let profile_source = profile.map(CustomerProfile::field_source);
    let resolved = resolve(Some(&cart.source), None, profile_source.as_ref());
    let snapshot = take_snapshot(&resolved);
    debug!(order_id, customer_type = %resolved.customer_type, "planned invoice snapshot");

    OrderCreatedOutcome::Planned(OrderCreatedPlan {
        reset_request_flag: request_invoice_write(customer_id, false),
        order_writes: order_snapshot_writes(order_id, &snapshot),
        snapshot,
    })
}
