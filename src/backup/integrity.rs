//! Referential integrity check
//!
//! Every order in a snapshot must reference a customer carried by the same
//! snapshot. The check is snapshot-local: the live store is about to be wiped,
//! so it cannot vouch for anything.

use std::collections::HashSet;
use std::fmt;

use crate::models::{CustomerId, OrderId};

use super::snapshot::Snapshot;

/// Orders whose customer reference does not resolve
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrphanList {
    orphans: Vec<Orphan>,
}

/// One order with a dangling customer reference
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Orphan {
    pub order_id: OrderId,
    pub customer_id: CustomerId,
}

impl OrphanList {
    /// Offending order ids, in document order
    pub fn order_ids(&self) -> Vec<OrderId> {
        self.orphans.iter().map(|o| o.order_id.clone()).collect()
    }

    /// Offending orders with the references they carry
    pub fn orphans(&self) -> &[Orphan] {
        &self.orphans
    }

    pub fn len(&self) -> usize {
        self.orphans.len()
    }

    pub fn is_empty(&self) -> bool {
        self.orphans.is_empty()
    }
}

impl fmt::Display for OrphanList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let ids: Vec<_> = self
            .orphans
            .iter()
            .take(10)
            .map(|o| format!("{} -> {}", o.order_id, o.customer_id))
            .collect();
        write!(
            f,
            "{} order(s) reference customers missing from the snapshot: {}",
            self.orphans.len(),
            ids.join(", ")
        )?;
        if self.orphans.len() > 10 {
            write!(f, ", ...")?;
        }
        Ok(())
    }
}

/// Check that every order's customer is present in the snapshot
///
/// Returns the snapshot unchanged on success. Orphans are reported, never
/// dropped or repaired.
pub fn check_integrity(snapshot: Snapshot) -> Result<Snapshot, OrphanList> {
    let customer_ids: HashSet<&CustomerId> = snapshot.customers.iter().map(|c| &c.id).collect();

    let orphans: Vec<Orphan> = snapshot
        .orders
        .iter()
        .filter(|order| !customer_ids.contains(&order.customer_id))
        .map(|order| Orphan {
            order_id: order.id.clone(),
            customer_id: order.customer_id.clone(),
        })
        .collect();

    if orphans.is_empty() {
        Ok(snapshot)
    } else {
        Err(OrphanList { orphans })
    }
}
