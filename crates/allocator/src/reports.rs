//! Read-only audit and replenishment queries.
//!
//! Everything here is derived from the store contracts; no mutation paths.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use larder_catalog::{Item, ItemCatalog};
use larder_core::{AllocationError, AllocationResult, ItemId, StoreError};
use larder_ledger::{MovementLedger, replay_balance};
use larder_lots::{LotStore, StockLot};

/// Three independent views of one item's stock, for audit.
///
/// The conservation invariant makes all three equal; a divergence points at
/// a backend defect and is the hook for manual reconciliation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reconciliation {
    pub item_id: ItemId,
    /// Aggregate counter held on the catalog record.
    pub stock_current: i64,
    /// Sum of `remaining` over the item's active lots.
    pub lot_remaining: i64,
    /// Net balance from replaying the item's ledger entries.
    pub ledger_balance: i64,
}

impl Reconciliation {
    pub fn is_consistent(&self) -> bool {
        self.stock_current == self.lot_remaining && self.stock_current == self.ledger_balance
    }
}

/// Reporting facade over the same store contracts the allocator uses.
#[derive(Debug)]
pub struct StockReports<S> {
    store: S,
}

impl<S> StockReports<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }
}

impl<S> StockReports<S>
where
    S: ItemCatalog + LotStore + MovementLedger,
{
    /// Cross-check the catalog counter against lot remainders and the
    /// ledger replay for one item.
    pub fn reconcile(&self, item_id: ItemId) -> AllocationResult<Reconciliation> {
        let item = self
            .store
            .get(item_id)?
            .ok_or(AllocationError::ItemNotFound)?;

        let lot_remaining: i64 = self
            .store
            .list_active_lots(item_id)?
            .iter()
            .map(|l| l.remaining)
            .sum();

        let entries = self.store.entries_for_item(item_id)?;
        let ledger_balance = replay_balance(&entries);

        Ok(Reconciliation {
            item_id,
            stock_current: item.stock_current,
            lot_remaining,
            ledger_balance,
        })
    }

    /// Items at or below their reorder threshold.
    pub fn low_stock(&self) -> Result<Vec<Item>, StoreError> {
        let mut items: Vec<Item> = self
            .store
            .list_items()?
            .into_iter()
            .filter(Item::is_below_min)
            .collect();
        items.sort_by_key(|i| i.stock_current - i.min_stock);
        Ok(items)
    }

    /// Active lots of `item_id` expiring on or before `horizon`, soonest
    /// first.
    pub fn expiring_lots(
        &self,
        item_id: ItemId,
        horizon: NaiveDate,
    ) -> Result<Vec<StockLot>, StoreError> {
        let mut lots: Vec<StockLot> = self
            .store
            .list_active_lots(item_id)?
            .into_iter()
            .filter(|l| l.expiry.is_some_and(|d| d <= horizon))
            .collect();
        lots.sort_by_key(StockLot::consumption_key);
        Ok(lots)
    }
}
