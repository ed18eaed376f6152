//! Atomic write batch for one allocator operation.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use larder_catalog::ItemCatalog;
use larder_core::{ItemId, LotId, StoreError};
use larder_ledger::{MovementEntry, MovementLedger};
use larder_lots::{LotStore, StockLot};

/// One lot draw to apply: decrement `lot_id.remaining` by `amount`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LotDecrement {
    pub lot_id: LotId,
    pub amount: i64,
}

/// Every write belonging to one `record_intake` / `record_outtake` call.
///
/// A commit targets exactly one item and carries the item version the plan
/// was computed against. Implementations apply the whole batch or nothing,
/// and fail with [`StoreError::VersionConflict`] when the item has moved on
/// since — the allocator then re-runs the full check-then-act sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StockCommit {
    pub item_id: ItemId,
    /// Item version the batch was planned against.
    pub expected_version: u64,
    /// Lot created by an intake. `None` for outtakes.
    pub new_lot: Option<StockLot>,
    /// Lot draws of an outtake, in consumption order. Empty for intakes.
    pub decrements: Vec<LotDecrement>,
    /// Ledger entries, one per lot touched.
    pub entries: Vec<MovementEntry>,
    /// Signed change to the item's aggregate stock.
    pub stock_delta: i64,
}

/// A backend able to apply a [`StockCommit`] atomically.
///
/// This is the contract the allocator is generic over: the three narrow
/// read/write interfaces plus an all-or-nothing commit. A document-database
/// backend maps `commit` onto its multi-document transaction; the in-memory
/// reference backend applies the batch under one write guard. Readers must
/// never observe a partially applied batch.
pub trait StockStore: ItemCatalog + LotStore + MovementLedger {
    fn commit(&self, commit: StockCommit) -> Result<(), StoreError>;
}

impl<S> StockStore for Arc<S>
where
    S: StockStore + ?Sized,
{
    fn commit(&self, commit: StockCommit) -> Result<(), StoreError> {
        (**self).commit(commit)
    }
}
