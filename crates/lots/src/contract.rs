//! Narrow lot-store contract the allocator depends on.

use std::sync::Arc;

use larder_core::{ItemId, LotId, StoreError};

use crate::lot::StockLot;

/// Access to an item's stock lots.
///
/// `create` and `decrement_remaining` are the building blocks an atomic
/// commit is made of; allocator operations never call them outside a commit.
pub trait LotStore: Send + Sync {
    /// All lots for `item_id` with `remaining > 0`, in creation order.
    ///
    /// Creation order is the tie-breaker for equal expiry dates, so
    /// implementations must return a stable sequence.
    fn list_active_lots(&self, item_id: ItemId) -> Result<Vec<StockLot>, StoreError>;

    /// Persist a new lot. The lot id must be unused and the owning item must
    /// exist.
    fn create(&self, lot: StockLot) -> Result<(), StoreError>;

    /// Decrement a lot's `remaining` by `amount` (positive, at most what is
    /// left).
    fn decrement_remaining(&self, lot_id: LotId, amount: i64) -> Result<(), StoreError>;
}

impl<S> LotStore for Arc<S>
where
    S: LotStore + ?Sized,
{
    fn list_active_lots(&self, item_id: ItemId) -> Result<Vec<StockLot>, StoreError> {
        (**self).list_active_lots(item_id)
    }

    fn create(&self, lot: StockLot) -> Result<(), StoreError> {
        (**self).create(lot)
    }

    fn decrement_remaining(&self, lot_id: LotId, amount: i64) -> Result<(), StoreError> {
        (**self).decrement_remaining(lot_id, amount)
    }
}
