//! Narrow catalog contract the allocator depends on.

use std::sync::Arc;

use larder_core::{ItemId, StoreError};

use crate::item::Item;

/// Read/adjust access to per-item aggregate stock.
///
/// Deliberately store-agnostic: the production backend is a document
/// database, tests use an in-memory implementation, and the contract says
/// nothing about either. `adjust_stock` exists for host-side corrections;
/// allocator operations go through the atomic commit path instead and never
/// call it directly.
pub trait ItemCatalog: Send + Sync {
    /// Look up one item. `Ok(None)` means the identifier does not resolve.
    fn get(&self, item_id: ItemId) -> Result<Option<Item>, StoreError>;

    /// List every item in the catalog (reporting surface).
    fn list_items(&self) -> Result<Vec<Item>, StoreError>;

    /// Apply a signed delta to an item's aggregate stock.
    ///
    /// Implementations must reject a delta that would take the aggregate
    /// negative and must bump the item's version.
    fn adjust_stock(&self, item_id: ItemId, delta: i64) -> Result<(), StoreError>;
}

impl<S> ItemCatalog for Arc<S>
where
    S: ItemCatalog + ?Sized,
{
    fn get(&self, item_id: ItemId) -> Result<Option<Item>, StoreError> {
        (**self).get(item_id)
    }

    fn list_items(&self) -> Result<Vec<Item>, StoreError> {
        (**self).list_items()
    }

    fn adjust_stock(&self, item_id: ItemId, delta: i64) -> Result<(), StoreError> {
        (**self).adjust_stock(item_id, delta)
    }
}
