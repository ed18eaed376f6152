//! Append-only movement ledger contract.

use std::sync::Arc;

use larder_core::{ItemId, StoreError};

use crate::movement::MovementEntry;

/// Append-only record of stock movements.
///
/// Append is fire-and-forget from the allocator's perspective, but an entry
/// must be durable before the enclosing commit counts as committed —
/// which is why allocator writes route entries through the atomic commit
/// path rather than calling `append` directly. Entries are never mutated or
/// deleted.
pub trait MovementLedger: Send + Sync {
    /// Append one entry.
    fn append(&self, entry: MovementEntry) -> Result<(), StoreError>;

    /// All entries for `item_id`, in append order (the replay order).
    fn entries_for_item(&self, item_id: ItemId) -> Result<Vec<MovementEntry>, StoreError>;
}

impl<S> MovementLedger for Arc<S>
where
    S: MovementLedger + ?Sized,
{
    fn append(&self, entry: MovementEntry) -> Result<(), StoreError> {
        (**self).append(entry)
    }

    fn entries_for_item(&self, item_id: ItemId) -> Result<Vec<MovementEntry>, StoreError> {
        (**self).entries_for_item(item_id)
    }
}
