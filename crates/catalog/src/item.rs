use serde::{Deserialize, Serialize};

use larder_core::{ItemId, StoreError};

/// A trackable good in the catalog.
///
/// `stock_current` is the aggregate on-hand quantity and must equal the sum
/// of `remaining` over the item's non-exhausted lots. The catalog does not
/// enforce that itself; the allocator keeps both sides of one operation in a
/// single atomic commit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub id: ItemId,
    pub name: String,
    pub sku: String,
    /// Unit of measure, e.g. "kg" or "piece".
    pub unit: String,
    /// Aggregate on-hand quantity, never negative.
    pub stock_current: i64,
    /// Reorder threshold, never negative.
    pub min_stock: i64,
    /// Optimistic concurrency token; bumped by every committed allocation
    /// against this item.
    pub version: u64,
}

impl Item {
    /// A freshly registered item carries no stock and version zero.
    pub fn register(
        id: ItemId,
        name: impl Into<String>,
        sku: impl Into<String>,
        unit: impl Into<String>,
        min_stock: i64,
    ) -> Result<Self, StoreError> {
        let item = Self {
            id,
            name: name.into(),
            sku: sku.into(),
            unit: unit.into(),
            stock_current: 0,
            min_stock,
            version: 0,
        };
        item.validate()?;
        Ok(item)
    }

    /// Validate the record against the catalog invariants.
    ///
    /// Run at the store boundary: a document that fails here is corrupt and
    /// must be rejected, not defaulted.
    pub fn validate(&self) -> Result<(), StoreError> {
        if self.name.trim().is_empty() {
            return Err(StoreError::corrupt(format!(
                "item {}: name cannot be empty",
                self.id
            )));
        }
        if self.stock_current < 0 {
            return Err(StoreError::corrupt(format!(
                "item {}: negative stock_current ({})",
                self.id, self.stock_current
            )));
        }
        if self.min_stock < 0 {
            return Err(StoreError::corrupt(format!(
                "item {}: negative min_stock ({})",
                self.id, self.min_stock
            )));
        }
        Ok(())
    }

    /// True when the item has reached its reorder threshold.
    pub fn is_below_min(&self) -> bool {
        self.stock_current <= self.min_stock
    }
}
