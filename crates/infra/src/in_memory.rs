//! In-memory stock store.
//!
//! Intended for tests/dev and as the reference for backend semantics. One
//! `RwLock` guards the whole state, so a commit is applied under a single
//! write guard and readers never observe a half-applied operation.

use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use serde_json::Value as JsonValue;

use larder_allocator::{StockCommit, StockStore};
use larder_catalog::{Item, ItemCatalog};
use larder_core::{ItemId, LotId, StoreError};
use larder_ledger::{MovementEntry, MovementLedger};
use larder_lots::{LotStore, StockLot};

use crate::document;

#[derive(Debug, Default)]
struct StoreState {
    items: HashMap<ItemId, Item>,
    /// Lots per item, in creation order (the FIFO tie-breaker).
    lots: HashMap<ItemId, Vec<StockLot>>,
    lot_owner: HashMap<LotId, ItemId>,
    /// Append order is the replay order.
    ledger: Vec<MovementEntry>,
}

/// In-memory implementation of every store contract.
#[derive(Debug, Default)]
pub struct InMemoryStockStore {
    state: RwLock<StoreState>,
}

impl InMemoryStockStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a document-store export. Every document is validated; the first
    /// malformed one aborts the load.
    pub fn from_documents(
        items: &[JsonValue],
        lots: &[JsonValue],
        entries: &[JsonValue],
    ) -> Result<Self, StoreError> {
        let store = Self::new();
        {
            let mut state = store.write_state()?;
            for doc in items {
                let item = document::item_from_document(doc)?;
                if state.items.insert(item.id, item.clone()).is_some() {
                    return Err(StoreError::corrupt(format!(
                        "duplicate item document: {}",
                        item.id
                    )));
                }
            }
            for doc in lots {
                let lot = document::lot_from_document(doc)?;
                if !state.items.contains_key(&lot.item_id) {
                    return Err(StoreError::corrupt(format!(
                        "lot {} references unknown item {}",
                        lot.id, lot.item_id
                    )));
                }
                if state.lot_owner.insert(lot.id, lot.item_id).is_some() {
                    return Err(StoreError::corrupt(format!("duplicate lot document: {}", lot.id)));
                }
                state.lots.entry(lot.item_id).or_default().push(lot);
            }
            for doc in entries {
                let entry = document::entry_from_document(doc)?;
                if !state.items.contains_key(&entry.item_id) {
                    return Err(StoreError::corrupt(format!(
                        "movement {} references unknown item {}",
                        entry.id, entry.item_id
                    )));
                }
                state.ledger.push(entry);
            }
        }
        Ok(store)
    }

    /// Register an item in the catalog. Item creation is a catalog-management
    /// concern; this exists for hosts and tests to seed the store.
    pub fn register_item(&self, item: Item) -> Result<(), StoreError> {
        item.validate()?;
        let mut state = self.write_state()?;
        if state.items.contains_key(&item.id) {
            return Err(StoreError::corrupt(format!("item {} already registered", item.id)));
        }
        state.items.insert(item.id, item);
        Ok(())
    }

    fn read_state(&self) -> Result<RwLockReadGuard<'_, StoreState>, StoreError> {
        self.state
            .read()
            .map_err(|_| StoreError::unavailable("lock poisoned"))
    }

    fn write_state(&self) -> Result<RwLockWriteGuard<'_, StoreState>, StoreError> {
        self.state
            .write()
            .map_err(|_| StoreError::unavailable("lock poisoned"))
    }
}

impl ItemCatalog for InMemoryStockStore {
    fn get(&self, item_id: ItemId) -> Result<Option<Item>, StoreError> {
        Ok(self.read_state()?.items.get(&item_id).cloned())
    }

    fn list_items(&self) -> Result<Vec<Item>, StoreError> {
        let state = self.read_state()?;
        let mut items: Vec<Item> = state.items.values().cloned().collect();
        items.sort_by(|a, b| a.sku.cmp(&b.sku));
        Ok(items)
    }

    fn adjust_stock(&self, item_id: ItemId, delta: i64) -> Result<(), StoreError> {
        let mut state = self.write_state()?;
        let item = state
            .items
            .get_mut(&item_id)
            .ok_or_else(|| StoreError::not_found(format!("item {item_id}")))?;

        let updated = item
            .stock_current
            .checked_add(delta)
            .ok_or_else(|| StoreError::corrupt(format!("item {item_id}: stock overflow")))?;
        if updated < 0 {
            return Err(StoreError::corrupt(format!(
                "item {item_id}: adjustment {delta} would take stock below zero"
            )));
        }

        item.stock_current = updated;
        item.version += 1;
        Ok(())
    }
}

impl LotStore for InMemoryStockStore {
    fn list_active_lots(&self, item_id: ItemId) -> Result<Vec<StockLot>, StoreError> {
        let state = self.read_state()?;
        Ok(state
            .lots
            .get(&item_id)
            .map(|lots| lots.iter().filter(|l| l.remaining > 0).cloned().collect())
            .unwrap_or_default())
    }

    fn create(&self, lot: StockLot) -> Result<(), StoreError> {
        lot.validate()?;
        let mut state = self.write_state()?;
        if !state.items.contains_key(&lot.item_id) {
            return Err(StoreError::not_found(format!("item {}", lot.item_id)));
        }
        if state.lot_owner.contains_key(&lot.id) {
            return Err(StoreError::corrupt(format!("lot {} already exists", lot.id)));
        }
        state.lot_owner.insert(lot.id, lot.item_id);
        state.lots.entry(lot.item_id).or_default().push(lot);
        Ok(())
    }

    fn decrement_remaining(&self, lot_id: LotId, amount: i64) -> Result<(), StoreError> {
        let mut state = self.write_state()?;
        let item_id = *state
            .lot_owner
            .get(&lot_id)
            .ok_or_else(|| StoreError::not_found(format!("lot {lot_id}")))?;
        let lot = state
            .lots
            .get_mut(&item_id)
            .and_then(|lots| lots.iter_mut().find(|l| l.id == lot_id))
            .ok_or_else(|| StoreError::not_found(format!("lot {lot_id}")))?;
        lot.consume(amount)
    }
}

impl MovementLedger for InMemoryStockStore {
    fn append(&self, entry: MovementEntry) -> Result<(), StoreError> {
        entry.validate()?;
        let mut state = self.write_state()?;
        if !state.items.contains_key(&entry.item_id) {
            return Err(StoreError::not_found(format!("item {}", entry.item_id)));
        }
        state.ledger.push(entry);
        Ok(())
    }

    fn entries_for_item(&self, item_id: ItemId) -> Result<Vec<MovementEntry>, StoreError> {
        let state = self.read_state()?;
        Ok(state
            .ledger
            .iter()
            .filter(|e| e.item_id == item_id)
            .cloned()
            .collect())
    }
}

impl StockStore for InMemoryStockStore {
    fn commit(&self, commit: StockCommit) -> Result<(), StoreError> {
        let mut guard = self.write_state()?;
        let state = &mut *guard;

        // Validate the whole batch against current state before touching
        // anything; the apply phase below cannot fail.
        let item = state
            .items
            .get(&commit.item_id)
            .ok_or_else(|| StoreError::not_found(format!("item {}", commit.item_id)))?;

        if item.version != commit.expected_version {
            return Err(StoreError::VersionConflict {
                expected: commit.expected_version,
                found: item.version,
            });
        }

        if let Some(lot) = &commit.new_lot {
            lot.validate()?;
            if lot.item_id != commit.item_id {
                return Err(StoreError::corrupt(format!(
                    "lot {} targets item {}, commit targets {}",
                    lot.id, lot.item_id, commit.item_id
                )));
            }
            if state.lot_owner.contains_key(&lot.id) {
                return Err(StoreError::corrupt(format!("lot {} already exists", lot.id)));
            }
        }

        let item_lots = state.lots.entry(commit.item_id).or_default();
        let mut draws: Vec<(usize, i64)> = Vec::with_capacity(commit.decrements.len());
        for dec in &commit.decrements {
            let idx = item_lots
                .iter()
                .position(|l| l.id == dec.lot_id)
                .ok_or_else(|| {
                    StoreError::not_found(format!("lot {} of item {}", dec.lot_id, commit.item_id))
                })?;
            if dec.amount <= 0 || dec.amount > item_lots[idx].remaining {
                return Err(StoreError::corrupt(format!(
                    "lot {}: draw {} outside 1..={}",
                    dec.lot_id, dec.amount, item_lots[idx].remaining
                )));
            }
            draws.push((idx, dec.amount));
        }

        for entry in &commit.entries {
            entry.validate()?;
            if entry.item_id != commit.item_id {
                return Err(StoreError::corrupt(format!(
                    "movement {} targets item {}, commit targets {}",
                    entry.id, entry.item_id, commit.item_id
                )));
            }
        }

        let updated_stock = item
            .stock_current
            .checked_add(commit.stock_delta)
            .ok_or_else(|| StoreError::corrupt(format!("item {}: stock overflow", commit.item_id)))?;
        if updated_stock < 0 {
            return Err(StoreError::corrupt(format!(
                "item {}: commit would take stock below zero",
                commit.item_id
            )));
        }

        // Apply, all under the same write guard.
        for (idx, amount) in draws {
            item_lots[idx].remaining -= amount;
        }
        if let Some(lot) = commit.new_lot {
            state.lot_owner.insert(lot.id, lot.item_id);
            item_lots.push(lot);
        }
        state.ledger.extend(commit.entries);

        let item = state
            .items
            .get_mut(&commit.item_id)
            .ok_or_else(|| StoreError::not_found(format!("item {}", commit.item_id)))?;
        item.stock_current = updated_stock;
        item.version += 1;

        Ok(())
    }
}
