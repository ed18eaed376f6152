//! Typed records at the document-store boundary.
//!
//! The backing store is schemaless; everything read from it is parsed into
//! the typed record model and checked against the record invariants here.
//! A document that does not parse, or parses into an invariant-violating
//! record, is rejected as [`StoreError::Corrupt`] — never defaulted.

use serde_json::Value as JsonValue;

use larder_catalog::Item;
use larder_core::{StoreError, StoreResult};
use larder_ledger::MovementEntry;
use larder_lots::StockLot;

pub fn item_from_document(doc: &JsonValue) -> StoreResult<Item> {
    let item: Item = serde_json::from_value(doc.clone())
        .map_err(|e| StoreError::corrupt(format!("item document: {e}")))?;
    item.validate()?;
    Ok(item)
}

pub fn lot_from_document(doc: &JsonValue) -> StoreResult<StockLot> {
    let lot: StockLot = serde_json::from_value(doc.clone())
        .map_err(|e| StoreError::corrupt(format!("lot document: {e}")))?;
    lot.validate()?;
    Ok(lot)
}

pub fn entry_from_document(doc: &JsonValue) -> StoreResult<MovementEntry> {
    let entry: MovementEntry = serde_json::from_value(doc.clone())
        .map_err(|e| StoreError::corrupt(format!("movement document: {e}")))?;
    entry.validate()?;
    Ok(entry)
}
