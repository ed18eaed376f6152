use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use larder_core::{DonorId, ItemId, LotId, StoreError};

/// A dated batch of one item's inventory.
///
/// `quantity` is fixed at intake; `remaining` only ever decreases. A lot
/// whose `remaining` reached zero stays in the store as history and is
/// simply excluded from active listings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockLot {
    pub id: LotId,
    pub item_id: ItemId,
    pub label: String,
    /// Original amount received, fixed at creation.
    pub quantity: i64,
    /// Amount still on hand, `0 ..= quantity`.
    pub remaining: i64,
    /// Calendar expiry date. `None` means "no expiry" and sorts after every
    /// dated lot during consumption.
    pub expiry: Option<NaiveDate>,
    pub donor: Option<DonorId>,
    pub received_at: DateTime<Utc>,
}

impl StockLot {
    /// Build the lot produced by one intake line: full quantity remaining.
    pub fn received(
        id: LotId,
        item_id: ItemId,
        label: impl Into<String>,
        quantity: i64,
        expiry: Option<NaiveDate>,
        donor: Option<DonorId>,
        received_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            item_id,
            label: label.into(),
            quantity,
            remaining: quantity,
            expiry,
            donor,
            received_at,
        }
    }

    /// Validate the record against the lot invariants.
    ///
    /// Run at the store boundary: a document that fails here is corrupt and
    /// must be rejected, not defaulted.
    pub fn validate(&self) -> Result<(), StoreError> {
        if self.quantity <= 0 {
            return Err(StoreError::corrupt(format!(
                "lot {}: non-positive quantity ({})",
                self.id, self.quantity
            )));
        }
        if self.remaining < 0 || self.remaining > self.quantity {
            return Err(StoreError::corrupt(format!(
                "lot {}: remaining {} outside 0..={}",
                self.id, self.remaining, self.quantity
            )));
        }
        Ok(())
    }

    pub fn is_exhausted(&self) -> bool {
        self.remaining == 0
    }

    /// Sort key for FIFO-by-expiry consumption: dated lots ascending, lots
    /// without an expiry after all dated ones. Ties are left to the caller's
    /// stable sort, which preserves creation order.
    pub fn consumption_key(&self) -> (u8, NaiveDate) {
        match self.expiry {
            Some(date) => (0, date),
            None => (1, NaiveDate::MAX),
        }
    }

    /// Decrement `remaining` by `amount`.
    ///
    /// The amount must be positive and must not exceed what is left; a
    /// violation means the caller's plan was computed against stale state.
    pub fn consume(&mut self, amount: i64) -> Result<(), StoreError> {
        if amount <= 0 {
            return Err(StoreError::corrupt(format!(
                "lot {}: non-positive draw ({amount})",
                self.id
            )));
        }
        if amount > self.remaining {
            return Err(StoreError::corrupt(format!(
                "lot {}: draw {amount} exceeds remaining {}",
                self.id, self.remaining
            )));
        }
        self.remaining -= amount;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lot_with_expiry(expiry: Option<NaiveDate>) -> StockLot {
        StockLot::received(
            LotId::new(),
            ItemId::new(),
            "L-1",
            10,
            expiry,
            None,
            Utc::now(),
        )
    }

    #[test]
    fn received_lot_is_fully_remaining() {
        let lot = lot_with_expiry(None);
        assert_eq!(lot.quantity, 10);
        assert_eq!(lot.remaining, 10);
        assert!(!lot.is_exhausted());
    }

    #[test]
    fn undated_lots_sort_after_dated_ones() {
        let dated = lot_with_expiry(NaiveDate::from_ymd_opt(2025, 6, 1));
        let undated = lot_with_expiry(None);
        assert!(dated.consumption_key() < undated.consumption_key());
    }

    #[test]
    fn earlier_expiry_sorts_first() {
        let march = lot_with_expiry(NaiveDate::from_ymd_opt(2025, 3, 1));
        let june = lot_with_expiry(NaiveDate::from_ymd_opt(2025, 6, 1));
        assert!(march.consumption_key() < june.consumption_key());
    }

    #[test]
    fn consume_decrements_and_guards_bounds() {
        let mut lot = lot_with_expiry(None);
        lot.consume(4).unwrap();
        assert_eq!(lot.remaining, 6);

        assert!(lot.consume(7).is_err());
        assert!(lot.consume(0).is_err());
        assert_eq!(lot.remaining, 6);

        lot.consume(6).unwrap();
        assert!(lot.is_exhausted());
    }

    #[test]
    fn overdrawn_document_fails_validation() {
        let mut lot = lot_with_expiry(None);
        lot.remaining = 11;
        assert!(lot.validate().is_err());
        lot.remaining = -1;
        assert!(lot.validate().is_err());
    }
}
