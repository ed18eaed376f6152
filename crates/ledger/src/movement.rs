use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use larder_core::{ItemId, LotId, MovementId, StoreError};

/// Direction of a stock movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    In,
    Out,
}

/// An immutable stock-movement fact.
///
/// One entry is appended per lot touched by an intake or outtake; entries
/// are never mutated or deleted afterwards. Replaying an item's entries in
/// append order reproduces its aggregate stock.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MovementEntry {
    pub id: MovementId,
    pub item_id: ItemId,
    pub lot_id: LotId,
    pub direction: Direction,
    /// Positive amount moved.
    pub quantity: i64,
    pub recorded_at: DateTime<Utc>,
}

impl MovementEntry {
    pub fn new(
        id: MovementId,
        item_id: ItemId,
        lot_id: LotId,
        direction: Direction,
        quantity: i64,
        recorded_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            item_id,
            lot_id,
            direction,
            quantity,
            recorded_at,
        }
    }

    /// Validate the record against the ledger invariants.
    pub fn validate(&self) -> Result<(), StoreError> {
        if self.quantity <= 0 {
            return Err(StoreError::corrupt(format!(
                "movement {}: non-positive quantity ({})",
                self.id, self.quantity
            )));
        }
        Ok(())
    }

    /// The entry's contribution to aggregate stock: `+quantity` for `In`,
    /// `-quantity` for `Out`.
    pub fn signed_delta(&self) -> i64 {
        match self.direction {
            Direction::In => self.quantity,
            Direction::Out => -self.quantity,
        }
    }
}

/// Net stock implied by replaying `entries` in order.
///
/// Accumulates in i128 so a pathological history cannot overflow mid-sum;
/// the result is clamped into i64.
pub fn replay_balance<'a>(entries: impl IntoIterator<Item = &'a MovementEntry>) -> i64 {
    let total: i128 = entries
        .into_iter()
        .map(|e| i128::from(e.signed_delta()))
        .sum();
    total.clamp(i128::from(i64::MIN), i128::from(i64::MAX)) as i64
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(direction: Direction, quantity: i64) -> MovementEntry {
        MovementEntry::new(
            MovementId::new(),
            ItemId::new(),
            LotId::new(),
            direction,
            quantity,
            Utc::now(),
        )
    }

    #[test]
    fn replay_nets_ins_against_outs() {
        let history = [
            entry(Direction::In, 100),
            entry(Direction::In, 50),
            entry(Direction::Out, 60),
        ];
        assert_eq!(replay_balance(&history), 90);
    }

    #[test]
    fn empty_history_is_zero() {
        assert_eq!(replay_balance(&[]), 0);
    }

    #[test]
    fn non_positive_quantity_fails_validation() {
        assert!(entry(Direction::In, 0).validate().is_err());
        assert!(entry(Direction::Out, -5).validate().is_err());
        assert!(entry(Direction::Out, 5).validate().is_ok());
    }

    #[test]
    fn direction_serializes_lowercase() {
        let json = serde_json::to_string(&Direction::Out).unwrap();
        assert_eq!(json, "\"out\"");
    }
}
