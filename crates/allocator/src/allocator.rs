//! Intake/outtake orchestration (check-then-act, atomic commit).
//!
//! Each operation runs the same pipeline: resolve the item, decide the
//! writes with pure logic, then hand every write to the store as one
//! [`StockCommit`]. The commit carries the item version the decision was
//! computed against; a stale version fails the commit and the whole
//! sequence is re-run, so concurrent operations against the same item
//! serialize without any cross-item coordination.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use larder_core::{AllocationError, AllocationResult, DonorId, ItemId, LotId, MovementId, StoreError};
use larder_ledger::{Direction, MovementEntry};
use larder_lots::StockLot;

use crate::commit::{LotDecrement, StockCommit, StockStore};
use crate::plan::{OuttakePlan, plan_outtake};

/// Allocator tuning, passed explicitly at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AllocatorConfig {
    /// How many times a conflicted commit is re-planned before the
    /// operation fails with `CommitConflict`.
    pub max_commit_retries: u32,
}

impl Default for AllocatorConfig {
    fn default() -> Self {
        Self {
            max_commit_retries: 3,
        }
    }
}

/// One donated line item entering stock.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntakeRequest {
    pub item_id: ItemId,
    pub quantity: i64,
    /// Lot label; derived from the receipt date when absent.
    pub label: Option<String>,
    pub expiry: Option<NaiveDate>,
    pub donor: Option<DonorId>,
    pub occurred_at: DateTime<Utc>,
}

/// One delivery line item leaving stock.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OuttakeRequest {
    pub item_id: ItemId,
    pub quantity: i64,
    pub occurred_at: DateTime<Utc>,
}

/// Stock allocation service.
///
/// Holds no state of its own beyond the injected store; hosts construct one
/// per store and pass it around explicitly.
#[derive(Debug)]
pub struct StockAllocator<S> {
    store: S,
    config: AllocatorConfig,
}

impl<S> StockAllocator<S> {
    pub fn new(store: S, config: AllocatorConfig) -> Self {
        Self { store, config }
    }

    pub fn store(&self) -> &S {
        &self.store
    }
}

impl<S> StockAllocator<S>
where
    S: StockStore,
{
    /// Record one donated line item: creates a lot holding the full
    /// quantity, appends an `IN` ledger entry, and increments the item's
    /// aggregate stock — all in one commit. Returns the new lot's id.
    pub fn record_intake(&self, request: &IntakeRequest) -> AllocationResult<LotId> {
        if request.quantity <= 0 {
            return Err(AllocationError::invalid_quantity(request.quantity));
        }

        let mut attempt = 0;
        loop {
            let item = self
                .store
                .get(request.item_id)?
                .ok_or(AllocationError::ItemNotFound)?;

            let lot_id = LotId::new();
            let label = request
                .label
                .clone()
                .unwrap_or_else(|| format!("LOT-{}", request.occurred_at.format("%Y%m%d")));
            let lot = StockLot::received(
                lot_id,
                request.item_id,
                label,
                request.quantity,
                request.expiry,
                request.donor,
                request.occurred_at,
            );
            let entry = MovementEntry::new(
                MovementId::new(),
                request.item_id,
                lot_id,
                Direction::In,
                request.quantity,
                request.occurred_at,
            );

            let commit = StockCommit {
                item_id: request.item_id,
                expected_version: item.version,
                new_lot: Some(lot),
                decrements: Vec::new(),
                entries: vec![entry],
                stock_delta: request.quantity,
            };

            match self.store.commit(commit) {
                Ok(()) => {
                    tracing::info!(
                        "intake committed: item={} lot={} quantity={}",
                        request.item_id,
                        lot_id,
                        request.quantity
                    );
                    return Ok(lot_id);
                }
                Err(StoreError::VersionConflict { expected, found }) => {
                    attempt += 1;
                    if attempt > self.config.max_commit_retries {
                        tracing::warn!(
                            "intake gave up after {attempt} attempts: item={}",
                            request.item_id
                        );
                        return Err(AllocationError::CommitConflict);
                    }
                    tracing::debug!(
                        "intake conflicted (expected v{expected}, found v{found}), retrying: item={}",
                        request.item_id
                    );
                }
                Err(e) => return Err(e.into()),
            }
        }
    }

    /// Record one delivery line item: consumes active lots oldest expiry
    /// first, appends one `OUT` ledger entry per lot touched, and decrements
    /// the item's aggregate stock — all in one commit, or nothing when the
    /// request cannot be satisfied.
    pub fn record_outtake(&self, request: &OuttakeRequest) -> AllocationResult<OuttakePlan> {
        if request.quantity <= 0 {
            return Err(AllocationError::invalid_quantity(request.quantity));
        }

        let mut attempt = 0;
        loop {
            let item = self
                .store
                .get(request.item_id)?
                .ok_or(AllocationError::ItemNotFound)?;

            let lots = self.store.list_active_lots(request.item_id)?;
            let plan = match plan_outtake(&lots, request.quantity) {
                Ok(plan) => plan,
                Err(e) => {
                    if let AllocationError::InsufficientStock {
                        available,
                        requested,
                    } = &e
                    {
                        tracing::info!(
                            "outtake rejected: item={} available={available} requested={requested}",
                            request.item_id
                        );
                    }
                    return Err(e);
                }
            };

            let entries = plan
                .allocations
                .iter()
                .map(|draw| {
                    MovementEntry::new(
                        MovementId::new(),
                        request.item_id,
                        draw.lot_id,
                        Direction::Out,
                        draw.quantity,
                        request.occurred_at,
                    )
                })
                .collect();
            let decrements = plan
                .allocations
                .iter()
                .map(|draw| LotDecrement {
                    lot_id: draw.lot_id,
                    amount: draw.quantity,
                })
                .collect();

            let commit = StockCommit {
                item_id: request.item_id,
                expected_version: item.version,
                new_lot: None,
                decrements,
                entries,
                stock_delta: -request.quantity,
            };

            match self.store.commit(commit) {
                Ok(()) => {
                    tracing::info!(
                        "outtake committed: item={} quantity={} lots_touched={}",
                        request.item_id,
                        request.quantity,
                        plan.allocations.len()
                    );
                    return Ok(plan);
                }
                Err(StoreError::VersionConflict { expected, found }) => {
                    attempt += 1;
                    if attempt > self.config.max_commit_retries {
                        tracing::warn!(
                            "outtake gave up after {attempt} attempts: item={}",
                            request.item_id
                        );
                        return Err(AllocationError::CommitConflict);
                    }
                    tracing::debug!(
                        "outtake conflicted (expected v{expected}, found v{found}), replanning: item={}",
                        request.item_id
                    );
                }
                Err(e) => return Err(e.into()),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use larder_catalog::{Item, ItemCatalog};
    use larder_ledger::MovementLedger;
    use larder_lots::LotStore;

    /// Scripted store: fixed item/lot state, commit outcomes popped from a
    /// queue. Lets the retry loop be tested deterministically.
    struct ScriptedStore {
        item: Item,
        lots: Vec<StockLot>,
        commit_results: Mutex<Vec<Result<(), StoreError>>>,
        commits_seen: Mutex<Vec<StockCommit>>,
    }

    impl ScriptedStore {
        fn new(item: Item, lots: Vec<StockLot>, results: Vec<Result<(), StoreError>>) -> Self {
            Self {
                item,
                lots,
                commit_results: Mutex::new(results),
                commits_seen: Mutex::new(Vec::new()),
            }
        }
    }

    impl ItemCatalog for ScriptedStore {
        fn get(&self, item_id: ItemId) -> Result<Option<Item>, StoreError> {
            Ok((item_id == self.item.id).then(|| self.item.clone()))
        }

        fn list_items(&self) -> Result<Vec<Item>, StoreError> {
            Ok(vec![self.item.clone()])
        }

        fn adjust_stock(&self, _item_id: ItemId, _delta: i64) -> Result<(), StoreError> {
            unreachable!("allocator must route writes through commit")
        }
    }

    impl LotStore for ScriptedStore {
        fn list_active_lots(&self, _item_id: ItemId) -> Result<Vec<StockLot>, StoreError> {
            Ok(self.lots.clone())
        }

        fn create(&self, _lot: StockLot) -> Result<(), StoreError> {
            unreachable!("allocator must route writes through commit")
        }

        fn decrement_remaining(&self, _lot_id: LotId, _amount: i64) -> Result<(), StoreError> {
            unreachable!("allocator must route writes through commit")
        }
    }

    impl MovementLedger for ScriptedStore {
        fn append(&self, _entry: MovementEntry) -> Result<(), StoreError> {
            unreachable!("allocator must route writes through commit")
        }

        fn entries_for_item(&self, _item_id: ItemId) -> Result<Vec<MovementEntry>, StoreError> {
            Ok(Vec::new())
        }
    }

    impl StockStore for ScriptedStore {
        fn commit(&self, commit: StockCommit) -> Result<(), StoreError> {
            self.commits_seen.lock().unwrap().push(commit);
            self.commit_results.lock().unwrap().remove(0)
        }
    }

    fn test_item() -> Item {
        Item::register(ItemId::new(), "Rice", "RICE", "kg", 5).unwrap()
    }

    fn conflict() -> Result<(), StoreError> {
        Err(StoreError::VersionConflict {
            expected: 0,
            found: 1,
        })
    }

    #[test]
    fn intake_retries_through_conflicts() {
        let item = test_item();
        let store = ScriptedStore::new(item.clone(), vec![], vec![conflict(), conflict(), Ok(())]);
        let allocator = StockAllocator::new(store, AllocatorConfig::default());

        let request = IntakeRequest {
            item_id: item.id,
            quantity: 25,
            label: None,
            expiry: None,
            donor: None,
            occurred_at: Utc::now(),
        };
        allocator.record_intake(&request).unwrap();

        let seen = allocator.store().commits_seen.lock().unwrap();
        assert_eq!(seen.len(), 3);
        assert_eq!(seen[2].stock_delta, 25);
        assert_eq!(seen[2].entries.len(), 1);
        assert!(seen[2].new_lot.is_some());
    }

    #[test]
    fn intake_surfaces_conflict_after_retry_budget() {
        let item = test_item();
        let store = ScriptedStore::new(
            item.clone(),
            vec![],
            vec![conflict(), conflict(), conflict(), conflict()],
        );
        let allocator = StockAllocator::new(store, AllocatorConfig::default());

        let request = IntakeRequest {
            item_id: item.id,
            quantity: 1,
            label: None,
            expiry: None,
            donor: None,
            occurred_at: Utc::now(),
        };
        let err = allocator.record_intake(&request).unwrap_err();
        assert_eq!(err, AllocationError::CommitConflict);
        // 1 first attempt + max_commit_retries
        assert_eq!(allocator.store().commits_seen.lock().unwrap().len(), 4);
    }

    #[test]
    fn outtake_builds_one_entry_and_decrement_per_draw() {
        let item = test_item();
        let lots = vec![
            StockLot::received(LotId::new(), item.id, "A", 5, None, None, Utc::now()),
            StockLot::received(LotId::new(), item.id, "B", 5, None, None, Utc::now()),
        ];
        let store = ScriptedStore::new(item.clone(), lots.clone(), vec![Ok(())]);
        let allocator = StockAllocator::new(store, AllocatorConfig::default());

        let plan = allocator
            .record_outtake(&OuttakeRequest {
                item_id: item.id,
                quantity: 8,
                occurred_at: Utc::now(),
            })
            .unwrap();
        assert_eq!(plan.total(), 8);

        let seen = allocator.store().commits_seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].decrements.len(), plan.allocations.len());
        assert_eq!(seen[0].entries.len(), plan.allocations.len());
        assert_eq!(seen[0].stock_delta, -8);
        assert!(seen[0].new_lot.is_none());
    }

    #[test]
    fn unknown_item_is_not_committed() {
        let item = test_item();
        let store = ScriptedStore::new(item, vec![], vec![]);
        let allocator = StockAllocator::new(store, AllocatorConfig::default());

        let err = allocator
            .record_outtake(&OuttakeRequest {
                item_id: ItemId::new(),
                quantity: 1,
                occurred_at: Utc::now(),
            })
            .unwrap_err();
        assert_eq!(err, AllocationError::ItemNotFound);
        assert!(allocator.store().commits_seen.lock().unwrap().is_empty());
    }

    #[test]
    fn non_positive_quantities_never_reach_the_store() {
        let item = test_item();
        let store = ScriptedStore::new(item.clone(), vec![], vec![]);
        let allocator = StockAllocator::new(store, AllocatorConfig::default());

        let err = allocator
            .record_intake(&IntakeRequest {
                item_id: item.id,
                quantity: 0,
                label: None,
                expiry: None,
                donor: None,
                occurred_at: Utc::now(),
            })
            .unwrap_err();
        assert_eq!(err, AllocationError::InvalidQuantity(0));
        assert!(allocator.store().commits_seen.lock().unwrap().is_empty());
    }
}
