//! `larder-allocator` — the stock allocation and ledger service.
//!
//! `StockAllocator` coordinates the catalog, lot store, and movement ledger
//! so that every intake/outtake appears to execute as a single indivisible
//! unit: writes are staged into a [`commit::StockCommit`] and applied
//! through [`commit::StockStore::commit`], with per-item optimistic
//! versioning serializing concurrent operations on the same item.

pub mod allocator;
pub mod commit;
pub mod plan;
pub mod reports;

pub use allocator::{AllocatorConfig, IntakeRequest, OuttakeRequest, StockAllocator};
pub use commit::{LotDecrement, StockCommit, StockStore};
pub use plan::{LotDraw, OuttakePlan, plan_outtake};
pub use reports::{Reconciliation, StockReports};
