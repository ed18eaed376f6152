//! `larder-core` — foundation types for the stock ledger.
//!
//! This crate contains **pure domain** primitives (no infrastructure
//! concerns): strongly-typed identifiers and the error taxonomy shared by
//! the allocator and the store contracts.

pub mod error;
pub mod id;

pub use error::{AllocationError, AllocationResult, StoreError, StoreResult};
pub use id::{DonorId, ItemId, LotId, MovementId};
