//! Error taxonomy for the stock ledger.

use thiserror::Error;

/// Result type used by allocator operations.
pub type AllocationResult<T> = Result<T, AllocationError>;

/// Result type used by store contracts.
pub type StoreResult<T> = Result<T, StoreError>;

/// Deterministic failure of an intake/outtake operation.
///
/// Keep this focused on outcomes a caller can act on (fix the input, reduce
/// the requested quantity, retry later). Infrastructure detail stays in
/// [`StoreError`] and is mapped at the allocator boundary.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AllocationError {
    /// The referenced item identifier does not resolve.
    #[error("item not found")]
    ItemNotFound,

    /// A non-positive quantity was supplied.
    #[error("invalid quantity: {0}")]
    InvalidQuantity(i64),

    /// An outtake cannot be satisfied from the item's active lots.
    #[error("insufficient stock (available: {available}, requested: {requested})")]
    InsufficientStock { available: i64, requested: i64 },

    /// Concurrent mutations kept invalidating the commit until the retry
    /// budget ran out.
    #[error("allocation conflicted with concurrent updates")]
    CommitConflict,

    /// The backing store is unreachable. Retry policy belongs to the caller.
    #[error("store unavailable: {0}")]
    StoreUnavailable(String),

    /// A stored record failed validation. Surfaced for manual reconciliation,
    /// never silently defaulted.
    #[error("corrupt stored record: {0}")]
    Corrupt(String),
}

impl AllocationError {
    pub fn insufficient_stock(available: i64, requested: i64) -> Self {
        Self::InsufficientStock {
            available,
            requested,
        }
    }

    pub fn invalid_quantity(quantity: i64) -> Self {
        Self::InvalidQuantity(quantity)
    }
}

/// Infrastructure-side failure of a store contract.
///
/// These are the errors `ItemCatalog` / `LotStore` / `MovementLedger`
/// implementations may surface; the allocator maps them into
/// [`AllocationError`] before they reach callers.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The persistence layer is unreachable (network, lock poisoning, ...).
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// A stored document failed validation against the typed record model.
    #[error("corrupt stored record: {0}")]
    Corrupt(String),

    /// Optimistic concurrency check failed: the item moved on since the
    /// commit was planned.
    #[error("version conflict (expected: {expected}, found: {found})")]
    VersionConflict { expected: u64, found: u64 },

    /// A referenced record does not exist in the store.
    #[error("record not found: {0}")]
    NotFound(String),
}

impl StoreError {
    pub fn unavailable(msg: impl Into<String>) -> Self {
        Self::Unavailable(msg.into())
    }

    pub fn corrupt(msg: impl Into<String>) -> Self {
        Self::Corrupt(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }
}

impl From<StoreError> for AllocationError {
    fn from(value: StoreError) -> Self {
        match value {
            StoreError::Unavailable(msg) => AllocationError::StoreUnavailable(msg),
            StoreError::Corrupt(msg) => AllocationError::Corrupt(msg),
            StoreError::VersionConflict { .. } => AllocationError::CommitConflict,
            StoreError::NotFound(msg) => AllocationError::Corrupt(msg),
        }
    }
}
