//! `larder-catalog` — item records and the catalog contract.

pub mod contract;
pub mod item;

pub use contract::ItemCatalog;
pub use item::Item;
