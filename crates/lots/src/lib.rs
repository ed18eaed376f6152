//! `larder-lots` — stock lot records and the lot-store contract.

pub mod contract;
pub mod lot;

pub use contract::LotStore;
pub use lot::StockLot;
