//! `larder-ledger` — movement records and the ledger contract.

pub mod contract;
pub mod movement;

pub use contract::MovementLedger;
pub use movement::{Direction, MovementEntry, replay_balance};
