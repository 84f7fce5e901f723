//! Player error types

use thiserror::Error;

/// Level-up point allocation errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProgressionError {
    #[error("no unspent attribute points")]
    NoUnspentPoints,
}

/// Consumable use errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConsumeError {
    #[error("inventory slot {0} is empty")]
    EmptySlot(usize),
    #[error("{0} cannot be used")]
    NotConsumable(String),
    #[error("the dead cannot drink")]
    Dead,
}
