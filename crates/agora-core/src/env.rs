//! Deterministic execution environment.
//!
//! Contracts never read ambient time or identity; every entry point takes
//! an [`Env`] supplied by the driver. This keeps state transitions
//! replayable and lets tests pin the clock and block counter exactly.

use crate::types::Address;
use serde::{Deserialize, Serialize};

/// Ambient transaction context for one state transition
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct Env {
    /// The account invoking the operation
    pub caller: Address,

    /// Unix timestamp (seconds)
    pub timestamp: i64,

    /// Monotonic block height
    pub block_number: u64,
}

impl Env {
    /// Create a new environment
    pub fn new(caller: Address, timestamp: i64, block_number: u64) -> Self {
        Self {
            caller,
            timestamp,
            block_number,
        }
    }

    /// Same point in time, different caller.
    ///
    /// Used when a contract invokes another contract under its own
    /// identity (the cross-contract call keeps the block context).
    pub fn reenter_as(&self, caller: Address) -> Self {
        Self { caller, ..*self }
    }
}
