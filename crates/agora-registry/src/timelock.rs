//! Timelocked critical operations.
//!
//! Admin-privileged raw calls go through a two-phase schedule/execute
//! protocol: `Scheduled -> Executed | Cancelled`, keyed by a digest of
//! (target, payload, scheduling timestamp) so the same call scheduled at a
//! different time gets a different key and cannot be replayed.

use agora_core::{Address, Digest};
use serde::{Deserialize, Serialize};

/// Phase of a critical operation
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum OperationState {
    /// Waiting for the timelock delay
    Scheduled,
    /// Dispatched to the target
    Executed,
    /// Withdrawn before execution
    Cancelled,
}

/// A scheduled admin-privileged raw call
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CriticalOperation {
    /// Content key: digest of (target, data, scheduled_at)
    pub key: Digest,

    /// Call target
    pub target: Address,

    /// Opaque call payload
    pub data: Vec<u8>,

    /// Admin who scheduled the operation
    pub scheduled_by: Address,

    /// Scheduling timestamp; part of the key
    pub scheduled_at: i64,

    /// Current phase
    pub state: OperationState,
}

impl CriticalOperation {
    /// Compute the replay-resistant key for an operation
    pub fn key_for(target: Address, data: &[u8], scheduled_at: i64) -> Digest {
        Digest::of(&[target.as_bytes(), data, &scheduled_at.to_le_bytes()])
    }

    /// Create a freshly scheduled operation
    pub fn schedule(target: Address, data: Vec<u8>, scheduled_by: Address, now: i64) -> Self {
        let key = Self::key_for(target, &data, now);
        Self {
            key,
            target,
            data,
            scheduled_by,
            scheduled_at: now,
            state: OperationState::Scheduled,
        }
    }

    /// Seconds left before the operation may execute
    pub fn remaining_delay(&self, now: i64, delay: i64) -> i64 {
        (self.scheduled_at + delay - now).max(0)
    }
}
