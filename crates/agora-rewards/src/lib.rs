//! # Agora Rewards
//!
//! Deterministic, overflow-safe proportional-yield accounting.
//!
//! ## Reservation accounting
//!
//! Every stake reserves its full target reward up front:
//!
//! ```text
//! target = nft_price * yield_bps / 10000
//! ```
//!
//! A stake is rejected unless the pool can cover the target from funds not
//! already claimed or reserved. The linchpin identity, holding for every
//! pool at all times:
//!
//! ```text
//! total_rewards >= total_claimed + reserved_rewards
//! ```
//!
//! ## Vesting
//!
//! Rewards vest linearly over the pool's stake duration and are capped
//! twice: by the per-stake target and by the pool-level remainder
//! `total_rewards - total_claimed`. No call ordering can push total claims
//! past total funding.

pub mod calculator;
pub mod pool;

pub use calculator::{RewardCalculator, RewardEvent, UnstakeOutcome};
pub use pool::{RewardPool, StakeReward};

use agora_core::AccessError;
use thiserror::Error;

/// Reward engine constants
pub mod constants {
    /// Maximum pool yield: 50%
    pub const MAX_YIELD_BPS: u32 = 5_000;

    /// Claims below this amount are rejected as gas-inefficient dust
    pub const DUST_THRESHOLD: u128 = 1_000;

    /// Reported by `version()` for deployment-time compatibility pinning
    pub const CALCULATOR_VERSION: &str = "agora-rewards/1.0.0";
}

/// Reward engine errors
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum RewardError {
    /// Pool id does not exist
    #[error("pool not found: {0}")]
    PoolNotFound(u64),

    /// Pool is deactivated
    #[error("pool {0} is inactive")]
    PoolInactive(u64),

    /// Yield outside (0, MAX_YIELD_BPS]
    #[error("invalid yield: {bps} bps (max {max})")]
    InvalidYield { bps: u32, max: u32 },

    /// Zero or inconsistent durations
    #[error("invalid pool duration: stake {stake_duration}s, min {min_stake_duration}s")]
    InvalidDuration {
        stake_duration: u64,
        min_stake_duration: u64,
    },

    /// Zero reward-token address
    #[error("zero reward token address")]
    ZeroRewardToken,

    /// Funding or price amount of zero
    #[error("amount must be non-zero")]
    ZeroAmount,

    /// No stake record for this token
    #[error("stake not found for token {0}")]
    StakeNotFound(u64),

    /// Token already has a live stake record
    #[error("token {0} already has a stake record")]
    StakeAlreadyTracked(u64),

    /// Pool cannot cover the stake's target reward
    #[error("insufficient pool rewards: need {required}, available {available}")]
    InsufficientPoolRewards { required: u128, available: u128 },

    /// Nothing has accrued since the last claim
    #[error("nothing to claim")]
    NothingToClaim,

    /// Pending amount is below the dust threshold
    #[error("claim of {amount} is below the dust threshold")]
    BelowDustThreshold { amount: u128 },

    /// Minimum stake duration has not elapsed
    #[error("stake held {elapsed}s, minimum is {required}s")]
    StakeTooShort { required: u64, elapsed: u64 },

    /// Arithmetic overflow in reward math
    #[error("arithmetic overflow in reward computation")]
    Overflow,

    /// Authorization failure
    #[error(transparent)]
    Access(#[from] AccessError),
}
