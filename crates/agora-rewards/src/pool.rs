//! Pool and per-stake reward records.

use agora_core::constants::BPS_DENOMINATOR;
use agora_core::Address;
use serde::{Deserialize, Serialize};

/// A funded reward pool
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RewardPool {
    /// Pool id
    pub id: u64,

    /// Yield on the staked NFT's purchase price, in basis points
    pub yield_bps: u32,

    /// Seconds over which a stake's target reward vests fully
    pub stake_duration: u64,

    /// Seconds a stake must be held before unstaking
    pub min_stake_duration: u64,

    /// Total rewards ever funded into the pool
    pub total_rewards: u128,

    /// Total rewards paid out
    pub total_claimed: u128,

    /// Rewards earmarked for live stakes but not yet claimed
    pub reserved_rewards: u128,

    /// Count of stakes ever opened against the pool
    pub total_staked: u64,

    /// Count of stakes fully settled
    pub total_unstaked: u64,

    /// Token in which rewards are denominated
    pub reward_token: Address,

    /// Running average stake duration across settled stakes, seconds
    pub avg_stake_duration: u64,

    /// Is the pool accepting new stakes?
    pub active: bool,

    /// Creation timestamp
    pub created_at: i64,
}

impl RewardPool {
    /// Rewards not yet claimed or reserved; the ceiling for new targets
    pub fn available_rewards(&self) -> u128 {
        self.total_rewards
            .saturating_sub(self.total_claimed)
            .saturating_sub(self.reserved_rewards)
    }

    /// Share of funding currently reserved, floored to whole basis points
    pub fn utilization_bps(&self) -> u128 {
        if self.total_rewards == 0 {
            return 0;
        }
        // Scaling by more than BPS_DENOMINATOR buys nothing here and
        // overflows at 18-decimal token amounts.
        match self.reserved_rewards.checked_mul(BPS_DENOMINATOR) {
            Some(scaled) => scaled / self.total_rewards,
            None => self.reserved_rewards / (self.total_rewards / BPS_DENOMINATOR).max(1),
        }
    }

    /// The accounting identity the whole engine rests on
    pub fn invariant_holds(&self) -> bool {
        self.total_rewards >= self.total_claimed + self.reserved_rewards
    }

    /// Fold one settled stake into the running average duration
    pub(crate) fn record_settled_duration(&mut self, held_seconds: u64) {
        let n = self.total_unstaked.max(1) as u128;
        debug_assert!(self.total_unstaked > 0, "caller increments total_unstaked first");
        let sum = self.avg_stake_duration as u128 * (n - 1) + held_seconds as u128;
        self.avg_stake_duration = (sum / n) as u64;
    }
}

/// Reward state for one staked token
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StakeReward {
    /// Full reward the stake earns over the pool's stake duration
    pub target_reward: u128,

    /// Amount claimed so far; never exceeds `target_reward`
    pub rewards_claimed: u128,

    /// Timestamp of the most recent claim
    pub last_claim_time: i64,

    /// When the stake opened
    pub staked_at: i64,

    /// Pool the stake draws from
    pub pool_id: u64,

    /// Purchase price the target was computed from
    pub nft_price: u128,
}

impl StakeReward {
    /// Reservation still held against the pool
    pub fn unused_reservation(&self) -> u128 {
        self.target_reward.saturating_sub(self.rewards_claimed)
    }
}
