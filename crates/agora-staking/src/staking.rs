//! The staking contract state machine.

use crate::breaker::WithdrawalBreaker;
use crate::constants::*;
use crate::multisig::{MultiSigGate, MultiSigOutcome};
use crate::StakingError;
use agora_core::access::admin_role;
use agora_core::constants::BPS_DENOMINATOR;
use agora_core::{
    AccessControlState, Address, Digest, Env, GovernanceHook, GovernanceNft, RoleId, TokenTransfer,
    VotingPowerSource,
};
use agora_rewards::RewardCalculator;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap, HashSet};
use tracing::{info, warn};

/// Compute the commit-reveal digest for a stake
pub fn stake_commitment(staker: Address, token_id: u64, pool_id: u64, nonce: u64) -> Digest {
    Digest::of(&[
        staker.as_bytes(),
        &token_id.to_le_bytes(),
        &pool_id.to_le_bytes(),
        &nonce.to_le_bytes(),
    ])
}

/// Custody record for one staked token
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StakeInfo {
    /// Pool the stake accrues from
    pub pool_id: u64,

    /// When the stake opened
    pub staked_at: i64,

    /// Holder entitled to rewards and the eventual return of the token
    pub owner: Address,

    /// Token contributes voting power only after this timestamp
    pub vote_lock_expiry: i64,

    /// Purchase price; the basis for voting power
    pub nft_price: u128,
}

/// Ephemeral commit-phase record, consumed by the matching reveal
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct StakeCommitment {
    /// Hash of (sender, token, pool, nonce)
    pub commitment: Digest,

    /// Block at which the commitment was published
    pub block_number: u64,
}

/// Pending whitelist/delist action under the token timelock
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
struct TokenAction {
    whitelist: bool,
    scheduled_at: i64,
}

/// Observable staking events
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum StakingEvent {
    StakeCommitted {
        staker: Address,
        block_number: u64,
    },
    Staked {
        staker: Address,
        token_id: u64,
        pool_id: u64,
        target_reward: u128,
        vote_lock_expiry: i64,
    },
    VoteLockExtended {
        token_id: u64,
        expiry: i64,
    },
    RewardsClaimed {
        staker: Address,
        token_id: u64,
        amount: u128,
    },
    Unstaked {
        staker: Address,
        token_id: u64,
        reward_paid: u128,
    },
    RewardWithheld {
        staker: Address,
        token_id: u64,
        reward_token: Address,
        amount: u128,
    },
    CircuitBreakerTriggered {
        pool_id: u64,
        attempted: u128,
        limit: u128,
    },
    GovernanceNotificationFailed {
        reason: String,
    },
    GovernanceProbeFailed {
        reason: String,
    },
    ActionApproved {
        action: Digest,
        approvals: u32,
        threshold: u32,
    },
    ThresholdChanged {
        threshold: u32,
    },
    DailyLimitChanged {
        pool_id: u64,
        limit: u128,
    },
    PausedSet {
        paused: bool,
    },
    TokenActionScheduled {
        token: Address,
        whitelist: bool,
    },
    TokenWhitelisted {
        token: Address,
    },
    TokenDelisted {
        token: Address,
    },
    CalculatorBound {
        version: String,
    },
    GovernanceBound {
        version: String,
    },
}

/// NFT staking contract
pub struct GovernanceStaking {
    /// The contract's own address: custody identity and the caller it
    /// presents to the reward calculator
    address: Address,
    access: AccessControlState,
    stakes: HashMap<u64, StakeInfo>,
    user_tokens: HashMap<Address, BTreeSet<u64>>,
    commitments: HashMap<Address, StakeCommitment>,
    breaker: WithdrawalBreaker,
    multisig: MultiSigGate,
    whitelisted_tokens: HashSet<Address>,
    token_actions: HashMap<Address, TokenAction>,
    calculator_version: Option<String>,
    governance_version: Option<String>,
    events: Vec<StakingEvent>,
}

impl GovernanceStaking {
    /// Create a staking contract at `address` with `deployer` as admin
    pub fn new(address: Address, deployer: Address) -> Self {
        Self {
            address,
            access: AccessControlState::new(deployer),
            stakes: HashMap::new(),
            user_tokens: HashMap::new(),
            commitments: HashMap::new(),
            breaker: WithdrawalBreaker::new(WITHDRAWAL_PERIOD_SECS, DEFAULT_DAILY_WITHDRAWAL_LIMIT),
            multisig: MultiSigGate::new(1),
            whitelisted_tokens: HashSet::new(),
            token_actions: HashMap::new(),
            calculator_version: None,
            governance_version: None,
            events: Vec::new(),
        }
    }

    /// Implementation version, checked by dependents before binding
    pub fn version(&self) -> &'static str {
        STAKING_VERSION
    }

    /// The contract's own address
    pub fn address(&self) -> Address {
        self.address
    }

    /// Grant a role; admin only
    pub fn grant_role(
        &mut self,
        env: &Env,
        role: RoleId,
        account: Address,
    ) -> Result<(), StakingError> {
        self.access.grant_role(env.caller, role, account)?;
        Ok(())
    }

    // === Dependency binding ===

    /// Pin the reward calculator after checking its version string
    /// against the caller-supplied expectation; admin only.
    pub fn bind_calculator(
        &mut self,
        env: &Env,
        calculator: &RewardCalculator,
        expected_version: &str,
    ) -> Result<(), StakingError> {
        self.access.require_role(admin_role(), env.caller)?;
        let actual = calculator.version();
        if actual != expected_version {
            return Err(StakingError::VersionMismatch {
                expected: expected_version.to_string(),
                actual: actual.to_string(),
            });
        }
        self.calculator_version = Some(actual.to_string());
        self.events.push(StakingEvent::CalculatorBound {
            version: actual.to_string(),
        });
        Ok(())
    }

    /// Pin the governance contract after a version check; admin only
    pub fn bind_governance(
        &mut self,
        env: &Env,
        governance: &dyn GovernanceHook,
        expected_version: &str,
    ) -> Result<(), StakingError> {
        self.access.require_role(admin_role(), env.caller)?;
        let actual = governance.version()?;
        if actual != expected_version {
            return Err(StakingError::VersionMismatch {
                expected: expected_version.to_string(),
                actual,
            });
        }
        self.governance_version = Some(actual.clone());
        self.events.push(StakingEvent::GovernanceBound { version: actual });
        Ok(())
    }

    // === Commit-reveal stake protocol ===

    /// Publish a stake commitment. Re-committing replaces the previous
    /// commitment and restarts the block delay.
    pub fn commit_stake(&mut self, env: &Env, commitment: Digest) -> Result<(), StakingError> {
        self.access.require_not_paused()?;
        self.commitments.insert(
            env.caller,
            StakeCommitment {
                commitment,
                block_number: env.block_number,
            },
        );
        self.events.push(StakingEvent::StakeCommitted {
            staker: env.caller,
            block_number: env.block_number,
        });
        Ok(())
    }

    /// Reveal a commitment and stake the token.
    ///
    /// The commitment is consumed only on success, so a failed reveal can
    /// be retried.
    #[allow(clippy::too_many_arguments)]
    pub fn stake(
        &mut self,
        env: &Env,
        token_id: u64,
        pool_id: u64,
        nonce: u64,
        nft: &mut dyn GovernanceNft,
        calculator: &mut RewardCalculator,
        governance: Option<&mut dyn GovernanceHook>,
    ) -> Result<(), StakingError> {
        self.access.require_not_paused()?;

        let commitment = self
            .commitments
            .get(&env.caller)
            .copied()
            .ok_or(StakingError::NoCommitment)?;
        let unlock_block = commitment.block_number + MIN_COMMIT_BLOCKS;
        if env.block_number < unlock_block {
            return Err(StakingError::CommitTooRecent {
                blocks_remaining: unlock_block - env.block_number,
            });
        }
        if stake_commitment(env.caller, token_id, pool_id, nonce) != commitment.commitment {
            return Err(StakingError::CommitmentMismatch);
        }

        let pinned = self
            .calculator_version
            .as_deref()
            .ok_or(StakingError::CalculatorNotBound)?;
        if calculator.version() != pinned {
            return Err(StakingError::VersionMismatch {
                expected: pinned.to_string(),
                actual: calculator.version().to_string(),
            });
        }

        if nft.owner_of(token_id)? != env.caller {
            return Err(StakingError::NotTokenOwner(token_id));
        }
        let staked_count = self.user_tokens.get(&env.caller).map(|t| t.len()).unwrap_or(0);
        if staked_count >= MAX_STAKES_PER_USER {
            return Err(StakingError::StakeLimitReached {
                max: MAX_STAKES_PER_USER,
            });
        }
        if self.stakes.contains_key(&token_id) {
            return Err(StakingError::TokenAlreadyStaked(token_id));
        }

        let (price, _payment_token) = nft.purchase_price(token_id)?;
        if price == 0 {
            return Err(StakingError::ZeroPurchasePrice(token_id));
        }

        let pool = calculator
            .get_pool(pool_id)
            .ok_or(agora_rewards::RewardError::PoolNotFound(pool_id))?;
        if !self.whitelisted_tokens.contains(&pool.reward_token) {
            return Err(StakingError::TokenNotWhitelisted(pool.reward_token));
        }

        let mut has_open_proposals = false;
        let governance = match governance {
            Some(hook) => {
                if self.probe_is_active(&*hook, env.caller)? {
                    return Err(StakingError::ActiveProposalBlocks);
                }
                has_open_proposals = match hook.has_active_proposals() {
                    Ok(active) => active,
                    Err(err) => {
                        self.events.push(StakingEvent::GovernanceProbeFailed {
                            reason: err.to_string(),
                        });
                        false
                    }
                };
                Some(hook)
            }
            None => None,
        };

        // Reserve first, then take custody.
        let inner_env = env.reenter_as(self.address);
        let target_reward = calculator.process_stake(&inner_env, token_id, pool_id, price)?;
        nft.transfer(env.caller, self.address, token_id)?;

        // Longer lock while governance is mid-vote: blunts last-minute
        // vote stacking.
        let lock_secs = if has_open_proposals {
            EXTENDED_VOTE_LOCK_SECS
        } else {
            BASE_VOTE_LOCK_SECS
        };
        let vote_lock_expiry = env.timestamp + lock_secs;
        if has_open_proposals {
            self.events.push(StakingEvent::VoteLockExtended {
                token_id,
                expiry: vote_lock_expiry,
            });
        }

        self.stakes.insert(
            token_id,
            StakeInfo {
                pool_id,
                staked_at: env.timestamp,
                owner: env.caller,
                vote_lock_expiry,
                nft_price: price,
            },
        );
        self.user_tokens.entry(env.caller).or_default().insert(token_id);
        self.commitments.remove(&env.caller);

        info!(staker = %env.caller, token_id, pool_id, "token staked");
        self.events.push(StakingEvent::Staked {
            staker: env.caller,
            token_id,
            pool_id,
            target_reward,
            vote_lock_expiry,
        });

        if let Some(hook) = governance {
            self.notify_isolated(hook, env.caller, staked_count as u64 + 1);
        }
        Ok(())
    }

    /// Claim vested rewards for a staked token
    pub fn claim_rewards(
        &mut self,
        env: &Env,
        token_id: u64,
        calculator: &mut RewardCalculator,
        tokens: &mut dyn TokenTransfer,
    ) -> Result<u128, StakingError> {
        self.access.require_not_paused()?;

        let stake = self
            .stakes
            .get(&token_id)
            .ok_or(StakingError::StakeNotFound(token_id))?;
        if stake.owner != env.caller {
            return Err(StakingError::NotTokenOwner(token_id));
        }
        let pool_id = stake.pool_id;

        let reward_token = calculator
            .get_pool(pool_id)
            .map(|p| p.reward_token)
            .ok_or(agora_rewards::RewardError::PoolNotFound(pool_id))?;
        if !self.whitelisted_tokens.contains(&reward_token) {
            return Err(StakingError::TokenNotWhitelisted(reward_token));
        }

        let pending = calculator.calculate_pending_rewards(token_id, env.timestamp)?;
        self.check_breaker(pool_id, pending, env.timestamp)?;

        let inner_env = env.reenter_as(self.address);
        let amount = calculator.process_claim(&inner_env, token_id, env.caller)?;
        self.breaker.record(pool_id, amount, env.timestamp);
        tokens.transfer(reward_token, env.caller, amount)?;

        self.events.push(StakingEvent::RewardsClaimed {
            staker: env.caller,
            token_id,
            amount,
        });
        Ok(amount)
    }

    /// Unstake a token: settle rewards, return the NFT, notify governance
    pub fn unstake(
        &mut self,
        env: &Env,
        token_id: u64,
        nft: &mut dyn GovernanceNft,
        calculator: &mut RewardCalculator,
        governance: Option<&mut dyn GovernanceHook>,
        tokens: &mut dyn TokenTransfer,
    ) -> Result<u128, StakingError> {
        self.access.require_not_paused()?;

        let stake = self
            .stakes
            .get(&token_id)
            .ok_or(StakingError::StakeNotFound(token_id))?;
        if stake.owner != env.caller {
            return Err(StakingError::NotTokenOwner(token_id));
        }
        let pool_id = stake.pool_id;

        let governance = match governance {
            Some(hook) => {
                if self.probe_is_active(&*hook, env.caller)? {
                    return Err(StakingError::ActiveProposalBlocks);
                }
                Some(hook)
            }
            None => None,
        };

        // A delisted reward token must never trap the NFT: the exit always
        // goes through, only the payout is gated on the whitelist.
        let reward_token = calculator
            .get_pool(pool_id)
            .map(|p| p.reward_token)
            .ok_or(agora_rewards::RewardError::PoolNotFound(pool_id))?;
        let payout_open = self.whitelisted_tokens.contains(&reward_token);

        if payout_open {
            // Breaker check uses the projected payout so the settlement
            // below cannot land and then trip the cap.
            let pending = calculator.calculate_pending_rewards(token_id, env.timestamp)?;
            self.check_breaker(pool_id, pending, env.timestamp)?;
        }

        let inner_env = env.reenter_as(self.address);
        let outcome = calculator.process_unstake(&inner_env, token_id, env.caller)?;

        if payout_open {
            self.breaker.record(pool_id, outcome.final_reward, env.timestamp);
            if outcome.final_reward > 0 {
                tokens.transfer(reward_token, env.caller, outcome.final_reward)?;
            }
        } else if outcome.final_reward > 0 {
            warn!(
                staker = %env.caller,
                token_id,
                %reward_token,
                amount = outcome.final_reward,
                "reward token delisted, payout withheld"
            );
            self.events.push(StakingEvent::RewardWithheld {
                staker: env.caller,
                token_id,
                reward_token,
                amount: outcome.final_reward,
            });
        }
        nft.transfer(self.address, env.caller, token_id)?;

        self.stakes.remove(&token_id);
        let remaining = {
            let tokens = self.user_tokens.entry(env.caller).or_default();
            tokens.remove(&token_id);
            tokens.len() as u64
        };

        let reward_paid = if payout_open { outcome.final_reward } else { 0 };
        info!(staker = %env.caller, token_id, reward = reward_paid, "token unstaked");
        self.events.push(StakingEvent::Unstaked {
            staker: env.caller,
            token_id,
            reward_paid,
        });

        if let Some(hook) = governance {
            self.notify_isolated(hook, env.caller, remaining);
        }
        Ok(reward_paid)
    }

    // === Voting power ===

    /// Tiered multiplier in basis points, by currently staked count
    pub fn get_user_multiplier(&self, account: Address) -> u128 {
        let count = self.user_tokens.get(&account).map(|t| t.len()).unwrap_or(0);
        match count {
            0 => 10_000,
            1..=2 => 11_000,
            3..=4 => 12_500,
            5..=9 => 15_000,
            10..=19 => 17_500,
            _ => 20_000,
        }
    }

    /// Voting power of `account` at `now`: the purchase prices of its
    /// stakes whose vote lock has expired, scaled by the tier multiplier
    pub fn get_voting_power(&self, account: Address, now: i64) -> u128 {
        let Some(tokens) = self.user_tokens.get(&account) else {
            return 0;
        };
        let base: u128 = tokens
            .iter()
            .filter_map(|id| self.stakes.get(id))
            .filter(|s| s.vote_lock_expiry <= now)
            .map(|s| s.nft_price)
            .sum();
        base * self.get_user_multiplier(account) / BPS_DENOMINATOR
    }

    /// Total voting power across all stakers at `now`
    pub fn get_total_voting_power(&self, now: i64) -> u128 {
        self.user_tokens
            .keys()
            .map(|account| self.get_voting_power(*account, now))
            .sum()
    }

    // === Emergency pool recovery ===

    /// Pull everything not claimed and not reserved out of a pool and pay
    /// it to `recipient`; admin only. The calculator deactivates the pool.
    pub fn emergency_withdraw(
        &mut self,
        env: &Env,
        pool_id: u64,
        recipient: Address,
        calculator: &mut RewardCalculator,
        tokens: &mut dyn TokenTransfer,
    ) -> Result<u128, StakingError> {
        self.access.require_role(admin_role(), env.caller)?;

        let reward_token = calculator
            .get_pool(pool_id)
            .map(|p| p.reward_token)
            .ok_or(agora_rewards::RewardError::PoolNotFound(pool_id))?;
        // The calculator enforces its own admin gate on the same caller.
        let amount = calculator.emergency_withdraw(env, pool_id)?;
        tokens.transfer(reward_token, recipient, amount)?;
        Ok(amount)
    }

    // === Multi-sig gated administration ===

    /// Approve (and at threshold, apply) a threshold change
    pub fn set_multisig_threshold(
        &mut self,
        env: &Env,
        new_threshold: u32,
    ) -> Result<MultiSigOutcome, StakingError> {
        let action = Digest::of(&[b"set-threshold", &new_threshold.to_le_bytes()]);
        let outcome = self.approve_gated(env, action)?;
        if outcome == MultiSigOutcome::Ready {
            self.multisig.set_threshold(new_threshold)?;
            self.events.push(StakingEvent::ThresholdChanged {
                threshold: new_threshold,
            });
        }
        Ok(outcome)
    }

    /// Approve (and at threshold, apply) a per-pool daily withdrawal cap
    pub fn set_daily_withdrawal_limit(
        &mut self,
        env: &Env,
        pool_id: u64,
        limit: u128,
    ) -> Result<MultiSigOutcome, StakingError> {
        let action = Digest::of(&[
            b"set-daily-limit",
            &pool_id.to_le_bytes(),
            &limit.to_le_bytes(),
        ]);
        let outcome = self.approve_gated(env, action)?;
        if outcome == MultiSigOutcome::Ready {
            self.breaker.set_limit(pool_id, limit);
            self.events.push(StakingEvent::DailyLimitChanged { pool_id, limit });
        }
        Ok(outcome)
    }

    /// Approve (and at threshold, apply) a pause flag change
    pub fn set_paused(&mut self, env: &Env, paused: bool) -> Result<MultiSigOutcome, StakingError> {
        let action = Digest::of(&[b"set-paused", &[paused as u8]]);
        let outcome = self.approve_gated(env, action)?;
        if outcome == MultiSigOutcome::Ready {
            self.access.set_paused(paused);
            self.events.push(StakingEvent::PausedSet { paused });
        }
        Ok(outcome)
    }

    /// Approve a reward-token whitelist addition. At threshold the action
    /// enters the 2-day token timelock rather than taking effect.
    pub fn schedule_token_whitelist(
        &mut self,
        env: &Env,
        token: Address,
    ) -> Result<MultiSigOutcome, StakingError> {
        self.schedule_token_action(env, token, true)
    }

    /// Approve a reward-token removal; also timelocked
    pub fn schedule_token_delist(
        &mut self,
        env: &Env,
        token: Address,
    ) -> Result<MultiSigOutcome, StakingError> {
        self.schedule_token_action(env, token, false)
    }

    fn schedule_token_action(
        &mut self,
        env: &Env,
        token: Address,
        whitelist: bool,
    ) -> Result<MultiSigOutcome, StakingError> {
        let tag: &[u8] = if whitelist { b"whitelist-token" } else { b"delist-token" };
        let action = Digest::of(&[tag, token.as_bytes()]);
        let outcome = self.approve_gated(env, action)?;
        if outcome == MultiSigOutcome::Ready {
            self.token_actions.insert(
                token,
                TokenAction {
                    whitelist,
                    scheduled_at: env.timestamp,
                },
            );
            self.events.push(StakingEvent::TokenActionScheduled { token, whitelist });
        }
        Ok(outcome)
    }

    /// Execute a scheduled token action once its timelock has elapsed;
    /// admin only
    pub fn execute_token_action(&mut self, env: &Env, token: Address) -> Result<(), StakingError> {
        self.access.require_role(admin_role(), env.caller)?;
        let action = self
            .token_actions
            .get(&token)
            .copied()
            .ok_or(StakingError::NoScheduledAction(token))?;

        let remaining = action.scheduled_at + TOKEN_TIMELOCK_SECS - env.timestamp;
        if remaining > 0 {
            return Err(StakingError::TimelockNotElapsed { remaining });
        }

        self.token_actions.remove(&token);
        if action.whitelist {
            self.whitelisted_tokens.insert(token);
            self.events.push(StakingEvent::TokenWhitelisted { token });
        } else {
            self.whitelisted_tokens.remove(&token);
            self.events.push(StakingEvent::TokenDelisted { token });
        }
        Ok(())
    }

    fn approve_gated(&mut self, env: &Env, action: Digest) -> Result<MultiSigOutcome, StakingError> {
        self.access.require_role(admin_role(), env.caller)?;
        let outcome = self.multisig.approve(env.caller, action)?;
        let (approvals, threshold) = match outcome {
            MultiSigOutcome::Pending { approvals, threshold } => (approvals, threshold),
            MultiSigOutcome::Ready => (self.multisig.threshold(), self.multisig.threshold()),
        };
        self.events.push(StakingEvent::ActionApproved {
            action,
            approvals,
            threshold,
        });
        Ok(outcome)
    }

    // === Views ===

    /// Look up a stake
    pub fn get_stake(&self, token_id: u64) -> Option<&StakeInfo> {
        self.stakes.get(&token_id)
    }

    /// Tokens currently staked by `account`
    pub fn staked_tokens(&self, account: Address) -> Vec<u64> {
        self.user_tokens
            .get(&account)
            .map(|t| t.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Pending commitment for `account`, if any
    pub fn get_commitment(&self, account: Address) -> Option<&StakeCommitment> {
        self.commitments.get(&account)
    }

    /// Is this reward token currently whitelisted?
    pub fn is_token_whitelisted(&self, token: Address) -> bool {
        self.whitelisted_tokens.contains(&token)
    }

    /// Current multi-sig threshold
    pub fn multisig_threshold(&self) -> u32 {
        self.multisig.threshold()
    }

    /// Effective daily withdrawal cap for a pool
    pub fn daily_withdrawal_limit(&self, pool_id: u64) -> u128 {
        self.breaker.limit_for(pool_id)
    }

    /// Drain the event log (test/observability hook)
    pub fn take_events(&mut self) -> Vec<StakingEvent> {
        std::mem::take(&mut self.events)
    }

    // === Internals ===


    /// Query `is_proposal_active`, failing open (with an alert event) if
    /// the governance contract itself reverts.
    fn probe_is_active(
        &mut self,
        hook: &dyn GovernanceHook,
        account: Address,
    ) -> Result<bool, StakingError> {
        match hook.is_proposal_active(account) {
            Ok(active) => Ok(active),
            Err(err) => {
                warn!(%err, "governance proposal probe failed");
                self.events.push(StakingEvent::GovernanceProbeFailed {
                    reason: err.to_string(),
                });
                Ok(false)
            }
        }
    }

    /// Notify governance of a stake change; a reverting governance
    /// contract must never block staking itself.
    fn notify_isolated(&mut self, hook: &mut dyn GovernanceHook, account: Address, total: u64) {
        if let Err(err) = hook.notify_stake_update(account, total) {
            warn!(%err, "governance notification failed");
            self.events.push(StakingEvent::GovernanceNotificationFailed {
                reason: err.to_string(),
            });
        }
    }

    /// Breaker check that reports the trip through both an event and a
    /// typed error, for off-chain alerting plus caller decoding.
    fn check_breaker(&mut self, pool_id: u64, amount: u128, now: i64) -> Result<(), StakingError> {
        if let Err(trip) = self.breaker.check(pool_id, amount, now) {
            warn!(pool_id, attempted = trip.attempted, "withdrawal circuit breaker tripped");
            self.events.push(StakingEvent::CircuitBreakerTriggered {
                pool_id,
                attempted: trip.attempted,
                limit: trip.limit,
            });
            return Err(StakingError::WithdrawalLimitExceeded {
                pool_id,
                attempted: trip.attempted,
                limit: trip.limit,
            });
        }
        Ok(())
    }
}

impl VotingPowerSource for GovernanceStaking {
    fn voting_power(&self, account: Address, now: i64) -> u128 {
        self.get_voting_power(account, now)
    }

    fn total_voting_power(&self, now: i64) -> u128 {
        self.get_total_voting_power(now)
    }
}
