//! # Agora Staking
//!
//! Custody of staked governance NFTs and the operational safety rails
//! around them.
//!
//! ## Stake protocol
//!
//! Staking is a two-phase commit-reveal: the holder first publishes
//! `BLAKE3(sender || token || pool || nonce)` via `commit_stake`, then at
//! least [`constants::MIN_COMMIT_BLOCKS`] blocks later reveals the
//! parameters via `stake`. An ordering attacker cannot front-run the
//! choice of pool because the parameters are hidden until the reveal.
//!
//! ## Safety rails
//!
//! | Rail | Mechanism |
//! |------|-----------|
//! | Daily drain cap | per-pool rolling withdrawal window, hard stop |
//! | Admin ops | multi-sig approval gate with mutable threshold |
//! | Reward tokens | multi-sig approval plus a 2-day timelock |
//! | Dependency swap | `version()` equality pin at bind time |
//!
//! Governance notification is fail-open by design: a reverting governance
//! contract must never block staking itself. Failures are surfaced as
//! events for off-chain alerting.

pub mod breaker;
pub mod multisig;
pub mod staking;

pub use breaker::WithdrawalBreaker;
pub use multisig::{MultiSigGate, MultiSigOutcome};
pub use staking::{stake_commitment, GovernanceStaking, StakeCommitment, StakeInfo, StakingEvent};

use agora_core::{AccessError, Address, CallError};
use agora_rewards::RewardError;
use thiserror::Error;

/// Staking constants
pub mod constants {
    use agora_core::constants::{PRECISION, SECONDS_PER_DAY};

    /// Blocks that must pass between commit and reveal
    pub const MIN_COMMIT_BLOCKS: u64 = 3;

    /// Per-user cap on concurrently staked tokens
    pub const MAX_STAKES_PER_USER: usize = 100;

    /// Vote lock applied to every fresh stake
    pub const BASE_VOTE_LOCK_SECS: i64 = 3 * SECONDS_PER_DAY;

    /// Vote lock applied while governance reports open proposals
    pub const EXTENDED_VOTE_LOCK_SECS: i64 = 6 * SECONDS_PER_DAY;

    /// Rolling window for the withdrawal circuit breaker
    pub const WITHDRAWAL_PERIOD_SECS: i64 = SECONDS_PER_DAY;

    /// Default per-pool daily withdrawal cap
    pub const DEFAULT_DAILY_WITHDRAWAL_LIMIT: u128 = 1_000 * PRECISION;

    /// Delay between token whitelist approval and effect
    pub const TOKEN_TIMELOCK_SECS: i64 = 2 * SECONDS_PER_DAY;

    /// Reported by `version()` for deployment-time compatibility pinning
    pub const STAKING_VERSION: &str = "agora-staking/1.0.0";
}

/// Multi-sig gate errors
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum MultiSigError {
    /// Same admin approving the same pending action twice
    #[error("caller already approved this action")]
    AlreadyApproved,

    /// Threshold of zero would make the gate a no-op
    #[error("multi-sig threshold must be at least 1")]
    ZeroThreshold,
}

/// Staking errors
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum StakingError {
    /// Reveal without a prior commitment
    #[error("no stake commitment for caller")]
    NoCommitment,

    /// Reveal inside the minimum block delay
    #[error("commitment too recent: {blocks_remaining} more blocks required")]
    CommitTooRecent { blocks_remaining: u64 },

    /// Revealed parameters do not hash to the commitment
    #[error("revealed parameters do not match the commitment")]
    CommitmentMismatch,

    /// Caller does not own the token
    #[error("caller does not own token {0}")]
    NotTokenOwner(u64),

    /// Token is already in custody
    #[error("token {0} is already staked")]
    TokenAlreadyStaked(u64),

    /// Per-user stake cap reached
    #[error("stake limit reached ({max} tokens)")]
    StakeLimitReached { max: usize },

    /// No stake record for this token
    #[error("no stake found for token {0}")]
    StakeNotFound(u64),

    /// NFT reports a zero purchase price
    #[error("token {0} has zero purchase price")]
    ZeroPurchasePrice(u64),

    /// Caller is tied to an open proposal
    #[error("an active governance proposal blocks this operation")]
    ActiveProposalBlocks,

    /// Circuit breaker tripped
    #[error("daily withdrawal limit exceeded for pool {pool_id}: attempted {attempted}, limit {limit}")]
    WithdrawalLimitExceeded {
        pool_id: u64,
        attempted: u128,
        limit: u128,
    },

    /// Stake attempted before the calculator was bound
    #[error("reward calculator is not bound")]
    CalculatorNotBound,

    /// Dependency version does not match the pinned expectation
    #[error("version mismatch: expected {expected}, got {actual}")]
    VersionMismatch { expected: String, actual: String },

    /// Pool pays in a token that is not whitelisted
    #[error("reward token {0} is not whitelisted")]
    TokenNotWhitelisted(Address),

    /// No scheduled whitelist/delist action for this token
    #[error("no scheduled token action for {0}")]
    NoScheduledAction(Address),

    /// Token action executed before its timelock elapsed
    #[error("token timelock not elapsed: {remaining}s remaining")]
    TimelockNotElapsed { remaining: i64 },

    /// Multi-sig gate failure
    #[error(transparent)]
    MultiSig(#[from] MultiSigError),

    /// Reward engine failure
    #[error(transparent)]
    Reward(#[from] RewardError),

    /// Unrecoverable external call failure
    #[error(transparent)]
    Call(#[from] CallError),

    /// Authorization failure
    #[error(transparent)]
    Access(#[from] AccessError),
}
