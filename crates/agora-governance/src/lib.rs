//! # Agora Governance
//!
//! Proposal lifecycle, voting, and execution dispatch.
//!
//! ## Lifecycle
//!
//! ```text
//! Pending -> Active -> Succeeded -> Executed
//!                   \           \-> Expired
//!                    \-> Failed
//! Active | Succeeded -> Cancelled (proposer or emergency role)
//! ```
//!
//! A proposal succeeds when, at `end_time`, total participation meets the
//! quorum (`total_votes >= snapshot_total * quorum_bps / 10000`, equality
//! counting as reached) and for-votes strictly outnumber against-votes.
//! Execution opens one day after voting ends and stays open for seven
//! days; a failed dispatch rolls the proposal back to `Succeeded` so it
//! can be retried inside the window.
//!
//! ## Snapshots
//!
//! Each proposal fixes a voter's power at first interaction (creation for
//! the proposer, first vote or batch pre-snapshot for everyone else) and
//! never overwrites it. Staking or unstaking after the snapshot cannot
//! move a vote already weighable on that proposal.

pub mod manager;
pub mod proposal;

pub use manager::{GovernanceEvent, ProposalManager, VoteRecord};
pub use proposal::{Proposal, ProposalState, VoteKind};

use agora_core::{AccessError, Selector};
use agora_registry::RegistryError;
use thiserror::Error;

/// Governance constants
pub mod constants {
    use agora_core::constants::{SECONDS_PER_DAY, SECONDS_PER_HOUR};

    /// Delay between voting end and the execution window opening
    pub const EXECUTION_DELAY_SECS: i64 = SECONDS_PER_DAY;

    /// Length of the execution window
    pub const EXECUTION_WINDOW_SECS: i64 = 7 * SECONDS_PER_DAY;

    /// Per-caller cooldown between proposal creations
    pub const CREATION_COOLDOWN_SECS: i64 = SECONDS_PER_HOUR;

    /// Concurrent active proposals allowed per DApp
    pub const MAX_ACTIVE_PER_DAPP: u32 = 5;

    /// Per-proposal cap on individual voter snapshots
    pub const MAX_SNAPSHOT_VOTERS: u32 = 1_000;

    /// Voters per batch pre-snapshot call
    pub const MAX_BATCH_SNAPSHOT: usize = 50;

    /// Action data length bounds, bytes
    pub const MIN_ACTION_DATA_LEN: usize = 4;
    pub const MAX_ACTION_DATA_LEN: usize = 10_000;

    /// Reported by `version()` for deployment-time compatibility pinning
    pub const GOVERNANCE_VERSION: &str = "agora-governance/1.0.0";
}

/// Governance errors
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ProposalError {
    /// Unknown proposal id
    #[error("proposal not found: {0}")]
    ProposalNotFound(u64),

    /// Action data outside [4, 10000] bytes
    #[error("action data of {len} bytes is outside the allowed range")]
    InvalidActionDataLength { len: usize },

    /// Leading selector is not whitelisted for the target DApp
    #[error("selector {0} is not whitelisted for this DApp")]
    SelectorNotWhitelisted(Selector),

    /// Proposer power below the DApp's configured threshold
    #[error("insufficient voting power: need {required}, have {actual}")]
    InsufficientVotingPower { required: u128, actual: u128 },

    /// Caller is still inside the creation cooldown
    #[error("proposal creation cooldown: {remaining}s remaining")]
    CreationCooldown { remaining: i64 },

    /// DApp already has the maximum number of active proposals
    #[error("DApp {dapp_id} already has {max} active proposals")]
    TooManyActiveProposals { dapp_id: u64, max: u32 },

    /// Quorum override outside [1, 10000] bp
    #[error("invalid quorum override: {bps} bps")]
    InvalidQuorum { bps: u32 },

    /// Duration override outside [1, 30] days
    #[error("invalid voting duration override: {secs}s")]
    InvalidVotingDuration { secs: u64 },

    /// Operation requires a different proposal state
    #[error("proposal is {state:?}, operation not permitted")]
    WrongState { state: proposal::ProposalState },

    /// Vote cast after the voting period closed
    #[error("voting period has ended")]
    VotingClosed,

    /// One vote per (proposal, voter)
    #[error("caller already voted on this proposal")]
    AlreadyVoted,

    /// Snapshotted power of zero carries no vote
    #[error("caller has no voting power")]
    NoVotingPower,

    /// Per-proposal snapshot cap reached
    #[error("snapshot cap of {max} voters reached")]
    SnapshotCapReached { max: u32 },

    /// Batch larger than MAX_BATCH_SNAPSHOT
    #[error("snapshot batch of {len} exceeds the maximum of {max}")]
    BatchTooLarge { len: usize, max: usize },

    /// Execution attempted before the post-voting delay elapsed
    #[error("execution window opens in {remaining}s")]
    ExecutionTooEarly { remaining: i64 },

    /// Execution attempted after the window closed
    #[error("execution window has closed")]
    ExecutionWindowClosed,

    /// Cancellation by someone other than the proposer or an emergency holder
    #[error("only the proposer or an emergency role holder may cancel")]
    NotProposerOrEmergency,

    /// Registry-side failure
    #[error(transparent)]
    Registry(#[from] RegistryError),

    /// Authorization failure
    #[error(transparent)]
    Access(#[from] AccessError),
}
