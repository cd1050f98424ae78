//! # Agora Registry
//!
//! Canonical list of governable target contracts (DApps): per-target
//! governance parameters, whitelisted callable function selectors,
//! proposal statistics, and a two-day timelock for admin-privileged raw
//! calls.
//!
//! ## Roles
//!
//! | Role | May |
//! |------|-----|
//! | REGISTRAR_ROLE | register and deactivate DApps |
//! | CONFIG_ROLE | change per-DApp parameters and selector whitelists |
//! | GOVERNANCE_ROLE | record proposal lifecycle events, dispatch executions |
//! | ADMIN_ROLE | schedule/execute/cancel timelocked critical operations |
//!
//! Execution dispatch is failure-isolating: a reverting target is reported
//! through an event and a `false` return, never allowed to poison the
//! registry's own bookkeeping.

pub mod registry;
pub mod timelock;

pub use registry::{DApp, DAppConfig, DAppRegistry, RegistryEvent};
pub use timelock::{CriticalOperation, OperationState};

use agora_core::{AccessError, Address, Digest};
use thiserror::Error;

/// Registry constants
pub mod constants {
    use agora_core::constants::{SECONDS_PER_DAY, SECONDS_PER_HOUR};

    /// Per-registrar cooldown between registrations
    pub const REGISTRATION_COOLDOWN_SECS: i64 = SECONDS_PER_HOUR;

    /// Delay between scheduling and executing a critical operation
    pub const TIMELOCK_DELAY_SECS: i64 = 2 * SECONDS_PER_DAY;

    /// Quorum bounds, basis points
    pub const MIN_QUORUM_BPS: u32 = 100;
    pub const MAX_QUORUM_BPS: u32 = 10_000;

    /// Voting duration bounds, seconds
    pub const MIN_VOTING_DURATION_SECS: u64 = SECONDS_PER_DAY as u64;
    pub const MAX_VOTING_DURATION_SECS: u64 = 30 * SECONDS_PER_DAY as u64;

    /// Defaults applied at registration
    pub const DEFAULT_QUORUM_BPS: u32 = 1_000;
    pub const DEFAULT_VOTING_DURATION_SECS: u64 = 3 * SECONDS_PER_DAY as u64;
    pub const DEFAULT_PROPOSAL_THRESHOLD: u128 = 1;

    /// Reported by `version()` for deployment-time compatibility pinning
    pub const REGISTRY_VERSION: &str = "agora-registry/1.0.0";
}

/// Registry errors
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// Zero contract address
    #[error("zero address is not a valid DApp target")]
    ZeroAddress,

    /// Name or description empty
    #[error("DApp name must be non-empty")]
    EmptyName,

    /// Contract address already registered
    #[error("DApp already registered at {0}")]
    DuplicateDApp(Address),

    /// Registrar is still inside the cooldown window
    #[error("registration cooldown: {remaining}s remaining")]
    RegistrationCooldown { remaining: i64 },

    /// Interface probe failed at registration
    #[error("target does not implement the governance interface")]
    InterfaceNotSupported,

    /// Unknown DApp id
    #[error("DApp not found: {0}")]
    DAppNotFound(u64),

    /// DApp is deactivated
    #[error("DApp {0} is inactive")]
    DAppInactive(u64),

    /// Quorum outside [MIN_QUORUM_BPS, MAX_QUORUM_BPS]
    #[error("invalid quorum: {bps} bps")]
    InvalidQuorum { bps: u32 },

    /// Voting duration outside [1, 30] days
    #[error("invalid voting duration: {secs}s")]
    InvalidVotingDuration { secs: u64 },

    /// No critical operation scheduled under this key
    #[error("critical operation not found: {0}")]
    OperationNotFound(Digest),

    /// Timelock delay has not elapsed
    #[error("timelock not elapsed: {remaining}s remaining")]
    TimelockNotElapsed { remaining: i64 },

    /// Operation already executed or cancelled
    #[error("critical operation is not pending")]
    OperationNotPending,

    /// The raw call itself failed; the operation stays executable
    #[error("critical call failed: {0}")]
    CriticalCallFailed(String),

    /// Authorization failure
    #[error(transparent)]
    Access(#[from] AccessError),
}
