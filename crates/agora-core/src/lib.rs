//! # Agora Core
//!
//! Shared foundation for the Agora governance engine: addresses and
//! content-hash identifiers, the deterministic execution environment,
//! role-based access control, and the capability traits that model every
//! cross-contract call boundary.
//!
//! ## Execution model
//!
//! Each contract in the workspace is a sequential state machine. An
//! operation receives an [`Env`] describing the ambient transaction
//! (caller, timestamp, block number), validates authorization and inputs,
//! and either applies its full effect or returns an error with state
//! untouched. There is no interleaving within a call; "concurrency" is
//! competing callers ordered by whoever drives the engine.

pub mod access;
pub mod calls;
pub mod env;
pub mod types;

pub use access::{AccessControlState, AccessError, RoleId};
pub use calls::{
    CallError, GovernanceHook, GovernanceNft, GovernanceTarget, RawCall, TokenTransfer,
    VotingPowerSource,
};
pub use env::Env;
pub use types::{Address, Digest, Selector};

/// Shared protocol constants
pub mod constants {
    /// Basis-point denominator: 10000 = 100%
    pub const BPS_DENOMINATOR: u128 = 10_000;

    /// 18-decimal fixed-point precision for intermediate reward math
    pub const PRECISION: u128 = 1_000_000_000_000_000_000;

    /// Seconds in one hour
    pub const SECONDS_PER_HOUR: i64 = 3_600;

    /// Seconds in one day
    pub const SECONDS_PER_DAY: i64 = 86_400;
}
