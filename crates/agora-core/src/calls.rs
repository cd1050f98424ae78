//! Cross-contract call boundaries.
//!
//! Every external dependency of a core contract is modeled as a
//! capability trait passed by reference into the operation that needs it.
//! A downstream failure surfaces as a typed [`CallError`]; boundaries that
//! must not let a misbehaving dependency block their own bookkeeping
//! (registry execution, governance notification) convert the error into an
//! event plus a boolean outcome instead of propagating it.

use crate::types::Address;
use thiserror::Error;

/// Failure of an external contract call
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum CallError {
    /// The callee rejected the call
    #[error("call reverted: {0}")]
    Reverted(String),

    /// The callee returned data the caller could not interpret
    #[error("bad response from callee: {0}")]
    BadResponse(String),

    /// No contract lives at the target address
    #[error("no contract at target address")]
    NotAContract,
}

/// Surface every registered DApp must expose to governance.
///
/// `governance_parameters` doubles as the registration-time interface
/// probe: a successful call is taken as evidence of conformance. This is
/// best-effort only; a conforming but misbehaving target still passes.
pub trait GovernanceTarget {
    /// Execute an approved governance action
    fn execute_governance_action(
        &mut self,
        proposal_id: u64,
        data: &[u8],
    ) -> Result<bool, CallError>;

    /// Report the target's governance parameters (opaque encoding)
    fn governance_parameters(&self) -> Result<Vec<u8>, CallError>;
}

/// Raw call dispatch for timelocked critical operations
pub trait RawCall {
    /// Forward an opaque payload to the target
    fn raw_call(&mut self, data: &[u8]) -> Result<Vec<u8>, CallError>;
}

/// The NFT collection whose tokens are staked for voting power
pub trait GovernanceNft {
    /// Current owner of a token
    fn owner_of(&self, token_id: u64) -> Result<Address, CallError>;

    /// Original purchase price and payment token
    fn purchase_price(&self, token_id: u64) -> Result<(u128, Address), CallError>;

    /// Move a token between accounts (custody transfer)
    fn transfer(&mut self, from: Address, to: Address, token_id: u64) -> Result<(), CallError>;
}

/// Governance surface consumed by the staking contract
pub trait GovernanceHook {
    /// Inform governance that `account` now has `total_staked` tokens staked
    fn notify_stake_update(&mut self, account: Address, total_staked: u64)
        -> Result<(), CallError>;

    /// Is `account` tied to a currently open proposal?
    fn is_proposal_active(&self, account: Address) -> Result<bool, CallError>;

    /// Is any proposal currently open?
    fn has_active_proposals(&self) -> Result<bool, CallError>;

    /// Implementation version string, used for compatibility pinning
    fn version(&self) -> Result<String, CallError>;
}

/// Voting power oracle implemented by the staking contract
pub trait VotingPowerSource {
    /// Voting power of `account` at `now` (vote-locked tokens excluded)
    fn voting_power(&self, account: Address, now: i64) -> u128;

    /// Total voting power across all stakers at `now`
    fn total_voting_power(&self, now: i64) -> u128;
}

/// Reward-token ledger used for payouts
pub trait TokenTransfer {
    /// Transfer `amount` of `token` to `recipient`
    fn transfer(
        &mut self,
        token: Address,
        recipient: Address,
        amount: u128,
    ) -> Result<(), CallError>;
}
