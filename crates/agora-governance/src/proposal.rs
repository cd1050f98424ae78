//! Proposal records and the decision predicate.

use agora_core::constants::BPS_DENOMINATOR;
use agora_core::{Address, Selector};
use serde::{Deserialize, Serialize};

/// Lifecycle state of a proposal
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProposalState {
    /// Created but voting has not opened (start time in the future)
    Pending,
    /// Voting is open
    Active,
    /// Voting ended with quorum and a for-majority
    Succeeded,
    /// Voting ended without quorum or without a for-majority
    Failed,
    /// Action dispatched to the target
    Executed,
    /// Succeeded but never executed inside the window
    Expired,
    /// Withdrawn by the proposer or an emergency holder
    Cancelled,
}

/// A vote direction
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum VoteKind {
    For,
    Against,
    Abstain,
}

/// One proposal, votes included.
///
/// Proposals are never deleted; terminal states remain as historical
/// records.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Proposal {
    /// Sequential id
    pub id: u64,

    /// Registry id of the target DApp
    pub dapp_id: u64,

    /// Account that created the proposal
    pub proposer: Address,

    /// Leading four bytes of the action data
    pub selector: Selector,

    /// Opaque payload dispatched to the target on execution
    pub action_data: Vec<u8>,

    /// Free-form description
    pub description: String,

    /// Voting opens (equal to creation time)
    pub start_time: i64,

    /// Voting closes
    pub end_time: i64,

    /// Execution window opens (one day after voting closes)
    pub execution_time: i64,

    /// Quorum for this proposal, basis points of the snapshot total
    pub quorum_bps: u32,

    /// Current lifecycle state
    pub state: ProposalState,

    /// Block height at creation
    pub snapshot_block: u64,

    /// Total voting power at creation; the quorum base
    pub snapshot_total_power: u128,

    pub for_votes: u128,
    pub against_votes: u128,
    pub abstain_votes: u128,
}

impl Proposal {
    /// All participation, abstentions included
    pub fn total_votes(&self) -> u128 {
        self.for_votes + self.against_votes + self.abstain_votes
    }

    /// Has participation met the quorum? Equality counts as reached.
    pub fn quorum_reached(&self) -> bool {
        let required = self.snapshot_total_power * self.quorum_bps as u128 / BPS_DENOMINATOR;
        self.total_votes() >= required
    }

    /// The decision predicate applied at `end_time`
    pub fn passed(&self) -> bool {
        self.quorum_reached() && self.for_votes > self.against_votes
    }

    /// Is voting open at `now`?
    pub fn voting_open(&self, now: i64) -> bool {
        self.state == ProposalState::Active && now >= self.start_time && now < self.end_time
    }
}
