//! The proposal manager state machine.
//!
//! Registry bookkeeping (proposal counters, activity timestamps, live
//! active-proposal counts) is performed under the manager's own identity,
//! which holds the registry's governance role at deployment.

use crate::constants::*;
use crate::proposal::{Proposal, ProposalState, VoteKind};
use crate::ProposalError;
use agora_core::access::emergency_role;
use agora_core::{
    AccessControlState, Address, CallError, Env, GovernanceHook, GovernanceTarget, RoleId,
    Selector, VotingPowerSource,
};
use agora_registry::constants::{
    MAX_QUORUM_BPS, MAX_VOTING_DURATION_SECS, MIN_VOTING_DURATION_SECS,
};
use agora_registry::DAppRegistry;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use tracing::{info, warn};

/// One account's vote on one proposal
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteRecord {
    pub kind: VoteKind,
    /// Snapshotted power the vote was weighed with
    pub weight: u128,
    pub cast_at: i64,
}

/// Observable governance events
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum GovernanceEvent {
    ProposalCreated {
        proposal_id: u64,
        dapp_id: u64,
        proposer: Address,
        end_time: i64,
    },
    SnapshotTaken {
        proposal_id: u64,
        voter: Address,
        power: u128,
    },
    VoteCast {
        proposal_id: u64,
        voter: Address,
        kind: VoteKind,
        weight: u128,
    },
    ProposalDecided {
        proposal_id: u64,
        succeeded: bool,
    },
    ProposalExecuted {
        proposal_id: u64,
    },
    ExecutionFailed {
        proposal_id: u64,
    },
    ProposalExpired {
        proposal_id: u64,
    },
    ProposalCancelled {
        proposal_id: u64,
        by: Address,
    },
    StakeUpdateRecorded {
        account: Address,
        total_staked: u64,
    },
}

/// Proposal lifecycle manager
pub struct ProposalManager {
    /// The manager's own address: the caller it presents to the registry
    address: Address,
    access: AccessControlState,
    proposals: HashMap<u64, Proposal>,
    next_id: u64,
    /// Write-once voting-power snapshots per (proposal, voter)
    snapshots: HashMap<(u64, Address), u128>,
    snapshot_counts: HashMap<u64, u32>,
    votes: HashMap<(u64, Address), VoteRecord>,
    last_creation: HashMap<Address, i64>,
    active_by_dapp: HashMap<u64, u32>,
    /// Proposals currently open for voting (stored-state view)
    open_ids: BTreeSet<u64>,
    /// Last stake totals reported by the staking contract
    stake_totals: HashMap<Address, u64>,
    events: Vec<GovernanceEvent>,
}

impl ProposalManager {
    /// Create a manager at `address` with `deployer` as admin
    pub fn new(address: Address, deployer: Address) -> Self {
        Self {
            address,
            access: AccessControlState::new(deployer),
            proposals: HashMap::new(),
            next_id: 1,
            snapshots: HashMap::new(),
            snapshot_counts: HashMap::new(),
            votes: HashMap::new(),
            last_creation: HashMap::new(),
            active_by_dapp: HashMap::new(),
            open_ids: BTreeSet::new(),
            stake_totals: HashMap::new(),
            events: Vec::new(),
        }
    }

    /// The manager's own address
    pub fn address(&self) -> Address {
        self.address
    }

    /// Grant a role; admin only
    pub fn grant_role(
        &mut self,
        env: &Env,
        role: RoleId,
        account: Address,
    ) -> Result<(), ProposalError> {
        self.access.grant_role(env.caller, role, account)?;
        Ok(())
    }

    // === Proposal creation ===

    /// Create a proposal against a registered DApp.
    ///
    /// Voting opens immediately and runs for the DApp's configured
    /// duration unless overridden. The proposer's power and the total
    /// power are snapshotted here.
    #[allow(clippy::too_many_arguments)]
    pub fn create_proposal(
        &mut self,
        env: &Env,
        registry: &mut DAppRegistry,
        power: &dyn VotingPowerSource,
        dapp_id: u64,
        action_data: Vec<u8>,
        description: String,
        duration_override: Option<u64>,
        quorum_override: Option<u32>,
    ) -> Result<u64, ProposalError> {
        self.access.require_not_paused()?;

        let dapp = registry
            .get_dapp(dapp_id)
            .ok_or(agora_registry::RegistryError::DAppNotFound(dapp_id))?;
        if !dapp.active {
            return Err(agora_registry::RegistryError::DAppInactive(dapp_id).into());
        }

        let len = action_data.len();
        if !(MIN_ACTION_DATA_LEN..=MAX_ACTION_DATA_LEN).contains(&len) {
            return Err(ProposalError::InvalidActionDataLength { len });
        }
        let selector = Selector::of(&action_data)
            .ok_or(ProposalError::InvalidActionDataLength { len })?;
        if !registry.is_function_whitelisted(dapp_id, selector) {
            return Err(ProposalError::SelectorNotWhitelisted(selector));
        }

        let config = registry
            .get_config(dapp_id)
            .cloned()
            .unwrap_or_default();
        let proposer_power = power.voting_power(env.caller, env.timestamp);
        if proposer_power < config.min_proposal_threshold {
            return Err(ProposalError::InsufficientVotingPower {
                required: config.min_proposal_threshold,
                actual: proposer_power,
            });
        }

        if let Some(last) = self.last_creation.get(&env.caller) {
            let remaining = last + CREATION_COOLDOWN_SECS - env.timestamp;
            if remaining > 0 {
                return Err(ProposalError::CreationCooldown { remaining });
            }
        }

        let active = self.active_by_dapp.get(&dapp_id).copied().unwrap_or(0);
        if active >= MAX_ACTIVE_PER_DAPP {
            return Err(ProposalError::TooManyActiveProposals {
                dapp_id,
                max: MAX_ACTIVE_PER_DAPP,
            });
        }

        let duration = match duration_override {
            Some(secs) => {
                if !(MIN_VOTING_DURATION_SECS..=MAX_VOTING_DURATION_SECS).contains(&secs) {
                    return Err(ProposalError::InvalidVotingDuration { secs });
                }
                secs
            }
            None => config.default_voting_duration,
        };
        let quorum_bps = match quorum_override {
            Some(bps) => {
                if bps == 0 || bps > MAX_QUORUM_BPS {
                    return Err(ProposalError::InvalidQuorum { bps });
                }
                bps
            }
            None => config.default_quorum_bps,
        };

        let proposal_id = self.next_id;
        let start_time = env.timestamp;
        let end_time = start_time + duration as i64;
        let execution_time = end_time + EXECUTION_DELAY_SECS;

        // All checks passed; mutate, then record in the registry under
        // the manager's own identity.
        self.next_id += 1;
        self.proposals.insert(
            proposal_id,
            Proposal {
                id: proposal_id,
                dapp_id,
                proposer: env.caller,
                selector,
                action_data,
                description,
                start_time,
                end_time,
                execution_time,
                quorum_bps,
                state: ProposalState::Active,
                snapshot_block: env.block_number,
                snapshot_total_power: power.total_voting_power(env.timestamp),
                for_votes: 0,
                against_votes: 0,
                abstain_votes: 0,
            },
        );
        self.snapshots.insert((proposal_id, env.caller), proposer_power);
        self.snapshot_counts.insert(proposal_id, 1);
        self.last_creation.insert(env.caller, env.timestamp);
        self.open_ids.insert(proposal_id);
        let new_active = active + 1;
        self.active_by_dapp.insert(dapp_id, new_active);

        let inner_env = env.reenter_as(self.address);
        registry.increment_proposal_count(&inner_env, dapp_id)?;
        registry.update_activity(&inner_env, dapp_id)?;
        registry.update_active_proposals(&inner_env, dapp_id, new_active)?;

        info!(proposal_id, dapp_id, proposer = %env.caller, "proposal created");
        self.events.push(GovernanceEvent::ProposalCreated {
            proposal_id,
            dapp_id,
            proposer: env.caller,
            end_time,
        });
        self.events.push(GovernanceEvent::SnapshotTaken {
            proposal_id,
            voter: env.caller,
            power: proposer_power,
        });
        Ok(proposal_id)
    }

    // === Voting ===

    /// Cast a vote. The voter's power is snapshotted on first interaction
    /// and reused unchanged afterwards.
    pub fn cast_vote(
        &mut self,
        env: &Env,
        proposal_id: u64,
        kind: VoteKind,
        power: &dyn VotingPowerSource,
    ) -> Result<(), ProposalError> {
        self.access.require_not_paused()?;

        let proposal = self
            .proposals
            .get(&proposal_id)
            .ok_or(ProposalError::ProposalNotFound(proposal_id))?;
        if proposal.state != ProposalState::Active {
            return Err(ProposalError::WrongState {
                state: proposal.state,
            });
        }
        if !proposal.voting_open(env.timestamp) {
            return Err(ProposalError::VotingClosed);
        }
        if self.votes.contains_key(&(proposal_id, env.caller)) {
            return Err(ProposalError::AlreadyVoted);
        }

        let weight = self.snapshot_power(env, proposal_id, env.caller, power)?;
        if weight == 0 {
            return Err(ProposalError::NoVotingPower);
        }

        let proposal = self
            .proposals
            .get_mut(&proposal_id)
            .ok_or(ProposalError::ProposalNotFound(proposal_id))?;
        match kind {
            VoteKind::For => proposal.for_votes += weight,
            VoteKind::Against => proposal.against_votes += weight,
            VoteKind::Abstain => proposal.abstain_votes += weight,
        }
        self.votes.insert(
            (proposal_id, env.caller),
            VoteRecord {
                kind,
                weight,
                cast_at: env.timestamp,
            },
        );

        self.events.push(GovernanceEvent::VoteCast {
            proposal_id,
            voter: env.caller,
            kind,
            weight,
        });
        Ok(())
    }

    /// Pre-snapshot a batch of voters for a proposal. Existing snapshots
    /// are left untouched (first-snapshot-wins); the batch fails as a
    /// whole if it would cross the per-proposal snapshot cap.
    pub fn snapshot_voters(
        &mut self,
        env: &Env,
        proposal_id: u64,
        voters: &[Address],
        power: &dyn VotingPowerSource,
    ) -> Result<u32, ProposalError> {
        self.access.require_not_paused()?;
        if voters.len() > MAX_BATCH_SNAPSHOT {
            return Err(ProposalError::BatchTooLarge {
                len: voters.len(),
                max: MAX_BATCH_SNAPSHOT,
            });
        }

        let proposal = self
            .proposals
            .get(&proposal_id)
            .ok_or(ProposalError::ProposalNotFound(proposal_id))?;
        if proposal.state != ProposalState::Active {
            return Err(ProposalError::WrongState {
                state: proposal.state,
            });
        }
        if !proposal.voting_open(env.timestamp) {
            return Err(ProposalError::VotingClosed);
        }

        let fresh: Vec<Address> = voters
            .iter()
            .filter(|v| !self.snapshots.contains_key(&(proposal_id, **v)))
            .copied()
            .collect();
        let count = self.snapshot_counts.get(&proposal_id).copied().unwrap_or(0);
        if count + fresh.len() as u32 > MAX_SNAPSHOT_VOTERS {
            return Err(ProposalError::SnapshotCapReached {
                max: MAX_SNAPSHOT_VOTERS,
            });
        }

        for voter in &fresh {
            self.snapshot_power(env, proposal_id, *voter, power)?;
        }
        Ok(fresh.len() as u32)
    }

    // === Lifecycle transitions ===

    /// Advance a proposal past any due time-based transition and return
    /// the resulting state.
    pub fn update_proposal_state(
        &mut self,
        env: &Env,
        proposal_id: u64,
        registry: &mut DAppRegistry,
    ) -> Result<ProposalState, ProposalError> {
        self.refresh_state(env, proposal_id, registry)
    }

    /// Execute a succeeded proposal inside its execution window.
    ///
    /// Returns the target's success flag. The state is set to `Executed`
    /// before dispatch and rolled back to `Succeeded` when the dispatch
    /// reports failure, so execution can be retried inside the window.
    pub fn execute_proposal(
        &mut self,
        env: &Env,
        proposal_id: u64,
        registry: &mut DAppRegistry,
        target: &mut dyn GovernanceTarget,
    ) -> Result<bool, ProposalError> {
        self.access.require_not_paused()?;

        let state = self.refresh_state(env, proposal_id, registry)?;
        if state == ProposalState::Expired {
            return Err(ProposalError::ExecutionWindowClosed);
        }
        if state != ProposalState::Succeeded {
            return Err(ProposalError::WrongState { state });
        }

        let (dapp_id, execution_time, action_data) = {
            let proposal = self
                .proposals
                .get(&proposal_id)
                .ok_or(ProposalError::ProposalNotFound(proposal_id))?;
            (
                proposal.dapp_id,
                proposal.execution_time,
                proposal.action_data.clone(),
            )
        };
        let remaining = execution_time - env.timestamp;
        if remaining > 0 {
            return Err(ProposalError::ExecutionTooEarly { remaining });
        }

        self.set_state(proposal_id, ProposalState::Executed);

        let inner_env = env.reenter_as(self.address);
        let dispatched =
            registry.execute_on_dapp(&inner_env, dapp_id, proposal_id, &action_data, target);

        match dispatched {
            Ok(true) => {
                registry.update_proposal_stats(&inner_env, dapp_id, true)?;
                info!(proposal_id, dapp_id, "proposal executed");
                self.events.push(GovernanceEvent::ProposalExecuted { proposal_id });
                Ok(true)
            }
            Ok(false) => {
                // Compensating transition: the dispatch failed, so the
                // proposal returns to Succeeded and stays retryable.
                self.set_state(proposal_id, ProposalState::Succeeded);
                warn!(proposal_id, dapp_id, "execution dispatch failed, rolled back");
                self.events.push(GovernanceEvent::ExecutionFailed { proposal_id });
                Ok(false)
            }
            Err(err) => {
                self.set_state(proposal_id, ProposalState::Succeeded);
                Err(err.into())
            }
        }
    }

    /// Cancel an active or succeeded proposal. Only the proposer or an
    /// emergency-role holder may cancel.
    pub fn cancel_proposal(
        &mut self,
        env: &Env,
        proposal_id: u64,
        registry: &mut DAppRegistry,
    ) -> Result<(), ProposalError> {
        let proposal = self
            .proposals
            .get(&proposal_id)
            .ok_or(ProposalError::ProposalNotFound(proposal_id))?;
        if proposal.proposer != env.caller
            && !self.access.has_role(emergency_role(), env.caller)
        {
            return Err(ProposalError::NotProposerOrEmergency);
        }
        if !matches!(
            proposal.state,
            ProposalState::Active | ProposalState::Succeeded
        ) {
            return Err(ProposalError::WrongState {
                state: proposal.state,
            });
        }

        let was_active = proposal.state == ProposalState::Active;
        let dapp_id = proposal.dapp_id;
        self.set_state(proposal_id, ProposalState::Cancelled);
        if was_active {
            self.release_active_slot(env, dapp_id, registry)?;
        }

        info!(proposal_id, by = %env.caller, "proposal cancelled");
        self.events.push(GovernanceEvent::ProposalCancelled {
            proposal_id,
            by: env.caller,
        });
        Ok(())
    }

    // === Views ===

    /// Look up a proposal
    pub fn get_proposal(&self, proposal_id: u64) -> Option<&Proposal> {
        self.proposals.get(&proposal_id)
    }

    /// Look up one account's vote on a proposal
    pub fn get_vote(&self, proposal_id: u64, voter: Address) -> Option<&VoteRecord> {
        self.votes.get(&(proposal_id, voter))
    }

    /// Snapshotted power of `voter` on `proposal_id`, if taken
    pub fn get_snapshot(&self, proposal_id: u64, voter: Address) -> Option<u128> {
        self.snapshots.get(&(proposal_id, voter)).copied()
    }

    /// Proposals ever created
    pub fn proposal_count(&self) -> u64 {
        self.next_id - 1
    }

    /// Last stake total reported for an account
    pub fn stake_total(&self, account: Address) -> u64 {
        self.stake_totals.get(&account).copied().unwrap_or(0)
    }

    /// Drain the event log (test/observability hook)
    pub fn take_events(&mut self) -> Vec<GovernanceEvent> {
        std::mem::take(&mut self.events)
    }

    // === Internals ===

    /// Take a write-once snapshot, enforcing the per-proposal cap.
    /// Returns the effective (possibly pre-existing) snapshot value.
    fn snapshot_power(
        &mut self,
        env: &Env,
        proposal_id: u64,
        voter: Address,
        power: &dyn VotingPowerSource,
    ) -> Result<u128, ProposalError> {
        if let Some(existing) = self.snapshots.get(&(proposal_id, voter)) {
            return Ok(*existing);
        }
        let count = self.snapshot_counts.entry(proposal_id).or_insert(0);
        if *count >= MAX_SNAPSHOT_VOTERS {
            return Err(ProposalError::SnapshotCapReached {
                max: MAX_SNAPSHOT_VOTERS,
            });
        }
        *count += 1;

        let value = power.voting_power(voter, env.timestamp);
        self.snapshots.insert((proposal_id, voter), value);
        self.events.push(GovernanceEvent::SnapshotTaken {
            proposal_id,
            voter,
            power: value,
        });
        Ok(value)
    }

    /// Apply any due time-based transition
    fn refresh_state(
        &mut self,
        env: &Env,
        proposal_id: u64,
        registry: &mut DAppRegistry,
    ) -> Result<ProposalState, ProposalError> {
        let (state, end_time, execution_time, dapp_id, passed) = {
            let proposal = self
                .proposals
                .get(&proposal_id)
                .ok_or(ProposalError::ProposalNotFound(proposal_id))?;
            (
                proposal.state,
                proposal.end_time,
                proposal.execution_time,
                proposal.dapp_id,
                proposal.passed(),
            )
        };

        match state {
            ProposalState::Pending if env.timestamp >= self.proposals[&proposal_id].start_time => {
                self.set_state(proposal_id, ProposalState::Active);
                // Re-enter to pick up a possibly-due end transition too.
                self.refresh_state(env, proposal_id, registry)
            }
            ProposalState::Active if env.timestamp >= end_time => {
                let next = if passed {
                    ProposalState::Succeeded
                } else {
                    ProposalState::Failed
                };
                self.set_state(proposal_id, next);
                self.release_active_slot(env, dapp_id, registry)?;
                if next == ProposalState::Failed {
                    let inner_env = env.reenter_as(self.address);
                    registry.update_proposal_stats(&inner_env, dapp_id, false)?;
                }
                self.events.push(GovernanceEvent::ProposalDecided {
                    proposal_id,
                    succeeded: next == ProposalState::Succeeded,
                });
                // A succeeded proposal may already be past its window.
                self.refresh_state(env, proposal_id, registry)
            }
            ProposalState::Succeeded if env.timestamp > execution_time + EXECUTION_WINDOW_SECS => {
                self.set_state(proposal_id, ProposalState::Expired);
                let inner_env = env.reenter_as(self.address);
                registry.update_proposal_stats(&inner_env, dapp_id, false)?;
                self.events.push(GovernanceEvent::ProposalExpired { proposal_id });
                Ok(ProposalState::Expired)
            }
            current => Ok(current),
        }
    }

    fn set_state(&mut self, proposal_id: u64, state: ProposalState) {
        if let Some(proposal) = self.proposals.get_mut(&proposal_id) {
            proposal.state = state;
            if matches!(state, ProposalState::Pending | ProposalState::Active) {
                self.open_ids.insert(proposal_id);
            } else {
                self.open_ids.remove(&proposal_id);
            }
        }
    }

    /// Free the proposal's slot in the per-DApp active count, mirroring
    /// the new count into the registry.
    fn release_active_slot(
        &mut self,
        env: &Env,
        dapp_id: u64,
        registry: &mut DAppRegistry,
    ) -> Result<(), ProposalError> {
        let count = self.active_by_dapp.entry(dapp_id).or_insert(0);
        *count = count.saturating_sub(1);
        let new_count = *count;
        let inner_env = env.reenter_as(self.address);
        registry.update_active_proposals(&inner_env, dapp_id, new_count)?;
        Ok(())
    }
}

impl GovernanceHook for ProposalManager {
    fn notify_stake_update(
        &mut self,
        account: Address,
        total_staked: u64,
    ) -> Result<(), CallError> {
        self.stake_totals.insert(account, total_staked);
        self.events.push(GovernanceEvent::StakeUpdateRecorded {
            account,
            total_staked,
        });
        Ok(())
    }

    fn is_proposal_active(&self, account: Address) -> Result<bool, CallError> {
        let involved = self.open_ids.iter().any(|id| {
            self.proposals
                .get(id)
                .map(|p| p.proposer == account)
                .unwrap_or(false)
                || self.snapshots.contains_key(&(*id, account))
        });
        Ok(involved)
    }

    fn has_active_proposals(&self) -> Result<bool, CallError> {
        Ok(!self.open_ids.is_empty())
    }

    fn version(&self) -> Result<String, CallError> {
        Ok(GOVERNANCE_VERSION.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use agora_core::access::{config_role, governance_role, registrar_role};
    use agora_core::constants::{SECONDS_PER_DAY, SECONDS_PER_HOUR};

    const DAY: i64 = SECONDS_PER_DAY;

    struct MockPower {
        powers: HashMap<Address, u128>,
        total: u128,
    }

    impl MockPower {
        fn new(total: u128) -> Self {
            Self {
                powers: HashMap::new(),
                total,
            }
        }

        fn set(&mut self, account: Address, power: u128) {
            self.powers.insert(account, power);
        }
    }

    impl VotingPowerSource for MockPower {
        fn voting_power(&self, account: Address, _now: i64) -> u128 {
            self.powers.get(&account).copied().unwrap_or(0)
        }

        fn total_voting_power(&self, _now: i64) -> u128 {
            self.total
        }
    }

    struct MockTarget {
        fail_next: bool,
        executed: Vec<u64>,
    }

    impl MockTarget {
        fn new() -> Self {
            Self {
                fail_next: false,
                executed: Vec::new(),
            }
        }
    }

    impl GovernanceTarget for MockTarget {
        fn execute_governance_action(
            &mut self,
            proposal_id: u64,
            _data: &[u8],
        ) -> Result<bool, CallError> {
            if self.fail_next {
                self.fail_next = false;
                return Err(CallError::Reverted("target offline".into()));
            }
            self.executed.push(proposal_id);
            Ok(true)
        }

        fn governance_parameters(&self) -> Result<Vec<u8>, CallError> {
            Ok(vec![1])
        }
    }

    fn admin() -> Address {
        Address::derive("admin")
    }

    fn alice() -> Address {
        Address::derive("alice")
    }

    fn bob() -> Address {
        Address::derive("bob")
    }

    fn selector() -> Selector {
        Selector::from_signature("setParam(uint256)")
    }

    fn action_data() -> Vec<u8> {
        let mut data = selector().as_bytes().to_vec();
        data.extend_from_slice(&42u64.to_le_bytes());
        data
    }

    struct Fixture {
        manager: ProposalManager,
        registry: DAppRegistry,
        power: MockPower,
        target: MockTarget,
        dapp_id: u64,
    }

    /// Registry with one active DApp and a whitelisted selector; the
    /// manager holds the registry's governance role; alice has power
    /// 600 of a total 1000.
    fn setup() -> Fixture {
        let genesis = Env::new(admin(), 0, 1);
        let mut registry = DAppRegistry::new(admin());
        registry.grant_role(&genesis, registrar_role(), admin()).unwrap();
        registry.grant_role(&genesis, config_role(), admin()).unwrap();

        let target = MockTarget::new();
        let dapp_id = registry
            .register_dapp(&genesis, "vault", "demo", Address::derive("vault"), &target)
            .unwrap();
        registry
            .whitelist_function(&genesis, dapp_id, selector(), &target)
            .unwrap();

        let manager = ProposalManager::new(Address::derive("proposal-manager"), admin());
        registry
            .grant_role(&genesis, governance_role(), manager.address())
            .unwrap();

        let mut power = MockPower::new(1_000);
        power.set(alice(), 600);
        power.set(bob(), 300);

        Fixture {
            manager,
            registry,
            power,
            target,
            dapp_id,
        }
    }

    fn create_at(f: &mut Fixture, caller: Address, at: i64) -> u64 {
        f.manager
            .create_proposal(
                &Env::new(caller, at, 10),
                &mut f.registry,
                &f.power,
                f.dapp_id,
                action_data(),
                "raise the parameter".to_string(),
                None,
                None,
            )
            .unwrap()
    }

    #[test]
    fn test_create_proposal_snapshots_proposer() {
        let mut f = setup();
        let id = create_at(&mut f, alice(), 100);

        let p = f.manager.get_proposal(id).unwrap();
        assert_eq!(p.state, ProposalState::Active);
        assert_eq!(p.start_time, 100);
        // Default config: 3-day voting, execution one day later
        assert_eq!(p.end_time, 100 + 3 * DAY);
        assert_eq!(p.execution_time, 100 + 4 * DAY);
        assert_eq!(p.quorum_bps, 1_000);
        assert_eq!(p.snapshot_total_power, 1_000);
        assert_eq!(f.manager.get_snapshot(id, alice()), Some(600));

        // Registry bookkeeping happened under the manager's identity
        let dapp = f.registry.get_dapp(f.dapp_id).unwrap();
        assert_eq!(dapp.total_proposals, 1);
        assert_eq!(f.registry.active_proposal_count(f.dapp_id), 1);
    }

    #[test]
    fn test_create_validations() {
        let mut f = setup();
        let env = Env::new(alice(), 100, 10);

        // Action data too short
        let err = f
            .manager
            .create_proposal(
                &env,
                &mut f.registry,
                &f.power,
                f.dapp_id,
                vec![1, 2, 3],
                String::new(),
                None,
                None,
            )
            .unwrap_err();
        assert_eq!(err, ProposalError::InvalidActionDataLength { len: 3 });

        // Unlisted selector
        let err = f
            .manager
            .create_proposal(
                &env,
                &mut f.registry,
                &f.power,
                f.dapp_id,
                vec![0xde, 0xad, 0xbe, 0xef],
                String::new(),
                None,
                None,
            )
            .unwrap_err();
        assert!(matches!(err, ProposalError::SelectorNotWhitelisted(_)));

        // Power below threshold (carol has none)
        let err = f
            .manager
            .create_proposal(
                &Env::new(Address::derive("carol"), 100, 10),
                &mut f.registry,
                &f.power,
                f.dapp_id,
                action_data(),
                String::new(),
                None,
                None,
            )
            .unwrap_err();
        assert_eq!(
            err,
            ProposalError::InsufficientVotingPower {
                required: 1,
                actual: 0,
            }
        );

        // Override bounds
        let err = f
            .manager
            .create_proposal(
                &env,
                &mut f.registry,
                &f.power,
                f.dapp_id,
                action_data(),
                String::new(),
                Some(31 * DAY as u64),
                None,
            )
            .unwrap_err();
        assert!(matches!(err, ProposalError::InvalidVotingDuration { .. }));
        let err = f
            .manager
            .create_proposal(
                &env,
                &mut f.registry,
                &f.power,
                f.dapp_id,
                action_data(),
                String::new(),
                None,
                Some(10_001),
            )
            .unwrap_err();
        assert!(matches!(err, ProposalError::InvalidQuorum { .. }));
    }

    #[test]
    fn test_creation_cooldown() {
        let mut f = setup();
        create_at(&mut f, alice(), 100);

        let err = f
            .manager
            .create_proposal(
                &Env::new(alice(), 100 + SECONDS_PER_HOUR - 1, 11),
                &mut f.registry,
                &f.power,
                f.dapp_id,
                action_data(),
                String::new(),
                None,
                None,
            )
            .unwrap_err();
        assert_eq!(err, ProposalError::CreationCooldown { remaining: 1 });

        // At exactly one hour the cooldown has elapsed
        create_at(&mut f, alice(), 100 + SECONDS_PER_HOUR);
    }

    #[test]
    fn test_active_proposal_cap() {
        let mut f = setup();
        f.power.set(bob(), 300);
        // Alternate proposers to sidestep the per-caller cooldown
        let mut at = 0;
        for i in 0..5 {
            let caller = if i % 2 == 0 { alice() } else { bob() };
            at += SECONDS_PER_HOUR + 1;
            create_at(&mut f, caller, at);
        }

        let err = f
            .manager
            .create_proposal(
                &Env::new(alice(), at + SECONDS_PER_HOUR + 1, 20),
                &mut f.registry,
                &f.power,
                f.dapp_id,
                action_data(),
                String::new(),
                None,
                None,
            )
            .unwrap_err();
        assert_eq!(
            err,
            ProposalError::TooManyActiveProposals {
                dapp_id: f.dapp_id,
                max: 5,
            }
        );
    }

    #[test]
    fn test_vote_weighing_and_double_vote() {
        let mut f = setup();
        let id = create_at(&mut f, alice(), 0);

        f.manager
            .cast_vote(&Env::new(alice(), DAY, 20), id, VoteKind::For, &f.power)
            .unwrap();
        f.manager
            .cast_vote(&Env::new(bob(), DAY, 20), id, VoteKind::Against, &f.power)
            .unwrap();

        let p = f.manager.get_proposal(id).unwrap();
        assert_eq!(p.for_votes, 600);
        assert_eq!(p.against_votes, 300);

        let err = f
            .manager
            .cast_vote(&Env::new(alice(), DAY, 21), id, VoteKind::Abstain, &f.power)
            .unwrap_err();
        assert_eq!(err, ProposalError::AlreadyVoted);

        // After end_time the vote is rejected
        let err = f
            .manager
            .cast_vote(
                &Env::new(Address::derive("carol"), 3 * DAY, 30),
                id,
                VoteKind::For,
                &f.power,
            )
            .unwrap_err();
        assert_eq!(err, ProposalError::VotingClosed);
    }

    #[test]
    fn test_snapshot_immutable_under_restaking() {
        let mut f = setup();
        let id = create_at(&mut f, alice(), 0);

        // Bob pre-snapshots at power 300, then "stakes more"
        f.manager
            .snapshot_voters(&Env::new(admin(), 100, 20), id, &[bob()], &f.power)
            .unwrap();
        f.power.set(bob(), 900_000);

        f.manager
            .cast_vote(&Env::new(bob(), DAY, 21), id, VoteKind::For, &f.power)
            .unwrap();
        // The vote is weighed with the snapshot, not the new power
        assert_eq!(f.manager.get_vote(id, bob()).unwrap().weight, 300);
        assert_eq!(f.manager.get_snapshot(id, bob()), Some(300));
    }

    #[test]
    fn test_batch_snapshot_limit() {
        let mut f = setup();
        let id = create_at(&mut f, alice(), 0);
        let voters: Vec<Address> = (0..51).map(|i| Address::derive(&format!("v{i}"))).collect();

        let err = f
            .manager
            .snapshot_voters(&Env::new(admin(), 100, 20), id, &voters, &f.power)
            .unwrap_err();
        assert_eq!(err, ProposalError::BatchTooLarge { len: 51, max: 50 });

        let taken = f
            .manager
            .snapshot_voters(&Env::new(admin(), 100, 20), id, &voters[..50], &f.power)
            .unwrap();
        assert_eq!(taken, 50);
    }

    #[test]
    fn test_exact_quorum_boundary() {
        let mut f = setup();
        // Quorum 10% of total 1000 => 100 votes required
        f.power.set(alice(), 100);
        let id = create_at(&mut f, alice(), 0);

        f.manager
            .cast_vote(&Env::new(alice(), DAY, 20), id, VoteKind::For, &f.power)
            .unwrap();

        let state = f
            .manager
            .update_proposal_state(&Env::new(admin(), 3 * DAY, 30), id, &mut f.registry)
            .unwrap();
        assert_eq!(state, ProposalState::Succeeded);
    }

    #[test]
    fn test_below_quorum_fails() {
        let mut f = setup();
        f.power.set(alice(), 99);
        let id = create_at(&mut f, alice(), 0);
        f.manager
            .cast_vote(&Env::new(alice(), DAY, 20), id, VoteKind::For, &f.power)
            .unwrap();

        let state = f
            .manager
            .update_proposal_state(&Env::new(admin(), 3 * DAY, 30), id, &mut f.registry)
            .unwrap();
        assert_eq!(state, ProposalState::Failed);

        // Failure is recorded in the registry stats
        let dapp = f.registry.get_dapp(f.dapp_id).unwrap();
        assert_eq!(dapp.failed_proposals, 1);
        assert_eq!(f.registry.active_proposal_count(f.dapp_id), 0);
    }

    fn pass_proposal(f: &mut Fixture) -> u64 {
        let id = create_at(f, alice(), 0);
        f.manager
            .cast_vote(&Env::new(alice(), DAY, 20), id, VoteKind::For, &f.power)
            .unwrap();
        id
    }

    #[test]
    fn test_execution_window() {
        let mut f = setup();
        let id = pass_proposal(&mut f);

        // Voting ends day 3; execution opens day 4
        let err = f
            .manager
            .execute_proposal(
                &Env::new(admin(), 3 * DAY + 1, 30),
                id,
                &mut f.registry,
                &mut f.target,
            )
            .unwrap_err();
        assert!(matches!(err, ProposalError::ExecutionTooEarly { .. }));

        let ok = f
            .manager
            .execute_proposal(&Env::new(admin(), 4 * DAY, 31), id, &mut f.registry, &mut f.target)
            .unwrap();
        assert!(ok);
        assert_eq!(
            f.manager.get_proposal(id).unwrap().state,
            ProposalState::Executed
        );
        assert_eq!(f.target.executed, vec![id]);

        let dapp = f.registry.get_dapp(f.dapp_id).unwrap();
        assert_eq!(dapp.successful_proposals, 1);
    }

    #[test]
    fn test_expiry_past_window() {
        let mut f = setup();
        let id = pass_proposal(&mut f);

        // Window: [day 4, day 11]; past it the proposal expires
        let err = f
            .manager
            .execute_proposal(
                &Env::new(admin(), 11 * DAY + 1, 40),
                id,
                &mut f.registry,
                &mut f.target,
            )
            .unwrap_err();
        assert_eq!(err, ProposalError::ExecutionWindowClosed);
        assert_eq!(
            f.manager.get_proposal(id).unwrap().state,
            ProposalState::Expired
        );
    }

    #[test]
    fn test_execution_rollback_and_retry() {
        let mut f = setup();
        let id = pass_proposal(&mut f);

        f.target.fail_next = true;
        let ok = f
            .manager
            .execute_proposal(&Env::new(admin(), 4 * DAY, 31), id, &mut f.registry, &mut f.target)
            .unwrap();
        assert!(!ok);
        // Rolled back, not left Executed
        assert_eq!(
            f.manager.get_proposal(id).unwrap().state,
            ProposalState::Succeeded
        );

        // Retry inside the window with a healthy target succeeds
        let ok = f
            .manager
            .execute_proposal(
                &Env::new(admin(), 4 * DAY + 100, 32),
                id,
                &mut f.registry,
                &mut f.target,
            )
            .unwrap();
        assert!(ok);
        assert_eq!(
            f.manager.get_proposal(id).unwrap().state,
            ProposalState::Executed
        );
    }

    #[test]
    fn test_cancel_authorization() {
        let mut f = setup();
        let id = create_at(&mut f, alice(), 0);

        let err = f
            .manager
            .cancel_proposal(&Env::new(bob(), 100, 20), id, &mut f.registry)
            .unwrap_err();
        assert_eq!(err, ProposalError::NotProposerOrEmergency);

        // An emergency holder can cancel someone else's proposal
        f.manager
            .grant_role(&Env::new(admin(), 100, 20), emergency_role(), bob())
            .unwrap();
        f.manager
            .cancel_proposal(&Env::new(bob(), 101, 20), id, &mut f.registry)
            .unwrap();
        assert_eq!(
            f.manager.get_proposal(id).unwrap().state,
            ProposalState::Cancelled
        );
        assert_eq!(f.registry.active_proposal_count(f.dapp_id), 0);

        // Terminal: cannot cancel twice
        let err = f
            .manager
            .cancel_proposal(&Env::new(alice(), 102, 20), id, &mut f.registry)
            .unwrap_err();
        assert!(matches!(err, ProposalError::WrongState { .. }));
    }

    #[test]
    fn test_governance_hook_surface() {
        let mut f = setup();
        assert!(!f.manager.has_active_proposals().unwrap());

        let id = create_at(&mut f, alice(), 0);
        assert!(f.manager.has_active_proposals().unwrap());
        // Proposer counts as involved; a snapshot holder too
        assert!(f.manager.is_proposal_active(alice()).unwrap());
        assert!(!f.manager.is_proposal_active(bob()).unwrap());
        f.manager
            .snapshot_voters(&Env::new(admin(), 100, 20), id, &[bob()], &f.power)
            .unwrap();
        assert!(f.manager.is_proposal_active(bob()).unwrap());

        f.manager
            .cancel_proposal(&Env::new(alice(), 200, 21), id, &mut f.registry)
            .unwrap();
        assert!(!f.manager.has_active_proposals().unwrap());
        assert!(!f.manager.is_proposal_active(alice()).unwrap());

        f.manager.notify_stake_update(bob(), 7).unwrap();
        assert_eq!(f.manager.stake_total(bob()), 7);
        assert_eq!(f.manager.version().unwrap(), GOVERNANCE_VERSION);
    }
}
