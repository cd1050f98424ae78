//! The deterministic world: four contracts, wired, on an explicit clock.

use crate::mocks::{MockLedger, MockNft, MockTarget};
use agora_core::access::{config_role, governance_role, registrar_role};
use agora_core::{Address, Env, Selector};
use agora_governance::constants::GOVERNANCE_VERSION;
use agora_governance::{ProposalError, ProposalManager, ProposalState, VoteKind};
use agora_registry::DAppRegistry;
use agora_rewards::constants::CALCULATOR_VERSION;
use agora_rewards::RewardCalculator;
use agora_staking::constants::{MIN_COMMIT_BLOCKS, TOKEN_TIMELOCK_SECS};
use agora_staking::{stake_commitment, GovernanceStaking, StakingError};

/// Everything a scenario needs, deployed and role-wired.
///
/// Deployment leaves the clock at `TOKEN_TIMELOCK_SECS` (the reward token
/// whitelist must clear its two-day timelock before any stake can open).
pub struct World {
    pub now: i64,
    pub block: u64,
    pub admin: Address,
    pub registry: DAppRegistry,
    pub calculator: RewardCalculator,
    pub staking: GovernanceStaking,
    pub governance: ProposalManager,
    pub nft: MockNft,
    pub ledger: MockLedger,
    pub reward_token: Address,
}

impl World {
    pub fn new() -> Self {
        let admin = Address::derive("admin");
        let reward_token = Address::derive("reward-token");
        let genesis = Env::new(admin, 0, 1);

        let mut registry = DAppRegistry::new(admin);
        let mut calculator = RewardCalculator::new(admin);
        let mut staking = GovernanceStaking::new(Address::derive("staking-contract"), admin);
        let governance = ProposalManager::new(Address::derive("proposal-manager"), admin);

        // Role wiring: the staking contract drives the calculator, the
        // proposal manager drives the registry.
        calculator
            .grant_role(&genesis, governance_role(), staking.address())
            .expect("deployer is admin");
        registry
            .grant_role(&genesis, governance_role(), governance.address())
            .expect("deployer is admin");
        registry
            .grant_role(&genesis, registrar_role(), admin)
            .expect("deployer is admin");
        registry
            .grant_role(&genesis, config_role(), admin)
            .expect("deployer is admin");

        staking
            .bind_calculator(&genesis, &calculator, CALCULATOR_VERSION)
            .expect("versions match at deployment");
        staking
            .bind_governance(&genesis, &governance, GOVERNANCE_VERSION)
            .expect("versions match at deployment");

        // Whitelist the reward token through the multi-sig (threshold 1
        // at deployment) and its two-day timelock.
        staking
            .schedule_token_whitelist(&genesis, reward_token)
            .expect("deployer is admin");
        let now = TOKEN_TIMELOCK_SECS;
        staking
            .execute_token_action(&Env::new(admin, now, 2), reward_token)
            .expect("timelock elapsed");

        Self {
            now,
            block: 2,
            admin,
            registry,
            calculator,
            staking,
            governance,
            nft: MockNft::new(Address::derive("payment-token")),
            ledger: MockLedger::new(),
            reward_token,
        }
    }

    /// An environment at the current clock for `caller`
    pub fn env(&self, caller: Address) -> Env {
        Env::new(caller, self.now, self.block)
    }

    /// Advance the clock; every advance also mines a block
    pub fn advance(&mut self, secs: i64) {
        self.now += secs;
        self.block += 1;
    }

    /// Mine blocks without moving the clock
    pub fn advance_blocks(&mut self, n: u64) {
        self.block += n;
    }

    /// Create a pool, fund it, and return its id
    pub fn create_funded_pool(
        &mut self,
        yield_bps: u32,
        stake_duration: u64,
        min_stake_duration: u64,
        funding: u128,
    ) -> u64 {
        let env = self.env(self.admin);
        let pool_id = self
            .calculator
            .create_pool(
                &env,
                self.reward_token,
                yield_bps,
                stake_duration,
                min_stake_duration,
            )
            .expect("valid pool parameters");
        self.calculator
            .fund_pool(&env, pool_id, funding)
            .expect("non-zero funding");
        pool_id
    }

    /// Full commit-reveal flow: commit, mine the minimum delay, reveal
    pub fn commit_and_stake(
        &mut self,
        caller: Address,
        token_id: u64,
        pool_id: u64,
        nonce: u64,
    ) -> Result<(), StakingError> {
        let env = self.env(caller);
        self.staking
            .commit_stake(&env, stake_commitment(caller, token_id, pool_id, nonce))?;
        self.advance_blocks(MIN_COMMIT_BLOCKS);

        let env = self.env(caller);
        self.staking.stake(
            &env,
            token_id,
            pool_id,
            nonce,
            &mut self.nft,
            &mut self.calculator,
            Some(&mut self.governance),
        )
    }

    pub fn claim(&mut self, caller: Address, token_id: u64) -> Result<u128, StakingError> {
        let env = self.env(caller);
        self.staking
            .claim_rewards(&env, token_id, &mut self.calculator, &mut self.ledger)
    }

    pub fn unstake(&mut self, caller: Address, token_id: u64) -> Result<u128, StakingError> {
        let env = self.env(caller);
        self.staking.unstake(
            &env,
            token_id,
            &mut self.nft,
            &mut self.calculator,
            Some(&mut self.governance),
            &mut self.ledger,
        )
    }

    /// Register a DApp and whitelist one selector for it
    pub fn register_dapp(&mut self, name: &str, address: Address, target: &MockTarget) -> u64 {
        let env = self.env(self.admin);
        let dapp_id = self
            .registry
            .register_dapp(&env, name, "harness target", address, target)
            .expect("registration succeeds");
        self.registry
            .whitelist_function(&env, dapp_id, Self::selector(), target)
            .expect("whitelisting succeeds");
        dapp_id
    }

    /// The selector every harness proposal calls
    pub fn selector() -> Selector {
        Selector::from_signature("setParam(uint256)")
    }

    /// Well-formed action data carrying the harness selector
    pub fn action_data() -> Vec<u8> {
        let mut data = Self::selector().as_bytes().to_vec();
        data.extend_from_slice(&42u64.to_le_bytes());
        data
    }

    pub fn create_proposal(
        &mut self,
        caller: Address,
        dapp_id: u64,
    ) -> Result<u64, ProposalError> {
        self.create_proposal_with(caller, dapp_id, None, None)
    }

    pub fn create_proposal_with(
        &mut self,
        caller: Address,
        dapp_id: u64,
        duration_override: Option<u64>,
        quorum_override: Option<u32>,
    ) -> Result<u64, ProposalError> {
        let env = self.env(caller);
        self.governance.create_proposal(
            &env,
            &mut self.registry,
            &self.staking,
            dapp_id,
            Self::action_data(),
            "harness proposal".to_string(),
            duration_override,
            quorum_override,
        )
    }

    pub fn cast_vote(
        &mut self,
        caller: Address,
        proposal_id: u64,
        kind: VoteKind,
    ) -> Result<(), ProposalError> {
        let env = self.env(caller);
        self.governance
            .cast_vote(&env, proposal_id, kind, &self.staking)
    }

    pub fn execute_proposal(
        &mut self,
        caller: Address,
        proposal_id: u64,
        target: &mut MockTarget,
    ) -> Result<bool, ProposalError> {
        let env = self.env(caller);
        self.governance
            .execute_proposal(&env, proposal_id, &mut self.registry, target)
    }

    pub fn proposal_state(&mut self, proposal_id: u64) -> ProposalState {
        let env = self.env(self.admin);
        self.governance
            .update_proposal_state(&env, proposal_id, &mut self.registry)
            .expect("proposal exists")
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}
