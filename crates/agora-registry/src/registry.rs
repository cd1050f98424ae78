//! The DApp registry state machine.

use crate::constants::*;
use crate::timelock::{CriticalOperation, OperationState};
use crate::RegistryError;
use agora_core::access::{admin_role, config_role, governance_role, registrar_role};
use agora_core::{
    AccessControlState, Address, Digest, Env, GovernanceTarget, RawCall, RoleId, Selector,
};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap, HashSet};
use tracing::{info, warn};

/// A registered governable target
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DApp {
    /// Sequential id
    pub id: u64,

    /// Display name
    pub name: String,

    /// Free-form description
    pub description: String,

    /// Target contract address; unique across all DApps
    pub contract_address: Address,

    /// Account that registered the DApp
    pub registrar: Address,

    /// Registration timestamp
    pub registered_at: i64,

    /// Last recorded governance activity
    pub last_activity_at: i64,

    /// May proposals target this DApp?
    pub active: bool,

    /// Proposals ever created against this DApp
    pub total_proposals: u64,

    /// Proposals executed successfully
    pub successful_proposals: u64,

    /// Proposals that failed or whose execution failed
    pub failed_proposals: u64,
}

/// Per-DApp governance parameters
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DAppConfig {
    /// Minimum proposer voting power
    pub min_proposal_threshold: u128,

    /// Default quorum, basis points
    pub default_quorum_bps: u32,

    /// Default voting duration, seconds
    pub default_voting_duration: u64,

    /// Have the defaults been overridden by a config-role holder?
    pub custom_settings_enabled: bool,
}

impl Default for DAppConfig {
    fn default() -> Self {
        Self {
            min_proposal_threshold: DEFAULT_PROPOSAL_THRESHOLD,
            default_quorum_bps: DEFAULT_QUORUM_BPS,
            default_voting_duration: DEFAULT_VOTING_DURATION_SECS,
            custom_settings_enabled: false,
        }
    }
}

/// Observable registry events
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum RegistryEvent {
    DAppRegistered {
        dapp_id: u64,
        contract_address: Address,
        registrar: Address,
    },
    DAppConfigured {
        dapp_id: u64,
        config: DAppConfig,
    },
    DAppActiveSet {
        dapp_id: u64,
        active: bool,
    },
    FunctionWhitelisted {
        dapp_id: u64,
        selector: Selector,
    },
    FunctionDelisted {
        dapp_id: u64,
        selector: Selector,
    },
    ExecutionDispatched {
        dapp_id: u64,
        proposal_id: u64,
        success: bool,
    },
    ExecutionFailed {
        dapp_id: u64,
        proposal_id: u64,
        reason: String,
    },
    CriticalOperationScheduled {
        key: Digest,
        target: Address,
    },
    CriticalOperationExecuted {
        key: Digest,
    },
    CriticalOperationCancelled {
        key: Digest,
    },
}

/// Registry of governable targets
pub struct DAppRegistry {
    access: AccessControlState,
    dapps: HashMap<u64, DApp>,
    by_address: HashMap<Address, u64>,
    configs: HashMap<u64, DAppConfig>,
    whitelists: HashMap<u64, HashSet<Selector>>,
    active_ids: BTreeSet<u64>,
    active_proposal_counts: HashMap<u64, u32>,
    last_registration: HashMap<Address, i64>,
    critical_ops: HashMap<Digest, CriticalOperation>,
    next_id: u64,
    events: Vec<RegistryEvent>,
}

impl DAppRegistry {
    /// Create a registry with `deployer` as admin
    pub fn new(deployer: Address) -> Self {
        Self {
            access: AccessControlState::new(deployer),
            dapps: HashMap::new(),
            by_address: HashMap::new(),
            configs: HashMap::new(),
            whitelists: HashMap::new(),
            active_ids: BTreeSet::new(),
            active_proposal_counts: HashMap::new(),
            last_registration: HashMap::new(),
            critical_ops: HashMap::new(),
            next_id: 1,
            events: Vec::new(),
        }
    }

    /// Implementation version, checked by dependents before binding
    pub fn version(&self) -> &'static str {
        REGISTRY_VERSION
    }

    /// Grant a role; admin only
    pub fn grant_role(
        &mut self,
        env: &Env,
        role: RoleId,
        account: Address,
    ) -> Result<(), RegistryError> {
        self.access.grant_role(env.caller, role, account)?;
        Ok(())
    }

    /// Revoke a role; admin only
    pub fn revoke_role(
        &mut self,
        env: &Env,
        role: RoleId,
        account: Address,
    ) -> Result<(), RegistryError> {
        self.access.revoke_role(env.caller, role, account)?;
        Ok(())
    }

    // === Registration ===

    /// Register a new governable target; registrar role, rate-limited.
    ///
    /// Probes the target's governance interface before accepting; any
    /// probe failure is `InterfaceNotSupported`. The probe is best-effort
    /// ABI evidence, not a behavioral guarantee: a conforming but
    /// misbehaving contract still passes.
    pub fn register_dapp(
        &mut self,
        env: &Env,
        name: &str,
        description: &str,
        contract_address: Address,
        probe: &dyn GovernanceTarget,
    ) -> Result<u64, RegistryError> {
        self.access.require_role(registrar_role(), env.caller)?;

        if contract_address.is_zero() {
            return Err(RegistryError::ZeroAddress);
        }
        if name.is_empty() {
            return Err(RegistryError::EmptyName);
        }
        if self.dapp_id_of(contract_address).is_some() {
            return Err(RegistryError::DuplicateDApp(contract_address));
        }
        if let Some(last) = self.last_registration.get(&env.caller) {
            let remaining = last + REGISTRATION_COOLDOWN_SECS - env.timestamp;
            if remaining > 0 {
                return Err(RegistryError::RegistrationCooldown { remaining });
            }
        }
        if probe.governance_parameters().is_err() {
            return Err(RegistryError::InterfaceNotSupported);
        }

        let dapp_id = self.next_id;
        self.next_id += 1;

        self.dapps.insert(
            dapp_id,
            DApp {
                id: dapp_id,
                name: name.to_string(),
                description: description.to_string(),
                contract_address,
                registrar: env.caller,
                registered_at: env.timestamp,
                last_activity_at: env.timestamp,
                active: true,
                total_proposals: 0,
                successful_proposals: 0,
                failed_proposals: 0,
            },
        );
        self.by_address.insert(contract_address, dapp_id);
        self.configs.insert(dapp_id, DAppConfig::default());
        self.whitelists.insert(dapp_id, HashSet::new());
        self.active_ids.insert(dapp_id);
        self.last_registration.insert(env.caller, env.timestamp);

        info!(dapp_id, %contract_address, name, "DApp registered");
        self.events.push(RegistryEvent::DAppRegistered {
            dapp_id,
            contract_address,
            registrar: env.caller,
        });
        Ok(dapp_id)
    }

    /// Deactivate a DApp; admin or original registrar. Never hard-deletes.
    pub fn deactivate_dapp(&mut self, env: &Env, dapp_id: u64) -> Result<(), RegistryError> {
        let registrar = self
            .dapps
            .get(&dapp_id)
            .map(|d| d.registrar)
            .ok_or(RegistryError::DAppNotFound(dapp_id))?;
        if registrar != env.caller {
            self.access.require_role(admin_role(), env.caller)?;
        }

        if let Some(dapp) = self.dapps.get_mut(&dapp_id) {
            dapp.active = false;
        }
        self.active_ids.remove(&dapp_id);
        self.events.push(RegistryEvent::DAppActiveSet {
            dapp_id,
            active: false,
        });
        Ok(())
    }

    /// Reactivate a previously deactivated DApp; admin only
    pub fn reactivate_dapp(&mut self, env: &Env, dapp_id: u64) -> Result<(), RegistryError> {
        self.access.require_role(admin_role(), env.caller)?;
        let dapp = self
            .dapps
            .get_mut(&dapp_id)
            .ok_or(RegistryError::DAppNotFound(dapp_id))?;
        dapp.active = true;
        self.active_ids.insert(dapp_id);
        self.events.push(RegistryEvent::DAppActiveSet {
            dapp_id,
            active: true,
        });
        Ok(())
    }

    // === Configuration (config role) ===

    /// Replace a DApp's governance parameters; config role only
    pub fn configure_dapp(
        &mut self,
        env: &Env,
        dapp_id: u64,
        config: DAppConfig,
    ) -> Result<(), RegistryError> {
        self.access.require_role(config_role(), env.caller)?;
        if !self.dapps.contains_key(&dapp_id) {
            return Err(RegistryError::DAppNotFound(dapp_id));
        }
        if config.default_quorum_bps < MIN_QUORUM_BPS || config.default_quorum_bps > MAX_QUORUM_BPS
        {
            return Err(RegistryError::InvalidQuorum {
                bps: config.default_quorum_bps,
            });
        }
        if config.default_voting_duration < MIN_VOTING_DURATION_SECS
            || config.default_voting_duration > MAX_VOTING_DURATION_SECS
        {
            return Err(RegistryError::InvalidVotingDuration {
                secs: config.default_voting_duration,
            });
        }

        let stored = DAppConfig {
            custom_settings_enabled: true,
            ..config
        };
        self.configs.insert(dapp_id, stored.clone());
        self.events.push(RegistryEvent::DAppConfigured {
            dapp_id,
            config: stored,
        });
        Ok(())
    }

    /// Whitelist a callable selector for a DApp; config role only.
    ///
    /// The selector presence probe is deliberately soft: the probe call is
    /// made and its outcome ignored, because neither a success nor a
    /// revert proves the selector's semantics. Kept as documented
    /// weak-guarantee behavior.
    pub fn whitelist_function(
        &mut self,
        env: &Env,
        dapp_id: u64,
        selector: Selector,
        probe: &dyn GovernanceTarget,
    ) -> Result<(), RegistryError> {
        self.access.require_role(config_role(), env.caller)?;
        if !self.dapps.contains_key(&dapp_id) {
            return Err(RegistryError::DAppNotFound(dapp_id));
        }

        let _ = probe.governance_parameters();

        self.whitelists
            .entry(dapp_id)
            .or_default()
            .insert(selector);
        self.events.push(RegistryEvent::FunctionWhitelisted { dapp_id, selector });
        Ok(())
    }

    /// Remove a selector from a DApp's whitelist; config role only
    pub fn delist_function(
        &mut self,
        env: &Env,
        dapp_id: u64,
        selector: Selector,
    ) -> Result<(), RegistryError> {
        self.access.require_role(config_role(), env.caller)?;
        if !self.dapps.contains_key(&dapp_id) {
            return Err(RegistryError::DAppNotFound(dapp_id));
        }

        if let Some(whitelist) = self.whitelists.get_mut(&dapp_id) {
            whitelist.remove(&selector);
        }
        self.events.push(RegistryEvent::FunctionDelisted { dapp_id, selector });
        Ok(())
    }

    // === Lifecycle bookkeeping (governance role: the proposal manager) ===

    /// Refresh a DApp's last-activity timestamp
    pub fn update_activity(&mut self, env: &Env, dapp_id: u64) -> Result<(), RegistryError> {
        self.access.require_role(governance_role(), env.caller)?;
        let dapp = self
            .dapps
            .get_mut(&dapp_id)
            .ok_or(RegistryError::DAppNotFound(dapp_id))?;
        dapp.last_activity_at = env.timestamp;
        Ok(())
    }

    /// Count a newly created proposal against a DApp
    pub fn increment_proposal_count(
        &mut self,
        env: &Env,
        dapp_id: u64,
    ) -> Result<(), RegistryError> {
        self.access.require_role(governance_role(), env.caller)?;
        let dapp = self
            .dapps
            .get_mut(&dapp_id)
            .ok_or(RegistryError::DAppNotFound(dapp_id))?;
        dapp.total_proposals += 1;
        dapp.last_activity_at = env.timestamp;
        Ok(())
    }

    /// Record a proposal's final outcome
    pub fn update_proposal_stats(
        &mut self,
        env: &Env,
        dapp_id: u64,
        succeeded: bool,
    ) -> Result<(), RegistryError> {
        self.access.require_role(governance_role(), env.caller)?;
        let dapp = self
            .dapps
            .get_mut(&dapp_id)
            .ok_or(RegistryError::DAppNotFound(dapp_id))?;
        if succeeded {
            dapp.successful_proposals += 1;
        } else {
            dapp.failed_proposals += 1;
        }
        dapp.last_activity_at = env.timestamp;
        Ok(())
    }

    /// Set the live active-proposal count for a DApp
    pub fn update_active_proposals(
        &mut self,
        env: &Env,
        dapp_id: u64,
        count: u32,
    ) -> Result<(), RegistryError> {
        self.access.require_role(governance_role(), env.caller)?;
        if !self.dapps.contains_key(&dapp_id) {
            return Err(RegistryError::DAppNotFound(dapp_id));
        }
        self.active_proposal_counts.insert(dapp_id, count);
        Ok(())
    }

    // === Execution dispatch ===

    /// Forward an approved action to the target DApp; governance role only.
    ///
    /// A target failure is isolated: it is recorded via event and a
    /// `false` return so the registry's own bookkeeping always commits.
    pub fn execute_on_dapp(
        &mut self,
        env: &Env,
        dapp_id: u64,
        proposal_id: u64,
        action_data: &[u8],
        target: &mut dyn GovernanceTarget,
    ) -> Result<bool, RegistryError> {
        self.access.require_role(governance_role(), env.caller)?;
        let dapp = self
            .dapps
            .get_mut(&dapp_id)
            .ok_or(RegistryError::DAppNotFound(dapp_id))?;
        if !dapp.active {
            return Err(RegistryError::DAppInactive(dapp_id));
        }
        dapp.last_activity_at = env.timestamp;

        let success = match target.execute_governance_action(proposal_id, action_data) {
            Ok(outcome) => outcome,
            Err(err) => {
                warn!(dapp_id, proposal_id, %err, "target execution failed");
                self.events.push(RegistryEvent::ExecutionFailed {
                    dapp_id,
                    proposal_id,
                    reason: err.to_string(),
                });
                false
            }
        };

        self.events.push(RegistryEvent::ExecutionDispatched {
            dapp_id,
            proposal_id,
            success,
        });
        Ok(success)
    }

    // === Timelocked critical operations (admin role) ===

    /// Schedule an admin-privileged raw call; executable after the
    /// two-day delay. Returns the replay-resistant operation key.
    pub fn schedule_critical_operation(
        &mut self,
        env: &Env,
        target: Address,
        data: Vec<u8>,
    ) -> Result<Digest, RegistryError> {
        self.access.require_role(admin_role(), env.caller)?;
        if target.is_zero() {
            return Err(RegistryError::ZeroAddress);
        }

        let op = CriticalOperation::schedule(target, data, env.caller, env.timestamp);
        let key = op.key;
        self.critical_ops.insert(key, op);

        info!(%key, %target, "critical operation scheduled");
        self.events
            .push(RegistryEvent::CriticalOperationScheduled { key, target });
        Ok(key)
    }

    /// Execute a scheduled critical operation once its delay has elapsed
    pub fn execute_critical_operation(
        &mut self,
        env: &Env,
        key: Digest,
        target: &mut dyn RawCall,
    ) -> Result<Vec<u8>, RegistryError> {
        self.access.require_role(admin_role(), env.caller)?;

        let op = self
            .critical_ops
            .get(&key)
            .ok_or(RegistryError::OperationNotFound(key))?;
        if op.state != OperationState::Scheduled {
            return Err(RegistryError::OperationNotPending);
        }
        let remaining = op.remaining_delay(env.timestamp, TIMELOCK_DELAY_SECS);
        if remaining > 0 {
            return Err(RegistryError::TimelockNotElapsed { remaining });
        }

        let data = op.data.clone();
        // State advances only on a successful dispatch, so a reverting
        // target leaves the operation executable for a retry.
        let output = target
            .raw_call(&data)
            .map_err(|e| RegistryError::CriticalCallFailed(e.to_string()))?;
        if let Some(op) = self.critical_ops.get_mut(&key) {
            op.state = OperationState::Executed;
        }
        self.events.push(RegistryEvent::CriticalOperationExecuted { key });
        Ok(output)
    }

    /// Cancel a scheduled critical operation; admin only
    pub fn cancel_critical_operation(&mut self, env: &Env, key: Digest) -> Result<(), RegistryError> {
        self.access.require_role(admin_role(), env.caller)?;
        let op = self
            .critical_ops
            .get_mut(&key)
            .ok_or(RegistryError::OperationNotFound(key))?;
        if op.state != OperationState::Scheduled {
            return Err(RegistryError::OperationNotPending);
        }
        op.state = OperationState::Cancelled;
        self.events.push(RegistryEvent::CriticalOperationCancelled { key });
        Ok(())
    }

    // === Views ===

    /// Look up a DApp by id
    pub fn get_dapp(&self, dapp_id: u64) -> Option<&DApp> {
        self.dapps.get(&dapp_id)
    }

    /// Look up a DApp id by contract address
    pub fn dapp_id_of(&self, contract_address: Address) -> Option<u64> {
        self.by_address.get(&contract_address).copied()
    }

    /// A DApp's effective governance parameters
    pub fn get_config(&self, dapp_id: u64) -> Option<&DAppConfig> {
        self.configs.get(&dapp_id)
    }

    /// Is the DApp registered and active?
    pub fn is_dapp_active(&self, dapp_id: u64) -> bool {
        self.dapps.get(&dapp_id).map(|d| d.active).unwrap_or(false)
    }

    /// Is the selector callable through governance for this DApp?
    pub fn is_function_whitelisted(&self, dapp_id: u64, selector: Selector) -> bool {
        self.whitelists
            .get(&dapp_id)
            .map(|w| w.contains(&selector))
            .unwrap_or(false)
    }

    /// Ordered enumeration of active DApp ids
    pub fn active_dapp_ids(&self) -> Vec<u64> {
        self.active_ids.iter().copied().collect()
    }

    /// Live active-proposal count for a DApp
    pub fn active_proposal_count(&self, dapp_id: u64) -> u32 {
        self.active_proposal_counts
            .get(&dapp_id)
            .copied()
            .unwrap_or(0)
    }

    /// DApps ever registered
    pub fn dapp_count(&self) -> u64 {
        self.next_id - 1
    }

    /// Look up a critical operation
    pub fn get_critical_operation(&self, key: Digest) -> Option<&CriticalOperation> {
        self.critical_ops.get(&key)
    }

    /// Drain the event log (test/observability hook)
    pub fn take_events(&mut self) -> Vec<RegistryEvent> {
        std::mem::take(&mut self.events)
    }
}
