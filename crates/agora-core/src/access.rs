//! Role-based access control.
//!
//! Every contract owns an [`AccessControlState`]: a map of role to holder
//! set plus a pause flag. Role checks are pure predicates over this value,
//! evaluated before any other validation so unauthorized callers learn
//! nothing about contract state.

use crate::types::{Address, Digest};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt;
use thiserror::Error;

/// Role identifier derived from the role name
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RoleId(Digest);

impl RoleId {
    /// Derive a role id from its canonical name
    pub fn named(name: &str) -> Self {
        Self(Digest::of(&[name.as_bytes()]))
    }
}

impl fmt::Debug for RoleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RoleId({}..)", &self.0.to_hex()[..8])
    }
}

/// Full administrative control, including role management
pub fn admin_role() -> RoleId {
    RoleId::named("ADMIN_ROLE")
}

/// May register new governable targets
pub fn registrar_role() -> RoleId {
    RoleId::named("REGISTRAR_ROLE")
}

/// May change per-target governance parameters
pub fn config_role() -> RoleId {
    RoleId::named("CONFIG_ROLE")
}

/// Held by peer governance contracts for cross-contract bookkeeping
pub fn governance_role() -> RoleId {
    RoleId::named("GOVERNANCE_ROLE")
}

/// May cancel live proposals and trigger emergency stops
pub fn emergency_role() -> RoleId {
    RoleId::named("EMERGENCY_ROLE")
}

/// Access control errors
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum AccessError {
    /// Caller lacks the required role
    #[error("account {account} is missing role {role:?}")]
    MissingRole { account: Address, role: RoleId },

    /// Contract is paused
    #[error("contract is paused")]
    Paused,
}

/// Role assignments and pause flag for one contract
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct AccessControlState {
    roles: HashMap<RoleId, HashSet<Address>>,
    paused: bool,
}

impl AccessControlState {
    /// Create an empty state with `deployer` holding the admin role
    pub fn new(deployer: Address) -> Self {
        let mut state = Self::default();
        state.roles.entry(admin_role()).or_default().insert(deployer);
        state
    }

    /// Does `account` hold `role`?
    pub fn has_role(&self, role: RoleId, account: Address) -> bool {
        self.roles
            .get(&role)
            .map(|holders| holders.contains(&account))
            .unwrap_or(false)
    }

    /// Require that `account` holds `role`
    pub fn require_role(&self, role: RoleId, account: Address) -> Result<(), AccessError> {
        if self.has_role(role, account) {
            Ok(())
        } else {
            Err(AccessError::MissingRole { account, role })
        }
    }

    /// Require that the contract is not paused
    pub fn require_not_paused(&self) -> Result<(), AccessError> {
        if self.paused {
            Err(AccessError::Paused)
        } else {
            Ok(())
        }
    }

    /// Grant `role` to `account`; caller must be an admin
    pub fn grant_role(
        &mut self,
        caller: Address,
        role: RoleId,
        account: Address,
    ) -> Result<(), AccessError> {
        self.require_role(admin_role(), caller)?;
        self.roles.entry(role).or_default().insert(account);
        Ok(())
    }

    /// Revoke `role` from `account`; caller must be an admin
    pub fn revoke_role(
        &mut self,
        caller: Address,
        role: RoleId,
        account: Address,
    ) -> Result<(), AccessError> {
        self.require_role(admin_role(), caller)?;
        if let Some(holders) = self.roles.get_mut(&role) {
            holders.remove(&account);
        }
        Ok(())
    }

    /// Is the contract paused?
    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Set the pause flag
    pub fn set_paused(&mut self, paused: bool) {
        self.paused = paused;
    }
}
