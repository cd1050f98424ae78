//! Multi-signature approval gate for sensitive admin operations.
//!
//! Any admin may approve a pending action identified by the digest of its
//! tag and parameters; once approvals reach the threshold the action
//! executes and all approval state for that digest is cleared. The
//! threshold starts at 1 so a single-admin deployment can bootstrap
//! itself before widening the admin set.

use crate::MultiSigError;
use agora_core::{Address, Digest};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// Result of one approval
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MultiSigOutcome {
    /// More approvals needed
    Pending { approvals: u32, threshold: u32 },
    /// Threshold reached; approval state cleared, action may proceed
    Ready,
}

/// Approval ledger keyed by action digest
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct MultiSigGate {
    threshold: u32,
    approvals: HashMap<Digest, HashSet<Address>>,
}

impl MultiSigGate {
    /// Create a gate with the given threshold
    pub fn new(threshold: u32) -> Self {
        Self {
            threshold: threshold.max(1),
            approvals: HashMap::new(),
        }
    }

    /// Current threshold
    pub fn threshold(&self) -> u32 {
        self.threshold
    }

    /// Change the threshold (itself a gated operation at the call site)
    pub fn set_threshold(&mut self, threshold: u32) -> Result<(), MultiSigError> {
        if threshold == 0 {
            return Err(MultiSigError::ZeroThreshold);
        }
        self.threshold = threshold;
        Ok(())
    }

    /// Register one admin's approval for an action
    pub fn approve(
        &mut self,
        approver: Address,
        action: Digest,
    ) -> Result<MultiSigOutcome, MultiSigError> {
        let approvers = self.approvals.entry(action).or_default();
        if !approvers.insert(approver) {
            return Err(MultiSigError::AlreadyApproved);
        }

        let count = approvers.len() as u32;
        if count >= self.threshold {
            self.approvals.remove(&action);
            Ok(MultiSigOutcome::Ready)
        } else {
            Ok(MultiSigOutcome::Pending {
                approvals: count,
                threshold: self.threshold,
            })
        }
    }

    /// Approvals collected so far for an action
    pub fn approvals_for(&self, action: Digest) -> u32 {
        self.approvals.get(&action).map(|a| a.len() as u32).unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn action() -> Digest {
        Digest::of(&[b"set-threshold", &2u32.to_le_bytes()])
    }

    #[test]
    fn test_threshold_one_executes_immediately() {
        let mut gate = MultiSigGate::new(1);
        let outcome = gate.approve(Address::derive("admin"), action()).unwrap();
        assert_eq!(outcome, MultiSigOutcome::Ready);
        assert_eq!(gate.approvals_for(action()), 0);
    }

    #[test]
    fn test_threshold_two_needs_distinct_admins() {
        let mut gate = MultiSigGate::new(2);
        let a = Address::derive("admin-a");
        let b = Address::derive("admin-b");

        let first = gate.approve(a, action()).unwrap();
        assert_eq!(
            first,
            MultiSigOutcome::Pending {
                approvals: 1,
                threshold: 2,
            }
        );

        // Duplicate approval by the same admin is rejected
        assert_eq!(gate.approve(a, action()), Err(MultiSigError::AlreadyApproved));

        let second = gate.approve(b, action()).unwrap();
        assert_eq!(second, MultiSigOutcome::Ready);
    }

    #[test]
    fn test_state_cleared_after_execution() {
        let mut gate = MultiSigGate::new(2);
        let a = Address::derive("admin-a");
        let b = Address::derive("admin-b");

        gate.approve(a, action()).unwrap();
        gate.approve(b, action()).unwrap();

        // The same action needs fresh approvals next time around
        assert_eq!(gate.approvals_for(action()), 0);
        let again = gate.approve(a, action()).unwrap();
        assert_eq!(
            again,
            MultiSigOutcome::Pending {
                approvals: 1,
                threshold: 2,
            }
        );
    }

    #[test]
    fn test_distinct_actions_tracked_separately() {
        let mut gate = MultiSigGate::new(2);
        let other = Digest::of(&[b"pause"]);
        gate.approve(Address::derive("admin-a"), action()).unwrap();
        assert_eq!(gate.approvals_for(other), 0);
    }

    #[test]
    fn test_zero_threshold_rejected() {
        let mut gate = MultiSigGate::new(1);
        assert_eq!(gate.set_threshold(0), Err(MultiSigError::ZeroThreshold));
    }
}
