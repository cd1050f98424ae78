//! Mock collaborators standing in for the out-of-scope contracts.

use agora_core::{Address, CallError, GovernanceNft, GovernanceTarget, RawCall, TokenTransfer};
use std::collections::HashMap;

/// Mintable, price-bearing NFT collection with custody tracking
#[derive(Default)]
pub struct MockNft {
    owners: HashMap<u64, Address>,
    prices: HashMap<u64, u128>,
    payment_token: Address,
}

impl MockNft {
    pub fn new(payment_token: Address) -> Self {
        Self {
            owners: HashMap::new(),
            prices: HashMap::new(),
            payment_token,
        }
    }

    /// Mint a token to `owner` at `price`
    pub fn mint(&mut self, token_id: u64, owner: Address, price: u128) {
        self.owners.insert(token_id, owner);
        self.prices.insert(token_id, price);
    }

    /// Current holder, None for unminted tokens
    pub fn holder(&self, token_id: u64) -> Option<Address> {
        self.owners.get(&token_id).copied()
    }
}

impl GovernanceNft for MockNft {
    fn owner_of(&self, token_id: u64) -> Result<Address, CallError> {
        self.owners
            .get(&token_id)
            .copied()
            .ok_or(CallError::Reverted("unknown token".into()))
    }

    fn purchase_price(&self, token_id: u64) -> Result<(u128, Address), CallError> {
        let price = self
            .prices
            .get(&token_id)
            .copied()
            .ok_or(CallError::Reverted("unknown token".into()))?;
        Ok((price, self.payment_token))
    }

    fn transfer(&mut self, from: Address, to: Address, token_id: u64) -> Result<(), CallError> {
        match self.owners.get(&token_id) {
            Some(owner) if *owner == from => {
                self.owners.insert(token_id, to);
                Ok(())
            }
            _ => Err(CallError::Reverted("transfer from non-owner".into())),
        }
    }
}

/// Per-(token, holder) balance ledger for reward payouts
#[derive(Default)]
pub struct MockLedger {
    balances: HashMap<(Address, Address), u128>,
}

impl MockLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Balance of `holder` in `token`
    pub fn balance_of(&self, token: Address, holder: Address) -> u128 {
        self.balances.get(&(token, holder)).copied().unwrap_or(0)
    }
}

impl TokenTransfer for MockLedger {
    fn transfer(
        &mut self,
        token: Address,
        recipient: Address,
        amount: u128,
    ) -> Result<(), CallError> {
        *self.balances.entry((token, recipient)).or_insert(0) += amount;
        Ok(())
    }
}

/// Programmable governance target: conformant by default, with a
/// fail-next-call switch for partial-failure scenarios
pub struct MockTarget {
    /// Next `execute_governance_action` or `raw_call` reverts once
    pub fail_next: bool,
    executed: Vec<(u64, Vec<u8>)>,
    raw_calls: Vec<Vec<u8>>,
}

impl MockTarget {
    pub fn new() -> Self {
        Self {
            fail_next: false,
            executed: Vec::new(),
            raw_calls: Vec::new(),
        }
    }

    /// Proposal ids dispatched so far
    pub fn executed_proposals(&self) -> Vec<u64> {
        self.executed.iter().map(|(id, _)| *id).collect()
    }

    /// Raw payloads received through the timelock path
    pub fn raw_calls(&self) -> &[Vec<u8>] {
        &self.raw_calls
    }

    fn take_failure(&mut self) -> Result<(), CallError> {
        if self.fail_next {
            self.fail_next = false;
            return Err(CallError::Reverted("target reverted".into()));
        }
        Ok(())
    }
}

impl Default for MockTarget {
    fn default() -> Self {
        Self::new()
    }
}

impl GovernanceTarget for MockTarget {
    fn execute_governance_action(
        &mut self,
        proposal_id: u64,
        data: &[u8],
    ) -> Result<bool, CallError> {
        self.take_failure()?;
        self.executed.push((proposal_id, data.to_vec()));
        Ok(true)
    }

    fn governance_parameters(&self) -> Result<Vec<u8>, CallError> {
        Ok(vec![1])
    }
}

impl RawCall for MockTarget {
    fn raw_call(&mut self, data: &[u8]) -> Result<Vec<u8>, CallError> {
        self.take_failure()?;
        self.raw_calls.push(data.to_vec());
        Ok(Vec::new())
    }
}
