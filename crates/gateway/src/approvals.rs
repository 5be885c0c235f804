//! Contract-call approvals: one-shot flags consumed by downstream targets
//!
//! An approve command records the flag; the target later validates and
//! consumes it in a single step. Keys are domain-separated hashes over the
//! full (source, contract, payload) binding so one approval can never
//! authorize a call claiming a different origin. Consumption clears the
//! flag; leaving it set would be a replay surface.

use std::collections::HashSet;

use crate::hash;
use crate::types::Address;
use crate::{CONTRACT_CALL_MINT_SEED, CONTRACT_CALL_SEED};

/// Approval key for a plain contract call
pub fn contract_call_key(
    source_domain: &str,
    source_address: Address,
    contract: Address,
    payload_hash: [u8; 32],
) -> [u8; 32] {
    let encoded = borsh::to_vec(&(source_domain, source_address, contract, payload_hash))
        .expect("approval key serialization cannot fail");
    hash::tagged(CONTRACT_CALL_SEED, &encoded)
}

/// Approval key for a contract call carrying a mint
pub fn contract_call_with_mint_key(
    source_domain: &str,
    source_address: Address,
    contract: Address,
    payload_hash: [u8; 32],
    symbol: &str,
    amount: u64,
) -> [u8; 32] {
    let encoded = borsh::to_vec(&(
        source_domain,
        source_address,
        contract,
        payload_hash,
        symbol,
        amount,
    ))
    .expect("approval key serialization cannot fail");
    hash::tagged(CONTRACT_CALL_MINT_SEED, &encoded)
}

/// Set of currently-approved call keys
#[derive(Default)]
pub struct ApprovalLedger {
    approved: HashSet<[u8; 32]>,
}

impl ApprovalLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records an approval; re-approving an already-set key is a no-op
    pub fn approve(&mut self, key: [u8; 32]) {
        self.approved.insert(key);
    }

    pub fn is_approved(&self, key: [u8; 32]) -> bool {
        self.approved.contains(&key)
    }

    /// Validates and clears in one step; returns whether the flag was set
    pub fn consume(&mut self, key: [u8; 32]) -> bool {
        self.approved.remove(&key)
    }
}
