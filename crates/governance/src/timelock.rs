//! Timelocked proposals: eta-gated calls behind a minimum delay floor
//!
//! A proposal hash maps to its eta; zero means not scheduled (or cancelled).
//! Scheduling clamps the requested eta up to the floor instead of rejecting,
//! cancellation is unconditional, and execution clears the eta before
//! invoking the target so a re-entrant call finds the proposal gone.

use std::collections::HashMap;

use meridian_gateway::{hash, Address};

use crate::error::GovernanceError;
use crate::executor::CallExecutor;
use crate::PROPOSAL_SEED;

/// Hash identifying one proposal: domain-tagged over (target, payload, value)
pub fn proposal_hash(target: Address, payload: &[u8], value: u64) -> [u8; 32] {
    let encoded = borsh::to_vec(&(target, payload.to_vec(), value))
        .expect("proposal serialization cannot fail");
    hash::tagged(PROPOSAL_SEED, &encoded)
}

/// Eta register for scheduled proposals
pub struct TimelockRegister {
    minimum_delay: u64,
    etas: HashMap<[u8; 32], u64>,
}

impl TimelockRegister {
    pub fn new(minimum_delay: u64) -> Self {
        Self {
            minimum_delay,
            etas: HashMap::new(),
        }
    }

    pub fn minimum_delay(&self) -> u64 {
        self.minimum_delay
    }

    /// Current eta of a proposal; zero when not scheduled
    pub fn eta(&self, proposal_hash: [u8; 32]) -> u64 {
        self.etas.get(&proposal_hash).copied().unwrap_or(0)
    }

    /// Schedules a proposal, clamping the requested eta up to
    /// `now + minimum_delay`. The delay floor is always enforced; an early
    /// eta is never a reason to reject. Returns the final eta.
    pub fn schedule(
        &mut self,
        proposal_hash: [u8; 32],
        requested_eta: u64,
        now: u64,
    ) -> Result<u64, GovernanceError> {
        if self.eta(proposal_hash) != 0 {
            return Err(GovernanceError::AlreadyScheduled);
        }
        let eta = requested_eta.max(now.saturating_add(self.minimum_delay));
        self.etas.insert(proposal_hash, eta);
        tracing::info!(proposal = %Address::new(proposal_hash), eta, "proposal scheduled");
        Ok(eta)
    }

    /// Unconditionally clears the eta; idempotent and always succeeds
    pub fn cancel(&mut self, proposal_hash: [u8; 32]) {
        if self.etas.remove(&proposal_hash).is_some() {
            tracing::info!(proposal = %Address::new(proposal_hash), "proposal cancelled");
        }
    }

    /// Executes a ready proposal through the executor capability. The eta is
    /// cleared before the target call, so failure leaves the proposal
    /// unscheduled and it must go through `schedule` again.
    pub fn execute(
        &mut self,
        proposal_hash: [u8; 32],
        target: Address,
        payload: &[u8],
        value: u64,
        now: u64,
        executor: &mut dyn CallExecutor,
    ) -> Result<(), GovernanceError> {
        let eta = self.eta(proposal_hash);
        if eta == 0 || now < eta {
            return Err(GovernanceError::NotReady);
        }
        self.etas.remove(&proposal_hash);
        executor
            .call(target, payload, value)
            .map_err(|e| GovernanceError::ExecutionFailed(e.to_string()))?;
        tracing::info!(proposal = %Address::new(proposal_hash), "proposal executed");
        Ok(())
    }
}
