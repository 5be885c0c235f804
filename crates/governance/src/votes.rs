//! Weighted multisig voting over the current epoch's signer set
//!
//! One round per (operation, epoch): each current-epoch signer votes once,
//! its weight joins the tally, and reaching the threshold clears the round
//! so the identical call data can be voted on again later. The epoch and
//! threshold snapshot is whatever is current when each individual vote is
//! cast; a superseded signer cannot vote even on a round raised earlier.

use std::collections::{HashMap, HashSet};

use borsh::{BorshDeserialize, BorshSerialize};

use meridian_gateway::{hash, Address, Epoch, SignerRegistry};

use crate::error::GovernanceError;
use crate::executor::CallExecutor;
use crate::OPERATION_SEED;

/// A call wrapped for multisig voting
#[derive(BorshSerialize, BorshDeserialize, Clone, Debug, PartialEq, Eq)]
pub struct GovernanceCall {
    pub target: Address,
    pub payload: Vec<u8>,
    pub value: u64,
}

/// Hash identifying one voted operation
pub fn operation_hash(call: &GovernanceCall) -> [u8; 32] {
    let encoded = borsh::to_vec(call).expect("call serialization cannot fail");
    hash::tagged(OPERATION_SEED, &encoded)
}

/// Result of one cast vote
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VoteReceipt {
    pub operation_hash: [u8; 32],
    pub epoch: Epoch,
    pub tally: u128,
    pub threshold: u128,
    /// Threshold reached by this vote; the round has been cleared
    pub executed: bool,
}

#[derive(Default)]
struct VoteRound {
    voters: HashSet<Address>,
    tally: u128,
}

/// Per-(operation, epoch) vote rounds
#[derive(Default)]
pub struct VoteLedger {
    rounds: HashMap<([u8; 32], Epoch), VoteRound>,
}

impl VoteLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records one vote against the current epoch's set. `NotSigner` for
    /// non-members, `AlreadyVoted` for a second vote on the same round. On
    /// threshold the round is cleared and the receipt marks `executed`.
    pub fn cast_vote(
        &mut self,
        caller: Address,
        operation_hash: [u8; 32],
        registry: &SignerRegistry,
    ) -> Result<VoteReceipt, GovernanceError> {
        let set = registry.current_set().ok_or(GovernanceError::NotSigner)?;
        let weight = set
            .weight_of(caller)
            .ok_or(GovernanceError::NotSigner)?;
        let epoch = registry.current_epoch();

        let round = self.rounds.entry((operation_hash, epoch)).or_default();
        if !round.voters.insert(caller) {
            return Err(GovernanceError::AlreadyVoted);
        }
        round.tally = round.tally.saturating_add(weight);
        let tally = round.tally;

        let executed = tally >= set.threshold;
        if executed {
            // Fresh rounds for the same call data start from zero
            self.rounds.remove(&(operation_hash, epoch));
        }
        tracing::debug!(
            operation = %Address::new(operation_hash),
            epoch,
            voter = %caller,
            tally = %tally,
            threshold = %set.threshold,
            executed,
            "vote cast"
        );
        Ok(VoteReceipt {
            operation_hash,
            epoch,
            tally,
            threshold: set.threshold,
            executed,
        })
    }

    /// Votes on a wrapped call and executes it when this vote reaches the
    /// threshold. A below-threshold vote is valid and terminal: no execution,
    /// no error, and any attached value goes back to the caller.
    pub fn vote_and_maybe_execute(
        &mut self,
        caller: Address,
        call: &GovernanceCall,
        registry: &SignerRegistry,
        executor: &mut dyn CallExecutor,
    ) -> Result<VoteReceipt, GovernanceError> {
        let receipt = self.cast_vote(caller, operation_hash(call), registry)?;
        if receipt.executed {
            executor
                .call(call.target, &call.payload, call.value)
                .map_err(|e| GovernanceError::ExecutionFailed(e.to_string()))?;
        } else if call.value > 0 {
            executor
                .refund(caller, call.value)
                .map_err(|e| GovernanceError::ExecutionFailed(e.to_string()))?;
        }
        Ok(receipt)
    }

    /// Running tally of a round; zero when no round is open
    pub fn tally(&self, operation_hash: [u8; 32], epoch: Epoch) -> u128 {
        self.rounds
            .get(&(operation_hash, epoch))
            .map_or(0, |round| round.tally)
    }

    pub fn has_voted(&self, operation_hash: [u8; 32], epoch: Epoch, voter: Address) -> bool {
        self.rounds
            .get(&(operation_hash, epoch))
            .is_some_and(|round| round.voters.contains(&voter))
    }
}
