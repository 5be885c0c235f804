//! Governance dispatcher: command intake and the two execution paths
//!
//! Commands reach governance as gateway-approved contract calls from one
//! distinguished (source chain, source address) pair; anything else is
//! `NotGovernance`. Scheduling and cancellation drive the timelock;
//! approve/cancel-multisig drive the one-shot flag consumed by the
//! signer-voted execution path. The two execution entry points are public
//! and independent of each other.

use std::collections::HashSet;

use borsh::{BorshDeserialize, BorshSerialize};

use meridian_gateway::{hash, Address, CommandProcessor, SignerRegistry};

use crate::error::GovernanceError;
use crate::events::GovernanceEvent;
use crate::executor::CallExecutor;
use crate::timelock::{proposal_hash, TimelockRegister};
use crate::votes::{GovernanceCall, VoteLedger, VoteReceipt};

/// Governance commands carried in approved contract-call payloads
#[derive(BorshSerialize, BorshDeserialize, Clone, Debug, PartialEq, Eq)]
pub enum GovernanceCommand {
    /// Put (target, payload, value) behind the timelock at the given eta
    /// (clamped up to the minimum delay)
    ScheduleProposal {
        target: Address,
        payload: Vec<u8>,
        value: u64,
        eta: u64,
    },
    CancelProposal {
        target: Address,
        payload: Vec<u8>,
        value: u64,
    },
    /// Arm the one-shot multisig flag for (target, payload, value)
    ApproveMultisigProposal {
        target: Address,
        payload: Vec<u8>,
        value: u64,
    },
    CancelMultisigApproval {
        target: Address,
        payload: Vec<u8>,
        value: u64,
    },
}

/// The distinguished origin governance commands must carry
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GovernanceSource {
    pub domain: String,
    pub address: Address,
}

/// Wires the timelock, the vote ledger and the multisig flags together over
/// the gateway's approval and signer machinery
pub struct GovernanceDispatcher {
    source: GovernanceSource,
    /// This component's own address, the `contract` of its gateway approvals
    address: Address,
    timelock: TimelockRegister,
    votes: VoteLedger,
    multisig_approvals: HashSet<[u8; 32]>,
    executor: Box<dyn CallExecutor>,
    events: Vec<GovernanceEvent>,
}

impl GovernanceDispatcher {
    pub fn new(
        source: GovernanceSource,
        address: Address,
        minimum_delay: u64,
        executor: Box<dyn CallExecutor>,
    ) -> Self {
        Self {
            source,
            address,
            timelock: TimelockRegister::new(minimum_delay),
            votes: VoteLedger::new(),
            multisig_approvals: HashSet::new(),
            executor,
            events: Vec::new(),
        }
    }

    // ================================
    // Command Intake
    // ================================

    /// Consumes one validated governance command. The claimed origin must
    /// match the configured governance source, and the gateway must hold an
    /// approval for exactly this payload; the approval is consumed here.
    pub fn execute_command(
        &mut self,
        gateway: &mut CommandProcessor,
        source_domain: &str,
        source_address: Address,
        payload: &[u8],
        now: u64,
    ) -> Result<(), GovernanceError> {
        if source_domain != self.source.domain || source_address != self.source.address {
            return Err(GovernanceError::NotGovernance);
        }

        let payload_hash = hash::sha256(payload);
        if !gateway.validate_contract_call(source_domain, source_address, self.address, payload_hash)
        {
            return Err(GovernanceError::CallNotApproved);
        }

        let command = GovernanceCommand::try_from_slice(payload)
            .map_err(|_| GovernanceError::InvalidCommandPayload)?;
        self.dispatch(command, now)
    }

    fn dispatch(&mut self, command: GovernanceCommand, now: u64) -> Result<(), GovernanceError> {
        match command {
            GovernanceCommand::ScheduleProposal {
                target,
                payload,
                value,
                eta,
            } => {
                let proposal = proposal_hash(target, &payload, value);
                let eta = self.timelock.schedule(proposal, eta, now)?;
                self.record(GovernanceEvent::ProposalScheduled {
                    proposal_hash: proposal,
                    eta,
                });
            }
            GovernanceCommand::CancelProposal {
                target,
                payload,
                value,
            } => {
                let proposal = proposal_hash(target, &payload, value);
                self.timelock.cancel(proposal);
                self.record(GovernanceEvent::ProposalCancelled {
                    proposal_hash: proposal,
                });
            }
            GovernanceCommand::ApproveMultisigProposal {
                target,
                payload,
                value,
            } => {
                let proposal = proposal_hash(target, &payload, value);
                self.multisig_approvals.insert(proposal);
                self.record(GovernanceEvent::MultisigApproved {
                    proposal_hash: proposal,
                });
            }
            GovernanceCommand::CancelMultisigApproval {
                target,
                payload,
                value,
            } => {
                let proposal = proposal_hash(target, &payload, value);
                self.multisig_approvals.remove(&proposal);
                self.record(GovernanceEvent::MultisigApprovalCancelled {
                    proposal_hash: proposal,
                });
            }
        }
        Ok(())
    }

    // ================================
    // Execution Paths
    // ================================

    /// Timelocked path: recomputes the proposal hash and defers to the
    /// register's ready/clear/call semantics
    pub fn execute_proposal(
        &mut self,
        target: Address,
        payload: &[u8],
        value: u64,
        now: u64,
    ) -> Result<(), GovernanceError> {
        let proposal = proposal_hash(target, payload, value);
        self.timelock
            .execute(proposal, target, payload, value, now, self.executor.as_mut())?;
        self.record(GovernanceEvent::ProposalExecuted {
            proposal_hash: proposal,
        });
        Ok(())
    }

    /// Multisig path, independent of any timelock: current-epoch signers
    /// vote by calling this; the vote that reaches the threshold consumes
    /// the one-shot approval flag and runs the call.
    pub fn execute_multisig_proposal(
        &mut self,
        registry: &SignerRegistry,
        caller: Address,
        target: Address,
        payload: &[u8],
        value: u64,
    ) -> Result<VoteReceipt, GovernanceError> {
        if !registry.is_current_signer(caller) {
            return Err(GovernanceError::NotSigner);
        }
        let proposal = proposal_hash(target, payload, value);
        if !self.multisig_approvals.contains(&proposal) {
            return Err(GovernanceError::NotApproved);
        }

        let receipt = self.votes.cast_vote(caller, proposal, registry)?;
        self.record(GovernanceEvent::VoteCast {
            operation_hash: receipt.operation_hash,
            epoch: receipt.epoch,
            voter: caller,
            tally: receipt.tally,
            threshold: receipt.threshold,
        });
        if receipt.executed {
            // One-shot: the flag is gone before the target runs
            self.multisig_approvals.remove(&proposal);
            self.executor
                .call(target, payload, value)
                .map_err(|e| GovernanceError::ExecutionFailed(e.to_string()))?;
            self.record(GovernanceEvent::MultisigExecuted {
                proposal_hash: proposal,
            });
        }
        Ok(receipt)
    }

    /// General voted execution of an arbitrary wrapped call
    pub fn vote_and_maybe_execute(
        &mut self,
        registry: &SignerRegistry,
        caller: Address,
        call: &GovernanceCall,
    ) -> Result<VoteReceipt, GovernanceError> {
        let receipt =
            self.votes
                .vote_and_maybe_execute(caller, call, registry, self.executor.as_mut())?;
        self.record(GovernanceEvent::VoteCast {
            operation_hash: receipt.operation_hash,
            epoch: receipt.epoch,
            voter: caller,
            tally: receipt.tally,
            threshold: receipt.threshold,
        });
        if receipt.executed {
            self.record(GovernanceEvent::OperationExecuted {
                operation_hash: receipt.operation_hash,
            });
        }
        Ok(receipt)
    }

    // ================================
    // Queries
    // ================================

    /// Eta of a scheduled proposal; zero when unscheduled
    pub fn proposal_eta(&self, target: Address, payload: &[u8], value: u64) -> u64 {
        self.timelock.eta(proposal_hash(target, payload, value))
    }

    pub fn is_multisig_approved(&self, target: Address, payload: &[u8], value: u64) -> bool {
        self.multisig_approvals
            .contains(&proposal_hash(target, payload, value))
    }

    pub fn timelock(&self) -> &TimelockRegister {
        &self.timelock
    }

    /// Drains the accumulated event records
    pub fn take_events(&mut self) -> Vec<GovernanceEvent> {
        std::mem::take(&mut self.events)
    }

    fn record(&mut self, event: GovernanceEvent) {
        tracing::debug!(?event, "governance event");
        self.events.push(event);
    }
}
