//! Typed records of governance state transitions

use meridian_gateway::Address;

/// State transitions observable from outside the governance layer
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GovernanceEvent {
    ProposalScheduled {
        proposal_hash: [u8; 32],
        eta: u64,
    },
    ProposalCancelled {
        proposal_hash: [u8; 32],
    },
    ProposalExecuted {
        proposal_hash: [u8; 32],
    },
    MultisigApproved {
        proposal_hash: [u8; 32],
    },
    MultisigApprovalCancelled {
        proposal_hash: [u8; 32],
    },
    MultisigExecuted {
        proposal_hash: [u8; 32],
    },
    /// One signer's vote toward a weighted threshold
    VoteCast {
        operation_hash: [u8; 32],
        epoch: u64,
        voter: Address,
        tally: u128,
        threshold: u128,
    },
    /// A voted operation reached threshold and its wrapped call ran
    OperationExecuted {
        operation_hash: [u8; 32],
    },
}
