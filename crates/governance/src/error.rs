// Error system for the governance layer
//
// Authorization failures reject before any mutation. `AlreadyVoted` is the
// one intentional hard failure signalling client misuse rather than a
// benign race; duplicate cancels and command replays are safe no-ops
// handled upstream.

use thiserror::Error;

/// Errors surfaced by governance dispatch, voting and the timelock
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GovernanceError {
    // ===== Authorization =====
    /// Command did not originate from the configured governance source
    #[error("not the governance source")]
    NotGovernance,

    /// Caller is not a member of the current epoch's signer set
    #[error("caller is not a current-epoch signer")]
    NotSigner,

    /// One vote per signer per (operation, epoch)
    #[error("signer has already voted for this operation")]
    AlreadyVoted,

    /// Multisig execution requires the one-shot approval flag
    #[error("multisig approval is not set for this proposal")]
    NotApproved,

    /// No gateway approval exists for this governance call
    #[error("contract call is not approved by the gateway")]
    CallNotApproved,

    // ===== Validation =====
    #[error("malformed governance command payload")]
    InvalidCommandPayload,

    /// A proposal hash may only hold one pending eta at a time
    #[error("proposal is already scheduled")]
    AlreadyScheduled,

    // ===== Execution =====
    /// Proposal eta is unset or still in the future
    #[error("proposal is not ready for execution")]
    NotReady,

    /// The target invocation failed; proposal state is already cleared and
    /// the call must be rescheduled
    #[error("target invocation failed: {0}")]
    ExecutionFailed(String),
}
