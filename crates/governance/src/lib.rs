//! Governance layered on the gateway's authorization machinery
//!
//! Governance commands arrive as gateway-approved contract calls from one
//! distinguished source chain/address. The dispatcher maps them onto a
//! minimum-delay timelock and a one-shot multisig approval flag, and exposes
//! the two public execution paths: timelocked `execute_proposal` and
//! signer-voted `execute_multisig_proposal`. Weighted voting reuses the
//! gateway's current-epoch signer set; no authorization state is duplicated
//! here.

// ================================
// Module Declarations
// ================================

pub mod dispatcher;
pub mod error;
pub mod events;
pub mod executor;
pub mod timelock;
pub mod votes;

// ================================
// Public API Exports
// ================================

pub use dispatcher::{GovernanceCommand, GovernanceDispatcher, GovernanceSource};
pub use error::GovernanceError;
pub use events::GovernanceEvent;
pub use executor::CallExecutor;
pub use timelock::{proposal_hash, TimelockRegister};
pub use votes::{operation_hash, GovernanceCall, VoteLedger, VoteReceipt};

// ================================
// Hash Domain Seeds
// ================================

/// Seed for proposal hashes over (target, payload, value)
pub const PROPOSAL_SEED: &[u8] = b"proposal";

/// Seed for multisig operation hashes over a wrapped call
pub const OPERATION_SEED: &[u8] = b"multisig-operation";
