//! Typed records of gateway state transitions
//!
//! Events accumulate on the processor and are drained by the embedder
//! (relayer, indexer, test harness). Every event is also mirrored to a
//! `tracing` log line at the point it is recorded.

use crate::token::TokenKind;
use crate::types::{Address, CommandId};

/// State transitions observable from outside the gateway
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GatewayEvent {
    /// A new signer set took over as the current epoch
    SignersRotated {
        epoch: u64,
        set_hash: [u8; 32],
        signer_count: usize,
    },
    CommandExecuted {
        id: CommandId,
    },
    /// Replay of an already-executed command id; a safe no-op
    CommandSkipped {
        id: CommandId,
    },
    /// The handler failed; the id stays retryable
    CommandFailed {
        id: CommandId,
        reason: String,
    },
    TokenDeployed {
        symbol: String,
        address: Address,
        kind: TokenKind,
    },
    TokenMinted {
        symbol: String,
        to: Address,
        amount: u64,
    },
    /// `amount` is the drained receiver balance for external tokens; absent
    /// for internal burns where the capability owns the accounting
    TokenBurned {
        symbol: String,
        salt: [u8; 32],
        amount: Option<u64>,
    },
    ContractCallApproved {
        source_domain: String,
        source_address: Address,
        contract: Address,
        payload_hash: [u8; 32],
    },
    ContractCallApprovedWithMint {
        source_domain: String,
        source_address: Address,
        contract: Address,
        payload_hash: [u8; 32],
        symbol: String,
        amount: u64,
    },
}
