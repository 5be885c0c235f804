// Error system for gateway command processing
//
// Errors are grouped by functional domain: batch/signer validation rejects
// before any mutation, authorization failures reject before any mutation,
// and command-handler failures are contained per command by the batch loop.
// A replayed command id is not an error at all; the loop reports it as a
// skipped outcome.

use thiserror::Error;

use crate::types::Address;

/// Errors surfaced by the gateway core
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GatewayError {
    // ===== Signer Set & Signature Validation =====
    /// Signer set fails structural validation, or no retained epoch is
    /// satisfied by a signature set
    #[error("invalid signer set")]
    InvalidSigners,

    /// A signature failed recovery itself, before any weight check
    #[error("malformed signature: {0}")]
    MalformedSignature(String),

    /// Batch-level verification failed against every retained epoch
    #[error("invalid signatures for command batch")]
    InvalidSignatures,

    // ===== Batch Shape Validation =====
    /// Wire bytes that do not decode to a batch, including unrecognized
    /// command kinds
    #[error("undecodable command batch: {0}")]
    UndecodableBatch(String),

    #[error("command batch is empty")]
    EmptyBatch,

    #[error("command batch exceeds the command capacity")]
    BatchTooLarge,

    #[error("too many signatures on command batch")]
    TooManySignatures,

    /// The batch names a chain domain this gateway does not serve
    #[error("command batch domain mismatch")]
    InvalidDomain,

    // ===== Token Registry =====
    #[error("token {0} already exists")]
    TokenAlreadyExists(String),

    #[error("token {0} does not exist")]
    TokenDoesNotExist(String),

    /// An externally-managed token address with no live code behind it
    #[error("address {0} is not a token contract")]
    NotAToken(Address),

    #[error("token {0} is frozen")]
    TokenIsFrozen(String),

    /// External token reported failure through its boolean convention
    #[error("token transfer reported failure")]
    TransferFailed,

    // ===== Capability Failures =====
    /// A collaborator behind a capability trait failed
    #[error("capability call failed: {0}")]
    Capability(String),
}
