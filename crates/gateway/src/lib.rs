//! Gateway trust core - authenticates signed command batches and applies them
//!
//! The gateway is the entry point for cross-chain state changes: an off-chain
//! weighted signer set co-signs batches of commands, the gateway verifies the
//! batch against the epoch-scoped signer registry, then dispatches each
//! command to its typed handler with at-most-once replay protection. Token
//! mechanics, deterministic deployment and signature recovery are consumed
//! through narrow capability traits rather than owned here.

// ================================
// Module Declarations
// ================================

pub mod approvals;
pub mod capability;
pub mod command;
pub mod error;
pub mod events;
pub mod hash;
pub mod processor;
pub mod signer;
pub mod token;
pub mod types;

// ================================
// Public API Exports
// ================================

pub use approvals::ApprovalLedger;
pub use capability::{
    CapabilityError, Deployer, Ed25519Verifier, Receiver, ReceiverArena, SignatureVerifier,
    TokenCapability,
};
pub use command::{Command, CommandBatch, CommandPayload, SignedBatch};
pub use error::GatewayError;
pub use events::GatewayEvent;
pub use processor::{CommandOutcome, CommandProcessor, GatewayConfig};
pub use signer::{Epoch, SignerRegistry, SignerSet, SignerSignature, WeightedSigner};
pub use token::{TokenEntry, TokenKind, TokenRegistry};
pub use types::{Address, CommandId};

// ================================
// Capacity Constants
// ================================

/// Number of past signer-set epochs a batch signature may still validate
/// against. In-flight batches signed just before a rotation keep clearing,
/// while verification cost and historical trust stay bounded.
pub const SIGNER_RETENTION_EPOCHS: u64 = 16;

/// Maximum number of commands accepted in a single batch
pub const MAX_BATCH_COMMANDS: usize = 64;

/// Maximum number of signatures accepted on a single batch
pub const MAX_BATCH_SIGNATURES: usize = 128;

// ================================
// Hash Domain Seeds
// ================================

/// Seed for the canonical hash of a signer set
pub const SIGNER_SET_SEED: &[u8] = b"signer-set";

/// Seed for the hash a batch's signatures are verified against
pub const COMMAND_BATCH_SEED: &[u8] = b"command-batch";

/// Seed for contract-call approval keys
pub const CONTRACT_CALL_SEED: &[u8] = b"contract-call";

/// Seed for contract-call-with-mint approval keys
pub const CONTRACT_CALL_MINT_SEED: &[u8] = b"contract-call-mint";

/// Seed for the deployment salt derived from a token symbol
pub const TOKEN_SALT_SEED: &[u8] = b"token-salt";
