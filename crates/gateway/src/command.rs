//! Wire format of signed command batches
//!
//! A batch names the chain domain it is bound for and carries an ordered
//! list of commands, each with a unique id and one payload variant from the
//! closed command set. Signatures are taken over the domain-tagged hash of
//! the borsh encoding, so any reordering or mutation invalidates them.

use borsh::{BorshDeserialize, BorshSerialize};

use crate::error::GatewayError;
use crate::hash;
use crate::signer::{SignerSet, SignerSignature};
use crate::types::{Address, CommandId};
use crate::{COMMAND_BATCH_SEED, MAX_BATCH_COMMANDS, MAX_BATCH_SIGNATURES};

/// Payload of one command; the set is closed and unrecognized kinds are
/// unrepresentable on the typed path (decoding rejects them)
#[derive(BorshSerialize, BorshDeserialize, Clone, Debug, PartialEq, Eq)]
pub enum CommandPayload {
    /// Register a token symbol: freshly deployed when `address` is absent,
    /// adopted as externally-managed when present
    DeployToken {
        name: String,
        symbol: String,
        decimals: u8,
        address: Option<Address>,
    },
    /// Mint (or transfer out, for external tokens) to a recipient
    MintToken {
        symbol: String,
        to: Address,
        amount: u64,
    },
    /// Burn the deposits accumulated at a salt-addressed receiver
    BurnToken { symbol: String, salt: [u8; 32] },
    /// Record a one-shot approval for a downstream contract call
    ApproveContractCall {
        source_domain: String,
        source_address: Address,
        contract: Address,
        payload_hash: [u8; 32],
    },
    /// Approval that additionally carries a token mint
    ApproveContractCallWithMint {
        source_domain: String,
        source_address: Address,
        contract: Address,
        payload_hash: [u8; 32],
        symbol: String,
        amount: u64,
    },
    /// Rotate the signer registry to a new weighted set
    TransferOperatorship { signers: SignerSet },
}

/// One command: replay-guarded id plus its payload
#[derive(BorshSerialize, BorshDeserialize, Clone, Debug, PartialEq, Eq)]
pub struct Command {
    pub id: CommandId,
    pub payload: CommandPayload,
}

/// Ordered command list bound to one chain domain
#[derive(BorshSerialize, BorshDeserialize, Clone, Debug, PartialEq, Eq)]
pub struct CommandBatch {
    pub domain: [u8; 32],
    pub commands: Vec<Command>,
}

impl CommandBatch {
    /// Shape validation, applied before any signature work
    pub fn validate(&self) -> Result<(), GatewayError> {
        if self.commands.is_empty() {
            return Err(GatewayError::EmptyBatch);
        }
        if self.commands.len() > MAX_BATCH_COMMANDS {
            return Err(GatewayError::BatchTooLarge);
        }
        Ok(())
    }

    /// The hash the signer set co-signs
    pub fn hash(&self) -> [u8; 32] {
        let encoded = borsh::to_vec(self).expect("command batch serialization cannot fail");
        hash::tagged(COMMAND_BATCH_SEED, &encoded)
    }
}

/// A batch together with the signatures authenticating it
#[derive(BorshSerialize, BorshDeserialize, Clone, Debug, PartialEq, Eq)]
pub struct SignedBatch {
    pub batch: CommandBatch,
    pub signatures: Vec<SignerSignature>,
}

impl SignedBatch {
    pub fn validate(&self) -> Result<(), GatewayError> {
        self.batch.validate()?;
        if self.signatures.len() > MAX_BATCH_SIGNATURES {
            return Err(GatewayError::TooManySignatures);
        }
        Ok(())
    }

    /// Decodes a batch from its wire bytes; any unrecognized command kind or
    /// truncated field fails the whole batch before verification
    pub fn decode(bytes: &[u8]) -> Result<Self, GatewayError> {
        Self::try_from_slice(bytes).map_err(|e| GatewayError::UndecodableBatch(e.to_string()))
    }
}
