//! Capability traits for external collaborators
//!
//! The gateway core never owns token mechanics, deterministic deployment or
//! signature recovery; it consumes them through the narrow traits below.
//! Each trait is the smallest surface the command handlers need, so test
//! doubles and alternative backends stay trivial to write.

use ed25519_dalek::{Signature, VerifyingKey};
use thiserror::Error;

use crate::signer::SignerSignature;
use crate::types::Address;

/// Failure reported by a collaborator behind a capability trait
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{0}")]
pub struct CapabilityError(pub String);

impl CapabilityError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

// ================================
// Signature Recovery
// ================================

/// Recovers the signer identity proven by one signature over a message hash
pub trait SignatureVerifier {
    /// Returns the identity the signature cryptographically binds to the
    /// message hash, or an error when recovery itself fails. Whether that
    /// identity carries any weight is the registry's concern, not this one's.
    fn recover(
        &self,
        message_hash: &[u8; 32],
        signature: &SignerSignature,
    ) -> Result<Address, CapabilityError>;
}

/// Default verifier: the identity is the ed25519 public key embedded in the
/// signature entry, accepted only if it verifies over the message hash.
pub struct Ed25519Verifier;

impl SignatureVerifier for Ed25519Verifier {
    fn recover(
        &self,
        message_hash: &[u8; 32],
        signature: &SignerSignature,
    ) -> Result<Address, CapabilityError> {
        let key = VerifyingKey::from_bytes(signature.signer.as_bytes())
            .map_err(|e| CapabilityError::new(format!("invalid public key: {e}")))?;
        let sig = Signature::from_bytes(&signature.signature);
        key.verify_strict(message_hash, &sig)
            .map_err(|e| CapabilityError::new(format!("signature verification failed: {e}")))?;
        Ok(signature.signer)
    }
}

// ================================
// Deterministic Deployment
// ================================

/// Deploys token contracts at salt-derived addresses and answers whether an
/// address has live code behind it
pub trait Deployer {
    fn deploy(
        &mut self,
        name: &str,
        symbol: &str,
        decimals: u8,
        salt: [u8; 32],
    ) -> Result<Address, CapabilityError>;

    fn has_code(&self, address: Address) -> bool;
}

// ================================
// Token Operations
// ================================

/// Mint/burn/transfer on a managed asset
pub trait TokenCapability {
    /// Direct mint on an internally-managed token
    fn mint(&mut self, token: Address, to: Address, amount: u64) -> Result<(), CapabilityError>;

    /// Burn-by-salt on an internally-managed token
    fn burn(&mut self, token: Address, salt: [u8; 32]) -> Result<(), CapabilityError>;

    /// Transfer on an externally-managed token. External tokens follow one of
    /// two conventions: `Ok(Some(success))` for boolean-returning transfers,
    /// `Ok(None)` for void-returning ones.
    fn transfer(
        &mut self,
        token: Address,
        to: Address,
        amount: u64,
    ) -> Result<Option<bool>, CapabilityError>;
}

// ================================
// Ephemeral Burn Receivers
// ================================

/// Handle to a live salt-addressed deposit receiver
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Receiver {
    /// Arena slot backing this receiver; meaningless after release
    pub index: usize,
    /// Address external depositors funded ahead of the burn
    pub address: Address,
}

/// Arena of disposable deposit receivers used to burn externally-managed
/// tokens: acquire a receiver for a salt, drain whatever balance it holds,
/// release it. A salt may be reused once its receiver is released.
pub trait ReceiverArena {
    fn acquire(&mut self, token: Address, salt: [u8; 32]) -> Result<Receiver, CapabilityError>;

    /// Forwards the receiver's entire balance of its token to `to`, returning
    /// the forwarded amount (zero is a valid, successful drain)
    fn drain(&mut self, receiver: &Receiver, to: Address) -> Result<u64, CapabilityError>;

    fn release(&mut self, receiver: Receiver) -> Result<(), CapabilityError>;
}
