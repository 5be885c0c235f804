//! Call execution capability
//!
//! Governance never invokes targets directly; the executor collaborator
//! carries the call and any attached value, and returns value to a voter
//! when a vote does not execute.

use meridian_gateway::{Address, CapabilityError};

/// Invokes arbitrary external targets on behalf of governance
pub trait CallExecutor {
    fn call(&mut self, target: Address, payload: &[u8], value: u64) -> Result<(), CapabilityError>;

    /// Returns attached value to a caller whose vote did not execute; no
    /// funds may be stranded in the governance layer
    fn refund(&mut self, to: Address, value: u64) -> Result<(), CapabilityError>;
}
