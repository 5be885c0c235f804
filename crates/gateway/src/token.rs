//! Token registry: the typed table of assets the gateway may mint or burn
//!
//! The registry only records *how* each symbol is managed; the mechanics
//! live behind the token capability traits. Mutation happens exclusively
//! through the command handlers plus the narrow freeze setter.

use std::collections::HashMap;

use borsh::{BorshDeserialize, BorshSerialize};

use crate::error::GatewayError;
use crate::types::Address;

/// How an asset's mint and burn are performed
#[derive(BorshSerialize, BorshDeserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub enum TokenKind {
    /// Minted and burned directly through the gateway's own capability
    Internal,
    /// Pre-existing contract; moved through its transfer convention and
    /// burned by draining salt-addressed receivers
    External,
}

/// Registry entry for one symbol
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TokenEntry {
    pub address: Address,
    pub kind: TokenKind,
    pub frozen: bool,
}

/// Symbol-keyed token table
#[derive(Default)]
pub struct TokenRegistry {
    entries: HashMap<String, TokenEntry>,
}

impl TokenRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a new symbol; fails `TokenAlreadyExists` without touching
    /// the existing entry
    pub fn register(
        &mut self,
        symbol: &str,
        address: Address,
        kind: TokenKind,
    ) -> Result<(), GatewayError> {
        if self.entries.contains_key(symbol) {
            return Err(GatewayError::TokenAlreadyExists(symbol.to_string()));
        }
        self.entries.insert(
            symbol.to_string(),
            TokenEntry {
                address,
                kind,
                frozen: false,
            },
        );
        Ok(())
    }

    pub fn get(&self, symbol: &str) -> Option<&TokenEntry> {
        self.entries.get(symbol)
    }

    pub fn contains(&self, symbol: &str) -> bool {
        self.entries.contains_key(symbol)
    }

    /// Narrow setter: flips the frozen flag for a registered symbol
    pub fn set_frozen(&mut self, symbol: &str, frozen: bool) -> Result<(), GatewayError> {
        let entry = self
            .entries
            .get_mut(symbol)
            .ok_or_else(|| GatewayError::TokenDoesNotExist(symbol.to_string()))?;
        entry.frozen = frozen;
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
