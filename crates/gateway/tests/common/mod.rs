//! Shared test harness: deterministic keys and mock capability collaborators
#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::rc::Rc;

use ed25519_dalek::{Signer, SigningKey};

use meridian_gateway::{
    Address, CapabilityError, Command, CommandBatch, CommandId, CommandPayload, CommandProcessor,
    Deployer, Ed25519Verifier, GatewayConfig, Receiver, ReceiverArena, SignedBatch, SignerSet,
    SignerSignature, TokenCapability, WeightedSigner,
};

pub const DOMAIN: [u8; 32] = [7u8; 32];
pub const COLLECTOR: Address = Address([9u8; 32]);

// ================================
// Mock Deployer
// ================================

#[derive(Default)]
pub struct DeployerState {
    pub deployed: Vec<(String, String, u8, [u8; 32])>,
    pub live_code: HashSet<Address>,
    pub fail: bool,
}

#[derive(Clone, Default)]
pub struct MockDeployer(pub Rc<RefCell<DeployerState>>);

impl Deployer for MockDeployer {
    fn deploy(
        &mut self,
        name: &str,
        symbol: &str,
        decimals: u8,
        salt: [u8; 32],
    ) -> Result<Address, CapabilityError> {
        let mut state = self.0.borrow_mut();
        if state.fail {
            return Err(CapabilityError::new("deployer offline"));
        }
        state
            .deployed
            .push((name.to_string(), symbol.to_string(), decimals, salt));
        // Salt-derived deterministic address
        Ok(Address::new(salt))
    }

    fn has_code(&self, address: Address) -> bool {
        self.0.borrow().live_code.contains(&address)
    }
}

// ================================
// Mock Token Capability
// ================================

#[derive(Default)]
pub struct TokenState {
    pub mints: Vec<(Address, Address, u64)>,
    pub burns: Vec<(Address, [u8; 32])>,
    pub transfers: Vec<(Address, Address, u64)>,
    /// Convention switch: `Some(..)` boolean-returning, `None` void-returning
    pub transfer_result: Option<bool>,
    pub fail_mints: bool,
}

#[derive(Clone, Default)]
pub struct MockTokens(pub Rc<RefCell<TokenState>>);

impl TokenCapability for MockTokens {
    fn mint(&mut self, token: Address, to: Address, amount: u64) -> Result<(), CapabilityError> {
        let mut state = self.0.borrow_mut();
        if state.fail_mints {
            return Err(CapabilityError::new("mint capability failed"));
        }
        state.mints.push((token, to, amount));
        Ok(())
    }

    fn burn(&mut self, token: Address, salt: [u8; 32]) -> Result<(), CapabilityError> {
        self.0.borrow_mut().burns.push((token, salt));
        Ok(())
    }

    fn transfer(
        &mut self,
        token: Address,
        to: Address,
        amount: u64,
    ) -> Result<Option<bool>, CapabilityError> {
        let mut state = self.0.borrow_mut();
        state.transfers.push((token, to, amount));
        Ok(state.transfer_result)
    }
}

// ================================
// Mock Receiver Arena
// ================================

#[derive(Default)]
pub struct ArenaState {
    /// Pre-funded balances keyed by (token, salt)
    pub balances: HashMap<(Address, [u8; 32]), u64>,
    /// Live receiver slots: index -> (token, salt)
    pub active: HashMap<usize, (Address, [u8; 32])>,
    pub drains: Vec<(Address, u64)>,
    pub next_index: usize,
}

#[derive(Clone, Default)]
pub struct MockArena(pub Rc<RefCell<ArenaState>>);

impl MockArena {
    pub fn fund(&self, token: Address, salt: [u8; 32], amount: u64) {
        self.0.borrow_mut().balances.insert((token, salt), amount);
    }
}

impl ReceiverArena for MockArena {
    fn acquire(&mut self, token: Address, salt: [u8; 32]) -> Result<Receiver, CapabilityError> {
        let mut state = self.0.borrow_mut();
        let index = state.next_index;
        state.next_index += 1;
        state.active.insert(index, (token, salt));
        Ok(Receiver {
            index,
            address: Address::new(salt),
        })
    }

    fn drain(&mut self, receiver: &Receiver, to: Address) -> Result<u64, CapabilityError> {
        let mut state = self.0.borrow_mut();
        let key = *state
            .active
            .get(&receiver.index)
            .ok_or_else(|| CapabilityError::new("drain of released receiver"))?;
        let amount = state.balances.remove(&key).unwrap_or(0);
        state.drains.push((to, amount));
        Ok(amount)
    }

    fn release(&mut self, receiver: Receiver) -> Result<(), CapabilityError> {
        let mut state = self.0.borrow_mut();
        state
            .active
            .remove(&receiver.index)
            .map(|_| ())
            .ok_or_else(|| CapabilityError::new("double release"))
    }
}

// ================================
// Harness
// ================================

pub struct Harness {
    pub processor: CommandProcessor,
    pub keys: Vec<SigningKey>,
    pub deployer: MockDeployer,
    pub tokens: MockTokens,
    pub arena: MockArena,
}

pub fn keypair(seed: u8) -> SigningKey {
    SigningKey::from_bytes(&[seed; 32])
}

pub fn address_of(key: &SigningKey) -> Address {
    Address::new(key.verifying_key().to_bytes())
}

/// Sorted weight-1 signer set over the given keys
pub fn signer_set(keys: &[&SigningKey], threshold: u128) -> SignerSet {
    let mut signers: Vec<WeightedSigner> = keys
        .iter()
        .map(|key| WeightedSigner {
            signer: address_of(key),
            weight: 1,
        })
        .collect();
    signers.sort_by_key(|entry| entry.signer);
    SignerSet::new(signers, threshold)
}

/// Processor over three weight-1 signers (seeds 1..=3) at threshold 2
pub fn harness() -> Harness {
    let keys: Vec<SigningKey> = (1u8..=3).map(keypair).collect();
    let deployer = MockDeployer::default();
    let tokens = MockTokens::default();
    let arena = MockArena::default();

    let initial = signer_set(&keys.iter().collect::<Vec<_>>(), 2);
    let processor = CommandProcessor::new(
        GatewayConfig {
            domain: DOMAIN,
            collector: COLLECTOR,
            signer_retention: 16,
        },
        initial,
        Box::new(Ed25519Verifier),
        Box::new(deployer.clone()),
        Box::new(tokens.clone()),
        Box::new(arena.clone()),
    )
    .expect("initial signer set is valid");

    Harness {
        processor,
        keys,
        deployer,
        tokens,
        arena,
    }
}

pub fn command(id_byte: u8, payload: CommandPayload) -> Command {
    Command {
        id: CommandId::new([id_byte; 32]),
        payload,
    }
}

pub fn batch(commands: Vec<Command>) -> CommandBatch {
    CommandBatch {
        domain: DOMAIN,
        commands,
    }
}

pub fn sign_batch(keys: &[&SigningKey], batch: CommandBatch) -> SignedBatch {
    let hash = batch.hash();
    let signatures = keys
        .iter()
        .map(|key| SignerSignature {
            signer: address_of(key),
            signature: key.sign(&hash).to_bytes(),
        })
        .collect();
    SignedBatch { batch, signatures }
}

pub fn deploy_internal(id_byte: u8, symbol: &str) -> Command {
    command(
        id_byte,
        CommandPayload::DeployToken {
            name: format!("{symbol} token"),
            symbol: symbol.to_string(),
            decimals: 18,
            address: None,
        },
    )
}
