//! Shared governance test harness: a live gateway processor plus a
//! recording call executor
#![allow(dead_code)]

use std::cell::RefCell;
use std::rc::Rc;

use ed25519_dalek::{Signer, SigningKey};

use meridian_gateway::{
    Address, CapabilityError, Command, CommandBatch, CommandId, CommandPayload, CommandProcessor,
    Deployer, Ed25519Verifier, GatewayConfig, Receiver, ReceiverArena, SignedBatch, SignerSet,
    SignerSignature, TokenCapability, WeightedSigner,
};
use meridian_governance::{CallExecutor, GovernanceDispatcher, GovernanceSource};

pub const DOMAIN: [u8; 32] = [7u8; 32];
pub const GOVERNANCE_ADDRESS: Address = Address([50u8; 32]);
pub const SOURCE_ADDRESS: Address = Address([51u8; 32]);
pub const SOURCE_DOMAIN: &str = "govchain";
pub const MINIMUM_DELAY: u64 = 100;

// ================================
// No-op Token Collaborators
// ================================

struct NullDeployer;

impl Deployer for NullDeployer {
    fn deploy(
        &mut self,
        _name: &str,
        _symbol: &str,
        _decimals: u8,
        salt: [u8; 32],
    ) -> Result<Address, CapabilityError> {
        Ok(Address::new(salt))
    }

    fn has_code(&self, _address: Address) -> bool {
        true
    }
}

struct NullTokens;

impl TokenCapability for NullTokens {
    fn mint(&mut self, _token: Address, _to: Address, _amount: u64) -> Result<(), CapabilityError> {
        Ok(())
    }

    fn burn(&mut self, _token: Address, _salt: [u8; 32]) -> Result<(), CapabilityError> {
        Ok(())
    }

    fn transfer(
        &mut self,
        _token: Address,
        _to: Address,
        _amount: u64,
    ) -> Result<Option<bool>, CapabilityError> {
        Ok(None)
    }
}

struct NullArena;

impl ReceiverArena for NullArena {
    fn acquire(&mut self, _token: Address, salt: [u8; 32]) -> Result<Receiver, CapabilityError> {
        Ok(Receiver {
            index: 0,
            address: Address::new(salt),
        })
    }

    fn drain(&mut self, _receiver: &Receiver, _to: Address) -> Result<u64, CapabilityError> {
        Ok(0)
    }

    fn release(&mut self, _receiver: Receiver) -> Result<(), CapabilityError> {
        Ok(())
    }
}

// ================================
// Recording Executor
// ================================

#[derive(Default)]
pub struct ExecutorState {
    pub calls: Vec<(Address, Vec<u8>, u64)>,
    pub refunds: Vec<(Address, u64)>,
    pub fail: bool,
}

#[derive(Clone, Default)]
pub struct RecordingExecutor(pub Rc<RefCell<ExecutorState>>);

impl CallExecutor for RecordingExecutor {
    fn call(&mut self, target: Address, payload: &[u8], value: u64) -> Result<(), CapabilityError> {
        let mut state = self.0.borrow_mut();
        if state.fail {
            return Err(CapabilityError::new("target reverted"));
        }
        state.calls.push((target, payload.to_vec(), value));
        Ok(())
    }

    fn refund(&mut self, to: Address, value: u64) -> Result<(), CapabilityError> {
        self.0.borrow_mut().refunds.push((to, value));
        Ok(())
    }
}

// ================================
// Harness
// ================================

pub struct Harness {
    pub gateway: CommandProcessor,
    pub governance: GovernanceDispatcher,
    pub keys: Vec<SigningKey>,
    pub executor: RecordingExecutor,
    next_command: u8,
}

pub fn keypair(seed: u8) -> SigningKey {
    SigningKey::from_bytes(&[seed; 32])
}

pub fn address_of(key: &SigningKey) -> Address {
    Address::new(key.verifying_key().to_bytes())
}

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

pub fn harness() -> Harness {
    let keys: Vec<SigningKey> = (1u8..=3).map(keypair).collect();
    let initial = signer_set(&keys.iter().collect::<Vec<_>>(), 2);
    let gateway = CommandProcessor::new(
        GatewayConfig {
            domain: DOMAIN,
            collector: Address::new([9u8; 32]),
            signer_retention: 16,
        },
        initial,
        Box::new(Ed25519Verifier),
        Box::new(NullDeployer),
        Box::new(NullTokens),
        Box::new(NullArena),
    )
    .expect("initial signer set is valid");

    let executor = RecordingExecutor::default();
    let governance = GovernanceDispatcher::new(
        GovernanceSource {
            domain: SOURCE_DOMAIN.to_string(),
            address: SOURCE_ADDRESS,
        },
        GOVERNANCE_ADDRESS,
        MINIMUM_DELAY,
        Box::new(executor.clone()),
    );

    Harness {
        gateway,
        governance,
        keys,
        executor,
        next_command: 1,
    }
}

impl Harness {
    /// Pushes a gateway approval for a governance payload through a signed
    /// batch, exactly as a relayer would
    pub fn approve_governance_payload(&mut self, payload: &[u8]) {
        let id = self.next_command;
        self.next_command += 1;
        let command = Command {
            id: CommandId::new([id; 32]),
            payload: CommandPayload::ApproveContractCall {
                source_domain: SOURCE_DOMAIN.to_string(),
                source_address: SOURCE_ADDRESS,
                contract: GOVERNANCE_ADDRESS,
                payload_hash: meridian_gateway::hash::sha256(payload),
            },
        };
        let batch = CommandBatch {
            domain: DOMAIN,
            commands: vec![command],
        };
        let hash = batch.hash();
        let signatures = self.keys[..2]
            .iter()
            .map(|key| SignerSignature {
                signer: address_of(key),
                signature: key.sign(&hash).to_bytes(),
            })
            .collect();
        let outcomes = self
            .gateway
            .process(&SignedBatch { batch, signatures })
            .expect("approval batch must verify");
        assert!(outcomes[0].is_executed(), "approval command must execute");
    }

    /// Approves and then dispatches a governance command payload
    pub fn run_command(&mut self, payload: &[u8], now: u64) {
        self.approve_governance_payload(payload);
        self.governance
            .execute_command(&mut self.gateway, SOURCE_DOMAIN, SOURCE_ADDRESS, payload, now)
            .expect("governance command must dispatch");
    }
}
