//! Command processor: the gateway's execution core
//!
//! Owns the signer registry, the replay guard, the token registry and the
//! approval ledger, and wires in the external capabilities. A batch is
//! authenticated as a whole before any mutation; commands then execute
//! strictly in submission order, each marked executed at most once, with
//! handler failures contained per command so one bad command never aborts
//! the batch.

use std::collections::HashSet;

use crate::approvals::{contract_call_key, contract_call_with_mint_key, ApprovalLedger};
use crate::capability::{CapabilityError, Deployer, ReceiverArena, SignatureVerifier, TokenCapability};
use crate::command::{Command, CommandPayload, SignedBatch};
use crate::error::GatewayError;
use crate::events::GatewayEvent;
use crate::hash;
use crate::signer::{Epoch, SignerRegistry, SignerSet};
use crate::token::{TokenEntry, TokenKind, TokenRegistry};
use crate::types::{Address, CommandId};
use crate::TOKEN_SALT_SEED;

/// Static configuration of one gateway instance
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GatewayConfig {
    /// Chain domain this gateway serves; batches bound elsewhere are rejected
    pub domain: [u8; 32],
    /// Address burn receivers forward drained balances to
    pub collector: Address,
    /// Number of past epochs batch signatures may still validate against
    pub signer_retention: u64,
}

/// Per-command result of batch processing, aligned with submission order
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CommandOutcome {
    /// Handler succeeded; the id is now permanently marked executed
    Executed,
    /// The id was already executed; safe no-op
    Skipped,
    /// Handler failed; the id stays retryable in a future batch
    Failed(String),
}

impl CommandOutcome {
    pub fn is_executed(&self) -> bool {
        matches!(self, CommandOutcome::Executed)
    }
}

/// The gateway trust core
pub struct CommandProcessor {
    config: GatewayConfig,
    registry: SignerRegistry,
    executed: HashSet<CommandId>,
    tokens: TokenRegistry,
    approvals: ApprovalLedger,
    deployer: Box<dyn Deployer>,
    token_ops: Box<dyn TokenCapability>,
    receivers: Box<dyn ReceiverArena>,
    events: Vec<GatewayEvent>,
}

impl CommandProcessor {
    /// Builds a processor with its capabilities wired in and the initial
    /// signer set installed as epoch one
    pub fn new(
        config: GatewayConfig,
        initial_signers: SignerSet,
        verifier: Box<dyn SignatureVerifier>,
        deployer: Box<dyn Deployer>,
        token_ops: Box<dyn TokenCapability>,
        receivers: Box<dyn ReceiverArena>,
    ) -> Result<Self, GatewayError> {
        let mut processor = Self {
            registry: SignerRegistry::new(config.signer_retention, verifier),
            config,
            executed: HashSet::new(),
            tokens: TokenRegistry::new(),
            approvals: ApprovalLedger::new(),
            deployer,
            token_ops,
            receivers,
            events: Vec::new(),
        };
        processor.install_signer_set(initial_signers)?;
        Ok(processor)
    }

    // ================================
    // Batch Processing
    // ================================

    /// Authenticates and applies a signed batch. Batch-level failures
    /// (shape, domain, signatures) reject before any mutation; per-command
    /// failures are contained and reported in the returned outcomes.
    pub fn process(&mut self, signed: &SignedBatch) -> Result<Vec<CommandOutcome>, GatewayError> {
        signed.validate()?;
        if signed.batch.domain != self.config.domain {
            return Err(GatewayError::InvalidDomain);
        }

        let batch_hash = signed.batch.hash();
        let epoch = self
            .registry
            .verify(&batch_hash, &signed.signatures)
            .map_err(|e| match e {
                GatewayError::MalformedSignature(msg) => GatewayError::MalformedSignature(msg),
                _ => GatewayError::InvalidSignatures,
            })?;
        tracing::debug!(
            epoch,
            commands = signed.batch.commands.len(),
            "command batch authenticated"
        );

        let mut outcomes = Vec::with_capacity(signed.batch.commands.len());
        for command in &signed.batch.commands {
            outcomes.push(self.apply(command));
        }
        Ok(outcomes)
    }

    /// Applies one command with replay protection and failure containment
    fn apply(&mut self, command: &Command) -> CommandOutcome {
        if self.executed.contains(&command.id) {
            self.record(GatewayEvent::CommandSkipped { id: command.id });
            return CommandOutcome::Skipped;
        }

        match self.dispatch(command) {
            Ok(()) => {
                self.executed.insert(command.id);
                self.record(GatewayEvent::CommandExecuted { id: command.id });
                CommandOutcome::Executed
            }
            Err(err) => {
                let reason = err.to_string();
                tracing::warn!(id = %command.id, %reason, "command failed; id stays retryable");
                self.record(GatewayEvent::CommandFailed {
                    id: command.id,
                    reason: reason.clone(),
                });
                CommandOutcome::Failed(reason)
            }
        }
    }

    /// Routes a command to its typed handler
    fn dispatch(&mut self, command: &Command) -> Result<(), GatewayError> {
        match &command.payload {
            CommandPayload::DeployToken {
                name,
                symbol,
                decimals,
                address,
            } => self.deploy_token(name, symbol, *decimals, *address),
            CommandPayload::MintToken { symbol, to, amount } => {
                self.mint_token(symbol, *to, *amount)
            }
            CommandPayload::BurnToken { symbol, salt } => self.burn_token(symbol, *salt),
            CommandPayload::ApproveContractCall {
                source_domain,
                source_address,
                contract,
                payload_hash,
            } => self.approve_contract_call(source_domain, *source_address, *contract, *payload_hash),
            CommandPayload::ApproveContractCallWithMint {
                source_domain,
                source_address,
                contract,
                payload_hash,
                symbol,
                amount,
            } => self.approve_contract_call_with_mint(
                source_domain,
                *source_address,
                *contract,
                *payload_hash,
                symbol,
                *amount,
            ),
            CommandPayload::TransferOperatorship { signers } => {
                self.install_signer_set(signers.clone()).map(|_| ())
            }
        }
    }

    // ================================
    // Command Handlers
    // ================================

    fn deploy_token(
        &mut self,
        name: &str,
        symbol: &str,
        decimals: u8,
        address: Option<Address>,
    ) -> Result<(), GatewayError> {
        if self.tokens.contains(symbol) {
            return Err(GatewayError::TokenAlreadyExists(symbol.to_string()));
        }

        let (token_address, kind) = match address {
            None => {
                let salt = hash::tagged(TOKEN_SALT_SEED, symbol.as_bytes());
                let deployed = self
                    .deployer
                    .deploy(name, symbol, decimals, salt)
                    .map_err(capability)?;
                (deployed, TokenKind::Internal)
            }
            Some(external) => {
                if !self.deployer.has_code(external) {
                    return Err(GatewayError::NotAToken(external));
                }
                (external, TokenKind::External)
            }
        };

        self.tokens.register(symbol, token_address, kind)?;
        tracing::info!(symbol, address = %token_address, ?kind, "token deployed");
        self.record(GatewayEvent::TokenDeployed {
            symbol: symbol.to_string(),
            address: token_address,
            kind,
        });
        Ok(())
    }

    fn mint_token(&mut self, symbol: &str, to: Address, amount: u64) -> Result<(), GatewayError> {
        let entry = self.usable_token(symbol)?;
        match entry.kind {
            TokenKind::Internal => {
                self.token_ops
                    .mint(entry.address, to, amount)
                    .map_err(capability)?;
            }
            TokenKind::External => {
                // External tokens report success through either a boolean or
                // a void convention
                match self
                    .token_ops
                    .transfer(entry.address, to, amount)
                    .map_err(capability)?
                {
                    Some(false) => return Err(GatewayError::TransferFailed),
                    Some(true) | None => {}
                }
            }
        }

        self.record(GatewayEvent::TokenMinted {
            symbol: symbol.to_string(),
            to,
            amount,
        });
        Ok(())
    }

    fn burn_token(&mut self, symbol: &str, salt: [u8; 32]) -> Result<(), GatewayError> {
        let entry = self.usable_token(symbol)?;
        let amount = match entry.kind {
            TokenKind::Internal => {
                self.token_ops.burn(entry.address, salt).map_err(capability)?;
                None
            }
            TokenKind::External => {
                // Drain the salt-addressed receiver into the collector, then
                // release it so the salt can be reused by a later burn. The
                // receiver is released even when draining fails.
                let receiver = self
                    .receivers
                    .acquire(entry.address, salt)
                    .map_err(capability)?;
                let drained = self.receivers.drain(&receiver, self.config.collector);
                let released = self.receivers.release(receiver);
                let amount = drained.map_err(capability)?;
                released.map_err(capability)?;
                Some(amount)
            }
        };

        self.record(GatewayEvent::TokenBurned {
            symbol: symbol.to_string(),
            salt,
            amount,
        });
        Ok(())
    }

    fn approve_contract_call(
        &mut self,
        source_domain: &str,
        source_address: Address,
        contract: Address,
        payload_hash: [u8; 32],
    ) -> Result<(), GatewayError> {
        let key = contract_call_key(source_domain, source_address, contract, payload_hash);
        self.approvals.approve(key);
        self.record(GatewayEvent::ContractCallApproved {
            source_domain: source_domain.to_string(),
            source_address,
            contract,
            payload_hash,
        });
        Ok(())
    }

    #[allow(clippy::too_many_arguments)]
    fn approve_contract_call_with_mint(
        &mut self,
        source_domain: &str,
        source_address: Address,
        contract: Address,
        payload_hash: [u8; 32],
        symbol: &str,
        amount: u64,
    ) -> Result<(), GatewayError> {
        let key = contract_call_with_mint_key(
            source_domain,
            source_address,
            contract,
            payload_hash,
            symbol,
            amount,
        );
        self.approvals.approve(key);
        self.record(GatewayEvent::ContractCallApprovedWithMint {
            source_domain: source_domain.to_string(),
            source_address,
            contract,
            payload_hash,
            symbol: symbol.to_string(),
            amount,
        });
        Ok(())
    }

    /// Token lookup shared by mint and burn: must exist and not be frozen
    fn usable_token(&self, symbol: &str) -> Result<TokenEntry, GatewayError> {
        let entry = self
            .tokens
            .get(symbol)
            .ok_or_else(|| GatewayError::TokenDoesNotExist(symbol.to_string()))?;
        if entry.frozen {
            return Err(GatewayError::TokenIsFrozen(symbol.to_string()));
        }
        Ok(entry.clone())
    }

    // ================================
    // Signer Rotation
    // ================================

    /// Operator entry point sharing the command path's validation
    pub fn rotate_signers(&mut self, signers: SignerSet) -> Result<Epoch, GatewayError> {
        self.install_signer_set(signers)
    }

    fn install_signer_set(&mut self, signers: SignerSet) -> Result<Epoch, GatewayError> {
        let signer_count = signers.signers.len();
        let set_hash = signers.canonical_hash();
        let epoch = self.registry.rotate(signers)?;
        self.record(GatewayEvent::SignersRotated {
            epoch,
            set_hash,
            signer_count,
        });
        Ok(epoch)
    }

    // ================================
    // Approval Consumption
    // ================================

    /// Validates and clears a contract-call approval in one step. The
    /// downstream target calls this exactly once per approved call; a second
    /// call for the same key returns false.
    pub fn validate_contract_call(
        &mut self,
        source_domain: &str,
        source_address: Address,
        contract: Address,
        payload_hash: [u8; 32],
    ) -> bool {
        let key = contract_call_key(source_domain, source_address, contract, payload_hash);
        self.approvals.consume(key)
    }

    #[allow(clippy::too_many_arguments)]
    pub fn validate_contract_call_with_mint(
        &mut self,
        source_domain: &str,
        source_address: Address,
        contract: Address,
        payload_hash: [u8; 32],
        symbol: &str,
        amount: u64,
    ) -> bool {
        let key = contract_call_with_mint_key(
            source_domain,
            source_address,
            contract,
            payload_hash,
            symbol,
            amount,
        );
        self.approvals.consume(key)
    }

    // ================================
    // Queries
    // ================================

    pub fn is_command_executed(&self, id: CommandId) -> bool {
        self.executed.contains(&id)
    }

    pub fn is_contract_call_approved(
        &self,
        source_domain: &str,
        source_address: Address,
        contract: Address,
        payload_hash: [u8; 32],
    ) -> bool {
        self.approvals
            .is_approved(contract_call_key(source_domain, source_address, contract, payload_hash))
    }

    #[allow(clippy::too_many_arguments)]
    pub fn is_contract_call_approved_with_mint(
        &self,
        source_domain: &str,
        source_address: Address,
        contract: Address,
        payload_hash: [u8; 32],
        symbol: &str,
        amount: u64,
    ) -> bool {
        self.approvals.is_approved(contract_call_with_mint_key(
            source_domain,
            source_address,
            contract,
            payload_hash,
            symbol,
            amount,
        ))
    }

    pub fn current_epoch(&self) -> Epoch {
        self.registry.current_epoch()
    }

    pub fn signer_threshold(&self, epoch: Epoch) -> Option<u128> {
        self.registry.signer_threshold(epoch)
    }

    pub fn signer_accounts(&self, epoch: Epoch) -> Option<Vec<Address>> {
        self.registry.signer_accounts(epoch)
    }

    /// Read access to the registry for components layered on the gateway
    pub fn registry(&self) -> &SignerRegistry {
        &self.registry
    }

    pub fn token(&self, symbol: &str) -> Option<&TokenEntry> {
        self.tokens.get(symbol)
    }

    /// Narrow operator setter for the registry's frozen flag
    pub fn set_token_frozen(&mut self, symbol: &str, frozen: bool) -> Result<(), GatewayError> {
        self.tokens.set_frozen(symbol, frozen)?;
        tracing::info!(symbol, frozen, "token freeze flag updated");
        Ok(())
    }

    /// Drains the accumulated event records
    pub fn take_events(&mut self) -> Vec<GatewayEvent> {
        std::mem::take(&mut self.events)
    }

    fn record(&mut self, event: GatewayEvent) {
        tracing::debug!(?event, "gateway event");
        self.events.push(event);
    }
}

fn capability(err: CapabilityError) -> GatewayError {
    GatewayError::Capability(err.to_string())
}
