//! Epoch-scoped weighted signer sets
//!
//! Every rotation allocates a new epoch and stores the canonical hash of the
//! incoming set in both directions (epoch -> hash, hash -> epoch). Batch
//! verification walks the retained epochs from newest to oldest and accepts
//! the most recent one whose weighted threshold is met, so batches signed
//! just before a rotation still clear while sets older than the retention
//! window stop being trusted.

use std::collections::{BTreeMap, HashMap, HashSet};

use borsh::{BorshDeserialize, BorshSerialize};

use crate::capability::SignatureVerifier;
use crate::error::GatewayError;
use crate::hash;
use crate::types::Address;
use crate::SIGNER_SET_SEED;

/// Generation counter naming one version of the signer set
pub type Epoch = u64;

/// One signer identity with its voting weight
#[derive(BorshSerialize, BorshDeserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct WeightedSigner {
    pub signer: Address,
    pub weight: u128,
}

/// A full signer-set generation: sorted unique identities plus the weighted
/// threshold co-signatures must reach
#[derive(BorshSerialize, BorshDeserialize, Clone, Debug, PartialEq, Eq)]
pub struct SignerSet {
    pub signers: Vec<WeightedSigner>,
    pub threshold: u128,
}

impl SignerSet {
    pub fn new(signers: Vec<WeightedSigner>, threshold: u128) -> Self {
        Self { signers, threshold }
    }

    /// Structural validation: non-empty, strictly ascending by identity
    /// (sorted and unique in one pass), no zero identity, no zero weight,
    /// and `0 < threshold <= sum of weights` under checked addition.
    pub fn validate(&self) -> Result<(), GatewayError> {
        if self.signers.is_empty() || self.threshold == 0 {
            return Err(GatewayError::InvalidSigners);
        }

        let mut previous: Option<Address> = None;
        let mut total: u128 = 0;
        for entry in &self.signers {
            if entry.signer.is_zero() || entry.weight == 0 {
                return Err(GatewayError::InvalidSigners);
            }
            if let Some(prev) = previous {
                if entry.signer <= prev {
                    return Err(GatewayError::InvalidSigners);
                }
            }
            previous = Some(entry.signer);
            total = total
                .checked_add(entry.weight)
                .ok_or(GatewayError::InvalidSigners)?;
        }

        if self.threshold > total {
            return Err(GatewayError::InvalidSigners);
        }
        Ok(())
    }

    pub fn contains(&self, signer: Address) -> bool {
        self.weight_of(signer).is_some()
    }

    /// Weight of a member identity, `None` for non-members
    pub fn weight_of(&self, signer: Address) -> Option<u128> {
        self.signers
            .binary_search_by(|entry| entry.signer.cmp(&signer))
            .ok()
            .map(|idx| self.signers[idx].weight)
    }

    /// Canonical hash of the set: domain-tagged SHA-256 over the borsh
    /// encoding. Sets are stored sorted, so equal sets hash equal.
    pub fn canonical_hash(&self) -> [u8; 32] {
        let encoded = borsh::to_vec(self).expect("signer set serialization cannot fail");
        hash::tagged(SIGNER_SET_SEED, &encoded)
    }
}

/// One signature entry on a batch: the claimed identity plus the ed25519
/// signature bytes proving possession of its key
#[derive(BorshSerialize, BorshDeserialize, Clone, Debug, PartialEq, Eq)]
pub struct SignerSignature {
    pub signer: Address,
    pub signature: [u8; 64],
}

/// Epoch-indexed registry of signer sets with bounded-retention verification
pub struct SignerRegistry {
    retention: u64,
    current_epoch: Epoch,
    sets: BTreeMap<Epoch, SignerSet>,
    hash_by_epoch: BTreeMap<Epoch, [u8; 32]>,
    epoch_by_hash: HashMap<[u8; 32], Epoch>,
    verifier: Box<dyn SignatureVerifier>,
}

impl SignerRegistry {
    /// Empty registry at epoch zero; nothing verifies until the first
    /// rotation installs a set
    pub fn new(retention: u64, verifier: Box<dyn SignatureVerifier>) -> Self {
        Self {
            retention: retention.max(1),
            current_epoch: 0,
            sets: BTreeMap::new(),
            hash_by_epoch: BTreeMap::new(),
            epoch_by_hash: HashMap::new(),
            verifier,
        }
    }

    /// Installs a new signer set as the next epoch. Fails `InvalidSigners`
    /// on structural violations or when the identical set (by canonical
    /// hash) was already installed in any epoch.
    pub fn rotate(&mut self, set: SignerSet) -> Result<Epoch, GatewayError> {
        set.validate()?;
        let set_hash = set.canonical_hash();
        if self.epoch_by_hash.contains_key(&set_hash) {
            return Err(GatewayError::InvalidSigners);
        }

        let epoch = self.current_epoch + 1;
        self.current_epoch = epoch;
        self.epoch_by_hash.insert(set_hash, epoch);
        self.hash_by_epoch.insert(epoch, set_hash);
        tracing::info!(
            epoch,
            signers = set.signers.len(),
            threshold = %set.threshold,
            "signer set rotated"
        );
        self.sets.insert(epoch, set);
        Ok(epoch)
    }

    /// Verifies a signature set against the retained epochs, preferring the
    /// most recent epoch whose threshold the recovered identities satisfy.
    /// Returns the satisfying epoch. `MalformedSignature` when recovery of
    /// any signature fails; `InvalidSigners` when no retained epoch is
    /// satisfied.
    pub fn verify(
        &self,
        message_hash: &[u8; 32],
        signatures: &[SignerSignature],
    ) -> Result<Epoch, GatewayError> {
        let mut recovered: HashSet<Address> = HashSet::with_capacity(signatures.len());
        for signature in signatures {
            let identity = self
                .verifier
                .recover(message_hash, signature)
                .map_err(|e| GatewayError::MalformedSignature(e.to_string()))?;
            recovered.insert(identity);
        }

        for epoch in self.retained_epochs().rev() {
            let Some(set) = self.sets.get(&epoch) else {
                continue;
            };
            let weight: u128 = recovered
                .iter()
                .filter_map(|identity| set.weight_of(*identity))
                .sum();
            if weight >= set.threshold {
                return Ok(epoch);
            }
        }
        Err(GatewayError::InvalidSigners)
    }

    /// Epochs still trusted for verification, oldest first
    fn retained_epochs(&self) -> std::ops::RangeInclusive<Epoch> {
        let lowest = self
            .current_epoch
            .saturating_sub(self.retention - 1)
            .max(1);
        lowest..=self.current_epoch
    }

    // ===== Queries =====

    pub fn current_epoch(&self) -> Epoch {
        self.current_epoch
    }

    pub fn current_set(&self) -> Option<&SignerSet> {
        self.sets.get(&self.current_epoch)
    }

    pub fn signer_set(&self, epoch: Epoch) -> Option<&SignerSet> {
        self.sets.get(&epoch)
    }

    pub fn signer_threshold(&self, epoch: Epoch) -> Option<u128> {
        self.sets.get(&epoch).map(|set| set.threshold)
    }

    pub fn signer_accounts(&self, epoch: Epoch) -> Option<Vec<Address>> {
        self.sets
            .get(&epoch)
            .map(|set| set.signers.iter().map(|entry| entry.signer).collect())
    }

    pub fn hash_for_epoch(&self, epoch: Epoch) -> Option<[u8; 32]> {
        self.hash_by_epoch.get(&epoch).copied()
    }

    pub fn epoch_for_hash(&self, set_hash: [u8; 32]) -> Option<Epoch> {
        self.epoch_by_hash.get(&set_hash).copied()
    }

    /// Whether the identity belongs to the current epoch's set
    pub fn is_current_signer(&self, signer: Address) -> bool {
        self.current_set()
            .is_some_and(|set| set.contains(signer))
    }
}
