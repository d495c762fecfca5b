//! Custody facade: the two authorization protocols plus registry management
//!
//! The gateway holds tokens in escrow under its own 20-byte identity and
//! releases them only with enough signer approvals, either through a
//! single submitted signature bundle or through the stepwise
//! request/sign/execute protocol backed by the transaction ledger.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::intent::{transfer_intent_digest, TRANSFER_PREFIX};
use super::ledger::{PendingTransfer, TransactionLedger};
use super::registry::{CustodyError, SignerRegistry};
use super::verifier::{check_expiry, now_ms, verify_threshold};
use crate::crypto::{Address, Signature};
use crate::token::AssetRegistry;

/// The custodial transfer gateway
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TransferGateway {
    /// The custodian's own identity, bound into every digest
    address: Address,
    registry: SignerRegistry,
    ledger: TransactionLedger,
    /// Digests of single-call intents that have already released a token;
    /// a used bundle cannot be replayed while its expiry is still open
    consumed: HashSet<[u8; 32]>,
}

impl TransferGateway {
    /// Create a gateway with an empty signer set
    pub fn new(
        address: Address,
        threshold: usize,
        max_signers: usize,
    ) -> Result<Self, CustodyError> {
        Ok(Self {
            address,
            registry: SignerRegistry::new(threshold, max_signers)?,
            ledger: TransactionLedger::new(),
            consumed: HashSet::new(),
        })
    }

    /// The custodian's identity
    pub fn address(&self) -> Address {
        self.address
    }

    // Registry management. Deliberately unguarded by signature checks;
    // authenticating the caller is the embedding environment's concern.

    /// Add an authorized signer
    pub fn add_signer(&mut self, addr: Address) -> Result<(), CustodyError> {
        self.registry.add_signer(addr)
    }

    /// Remove an authorized signer
    pub fn remove_signer(&mut self, addr: Address) -> Result<(), CustodyError> {
        self.registry.remove_signer(addr)
    }

    /// Change the approval threshold
    pub fn change_threshold(&mut self, threshold: usize) -> Result<(), CustodyError> {
        self.registry.change_threshold(threshold)
    }

    /// Check whether an address is an authorized signer
    pub fn is_signer(&self, addr: &Address) -> bool {
        self.registry.is_signer(addr)
    }

    /// Current approval threshold
    pub fn threshold(&self) -> usize {
        self.registry.threshold()
    }

    /// Number of authorized signers
    pub fn signer_count(&self) -> usize {
        self.registry.signer_count()
    }

    /// Enumerate the authorized signers
    pub fn signers(&self) -> &[Address] {
        self.registry.signers()
    }

    /// Single-call transfer: verify an off-chain-collected signature
    /// bundle over the transfer intent and release the token atomically.
    ///
    /// Fails without side effect on an expired intent, a replayed intent,
    /// or a bundle that does not meet the threshold. Returns the signers
    /// that approved.
    pub fn multisig_transfer(
        &mut self,
        assets: &mut dyn AssetRegistry,
        to: Address,
        token_id: u64,
        token_contract: Address,
        expire_time: u64,
        bundle: &[u8],
    ) -> Result<Vec<Address>, CustodyError> {
        let digest = transfer_intent_digest(
            TRANSFER_PREFIX,
            self.address,
            to,
            token_id,
            token_contract,
            expire_time,
        );
        check_expiry(expire_time, now_ms())?;
        if self.consumed.contains(&digest) {
            return Err(CustodyError::IntentConsumed);
        }
        let signers = verify_threshold(&self.registry, &digest, bundle)?;

        // consume before the external call; the asset registry hands
        // control to code outside the engine
        self.consumed.insert(digest);
        if let Err(err) = assets.transfer_from(token_contract, self.address, self.address, to, token_id)
        {
            self.consumed.remove(&digest);
            return Err(err.into());
        }

        log::info!(
            "Multisig transfer: token {} of {} -> {} ({} approvals)",
            token_id,
            token_contract,
            to,
            signers.len()
        );
        Ok(signers)
    }

    /// Open a stepwise transfer and return its id. Any caller may request.
    pub fn request_transaction(
        &mut self,
        to: Address,
        token_id: u64,
        token_contract: Address,
        expire_time: u64,
    ) -> u64 {
        self.ledger.request(to, token_id, token_contract, expire_time)
    }

    /// Record one signer's vote on a pending transfer. Returns the
    /// recovered signer.
    pub fn sign_transaction(
        &mut self,
        id: u64,
        confirm: bool,
        signature: &Signature,
    ) -> Result<Address, CustodyError> {
        self.ledger
            .sign(&self.registry, self.address, id, confirm, signature)
    }

    /// Execute a pending transfer once the current threshold is met
    pub fn execute_transaction(
        &mut self,
        assets: &mut dyn AssetRegistry,
        id: u64,
    ) -> Result<(), CustodyError> {
        self.ledger
            .execute(&self.registry, self.address, assets, id)
    }

    /// Inspect a stepwise transaction
    pub fn transaction(&self, id: u64) -> Option<&PendingTransfer> {
        self.ledger.get(id)
    }

    /// All stepwise transactions, in id order
    pub fn transactions(&self) -> Vec<&PendingTransfer> {
        self.ledger.list()
    }
}
