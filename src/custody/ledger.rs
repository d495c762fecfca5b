//! Stepwise transfer transactions and their confirmation state
//!
//! The ledger backs the request → sign → execute protocol: a transfer is
//! opened without any signatures, collects one confirmation vote per
//! signer across separate calls, and releases the token once the live
//! threshold is met. Ids are sequential and never reused.

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::intent::{confirmation_intent_digest, CONFIRMATION_PREFIX};
use super::registry::{CustodyError, SignerRegistry};
use super::verifier::{check_expiry, now_ms};
use crate::crypto::{recover_address, Address, Signature};
use crate::token::AssetRegistry;

/// Lifecycle state of a requested transfer
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum TransferState {
    /// Collecting confirmations
    Pending,
    /// Executed; terminal
    Executed,
}

/// A requested transfer accumulating signer confirmations
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PendingTransfer {
    /// Sequential id, starting at 1
    pub id: u64,
    /// Recipient of the token
    pub to: Address,
    /// Token to release
    pub token_id: u64,
    /// Collection holding the token
    pub token_contract: Address,
    /// Expiry in milliseconds since the Unix epoch, checked at execution
    pub expire_time: u64,
    /// Latest vote per signer; only `true` counts toward the threshold
    confirmations: HashMap<Address, bool>,
    /// Current lifecycle state
    pub state: TransferState,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

impl PendingTransfer {
    /// Number of signers currently confirming the transfer
    pub fn confirmation_count(&self) -> usize {
        self.confirmations.values().filter(|&&c| c).count()
    }

    /// A signer's recorded vote, if any
    pub fn vote(&self, signer: &Address) -> Option<bool> {
        self.confirmations.get(signer).copied()
    }
}

/// Ledger of stepwise transfer transactions
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct TransactionLedger {
    transactions: BTreeMap<u64, PendingTransfer>,
    last_id: u64,
}

impl TransactionLedger {
    /// Create an empty ledger
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a new transfer request and allocate its id.
    ///
    /// No signatures are checked here; any caller may request. The
    /// security boundary is enforced at signing and execution.
    pub fn request(
        &mut self,
        to: Address,
        token_id: u64,
        token_contract: Address,
        expire_time: u64,
    ) -> u64 {
        self.last_id += 1;
        let id = self.last_id;

        self.transactions.insert(
            id,
            PendingTransfer {
                id,
                to,
                token_id,
                token_contract,
                expire_time,
                confirmations: HashMap::new(),
                state: TransferState::Pending,
                created_at: Utc::now(),
            },
        );
        log::debug!("Transfer {} requested: token {} -> {}", id, token_id, to);
        id
    }

    /// Record one signer's confirmation vote. The signer is recovered
    /// from the signature over the confirmation digest and must be
    /// authorized. Last vote wins, so a signer may flip their vote any
    /// time before execution.
    pub fn sign(
        &mut self,
        registry: &SignerRegistry,
        custodian: Address,
        id: u64,
        confirm: bool,
        signature: &Signature,
    ) -> Result<Address, CustodyError> {
        let record = self
            .transactions
            .get_mut(&id)
            .ok_or(CustodyError::UnknownTransaction(id))?;
        if record.state != TransferState::Pending {
            return Err(CustodyError::NotPending(id));
        }

        let digest = confirmation_intent_digest(CONFIRMATION_PREFIX, custodian, id, confirm);
        let signer = recover_address(&digest, signature)?;
        if !registry.is_signer(&signer) {
            return Err(CustodyError::UnauthorizedSigner(signer));
        }

        record.confirmations.insert(signer, confirm);
        log::debug!("Transfer {}: {} voted {}", id, signer, confirm);
        Ok(signer)
    }

    /// Execute a pending transfer once enough confirmations are in.
    ///
    /// The threshold is read from the registry at execution time, so a
    /// threshold change between request and execution takes effect here.
    /// The record transitions to `Executed` before the asset registry is
    /// invoked; the external call must not be able to observe the
    /// authorization as still spendable.
    pub fn execute(
        &mut self,
        registry: &SignerRegistry,
        custodian: Address,
        assets: &mut dyn AssetRegistry,
        id: u64,
    ) -> Result<(), CustodyError> {
        let record = self
            .transactions
            .get_mut(&id)
            .ok_or(CustodyError::UnknownTransaction(id))?;
        if record.state != TransferState::Pending {
            return Err(CustodyError::NotPending(id));
        }
        check_expiry(record.expire_time, now_ms())?;

        let have = record.confirmation_count();
        let need = registry.threshold();
        if have < need {
            return Err(CustodyError::InsufficientConfirmations { have, need });
        }

        record.state = TransferState::Executed;
        let (to, token_id, token_contract) = (record.to, record.token_id, record.token_contract);

        if let Err(err) = assets.transfer_from(token_contract, custodian, custodian, to, token_id) {
            // a failed external call must leave no partial effect
            if let Some(record) = self.transactions.get_mut(&id) {
                record.state = TransferState::Pending;
            }
            return Err(err.into());
        }

        log::info!(
            "Transfer {} executed: token {} of {} -> {}",
            id,
            token_id,
            token_contract,
            to
        );
        Ok(())
    }

    /// Look up a transaction by id
    pub fn get(&self, id: u64) -> Option<&PendingTransfer> {
        self.transactions.get(&id)
    }

    /// All transactions, in id order
    pub fn list(&self) -> Vec<&PendingTransfer> {
        self.transactions.values().collect()
    }

    /// Number of recorded transactions
    pub fn count(&self) -> usize {
        self.transactions.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::KeyPair;
    use crate::token::{AssetRegistry, NftManager};

    fn future() -> u64 {
        now_ms() + 30 * 60 * 1000
    }

    struct Fixture {
        registry: SignerRegistry,
        keys: Vec<KeyPair>,
        custodian: Address,
        assets: NftManager,
        collection: Address,
    }

    fn setup(threshold: usize) -> Fixture {
        let keys: Vec<KeyPair> = (0..3).map(|_| KeyPair::generate()).collect();
        let mut registry = SignerRegistry::new(1, 10).unwrap();
        for key in &keys {
            registry.add_signer(key.address()).unwrap();
        }
        registry.change_threshold(threshold).unwrap();

        let custodian = KeyPair::generate().address();
        let mut assets = NftManager::new();
        let collection = assets
            .create_collection("Test NFT".to_string(), "TNFT".to_string())
            .unwrap();
        assets.mint(collection, custodian, 1).unwrap();

        Fixture {
            registry,
            keys,
            custodian,
            assets,
            collection,
        }
    }

    fn signed_vote(fx: &Fixture, key: &KeyPair, id: u64, confirm: bool) -> Signature {
        let digest = confirmation_intent_digest(CONFIRMATION_PREFIX, fx.custodian, id, confirm);
        key.sign_digest(&digest).unwrap()
    }

    #[test]
    fn test_ids_sequential_from_one() {
        let fx = setup(2);
        let mut ledger = TransactionLedger::new();

        let to = KeyPair::generate().address();
        assert_eq!(ledger.request(to, 1, fx.collection, future()), 1);
        assert_eq!(ledger.request(to, 2, fx.collection, future()), 2);
        assert_eq!(ledger.request(to, 3, fx.collection, future()), 3);
        assert_eq!(ledger.count(), 3);
    }

    #[test]
    fn test_sign_unknown_transaction() {
        let fx = setup(2);
        let mut ledger = TransactionLedger::new();
        let sig = signed_vote(&fx, &fx.keys[0], 9, true);

        assert!(matches!(
            ledger.sign(&fx.registry, fx.custodian, 9, true, &sig),
            Err(CustodyError::UnknownTransaction(9))
        ));
    }

    #[test]
    fn test_sign_records_votes() {
        let fx = setup(2);
        let mut ledger = TransactionLedger::new();
        let to = KeyPair::generate().address();
        let id = ledger.request(to, 1, fx.collection, future());

        let sig = signed_vote(&fx, &fx.keys[0], id, true);
        let signer = ledger
            .sign(&fx.registry, fx.custodian, id, true, &sig)
            .unwrap();
        assert_eq!(signer, fx.keys[0].address());

        let record = ledger.get(id).unwrap();
        assert_eq!(record.confirmation_count(), 1);
        assert_eq!(record.vote(&fx.keys[0].address()), Some(true));
    }

    #[test]
    fn test_sign_rejects_outsider() {
        let fx = setup(2);
        let mut ledger = TransactionLedger::new();
        let to = KeyPair::generate().address();
        let id = ledger.request(to, 1, fx.collection, future());

        let outsider = KeyPair::generate();
        let sig = signed_vote(&fx, &outsider, id, true);
        assert!(matches!(
            ledger.sign(&fx.registry, fx.custodian, id, true, &sig),
            Err(CustodyError::UnauthorizedSigner(_))
        ));
    }

    #[test]
    fn test_vote_flip_last_write_wins() {
        let fx = setup(2);
        let mut ledger = TransactionLedger::new();
        let to = KeyPair::generate().address();
        let id = ledger.request(to, 1, fx.collection, future());

        let yes = signed_vote(&fx, &fx.keys[0], id, true);
        ledger
            .sign(&fx.registry, fx.custodian, id, true, &yes)
            .unwrap();
        assert_eq!(ledger.get(id).unwrap().confirmation_count(), 1);

        // the same signer revokes; the vote no longer counts
        let no = signed_vote(&fx, &fx.keys[0], id, false);
        ledger
            .sign(&fx.registry, fx.custodian, id, false, &no)
            .unwrap();
        assert_eq!(ledger.get(id).unwrap().confirmation_count(), 0);
        assert_eq!(ledger.get(id).unwrap().vote(&fx.keys[0].address()), Some(false));
    }

    #[test]
    fn test_execute_below_threshold() {
        let mut fx = setup(2);
        let mut ledger = TransactionLedger::new();
        let to = KeyPair::generate().address();
        let id = ledger.request(to, 1, fx.collection, future());

        let sig = signed_vote(&fx, &fx.keys[0], id, true);
        ledger
            .sign(&fx.registry, fx.custodian, id, true, &sig)
            .unwrap();

        assert!(matches!(
            ledger.execute(&fx.registry, fx.custodian, &mut fx.assets, id),
            Err(CustodyError::InsufficientConfirmations { have: 1, need: 2 })
        ));
        // nothing moved
        assert_eq!(fx.assets.owner_of(fx.collection, 1).unwrap(), fx.custodian);
        assert_eq!(ledger.get(id).unwrap().state, TransferState::Pending);
    }

    #[test]
    fn test_execute_succeeds_exactly_once() {
        let mut fx = setup(2);
        let mut ledger = TransactionLedger::new();
        let to = KeyPair::generate().address();
        let id = ledger.request(to, 1, fx.collection, future());

        for key in &fx.keys[..2] {
            let sig = signed_vote(&fx, key, id, true);
            ledger
                .sign(&fx.registry, fx.custodian, id, true, &sig)
                .unwrap();
        }

        ledger
            .execute(&fx.registry, fx.custodian, &mut fx.assets, id)
            .unwrap();
        assert_eq!(fx.assets.owner_of(fx.collection, 1).unwrap(), to);
        assert_eq!(ledger.get(id).unwrap().state, TransferState::Executed);

        // the authorization is spent
        assert!(matches!(
            ledger.execute(&fx.registry, fx.custodian, &mut fx.assets, id),
            Err(CustodyError::NotPending(_))
        ));
    }

    #[test]
    fn test_sign_after_execute_rejected() {
        let mut fx = setup(1);
        let mut ledger = TransactionLedger::new();
        let to = KeyPair::generate().address();
        let id = ledger.request(to, 1, fx.collection, future());

        let sig = signed_vote(&fx, &fx.keys[0], id, true);
        ledger
            .sign(&fx.registry, fx.custodian, id, true, &sig)
            .unwrap();
        ledger
            .execute(&fx.registry, fx.custodian, &mut fx.assets, id)
            .unwrap();

        let late = signed_vote(&fx, &fx.keys[1], id, true);
        assert!(matches!(
            ledger.sign(&fx.registry, fx.custodian, id, true, &late),
            Err(CustodyError::NotPending(_))
        ));
    }

    #[test]
    fn test_execute_expired() {
        let mut fx = setup(1);
        let mut ledger = TransactionLedger::new();
        let to = KeyPair::generate().address();
        // already in the past
        let id = ledger.request(to, 1, fx.collection, now_ms().saturating_sub(1000));

        let sig = signed_vote(&fx, &fx.keys[0], id, true);
        ledger
            .sign(&fx.registry, fx.custodian, id, true, &sig)
            .unwrap();

        assert!(matches!(
            ledger.execute(&fx.registry, fx.custodian, &mut fx.assets, id),
            Err(CustodyError::Expired { .. })
        ));
    }

    #[test]
    fn test_execute_reads_threshold_live() {
        let mut fx = setup(1);
        let mut ledger = TransactionLedger::new();
        let to = KeyPair::generate().address();
        let id = ledger.request(to, 1, fx.collection, future());

        let sig = signed_vote(&fx, &fx.keys[0], id, true);
        ledger
            .sign(&fx.registry, fx.custodian, id, true, &sig)
            .unwrap();

        // raising the threshold after the request blocks execution
        fx.registry.change_threshold(3).unwrap();
        assert!(matches!(
            ledger.execute(&fx.registry, fx.custodian, &mut fx.assets, id),
            Err(CustodyError::InsufficientConfirmations { have: 1, need: 3 })
        ));
    }

    #[test]
    fn test_failed_asset_call_rolls_back() {
        let mut fx = setup(1);
        let mut ledger = TransactionLedger::new();
        let to = KeyPair::generate().address();
        // token 99 was never minted, so the registry call fails
        let id = ledger.request(to, 99, fx.collection, future());

        let sig = signed_vote(&fx, &fx.keys[0], id, true);
        ledger
            .sign(&fx.registry, fx.custodian, id, true, &sig)
            .unwrap();

        assert!(matches!(
            ledger.execute(&fx.registry, fx.custodian, &mut fx.assets, id),
            Err(CustodyError::Asset(_))
        ));
        // the record is still pending and can be executed later
        assert_eq!(ledger.get(id).unwrap().state, TransferState::Pending);
    }
}
