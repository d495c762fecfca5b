//! NFT Custodian: a custodial multisig authorization engine in Rust
//!
//! This crate provides a governance layer in front of an external NFT
//! ledger, featuring:
//! - An authorized signer registry with a capacity cap and an approval
//!   threshold
//! - Deterministic Keccak-256 intent digests in the packed Ethereum
//!   encoding
//! - Recoverable secp256k1 signatures with per-bundle duplicate and
//!   authorization checks
//! - A single-call transfer protocol verifying an off-chain-collected
//!   signature bundle atomically, with replay protection
//! - A stepwise request/sign/execute protocol accumulating confirmations
//!   across calls
//! - An `AssetRegistry` capability with an in-memory ERC-721 style
//!   reference implementation
//!
//! # Example
//!
//! ```rust
//! use nft_custodian::crypto::KeyPair;
//! use nft_custodian::custody::{now_ms, TransferGateway};
//! use nft_custodian::token::{AssetRegistry, NftManager};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! // signers and a 2-of-3 custody gateway
//! let keys: Vec<KeyPair> = (0..3).map(|_| KeyPair::generate()).collect();
//! let custodian = KeyPair::generate().address();
//! let mut gateway = TransferGateway::new(custodian, 1, 10)?;
//! for key in &keys {
//!     gateway.add_signer(key.address())?;
//! }
//! gateway.change_threshold(2)?;
//!
//! // a token held in custody
//! let mut assets = NftManager::new();
//! let collection = assets.create_collection("Deeds".to_string(), "DEED".to_string())?;
//! assets.mint(collection, custodian, 1)?;
//!
//! // stepwise release
//! let recipient = keys[0].address();
//! let id = gateway.request_transaction(recipient, 1, collection, now_ms() + 60_000);
//! for key in &keys[..2] {
//!     let digest = nft_custodian::custody::confirmation_intent_digest(
//!         nft_custodian::custody::CONFIRMATION_PREFIX,
//!         custodian,
//!         id,
//!         true,
//!     );
//!     gateway.sign_transaction(id, true, &key.sign_digest(&digest)?)?;
//! }
//! gateway.execute_transaction(&mut assets, id)?;
//! assert_eq!(assets.owner_of(collection, 1)?, recipient);
//! # Ok(())
//! # }
//! ```

pub mod cli;
pub mod crypto;
pub mod custody;
pub mod token;

// Re-export commonly used types
pub use crypto::{Address, KeyPair, Signature};
pub use custody::{
    CustodyError, PendingTransfer, SignerRegistry, TransactionLedger, TransferGateway,
    TransferState,
};
pub use token::{AssetRegistry, NftCollection, NftManager, TokenError};
