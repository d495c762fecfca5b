//! Custodial multisig authorization engine
//!
//! A bounded set of authorized signers collectively controls release of
//! NFTs held in escrow: at least the configured threshold of valid
//! signatures is required before any transfer executes.
//!
//! # Example
//!
//! ```ignore
//! use nft_custodian::custody::TransferGateway;
//!
//! // 2-of-N custody gateway
//! let mut gateway = TransferGateway::new(custodian_address, 2, 10)?;
//! gateway.add_signer(a)?;
//! gateway.add_signer(b)?;
//! gateway.add_signer(c)?;
//!
//! // single-call path: verify an off-chain-collected bundle atomically
//! gateway.multisig_transfer(&mut assets, to, token_id, collection, expire, &bundle)?;
//!
//! // stepwise path: accumulate confirmations across calls
//! let id = gateway.request_transaction(to, token_id, collection, expire);
//! gateway.sign_transaction(id, true, &sig_b)?;
//! gateway.sign_transaction(id, true, &sig_c)?;
//! gateway.execute_transaction(&mut assets, id)?;
//! ```

pub mod gateway;
pub mod intent;
pub mod ledger;
pub mod registry;
pub mod verifier;

pub use gateway::TransferGateway;
pub use intent::{
    confirmation_intent_digest, transfer_intent_digest, CONFIRMATION_PREFIX, TRANSFER_PREFIX,
};
pub use ledger::{PendingTransfer, TransactionLedger, TransferState};
pub use registry::{CustodyError, SignerRegistry};
pub use verifier::{check_expiry, now_ms, split_bundle, verify_threshold};
