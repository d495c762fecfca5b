//! Cryptographic primitives for the custody engine
//!
//! This module provides:
//! - Keccak-256 hashing
//! - ECDSA key management (secp256k1)
//! - Recoverable signatures and 20-byte address derivation

pub mod hash;
pub mod keys;

pub use hash::{keccak256, keccak256_hex};
pub use keys::{
    public_key_from_hex, public_key_to_address, recover_address, Address, KeyError, KeyPair,
    Signature, SIGNATURE_LEN,
};
