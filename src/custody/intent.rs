//! Deterministic authorization-intent digests
//!
//! A digest binds every parameter of an intended operation into a single
//! Keccak-256 hash over the tightly packed field encoding: strings as raw
//! UTF-8 bytes, addresses as 20 bytes, integers as 32-byte big-endian,
//! bools as one byte. This is the `abi.encodePacked` layout, so digests
//! match what standard Ethereum signing tooling produces off-system.

use crate::crypto::{keccak256, Address};

/// Domain prefix bound into transfer-intent digests
pub const TRANSFER_PREFIX: &str = "ERC721";

/// Domain prefix bound into stepwise confirmation digests
pub const CONFIRMATION_PREFIX: &str = "SIGN";

fn push_u256(buf: &mut Vec<u8>, value: u64) {
    buf.extend_from_slice(&[0u8; 24]);
    buf.extend_from_slice(&value.to_be_bytes());
}

/// Digest over a direct transfer intent:
/// `(prefix, custodian, to, token_id, token_contract, expire_time)`
pub fn transfer_intent_digest(
    prefix: &str,
    custodian: Address,
    to: Address,
    token_id: u64,
    token_contract: Address,
    expire_time: u64,
) -> [u8; 32] {
    let mut buf = Vec::with_capacity(prefix.len() + 3 * Address::LEN + 2 * 32);
    buf.extend_from_slice(prefix.as_bytes());
    buf.extend_from_slice(custodian.as_bytes());
    buf.extend_from_slice(to.as_bytes());
    push_u256(&mut buf, token_id);
    buf.extend_from_slice(token_contract.as_bytes());
    push_u256(&mut buf, expire_time);
    keccak256(&buf)
}

/// Digest over a stepwise confirmation:
/// `(prefix, custodian, transaction_id, confirm)`
pub fn confirmation_intent_digest(
    prefix: &str,
    custodian: Address,
    transaction_id: u64,
    confirm: bool,
) -> [u8; 32] {
    let mut buf = Vec::with_capacity(prefix.len() + Address::LEN + 32 + 1);
    buf.extend_from_slice(prefix.as_bytes());
    buf.extend_from_slice(custodian.as_bytes());
    push_u256(&mut buf, transaction_id);
    buf.push(confirm as u8);
    keccak256(&buf)
}
