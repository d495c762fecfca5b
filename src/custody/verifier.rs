//! Signature bundle verification against the signer registry
//!
//! A bundle is a flat concatenation of 65-byte recoverable signatures in
//! arbitrary signer order. Verification recovers a signer per chunk and
//! checks the distinct, authorized approvals against the live threshold.

use std::collections::HashSet;

use chrono::Utc;

use super::registry::{CustodyError, SignerRegistry};
use crate::crypto::{recover_address, Address, Signature, SIGNATURE_LEN};

/// Current time in milliseconds since the Unix epoch
pub fn now_ms() -> u64 {
    Utc::now().timestamp_millis().max(0) as u64
}

/// Split a concatenated signature bundle into 65-byte chunks
pub fn split_bundle(bundle: &[u8]) -> Result<Vec<Signature>, CustodyError> {
    if bundle.is_empty() || bundle.len() % SIGNATURE_LEN != 0 {
        return Err(CustodyError::MalformedBundle(bundle.len()));
    }
    bundle
        .chunks(SIGNATURE_LEN)
        .map(|chunk| Signature::from_bytes(chunk).map_err(CustodyError::from))
        .collect()
}

/// Recover a signer per chunk and check the bundle against the registry.
///
/// Every chunk must recover to a distinct authorized signer; a repeated
/// signer is rejected so one signature can never be counted twice toward
/// the threshold. Returns the recovered signers in chunk order.
pub fn verify_threshold(
    registry: &SignerRegistry,
    digest: &[u8; 32],
    bundle: &[u8],
) -> Result<Vec<Address>, CustodyError> {
    let chunks = split_bundle(bundle)?;

    let mut seen = HashSet::new();
    let mut signers = Vec::with_capacity(chunks.len());
    for chunk in &chunks {
        let signer = recover_address(digest, chunk)?;
        if !registry.is_signer(&signer) {
            return Err(CustodyError::UnauthorizedSigner(signer));
        }
        if !seen.insert(signer) {
            return Err(CustodyError::DuplicateSignature(signer));
        }
        signers.push(signer);
    }

    if signers.len() < registry.threshold() {
        return Err(CustodyError::InsufficientConfirmations {
            have: signers.len(),
            need: registry.threshold(),
        });
    }
    Ok(signers)
}

/// Reject an authorization whose expiry has passed
pub fn check_expiry(expire_time: u64, now: u64) -> Result<(), CustodyError> {
    if now > expire_time {
        return Err(CustodyError::Expired { expire_time, now });
    }
    Ok(())
}
