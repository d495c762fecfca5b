//! Authorized signer set and approval threshold
//!
//! The registry owns the set of addresses allowed to co-approve
//! transfers, the approval threshold, and the capacity cap. All custody
//! operations read membership and threshold from here at call time, so a
//! registry change takes effect immediately for in-flight transactions.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::crypto::{Address, KeyError};
use crate::token::TokenError;

/// Errors raised by the custody engine
#[derive(Error, Debug)]
pub enum CustodyError {
    #[error("Signer capacity exceeded: limit is {0}")]
    CapacityExceeded(usize),
    #[error("Duplicate signer: {0}")]
    DuplicateSigner(Address),
    #[error("Unknown signer: {0}")]
    UnknownSigner(Address),
    #[error("Invalid threshold: {0}")]
    InvalidThreshold(String),
    #[error("Malformed signature bundle: {0} bytes is not a positive multiple of 65")]
    MalformedBundle(usize),
    #[error("Unauthorized signer: {0}")]
    UnauthorizedSigner(Address),
    #[error("Duplicate signature from {0}")]
    DuplicateSignature(Address),
    #[error("Authorization expired at {expire_time}, current time {now}")]
    Expired { expire_time: u64, now: u64 },
    #[error("Unknown transaction: {0}")]
    UnknownTransaction(u64),
    #[error("Transaction {0} is no longer pending")]
    NotPending(u64),
    #[error("Insufficient confirmations: have {have}, need {need}")]
    InsufficientConfirmations { have: usize, need: usize },
    #[error("Transfer intent already consumed")]
    IntentConsumed,
    #[error("Signature error: {0}")]
    Key(#[from] KeyError),
    #[error("Asset registry error: {0}")]
    Asset(#[from] TokenError),
}

/// The authorized signer set with its approval threshold and capacity cap
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SignerRegistry {
    /// Authorized signers, in insertion order
    signers: Vec<Address>,
    /// Minimum distinct approvals required to release a token
    threshold: usize,
    /// Maximum number of signers the registry accepts
    max_signers: usize,
}

impl SignerRegistry {
    /// Create an empty registry.
    ///
    /// The registry may start with fewer signers than the threshold;
    /// nothing is authorizable until enough signers are added.
    pub fn new(threshold: usize, max_signers: usize) -> Result<Self, CustodyError> {
        if threshold == 0 {
            return Err(CustodyError::InvalidThreshold(
                "threshold must be at least 1".to_string(),
            ));
        }
        if max_signers == 0 {
            return Err(CustodyError::InvalidThreshold(
                "signer capacity must be at least 1".to_string(),
            ));
        }

        Ok(Self {
            signers: Vec::new(),
            threshold,
            max_signers,
        })
    }

    /// Add an authorized signer
    pub fn add_signer(&mut self, addr: Address) -> Result<(), CustodyError> {
        if self.signers.len() == self.max_signers {
            return Err(CustodyError::CapacityExceeded(self.max_signers));
        }
        if self.is_signer(&addr) {
            return Err(CustodyError::DuplicateSigner(addr));
        }

        self.signers.push(addr);
        log::info!(
            "Signer added: {} ({}/{})",
            addr,
            self.signers.len(),
            self.max_signers
        );
        Ok(())
    }

    /// Remove an authorized signer.
    ///
    /// Removal is refused when it would leave fewer signers than the
    /// current threshold, so the registry can never reach a configuration
    /// no bundle could satisfy.
    pub fn remove_signer(&mut self, addr: Address) -> Result<(), CustodyError> {
        let pos = self
            .signers
            .iter()
            .position(|s| *s == addr)
            .ok_or(CustodyError::UnknownSigner(addr))?;
        if self.signers.len() <= self.threshold {
            return Err(CustodyError::InvalidThreshold(format!(
                "removing {} would leave {} signers below threshold {}",
                addr,
                self.signers.len() - 1,
                self.threshold
            )));
        }

        self.signers.remove(pos);
        log::info!("Signer removed: {}", addr);
        Ok(())
    }

    /// Change the approval threshold. Must stay within `1..=signer_count`.
    pub fn change_threshold(&mut self, threshold: usize) -> Result<(), CustodyError> {
        if threshold == 0 {
            return Err(CustodyError::InvalidThreshold(
                "threshold must be at least 1".to_string(),
            ));
        }
        if threshold > self.signers.len() {
            return Err(CustodyError::InvalidThreshold(format!(
                "threshold {} exceeds signer count {}",
                threshold,
                self.signers.len()
            )));
        }

        self.threshold = threshold;
        log::info!("Threshold changed to {}", threshold);
        Ok(())
    }

    /// Check whether an address is an authorized signer
    pub fn is_signer(&self, addr: &Address) -> bool {
        self.signers.contains(addr)
    }

    /// Current approval threshold
    pub fn threshold(&self) -> usize {
        self.threshold
    }

    /// Number of authorized signers
    pub fn signer_count(&self) -> usize {
        self.signers.len()
    }

    /// Capacity cap
    pub fn max_signers(&self) -> usize {
        self.max_signers
    }

    /// Enumerate the authorized signers
    pub fn signers(&self) -> &[Address] {
        &self.signers
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::KeyPair;

    fn addr() -> Address {
        KeyPair::generate().address()
    }

    #[test]
    fn test_new_validation() {
        assert!(SignerRegistry::new(0, 10).is_err());
        assert!(SignerRegistry::new(1, 0).is_err());

        let registry = SignerRegistry::new(2, 10).unwrap();
        assert_eq!(registry.threshold(), 2);
        assert_eq!(registry.signer_count(), 0);
        assert_eq!(registry.max_signers(), 10);
    }

    #[test]
    fn test_add_and_enumerate() {
        let mut registry = SignerRegistry::new(1, 10).unwrap();
        let (a, b) = (addr(), addr());

        registry.add_signer(a).unwrap();
        registry.add_signer(b).unwrap();

        assert_eq!(registry.signer_count(), 2);
        assert!(registry.is_signer(&a));
        assert!(registry.is_signer(&b));
        assert_eq!(registry.signers(), &[a, b]);
    }

    #[test]
    fn test_duplicate_add_rejected() {
        let mut registry = SignerRegistry::new(1, 10).unwrap();
        let a = addr();

        registry.add_signer(a).unwrap();
        assert!(matches!(
            registry.add_signer(a),
            Err(CustodyError::DuplicateSigner(_))
        ));
        assert_eq!(registry.signer_count(), 1);
    }

    #[test]
    fn test_capacity_enforced() {
        let mut registry = SignerRegistry::new(1, 2).unwrap();
        registry.add_signer(addr()).unwrap();
        registry.add_signer(addr()).unwrap();

        assert!(matches!(
            registry.add_signer(addr()),
            Err(CustodyError::CapacityExceeded(2))
        ));
        assert_eq!(registry.signer_count(), 2);
    }

    #[test]
    fn test_remove_and_readd_restores_membership() {
        let mut registry = SignerRegistry::new(1, 10).unwrap();
        let (a, b, c) = (addr(), addr(), addr());
        registry.add_signer(a).unwrap();
        registry.add_signer(b).unwrap();
        registry.add_signer(c).unwrap();

        registry.remove_signer(a).unwrap();
        assert_eq!(registry.signer_count(), 2);
        assert!(!registry.is_signer(&a));

        registry.add_signer(a).unwrap();
        assert_eq!(registry.signer_count(), 3);
        assert!(registry.is_signer(&a));
    }

    #[test]
    fn test_remove_unknown_signer() {
        let mut registry = SignerRegistry::new(1, 10).unwrap();
        registry.add_signer(addr()).unwrap();
        registry.add_signer(addr()).unwrap();

        assert!(matches!(
            registry.remove_signer(addr()),
            Err(CustodyError::UnknownSigner(_))
        ));
    }

    #[test]
    fn test_remove_blocked_below_threshold() {
        let mut registry = SignerRegistry::new(2, 10).unwrap();
        let (a, b) = (addr(), addr());
        registry.add_signer(a).unwrap();
        registry.add_signer(b).unwrap();

        // 2 signers at threshold 2: removal would make the threshold
        // unsatisfiable
        assert!(matches!(
            registry.remove_signer(a),
            Err(CustodyError::InvalidThreshold(_))
        ));
        assert_eq!(registry.signer_count(), 2);
    }

    #[test]
    fn test_change_threshold() {
        let mut registry = SignerRegistry::new(1, 10).unwrap();
        registry.add_signer(addr()).unwrap();
        registry.add_signer(addr()).unwrap();
        registry.add_signer(addr()).unwrap();

        registry.change_threshold(2).unwrap();
        assert_eq!(registry.threshold(), 2);

        assert!(registry.change_threshold(0).is_err());
        assert!(registry.change_threshold(4).is_err());
        assert_eq!(registry.threshold(), 2);
    }
}
