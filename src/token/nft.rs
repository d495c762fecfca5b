//! ERC-721 style non-fungible token collection
//!
//! A minimal ownership ledger with per-token approvals. Serves as the
//! reference asset registry implementation behind the custody gateway.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

use crate::crypto::Address;

/// Token-related errors
#[derive(Error, Debug)]
pub enum TokenError {
    #[error("Unknown token: {0}")]
    UnknownToken(u64),
    #[error("Unknown collection: {0}")]
    UnknownCollection(Address),
    #[error("Token already minted: {0}")]
    TokenAlreadyExists(u64),
    #[error("Token {token_id} is not owned by {claimed}")]
    NotOwner { token_id: u64, claimed: Address },
    #[error("{caller} is not authorized for token {token_id}")]
    NotAuthorized { token_id: u64, caller: Address },
    #[error("Invalid name: must be 1-50 characters")]
    InvalidName,
    #[error("Invalid symbol: must be 1-10 characters")]
    InvalidSymbol,
}

/// A non-fungible token collection with per-token ownership and approvals
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct NftCollection {
    /// Collection identity, bound into transfer-intent digests
    pub address: Address,
    /// Collection name (e.g., "Deed Registry")
    pub name: String,
    /// Collection symbol (e.g., "DEED")
    pub symbol: String,
    /// Ownership: token id -> current owner
    owners: HashMap<u64, Address>,
    /// Single-token approvals: token id -> approved spender
    approvals: HashMap<u64, Address>,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

impl NftCollection {
    /// Create an empty collection with validated metadata
    pub fn new(address: Address, name: String, symbol: String) -> Result<Self, TokenError> {
        if name.is_empty() || name.len() > 50 {
            return Err(TokenError::InvalidName);
        }
        if symbol.is_empty() || symbol.len() > 10 {
            return Err(TokenError::InvalidSymbol);
        }

        Ok(Self {
            address,
            name,
            symbol,
            owners: HashMap::new(),
            approvals: HashMap::new(),
            created_at: Utc::now(),
        })
    }

    /// Mint a new token to an owner
    pub fn mint(&mut self, to: Address, token_id: u64) -> Result<(), TokenError> {
        if self.owners.contains_key(&token_id) {
            return Err(TokenError::TokenAlreadyExists(token_id));
        }
        self.owners.insert(token_id, to);
        Ok(())
    }

    /// Current owner of a token
    pub fn owner_of(&self, token_id: u64) -> Result<Address, TokenError> {
        self.owners
            .get(&token_id)
            .copied()
            .ok_or(TokenError::UnknownToken(token_id))
    }

    /// The spender approved for a token, if any
    pub fn get_approved(&self, token_id: u64) -> Option<Address> {
        self.approvals.get(&token_id).copied()
    }

    /// Approve a spender for a single token. Only the owner may approve.
    pub fn approve(
        &mut self,
        caller: Address,
        spender: Address,
        token_id: u64,
    ) -> Result<(), TokenError> {
        let owner = self.owner_of(token_id)?;
        if caller != owner {
            return Err(TokenError::NotAuthorized { token_id, caller });
        }
        self.approvals.insert(token_id, spender);
        Ok(())
    }

    /// Transfer a token. The caller must be the owner or the approved
    /// spender, and `from` must be the current owner. Any approval on the
    /// token is cleared by the transfer.
    pub fn transfer_from(
        &mut self,
        caller: Address,
        from: Address,
        to: Address,
        token_id: u64,
    ) -> Result<(), TokenError> {
        let owner = self.owner_of(token_id)?;
        if owner != from {
            return Err(TokenError::NotOwner {
                token_id,
                claimed: from,
            });
        }
        if caller != owner && self.get_approved(token_id) != Some(caller) {
            return Err(TokenError::NotAuthorized { token_id, caller });
        }

        self.owners.insert(token_id, to);
        self.approvals.remove(&token_id);
        Ok(())
    }

    /// Number of minted tokens
    pub fn total_supply(&self) -> usize {
        self.owners.len()
    }

    /// Tokens currently owned by an address
    pub fn tokens_of(&self, owner: &Address) -> Vec<u64> {
        let mut tokens: Vec<u64> = self
            .owners
            .iter()
            .filter(|(_, o)| *o == owner)
            .map(|(id, _)| *id)
            .collect();
        tokens.sort_unstable();
        tokens
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::KeyPair;

    fn addr() -> Address {
        KeyPair::generate().address()
    }

    fn create_test_collection() -> NftCollection {
        NftCollection::new(addr(), "Test NFT".to_string(), "TNFT".to_string()).unwrap()
    }

    #[test]
    fn test_metadata_validation() {
        let a = addr();
        assert!(NftCollection::new(a, "".to_string(), "TNFT".to_string()).is_err());
        assert!(NftCollection::new(a, "Test".to_string(), "TOOLONGSYMBOL".to_string()).is_err());
    }

    #[test]
    fn test_mint_and_owner_of() {
        let mut collection = create_test_collection();
        let alice = addr();

        collection.mint(alice, 1).unwrap();
        assert_eq!(collection.owner_of(1).unwrap(), alice);
        assert_eq!(collection.total_supply(), 1);
        assert_eq!(collection.tokens_of(&alice), vec![1]);

        // Minting the same id twice fails
        assert!(matches!(
            collection.mint(alice, 1),
            Err(TokenError::TokenAlreadyExists(1))
        ));
    }

    #[test]
    fn test_owner_of_unknown_token() {
        let collection = create_test_collection();
        assert!(matches!(
            collection.owner_of(42),
            Err(TokenError::UnknownToken(42))
        ));
    }

    #[test]
    fn test_owner_transfer() {
        let mut collection = create_test_collection();
        let (alice, bob) = (addr(), addr());

        collection.mint(alice, 1).unwrap();
        collection.transfer_from(alice, alice, bob, 1).unwrap();
        assert_eq!(collection.owner_of(1).unwrap(), bob);
    }

    #[test]
    fn test_approved_transfer_clears_approval() {
        let mut collection = create_test_collection();
        let (alice, custodian, carol) = (addr(), addr(), addr());

        collection.mint(alice, 1).unwrap();
        collection.approve(alice, custodian, 1).unwrap();
        assert_eq!(collection.get_approved(1), Some(custodian));

        collection.transfer_from(custodian, alice, carol, 1).unwrap();
        assert_eq!(collection.owner_of(1).unwrap(), carol);
        assert_eq!(collection.get_approved(1), None);
    }

    #[test]
    fn test_unauthorized_transfer_rejected() {
        let mut collection = create_test_collection();
        let (alice, mallory, bob) = (addr(), addr(), addr());

        collection.mint(alice, 1).unwrap();
        let result = collection.transfer_from(mallory, alice, bob, 1);
        assert!(matches!(result, Err(TokenError::NotAuthorized { .. })));
        assert_eq!(collection.owner_of(1).unwrap(), alice);
    }

    #[test]
    fn test_transfer_from_wrong_owner_rejected() {
        let mut collection = create_test_collection();
        let (alice, bob) = (addr(), addr());

        collection.mint(alice, 1).unwrap();
        let result = collection.transfer_from(alice, bob, alice, 1);
        assert!(matches!(result, Err(TokenError::NotOwner { .. })));
    }

    #[test]
    fn test_only_owner_can_approve() {
        let mut collection = create_test_collection();
        let (alice, mallory) = (addr(), addr());

        collection.mint(alice, 1).unwrap();
        let result = collection.approve(mallory, mallory, 1);
        assert!(matches!(result, Err(TokenError::NotAuthorized { .. })));
    }
}
