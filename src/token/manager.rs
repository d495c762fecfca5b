//! Collection manager for creating and resolving NFT collections
//!
//! Keeps all collections keyed by address and exposes them behind the
//! `AssetRegistry` capability the custody gateway transfers through.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::crypto::{keccak256, Address};
use crate::token::nft::{NftCollection, TokenError};
use crate::token::AssetRegistry;

/// Manages all NFT collections in the system
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct NftManager {
    /// All collections by address
    collections: HashMap<Address, NftCollection>,
    /// Deployment counter for address generation
    nonce: u64,
}

impl NftManager {
    /// Create a new empty manager
    pub fn new() -> Self {
        Self {
            collections: HashMap::new(),
            nonce: 0,
        }
    }

    /// Create a new collection and return its generated address
    pub fn create_collection(
        &mut self,
        name: String,
        symbol: String,
    ) -> Result<Address, TokenError> {
        let address = self.generate_address(&name, &symbol);
        self.nonce += 1;

        let collection = NftCollection::new(address, name, symbol)?;
        log::info!(
            "Collection created: {} ({}) at {}",
            collection.name,
            collection.symbol,
            address
        );
        self.collections.insert(address, collection);

        Ok(address)
    }

    /// Generate a collection address from its metadata and the nonce
    fn generate_address(&self, name: &str, symbol: &str) -> Address {
        let input = format!("{}:{}:{}", name, symbol, self.nonce);
        let hash = keccak256(input.as_bytes());
        let mut addr = [0u8; 20];
        addr.copy_from_slice(&hash[12..]);
        Address(addr)
    }

    /// Get a collection by address
    pub fn get(&self, address: &Address) -> Option<&NftCollection> {
        self.collections.get(address)
    }

    /// Get a mutable reference to a collection
    pub fn get_mut(&mut self, address: &Address) -> Option<&mut NftCollection> {
        self.collections.get_mut(address)
    }

    /// List all collections
    pub fn list(&self) -> Vec<&NftCollection> {
        self.collections.values().collect()
    }

    /// Get collection count
    pub fn count(&self) -> usize {
        self.collections.len()
    }

    /// Check if a collection exists
    pub fn exists(&self, address: &Address) -> bool {
        self.collections.contains_key(address)
    }

    /// Mint a token in a collection
    pub fn mint(
        &mut self,
        collection: Address,
        to: Address,
        token_id: u64,
    ) -> Result<(), TokenError> {
        self.collections
            .get_mut(&collection)
            .ok_or(TokenError::UnknownCollection(collection))?
            .mint(to, token_id)
    }
}

impl AssetRegistry for NftManager {
    fn owner_of(&self, collection: Address, token_id: u64) -> Result<Address, TokenError> {
        self.collections
            .get(&collection)
            .ok_or(TokenError::UnknownCollection(collection))?
            .owner_of(token_id)
    }

    fn approve(
        &mut self,
        collection: Address,
        caller: Address,
        spender: Address,
        token_id: u64,
    ) -> Result<(), TokenError> {
        self.collections
            .get_mut(&collection)
            .ok_or(TokenError::UnknownCollection(collection))?
            .approve(caller, spender, token_id)
    }

    fn transfer_from(
        &mut self,
        collection: Address,
        caller: Address,
        from: Address,
        to: Address,
        token_id: u64,
    ) -> Result<(), TokenError> {
        self.collections
            .get_mut(&collection)
            .ok_or(TokenError::UnknownCollection(collection))?
            .transfer_from(caller, from, to, token_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::KeyPair;

    #[test]
    fn test_manager_creation() {
        let manager = NftManager::new();
        assert_eq!(manager.count(), 0);
    }

    #[test]
    fn test_collection_creation() {
        let mut manager = NftManager::new();
        let address = manager
            .create_collection("Test NFT".to_string(), "TNFT".to_string())
            .unwrap();

        assert!(manager.exists(&address));
        assert_eq!(manager.count(), 1);

        // Same metadata gets a fresh address each deployment
        let second = manager
            .create_collection("Test NFT".to_string(), "TNFT".to_string())
            .unwrap();
        assert_ne!(address, second);
        assert_eq!(manager.count(), 2);
    }

    #[test]
    fn test_mint_and_transfer_through_registry() {
        let mut manager = NftManager::new();
        let collection = manager
            .create_collection("Test NFT".to_string(), "TNFT".to_string())
            .unwrap();

        let (alice, bob) = (KeyPair::generate().address(), KeyPair::generate().address());
        manager.mint(collection, alice, 1).unwrap();

        assert_eq!(manager.owner_of(collection, 1).unwrap(), alice);
        manager.transfer_from(collection, alice, alice, bob, 1).unwrap();
        assert_eq!(manager.owner_of(collection, 1).unwrap(), bob);
    }

    #[test]
    fn test_unknown_collection() {
        let manager = NftManager::new();
        let ghost = KeyPair::generate().address();
        assert!(matches!(
            manager.owner_of(ghost, 1),
            Err(TokenError::UnknownCollection(_))
        ));
    }
}
