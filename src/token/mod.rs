//! Asset registry capability and the in-memory NFT reference implementation
//!
//! The custody engine never depends on a concrete token implementation;
//! it calls through the [`AssetRegistry`] trait. [`NftManager`] is the
//! bundled in-memory implementation used by tests and the CLI demo.

pub mod manager;
pub mod nft;

pub use manager::NftManager;
pub use nft::{NftCollection, TokenError};

use crate::crypto::Address;

/// External asset registry the custody engine transfers against.
///
/// Mirrors the ERC-721 surface the engine needs: ownership lookup,
/// single-token approvals, and owner-or-approved transfers. `caller` is
/// the identity an operation is performed as; implementations enforce
/// standard ownership-check failure semantics.
pub trait AssetRegistry {
    /// Current owner of a token in a collection
    fn owner_of(&self, collection: Address, token_id: u64) -> Result<Address, TokenError>;

    /// Approve a spender for a single token
    fn approve(
        &mut self,
        collection: Address,
        caller: Address,
        spender: Address,
        token_id: u64,
    ) -> Result<(), TokenError>;

    /// Transfer a token from its owner to a recipient
    fn transfer_from(
        &mut self,
        collection: Address,
        caller: Address,
        from: Address,
        to: Address,
        token_id: u64,
    ) -> Result<(), TokenError>;
}
