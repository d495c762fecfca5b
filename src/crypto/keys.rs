//! ECDSA key management and signer identification
//!
//! Key pairs use the secp256k1 elliptic curve. Signer identities are
//! 20-byte addresses derived from the public key with Keccak-256
//! (`keccak256(pubkey)[12..32]`), so identities and signatures are
//! interchangeable with standard Ethereum signing tooling.

use std::fmt;
use std::str::FromStr;

use rand::rngs::OsRng;
use secp256k1::ecdsa::{RecoverableSignature, RecoveryId};
use secp256k1::{Message, PublicKey, Secp256k1, SecretKey};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

use super::hash::keccak256;

/// Length of a serialized recoverable signature: r (32) + s (32) + v (1)
pub const SIGNATURE_LEN: usize = 65;

/// Errors that can occur during key and signature operations
#[derive(Error, Debug)]
pub enum KeyError {
    #[error("Invalid private key")]
    InvalidPrivateKey,
    #[error("Invalid public key")]
    InvalidPublicKey,
    #[error("Invalid address")]
    InvalidAddress,
    #[error("Invalid signature")]
    InvalidSignature,
    #[error("Invalid recovery id: {0}")]
    InvalidRecoveryId(u8),
    #[error("Secp256k1 error: {0}")]
    Secp256k1Error(#[from] secp256k1::Error),
}

/// A 20-byte signer or contract identity
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Address(pub [u8; 20]);

impl Address {
    /// Byte length of an address
    pub const LEN: usize = 20;

    /// Borrow the raw address bytes
    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }

    /// Build an address from a byte slice, which must be exactly 20 bytes
    pub fn from_slice(bytes: &[u8]) -> Result<Self, KeyError> {
        if bytes.len() != Self::LEN {
            return Err(KeyError::InvalidAddress);
        }
        let mut addr = [0u8; 20];
        addr.copy_from_slice(bytes);
        Ok(Self(addr))
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({})", self)
    }
}

impl FromStr for Address {
    type Err = KeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let hex_str = s.strip_prefix("0x").unwrap_or(s);
        let bytes = hex::decode(hex_str).map_err(|_| KeyError::InvalidAddress)?;
        Self::from_slice(&bytes)
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(D::Error::custom)
    }
}

/// A recoverable ECDSA signature in Ethereum wire layout: r || s || v.
///
/// `v` is the recovery id; both the Ethereum convention (27/28) and the
/// raw form (0/1) are accepted when recovering.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Signature {
    pub r: [u8; 32],
    pub s: [u8; 32],
    pub v: u8,
}

impl Signature {
    /// Parse a signature from its 65-byte serialized form
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, KeyError> {
        if bytes.len() != SIGNATURE_LEN {
            return Err(KeyError::InvalidSignature);
        }
        let mut r = [0u8; 32];
        let mut s = [0u8; 32];
        r.copy_from_slice(&bytes[..32]);
        s.copy_from_slice(&bytes[32..64]);
        Ok(Self { r, s, v: bytes[64] })
    }

    /// Parse a signature from a hex string (with or without 0x prefix)
    pub fn from_hex(hex_str: &str) -> Result<Self, KeyError> {
        let hex_str = hex_str.strip_prefix("0x").unwrap_or(hex_str);
        let bytes = hex::decode(hex_str).map_err(|_| KeyError::InvalidSignature)?;
        Self::from_bytes(&bytes)
    }

    /// Serialize to the 65-byte wire layout
    pub fn to_bytes(&self) -> [u8; SIGNATURE_LEN] {
        let mut bytes = [0u8; SIGNATURE_LEN];
        bytes[..32].copy_from_slice(&self.r);
        bytes[32..64].copy_from_slice(&self.s);
        bytes[64] = self.v;
        bytes
    }

    /// Serialize to a hex string
    pub fn to_hex(&self) -> String {
        hex::encode(self.to_bytes())
    }

    fn recovery_id(&self) -> Result<RecoveryId, KeyError> {
        // Ethereum tooling emits 27/28; the curve library wants 0/1
        let id = match self.v {
            0 | 1 => self.v,
            27 | 28 => self.v - 27,
            v => return Err(KeyError::InvalidRecoveryId(v)),
        };
        RecoveryId::from_i32(id as i32).map_err(|_| KeyError::InvalidRecoveryId(self.v))
    }
}

impl fmt::Debug for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Signature(0x{})", self.to_hex())
    }
}

/// A key pair consisting of a private key and its corresponding public key
#[derive(Clone)]
pub struct KeyPair {
    pub secret_key: SecretKey,
    pub public_key: PublicKey,
}

impl KeyPair {
    /// Generate a new random key pair
    pub fn generate() -> Self {
        let secp = Secp256k1::new();
        let (secret_key, public_key) = secp.generate_keypair(&mut OsRng);
        Self {
            secret_key,
            public_key,
        }
    }

    /// Create a key pair from an existing secret key
    pub fn from_secret_key(secret_key: SecretKey) -> Self {
        let secp = Secp256k1::new();
        let public_key = PublicKey::from_secret_key(&secp, &secret_key);
        Self {
            secret_key,
            public_key,
        }
    }

    /// Create a key pair from a hex-encoded private key
    pub fn from_secret_hex(hex_key: &str) -> Result<Self, KeyError> {
        let hex_key = hex_key.strip_prefix("0x").unwrap_or(hex_key);
        let bytes = hex::decode(hex_key).map_err(|_| KeyError::InvalidPrivateKey)?;
        let secret_key = SecretKey::from_slice(&bytes).map_err(|_| KeyError::InvalidPrivateKey)?;
        Ok(Self::from_secret_key(secret_key))
    }

    /// Get the private key as a hex string
    pub fn secret_hex(&self) -> String {
        hex::encode(self.secret_key.secret_bytes())
    }

    /// Get the public key as a hex string (uncompressed format)
    pub fn public_hex(&self) -> String {
        hex::encode(self.public_key.serialize_uncompressed())
    }

    /// The 20-byte address identifying this key pair
    pub fn address(&self) -> Address {
        public_key_to_address(&self.public_key)
    }

    /// Sign a 32-byte digest, producing a recoverable signature with the
    /// Ethereum-style v of 27 or 28
    pub fn sign_digest(&self, digest: &[u8; 32]) -> Result<Signature, KeyError> {
        let secp = Secp256k1::new();
        let message = Message::from_digest_slice(digest)?;
        let signature = secp.sign_ecdsa_recoverable(&message, &self.secret_key);
        let (recovery_id, compact) = signature.serialize_compact();

        let mut r = [0u8; 32];
        let mut s = [0u8; 32];
        r.copy_from_slice(&compact[..32]);
        s.copy_from_slice(&compact[32..]);
        Ok(Signature {
            r,
            s,
            v: 27 + recovery_id.to_i32() as u8,
        })
    }
}

/// Derive the 20-byte address for a public key: `keccak256(pubkey)[12..32]`
pub fn public_key_to_address(public_key: &PublicKey) -> Address {
    // Skip the 0x04 uncompressed-point tag
    let uncompressed = public_key.serialize_uncompressed();
    let hash = keccak256(&uncompressed[1..]);
    let mut addr = [0u8; 20];
    addr.copy_from_slice(&hash[12..]);
    Address(addr)
}

/// Parse a public key from a hex string (compressed or uncompressed)
pub fn public_key_from_hex(hex_key: &str) -> Result<PublicKey, KeyError> {
    let hex_key = hex_key.strip_prefix("0x").unwrap_or(hex_key);
    let bytes = hex::decode(hex_key).map_err(|_| KeyError::InvalidPublicKey)?;
    PublicKey::from_slice(&bytes).map_err(|_| KeyError::InvalidPublicKey)
}

/// Recover the signing address from a digest and a recoverable signature
pub fn recover_address(digest: &[u8; 32], signature: &Signature) -> Result<Address, KeyError> {
    let secp = Secp256k1::new();
    let message = Message::from_digest_slice(digest)?;
    let recovery_id = signature.recovery_id()?;

    let mut compact = [0u8; 64];
    compact[..32].copy_from_slice(&signature.r);
    compact[32..].copy_from_slice(&signature.s);
    let recoverable = RecoverableSignature::from_compact(&compact, recovery_id)
        .map_err(|_| KeyError::InvalidSignature)?;

    let public_key = secp
        .recover_ecdsa(&message, &recoverable)
        .map_err(|_| KeyError::InvalidSignature)?;
    Ok(public_key_to_address(&public_key))
}
