//! Keccak-256 hashing utilities
//!
//! All authorization digests and address derivations use Keccak-256 so
//! that signatures produced by standard Ethereum tooling verify unchanged.

use tiny_keccak::{Hasher, Keccak};

/// Computes the Keccak-256 hash of the input data
pub fn keccak256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Keccak::v256();
    let mut output = [0u8; 32];
    hasher.update(data);
    hasher.finalize(&mut output);
    output
}

/// Computes Keccak-256 and returns it as a hex string
pub fn keccak256_hex(data: &[u8]) -> String {
    hex::encode(keccak256(data))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keccak256_known_vectors() {
        // Keccak-256, not SHA3-256
        assert_eq!(
            keccak256_hex(b""),
            "c5d2460186f7233c927e7db2dcc703c0e500b653ca82273b7bfad8045d85a470"
        );
        assert_eq!(
            keccak256_hex(b"hello world"),
            "47173285a8d7341e5e972fc677286384f802f8ef42a5ec5f03bbfa254cb01fab"
        );
    }

    #[test]
    fn test_keccak256_determinism() {
        assert_eq!(keccak256(b"data"), keccak256(b"data"));
        assert_ne!(keccak256(b"data"), keccak256(b"date"));
    }
}
