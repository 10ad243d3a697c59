//! # Hash Functions Module
//!
//! SHA-256 and RIPEMD-160 for address derivation and content hashing.

use ring::digest::{Context, SHA256};
use ripemd::{Digest, Ripemd160};

/// The `sha256_digest` function performs a SHA-256 hash operation on the provided data,
/// returning the resulting hash as a vector of bytes.
pub fn sha256_digest(data: &[u8]) -> Vec<u8> {
    let mut context = Context::new(&SHA256);
    context.update(data);
    context.finish().as_ref().to_vec()
}

/// RIPEMD-160 of the input, always 20 bytes.
pub fn ripemd160_digest(data: &[u8]) -> Vec<u8> {
    let mut hasher = Ripemd160::new();
    hasher.update(data);
    hasher.finalize().to_vec()
}

/// `HashPublicKey(pub) = ripemd160(sha256(pub))`, the 20-byte locking hash for an output.
pub fn hash_pub_key(pub_key: &[u8]) -> Vec<u8> {
    ripemd160_digest(sha256_digest(pub_key).as_slice())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sha256_digest_known_value() {
        let hash = sha256_digest(b"abc");
        let expected = hex::decode("ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad")
            .expect("bad test hex");
        assert_eq!(hash, expected);
    }

    #[test]
    fn test_sha256_digest_deterministic() {
        let a = sha256_digest(b"Block Chain Project");
        let b = sha256_digest(b"Block Chain Project");
        assert_eq!(a, b);
        assert_eq!(a.len(), 32);
    }

    #[test]
    fn test_ripemd160_digest_length() {
        let hash = ripemd160_digest(b"anything");
        assert_eq!(hash.len(), 20);
    }

    #[test]
    fn test_hash_pub_key_length_and_stability() {
        let pub_key = vec![7u8; 64];
        let a = hash_pub_key(&pub_key);
        let b = hash_pub_key(&pub_key);
        assert_eq!(a.len(), 20);
        assert_eq!(a, b);
    }

    #[test]
    fn test_hash_pub_key_sensitive_to_input() {
        let a = hash_pub_key(&[1u8; 64]);
        let b = hash_pub_key(&[2u8; 64]);
        assert_ne!(a, b);
    }
}
