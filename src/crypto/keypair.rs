//! # Keypair Generation Module
//!
//! ECDSA over P-256, via `ring`. Two format decisions are made here and are
//! part of the on-disk format (see DESIGN.md):
//!
//! - Public keys are stored as the raw 64-byte `X ‖ Y` affine point, with the
//!   SEC1 `0x04` uncompressed-point prefix stripped. It is re-added whenever a
//!   public key needs to go back through `ring`.
//! - Signatures are `ring`'s native `ECDSA_P256_SHA256_FIXED` encoding, a fixed
//!   32-byte `r` followed by a fixed 32-byte `s` (64 bytes total), not a
//!   minimal-length big integer encoding.

use crate::error::{BtcError, Result};
use ring::rand::SystemRandom;
use ring::signature::{
    ECDSA_P256_SHA256_FIXED, ECDSA_P256_SHA256_FIXED_SIGNING, EcdsaKeyPair, KeyPair,
    UnparsedPublicKey,
};

const UNCOMPRESSED_POINT_PREFIX: u8 = 0x04;

/// Generates a new ECDSA P-256 key pair.
///
/// Returns `(private_key_pkcs8, public_key_xy)`: the private key as a PKCS#8
/// document, and the public key as the raw 64-byte `X ‖ Y` point.
pub fn generate_keypair() -> Result<(Vec<u8>, Vec<u8>)> {
    let rng = SystemRandom::new();
    let pkcs8 = EcdsaKeyPair::generate_pkcs8(&ECDSA_P256_SHA256_FIXED_SIGNING, &rng)
        .map_err(|e| BtcError::KeyGenerationError(e.to_string()))?;
    let key_pair = EcdsaKeyPair::from_pkcs8(&ECDSA_P256_SHA256_FIXED_SIGNING, pkcs8.as_ref(), &rng)
        .map_err(|e| BtcError::KeyGenerationError(e.to_string()))?;
    let public_key_xy = strip_uncompressed_prefix(key_pair.public_key().as_ref())?;
    Ok((pkcs8.as_ref().to_vec(), public_key_xy))
}

/// Signs `digest` (expected to already be a SHA-256 hash) with `pkcs8`, returning
/// the 64-byte `r ‖ s` signature.
pub fn sign_digest(pkcs8: &[u8], digest: &[u8]) -> Result<Vec<u8>> {
    let rng = SystemRandom::new();
    let key_pair = EcdsaKeyPair::from_pkcs8(&ECDSA_P256_SHA256_FIXED_SIGNING, pkcs8, &rng)
        .map_err(|e| BtcError::SigningError(e.to_string()))?;
    key_pair
        .sign(&rng, digest)
        .map(|signature| signature.as_ref().to_vec())
        .map_err(|e| BtcError::SigningError(e.to_string()))
}

/// Verifies a 64-byte `r ‖ s` signature over `digest` against the raw 64-byte
/// `X ‖ Y` public key. Returns `false` on any malformed input rather than erroring,
/// matching the boolean contract of `Transaction::verify`.
pub fn verify_digest(public_key_xy: &[u8], signature: &[u8], digest: &[u8]) -> bool {
    let Ok(sec1_public_key) = add_uncompressed_prefix(public_key_xy) else {
        return false;
    };
    let peer_public_key = UnparsedPublicKey::new(&ECDSA_P256_SHA256_FIXED, sec1_public_key);
    peer_public_key.verify(digest, signature).is_ok()
}

fn strip_uncompressed_prefix(sec1_point: &[u8]) -> Result<Vec<u8>> {
    match sec1_point.split_first() {
        Some((&UNCOMPRESSED_POINT_PREFIX, xy)) => Ok(xy.to_vec()),
        _ => Err(BtcError::KeyGenerationError(
            "expected an uncompressed P-256 point".to_string(),
        )),
    }
}

fn add_uncompressed_prefix(xy: &[u8]) -> Result<Vec<u8>> {
    if xy.len() != 64 {
        return Err(BtcError::KeyGenerationError(
            "public key is not a 64-byte X||Y point".to_string(),
        ));
    }
    let mut sec1_point = Vec::with_capacity(65);
    sec1_point.push(UNCOMPRESSED_POINT_PREFIX);
    sec1_point.extend_from_slice(xy);
    Ok(sec1_point)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::hash::sha256_digest;

    #[test]
    fn test_keypair_generation_produces_expected_lengths() {
        let (priv_key, pub_key) = generate_keypair().expect("keygen failed");
        assert!(!priv_key.is_empty());
        assert_eq!(pub_key.len(), 64);
    }

    #[test]
    fn test_sign_then_verify_round_trip() {
        let (priv_key, pub_key) = generate_keypair().expect("keygen failed");
        let digest = sha256_digest(b"a transaction hash");
        let signature = sign_digest(&priv_key, &digest).expect("signing failed");
        assert_eq!(signature.len(), 64);
        assert!(verify_digest(&pub_key, &signature, &digest));
    }

    #[test]
    fn test_verify_rejects_flipped_signature_bit() {
        let (priv_key, pub_key) = generate_keypair().expect("keygen failed");
        let digest = sha256_digest(b"a transaction hash");
        let mut signature = sign_digest(&priv_key, &digest).expect("signing failed");
        signature[0] ^= 0x01;
        assert!(!verify_digest(&pub_key, &signature, &digest));
    }

    #[test]
    fn test_verify_rejects_flipped_pub_key_bit() {
        let (priv_key, pub_key) = generate_keypair().expect("keygen failed");
        let digest = sha256_digest(b"a transaction hash");
        let signature = sign_digest(&priv_key, &digest).expect("signing failed");
        let mut tampered_pub_key = pub_key.clone();
        tampered_pub_key[0] ^= 0x01;
        assert!(!verify_digest(&tampered_pub_key, &signature, &digest));
    }

    #[test]
    fn test_verify_rejects_wrong_message() {
        let (priv_key, pub_key) = generate_keypair().expect("keygen failed");
        let digest = sha256_digest(b"original message");
        let signature = sign_digest(&priv_key, &digest).expect("signing failed");
        let other_digest = sha256_digest(b"different message");
        assert!(!verify_digest(&pub_key, &signature, &other_digest));
    }

    #[test]
    fn test_generated_keypairs_are_distinct() {
        let (priv_a, pub_a) = generate_keypair().expect("keygen failed");
        let (priv_b, pub_b) = generate_keypair().expect("keygen failed");
        assert_ne!(priv_a, priv_b);
        assert_ne!(pub_a, pub_b);
    }
}
