//! # Wallet
//!
//! Address derivation and checksum validation over an ECDSA P-256 key pair.
//!
//! # Examples
//!
//! ```
//! use blockchain::domain::wallet::Wallet;
//! let wallet = Wallet::new().expect("Failed to create wallet");
//! let address = wallet.get_address().expect("Failed to get address");
//! ```

use crate::crypto::{base58_decode, base58_encode, generate_keypair, hash_pub_key, sha256_digest};
use crate::error::Result;
use serde::{Deserialize, Serialize};

/// Address version byte. A design constant: changing it changes the on-disk format.
pub const VERSION: u8 = 0x00;
pub const ADDRESS_CHECK_SUM_LEN: usize = 4;

#[derive(Clone, Serialize, Deserialize)]
pub struct Wallet {
    private_key: Vec<u8>,
    public_key: Vec<u8>,
}

impl Wallet {
    /// Generates a new ECDSA P-256 key pair.
    pub fn new() -> Result<Wallet> {
        let (private_key, public_key) = generate_keypair()?;
        Ok(Wallet {
            private_key,
            public_key,
        })
    }

    /// `Base58(version ‖ pub_key_hash ‖ checksum)`.
    pub fn get_address(&self) -> Result<String> {
        let pub_key_hash = hash_pub_key(&self.public_key);
        let mut payload = vec![VERSION];
        payload.extend(&pub_key_hash);
        let checksum = checksum(&payload);
        payload.extend(checksum);
        Ok(base58_encode(&payload))
    }

    pub fn public_key(&self) -> &[u8] {
        &self.public_key
    }

    pub fn private_key(&self) -> &[u8] {
        &self.private_key
    }
}

/// First 4 bytes of `SHA-256(SHA-256(payload))`.
fn checksum(payload: &[u8]) -> Vec<u8> {
    let first = sha256_digest(payload);
    let second = sha256_digest(&first);
    second[0..ADDRESS_CHECK_SUM_LEN].to_vec()
}

/// Decodes `address`, recomputes its checksum over `version ‖ pub_key_hash`, and compares.
pub fn validate_address(address: &str) -> Result<bool> {
    let payload = base58_decode(address)?;
    if payload.len() <= ADDRESS_CHECK_SUM_LEN + 1 {
        return Ok(false);
    }
    let actual_checksum = payload[payload.len() - ADDRESS_CHECK_SUM_LEN..].to_vec();
    let version = payload[0];
    let pub_key_hash = &payload[1..payload.len() - ADDRESS_CHECK_SUM_LEN];

    let mut target = vec![version];
    target.extend(pub_key_hash);
    let expected_checksum = checksum(&target);
    Ok(actual_checksum == expected_checksum)
}

/// Reconstructs the Base58Check address for a public-key hash (the `l`ocking-script target).
pub fn convert_address(pub_key_hash: &[u8]) -> Result<String> {
    let mut payload = vec![VERSION];
    payload.extend(pub_key_hash);
    let checksum = checksum(&payload);
    payload.extend(checksum);
    Ok(base58_encode(&payload))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_wallet_has_64_byte_public_key() {
        let wallet = Wallet::new().expect("wallet generation failed");
        assert_eq!(wallet.public_key().len(), 64);
    }

    #[test]
    fn test_address_round_trip_validates() {
        let wallet = Wallet::new().expect("wallet generation failed");
        let address = wallet.get_address().expect("address derivation failed");
        assert!(validate_address(&address).expect("validation failed"));
    }

    #[test]
    fn test_address_matches_convert_address_of_pub_key_hash() {
        let wallet = Wallet::new().expect("wallet generation failed");
        let address = wallet.get_address().expect("address derivation failed");
        let pub_key_hash = hash_pub_key(wallet.public_key());
        let converted = convert_address(&pub_key_hash).expect("conversion failed");
        assert_eq!(address, converted);
    }

    #[test]
    fn test_tampered_address_fails_validation() {
        let wallet = Wallet::new().expect("wallet generation failed");
        let mut address = wallet.get_address().expect("address derivation failed");
        address.push('x');
        assert!(!validate_address(&address).unwrap_or(false));
    }

    #[test]
    fn test_distinct_wallets_get_distinct_addresses() {
        let a = Wallet::new().expect("wallet generation failed");
        let b = Wallet::new().expect("wallet generation failed");
        assert_ne!(
            a.get_address().expect("address derivation failed"),
            b.get_address().expect("address derivation failed")
        );
    }
}
