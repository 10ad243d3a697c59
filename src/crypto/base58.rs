//! Base58 encoding/decoding for addresses (Bitcoin alphabet).

use crate::error::{BtcError, Result};

/// Encodes `data` as a Base58 string; leading-zero bytes map to leading `'1'` characters.
pub fn base58_encode(data: &[u8]) -> String {
    bs58::encode(data).into_string()
}

/// Decodes a Base58 string back into bytes.
pub fn base58_decode(data: &str) -> Result<Vec<u8>> {
    bs58::decode(data)
        .into_vec()
        .map_err(|e| BtcError::AddressDecodingError(e.to_string()))
}
