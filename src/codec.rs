//! Deterministic structured encoding/decoding, via `bincode`'s serde integration.
//!
//! Block/Transaction/TxOutputs hashes are never taken over this encoding directly
//! (see `domain::proof_of_work` and `domain::transaction`, which hash explicit byte
//! concatenations) -- this module only governs what is actually written to disk.

use crate::error::{BtcError, Result};
use serde::Serialize;
use serde::de::DeserializeOwned;

fn config() -> bincode::config::Configuration {
    bincode::config::standard()
}

pub fn encode<T: Serialize>(value: &T, on_error: impl Fn(String) -> BtcError) -> Result<Vec<u8>> {
    bincode::serde::encode_to_vec(value, config()).map_err(|e| on_error(e.to_string()))
}

pub fn decode<T: DeserializeOwned>(
    bytes: &[u8],
    on_error: impl Fn(String) -> BtcError,
) -> Result<T> {
    bincode::serde::decode_from_slice(bytes, config())
        .map(|(value, _)| value)
        .map_err(|e| on_error(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Serialize, Deserialize, PartialEq, Debug)]
    struct Sample {
        a: i64,
        b: Vec<u8>,
    }

    #[test]
    fn test_encode_decode_round_trip() {
        let value = Sample {
            a: -7,
            b: vec![1, 2, 3],
        };
        let bytes = encode(&value, BtcError::BlockSerializationError).expect("encode failed");
        let decoded: Sample =
            decode(&bytes, BtcError::BlockDeserializationError).expect("decode failed");
        assert_eq!(value, decoded);
    }

    #[test]
    fn test_decode_garbage_is_structured_error() {
        let garbage = vec![0xffu8; 3];
        let result: Result<Sample> = decode(&garbage, BtcError::BlockDeserializationError);
        assert!(matches!(result, Err(BtcError::BlockDeserializationError(_))));
    }
}
