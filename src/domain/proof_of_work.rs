//! # Proof of Work
//!
//! Mines and validates the block header preimage:
//! `prev_block_hash ‖ HashTransactions(transactions) ‖ BE64(timestamp) ‖ BE64(targetBits) ‖ BE64(nonce)`.

use super::block::Block;
use crate::crypto::sha256_digest;
use crate::error::{BtcError, Result};
use data_encoding::HEXLOWER;
use num_bigint::{BigInt, Sign};
use std::ops::ShlAssign;
use tracing::debug;

/// Difficulty, in leading zero bits of the 256-bit target. Fixed; no retargeting.
pub const TARGET_BITS: i64 = 24;

const MAX_NONCE: i64 = i64::MAX;

pub struct ProofOfWork {
    block: Block,
    target: BigInt,
}

impl ProofOfWork {
    pub fn new(block: Block) -> ProofOfWork {
        let mut target = BigInt::from(1);
        target.shl_assign((256 - TARGET_BITS) as usize);
        ProofOfWork { block, target }
    }

    fn prepare_data(&self, nonce: i64) -> Vec<u8> {
        let mut data = Vec::new();
        data.extend_from_slice(self.block.prev_block_hash());
        data.extend(self.block.hash_transactions());
        data.extend(self.block.timestamp().to_be_bytes());
        data.extend(TARGET_BITS.to_be_bytes());
        data.extend(nonce.to_be_bytes());
        data
    }

    /// Finds the first `nonce` whose preimage hash falls below the target.
    pub fn run(&self) -> Result<(i64, Vec<u8>)> {
        let mut nonce = 0i64;
        debug!("mining block following {}", HEXLOWER.encode(self.block.prev_block_hash()));
        loop {
            let data = self.prepare_data(nonce);
            let hash = sha256_digest(&data);
            let hash_int = BigInt::from_bytes_be(Sign::Plus, &hash);
            if hash_int < self.target {
                debug!("found nonce {}: {}", nonce, HEXLOWER.encode(&hash));
                return Ok((nonce, hash));
            }
            if nonce == MAX_NONCE {
                return Err(BtcError::PowExhausted);
            }
            nonce += 1;
        }
    }

    /// Recomputes the preimage using the block's own nonce and checks it against the target.
    pub fn validate(&self) -> bool {
        let data = self.prepare_data(self.block.nonce());
        let hash = sha256_digest(&data);
        let hash_int = BigInt::from_bytes_be(Sign::Plus, &hash);
        hash_int < self.target
    }
}
