//! # Block
//!
//! A block bundles an ordered list of transactions behind a proof-of-work header.
//! Immutable once mined; the only way to destroy one is to remove the database.

use super::proof_of_work::ProofOfWork;
use super::transaction::Transaction;
use crate::codec;
use crate::crypto::sha256_digest;
use crate::error::{BtcError, Result};
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

#[derive(Clone, Serialize, Deserialize)]
pub struct Block {
    timestamp: i64,
    prev_block_hash: Vec<u8>,
    hash: Vec<u8>,
    transactions: Vec<Transaction>,
    nonce: i64,
}

impl Block {
    /// Assembles a block over `transactions` atop `prev_block_hash`, mining it in the process.
    pub fn new(prev_block_hash: Vec<u8>, transactions: &[Transaction]) -> Result<Block> {
        let mut block = Block {
            timestamp: current_timestamp(),
            prev_block_hash,
            hash: Vec::new(),
            transactions: transactions.to_vec(),
            nonce: 0,
        };
        let pow = ProofOfWork::new(block.clone());
        let (nonce, hash) = pow.run()?;
        block.nonce = nonce;
        block.hash = hash;
        Ok(block)
    }

    /// The genesis block has no predecessor.
    pub fn new_genesis_block(coinbase: Transaction) -> Result<Block> {
        Block::new(Vec::new(), &[coinbase])
    }

    pub fn is_genesis(&self) -> bool {
        self.prev_block_hash.is_empty()
    }

    /// Recomputes and checks this block's proof-of-work.
    pub fn validate(&self) -> bool {
        ProofOfWork::new(self.clone()).validate()
    }

    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    pub fn prev_block_hash(&self) -> &[u8] {
        &self.prev_block_hash
    }

    pub fn hash(&self) -> &[u8] {
        &self.hash
    }

    pub fn timestamp(&self) -> i64 {
        self.timestamp
    }

    pub fn nonce(&self) -> i64 {
        self.nonce
    }

    #[cfg(test)]
    pub(crate) fn set_nonce(&mut self, nonce: i64) {
        self.nonce = nonce;
    }

    /// `sha256(concat(tx.id for tx in transactions))` -- a flat concatenation, not a Merkle root.
    pub fn hash_transactions(&self) -> Vec<u8> {
        let mut ids = Vec::new();
        for tx in &self.transactions {
            ids.extend_from_slice(tx.id());
        }
        sha256_digest(&ids)
    }

    pub fn encode(&self) -> Result<Vec<u8>> {
        codec::encode(self, BtcError::BlockSerializationError)
    }

    pub fn decode(bytes: &[u8]) -> Result<Block> {
        codec::decode(bytes, BtcError::BlockDeserializationError)
    }
}

fn current_timestamp() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("system clock is before the unix epoch")
        .as_secs() as i64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::transaction::Transaction;

    fn genesis_coinbase() -> Transaction {
        Transaction::new_coinbase("1JwSSubhmg6iPtRjtyqhUYYH7bZg3Lfy1T", "")
            .expect("coinbase construction failed")
    }

    #[test]
    fn test_genesis_block_has_empty_prev_hash() {
        let block = Block::new_genesis_block(genesis_coinbase()).expect("mining failed");
        assert!(block.is_genesis());
        assert!(block.validate());
    }

    #[test]
    fn test_block_encode_decode_round_trip() {
        let block = Block::new_genesis_block(genesis_coinbase()).expect("mining failed");
        let bytes = block.encode().expect("encode failed");
        let decoded = Block::decode(&bytes).expect("decode failed");
        assert_eq!(decoded.hash(), block.hash());
        assert_eq!(decoded.nonce(), block.nonce());
        assert_eq!(decoded.transactions().len(), block.transactions().len());
    }

    #[test]
    fn test_hash_transactions_depends_on_tx_ids() {
        let block_a = Block::new_genesis_block(genesis_coinbase()).expect("mining failed");
        let block_b = Block::new_genesis_block(
            Transaction::new_coinbase("1JwSSubhmg6iPtRjtyqhUYYH7bZg3Lfy1T", "different data")
                .expect("coinbase construction failed"),
        )
        .expect("mining failed");
        assert_ne!(block_a.hash_transactions(), block_b.hash_transactions());
    }

    #[test]
    fn test_second_block_links_to_first() {
        let genesis = Block::new_genesis_block(genesis_coinbase()).expect("mining failed");
        let next = Block::new(
            genesis.hash().to_vec(),
            &[Transaction::new_coinbase("1JwSSubhmg6iPtRjtyqhUYYH7bZg3Lfy1T", "").unwrap()],
        )
        .expect("mining failed");
        assert_eq!(next.prev_block_hash(), genesis.hash());
        assert!(!next.is_genesis());
    }
}
