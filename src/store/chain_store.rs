//! # Chain store
//!
//! The persistent, append-only chain: the `blocks` bucket keyed by block hash, plus
//! the reserved key `"l"` holding the current tip. Single-threaded, single-process --
//! one writer at a time, mediated entirely by the embedded KV store's own transactions.

use crate::domain::{Block, Transaction};
use crate::error::{BtcError, Result};
use sled::transaction::TransactionResult;
use sled::{Db, Tree};
use std::collections::HashMap;
use std::path::Path;
use tracing::info;

const BLOCKS_TREE: &str = "blocks";
pub(crate) const CHAINSTATE_TREE: &str = "chainstate";
const TIP_KEY: &[u8] = b"l";

pub struct ChainStore {
    db: Db,
    blocks: Tree,
    tip_hash: Vec<u8>,
}

impl ChainStore {
    /// Creates a fresh database at `path`, funding the genesis coinbase to `genesis_address`.
    /// Fails with `AlreadyExists` if a database is already present there.
    pub fn create(path: impl AsRef<Path>, genesis_address: &str) -> Result<ChainStore> {
        let path = path.as_ref();
        if path.exists() {
            return Err(BtcError::AlreadyExists(path.display().to_string()));
        }
        let db = sled::open(path).map_err(|e| BtcError::BlockchainDBconnection(e.to_string()))?;
        let blocks = db
            .open_tree(BLOCKS_TREE)
            .map_err(|e| BtcError::OpenBlockchainTreeError(e.to_string()))?;

        let coinbase = Transaction::new_genesis_coinbase(genesis_address)?;
        let genesis = Block::new_genesis_block(coinbase)?;
        info!("mined genesis block");
        Self::commit_block(&blocks, &genesis)?;

        Ok(ChainStore {
            db,
            blocks,
            tip_hash: genesis.hash().to_vec(),
        })
    }

    /// Opens an existing database at `path`. Fails with `NotInitialized` if absent.
    pub fn open(path: impl AsRef<Path>) -> Result<ChainStore> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(BtcError::NotInitialized(path.display().to_string()));
        }
        let db = sled::open(path).map_err(|e| BtcError::BlockchainDBconnection(e.to_string()))?;
        let blocks = db
            .open_tree(BLOCKS_TREE)
            .map_err(|e| BtcError::OpenBlockchainTreeError(e.to_string()))?;
        let tip_hash = blocks
            .get(TIP_KEY)
            .map_err(|e| BtcError::GetBlockchainError(e.to_string()))?
            .ok_or_else(|| BtcError::NotInitialized(path.display().to_string()))?
            .to_vec();

        Ok(ChainStore {
            db,
            blocks,
            tip_hash,
        })
    }

    fn commit_block(blocks: &Tree, block: &Block) -> Result<()> {
        let encoded = block.encode()?;
        let hash = block.hash().to_vec();
        let result: TransactionResult<(), ()> = blocks.transaction(move |tx| {
            tx.insert(hash.as_slice(), encoded.clone())?;
            tx.insert(TIP_KEY, hash.as_slice())?;
            Ok(())
        });
        result.map_err(|e| BtcError::SavingBlockchainError(format!("{e:?}")))
    }

    pub fn tip_hash(&self) -> &[u8] {
        &self.tip_hash
    }

    pub(crate) fn db(&self) -> &Db {
        &self.db
    }

    pub fn chainstate_tree(&self) -> Result<Tree> {
        self.db
            .open_tree(CHAINSTATE_TREE)
            .map_err(|e| BtcError::UTXODBconnection(e.to_string()))
    }

    /// Verifies every transaction, mines a block atop the tip, and appends it.
    /// Leaves on-disk state unchanged if any transaction fails to verify.
    pub fn mine_block(&mut self, transactions: &[Transaction]) -> Result<Block> {
        for tx in transactions {
            if tx.is_coinbase() {
                continue;
            }
            let mut prev_txs = HashMap::new();
            for input in tx.vin() {
                let prev = self
                    .find_transaction(input.txid())?
                    .ok_or_else(|| BtcError::MissingPrevTx(input.txid_hex()))?;
                prev_txs.insert(input.txid_hex(), prev);
            }
            if !tx.verify(&prev_txs)? {
                return Err(BtcError::InvalidTransaction);
            }
        }

        let block = Block::new(self.tip_hash.clone(), transactions)?;
        Self::commit_block(&self.blocks, &block)?;
        self.tip_hash = block.hash().to_vec();
        Ok(block)
    }

    /// Walks from the current tip toward genesis.
    pub fn iter(&self) -> ChainIterator {
        ChainIterator {
            blocks: self.blocks.clone(),
            current_hash: Some(self.tip_hash.clone()),
        }
    }

    /// Linear scan via the iterator; returns the first transaction matching `id`.
    pub fn find_transaction(&self, id: &[u8]) -> Result<Option<Transaction>> {
        for block in self.iter() {
            let block = block?;
            for tx in block.transactions() {
                if tx.id() == id {
                    return Ok(Some(tx.clone()));
                }
            }
        }
        Ok(None)
    }
}

pub struct ChainIterator {
    blocks: Tree,
    current_hash: Option<Vec<u8>>,
}

impl Iterator for ChainIterator {
    type Item = Result<Block>;

    fn next(&mut self) -> Option<Result<Block>> {
        let hash = self.current_hash.take()?;
        match self.blocks.get(&hash) {
            Ok(Some(bytes)) => match Block::decode(&bytes) {
                Ok(block) => {
                    if !block.is_genesis() {
                        self.current_hash = Some(block.prev_block_hash().to_vec());
                    }
                    Some(Ok(block))
                }
                Err(e) => Some(Err(e)),
            },
            Ok(None) => None,
            Err(e) => Some(Err(BtcError::GetBlockchainError(e.to_string()))),
        }
    }
}
