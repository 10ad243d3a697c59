//! # UTXO index
//!
//! The derived per-txid unspent-output map, backed by the `chainstate` bucket.
//! Kept consistent with the authoritative chain either incrementally (`update`,
//! after each mined block) or by full rebuild (`reindex`, which `update` must agree
//! with byte-for-byte).

use super::chain_store::ChainStore;
use crate::domain::{TXOutput, Transaction, TxOutputs};
use crate::error::{BtcError, Result};
use data_encoding::HEXLOWER;
use sled::transaction::TransactionResult;
use sled::{Batch, Tree};
use std::collections::HashMap;

pub struct UtxoSet {
    chainstate: Tree,
}

impl UtxoSet {
    pub fn open(store: &ChainStore) -> Result<UtxoSet> {
        Ok(UtxoSet {
            chainstate: store.chainstate_tree()?,
        })
    }

    /// Atomic rebuild: recompute the entire index from the authoritative chain and
    /// replace the bucket's contents with it in a single batch.
    pub fn reindex(&self, store: &ChainStore) -> Result<()> {
        let rebuilt = Self::compute(store)?;

        let mut batch = Batch::default();
        for key in self.chainstate.iter().keys() {
            let key = key.map_err(|e| BtcError::UTXODBconnection(e.to_string()))?;
            batch.remove(key);
        }
        for (txid, outputs) in &rebuilt {
            batch.insert(txid.as_slice(), outputs.encode()?);
        }
        self.chainstate
            .apply_batch(batch)
            .map_err(|e| BtcError::SavingUTXOError(e.to_string()))
    }

    fn compute(store: &ChainStore) -> Result<HashMap<Vec<u8>, TxOutputs>> {
        let mut utxo: HashMap<Vec<u8>, Vec<(i64, TXOutput)>> = HashMap::new();
        let mut spent: HashMap<Vec<u8>, Vec<i64>> = HashMap::new();

        for block in store.iter() {
            let block = block?;
            for tx in block.transactions() {
                let already_spent = spent.get(tx.id()).cloned().unwrap_or_default();
                let unspent: Vec<(i64, TXOutput)> = tx
                    .vout()
                    .iter()
                    .enumerate()
                    .filter(|(idx, _)| !already_spent.contains(&(*idx as i64)))
                    .map(|(idx, out)| (idx as i64, out.clone()))
                    .collect();
                if !unspent.is_empty() {
                    utxo.insert(tx.id().to_vec(), unspent);
                }

                if !tx.is_coinbase() {
                    for input in tx.vin() {
                        spent.entry(input.txid().to_vec()).or_default().push(input.vout());
                    }
                }
            }
        }

        Ok(utxo.into_iter().map(|(k, v)| (k, TxOutputs(v))).collect())
    }

    /// Applies the effect of appending `block`: removes spent outputs, adds new ones.
    /// Runs as a single write transaction; on failure no change is committed.
    pub fn update(&self, block: &crate::domain::Block) -> Result<()> {
        use sled::transaction::{ConflictableTransactionError, TransactionError};

        let result: TransactionResult<(), BtcError> = self.chainstate.transaction(|tx| {
            for block_tx in block.transactions() {
                if !block_tx.is_coinbase() {
                    for input in block_tx.vin() {
                        let existing = tx.get(input.txid())?.ok_or_else(|| {
                            ConflictableTransactionError::Abort(BtcError::UTXONotFoundError(
                                input.txid_hex(),
                            ))
                        })?;
                        let mut outs = TxOutputs::decode(&existing)
                            .map_err(ConflictableTransactionError::Abort)?
                            .0;
                        outs.retain(|(idx, _)| *idx != input.vout());
                        if outs.is_empty() {
                            tx.remove(input.txid())?;
                        } else {
                            let encoded = TxOutputs(outs)
                                .encode()
                                .map_err(ConflictableTransactionError::Abort)?;
                            tx.insert(input.txid(), encoded)?;
                        }
                    }
                }

                let new_outputs: Vec<(i64, TXOutput)> = block_tx
                    .vout()
                    .iter()
                    .enumerate()
                    .map(|(idx, out)| (idx as i64, out.clone()))
                    .collect();
                let encoded = TxOutputs(new_outputs)
                    .encode()
                    .map_err(ConflictableTransactionError::Abort)?;
                tx.insert(block_tx.id(), encoded)?;
            }
            Ok(())
        });

        result.map_err(|e| match e {
            TransactionError::Abort(btc_error) => btc_error,
            other => BtcError::SavingUTXOError(format!("{other:?}")),
        })
    }

    /// Cursor-scans `chainstate`, accumulating outputs locked to `pub_key_hash` until
    /// `amount` is reached. Returns `(accumulated, [(txid, out_idx), ...])`.
    pub fn find_spendable_outputs(
        &self,
        pub_key_hash: &[u8],
        amount: i64,
    ) -> Result<(i64, Vec<(Vec<u8>, i64)>)> {
        let mut accumulated = 0i64;
        let mut selected = Vec::new();

        'scan: for item in self.chainstate.iter() {
            let (txid, value) = item.map_err(|e| BtcError::GettingUTXOError(e.to_string()))?;
            let outputs = TxOutputs::decode(&value)?;
            for (idx, out) in outputs.entries() {
                if accumulated >= amount {
                    break 'scan;
                }
                if out.is_locked_with_key(pub_key_hash) {
                    accumulated += out.value();
                    selected.push((txid.to_vec(), *idx));
                }
            }
        }

        Ok((accumulated, selected))
    }

    /// Every output across the index locked to `pub_key_hash`, for balance queries.
    pub fn find_utxo(&self, pub_key_hash: &[u8]) -> Result<Vec<TXOutput>> {
        let mut found = Vec::new();
        for item in self.chainstate.iter() {
            let (_, value) = item.map_err(|e| BtcError::GettingUTXOError(e.to_string()))?;
            let outputs = TxOutputs::decode(&value)?;
            for (_, out) in outputs.entries() {
                if out.is_locked_with_key(pub_key_hash) {
                    found.push(out.clone());
                }
            }
        }
        Ok(found)
    }

    /// Raw `(txid, encoded TxOutputs)` pairs currently in the index, for equality checks
    /// between an incremental `update` and a full `reindex`.
    pub fn snapshot(&self) -> Result<Vec<(Vec<u8>, Vec<u8>)>> {
        let mut entries = Vec::new();
        for item in self.chainstate.iter() {
            let (k, v) = item.map_err(|e| BtcError::GettingUTXOError(e.to_string()))?;
            entries.push((k.to_vec(), v.to_vec()));
        }
        entries.sort();
        Ok(entries)
    }

    /// Looks up a referenced prior transaction for building a signing/verification map.
    pub fn prev_transactions(
        &self,
        store: &ChainStore,
        inputs: &[(Vec<u8>, i64)],
    ) -> Result<HashMap<String, Transaction>> {
        let mut map = HashMap::new();
        for (txid, _) in inputs {
            let tx = store
                .find_transaction(txid)?
                .ok_or_else(|| BtcError::MissingPrevTx(HEXLOWER.encode(txid)))?;
            map.insert(HEXLOWER.encode(txid), tx);
        }
        Ok(map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Transaction, Wallet};
    use crate::store::ChainStore;
    use tempfile::TempDir;

    fn new_wallet_address() -> (Wallet, String) {
        let wallet = Wallet::new().expect("wallet generation failed");
        let address = wallet.get_address().expect("address derivation failed");
        (wallet, address)
    }

    #[test]
    fn test_reindex_finds_genesis_coinbase_output() {
        let dir = TempDir::new().expect("tempdir failed");
        let (_wallet, address) = new_wallet_address();
        let store = ChainStore::create(dir.path().join("chain"), &address).expect("create failed");
        let utxo_set = UtxoSet::open(&store).expect("open utxo set failed");
        utxo_set.reindex(&store).expect("reindex failed");

        let pub_key_hash = crate::crypto::hash_pub_key(_wallet.public_key());
        let (accumulated, selected) = utxo_set
            .find_spendable_outputs(&pub_key_hash, 10)
            .expect("find_spendable_outputs failed");
        assert_eq!(accumulated, 10);
        assert_eq!(selected.len(), 1);
    }

    #[test]
    fn test_update_after_mine_matches_reindex() {
        let dir = TempDir::new().expect("tempdir failed");
        let (from_wallet, from_address) = new_wallet_address();
        let (_to_wallet, to_address) = new_wallet_address();
        let mut store =
            ChainStore::create(dir.path().join("chain"), &from_address).expect("create failed");
        let utxo_set = UtxoSet::open(&store).expect("open utxo set failed");
        utxo_set.reindex(&store).expect("reindex failed");

        let pkh = crate::crypto::hash_pub_key(from_wallet.public_key());
        let (accumulated, selected) = utxo_set
            .find_spendable_outputs(&pkh, 4)
            .expect("find_spendable_outputs failed");
        let prev_txs = utxo_set
            .prev_transactions(&store, &selected)
            .expect("prev_transactions failed");
        let spend = Transaction::new_utxo_transaction(
            &from_wallet,
            &from_address,
            &to_address,
            4,
            accumulated,
            &selected,
            &prev_txs,
        )
        .expect("utxo transaction construction failed");

        let reward = Transaction::new_coinbase(&from_address, "").expect("coinbase failed");
        let block = store.mine_block(&[spend, reward]).expect("mining failed");
        utxo_set.update(&block).expect("update failed");

        let reindexed = UtxoSet::open(&store).expect("open failed");
        reindexed.reindex(&store).expect("reindex failed");

        let to_pkh = crate::crypto::hash_pub_key(_to_wallet.public_key());
        assert_eq!(
            utxo_set.find_utxo(&to_pkh).expect("find_utxo failed").len(),
            reindexed.find_utxo(&to_pkh).expect("find_utxo failed").len()
        );
        let total_after: i64 = utxo_set
            .find_utxo(&pkh)
            .expect("find_utxo failed")
            .iter()
            .map(|o| o.value())
            .sum::<i64>()
            + utxo_set
                .find_utxo(&to_pkh)
                .expect("find_utxo failed")
                .iter()
                .map(|o| o.value())
                .sum::<i64>();
        assert_eq!(total_after, 10 + 10);
    }
}
