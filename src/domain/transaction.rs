//! # Transaction
//!
//! Coinbase and UTXO-spending transactions, their trimmed-copy signing hash,
//! and per-input ECDSA sign/verify over the prior-output graph.

use crate::codec;
use crate::crypto::{base58_decode, hash_pub_key, sha256_digest, sign_digest, verify_digest};
use crate::error::{BtcError, Result};
use crate::domain::wallet::{ADDRESS_CHECK_SUM_LEN, Wallet};
use data_encoding::HEXLOWER;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// The fixed block reward paid to the creator of a coinbase transaction.
pub const SUBSIDY: i64 = 10;

const GENESIS_COINBASE_DATA: &str =
    "The Times 03/Jan/2009 Chancellor on brink of second bailout for banks";

#[derive(Clone, Default, Serialize, Deserialize, PartialEq, Eq, Debug)]
pub struct TXInput {
    txid: Vec<u8>,
    vout: i64,
    signature: Vec<u8>,
    pub_key: Vec<u8>,
}

impl TXInput {
    pub fn txid(&self) -> &[u8] {
        &self.txid
    }

    pub fn txid_hex(&self) -> String {
        HEXLOWER.encode(&self.txid)
    }

    pub fn vout(&self) -> i64 {
        self.vout
    }

    pub fn pub_key(&self) -> &[u8] {
        &self.pub_key
    }

    pub fn signature_mut(&mut self) -> &mut Vec<u8> {
        &mut self.signature
    }

    pub fn uses_key(&self, pub_key_hash: &[u8]) -> bool {
        hash_pub_key(&self.pub_key) == pub_key_hash
    }
}

#[derive(Clone, Serialize, Deserialize, PartialEq, Eq, Debug)]
pub struct TXOutput {
    value: i64,
    pub_key_hash: Vec<u8>,
}

impl TXOutput {
    /// `pub_key_hash = Base58Decode(address)[1 : -4]` -- drop the version byte and checksum.
    pub fn new(value: i64, address: &str) -> Result<TXOutput> {
        let payload = base58_decode(address)?;
        if payload.len() <= ADDRESS_CHECK_SUM_LEN + 1 {
            return Err(BtcError::InvalidAddress(address.to_string()));
        }
        let pub_key_hash = payload[1..payload.len() - ADDRESS_CHECK_SUM_LEN].to_vec();
        Ok(TXOutput { value, pub_key_hash })
    }

    pub fn value(&self) -> i64 {
        self.value
    }

    pub fn pub_key_hash(&self) -> &[u8] {
        &self.pub_key_hash
    }

    pub fn is_locked_with_key(&self, pub_key_hash: &[u8]) -> bool {
        self.pub_key_hash == pub_key_hash
    }
}

/// The unspent outputs of one transaction, the value stored per txid in the UTXO index.
///
/// Each entry keeps the output's original index into `tx.vout` alongside the output
/// itself: spending shrinks this list, and a later spend must still name the right
/// slot in the *original* transaction (an index into the current, already-shrunk
/// list would drift as soon as more than one output of the same transaction is spent
/// out of order).
#[derive(Clone, Default, Serialize, Deserialize)]
pub struct TxOutputs(pub Vec<(i64, TXOutput)>);

impl TxOutputs {
    pub fn encode(&self) -> Result<Vec<u8>> {
        codec::encode(self, BtcError::SavingUTXOError)
    }

    pub fn decode(bytes: &[u8]) -> Result<TxOutputs> {
        codec::decode(bytes, BtcError::GettingUTXOError)
    }

    pub fn entries(&self) -> &[(i64, TXOutput)] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[derive(Clone, Default, Serialize, Deserialize)]
pub struct Transaction {
    id: Vec<u8>,
    vin: Vec<TXInput>,
    vout: Vec<TXOutput>,
}

impl Transaction {
    /// `NewCoinbase(to, data)`: mints `subsidy` to `to`. If `data` is empty a default
    /// reward message is used (the genesis block supplies the fixed Times headline instead).
    pub fn new_coinbase(to: &str, data: &str) -> Result<Transaction> {
        let data = if data.is_empty() {
            format!("Reward to '{to}'")
        } else {
            data.to_string()
        };
        let txin = TXInput {
            txid: Vec::new(),
            vout: -1,
            signature: Vec::new(),
            pub_key: data.into_bytes(),
        };
        let txout = TXOutput::new(SUBSIDY, to)?;
        let mut tx = Transaction {
            id: Vec::new(),
            vin: vec![txin],
            vout: vec![txout],
        };
        tx.id = tx.hash()?;
        Ok(tx)
    }

    /// The genesis coinbase always carries the fixed Times headline as its message.
    pub fn new_genesis_coinbase(to: &str) -> Result<Transaction> {
        Transaction::new_coinbase(to, GENESIS_COINBASE_DATA)
    }

    /// Builds and signs a transaction spending `accumulated` worth of `selected` outputs
    /// of `from_wallet`, paying `amount` to `to`, with change (if any) returned to `from`.
    pub fn new_utxo_transaction(
        from_wallet: &Wallet,
        from_address: &str,
        to_address: &str,
        amount: i64,
        accumulated: i64,
        selected: &[(Vec<u8>, i64)],
        prev_txs: &HashMap<String, Transaction>,
    ) -> Result<Transaction> {
        if accumulated < amount {
            return Err(BtcError::NotEnoughFunds);
        }

        let mut inputs = Vec::with_capacity(selected.len());
        for (txid, vout) in selected {
            inputs.push(TXInput {
                txid: txid.clone(),
                vout: *vout,
                signature: Vec::new(),
                pub_key: from_wallet.public_key().to_vec(),
            });
        }

        let mut outputs = vec![TXOutput::new(amount, to_address)?];
        if accumulated > amount {
            outputs.push(TXOutput::new(accumulated - amount, from_address)?);
        }

        let mut tx = Transaction {
            id: Vec::new(),
            vin: inputs,
            vout: outputs,
        };
        tx.id = tx.hash()?;
        tx.sign(from_wallet.private_key(), prev_txs)?;
        Ok(tx)
    }

    /// A structural clone with every input's signature and public key cleared.
    fn trimmed_copy(&self) -> Transaction {
        let vin = self
            .vin
            .iter()
            .map(|input| TXInput {
                txid: input.txid.clone(),
                vout: input.vout,
                signature: Vec::new(),
                pub_key: Vec::new(),
            })
            .collect();
        Transaction {
            id: self.id.clone(),
            vin,
            vout: self.vout.clone(),
        }
    }

    /// `Hash(tx)`: clone with `id` cleared, encode, SHA-256 the encoding.
    fn hash(&self) -> Result<Vec<u8>> {
        let tx_copy = Transaction {
            id: Vec::new(),
            vin: self.vin.clone(),
            vout: self.vout.clone(),
        };
        let encoded = tx_copy.encode()?;
        Ok(sha256_digest(&encoded))
    }

    fn prev_output<'a>(
        &self,
        input: &TXInput,
        prev_txs: &'a HashMap<String, Transaction>,
    ) -> Result<&'a TXOutput> {
        let prev_tx = prev_txs
            .get(&input.txid_hex())
            .ok_or_else(|| BtcError::MissingPrevTx(input.txid_hex()))?;
        prev_tx
            .vout
            .get(input.vout as usize)
            .ok_or_else(|| BtcError::MissingPrevTx(input.txid_hex()))
    }

    /// Coinbase transactions short-circuit to success; signing only applies to spends.
    pub fn sign(
        &mut self,
        priv_key: &[u8],
        prev_txs: &HashMap<String, Transaction>,
    ) -> Result<()> {
        if self.is_coinbase() {
            return Ok(());
        }
        let mut tx_copy = self.trimmed_copy();

        for idx in 0..self.vin.len() {
            let prev_output = self.prev_output(&self.vin[idx], prev_txs)?.clone();
            tx_copy.vin[idx].signature = Vec::new();
            tx_copy.vin[idx].pub_key = prev_output.pub_key_hash.clone();
            tx_copy.id = tx_copy.hash()?;
            tx_copy.vin[idx].pub_key = Vec::new();

            let signature = sign_digest(priv_key, &tx_copy.id)?;
            self.vin[idx].signature = signature;
        }
        Ok(())
    }

    /// Coinbase transactions always verify as `true`.
    pub fn verify(&self, prev_txs: &HashMap<String, Transaction>) -> Result<bool> {
        if self.is_coinbase() {
            return Ok(true);
        }
        let mut tx_copy = self.trimmed_copy();

        for idx in 0..self.vin.len() {
            let input = &self.vin[idx];
            let prev_output = self.prev_output(input, prev_txs)?.clone();
            tx_copy.vin[idx].signature = Vec::new();
            tx_copy.vin[idx].pub_key = prev_output.pub_key_hash.clone();
            tx_copy.id = tx_copy.hash()?;
            tx_copy.vin[idx].pub_key = Vec::new();

            if !verify_digest(&input.pub_key, &input.signature, &tx_copy.id) {
                return Ok(false);
            }
        }
        Ok(true)
    }

    pub fn is_coinbase(&self) -> bool {
        self.vin.len() == 1 && self.vin[0].txid.is_empty() && self.vin[0].vout == -1
    }

    pub fn id(&self) -> &[u8] {
        &self.id
    }

    pub fn id_hex(&self) -> String {
        HEXLOWER.encode(&self.id)
    }

    pub fn vin(&self) -> &[TXInput] {
        &self.vin
    }

    pub fn vin_mut(&mut self) -> &mut [TXInput] {
        &mut self.vin
    }

    pub fn vout(&self) -> &[TXOutput] {
        &self.vout
    }

    pub fn encode(&self) -> Result<Vec<u8>> {
        codec::encode(self, BtcError::TransactionSerializationError)
    }

    pub fn decode(bytes: &[u8]) -> Result<Transaction> {
        codec::decode(bytes, BtcError::TransactionDeserializationError)
    }
}
