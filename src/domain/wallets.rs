//! # Wallets
//!
//! The local keystore: a file mapping address strings to `{private key, public key}`.
//! Independent of ledger validity -- presence or absence of a private key here
//! never changes what the chain considers valid.

use super::wallet::Wallet;
use crate::codec;
use crate::error::{BtcError, Result};
use std::collections::HashMap;
use std::fs::{File, OpenOptions};
use std::io::{Read as _, Write as _};
use std::path::{Path, PathBuf};

pub struct Wallets {
    path: PathBuf,
    wallets: HashMap<String, Wallet>,
}

impl Wallets {
    /// Loads the keystore at `path`, or starts empty if the file does not exist yet.
    pub fn open(path: impl AsRef<Path>) -> Result<Wallets> {
        let mut wallets = Wallets {
            path: path.as_ref().to_path_buf(),
            wallets: HashMap::new(),
        };
        wallets.load()?;
        Ok(wallets)
    }

    pub fn create_wallet(&mut self) -> Result<String> {
        let wallet = Wallet::new()?;
        let address = wallet.get_address()?;
        self.wallets.insert(address.clone(), wallet);
        self.save()?;
        Ok(address)
    }

    pub fn addresses(&self) -> Vec<String> {
        let mut addresses: Vec<String> = self.wallets.keys().cloned().collect();
        addresses.sort();
        addresses
    }

    pub fn get(&self, address: &str) -> Option<&Wallet> {
        self.wallets.get(address)
    }

    fn load(&mut self) -> Result<()> {
        if !self.path.exists() {
            return Ok(());
        }
        let mut file =
            File::open(&self.path).map_err(|e| BtcError::WalletsFileOpenError(e.to_string()))?;
        let metadata = file
            .metadata()
            .map_err(|e| BtcError::WalletsFileMetadataError(e.to_string()))?;
        let mut buf = vec![0u8; metadata.len() as usize];
        file.read_exact(&mut buf)
            .map_err(|e| BtcError::WalletsFileReadError(e.to_string()))?;
        self.wallets = codec::decode(&buf, BtcError::WalletsDeserializationError)?;
        Ok(())
    }

    fn save(&self) -> Result<()> {
        let bytes = codec::encode(&self.wallets, BtcError::WalletsSerializationError)?;
        let mut file = OpenOptions::new()
            .create(true)
            .truncate(true)
            .write(true)
            .open(&self.path)
            .map_err(|e| BtcError::SavingWalletsError(e.to_string()))?;
        file.write_all(&bytes)
            .map_err(|e| BtcError::SavingWalletsError(e.to_string()))?;
        file.flush()
            .map_err(|e| BtcError::SavingWalletsError(e.to_string()))
    }
}
