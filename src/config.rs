//! Process-wide configuration: on-disk paths, resolved once from the environment.
//!
//! Mirrors the teacher's env-var-driven configuration (`TREE_DIR`, `WALLET_FILE`)
//! rather than a config file, since this is a single-process CLI tool with no
//! deployment-time config surface of its own.

use once_cell::sync::Lazy;
use std::env;

const DEFAULT_CHAIN_DB_PATH: &str = "chaindata";
const DEFAULT_WALLET_FILE: &str = "wallet.dat";

#[derive(Clone, Debug)]
pub struct Config {
    pub chain_db_path: String,
    pub wallet_file_path: String,
}

impl Config {
    fn from_env() -> Config {
        Config {
            chain_db_path: env::var("TREE_DIR").unwrap_or_else(|_| DEFAULT_CHAIN_DB_PATH.to_string()),
            wallet_file_path: env::var("WALLET_FILE").unwrap_or_else(|_| DEFAULT_WALLET_FILE.to_string()),
        }
    }
}

pub static GLOBAL_CONFIG: Lazy<Config> = Lazy::new(Config::from_env);
