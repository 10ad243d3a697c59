use blockchain::cli::{Command, Opt};
use blockchain::crypto::base58_decode;
use blockchain::domain::wallet::{ADDRESS_CHECK_SUM_LEN, convert_address, validate_address};
use blockchain::domain::{Transaction, Wallet, Wallets};
use blockchain::store::{ChainStore, UtxoSet};
use blockchain::{BtcError, GLOBAL_CONFIG, Result};
use clap::Parser;
use data_encoding::HEXLOWER;
use tracing::info;
use tracing_subscriber::{
    filter::{EnvFilter, LevelFilter},
    fmt,
    prelude::*,
};

/// Initialize logging with functional configuration
fn initialize_logging() {
    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy();

    tracing_subscriber::registry()
        .with(fmt::layer().with_filter(filter))
        .init();
}

fn pub_key_hash_of(address: &str) -> Result<Vec<u8>> {
    if !validate_address(address)? {
        return Err(BtcError::InvalidAddress(address.to_string()));
    }
    let payload = base58_decode(address)?;
    Ok(payload[1..payload.len() - ADDRESS_CHECK_SUM_LEN].to_vec())
}

fn create_blockchain(address: &str) -> Result<()> {
    if !validate_address(address)? {
        return Err(BtcError::InvalidAddress(address.to_string()));
    }
    let store = ChainStore::create(&GLOBAL_CONFIG.chain_db_path, address)?;
    let utxo_set = UtxoSet::open(&store)?;
    utxo_set.reindex(&store)?;
    info!("Created blockchain, genesis reward sent to {address}");
    Ok(())
}

fn create_wallet() -> Result<()> {
    let mut wallets = Wallets::open(&GLOBAL_CONFIG.wallet_file_path)?;
    let address = wallets.create_wallet()?;
    info!("Your new address: {address}");
    Ok(())
}

fn get_balance(address: &str) -> Result<()> {
    let pub_key_hash = pub_key_hash_of(address)?;
    let store = ChainStore::open(&GLOBAL_CONFIG.chain_db_path)?;
    let utxo_set = UtxoSet::open(&store)?;
    let balance: i64 = utxo_set
        .find_utxo(&pub_key_hash)?
        .iter()
        .map(|out| out.value())
        .sum();
    info!("Balance of '{address}': {balance}");
    Ok(())
}

fn list_addresses() -> Result<()> {
    let wallets = Wallets::open(&GLOBAL_CONFIG.wallet_file_path)?;
    for address in wallets.addresses() {
        info!("{address}");
    }
    Ok(())
}

fn print_chain() -> Result<()> {
    let store = ChainStore::open(&GLOBAL_CONFIG.chain_db_path)?;
    for block in store.iter() {
        let block = block?;
        info!("Prev. hash: {}", HEXLOWER.encode(block.prev_block_hash()));
        info!("Hash: {}", HEXLOWER.encode(block.hash()));
        info!("Timestamp: {}", block.timestamp());
        for tx in block.transactions() {
            info!("- Transaction {}", HEXLOWER.encode(tx.id()));
            if !tx.is_coinbase() {
                for input in tx.vin() {
                    info!(
                        "  -- Input txid = {}, vout = {}",
                        input.txid_hex(),
                        input.vout()
                    );
                }
            }
            for output in tx.vout() {
                let address = convert_address(output.pub_key_hash())
                    .unwrap_or_else(|_| "unknown".to_string());
                info!("  -- Output value = {}, to = {}", output.value(), address);
            }
        }
    }
    Ok(())
}

fn send(from: &str, to: &str, amount: i64) -> Result<()> {
    if !validate_address(from)? {
        return Err(BtcError::InvalidAddress(from.to_string()));
    }
    if !validate_address(to)? {
        return Err(BtcError::InvalidAddress(to.to_string()));
    }

    let wallets = Wallets::open(&GLOBAL_CONFIG.wallet_file_path)?;
    let from_wallet: &Wallet = wallets
        .get(from)
        .ok_or_else(|| BtcError::UnknownAddress(from.to_string()))?;

    let mut store = ChainStore::open(&GLOBAL_CONFIG.chain_db_path)?;
    let utxo_set = UtxoSet::open(&store)?;

    let pub_key_hash = pub_key_hash_of(from)?;
    let (accumulated, selected) = utxo_set.find_spendable_outputs(&pub_key_hash, amount)?;
    if accumulated < amount {
        return Err(BtcError::NotEnoughFunds);
    }
    let prev_txs = utxo_set.prev_transactions(&store, &selected)?;

    let spend_tx = Transaction::new_utxo_transaction(
        from_wallet,
        from,
        to,
        amount,
        accumulated,
        &selected,
        &prev_txs,
    )?;
    // The sender also mines the block, so the block reward goes back to them.
    let reward_tx = Transaction::new_coinbase(from, "")?;

    let block = store.mine_block(&[spend_tx, reward_tx])?;
    utxo_set.update(&block)?;
    info!("Sent {amount} from {from} to {to}");
    Ok(())
}

fn print_version() {
    info!("blockchain {}", env!("CARGO_PKG_VERSION"));
}

fn process_command(command: Command) -> Result<()> {
    match command {
        Command::Createblockchain { address } => create_blockchain(&address),
        Command::Createwallet => create_wallet(),
        Command::Getbalance { address } => get_balance(&address),
        Command::Listaddresses => list_addresses(),
        Command::Printchain => print_chain(),
        Command::Send { from, to, amount } => send(&from, &to, amount),
        Command::Version => {
            print_version();
            Ok(())
        }
    }
}

fn main() {
    initialize_logging();

    let opt = Opt::parse();

    if let Err(e) = process_command(opt.command) {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
