//! Command-line surface. Not part of the ledger core -- a thin layer translating
//! subcommands into calls against `store::ChainStore`, `store::UtxoSet`, and
//! `domain::Wallets`, and converting errors into messages and exit codes.

use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "blockchain", about = "A pedagogical UTXO blockchain node")]
pub struct Opt {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    #[command(about = "Create a blockchain and send genesis block reward to the address")]
    Createblockchain {
        #[arg(long, help = "The address to send genesis block reward to")]
        address: String,
    },
    #[command(about = "Generate a new key-pair and save it to the wallet file")]
    Createwallet,
    #[command(about = "Get the wallet balance of the target address")]
    Getbalance {
        #[arg(long, help = "The address to get the balance for")]
        address: String,
    },
    #[command(about = "Print all local wallet addresses")]
    Listaddresses,
    #[command(about = "Print all blocks of the blockchain")]
    Printchain,
    #[command(about = "Send coins from one address to another")]
    Send {
        #[arg(long, help = "Source wallet address")]
        from: String,
        #[arg(long, help = "Destination wallet address")]
        to: String,
        #[arg(long, help = "Amount to send")]
        amount: i64,
    },
    #[command(about = "Print version information")]
    Version,
}
