// Declare and defines a module for the domain layer
pub mod block;
pub mod proof_of_work;
pub mod transaction;
pub mod wallet;
pub mod wallets;

// Re-export the modules
pub use block::Block;
pub use proof_of_work::{ProofOfWork, TARGET_BITS};
pub use transaction::{SUBSIDY, TXInput, TXOutput, Transaction, TxOutputs};
pub use wallet::{ADDRESS_CHECK_SUM_LEN, VERSION, Wallet, convert_address, validate_address};
pub use wallets::Wallets;
