use thiserror::Error;

#[derive(Clone, Error, Debug)]
pub enum BtcError {
    // Chain store lifecycle
    #[error("Blockchain already exists at {0}")]
    AlreadyExists(String),
    #[error("Blockchain not initialized at {0}")]
    NotInitialized(String),
    #[error("Blockchain DB connection error: {0}")]
    BlockchainDBconnection(String),
    #[error("Open Blockchain tree error: {0}")]
    OpenBlockchainTreeError(String),
    #[error("Saving Blockchain error: {0}")]
    SavingBlockchainError(String),
    #[error("Getting Blockchain error: {0}")]
    GetBlockchainError(String),
    #[error("Blockchain tip hash error: {0}")]
    BlockChainTipHashError(String),

    #[error("Invalid value for miner. Must be yes or no.")]
    InvalidValueForMiner(String),

    // Unrecoverable errors
    #[error("Invalid transaction")]
    InvalidTransaction,
    #[error("Invalid block")]
    InvalidBlock,
    #[error("Not enough funds")]
    NotEnoughFunds,
    #[error("Proof of work nonce space exhausted")]
    PowExhausted,

    #[error("Block deserialization error: {0}")]
    BlockDeserializationError(String),
    #[error("Block serialization error: {0}")]
    BlockSerializationError(String),

    #[error("Transaction deserialization error: {0}")]
    TransactionDeserializationError(String),
    #[error("Transaction serialization error: {0}")]
    TransactionSerializationError(String),
    #[error("Transaction signature error: {0}")]
    TransactionSignatureError(String),
    #[error("Transaction Id Hex decoding error: {0}")]
    TransactionIdHexDecodingError(String),
    #[error("Transaction not found error: {0}")]
    TransactionNotFoundError(String),
    #[error("Missing previous transaction for input: {0}")]
    MissingPrevTx(String),

    #[error("Address encoding error: {0}")]
    AddressEncodingError(String),
    #[error("Address decoding error: {0}")]
    AddressDecodingError(String),
    #[error("Invalid address: {0}")]
    InvalidAddress(String),
    #[error("Unknown wallet address: {0}")]
    UnknownAddress(String),

    #[error("Key generation error: {0}")]
    KeyGenerationError(String),
    #[error("Signing error: {0}")]
    SigningError(String),

    // IO errors
    #[error("Saving wallets error: {0}")]
    SavingWalletsError(String),
    #[error("Wallets file path error: {0}")]
    WalletsFilePathError(String),
    #[error("Wallets file open error: {0}")]
    WalletsFileOpenError(String),
    #[error("Wallets file read error: {0}")]
    WalletsFileReadError(String),
    #[error("Wallets file metadata error: {0}")]
    WalletsFileMetadataError(String),

    #[error("Wallet key pair error: {0}")]
    WalletKeyPairError(String),

    #[error("Wallets serialization error: {0}")]
    WalletsSerializationError(String),
    #[error("Wallets deserialization error: {0}")]
    WalletsDeserializationError(String),

    // Sled errors
    #[error("UTXO DB connection error: {0}")]
    UTXODBconnection(String),
    #[error("Saving UTXO error: {0}")]
    SavingUTXOError(String),
    #[error("Getting UTXO error: {0}")]
    GettingUTXOError(String),
    #[error("UTXO not found error: {0}")]
    UTXONotFoundError(String),
}

pub type Result<T> = std::result::Result<T, BtcError>;
