pub mod base58;
pub mod hash;
pub mod keypair;

pub use base58::{base58_decode, base58_encode};
pub use hash::{hash_pub_key, ripemd160_digest, sha256_digest};
pub use keypair::{generate_keypair, sign_digest, verify_digest};
