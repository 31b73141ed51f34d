//! Cryptographic utilities for the wallet
//!
//! This module provides:
//! - SHA-256 and HASH160 hashing
//! - ECDSA key management (secp256k1)
//! - Signer recovery from recoverable signatures

pub mod hash;
pub mod keys;
pub mod recovery;

pub use hash::{double_sha256, hash160, sha256, Digest, DIGEST_LEN};
pub use keys::{Address, KeyError, KeyPair, Signature, ADDRESS_LEN, SIGNATURE_LEN};
pub use recovery::{recover, RecoveryError};
