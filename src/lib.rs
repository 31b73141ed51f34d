//! Quorum Wallet: a k-of-n multisig wallet engine in Rust
//!
//! This crate provides:
//! - Ordered signer sets with a signature threshold
//! - Canonical, domain-separated action digests (SHA-256)
//! - Signer recovery from recoverable ECDSA signatures (secp256k1)
//! - Per-signer nonces making every signature single-use
//! - Atomic transfer and signer-update submissions with event history
//! - JSON persistence and an offline signer key store
//!
//! # Example
//!
//! ```rust
//! use quorum_wallet::{DomainConfig, KeyPair, MultisigWallet};
//!
//! let mut keys: Vec<KeyPair> = (0..3).map(|_| KeyPair::generate()).collect();
//! keys.sort_by_key(|k| k.address());
//! let signers: Vec<_> = keys.iter().map(|k| k.address()).collect();
//!
//! // Create a 2-of-3 wallet
//! let wallet = MultisigWallet::new(DomainConfig::default(), signers.clone(), 2).unwrap();
//! println!("Wallet: {} ({})", wallet.address(), wallet.description());
//!
//! assert!(wallet.is_signer(&signers[0]));
//! assert_eq!(wallet.current_nonce(&signers[0]), 0);
//! ```

pub mod cli;
pub mod crypto;
pub mod keystore;
pub mod multisig;
pub mod storage;
pub mod treasury;

// Re-export commonly used types
pub use crypto::{recover, Address, Digest, KeyPair, Signature};
pub use keystore::{KeyStore, SignerKey};
pub use multisig::{
    DomainConfig, MultisigError, MultisigWallet, SharedWallet, TransferRequest, WalletEvent,
    WalletOptions,
};
pub use storage::{Storage, StorageConfig};
pub use treasury::{FundsTransfer, Treasury, TransferFailure};
