//! Signer key storage for offline signing

pub mod keystore;

pub use keystore::{KeyStore, KeyStoreError, SignerKey};
