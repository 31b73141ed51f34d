//! Signer key files
//!
//! Each signer keeps its secret key in a JSON file and signs digests
//! offline; only the resulting signatures reach the wallet.

use crate::crypto::{Address, Digest, KeyError, KeyPair, Signature};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Key store errors
#[derive(Error, Debug)]
pub enum KeyStoreError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
    #[error("Crypto error: {0}")]
    CryptoError(#[from] KeyError),
    #[error("Key file does not match address: expected {expected}, found {found}")]
    AddressMismatch { expected: Address, found: Address },
}

/// Serializable key data for persistence
#[derive(Debug, Serialize, Deserialize)]
struct KeyData {
    private_key_hex: String,
    address: Address,
    label: Option<String>,
    created_at: DateTime<Utc>,
}

/// One signer's key pair
pub struct SignerKey {
    key_pair: KeyPair,
    /// Optional label for the key
    pub label: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl SignerKey {
    /// Create a signer key with a fresh key pair
    pub fn new(label: Option<&str>) -> Self {
        Self::from_key_pair(KeyPair::generate(), label)
    }

    pub fn from_key_pair(key_pair: KeyPair, label: Option<&str>) -> Self {
        Self {
            key_pair,
            label: label.map(str::to_string),
            created_at: Utc::now(),
        }
    }

    /// Import a signer key from a private key
    pub fn from_private_key(private_key_hex: &str) -> Result<Self, KeyStoreError> {
        let key_pair = KeyPair::from_private_key_hex(private_key_hex)?;
        Ok(Self::from_key_pair(key_pair, None))
    }

    pub fn address(&self) -> Address {
        self.key_pair.address()
    }

    /// Get the public key (hex)
    pub fn public_key(&self) -> String {
        self.key_pair.public_key_hex()
    }

    /// Sign a wallet digest
    pub fn sign(&self, digest: &Digest) -> Signature {
        self.key_pair.sign_digest(digest)
    }

    /// Save key to file
    pub fn save(&self, path: &Path) -> Result<(), KeyStoreError> {
        let data = KeyData {
            private_key_hex: self.key_pair.private_key_hex(),
            address: self.address(),
            label: self.label.clone(),
            created_at: self.created_at,
        };

        let json = serde_json::to_string_pretty(&data)?;
        fs::write(path, json)?;
        Ok(())
    }

    /// Load key from file, checking the stored address
    pub fn load(path: &Path) -> Result<Self, KeyStoreError> {
        let json = fs::read_to_string(path)?;
        let data: KeyData = serde_json::from_str(&json)?;

        let key_pair = KeyPair::from_private_key_hex(&data.private_key_hex)?;
        if key_pair.address() != data.address {
            return Err(KeyStoreError::AddressMismatch {
                expected: data.address,
                found: key_pair.address(),
            });
        }

        Ok(Self {
            key_pair,
            label: data.label,
            created_at: data.created_at,
        })
    }
}

/// Directory of signer key files, one per address
pub struct KeyStore {
    keys_dir: PathBuf,
}

impl KeyStore {
    /// Create a new key store
    pub fn new(keys_dir: &Path) -> Result<Self, KeyStoreError> {
        fs::create_dir_all(keys_dir)?;
        Ok(Self {
            keys_dir: keys_dir.to_path_buf(),
        })
    }

    fn key_path(&self, address: &Address) -> PathBuf {
        self.keys_dir.join(format!("{}.json", address))
    }

    /// Create and save a new signer key
    pub fn create_key(&self, label: Option<&str>) -> Result<SignerKey, KeyStoreError> {
        let key = SignerKey::new(label);
        key.save(&self.key_path(&key.address()))?;
        Ok(key)
    }

    /// List stored signer addresses, sorted
    pub fn list_keys(&self) -> Result<Vec<Address>, KeyStoreError> {
        let mut addresses = Vec::new();

        for entry in fs::read_dir(&self.keys_dir)? {
            let path = entry?.path();

            if path.extension().map(|e| e == "json").unwrap_or(false) {
                match SignerKey::load(&path) {
                    Ok(key) => addresses.push(key.address()),
                    Err(e) => log::warn!("Skipping unreadable key file {:?}: {}", path, e),
                }
            }
        }

        addresses.sort();
        Ok(addresses)
    }

    /// Load a specific key by address
    pub fn load_key(&self, address: &Address) -> Result<SignerKey, KeyStoreError> {
        SignerKey::load(&self.key_path(address))
    }

    /// Delete a key
    pub fn delete_key(&self, address: &Address) -> Result<(), KeyStoreError> {
        fs::remove_file(self.key_path(address))?;
        Ok(())
    }
}
