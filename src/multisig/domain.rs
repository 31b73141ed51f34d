//! Domain context binding signatures to one wallet instance on one chain

use crate::crypto::{hash160, sha256, Address, Digest};
use serde::{Deserialize, Serialize};

/// Default chain ID (for replay protection)
pub const DEFAULT_CHAIN_ID: u64 = 1;

/// Tag mixed into the digest salt
const SALT_TAG: &[u8] = b"QUORUM-WALLET/salt";

/// Parameters chosen when a wallet is created
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct DomainConfig {
    /// Identifier of the chain this wallet lives on
    pub chain_id: u64,
    /// Per-deployment nonce, makes signed messages unique to this instance
    pub instance_nonce: u64,
}

impl DomainConfig {
    pub fn new(chain_id: u64, instance_nonce: u64) -> Self {
        Self {
            chain_id,
            instance_nonce,
        }
    }

    /// Config with a freshly drawn instance nonce
    pub fn random(chain_id: u64) -> Self {
        Self::new(chain_id, rand::random())
    }
}

impl Default for DomainConfig {
    fn default() -> Self {
        Self::new(DEFAULT_CHAIN_ID, 0)
    }
}

/// Immutable context every signed message is bound to
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct DomainContext {
    pub chain_id: u64,
    pub instance_nonce: u64,
    /// Identity of this wallet instance
    pub wallet: Address,
    /// SHA256(tag || chain_id || instance_nonce || wallet)
    pub digest_salt: Digest,
}

impl DomainContext {
    /// Build the context for a wallet created with the given genesis signer set
    ///
    /// The wallet identity is HASH160(threshold || signers || chain_id || instance_nonce),
    /// so two deployments with the same signers still differ by instance nonce.
    pub fn new(config: &DomainConfig, genesis_signers: &[Address], threshold: usize) -> Self {
        let mut script_data = Vec::with_capacity(8 + genesis_signers.len() * 20 + 16);
        script_data.extend_from_slice(&(threshold as u64).to_be_bytes());
        for signer in genesis_signers {
            script_data.extend_from_slice(signer.as_bytes());
        }
        script_data.extend_from_slice(&config.chain_id.to_be_bytes());
        script_data.extend_from_slice(&config.instance_nonce.to_be_bytes());
        let wallet = Address(hash160(&script_data));

        Self::with_wallet(config, wallet)
    }

    /// Build the context for a known wallet identity
    pub fn with_wallet(config: &DomainConfig, wallet: Address) -> Self {
        let mut salt_data = Vec::with_capacity(SALT_TAG.len() + 16 + 20);
        salt_data.extend_from_slice(SALT_TAG);
        salt_data.extend_from_slice(&config.chain_id.to_be_bytes());
        salt_data.extend_from_slice(&config.instance_nonce.to_be_bytes());
        salt_data.extend_from_slice(wallet.as_bytes());

        Self {
            chain_id: config.chain_id,
            instance_nonce: config.instance_nonce,
            wallet,
            digest_salt: Digest(sha256(&salt_data)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signers() -> Vec<Address> {
        vec![Address([1; 20]), Address([2; 20]), Address([3; 20])]
    }

    #[test]
    fn test_context_is_deterministic() {
        let config = DomainConfig::new(1, 42);
        assert_eq!(
            DomainContext::new(&config, &signers(), 2),
            DomainContext::new(&config, &signers(), 2)
        );
    }

    #[test]
    fn test_instance_nonce_changes_identity_and_salt() {
        let a = DomainContext::new(&DomainConfig::new(1, 1), &signers(), 2);
        let b = DomainContext::new(&DomainConfig::new(1, 2), &signers(), 2);
        assert_ne!(a.wallet, b.wallet);
        assert_ne!(a.digest_salt, b.digest_salt);
    }

    #[test]
    fn test_chain_id_changes_salt() {
        let wallet = Address([9; 20]);
        let a = DomainContext::with_wallet(&DomainConfig::new(1, 7), wallet);
        let b = DomainContext::with_wallet(&DomainConfig::new(5, 7), wallet);
        assert_ne!(a.digest_salt, b.digest_salt);
    }

    #[test]
    fn test_default_chain_id() {
        assert_eq!(DomainConfig::default().chain_id, DEFAULT_CHAIN_ID);
    }
}
