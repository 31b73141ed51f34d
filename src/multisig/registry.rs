//! Signer registry: the current ordered signer set and its threshold

use crate::crypto::Address;
use crate::multisig::wallet::MultisigError;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Check a candidate signer set and threshold
///
/// The set must be non-empty, strictly increasing by address order and
/// free of the zero address; the threshold must lie in `1..=len`.
/// Strict ordering covers both sortedness and uniqueness.
pub fn validate_signers(signers: &[Address], threshold: usize) -> Result<(), MultisigError> {
    if signers.is_empty() {
        return Err(MultisigError::NotEnoughSigners);
    }

    if threshold == 0 || threshold > signers.len() {
        return Err(MultisigError::InvalidThreshold {
            threshold,
            signers: signers.len(),
        });
    }

    for (index, signer) in signers.iter().enumerate() {
        if signer.is_zero() {
            return Err(MultisigError::SignerZeroAddress(index));
        }
        if index > 0 && signers[index - 1] >= *signer {
            return Err(MultisigError::SignerArrayNotOrdered(index));
        }
    }

    Ok(())
}

/// The authorized signers and the number of them required to act
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct SignerRegistry {
    /// Sorted ascending, no duplicates, no zero address
    signers: Vec<Address>,
    threshold: usize,
}

impl SignerRegistry {
    /// Create a registry after validating the set
    pub fn new(signers: Vec<Address>, threshold: usize) -> Result<Self, MultisigError> {
        validate_signers(&signers, threshold)?;
        Ok(Self { signers, threshold })
    }

    /// Membership test
    ///
    /// Scans the sorted set and stops as soon as an entry exceeds `address`.
    pub fn is_signer(&self, address: &Address) -> bool {
        for signer in &self.signers {
            match signer.cmp(address) {
                Ordering::Less => continue,
                Ordering::Equal => return true,
                Ordering::Greater => return false,
            }
        }
        false
    }

    /// Swap in a new set wholesale
    ///
    /// Callers validate first; the set is never edited in place.
    pub(crate) fn replace(&mut self, signers: Vec<Address>, threshold: usize) {
        debug_assert!(validate_signers(&signers, threshold).is_ok());
        self.signers = signers;
        self.threshold = threshold;
    }

    pub fn signers(&self) -> &[Address] {
        &self.signers
    }

    pub fn threshold(&self) -> usize {
        self.threshold
    }

    pub fn signer_count(&self) -> usize {
        self.signers.len()
    }

    /// Get description like "2-of-3"
    pub fn description(&self) -> String {
        format!("{}-of-{}", self.threshold, self.signers.len())
    }
}
