//! Replay protection: per-address nonces and consumed-signature markers

use crate::crypto::{Address, Signature};
use crate::multisig::wallet::MultisigError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One monotonically increasing counter per address
///
/// Unseen addresses read as 0. Counters only ever go up.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct NonceLedger {
    nonces: BTreeMap<Address, u64>,
}

impl NonceLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current counter for an address
    pub fn current(&self, address: &Address) -> u64 {
        self.nonces.get(address).copied().unwrap_or(0)
    }

    /// Fail with `InvalidNonce` unless `claimed` is the current counter
    pub fn check(&self, index: usize, address: &Address, claimed: u64) -> Result<(), MultisigError> {
        let expected = self.current(address);
        if claimed != expected {
            return Err(MultisigError::InvalidNonce {
                index,
                expected,
                claimed,
            });
        }
        Ok(())
    }

    /// Check then advance a single address
    pub fn consume(&mut self, address: &Address, claimed: u64) -> Result<(), MultisigError> {
        self.check(0, address, claimed)?;
        self.advance(address);
        Ok(())
    }

    /// Increment the counter by one
    pub(crate) fn advance(&mut self, address: &Address) {
        *self.nonces.entry(*address).or_insert(0) += 1;
    }

    /// Number of addresses that have ever signed
    pub fn len(&self) -> usize {
        self.nonces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nonces.is_empty()
    }
}

/// Who consumed a signature, and which of their nonces it used
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ConsumedSignature {
    pub signer: Address,
    pub nonce: u64,
}

/// Signatures consumed by accepted batches, keyed by their exact bytes
///
/// Entries are never evicted: the set grows by one per accepted signature.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct SeenSignatures {
    seen: BTreeMap<Signature, ConsumedSignature>,
}

impl SeenSignatures {
    pub fn new() -> Self {
        Self::default()
    }

    /// The signer and nonce this signature already consumed
    pub fn consumed(&self, signature: &Signature) -> Option<&ConsumedSignature> {
        self.seen.get(signature)
    }

    pub(crate) fn record(&mut self, signature: Signature, signer: Address, nonce: u64) {
        self.seen.insert(signature, ConsumedSignature { signer, nonce });
    }

    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unseen_address_reads_zero() {
        let ledger = NonceLedger::new();
        assert_eq!(ledger.current(&Address([1; 20])), 0);
        assert!(ledger.is_empty());
    }

    #[test]
    fn test_consume_advances_by_one() {
        let mut ledger = NonceLedger::new();
        let a = Address([1; 20]);

        ledger.consume(&a, 0).unwrap();
        ledger.consume(&a, 1).unwrap();
        assert_eq!(ledger.current(&a), 2);
        assert_eq!(ledger.current(&Address([2; 20])), 0);
    }

    #[test]
    fn test_stale_and_future_nonces_rejected() {
        let mut ledger = NonceLedger::new();
        let a = Address([1; 20]);
        ledger.consume(&a, 0).unwrap();

        assert_eq!(
            ledger.consume(&a, 0),
            Err(MultisigError::InvalidNonce {
                index: 0,
                expected: 1,
                claimed: 0
            })
        );
        assert!(ledger.consume(&a, 5).is_err());
        // Failed consumption leaves the counter alone
        assert_eq!(ledger.current(&a), 1);
    }

    #[test]
    fn test_seen_signatures() {
        let mut seen = SeenSignatures::new();
        let sig = Signature([3; 65]);
        assert!(seen.consumed(&sig).is_none());

        seen.record(sig, Address([1; 20]), 4);
        assert_eq!(
            seen.consumed(&sig),
            Some(&ConsumedSignature {
                signer: Address([1; 20]),
                nonce: 4
            })
        );
        assert_eq!(seen.len(), 1);
    }

    #[test]
    fn test_ledger_serde() {
        let mut ledger = NonceLedger::new();
        ledger.consume(&Address([1; 20]), 0).unwrap();

        let json = serde_json::to_string(&ledger).unwrap();
        let back: NonceLedger = serde_json::from_str(&json).unwrap();
        assert_eq!(back, ledger);
    }
}
