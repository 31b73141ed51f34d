//! Quorum validation of signature batches
//!
//! A batch is a list of `(signature, claimed nonce)` pairs over one digest.
//! Verification is read-only: it produces an [`Approval`] describing what
//! the batch consumes, and nothing changes until the approval is committed.
//! A rejected batch therefore leaves the registry, the nonce ledger and the
//! seen-signature markers exactly as they were.
//!
//! Per signature, checks run in this order and the first failure wins:
//! seen marker, recovery, nonce freshness, registry membership, in-batch
//! duplicate.

use crate::crypto::{recover, Address, Digest, Signature};
use crate::multisig::nonce::{NonceLedger, SeenSignatures};
use crate::multisig::registry::SignerRegistry;
use crate::multisig::wallet::{MultisigError, SignerRejection};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Which kind of action a batch authorizes
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActionKind {
    Transfer,
    SignerUpdate,
}

impl ActionKind {
    /// The same signer twice in one batch, named per action kind
    fn duplicate(self, signer: Address) -> MultisigError {
        match self {
            ActionKind::Transfer => MultisigError::SignatureAlreadyUsed(signer),
            ActionKind::SignerUpdate => MultisigError::DuplicateSigner(signer),
        }
    }
}

/// A verified batch, ready to be committed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Approval {
    /// Contributing signers in batch order with the signature and nonce each used
    contributions: Vec<(Address, Signature, u64)>,
}

impl Approval {
    /// Signers that contributed, in batch order
    pub fn signers(&self) -> Vec<Address> {
        self.contributions.iter().map(|(signer, _, _)| *signer).collect()
    }

    pub fn signature_count(&self) -> usize {
        self.contributions.len()
    }

    /// Consume one nonce per contributing signer and mark the signatures used
    pub(crate) fn commit(self, ledger: &mut NonceLedger, seen: Option<&mut SeenSignatures>) {
        for (signer, _, _) in &self.contributions {
            ledger.advance(signer);
        }
        if let Some(seen) = seen {
            for (signer, signature, nonce) in self.contributions {
                seen.record(signature, signer, nonce);
            }
        }
    }
}

/// Read-only view of the state a batch is checked against
pub struct QuorumValidator<'a> {
    registry: &'a SignerRegistry,
    ledger: &'a NonceLedger,
    seen: Option<&'a SeenSignatures>,
}

impl<'a> QuorumValidator<'a> {
    pub fn new(
        registry: &'a SignerRegistry,
        ledger: &'a NonceLedger,
        seen: Option<&'a SeenSignatures>,
    ) -> Self {
        Self {
            registry,
            ledger,
            seen,
        }
    }

    /// Verify a batch against `digest` and the current threshold
    pub fn verify(
        &self,
        kind: ActionKind,
        digest: &Digest,
        signatures: &[Signature],
        nonces: &[u64],
    ) -> Result<Approval, MultisigError> {
        let threshold = self.registry.threshold();

        // Structural checks before any recovery work
        if signatures.len() < threshold {
            return Err(MultisigError::NotEnoughSignatures {
                have: signatures.len(),
                need: threshold,
            });
        }
        if signatures.len() != nonces.len() {
            return Err(MultisigError::LengthMismatch {
                signatures: signatures.len(),
                nonces: nonces.len(),
            });
        }

        let mut signed: HashSet<Address> = HashSet::with_capacity(signatures.len());
        let mut contributions = Vec::with_capacity(signatures.len());

        for (index, (signature, &claimed)) in signatures.iter().zip(nonces).enumerate() {
            if let Some(consumed) = self.seen.and_then(|seen| seen.consumed(signature)) {
                let expected = self.ledger.current(&consumed.signer);
                if claimed != expected {
                    return Err(MultisigError::InvalidNonce {
                        index,
                        expected,
                        claimed,
                    });
                }
                // Claims a fresh nonce, but the signature itself is spent
                return Err(MultisigError::SignatureReplayed {
                    index,
                    signer: consumed.signer,
                    nonce: consumed.nonce,
                });
            }

            let signer = recover(digest, signature.as_bytes()).map_err(|e| {
                MultisigError::InvalidSigner {
                    index,
                    reason: SignerRejection::Unrecoverable(e),
                }
            })?;

            self.ledger.check(index, &signer, claimed)?;

            if !self.registry.is_signer(&signer) {
                return Err(MultisigError::InvalidSigner {
                    index,
                    reason: SignerRejection::NotAuthorized(signer),
                });
            }

            if !signed.insert(signer) {
                return Err(kind.duplicate(signer));
            }

            log::debug!("signature {} accepted from {}", index, signer);
            contributions.push((signer, *signature, claimed));
        }

        if contributions.len() < threshold {
            return Err(MultisigError::NotEnoughSignatures {
                have: contributions.len(),
                need: threshold,
            });
        }

        Ok(Approval { contributions })
    }
}
