//! Multi-signature wallet implementation
//!
//! Owns the signer registry, the nonce ledger and the id counters of one
//! wallet instance. Every submission either reaches quorum and is applied
//! in full, or is rejected with no state change at all.

use crate::crypto::{Address, Digest, RecoveryError, Signature};
use crate::multisig::domain::{DomainConfig, DomainContext};
use crate::multisig::events::WalletEvent;
use crate::multisig::message::{PendingAction, TransferRequest};
use crate::multisig::nonce::{NonceLedger, SeenSignatures};
use crate::multisig::quorum::{ActionKind, Approval, QuorumValidator};
use crate::multisig::registry::{validate_signers, SignerRegistry};
use crate::treasury::FundsTransfer;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Why a recovered or unrecoverable signer was refused
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SignerRejection {
    #[error("signature did not recover: {0}")]
    Unrecoverable(RecoveryError),
    #[error("{0} is not an authorized signer")]
    NotAuthorized(Address),
}

/// Errors related to multisig operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MultisigError {
    #[error("Invalid signer at position {index}: {reason}")]
    InvalidSigner {
        index: usize,
        reason: SignerRejection,
    },
    #[error("Duplicate signer in batch: {0}")]
    DuplicateSigner(Address),
    #[error("Signature already used in this batch by {0}")]
    SignatureAlreadyUsed(Address),
    #[error("Not enough signatures: have {have}, need {need}")]
    NotEnoughSignatures { have: usize, need: usize },
    #[error("Invalid threshold {threshold} for {signers} signers")]
    InvalidThreshold { threshold: usize, signers: usize },
    #[error("Not enough signers: signer set is empty")]
    NotEnoughSigners,
    #[error("Signer at position {0} is the zero address")]
    SignerZeroAddress(usize),
    #[error("Signer array not strictly increasing at position {0}")]
    SignerArrayNotOrdered(usize),
    #[error("Invalid nonce at position {index}: expected {expected}, got {claimed}")]
    InvalidNonce {
        index: usize,
        expected: u64,
        claimed: u64,
    },
    #[error("Signature at position {index} already consumed nonce {nonce} of {signer}")]
    SignatureReplayed {
        index: usize,
        signer: Address,
        nonce: u64,
    },
    #[error("Signature and nonce counts differ: {signatures} signatures, {nonces} nonces")]
    LengthMismatch { signatures: usize, nonces: usize },
    #[error("Empty transaction: destination is the zero address")]
    EmptyTransaction,
    #[error("Wallet is already executing a call on this thread")]
    Reentrant,
}

/// Behavioural switches fixed at creation
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct WalletOptions {
    /// Refuse byte-identical signatures already consumed by an accepted batch
    ///
    /// Markers are kept for the wallet's lifetime and persisted with it,
    /// one 65-byte entry per accepted signature.
    #[serde(default = "default_track_signatures")]
    pub track_signatures: bool,
    /// Number of events kept in the history
    #[serde(default = "default_max_events")]
    pub max_events: usize,
}

fn default_track_signatures() -> bool {
    true
}

fn default_max_events() -> usize {
    100
}

impl Default for WalletOptions {
    fn default() -> Self {
        Self {
            track_signatures: default_track_signatures(),
            max_events: default_max_events(),
        }
    }
}

/// A k-of-n multi-signature wallet
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MultisigWallet {
    domain: DomainContext,
    registry: SignerRegistry,
    nonces: NonceLedger,
    #[serde(default)]
    seen: SeenSignatures,
    next_transfer_id: u64,
    next_proposal_id: u64,
    #[serde(default)]
    events: Vec<WalletEvent>,
    #[serde(default)]
    options: WalletOptions,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

impl MultisigWallet {
    /// Create a new multisig wallet
    ///
    /// # Errors
    /// Returns error if the signer set or threshold is invalid
    pub fn new(
        config: DomainConfig,
        signers: Vec<Address>,
        threshold: usize,
    ) -> Result<Self, MultisigError> {
        Self::with_options(config, signers, threshold, WalletOptions::default())
    }

    /// Create a wallet with explicit options
    pub fn with_options(
        config: DomainConfig,
        signers: Vec<Address>,
        threshold: usize,
        options: WalletOptions,
    ) -> Result<Self, MultisigError> {
        let registry = SignerRegistry::new(signers, threshold)?;
        let domain = DomainContext::new(&config, registry.signers(), threshold);

        log::info!(
            "Multisig wallet {} created ({}, chain {})",
            domain.wallet,
            registry.description(),
            domain.chain_id
        );

        Ok(Self {
            domain,
            registry,
            nonces: NonceLedger::new(),
            seen: SeenSignatures::new(),
            next_transfer_id: 0,
            next_proposal_id: 0,
            events: Vec::new(),
            options,
            created_at: Utc::now(),
        })
    }

    /// Submit a transfer together with the signatures authorizing it
    ///
    /// On quorum the nonces are consumed and the id counter advances before
    /// `funds` is invoked. A failing external transfer does not undo that:
    /// it is reported through the event's `success` flag and the id is
    /// still returned.
    pub fn submit_transfer(
        &mut self,
        funds: &mut dyn FundsTransfer,
        request: TransferRequest,
        signatures: &[Signature],
        nonces: &[u64],
    ) -> Result<u64, MultisigError> {
        if request.destination.is_zero() {
            return Err(MultisigError::EmptyTransaction);
        }

        let id = self.next_transfer_id;
        let action = PendingAction::transfer(id, &request);
        let approval = self.verify(ActionKind::Transfer, &action, signatures, nonces)?;
        let signers = approval.signers();

        // All state changes land before the external call
        self.commit(approval);
        self.next_transfer_id += 1;

        let outcome = funds.transfer(
            &self.domain.wallet,
            &request.destination,
            request.amount,
            &request.payload,
        );

        let reason = match &outcome {
            Ok(()) => {
                log::info!(
                    "Transfer {} executed: {} to {}",
                    id,
                    request.amount,
                    request.destination
                );
                None
            }
            Err(failure) => {
                log::warn!("Transfer {} approved but not executed: {}", id, failure);
                Some(failure.to_string())
            }
        };

        self.emit(WalletEvent::TransferExecuted {
            id,
            destination: request.destination,
            amount: request.amount,
            success: outcome.is_ok(),
            reason,
            signers,
            timestamp: Utc::now(),
        });

        Ok(id)
    }

    /// Submit a replacement signer set together with the signatures authorizing it
    ///
    /// The new set is validated before any signature work; the batch is
    /// measured against the current set and threshold.
    pub fn submit_signer_update(
        &mut self,
        new_signers: Vec<Address>,
        new_threshold: usize,
        signatures: &[Signature],
        nonces: &[u64],
    ) -> Result<u64, MultisigError> {
        validate_signers(&new_signers, new_threshold)?;

        if signatures.is_empty() {
            return Err(MultisigError::NotEnoughSignatures {
                have: 0,
                need: self.registry.threshold(),
            });
        }

        let proposal_id = self.next_proposal_id;
        let action = PendingAction::signer_update(proposal_id, &new_signers, new_threshold);
        let approval = self.verify(ActionKind::SignerUpdate, &action, signatures, nonces)?;
        let approved_by = approval.signers();

        self.commit(approval);
        self.registry.replace(new_signers, new_threshold);
        self.next_proposal_id += 1;

        log::info!(
            "Signer update {} applied: now {}",
            proposal_id,
            self.registry.description()
        );

        self.emit(WalletEvent::SignersUpdated {
            proposal_id,
            signers: self.registry.signers().to_vec(),
            threshold: new_threshold,
            approved_by,
            timestamp: Utc::now(),
        });

        Ok(proposal_id)
    }

    fn verify(
        &self,
        kind: ActionKind,
        action: &PendingAction,
        signatures: &[Signature],
        nonces: &[u64],
    ) -> Result<Approval, MultisigError> {
        let digest = action.digest(&self.domain);
        let seen = self.options.track_signatures.then_some(&self.seen);

        QuorumValidator::new(&self.registry, &self.nonces, seen)
            .verify(kind, &digest, signatures, nonces)
            .map_err(|e| {
                log::warn!("{:?} {} rejected: {}", kind, action.id(), e);
                e
            })
    }

    fn commit(&mut self, approval: Approval) {
        let seen = if self.options.track_signatures {
            Some(&mut self.seen)
        } else {
            None
        };
        approval.commit(&mut self.nonces, seen);
    }

    fn emit(&mut self, event: WalletEvent) {
        self.events.push(event);
        if self.events.len() > self.options.max_events {
            let excess = self.events.len() - self.options.max_events;
            self.events.drain(..excess);
        }
    }

    /// Digest signers sign to authorize `request` as the next transfer
    pub fn transfer_digest(&self, request: &TransferRequest) -> Digest {
        PendingAction::transfer(self.next_transfer_id, request).digest(&self.domain)
    }

    /// Digest signers sign to authorize the next signer update
    pub fn signer_update_digest(&self, signers: &[Address], threshold: usize) -> Digest {
        PendingAction::signer_update(self.next_proposal_id, signers, threshold)
            .digest(&self.domain)
    }

    /// Check if an address is a current signer
    pub fn is_signer(&self, address: &Address) -> bool {
        self.registry.is_signer(address)
    }

    /// Nonce the next signature from `address` must claim
    pub fn current_nonce(&self, address: &Address) -> u64 {
        self.nonces.current(address)
    }

    pub fn domain_context(&self) -> &DomainContext {
        &self.domain
    }

    /// The wallet's own identity
    pub fn address(&self) -> &Address {
        &self.domain.wallet
    }

    pub fn signers(&self) -> &[Address] {
        self.registry.signers()
    }

    pub fn threshold(&self) -> usize {
        self.registry.threshold()
    }

    /// Get human-readable description like "2-of-3"
    pub fn description(&self) -> String {
        self.registry.description()
    }

    pub fn next_transfer_id(&self) -> u64 {
        self.next_transfer_id
    }

    pub fn next_proposal_id(&self) -> u64 {
        self.next_proposal_id
    }

    /// Recent events, oldest first
    pub fn events(&self) -> &[WalletEvent] {
        &self.events
    }

    pub fn options(&self) -> &WalletOptions {
        &self.options
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::KeyPair;
    use crate::treasury::{Treasury, TransferFailure};

    /// Keys sorted by address so that keys[0] < keys[1] < ...
    fn sorted_keys(n: u8) -> Vec<KeyPair> {
        let mut keys: Vec<KeyPair> = (1..=n)
            .map(|i| KeyPair::from_secret_bytes(&[i; 32]).unwrap())
            .collect();
        keys.sort_by_key(|k| k.address());
        keys
    }

    fn addresses(keys: &[&KeyPair]) -> Vec<Address> {
        keys.iter().map(|k| k.address()).collect()
    }

    /// Signer set [A, B, C], threshold 2, and a funded treasury
    fn setup() -> (MultisigWallet, Vec<KeyPair>, Treasury) {
        let keys = sorted_keys(3);
        let wallet = MultisigWallet::new(
            DomainConfig::new(1, 7),
            keys.iter().map(|k| k.address()).collect(),
            2,
        )
        .unwrap();
        let mut treasury = Treasury::new();
        treasury.deposit(wallet.address(), 1_000);
        (wallet, keys, treasury)
    }

    fn destination() -> Address {
        KeyPair::from_secret_bytes(&[42u8; 32]).unwrap().address()
    }

    fn sign_transfer(
        wallet: &MultisigWallet,
        request: &TransferRequest,
        keys: &[&KeyPair],
    ) -> Vec<Signature> {
        let digest = wallet.transfer_digest(request);
        keys.iter().map(|k| k.sign_digest(&digest)).collect()
    }

    fn sign_update(
        wallet: &MultisigWallet,
        signers: &[Address],
        threshold: usize,
        keys: &[&KeyPair],
    ) -> Vec<Signature> {
        let digest = wallet.signer_update_digest(signers, threshold);
        keys.iter().map(|k| k.sign_digest(&digest)).collect()
    }

    #[test]
    fn test_wallet_creation() {
        let (wallet, keys, _) = setup();

        assert_eq!(wallet.threshold(), 2);
        assert_eq!(wallet.signers().len(), 3);
        assert_eq!(wallet.description(), "2-of-3");
        assert!(wallet.is_signer(&keys[0].address()));
        assert!(!wallet.is_signer(&destination()));
        assert_eq!(wallet.next_transfer_id(), 0);
        assert_eq!(wallet.domain_context().instance_nonce, 7);
    }

    #[test]
    fn test_invalid_creation() {
        let keys = sorted_keys(2);
        let unsorted = vec![keys[1].address(), keys[0].address()];

        assert_eq!(
            MultisigWallet::new(DomainConfig::default(), unsorted, 1).unwrap_err(),
            MultisigError::SignerArrayNotOrdered(1)
        );
        assert_eq!(
            MultisigWallet::new(DomainConfig::default(), vec![], 1).unwrap_err(),
            MultisigError::NotEnoughSigners
        );
    }

    #[test]
    fn test_transfer_with_quorum() {
        let (mut wallet, keys, mut treasury) = setup();
        let request = TransferRequest::new(destination(), 250, b"invoice 17".to_vec());
        let sigs = sign_transfer(&wallet, &request, &[&keys[0], &keys[1]]);

        let id = wallet
            .submit_transfer(&mut treasury, request, &sigs, &[0, 0])
            .unwrap();

        assert_eq!(id, 0);
        assert_eq!(wallet.current_nonce(&keys[0].address()), 1);
        assert_eq!(wallet.current_nonce(&keys[1].address()), 1);
        assert_eq!(wallet.current_nonce(&keys[2].address()), 0);
        assert_eq!(wallet.next_transfer_id(), 1);
        assert_eq!(treasury.balance_of(&destination()), 250);
        assert_eq!(treasury.balance_of(wallet.address()), 750);

        let event = wallet.events().last().unwrap();
        assert_eq!(event.action_id(), 0);
        assert!(event.success());
    }

    #[test]
    fn test_all_signers_may_contribute() {
        let (mut wallet, keys, mut treasury) = setup();
        let request = TransferRequest::new(destination(), 1, vec![]);
        let sigs = sign_transfer(&wallet, &request, &[&keys[2], &keys[0], &keys[1]]);

        wallet
            .submit_transfer(&mut treasury, request, &sigs, &[0, 0, 0])
            .unwrap();

        for key in &keys {
            assert_eq!(wallet.current_nonce(&key.address()), 1);
        }
    }

    #[test]
    fn test_replayed_batch_rejected() {
        let (mut wallet, keys, mut treasury) = setup();
        let request = TransferRequest::new(destination(), 100, vec![]);
        let sigs = sign_transfer(&wallet, &request, &[&keys[0], &keys[1]]);

        wallet
            .submit_transfer(&mut treasury, request.clone(), &sigs, &[0, 0])
            .unwrap();
        let result = wallet.submit_transfer(&mut treasury, request, &sigs, &[0, 0]);

        assert!(matches!(result, Err(MultisigError::InvalidNonce { .. })));
        assert_eq!(wallet.current_nonce(&keys[0].address()), 1);
        assert_eq!(wallet.next_transfer_id(), 1);
        assert_eq!(treasury.balance_of(&destination()), 100);
    }

    #[test]
    fn test_replay_claiming_current_nonces() {
        let (mut wallet, keys, mut treasury) = setup();
        let request = TransferRequest::new(destination(), 100, vec![]);
        let sigs = sign_transfer(&wallet, &request, &[&keys[0], &keys[1]]);

        wallet
            .submit_transfer(&mut treasury, request.clone(), &sigs, &[0, 0])
            .unwrap();
        let result = wallet.submit_transfer(&mut treasury, request, &sigs, &[1, 1]);

        assert_eq!(
            result,
            Err(MultisigError::SignatureReplayed {
                index: 0,
                signer: keys[0].address(),
                nonce: 0
            })
        );
        assert_eq!(wallet.current_nonce(&keys[0].address()), 1);
        assert_eq!(wallet.next_transfer_id(), 1);
        assert_eq!(treasury.balance_of(&destination()), 100);
    }

    #[test]
    fn test_replay_without_markers_still_rejected() {
        let keys = sorted_keys(3);
        let options = WalletOptions {
            track_signatures: false,
            ..WalletOptions::default()
        };
        let mut wallet = MultisigWallet::with_options(
            DomainConfig::new(1, 7),
            keys.iter().map(|k| k.address()).collect(),
            2,
            options,
        )
        .unwrap();
        let mut treasury = Treasury::new();
        treasury.deposit(wallet.address(), 1_000);

        let request = TransferRequest::new(destination(), 100, vec![]);
        let sigs = sign_transfer(&wallet, &request, &[&keys[0], &keys[1]]);
        wallet
            .submit_transfer(&mut treasury, request.clone(), &sigs, &[0, 0])
            .unwrap();

        // The old signatures cover transfer 0, not transfer 1, so they no
        // longer recover to a signer with a matching nonce
        let result = wallet.submit_transfer(&mut treasury, request, &sigs, &[1, 1]);
        assert!(matches!(result, Err(MultisigError::InvalidNonce { .. })));
        assert_eq!(treasury.balance_of(&destination()), 100);
    }

    #[test]
    fn test_outsider_rejected_without_mutation() {
        let (mut wallet, keys, mut treasury) = setup();
        let outsider = KeyPair::from_secret_bytes(&[77u8; 32]).unwrap();
        let request = TransferRequest::new(destination(), 100, vec![]);
        let sigs = sign_transfer(&wallet, &request, &[&keys[0], &outsider]);

        let result = wallet.submit_transfer(&mut treasury, request, &sigs, &[0, 0]);

        assert!(matches!(
            result,
            Err(MultisigError::InvalidSigner {
                index: 1,
                reason: SignerRejection::NotAuthorized(_)
            })
        ));
        assert_eq!(wallet.current_nonce(&keys[0].address()), 0);
        assert_eq!(wallet.next_transfer_id(), 0);
        assert!(wallet.events().is_empty());
        assert_eq!(treasury.balance_of(&destination()), 0);
    }

    #[test]
    fn test_stale_nonce_rejects_whole_batch() {
        let (mut wallet, keys, mut treasury) = setup();
        let request = TransferRequest::new(destination(), 100, vec![]);
        let sigs = sign_transfer(&wallet, &request, &[&keys[0], &keys[1], &keys[2]]);

        let result = wallet.submit_transfer(&mut treasury, request, &sigs, &[0, 0, 4]);

        assert_eq!(
            result,
            Err(MultisigError::InvalidNonce {
                index: 2,
                expected: 0,
                claimed: 4
            })
        );
        for key in &keys {
            assert_eq!(wallet.current_nonce(&key.address()), 0);
        }
    }

    #[test]
    fn test_duplicate_in_transfer_batch() {
        let (mut wallet, keys, mut treasury) = setup();
        let request = TransferRequest::new(destination(), 100, vec![]);
        let sigs = sign_transfer(&wallet, &request, &[&keys[1], &keys[1]]);

        let result = wallet.submit_transfer(&mut treasury, request, &sigs, &[0, 0]);

        assert_eq!(
            result,
            Err(MultisigError::SignatureAlreadyUsed(keys[1].address()))
        );
        assert_eq!(wallet.current_nonce(&keys[1].address()), 0);
    }

    #[test]
    fn test_zero_destination() {
        let (mut wallet, keys, mut treasury) = setup();
        let request = TransferRequest::new(Address::ZERO, 100, vec![]);
        let sigs = sign_transfer(&wallet, &request, &[&keys[0], &keys[1]]);

        assert_eq!(
            wallet.submit_transfer(&mut treasury, request, &sigs, &[0, 0]),
            Err(MultisigError::EmptyTransaction)
        );
    }

    #[test]
    fn test_too_few_signatures() {
        let (mut wallet, keys, mut treasury) = setup();
        let request = TransferRequest::new(destination(), 100, vec![]);
        let sigs = sign_transfer(&wallet, &request, &[&keys[0]]);

        assert_eq!(
            wallet.submit_transfer(&mut treasury, request, &sigs, &[0]),
            Err(MultisigError::NotEnoughSignatures { have: 1, need: 2 })
        );
    }

    /// Signatures made for `twin` recover to unrelated addresses here
    fn assert_foreign_signatures_rejected(twin_config: DomainConfig) {
        let (mut wallet, keys, mut treasury) = setup();
        let twin = MultisigWallet::new(
            twin_config,
            keys.iter().map(|k| k.address()).collect(),
            2,
        )
        .unwrap();
        let request = TransferRequest::new(destination(), 100, vec![]);
        let sigs = sign_transfer(&twin, &request, &[&keys[0], &keys[1]]);

        let result = wallet.submit_transfer(&mut treasury, request, &sigs, &[0, 0]);
        match result {
            Err(MultisigError::InvalidSigner {
                index: 0,
                reason: SignerRejection::NotAuthorized(recovered),
            }) => assert!(!keys.iter().any(|k| k.address() == recovered)),
            other => panic!("unexpected result {:?}", other),
        }
        assert_eq!(wallet.current_nonce(&keys[0].address()), 0);
        assert_eq!(wallet.next_transfer_id(), 0);
    }

    #[test]
    fn test_signature_for_other_deployment_rejected() {
        assert_foreign_signatures_rejected(DomainConfig::new(1, 8));
    }

    #[test]
    fn test_signature_for_other_chain_rejected() {
        // Same signers and instance nonce; only the chain differs
        assert_foreign_signatures_rejected(DomainConfig::new(2, 7));
    }

    #[test]
    fn test_failed_external_transfer_keeps_approval() {
        let (mut wallet, keys, mut treasury) = setup();
        treasury.reject_incoming(&destination());
        let request = TransferRequest::new(destination(), 100, vec![]);
        let sigs = sign_transfer(&wallet, &request, &[&keys[0], &keys[1]]);

        let id = wallet
            .submit_transfer(&mut treasury, request, &sigs, &[0, 0])
            .unwrap();

        // Nonces stay consumed; the failure is only reported
        assert_eq!(id, 0);
        assert_eq!(wallet.current_nonce(&keys[0].address()), 1);
        assert_eq!(wallet.next_transfer_id(), 1);
        match wallet.events().last().unwrap() {
            WalletEvent::TransferExecuted { success, reason, .. } => {
                assert!(!success);
                assert_eq!(
                    reason.as_deref(),
                    Some(TransferFailure::DestinationRejected(destination()).to_string().as_str())
                );
            }
            other => panic!("unexpected event {:?}", other),
        }
        assert_eq!(treasury.balance_of(wallet.address()), 1_000);
    }

    #[test]
    fn test_signer_update() {
        let (mut wallet, keys, mut treasury) = setup();
        let d = sorted_keys(4)
            .into_iter()
            .find(|k| !keys.iter().any(|o| o.address() == k.address()))
            .unwrap();

        let mut new_set = vec![keys[1].address(), keys[2].address(), d.address()];
        new_set.sort();
        let sigs = sign_update(&wallet, &new_set, 2, &[&keys[0], &keys[1]]);

        let proposal_id = wallet
            .submit_signer_update(new_set.clone(), 2, &sigs, &[0, 0])
            .unwrap();

        assert_eq!(proposal_id, 0);
        assert!(!wallet.is_signer(&keys[0].address()));
        assert!(wallet.is_signer(&d.address()));
        assert_eq!(wallet.threshold(), 2);
        assert_eq!(wallet.signers(), new_set.as_slice());
        assert_eq!(wallet.current_nonce(&keys[0].address()), 1);
        assert_eq!(wallet.next_proposal_id(), 1);
        // Transfer ids are an independent counter
        assert_eq!(wallet.next_transfer_id(), 0);

        // The removed signer can no longer authorize transfers
        let request = TransferRequest::new(destination(), 10, vec![]);
        let sigs = sign_transfer(&wallet, &request, &[&keys[0], &keys[1]]);
        let result = wallet.submit_transfer(&mut treasury, request, &sigs, &[1, 1]);
        assert!(matches!(
            result,
            Err(MultisigError::InvalidSigner {
                index: 0,
                reason: SignerRejection::NotAuthorized(_)
            })
        ));
    }

    #[test]
    fn test_nonces_shared_across_action_kinds() {
        let (mut wallet, keys, mut treasury) = setup();
        let request = TransferRequest::new(destination(), 10, vec![]);
        let sigs = sign_transfer(&wallet, &request, &[&keys[0], &keys[1]]);
        wallet
            .submit_transfer(&mut treasury, request, &sigs, &[0, 0])
            .unwrap();

        let set = addresses(&[&keys[0], &keys[1], &keys[2]]);
        let sigs = sign_update(&wallet, &set, 3, &[&keys[0], &keys[2]]);

        // keys[0] already spent nonce 0 on the transfer
        assert!(matches!(
            wallet.submit_signer_update(set.clone(), 3, &sigs, &[0, 0]),
            Err(MultisigError::InvalidNonce { index: 0, expected: 1, claimed: 0 })
        ));
        wallet.submit_signer_update(set, 3, &sigs, &[1, 0]).unwrap();
        assert_eq!(wallet.threshold(), 3);
        assert_eq!(wallet.current_nonce(&keys[0].address()), 2);
    }

    #[test]
    fn test_unsorted_update_rejected_before_signatures() {
        let (mut wallet, keys, _) = setup();
        let unsorted = addresses(&[&keys[0], &keys[2], &keys[1]]);
        let sigs = sign_update(&wallet, &unsorted, 2, &[&keys[0], &keys[1]]);

        assert_eq!(
            wallet.submit_signer_update(unsorted, 2, &sigs, &[0, 0]),
            Err(MultisigError::SignerArrayNotOrdered(2))
        );
        assert_eq!(wallet.next_proposal_id(), 0);
    }

    #[test]
    fn test_update_validation_errors() {
        let (mut wallet, keys, _) = setup();
        let set = addresses(&[&keys[0], &keys[1]]);

        assert!(matches!(
            wallet.submit_signer_update(set.clone(), 0, &[], &[]),
            Err(MultisigError::InvalidThreshold { threshold: 0, .. })
        ));
        assert!(matches!(
            wallet.submit_signer_update(set, 3, &[], &[]),
            Err(MultisigError::InvalidThreshold { threshold: 3, .. })
        ));
        assert_eq!(
            wallet.submit_signer_update(vec![], 1, &[], &[]),
            Err(MultisigError::NotEnoughSigners)
        );
        assert_eq!(
            wallet.submit_signer_update(vec![Address::ZERO, keys[0].address()], 1, &[], &[]),
            Err(MultisigError::SignerZeroAddress(0))
        );
    }

    #[test]
    fn test_update_without_signatures() {
        let (mut wallet, keys, _) = setup();
        let set = addresses(&[&keys[0], &keys[1]]);

        assert_eq!(
            wallet.submit_signer_update(set, 1, &[], &[]),
            Err(MultisigError::NotEnoughSignatures { have: 0, need: 2 })
        );
    }

    #[test]
    fn test_duplicate_in_update_batch() {
        let (mut wallet, keys, _) = setup();
        let set = addresses(&[&keys[0], &keys[1]]);
        let sigs = sign_update(&wallet, &set, 1, &[&keys[0], &keys[0]]);

        assert_eq!(
            wallet.submit_signer_update(set, 1, &sigs, &[0, 0]),
            Err(MultisigError::DuplicateSigner(keys[0].address()))
        );
        assert_eq!(wallet.signers().len(), 3);
    }

    #[test]
    fn test_event_history_bounded() {
        let keys = sorted_keys(1);
        let options = WalletOptions {
            max_events: 2,
            ..WalletOptions::default()
        };
        let mut wallet = MultisigWallet::with_options(
            DomainConfig::default(),
            vec![keys[0].address()],
            1,
            options,
        )
        .unwrap();
        let mut treasury = Treasury::new();
        treasury.deposit(wallet.address(), 10);

        for nonce in 0..3u64 {
            let request = TransferRequest::new(destination(), 1, vec![]);
            let sigs = sign_transfer(&wallet, &request, &[&keys[0]]);
            wallet
                .submit_transfer(&mut treasury, request, &sigs, &[nonce])
                .unwrap();
        }

        assert_eq!(wallet.events().len(), 2);
        assert_eq!(wallet.events()[0].action_id(), 1);
    }

    #[test]
    fn test_wallet_serde_roundtrip() {
        let (mut wallet, keys, mut treasury) = setup();
        let request = TransferRequest::new(destination(), 5, vec![1, 2, 3]);
        let sigs = sign_transfer(&wallet, &request, &[&keys[0], &keys[1]]);
        wallet
            .submit_transfer(&mut treasury, request, &sigs, &[0, 0])
            .unwrap();

        let json = serde_json::to_string(&wallet).unwrap();
        let restored: MultisigWallet = serde_json::from_str(&json).unwrap();

        assert_eq!(restored.address(), wallet.address());
        assert_eq!(restored.current_nonce(&keys[0].address()), 1);
        assert_eq!(restored.next_transfer_id(), 1);
        assert_eq!(restored.events(), wallet.events());
    }
}
