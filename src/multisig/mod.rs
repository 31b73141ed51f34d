//! Multi-signature wallet engine
//!
//! A set of signers jointly authorizes actions (fund transfers or a
//! replacement of the signer set) by each signing the same canonical
//! digest offline. A submission carries the whole quorum at once: it is
//! validated and applied in one call, or rejected without side effects.
//! Per-signer nonces make every signature single-use across both kinds
//! of action.
//!
//! # Example
//!
//! ```
//! use quorum_wallet::crypto::KeyPair;
//! use quorum_wallet::multisig::{DomainConfig, MultisigWallet, TransferRequest};
//! use quorum_wallet::treasury::Treasury;
//!
//! let mut keys: Vec<KeyPair> = (0..3).map(|_| KeyPair::generate()).collect();
//! keys.sort_by_key(|k| k.address());
//! let signers = keys.iter().map(|k| k.address()).collect();
//!
//! // Create a 2-of-3 wallet and fund it
//! let mut wallet = MultisigWallet::new(DomainConfig::default(), signers, 2).unwrap();
//! let mut treasury = Treasury::new();
//! treasury.deposit(wallet.address(), 100);
//!
//! // Two signers sign the next transfer offline
//! let recipient = KeyPair::generate().address();
//! let request = TransferRequest::new(recipient, 40, Vec::new());
//! let digest = wallet.transfer_digest(&request);
//! let signatures = vec![keys[0].sign_digest(&digest), keys[1].sign_digest(&digest)];
//!
//! let id = wallet
//!     .submit_transfer(&mut treasury, request, &signatures, &[0, 0])
//!     .unwrap();
//! assert_eq!(id, 0);
//! assert_eq!(treasury.balance_of(&recipient), 40);
//! ```

pub mod domain;
pub mod events;
pub mod message;
pub mod nonce;
pub mod quorum;
pub mod registry;
pub mod shared;
pub mod wallet;

pub use domain::{DomainConfig, DomainContext, DEFAULT_CHAIN_ID};
pub use events::WalletEvent;
pub use message::{PendingAction, TransferRequest, MESSAGE_TAG};
pub use nonce::{ConsumedSignature, NonceLedger, SeenSignatures};
pub use quorum::{ActionKind, Approval, QuorumValidator};
pub use registry::{validate_signers, SignerRegistry};
pub use shared::SharedWallet;
pub use wallet::{MultisigError, MultisigWallet, SignerRejection, WalletOptions};
