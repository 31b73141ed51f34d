//! Pending actions and their canonical signing encoding
//!
//! Every action is serialized into a fixed byte layout (big-endian
//! integers, length-prefixed variable fields) and hashed with SHA-256.
//! The layout binds the action kind, its sequence id, every business
//! field and the full domain context.

use crate::crypto::{Address, Digest};
use crate::multisig::domain::DomainContext;
use serde::{Deserialize, Serialize};

/// Leading tag of every encoded message
pub const MESSAGE_TAG: &[u8; 16] = b"QUORUM-WALLET/v1";

const KIND_TRANSFER: u8 = 0x01;
const KIND_SIGNER_UPDATE: u8 = 0x02;

/// A fund transfer requested by a caller, before an id is assigned
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct TransferRequest {
    pub destination: Address,
    pub amount: u128,
    #[serde(with = "hex_bytes")]
    pub payload: Vec<u8>,
}

impl TransferRequest {
    pub fn new(destination: Address, amount: u128, payload: Vec<u8>) -> Self {
        Self {
            destination,
            amount,
            payload,
        }
    }
}

/// An action awaiting quorum within a single invocation
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PendingAction {
    Transfer {
        id: u64,
        destination: Address,
        amount: u128,
        #[serde(with = "hex_bytes")]
        payload: Vec<u8>,
    },
    SignerUpdate {
        id: u64,
        signers: Vec<Address>,
        threshold: usize,
    },
}

impl PendingAction {
    /// Transfer action carrying the given sequence id
    pub fn transfer(id: u64, request: &TransferRequest) -> Self {
        PendingAction::Transfer {
            id,
            destination: request.destination,
            amount: request.amount,
            payload: request.payload.clone(),
        }
    }

    /// Signer-set replacement carrying the given proposal id
    pub fn signer_update(id: u64, signers: &[Address], threshold: usize) -> Self {
        PendingAction::SignerUpdate {
            id,
            signers: signers.to_vec(),
            threshold,
        }
    }

    /// Sequence id within the action's own kind
    pub fn id(&self) -> u64 {
        match self {
            PendingAction::Transfer { id, .. } | PendingAction::SignerUpdate { id, .. } => *id,
        }
    }

    fn kind_byte(&self) -> u8 {
        match self {
            PendingAction::Transfer { .. } => KIND_TRANSFER,
            PendingAction::SignerUpdate { .. } => KIND_SIGNER_UPDATE,
        }
    }

    /// Canonical byte encoding of this action within `domain`
    pub fn encode(&self, domain: &DomainContext) -> Vec<u8> {
        let mut buf = Vec::with_capacity(160);
        buf.extend_from_slice(MESSAGE_TAG);
        buf.push(self.kind_byte());
        buf.extend_from_slice(&self.id().to_be_bytes());

        match self {
            PendingAction::Transfer {
                destination,
                amount,
                payload,
                ..
            } => {
                buf.extend_from_slice(destination.as_bytes());
                buf.extend_from_slice(&amount.to_be_bytes());
                buf.extend_from_slice(&(payload.len() as u64).to_be_bytes());
                buf.extend_from_slice(payload);
            }
            PendingAction::SignerUpdate {
                signers, threshold, ..
            } => {
                buf.extend_from_slice(&(signers.len() as u64).to_be_bytes());
                for signer in signers {
                    buf.extend_from_slice(signer.as_bytes());
                }
                buf.extend_from_slice(&(*threshold as u64).to_be_bytes());
            }
        }

        buf.extend_from_slice(&domain.chain_id.to_be_bytes());
        buf.extend_from_slice(&domain.instance_nonce.to_be_bytes());
        buf.extend_from_slice(domain.wallet.as_bytes());
        buf.extend_from_slice(domain.digest_salt.as_bytes());
        buf
    }

    /// The digest signers sign for this action
    pub fn digest(&self, domain: &DomainContext) -> Digest {
        Digest::of(&self.encode(domain))
    }
}

/// Serde adapter storing byte payloads as hex strings
mod hex_bytes {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&hex::encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let s = String::deserialize(deserializer)?;
        hex::decode(s).map_err(serde::de::Error::custom)
    }
}
