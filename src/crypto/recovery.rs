//! Signer recovery from recoverable ECDSA signatures

use secp256k1::ecdsa::{RecoverableSignature, RecoveryId};
use secp256k1::{Message, Secp256k1};
use thiserror::Error;

use super::hash::Digest;
use super::keys::{Address, SIGNATURE_LEN};

/// Reasons a signature fails to yield a signer identity
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RecoveryError {
    #[error("signature must be 65 bytes, got {0}")]
    InvalidLength(usize),
    #[error("invalid recovery id {0}")]
    InvalidRecoveryId(u8),
    #[error("malformed signature: {0}")]
    MalformedSignature(String),
    #[error("no public key recovers from signature")]
    Unrecoverable,
}

/// Recover the address that produced `signature` over `digest`
///
/// The recovery byte may be given as 0/1 or in the legacy 27/28 form.
pub fn recover(digest: &Digest, signature: &[u8]) -> Result<Address, RecoveryError> {
    if signature.len() != SIGNATURE_LEN {
        return Err(RecoveryError::InvalidLength(signature.len()));
    }

    let v = signature[64];
    let parity = match v {
        0 | 1 => v,
        27 | 28 => v - 27,
        _ => return Err(RecoveryError::InvalidRecoveryId(v)),
    };
    let recovery_id = RecoveryId::from_i32(parity as i32)
        .map_err(|_| RecoveryError::InvalidRecoveryId(v))?;

    let recoverable = RecoverableSignature::from_compact(&signature[..64], recovery_id)
        .map_err(|e| RecoveryError::MalformedSignature(e.to_string()))?;

    let secp = Secp256k1::verification_only();
    let message = Message::from_digest(*digest.as_bytes());
    let public_key = secp
        .recover_ecdsa(&message, &recoverable)
        .map_err(|_| RecoveryError::Unrecoverable)?;

    Ok(Address::from_public_key(&public_key))
}
