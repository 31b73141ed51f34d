//! Events emitted for accepted actions

use crate::crypto::Address;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Emitted once per accepted action
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum WalletEvent {
    /// Quorum reached on a transfer; `success` reports the external effect
    TransferExecuted {
        id: u64,
        destination: Address,
        amount: u128,
        success: bool,
        /// Failure reason when `success` is false
        reason: Option<String>,
        signers: Vec<Address>,
        timestamp: DateTime<Utc>,
    },
    /// Quorum reached on a signer-set replacement
    SignersUpdated {
        proposal_id: u64,
        signers: Vec<Address>,
        threshold: usize,
        approved_by: Vec<Address>,
        timestamp: DateTime<Utc>,
    },
}

impl WalletEvent {
    /// Id of the action this event reports
    pub fn action_id(&self) -> u64 {
        match self {
            WalletEvent::TransferExecuted { id, .. } => *id,
            WalletEvent::SignersUpdated { proposal_id, .. } => *proposal_id,
        }
    }

    /// Whether the action's effect was applied
    pub fn success(&self) -> bool {
        match self {
            WalletEvent::TransferExecuted { success, .. } => *success,
            WalletEvent::SignersUpdated { .. } => true,
        }
    }
}
