//! In-memory balance book and the transfer hook the wallet calls
//!
//! The wallet never moves funds itself; once a transfer batch reaches
//! quorum it hands the effect to a [`FundsTransfer`] implementation.

use crate::crypto::Address;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use thiserror::Error;

/// Why an external transfer did not go through
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransferFailure {
    #[error("Insufficient balance: have {have}, need {need}")]
    InsufficientBalance { have: u128, need: u128 },
    #[error("Destination rejected funds: {0}")]
    DestinationRejected(Address),
    #[error("Invalid amount: amount must be greater than 0")]
    InvalidAmount,
    #[error("Transfer failed: {0}")]
    Other(String),
}

/// The external effect of an accepted transfer
pub trait FundsTransfer {
    /// Move `amount` from `from` to `to`, passing `payload` along
    fn transfer(
        &mut self,
        from: &Address,
        to: &Address,
        amount: u128,
        payload: &[u8],
    ) -> Result<(), TransferFailure>;
}

/// Record of a completed movement of funds
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Movement {
    pub from: Address,
    pub to: Address,
    pub amount: u128,
    pub payload_len: usize,
}

/// Simple balance book: address -> amount
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Treasury {
    balances: BTreeMap<Address, u128>,
    /// Destinations that refuse incoming funds
    rejecting: BTreeSet<Address>,
    /// Movement history (last 100)
    history: Vec<Movement>,
}

const MAX_HISTORY: usize = 100;

impl Treasury {
    pub fn new() -> Self {
        Self::default()
    }

    /// Credit an address
    pub fn deposit(&mut self, to: &Address, amount: u128) {
        let balance = self.balances.entry(*to).or_insert(0);
        *balance = balance.saturating_add(amount);
        log::debug!("Deposited {} to {}", amount, to);
    }

    /// Get balance for an address
    pub fn balance_of(&self, holder: &Address) -> u128 {
        self.balances.get(holder).copied().unwrap_or(0)
    }

    /// Make `address` refuse all incoming transfers
    pub fn reject_incoming(&mut self, address: &Address) {
        self.rejecting.insert(*address);
    }

    /// Movements performed so far, oldest first
    pub fn history(&self) -> &[Movement] {
        &self.history
    }
}

impl FundsTransfer for Treasury {
    fn transfer(
        &mut self,
        from: &Address,
        to: &Address,
        amount: u128,
        payload: &[u8],
    ) -> Result<(), TransferFailure> {
        if amount == 0 {
            return Err(TransferFailure::InvalidAmount);
        }
        if self.rejecting.contains(to) {
            return Err(TransferFailure::DestinationRejected(*to));
        }

        let have = self.balance_of(from);
        if have < amount {
            return Err(TransferFailure::InsufficientBalance { have, need: amount });
        }

        self.balances.insert(*from, have - amount);
        self.deposit(to, amount);

        self.history.push(Movement {
            from: *from,
            to: *to,
            amount,
            payload_len: payload.len(),
        });
        if self.history.len() > MAX_HISTORY {
            self.history.remove(0);
        }

        Ok(())
    }
}
