//! Thread-safe handle to a wallet
//!
//! The whole validate-and-apply sequence of one submission runs under a
//! single lock. A submission started from inside another one on the same
//! thread (for example from a `FundsTransfer` hook calling back into the
//! wallet) is refused with `Reentrant` instead of deadlocking.

use crate::crypto::{Address, Signature};
use crate::multisig::message::TransferRequest;
use crate::multisig::wallet::{MultisigError, MultisigWallet};
use crate::treasury::FundsTransfer;
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread::{self, ThreadId};

/// Cloneable, lock-protected wallet
#[derive(Clone, Debug)]
pub struct SharedWallet {
    inner: Arc<Mutex<MultisigWallet>>,
    /// Thread currently running a submission, if any
    holder: Arc<Mutex<Option<ThreadId>>>,
}

/// Clears the holder mark when a submission ends, even on panic
struct HolderGuard<'a> {
    holder: &'a Mutex<Option<ThreadId>>,
}

impl Drop for HolderGuard<'_> {
    fn drop(&mut self) {
        *lock(self.holder) = None;
    }
}

/// Lock ignoring poison; a panicked submission never left partial state
/// because mutation only happens after validation succeeds
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl SharedWallet {
    pub fn new(wallet: MultisigWallet) -> Self {
        Self {
            inner: Arc::new(Mutex::new(wallet)),
            holder: Arc::new(Mutex::new(None)),
        }
    }

    /// Run `f` with exclusive access to the wallet
    fn exclusive<R>(
        &self,
        f: impl FnOnce(&mut MultisigWallet) -> Result<R, MultisigError>,
    ) -> Result<R, MultisigError> {
        let me = thread::current().id();
        if *lock(&self.holder) == Some(me) {
            return Err(MultisigError::Reentrant);
        }

        let mut wallet = lock(&self.inner);
        *lock(&self.holder) = Some(me);
        let _guard = HolderGuard {
            holder: &self.holder,
        };

        f(&mut wallet)
    }

    pub fn submit_transfer(
        &self,
        funds: &mut dyn FundsTransfer,
        request: TransferRequest,
        signatures: &[Signature],
        nonces: &[u64],
    ) -> Result<u64, MultisigError> {
        self.exclusive(|wallet| wallet.submit_transfer(funds, request, signatures, nonces))
    }

    pub fn submit_signer_update(
        &self,
        new_signers: Vec<Address>,
        new_threshold: usize,
        signatures: &[Signature],
        nonces: &[u64],
    ) -> Result<u64, MultisigError> {
        self.exclusive(|wallet| {
            wallet.submit_signer_update(new_signers, new_threshold, signatures, nonces)
        })
    }

    /// Read from the wallet under the lock
    ///
    /// Reads from inside a running submission on the same thread are refused.
    pub fn read<R>(&self, f: impl FnOnce(&MultisigWallet) -> R) -> Result<R, MultisigError> {
        self.exclusive(|wallet| Ok(f(wallet)))
    }

    pub fn is_signer(&self, address: &Address) -> Result<bool, MultisigError> {
        self.read(|wallet| wallet.is_signer(address))
    }

    pub fn current_nonce(&self, address: &Address) -> Result<u64, MultisigError> {
        self.read(|wallet| wallet.current_nonce(address))
    }

    /// Copy of the wallet state
    pub fn snapshot(&self) -> Result<MultisigWallet, MultisigError> {
        self.read(|wallet| wallet.clone())
    }
}
