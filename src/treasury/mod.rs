//! Funds held on behalf of wallets
//!
//! Supplies the external transfer effect a multisig wallet invokes after
//! a transfer batch reaches quorum.

pub mod treasury;

pub use treasury::{FundsTransfer, Movement, Treasury, TransferFailure};
