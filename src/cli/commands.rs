//! CLI commands for the wallet
//!
//! Implements all command handlers for the CLI interface.

use crate::crypto::{Address, Signature};
use crate::keystore::KeyStore;
use crate::multisig::{DomainConfig, MultisigWallet, TransferRequest, WalletEvent, WalletOptions};
use crate::storage::{Storage, StorageConfig};
use crate::treasury::Treasury;
use std::path::{Path, PathBuf};

/// Result type for CLI operations
pub type CliResult<T> = Result<T, Box<dyn std::error::Error>>;

/// Application state
pub struct AppState {
    pub wallet: MultisigWallet,
    pub treasury: Treasury,
    pub storage: Storage,
    pub keystore: KeyStore,
    pub data_dir: PathBuf,
}

impl AppState {
    /// Load application state from an initialized data directory
    pub fn new(data_dir: PathBuf) -> CliResult<Self> {
        let storage = open_storage(&data_dir)?;
        if !storage.exists() {
            return Err(format!(
                "no wallet at {:?}; run `quorum-wallet init` first",
                data_dir
            )
            .into());
        }

        Ok(Self {
            wallet: storage.load_wallet()?,
            treasury: storage.load_treasury()?,
            keystore: open_keystore(&data_dir)?,
            storage,
            data_dir,
        })
    }

    /// Save the current state
    ///
    /// The wallet is written first. If the treasury write then fails, the
    /// consumed nonces are already on disk, so the same signatures cannot
    /// move funds a second time after a reload.
    pub fn save(&self) -> CliResult<()> {
        self.storage.save_wallet(&self.wallet)?;
        self.storage.save_treasury(&self.treasury)?;
        Ok(())
    }
}

fn open_storage(data_dir: &Path) -> CliResult<Storage> {
    Ok(Storage::new(StorageConfig {
        data_dir: data_dir.to_path_buf(),
        ..Default::default()
    })?)
}

/// Open the signer key directory
pub fn open_keystore(data_dir: &Path) -> CliResult<KeyStore> {
    Ok(KeyStore::new(&data_dir.join("keys"))?)
}

/// Parse a comma-separated address list
pub fn parse_addresses(list: &str) -> CliResult<Vec<Address>> {
    list.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| s.parse::<Address>().map_err(Into::into))
        .collect()
}

/// Parse `<signature hex>:<nonce>` pairs into parallel arrays
pub fn parse_signatures(pairs: &[String]) -> CliResult<(Vec<Signature>, Vec<u64>)> {
    let mut signatures = Vec::with_capacity(pairs.len());
    let mut nonces = Vec::with_capacity(pairs.len());

    for pair in pairs {
        let (sig, nonce) = pair
            .split_once(':')
            .ok_or_else(|| format!("expected <signature>:<nonce>, got {}", pair))?;
        signatures.push(sig.parse::<Signature>()?);
        nonces.push(nonce.parse::<u64>()?);
    }

    Ok((signatures, nonces))
}

fn parse_payload(payload: Option<&str>) -> CliResult<Vec<u8>> {
    match payload {
        Some(hex_str) => Ok(hex::decode(hex_str.trim_start_matches("0x"))?),
        None => Ok(Vec::new()),
    }
}

/// Initialize a new multisig wallet
pub fn cmd_init(
    data_dir: &Path,
    signers: &str,
    threshold: usize,
    chain_id: u64,
    instance_nonce: Option<u64>,
    sort: bool,
    track_signatures: bool,
) -> CliResult<()> {
    let storage = open_storage(data_dir)?;

    if storage.exists() {
        println!("⚠️  Wallet already exists at {:?}", data_dir);
        return Ok(());
    }

    let mut signers = parse_addresses(signers)?;
    if sort {
        signers.sort();
    }

    let config = match instance_nonce {
        Some(nonce) => DomainConfig::new(chain_id, nonce),
        None => DomainConfig::random(chain_id),
    };
    let options = WalletOptions {
        track_signatures,
        ..WalletOptions::default()
    };
    let wallet = MultisigWallet::with_options(config, signers, threshold, options)?;

    storage.save_wallet(&wallet)?;
    storage.save_treasury(&Treasury::new())?;

    let domain = wallet.domain_context();
    println!("✅ Multisig wallet initialized!");
    println!("   📍 Address: {}", wallet.address());
    println!("   🔐 Policy: {}", wallet.description());
    println!("   ⛓️  Chain ID: {}", domain.chain_id);
    println!("   🎲 Instance nonce: {}", domain.instance_nonce);
    println!("   🧂 Digest salt: {}", domain.digest_salt);

    Ok(())
}

/// Create a new signer key
pub fn cmd_key_new(data_dir: &Path, label: Option<&str>) -> CliResult<()> {
    let key = open_keystore(data_dir)?.create_key(label)?;

    println!("🔑 New signer key created!");
    println!("   📍 Address: {}", key.address());
    println!("   🔓 Public Key: {}", key.public_key());
    if let Some(l) = &key.label {
        println!("   🏷️  Label: {}", l);
    }
    println!("\n   ⚠️  The private key is stored in the keys directory. Keep it offline.");

    Ok(())
}

/// List stored signer keys
pub fn cmd_key_list(data_dir: &Path) -> CliResult<()> {
    let addresses = open_keystore(data_dir)?.list_keys()?;

    if addresses.is_empty() {
        println!("📭 No signer keys found. Create one with: quorum-wallet key new");
        return Ok(());
    }

    println!("🔑 Signer keys ({}):", addresses.len());
    for address in addresses {
        println!("   • {}", address);
    }

    Ok(())
}

/// Credit the wallet's treasury balance
pub fn cmd_deposit(state: &mut AppState, amount: u128) -> CliResult<()> {
    let address = *state.wallet.address();
    state.treasury.deposit(&address, amount);
    state.save()?;

    println!("💰 Deposited {} to {}", amount, address);
    println!("   Balance: {}", state.treasury.balance_of(&address));

    Ok(())
}

/// Sign the next transfer with a stored key
pub fn cmd_sign_transfer(
    state: &AppState,
    signer: &str,
    to: &str,
    amount: u128,
    payload: Option<&str>,
) -> CliResult<()> {
    let key = state.keystore.load_key(&signer.parse()?)?;
    let request = TransferRequest::new(to.parse()?, amount, parse_payload(payload)?);

    let digest = state.wallet.transfer_digest(&request);
    let signature = key.sign(&digest);
    let nonce = state.wallet.current_nonce(&key.address());

    println!("✍️  Signed transfer #{}", state.wallet.next_transfer_id());
    println!("   Digest: {}", digest);
    println!("   {}:{}", signature, nonce);

    Ok(())
}

/// Submit a transfer with collected signatures
pub fn cmd_transfer(
    state: &mut AppState,
    to: &str,
    amount: u128,
    payload: Option<&str>,
    signatures: &[String],
) -> CliResult<()> {
    let request = TransferRequest::new(to.parse()?, amount, parse_payload(payload)?);
    let (signatures, nonces) = parse_signatures(signatures)?;

    let id = state
        .wallet
        .submit_transfer(&mut state.treasury, request, &signatures, &nonces)?;
    state.save()?;

    println!("✅ Transfer #{} approved", id);
    if let Some(WalletEvent::TransferExecuted {
        success, reason, ..
    }) = state.wallet.events().last()
    {
        if *success {
            println!("   💸 Funds sent: {} to {}", amount, to);
        } else {
            println!(
                "   ⚠️  Funds not sent: {}",
                reason.as_deref().unwrap_or("unknown reason")
            );
        }
    }

    Ok(())
}

/// Sign the next signer update with a stored key
pub fn cmd_sign_update(
    state: &AppState,
    signer: &str,
    signers: &str,
    threshold: usize,
) -> CliResult<()> {
    let key = state.keystore.load_key(&signer.parse()?)?;
    let new_signers = parse_addresses(signers)?;

    let digest = state.wallet.signer_update_digest(&new_signers, threshold);
    let signature = key.sign(&digest);
    let nonce = state.wallet.current_nonce(&key.address());

    println!("✍️  Signed signer update #{}", state.wallet.next_proposal_id());
    println!("   Digest: {}", digest);
    println!("   {}:{}", signature, nonce);

    Ok(())
}

/// Submit a signer update with collected signatures
pub fn cmd_update(
    state: &mut AppState,
    signers: &str,
    threshold: usize,
    signatures: &[String],
) -> CliResult<()> {
    let new_signers = parse_addresses(signers)?;
    let (signatures, nonces) = parse_signatures(signatures)?;

    let id = state
        .wallet
        .submit_signer_update(new_signers, threshold, &signatures, &nonces)?;
    state.save()?;

    println!("✅ Signer update #{} applied", id);
    println!("   🔐 Policy: {}", state.wallet.description());

    Ok(())
}

/// Display wallet status
pub fn cmd_status(state: &AppState) -> CliResult<()> {
    let wallet = &state.wallet;
    let domain = wallet.domain_context();

    println!("📊 Multisig Wallet");
    println!("   ├─ Address: {}", wallet.address());
    println!("   ├─ Policy: {}", wallet.description());
    println!("   ├─ Chain ID: {}", domain.chain_id);
    println!("   ├─ Instance nonce: {}", domain.instance_nonce);
    println!("   ├─ Next transfer id: {}", wallet.next_transfer_id());
    println!("   ├─ Next proposal id: {}", wallet.next_proposal_id());
    println!(
        "   ├─ Balance: {}",
        state.treasury.balance_of(wallet.address())
    );
    println!("   └─ Signers:");
    for signer in wallet.signers() {
        println!(
            "        • {} (nonce {})",
            signer,
            wallet.current_nonce(signer)
        );
    }

    Ok(())
}

/// Show the current nonce of an address
pub fn cmd_nonce(state: &AppState, address: &str) -> CliResult<()> {
    let address: Address = address.parse()?;
    println!("🔢 {}: nonce {}", address, state.wallet.current_nonce(&address));
    Ok(())
}

/// Check signer membership
pub fn cmd_is_signer(state: &AppState, address: &str) -> CliResult<()> {
    let address: Address = address.parse()?;
    if state.wallet.is_signer(&address) {
        println!("✅ {} is a signer", address);
    } else {
        println!("❌ {} is not a signer", address);
    }
    Ok(())
}

/// List recent events
pub fn cmd_events(state: &AppState, count: usize) -> CliResult<()> {
    let events = state.wallet.events();
    if events.is_empty() {
        println!("📭 No events yet");
        return Ok(());
    }

    println!("📜 Recent events:");
    for event in events.iter().rev().take(count) {
        match event {
            WalletEvent::TransferExecuted {
                id,
                destination,
                amount,
                success,
                timestamp,
                ..
            } => println!(
                "   {} transfer #{} {} to {} [{}]",
                timestamp.format("%Y-%m-%d %H:%M:%S"),
                id,
                amount,
                destination,
                if *success { "sent" } else { "failed" }
            ),
            WalletEvent::SignersUpdated {
                proposal_id,
                signers,
                threshold,
                timestamp,
                ..
            } => println!(
                "   {} signer update #{} -> {}-of-{}",
                timestamp.format("%Y-%m-%d %H:%M:%S"),
                proposal_id,
                threshold,
                signers.len()
            ),
        }
    }

    Ok(())
}
