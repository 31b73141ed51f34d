//! Quorum Wallet CLI Application
//!
//! A command-line interface for operating a k-of-n multisig wallet.

use clap::{Parser, Subcommand};
use quorum_wallet::cli::{self, AppState};
use quorum_wallet::multisig::DEFAULT_CHAIN_ID;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "quorum-wallet")]
#[command(author = "Darshan")]
#[command(version = "0.1.0")]
#[command(about = "A k-of-n multisig wallet with offline signing", long_about = None)]
struct Cli {
    /// Data directory for wallet storage
    #[arg(short, long, default_value = ".quorum_wallet")]
    data_dir: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize a new multisig wallet
    Init {
        /// Signer addresses (comma-separated, ascending)
        #[arg(short, long)]
        signers: String,

        /// Signatures required to act
        #[arg(short, long)]
        threshold: usize,

        /// Chain identifier bound into every signed message
        #[arg(long, default_value_t = DEFAULT_CHAIN_ID)]
        chain_id: u64,

        /// Instance nonce (random if omitted)
        #[arg(long)]
        instance_nonce: Option<u64>,

        /// Sort the signer list instead of rejecting unsorted input
        #[arg(long)]
        sort: bool,

        /// Do not track consumed signatures
        #[arg(long)]
        no_signature_tracking: bool,
    },

    /// Signer key operations
    Key {
        #[command(subcommand)]
        action: KeyCommands,
    },

    /// Credit the wallet's balance
    Deposit {
        /// Amount to deposit
        #[arg(short, long)]
        amount: u128,
    },

    /// Sign the next transfer with a stored signer key
    SignTransfer {
        /// Signer address (key must exist in the keys directory)
        #[arg(short, long)]
        signer: String,

        /// Recipient's address
        #[arg(short, long)]
        to: String,

        /// Amount to send
        #[arg(short, long)]
        amount: u128,

        /// Hex payload passed along with the transfer
        #[arg(short, long)]
        payload: Option<String>,
    },

    /// Submit a transfer with collected signatures
    Transfer {
        /// Recipient's address
        #[arg(short, long)]
        to: String,

        /// Amount to send
        #[arg(short, long)]
        amount: u128,

        /// Hex payload passed along with the transfer
        #[arg(short, long)]
        payload: Option<String>,

        /// Signatures as <signature>:<nonce> (repeatable)
        #[arg(long = "sig", required = true)]
        signatures: Vec<String>,
    },

    /// Sign the next signer update with a stored signer key
    SignUpdate {
        /// Signer address (key must exist in the keys directory)
        #[arg(short, long)]
        signer: String,

        /// New signer addresses (comma-separated, ascending)
        #[arg(long)]
        signers: String,

        /// New threshold
        #[arg(short, long)]
        threshold: usize,
    },

    /// Submit a signer update with collected signatures
    Update {
        /// New signer addresses (comma-separated, ascending)
        #[arg(long)]
        signers: String,

        /// New threshold
        #[arg(short, long)]
        threshold: usize,

        /// Signatures as <signature>:<nonce> (repeatable)
        #[arg(long = "sig")]
        signatures: Vec<String>,
    },

    /// Display wallet information
    Status,

    /// Show the current nonce of an address
    Nonce {
        #[arg(short, long)]
        address: String,
    },

    /// Check whether an address is a current signer
    IsSigner {
        #[arg(short, long)]
        address: String,
    },

    /// Show recent wallet events
    Events {
        /// Number of events to show
        #[arg(short, long, default_value = "10")]
        count: usize,
    },
}

#[derive(Subcommand)]
enum KeyCommands {
    /// Create a new signer key
    New {
        /// Optional label for the key
        #[arg(short, long)]
        label: Option<String>,
    },

    /// List all signer keys
    List,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logger
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    // Commands that don't need a wallet
    match &cli.command {
        Commands::Init {
            signers,
            threshold,
            chain_id,
            instance_nonce,
            sort,
            no_signature_tracking,
        } => {
            return cli::cmd_init(
                &cli.data_dir,
                signers,
                *threshold,
                *chain_id,
                *instance_nonce,
                *sort,
                !*no_signature_tracking,
            );
        }
        Commands::Key { action } => {
            return match action {
                KeyCommands::New { label } => cli::cmd_key_new(&cli.data_dir, label.as_deref()),
                KeyCommands::List => cli::cmd_key_list(&cli.data_dir),
            };
        }
        _ => {}
    }

    // Initialize application state
    let mut state = AppState::new(cli.data_dir.clone())?;

    match cli.command {
        Commands::Init { .. } | Commands::Key { .. } => unreachable!(),

        Commands::Deposit { amount } => {
            cli::cmd_deposit(&mut state, amount)?;
        }

        Commands::SignTransfer {
            signer,
            to,
            amount,
            payload,
        } => {
            cli::cmd_sign_transfer(&state, &signer, &to, amount, payload.as_deref())?;
        }

        Commands::Transfer {
            to,
            amount,
            payload,
            signatures,
        } => {
            cli::cmd_transfer(&mut state, &to, amount, payload.as_deref(), &signatures)?;
        }

        Commands::SignUpdate {
            signer,
            signers,
            threshold,
        } => {
            cli::cmd_sign_update(&state, &signer, &signers, threshold)?;
        }

        Commands::Update {
            signers,
            threshold,
            signatures,
        } => {
            cli::cmd_update(&mut state, &signers, threshold, &signatures)?;
        }

        Commands::Status => {
            cli::cmd_status(&state)?;
        }

        Commands::Nonce { address } => {
            cli::cmd_nonce(&state, &address)?;
        }

        Commands::IsSigner { address } => {
            cli::cmd_is_signer(&state, &address)?;
        }

        Commands::Events { count } => {
            cli::cmd_events(&state, count)?;
        }
    }

    Ok(())
}
