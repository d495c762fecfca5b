//! Custodian CLI Application
//!
//! Command-line tooling around the custodial multisig engine: key
//! generation, intent digests, signing, signature recovery, and a
//! self-contained demonstration of both authorization protocols.

use clap::{Parser, Subcommand};
use nft_custodian::cli::{commands, CliResult};

#[derive(Parser)]
#[command(name = "custodian")]
#[command(version = "0.1.0")]
#[command(about = "Custodial multisig authorization engine for NFT transfers", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a new signer key pair
    Keygen,

    /// Derive the 20-byte address for a public key
    Address {
        /// Hex-encoded public key (compressed or uncompressed)
        #[arg(short, long)]
        public_key: String,
    },

    /// Compute the digest of a direct transfer intent
    HashTransfer {
        /// Custodian (gateway) address
        #[arg(long)]
        custodian: String,

        /// Recipient address
        #[arg(long)]
        to: String,

        /// Token id to release
        #[arg(long)]
        token_id: u64,

        /// Collection address holding the token
        #[arg(long)]
        token_contract: String,

        /// Expiry in milliseconds since the Unix epoch
        #[arg(long)]
        expire_time: u64,
    },

    /// Compute the digest of a stepwise confirmation
    HashConfirm {
        /// Custodian (gateway) address
        #[arg(long)]
        custodian: String,

        /// Transaction id being confirmed
        #[arg(long)]
        txid: u64,

        /// Hash a rejection vote instead of a confirmation
        #[arg(long)]
        reject: bool,
    },

    /// Sign a 32-byte digest with a secret key
    Sign {
        /// Hex-encoded digest
        #[arg(short, long)]
        digest: String,

        /// Hex-encoded secret key
        #[arg(short, long)]
        secret_key: String,
    },

    /// Recover the signer address from a digest and a 65-byte signature
    Recover {
        /// Hex-encoded digest
        #[arg(short, long)]
        digest: String,

        /// Hex-encoded 65-byte signature (r || s || v)
        #[arg(short, long)]
        signature: String,
    },

    /// Run a self-contained end-to-end demonstration
    Demo {
        /// Approvals required to release a token
        #[arg(short, long, default_value = "2")]
        threshold: usize,

        /// Signer capacity of the registry
        #[arg(short, long, default_value = "10")]
        max_signers: usize,
    },
}

fn main() -> CliResult<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    match &cli.command {
        Commands::Keygen => commands::cmd_keygen(),
        Commands::Address { public_key } => commands::cmd_address(public_key),
        Commands::HashTransfer {
            custodian,
            to,
            token_id,
            token_contract,
            expire_time,
        } => commands::cmd_hash_transfer(custodian, to, *token_id, token_contract, *expire_time),
        Commands::HashConfirm {
            custodian,
            txid,
            reject,
        } => commands::cmd_hash_confirm(custodian, *txid, !reject),
        Commands::Sign { digest, secret_key } => commands::cmd_sign(digest, secret_key),
        Commands::Recover { digest, signature } => commands::cmd_recover(digest, signature),
        Commands::Demo {
            threshold,
            max_signers,
        } => commands::cmd_demo(*threshold, *max_signers),
    }
}
