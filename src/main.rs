//! Typed Pay CLI
//!
//! Inspect, sign and verify EIP-712 payment documents from the command line.

use anyhow::Result;
use clap::{Parser, Subcommand};
use serde_json::json;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::debug;
use typed_pay::documents::load_document;
use typed_pay::eip712::get_pre_image;
use typed_pay::logging::{init_tracing, redact_address};
use typed_pay::{
    recover_signer, verify_signer, LocalWalletProvider, PayError, PaymentSigner,
    SignatureOutcome, SignerConfig, WalletConnector,
};
use zeroize::Zeroizing;

#[derive(Parser)]
#[command(name = "typed-pay")]
#[command(about = "Sign and verify EIP-712 payment documents", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Config file (defaults to TYPED_PAY_CONFIG when set)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the canonical JSON of a document
    Document {
        /// Document file; the demo document when omitted
        #[arg(short, long)]
        file: Option<PathBuf>,
    },

    /// Print the domain separator, struct hash and signing digest
    Hash {
        #[arg(short, long)]
        file: Option<PathBuf>,

        /// Machine-readable output
        #[arg(long)]
        json: bool,
    },

    /// Run the Pay flow against a local key wallet
    Sign {
        #[arg(short, long)]
        file: Option<PathBuf>,

        /// Private key hex
        #[arg(short, long, env = "TYPED_PAY_PRIVATE_KEY", hide_env_values = true)]
        key: String,

        /// Machine-readable output
        #[arg(long)]
        json: bool,
    },

    /// Recover the signer of a signed document
    Verify {
        #[arg(short, long)]
        file: Option<PathBuf>,

        /// 65-byte signature hex
        #[arg(short, long)]
        signature: String,

        /// Fail unless this address signed
        #[arg(short, long)]
        expected: Option<String>,
    },

    /// Print the address of a private key
    Address {
        #[arg(short, long, env = "TYPED_PAY_PRIVATE_KEY", hide_env_values = true)]
        key: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = match &cli.config {
        Some(path) => SignerConfig::load(path)?,
        None => SignerConfig::from_env()?,
    };
    debug!(dapp = %config.connector.dapp.name, chain_id = config.chain_id, "config loaded");

    match cli.command {
        Commands::Document { file } => {
            let document = load_document(file.as_deref())?;
            println!("{}", document.to_canonical_json()?);
        }

        Commands::Hash { file, json } => {
            let document = load_document(file.as_deref())?;
            let pre_image = get_pre_image(&document)?;

            let domain_separator = format!("0x{}", hex::encode(pre_image.domain_separator));
            let struct_hash = format!("0x{}", hex::encode(pre_image.struct_hash));
            let digest = format!("0x{}", hex::encode(pre_image.final_hash));

            if json {
                let out = json!({
                    "domainSeparator": domain_separator,
                    "structHash": struct_hash,
                    "digest": digest,
                });
                println!("{}", serde_json::to_string_pretty(&out)?);
            } else {
                println!("Domain separator: {}", domain_separator);
                println!("Struct hash:      {}", struct_hash);
                println!("Digest:           {}", digest);
            }
        }

        Commands::Sign { file, key, json } => {
            let key = Zeroizing::new(key);
            let document = load_document(file.as_deref())?;

            let wallet = LocalWalletProvider::from_hex(&key)
                .map_err(|e| PayError::invalid_private_key(e.message))?
                .with_chain_id(config.chain_id);
            debug!(address = %redact_address(wallet.address()), "local wallet ready");

            let connector =
                WalletConnector::new(config.connector.clone()).with_provider(Arc::new(wallet));
            let signer = PaymentSigner::new(connector, &config);

            let Some(outcome) = signer.request_signature(&document).await else {
                let err = PayError::provider_unavailable("no wallet provider available");
                return Err(err.into());
            };

            if json {
                println!("{}", serde_json::to_string_pretty(&outcome)?);
            }

            match outcome {
                SignatureOutcome::Signed { signature } => {
                    if !json {
                        println!("{}", signature);
                    }
                }
                other => return Err(PayError::signing_failed(other.to_string()).into()),
            }
        }

        Commands::Verify {
            file,
            signature,
            expected,
        } => {
            let document = load_document(file.as_deref())?;
            let signer = match expected {
                Some(expected) => verify_signer(&document, &signature, &expected)?,
                None => recover_signer(&document, &signature)?,
            };
            println!("{}", signer);
        }

        Commands::Address { key } => {
            let key = Zeroizing::new(key);
            let wallet = LocalWalletProvider::from_hex(&key)
                .map_err(|e| PayError::invalid_private_key(e.message))?;
            println!("{}", wallet.address());
        }
    }

    Ok(())
}
