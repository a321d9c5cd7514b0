//! tradeguard
//!
//! Operator CLI for the tradeguard protection engine. Protects, verifies,
//! countersigns, and decrypts DvP transaction documents against local
//! file-backed key and group stores.
//!
//! Usage:
//!   tradeguard keygen <company>
//!   tradeguard protect <input> <output> [--recipients a,b] [--groups g1,g2]
//!   tradeguard check <document>
//!   tradeguard unprotect <document> <company> <output>
//!   tradeguard buyer-sign <document> <buyer> <output>
//!
//! Exits 0 on success and non-zero on any fatal error; `check` exits
//! non-zero when the document fails verification.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Context;
use clap::{Parser, Subcommand};

use tradeguard_core::{
    buyer_sign, check, protect, unprotect, ProtectedDocument, Transaction,
};

mod store;
use store::{FileGroupRegistry, FsKeyStore, PublicKeyFile};

// ── CLI definition ──────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(
    name = "tradeguard",
    version,
    about = "Protect, verify, and disclose DvP transaction documents"
)]
struct Args {
    /// Directory holding private keys, one subdirectory per company.
    #[arg(long, global = true, default_value = "keys")]
    keys_dir: PathBuf,

    /// JSON file holding the public-key directory.
    #[arg(long, global = true, default_value = "public_keys.json")]
    directory: PathBuf,

    /// JSON file holding group memberships.
    #[arg(long, global = true, default_value = "groups.json")]
    groups_file: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate keys for a company and register its public halves.
    Keygen {
        /// Company name
        company: String,
    },

    /// Protect a plaintext transaction into a protected document.
    Protect {
        /// Input transaction JSON file
        input: PathBuf,
        /// Output protected document file
        output: PathBuf,
        /// Comma-separated list of additional recipients
        #[arg(long)]
        recipients: Option<String>,
        /// Comma-separated list of group IDs
        #[arg(long)]
        groups: Option<String>,
    },

    /// Verify a protected document's structure and signatures.
    Check {
        /// Protected document file
        input: PathBuf,
    },

    /// Decrypt a protected document as a company.
    Unprotect {
        /// Protected document file
        input: PathBuf,
        /// Company name to decrypt as
        company: String,
        /// Output decrypted transaction file
        output: PathBuf,
    },

    /// Add the buyer's countersignature to a protected document.
    BuyerSign {
        /// Protected document file
        input: PathBuf,
        /// Buyer company name
        buyer: String,
        /// Output signed document file
        output: PathBuf,
    },
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn,tradeguard=info".into()),
        )
        .init();

    let args = Args::parse();

    match run(args) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("ERROR: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> anyhow::Result<ExitCode> {
    let keystore = FsKeyStore::new(&args.keys_dir);

    match args.command {
        Command::Keygen { company } => {
            let registration = keystore.generate(&company)?;

            let mut directory = PublicKeyFile::open(&args.directory)?;
            directory.register(&registration)?;

            println!("✓ Keys generated for {company}");
            println!("  Private keys stored in: {}/{company}/", args.keys_dir.display());
            println!("  Public keys registered in: {}", args.directory.display());
            println!(
                "  Encryption key fingerprint: {}",
                registration.public_keys.fingerprint()?
            );
            Ok(ExitCode::SUCCESS)
        }

        Command::Protect {
            input,
            output,
            recipients,
            groups,
        } => {
            let text = fs::read_to_string(&input)
                .with_context(|| format!("cannot read {}", input.display()))?;
            let value = serde_json::from_str(&text)
                .with_context(|| format!("invalid JSON in {}", input.display()))?;
            let transaction = Transaction::from_value(value)?;

            let seller = transaction.seller.clone();
            let buyer = transaction.buyer.clone();
            let recipients = split_list(recipients.as_deref());
            let groups = split_list(groups.as_deref());

            let directory = PublicKeyFile::open(&args.directory)?;
            let registry = FileGroupRegistry::new(&args.groups_file);

            let outcome = protect(
                &transaction,
                &seller,
                &buyer,
                &recipients,
                &groups,
                &directory,
                &keystore,
                &registry,
            )?;

            fs::write(&output, outcome.document.to_json_pretty()?)
                .with_context(|| format!("cannot write {}", output.display()))?;

            println!("✓ Transaction protected successfully");
            println!("  Output: {}", output.display());
            println!("  Transaction ID: {}", outcome.document.transaction_id);
            println!(
                "  Recipients: {} individual",
                outcome.document.wrapped_keys.len()
            );
            println!("  Groups: {}", outcome.document.group_wrapped_keys.len());
            for warning in &outcome.warnings {
                println!("  Warning: {warning}");
            }
            Ok(ExitCode::SUCCESS)
        }

        Command::Check { input } => {
            let document = read_document(&input)?;
            let directory = PublicKeyFile::open(&args.directory)?;

            let report = check(&document, &directory);

            if report.valid {
                println!("✓ Document verification PASSED");
            } else {
                println!("✗ Document verification FAILED");
            }

            println!("\nDetails:");
            println!("  seller_signature: {}", report.details.seller_signature);
            println!("  buyer_signature: {}", report.details.buyer_signature);
            println!(
                "  individual_recipients: {}",
                report.details.individual_recipients
            );
            println!("  groups: {}", report.details.groups);

            if !report.warnings.is_empty() {
                println!("\nWarnings:");
                for warning in &report.warnings {
                    println!("  - {warning}");
                }
            }
            if !report.errors.is_empty() {
                println!("\nErrors:");
                for error in &report.errors {
                    println!("  - {error}");
                }
            }

            Ok(if report.valid {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            })
        }

        Command::Unprotect {
            input,
            company,
            output,
        } => {
            let document = read_document(&input)?;

            let recovered = unprotect(&document, &company, &keystore)?;

            let text = serde_json::to_string_pretty(&recovered.transaction)?;
            fs::write(&output, text)
                .with_context(|| format!("cannot write {}", output.display()))?;

            println!("✓ Document decrypted successfully");
            println!("  Output: {}", output.display());
            println!("  Access method: {}", recovered.access_method);
            println!("  Transaction ID: {}", recovered.transaction.id);
            Ok(ExitCode::SUCCESS)
        }

        Command::BuyerSign {
            input,
            buyer,
            output,
        } => {
            let document = read_document(&input)?;

            let signed = buyer_sign(document, &buyer, &keystore)?;

            fs::write(&output, signed.to_json_pretty()?)
                .with_context(|| format!("cannot write {}", output.display()))?;

            println!("✓ Buyer signature added successfully");
            println!("  Output: {}", output.display());
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn read_document(path: &Path) -> anyhow::Result<ProtectedDocument> {
    let text =
        fs::read_to_string(path).with_context(|| format!("cannot read {}", path.display()))?;
    ProtectedDocument::from_json(&text)
        .with_context(|| format!("invalid protected document in {}", path.display()))
}

fn split_list(arg: Option<&str>) -> Vec<String> {
    arg.map(|s| {
        s.split(',')
            .map(str::trim)
            .filter(|item| !item.is_empty())
            .map(str::to_owned)
            .collect()
    })
    .unwrap_or_default()
}

// ============================================================================
// TESTS
// ============================================================================
