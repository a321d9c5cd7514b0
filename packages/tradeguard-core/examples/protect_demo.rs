//! # Protection Demo
//!
//! Walks the basic seller → buyer flow: keygen, protect, check, buyer
//! countersign, unprotect.
//!
//! ## Run
//!
//! ```bash
//! cargo run --example protect_demo
//! ```

use serde_json::json;
use tradeguard_core::crypto::CompanyKeyPair;
use tradeguard_core::directory::{MemoryDirectory, MemoryGroups, MemoryVault};
use tradeguard_core::{buyer_sign, check, protect, unprotect, Transaction};

fn main() {
    println!("=== Tradeguard: Seller/Buyer Protection Demo ===\n");

    // Step 1: Both companies generate and publish keys
    println!("Step 1: Generating keys for both parties...");

    let mut directory = MemoryDirectory::new();
    let mut vault = MemoryVault::new();
    let groups = MemoryGroups::new();

    for company in ["ChingChongExtractions", "LaysChips"] {
        let keypair = CompanyKeyPair::generate();
        println!(
            "  {}: encryption key fingerprint {}",
            company,
            keypair.public_keys().fingerprint().expect("fingerprint")
        );
        directory.register(company, keypair.public_keys());
        vault.insert(company, &keypair);
    }
    println!();

    // Step 2: The seller protects a transaction
    println!("Step 2: Seller protects the transaction...");

    let transaction = Transaction::from_value(json!({
        "id": 123,
        "timestamp": 1766336340i64,
        "seller": "ChingChongExtractions",
        "buyer": "LaysChips",
        "product": "Indium",
        "units": 40000,
        "amount": 90000000,
    }))
    .expect("valid transaction");

    let outcome = protect(
        &transaction,
        "ChingChongExtractions",
        "LaysChips",
        &[],
        &[],
        &directory,
        &vault,
        &groups,
    )
    .expect("protection failed");

    let document = outcome.document;
    println!("  Transaction ID: {}", document.transaction_id);
    println!("  Individual envelopes: {}", document.wrapped_keys.len());
    println!();

    // Step 3: Anyone can verify without key material
    println!("Step 3: Checking the document...");

    let report = check(&document, &directory);
    println!("  valid: {}", report.valid);
    println!("  seller signature: {}", report.details.seller_signature);
    println!("  buyer signature:  {}", report.details.buyer_signature);
    println!();

    // Step 4: The buyer countersigns
    println!("Step 4: Buyer countersigns...");

    let document = buyer_sign(document, "LaysChips", &vault).expect("countersign failed");
    let report = check(&document, &directory);
    println!("  buyer signature:  {}", report.details.buyer_signature);
    println!();

    // Step 5: The buyer decrypts
    println!("Step 5: Buyer unprotects...");

    let recovered = unprotect(&document, "LaysChips", &vault).expect("unprotect failed");
    println!("  access method: {}", recovered.access_method);
    println!(
        "  {} -> {}: {} x {} for {} minor units",
        recovered.transaction.seller,
        recovered.transaction.buyer,
        recovered.transaction.units,
        recovered.transaction.product,
        recovered.transaction.amount,
    );

    if recovered.transaction == transaction {
        println!("  [OK] Plaintext recovered byte-for-byte!");
    } else {
        println!("  [FAILED] Recovered plaintext differs!");
    }
    println!();

    println!("=== Example Complete ===");
}
