//! # Group Disclosure Demo
//!
//! Shows the membership-at-issuance semantics: members present when the
//! document is protected get envelopes; a company joining afterwards does
//! not, and stays locked out of already-issued documents.
//!
//! ## Run
//!
//! ```bash
//! cargo run --example group_demo
//! ```

use serde_json::json;
use tradeguard_core::crypto::CompanyKeyPair;
use tradeguard_core::directory::{MemoryDirectory, MemoryGroups, MemoryVault};
use tradeguard_core::{protect, share_group, unprotect, verify_group_share_record, Transaction};

fn main() {
    println!("=== Tradeguard: Group Disclosure Demo ===\n");

    let mut directory = MemoryDirectory::new();
    let mut vault = MemoryVault::new();
    let mut groups = MemoryGroups::new();

    for company in [
        "ChingChongExtractions",
        "LaysChips",
        "AuditorCorp",
        "LateJoiner",
    ] {
        let keypair = CompanyKeyPair::generate();
        directory.register(company, keypair.public_keys());
        vault.insert(company, &keypair);
    }

    println!("Step 1: tech_partners = [AuditorCorp]");
    groups.add_member("tech_partners", "AuditorCorp");

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

    println!("Step 2: Protecting with group disclosure to tech_partners...");
    let outcome = protect(
        &transaction,
        "ChingChongExtractions",
        "LaysChips",
        &[],
        &["tech_partners".to_owned()],
        &directory,
        &vault,
        &groups,
    )
    .expect("protection failed");
    let document = outcome.document;

    let entry = &document.group_wrapped_keys["tech_partners"];
    println!("  member envelopes: {}", entry.members.len());
    println!();

    println!("Step 3: AuditorCorp decrypts via the group path...");
    let recovered = unprotect(&document, "AuditorCorp", &vault).expect("unprotect failed");
    println!("  access method: {}", recovered.access_method);
    println!();

    println!("Step 4: LateJoiner joins the group AFTER issuance...");
    groups.add_member("tech_partners", "LateJoiner");

    match unprotect(&document, "LateJoiner", &vault) {
        Ok(_) => println!("  [FAILED] LateJoiner decrypted a frozen document!"),
        Err(err) => println!("  [OK] LateJoiner denied: {err}"),
    }
    println!();

    println!("Step 5: The disclosure leaves an auditable record...");
    let record =
        share_group(document.transaction_id, "ChingChongExtractions", "tech_partners", &vault)
            .expect("share record");

    match verify_group_share_record(&record, &directory) {
        Ok(()) => println!("  [OK] Share record signature verifies."),
        Err(err) => println!("  [FAILED] Audit failed: {err}"),
    }
    println!();

    println!("=== Example Complete ===");
}
