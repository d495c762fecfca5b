//! CLI commands for the custodian tooling
//!
//! Implements all command handlers for the CLI interface.

use std::str::FromStr;

use crate::crypto::{public_key_from_hex, public_key_to_address, recover_address, Address, KeyPair, Signature};
use crate::custody::{
    confirmation_intent_digest, now_ms, transfer_intent_digest, TransferGateway,
    CONFIRMATION_PREFIX, TRANSFER_PREFIX,
};
use crate::token::{AssetRegistry, NftManager};

/// Result type for CLI operations
pub type CliResult<T> = Result<T, Box<dyn std::error::Error>>;

fn parse_address(s: &str) -> CliResult<Address> {
    Ok(Address::from_str(s)?)
}

fn parse_digest(s: &str) -> CliResult<[u8; 32]> {
    let hex_str = s.strip_prefix("0x").unwrap_or(s);
    let bytes = hex::decode(hex_str)?;
    if bytes.len() != 32 {
        return Err(format!("digest must be 32 bytes, got {}", bytes.len()).into());
    }
    let mut digest = [0u8; 32];
    digest.copy_from_slice(&bytes);
    Ok(digest)
}

/// Generate a new signer key pair
pub fn cmd_keygen() -> CliResult<()> {
    let kp = KeyPair::generate();

    println!("🔐 New signer key pair generated!");
    println!("   📍 Address: {}", kp.address());
    println!("   🔑 Public key: 0x{}", kp.public_hex());
    println!("   🗝️  Secret key: 0x{}", kp.secret_hex());
    println!("\n   ⚠️  IMPORTANT: anyone holding the secret key can co-approve");
    println!("   transfers. Store it offline and never share it.");

    Ok(())
}

/// Derive the 20-byte address for a public key
pub fn cmd_address(public_key: &str) -> CliResult<()> {
    let pubkey = public_key_from_hex(public_key)?;
    println!("📍 Address: {}", public_key_to_address(&pubkey));
    Ok(())
}

/// Compute a transfer-intent digest
pub fn cmd_hash_transfer(
    custodian: &str,
    to: &str,
    token_id: u64,
    token_contract: &str,
    expire_time: u64,
) -> CliResult<()> {
    let digest = transfer_intent_digest(
        TRANSFER_PREFIX,
        parse_address(custodian)?,
        parse_address(to)?,
        token_id,
        parse_address(token_contract)?,
        expire_time,
    );
    println!("#️⃣  Transfer-intent digest: 0x{}", hex::encode(digest));
    Ok(())
}

/// Compute a stepwise confirmation digest
pub fn cmd_hash_confirm(custodian: &str, txid: u64, confirm: bool) -> CliResult<()> {
    let digest =
        confirmation_intent_digest(CONFIRMATION_PREFIX, parse_address(custodian)?, txid, confirm);
    println!("#️⃣  Confirmation digest: 0x{}", hex::encode(digest));
    Ok(())
}

/// Sign a 32-byte digest with a secret key
pub fn cmd_sign(digest: &str, secret_key: &str) -> CliResult<()> {
    let digest = parse_digest(digest)?;
    let kp = KeyPair::from_secret_hex(secret_key)?;
    let sig = kp.sign_digest(&digest)?;

    println!("✍️  Signature: 0x{}", sig.to_hex());
    println!("   Signer: {}", kp.address());
    Ok(())
}

/// Recover the signer address from a digest and a signature chunk
pub fn cmd_recover(digest: &str, signature: &str) -> CliResult<()> {
    let digest = parse_digest(digest)?;
    let sig = Signature::from_hex(signature)?;
    println!("📍 Recovered signer: {}", recover_address(&digest, &sig)?);
    Ok(())
}

/// Run a self-contained end-to-end demonstration of both protocols
pub fn cmd_demo(threshold: usize, max_signers: usize) -> CliResult<()> {
    println!("🏦 Setting up a {}-of-3 custody gateway...", threshold);

    let keys: Vec<KeyPair> = (0..3).map(|_| KeyPair::generate()).collect();
    let custodian = KeyPair::generate().address();
    let mut gateway = TransferGateway::new(custodian, 1, max_signers)?;
    for (i, key) in keys.iter().enumerate() {
        gateway.add_signer(key.address())?;
        println!("   Signer {}: {}", i + 1, key.address());
    }
    gateway.change_threshold(threshold)?;
    println!("   Custodian: {}", custodian);
    println!("   Threshold: {}-of-{}", gateway.threshold(), gateway.signer_count());

    // a collection with two tokens held in custody
    let mut assets = NftManager::new();
    let collection = assets.create_collection("Demo NFT".to_string(), "DNFT".to_string())?;
    assets.mint(collection, custodian, 1)?;
    assets.mint(collection, custodian, 2)?;
    println!("\n🎨 Minted tokens 1 and 2 of {} into custody", collection);

    let recipient = keys[2].address();
    let expire = now_ms() + 30 * 60 * 1000;

    // single-call path
    println!("\n📤 Single-call transfer of token 1 to {}...", recipient);
    let digest = transfer_intent_digest(
        TRANSFER_PREFIX,
        custodian,
        recipient,
        1,
        collection,
        expire,
    );
    let mut bundle = Vec::new();
    for key in keys.iter().take(threshold) {
        bundle.extend_from_slice(&key.sign_digest(&digest)?.to_bytes());
    }
    let signers = gateway.multisig_transfer(&mut assets, recipient, 1, collection, expire, &bundle)?;
    println!("   ✅ Released with {} approvals", signers.len());
    println!("   New owner: {}", assets.owner_of(collection, 1)?);

    // stepwise path
    println!("\n📤 Stepwise transfer of token 2 to {}...", recipient);
    let id = gateway.request_transaction(recipient, 2, collection, expire);
    println!("   Requested transaction {}", id);
    for key in keys.iter().take(threshold) {
        let digest = confirmation_intent_digest(CONFIRMATION_PREFIX, custodian, id, true);
        let signer = gateway.sign_transaction(id, true, &key.sign_digest(&digest)?)?;
        println!("   Confirmed by {}", signer);
    }

    let record = gateway.transaction(id).expect("transaction was requested");
    println!("{}", serde_json::to_string_pretty(record)?);

    gateway.execute_transaction(&mut assets, id)?;
    println!("   ✅ Executed");
    println!("   New owner: {}", assets.owner_of(collection, 2)?);

    Ok(())
}
