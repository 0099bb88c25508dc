//! Key management commands.
//!
//! `logwarden keys generate` - Generate a new Biscuit keypair.

use logwarden_biscuit::KeyPair;
use std::path::PathBuf;

/// Generate a new Biscuit keypair.
pub fn generate(output: Option<PathBuf>) -> anyhow::Result<()> {
    let keypair = KeyPair::generate()?;

    if let Some(output_dir) = output {
        let (private_path, public_path) = keypair.save_to_dir(&output_dir)?;

        println!("✔ Generated Biscuit keypair:");
        println!("  Private key: {}", private_path.display());
        println!("  Public key:  {}", public_path.display());
        println!();
        println!("⚠️  Keep your private key secure! Never commit it to version control.");
        println!();
        println!("Reference them from logwarden.yaml:");
        println!("  biscuit:");
        println!("    private_key_file: {}", private_path.display());
        println!("    public_key_file: {}", public_path.display());
    } else {
        println!("Private key (keep secure!):");
        println!("{}", keypair.private_key_hex());
        println!();
        println!("Public key:");
        println!("{}", keypair.public_key_hex());
        println!();
        println!("Use --output <dir> to save keys to files.");
    }

    Ok(())
}
