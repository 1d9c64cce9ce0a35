use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use env_logger::Env;
use hex::encode as hex_encode;
use log::info;
use pqcrypto_traits::kem::{PublicKey as _, SecretKey as _};
use qyra_core::kem_keypair;

/// Generates a fresh Kyber-768 key pair for a Qyra mining session.
///
/// By default the keys are printed as hex for embedding in a
/// configuration; with `--out-dir` the raw bytes are written to
/// `qyra.pk` and `qyra.sk` instead.
#[derive(Parser)]
#[command(name = "qyra-keygen", author, version, about)]
struct Cli {
    /// Directory to write raw `qyra.pk` / `qyra.sk` files into.
    #[arg(long)]
    out_dir: Option<PathBuf>,

    /// Verbose logging.
    #[arg(long)]
    debug: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let level = if cli.debug { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(level)).init();

    let (public_key, secret_key) = kem_keypair();

    match cli.out_dir {
        Some(dir) => {
            fs::create_dir_all(&dir)
                .with_context(|| format!("creating output directory {}", dir.display()))?;
            let pk_path = dir.join("qyra.pk");
            let sk_path = dir.join("qyra.sk");
            fs::write(&pk_path, public_key.as_bytes())
                .with_context(|| format!("writing {}", pk_path.display()))?;
            fs::write(&sk_path, secret_key.as_bytes())
                .with_context(|| format!("writing {}", sk_path.display()))?;
            info!("public key written to {}", pk_path.display());
            info!("secret key written to {}", sk_path.display());
        }
        None => {
            println!("# Qyra session keys. Never share the secret key with anyone.");
            println!("public_key = \"{}\"", hex_encode(public_key.as_bytes()));
            println!("secret_key = \"{}\"", hex_encode(secret_key.as_bytes()));
        }
    }

    Ok(())
}
