use anyhow::Context;
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use logwarden_core::LogwardenConfig;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser, Debug)]
#[command(name = "logwarden", version, about = "Logwarden audit-log CLI")]
struct Cli {
    /// Path to logwarden.yaml (defaults to $LOGWARDEN_CONFIG, then ./logwarden.yaml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Biscuit key management
    Keys {
        #[command(subcommand)]
        cmd: KeysCommand,
    },

    /// Admin token minting and verification
    Token {
        #[command(subcommand)]
        cmd: TokenCommand,
    },

    /// Database schema management
    Db {
        #[command(subcommand)]
        cmd: DbCommand,
    },

    /// Audit log access
    Logs {
        #[command(subcommand)]
        cmd: LogsCommand,
    },
}

#[derive(Subcommand, Debug)]
enum KeysCommand {
    /// Generate a new Ed25519 keypair
    Generate {
        /// Directory to write private.key and public.key into
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

#[derive(Subcommand, Debug)]
enum TokenCommand {
    /// Mint an admin token for a directory account
    Mint {
        /// Account the token is issued to
        #[arg(long)]
        user_id: i32,

        /// Lifetime, e.g. "12h", "7d" (defaults to biscuit.default_token_lifetime)
        #[arg(long)]
        expires: Option<String>,

        /// Private key file or hex
        #[arg(long, env = "LOGWARDEN_PRIVATE_KEY", hide_env_values = true)]
        key: Option<String>,

        /// Write the token to a file instead of stdout
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Verify a token's signature, expiry and revocation status
    Verify {
        /// Token string or path to a token file
        #[arg(long)]
        token: String,

        /// Public key file or hex
        #[arg(long, env = "LOGWARDEN_PUBLIC_KEY")]
        key: Option<String>,
    },
}

#[derive(Subcommand, Debug)]
enum DbCommand {
    /// Create the accounts and audit-log tables if missing
    Init,
}

#[derive(Subcommand, Debug)]
enum LogsCommand {
    /// Query the audit log and print entries as JSON lines
    Query {
        /// Admin token string or path to a token file
        #[arg(long, env = "LOGWARDEN_ADMIN_TOKEN", hide_env_values = true)]
        token: String,

        /// Inclusive lower bound (RFC 3339)
        #[arg(long)]
        from: Option<DateTime<Utc>>,

        /// Inclusive upper bound (RFC 3339)
        #[arg(long)]
        to: Option<DateTime<Utc>>,

        /// Restrict to entries by this user; repeatable
        #[arg(long = "user-id")]
        user_ids: Vec<i32>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = LogwardenConfig::load(cli.config.as_deref()).context("failed to load configuration")?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.logging.level)),
        )
        .with_writer(std::io::stderr)
        .init();

    match cli.cmd {
        Command::Keys { cmd } => match cmd {
            KeysCommand::Generate { output } => commands::keys::generate(output)?,
        },

        Command::Token { cmd } => match cmd {
            TokenCommand::Mint {
                user_id,
                expires,
                key,
                output,
            } => commands::token::mint(&config.biscuit, key, user_id, expires, output)?,
            TokenCommand::Verify { token, key } => {
                commands::token::verify(&config.biscuit, key, token)?
            }
        },

        Command::Db { cmd } => match cmd {
            DbCommand::Init => commands::db::init(&config.upstream).await?,
        },

        Command::Logs { cmd } => match cmd {
            LogsCommand::Query {
                token,
                from,
                to,
                user_ids,
            } => commands::logs::query(&config, token, from, to, user_ids).await?,
        },
    }

    Ok(())
}
