//! ZinoShop CLI - admin accounts and catalog seeding.
//!
//! # Usage
//!
//! ```bash
//! # Create (or promote) an admin account
//! zs-cli admin create -e admin@zinoshop.example -p 'S3cure-pass' -n "Store Admin"
//!
//! # Seed the product catalog from a YAML fixture
//! zs-cli seed products -f fixtures/products.yaml
//! ```
//!
//! Both commands talk to the same Firestore project as the API server,
//! configured through the `FIRESTORE_*` environment variables.

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "zs-cli")]
#[command(author, version, about = "ZinoShop CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage admin accounts
    Admin {
        #[command(subcommand)]
        action: AdminAction,
    },
    /// Seed store data
    Seed {
        #[command(subcommand)]
        target: SeedTarget,
    },
}

#[derive(Subcommand)]
enum AdminAction {
    /// Create a new admin account, or promote an existing user
    Create {
        /// Admin email address
        #[arg(short, long)]
        email: String,

        /// Initial password (ignored when promoting an existing user)
        #[arg(short, long)]
        password: String,

        /// Display name
        #[arg(short, long, default_value = "Store Admin")]
        name: String,
    },
}

#[derive(Subcommand)]
enum SeedTarget {
    /// Insert products from a YAML fixture file
    Products {
        /// Path to the fixture file
        #[arg(short, long)]
        file: String,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Admin { action } => match action {
            AdminAction::Create {
                email,
                password,
                name,
            } => {
                commands::admin::create(&email, &password, &name).await?;
            }
        },
        Commands::Seed { target } => match target {
            SeedTarget::Products { file } => {
                commands::seed::products(&file).await?;
            }
        },
    }
    Ok(())
}
