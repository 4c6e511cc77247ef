//! Clementine CLI - Database migrations and management tools.
//!
//! # Usage
//!
//! ```bash
//! # Create the schema (idempotent)
//! clem-cli migrate
//!
//! # Seed reference data on an empty database
//! clem-cli seed
//!
//! # Create (or promote) an admin user
//! clem-cli admin create -e admin@example.com -n "Admin Name" -p "a strong password"
//! ```
//!
//! # Commands
//!
//! - `migrate` - Run the idempotent schema bootstrap
//! - `seed` - Seed reference data (no-op when users already exist)
//! - `admin create` - Create or promote an admin user

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "clem-cli")]
#[command(author, version, about = "Clementine CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the idempotent schema bootstrap
    Migrate,
    /// Seed reference data on an empty database
    Seed,
    /// Manage admin users
    Admin {
        #[command(subcommand)]
        action: AdminAction,
    },
}

#[derive(Subcommand)]
enum AdminAction {
    /// Create a new admin user, or promote an existing one
    Create {
        /// Admin email address
        #[arg(short, long)]
        email: String,

        /// Admin display name
        #[arg(short, long)]
        name: String,

        /// Admin password
        #[arg(short, long)]
        password: String,
    },
}

#[tokio::main]
async fn main() {
    // Initialize tracing
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
        Commands::Migrate => commands::migrate::run().await?,
        Commands::Seed => commands::seed::run().await?,
        Commands::Admin { action } => match action {
            AdminAction::Create {
                email,
                name,
                password,
            } => {
                commands::admin::create_user(&email, &name, &password).await?;
            }
        },
    }
    Ok(())
}
