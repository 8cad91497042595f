//! Plooma CLI - database migrations and management tools.
//!
//! # Usage
//!
//! ```bash
//! # Run database migrations
//! plooma migrate
//!
//! # Create a user
//! plooma user create -e admin@example.com -n "Admin Name" -r admin -p secret123
//!
//! # List users
//! plooma user list
//!
//! # Seed demo users, projects and tasks
//! plooma seed --password password123
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "plooma")]
#[command(author, version, about = "Plooma CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Manage users
    User {
        #[command(subcommand)]
        action: UserAction,
    },
    /// Seed the database with demo data
    Seed {
        /// Password given to every demo account
        #[arg(short, long, default_value = "password123")]
        password: String,
    },
}

#[derive(Subcommand)]
enum UserAction {
    /// Create a new user
    Create {
        /// Email address
        #[arg(short, long)]
        email: String,

        /// Full name
        #[arg(short, long)]
        name: String,

        /// Role (`admin` or `member`)
        #[arg(short, long, default_value = "member")]
        role: String,

        /// Initial password (at least 6 characters)
        #[arg(short, long)]
        password: String,
    },
    /// List all users
    List,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Migrate => commands::migrate::run().await?,
        Commands::User { action } => match action {
            UserAction::Create {
                email,
                name,
                role,
                password,
            } => {
                commands::user::create(&email, &name, &role, &password).await?;
            }
            UserAction::List => commands::user::list().await?,
        },
        Commands::Seed { password } => commands::seed::demo(&password).await?,
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_user_create_defaults_to_member() {
        let cli = Cli::try_parse_from([
            "plooma", "user", "create", "-e", "a@b.co", "-n", "Ann", "-p", "secret1",
        ])
        .unwrap_or_else(|e| panic!("{e}"));
        match cli.command {
            Commands::User {
                action: UserAction::Create { role, .. },
            } => assert_eq!(role, "member"),
            _ => panic!("expected user create"),
        }
    }
}
