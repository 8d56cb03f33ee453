//! E-Shop CLI - operational tools for the storefront.
//!
//! # Usage
//!
//! ```bash
//! # Check that the upstream REST API is reachable
//! eshop-cli health
//!
//! # Query the catalog with the storefront's filters
//! eshop-cli products --category Apparel --sort newest
//!
//! # Decode a session token and show its expiry
//! eshop-cli token inspect eyJhbGciOi...
//! ```
//!
//! # Commands
//!
//! - `health` - Check REST API reachability
//! - `products` - List products with category, search and sort applied
//! - `token inspect` - Decode a token payload

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "eshop-cli")]
#[command(author, version, about = "E-Shop storefront CLI tools")]
struct Cli {
    /// REST API origin, overriding `ESHOP_API_BASE_URL`
    #[arg(long, global = true)]
    api_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check that the REST API is reachable
    Health,
    /// List products as the catalog page would
    Products {
        /// Only show this category
        #[arg(short, long)]
        category: Option<String>,

        /// Case-insensitive name filter
        #[arg(short, long)]
        search: Option<String>,

        /// `default`, `price-low-to-high`, `price-high-to-low` or `newest`
        #[arg(long)]
        sort: Option<String>,
    },
    /// Inspect session tokens
    Token {
        #[command(subcommand)]
        action: TokenAction,
    },
}

#[derive(Subcommand)]
enum TokenAction {
    /// Decode a token and report its subject and expiry
    Inspect {
        /// The token as returned in `x-auth-token`
        token: String,
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
    let api_url = cli.api_url.as_deref();
    match cli.command {
        Commands::Health => commands::api::health(api_url).await?,
        Commands::Products {
            category,
            search,
            sort,
        } => {
            let filters = commands::api::ProductFilters {
                category,
                search,
                sort,
            };
            commands::api::products(api_url, &filters).await?;
        }
        Commands::Token { action } => match action {
            TokenAction::Inspect { token } => commands::token::inspect(&token)?,
        },
    }
    Ok(())
}
