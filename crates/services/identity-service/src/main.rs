//! Identity Service - operator CLI for token inspection.

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "identity-service")]
#[command(about = "Identity credential service")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate an access token and print its claims
    VerifyToken {
        /// Token, with or without the "Bearer " prefix
        token: String,
    },
    /// Exchange a refresh token for a new token pair
    RefreshToken { token: String },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::VerifyToken { token } => identity_service::verify_token(&token)?,
        Commands::RefreshToken { token } => identity_service::refresh_token(&token)?,
    }

    Ok(())
}
