//! CLI administration tool for tempus-fugit.
//!
//! Lets an operator exercise the OpenAir login exchange without a browser
//! and see exactly why a login fails, which the web UI deliberately hides.
//!
//! # Usage
//!
//! ```bash
//! # Check credentials against the accounting service (prompts for the password)
//! cargo run --bin admin -- auth check --user alice@example.com
//!
//! # Print the request document that a login would send
//! cargo run --bin admin -- request render --user alice@example.com
//!
//! # Show the effective OpenAir configuration
//! cargo run --bin admin -- config show
//! ```
//!
//! # Environment Variables
//!
//! - `OPENAIR_API_KEY` (required): OpenAir application key
//! - Other `OPENAIR_*` variables as documented in [`tempus_fugit::config`]

use tempus_fugit::application::services::AuthService;
use tempus_fugit::config::{OpenAirConfig, mask_secret};
use tempus_fugit::domain::entities::Credentials;
use tempus_fugit::domain::gateway::{AuthOutcome, GatewayError};
use tempus_fugit::infrastructure::HttpTransport;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use dialoguer::{Input, Password};
use std::sync::Arc;

/// Password placeholder used when printing request documents.
const MASKED_PASSWORD: &str = "********";

/// CLI tool for operating tempus-fugit.
#[derive(Parser)]
#[command(name = "admin")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Top-level command groups.
#[derive(Subcommand)]
enum Commands {
    /// Check credentials against the accounting service
    Auth {
        #[command(subcommand)]
        action: AuthAction,
    },

    /// Inspect request documents
    Request {
        #[command(subcommand)]
        action: RequestAction,
    },

    /// Configuration tools
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Authentication subcommands.
#[derive(Subcommand)]
enum AuthAction {
    /// Run one login exchange and print the detailed outcome
    Check {
        /// Username (email) to check; prompted for when omitted
        #[arg(short, long)]
        user: Option<String>,

        /// Company identifier (defaults to OPENAIR_COMPANY)
        #[arg(short, long)]
        company: Option<String>,
    },
}

/// Request document subcommands.
#[derive(Subcommand)]
enum RequestAction {
    /// Print the request document with the password masked
    Render {
        /// Username (email) to place in the document
        #[arg(short, long)]
        user: String,

        /// Company identifier (defaults to OPENAIR_COMPANY)
        #[arg(short, long)]
        company: Option<String>,
    },
}

/// Configuration subcommands.
#[derive(Subcommand)]
enum ConfigAction {
    /// Show the OpenAir configuration with secrets masked
    Show,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let openair = OpenAirConfig::from_env().context("Failed to load OpenAir configuration")?;
    openair.validate()?;

    match cli.command {
        Commands::Auth { action } => handle_auth_action(action, &openair).await?,
        Commands::Request { action } => handle_request_action(action, &openair)?,
        Commands::Config { action } => handle_config_action(action, &openair),
    }

    Ok(())
}

/// Builds the authentication service from configuration.
fn build_service(openair: &OpenAirConfig) -> Result<AuthService> {
    let transport = HttpTransport::new(openair.endpoint_url()?, openair.timeout())
        .context("Failed to build accounting service client")?;

    Ok(AuthService::new(
        Arc::new(transport),
        openair.application(),
        openair.task_query(),
    ))
}

/// Dispatches authentication commands.
async fn handle_auth_action(action: AuthAction, openair: &OpenAirConfig) -> Result<()> {
    match action {
        AuthAction::Check { user, company } => check_credentials(openair, user, company).await,
    }
}

/// Runs one login exchange with interactive prompts.
///
/// # Flow
///
/// 1. Prompt for the username (or use provided)
/// 2. Prompt for the password (never echoed)
/// 3. Send a single request to the accounting service
/// 4. Print the outcome, including the error class on failure
async fn check_credentials(
    openair: &OpenAirConfig,
    user: Option<String>,
    company: Option<String>,
) -> Result<()> {
    println!("{}", "🔐 Check OpenAir credentials".bright_blue().bold());
    println!();

    let username = match user {
        Some(u) => u,
        None => Input::<String>::new()
            .with_prompt("Username (email)")
            .interact_text()?,
    };

    let password = Password::new().with_prompt("Password").interact()?;
    let company = company.unwrap_or_else(|| openair.company.clone());

    let credentials = Credentials::new(username, password, company);
    let service = build_service(openair)?;

    println!("  Endpoint: {}", openair.endpoint.cyan());
    println!("  Company:  {}", credentials.company.cyan());
    println!("  User:     {}", credentials.username.cyan());
    println!();

    match service.authenticate(&credentials).await {
        Ok(AuthOutcome::Authorized) => {
            println!("{}", "✅ Authorized".green().bold());
            println!(
                "  Session display name would be: {}",
                credentials.display_name().bright_white()
            );
        }
        Ok(AuthOutcome::Unauthorized { status }) => {
            println!("{}", "❌ Unauthorized".red().bold());
            match status {
                Some(status) => println!("  Auth status: {}", status.yellow()),
                None => println!("  {}", "Reply carried no Auth status".yellow()),
            }
        }
        Err(e) => {
            println!("{}", "⚠️  Exchange failed".yellow().bold());
            println!("  {}", describe_error(&e));
        }
    }

    Ok(())
}

/// Explains a gateway error for an operator.
fn describe_error(e: &GatewayError) -> String {
    match e {
        GatewayError::Encode(msg) => format!("Could not encode request: {}", msg),
        GatewayError::Transport(msg) => format!("Network failure: {}", msg),
        GatewayError::HttpStatus(code) => format!("Endpoint answered HTTP {}", code),
        GatewayError::Parse(msg) => format!("Reply was not valid XML: {}", msg),
    }
}

/// Dispatches request document commands.
fn handle_request_action(action: RequestAction, openair: &OpenAirConfig) -> Result<()> {
    match action {
        RequestAction::Render { user, company } => {
            let company = company.unwrap_or_else(|| openair.company.clone());
            let credentials = Credentials::new(user, MASKED_PASSWORD, company);

            let mut application = openair.application();
            application.api_key = mask_secret(&application.api_key);

            let query = openair.task_query();
            let document = tempus_fugit::domain::openair::RequestDocument::new(
                &application,
                &credentials,
                vec![query.to_read_command()],
            );

            let xml = document
                .to_xml()
                .map_err(|e| anyhow::anyhow!("Failed to render request: {}", e))?;

            println!("{}", xml);
        }
    }

    Ok(())
}

/// Dispatches configuration commands.
fn handle_config_action(action: ConfigAction, openair: &OpenAirConfig) {
    match action {
        ConfigAction::Show => {
            println!("{}", "⚙️  OpenAir configuration".bright_blue().bold());
            println!();
            println!("  Endpoint:       {}", openair.endpoint.cyan());
            println!("  API key:        {}", mask_secret(&openair.api_key).yellow());
            println!("  Company:        {}", openair.company.cyan());
            println!(
                "  Client:         {} {} ({})",
                openair.client.cyan(),
                openair.client_version,
                openair.namespace
            );
            println!("  Timeout:        {}s", openair.timeout_secs);
            println!("  Since:          {}", openair.since);
            println!("  Project ID:     {}", openair.project_id);
            println!("  Read limit:     {}", openair.read_limit);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_describe_error() {
        assert_eq!(
            describe_error(&GatewayError::HttpStatus(503)),
            "Endpoint answered HTTP 503"
        );
        assert!(describe_error(&GatewayError::Transport("dns".into())).contains("dns"));
    }

    #[test]
    fn test_cli_parses_auth_check() {
        let cli = Cli::try_parse_from(["admin", "auth", "check", "--user", "alice@example.com"])
            .unwrap();

        match cli.command {
            Commands::Auth {
                action: AuthAction::Check { user, company },
            } => {
                assert_eq!(user.as_deref(), Some("alice@example.com"));
                assert!(company.is_none());
            }
            _ => panic!("expected auth check"),
        }
    }

    #[test]
    fn test_cli_requires_user_for_render() {
        assert!(Cli::try_parse_from(["admin", "request", "render"]).is_err());
    }
}
