//! Lummi CLI - Operator tools that talk to Supabase with the service-role key.
//!
//! # Usage
//!
//! ```bash
//! # Print the settings the landing page would use
//! lummi settings show
//!
//! # Change one setting (validated like the admin form)
//! lummi settings set capacity_remaining 3
//!
//! # Print dashboard aggregates
//! lummi dashboard --days 30
//!
//! # Rewrite legacy rows, printing the patches first
//! lummi migrate portfolio-fields --dry-run
//! lummi migrate next-window
//! ```
//!
//! # Environment Variables
//!
//! - `SUPABASE_URL` - Project URL
//! - `SUPABASE_SERVICE_ROLE_KEY` - Service-role key (bypasses row level security)

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "lummi")]
#[command(author, version, about = "Lummi operator tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Read or change site settings
    Settings {
        #[command(subcommand)]
        action: SettingsAction,
    },
    /// Print the admin dashboard summary
    Dashboard {
        /// Window in days (7 or 30; anything else means 7)
        #[arg(short, long, default_value_t = 7)]
        days: i64,
    },
    /// Rewrite legacy row shapes into the canonical schema
    Migrate {
        #[command(subcommand)]
        target: MigrateTarget,

        /// Print the patches without writing them
        #[arg(long, global = true)]
        dry_run: bool,
    },
}

#[derive(Subcommand)]
enum SettingsAction {
    /// Print the resolved settings
    Show,
    /// Validate and store one setting
    Set {
        /// `whatsapp_number`, `capacity_monthly`, `capacity_remaining` or `next_window`
        key: String,
        value: String,
    },
}

#[derive(Subcommand)]
enum MigrateTarget {
    /// Fill `title`/`cover_url` from `name`/`image_url`/`thumbnail_url`
    PortfolioFields,
    /// Turn `{ "date": "YYYY-MM-DD" }` into the plain date string
    NextWindow,
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "lummi_cli=info,lummi_supabase=info".into()),
        )
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), commands::CliError> {
    let client = commands::service_client()?;

    match cli.command {
        Commands::Settings { action } => match action {
            SettingsAction::Show => commands::settings::show(&client).await?,
            SettingsAction::Set { key, value } => {
                commands::settings::set(&client, &key, &value).await?;
            }
        },
        Commands::Dashboard { days } => commands::dashboard::summary(&client, days).await?,
        Commands::Migrate { target, dry_run } => match target {
            MigrateTarget::PortfolioFields => {
                commands::migrate::portfolio_fields(&client, dry_run).await?;
            }
            MigrateTarget::NextWindow => {
                commands::migrate::next_window(&client, dry_run).await?;
            }
        },
    }
    Ok(())
}
