mod browse;
mod pins;
mod session_file;

use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use vitrine_core::AppConfig;
use vitrine_engine::EngineError;
use vitrine_gateway::{CatalogClient, GatewayError};

use crate::pins::PinsCommands;

#[derive(Debug, Parser)]
#[command(name = "vitrine")]
#[command(about = "Collection merchandising back-office")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Log in and store the session for later commands
    Login {
        /// Defaults to `VITRINE_USERNAME`
        #[arg(long)]
        username: Option<String>,
        /// Defaults to `VITRINE_PASSWORD`
        #[arg(long)]
        password: Option<String>,
    },
    /// Forget the stored session
    Logout,
    /// List collections
    Collections,
    /// List one page of a collection's products
    Products {
        collection_id: i64,
        /// 1-based page number
        #[arg(long, default_value = "1")]
        page: u32,
        /// Filter criterion as `id=value`; repeatable
        #[arg(long = "filter", value_name = "ID=VALUE")]
        filters: Vec<String>,
        #[command(flatten)]
        draft: browse::DraftArgs,
    },
    /// List the filters available for a collection
    Filters { collection_id: i64 },
    /// Show or edit pinned products
    Pins {
        #[command(subcommand)]
        command: PinsCommands,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = vitrine_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let Some(command) = cli.command else {
        println!("vitrine ready ({} against {})", config.env, config.api_base_url);
        return Ok(());
    };

    let client = Arc::new(CatalogClient::from_config(&config)?);
    let restored = session_file::load(&config.session_path, config.session_max_age_secs).await?;
    client.set_session(restored.clone()).await;

    let outcome = match command {
        Commands::Login { username, password } => {
            run_login(&config, &client, username, password).await
        }
        Commands::Logout => {
            client.logout().await;
            println!("logged out");
            Ok(())
        }
        Commands::Collections => browse::run_collections(&client).await,
        Commands::Products {
            collection_id,
            page,
            filters,
            draft,
        } => {
            browse::run_products(&config, &client, collection_id, page, &filters, &draft).await
        }
        Commands::Filters { collection_id } => browse::run_filters(&client, collection_id).await,
        Commands::Pins { command } => pins::run(&config, &client, command).await,
    };

    // Refresh or logout may have replaced the session during the command.
    let current = client.session().await;
    if current != restored {
        session_file::store(&config.session_path, current.as_ref()).await?;
    }

    outcome.map_err(with_login_hint)
}

async fn run_login(
    config: &AppConfig,
    client: &CatalogClient,
    username: Option<String>,
    password: Option<String>,
) -> anyhow::Result<()> {
    let username = username
        .or_else(|| config.default_username.clone())
        .ok_or_else(|| {
            anyhow::anyhow!("no username given; pass --username or set VITRINE_USERNAME")
        })?;
    let password = password
        .or_else(|| config.default_password.clone())
        .ok_or_else(|| {
            anyhow::anyhow!("no password given; pass --password or set VITRINE_PASSWORD")
        })?;

    client.login(&username, &password).await?;
    println!("logged in as {username}");
    Ok(())
}

/// Points the operator at `login` when the failure means the session is gone.
fn with_login_hint(err: anyhow::Error) -> anyhow::Error {
    let requires_login = err
        .downcast_ref::<GatewayError>()
        .is_some_and(GatewayError::requires_login)
        || err
            .downcast_ref::<EngineError>()
            .is_some_and(EngineError::requires_login);
    if requires_login {
        err.context("session expired or missing; run `vitrine login`")
    } else {
        err
    }
}
