use std::{future::Future, pin::Pin, process::ExitCode};

use anyhow::{anyhow, Result};
use clap::{Args, Parser, Subcommand};
use log::*;
use vintrade_engine::{
    events::{EventHandlers, EventHooks},
    ReconciliationApi,
    SqliteDatabase,
};

mod config;
mod formatting;

use config::CliConfig;
use formatting::format_report;

#[derive(Parser, Debug)]
#[command(version = "0.1.0", about = "Reconcile customer purchase orders against supplier quotes")]
pub struct Arguments {
    /// Overrides VT_DATABASE_URL
    #[arg(short = 'd', long = "database")]
    database_url: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    #[clap(name = "migrate", about = "Create the database if it does not exist and bring its schema up to date")]
    Migrate,
    #[clap(name = "reconcile", about = "Match an order's lines to supplier quotes and report the order's profit")]
    Reconcile(ReconcileParams),
}

#[derive(Debug, Args)]
pub struct ReconcileParams {
    /// The customer order to reconcile
    order_id: i64,
    /// Print the report as JSON instead of a table
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    env_logger::init();
    let args = Arguments::parse();
    let mut config = CliConfig::from_env_or_default();
    if let Some(url) = args.database_url {
        config.database_url = url;
    }
    let result = match args.command {
        Command::Migrate => migrate(&config).await,
        Command::Reconcile(params) => reconcile(config, params).await,
    };
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{e:#}");
            ExitCode::FAILURE
        },
    }
}

async fn migrate(config: &CliConfig) -> Result<()> {
    SqliteDatabase::create_database_if_missing(&config.database_url).await?;
    let db = SqliteDatabase::new_with_url(&config.database_url, config.max_connections).await?;
    db.run_migrations().await?;
    println!("Database at {} is up to date", db.url());
    db.close().await;
    Ok(())
}

fn notification_hooks(config: &CliConfig) -> EventHooks {
    let mut hooks = EventHooks::default();
    if config.log_notifications {
        hooks.on_order_reconciled(|ev| {
            Box::pin(async move {
                info!(
                    "📬️ Order {} reconciled. {}/{} lines matched, profit {}",
                    ev.order_id, ev.summary.matched_items, ev.summary.total_items, ev.summary.total_profit_usd
                );
            }) as Pin<Box<dyn Future<Output = ()> + Send>>
        });
    }
    hooks
}

async fn reconcile(config: CliConfig, params: ReconcileParams) -> Result<()> {
    let db = SqliteDatabase::new_with_url(&config.database_url, config.max_connections).await?;
    let handlers = EventHandlers::new(config.event_buffer_size, notification_hooks(&config));
    let producers = handlers.producers();
    let api = ReconciliationApi::new(db.clone(), producers).with_options(config.options);
    let result = api.reconcile_order(params.order_id).await;
    // Dropping the API closes the notification channels, so the handlers finish what was published and then return.
    drop(api);
    handlers.drain().await;
    db.close().await;
    let report = result.map_err(|e| {
        if e.is_retryable() {
            anyhow!("{e} (retryable)")
        } else {
            anyhow!(e)
        }
    })?;
    if params.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("{}", format_report(&report));
    }
    Ok(())
}
