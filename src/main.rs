//! turbo-target-tools - Turbonomic REST automation
//!
//! Rotates the access keys of AWS account targets and lists current actions,
//! either for the realtime market or per discovered cloud account.

mod cli;
mod config;
mod error;
mod output;
mod turbo;

use std::io::Write;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::cli::{Cli, Commands};
use crate::turbo::{AccountPaging, AwsKeys, TurboClient};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing; stdout is reserved for results
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "turbo_target_tools=info".into()),
        )
        .init();

    let Cli {
        connection,
        config: config_path,
        command,
    } = Cli::parse();

    // Load configuration, then let flags and environment override it
    let mut config = config::Config::load(config_path.as_deref())?;
    connection.apply(&mut config);
    tracing::debug!("Configuration loaded: {:?}", config);

    let client = TurboClient::new(&config.turbo.connection()?)?;
    tracing::info!("Using Turbonomic instance {}", client.base_url());

    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    match command {
        Commands::UpdateAwsCreds {
            account_id,
            access_key,
            secret_key,
        } => {
            let keys = AwsKeys {
                access_key,
                secret_key,
            };
            let result = client.apply_credentials(&account_id, &keys).await.map_err(|e| {
                tracing::error!("Credential update for account {} failed ({})", account_id, e.kind());
                e
            })?;
            serde_json::to_writer_pretty(&mut out, &result)?;
            writeln!(out)?;
        }
        Commands::ListActions {
            market,
            class_name,
            format,
        } => {
            let market = market.unwrap_or(config.actions.market_name);
            let class_name = class_name.unwrap_or(config.actions.class_name);
            let actions = client.list_actions(&market, &class_name).await?;
            output::write_action_summaries(&mut out, format, &actions)?;
        }
        Commands::AccountActions {
            page_size,
            max_consecutive_skips,
            format,
            per_account,
            output_dir,
        } => {
            let paging = AccountPaging {
                page_size: page_size.unwrap_or(config.actions.page_size),
                max_consecutive_skips: max_consecutive_skips
                    .unwrap_or(config.actions.max_consecutive_skips),
            };
            let report = client.account_actions(paging).await?;
            if per_account {
                let stamp = chrono::Utc::now().timestamp();
                for path in output::write_account_files(&output_dir, format, &report, stamp)? {
                    writeln!(out, "{}", path.display())?;
                }
            } else {
                output::write_account_actions(&mut out, format, &report)?;
            }
        }
    }

    out.flush()?;
    Ok(())
}
