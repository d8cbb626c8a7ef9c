use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::config::Config;
use crate::output::OutputFormat;

#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
#[clap(propagate_version = true)]
pub struct Cli {
    #[command(flatten)]
    pub connection: ConnectionArgs,
    /// Optional settings file. Defaults to `config/default.*` when present
    #[clap(long, global = true)]
    pub config: Option<PathBuf>,
    #[clap(subcommand)]
    pub command: Commands,
}

/// Connection settings. Each one overrides the config file.
#[derive(Args, Debug)]
pub struct ConnectionArgs {
    /// DNS name or IP address of the Turbonomic instance
    #[clap(long, global = true, env = "TURBOINSTANCE")]
    pub instance: Option<String>,
    /// Turbonomic user for API access
    #[clap(long, global = true, env = "TURBOUSER")]
    pub username: Option<String>,
    /// Password of the API user
    #[clap(long, global = true, env = "TURBOPASSWORD", hide_env_values = true)]
    pub password: Option<String>,
    /// Request timeout in seconds
    #[clap(long, global = true)]
    pub timeout_secs: Option<u64>,
    /// Skip TLS certificate validation. Only for instances with self-signed certificates.
    #[clap(long, global = true)]
    pub insecure: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Replace the access key pair of the AWS target behind a cloud account
    UpdateAwsCreds {
        /// The AWS account ID whose target is updated
        #[clap(long, env = "ACCOUNTID")]
        account_id: String,
        /// The new access key
        #[clap(long, env = "ACCESSKEY")]
        access_key: String,
        /// The new secret access key
        #[clap(long, env = "SECRETACCESSKEY", hide_env_values = true)]
        secret_key: String,
    },
    /// List current actions of the realtime market for one entity class
    ListActions {
        /// Display name of the market to read
        #[clap(long)]
        market: Option<String>,
        /// Only keep actions whose target has this class name
        #[clap(long)]
        class_name: Option<String>,
        #[clap(long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
    },
    /// List current actions for every discovered cloud account
    AccountActions {
        /// Number of actions requested per page
        #[clap(long)]
        page_size: Option<u32>,
        /// Consecutive unreadable items tolerated before an account is abandoned
        #[clap(long)]
        max_consecutive_skips: Option<u32>,
        #[clap(long, value_enum, default_value_t = OutputFormat::Csv)]
        format: OutputFormat,
        /// Write one file per cloud account instead of a single listing on stdout
        #[clap(long)]
        per_account: bool,
        /// Directory for the per-account files
        #[clap(long, requires = "per_account", default_value = ".")]
        output_dir: PathBuf,
    },
}

impl ConnectionArgs {
    /// Layer the flags over the loaded configuration
    pub fn apply(self, config: &mut Config) {
        if let Some(instance) = self.instance {
            config.turbo.instance = Some(instance);
        }
        if let Some(username) = self.username {
            config.turbo.username = Some(username);
        }
        if let Some(password) = self.password {
            config.turbo.password = Some(password);
        }
        if let Some(timeout_secs) = self.timeout_secs {
            config.turbo.timeout_secs = timeout_secs;
        }
        if self.insecure {
            config.turbo.accept_invalid_certs = true;
        }
    }
}
