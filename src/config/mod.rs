//! Configuration module

use std::fmt;
use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::error::{TurboError, TurboResult};

#[derive(Debug, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub turbo: TurboConfig,
    #[serde(default)]
    pub actions: ActionsConfig,
}

/// Management system connection settings. Flags and the Lambda-style
/// environment variables override whatever is loaded here.
#[derive(Clone, Deserialize)]
pub struct TurboConfig {
    #[serde(default)]
    pub instance: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default)]
    pub accept_invalid_certs: bool,
}

impl Default for TurboConfig {
    fn default() -> Self {
        Self {
            instance: None,
            username: None,
            password: None,
            timeout_secs: default_timeout_secs(),
            accept_invalid_certs: false,
        }
    }
}

impl fmt::Debug for TurboConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TurboConfig")
            .field("instance", &self.instance)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "***"))
            .field("timeout_secs", &self.timeout_secs)
            .field("accept_invalid_certs", &self.accept_invalid_certs)
            .finish()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ActionsConfig {
    #[serde(default = "default_market_name")]
    pub market_name: String,
    #[serde(default = "default_class_name")]
    pub class_name: String,
    #[serde(default = "default_page_size")]
    pub page_size: u32,
    #[serde(default = "default_max_consecutive_skips")]
    pub max_consecutive_skips: u32,
}

impl Default for ActionsConfig {
    fn default() -> Self {
        Self {
            market_name: default_market_name(),
            class_name: default_class_name(),
            page_size: default_page_size(),
            max_consecutive_skips: default_max_consecutive_skips(),
        }
    }
}

fn default_timeout_secs() -> u64 {
    60
}

fn default_market_name() -> String {
    "Market".to_string()
}

fn default_class_name() -> String {
    "VirtualMachine".to_string()
}

fn default_page_size() -> u32 {
    20
}

fn default_max_consecutive_skips() -> u32 {
    5
}

/// Username/password pair for the management system
#[derive(Clone)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

/// Fully resolved settings for one client instance
#[derive(Debug, Clone)]
pub struct ConnectionConfig {
    pub base_url: String,
    pub credentials: Credentials,
    pub timeout: Duration,
    pub accept_invalid_certs: bool,
}

impl ConnectionConfig {
    pub fn new(instance: &str, credentials: Credentials) -> TurboResult<Self> {
        Ok(Self {
            base_url: endpoint_base_url(instance)?,
            credentials,
            timeout: Duration::from_secs(default_timeout_secs()),
            accept_invalid_certs: false,
        })
    }
}

impl TurboConfig {
    pub fn connection(&self) -> TurboResult<ConnectionConfig> {
        let instance = required(&self.instance, "instance")?;
        let username = required(&self.username, "username")?;
        let password = required(&self.password, "password")?;

        if self.timeout_secs == 0 {
            return Err(TurboError::Config("timeout_secs must be positive".to_string()));
        }

        let mut connection = ConnectionConfig::new(
            instance,
            Credentials {
                username: username.to_string(),
                password: password.to_string(),
            },
        )?;
        connection.timeout = Duration::from_secs(self.timeout_secs);
        connection.accept_invalid_certs = self.accept_invalid_certs;
        Ok(connection)
    }
}

fn required<'a>(value: &'a Option<String>, name: &str) -> TurboResult<&'a str> {
    match value.as_deref().map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(TurboError::Config(format!("{} is not set", name))),
    }
}

/// Turn an instance name into the API base URL.
///
/// A bare host or IP becomes `https://{host}`. Values that already carry an
/// `http://` or `https://` scheme are kept, minus any trailing slash.
pub fn endpoint_base_url(instance: &str) -> TurboResult<String> {
    let instance = instance.trim().trim_end_matches('/');
    if instance.is_empty() {
        return Err(TurboError::Config("instance is empty".to_string()));
    }

    let candidate = if instance.starts_with("http://") || instance.starts_with("https://") {
        instance.to_string()
    } else {
        format!("https://{}", instance)
    };

    let parsed = url::Url::parse(&candidate)
        .map_err(|e| TurboError::Config(format!("Invalid instance '{}': {}", instance, e)))?;
    if parsed.host_str().is_none() {
        return Err(TurboError::Config(format!("Instance '{}' has no host", instance)));
    }

    Ok(candidate)
}

impl Config {
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let file = match path {
            Some(p) => config::File::from(p).required(true),
            None => config::File::with_name("config/default").required(false),
        };

        let settings = config::Config::builder()
            .add_source(file)
            .add_source(config::Environment::with_prefix("TURBOTOOLS").separator("__"))
            .build()?;

        let config: Config = settings.try_deserialize()?;
        Ok(config)
    }
}
