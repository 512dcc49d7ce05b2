//! Runtime configuration.
//!
//! Values come from environment variables first and command-line flags
//! second. Parsing goes through a lookup function so tests can supply their
//! own variables without touching the process environment.

use crate::infrastructure::FirebaseConfig;
use clap::{Parser, ValueEnum};
use std::env;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_AUTH_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_EMULATOR_HOST: &str = "localhost:9099";
pub const DEFAULT_LOG_FILTER: &str = "info";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Environment {
    #[default]
    Development,
    Production,
    Testing,
}

impl Environment {
    /// Parse from string, falling back to development for anything unknown.
    pub fn from_str_or_default(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "production" | "prod" => Environment::Production,
            "testing" | "test" => Environment::Testing,
            _ => Environment::Development,
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Environment::Production)
    }

    pub fn is_development(&self) -> bool {
        matches!(self, Environment::Development)
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Production => write!(f, "production"),
            Environment::Testing => write!(f, "testing"),
        }
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("Could not determine a data directory; set GYMRAT_DATA_DIR or pass --data-dir")]
    NoDataDir,
    #[error("Invalid value for {name}: {value}")]
    InvalidValue { name: &'static str, value: String },
}

/// Terminal workout tracker.
#[derive(Debug, Parser)]
#[command(name = "gymrat", version, about)]
pub struct Cli {
    /// Directory holding the persisted partitions and the log file
    #[arg(long, value_name = "DIR")]
    pub data_dir: Option<PathBuf>,

    /// Deployment environment; production disables the local identity fallback
    #[arg(long, value_enum)]
    pub env: Option<Environment>,

    /// Never contact the hosted identity service
    #[arg(long)]
    pub offline: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub environment: Environment,
    pub data_dir: PathBuf,
    /// `None` when no API key is configured.
    pub firebase: Option<FirebaseConfig>,
    pub offline: bool,
    pub log_filter: String,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let environment = var("GYMRAT_ENV")
            .or_else(|| var("NODE_ENV"))
            .map(|v| Environment::from_str_or_default(&v))
            .unwrap_or_default();

        let data_dir = match var("GYMRAT_DATA_DIR") {
            Some(dir) => PathBuf::from(dir),
            None => dirs::data_dir().ok_or(ConfigError::NoDataDir)?.join("gymrat"),
        };

        let timeout_secs = match var("GYMRAT_AUTH_TIMEOUT_SECS") {
            Some(v) => v.trim().parse::<u64>().map_err(|_| ConfigError::InvalidValue {
                name: "GYMRAT_AUTH_TIMEOUT_SECS",
                value: v.clone(),
            })?,
            None => DEFAULT_AUTH_TIMEOUT_SECS,
        };

        let firebase = var("GYMRAT_FIREBASE_API_KEY").map(|key| {
            let mut config = FirebaseConfig::new(key, Duration::from_secs(timeout_secs));
            if let Some(url) = var("GYMRAT_FIREBASE_AUTH_URL") {
                config.auth_url = url.trim_end_matches('/').to_string();
            }
            // Emulators are a development convenience only.
            let emulators = var("GYMRAT_USE_FIREBASE_EMULATORS").is_some_and(|v| v == "true");
            if emulators && environment.is_development() {
                let host = var("GYMRAT_FIREBASE_EMULATOR_HOST");
                config = config.with_emulator(host.as_deref().unwrap_or(DEFAULT_EMULATOR_HOST));
            }
            config
        });

        Ok(Self {
            environment,
            data_dir,
            firebase,
            offline: false,
            log_filter: var("RUST_LOG").unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string()),
        })
    }

    /// Command-line flags win over environment variables.
    pub fn with_cli(mut self, cli: &Cli) -> Self {
        if let Some(dir) = &cli.data_dir {
            self.data_dir = dir.clone();
        }
        if let Some(environment) = cli.env {
            self.environment = environment;
        }
        self.offline |= cli.offline;
        self
    }

    pub fn log_path(&self) -> PathBuf {
        self.data_dir.join("gymrat.log")
    }
}
