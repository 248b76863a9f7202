use std::time::Duration;

use clap::Parser;
use reqwest::Url;

use crate::error::ConfigError;

pub const DEFAULT_BASE_URL: &str = "http://localhost:9001/api";

/// Command line arguments, each with an environment fallback.
#[derive(Debug, Clone, Parser)]
#[command(name = "employee_registry", about = "Register, browse, edit and delete employees")]
pub struct Args {
    /// Base URL of the employee REST API
    #[arg(long, env = "EMPLOYEE_API_URL", default_value = DEFAULT_BASE_URL)]
    pub base_url: String,

    /// Request timeout in seconds
    #[arg(long, env = "EMPLOYEE_API_TIMEOUT", default_value_t = 30)]
    pub timeout_secs: u64,

    /// Capacity of the registry service request channel
    #[arg(long, default_value_t = 32)]
    pub buffer_size: usize,

    /// Log level used when RUST_LOG is not set
    #[arg(long, default_value = "info")]
    pub log_level: String,
}

/// Validated runtime configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct RegistryConfig {
    pub base_url: Url,
    pub timeout: Duration,
    pub buffer_size: usize,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            base_url: Url::parse(DEFAULT_BASE_URL).expect("default base URL is valid"),
            timeout: Duration::from_secs(30),
            buffer_size: 32,
        }
    }
}

impl TryFrom<&Args> for RegistryConfig {
    type Error = ConfigError;

    fn try_from(args: &Args) -> Result<Self, Self::Error> {
        let invalid = |reason: &str| ConfigError::InvalidBaseUrl {
            url: args.base_url.clone(),
            reason: reason.to_string(),
        };

        let base_url = Url::parse(&args.base_url).map_err(|e| invalid(&e.to_string()))?;
        if !matches!(base_url.scheme(), "http" | "https") {
            return Err(invalid("scheme must be http or https"));
        }
        if base_url.cannot_be_a_base() {
            return Err(invalid("cannot be used as a base URL"));
        }
        if args.timeout_secs == 0 {
            return Err(ConfigError::Zero("timeout"));
        }
        if args.buffer_size == 0 {
            return Err(ConfigError::Zero("buffer size"));
        }

        Ok(Self {
            base_url,
            timeout: Duration::from_secs(args.timeout_secs),
            buffer_size: args.buffer_size,
        })
    }
}
