// Configuration module entry point
// Layers defaults, config file, environment and command line into one immutable Config

mod state;
mod types;

use std::net::{SocketAddr, ToSocketAddrs};
use thiserror::Error;

// Re-export public types
pub use state::AppState;
pub use types::{Config, ScannerConfig};
#[cfg(test)]
pub use types::{HttpConfig, LoggingConfig, ServerConfig};

/// Prefix for environment overrides, e.g. `SCANSERVER_SCANNER__DEVICE`
const ENV_PREFIX: &str = "SCANSERVER";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error(transparent)]
    Load(#[from] config::ConfigError),

    #[error("You must specify a device to scan from.")]
    MissingDevice,

    #[error("server.workers must be at least 1")]
    InvalidWorkers,

    #[error("Invalid address '{addr}': {source}")]
    InvalidAddress {
        addr: String,
        #[source]
        source: std::io::Error,
    },
}

/// Values supplied on the command line; they win over file and environment
#[derive(Debug, Default, Clone)]
pub struct Overrides {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub device: Option<String>,
    pub program: Option<String>,
    pub timeout_secs: Option<u64>,
}

impl Config {
    /// Load configuration from specified file path (without extension)
    ///
    /// The file is optional; missing keys fall back to the defaults below.
    pub fn load_from(config_path: &str, overrides: &Overrides) -> Result<Self, ConfigError> {
        let settings = config::Config::builder()
            .set_default("server.host", "")?
            .set_default("server.port", 8080)?
            .set_default("scanner.device", "")?
            .set_default("scanner.program", "scanimage")?
            .set_default("scanner.timeout_secs", 0)?
            .set_default("http.server_name", "scan-server")?
            .set_default("http.max_body_size", 10_485_760)? // 10MB
            .set_default("http.keep_alive", true)?
            .set_default("logging.level", "info")?
            .set_default("logging.access_log", true)?
            .set_default("logging.access_log_format", "combined")?
            .add_source(config::File::with_name(config_path).required(false))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__"),
            )
            .set_override_option("server.host", overrides.host.clone())?
            .set_override_option("server.port", overrides.port.map(i64::from))?
            .set_override_option("scanner.device", overrides.device.clone())?
            .set_override_option("scanner.program", overrides.program.clone())?
            .set_override_option(
                "scanner.timeout_secs",
                overrides
                    .timeout_secs
                    .map(|t| i64::try_from(t).unwrap_or(i64::MAX)),
            )?
            .build()?;

        let cfg: Self = settings.try_deserialize()?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Reject configurations the server cannot start with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.scanner.device.is_empty() {
            return Err(ConfigError::MissingDevice);
        }
        if self.server.workers == Some(0) {
            return Err(ConfigError::InvalidWorkers);
        }
        Ok(())
    }

    /// Resolve the listen address; an empty host binds all interfaces
    ///
    /// The IPv6 wildcard is used so the listener can accept both families.
    pub fn get_socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        let host = if self.server.host.is_empty() {
            "::"
        } else {
            self.server.host.as_str()
        };
        let addr = format!("{host}:{}", self.server.port);

        (host, self.server.port)
            .to_socket_addrs()
            .map_err(|source| ConfigError::InvalidAddress {
                addr: addr.clone(),
                source,
            })?
            .next()
            .ok_or_else(|| ConfigError::InvalidAddress {
                addr,
                source: std::io::Error::new(
                    std::io::ErrorKind::AddrNotAvailable,
                    "no addresses resolved",
                ),
            })
    }
}
