//! Command-line interface
//!
//! Flags override values from the config file and the environment.

use clap::Parser;

use crate::config::Overrides;

#[derive(Parser, Debug)]
#[command(
    name = "scan-server",
    version,
    about = "Serve document scans from a SANE scanner over HTTP",
    long_about = "Listens for POST /scan, runs scanimage against the configured device and \
returns the scanned image as JSON ({\"Data\": \"<base64>\"})."
)]
pub struct Cli {
    /// Address for webserver to listen on (empty for all interfaces).
    #[arg(short, long)]
    pub address: Option<String>,

    /// Port for webserver to listen on [default: 8080].
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Device used for scanning, as listed by `scanimage -L`.
    #[arg(short, long)]
    pub device: Option<String>,

    /// Configuration file path, without extension.
    #[arg(short, long, default_value = "config")]
    pub config: String,

    /// Scanner executable [default: scanimage].
    #[arg(long)]
    pub program: Option<String>,

    /// Seconds a single scan may take before it is killed (0 waits forever).
    #[arg(long)]
    pub timeout: Option<u64>,
}

impl Cli {
    pub fn overrides(&self) -> Overrides {
        Overrides {
            host: self.address.clone(),
            port: self.port,
            device: self.device.clone(),
            program: self.program.clone(),
            timeout_secs: self.timeout,
        }
    }
}
