//! Scanner process runner
//!
//! Spawns the scanner, buffers stdout and stderr separately, and reports the
//! outcome once the process exits.

use async_trait::async_trait;
use hyper::body::Bytes;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;

use super::error::ScanError;
use super::params::ScanParams;
use crate::config::ScannerConfig;

/// Capability to produce a scanned document
#[async_trait]
pub trait ScanRunner: Send + Sync {
    /// Scan one document from `device` and return the raw image bytes
    async fn scan(&self, device: &str, params: &ScanParams) -> Result<Bytes, ScanError>;
}

/// Runs `scanimage` (or a compatible program) as a child process
#[derive(Debug, Clone)]
pub struct ScanImageRunner {
    program: String,
    timeout: Option<Duration>,
}

impl ScanImageRunner {
    pub fn new(program: impl Into<String>, timeout: Option<Duration>) -> Self {
        Self {
            program: program.into(),
            timeout,
        }
    }

    pub fn from_config(config: &ScannerConfig) -> Self {
        Self::new(config.program.clone(), config.timeout())
    }

    pub fn program(&self) -> &str {
        &self.program
    }
}

#[async_trait]
impl ScanRunner for ScanImageRunner {
    async fn scan(&self, device: &str, params: &ScanParams) -> Result<Bytes, ScanError> {
        // Dropping the child (timeout, shutdown) kills the scanner
        let child = Command::new(&self.program)
            .args(params.to_args(device))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(ScanError::Spawn)?;

        let output = match self.timeout {
            Some(limit) => tokio::time::timeout(limit, child.wait_with_output())
                .await
                .map_err(|_| ScanError::Timeout(limit))?,
            None => child.wait_with_output().await,
        }
        .map_err(ScanError::Wait)?;

        if !output.status.success() {
            return Err(ScanError::exit(
                output.status.code(),
                String::from_utf8_lossy(&output.stderr),
            ));
        }

        Ok(Bytes::from(output.stdout))
    }
}
