//! Logger module
//!
//! Provides logging utilities for the scan server including:
//! - Server lifecycle logging
//! - Scan invocation and failure logging
//! - Access logging with multiple formats
//! - File-based logging support

mod format;
pub mod writer;

pub use format::AccessLogEntry;

use crate::config::Config;
use crate::scan::{ScanError, ScanParams};
use chrono::Local;
use std::net::SocketAddr;
use std::time::Duration;

/// Initialize the logger with configuration
///
/// Should be called once at application startup.
pub fn init(config: &Config) -> std::io::Result<()> {
    writer::init(
        config.logging.access_log_file.as_deref(),
        config.logging.error_log_file.as_deref(),
        config.logging.level.eq_ignore_ascii_case("debug"),
    )
}

fn timestamp() -> String {
    Local::now().format("%Y/%m/%d %H:%M:%S").to_string()
}

/// Write to info/access log
fn write_info(message: &str) {
    match writer::get() {
        Some(w) => w.write_info(message),
        None => println!("{message}"),
    }
}

/// Write to error log
fn write_error(message: &str) {
    match writer::get() {
        Some(w) => w.write_error(message),
        None => eprintln!("{message}"),
    }
}

pub fn log_info(message: &str) {
    write_info(&format!("{} [INFO] {message}", timestamp()));
}

pub fn log_debug(message: &str) {
    if writer::get().is_some_and(writer::LogWriter::debug_enabled) {
        write_info(&format!("{} [DEBUG] {message}", timestamp()));
    }
}

pub fn log_warning(message: &str) {
    write_error(&format!("{} [WARN] {message}", timestamp()));
}

pub fn log_error(message: &str) {
    write_error(&format!("{} [ERROR] {message}", timestamp()));
}

/// Log a startup failure; the caller exits afterwards
pub fn log_fatal(message: &str) {
    write_error(&format!("{} [FATAL] {message}", timestamp()));
}

pub fn log_server_start(addr: &SocketAddr, config: &Config) {
    write_info("======================================");
    log_info(&format!("Starting webserver on http://{addr}"));
    log_info(&format!("Scanner device: {}", config.scanner.device));
    log_info(&format!("Scanner program: {}", config.scanner.program));
    match config.scanner.timeout() {
        Some(limit) => log_info(&format!("Scan timeout: {}s", limit.as_secs())),
        None => log_info("Scan timeout: none"),
    }
    if let Some(workers) = config.server.workers {
        log_info(&format!("Worker threads: {workers}"));
    }
    if let Some(ref path) = config.logging.access_log_file {
        log_info(&format!("Access log: {path}"));
    }
    if let Some(ref path) = config.logging.error_log_file {
        log_info(&format!("Error log: {path}"));
    }
    write_info("======================================");
}

pub fn log_connection_error(err: &impl std::fmt::Debug) {
    log_error(&format!("Failed to serve connection: {err:?}"));
}

pub fn log_scan_started(device: &str, params: &ScanParams) {
    log_debug(&format!(
        "[Scan] device={device} format={} mode={} resolution={}",
        params.format, params.mode, params.resolution
    ));
}

pub fn log_scan_completed(bytes: usize, elapsed: Duration) {
    log_debug(&format!(
        "[Scan] Completed: {bytes} bytes in {:.3}s",
        elapsed.as_secs_f64()
    ));
}

/// Log a failed scan with whatever the scanner wrote to stderr
pub fn log_scan_failed(err: &ScanError) {
    write_error(&scan_failure_line(err));
}

fn scan_failure_line(err: &ScanError) -> String {
    format!(
        "{} [ERROR] Err: {err} | {}",
        timestamp(),
        err.stderr().trim_end()
    )
}

/// Log formatted access log entry
pub fn log_access(entry: &AccessLogEntry, format: &str) {
    write_info(&entry.format(format));
}

pub fn log_shutdown() {
    log_info("Shutdown requested, no longer accepting connections");
}
