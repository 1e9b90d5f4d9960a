use clap::Parser;
use std::sync::atomic::AtomicUsize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;

mod cli;
mod config;
mod handler;
mod http;
mod logger;
mod scan;
mod server;

use crate::scan::ScanImageRunner;

/// How long in-flight requests may run on after a shutdown signal
const SHUTDOWN_GRACE: Duration = Duration::from_secs(10);

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = cli::Cli::parse();

    // A missing device must stop the process before anything is bound
    let cfg = match config::Config::load_from(&cli.config, &cli.overrides()) {
        Ok(cfg) => cfg,
        Err(e) => {
            logger::log_fatal(&e.to_string());
            std::process::exit(1);
        }
    };

    logger::init(&cfg)?;

    // Create the Tokio runtime, sizing worker threads from config when set
    let mut runtime_builder = tokio::runtime::Builder::new_multi_thread();
    runtime_builder.enable_all();
    if let Some(workers) = cfg.server.workers {
        runtime_builder.worker_threads(workers);
    }
    let runtime = runtime_builder.build()?;

    runtime.block_on(async_main(cfg))
}

async fn async_main(cfg: config::Config) -> Result<(), Box<dyn std::error::Error>> {
    let addr = cfg.get_socket_addr()?;
    let listener = server::create_listener(addr)?;

    let runner = Arc::new(ScanImageRunner::from_config(&cfg.scanner));
    logger::log_debug(&format!("Scanner program resolved as {}", runner.program()));
    let state = Arc::new(config::AppState::new(cfg, runner));
    logger::log_server_start(&addr, &state.config);

    let shutdown = Arc::new(Notify::new());
    server::start_signal_handler(Arc::clone(&shutdown));

    let active_connections = Arc::new(AtomicUsize::new(0));
    let graceful =
        server::start_server_loop(listener, state, Arc::clone(&active_connections), shutdown)
            .await;
    server::drain_connections(graceful, &active_connections, SHUTDOWN_GRACE).await;

    logger::log_info("Server stopped");
    Ok(())
}
