// Server loop module
// Accepts connections until shutdown is requested, then drains in-flight work

use hyper_util::server::graceful::GracefulShutdown;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::Notify;

use super::connection::accept_connection;
use crate::config::AppState;
use crate::logger;

/// Accept connections until `shutdown` is notified
///
/// Returns the watcher every accepted connection was registered with.
#[allow(clippy::ignored_unit_patterns)]
pub async fn start_server_loop(
    listener: TcpListener,
    state: Arc<AppState>,
    active_connections: Arc<AtomicUsize>,
    shutdown: Arc<Notify>,
) -> GracefulShutdown {
    let graceful = GracefulShutdown::new();

    loop {
        tokio::select! {
            accept_result = listener.accept() => {
                match accept_result {
                    Ok((stream, peer_addr)) => {
                        accept_connection(stream, peer_addr, &state, &graceful, &active_connections);
                    }
                    Err(e) => {
                        logger::log_error(&format!("Failed to accept connection: {e}"));
                    }
                }
            }

            _ = shutdown.notified() => {
                logger::log_shutdown();
                break;
            }
        }
    }

    // Close the listening socket before draining
    drop(listener);
    graceful
}

/// Ask open connections to close and wait for them, giving up after `grace`
///
/// Idle keep-alive connections close right away; a connection with a request
/// in flight closes once its response is written. Returns the number of
/// connections still open when the wait ended.
pub async fn drain_connections(
    graceful: GracefulShutdown,
    active_connections: &AtomicUsize,
    grace: Duration,
) -> usize {
    tokio::select! {
        () = graceful.shutdown() => 0,
        () = tokio::time::sleep(grace) => {
            let remaining = active_connections.load(Ordering::SeqCst);
            logger::log_warning(&format!(
                "Shutting down with {remaining} connection(s) still open"
            ));
            remaining
        }
    }
}
