//! Request routing dispatch module
//!
//! Entry point for HTTP request processing. The server exposes a single
//! route; everything else is answered with 404.

use crate::config::AppState;
use crate::handler::scan;
use crate::http;
use crate::logger;
use http_body_util::Full;
use hyper::body::{Body, Bytes};
use hyper::{Request, Response};
use std::convert::Infallible;
use std::sync::Arc;

pub const SCAN_PATH: &str = "/scan";

/// Main entry point for HTTP request handling
pub async fn handle_request<B>(
    req: Request<B>,
    state: Arc<AppState>,
) -> Result<Response<Full<Bytes>>, Infallible>
where
    B: Body,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    if req.uri().path() != SCAN_PATH {
        logger::log_debug(&format!("No route for {}", req.uri().path()));
        return Ok(http::build_404_response());
    }

    Ok(scan::handle_scan(req, &state).await)
}
