//! HTTP response building module
//!
//! Builders for every status the scan endpoint can answer with. Error bodies
//! stay terse so scanner details only reach the server log.

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::{Response, StatusCode};

/// Plain-text body sent when the document feeder is empty
pub const FEEDER_EMPTY_MESSAGE: &str = "Document feeder out of documents";

fn empty_response(status: StatusCode) -> Response<Full<Bytes>> {
    Response::builder()
        .status(status)
        .body(Full::new(Bytes::new()))
        .unwrap_or_else(|e| {
            log_build_error(status.as_str(), &e);
            Response::new(Full::new(Bytes::new()))
        })
}

/// Build 404 Not Found response
pub fn build_404_response() -> Response<Full<Bytes>> {
    empty_response(StatusCode::NOT_FOUND)
}

/// Build 405 Method Not Allowed response
pub fn build_405_response() -> Response<Full<Bytes>> {
    Response::builder()
        .status(StatusCode::METHOD_NOT_ALLOWED)
        .header("Allow", "POST")
        .body(Full::new(Bytes::new()))
        .unwrap_or_else(|e| {
            log_build_error("405", &e);
            Response::new(Full::new(Bytes::new()))
        })
}

/// Build 500 Internal Server Error response
pub fn build_500_response() -> Response<Full<Bytes>> {
    empty_response(StatusCode::INTERNAL_SERVER_ERROR)
}

/// Build 504 Gateway Timeout response, optionally with a plain-text message
pub fn build_504_response(message: Option<&'static str>) -> Response<Full<Bytes>> {
    let Some(message) = message else {
        return empty_response(StatusCode::GATEWAY_TIMEOUT);
    };

    Response::builder()
        .status(StatusCode::GATEWAY_TIMEOUT)
        .header("Content-Type", "text/plain; charset=utf-8")
        .body(Full::new(Bytes::from_static(message.as_bytes())))
        .unwrap_or_else(|e| {
            log_build_error("504", &e);
            Response::new(Full::new(Bytes::from_static(message.as_bytes())))
        })
}

/// Build 200 OK response carrying a serialized JSON document
pub fn build_json_response(json: Vec<u8>) -> Response<Full<Bytes>> {
    let content_length = json.len();

    Response::builder()
        .status(StatusCode::OK)
        .header("Content-Type", "application/json")
        .header("Content-Length", content_length)
        .body(Full::new(Bytes::from(json)))
        .unwrap_or_else(|e| {
            log_build_error("200", &e);
            build_500_response()
        })
}

/// Log response build error
fn log_build_error(status: &str, error: &hyper::http::Error) {
    crate::logger::log_error(&format!("Failed to build {status} response: {error}"));
}
