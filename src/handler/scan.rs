//! Scan endpoint
//!
//! Accepts a form-encoded POST, runs the scanner and wraps its output as
//! `{"Data": "<base64>"}`.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use http_body_util::Full;
use hyper::body::{Body, Bytes};
use hyper::{Method, Request, Response};
use serde::Serialize;
use std::time::Instant;

use crate::config::AppState;
use crate::http::{self, FEEDER_EMPTY_MESSAGE};
use crate::logger;
use crate::scan::{ScanError, ScanParams};

/// JSON envelope for a scanned document
#[derive(Debug, Serialize)]
struct ScanResponse {
    #[serde(rename = "Data")]
    data: String,
}

impl ScanResponse {
    fn new(bytes: &[u8]) -> Self {
        Self {
            data: STANDARD.encode(bytes),
        }
    }
}

/// Handle a request routed to the scan endpoint
pub async fn handle_scan<B>(req: Request<B>, state: &AppState) -> Response<Full<Bytes>>
where
    B: Body,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    if req.method() != Method::POST {
        logger::log_warning(&format!("Method not allowed: {}", req.method()));
        return http::build_405_response();
    }

    let pairs = match http::read_form(req, state.config.http.max_body_size).await {
        Ok(pairs) => pairs,
        Err(e) => {
            logger::log_error(&format!("Failed to parse form: {e}"));
            return http::build_500_response();
        }
    };
    let params = ScanParams::from_pairs(pairs);

    let device = state.device();
    logger::log_scan_started(device, &params);
    let started = Instant::now();

    match state.runner.scan(device, &params).await {
        Ok(data) => {
            logger::log_scan_completed(data.len(), started.elapsed());
            encode_scan(&data)
        }
        Err(err) => scan_failure_response(&err),
    }
}

fn encode_scan(data: &[u8]) -> Response<Full<Bytes>> {
    match serde_json::to_vec(&ScanResponse::new(data)) {
        Ok(json) => http::build_json_response(json),
        Err(e) => {
            logger::log_error(&format!("Failed to serialize scan response: {e}"));
            http::build_500_response()
        }
    }
}

fn scan_failure_response(err: &ScanError) -> Response<Full<Bytes>> {
    logger::log_scan_failed(err);
    if err.is_feeder_empty() {
        http::build_504_response(Some(FEEDER_EMPTY_MESSAGE))
    } else {
        http::build_504_response(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Config, HttpConfig, LoggingConfig, ScannerConfig, ServerConfig};
    use crate::handler::handle_request;
    use crate::scan::ScanRunner;
    use async_trait::async_trait;
    use http_body_util::BodyExt;
    use hyper::header::CONTENT_TYPE;
    use hyper::StatusCode;
    use std::sync::{Arc, Mutex};

    const DEVICE: &str = "fujitsu:fi-6130dj:12345";

    /// Records every invocation and answers with a canned outcome
    struct FakeRunner {
        calls: Mutex<Vec<(String, ScanParams)>>,
        outcome: fn() -> Result<Bytes, ScanError>,
    }

    impl FakeRunner {
        fn new(outcome: fn() -> Result<Bytes, ScanError>) -> Arc<Self> {
            Arc::new(Self {
                calls: Mutex::new(Vec::new()),
                outcome,
            })
        }

        fn calls(&self) -> Vec<(String, ScanParams)> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl ScanRunner for FakeRunner {
        async fn scan(&self, device: &str, params: &ScanParams) -> Result<Bytes, ScanError> {
            self.calls
                .lock()
                .unwrap()
                .push((device.to_string(), params.clone()));
            (self.outcome)()
        }
    }

    fn ok_bytes() -> Result<Bytes, ScanError> {
        Ok(Bytes::from_static(&[0x01, 0x02, 0x03]))
    }

    fn test_state(runner: Arc<FakeRunner>) -> Arc<AppState> {
        let config = Config {
            server: ServerConfig {
                host: String::new(),
                port: 8080,
                workers: None,
            },
            scanner: ScannerConfig {
                device: DEVICE.to_string(),
                program: "scanimage".to_string(),
                timeout_secs: 0,
            },
            http: HttpConfig {
                server_name: "scan-server".to_string(),
                max_body_size: 1024,
                keep_alive: true,
            },
            logging: LoggingConfig {
                level: "info".to_string(),
                access_log: false,
                access_log_format: "combined".to_string(),
                access_log_file: None,
                error_log_file: None,
            },
        };
        Arc::new(AppState::new(config, runner))
    }

    fn post_form(body: &str) -> Request<Full<Bytes>> {
        Request::post("/scan")
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Full::new(Bytes::from(body.to_string())))
            .unwrap()
    }

    async fn send(state: &Arc<AppState>, req: Request<Full<Bytes>>) -> (StatusCode, Bytes) {
        let resp = handle_request(req, Arc::clone(state)).await.unwrap();
        let status = resp.status();
        let body = resp.into_body().collect().await.unwrap().to_bytes();
        (status, body)
    }

    #[tokio::test]
    async fn test_non_post_methods_rejected_without_scanning() {
        let runner = FakeRunner::new(ok_bytes);
        let state = test_state(Arc::clone(&runner));

        for method in [
            Method::GET,
            Method::HEAD,
            Method::PUT,
            Method::DELETE,
            Method::PATCH,
            Method::OPTIONS,
        ] {
            let req = Request::builder()
                .method(method.clone())
                .uri("/scan")
                .body(Full::new(Bytes::new()))
                .unwrap();
            let (status, body) = send(&state, req).await;
            assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED, "method {method}");
            assert!(body.is_empty());
        }
        assert!(runner.calls().is_empty());
    }

    #[tokio::test]
    async fn test_defaults_used_without_form_fields() {
        let runner = FakeRunner::new(ok_bytes);
        let state = test_state(Arc::clone(&runner));

        let (status, _) = send(&state, post_form("")).await;
        assert_eq!(status, StatusCode::OK);

        let calls = runner.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, DEVICE);
        assert_eq!(calls[0].1.format, "png");
        assert_eq!(calls[0].1.mode, "gray");
        assert_eq!(calls[0].1.resolution, "300");
    }

    #[tokio::test]
    async fn test_defaults_used_without_body_or_content_type() {
        let runner = FakeRunner::new(ok_bytes);
        let state = test_state(Arc::clone(&runner));

        let req = Request::post("/scan").body(Full::new(Bytes::new())).unwrap();
        let (status, _) = send(&state, req).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(runner.calls()[0].1, ScanParams::default());
    }

    #[tokio::test]
    async fn test_fields_override_independently() {
        let cases: [(&str, [&str; 3]); 5] = [
            ("format=jpeg", ["jpeg", "gray", "300"]),
            ("mode=color", ["png", "color", "300"]),
            ("resolution=600", ["png", "gray", "600"]),
            ("format=tiff&resolution=150", ["tiff", "gray", "150"]),
            (
                "format=pnm&mode=lineart&resolution=1200",
                ["pnm", "lineart", "1200"],
            ),
        ];

        for (body, [format, mode, resolution]) in cases {
            let runner = FakeRunner::new(ok_bytes);
            let state = test_state(Arc::clone(&runner));

            let (status, _) = send(&state, post_form(body)).await;
            assert_eq!(status, StatusCode::OK, "body {body}");

            let calls = runner.calls();
            assert_eq!(calls.len(), 1);
            let params = &calls[0].1;
            assert_eq!(params.format, format, "body {body}");
            assert_eq!(params.mode, mode, "body {body}");
            assert_eq!(params.resolution, resolution, "body {body}");
        }
    }

    #[tokio::test]
    async fn test_empty_fields_keep_defaults() {
        let runner = FakeRunner::new(ok_bytes);
        let state = test_state(Arc::clone(&runner));

        send(&state, post_form("format=&mode=&resolution=")).await;
        assert_eq!(runner.calls()[0].1, ScanParams::default());
    }

    #[tokio::test]
    async fn test_success_wraps_bytes_as_base64_json() {
        let runner = FakeRunner::new(ok_bytes);
        let state = test_state(runner);

        let (status, body) = send(&state, post_form("")).await;
        assert_eq!(status, StatusCode::OK);

        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        let encoded = json["Data"].as_str().unwrap();
        assert_eq!(encoded, "AQID");
        assert_eq!(STANDARD.decode(encoded).unwrap(), vec![0x01, 0x02, 0x03]);
        assert_eq!(json.as_object().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_empty_scan_output() {
        let runner = FakeRunner::new(|| Ok(Bytes::new()));
        let state = test_state(runner);

        let (status, body) = send(&state, post_form("")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(&body[..], br#"{"Data":""}"#);
    }

    #[tokio::test]
    async fn test_feeder_empty_maps_to_504_with_message() {
        let runner = FakeRunner::new(|| {
            Err(ScanError::exit(
                Some(7),
                "scanimage: sane_start: Document feeder out of documents\n",
            ))
        });
        let state = test_state(runner);

        let (status, body) = send(&state, post_form("")).await;
        assert_eq!(status, StatusCode::GATEWAY_TIMEOUT);
        assert_eq!(&body[..], b"Document feeder out of documents");
    }

    #[tokio::test]
    async fn test_generic_failure_maps_to_empty_504() {
        let runner = FakeRunner::new(|| {
            Err(ScanError::exit(Some(1), "scanimage: open of device failed"))
        });
        let state = test_state(runner);

        let (status, body) = send(&state, post_form("")).await;
        assert_eq!(status, StatusCode::GATEWAY_TIMEOUT);
        assert!(body.is_empty());
    }

    #[tokio::test]
    async fn test_spawn_and_timeout_failures_map_to_empty_504() {
        let outcomes: [fn() -> Result<Bytes, ScanError>; 3] = [
            || {
                Err(ScanError::Spawn(std::io::Error::from(
                    std::io::ErrorKind::NotFound,
                )))
            },
            || Err(ScanError::Timeout(std::time::Duration::from_secs(60))),
            || Err(ScanError::exit(None, "")),
        ];

        for outcome in outcomes {
            let state = test_state(FakeRunner::new(outcome));
            let (status, body) = send(&state, post_form("")).await;
            assert_eq!(status, StatusCode::GATEWAY_TIMEOUT);
            assert!(body.is_empty());
        }
    }

    #[tokio::test]
    async fn test_malformed_form_is_500_without_scanning() {
        let runner = FakeRunner::new(ok_bytes);
        let state = test_state(Arc::clone(&runner));

        for body in ["format=%zz", "format=png;mode=color"] {
            let (status, resp_body) = send(&state, post_form(body)).await;
            assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR, "body {body}");
            assert!(resp_body.is_empty());
        }

        let oversized = format!("format={}", "x".repeat(2048));
        let (status, _) = send(&state, post_form(&oversized)).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);

        let req = Request::post("/scan?x=%zz")
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Full::new(Bytes::from_static(b"format=jpeg")))
            .unwrap();
        let (status, _) = send(&state, req).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);

        let req = Request::post("/scan")
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded; charset")
            .body(Full::new(Bytes::from_static(b"format=jpeg")))
            .unwrap();
        let (status, _) = send(&state, req).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);

        assert!(runner.calls().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_path_is_404_without_scanning() {
        let runner = FakeRunner::new(ok_bytes);
        let state = test_state(Arc::clone(&runner));

        let req = Request::post("/scan/extra").body(Full::new(Bytes::new())).unwrap();
        let (status, body) = send(&state, req).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(body.is_empty());

        let req = Request::get("/").body(Full::new(Bytes::new())).unwrap();
        let (status, _) = send(&state, req).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        assert!(runner.calls().is_empty());
    }
}
