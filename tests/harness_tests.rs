//! Harness convention: argument resolution, reports and the HTTPS import test

use std::io::Write;

use clap::Parser;
use h2o_https_import::{PROSTATE_URL, TestArgs, https_import, run_test};
use serde_json::json;
use wiremock::matchers::{method, path, path_regex};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn args(extra: &[&str]) -> TestArgs {
    TestArgs::try_parse_from(std::iter::once("h2o-https-import").chain(extra.iter().copied()))
        .unwrap()
}

async fn mock_cluster(rows: u64) -> MockServer {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/3/Cloud"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "version": "3.46.0.1",
            "cloud_name": "harness",
            "cloud_size": 1,
            "cloud_healthy": true,
            "nodes": [{"ip_port": "127.0.0.1:54321", "healthy": true, "num_cpus": 2}]
        })))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/3/ImportFiles"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "files": [PROSTATE_URL],
            "destination_frames": [PROSTATE_URL],
            "fails": []
        })))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/3/ParseSetup"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "parse_type": "CSV",
            "separator": 44,
            "check_header": 1,
            "number_columns": 1,
            "column_names": ["ID"],
            "column_types": ["Numeric"],
            "destination_frame": "prostate.hex"
        })))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/3/Parse"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "destination_frame": {"name": "prostate.hex"},
            "job": {"key": {"name": "parse_job"}, "status": "RUNNING"}
        })))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path_regex(r"^/3/Jobs/.+$"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "jobs": [{"key": {"name": "parse_job"}, "status": "DONE", "progress": 1.0}]
        })))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/3/Frames/prostate.hex"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "frames": [{
                "frame_id": {"name": "prostate.hex"},
                "rows": rows,
                "columns": [{"label": "ID", "type": "int", "data": [1.0]}]
            }]
        })))
        .mount(&server)
        .await;

    server
}

fn cloud_arg(server: &MockServer) -> String {
    let addr = server.address();
    format!("{}:{}", addr.ip(), addr.port())
}

#[tokio::test]
async fn test_https_import_passes() {
    let server = mock_cluster(380).await;
    let args = args(&["--usecloud", &cloud_arg(&server)]);

    let report = run_test("https_import", &args, |conn| https_import(conn, false)).await;

    assert!(report.passed(), "{:?}", report.failure);
    assert_eq!(report.exit_code(), 0);
    assert!(report.summary().starts_with("PASSED https_import"));
}

#[tokio::test]
async fn test_https_import_cleanup_deletes_frame() {
    let server = mock_cluster(380).await;
    Mock::given(method("DELETE"))
        .and(path("/3/Frames/prostate.hex"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&server)
        .await;

    let addr = server.address();
    let port = addr.port().to_string();
    let ip = addr.ip().to_string();
    let args = args(&[ip.as_str(), port.as_str(), "--cleanup"]);

    let cleanup = args.cleanup;
    let report = run_test("https_import", &args, |conn| https_import(conn, cleanup)).await;
    assert_eq!(report.exit_code(), 0);
}

#[tokio::test]
async fn test_empty_frame_fails_visibly() {
    let server = mock_cluster(0).await;
    let args = args(&["--usecloud", &cloud_arg(&server)]);

    let report = run_test("https_import", &args, |conn| https_import(conn, false)).await;

    assert_eq!(report.exit_code(), 1);
    let failure = report.failure.unwrap();
    assert!(failure.contains("empty"));
    assert!(failure.contains(PROSTATE_URL));
}

#[tokio::test]
async fn test_unreachable_cluster_fails_visibly() {
    let port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };
    let cloud = format!("127.0.0.1:{}", port);
    let args = args(&["--usecloud", &cloud]);

    let mut ran = false;
    let report = run_test("https_import", &args, |conn| {
        ran = true;
        https_import(conn, false)
    })
    .await;

    assert!(!ran);
    assert_eq!(report.exit_code(), 1);
    assert!(report.failure.unwrap().contains("Failed to connect"));
}

#[tokio::test]
async fn test_config_file_with_flag_override() {
    let server = mock_cluster(380).await;
    let addr = server.address();

    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        file,
        "host = \"{}\"\nport = 1\njob_poll_interval_ms = 5\npreview_rows = 10",
        addr.ip()
    )
    .unwrap();

    // Port from the file is wrong on purpose; --port wins
    let port = addr.port().to_string();
    let path = file.path().to_str().unwrap().to_string();
    let args = args(&["--config", path.as_str(), "--port", port.as_str()]);

    let config = args.resolve_config().unwrap();
    assert_eq!(config.port, addr.port());
    assert_eq!(config.job_poll_interval_ms, 5);

    let report = run_test("https_import", &args, |conn| https_import(conn, false)).await;
    assert!(report.passed(), "{:?}", report.failure);
}

#[tokio::test]
async fn test_missing_config_file_fails_visibly() {
    let args = args(&["--config", "/nonexistent/h2o-client.toml"]);
    let report = run_test("https_import", &args, |conn| https_import(conn, false)).await;
    assert_eq!(report.exit_code(), 1);
    assert!(report.failure.unwrap().contains("Configuration error"));
}
