//! Test-harness entry convention
//!
//! A smoke test is an async function that receives a live `Connection`.
//! `run_test` resolves the cluster address from the command line (and an
//! optional config file), performs the handshake, runs the test and
//! records the outcome. Any failure, including a failed handshake, ends
//! up in the report and turns into a non-zero exit code.

use std::future::Future;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::Context;
use chrono::{DateTime, Utc};
use clap::Parser;
use tracing::{error, info};

use crate::config::ClientConfig;
use crate::connection::Connection;
use crate::error::{ClientError, ClientResult};

/// Remote zipped CSV used by the HTTPS import smoke test
pub const PROSTATE_URL: &str =
    "https://s3.amazonaws.com/h2o-public-test-data/smalldata/prostate/prostate.csv.zip";

/// Command line accepted by smoke tests
#[derive(Debug, Clone, Default, Parser)]
#[command(version, about = "Import a remote zipped CSV into an H2O cluster over HTTPS")]
pub struct TestArgs {
    /// Cluster address as IP:PORT
    #[arg(long, value_name = "IP:PORT", conflicts_with_all = ["ip", "port"])]
    pub usecloud: Option<String>,

    /// Cluster host
    #[arg(long)]
    pub ip: Option<String>,

    /// Cluster REST port
    #[arg(long)]
    pub port: Option<u16>,

    /// Cluster host, positional form
    #[arg(value_name = "IP", conflicts_with_all = ["ip", "usecloud"])]
    pub positional_ip: Option<String>,

    /// Cluster REST port, positional form
    #[arg(value_name = "PORT", requires = "positional_ip", conflicts_with_all = ["port", "usecloud"])]
    pub positional_port: Option<u16>,

    /// TOML file with client settings
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Talk to the cluster over https
    #[arg(long)]
    pub https: bool,

    /// Remove imported frames after the test
    #[arg(long)]
    pub cleanup: bool,

    /// Debug logging
    #[arg(short, long)]
    pub verbose: bool,
}

fn parse_cloud(value: &str) -> ClientResult<(String, u16)> {
    let (host, port) = value.rsplit_once(':').ok_or_else(|| {
        ClientError::Config(format!("Expected IP:PORT for --usecloud, got '{}'", value))
    })?;
    let port = port
        .parse::<u16>()
        .map_err(|e| ClientError::Config(format!("Invalid port in '{}': {}", value, e)))?;
    Ok((host.to_string(), port))
}

impl TestArgs {
    /// Build the client config
    ///
    /// The config file (if any) is the base; address flags override it.
    pub fn resolve_config(&self) -> ClientResult<ClientConfig> {
        let mut config = match &self.config {
            Some(path) => ClientConfig::load(path)?,
            None => ClientConfig::default(),
        };

        if let Some(ref cloud) = self.usecloud {
            let (host, port) = parse_cloud(cloud)?;
            config = config.with_host(host).with_port(port);
        }
        if let Some(ip) = self.ip.as_ref().or(self.positional_ip.as_ref()) {
            config = config.with_host(ip.clone());
        }
        if let Some(port) = self.port.or(self.positional_port) {
            config = config.with_port(port);
        }
        if self.https {
            config = config.with_https(true);
        }

        config.validate()?;
        Ok(config)
    }
}

/// Outcome of one smoke test run
#[derive(Debug)]
pub struct TestReport {
    pub name: String,
    pub started_at: DateTime<Utc>,
    pub elapsed: Duration,
    /// `None` on success, otherwise the failure message
    pub failure: Option<String>,
}

impl TestReport {
    pub fn passed(&self) -> bool {
        self.failure.is_none()
    }

    pub fn exit_code(&self) -> i32 {
        if self.passed() { 0 } else { 1 }
    }

    pub fn summary(&self) -> String {
        match &self.failure {
            None => format!(
                "PASSED {} ({:.2}s, started {})",
                self.name,
                self.elapsed.as_secs_f64(),
                self.started_at.to_rfc3339()
            ),
            Some(message) => format!(
                "FAILED {} ({:.2}s, started {}): {}",
                self.name,
                self.elapsed.as_secs_f64(),
                self.started_at.to_rfc3339(),
                message
            ),
        }
    }
}

/// Context layers first, then the hints for the underlying client error
fn failure_message(err: &anyhow::Error) -> String {
    let Some(client_err) = err.downcast_ref::<ClientError>() else {
        return format!("{:#}", err);
    };

    let context: Vec<String> = err
        .chain()
        .take_while(|cause| cause.downcast_ref::<ClientError>().is_none())
        .map(|cause| cause.to_string())
        .collect();

    if context.is_empty() {
        client_err.user_message()
    } else {
        format!("{}: {}", context.join(": "), client_err.user_message())
    }
}

async fn connect_and_run<F, Fut>(name: &str, args: &TestArgs, test: F) -> anyhow::Result<()>
where
    F: FnOnce(Connection) -> Fut,
    Fut: Future<Output = anyhow::Result<()>>,
{
    let config = args.resolve_config()?;
    info!("Running {} against {}", name, config.base_url());
    let conn = Connection::init(config).await?;
    test(conn).await
}

/// Connect to the cluster named by `args` and run `test` against it
pub async fn run_test<F, Fut>(name: &str, args: &TestArgs, test: F) -> TestReport
where
    F: FnOnce(Connection) -> Fut,
    Fut: Future<Output = anyhow::Result<()>>,
{
    let started_at = Utc::now();
    let clock = Instant::now();

    let outcome = connect_and_run(name, args, test).await;

    let failure = outcome.err().map(|e| failure_message(&e));
    let report = TestReport {
        name: name.to_string(),
        started_at,
        elapsed: clock.elapsed(),
        failure,
    };

    if report.passed() {
        info!("{}", report.summary());
    } else {
        error!("{}", report.summary());
    }
    report
}

/// Import the prostate CSV over HTTPS and print the frame preview
pub async fn https_import(conn: Connection, cleanup: bool) -> anyhow::Result<()> {
    let frame = conn
        .import_frame(PROSTATE_URL)
        .await
        .with_context(|| format!("importing {}", PROSTATE_URL))?;

    anyhow::ensure!(
        frame.nrows() > 0 && frame.ncols() > 0,
        "frame {} has no data",
        frame.key()
    );

    println!("{}", frame.show());

    if cleanup {
        conn.remove_frame(frame.key()).await?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> TestArgs {
        TestArgs::try_parse_from(std::iter::once("h2o-https-import").chain(args.iter().copied()))
            .unwrap()
    }

    #[test]
    fn test_usecloud() {
        let config = parse(&["--usecloud", "10.0.0.7:54323"])
            .resolve_config()
            .unwrap();
        assert_eq!(config.host, "10.0.0.7");
        assert_eq!(config.port, 54323);
    }

    #[test]
    fn test_ip_port_flags() {
        let config = parse(&["--ip", "node-1", "--port", "54555", "--https"])
            .resolve_config()
            .unwrap();
        assert_eq!(config.base_url(), "https://node-1:54555");
    }

    #[test]
    fn test_usecloud_ipv6() {
        let config = parse(&["--usecloud", "::1:54321"]).resolve_config().unwrap();
        assert_eq!(config.host, "::1");
        assert_eq!(config.base_url(), "http://[::1]:54321");
    }

    #[test]
    fn test_positional() {
        let config = parse(&["127.0.0.1", "54321"]).resolve_config().unwrap();
        assert_eq!(config.base_url(), "http://127.0.0.1:54321");
    }

    #[test]
    fn test_defaults_without_args() {
        let config = parse(&[]).resolve_config().unwrap();
        assert_eq!(config, ClientConfig::default());
    }

    #[test]
    fn test_conflicting_address_forms() {
        let result = TestArgs::try_parse_from([
            "h2o-https-import",
            "--usecloud",
            "a:1",
            "--ip",
            "b",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_bad_usecloud() {
        assert!(matches!(
            parse(&["--usecloud", "nohost"]).resolve_config(),
            Err(ClientError::Config(_))
        ));
        assert!(matches!(
            parse(&["--usecloud", "host:notaport"]).resolve_config(),
            Err(ClientError::Config(_))
        ));
    }

    #[test]
    fn test_report_exit_code() {
        let mut report = TestReport {
            name: "https_import".to_string(),
            started_at: Utc::now(),
            elapsed: Duration::from_millis(1500),
            failure: None,
        };
        assert_eq!(report.exit_code(), 0);
        assert!(report.summary().starts_with("PASSED https_import (1.50s"));

        report.failure = Some("boom".to_string());
        assert_eq!(report.exit_code(), 1);
        assert!(report.summary().ends_with(": boom"));
    }

    #[test]
    fn test_failure_message_uses_hints() {
        let err = anyhow::Error::new(ClientError::Connection("refused".into()));
        assert!(failure_message(&err).contains("Hints:"));

        let err = anyhow::anyhow!("plain").context("outer");
        assert_eq!(failure_message(&err), "outer: plain");
    }

    #[test]
    fn test_failure_message_keeps_context() {
        let err = anyhow::Error::new(ClientError::ImportFailed("no files found".into()))
            .context(format!("importing {}", PROSTATE_URL));
        let message = failure_message(&err);

        assert!(message.starts_with(&format!("importing {}: Import failed", PROSTATE_URL)));
        assert!(message.contains("Hints:"));

        let err = anyhow::Error::new(ClientError::EmptyFrame("prostate.hex".into()))
            .context(format!("importing {}", PROSTATE_URL));
        assert_eq!(
            failure_message(&err),
            format!("importing {}: Frame prostate.hex is empty", PROSTATE_URL)
        );
    }
}
