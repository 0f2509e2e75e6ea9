//! Smoke test: import a zipped CSV over HTTPS into a running H2O cluster
//!
//! ```text
//! h2o-https-import --usecloud 127.0.0.1:54321
//! h2o-https-import 127.0.0.1 54321 --cleanup
//! ```

use clap::Parser;
use h2o_https_import::{TestArgs, https_import, run_test};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let args = TestArgs::parse();

    let default_level = if args.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!("h2o_https_import={}", default_level))
    });
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cleanup = args.cleanup;
    let report = run_test("https_import", &args, |conn| https_import(conn, cleanup)).await;

    if let Some(ref message) = report.failure {
        eprintln!("{}", message);
    }
    std::process::exit(report.exit_code());
}
