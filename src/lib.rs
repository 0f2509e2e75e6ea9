//! H2O HTTPS import - client and smoke test for an H2O-3 cluster
//!
//! Provides:
//! - Connection handshake with a running cluster (`GET /3/Cloud`)
//! - Importing files and URLs into parsed frames (ImportFiles, ParseSetup, Parse)
//! - Job polling
//! - Frame previews and column summaries
//! - The test-harness convention used by the smoke-test binary

pub mod config;
pub mod connection;
pub mod error;
pub mod frame;
pub mod harness;
pub mod jobs;

// Re-export commonly used types
pub use config::ClientConfig;
pub use connection::{CloudStatus, Connection, NodeStatus};
pub use error::{ClientError, ClientResult};
pub use frame::import::ParseSetup;
pub use frame::{Cell, Column, ColumnType, Frame};
pub use harness::{PROSTATE_URL, TestArgs, TestReport, https_import, run_test};
pub use jobs::{Job, JobStatus, KeyRef};
