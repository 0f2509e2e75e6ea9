//! Importing files into the cluster
//!
//! The cluster does all the work: it fetches the source (local path, HDFS,
//! S3 or an http/https URL), decompresses it, guesses the parse setup and
//! parses it into a distributed frame. The client walks the four REST
//! calls in order:
//!
//! 1. `GET /3/ImportFiles?path=...` registers the raw source
//! 2. `POST /3/ParseSetup` guesses separator, header and column types
//! 3. `POST /3/Parse` starts the parse job
//! 4. `GET /3/Jobs/{key}` until done, then `GET /3/Frames/{key}`

use serde::Deserialize;
use tracing::info;

use super::Frame;
use crate::connection::Connection;
use crate::error::{ClientError, ClientResult};
use crate::jobs::{Job, KeyRef};

#[derive(Debug, Deserialize)]
struct ImportFilesResponse {
    #[serde(default)]
    files: Vec<String>,
    #[serde(default)]
    destination_frames: Vec<String>,
    #[serde(default)]
    fails: Vec<String>,
}

/// Parse settings guessed by the cluster
#[derive(Debug, Clone, Deserialize)]
pub struct ParseSetup {
    #[serde(default)]
    pub source_frames: Vec<KeyRef>,
    pub parse_type: String,
    pub separator: i64,
    #[serde(default)]
    pub single_quotes: bool,
    #[serde(default)]
    pub check_header: i64,
    #[serde(default)]
    pub number_columns: usize,
    #[serde(default)]
    pub column_names: Option<Vec<String>>,
    #[serde(default)]
    pub column_types: Option<Vec<String>>,
    pub destination_frame: String,
    #[serde(default)]
    pub chunk_size: i64,
}

#[derive(Debug, Deserialize)]
struct ParseResponse {
    job: Job,
    destination_frame: KeyRef,
}

/// Render a list as the bracketed, quoted form the REST API expects
fn list_param(items: &[String]) -> String {
    serde_json::to_string(items).unwrap_or_else(|_| "[]".to_string())
}

impl ParseSetup {
    fn parse_form(&self, source_frames: &[String]) -> Vec<(&'static str, String)> {
        let mut form = vec![
            ("destination_frame", self.destination_frame.clone()),
            ("source_frames", list_param(source_frames)),
            ("parse_type", self.parse_type.clone()),
            ("separator", self.separator.to_string()),
            ("number_columns", self.number_columns.to_string()),
            ("single_quotes", self.single_quotes.to_string()),
            ("check_header", self.check_header.to_string()),
            ("delete_on_done", "true".to_string()),
        ];
        if let Some(ref names) = self.column_names {
            form.push(("column_names", list_param(names)));
        }
        if let Some(ref types) = self.column_types {
            form.push(("column_types", list_param(types)));
        }
        if self.chunk_size > 0 {
            form.push(("chunk_size", self.chunk_size.to_string()));
        }
        form
    }
}

impl Connection {
    /// Register a source with the cluster without parsing it
    ///
    /// Returns the keys of the raw (unparsed) frames.
    pub async fn import_files(&self, path: &str) -> ClientResult<Vec<String>> {
        let response: ImportFilesResponse = self
            .get_json("/3/ImportFiles", &[("path", path.to_string())])
            .await?;

        if !response.fails.is_empty() {
            return Err(ClientError::ImportFailed(format!(
                "cluster could not import {}",
                response.fails.join(", ")
            )));
        }
        if response.destination_frames.is_empty() {
            return Err(ClientError::ImportFailed(format!(
                "no files found at {}",
                path
            )));
        }

        info!(
            "Imported {} file(s) from {}",
            response.files.len().max(response.destination_frames.len()),
            path
        );
        Ok(response.destination_frames)
    }

    /// Ask the cluster to guess parse settings for raw frames
    pub async fn parse_setup(&self, source_frames: &[String]) -> ClientResult<ParseSetup> {
        self.post_form_json(
            "/3/ParseSetup",
            &[("source_frames", list_param(source_frames))],
        )
        .await
    }

    /// Parse raw frames and wait for the resulting frame
    pub async fn parse(&self, source_frames: &[String], setup: &ParseSetup) -> ClientResult<Frame> {
        let response: ParseResponse = self
            .post_form_json("/3/Parse", &setup.parse_form(source_frames))
            .await?;

        info!(
            "Parsing {} into {} (job {})",
            source_frames.join(", "),
            response.destination_frame.name,
            response.job.key.name
        );

        self.wait_for_job(&response.job.key.name).await?;
        self.frame(&response.destination_frame.name).await
    }

    /// Import a source into a parsed frame
    ///
    /// `path` is anything the cluster can read, including http/https URLs
    /// to compressed files. Fails with `EmptyFrame` if the parse produced
    /// no rows or no columns.
    pub async fn import_frame(&self, path: &str) -> ClientResult<Frame> {
        let raw = self.import_files(path).await?;
        let setup = self.parse_setup(&raw).await?;
        let frame = self.parse(&raw, &setup).await?;

        if frame.is_empty() {
            return Err(ClientError::EmptyFrame(frame.key().to_string()));
        }

        info!(
            "Frame {} ready: {} rows x {} columns",
            frame.key(),
            frame.nrows(),
            frame.ncols()
        );
        Ok(frame)
    }
}
