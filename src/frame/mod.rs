//! Frames: the cluster's handles to ingested tabular data
//!
//! A `Frame` is a local snapshot of `GET /3/Frames/{key}`: the full shape
//! and per-column statistics, plus the first few rows for previews. The
//! data itself stays on the cluster.

pub mod display;
pub mod import;

use serde::Deserialize;
use tracing::info;

use crate::connection::Connection;
use crate::error::{ClientError, ClientResult};
use crate::jobs::KeyRef;

/// Column type as named by the cluster
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColumnType {
    Int,
    Real,
    Enum,
    String,
    Time,
    Uuid,
    Other(String),
}

impl ColumnType {
    fn from_name(name: &str) -> Self {
        match name {
            "int" => ColumnType::Int,
            "real" => ColumnType::Real,
            "enum" => ColumnType::Enum,
            "string" => ColumnType::String,
            "time" => ColumnType::Time,
            "uuid" => ColumnType::Uuid,
            other => ColumnType::Other(other.to_string()),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            ColumnType::Int => "int",
            ColumnType::Real => "real",
            ColumnType::Enum => "enum",
            ColumnType::String => "string",
            ColumnType::Time => "time",
            ColumnType::Uuid => "uuid",
            ColumnType::Other(name) => name,
        }
    }
}

/// A single preview value
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Number(f64),
    Text(String),
    Missing,
}

impl std::fmt::Display for Cell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Cell::Number(v) => write!(f, "{}", v),
            Cell::Text(s) => f.write_str(s),
            Cell::Missing => f.write_str("NA"),
        }
    }
}

/// Summary and preview of one column
#[derive(Debug, Clone)]
pub struct Column {
    pub label: String,
    pub column_type: ColumnType,
    pub missing_count: u64,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub mean: Option<f64>,
    pub sigma: Option<f64>,
    pub domain: Option<Vec<String>>,
    preview: Vec<Cell>,
}

impl Column {
    /// Preview values fetched with the frame
    pub fn preview(&self) -> &[Cell] {
        &self.preview
    }
}

/// Handle to a frame held by the cluster
#[derive(Debug, Clone)]
pub struct Frame {
    key: String,
    rows: u64,
    columns: Vec<Column>,
}

impl Frame {
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Total number of rows in the cluster-side frame
    pub fn nrows(&self) -> u64 {
        self.rows
    }

    pub fn ncols(&self) -> usize {
        self.columns.len()
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.label.as_str()).collect()
    }

    pub fn column(&self, label: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.label == label)
    }

    pub fn is_empty(&self) -> bool {
        self.rows == 0 || self.columns.is_empty()
    }

    /// Number of preview rows available locally
    pub fn preview_len(&self) -> usize {
        self.columns
            .iter()
            .map(|c| c.preview.len())
            .max()
            .unwrap_or(0)
    }

    /// First `n` preview rows, row-major
    ///
    /// Limited to what was fetched with the frame (`preview_rows`).
    pub fn head(&self, n: usize) -> Vec<Vec<Cell>> {
        let len = n.min(self.preview_len());
        (0..len)
            .map(|row| {
                self.columns
                    .iter()
                    .map(|c| c.preview.get(row).cloned().unwrap_or(Cell::Missing))
                    .collect()
            })
            .collect()
    }
}

// Wire types for GET /3/Frames/{key}

#[derive(Debug, Deserialize)]
struct FramesResponse {
    frames: Vec<FrameSchema>,
}

#[derive(Debug, Deserialize)]
struct FrameSchema {
    frame_id: KeyRef,
    rows: u64,
    #[serde(default)]
    columns: Vec<ColumnSchema>,
}

#[derive(Debug, Deserialize)]
struct ColumnSchema {
    label: String,
    #[serde(rename = "type")]
    column_type: String,
    #[serde(default)]
    missing_count: u64,
    #[serde(default)]
    mins: Vec<serde_json::Value>,
    #[serde(default)]
    maxs: Vec<serde_json::Value>,
    #[serde(default)]
    mean: serde_json::Value,
    #[serde(default)]
    sigma: serde_json::Value,
    #[serde(default)]
    domain: Option<Vec<String>>,
    #[serde(default)]
    data: Vec<serde_json::Value>,
    #[serde(default)]
    string_data: Option<Vec<Option<String>>>,
}

/// Numbers arrive as JSON numbers, or as the strings "NaN"/"Infinity"
fn number(value: &serde_json::Value) -> Option<f64> {
    match value {
        serde_json::Value::Number(n) => n.as_f64(),
        serde_json::Value::String(s) => s.parse::<f64>().ok().filter(|v| !v.is_nan()),
        _ => None,
    }
}

impl ColumnSchema {
    fn into_column(self) -> Column {
        let column_type = ColumnType::from_name(&self.column_type);

        let preview = match (&column_type, &self.string_data) {
            (ColumnType::String | ColumnType::Uuid, Some(strings)) => strings
                .iter()
                .map(|s| s.clone().map(Cell::Text).unwrap_or(Cell::Missing))
                .collect(),
            (ColumnType::Enum, _) => self
                .data
                .iter()
                .map(|v| {
                    number(v)
                        .filter(|code| *code >= 0.0 && code.fract() == 0.0)
                        .and_then(|code| {
                            self.domain
                                .as_ref()
                                .and_then(|d| d.get(code as usize))
                                .cloned()
                        })
                        .map(Cell::Text)
                        .unwrap_or(Cell::Missing)
                })
                .collect(),
            _ => self
                .data
                .iter()
                .map(|v| number(v).map(Cell::Number).unwrap_or(Cell::Missing))
                .collect(),
        };

        let numeric = matches!(
            column_type,
            ColumnType::Int | ColumnType::Real | ColumnType::Time
        );

        Column {
            label: self.label,
            missing_count: self.missing_count,
            min: self.mins.first().and_then(number).filter(|_| numeric),
            max: self.maxs.first().and_then(number).filter(|_| numeric),
            mean: number(&self.mean).filter(|_| numeric),
            sigma: number(&self.sigma).filter(|_| numeric),
            domain: self.domain,
            column_type,
            preview,
        }
    }
}

impl FrameSchema {
    fn into_frame(self) -> Frame {
        Frame {
            key: self.frame_id.name,
            rows: self.rows,
            columns: self
                .columns
                .into_iter()
                .map(ColumnSchema::into_column)
                .collect(),
        }
    }
}

impl Connection {
    /// Fetch a frame handle with `preview_rows` rows of data
    pub async fn frame(&self, key: &str) -> ClientResult<Frame> {
        let path = format!("/3/Frames/{}", urlencoding::encode(key));
        let query = [("row_count", self.config().preview_rows.to_string())];
        let response: FramesResponse = self.get_json(&path, &query).await?;

        response
            .frames
            .into_iter()
            .next()
            .map(FrameSchema::into_frame)
            .ok_or_else(|| ClientError::Parse(format!("No frame returned for key {}", key)))
    }

    /// Delete a frame from the cluster
    pub async fn remove_frame(&self, key: &str) -> ClientResult<()> {
        let path = format!("/3/Frames/{}", urlencoding::encode(key));
        self.delete(&path).await?;
        info!("Removed frame {}", key);
        Ok(())
    }
}
