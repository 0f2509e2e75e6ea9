//! Server-side asynchronous jobs
//!
//! Parsing runs as a job on the cluster. The client polls
//! `GET /3/Jobs/{key}` until the job reaches a terminal state.

use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::connection::Connection;
use crate::error::{ClientError, ClientResult};

/// Reference to a keyed object in the cluster's key/value store
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct KeyRef {
    pub name: String,
}

/// Job lifecycle state
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum JobStatus {
    Created,
    Running,
    Done,
    Failed,
    Cancelled,
    #[serde(other)]
    Unknown,
}

impl JobStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            JobStatus::Done | JobStatus::Failed | JobStatus::Cancelled
        )
    }
}

/// A job as reported by the cluster
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    pub key: KeyRef,
    pub status: JobStatus,
    #[serde(default)]
    pub progress: f64,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub exception: Option<String>,
    #[serde(default)]
    pub dest: Option<KeyRef>,
}

#[derive(Debug, Deserialize)]
struct JobsResponse {
    jobs: Vec<Job>,
}

impl Job {
    fn into_outcome(self) -> ClientResult<Job> {
        match self.status {
            JobStatus::Failed | JobStatus::Cancelled => {
                let message = self
                    .exception
                    .clone()
                    .unwrap_or_else(|| format!("job ended with status {:?}", self.status));
                Err(ClientError::JobFailed {
                    job: self.key.name,
                    message,
                })
            }
            _ => Ok(self),
        }
    }
}

impl Connection {
    /// Fetch the current state of a job
    pub async fn job(&self, key: &str) -> ClientResult<Job> {
        let path = format!("/3/Jobs/{}", urlencoding::encode(key));
        let response: JobsResponse = self.get_json(&path, &[]).await?;
        response
            .jobs
            .into_iter()
            .next()
            .ok_or_else(|| ClientError::Parse(format!("No job returned for key {}", key)))
    }

    /// Poll a job until it finishes
    ///
    /// Returns the finished job, `JobFailed` for failed or cancelled jobs,
    /// and `JobTimeout` once `job_timeout_secs` have elapsed.
    pub async fn wait_for_job(&self, key: &str) -> ClientResult<Job> {
        let interval = Duration::from_millis(self.config().job_poll_interval_ms);
        let limit = Duration::from_secs(self.config().job_timeout_secs);
        let started = Instant::now();

        loop {
            let job = self.job(key).await?;
            if job.status.is_terminal() {
                info!(
                    "Job {} finished with status {:?} after {:.1}s",
                    key,
                    job.status,
                    started.elapsed().as_secs_f64()
                );
                return job.into_outcome();
            }

            debug!("Job {} {:?}: {:.0}%", key, job.status, job.progress * 100.0);

            if started.elapsed() >= limit {
                return Err(ClientError::JobTimeout {
                    job: key.to_string(),
                    secs: self.config().job_timeout_secs,
                });
            }

            tokio::time::sleep(interval).await;
        }
    }
}
