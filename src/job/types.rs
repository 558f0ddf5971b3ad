use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::EditOptions;

/// Opaque job identifier, unique per submission.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct JobId(String);

impl JobId {
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for JobId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for JobId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Job lifecycle states; the last three are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Queued,
    Processing,
    Completed,
    Error,
    Cancelled,
}

impl JobStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Error | Self::Cancelled)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Queued => "queued",
            Self::Processing => "processing",
            Self::Completed => "completed",
            Self::Error => "error",
            Self::Cancelled => "cancelled",
        }
    }
}

/// One end-to-end edit request tracked through its lifecycle.
///
/// Exclusively mutated by its own worker while running; read-only for
/// external observers; immutable once terminal.
#[derive(Debug, Clone)]
pub struct Job {
    pub id: JobId,
    pub owner: String,
    pub source_filename: String,
    pub status: JobStatus,
    /// Integer percentage in [0, 100], monotone non-decreasing
    pub progress: u8,
    pub options: EditOptions,
    pub input_path: PathBuf,
    /// Present only once the job completed
    pub output_path: Option<PathBuf>,
    /// Present only once the job errored
    pub error: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Job {
    pub fn new(owner: impl Into<String>, input_path: impl Into<PathBuf>, options: EditOptions) -> Self {
        let input_path = input_path.into();
        let source_filename = input_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self {
            id: JobId::new(),
            owner: owner.into(),
            source_filename,
            status: JobStatus::Queued,
            progress: 0,
            options,
            input_path,
            output_path: None,
            error: None,
            created_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn job_ids_are_unique() {
        assert_ne!(JobId::new(), JobId::new());
    }

    #[test]
    fn terminal_states_are_exactly_the_last_three() {
        assert!(!JobStatus::Queued.is_terminal());
        assert!(!JobStatus::Processing.is_terminal());
        assert!(JobStatus::Completed.is_terminal());
        assert!(JobStatus::Error.is_terminal());
        assert!(JobStatus::Cancelled.is_terminal());
    }

    #[test]
    fn new_jobs_start_queued_with_zero_progress() {
        let job = Job::new("alice", "/videos/input.mp4", EditOptions::default());
        assert_eq!(job.status, JobStatus::Queued);
        assert_eq!(job.progress, 0);
        assert_eq!(job.source_filename, "input.mp4");
        assert!(job.output_path.is_none());
        assert!(job.error.is_none());
    }

    #[test]
    fn status_names_are_lowercase() {
        assert_eq!(JobStatus::Processing.as_str(), "processing");
        assert_eq!(JobStatus::Cancelled.as_str(), "cancelled");
    }
}
