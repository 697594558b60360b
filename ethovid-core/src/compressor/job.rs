// ============================================================================
// ethovid-core/src/compressor/job.rs
// ============================================================================
//
// JOB RECORD: Status Machine and Job Snapshot (components E & F)
//
// `JobStatus`/`transition` are grounded verbatim on
// `original_source/backend/models/compression_job.py`'s
// `JobUpdateRequest.validate_status_transition` table. Replaces that
// module's per-field pydantic validation (which never validated the
// transition graph as a whole) with one function that is the single point
// of truth for the graph, callable from both the orchestrator and its
// tests, per Design Notes §9.
//
// AI-ASSISTANT-INFO: Job record and status transition graph (components E & F)

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};

/// A job's position in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Pending,
    Queued,
    Running,
    Paused,
    Completed,
    Failed,
    Cancelled,
}

impl JobStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Failed | JobStatus::Cancelled)
    }
}

/// Validates a requested status transition against the orchestrator's state
/// graph: `pending -> {queued, cancelled}`, `queued -> {running, cancelled}`,
/// `running -> {completed, failed, cancelled, paused}`,
/// `paused -> {running, cancelled}`, `failed -> {pending}` (retry),
/// `completed -> {}`, `cancelled -> {}`.
pub fn transition(from: JobStatus, to: JobStatus) -> CoreResult<()> {
    use JobStatus::*;
    let allowed = match from {
        Pending => matches!(to, Queued | Cancelled),
        Queued => matches!(to, Running | Cancelled),
        Running => matches!(to, Completed | Failed | Cancelled | Paused),
        Paused => matches!(to, Running | Cancelled),
        Failed => matches!(to, Pending),
        Completed | Cancelled => false,
    };

    if allowed {
        Ok(())
    } else {
        Err(CoreError::InvalidTransition {
            from: format!("{from:?}"),
            to: format!("{to:?}"),
        })
    }
}

/// Full job state as tracked by the adaptive compressor / orchestrator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobRecord {
    pub id: String,
    pub input_path: String,
    pub output_path: String,
    pub profile_name: String,
    pub roi_enabled: bool,
    pub status: JobStatus,
    pub progress_percent: f64,
    pub stage: String,
    pub segments_current: u32,
    pub segments_total: u32,
    pub started_at: Option<DateTime<Utc>>,
    pub ended_at: Option<DateTime<Utc>>,
    pub original_size_bytes: Option<u64>,
    pub compressed_size_bytes: Option<u64>,
    pub error_message: Option<String>,
    /// Identifier shared by every job produced from one `submit_batch` call.
    pub batch_id: Option<String>,
}

impl JobRecord {
    pub fn new(id: impl Into<String>, input_path: impl Into<String>, output_path: impl Into<String>, profile_name: impl Into<String>, roi_enabled: bool) -> Self {
        Self {
            id: id.into(),
            input_path: input_path.into(),
            output_path: output_path.into(),
            profile_name: profile_name.into(),
            roi_enabled,
            status: JobStatus::Pending,
            progress_percent: 0.0,
            stage: "pending".to_string(),
            segments_current: 0,
            segments_total: 0,
            started_at: None,
            ended_at: None,
            original_size_bytes: None,
            compressed_size_bytes: None,
            error_message: None,
            batch_id: None,
        }
    }

    /// Moves to `to`, validating against the transition graph.
    pub fn transition_to(&mut self, to: JobStatus) -> CoreResult<()> {
        transition(self.status, to)?;
        self.status = to;
        if to == JobStatus::Running && self.started_at.is_none() {
            self.started_at = Some(Utc::now());
        }
        if to.is_terminal() {
            self.ended_at = Some(Utc::now());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pending_to_running_directly_is_rejected() {
        assert!(transition(JobStatus::Pending, JobStatus::Running).is_err());
    }

    #[test]
    fn full_happy_path_is_allowed() {
        assert!(transition(JobStatus::Pending, JobStatus::Queued).is_ok());
        assert!(transition(JobStatus::Queued, JobStatus::Running).is_ok());
        assert!(transition(JobStatus::Running, JobStatus::Completed).is_ok());
    }

    #[test]
    fn terminal_states_accept_nothing() {
        for to in [JobStatus::Pending, JobStatus::Queued, JobStatus::Running] {
            assert!(transition(JobStatus::Completed, to).is_err());
            assert!(transition(JobStatus::Cancelled, to).is_err());
        }
    }

    #[test]
    fn failed_jobs_may_retry_from_pending() {
        assert!(transition(JobStatus::Failed, JobStatus::Pending).is_ok());
        assert!(transition(JobStatus::Failed, JobStatus::Running).is_err());
    }

    #[test]
    fn job_record_tracks_started_and_ended_timestamps() {
        let mut job = JobRecord::new("job-1", "in.mp4", "out.mp4", "balanced", false);
        job.transition_to(JobStatus::Queued).unwrap();
        job.transition_to(JobStatus::Running).unwrap();
        assert!(job.started_at.is_some());
        job.transition_to(JobStatus::Completed).unwrap();
        assert!(job.ended_at.is_some());
    }
}
