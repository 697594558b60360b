// ============================================================================
// ethovid-core/src/orchestrator/mod.rs
// ============================================================================
//
// JOB ORCHESTRATOR: Lifecycle, Worker Pool, Batch Submission (component F)
//
// Wraps an `AdaptiveCompressor` with a fixed-size worker pool pulling from a
// priority queue. `AdaptiveCompressor::start_job` itself returns
// immediately (its own contract, §4.E); each orchestrator worker thread
// additionally blocks until the job it just dispatched reaches a terminal
// status before popping the next one, which is what actually bounds
// concurrent compressions to `worker_pool_size`, the one fixed-size-pool
// requirement `spec.md` §4.F/§5 adds on top of the compressor's contract.
//
// AI-ASSISTANT-INFO: Module declarations and job orchestrator (component F)

mod priority;
mod worker_pool;

pub use priority::JobPriority;
pub use worker_pool::PriorityQueue;

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use uuid::Uuid;

use crate::compressor::{AdaptiveCompressor, JobRecord, JobStatus};
use crate::encoding::FfmpegSpawner;
use crate::error::{CoreError, CoreResult};
use crate::profiles::ProfileRegistry;

const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// A single job request as seen by `submit`/`submit_batch`.
#[derive(Debug, Clone)]
pub struct SubmitRequest {
    pub input_path: PathBuf,
    pub output_path: PathBuf,
    pub profile_name: String,
    pub roi_enabled: bool,
    pub priority: JobPriority,
}

struct QueuedJob {
    id: String,
    batch_id: Option<String>,
    request: SubmitRequest,
}

/// Tracks job lifecycle, exposes submit/cancel/status/list, and owns the
/// worker pool.
pub struct JobOrchestrator<S: FfmpegSpawner> {
    compressor: AdaptiveCompressor<S>,
    profiles: Arc<ProfileRegistry>,
    queue: Arc<PriorityQueue<QueuedJob>>,
    pending_jobs: Arc<Mutex<HashMap<String, JobRecord>>>,
}

impl<S> JobOrchestrator<S>
where
    S: FfmpegSpawner + Clone + Send + Sync + 'static,
    S::Process: Send,
{
    pub fn new(compressor: AdaptiveCompressor<S>, profiles: Arc<ProfileRegistry>, worker_pool_size: usize) -> Self {
        let queue: Arc<PriorityQueue<QueuedJob>> = Arc::new(PriorityQueue::new());
        let pending_jobs: Arc<Mutex<HashMap<String, JobRecord>>> = Arc::new(Mutex::new(HashMap::new()));

        let worker_compressor = compressor.clone();
        let worker_pending = pending_jobs.clone();
        worker_pool::spawn_workers(worker_pool_size, queue.clone(), move |queued: QueuedJob| {
            let already_cancelled = {
                let mut pending = worker_pending.lock().expect("pending jobs lock poisoned");
                match pending.remove(&queued.id) {
                    Some(record) => record.status == JobStatus::Cancelled,
                    None => true, // unknown: nothing to dispatch
                }
            };
            if already_cancelled {
                return;
            }

            let start_result = worker_compressor.start_job(
                queued.id.clone(),
                queued.request.input_path.clone(),
                queued.request.output_path.clone(),
                queued.request.profile_name.clone(),
                queued.request.roi_enabled,
                queued.batch_id.clone(),
            );
            if start_result.is_err() {
                // Profile was already validated at submission time; this
                // should not happen in practice.
                return;
            }

            loop {
                match worker_compressor.status(&queued.id) {
                    Some(job) if job.status.is_terminal() => break,
                    None => break,
                    _ => std::thread::sleep(POLL_INTERVAL),
                }
            }
        });

        Self {
            compressor,
            profiles,
            queue,
            pending_jobs,
        }
    }

    /// Enqueues a single job. Validates `request.profile_name` before
    /// creating any job record: an unknown profile fails immediately with
    /// no record persisted and no event emitted.
    pub fn submit(&self, request: SubmitRequest) -> CoreResult<String> {
        self.profiles.get(&request.profile_name)?;

        let id = Uuid::new_v4().to_string();
        self.enqueue(id.clone(), None, request);
        Ok(id)
    }

    /// Fans a batch of requests out into N independent jobs sharing one
    /// batch ID. Every profile name is validated before any job in the
    /// batch is created: one invalid request fails the whole batch.
    pub fn submit_batch(&self, requests: Vec<SubmitRequest>) -> CoreResult<Vec<String>> {
        for request in &requests {
            self.profiles.get(&request.profile_name)?;
        }

        let batch_id = Uuid::new_v4().to_string();
        let mut ids = Vec::with_capacity(requests.len());
        for request in requests {
            let id = Uuid::new_v4().to_string();
            self.enqueue(id.clone(), Some(batch_id.clone()), request);
            ids.push(id);
        }
        Ok(ids)
    }

    fn enqueue(&self, id: String, batch_id: Option<String>, request: SubmitRequest) {
        let mut record = JobRecord::new(&id, request.input_path.to_string_lossy(), request.output_path.to_string_lossy(), &request.profile_name, request.roi_enabled);
        record.batch_id = batch_id.clone();
        record.stage = "queued".to_string();
        let _ = record.transition_to(JobStatus::Queued);
        self.pending_jobs.lock().expect("pending jobs lock poisoned").insert(id.clone(), record);

        let priority = request.priority;
        self.queue.push(priority, QueuedJob { id, batch_id, request });
    }

    pub fn status(&self, job_id: &str) -> Option<JobRecord> {
        if let Some(job) = self.compressor.status(job_id) {
            return Some(job);
        }
        self.pending_jobs.lock().expect("pending jobs lock poisoned").get(job_id).cloned()
    }

    /// Shared progress bus, for callers (and tests) that want to subscribe
    /// to a job's event stream rather than poll `status`.
    pub fn progress_bus(&self) -> &crate::progress::ProgressBus {
        self.compressor.progress_bus()
    }

    /// Marks a job cancelled. Returns `false` for an unknown or
    /// already-terminal job. A job still sitting in `pending_jobs` (never
    /// dispatched to the compressor) is registered with the progress bus
    /// and immediately cancelled there too, so a cancelled-while-queued job
    /// still emits the terminal `Cancelled` event callers expect.
    pub fn cancel(&self, job_id: &str) -> bool {
        if self.compressor.status(job_id).is_some() {
            return self.compressor.cancel(job_id);
        }
        let mut pending = self.pending_jobs.lock().expect("pending jobs lock poisoned");
        match pending.get_mut(job_id) {
            Some(record) if !record.status.is_terminal() => {
                let _ = record.transition_to(JobStatus::Cancelled);
                self.compressor.progress_bus().register(job_id, "queued");
                self.compressor.progress_bus().cancel(job_id, Some("cancelled while queued".to_string()));
                true
            }
            _ => false,
        }
    }

    pub fn list_active(&self) -> HashMap<String, JobRecord> {
        let mut map: HashMap<String, JobRecord> = HashMap::new();
        for job in self.compressor.list_all() {
            map.insert(job.id.clone(), job);
        }
        for (id, job) in self.pending_jobs.lock().expect("pending jobs lock poisoned").iter() {
            map.entry(id.clone()).or_insert_with(|| job.clone());
        }
        map.retain(|_, job| !job.status.is_terminal());
        map
    }
}

/// Validates a caller-requested transition against the shared status graph,
/// surfacing `InvalidTransition` without mutating the job, used by callers
/// that want to pre-flight a transition (e.g. a `retry` command) before
/// calling into the compressor.
pub fn validate_transition(from: JobStatus, to: JobStatus) -> CoreResult<()> {
    crate::compressor::transition(from, to).map_err(|e| match e {
        CoreError::InvalidTransition { from, to } => CoreError::InvalidTransition { from, to },
        other => other,
    })
}
