// ============================================================================
// ethovid-core/src/progress/bus.rs
// ============================================================================
//
// PROGRESS BUS: Typed Pub/Sub With Per-job and Global Subscribers (component G)
//
// Grounded on `progress_tracker.py`'s `ProgressTracker`/`ProgressReporter`
// (queue + dedicated worker thread + per-job/global subscriber lists).
// Rather than a reentrant lock guarding shared maps, this rendition makes
// the dispatcher thread the sole owner and mutator of all bus state:
// every public method (`register`, `update`, `subscribe`, `history`, ...)
// sends a `Command` over an `mpsc::Sender` and, where a value must be
// returned, waits on a one-shot reply channel. This keeps producers never
// blocked on subscribers (per spec.md §5) while still giving per-job event
// ordering for free (one thread drains the queue in send order).
//
// AI-ASSISTANT-INFO: Progress bus (component G)

use std::collections::HashMap;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc::{self, Sender};
use std::thread::JoinHandle;

use chrono::{DateTime, Duration, Utc};
use serde_json::Value;

use crate::progress::events::{ProgressEvent, ProgressEventType};
use crate::progress::history::{ProgressHistory, ProgressSnapshot};

type Callback = Box<dyn Fn(&ProgressEvent) + Send + 'static>;

/// Snapshot/event/speed/ETA bundle returned by `ProgressBus::history`.
pub struct HistoryReport {
    pub snapshots: Vec<ProgressSnapshot>,
    pub events: Vec<ProgressEvent>,
    pub avg_speed: Option<f64>,
    pub eta: Option<DateTime<Utc>>,
}

enum Command {
    Register { job_id: String, stage: String },
    Update { job_id: String, percent: f64, stage: Option<String>, message: Option<String>, payload: Option<Value> },
    ChangeStage { job_id: String, stage: String, message: Option<String> },
    Complete { job_id: String, message: Option<String> },
    Fail { job_id: String, message: String, payload: Option<Value> },
    Cancel { job_id: String, message: Option<String> },
    Subscribe { job_id: Option<String>, id: u64, callback: Callback },
    Unsubscribe { job_id: Option<String>, id: u64 },
    History { job_id: String, reply: Sender<Option<HistoryReport>> },
    Cleanup { max_age: Duration },
}

struct DispatcherState {
    histories: HashMap<String, ProgressHistory>,
    current_stage: HashMap<String, String>,
    per_job_subscribers: HashMap<String, Vec<(u64, Callback)>>,
    global_subscribers: Vec<(u64, Callback)>,
}

impl DispatcherState {
    fn new() -> Self {
        Self {
            histories: HashMap::new(),
            current_stage: HashMap::new(),
            per_job_subscribers: HashMap::new(),
            global_subscribers: Vec::new(),
        }
    }

    fn dispatch(&mut self, event: ProgressEvent) {
        let job_id = event.job_id.clone();
        if let Some(history) = self.histories.get_mut(&job_id) {
            history.push_snapshot(ProgressSnapshot {
                percent: event.percent,
                timestamp: event.timestamp,
            });
            history.push_event(event.clone());
        }

        if let Some(subs) = self.per_job_subscribers.get(&job_id) {
            for (_, cb) in subs {
                invoke_safely(cb, &event);
            }
        }
        for (_, cb) in &self.global_subscribers {
            invoke_safely(cb, &event);
        }
    }

    fn emit_simple(&mut self, job_id: &str, event_type: ProgressEventType, percent: f64, stage: String, message: Option<String>, payload: Option<Value>) {
        self.current_stage.insert(job_id.to_string(), stage.clone());
        let event = ProgressEvent {
            job_id: job_id.to_string(),
            event_type,
            timestamp: Utc::now(),
            percent,
            stage,
            message,
            payload,
        };
        self.dispatch(event);
    }
}

fn invoke_safely(cb: &Callback, event: &ProgressEvent) {
    if catch_unwind(AssertUnwindSafe(|| cb(event))).is_err() {
        log::error!("progress subscriber callback panicked for job {}", event.job_id);
    }
}

/// Typed progress event bus. Cheaply cloneable; all clones share the same
/// dispatcher thread and state.
#[derive(Clone)]
pub struct ProgressBus {
    tx: Sender<Command>,
    next_subscriber_id: std::sync::Arc<AtomicU64>,
}

impl ProgressBus {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel::<Command>();
        let handle: JoinHandle<()> = std::thread::Builder::new()
            .name("ethovid-progress-dispatcher".to_string())
            .spawn(move || {
                let mut state = DispatcherState::new();
                for command in rx {
                    match command {
                        Command::Register { job_id, stage } => {
                            state
                                .histories
                                .insert(job_id.clone(), ProgressHistory::new(Utc::now()));
                            state.emit_simple(&job_id, ProgressEventType::Started, 0.0, stage, None, None);
                        }
                        Command::Update { job_id, percent, stage, message, payload } => {
                            let stage = stage.unwrap_or_else(|| {
                                state.current_stage.get(&job_id).cloned().unwrap_or_default()
                            });
                            state.emit_simple(&job_id, ProgressEventType::Progress, percent, stage, message, payload);
                        }
                        Command::ChangeStage { job_id, stage, message } => {
                            let percent = state
                                .histories
                                .get(&job_id)
                                .and_then(|h| h.snapshots().back().map(|s| s.percent))
                                .unwrap_or(0.0);
                            state.emit_simple(&job_id, ProgressEventType::StageChanged, percent, stage, message, None);
                        }
                        Command::Complete { job_id, message } => {
                            let stage = state.current_stage.get(&job_id).cloned().unwrap_or_default();
                            state.emit_simple(&job_id, ProgressEventType::Completed, 100.0, stage, message, None);
                        }
                        Command::Fail { job_id, message, payload } => {
                            let stage = state.current_stage.get(&job_id).cloned().unwrap_or_default();
                            let percent = state
                                .histories
                                .get(&job_id)
                                .and_then(|h| h.snapshots().back().map(|s| s.percent))
                                .unwrap_or(0.0);
                            state.emit_simple(&job_id, ProgressEventType::Error, percent, stage, Some(message), payload);
                        }
                        Command::Cancel { job_id, message } => {
                            let stage = state.current_stage.get(&job_id).cloned().unwrap_or_default();
                            let percent = state
                                .histories
                                .get(&job_id)
                                .and_then(|h| h.snapshots().back().map(|s| s.percent))
                                .unwrap_or(0.0);
                            state.emit_simple(&job_id, ProgressEventType::Cancelled, percent, stage, message, None);
                        }
                        Command::Subscribe { job_id, id, callback } => match job_id {
                            Some(job_id) => state
                                .per_job_subscribers
                                .entry(job_id)
                                .or_default()
                                .push((id, callback)),
                            None => state.global_subscribers.push((id, callback)),
                        },
                        Command::Unsubscribe { job_id, id } => match job_id {
                            Some(job_id) => {
                                if let Some(subs) = state.per_job_subscribers.get_mut(&job_id) {
                                    subs.retain(|(sub_id, _)| *sub_id != id);
                                }
                            }
                            None => state.global_subscribers.retain(|(sub_id, _)| *sub_id != id),
                        },
                        Command::History { job_id, reply } => {
                            let report = state.histories.get(&job_id).map(|history| {
                                let now = Utc::now();
                                HistoryReport {
                                    snapshots: history.snapshots().iter().cloned().collect(),
                                    events: history.events().iter().cloned().collect(),
                                    avg_speed: history.avg_speed(),
                                    eta: history.eta(now),
                                }
                            });
                            let _ = reply.send(report);
                        }
                        Command::Cleanup { max_age } => {
                            let now = Utc::now();
                            state.histories.retain(|_, history| match history.ended_at {
                                Some(ended) => now - ended < max_age,
                                None => true,
                            });
                        }
                    }
                }
                // Loop exits once every `Sender` (every `ProgressBus` clone)
                // has been dropped and `rx` disconnects.
            })
            .expect("failed to spawn progress dispatcher thread");
        // The dispatcher thread outlives this constructor; it exits when
        // every `ProgressBus` clone (and therefore `tx`) has been dropped.
        drop(handle);

        Self {
            tx,
            next_subscriber_id: std::sync::Arc::new(AtomicU64::new(1)),
        }
    }

    pub fn register(&self, job_id: impl Into<String>, initial_stage: impl Into<String>) {
        let _ = self.tx.send(Command::Register {
            job_id: job_id.into(),
            stage: initial_stage.into(),
        });
    }

    pub fn update(&self, job_id: impl Into<String>, percent: f64, stage: Option<String>, message: Option<String>, payload: Option<Value>) {
        let _ = self.tx.send(Command::Update {
            job_id: job_id.into(),
            percent,
            stage,
            message,
            payload,
        });
    }

    pub fn change_stage(&self, job_id: impl Into<String>, stage: impl Into<String>, message: Option<String>) {
        let _ = self.tx.send(Command::ChangeStage {
            job_id: job_id.into(),
            stage: stage.into(),
            message,
        });
    }

    pub fn complete(&self, job_id: impl Into<String>, message: Option<String>) {
        let _ = self.tx.send(Command::Complete {
            job_id: job_id.into(),
            message,
        });
    }

    pub fn fail(&self, job_id: impl Into<String>, message: impl Into<String>, payload: Option<Value>) {
        let _ = self.tx.send(Command::Fail {
            job_id: job_id.into(),
            message: message.into(),
            payload,
        });
    }

    pub fn cancel(&self, job_id: impl Into<String>, message: Option<String>) {
        let _ = self.tx.send(Command::Cancel {
            job_id: job_id.into(),
            message,
        });
    }

    /// Subscribes to a single job's events. Returns a token for `unsubscribe`.
    pub fn subscribe(&self, job_id: impl Into<String>, callback: impl Fn(&ProgressEvent) + Send + 'static) -> u64 {
        let id = self.next_subscriber_id.fetch_add(1, Ordering::SeqCst);
        let _ = self.tx.send(Command::Subscribe {
            job_id: Some(job_id.into()),
            id,
            callback: Box::new(callback),
        });
        id
    }

    /// Subscribes to every job's events.
    pub fn subscribe_all(&self, callback: impl Fn(&ProgressEvent) + Send + 'static) -> u64 {
        let id = self.next_subscriber_id.fetch_add(1, Ordering::SeqCst);
        let _ = self.tx.send(Command::Subscribe {
            job_id: None,
            id,
            callback: Box::new(callback),
        });
        id
    }

    pub fn unsubscribe(&self, job_id: impl Into<String>, id: u64) {
        let _ = self.tx.send(Command::Unsubscribe {
            job_id: Some(job_id.into()),
            id,
        });
    }

    pub fn unsubscribe_all(&self, id: u64) {
        let _ = self.tx.send(Command::Unsubscribe { job_id: None, id });
    }

    pub fn history(&self, job_id: impl Into<String>) -> Option<HistoryReport> {
        let (reply_tx, reply_rx) = mpsc::channel();
        self.tx
            .send(Command::History {
                job_id: job_id.into(),
                reply: reply_tx,
            })
            .ok()?;
        reply_rx.recv().ok().flatten()
    }

    /// Evicts finished-job histories whose terminal event is older than `max_age`.
    pub fn cleanup(&self, max_age: Duration) {
        let _ = self.tx.send(Command::Cleanup { max_age });
    }
}

impl Default for ProgressBus {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};
    use std::time::Duration as StdDuration;

    fn wait_for<F: Fn() -> bool>(predicate: F) {
        for _ in 0..200 {
            if predicate() {
                return;
            }
            std::thread::sleep(StdDuration::from_millis(5));
        }
        panic!("condition not met within timeout");
    }

    #[test]
    fn register_then_complete_emits_started_and_completed_in_order() {
        let bus = ProgressBus::new();
        let received: Arc<Mutex<Vec<ProgressEventType>>> = Arc::new(Mutex::new(Vec::new()));
        let received_clone = received.clone();
        bus.subscribe("job-1", move |event| {
            received_clone.lock().unwrap().push(event.event_type);
        });

        bus.register("job-1", "analyzing");
        bus.update("job-1", 50.0, None, None, None);
        bus.complete("job-1", None);

        wait_for(|| received.lock().unwrap().len() == 3);
        let events = received.lock().unwrap().clone();
        assert_eq!(
            events,
            vec![
                ProgressEventType::Started,
                ProgressEventType::Progress,
                ProgressEventType::Completed
            ]
        );
    }

    #[test]
    fn terminal_event_is_last_in_history() {
        let bus = ProgressBus::new();
        bus.register("job-2", "analyzing");
        bus.update("job-2", 40.0, None, None, None);
        bus.cancel("job-2", Some("user requested".to_string()));

        wait_for(|| {
            bus.history("job-2")
                .map(|h| h.events.last().map(|e| e.event_type) == Some(ProgressEventType::Cancelled))
                .unwrap_or(false)
        });
    }

    #[test]
    fn panicking_subscriber_does_not_stop_dispatch() {
        let bus = ProgressBus::new();
        bus.subscribe_all(|_event| panic!("boom"));

        let received: Arc<Mutex<bool>> = Arc::new(Mutex::new(false));
        let received_clone = received.clone();
        bus.subscribe("job-3", move |_event| {
            *received_clone.lock().unwrap() = true;
        });

        bus.register("job-3", "analyzing");
        wait_for(|| *received.lock().unwrap());
    }
}
