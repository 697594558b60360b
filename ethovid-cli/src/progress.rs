// ============================================================================
// ethovid-cli/src/progress.rs
// ============================================================================
//
// CLI PROGRESS SUBSCRIBER
//
// Subscribes to one job's events on a `ProgressBus` and drives the
// terminal's live progress bar, mirroring the teacher's
// `CliProgressCallback` (a plain struct implementing the core's progress
// trait, dispatching by event type) but against `ethovid_core::progress`'s
// `ProgressEvent`/`ProgressEventType` instead of `drapto-core`'s own.
//
// AI-ASSISTANT-INFO: terminal progress-bar subscriber for --watch

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use ethovid_core::progress::{ProgressBus, ProgressEvent, ProgressEventType};

use crate::config::WATCH_POLL_INTERVAL_MS;
use crate::terminal;

/// Attaches a progress bar to `job_id` and blocks until it reaches a
/// terminal event (`Completed`, `Error`, or `Cancelled`).
pub fn watch_job(bus: &ProgressBus, job_id: &str) {
    terminal::init_progress_bar(job_id);

    let done = Arc::new(AtomicBool::new(false));
    let done_clone = done.clone();
    let subscription = bus.subscribe(job_id.to_string(), move |event: &ProgressEvent| {
        handle_event(event);
        if matches!(
            event.event_type,
            ProgressEventType::Completed | ProgressEventType::Error | ProgressEventType::Cancelled
        ) {
            done_clone.store(true, Ordering::SeqCst);
        }
    });

    while !done.load(Ordering::SeqCst) {
        std::thread::sleep(Duration::from_millis(WATCH_POLL_INTERVAL_MS));
    }
    bus.unsubscribe(job_id.to_string(), subscription);
}

fn handle_event(event: &ProgressEvent) {
    match event.event_type {
        ProgressEventType::Started => {
            terminal::update_progress_bar(0.0, &event.stage);
        }
        ProgressEventType::Progress | ProgressEventType::StageChanged => {
            terminal::update_progress_bar(event.percent, &event.stage);
        }
        ProgressEventType::Completed => {
            terminal::finish_progress_bar("completed");
        }
        ProgressEventType::Error => {
            let reason = event.message.clone().unwrap_or_else(|| "unknown error".to_string());
            terminal::finish_progress_bar(&format!("failed: {reason}"));
        }
        ProgressEventType::Cancelled => {
            terminal::finish_progress_bar("cancelled");
        }
    }
}
