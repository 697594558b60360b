// ============================================================================
// ethovid-core/src/progress/history.rs
// ============================================================================
//
// PROGRESS HISTORY: Bounded Per-job Snapshot/Event Retention (component G)
//
// Grounded on `progress_tracker.py`'s `ProgressHistory`
// (`deque(maxlen=100)` for both snapshots and events). `VecDeque` has no
// native `maxlen`, so every push here manually truncates the front,
// the direct Rust analogue of Python's `deque(maxlen=N)` behavior.
//
// AI-ASSISTANT-INFO: Bounded progress history with speed/ETA estimation

use std::collections::VecDeque;

use chrono::{DateTime, Utc};

use crate::progress::events::ProgressEvent;

pub const HISTORY_MAX_ENTRIES: usize = 100;

/// One point on a job's progress curve.
#[derive(Debug, Clone, Copy)]
pub struct ProgressSnapshot {
    pub percent: f64,
    pub timestamp: DateTime<Utc>,
}

/// Bounded snapshot/event history for a single job.
#[derive(Debug, Clone)]
pub struct ProgressHistory {
    snapshots: VecDeque<ProgressSnapshot>,
    events: VecDeque<ProgressEvent>,
    pub started_at: DateTime<Utc>,
    pub ended_at: Option<DateTime<Utc>>,
}

impl ProgressHistory {
    pub fn new(started_at: DateTime<Utc>) -> Self {
        Self {
            snapshots: VecDeque::new(),
            events: VecDeque::new(),
            started_at,
            ended_at: None,
        }
    }

    pub fn push_snapshot(&mut self, snapshot: ProgressSnapshot) {
        if self.snapshots.len() >= HISTORY_MAX_ENTRIES {
            self.snapshots.pop_front();
        }
        self.snapshots.push_back(snapshot);
    }

    pub fn push_event(&mut self, event: ProgressEvent) {
        if event.event_type.is_terminal() {
            self.ended_at = Some(event.timestamp);
        }
        if self.events.len() >= HISTORY_MAX_ENTRIES {
            self.events.pop_front();
        }
        self.events.push_back(event);
    }

    pub fn snapshots(&self) -> &VecDeque<ProgressSnapshot> {
        &self.snapshots
    }

    pub fn events(&self) -> &VecDeque<ProgressEvent> {
        &self.events
    }

    pub fn last_event_is_terminal(&self) -> bool {
        self.events.back().map(|e| e.event_type.is_terminal()).unwrap_or(false)
    }

    /// `avg_speed = (last.percent - first.percent) / (last.ts - first.ts)`,
    /// in percent per second. `None` if fewer than two snapshots exist.
    pub fn avg_speed(&self) -> Option<f64> {
        let first = self.snapshots.front()?;
        let last = self.snapshots.back()?;
        let elapsed = (last.timestamp - first.timestamp).num_milliseconds() as f64 / 1000.0;
        if elapsed <= 0.0 {
            return None;
        }
        Some((last.percent - first.percent) / elapsed)
    }

    /// `ETA = now + (100 - current)/avg_speed` when `avg_speed > 0` and the
    /// job has not yet reached 100%; `None` otherwise.
    pub fn eta(&self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        let current = self.snapshots.back()?.percent;
        if current >= 100.0 {
            return None;
        }
        let speed = self.avg_speed()?;
        if speed <= 0.0 {
            return None;
        }
        let remaining_secs = (100.0 - current) / speed;
        Some(now + chrono::Duration::milliseconds((remaining_secs * 1000.0) as i64))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress::events::ProgressEventType;

    fn snap(percent: f64, secs: i64) -> ProgressSnapshot {
        ProgressSnapshot {
            percent,
            timestamp: Utc::now() + chrono::Duration::seconds(secs),
        }
    }

    #[test]
    fn avg_speed_is_none_with_fewer_than_two_snapshots() {
        let mut history = ProgressHistory::new(Utc::now());
        assert_eq!(history.avg_speed(), None);
        history.push_snapshot(snap(10.0, 0));
        assert_eq!(history.avg_speed(), None);
    }

    #[test]
    fn avg_speed_is_positive_when_percent_increases() {
        let mut history = ProgressHistory::new(Utc::now());
        history.push_snapshot(snap(0.0, 0));
        history.push_snapshot(snap(50.0, 10));
        let speed = history.avg_speed().unwrap();
        assert!(speed > 0.0);
        assert!((speed - 5.0).abs() < 1e-6);
    }

    #[test]
    fn eta_is_none_once_complete() {
        let mut history = ProgressHistory::new(Utc::now());
        history.push_snapshot(snap(0.0, 0));
        history.push_snapshot(snap(100.0, 10));
        assert_eq!(history.eta(Utc::now()), None);
    }

    #[test]
    fn snapshots_are_truncated_to_max_entries() {
        let mut history = ProgressHistory::new(Utc::now());
        for i in 0..(HISTORY_MAX_ENTRIES + 10) {
            history.push_snapshot(snap(i as f64, i as i64));
        }
        assert_eq!(history.snapshots().len(), HISTORY_MAX_ENTRIES);
    }

    #[test]
    fn terminal_event_sets_ended_at() {
        let mut history = ProgressHistory::new(Utc::now());
        history.push_event(ProgressEvent {
            job_id: "job-1".to_string(),
            event_type: ProgressEventType::Completed,
            timestamp: Utc::now(),
            percent: 100.0,
            stage: "done".to_string(),
            message: None,
            payload: None,
        });
        assert!(history.ended_at.is_some());
        assert!(history.last_event_is_terminal());
    }
}
