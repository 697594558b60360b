// ============================================================================
// ethovid-core/src/progress/events.rs
// ============================================================================
//
// PROGRESS EVENTS: Wire-form Data Model (component G)
//
// Grounded on `original_source/backend/utils/progress_tracker.py`'s event
// dict shape, turned into a closed Rust enum per Design Notes §9
// ("dynamic attribute access... becomes a validated, tagged record").
//
// AI-ASSISTANT-INFO: Progress event types (component G)

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Discriminant for a progress event, forwarded verbatim to external
/// subscribers (e.g. a WebSocket façade) as `event_type`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProgressEventType {
    Started,
    Progress,
    StageChanged,
    Error,
    Completed,
    Cancelled,
}

impl ProgressEventType {
    /// A job is finished once one of these has been delivered; it must be
    /// the last event for that job.
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            ProgressEventType::Error | ProgressEventType::Completed | ProgressEventType::Cancelled
        )
    }
}

/// One event in a job's progress stream.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressEvent {
    pub job_id: String,
    pub event_type: ProgressEventType,
    pub timestamp: DateTime<Utc>,
    pub percent: f64,
    pub stage: String,
    pub message: Option<String>,
    pub payload: Option<Value>,
}

/// Envelope matching `spec.md` §6's progress event wire form, for forwarding
/// to external subscribers (e.g. a WebSocket façade).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressWireEnvelope {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub data: ProgressWireData,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressWireData {
    pub job_id: String,
    pub event_type: ProgressEventType,
    pub percentage: f64,
    pub stage: String,
    pub message: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl From<&ProgressEvent> for ProgressWireEnvelope {
    fn from(event: &ProgressEvent) -> Self {
        ProgressWireEnvelope {
            kind: "progress_update",
            data: ProgressWireData {
                job_id: event.job_id.clone(),
                event_type: event.event_type,
                percentage: event.percent,
                stage: event.stage.clone(),
                message: event.message.clone(),
                timestamp: event.timestamp,
            },
        }
    }
}
