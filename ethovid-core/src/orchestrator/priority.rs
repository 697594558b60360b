// ============================================================================
// ethovid-core/src/orchestrator/priority.rs
// ============================================================================
//
// JOB PRIORITY: Four-level Tag Mapped to Integer Weights (component F)
//
// AI-ASSISTANT-INFO: Job priority levels for the orchestrator's worker queue

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobPriority {
    Low,
    Normal,
    High,
    Urgent,
}

impl JobPriority {
    pub fn weight(self) -> u8 {
        match self {
            JobPriority::Low => 0,
            JobPriority::Normal => 1,
            JobPriority::High => 2,
            JobPriority::Urgent => 3,
        }
    }
}

impl Default for JobPriority {
    fn default() -> Self {
        JobPriority::Normal
    }
}
