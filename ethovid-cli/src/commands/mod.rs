// ============================================================================
// ethovid-cli/src/commands/mod.rs
// ============================================================================
//
// COMMAND HANDLERS: One Module Per Subcommand
//
// AI-ASSISTANT-INFO: Module declarations for submit/status/list/cancel/recommend

pub mod cancel;
pub mod list;
pub mod recommend;
pub mod status;
pub mod submit;

use std::sync::Arc;

use ethovid_core::encoding::SidecarSpawner;
use ethovid_core::external::{CrateFfprobeExecutor, FfprobeExecutor};
use ethovid_core::progress::ProgressBus;
use ethovid_core::{CoreConfig, JobOrchestrator, ProfileRegistry};

/// Everything a command handler needs: the orchestrator, the shared progress
/// bus it was built with, the profile registry, and the resolved config.
pub struct AppContext {
    pub orchestrator: Arc<JobOrchestrator<SidecarSpawner>>,
    pub bus: ProgressBus,
    pub profiles: Arc<ProfileRegistry>,
    pub config: CoreConfig,
    pub ffprobe: CrateFfprobeExecutor,
}

impl AppContext {
    pub fn probe(&self, path: &std::path::Path) -> anyhow::Result<ethovid_core::external::VideoProperties> {
        Ok(self.ffprobe.get_video_properties(path)?)
    }
}
