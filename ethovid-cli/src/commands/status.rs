// ============================================================================
// ethovid-cli/src/commands/status.rs
// ============================================================================
//
// STATUS COMMAND
//
// AI-ASSISTANT-INFO: `ethovid status` handler

use crate::commands::AppContext;
use crate::error::{CliErrorContext, CliResult};
use crate::terminal;

pub fn run(ctx: &AppContext, job_id: &str, json: bool) -> CliResult<()> {
    let job = ctx
        .orchestrator
        .status(job_id)
        .cli_context("no such job id")?;

    if json {
        println!("{}", serde_json::to_string_pretty(&job)?);
        return Ok(());
    }

    terminal::print_section(&format!("Job {job_id}"));
    terminal::print_status("status", &format!("{:?}", job.status));
    terminal::print_status("stage", &job.stage);
    terminal::print_status("progress", &format!("{:.1}%", job.progress_percent));
    terminal::print_status(
        "segments",
        &format!("{}/{}", job.segments_current, job.segments_total),
    );
    if let Some(reason) = &job.error_message {
        terminal::print_status("error", reason);
    }

    if let Some(history) = ctx.bus.history(job_id.to_string()) {
        if let Some(speed) = history.avg_speed {
            terminal::print_status("avg_speed", &format!("{speed:.3} %/s"));
        }
        if let Some(eta) = history.eta {
            terminal::print_status("eta", &eta.to_rfc3339());
        }
    }

    Ok(())
}
