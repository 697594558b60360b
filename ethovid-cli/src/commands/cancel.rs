// ============================================================================
// ethovid-cli/src/commands/cancel.rs
// ============================================================================
//
// CANCEL COMMAND
//
// AI-ASSISTANT-INFO: `ethovid cancel` handler

use crate::commands::AppContext;
use crate::error::CliResult;
use crate::terminal;

pub fn run(ctx: &AppContext, job_id: &str, json: bool) -> CliResult<()> {
    let cancelled = ctx.orchestrator.cancel(job_id);

    if json {
        println!("{}", serde_json::json!({ "job_id": job_id, "cancelled": cancelled }));
        return Ok(());
    }

    if cancelled {
        terminal::print_success(&format!("cancelled {job_id}"));
    } else {
        terminal::print_warning(&format!("{job_id} was not cancellable (unknown or already finished)"));
    }
    Ok(())
}
