// ============================================================================
// ethovid-cli/src/commands/list.rs
// ============================================================================
//
// LIST COMMAND
//
// AI-ASSISTANT-INFO: `ethovid list` handler

use crate::commands::AppContext;
use crate::error::CliResult;
use crate::terminal;

pub fn run(ctx: &AppContext, json: bool) -> CliResult<()> {
    let mut jobs: Vec<_> = ctx.orchestrator.list_active().into_values().collect();
    jobs.sort_by(|a, b| a.id.cmp(&b.id));

    if json {
        println!("{}", serde_json::to_string_pretty(&jobs)?);
        return Ok(());
    }

    if jobs.is_empty() {
        terminal::print_status("active jobs", "none");
        return Ok(());
    }

    terminal::print_section(&format!("{} active job(s)", jobs.len()));
    for job in jobs {
        terminal::print_status(
            &job.id,
            &format!("{:?} {:.1}% ({})", job.status, job.progress_percent, job.stage),
        );
    }
    Ok(())
}
