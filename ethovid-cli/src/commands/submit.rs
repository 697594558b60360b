// ============================================================================
// ethovid-cli/src/commands/submit.rs
// ============================================================================
//
// SUBMIT COMMAND
//
// AI-ASSISTANT-INFO: `ethovid submit` handler

use ethovid_core::orchestrator::{JobPriority, SubmitRequest};

use crate::cli::SubmitArgs;
use crate::commands::AppContext;
use crate::error::{CliErrorContext, CliResult};
use crate::{progress, terminal};

fn parse_priority(raw: &str) -> CliResult<JobPriority> {
    match raw.to_ascii_lowercase().as_str() {
        "low" => Ok(JobPriority::Low),
        "normal" => Ok(JobPriority::Normal),
        "high" => Ok(JobPriority::High),
        "urgent" => Ok(JobPriority::Urgent),
        other => Err(anyhow::anyhow!("unknown priority '{other}' (expected low, normal, high, or urgent)")),
    }
}

pub fn run(ctx: &AppContext, args: &SubmitArgs, watch: bool, json: bool) -> CliResult<()> {
    let priority = parse_priority(&args.priority)?;

    let request = SubmitRequest {
        input_path: args.input.clone(),
        output_path: args.output.clone(),
        profile_name: args.profile.clone(),
        roi_enabled: args.roi,
        priority,
    };

    let job_id = ctx
        .orchestrator
        .submit(request)
        .cli_with_context(|| format!("submitting {}", args.input.display()))?;

    if json {
        println!("{}", serde_json::json!({ "job_id": job_id }));
    } else {
        terminal::print_section("Job submitted");
        terminal::print_status("job_id", &job_id);
        terminal::print_status("profile", &args.profile);
    }

    if watch {
        progress::watch_job(&ctx.bus, &job_id);
    }

    Ok(())
}
