// ============================================================================
// ethovid-cli/src/commands/recommend.rs
// ============================================================================
//
// RECOMMEND COMMAND
//
// Runs motion analysis against an input file directly (no job is created)
// and reports each built-in profile's estimated size/processing time, the
// way the teacher's CLI offers a dry-run quality estimate ahead of a real
// encode.
//
// AI-ASSISTANT-INFO: `ethovid recommend` handler

use std::path::Path;

use anyhow::Context;
use ethovid_core::external::{MotionIntensityComputer, OpencvFrameSource};
use ethovid_core::motion::{analyze, NullAnalysisProgress};

use crate::commands::AppContext;
use crate::error::{CliErrorContext, CliResult};
use crate::terminal;

pub fn run(ctx: &AppContext, input: &Path, json: bool) -> CliResult<()> {
    let properties = ctx.probe(input).context("probing input with ffprobe")?;
    let size_mb = std::fs::metadata(input).cli_context("reading input file size")?.len() as f64 / (1024.0 * 1024.0);

    let mut source = OpencvFrameSource::open(input).cli_context("opening input with opencv")?;
    let mut intensity = MotionIntensityComputer::new(&ctx.config).cli_context("constructing intensity computer")?;
    let result = analyze(&mut source, &mut intensity, &ctx.config, &NullAnalysisProgress)
        .cli_context("analyzing motion")?;

    let estimates = ctx
        .profiles
        .recommend(properties.duration_secs, size_mb, result.overall_activity_ratio);

    if json {
        println!("{}", serde_json::to_string_pretty(&estimates)?);
        return Ok(());
    }

    terminal::print_section(&format!("Recommendations for {}", input.display()));
    terminal::print_status("activity ratio", &format!("{:.2}", result.overall_activity_ratio));
    terminal::print_status("duration", &format!("{:.1}s", properties.duration_secs));
    terminal::print_status("size", &format!("{size_mb:.1} MB"));

    let mut names: Vec<_> = estimates.keys().cloned().collect();
    names.sort();
    for name in names {
        let estimate = &estimates[&name];
        terminal::print_status(
            &name,
            &format!(
                "~{:.1} MB, ~{:.1} min -- {}",
                estimate.estimated_size_mb, estimate.estimated_processing_minutes, estimate.rationale
            ),
        );
    }

    Ok(())
}
