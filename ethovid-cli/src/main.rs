// ============================================================================
// ethovid-cli/src/main.rs
// ============================================================================
//
// ENTRY POINT: Parses Arguments, Wires the Orchestrator, Dispatches Commands
//
// AI-ASSISTANT-INFO: Binary entry point for the `ethovid` CLI

use std::sync::Arc;

use clap::Parser;

use ethovid_core::compressor::AdaptiveCompressor;
use ethovid_core::config::CoreConfigBuilder;
use ethovid_core::encoding::SidecarSpawner;
use ethovid_core::external::{CrateFfprobeExecutor, MotionIntensityComputer, OpencvFrameSource};
use ethovid_core::progress::ProgressBus;
use ethovid_core::{JobOrchestrator, ProfileRegistry};

use ethovid_cli::cli::{Cli, Commands};
use ethovid_cli::commands::{cancel, list, recommend, status, submit, AppContext};
use ethovid_cli::{config as cli_config, logging, terminal};

fn build_context() -> anyhow::Result<AppContext> {
    let config = CoreConfigBuilder::new()
        .worker_pool_size(cli_config::DEFAULT_WORKER_POOL_SIZE)
        .default_profile(cli_config::DEFAULT_PROFILE)
        .build()
        .with_env_overrides();

    let profiles = Arc::new(ProfileRegistry::new());
    let bus = ProgressBus::new();

    let intensity_config = config.clone();
    let compressor = AdaptiveCompressor::new(
        config.clone(),
        profiles.clone(),
        bus.clone(),
        SidecarSpawner,
        Arc::new(|path: &std::path::Path| Ok(Box::new(OpencvFrameSource::open(path)?) as Box<_>)),
        Arc::new(move || Ok(Box::new(MotionIntensityComputer::new(&intensity_config)?) as Box<_>)),
    );

    let orchestrator = Arc::new(JobOrchestrator::new(compressor, profiles.clone(), config.worker_pool_size));

    Ok(AppContext {
        orchestrator,
        bus,
        profiles,
        config,
        ffprobe: CrateFfprobeExecutor::new(),
    })
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    terminal::set_color(!cli.no_color);

    let log_dir = std::env::temp_dir().join("ethovid-logs");
    let interactive = !cli.json && console::Term::stderr().is_term();
    let log_path = logging::init_logging(&log_dir, cli.verbose, interactive)?;
    log::debug!("logging to {}", log_path.display());

    let ctx = build_context()?;

    let result = match &cli.command {
        Commands::Submit(args) => submit::run(&ctx, args, args.watch, cli.json),
        Commands::Status { job_id } => status::run(&ctx, job_id, cli.json),
        Commands::List => list::run(&ctx, cli.json),
        Commands::Cancel { job_id } => cancel::run(&ctx, job_id, cli.json),
        Commands::Recommend { input } => recommend::run(&ctx, input, cli.json),
    };

    if let Err(err) = &result {
        terminal::print_error(&format!("{err:#}"));
    }
    result
}
