// ============================================================================
// ethovid-cli/src/logging.rs
// ============================================================================
//
// LOGGING SETUP
//
// Wires `fern` to both a colored terminal sink and a rotating-by-run log
// file under the user's chosen output directory, with `log`'s level
// controlled by `--verbose`. `ethovid-core` only logs through the `log`
// facade and installs no backend of its own; the CLI process installs its
// own `fern` dispatch as the global logger so both core and CLI messages
// flow through one sink.
//
// AI-ASSISTANT-INFO: fern/log logging setup for the CLI binary

use std::path::{Path, PathBuf};

use chrono::Local;

/// Returns a timestamp suitable for a log file name: `20260731_143000`.
pub fn get_timestamp() -> String {
    Local::now().format("%Y%m%d_%H%M%S").to_string()
}

/// Initializes logging. An attached terminal gets `fern`'s colored,
/// file-plus-stderr dispatch; piped/non-interactive output (e.g. `--json`
/// consumed by another process) falls back to `env_logger`'s plain
/// single-stream format so machine-readable stdout stays uninterleaved with
/// log lines.
pub fn init_logging(log_dir: &Path, verbose: bool, interactive: bool) -> anyhow::Result<PathBuf> {
    std::fs::create_dir_all(log_dir)?;
    let log_path = log_dir.join(format!("ethovid_{}.log", get_timestamp()));
    let level = if verbose { log::LevelFilter::Debug } else { log::LevelFilter::Info };

    if interactive {
        let file_dispatch = fern::Dispatch::new()
            .format(|out, message, record| {
                out.finish(format_args!(
                    "{} [{}] {}: {}",
                    chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
                    record.level(),
                    record.target(),
                    message
                ))
            })
            .chain(fern::log_file(&log_path)?);

        let stderr_dispatch = fern::Dispatch::new()
            .format(|out, message, record| out.finish(format_args!("[{}] {}", record.level(), message)))
            .chain(std::io::stderr());

        fern::Dispatch::new()
            .level(level)
            .chain(file_dispatch)
            .chain(stderr_dispatch)
            .apply()?;
    } else {
        env_logger::Builder::new()
            .filter_level(level)
            .target(env_logger::Target::Stderr)
            .init();
    }

    Ok(log_path)
}
