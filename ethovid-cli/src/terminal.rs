// ============================================================================
// ethovid-cli/src/terminal.rs
// ============================================================================
//
// TERMINAL OUTPUT: Color, Section Formatting, Progress Bars
//
// Global output state (color on/off, current indicatif bar) behind a
// `once_cell::Lazy<Mutex<...>>`, the way the teacher's own terminal module
// keeps one process-wide terminal session instead of threading a handle
// through every command function.
//
// AI-ASSISTANT-INFO: Terminal color/formatting helpers and progress bar rendering

use std::sync::Mutex;

use indicatif::{ProgressBar, ProgressStyle};
use once_cell::sync::Lazy;
use owo_colors::OwoColorize;

struct TerminalState {
    use_color: bool,
    bar: Option<ProgressBar>,
}

static TERMINAL_STATE: Lazy<Mutex<TerminalState>> = Lazy::new(|| {
    Mutex::new(TerminalState {
        use_color: supports_color::on(supports_color::Stream::Stderr).is_some(),
        bar: None,
    })
});

/// Forces color on/off, overriding terminal auto-detection (used for
/// `--no-color` and for piping into non-terminal consumers).
pub fn set_color(enabled: bool) {
    TERMINAL_STATE.lock().expect("terminal state lock poisoned").use_color = enabled;
}

fn use_color() -> bool {
    TERMINAL_STATE.lock().expect("terminal state lock poisoned").use_color
}

/// A bold section heading, e.g. `=== Submitting job ===`.
pub fn print_section(title: &str) {
    if use_color() {
        eprintln!("{}", format!("=== {title} ===").bold());
    } else {
        eprintln!("=== {title} ===");
    }
}

pub fn print_success(message: &str) {
    if use_color() {
        eprintln!("{} {}", "OK".green().bold(), message);
    } else {
        eprintln!("OK {message}");
    }
}

pub fn print_error(message: &str) {
    if use_color() {
        eprintln!("{} {}", "ERROR".red().bold(), message);
    } else {
        eprintln!("ERROR {message}");
    }
}

pub fn print_warning(message: &str) {
    if use_color() {
        eprintln!("{} {}", "WARN".yellow().bold(), message);
    } else {
        eprintln!("WARN {message}");
    }
}

pub fn print_status(label: &str, value: &str) {
    if use_color() {
        eprintln!("  {}: {}", label.cyan(), value);
    } else {
        eprintln!("  {label}: {value}");
    }
}

/// Creates (or replaces) the single live progress bar for the attached job.
pub fn init_progress_bar(job_id: &str) {
    let bar = ProgressBar::new(100);
    bar.set_style(
        ProgressStyle::with_template("{prefix:.bold} [{bar:40.cyan/blue}] {percent}% {msg}")
            .expect("progress bar template is valid")
            .progress_chars("##-"),
    );
    bar.set_prefix(short_id(job_id));
    let mut state = TERMINAL_STATE.lock().expect("terminal state lock poisoned");
    state.bar = Some(bar);
}

/// Updates the live progress bar's percentage and status message.
pub fn update_progress_bar(percent: f64, stage: &str) {
    let state = TERMINAL_STATE.lock().expect("terminal state lock poisoned");
    if let Some(bar) = &state.bar {
        bar.set_position(percent.clamp(0.0, 100.0) as u64);
        bar.set_message(stage.to_string());
    }
}

/// Finishes and clears the live progress bar, printing a final status line.
pub fn finish_progress_bar(final_message: &str) {
    let mut state = TERMINAL_STATE.lock().expect("terminal state lock poisoned");
    if let Some(bar) = state.bar.take() {
        bar.finish_and_clear();
    }
    drop(state);
    print_status("final", final_message);
}

fn short_id(job_id: &str) -> String {
    job_id.chars().take(8).collect()
}
