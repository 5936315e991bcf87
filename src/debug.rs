//! # Debugging and Logging Utilities
//!
//! Conditional logging and timing helpers used across the analysis and
//! code-generation phases. Logging is gated by environment variables rather
//! than a tracing subscriber, matching the rest of this crate's preference
//! for a single self-contained pass with no process-wide setup step.

use std::time::Instant;

/// Checks if the general debug mode is active.
///
/// Debugging is enabled if the `CLASSGEN_DEBUG` environment variable is set
/// or if the crate is compiled with `debug_assertions` enabled.
pub fn is_debug_enabled() -> bool {
    std::env::var("CLASSGEN_DEBUG").is_ok() || cfg!(debug_assertions)
}

/// Checks if performance/verbose tracking mode is active.
pub fn is_perf_enabled() -> bool {
    std::env::var("CLASSGEN_VERBOSE").is_ok()
}

/// Logs a message related to the Program Analyzer phase (C6).
pub fn log_analysis(msg: &str) {
    if is_debug_enabled() {
        println!("[analysis] {}", msg);
    }
}

/// Logs a message related to data-section emission (C7).
pub fn log_data_section(msg: &str) {
    if is_debug_enabled() {
        println!("[data] {}", msg);
    }
}

/// Logs a message related to text-section emission (C8).
pub fn log_text_section(msg: &str) {
    if is_debug_enabled() {
        println!("[text] {}", msg);
    }
}

/// Logs a message related to runtime-library binding (C9).
pub fn log_runtime(msg: &str) {
    if is_debug_enabled() {
        println!("[runtime] {}", msg);
    }
}

/// A simple structure for timing the duration of specific code-generation phases.
///
/// Usage: `let timer = PerfTimer::new("data section"); ... timer.finish();`
pub struct PerfTimer {
    start: Instant,
    label: String,
}

impl PerfTimer {
    /// Creates a new timer instance, capturing the current moment.
    pub fn new(label: &str) -> Self {
        Self {
            start: Instant::now(),
            label: label.to_string(),
        }
    }

    /// Stops the timer and prints the elapsed duration if performance
    /// tracking (`is_perf_enabled`) is active.
    pub fn finish(self) {
        if is_perf_enabled() {
            let duration = self.start.elapsed();
            println!("[perf] {}: {:?}", self.label, duration);
        }
    }
}
