//! Logging module for wpfix
//!
//! Optional run log enabled with `--log`. Records the configuration in
//! effect, the rule set and every file decision, so a batch run over a
//! large plugin tree can be audited afterwards.

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Global logger instance
static LOGGER: Mutex<Option<FixLogger>> = Mutex::new(None);

/// Logger for fix runs
pub struct FixLogger {
    file: File,
}

impl FixLogger {
    /// Create a new logger writing to the specified path
    pub fn new(log_path: &Path) -> std::io::Result<Self> {
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(log_path)?;

        Ok(Self { file })
    }

    /// Write a log message
    pub fn log(&mut self, message: &str) {
        let timestamp = chrono::Local::now().format("%Y-%m-%d %H:%M:%S%.3f");
        let _ = writeln!(self.file, "[{}] {}", timestamp, message);
        let _ = self.file.flush();
    }

    /// Log a section header
    pub fn section(&mut self, title: &str) {
        let separator = "=".repeat(60);
        self.log(&separator);
        self.log(title);
        self.log(&separator);
    }
}

/// Default log location when `--log` is given without a path
pub fn default_log_path() -> PathBuf {
    let timestamp = chrono::Local::now().format("%Y%m%d_%H%M%S");
    std::env::temp_dir().join(format!("wpfix-{}.log", timestamp))
}

/// Initialize the global logger
pub fn init_logger(log_path: Option<&Path>) -> std::io::Result<PathBuf> {
    let path = log_path
        .map(|p| p.to_path_buf())
        .unwrap_or_else(default_log_path);

    let logger = FixLogger::new(&path)?;

    if let Ok(mut guard) = LOGGER.lock() {
        *guard = Some(logger);
    }

    Ok(path)
}

/// Log a message to the global logger
pub fn log(message: &str) {
    if let Ok(mut guard) = LOGGER.lock() {
        if let Some(ref mut logger) = *guard {
            logger.log(message);
        }
    }
}

/// Log a section header
pub fn section(title: &str) {
    if let Ok(mut guard) = LOGGER.lock() {
        if let Some(ref mut logger) = *guard {
            logger.section(title);
        }
    }
}

/// Check if logging is enabled
pub fn is_enabled() -> bool {
    if let Ok(guard) = LOGGER.lock() {
        guard.is_some()
    } else {
        false
    }
}

/// Log where the configuration came from
pub fn log_config_source(source: Option<&Path>) {
    section("CONFIGURATION");
    match source {
        Some(path) => log(&format!("Loaded config from: {}", path.display())),
        None => log("No config file, using defaults"),
    }
}

/// Log the rules that will run, in the order they are tried
pub fn log_rules(rules: &[&str], fix_mode: bool) {
    log(&format!("Mode: {}", if fix_mode { "fix" } else { "check" }));
    log(&format!("Rules ({}): {}", rules.len(), rules.join(", ")));
}

/// Log the start of processing
pub fn log_run_start(files_count: usize, missing_count: usize) {
    section("PROCESSING");
    log(&format!("Files to process: {}", files_count));
    if missing_count > 0 {
        log(&format!("Missing paths: {}", missing_count));
    }
}

/// Log the outcome for one file
pub fn log_file_fixes(path: &Path, rules: &[&str]) {
    if rules.is_empty() {
        log(&format!("{}: no fixes", path.display()));
        return;
    }
    log(&format!("{}: {} fix(es)", path.display(), rules.len()));
    for rule in rules {
        log(&format!("  {}", rule));
    }
}

/// Log a file left untouched because it could not be tokenized
pub fn log_file_skipped(path: &Path, reason: &str) {
    log(&format!("SKIPPED: {} - {}", path.display(), reason));
}

/// Log a read or write failure
pub fn log_file_error(path: &Path, error: &str) {
    log(&format!("ERROR: {} - {}", path.display(), error));
}

/// Log a file written back to disk
pub fn log_file_written(path: &Path, bytes: usize) {
    log(&format!("Wrote {} ({} bytes)", path.display(), bytes));
}

/// Log the run summary
pub fn log_run_complete(total_fixes: usize, files_changed: usize, skipped: usize, errors: usize) {
    section("RUN COMPLETE");
    log(&format!("Total fixes: {}", total_fixes));
    log(&format!("Files changed: {}", files_changed));
    log(&format!("Files skipped: {}", skipped));
    log(&format!("Errors: {}", errors));
}
