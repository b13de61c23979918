//! Output formatting for wpfix
//!
//! Supports text (colored terminal), JSON and unified diff output formats.

use anyhow::Result;
use colored::*;
use serde::Serialize;
use std::path::Path;

/// Output format selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
    Diff,
}

impl OutputFormat {
    pub fn from_str(s: &str) -> Option<OutputFormat> {
        match s.to_lowercase().as_str() {
            "text" => Some(OutputFormat::Text),
            "json" => Some(OutputFormat::Json),
            "diff" => Some(OutputFormat::Diff),
            _ => None,
        }
    }
}

/// Information about a single applied (or pending) fix
#[derive(Debug, Clone, Serialize)]
pub struct FixInfo {
    pub rule: String,
    pub line: usize,
    pub column: usize,
    pub original: String,
    pub replacement: String,
    /// Text added further along, such as the `, true` closing `in_array()`
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub inserted: Vec<String>,
}

/// Result of processing a single file
#[derive(Debug, Clone, Serialize)]
pub struct FileResult {
    pub path: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub fixes: Vec<FixInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skipped: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl FileResult {
    pub fn success(path: &Path, fixes: Vec<FixInfo>) -> Self {
        Self {
            path: path.display().to_string(),
            fixes,
            skipped: None,
            error: None,
        }
    }

    pub fn skipped(path: &Path, reason: String) -> Self {
        Self {
            skipped: Some(reason),
            ..Self::success(path, Vec::new())
        }
    }

    pub fn error(path: &Path, error: String) -> Self {
        Self {
            error: Some(error),
            ..Self::success(path, Vec::new())
        }
    }
}

/// Summary statistics
#[derive(Debug, Clone, Default, Serialize)]
pub struct Summary {
    pub files_processed: usize,
    pub files_with_changes: usize,
    pub total_fixes: usize,
    /// Files left untouched because they could not be decoded or tokenized
    pub files_skipped: usize,
    pub errors: usize,
}

/// Full JSON output structure
#[derive(Debug, Serialize)]
pub struct JsonOutput {
    pub version: String,
    pub mode: &'static str,
    pub summary: Summary,
    pub files: Vec<FileResult>,
}

/// Reporter for accumulating and outputting results
pub struct Reporter {
    format: OutputFormat,
    verbose: bool,
    results: Vec<FileResult>,
    summary: Summary,
}

impl Reporter {
    pub fn new(format: OutputFormat, verbose: bool) -> Self {
        Self {
            format,
            verbose,
            results: Vec::new(),
            summary: Summary::default(),
        }
    }

    /// Report a file with pending fixes (check mode)
    pub fn report_check(
        &mut self,
        path: &Path,
        fixes: Vec<FixInfo>,
        old_source: &str,
        new_source: &str,
    ) {
        if fixes.is_empty() {
            self.report_unchanged(path);
            return;
        }

        self.summary.files_processed += 1;
        self.summary.files_with_changes += 1;
        self.summary.total_fixes += fixes.len();

        match self.format {
            OutputFormat::Text => {
                println!("{}", path.display().to_string().bold());
                print_diff(old_source, new_source);
                println!();
                for fix in &fixes {
                    println!(
                        "  {} {}:{} {}",
                        "->".green(),
                        fix.line,
                        fix.column,
                        fix.rule.cyan()
                    );
                }
                println!();
            }
            OutputFormat::Diff => {
                print_unified_diff(path, old_source, new_source);
            }
            OutputFormat::Json => {
                // JSON output is handled in finish()
            }
        }

        self.results.push(FileResult::success(path, fixes));
    }

    /// Report a file after writing its fixes
    pub fn report_fix(&mut self, path: &Path, fixes: Vec<FixInfo>) {
        if fixes.is_empty() {
            self.report_unchanged(path);
            return;
        }

        self.summary.files_processed += 1;
        self.summary.files_with_changes += 1;
        self.summary.total_fixes += fixes.len();

        if self.format == OutputFormat::Text {
            println!("{}", path.display().to_string().bold());
            println!("  {} Applied {} fix(es)", "OK".green(), fixes.len());
            if self.verbose {
                for fix in &fixes {
                    println!("    {}:{} {}", fix.line, fix.column, fix.rule);
                }
            }
            println!();
        }

        self.results.push(FileResult::success(path, fixes));
    }

    /// Report a file that needed no changes
    pub fn report_unchanged(&mut self, path: &Path) {
        self.summary.files_processed += 1;
        if self.verbose && self.format == OutputFormat::Text {
            println!("{}: No changes needed", path.display());
        }
        self.results.push(FileResult::success(path, vec![]));
    }

    /// Report a file left untouched because it could not be decoded or
    /// tokenized
    pub fn report_skipped(&mut self, path: &Path, reason: &str) {
        self.summary.files_processed += 1;
        self.summary.files_skipped += 1;

        if self.format == OutputFormat::Text {
            eprintln!(
                "{}: {} - skipping ({})",
                "Warning".yellow(),
                path.display(),
                reason
            );
        }

        self.results.push(FileResult::skipped(path, reason.to_string()));
    }

    /// Report an error reading or writing a file
    pub fn report_error(&mut self, path: &Path, error: &str) {
        self.summary.files_processed += 1;
        self.summary.errors += 1;

        if self.format == OutputFormat::Text {
            eprintln!("{}: {} - {}", "Error".red(), path.display(), error);
        }

        self.results.push(FileResult::error(path, error.to_string()));
    }

    /// Print final summary/output
    pub fn finish(self, check_mode: bool) -> Result<()> {
        match self.format {
            OutputFormat::Text => {
                if self.verbose {
                    println!("{}", "Summary".bold().underline());
                    println!("  Files processed: {}", self.summary.files_processed);
                    println!("  Files with changes: {}", self.summary.files_with_changes);
                    println!("  Total fixes: {}", self.summary.total_fixes);
                    if self.summary.files_skipped > 0 {
                        println!("  Skipped: {}", self.summary.files_skipped);
                    }
                    if self.summary.errors > 0 {
                        println!("  Errors: {}", self.summary.errors);
                    }
                    println!();
                }

                println!("{}", summary_line(&self.summary, check_mode).bold());

                if check_mode && self.summary.total_fixes > 0 {
                    println!("{}", "Run with --fix to apply changes".yellow());
                }
            }
            OutputFormat::Json => {
                let output = JsonOutput {
                    version: env!("CARGO_PKG_VERSION").to_string(),
                    mode: if check_mode { "check" } else { "fix" },
                    summary: self.summary,
                    files: self.results,
                };
                println!("{}", serde_json::to_string_pretty(&output)?);
            }
            OutputFormat::Diff => {
                // Patch-compatible output has no trailer
            }
        }
        Ok(())
    }

    /// Get summary for exit code determination
    pub fn summary(&self) -> &Summary {
        &self.summary
    }
}

/// The one-line human summary printed at the end of a text run
pub fn summary_line(summary: &Summary, check_mode: bool) -> String {
    if summary.total_fixes == 0 {
        return "No fixable issues found".to_string();
    }

    let verb = if check_mode { "Found" } else { "Fixed" };
    format!(
        "{} {} issue(s) in {} file(s)",
        verb, summary.total_fixes, summary.files_with_changes
    )
}

/// Print a colored diff between old and new content
fn print_diff(old: &str, new: &str) {
    for diff_result in diff::lines(old, new) {
        match diff_result {
            diff::Result::Left(l) => {
                println!("  {}", format!("- {}", l).red());
            }
            diff::Result::Right(r) => {
                println!("  {}", format!("+ {}", r).green());
            }
            diff::Result::Both(_, _) => {}
        }
    }
}

/// Print unified diff format (standard diff -u compatible)
fn print_unified_diff(path: &Path, old: &str, new: &str) {
    print!("{}", unified_diff(path, old, new));
}

fn unified_diff(path: &Path, old: &str, new: &str) -> String {
    use similar::TextDiff;

    let path_str = path.display().to_string();
    let text_diff = TextDiff::from_lines(old, new);
    let mut unified = text_diff.unified_diff();
    unified
        .context_radius(3)
        .header(&format!("a/{}", path_str), &format!("b/{}", path_str));
    unified.to_string()
}
