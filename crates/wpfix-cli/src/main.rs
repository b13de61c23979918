//! wpfix CLI - WordPress coding-standard fixer for PHP sources
//!
//! Available rules:
//! - yoda_condition: Convert $x === 'a' to 'a' === $x
//! - short_ternary: Convert $x ?: $d to $x ? $x : $d
//! - wp_die_translate: Convert wp_die(__()) to wp_die(esc_html__())
//! - echo_translate: Convert echo __() to echo esc_html__()
//! - escape_i18n: Convert _e() to esc_html_e()
//! - safe_redirect: Convert wp_redirect() to wp_safe_redirect()
//! - in_array_strict: Add `true` to two-argument in_array() calls

mod config;
mod logging;
mod output;
mod process;

use anyhow::{Context, Result};
use clap::Parser;
use colored::*;
use rayon::prelude::*;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use config::{Config, Exclusions};
use output::{FixInfo, OutputFormat, Reporter};
use process::{process_source, read_source, write_file, Source};
use wpfix_rules::RuleRegistry;

#[derive(Parser)]
#[command(name = "wpfix")]
#[command(version)]
#[command(about = "Fix WordPress coding-standard violations in PHP files")]
#[command(author = "wpfix contributors")]
struct Cli {
    /// Files or directories to process
    #[arg(required_unless_present = "list_rules")]
    paths: Vec<PathBuf>,

    /// Report fixable issues without writing files (default mode)
    #[arg(long, conflicts_with = "fix")]
    check: bool,

    /// Write fixes back to files
    #[arg(long, conflicts_with = "check")]
    fix: bool,

    /// Show changes without applying them (alias for --check)
    #[arg(long, short = 'n', hide = true, conflicts_with = "fix")]
    dry_run: bool,

    /// Show verbose output
    #[arg(long, short = 'v')]
    verbose: bool,

    /// Rules to run (can be specified multiple times). Overrides config file.
    #[arg(long, short = 'r', value_name = "RULE")]
    rule: Vec<String>,

    /// Output format: text, json, diff
    #[arg(long, value_name = "FORMAT")]
    format: Option<String>,

    /// Shorthand for --format json
    #[arg(long, conflicts_with = "format")]
    json: bool,

    /// Path to config file (default: auto-detect .wpfix.toml)
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Ignore config files
    #[arg(long, conflicts_with = "config")]
    no_config: bool,

    /// List available rules and exit
    #[arg(long)]
    list_rules: bool,

    /// Write a run log (default: a timestamped file in the temp directory)
    #[arg(long, value_name = "PATH")]
    log: Option<Option<PathBuf>>,
}

fn main() -> ExitCode {
    match run() {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{}: {:#}", "Error".red(), e);
            ExitCode::from(1)
        }
    }
}

fn run() -> Result<ExitCode> {
    let cli = Cli::parse();

    if let Some(log_path) = &cli.log {
        let path = logging::init_logger(log_path.as_deref())
            .context("Failed to open log file")?;
        if cli.verbose {
            eprintln!("{}: {}", "Logging to".bold(), path.display());
        }
    }

    // Load config file
    let (config, config_path) = if cli.no_config {
        (Config::default(), None)
    } else if let Some(config_path) = &cli.config {
        (Config::load_path(config_path)?, Some(config_path.clone()))
    } else {
        match Config::load()? {
            Some((cfg, path)) => (cfg, Some(path)),
            None => (Config::default(), None),
        }
    };
    logging::log_config_source(config_path.as_deref());

    let registry = RuleRegistry::with_renames(&config.rules.rename)
        .context("Invalid rename rule in configuration")?;

    // Handle --list-rules
    if cli.list_rules {
        println!("{}", "Available rules:".bold());
        for (name, description) in registry.list_rules() {
            println!("  {} - {}", name.green(), description);
        }
        return Ok(ExitCode::SUCCESS);
    }

    // Determine output format
    let output_format = if cli.json {
        OutputFormat::Json
    } else {
        let format = cli
            .format
            .as_deref()
            .or(config.output.format.as_deref())
            .unwrap_or("text");
        OutputFormat::from_str(format).ok_or_else(|| {
            anyhow::anyhow!(
                "Invalid output format '{}'. Valid options: text, json, diff",
                format
            )
        })?
    };

    if cli.verbose && output_format == OutputFormat::Text {
        if let Some(path) = &config_path {
            println!("{}: {}", "Using config".bold(), path.display());
        }
    }

    let all_rules = registry.all_names();

    // Validate rule names from CLI
    for rule in &cli.rule {
        if !all_rules.contains(&rule.as_str()) {
            eprintln!(
                "{}: Unknown rule '{}'. Use --list-rules to see available rules.",
                "Error".red(),
                rule
            );
            return Ok(ExitCode::from(1));
        }
    }
    for rule in config.unknown_rules(&all_rules) {
        eprintln!(
            "{}: Unknown rule '{}' in config, ignoring",
            "Warning".yellow(),
            rule
        );
    }

    let enabled_rules = config.effective_rules(&all_rules, &cli.rule);
    if enabled_rules.is_empty() {
        eprintln!("{}: No rules enabled", "Error".red());
        return Ok(ExitCode::from(1));
    }

    // Determine mode: fix or check (check is default)
    let fix_mode = cli.fix && !cli.check && !cli.dry_run;
    let check_mode = !fix_mode;

    let ordered_rules: Vec<&str> = all_rules
        .iter()
        .copied()
        .filter(|name| enabled_rules.contains(*name))
        .collect();
    logging::log_rules(&ordered_rules, fix_mode);

    if cli.verbose && output_format == OutputFormat::Text {
        println!(
            "{}: {}",
            "Mode".bold(),
            if fix_mode { "fix" } else { "check" }
        );
        println!("{}: {}", "Rules".bold(), ordered_rules.join(", "));
        println!();
    }

    let exclusions = config.exclusions()?;
    let (file_paths, missing_paths) = collect_files(&cli.paths, &exclusions);
    logging::log_run_start(file_paths.len(), missing_paths.len());

    // Process files in parallel
    let mut results: Vec<(PathBuf, FileOutcome)> = file_paths
        .into_par_iter()
        .map(|path| {
            let outcome = process_file_to_outcome(&path, &registry, &enabled_rules);
            (path, outcome)
        })
        .collect();

    // Sort results by path for deterministic output
    results.sort_by(|a, b| a.0.cmp(&b.0));

    let mut reporter = Reporter::new(output_format, cli.verbose);

    for path in &missing_paths {
        if output_format == OutputFormat::Text {
            eprintln!(
                "{}: Path does not exist: {}",
                "Error".red(),
                path.display()
            );
        }
        logging::log_file_error(path, "path does not exist");
    }

    for (path, outcome) in results {
        report_outcome(&path, outcome, fix_mode, &mut reporter);
    }

    // Determine exit code
    let summary = reporter.summary();
    logging::log_run_complete(
        summary.total_fixes,
        summary.files_with_changes,
        summary.files_skipped,
        summary.errors,
    );
    let exit_code = if summary.errors > 0 || !missing_paths.is_empty() {
        ExitCode::from(1)
    } else if check_mode && summary.files_with_changes > 0 {
        ExitCode::from(2)
    } else {
        ExitCode::SUCCESS
    };

    reporter.finish(check_mode)?;

    Ok(exit_code)
}

/// Expand the given paths into PHP files, returning missing paths separately
fn collect_files(paths: &[PathBuf], exclusions: &Exclusions) -> (Vec<PathBuf>, Vec<PathBuf>) {
    let mut file_paths: Vec<PathBuf> = Vec::new();
    let mut missing_paths: Vec<PathBuf> = Vec::new();

    for path in paths {
        if path.is_file() {
            file_paths.push(path.clone());
        } else if path.is_dir() {
            for entry in walkdir::WalkDir::new(path)
                .into_iter()
                .filter_entry(|e| {
                    e.depth() == 0 || !(e.file_type().is_dir() && exclusions.prunes_dir(e.path()))
                })
                .filter_map(|e| e.ok())
                .filter(|e| e.file_type().is_file())
                .filter(|e| e.path().extension().is_some_and(|ext| ext == "php"))
                .filter(|e| !exclusions.excludes_file(e.path()))
            {
                file_paths.push(entry.into_path());
            }
        } else {
            missing_paths.push(path.clone());
        }
    }

    (file_paths, missing_paths)
}

/// Result of processing a single file (for parallel processing)
enum FileOutcome {
    /// File had no fixes
    NoChanges,
    /// File has fixes to report/apply
    HasChanges {
        fixes: Vec<FixInfo>,
        old_source: String,
        new_source: String,
    },
    /// Content could not be decoded or tokenized; the file is left untouched
    Skipped(String),
    /// File could not be read
    Error(String),
}

/// Process a file and return an outcome (no writes, suitable for parallel execution)
fn process_file_to_outcome(
    path: &Path,
    registry: &RuleRegistry,
    enabled_rules: &HashSet<String>,
) -> FileOutcome {
    let source = match read_source(path) {
        Ok(Source::Text(source)) => source,
        Ok(Source::NotUtf8(e)) => return FileOutcome::Skipped(format!("not valid UTF-8: {}", e)),
        Err(e) => return FileOutcome::Error(format!("{:#}", e)),
    };

    match process_source(source, registry, enabled_rules) {
        Ok(result) if !result.changed => FileOutcome::NoChanges,
        Ok(result) => FileOutcome::HasChanges {
            fixes: result.fixes,
            old_source: result.old_source,
            new_source: result.new_source,
        },
        Err(e) => FileOutcome::Skipped(format!("tokenize error: {}", e)),
    }
}

/// Report a file outcome and, in fix mode, write the new source
fn report_outcome(path: &Path, outcome: FileOutcome, fix_mode: bool, reporter: &mut Reporter) {
    match outcome {
        FileOutcome::NoChanges => {
            logging::log_file_fixes(path, &[]);
            reporter.report_unchanged(path);
        }
        FileOutcome::HasChanges {
            fixes,
            old_source,
            new_source,
        } => {
            if logging::is_enabled() {
                let rules: Vec<&str> = fixes.iter().map(|f| f.rule.as_str()).collect();
                logging::log_file_fixes(path, &rules);
            }

            if !fix_mode {
                reporter.report_check(path, fixes, &old_source, &new_source);
                return;
            }

            match write_file(path, &new_source) {
                Ok(()) => {
                    logging::log_file_written(path, new_source.len());
                    reporter.report_fix(path, fixes);
                }
                Err(e) => {
                    let message = format!("{:#}", e);
                    logging::log_file_error(path, &message);
                    reporter.report_error(path, &message);
                }
            }
        }
        FileOutcome::Skipped(reason) => {
            logging::log_file_skipped(path, &reason);
            reporter.report_skipped(path, &reason);
        }
        FileOutcome::Error(message) => {
            logging::log_file_error(path, &message);
            reporter.report_error(path, &message);
        }
    }
}
