//! File processing logic for wpfix

use anyhow::{Context, Result};
use std::collections::HashSet;
use std::io::Write;
use std::path::Path;
use std::str::Utf8Error;

use wpfix_core::LexError;
use wpfix_rules::RuleRegistry;

use crate::output::FixInfo;

/// Result of rewriting a single file's source
pub struct ProcessResult {
    /// Whether any rule rewrote something
    pub changed: bool,
    /// Fixes that were found/applied
    pub fixes: Vec<FixInfo>,
    /// Original source code
    pub old_source: String,
    /// Source code after all fixes
    pub new_source: String,
}

/// Contents of a PHP file
#[derive(Debug)]
pub enum Source {
    Text(String),
    /// The bytes are not UTF-8 (for example a Latin-1 template); such a file
    /// is skipped, never rewritten
    NotUtf8(Utf8Error),
}

/// Read a PHP file and decode it as UTF-8
///
/// Only I/O failures are errors; undecodable content is reported as
/// `Source::NotUtf8`.
pub fn read_source(path: &Path) -> Result<Source> {
    let bytes =
        std::fs::read(path).with_context(|| format!("Failed to read file: {}", path.display()))?;

    Ok(match String::from_utf8(bytes) {
        Ok(text) => Source::Text(text),
        Err(e) => Source::NotUtf8(e.utf8_error()),
    })
}

/// Run the enabled rules over one file's source
///
/// A tokenizer failure is returned as is; the caller must leave the file
/// untouched.
pub fn process_source(
    source: String,
    registry: &RuleRegistry,
    enabled_rules: &HashSet<String>,
) -> Result<ProcessResult, LexError> {
    let output = registry.rewrite(&source, enabled_rules)?;
    let changed = output.is_changed();

    let fixes = output
        .fixes
        .into_iter()
        .map(|fix| FixInfo {
            column: offset_to_column(&source, fix.offset),
            line: fix.line,
            rule: fix.rule,
            original: fix.original,
            replacement: fix.replacement,
            inserted: fix.inserted,
        })
        .collect();

    Ok(ProcessResult {
        changed,
        fixes,
        old_source: source,
        new_source: output.text,
    })
}

/// Replace `path` with `content` atomically
///
/// The content goes to a temporary file in the same directory, is synced,
/// then renamed over the original, so a crash never leaves a half-written
/// file. The original file's permissions are kept.
pub fn write_file(path: &Path, content: &str) -> Result<()> {
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };

    let permissions = std::fs::metadata(path)
        .with_context(|| format!("Failed to stat file: {}", path.display()))?
        .permissions();

    let mut temp = tempfile::NamedTempFile::new_in(parent)
        .with_context(|| format!("Failed to create temp file in {}", parent.display()))?;
    temp.write_all(content.as_bytes())
        .with_context(|| format!("Failed to write temp file for {}", path.display()))?;
    temp.as_file()
        .set_permissions(permissions)
        .with_context(|| format!("Failed to set permissions for {}", path.display()))?;
    temp.as_file()
        .sync_all()
        .with_context(|| format!("Failed to sync temp file for {}", path.display()))?;
    temp.persist(path)
        .map_err(|e| e.error)
        .with_context(|| format!("Failed to write file: {}", path.display()))?;

    Ok(())
}

/// 1-based character column of a byte offset
fn offset_to_column(source: &str, offset: usize) -> usize {
    let offset = offset.min(source.len());
    let line_start = source[..offset].rfind('\n').map_or(0, |nl| nl + 1);
    source[line_start..offset].chars().count() + 1
}
