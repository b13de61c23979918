//! Configuration file support for wpfix
//!
//! Loads `.wpfix.toml` from current directory or parent directories.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

use wpfix_rules::RenameSpec;

pub const CONFIG_FILE_NAME: &str = ".wpfix.toml";

/// Configuration file structure
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub rules: RulesConfig,
    pub paths: PathsConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RulesConfig {
    /// If set, only these rules will run
    pub enabled: Option<Vec<String>>,
    /// Rules to exclude (applied after enabled)
    pub disabled: Vec<String>,
    /// Extra standalone-call renames, run after the built-in rules
    pub rename: Vec<RenameSpec>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// Glob patterns, or `dir/` names, to exclude from processing
    pub exclude: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Output format: "text", "json" or "diff"
    pub format: Option<String>,
}

/// Directories never descended into below a walked root
pub const BUILTIN_EXCLUDED_DIRS: &[&str] = &["vendor", "node_modules", "build"];

impl Config {
    /// Load config from `.wpfix.toml` searching from current directory upward
    pub fn load() -> Result<Option<(Config, PathBuf)>> {
        let cwd = std::env::current_dir().context("Failed to determine current directory")?;
        Self::load_from(&cwd)
    }

    /// Load the nearest `.wpfix.toml` in `start_dir` or one of its ancestors
    pub fn load_from(start_dir: &Path) -> Result<Option<(Config, PathBuf)>> {
        let Some(config_path) = start_dir
            .ancestors()
            .map(|dir| dir.join(CONFIG_FILE_NAME))
            .find(|candidate| candidate.is_file())
        else {
            return Ok(None);
        };

        let config = Self::load_path(&config_path)?;
        Ok(Some((config, config_path)))
    }

    /// Load config from a specific path
    pub fn load_path(path: &Path) -> Result<Config> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let config: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        Ok(config)
    }

    /// Names of the rules to run
    ///
    /// `--rule` flags replace the configured selection; otherwise a rule runs
    /// when `enabled` is absent or lists it, and `disabled` does not.
    pub fn effective_rules(&self, all_rules: &[&str], cli_rules: &[String]) -> HashSet<String> {
        let selected = |name: &str| {
            if !cli_rules.is_empty() {
                return cli_rules.iter().any(|r| r == name);
            }
            let enabled = self
                .rules
                .enabled
                .as_ref()
                .is_none_or(|list| list.iter().any(|r| r == name));
            enabled && !self.rules.disabled.iter().any(|r| r == name)
        };

        all_rules
            .iter()
            .copied()
            .filter(|&name| selected(name))
            .map(String::from)
            .collect()
    }

    /// Rule names mentioned in `enabled`/`disabled` that no rule answers to
    pub fn unknown_rules<'a>(&'a self, all_rules: &[&str]) -> Vec<&'a str> {
        self.rules
            .enabled
            .iter()
            .flatten()
            .chain(&self.rules.disabled)
            .map(String::as_str)
            .filter(|name| !all_rules.contains(name))
            .collect()
    }

    /// Compile `[paths] exclude` together with the built-in directories
    pub fn exclusions(&self) -> Result<Exclusions> {
        let mut dirs: Vec<PathBuf> = Vec::new();
        let mut globs = Vec::new();

        for pattern in &self.paths.exclude {
            if let Some(dir) = pattern.strip_suffix('/') {
                dirs.push(PathBuf::from(dir));
            } else {
                let glob = glob::Pattern::new(pattern)
                    .with_context(|| format!("Invalid exclude pattern '{}'", pattern))?;
                globs.push(glob);
            }
        }

        Ok(Exclusions { dirs, globs })
    }
}

/// Path filters applied while collecting files
#[derive(Debug, Default)]
pub struct Exclusions {
    /// `dir/` patterns; match a directory whose trailing components equal them
    dirs: Vec<PathBuf>,
    /// Glob patterns, tried against the whole path and the file name
    globs: Vec<glob::Pattern>,
}

impl Exclusions {
    /// A directory below a walked root that must not be descended into
    pub fn prunes_dir(&self, dir: &Path) -> bool {
        let builtin = dir
            .file_name()
            .and_then(|name| name.to_str())
            .is_some_and(|name| BUILTIN_EXCLUDED_DIRS.contains(&name));

        builtin || self.dirs.iter().any(|pattern| dir.ends_with(pattern))
    }

    /// A file matched by a glob or lying inside an excluded directory
    ///
    /// Built-in directories are not checked here, so a root such as
    /// `build/` named on the command line is still processed.
    pub fn excludes_file(&self, path: &Path) -> bool {
        let path_str = path.to_string_lossy();
        let file_name = path.file_name().map(|name| name.to_string_lossy());

        let globbed = self.globs.iter().any(|glob| {
            glob.matches(&path_str) || file_name.as_deref().is_some_and(|name| glob.matches(name))
        });

        globbed
            || path
                .parent()
                .is_some_and(|parent| parent.ancestors().any(|dir| self.matches_dir(dir)))
    }

    fn matches_dir(&self, dir: &Path) -> bool {
        self.dirs.iter().any(|pattern| dir.ends_with(pattern))
    }
}
