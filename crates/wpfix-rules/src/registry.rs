//! Rule trait and registry for wpfix rewrite rules

use std::collections::HashSet;

use wpfix_core::{rewrite_source, LexError, Matcher, RewriteOutput};

use crate::call_rename::{CallRenameRule, RenameSpec};
use crate::echo_translate::EchoTranslateRule;
use crate::error::RuleError;
use crate::in_array_strict::InArrayStrictRule;
use crate::short_ternary::ShortTernaryRule;
use crate::wp_die_translate::WpDieTranslateRule;
use crate::yoda_condition::YodaConditionRule;

/// A rewrite rule that can be listed, configured and run by name
pub trait Rule: Matcher + Send + Sync {
    /// A short description of what this rule does
    fn description(&self) -> &str;
}

/// Registry of all available rewrite rules, in the order they are tried
pub struct RuleRegistry {
    rules: Vec<Box<dyn Rule>>,
}

impl RuleRegistry {
    /// Create a new registry with all built-in rules
    pub fn new() -> Self {
        let mut registry = Self { rules: Vec::new() };

        registry.register(Box::new(YodaConditionRule));
        registry.register(Box::new(ShortTernaryRule));
        registry.register(Box::new(WpDieTranslateRule));
        registry.register(Box::new(EchoTranslateRule));
        registry.register(Box::new(CallRenameRule::escape_i18n()));
        registry.register(Box::new(CallRenameRule::safe_redirect()));
        registry.register(Box::new(InArrayStrictRule));

        registry
    }

    /// Create a registry with the built-ins plus configured rename rules,
    /// which are tried after every built-in
    pub fn with_renames(specs: &[RenameSpec]) -> Result<Self, RuleError> {
        let mut registry = Self::new();
        for spec in specs {
            registry.try_register(Box::new(CallRenameRule::from_spec(spec)?))?;
        }
        Ok(registry)
    }

    /// Register a new rule
    pub fn register(&mut self, rule: Box<dyn Rule>) {
        self.rules.push(rule);
    }

    /// Register a rule unless its name is already taken
    pub fn try_register(&mut self, rule: Box<dyn Rule>) -> Result<(), RuleError> {
        if self.contains(rule.name()) {
            return Err(RuleError::DuplicateName(rule.name().to_string()));
        }
        self.register(rule);
        Ok(())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.rules.iter().any(|r| r.name() == name)
    }

    /// Get all rule names
    pub fn all_names(&self) -> Vec<&str> {
        self.rules.iter().map(|r| r.name()).collect()
    }

    /// Get rules filtered by enabled names, keeping registration order
    pub fn get_enabled(&self, enabled: &HashSet<String>) -> Vec<&dyn Rule> {
        self.rules
            .iter()
            .filter(|r| enabled.contains(r.name()))
            .map(|r| r.as_ref())
            .collect()
    }

    /// Get all rules with their descriptions (for --list-rules)
    pub fn list_rules(&self) -> Vec<(&str, &str)> {
        self.rules
            .iter()
            .map(|r| (r.name(), r.description()))
            .collect()
    }

    /// Run all enabled rules over `source` in one pass
    pub fn rewrite(
        &self,
        source: &str,
        enabled: &HashSet<String>,
    ) -> Result<RewriteOutput, LexError> {
        let rules = self.get_enabled(enabled);
        rewrite_source(source, &rules)
    }
}

impl Default for RuleRegistry {
    fn default() -> Self {
        Self::new()
    }
}
