//! Rule: Replace the name of a standalone function call
//!
//! Backs the `escape_i18n` and `safe_redirect` built-ins as well as any
//! `[[rules.rename]]` entry from the configuration file. Only the name
//! token is replaced; the argument list is left to the main scan.

use serde::Deserialize;
use wpfix_core::{Match, Matcher, Token};

use crate::common::standalone_call;
use crate::error::RuleError;
use crate::registry::Rule;

/// Rename `from(...)` to `to(...)` when `from` is a standalone call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallRenameRule {
    name: String,
    from: String,
    to: String,
    description: String,
}

impl CallRenameRule {
    pub fn new(
        name: impl Into<String>,
        from: impl Into<String>,
        to: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            from: from.into(),
            to: to.into(),
            description: description.into(),
        }
    }

    /// `_e()` echoes a translation unescaped
    pub fn escape_i18n() -> Self {
        Self::new(
            "escape_i18n",
            "_e",
            "esc_html_e",
            "Escape echoed translations: _e() -> esc_html_e()",
        )
    }

    /// `wp_redirect()` follows arbitrary hosts
    pub fn safe_redirect() -> Self {
        Self::new(
            "safe_redirect",
            "wp_redirect",
            "wp_safe_redirect",
            "Restrict redirects to allowed hosts: wp_redirect() -> wp_safe_redirect()",
        )
    }

    pub fn from_spec(spec: &RenameSpec) -> Result<Self, RuleError> {
        spec.validate()?;

        let description = spec
            .description
            .clone()
            .unwrap_or_else(|| format!("Rename {}() -> {}()", spec.from, spec.to));

        Ok(Self::new(&spec.name, &spec.from, &spec.to, description))
    }
}

impl Matcher for CallRenameRule {
    fn name(&self) -> &str {
        &self.name
    }

    fn triggers_on(&self, token: &Token<'_>) -> bool {
        token.is_identifier(&self.from)
    }

    fn try_match(&self, tokens: &[Token<'_>], start: usize) -> Option<Match> {
        standalone_call(tokens, start)?;
        let prefix = tokens[start].global_prefix();
        Some(Match::new(format!("{}{}", prefix, self.to), start + 1))
    }
}

impl Rule for CallRenameRule {
    fn description(&self) -> &str {
        &self.description
    }
}

/// A rename rule as written in `.wpfix.toml`
///
/// ```toml
/// [[rules.rename]]
/// name = "escape_attr_i18n"
/// from = "_ex"
/// to = "esc_attr_x"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RenameSpec {
    pub name: String,
    pub from: String,
    pub to: String,
    #[serde(default)]
    pub description: Option<String>,
}

impl RenameSpec {
    /// Check that the rule has a name, both functions are plain PHP
    /// identifiers, and the rename changes something
    pub fn validate(&self) -> Result<(), RuleError> {
        if self.name.trim().is_empty() {
            return Err(RuleError::EmptyName);
        }
        if self.from == self.to {
            return Err(RuleError::SameName {
                rule: self.name.clone(),
                name: self.from.clone(),
            });
        }

        for function in [&self.from, &self.to] {
            if !is_php_identifier(function) {
                return Err(RuleError::InvalidIdentifier {
                    rule: self.name.clone(),
                    name: function.clone(),
                });
            }
        }

        Ok(())
    }
}

/// `[A-Za-z_\x80-\xff][A-Za-z0-9_\x80-\xff]*`
fn is_php_identifier(name: &str) -> bool {
    let mut bytes = name.bytes();
    match bytes.next() {
        Some(b) if b.is_ascii_alphabetic() || b == b'_' || b >= 0x80 => {}
        _ => return false,
    }
    bytes.all(|b| b.is_ascii_alphanumeric() || b == b'_' || b >= 0x80)
}

#[cfg(test)]
mod tests {
    use super::*;
    use wpfix_core::{rewrite_source, RewriteOutput};

    fn check_php(rule: &CallRenameRule, source: &str) -> RewriteOutput {
        rewrite_source(source, &[rule]).unwrap()
    }

    fn transform(rule: &CallRenameRule, source: &str) -> String {
        check_php(rule, source).text
    }

    fn spec(name: &str, from: &str, to: &str) -> RenameSpec {
        RenameSpec {
            name: name.to_string(),
            from: from.to_string(),
            to: to.to_string(),
            description: None,
        }
    }

    // ==================== escape_i18n ====================

    #[test]
    fn test_escape_i18n() {
        let rule = CallRenameRule::escape_i18n();
        let output = check_php(&rule, "<?php _e('Hello', 'td');");
        assert_eq!(output.fix_count(), 1);
        assert_eq!(output.text, "<?php esc_html_e('Hello', 'td');");
        assert_eq!(output.fixes[0].rule, "escape_i18n");
    }

    #[test]
    fn test_escape_i18n_in_template() {
        let rule = CallRenameRule::escape_i18n();
        assert_eq!(
            transform(&rule, "<h1><?php _e( 'Title', 'td' ); ?></h1>\n"),
            "<h1><?php esc_html_e( 'Title', 'td' ); ?></h1>\n"
        );
    }

    #[test]
    fn test_escape_i18n_space_before_paren() {
        let rule = CallRenameRule::escape_i18n();
        assert_eq!(
            transform(&rule, "<?php _e /* x */ ('a');"),
            "<?php esc_html_e /* x */ ('a');"
        );
    }

    #[test]
    fn test_fully_qualified_call_keeps_backslash() {
        let rule = CallRenameRule::escape_i18n();
        let output = check_php(&rule, "<?php \\_e('Hello');");
        assert_eq!(output.text, "<?php \\esc_html_e('Hello');");
        assert_eq!(output.fixes[0].original, "\\_e");
        assert_eq!(output.fixes[0].replacement, "\\esc_html_e");

        let rule = CallRenameRule::safe_redirect();
        assert_eq!(
            transform(&rule, "<?php \\wp_redirect($url); exit;"),
            "<?php \\wp_safe_redirect($url); exit;"
        );
    }

    #[test]
    fn test_skip_namespaced_call() {
        let rule = CallRenameRule::escape_i18n();
        let source = "<?php My\\Plugin\\_e('a');";
        assert_eq!(check_php(&rule, source).fix_count(), 0);
    }

    #[test]
    fn test_skip_longer_names() {
        let rule = CallRenameRule::escape_i18n();
        for source in [
            "<?php esc_html_e('a');",
            "<?php my_e('a');",
            "<?php _ex('a', 'ctx');",
            "<?php $obj->_e('a');",
            "<?php Foo::_e('a');",
            "<?php function _e($text) {}",
            "<?php $cb = '_e';",
            "<?php $x = _e;",
        ] {
            let output = check_php(&rule, source);
            assert_eq!(output.fix_count(), 0, "{source}");
            assert_eq!(output.text, source);
        }
    }

    // ==================== safe_redirect ====================

    #[test]
    fn test_safe_redirect() {
        let rule = CallRenameRule::safe_redirect();
        assert_eq!(
            transform(&rule, "<?php wp_redirect($url);\nexit;"),
            "<?php wp_safe_redirect($url);\nexit;"
        );
    }

    #[test]
    fn test_safe_redirect_skips_already_safe() {
        let rule = CallRenameRule::safe_redirect();
        let source = "<?php wp_safe_redirect($url);";
        assert_eq!(check_php(&rule, source).fix_count(), 0);
    }

    #[test]
    fn test_safe_redirect_multiple() {
        let rule = CallRenameRule::safe_redirect();
        let output = check_php(&rule, "<?php\nif ($a) wp_redirect($a);\nelse wp_redirect($b);\n");
        assert_eq!(output.fix_count(), 2);
        assert_eq!(output.fixes[1].line, 3);
    }

    // ==================== Configured renames ====================

    #[test]
    fn test_from_spec() {
        let rule = CallRenameRule::from_spec(&spec("attr_x", "_ex", "esc_attr_x")).unwrap();
        assert_eq!(rule.name(), "attr_x");
        assert_eq!(rule.description(), "Rename _ex() -> esc_attr_x()");
        assert_eq!(
            transform(&rule, "<?php echo _ex('a', 'b');"),
            "<?php echo esc_attr_x('a', 'b');"
        );
    }

    #[test]
    fn test_from_spec_with_description() {
        let mut s = spec("attr_x", "_ex", "esc_attr_x");
        s.description = Some("Escape contextual translations".to_string());
        let rule = CallRenameRule::from_spec(&s).unwrap();
        assert_eq!(rule.description(), "Escape contextual translations");
    }

    #[test]
    fn test_deserialize_spec() {
        let parsed: RenameSpec =
            toml::from_str("name = \"attr_x\"\nfrom = \"_ex\"\nto = \"esc_attr_x\"\n").unwrap();
        assert_eq!(parsed, spec("attr_x", "_ex", "esc_attr_x"));

        let missing_to: Result<RenameSpec, _> = toml::from_str("name = \"a\"\nfrom = \"_ex\"\n");
        assert!(missing_to.is_err());
    }

    #[test]
    fn test_validate_rejects_bad_identifiers() {
        assert_eq!(
            spec("bad", "1abc", "x").validate(),
            Err(RuleError::InvalidIdentifier {
                rule: "bad".to_string(),
                name: "1abc".to_string()
            })
        );
        assert!(spec("bad", "a", "b-c").validate().is_err());
        assert!(spec("bad", "", "b").validate().is_err());
        assert!(spec("bad", "a b", "b").validate().is_err());
        assert_eq!(spec(" ", "a", "b").validate(), Err(RuleError::EmptyName));
    }

    #[test]
    fn test_validate_rejects_same_name() {
        assert_eq!(
            spec("noop", "_e", "_e").validate(),
            Err(RuleError::SameName {
                rule: "noop".to_string(),
                name: "_e".to_string()
            })
        );
        assert!(CallRenameRule::from_spec(&spec("noop", "_e", "_e")).is_err());
    }

    #[test]
    fn test_validate_accepts_identifiers() {
        assert!(spec("ok", "_e", "esc_html_e").validate().is_ok());
        assert!(spec("ok", "été", "Fn2").validate().is_ok());
    }
}
