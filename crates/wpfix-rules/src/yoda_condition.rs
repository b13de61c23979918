//! Rule: Put the literal first in equality comparisons
//!
//! `$x === 'foo'` becomes `'foo' === $x`, so a mistyped `=` is a parse
//! error instead of a silent assignment. Only a plain variable with an
//! optional `[...]` subscript chain is moved, and only when both sides of
//! the comparison are delimited by operators that bind more loosely than
//! `===`; anything richer is left alone.

use wpfix_core::cursor::{collect_text, skip_inline_whitespace_forward, skip_trivia_forward};
use wpfix_core::{Match, Matcher, Token, TokenKind};

use crate::common::{capture_operand, left_boundary_allows};
use crate::registry::Rule;

const COMPARISON_OPS: &[&str] = &["===", "!==", "==", "!="];

/// Tokens that may precede the variable
const LEFT_OPS: &[&str] = &[
    "(", ",", "[", ";", "{", "}", "=", "+=", "-=", "*=", "/=", ".=", "%=", "**=", "??=", "&=",
    "|=", "^=", "<<=", ">>=", "=>", "&&", "||", "??", "?", ":", "|", "^",
];

const LEFT_KEYWORDS: &[&str] = &[
    "return", "echo", "print", "and", "or", "xor", "case", "yield", "throw", "if", "elseif",
    "while", "match",
];

/// Tokens after the literal that would make it part of a larger operand
const RIGHT_OPS: &[&str] = &[
    "->", "?->", "::", "[", "(", "+", "-", "*", "/", "%", "**", ".", "<<", ">>", "<", ">",
    "<=", ">=", "<=>", "<>", "==", "!=", "===", "!==",
];

pub struct YodaConditionRule;

impl Matcher for YodaConditionRule {
    fn name(&self) -> &str {
        "yoda_condition"
    }

    fn triggers_on(&self, token: &Token<'_>) -> bool {
        token.kind == TokenKind::Variable
    }

    fn try_match(&self, tokens: &[Token<'_>], start: usize) -> Option<Match> {
        if !left_boundary_allows(tokens, start, LEFT_OPS, LEFT_KEYWORDS) {
            return None;
        }

        let left = capture_operand(tokens, start, skip_inline_whitespace_forward)?;

        let op_index = skip_inline_whitespace_forward(tokens, left.end);
        let op = tokens.get(op_index)?;
        if !op.is_any_op(COMPARISON_OPS) {
            return None;
        }

        let literal_index = skip_inline_whitespace_forward(tokens, op_index + 1);
        let literal = tokens.get(literal_index)?;
        if !literal.is_simple_literal() {
            return None;
        }

        let after = skip_trivia_forward(tokens, literal_index + 1);
        if let Some(next) = tokens.get(after) {
            if next.is_any_op(RIGHT_OPS) || next.is_keyword("instanceof") {
                return None;
            }
        }

        let mut replacement = String::from(literal.text);
        replacement.push_str(&collect_text(tokens, left.end..op_index));
        replacement.push_str(op.text);
        replacement.push_str(&collect_text(tokens, op_index + 1..literal_index));
        replacement.push_str(&left.text);

        Some(Match::new(replacement, literal_index + 1))
    }
}

impl Rule for YodaConditionRule {
    fn description(&self) -> &str {
        "Put the literal first in equality comparisons: $x === 'a' -> 'a' === $x"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wpfix_core::{rewrite_source, RewriteOutput};

    fn check_php(source: &str) -> RewriteOutput {
        rewrite_source(source, &[&YodaConditionRule]).unwrap()
    }

    fn transform(source: &str) -> String {
        check_php(source).text
    }

    fn assert_unchanged(source: &str) {
        let output = check_php(source);
        assert_eq!(output.fix_count(), 0, "{source}");
        assert_eq!(output.text, source);
    }

    // ==================== Basic Transformation Tests ====================

    #[test]
    fn test_string_literal() {
        let output = check_php("<?php if ($x === 'foo') {}");
        assert_eq!(output.fix_count(), 1);
        assert_eq!(output.text, "<?php if ('foo' === $x) {}");
    }

    #[test]
    fn test_all_operators() {
        assert_eq!(transform("<?php ($a !== 1);"), "<?php (1 !== $a);");
        assert_eq!(transform("<?php ($a == 1.5);"), "<?php (1.5 == $a);");
        assert_eq!(transform("<?php ($a != 0x1F);"), "<?php (0x1F != $a);");
    }

    #[test]
    fn test_boolean_and_null_literals() {
        assert_eq!(transform("<?php ($a === true);"), "<?php (true === $a);");
        assert_eq!(transform("<?php ($a === FALSE);"), "<?php (FALSE === $a);");
        assert_eq!(transform("<?php ($a === Null);"), "<?php (Null === $a);");
    }

    #[test]
    fn test_whitespace_preserved() {
        assert_eq!(transform("<?php ($a===1);"), "<?php (1===$a);");
        assert_eq!(transform("<?php ($a  ===\t'x');"), "<?php ('x'  ===\t$a);");
    }

    #[test]
    fn test_subscript_chain() {
        assert_eq!(
            transform("<?php if ($arr['key'][0] === 'v') {}"),
            "<?php if ('v' === $arr['key'][0]) {}"
        );
    }

    // ==================== Context Tests ====================

    #[test]
    fn test_in_return_and_assignment() {
        assert_eq!(transform("<?php return $a === 1;"), "<?php return 1 === $a;");
        assert_eq!(transform("<?php $ok = $a === 1;"), "<?php $ok = 1 === $a;");
        assert_eq!(transform("<?php $ok .= $a == '';"), "<?php $ok .= '' == $a;");
    }

    #[test]
    fn test_in_logical_chain() {
        assert_eq!(
            transform("<?php if ($a === 1 && $b !== 'x') {}"),
            "<?php if (1 === $a && 'x' !== $b) {}"
        );
    }

    #[test]
    fn test_multiple_occurrences() {
        let output = check_php("<?php\nif ($a == 1) {}\nwhile ($b != null) {}\n");
        assert_eq!(output.fix_count(), 2);
        assert_eq!(output.fixes[0].line, 2);
        assert_eq!(output.fixes[1].line, 3);
    }

    // ==================== Skip Cases ====================

    #[test]
    fn test_skip_non_literal_right_side() {
        assert_unchanged("<?php if ($x === $y) {}");
        assert_unchanged("<?php if ($x === FOO) {}");
        assert_unchanged("<?php if ($x === \"a$b\") {}");
    }

    #[test]
    fn test_skip_already_yoda() {
        assert_unchanged("<?php if ('foo' === $x) {}");
    }

    #[test]
    fn test_skip_member_access_and_calls() {
        assert_unchanged("<?php if ($o->p === 1) {}");
        assert_unchanged("<?php if ($o?->p === 1) {}");
        assert_unchanged("<?php if ($f() === 1) {}");
        assert_unchanged("<?php if ($a['k']->p === 1) {}");
        assert_unchanged("<?php if (Foo::$bar === 1) {}");
    }

    #[test]
    fn test_skip_literal_continues() {
        assert_unchanged("<?php if ($a === 'x' . $b) {}");
        assert_unchanged("<?php if ($a === 1 + 2) {}");
        assert_unchanged("<?php if ($a == 1 < $b) {}");
        assert_unchanged("<?php if ($a === 'x'[0]) {}");
        assert_unchanged("<?php if ($a === FOO::BAR) {}");
    }

    #[test]
    fn test_skip_tighter_left_operator() {
        assert_unchanged("<?php if (!$a === 'x') {}");
        assert_unchanged("<?php if ($b . $a === 'x') {}");
        assert_unchanged("<?php if ($b + $a == 1) {}");
        assert_unchanged("<?php if ((int) $a === 1) {}");
        assert_unchanged("<?php if (-$a === 1) {}");
    }

    #[test]
    fn test_skip_across_lines() {
        assert_unchanged("<?php if ($a\n=== 1) {}");
        assert_unchanged("<?php if ($a ===\n1) {}");
    }

    #[test]
    fn test_skip_other_comparisons() {
        assert_unchanged("<?php if ($a < 1) {}");
        assert_unchanged("<?php if ($a = 1) {}");
    }

    #[test]
    fn test_skip_unbalanced_subscript() {
        assert_unchanged("<?php if ($a['k' === 1");
    }

    // ==================== Edge Cases ====================

    #[test]
    fn test_start_of_input() {
        // Nothing precedes the variable outside of the open tag
        assert_eq!(transform("<?php $a === 1;"), "<?php 1 === $a;");
    }

    #[test]
    fn test_followed_by_comment() {
        assert_eq!(
            transform("<?php if ($a === 1 /* one */) {}"),
            "<?php if (1 === $a /* one */) {}"
        );
    }

    #[test]
    fn test_fix_record() {
        let output = check_php("<?php ($x === 'foo');");
        let fix = &output.fixes[0];
        assert_eq!(fix.rule, "yoda_condition");
        assert_eq!(fix.original, "$x === 'foo'");
        assert_eq!(fix.replacement, "'foo' === $x");
    }
}
