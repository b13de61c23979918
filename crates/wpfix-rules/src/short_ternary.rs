//! Rule: Expand `$x ?: $default` into `$x ? $x : $default`
//!
//! The expansion evaluates the condition twice, so it is only safe when
//! the condition is a plain variable or a `[...]` subscript chain on one.
//! Calls and property reads are never duplicated.

use wpfix_core::cursor::{collect_text, skip_whitespace_forward};
use wpfix_core::{Match, Matcher, Token, TokenKind};

use crate::common::{capture_operand, left_boundary_allows};
use crate::registry::Rule;

/// Tokens that may precede the condition
const LEFT_OPS: &[&str] = &[
    "(", ",", "[", ";", "{", "}", "=", "+=", "-=", "*=", "/=", ".=", "%=", "**=", "??=", "&=",
    "|=", "^=", "<<=", ">>=", "=>", "?",
];

const LEFT_KEYWORDS: &[&str] = &["return", "echo", "print", "and", "or", "xor", "yield", "throw"];

pub struct ShortTernaryRule;

impl Matcher for ShortTernaryRule {
    fn name(&self) -> &str {
        "short_ternary"
    }

    fn triggers_on(&self, token: &Token<'_>) -> bool {
        token.kind == TokenKind::Variable
    }

    fn try_match(&self, tokens: &[Token<'_>], start: usize) -> Option<Match> {
        if !left_boundary_allows(tokens, start, LEFT_OPS, LEFT_KEYWORDS) {
            return None;
        }

        let condition = capture_operand(tokens, start, skip_whitespace_forward)?;

        let question = skip_whitespace_forward(tokens, condition.end);
        if !tokens.get(question)?.is_op("?") {
            return None;
        }

        let colon = skip_whitespace_forward(tokens, question + 1);
        if !tokens.get(colon)?.is_op(":") {
            return None;
        }

        let default_start = skip_whitespace_forward(tokens, colon + 1);
        if continues_ternary_chain(tokens, default_start) {
            return None;
        }

        let replacement = format!(
            "{cond}{before}? {cond} :{after}",
            cond = condition.text,
            before = collect_text(tokens, condition.end..question),
            after = collect_text(tokens, colon + 1..default_start),
        );

        Some(Match::new(replacement, default_start))
    }
}

impl Rule for ShortTernaryRule {
    fn description(&self) -> &str {
        "Expand short ternary on plain variables: $x ?: $d -> $x ? $x : $d"
    }
}

/// The default operand starting at `from` is followed by another `?` at
/// the same nesting level
///
/// PHP 8 rejects `a ? b : c ?: d` without parentheses, so expanding the
/// first half of a `?:` chain would break the file.
fn continues_ternary_chain(tokens: &[Token<'_>], from: usize) -> bool {
    let mut depth = 0usize;

    for token in tokens.iter().skip(from) {
        if token.is_trivia() {
            continue;
        }
        if token.kind == TokenKind::CloseTag {
            return false;
        }

        if token.is_any_op(&["(", "[", "{", "#["]) {
            depth += 1;
        } else if token.is_any_op(&[")", "]", "}"]) {
            if depth == 0 {
                return false;
            }
            depth -= 1;
        } else if depth == 0 {
            if token.is_op("?") {
                return true;
            }
            if token.is_any_op(&[";", ",", ":", "=>"]) || token.is_keyword("as") {
                return false;
            }
        }
    }

    false
}
