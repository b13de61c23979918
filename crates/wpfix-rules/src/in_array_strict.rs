//! Rule: Make two-argument `in_array()` calls strict
//!
//! `in_array($needle, $haystack)` compares loosely, so `in_array(0, ['a'])`
//! was true before PHP 8. Appending `, true` switches to `===`. Calls with
//! one or three arguments, a trailing comma, named or spread arguments, or
//! unbalanced brackets are left alone.

use wpfix_core::cursor::{count_call_arguments, skip_trivia_backward};
use wpfix_core::{Match, Matcher, Token, TokenKind};

use crate::common::standalone_call;
use crate::registry::Rule;

pub struct InArrayStrictRule;

impl Matcher for InArrayStrictRule {
    fn name(&self) -> &str {
        "in_array_strict"
    }

    fn triggers_on(&self, token: &Token<'_>) -> bool {
        token.kind == TokenKind::Identifier
            && token.unqualified_text().eq_ignore_ascii_case("in_array")
    }

    fn try_match(&self, tokens: &[Token<'_>], start: usize) -> Option<Match> {
        let open = standalone_call(tokens, start)?;

        let args = count_call_arguments(tokens, open)?;
        // A positional `true` may not follow a named or spread argument
        if args.count != 2 || args.trailing_comma || args.named || args.unpacked {
            return None;
        }

        // After the last argument, ahead of any whitespace or comment
        let last = skip_trivia_backward(tokens, args.close)?;

        // The name is re-emitted as is; arguments are scanned normally so
        // rewrites nested inside them still apply
        Some(Match::new(tokens[start].text, start + 1).with_insertion(last + 1, ", true"))
    }
}

impl Rule for InArrayStrictRule {
    fn description(&self) -> &str {
        "Use strict comparison in in_array(): in_array($a, $b) -> in_array($a, $b, true)"
    }
}
