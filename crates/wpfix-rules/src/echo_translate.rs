//! Rule: Escape translations that are echoed directly
//!
//! `echo __('Text', 'domain')` prints the translated string unescaped.
//! Only the `__` name is replaced, and only when it is the first thing
//! echoed; `echo 'a' . __('b')` is left for a human to review.

use wpfix_core::cursor::skip_trivia_backward;
use wpfix_core::{Match, Matcher, Token, TokenKind};

use crate::common::call_paren;
use crate::registry::Rule;

pub struct EchoTranslateRule;

impl Matcher for EchoTranslateRule {
    fn name(&self) -> &str {
        "echo_translate"
    }

    fn triggers_on(&self, token: &Token<'_>) -> bool {
        token.is_identifier("__")
    }

    fn try_match(&self, tokens: &[Token<'_>], start: usize) -> Option<Match> {
        call_paren(tokens, start)?;

        let prev = &tokens[skip_trivia_backward(tokens, start)?];
        let echoes = prev.is_keyword("echo")
            || (prev.kind == TokenKind::OpenTag && prev.text.starts_with("<?="));
        if !echoes {
            return None;
        }

        let prefix = tokens[start].global_prefix();
        Some(Match::new(format!("{}esc_html__", prefix), start + 1))
    }
}

impl Rule for EchoTranslateRule {
    fn description(&self) -> &str {
        "Escape echoed translations: echo __() -> echo esc_html__()"
    }
}
