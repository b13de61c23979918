//! Rule: Escape a translated `wp_die()` message
//!
//! `wp_die( __('Oops') )` becomes `wp_die( esc_html__('Oops') )`. The
//! translation must be the very first token inside the call; messages
//! built from several parts are not rewritten.

use wpfix_core::cursor::{collect_text, next_significant};
use wpfix_core::{Match, Matcher, Token};

use crate::common::{call_paren, standalone_call};
use crate::registry::Rule;

pub struct WpDieTranslateRule;

impl Matcher for WpDieTranslateRule {
    fn name(&self) -> &str {
        "wp_die_translate"
    }

    fn triggers_on(&self, token: &Token<'_>) -> bool {
        token.is_identifier("wp_die")
    }

    fn try_match(&self, tokens: &[Token<'_>], start: usize) -> Option<Match> {
        let open = standalone_call(tokens, start)?;

        let inner = next_significant(tokens, open)?;
        if !tokens[inner].is_identifier("__") {
            return None;
        }
        call_paren(tokens, inner)?;

        let mut replacement = collect_text(tokens, start..inner);
        replacement.push_str(tokens[inner].global_prefix());
        replacement.push_str("esc_html__");

        Some(Match::new(replacement, inner + 1))
    }
}

impl Rule for WpDieTranslateRule {
    fn description(&self) -> &str {
        "Escape translated wp_die() messages: wp_die(__()) -> wp_die(esc_html__())"
    }
}
