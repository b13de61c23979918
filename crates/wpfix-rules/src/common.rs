//! Context checks shared by several rules

use wpfix_core::cursor::{capture_balanced, next_significant, skip_trivia_backward};
use wpfix_core::{Token, TokenKind};

/// Keywords after which a name is being declared or resolved, not called
const DECLARATION_KEYWORDS: &[&str] = &[
    "function", "new", "const", "use", "class", "interface", "trait", "enum", "extends",
    "implements", "instanceof", "insteadof", "as",
];

/// Index of the `(` when `tokens[index]` is followed by a call's argument list
pub(crate) fn call_paren(tokens: &[Token<'_>], index: usize) -> Option<usize> {
    next_significant(tokens, index).filter(|&j| tokens[j].is_op("("))
}

/// The name at `index` is not the tail of a member access, a static call,
/// a longer name or a declaration
pub(crate) fn is_standalone(tokens: &[Token<'_>], index: usize) -> bool {
    let Some(prev) = skip_trivia_backward(tokens, index) else {
        return true;
    };
    let prev_token = &tokens[prev];

    if matches!(prev_token.kind, TokenKind::Identifier | TokenKind::Variable)
        || prev_token.is_member_access()
        || prev_token.is_static_scope()
    {
        return false;
    }

    if is_declaration_keyword(prev_token) {
        return false;
    }

    // function &name()
    if prev_token.is_op("&") {
        if let Some(before) = skip_trivia_backward(tokens, prev) {
            return !tokens[before].is_keyword("function");
        }
    }

    true
}

/// A standalone name followed by `(`; returns the index of the `(`
pub(crate) fn standalone_call(tokens: &[Token<'_>], index: usize) -> Option<usize> {
    let open = call_paren(tokens, index)?;
    is_standalone(tokens, index).then_some(open)
}

fn is_declaration_keyword(token: &Token<'_>) -> bool {
    token.kind == TokenKind::Keyword
        && DECLARATION_KEYWORDS
            .iter()
            .any(|kw| token.text.eq_ignore_ascii_case(kw))
}

/// The token before `index` satisfies `allowed`, or there is none
pub(crate) fn left_boundary_allows(
    tokens: &[Token<'_>],
    index: usize,
    ops: &[&str],
    keywords: &[&str],
) -> bool {
    let Some(prev) = skip_trivia_backward(tokens, index) else {
        return true;
    };
    let token = &tokens[prev];

    match token.kind {
        TokenKind::OpenTag => true,
        TokenKind::Operator => ops.contains(&token.text),
        TokenKind::Keyword => keywords.iter().any(|kw| token.text.eq_ignore_ascii_case(kw)),
        _ => false,
    }
}

/// A variable with an optional chain of `[...]` subscripts
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Operand {
    /// Source text of the variable and its subscripts
    pub text: String,
    /// Exclusive end index; trailing whitespace is not included
    pub end: usize,
}

/// Capture a side-effect free operand starting at the variable at `start`
///
/// `skip_space` decides which tokens may sit between the variable and its
/// subscripts. Declines on member access, static access, calls and
/// unbalanced brackets, since duplicating or reordering those could change
/// what the program evaluates.
pub(crate) fn capture_operand(
    tokens: &[Token<'_>],
    start: usize,
    skip_space: fn(&[Token<'_>], usize) -> usize,
) -> Option<Operand> {
    let variable = tokens.get(start)?;
    if variable.kind != TokenKind::Variable {
        return None;
    }

    let mut text = variable.text.to_string();
    let mut end = start + 1;

    loop {
        let j = skip_space(tokens, end);
        let Some(next) = tokens.get(j) else {
            break;
        };

        if next.is_op("[") {
            let subscript = capture_balanced(tokens, j, "[", "]")?;
            if !tokens[j + 1..subscript.end].iter().all(is_inert) {
                return None;
            }
            for space in &tokens[end..j] {
                text.push_str(space.text);
            }
            text.push_str(&subscript.text);
            end = subscript.end + 1;
            continue;
        }

        if next.is_member_access() || next.is_static_scope() || next.is_op("(") {
            return None;
        }

        break;
    }

    Some(Operand { text, end })
}

/// Operators allowed inside a captured subscript
const INERT_OPS: &[&str] = &["[", "]", ".", "+", "-", "*", "/", "%"];

/// A subscript token that cannot call, assign or increment anything
fn is_inert(token: &Token<'_>) -> bool {
    token.is_trivia()
        || token.is_simple_literal()
        || matches!(token.kind, TokenKind::Variable | TokenKind::Identifier)
        || token.is_any_op(INERT_OPS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use wpfix_core::cursor::{skip_inline_whitespace_forward, skip_whitespace_forward};
    use wpfix_core::tokenize;

    fn index_of(tokens: &[Token<'_>], text: &str) -> usize {
        tokens.iter().position(|t| t.text == text).unwrap()
    }

    #[test]
    fn test_standalone_call() {
        let cases = [
            ("<?php _e('x');", true),
            ("<?php echo _e ('x');", true),
            ("<?php $o->_e('x');", false),
            ("<?php $o?->_e('x');", false),
            ("<?php Foo::_e('x');", false),
            ("<?php function _e($t) {}", false),
            ("<?php function &_e($t) {}", false),
            ("<?php new _e();", false),
            ("<?php $x = _e;", false),
        ];
        for (source, expected) in cases {
            let tokens = tokenize(source).unwrap();
            let index = index_of(&tokens, "_e");
            assert_eq!(standalone_call(&tokens, index).is_some(), expected, "{source}");
        }
    }

    #[test]
    fn test_standalone_at_start() {
        let tokens = tokenize("<?php _e('x');").unwrap();
        assert!(is_standalone(&tokens, 0));
        assert!(is_standalone(&tokens, index_of(&tokens, "_e")));
    }

    #[test]
    fn test_left_boundary() {
        let tokens = tokenize("<?php return !$a;").unwrap();
        let a = index_of(&tokens, "$a");
        assert!(!left_boundary_allows(&tokens, a, &["("], &["return"]));
        assert!(left_boundary_allows(&tokens, a, &["!"], &[]));

        let return_index = index_of(&tokens, "return");
        assert!(left_boundary_allows(&tokens, return_index, &[], &[]));

        let tokens = tokenize("<?php return $a;").unwrap();
        let a = index_of(&tokens, "$a");
        assert!(left_boundary_allows(&tokens, a, &[], &["RETURN"]));
    }

    #[test]
    fn test_capture_operand_with_subscripts() {
        let tokens = tokenize("<?php $arr['a'] [$i] === 1;").unwrap();
        let start = index_of(&tokens, "$arr");

        let operand = capture_operand(&tokens, start, skip_whitespace_forward).unwrap();
        assert_eq!(operand.text, "$arr['a'] [$i]");
        assert!(tokens[operand.end].is_whitespace());

        let tokens = tokenize("<?php $m[$i + 1][KEY . 'x'] ?: 0;").unwrap();
        let operand = capture_operand(&tokens, index_of(&tokens, "$m"), skip_whitespace_forward);
        assert_eq!(operand.unwrap().text, "$m[$i + 1][KEY . 'x']");
    }

    #[test]
    fn test_capture_operand_inline_only() {
        let tokens = tokenize("<?php $arr\n['a'];").unwrap();
        let start = index_of(&tokens, "$arr");

        let operand = capture_operand(&tokens, start, skip_inline_whitespace_forward).unwrap();
        assert_eq!(operand.text, "$arr");
    }

    #[test]
    fn test_capture_operand_declines() {
        for source in [
            "<?php $o->p === 1;",
            "<?php $o?->p === 1;",
            "<?php $c::X === 1;",
            "<?php $f() === 1;",
            "<?php $a['k']->m() === 1;",
            "<?php $a['k' === 1;",
            "<?php $a[f()] === 1;",
            "<?php $a[$i++] === 1;",
            "<?php $a[$i = 0] === 1;",
            "<?php $a[$o->k] === 1;",
            "<?php $a[\"{$o->k()}\"] === 1;",
        ] {
            let tokens = tokenize(source).unwrap();
            let start = tokens.iter().position(|t| t.kind == TokenKind::Variable).unwrap();
            assert!(
                capture_operand(&tokens, start, skip_whitespace_forward).is_none(),
                "{source}"
            );
        }
    }
}
