//! Stateless navigation helpers over a token slice
//!
//! Every function here is a pure function of `(tokens, index)`. Indices
//! past the end are allowed and simply report "nothing found".

use std::ops::Range;

use crate::token::{Token, TokenKind};

/// Index of the first non-trivia token at or after `i` (or `tokens.len()`)
pub fn skip_trivia_forward(tokens: &[Token<'_>], mut i: usize) -> usize {
    while i < tokens.len() && tokens[i].is_trivia() {
        i += 1;
    }
    i
}

/// Index of the first non-whitespace token at or after `i`; comments stop
/// the scan
pub fn skip_whitespace_forward(tokens: &[Token<'_>], mut i: usize) -> usize {
    while i < tokens.len() && tokens[i].is_whitespace() {
        i += 1;
    }
    i
}

/// Like [`skip_whitespace_forward`] but also stops at line breaks
pub fn skip_inline_whitespace_forward(tokens: &[Token<'_>], mut i: usize) -> usize {
    while i < tokens.len() && tokens[i].is_inline_whitespace() {
        i += 1;
    }
    i
}

/// Index of the closest non-trivia token strictly before `i`
pub fn skip_trivia_backward(tokens: &[Token<'_>], i: usize) -> Option<usize> {
    let end = i.min(tokens.len());
    tokens[..end].iter().rposition(|t| !t.is_trivia())
}

/// Index of the next non-trivia token strictly after `i`
pub fn next_significant(tokens: &[Token<'_>], i: usize) -> Option<usize> {
    let j = skip_trivia_forward(tokens, i + 1);
    (j < tokens.len()).then_some(j)
}

/// Concatenated text of a token range
pub fn collect_text(tokens: &[Token<'_>], range: Range<usize>) -> String {
    let end = range.end.min(tokens.len());
    let start = range.start.min(end);
    tokens[start..end].iter().map(|t| t.text).collect()
}

/// A bracketed region captured by [`capture_balanced`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Balanced {
    /// Source text from the opening to the closing bracket, inclusive
    pub text: String,
    /// Index of the closing bracket
    pub end: usize,
}

/// Capture from the `open` bracket at `open_index` to its matching
/// `close`, tracking nesting of that bracket pair
///
/// Returns `None` if `tokens[open_index]` is not `open` or the brackets
/// never balance.
pub fn capture_balanced(
    tokens: &[Token<'_>],
    open_index: usize,
    open: &str,
    close: &str,
) -> Option<Balanced> {
    if !tokens.get(open_index)?.is_op(open) {
        return None;
    }

    let mut depth = 0usize;
    for (j, token) in tokens.iter().enumerate().skip(open_index) {
        if token.is_op(open) {
            depth += 1;
        } else if token.is_op(close) {
            depth -= 1;
            if depth == 0 {
                return Some(Balanced {
                    text: collect_text(tokens, open_index..j + 1),
                    end: j,
                });
            }
        }
    }

    None
}

/// Shape of a call's argument list, as found by [`count_call_arguments`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallArguments {
    /// Number of top-level arguments
    pub count: usize,
    /// Index of the closing `)`
    pub close: usize,
    /// The list ends with `,` before `)`
    pub trailing_comma: bool,
    /// Some argument is passed by name (`needle: $x`)
    pub named: bool,
    /// Some argument is spread (`...$rest`) or the call is `f(...)`
    pub unpacked: bool,
}

/// Count the top-level arguments of the call whose `(` is at `open_index`
///
/// `(`, `[` and `{` all open a nesting level, so commas inside nested
/// calls, arrays and closures are not counted. Returns `None` for
/// unbalanced or mismatched brackets.
pub fn count_call_arguments(tokens: &[Token<'_>], open_index: usize) -> Option<CallArguments> {
    if !tokens.get(open_index)?.is_op("(") {
        return None;
    }

    let mut depth = 1usize;
    let mut count = 0usize;
    let mut has_content = false;
    let mut named = false;
    let mut unpacked = false;

    for (j, token) in tokens.iter().enumerate().skip(open_index + 1) {
        if depth == 1 && !has_content && !token.is_trivia() {
            unpacked |= token.is_op("...");
            named |= is_argument_name(tokens, j);
        }

        if token.is_any_op(&["(", "[", "{", "#["]) {
            depth += 1;
            has_content = true;
        } else if token.is_any_op(&[")", "]", "}"]) {
            depth -= 1;
            if depth == 0 {
                if !token.is_op(")") {
                    return None;
                }
                let trailing_comma = !has_content && count > 0;
                if has_content {
                    count += 1;
                }
                return Some(CallArguments {
                    count,
                    close: j,
                    trailing_comma,
                    named,
                    unpacked,
                });
            }
            has_content = true;
        } else if token.is_op(",") && depth == 1 {
            count += 1;
            has_content = false;
        } else if !token.is_trivia() {
            has_content = true;
        }
    }

    None
}

/// `name:` at the start of an argument
fn is_argument_name(tokens: &[Token<'_>], i: usize) -> bool {
    let token = &tokens[i];
    matches!(
        token.kind,
        TokenKind::Identifier | TokenKind::Keyword | TokenKind::Boolean | TokenKind::Null
    ) && !token.text.contains('\\')
        && next_significant(tokens, i).is_some_and(|k| tokens[k].is_op(":"))
}
