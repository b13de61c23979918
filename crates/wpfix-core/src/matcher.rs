//! The contract every rewrite rule implements

use crate::token::Token;

/// Text to emit immediately before a later token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Insertion {
    /// Index of the token the text goes in front of
    pub before: usize,
    pub text: String,
}

/// A matcher's verdict at one start index
///
/// The session emits `replacement` in place of `tokens[start..end]` and
/// resumes scanning at `end`. Insertions are queued and emitted when the
/// scan reaches their target token, so regions between `end` and the
/// insertion point are still scanned (and possibly rewritten) normally.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Match {
    pub replacement: String,
    /// Exclusive end index of the consumed tokens
    pub end: usize,
    pub insertions: Vec<Insertion>,
}

impl Match {
    pub fn new(replacement: impl Into<String>, end: usize) -> Self {
        Self {
            replacement: replacement.into(),
            end,
            insertions: Vec::new(),
        }
    }

    /// Queue `text` to be emitted right before token `before`
    pub fn with_insertion(mut self, before: usize, text: impl Into<String>) -> Self {
        self.insertions.push(Insertion {
            before,
            text: text.into(),
        });
        self
    }
}

/// A one-shot, stateless pattern recognizer
pub trait Matcher {
    /// Identifier used in reports and configuration
    fn name(&self) -> &str;

    /// Cheap check on the token at the candidate index. Only when this
    /// returns true is [`Matcher::try_match`] called.
    fn triggers_on(&self, token: &Token<'_>) -> bool;

    /// Try to match a pattern starting at `start`. Must not panic for any
    /// `start < tokens.len()`; declining is always `None`.
    fn try_match(&self, tokens: &[Token<'_>], start: usize) -> Option<Match>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_match_builder() {
        let m = Match::new("in_array", 3).with_insertion(9, ", true");
        assert_eq!(m.replacement, "in_array");
        assert_eq!(m.end, 3);
        assert_eq!(
            m.insertions,
            vec![Insertion {
                before: 9,
                text: ", true".to_string()
            }]
        );
    }
}
