//! Single-pass rewrite driver
//!
//! A session walks the token slice once from left to right. At each index
//! it asks the matchers, in order, whether a pattern starts there. On a
//! match it emits the replacement and jumps past the consumed tokens, so a
//! region is never matched twice; otherwise it copies the token verbatim.

use std::collections::BTreeMap;

use crate::cursor::collect_text;
use crate::fix::{Fix, RewriteOutput};
use crate::lexer::{tokenize, LexError};
use crate::matcher::{Match, Matcher};
use crate::token::Token;

/// Per-input rewrite state: cursor, output buffer and applied fixes
pub struct RewriteSession<'t, 'src> {
    tokens: &'t [Token<'src>],
    index: usize,
    output: String,
    fixes: Vec<Fix>,
    /// Text queued for emission in front of a token index
    pending: BTreeMap<usize, String>,
}

impl<'t, 'src> RewriteSession<'t, 'src> {
    pub fn new(tokens: &'t [Token<'src>]) -> Self {
        let capacity = tokens.iter().map(|t| t.text.len()).sum();
        Self {
            tokens,
            index: 0,
            output: String::with_capacity(capacity),
            fixes: Vec::new(),
            pending: BTreeMap::new(),
        }
    }

    /// Scan the whole input, trying `matchers` in order at every index
    pub fn run<M: Matcher + ?Sized>(mut self, matchers: &[&M]) -> RewriteOutput {
        while self.index < self.tokens.len() {
            self.flush_pending();

            match self.find_match(matchers) {
                Some((rule, found)) => self.commit(rule, found),
                None => {
                    self.output.push_str(self.tokens[self.index].text);
                    self.index += 1;
                }
            }
        }

        RewriteOutput {
            text: self.output,
            fixes: self.fixes,
        }
    }

    fn find_match<M: Matcher + ?Sized>(&self, matchers: &[&M]) -> Option<(String, Match)> {
        let token = &self.tokens[self.index];

        matchers
            .iter()
            .filter(|m| m.triggers_on(token))
            .find_map(|m| {
                m.try_match(self.tokens, self.index)
                    .filter(|found| self.accepts(found))
                    .map(|found| (m.name().to_string(), found))
            })
    }

    /// Reject matches that would stall the scan, run off the end, swallow
    /// a queued insertion, or queue one inside their own region
    fn accepts(&self, found: &Match) -> bool {
        let len = self.tokens.len();
        if found.end <= self.index || found.end > len {
            return false;
        }
        if self.pending.range(self.index + 1..found.end).next().is_some() {
            return false;
        }
        found
            .insertions
            .iter()
            .all(|ins| ins.before >= found.end && ins.before < len)
    }

    fn commit(&mut self, rule: String, found: Match) {
        let first = &self.tokens[self.index];
        let inserted = found.insertions.iter().map(|ins| ins.text.clone()).collect();
        self.fixes.push(
            Fix::new(
                rule,
                first.line,
                first.offset,
                collect_text(self.tokens, self.index..found.end),
                found.replacement.as_str(),
            )
            .with_inserted(inserted),
        );

        self.output.push_str(&found.replacement);
        for insertion in found.insertions {
            self.pending
                .entry(insertion.before)
                .or_default()
                .push_str(&insertion.text);
        }
        self.index = found.end;
    }

    fn flush_pending(&mut self) {
        if let Some(text) = self.pending.remove(&self.index) {
            self.output.push_str(&text);
        }
    }
}

/// Tokenize `source` and run one session over it
///
/// # Errors
///
/// Returns the lexer error when the source cannot be tokenized; callers
/// must then leave the input untouched.
pub fn rewrite_source<M: Matcher + ?Sized>(
    source: &str,
    matchers: &[&M],
) -> Result<RewriteOutput, LexError> {
    let tokens = tokenize(source)?;
    Ok(RewriteSession::new(&tokens).run(matchers))
}
