//! Token model shared by the lexer, the cursor helpers and the rules

/// Lexical class of a token
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    /// Text outside of `<?php ... ?>`
    InlineHtml,
    /// `<?php`, `<?=` or `<?`
    OpenTag,
    /// `?>`
    CloseTag,
    /// Spaces, tabs and line breaks
    Whitespace,
    /// `// ...`, `# ...` or `/* ... */`
    Comment,
    /// `/** ... */`
    DocComment,
    /// `$name`
    Variable,
    /// Function, class or constant name, possibly namespace-qualified
    Identifier,
    /// Reserved word (`echo`, `return`, `function`, ...)
    Keyword,
    /// `true` / `false` in any case
    Boolean,
    /// `null` in any case
    Null,
    /// Single-quoted string, or double-quoted without interpolation
    StringLiteral,
    /// Double-quoted or backtick string containing interpolation
    InterpolatedString,
    /// Heredoc or nowdoc through its closing marker
    Heredoc,
    Integer,
    Float,
    /// `(int)`, `(string)`, ...
    Cast,
    /// Punctuation and operators
    Operator,
    /// Anything not modelled above
    Other,
}

/// A single lexical token borrowing its text from the source
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'src> {
    pub kind: TokenKind,
    pub text: &'src str,
    /// Byte offset of the first character
    pub offset: usize,
    /// 1-based line of the first character
    pub line: usize,
}

impl<'src> Token<'src> {
    pub fn new(kind: TokenKind, text: &'src str, offset: usize, line: usize) -> Self {
        Self {
            kind,
            text,
            offset,
            line,
        }
    }

    /// Whitespace and comments carry no weight for matching
    pub fn is_trivia(&self) -> bool {
        matches!(
            self.kind,
            TokenKind::Whitespace | TokenKind::Comment | TokenKind::DocComment
        )
    }

    pub fn is_whitespace(&self) -> bool {
        self.kind == TokenKind::Whitespace
    }

    /// Whitespace that stays on the current line
    pub fn is_inline_whitespace(&self) -> bool {
        self.kind == TokenKind::Whitespace && !self.text.contains('\n') && !self.text.contains('\r')
    }

    /// Operator or punctuation with exactly this text
    pub fn is_op(&self, op: &str) -> bool {
        self.kind == TokenKind::Operator && self.text == op
    }

    /// Operator matching any of the given texts
    pub fn is_any_op(&self, ops: &[&str]) -> bool {
        self.kind == TokenKind::Operator && ops.contains(&self.text)
    }

    /// Keyword, compared case-insensitively
    pub fn is_keyword(&self, keyword: &str) -> bool {
        self.kind == TokenKind::Keyword && self.text.eq_ignore_ascii_case(keyword)
    }

    /// Identifier with exactly this name, written plain or as `\name`
    pub fn is_identifier(&self, name: &str) -> bool {
        self.kind == TokenKind::Identifier && self.unqualified_text() == name
    }

    /// Text without the leading `\` of a fully qualified name
    pub fn unqualified_text(&self) -> &'src str {
        self.text.strip_prefix('\\').unwrap_or(self.text)
    }

    /// The leading `\` of a fully qualified name, or `""`
    pub fn global_prefix(&self) -> &'src str {
        &self.text[..self.text.len() - self.unqualified_text().len()]
    }

    /// String, integer, float, boolean or null literal
    pub fn is_simple_literal(&self) -> bool {
        matches!(
            self.kind,
            TokenKind::StringLiteral
                | TokenKind::Integer
                | TokenKind::Float
                | TokenKind::Boolean
                | TokenKind::Null
        )
    }

    /// `->` or `?->`
    pub fn is_member_access(&self) -> bool {
        self.is_any_op(&["->", "?->"])
    }

    /// `::`
    pub fn is_static_scope(&self) -> bool {
        self.is_op("::")
    }
}
