//! Lossless PHP lexer
//!
//! Runs mago's PHP lexer over the source and folds its fine-grained token
//! kinds into the closed `TokenKind` set the rules work with. The texts of
//! the returned tokens concatenate back to the input byte for byte.
//!
//! Two things happen on top of mago's stream:
//! - string and heredoc pieces (quote, parts, interpolated expressions,
//!   closing quote or marker) are merged back into a single token, so a
//!   rule never sees inside a string
//! - words right after `->`, `?->`, `::`, `function` or `const` are names,
//!   never keywords or literals, so `$obj->null` is not the `null` literal

use mago_database::file::FileId;
use mago_syntax::error::SyntaxError;
use mago_syntax::lexer::Lexer;
use mago_syntax::settings::LexerSettings;
use mago_syntax::token::TokenKind as PhpKind;
use mago_syntax_core::input::Input;
use thiserror::Error;

use crate::token::{Token, TokenKind};

/// Errors that abort tokenization of a whole input
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LexError {
    #[error("Unterminated string literal starting on line {line}")]
    UnterminatedString { line: usize },

    #[error("Unterminated block comment starting on line {line}")]
    UnterminatedComment { line: usize },

    #[error("Unterminated heredoc `{marker}` starting on line {line}")]
    UnterminatedHeredoc { marker: String, line: usize },

    #[error("Unexpected byte 0x{byte:02x} on line {line}")]
    UnexpectedByte { byte: u8, line: usize },

    #[error("Unexpected end of input on line {line}")]
    UnexpectedEof { line: usize },

    #[error("Interpolation nested too deeply on line {line}")]
    NestingTooDeep { line: usize },

    #[error("Token boundary does not fall on a character boundary on line {line}")]
    Misaligned { line: usize },
}

/// Tokenize PHP source
///
/// # Errors
///
/// Returns `LexError` when a string, block comment or heredoc runs off the
/// end of the input, or when the source contains a byte PHP rejects.
pub fn tokenize(source: &str) -> Result<Vec<Token<'_>>, LexError> {
    Folder::new(source).run()
}

/// Open string or interpolation context while merging string pieces
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Frame {
    /// Inside `"..."` or a backtick string, closed by the same kind
    Quote(PhpKind),
    /// Inside a heredoc or nowdoc body
    Document,
    /// Inside `{$...}` or `${...}`, with the current brace depth
    Brace(usize),
}

/// The string token being assembled from mago's pieces
struct OpenString {
    kind: TokenKind,
    offset: usize,
    line: usize,
    marker: Option<String>,
}

struct Folder<'src> {
    source: &'src str,
    tokens: Vec<Token<'src>>,
    /// Byte offset where the next token must start
    cursor: usize,
    /// Line of `cursor`
    line: usize,
    frames: Vec<Frame>,
    open: Option<OpenString>,
    /// Kind and text of the last non-trivia token emitted
    last: Option<(TokenKind, &'src str)>,
}

impl<'src> Folder<'src> {
    fn new(source: &'src str) -> Self {
        Self {
            source,
            tokens: Vec::new(),
            cursor: 0,
            line: 1,
            frames: Vec::new(),
            open: None,
            last: None,
        }
    }

    fn run(mut self) -> Result<Vec<Token<'src>>, LexError> {
        let source = self.source;
        let input = Input::new(FileId::zero(), source.as_bytes());
        let mut lexer = Lexer::new(input, LexerSettings::default());

        while let Some(next) = lexer.advance() {
            let token = next.map_err(|e| self.syntax_error(e))?;
            let start = token.start.offset as usize;
            let end = start + token.value.len();
            if end == start {
                continue;
            }
            if start != self.cursor {
                return Err(LexError::Misaligned { line: self.line });
            }
            let text = source
                .get(start..end)
                .ok_or(LexError::Misaligned { line: self.line })?;

            self.feed(token.kind, start, text)?;
            self.line += count_newlines(text);
            self.cursor = end;
        }

        if let Some(open) = self.open.take() {
            return Err(match open.marker {
                Some(marker) => LexError::UnterminatedHeredoc {
                    marker,
                    line: open.line,
                },
                None => LexError::UnterminatedString { line: open.line },
            });
        }
        if self.cursor != self.source.len() {
            return Err(LexError::Misaligned { line: self.line });
        }

        Ok(self.tokens)
    }

    fn feed(&mut self, kind: PhpKind, start: usize, text: &'src str) -> Result<(), LexError> {
        if kind == PhpKind::PartialLiteralString {
            return Err(LexError::UnterminatedString { line: self.line });
        }

        if self.frames.is_empty() {
            match kind {
                PhpKind::DoubleQuote | PhpKind::Backtick => {
                    self.frames.push(Frame::Quote(kind));
                    self.open_string(TokenKind::InterpolatedString, start, None);
                }
                PhpKind::DocumentStart(_) => {
                    self.frames.push(Frame::Document);
                    self.open_string(TokenKind::Heredoc, start, Some(heredoc_marker(text)));
                }
                _ => {
                    let kind = self.classify(kind, text);
                    self.emit(kind, start, self.line, start + text.len());
                }
            }
            return Ok(());
        }

        self.track_frames(kind);
        if self.frames.is_empty() {
            if let Some(open) = self.open.take() {
                self.emit(open.kind, open.offset, open.line, start + text.len());
            }
        }
        Ok(())
    }

    /// Update the frame stack for a token inside a string
    fn track_frames(&mut self, kind: PhpKind) {
        let Some(&top) = self.frames.last() else {
            return;
        };
        let opens_brace = matches!(kind, PhpKind::LeftBrace | PhpKind::DollarLeftBrace);

        match top {
            Frame::Quote(quote) if kind == quote => {
                self.frames.pop();
            }
            Frame::Document if kind == PhpKind::DocumentEnd => {
                self.frames.pop();
            }
            Frame::Quote(_) | Frame::Document => {
                if opens_brace {
                    self.frames.push(Frame::Brace(1));
                }
            }
            Frame::Brace(depth) => match kind {
                _ if opens_brace => {
                    self.frames.pop();
                    self.frames.push(Frame::Brace(depth + 1));
                }
                PhpKind::RightBrace => {
                    self.frames.pop();
                    if depth > 1 {
                        self.frames.push(Frame::Brace(depth - 1));
                    }
                }
                PhpKind::DoubleQuote | PhpKind::Backtick => self.frames.push(Frame::Quote(kind)),
                PhpKind::DocumentStart(_) => self.frames.push(Frame::Document),
                _ => {}
            },
        }
    }

    fn open_string(&mut self, kind: TokenKind, offset: usize, marker: Option<String>) {
        self.open = Some(OpenString {
            kind,
            offset,
            line: self.line,
            marker,
        });
    }

    fn emit(&mut self, kind: TokenKind, offset: usize, line: usize, end: usize) {
        let text = &self.source[offset..end];
        let token = Token::new(kind, text, offset, line);
        if !token.is_trivia() {
            self.last = Some((kind, text));
        }
        self.tokens.push(token);
    }

    /// Map one of mago's kinds onto `TokenKind`
    fn classify(&self, kind: PhpKind, text: &str) -> TokenKind {
        let mapped = match kind {
            PhpKind::InlineText | PhpKind::InlineShebang => TokenKind::InlineHtml,
            PhpKind::OpenTag | PhpKind::EchoTag | PhpKind::ShortOpenTag => TokenKind::OpenTag,
            PhpKind::CloseTag => TokenKind::CloseTag,
            PhpKind::Whitespace => TokenKind::Whitespace,
            PhpKind::SingleLineComment | PhpKind::HashComment | PhpKind::MultiLineComment => {
                TokenKind::Comment
            }
            PhpKind::DocBlockComment => TokenKind::DocComment,
            PhpKind::Variable => TokenKind::Variable,
            PhpKind::True | PhpKind::False => TokenKind::Boolean,
            PhpKind::Null => TokenKind::Null,
            PhpKind::Identifier
            | PhpKind::QualifiedIdentifier
            | PhpKind::FullyQualifiedIdentifier => name_kind(text),
            PhpKind::Self_ | PhpKind::Parent | PhpKind::From => TokenKind::Identifier,
            k if k.is_magic_constant() => TokenKind::Identifier,
            PhpKind::LiteralString => TokenKind::StringLiteral,
            PhpKind::LiteralInteger => TokenKind::Integer,
            PhpKind::LiteralFloat => TokenKind::Float,
            k if k.is_cast() => TokenKind::Cast,
            PhpKind::StringPart
            | PhpKind::DocumentEnd
            | PhpKind::StringVariableName
            | PhpKind::OffsetNumber
            | PhpKind::OffsetString => TokenKind::Other,
            k if k.is_keyword() => TokenKind::Keyword,
            _ if text.bytes().next().is_some_and(is_word_start) => TokenKind::Keyword,
            _ => TokenKind::Operator,
        };

        let word = matches!(
            mapped,
            TokenKind::Keyword | TokenKind::Boolean | TokenKind::Null
        );
        if word && self.after_name_marker() {
            TokenKind::Identifier
        } else {
            mapped
        }
    }

    /// Whether the previous token makes the next word a member or declaration name
    fn after_name_marker(&self) -> bool {
        match self.last {
            Some((TokenKind::Operator, op)) => matches!(op, "->" | "?->" | "::"),
            Some((TokenKind::Keyword, kw)) => {
                kw.eq_ignore_ascii_case("function") || kw.eq_ignore_ascii_case("const")
            }
            _ => false,
        }
    }

    fn syntax_error(&self, error: SyntaxError) -> LexError {
        let in_comment = self.source[self.cursor..].starts_with("/*");
        match error {
            SyntaxError::UnexpectedEndOfFile(..) if in_comment => {
                LexError::UnterminatedComment { line: self.line }
            }
            SyntaxError::UnexpectedEndOfFile(..) => LexError::UnexpectedEof { line: self.line },
            SyntaxError::UnexpectedToken(_, byte, position)
            | SyntaxError::UnrecognizedToken(_, byte, position) => LexError::UnexpectedByte {
                byte,
                line: self.line_at(position.offset as usize),
            },
            SyntaxError::RecursionLimitExceeded(_, position) => LexError::NestingTooDeep {
                line: self.line_at(position.offset as usize),
            },
        }
    }

    fn line_at(&self, offset: usize) -> usize {
        let end = offset.min(self.source.len());
        1 + self.source.as_bytes()[..end]
            .iter()
            .filter(|&&b| b == b'\n')
            .count()
    }
}

/// `true`, `false` and `null` stay literals even when written `\null`
fn name_kind(name: &str) -> TokenKind {
    let bare = name.trim_start_matches('\\');
    if bare.eq_ignore_ascii_case("true") || bare.eq_ignore_ascii_case("false") {
        TokenKind::Boolean
    } else if bare.eq_ignore_ascii_case("null") {
        TokenKind::Null
    } else {
        TokenKind::Identifier
    }
}

/// Label of a heredoc opener such as `<<<"EOT"\n`
fn heredoc_marker(opener: &str) -> String {
    opener
        .trim_start_matches("<<<")
        .trim()
        .trim_matches(|c| c == '"' || c == '\'')
        .to_string()
}

fn count_newlines(text: &str) -> usize {
    text.bytes().filter(|&b| b == b'\n').count()
}

fn is_word_start(b: u8) -> bool {
    b.is_ascii_alphabetic() || b == b'_' || b >= 0x80
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<(TokenKind, &str)> {
        tokenize(source)
            .unwrap()
            .into_iter()
            .filter(|t| !t.is_trivia())
            .map(|t| (t.kind, t.text))
            .collect()
    }

    fn roundtrip(source: &str) -> String {
        tokenize(source).unwrap().iter().map(|t| t.text).collect()
    }

    #[test]
    fn test_lossless() {
        let sources = [
            "<?php\r\nif ($a === 'b') {\r\n    echo \"x {$y['k']}\";\r\n}\r\n",
            "<html><?= $title ?>\n<p><?php echo 1; ?></p>",
            "<?php $s = <<<EOT\n  Hello $name\n  EOT;\n$n = <<<'RAW'\nraw\nRAW;\n",
            "\u{feff}<?php // trailing comment without newline",
            "<?php $é = 'ü'; /* ß */ # done",
            "<?php $m = \"{$a[\"k\"]} and ${b} and $c->d and $e[0]\";",
        ];
        for source in sources {
            assert_eq!(roundtrip(source), source);
        }
    }

    #[test]
    fn test_basic_classification() {
        let tokens = kinds("<?php if ($a === 'foo') { return null; }");
        assert_eq!(tokens[0], (TokenKind::OpenTag, "<?php"));
        assert_eq!(tokens[1], (TokenKind::Keyword, "if"));
        assert_eq!(tokens[2], (TokenKind::Operator, "("));
        assert_eq!(tokens[3], (TokenKind::Variable, "$a"));
        assert_eq!(tokens[4], (TokenKind::Operator, "==="));
        assert_eq!(tokens[5], (TokenKind::StringLiteral, "'foo'"));
        assert_eq!(tokens[9], (TokenKind::Null, "null"));
    }

    #[test]
    fn test_open_tag_whitespace_is_separate() {
        let all = tokenize("<?php\n$a;").unwrap();
        assert_eq!(all[0].text, "<?php");
        assert_eq!(all[1].kind, TokenKind::Whitespace);
        assert_eq!(all[1].text, "\n");
    }

    #[test]
    fn test_short_ternary_is_two_tokens() {
        let tokens = kinds("<?php $a ?: $b;");
        assert_eq!(tokens[2], (TokenKind::Operator, "?"));
        assert_eq!(tokens[3], (TokenKind::Operator, ":"));
    }

    #[test]
    fn test_multi_char_operators() {
        let tokens = kinds("<?php $a?->b; $c ?? $d; A::B; $e <=> $f; $g !== $h;");
        assert!(tokens.contains(&(TokenKind::Operator, "?->")));
        assert!(tokens.contains(&(TokenKind::Operator, "??")));
        assert!(tokens.contains(&(TokenKind::Operator, "::")));
        assert!(tokens.contains(&(TokenKind::Operator, "<=>")));
        assert!(tokens.contains(&(TokenKind::Operator, "!==")));
    }

    #[test]
    fn test_literals_case_insensitive() {
        let tokens = kinds("<?php $a = TRUE; $b = False; $c = NULL; $d = \\null;");
        assert_eq!(tokens[3].0, TokenKind::Boolean);
        assert_eq!(tokens[7].0, TokenKind::Boolean);
        assert_eq!(tokens[11].0, TokenKind::Null);
        assert_eq!(tokens[15], (TokenKind::Null, "\\null"));
    }

    #[test]
    fn test_member_names_are_identifiers() {
        let tokens = kinds("<?php $o->null; Foo::TRUE; $o->echo; function list() {}");
        assert_eq!(tokens[3], (TokenKind::Identifier, "null"));
        assert_eq!(tokens[7], (TokenKind::Identifier, "TRUE"));
        assert_eq!(tokens[11], (TokenKind::Identifier, "echo"));
        assert_eq!(tokens[14], (TokenKind::Identifier, "list"));
    }

    #[test]
    fn test_class_constant_fetch_is_identifier() {
        let tokens = kinds("<?php Foo::class; self::X;");
        assert_eq!(tokens[3], (TokenKind::Identifier, "class"));
        assert_eq!(tokens[5], (TokenKind::Identifier, "self"));
    }

    #[test]
    fn test_qualified_names_single_token() {
        let tokens = kinds("<?php \\in_array($a, $b); Foo\\bar();");
        assert_eq!(tokens[1], (TokenKind::Identifier, "\\in_array"));
        assert!(tokens.contains(&(TokenKind::Identifier, "Foo\\bar")));
    }

    #[test]
    fn test_numbers() {
        let tokens = kinds("<?php 42; 0x1F; 0b101; 1_000; 1.5; .5; 1e3; 2E-4;");
        let numbers: Vec<_> = tokens
            .iter()
            .filter(|(k, _)| matches!(k, TokenKind::Integer | TokenKind::Float))
            .collect();
        assert_eq!(numbers.len(), 8);
        assert_eq!(*numbers[0], (TokenKind::Integer, "42"));
        assert_eq!(*numbers[1], (TokenKind::Integer, "0x1F"));
        assert_eq!(*numbers[3], (TokenKind::Integer, "1_000"));
        assert_eq!(*numbers[4], (TokenKind::Float, "1.5"));
        assert_eq!(*numbers[5], (TokenKind::Float, ".5"));
        assert_eq!(*numbers[7], (TokenKind::Float, "2E-4"));
    }

    #[test]
    fn test_strings() {
        let tokens = kinds(r#"<?php 'it\'s'; "plain"; "hi $name"; "{$a["k"]}"; `ls`;"#);
        assert_eq!(tokens[1], (TokenKind::StringLiteral, r"'it\'s'"));
        assert_eq!(tokens[3], (TokenKind::StringLiteral, "\"plain\""));
        assert_eq!(tokens[5], (TokenKind::InterpolatedString, "\"hi $name\""));
        assert_eq!(tokens[7], (TokenKind::InterpolatedString, r#""{$a["k"]}""#));
        assert_eq!(tokens[9], (TokenKind::InterpolatedString, "`ls`"));
        assert_eq!(tokens[10], (TokenKind::Operator, ";"));
    }

    #[test]
    fn test_nested_interpolation_is_one_token() {
        let source = r#"<?php $s = "a {$m[f("x $y")]} b"; $t = 1;"#;
        let tokens = kinds(source);
        assert_eq!(
            tokens[3],
            (TokenKind::InterpolatedString, r#""a {$m[f("x $y")]} b""#)
        );
        assert_eq!(tokens[5], (TokenKind::Variable, "$t"));
    }

    #[test]
    fn test_comments() {
        let all = tokenize("<?php # hash\n// slash ?>html\n/** doc */ #[Attr]").unwrap();
        let kinds: Vec<_> = all.iter().map(|t| (t.kind, t.text)).collect();
        assert!(kinds.contains(&(TokenKind::Comment, "# hash")));
        assert!(kinds.contains(&(TokenKind::Comment, "// slash")));
        assert!(kinds.contains(&(TokenKind::CloseTag, "?>")));
        assert!(kinds.contains(&(TokenKind::InlineHtml, "html\n/** doc */ #[Attr]")));
    }

    #[test]
    fn test_doc_comment_and_attribute() {
        let tokens = kinds("<?php /** doc */ #[Attr] function f() {}");
        assert_eq!(tokens[1], (TokenKind::DocComment, "/** doc */"));
        assert_eq!(tokens[2], (TokenKind::Operator, "#["));
    }

    #[test]
    fn test_casts() {
        let tokens = kinds("<?php (int) $a; ( string )$b; ($c);");
        assert_eq!(tokens[1], (TokenKind::Cast, "(int)"));
        assert_eq!(tokens[4], (TokenKind::Cast, "( string )"));
        assert_eq!(tokens[7], (TokenKind::Operator, "("));
    }

    #[test]
    fn test_close_tag_then_html() {
        let all = tokenize("<?php echo 1 ?>\n\nafter").unwrap();
        let close = all.iter().find(|t| t.kind == TokenKind::CloseTag).unwrap();
        assert_eq!(close.text, "?>");
        let last = all.last().unwrap();
        assert_eq!((last.kind, last.text), (TokenKind::InlineHtml, "\n\nafter"));
    }

    #[test]
    fn test_heredoc_token() {
        let tokens = kinds("<?php $x = <<<HTML\n<p>$a</p>\nHTML;\n");
        assert_eq!(tokens[3], (TokenKind::Heredoc, "<<<HTML\n<p>$a</p>\nHTML"));
        assert_eq!(tokens[4], (TokenKind::Operator, ";"));
    }

    #[test]
    fn test_line_numbers() {
        let all = tokenize("<?php\n$a;\n\n$b = \"x\n$y\";\n$c;").unwrap();
        let b = all.iter().find(|t| t.text == "$b").unwrap();
        assert_eq!(b.line, 4);
        assert_eq!(b.offset, 11);
        let c = all.iter().find(|t| t.text == "$c").unwrap();
        assert_eq!(c.line, 6);
    }

    #[test]
    fn test_unterminated_errors() {
        assert_eq!(
            tokenize("<?php $a = 'oops;"),
            Err(LexError::UnterminatedString { line: 1 })
        );
        assert_eq!(
            tokenize("<?php $a = \"x $b"),
            Err(LexError::UnterminatedString { line: 1 })
        );
        assert_eq!(
            tokenize("<?php\n/* never closed"),
            Err(LexError::UnterminatedComment { line: 2 })
        );
        assert_eq!(
            tokenize("<?php\n$a = <<<EOT\nbody\n"),
            Err(LexError::UnterminatedHeredoc {
                marker: "EOT".to_string(),
                line: 2
            })
        );
    }

    #[test]
    fn test_html_only() {
        let all = tokenize("<p>no php here</p>").unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].kind, TokenKind::InlineHtml);
    }
}
