//! wpfix-core: Token stream rewriting for PHP sources
//!
//! This crate provides:
//! - `tokenize()`: A lossless PHP lexer producing `Token`s
//! - `cursor`: Stateless trivia-skipping and bracket-capture helpers
//! - `Matcher`: The contract every rewrite rule implements
//! - `RewriteSession`: The single left-to-right scan applying matchers
//! - `RewriteOutput`: Rewritten text plus a record of every `Fix`

pub mod cursor;
mod fix;
mod lexer;
mod matcher;
mod session;
mod token;

pub use fix::{Fix, RewriteOutput};
pub use lexer::{tokenize, LexError};
pub use matcher::{Insertion, Match, Matcher};
pub use session::{rewrite_source, RewriteSession};
pub use token::{Token, TokenKind};
